//! 练习的待评审工作集
//!
//! 记录已分发给评审人但尚未加锁的提交，保存在对象缓存中，
//! 键为 `assessment_queue:{exercise_id}`，值为提交 ID 的 JSON 数组。
//! 工作集只用于分发提示，不参与加锁判断。

use crate::cache::{CacheResult, ObjectCache};

fn key(exercise_id: i64) -> String {
    format!("assessment_queue:{exercise_id}")
}

pub async fn members(cache: &dyn ObjectCache, exercise_id: i64) -> Vec<i64> {
    match cache.get_json::<Vec<i64>>(&key(exercise_id)).await {
        CacheResult::Found(ids) => ids,
        _ => Vec::new(),
    }
}

/// 合并新的提交 ID，返回合并后的工作集
pub async fn merge(cache: &dyn ObjectCache, exercise_id: i64, ids: &[i64], ttl: u64) -> Vec<i64> {
    let mut current = members(cache, exercise_id).await;
    for id in ids {
        if !current.contains(id) {
            current.push(*id);
        }
    }
    cache.insert_json(key(exercise_id), &current, ttl).await;
    current
}

pub async fn clear(cache: &dyn ObjectCache, exercise_id: i64) {
    cache.remove(&key(exercise_id)).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::object_cache::moka::MokaCacheWrapper;

    #[tokio::test]
    async fn test_merge_deduplicates_and_clear_empties() {
        let cache = MokaCacheWrapper::with_settings(100, 60).unwrap();

        assert!(members(&cache, 1).await.is_empty());
        assert_eq!(merge(&cache, 1, &[3, 4], 0).await, vec![3, 4]);
        assert_eq!(merge(&cache, 1, &[4, 5], 0).await, vec![3, 4, 5]);
        assert!(members(&cache, 2).await.is_empty());

        clear(&cache, 1).await;
        assert!(members(&cache, 1).await.is_empty());
    }
}
