//! 评审锁管理
//!
//! 评审人打开提交进行评审时会创建一个未完成的评审结果，这就是评审锁。
//! 每个评审人跨所有练习同时持有的锁不能超过上限（默认 10）。
//!
//! 并发控制分两层：
//! - 进程内按评审人加异步互斥锁，同一评审人的加锁请求串行执行
//! - 存储层在单个事务内完成计数与插入。PostgreSQL/MySQL 锁定评审人行，
//!   SQLite 在事务开始时先写入以取得库级写锁；
//!   `results.submission_id` 唯一索引保证同一提交只有一个评审人

use chrono::Utc;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::AppConfig;
use crate::errors::{AssessmentError, Result};
use crate::models::courses::entities::CourseRole;
use crate::models::exercises::entities::Exercise;
use crate::models::modeling_submissions::entities::ModelingSubmission;
use crate::models::results::entities::LockAcquisition;
use crate::models::users::entities::User;
use crate::services::permissions::require_course_role;
use crate::storage::Storage;

/// 寻找下一份提交时，遇到冲突最多尝试的候选数量
const MAX_CANDIDATE_ATTEMPTS: u64 = 3;

/// 全局评审锁管理器，上限取自 `assessment.lock_limit`
pub static LOCK_MANAGER: Lazy<AssessmentLockManager> =
    Lazy::new(|| AssessmentLockManager::new(AppConfig::get().assessment.lock_limit));

/// 通过评审前置检查的练习
#[derive(Debug, Clone)]
pub struct AssessableExercise {
    pub exercise: Exercise,
    pub role: CourseRole,
}

/// 加锁成功后返回的提交与评审结果
#[derive(Debug, Clone)]
pub struct LockedSubmission {
    pub submission: ModelingSubmission,
    pub lock: LockAcquisition,
    /// 评审人在练习所属课程中的角色
    pub role: CourseRole,
}

/// 练习截止后才能按顺序分配待评审提交
pub fn ensure_due_date_over(exercise: &Exercise) -> Result<()> {
    if exercise.is_due_date_over(Utc::now()) {
        Ok(())
    } else {
        Err(AssessmentError::not_found(format!(
            "练习 {} 尚未截止，暂不能评审",
            exercise.id
        )))
    }
}

pub struct AssessmentLockManager {
    lock_limit: u64,
    /// 只保留正在加锁的评审人，释放后由 `release_guard` 清理
    guards: DashMap<i64, Arc<Mutex<()>>>,
}

impl AssessmentLockManager {
    pub fn new(lock_limit: u64) -> Self {
        Self {
            lock_limit,
            guards: DashMap::new(),
        }
    }

    pub fn lock_limit(&self) -> u64 {
        self.lock_limit
    }

    fn guard_for(&self, grader_id: i64) -> Arc<Mutex<()>> {
        self.guards
            .entry(grader_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// 没有其他请求持有或等待时移除评审人的互斥锁
    fn release_guard(&self, grader_id: i64) {
        self.guards
            .remove_if(&grader_id, |_, guard| Arc::strong_count(guard) == 1);
    }

    /// 评审人当前持有的锁数量
    pub async fn lock_count(&self, storage: &dyn Storage, grader_id: i64) -> Result<u64> {
        storage.count_locks_by_assessor(grader_id).await
    }

    /// 检查评审人是否还能再加锁，不创建任何数据
    pub async fn ensure_below_limit(&self, storage: &dyn Storage, grader_id: i64) -> Result<()> {
        let held = self.lock_count(storage, grader_id).await?;
        if held >= self.lock_limit {
            info!(
                "Grader {} reached assessment lock limit ({}/{})",
                grader_id, held, self.lock_limit
            );
            return Err(AssessmentError::lock_limit_exceeded(format!(
                "您已锁定 {held} 份提交，达到上限 {}，请先完成或取消已有评审",
                self.lock_limit
            )));
        }
        Ok(())
    }

    /// 评审前置检查：练习存在、为建模练习、请求者至少是助教
    pub async fn check_assessable(
        &self,
        storage: &dyn Storage,
        exercise_id: i64,
        grader: &User,
    ) -> Result<AssessableExercise> {
        let exercise = storage
            .get_exercise_by_id(exercise_id)
            .await?
            .ok_or_else(|| AssessmentError::not_found(format!("练习 {exercise_id} 不存在")))?;

        if !exercise.is_modeling() {
            return Err(AssessmentError::invalid_exercise_type(format!(
                "练习 {exercise_id} 不是建模练习"
            )));
        }

        let role =
            require_course_role(storage, grader, exercise.course_id, CourseRole::Tutor).await?;

        Ok(AssessableExercise { exercise, role })
    }

    /// 为评审人锁定一份提交（幂等）
    pub async fn lock_submission(
        &self,
        storage: &dyn Storage,
        submission_id: i64,
        grader_id: i64,
    ) -> Result<LockAcquisition> {
        let guard = self.guard_for(grader_id);
        let outcome = {
            let _held = guard.lock().await;
            storage
                .acquire_assessment_lock(submission_id, grader_id, self.lock_limit)
                .await
        };
        drop(guard);
        self.release_guard(grader_id);
        let outcome = outcome?;

        match &outcome {
            LockAcquisition::Acquired(result) => info!(
                "Grader {} locked submission {} (result {})",
                grader_id, submission_id, result.id
            ),
            LockAcquisition::AlreadyHeld(_) => debug!(
                "Grader {} re-opened locked submission {}",
                grader_id, submission_id
            ),
            LockAcquisition::Finished(_) => debug!(
                "Submission {} already assessed, no lock created",
                submission_id
            ),
        }

        Ok(outcome)
    }

    /// 获取下一份待评审的提交并加锁
    ///
    /// - `explicit_submission_id` 为空时，从练习中按提交时间选取第一份已提交且未评审的提交，
    ///   要求练习截止时间已过；遇到被其他评审人抢先锁定的提交时换下一份
    /// - 指定提交时，只要求提交属于该练习
    pub async fn acquire_next_submission_for_assessment(
        &self,
        storage: &dyn Storage,
        exercise_id: i64,
        grader: &User,
        explicit_submission_id: Option<i64>,
    ) -> Result<LockedSubmission> {
        let assessable = self.check_assessable(storage, exercise_id, grader).await?;

        match explicit_submission_id {
            Some(submission_id) => {
                let submission = self
                    .submission_in_exercise(storage, submission_id, exercise_id)
                    .await?;
                let lock = self.lock_submission(storage, submission.id, grader.id).await?;
                Ok(LockedSubmission {
                    submission,
                    lock,
                    role: assessable.role,
                })
            }
            None => self.lock_next_candidate(storage, &assessable, grader).await,
        }
    }

    async fn lock_next_candidate(
        &self,
        storage: &dyn Storage,
        assessable: &AssessableExercise,
        grader: &User,
    ) -> Result<LockedSubmission> {
        let exercise = &assessable.exercise;
        ensure_due_date_over(exercise)?;

        self.ensure_below_limit(storage, grader.id).await?;

        let candidates = storage
            .list_unassessed_submission_ids(exercise.id, Some(MAX_CANDIDATE_ATTEMPTS))
            .await?;

        for submission_id in candidates {
            match self.lock_submission(storage, submission_id, grader.id).await {
                Ok(LockAcquisition::Finished(_)) => continue,
                Ok(lock) => {
                    let submission = storage
                        .get_submission_by_id(submission_id)
                        .await?
                        .ok_or_else(|| {
                            AssessmentError::not_found(format!("提交 {submission_id} 不存在"))
                        })?;
                    return Ok(LockedSubmission {
                        submission,
                        lock,
                        role: assessable.role,
                    });
                }
                Err(AssessmentError::AssessmentConflict(msg)) => {
                    warn!(
                        "Candidate submission {} taken by another grader: {}",
                        submission_id, msg
                    );
                    continue;
                }
                Err(e) => return Err(e),
            }
        }

        Err(AssessmentError::not_found(format!(
            "练习 {} 没有待评审的提交",
            exercise.id
        )))
    }

    async fn submission_in_exercise(
        &self,
        storage: &dyn Storage,
        submission_id: i64,
        exercise_id: i64,
    ) -> Result<ModelingSubmission> {
        let submission = storage
            .get_submission_by_id(submission_id)
            .await?
            .ok_or_else(|| AssessmentError::not_found(format!("提交 {submission_id} 不存在")))?;

        let participation = storage
            .get_participation_by_id(submission.participation_id)
            .await?;

        match participation.and_then(|p| p.exercise_id) {
            Some(id) if id == exercise_id => Ok(submission),
            _ => Err(AssessmentError::not_found(format!(
                "提交 {submission_id} 不属于练习 {exercise_id}"
            ))),
        }
    }
}
