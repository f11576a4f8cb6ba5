use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 参与记录：学生与练习的关联
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "participation.ts")]
pub struct Participation {
    pub id: i64,
    // 为空表示关联损坏
    pub exercise_id: Option<i64>,
    pub student_id: i64,
    pub initialization_date: DateTime<Utc>,
}

impl Participation {
    /// 截止后是否仍允许提交
    ///
    /// 截止时间前开始的参与在截止后关闭，截止后才开始的参与不受限制。
    pub fn may_submit(&self, due_date: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        match due_date {
            None => true,
            Some(due) => now <= due || self.initialization_date > due,
        }
    }
}
