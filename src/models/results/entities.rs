use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 评审结果
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "result.ts")]
pub struct AssessmentResult {
    pub id: i64,
    pub submission_id: i64,
    pub participation_id: i64,
    pub assessor_id: Option<i64>,
    pub score: Option<f64>,
    pub rated: bool,
    pub completion_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AssessmentResult {
    pub fn is_finished(&self) -> bool {
        self.completion_date.is_some()
    }

    /// 是否为 `assessor_id` 持有的评审锁
    pub fn is_locked_by(&self, assessor_id: i64) -> bool {
        !self.is_finished() && self.assessor_id == Some(assessor_id)
    }
}

/// 加锁的结果
#[derive(Debug, Clone)]
pub enum LockAcquisition {
    /// 新建了未完成的评审结果
    Acquired(AssessmentResult),
    /// 评审人已持有该提交的锁
    AlreadyHeld(AssessmentResult),
    /// 评审已完成，不再加锁
    Finished(AssessmentResult),
}

impl LockAcquisition {
    pub fn into_result(self) -> AssessmentResult {
        match self {
            LockAcquisition::Acquired(r)
            | LockAcquisition::AlreadyHeld(r)
            | LockAcquisition::Finished(r) => r,
        }
    }
}
