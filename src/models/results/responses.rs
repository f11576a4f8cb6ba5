use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

// 当前评审人持有的锁
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "result.ts")]
pub struct LockedSubmissionItem {
    pub submission_id: i64,
    pub exercise_id: Option<i64>,
    pub result_id: i64,
    pub locked_since: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "result.ts")]
pub struct LockedSubmissionsResponse {
    pub items: Vec<LockedSubmissionItem>,
    pub lock_count: u64,
    pub lock_limit: u64,
}
