use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::models::exercises::entities::Exercise;
use crate::models::participations::entities::Participation;
use crate::models::results::entities::AssessmentResult;
use crate::models::users::entities::User;

// 建模提交，model 为图编辑器导出的 JSON 文本，服务端不解析
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export, export_to = "modeling_submission.ts")]
pub struct ModelingSubmission {
    pub id: i64,
    pub participation_id: i64,
    pub model: Option<String>,
    pub explanation_text: Option<String>,
    pub submitted: bool,
    pub submission_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 提交及其关联数据，用于构建对外视图
#[derive(Debug, Clone)]
pub struct SubmissionAggregate {
    pub submission: ModelingSubmission,
    pub participation: Participation,
    pub exercise: Exercise,
    pub student: Option<User>,
    pub result: Option<AssessmentResult>,
    pub assessor: Option<User>,
}
