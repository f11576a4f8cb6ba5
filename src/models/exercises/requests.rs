use chrono::{DateTime, Utc};
use serde::Deserialize;
use ts_rs::TS;

use super::entities::{DiagramType, ExerciseType};

// 练习创建请求（由练习管理服务写入）
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "exercise.ts")]
pub struct CreateExerciseRequest {
    pub course_id: i64,
    pub title: String,
    pub exercise_type: ExerciseType,
    pub diagram_type: Option<DiagramType>,
    pub max_score: f64,
    pub due_date: Option<DateTime<Utc>>,
    pub grading_instructions: Option<String>,
    pub sample_solution_model: Option<String>,
    pub sample_solution_explanation: Option<String>,
}
