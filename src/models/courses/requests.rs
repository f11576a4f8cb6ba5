use serde::Deserialize;
use ts_rs::TS;

// 课程创建请求（由课程管理服务写入）
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "course.ts")]
pub struct CreateCourseRequest {
    pub title: String,
    pub description: Option<String>,
}
