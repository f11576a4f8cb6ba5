use serde::Deserialize;
use ts_rs::TS;

// 保存评审请求
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "result.ts")]
pub struct SaveAssessmentRequest {
    pub score: f64,
}

// 保存评审查询参数
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "result.ts")]
pub struct SaveAssessmentQuery {
    /// true 表示提交评审并释放锁
    pub submit: Option<bool>,
}
