use serde::Deserialize;
use ts_rs::TS;

// 创建/更新建模提交请求
// 请求体中的 result 等其他字段会被忽略
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "modeling_submission.ts")]
pub struct ModelingSubmissionRequest {
    /// 创建时必须为空，更新时必须存在
    pub id: Option<i64>,
    pub model: Option<String>,
    pub explanation_text: Option<String>,
    #[serde(default)]
    pub submitted: bool,
}

// 提交列表查询参数
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "modeling_submission.ts")]
pub struct SubmissionListQuery {
    pub submitted_only: Option<bool>,
    /// 仅返回当前评审人评审过的提交
    pub assessed_by_tutor: Option<bool>,
}

// 获取下一份待评审提交的查询参数
#[derive(Debug, Clone, Default, Deserialize, TS)]
#[ts(export, export_to = "modeling_submission.ts")]
pub struct NextSubmissionQuery {
    pub lock: Option<bool>,
}
