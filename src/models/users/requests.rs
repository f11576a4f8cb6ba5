use super::entities::UserRole;
use serde::Deserialize;
use ts_rs::TS;

// 用户同步请求（身份服务写入本地用户表）
#[derive(Debug, Clone, Deserialize, TS)]
#[ts(export, export_to = "user.ts")]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub display_name: Option<String>,
    pub role: UserRole,
}
