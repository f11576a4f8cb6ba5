pub mod require_jwt;

pub use require_jwt::RequireJWT;

use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use actix_web::http::header::CONTENT_TYPE;

use crate::models::{ApiResponse, ErrorCode};

// 辅助函数：创建中间件错误响应
pub(crate) fn create_error_response(status: StatusCode, message: &str) -> HttpResponse {
    match status {
        StatusCode::NO_CONTENT => HttpResponse::build(status)
            .insert_header((CONTENT_TYPE, "text/plain; charset=utf-8"))
            .finish(),
        StatusCode::UNAUTHORIZED => HttpResponse::build(status).json(
            ApiResponse::error_empty(ErrorCode::Unauthorized, message),
        ),
        _ => HttpResponse::build(status).json(ApiResponse::error_empty(
            ErrorCode::Forbidden,
            message,
        )),
    }
}
