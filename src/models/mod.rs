pub mod common;
pub mod courses;
pub mod exercises;
pub mod modeling_submissions;
pub mod participations;
pub mod results;
pub mod users;

pub use common::response::ApiResponse;

use serde::{Deserialize, Serialize};

use crate::errors::AssessmentError;

/// 程序启动时间
#[derive(Debug, Clone)]
pub struct AppStartTime {
    pub start_datetime: chrono::DateTime<chrono::Utc>,
}

/// 响应体中的业务错误码
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    Success = 0,

    // 通用错误
    BadRequest = 1000,
    Unauthorized = 1001,
    Forbidden = 1003,
    NotFound = 1004,
    Conflict = 1009,
    InternalServerError = 1500,

    // 课程相关
    CoursePermissionDenied = 2001,

    // 练习相关
    ExerciseNotFound = 3000,
    InvalidExerciseType = 3001,
    ParticipationNotFound = 3002,
    ParticipationInvalid = 3003,

    // 提交相关
    SubmissionNotFound = 4000,
    SubmissionClosed = 4001,
    SubmissionInvalid = 4002,

    // 评审相关
    AssessmentLockLimitExceeded = 5000,
    AssessmentLocked = 5001,
    AssessmentNotFound = 5002,
    AssessmentInvalid = 5003,
}

impl From<&AssessmentError> for ErrorCode {
    fn from(err: &AssessmentError) -> Self {
        match err {
            AssessmentError::Validation(_) | AssessmentError::BadRequest(_) => {
                ErrorCode::BadRequest
            }
            AssessmentError::Authentication(_) => ErrorCode::Unauthorized,
            AssessmentError::Forbidden(_) => ErrorCode::CoursePermissionDenied,
            AssessmentError::NotFound(_) => ErrorCode::NotFound,
            AssessmentError::InvalidExerciseType(_) => ErrorCode::InvalidExerciseType,
            AssessmentError::SubmissionClosed(_) => ErrorCode::SubmissionClosed,
            AssessmentError::LockLimitExceeded(_) => ErrorCode::AssessmentLockLimitExceeded,
            AssessmentError::AssessmentConflict(_) => ErrorCode::AssessmentLocked,
            _ => ErrorCode::InternalServerError,
        }
    }
}
