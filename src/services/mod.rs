pub mod assessments;
pub mod modeling_submissions;
pub mod participations;
pub mod permissions;

pub use assessments::AssessmentService;
pub use modeling_submissions::ModelingSubmissionService;
pub use participations::ParticipationService;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error};
use ts_rs::TS;

use crate::cache::ObjectCache;
use crate::errors::{AssessmentError, Result};
use crate::middlewares::RequireJWT;
use crate::models::courses::entities::CourseRole;
use crate::models::exercises::entities::Exercise;
use crate::models::modeling_submissions::entities::{ModelingSubmission, SubmissionAggregate};
use crate::models::modeling_submissions::responses::SubmissionViewer;
use crate::models::participations::entities::Participation;
use crate::models::{ApiResponse, ErrorCode};
use crate::storage::Storage;

/// 将业务错误转换为统一响应
///
/// 内部错误只记录日志，响应中不携带细节。
pub(crate) fn error_response(err: &AssessmentError) -> HttpResponse {
    let message = if err.is_internal() {
        error!("{}", err.format_simple());
        "服务器内部错误".to_string()
    } else {
        debug!("Request rejected: {}", err.format_simple());
        err.message().to_string()
    };

    HttpResponse::build(err.status_code())
        .json(ApiResponse::error_empty(ErrorCode::from(err), message))
}

/// 包装业务结果为 200 响应
pub(crate) fn respond<T: Serialize + TS>(
    outcome: Result<T>,
    message: &str,
) -> ActixResult<HttpResponse> {
    match outcome {
        Ok(data) => Ok(HttpResponse::Ok().json(ApiResponse::success(data, message))),
        Err(err) => Ok(error_response(&err)),
    }
}

/// 当前登录用户
pub(crate) fn current_user(
    request: &HttpRequest,
) -> Result<crate::models::users::entities::User> {
    RequireJWT::extract_user_claims(request)
        .ok_or_else(|| AssessmentError::authentication("未登录"))
}

pub(crate) fn storage_from_request(request: &HttpRequest) -> Result<Arc<dyn Storage>> {
    request
        .app_data::<actix_web::web::Data<Arc<dyn Storage>>>()
        .map(|data| data.get_ref().clone())
        .ok_or_else(|| AssessmentError::database_connection("Storage not found in app data"))
}

pub(crate) fn cache_from_request(request: &HttpRequest) -> Result<Arc<dyn ObjectCache>> {
    request
        .app_data::<actix_web::web::Data<Arc<dyn ObjectCache>>>()
        .map(|data| data.get_ref().clone())
        .ok_or_else(|| AssessmentError::cache_connection("Cache not found in app data"))
}

/// 评审角色对应的视角
pub(crate) fn grader_viewer(role: CourseRole) -> SubmissionViewer {
    match role {
        CourseRole::Instructor => SubmissionViewer::Instructor,
        _ => SubmissionViewer::Tutor,
    }
}

/// 读取练习，不存在时返回 404，非建模练习返回 400
pub(crate) async fn modeling_exercise(storage: &dyn Storage, exercise_id: i64) -> Result<Exercise> {
    let exercise = storage
        .get_exercise_by_id(exercise_id)
        .await?
        .ok_or_else(|| AssessmentError::not_found(format!("练习 {exercise_id} 不存在")))?;

    if !exercise.is_modeling() {
        return Err(AssessmentError::invalid_exercise_type(format!(
            "练习 {exercise_id} 不是建模练习"
        )));
    }
    Ok(exercise)
}

/// 读取提交所属的参与记录与练习
pub(crate) async fn submission_context(
    storage: &dyn Storage,
    submission: &ModelingSubmission,
) -> Result<(Participation, Exercise)> {
    let participation = storage
        .get_participation_by_id(submission.participation_id)
        .await?
        .ok_or_else(|| {
            AssessmentError::not_found(format!(
                "提交 {} 的参与记录不存在",
                submission.id
            ))
        })?;

    let exercise_id = participation.exercise_id.ok_or_else(|| {
        AssessmentError::bad_request(format!("参与记录 {} 未关联练习", participation.id))
    })?;

    let exercise = storage
        .get_exercise_by_id(exercise_id)
        .await?
        .ok_or_else(|| AssessmentError::not_found(format!("练习 {exercise_id} 不存在")))?;

    Ok((participation, exercise))
}

/// 补全提交的学生、评审结果与评审人
pub(crate) async fn load_aggregate(
    storage: &dyn Storage,
    submission: ModelingSubmission,
    participation: Participation,
    exercise: Exercise,
) -> Result<SubmissionAggregate> {
    let student = storage.get_user_by_id(participation.student_id).await?;
    let result = storage.get_result_by_submission_id(submission.id).await?;
    let assessor = match result.as_ref().and_then(|r| r.assessor_id) {
        Some(id) => storage.get_user_by_id(id).await?,
        None => None,
    };

    Ok(SubmissionAggregate {
        submission,
        participation,
        exercise,
        student,
        result,
        assessor,
    })
}
