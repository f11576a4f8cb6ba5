use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::AssessmentService;
use crate::errors::{AssessmentError, Result};
use crate::models::courses::entities::CourseRole;
use crate::models::users::entities::User;
use crate::models::ApiResponse;
use crate::services::permissions::require_course_role;
use crate::services::{current_user, error_response, submission_context};
use crate::storage::Storage;

pub async fn cancel_assessment(
    service: &AssessmentService,
    request: &HttpRequest,
    submission_id: i64,
) -> ActixResult<HttpResponse> {
    let outcome = async {
        let user = current_user(request)?;
        let storage = service.get_storage(request)?;
        cancel(storage.as_ref(), &user, submission_id).await
    }
    .await;

    match outcome {
        Ok(()) => Ok(HttpResponse::Ok().json(ApiResponse::success_empty("评审已取消"))),
        Err(err) => Ok(error_response(&err)),
    }
}

/// 取消进行中的评审，删除未完成的结果并释放锁
pub(crate) async fn cancel(storage: &dyn Storage, user: &User, submission_id: i64) -> Result<()> {
    let submission = storage
        .get_submission_by_id(submission_id)
        .await?
        .ok_or_else(|| AssessmentError::not_found(format!("提交 {submission_id} 不存在")))?;
    let (_, exercise) = submission_context(storage, &submission).await?;

    let role = require_course_role(storage, user, exercise.course_id, CourseRole::Tutor).await?;

    let result = storage
        .get_result_by_submission_id(submission.id)
        .await?
        .filter(|r| !r.is_finished())
        .ok_or_else(|| {
            AssessmentError::bad_request(format!("提交 {submission_id} 没有进行中的评审"))
        })?;

    if !result.is_locked_by(user.id) && !role.at_least(CourseRole::Instructor) {
        return Err(AssessmentError::forbidden(format!(
            "只有锁持有人或教师可以取消提交 {submission_id} 的评审"
        )));
    }

    if !storage.cancel_assessment(result.id).await? {
        return Err(AssessmentError::bad_request(format!(
            "提交 {submission_id} 没有进行中的评审"
        )));
    }

    info!(
        "User {} cancelled assessment {} of submission {}, lock released",
        user.id, result.id, submission_id
    );
    Ok(())
}
