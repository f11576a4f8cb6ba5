use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::ModelingSubmissionService;
use super::create::{author_response, content_of, writable_participation};
use crate::errors::{AssessmentError, Result};
use crate::models::modeling_submissions::requests::ModelingSubmissionRequest;
use crate::models::modeling_submissions::responses::ModelingSubmissionResponse;
use crate::models::users::entities::User;
use crate::services::{current_user, respond};
use crate::storage::Storage;

pub async fn update_submission(
    service: &ModelingSubmissionService,
    request: &HttpRequest,
    exercise_id: i64,
    req: ModelingSubmissionRequest,
) -> ActixResult<HttpResponse> {
    let outcome = async {
        let user = current_user(request)?;
        let storage = service.get_storage(request)?;
        update(storage.as_ref(), &user, exercise_id, req).await
    }
    .await;

    respond(outcome, "提交已更新")
}

pub(crate) async fn update(
    storage: &dyn Storage,
    user: &User,
    exercise_id: i64,
    req: ModelingSubmissionRequest,
) -> Result<ModelingSubmissionResponse> {
    let submission_id = req
        .id
        .ok_or_else(|| AssessmentError::bad_request("更新提交时必须指定 id"))?;

    let (exercise, participation) = writable_participation(storage, user, exercise_id).await?;

    let existing = storage
        .get_submission_by_id(submission_id)
        .await?
        .ok_or_else(|| AssessmentError::not_found(format!("提交 {submission_id} 不存在")))?;

    if existing.participation_id != participation.id {
        return Err(AssessmentError::forbidden(format!(
            "提交 {submission_id} 不属于您在练习 {exercise_id} 中的参与记录"
        )));
    }

    let submission = storage
        .save_submission(participation.id, content_of(req))
        .await?;

    info!(
        "User {} updated modeling submission {} (submitted: {})",
        user.id, submission.id, submission.submitted
    );

    Ok(author_response(submission, participation, exercise, user))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestContext;
    use chrono::{Duration, Utc};

    fn request(id: Option<i64>, model: &str) -> ModelingSubmissionRequest {
        ModelingSubmissionRequest {
            id,
            model: Some(model.to_string()),
            explanation_text: None,
            submitted: true,
        }
    }

    #[tokio::test]
    async fn test_update_own_submission() {
        let ctx = TestContext::new().await;
        let submission = ctx.submission_for(&ctx.open_exercise, &ctx.student, false).await;

        let response = update(
            ctx.storage.as_ref(),
            &ctx.student,
            ctx.open_exercise.id,
            request(Some(submission.id), "updated"),
        )
        .await
        .unwrap();

        assert_eq!(response.id, submission.id);
        assert_eq!(response.model.as_deref(), Some("updated"));
        assert!(response.submitted);
        assert!(response.result.is_none());
    }

    #[tokio::test]
    async fn test_update_requires_id() {
        let ctx = TestContext::new().await;
        let err = update(
            ctx.storage.as_ref(),
            &ctx.student,
            ctx.open_exercise.id,
            request(None, "x"),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AssessmentError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_cannot_update_foreign_submission() {
        let ctx = TestContext::new().await;
        let foreign = ctx.submission_for(&ctx.open_exercise, &ctx.student2, true).await;
        ctx.participation(&ctx.open_exercise, &ctx.student, Utc::now() - Duration::days(1))
            .await;

        let err = update(
            ctx.storage.as_ref(),
            &ctx.student,
            ctx.open_exercise.id,
            request(Some(foreign.id), "hijack"),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AssessmentError::Forbidden(_)));

        let stored = ctx
            .storage
            .get_submission_by_id(foreign.id)
            .await
            .unwrap()
            .unwrap();
        assert_ne!(stored.model.as_deref(), Some("hijack"));
    }
}
