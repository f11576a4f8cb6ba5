use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::Utc;
use tracing::info;

use super::ModelingSubmissionService;
use crate::errors::{AssessmentError, Result};
use crate::models::courses::entities::CourseRole;
use crate::models::exercises::entities::Exercise;
use crate::models::modeling_submissions::entities::{ModelingSubmission, SubmissionAggregate};
use crate::models::modeling_submissions::requests::ModelingSubmissionRequest;
use crate::models::modeling_submissions::responses::ModelingSubmissionResponse;
use crate::models::participations::entities::Participation;
use crate::models::users::entities::User;
use crate::services::permissions::require_course_role;
use crate::services::{current_user, modeling_exercise, respond};
use crate::storage::{Storage, SubmissionContent};

pub async fn create_submission(
    service: &ModelingSubmissionService,
    request: &HttpRequest,
    exercise_id: i64,
    req: ModelingSubmissionRequest,
) -> ActixResult<HttpResponse> {
    let outcome = async {
        let user = current_user(request)?;
        let storage = service.get_storage(request)?;
        create(storage.as_ref(), &user, exercise_id, req).await
    }
    .await;

    respond(outcome, "提交已保存")
}

pub(crate) async fn create(
    storage: &dyn Storage,
    user: &User,
    exercise_id: i64,
    req: ModelingSubmissionRequest,
) -> Result<ModelingSubmissionResponse> {
    if req.id.is_some() {
        return Err(AssessmentError::bad_request("新建提交时不能指定 id"));
    }

    let (exercise, participation) = writable_participation(storage, user, exercise_id).await?;
    let submission = storage
        .save_submission(participation.id, content_of(req))
        .await?;

    info!(
        "User {} saved modeling submission {} for exercise {} (submitted: {})",
        user.id, submission.id, exercise.id, submission.submitted
    );

    Ok(author_response(submission, participation, exercise, user))
}

/// 写入前的检查：建模练习、课程成员、参与记录存在且未过截止时间
pub(super) async fn writable_participation(
    storage: &dyn Storage,
    user: &User,
    exercise_id: i64,
) -> Result<(Exercise, Participation)> {
    let exercise = modeling_exercise(storage, exercise_id).await?;
    require_course_role(storage, user, exercise.course_id, CourseRole::Student).await?;

    let participation = storage
        .get_participation_by_exercise_and_student(exercise.id, user.id)
        .await?
        .ok_or_else(|| {
            AssessmentError::not_found(format!("您尚未开始练习 {}", exercise.id))
        })?;

    if !participation.may_submit(exercise.due_date, Utc::now()) {
        return Err(AssessmentError::submission_closed(format!(
            "练习 {} 已过截止时间",
            exercise.id
        )));
    }

    Ok((exercise, participation))
}

// 请求体中的 result 不会进入存储层
pub(super) fn content_of(req: ModelingSubmissionRequest) -> SubmissionContent {
    SubmissionContent {
        model: req.model,
        explanation_text: req.explanation_text,
        submitted: req.submitted,
    }
}

pub(super) fn author_response(
    submission: ModelingSubmission,
    participation: Participation,
    exercise: Exercise,
    author: &User,
) -> ModelingSubmissionResponse {
    ModelingSubmissionResponse::for_author_without_result(SubmissionAggregate {
        submission,
        participation,
        exercise,
        student: Some(author.clone()),
        result: None,
        assessor: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestContext;
    use chrono::Duration;

    fn request(model: &str, submitted: bool) -> ModelingSubmissionRequest {
        ModelingSubmissionRequest {
            id: None,
            model: Some(model.to_string()),
            explanation_text: Some("explanation".to_string()),
            submitted,
        }
    }

    #[tokio::test]
    async fn test_create_submission() {
        let ctx = TestContext::new().await;
        ctx.participation(&ctx.open_exercise, &ctx.student, Utc::now() - Duration::days(1))
            .await;

        let response = create(
            ctx.storage.as_ref(),
            &ctx.student,
            ctx.open_exercise.id,
            request("{\"v\":1}", true),
        )
        .await
        .unwrap();

        assert!(response.submitted);
        assert!(response.submission_date.is_some());
        assert!(response.result.is_none());
        assert_eq!(response.model.as_deref(), Some("{\"v\":1}"));
    }

    #[tokio::test]
    async fn test_resubmission_replaces_content() {
        let ctx = TestContext::new().await;
        ctx.participation(&ctx.open_exercise, &ctx.student, Utc::now() - Duration::days(1))
            .await;
        let storage = ctx.storage.as_ref();

        let first = create(storage, &ctx.student, ctx.open_exercise.id, request("a", false))
            .await
            .unwrap();
        let second = create(storage, &ctx.student, ctx.open_exercise.id, request("b", true))
            .await
            .unwrap();

        assert_eq!(first.id, second.id);
        let stored = storage.get_submission_by_id(first.id).await.unwrap().unwrap();
        assert_eq!(stored.model.as_deref(), Some("b"));
        assert!(stored.submitted);
    }

    #[tokio::test]
    async fn test_create_with_id_is_rejected() {
        let ctx = TestContext::new().await;
        let mut req = request("a", true);
        req.id = Some(1);

        let err = create(ctx.storage.as_ref(), &ctx.student, ctx.open_exercise.id, req)
            .await
            .unwrap_err();
        assert!(matches!(err, AssessmentError::BadRequest(_)));
    }

    #[tokio::test]
    async fn test_create_requires_participation() {
        let ctx = TestContext::new().await;
        let err = create(
            ctx.storage.as_ref(),
            &ctx.student,
            ctx.open_exercise.id,
            request("a", true),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AssessmentError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_due_date_gate() {
        let ctx = TestContext::new().await;
        let storage = ctx.storage.as_ref();

        // 截止前开始的参与在截止后被拒绝
        ctx.participation(&ctx.closed_exercise, &ctx.student, Utc::now() - Duration::days(2))
            .await;
        let err = create(storage, &ctx.student, ctx.closed_exercise.id, request("a", true))
            .await
            .unwrap_err();
        assert!(matches!(err, AssessmentError::SubmissionClosed(_)));

        // 截止后才开始的参与不受限制
        ctx.participation(&ctx.closed_exercise, &ctx.student2, Utc::now())
            .await;
        let response = create(storage, &ctx.student2, ctx.closed_exercise.id, request("a", true))
            .await
            .unwrap();
        assert!(response.submitted);
    }

    #[tokio::test]
    async fn test_create_checks_exercise_and_membership() {
        let ctx = TestContext::new().await;
        let storage = ctx.storage.as_ref();

        let err = create(storage, &ctx.student, ctx.text_exercise.id, request("a", true))
            .await
            .unwrap_err();
        assert!(matches!(err, AssessmentError::InvalidExerciseType(_)));

        let err = create(storage, &ctx.student, 9999, request("a", true))
            .await
            .unwrap_err();
        assert!(matches!(err, AssessmentError::NotFound(_)));

        let err = create(storage, &ctx.outsider, ctx.open_exercise.id, request("a", true))
            .await
            .unwrap_err();
        assert!(matches!(err, AssessmentError::Forbidden(_)));
    }
}
