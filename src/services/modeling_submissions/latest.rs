use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::debug;

use super::ModelingSubmissionService;
use crate::errors::{AssessmentError, Result};
use crate::models::courses::entities::CourseRole;
use crate::models::modeling_submissions::responses::{
    ModelingSubmissionResponse, SubmissionViewer,
};
use crate::models::users::entities::User;
use crate::services::permissions::course_role;
use crate::services::{current_user, grader_viewer, load_aggregate, modeling_exercise, respond};
use crate::storage::{Storage, SubmissionContent};

pub async fn get_latest_submission(
    service: &ModelingSubmissionService,
    request: &HttpRequest,
    participation_id: i64,
) -> ActixResult<HttpResponse> {
    let outcome = async {
        let user = current_user(request)?;
        let storage = service.get_storage(request)?;
        latest(storage.as_ref(), &user, participation_id).await
    }
    .await;

    respond(outcome, "查询成功")
}

/// 获取参与记录的最新提交，没有提交时创建一份空提交
pub(crate) async fn latest(
    storage: &dyn Storage,
    user: &User,
    participation_id: i64,
) -> Result<ModelingSubmissionResponse> {
    let participation = storage
        .get_participation_by_id(participation_id)
        .await?
        .ok_or_else(|| {
            AssessmentError::not_found(format!("参与记录 {participation_id} 不存在"))
        })?;

    let exercise_id = participation.exercise_id.ok_or_else(|| {
        AssessmentError::bad_request(format!("参与记录 {participation_id} 未关联练习"))
    })?;
    let exercise = modeling_exercise(storage, exercise_id).await?;

    let viewer = if participation.student_id == user.id {
        SubmissionViewer::Student
    } else {
        match course_role(storage, user, exercise.course_id).await? {
            Some(role) if role.at_least(CourseRole::Tutor) => grader_viewer(role),
            _ => {
                return Err(AssessmentError::forbidden(format!(
                    "无权查看参与记录 {participation_id}"
                )));
            }
        }
    };

    let submission = match storage
        .get_submission_by_participation_id(participation.id)
        .await?
    {
        Some(submission) => submission,
        None => {
            debug!(
                "Creating empty submission for participation {}",
                participation.id
            );
            storage
                .save_submission(
                    participation.id,
                    SubmissionContent {
                        model: None,
                        explanation_text: None,
                        submitted: false,
                    },
                )
                .await?
        }
    };

    let aggregate = load_aggregate(storage, submission, participation, exercise).await?;
    Ok(ModelingSubmissionResponse::for_viewer(aggregate, viewer))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::assessments::lock_manager::AssessmentLockManager;
    use crate::test_utils::TestContext;
    use chrono::{Duration, Utc};

    #[tokio::test]
    async fn test_latest_creates_empty_submission() {
        let ctx = TestContext::new().await;
        let participation = ctx
            .participation(&ctx.open_exercise, &ctx.student, Utc::now())
            .await;

        let response = latest(ctx.storage.as_ref(), &ctx.student, participation.id)
            .await
            .unwrap();
        assert!(!response.submitted);
        assert!(response.model.is_none());
        assert!(response.result.is_none());

        // 再次获取返回同一份提交
        let again = latest(ctx.storage.as_ref(), &ctx.student, participation.id)
            .await
            .unwrap();
        assert_eq!(again.id, response.id);
    }

    #[tokio::test]
    async fn test_student_sees_only_finished_result_without_assessor() {
        let ctx = TestContext::new().await;
        let storage = ctx.storage.as_ref();
        let manager = AssessmentLockManager::new(10);
        let submission = ctx.submission_for(&ctx.closed_exercise, &ctx.student, true).await;
        let participation_id = submission.participation_id;

        let result = manager
            .lock_submission(storage, submission.id, ctx.tutor.id)
            .await
            .unwrap()
            .into_result();

        let response = latest(storage, &ctx.student, participation_id).await.unwrap();
        assert!(response.result.is_none());

        storage
            .save_assessment(result.id, ctx.tutor.id, 7.5, true)
            .await
            .unwrap();

        let response = latest(storage, &ctx.student, participation_id).await.unwrap();
        let result = response.result.expect("finished result is visible");
        assert_eq!(result.score, Some(7.5));
        assert!(result.assessor.is_none());
        assert!(response.participation.exercise.grading_instructions.is_none());
    }

    #[tokio::test]
    async fn test_other_student_is_forbidden() {
        let ctx = TestContext::new().await;
        let submission = ctx.submission_for(&ctx.open_exercise, &ctx.student, true).await;

        let err = latest(ctx.storage.as_ref(), &ctx.student2, submission.participation_id)
            .await
            .unwrap_err();
        assert!(matches!(err, AssessmentError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_tutor_view_is_blind() {
        let ctx = TestContext::new().await;
        let submission = ctx.submission_for(&ctx.open_exercise, &ctx.student, true).await;

        let response = latest(ctx.storage.as_ref(), &ctx.tutor, submission.participation_id)
            .await
            .unwrap();
        assert_eq!(response.id, submission.id);
        assert!(response.participation.student.is_none());
        assert!(response.participation.exercise.grading_instructions.is_some());
    }

    #[tokio::test]
    async fn test_broken_participation() {
        let ctx = TestContext::new().await;
        let storage = ctx.storage.as_ref();

        let orphan = storage
            .create_participation(None, ctx.student.id, Utc::now() - Duration::days(1))
            .await
            .unwrap();
        let err = latest(storage, &ctx.student, orphan.id).await.unwrap_err();
        assert!(matches!(err, AssessmentError::BadRequest(_)));

        let text = ctx
            .participation(&ctx.text_exercise, &ctx.student, Utc::now())
            .await;
        let err = latest(storage, &ctx.student, text.id).await.unwrap_err();
        assert!(matches!(err, AssessmentError::InvalidExerciseType(_)));

        let err = latest(storage, &ctx.student, 9999).await.unwrap_err();
        assert!(matches!(err, AssessmentError::NotFound(_)));
    }
}
