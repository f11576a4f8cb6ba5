use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::ModelingSubmissionService;
use crate::errors::{AssessmentError, Result};
use crate::models::modeling_submissions::responses::ModelingSubmissionResponse;
use crate::models::users::entities::User;
use crate::services::assessments::lock_manager::{AssessmentLockManager, LOCK_MANAGER};
use crate::services::{current_user, grader_viewer, load_aggregate, respond, submission_context};
use crate::storage::Storage;

pub async fn get_submission(
    service: &ModelingSubmissionService,
    request: &HttpRequest,
    submission_id: i64,
) -> ActixResult<HttpResponse> {
    let outcome = async {
        let user = current_user(request)?;
        let storage = service.get_storage(request)?;
        open_for_assessment(&LOCK_MANAGER, storage.as_ref(), &user, submission_id).await
    }
    .await;

    respond(outcome, "查询成功")
}

/// 评审人直接打开一份提交，必要时为其加锁
pub(crate) async fn open_for_assessment(
    manager: &AssessmentLockManager,
    storage: &dyn Storage,
    user: &User,
    submission_id: i64,
) -> Result<ModelingSubmissionResponse> {
    let submission = storage
        .get_submission_by_id(submission_id)
        .await?
        .ok_or_else(|| AssessmentError::not_found(format!("提交 {submission_id} 不存在")))?;
    let (participation, exercise) = submission_context(storage, &submission).await?;

    let locked = manager
        .acquire_next_submission_for_assessment(storage, exercise.id, user, Some(submission.id))
        .await?;

    let aggregate = load_aggregate(storage, locked.submission, participation, exercise).await?;

    Ok(ModelingSubmissionResponse::for_viewer(
        aggregate,
        grader_viewer(locked.role),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestContext;

    #[tokio::test]
    async fn test_tutor_opens_and_locks_submission() {
        let ctx = TestContext::new().await;
        let manager = AssessmentLockManager::new(10);
        let submission = ctx.new_submission(&ctx.closed_exercise, true).await;

        let response = open_for_assessment(&manager, ctx.storage.as_ref(), &ctx.tutor, submission.id)
            .await
            .unwrap();

        let result = response.result.expect("lock creates a result");
        assert!(result.completion_date.is_none());
        assert_eq!(result.assessor.map(|a| a.id), Some(ctx.tutor.id));
        assert!(response.participation.student.is_none());
        assert_eq!(
            manager
                .lock_count(ctx.storage.as_ref(), ctx.tutor.id)
                .await
                .unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn test_students_cannot_open_submissions() {
        let ctx = TestContext::new().await;
        let manager = AssessmentLockManager::new(10);
        let submission = ctx.submission_for(&ctx.closed_exercise, &ctx.student, true).await;

        // 即使是自己的提交也不能通过评审入口打开
        for user in [&ctx.student, &ctx.student2, &ctx.outsider] {
            let err = open_for_assessment(&manager, ctx.storage.as_ref(), user, submission.id)
                .await
                .unwrap_err();
            assert!(matches!(err, AssessmentError::Forbidden(_)));
        }
    }

    #[tokio::test]
    async fn test_open_at_cap_is_rejected() {
        let ctx = TestContext::new().await;
        let manager = AssessmentLockManager::new(1);
        let storage = ctx.storage.as_ref();
        let first = ctx.new_submission(&ctx.closed_exercise, true).await;
        let second = ctx.new_submission(&ctx.closed_exercise, true).await;

        open_for_assessment(&manager, storage, &ctx.tutor, first.id)
            .await
            .unwrap();
        // 重新打开已持有的锁不受上限影响
        open_for_assessment(&manager, storage, &ctx.tutor, first.id)
            .await
            .unwrap();

        let err = open_for_assessment(&manager, storage, &ctx.tutor, second.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AssessmentError::LockLimitExceeded(_)));
    }

    #[tokio::test]
    async fn test_missing_submission() {
        let ctx = TestContext::new().await;
        let manager = AssessmentLockManager::new(10);
        let err = open_for_assessment(&manager, ctx.storage.as_ref(), &ctx.tutor, 4242)
            .await
            .unwrap_err();
        assert!(matches!(err, AssessmentError::NotFound(_)));
    }
}
