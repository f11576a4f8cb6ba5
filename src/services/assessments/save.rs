use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::AssessmentService;
use crate::errors::{AssessmentError, Result};
use crate::models::courses::entities::CourseRole;
use crate::models::results::entities::AssessmentResult;
use crate::models::results::requests::SaveAssessmentRequest;
use crate::models::users::entities::User;
use crate::services::permissions::require_course_role;
use crate::services::{current_user, respond, submission_context};
use crate::storage::Storage;

pub async fn save_assessment(
    service: &AssessmentService,
    request: &HttpRequest,
    submission_id: i64,
    req: SaveAssessmentRequest,
    submit: bool,
) -> ActixResult<HttpResponse> {
    let outcome = async {
        let user = current_user(request)?;
        let storage = service.get_storage(request)?;
        save(storage.as_ref(), &user, submission_id, req.score, submit).await
    }
    .await;

    let message = if submit { "评审已提交" } else { "评审已保存" };
    respond(outcome, message)
}

/// 保存分数，`submit` 为 true 时完成评审并释放锁
///
/// 进行中的评审只有锁持有人或教师可以保存；已完成的评审只有教师可以修改。
pub(crate) async fn save(
    storage: &dyn Storage,
    user: &User,
    submission_id: i64,
    score: f64,
    submit: bool,
) -> Result<AssessmentResult> {
    let submission = storage
        .get_submission_by_id(submission_id)
        .await?
        .ok_or_else(|| AssessmentError::not_found(format!("提交 {submission_id} 不存在")))?;
    let (_, exercise) = submission_context(storage, &submission).await?;

    let role = require_course_role(storage, user, exercise.course_id, CourseRole::Tutor).await?;
    let is_instructor = role.at_least(CourseRole::Instructor);

    let result = storage
        .get_result_by_submission_id(submission.id)
        .await?
        .ok_or_else(|| {
            AssessmentError::bad_request(format!("提交 {submission_id} 没有进行中的评审"))
        })?;

    if result.is_finished() {
        if !is_instructor {
            return Err(AssessmentError::bad_request(format!(
                "提交 {submission_id} 的评审已完成，只有教师可以修改"
            )));
        }
    } else if !result.is_locked_by(user.id) && !is_instructor {
        return Err(AssessmentError::forbidden(format!(
            "提交 {submission_id} 正在由其他评审人评审"
        )));
    }

    if !score.is_finite() || score < 0.0 || score > exercise.max_score {
        return Err(AssessmentError::validation(format!(
            "分数必须在 0 到 {} 之间",
            exercise.max_score
        )));
    }

    let saved = storage
        .save_assessment(result.id, user.id, score, submit)
        .await?
        .ok_or_else(|| AssessmentError::not_found(format!("评审结果 {} 不存在", result.id)))?;

    if submit {
        info!(
            "User {} submitted assessment {} for submission {} (score: {}), lock released",
            user.id, saved.id, submission_id, score
        );
    } else {
        info!(
            "User {} saved assessment {} for submission {}",
            user.id, saved.id, submission_id
        );
    }

    Ok(saved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::assessments::lock_manager::AssessmentLockManager;
    use crate::test_utils::TestContext;

    #[tokio::test]
    async fn test_submit_releases_lock() {
        let ctx = TestContext::new().await;
        let manager = AssessmentLockManager::new(10);
        let storage = ctx.storage.as_ref();
        let submission = ctx.new_submission(&ctx.closed_exercise, true).await;
        manager
            .lock_submission(storage, submission.id, ctx.tutor.id)
            .await
            .unwrap();

        let draft = save(storage, &ctx.tutor, submission.id, 4.0, false)
            .await
            .unwrap();
        assert_eq!(draft.score, Some(4.0));
        assert!(!draft.is_finished());
        assert_eq!(manager.lock_count(storage, ctx.tutor.id).await.unwrap(), 1);

        let done = save(storage, &ctx.tutor, submission.id, 6.0, true)
            .await
            .unwrap();
        assert!(done.is_finished());
        assert!(done.rated);
        assert_eq!(done.assessor_id, Some(ctx.tutor.id));
        assert_eq!(manager.lock_count(storage, ctx.tutor.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_only_lock_holder_or_instructor_may_save() {
        let ctx = TestContext::new().await;
        let manager = AssessmentLockManager::new(10);
        let storage = ctx.storage.as_ref();
        let submission = ctx.new_submission(&ctx.closed_exercise, true).await;
        manager
            .lock_submission(storage, submission.id, ctx.tutor.id)
            .await
            .unwrap();

        let err = save(storage, &ctx.tutor2, submission.id, 5.0, false)
            .await
            .unwrap_err();
        assert!(matches!(err, AssessmentError::Forbidden(_)));

        let err = save(storage, &ctx.student, submission.id, 5.0, false)
            .await
            .unwrap_err();
        assert!(matches!(err, AssessmentError::Forbidden(_)));

        // 教师保存时不改变锁的持有人
        let saved = save(storage, &ctx.instructor, submission.id, 5.0, false)
            .await
            .unwrap();
        assert_eq!(saved.assessor_id, Some(ctx.tutor.id));
    }

    #[tokio::test]
    async fn test_finished_assessment_is_instructor_only() {
        let ctx = TestContext::new().await;
        let manager = AssessmentLockManager::new(10);
        let storage = ctx.storage.as_ref();
        let submission = ctx.new_submission(&ctx.closed_exercise, true).await;
        manager
            .lock_submission(storage, submission.id, ctx.tutor.id)
            .await
            .unwrap();
        save(storage, &ctx.tutor, submission.id, 6.0, true)
            .await
            .unwrap();

        let err = save(storage, &ctx.tutor, submission.id, 7.0, true)
            .await
            .unwrap_err();
        assert!(matches!(err, AssessmentError::BadRequest(_)));

        let overridden = save(storage, &ctx.instructor, submission.id, 7.0, true)
            .await
            .unwrap();
        assert_eq!(overridden.score, Some(7.0));
        assert!(overridden.is_finished());
    }

    #[tokio::test]
    async fn test_score_range_and_missing_assessment() {
        let ctx = TestContext::new().await;
        let manager = AssessmentLockManager::new(10);
        let storage = ctx.storage.as_ref();
        let submission = ctx.new_submission(&ctx.closed_exercise, true).await;

        let err = save(storage, &ctx.tutor, submission.id, 5.0, false)
            .await
            .unwrap_err();
        assert!(matches!(err, AssessmentError::BadRequest(_)));

        manager
            .lock_submission(storage, submission.id, ctx.tutor.id)
            .await
            .unwrap();
        for score in [-1.0, ctx.closed_exercise.max_score + 1.0, f64::NAN] {
            let err = save(storage, &ctx.tutor, submission.id, score, false)
                .await
                .unwrap_err();
            assert!(matches!(err, AssessmentError::Validation(_)));
        }
    }
}
