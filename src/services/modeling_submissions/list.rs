use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::debug;

use super::ModelingSubmissionService;
use crate::errors::Result;
use crate::models::courses::entities::CourseRole;
use crate::models::modeling_submissions::requests::SubmissionListQuery;
use crate::models::modeling_submissions::responses::ModelingSubmissionResponse;
use crate::models::users::entities::User;
use crate::services::permissions::require_course_role;
use crate::services::{
    current_user, grader_viewer, load_aggregate, modeling_exercise, respond, submission_context,
};
use crate::storage::{Storage, SubmissionFilter};

pub async fn list_submissions(
    service: &ModelingSubmissionService,
    request: &HttpRequest,
    exercise_id: i64,
    query: SubmissionListQuery,
) -> ActixResult<HttpResponse> {
    let outcome = async {
        let user = current_user(request)?;
        let storage = service.get_storage(request)?;
        list(storage.as_ref(), &user, exercise_id, query).await
    }
    .await;

    respond(outcome, "查询成功")
}

/// 列出练习下的提交
///
/// 默认只对教师开放；`assessedByTutor=true` 时助教可查看自己评审过的提交。
pub(crate) async fn list(
    storage: &dyn Storage,
    user: &User,
    exercise_id: i64,
    query: SubmissionListQuery,
) -> Result<Vec<ModelingSubmissionResponse>> {
    let exercise = modeling_exercise(storage, exercise_id).await?;
    let assessed_by_tutor = query.assessed_by_tutor.unwrap_or(false);

    let required = if assessed_by_tutor {
        CourseRole::Tutor
    } else {
        CourseRole::Instructor
    };
    let role = require_course_role(storage, user, exercise.course_id, required).await?;

    let filter = SubmissionFilter {
        submitted_only: query.submitted_only.unwrap_or(false),
        assessed_by: assessed_by_tutor.then_some(user.id),
    };
    let submissions = storage
        .list_submissions_by_exercise(exercise.id, filter)
        .await?;

    debug!(
        "Listing {} submissions of exercise {} for user {}",
        submissions.len(),
        exercise.id,
        user.id
    );

    let viewer = grader_viewer(role);
    let mut responses = Vec::with_capacity(submissions.len());
    for submission in submissions {
        let (participation, exercise) = submission_context(storage, &submission).await?;
        let aggregate = load_aggregate(storage, submission, participation, exercise).await?;
        responses.push(ModelingSubmissionResponse::for_viewer(aggregate, viewer));
    }

    Ok(responses)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AssessmentError;
    use crate::services::assessments::lock_manager::AssessmentLockManager;
    use crate::test_utils::TestContext;

    #[tokio::test]
    async fn test_instructor_lists_all_submissions() {
        let ctx = TestContext::new().await;
        ctx.new_submission(&ctx.closed_exercise, true).await;
        ctx.new_submission(&ctx.closed_exercise, false).await;

        let all = list(
            ctx.storage.as_ref(),
            &ctx.instructor,
            ctx.closed_exercise.id,
            SubmissionListQuery::default(),
        )
        .await
        .unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.iter().all(|s| s.participation.student.is_some()));

        let submitted = list(
            ctx.storage.as_ref(),
            &ctx.instructor,
            ctx.closed_exercise.id,
            SubmissionListQuery {
                submitted_only: Some(true),
                assessed_by_tutor: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(submitted.len(), 1);
    }

    #[tokio::test]
    async fn test_listing_is_forbidden_for_tutors_and_outsiders() {
        let ctx = TestContext::new().await;
        let storage = ctx.storage.as_ref();

        for user in [&ctx.tutor, &ctx.student, &ctx.outsider] {
            let err = list(
                storage,
                user,
                ctx.closed_exercise.id,
                SubmissionListQuery::default(),
            )
            .await
            .unwrap_err();
            assert!(matches!(err, AssessmentError::Forbidden(_)));
        }
    }

    #[tokio::test]
    async fn test_tutor_lists_own_assessments_blind() {
        let ctx = TestContext::new().await;
        let storage = ctx.storage.as_ref();
        let manager = AssessmentLockManager::new(10);

        let mine = ctx.new_submission(&ctx.closed_exercise, true).await;
        let theirs = ctx.new_submission(&ctx.closed_exercise, true).await;
        manager
            .lock_submission(storage, mine.id, ctx.tutor.id)
            .await
            .unwrap();
        manager
            .lock_submission(storage, theirs.id, ctx.tutor2.id)
            .await
            .unwrap();

        let listed = list(
            storage,
            &ctx.tutor,
            ctx.closed_exercise.id,
            SubmissionListQuery {
                submitted_only: None,
                assessed_by_tutor: Some(true),
            },
        )
        .await
        .unwrap();

        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, mine.id);
        assert!(listed[0].participation.student.is_none());
        assert!(listed[0].result.is_some());
    }
}
