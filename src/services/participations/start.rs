use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use chrono::Utc;
use tracing::info;

use super::ParticipationService;
use crate::errors::{AssessmentError, Result};
use crate::models::courses::entities::CourseRole;
use crate::models::participations::entities::Participation;
use crate::models::users::entities::User;
use crate::services::permissions::require_course_role;
use crate::services::{current_user, respond};
use crate::storage::Storage;

pub async fn start_exercise(
    service: &ParticipationService,
    request: &HttpRequest,
    exercise_id: i64,
) -> ActixResult<HttpResponse> {
    let outcome = async {
        let user = current_user(request)?;
        let storage = service.get_storage(request)?;
        start(storage.as_ref(), &user, exercise_id).await
    }
    .await;

    respond(outcome, "练习已开始")
}

/// 开始练习，已有参与记录时直接返回
pub(crate) async fn start(
    storage: &dyn Storage,
    user: &User,
    exercise_id: i64,
) -> Result<Participation> {
    let exercise = storage
        .get_exercise_by_id(exercise_id)
        .await?
        .ok_or_else(|| AssessmentError::not_found(format!("练习 {exercise_id} 不存在")))?;

    require_course_role(storage, user, exercise.course_id, CourseRole::Student).await?;

    if let Some(existing) = storage
        .get_participation_by_exercise_and_student(exercise.id, user.id)
        .await?
    {
        return Ok(existing);
    }

    let participation = storage
        .create_participation(Some(exercise.id), user.id, Utc::now())
        .await?;
    info!(
        "User {} started exercise {} (participation {})",
        user.id, exercise.id, participation.id
    );
    Ok(participation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestContext;

    #[tokio::test]
    async fn test_start_is_idempotent() {
        let ctx = TestContext::new().await;
        let storage = ctx.storage.as_ref();

        let first = start(storage, &ctx.student, ctx.open_exercise.id)
            .await
            .unwrap();
        let second = start(storage, &ctx.student, ctx.open_exercise.id)
            .await
            .unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(first.exercise_id, Some(ctx.open_exercise.id));
        assert_eq!(first.student_id, ctx.student.id);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_starts_share_one_participation() {
        let ctx = TestContext::file_backed(4).await;

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let storage = ctx.storage.clone();
                let student = ctx.student.clone();
                let exercise_id = ctx.open_exercise.id;
                tokio::spawn(async move { start(storage.as_ref(), &student, exercise_id).await })
            })
            .collect();

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.expect("start task panicked").unwrap().id);
        }
        ids.dedup();
        assert_eq!(ids.len(), 1);

        // 直接写入重复记录时返回已有记录
        let again = ctx
            .storage
            .create_participation(Some(ctx.open_exercise.id), ctx.student.id, Utc::now())
            .await
            .unwrap();
        assert_eq!(again.id, ids[0]);
    }

    #[tokio::test]
    async fn test_text_exercise_can_be_started() {
        let ctx = TestContext::new().await;
        let participation = start(ctx.storage.as_ref(), &ctx.student, ctx.text_exercise.id)
            .await
            .unwrap();
        assert_eq!(participation.exercise_id, Some(ctx.text_exercise.id));
    }

    #[tokio::test]
    async fn test_outsider_cannot_start() {
        let ctx = TestContext::new().await;
        let err = start(ctx.storage.as_ref(), &ctx.outsider, ctx.open_exercise.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AssessmentError::Forbidden(_)));

        let err = start(ctx.storage.as_ref(), &ctx.student, 9999)
            .await
            .unwrap_err();
        assert!(matches!(err, AssessmentError::NotFound(_)));
    }
}
