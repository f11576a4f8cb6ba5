use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::debug;

use super::AssessmentService;
use super::lock_manager::{AssessmentLockManager, LOCK_MANAGER, ensure_due_date_over};
use super::working_set;
use crate::cache::ObjectCache;
use crate::config::AppConfig;
use crate::errors::{AssessmentError, Result};
use crate::models::modeling_submissions::responses::ModelingSubmissionResponse;
use crate::models::users::entities::User;
use crate::services::{current_user, grader_viewer, load_aggregate, respond, submission_context};
use crate::storage::Storage;

pub async fn next_submission(
    service: &AssessmentService,
    request: &HttpRequest,
    exercise_id: i64,
    lock: bool,
) -> ActixResult<HttpResponse> {
    let outcome = async {
        let user = current_user(request)?;
        let storage = service.get_storage(request)?;
        if lock {
            next_locked(&LOCK_MANAGER, storage.as_ref(), &user, exercise_id).await
        } else {
            let cache = service.get_cache(request)?;
            let config = AppConfig::get();
            next_unlocked(
                &LOCK_MANAGER,
                storage.as_ref(),
                cache.as_ref(),
                &user,
                exercise_id,
                config.assessment.optimal_batch_size,
                config.assessment.queue_ttl,
            )
            .await
        }
    }
    .await;

    respond(outcome, "查询成功")
}

/// 分配下一份待评审提交并加锁
pub(crate) async fn next_locked(
    manager: &AssessmentLockManager,
    storage: &dyn Storage,
    user: &User,
    exercise_id: i64,
) -> Result<ModelingSubmissionResponse> {
    let locked = manager
        .acquire_next_submission_for_assessment(storage, exercise_id, user, None)
        .await?;

    let (participation, exercise) = submission_context(storage, &locked.submission).await?;
    let aggregate = load_aggregate(storage, locked.submission, participation, exercise).await?;
    Ok(ModelingSubmissionResponse::for_viewer(
        aggregate,
        grader_viewer(locked.role),
    ))
}

/// 返回下一份待评审提交但不加锁，提交加入练习的工作集
///
/// 优先返回尚未分发过的提交。
pub(crate) async fn next_unlocked(
    manager: &AssessmentLockManager,
    storage: &dyn Storage,
    cache: &dyn ObjectCache,
    user: &User,
    exercise_id: i64,
    batch_size: u64,
    queue_ttl: u64,
) -> Result<ModelingSubmissionResponse> {
    let assessable = manager.check_assessable(storage, exercise_id, user).await?;
    ensure_due_date_over(&assessable.exercise)?;
    manager.ensure_below_limit(storage, user.id).await?;

    let candidates = storage
        .list_unassessed_submission_ids(exercise_id, Some(batch_size.max(1)))
        .await?;
    let queued = working_set::members(cache, exercise_id).await;

    let chosen = candidates
        .iter()
        .find(|id| !queued.contains(id))
        .or_else(|| candidates.first())
        .copied()
        .ok_or_else(|| {
            AssessmentError::not_found(format!("练习 {exercise_id} 没有待评审的提交"))
        })?;

    working_set::merge(cache, exercise_id, &[chosen], queue_ttl).await;
    debug!(
        "Handed out submission {} of exercise {} to grader {} without lock",
        chosen, exercise_id, user.id
    );

    let submission = storage
        .get_submission_by_id(chosen)
        .await?
        .ok_or_else(|| AssessmentError::not_found(format!("提交 {chosen} 不存在")))?;
    let (participation, exercise) = submission_context(storage, &submission).await?;
    let aggregate = load_aggregate(storage, submission, participation, exercise).await?;

    Ok(ModelingSubmissionResponse::for_viewer(
        aggregate,
        grader_viewer(assessable.role),
    ))
}
