use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use tracing::info;

use super::AssessmentService;
use super::lock_manager::{AssessmentLockManager, LOCK_MANAGER};
use super::working_set;
use crate::cache::ObjectCache;
use crate::config::AppConfig;
use crate::errors::Result;
use crate::models::users::entities::User;
use crate::services::{current_user, error_response, respond};
use crate::storage::Storage;

pub async fn optimal_submissions(
    service: &AssessmentService,
    request: &HttpRequest,
    exercise_id: i64,
) -> ActixResult<HttpResponse> {
    let outcome = async {
        let user = current_user(request)?;
        let storage = service.get_storage(request)?;
        let cache = service.get_cache(request)?;
        let config = AppConfig::get();
        optimal(
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
    .await;

    respond(outcome, "查询成功")
}

pub async fn clear_optimal_submissions(
    service: &AssessmentService,
    request: &HttpRequest,
    exercise_id: i64,
) -> ActixResult<HttpResponse> {
    let outcome = async {
        let user = current_user(request)?;
        let storage = service.get_storage(request)?;
        let cache = service.get_cache(request)?;
        clear(&LOCK_MANAGER, storage.as_ref(), cache.as_ref(), &user, exercise_id).await
    }
    .await;

    match outcome {
        Ok(()) => Ok(HttpResponse::NoContent().finish()),
        Err(err) => Ok(error_response(&err)),
    }
}

/// 按提交顺序返回一批优先评审的提交 ID，并并入工作集
pub(crate) async fn optimal(
    manager: &AssessmentLockManager,
    storage: &dyn Storage,
    cache: &dyn ObjectCache,
    user: &User,
    exercise_id: i64,
    batch_size: u64,
    queue_ttl: u64,
) -> Result<Vec<i64>> {
    manager.check_assessable(storage, exercise_id, user).await?;
    manager.ensure_below_limit(storage, user.id).await?;

    let ids = storage
        .list_unassessed_submission_ids(exercise_id, Some(batch_size))
        .await?;
    working_set::merge(cache, exercise_id, &ids, queue_ttl).await;

    Ok(ids)
}

pub(crate) async fn clear(
    manager: &AssessmentLockManager,
    storage: &dyn Storage,
    cache: &dyn ObjectCache,
    user: &User,
    exercise_id: i64,
) -> Result<()> {
    manager.check_assessable(storage, exercise_id, user).await?;
    working_set::clear(cache, exercise_id).await;
    info!(
        "User {} cleared assessment working set of exercise {}",
        user.id, exercise_id
    );
    Ok(())
}
