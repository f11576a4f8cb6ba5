use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};

use super::AssessmentService;
use super::lock_manager::{AssessmentLockManager, LOCK_MANAGER};
use crate::errors::Result;
use crate::models::results::responses::{LockedSubmissionItem, LockedSubmissionsResponse};
use crate::models::users::entities::User;
use crate::services::{current_user, respond};
use crate::storage::Storage;

pub async fn locked_submissions(
    service: &AssessmentService,
    request: &HttpRequest,
) -> ActixResult<HttpResponse> {
    let outcome = async {
        let user = current_user(request)?;
        let storage = service.get_storage(request)?;
        locked(&LOCK_MANAGER, storage.as_ref(), &user).await
    }
    .await;

    respond(outcome, "查询成功")
}

/// 当前用户持有的评审锁
pub(crate) async fn locked(
    manager: &AssessmentLockManager,
    storage: &dyn Storage,
    user: &User,
) -> Result<LockedSubmissionsResponse> {
    let locks = storage.list_locks_by_assessor(user.id).await?;

    let mut items = Vec::with_capacity(locks.len());
    for lock in locks {
        let exercise_id = storage
            .get_participation_by_id(lock.participation_id)
            .await?
            .and_then(|p| p.exercise_id);
        items.push(LockedSubmissionItem {
            submission_id: lock.submission_id,
            exercise_id,
            result_id: lock.id,
            locked_since: lock.created_at,
        });
    }

    Ok(LockedSubmissionsResponse {
        lock_count: items.len() as u64,
        lock_limit: manager.lock_limit(),
        items,
    })
}
