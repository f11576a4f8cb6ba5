pub mod cancel;
pub mod lock_manager;
pub mod locked;
pub mod next;
pub mod optimal;
pub mod save;
pub mod working_set;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::cache::ObjectCache;
use crate::errors::Result;
use crate::models::results::requests::SaveAssessmentRequest;
use crate::storage::Storage;

pub use lock_manager::{AssessmentLockManager, LOCK_MANAGER};

pub struct AssessmentService {
    storage: Option<Arc<dyn Storage>>,
    cache: Option<Arc<dyn ObjectCache>>,
}

impl AssessmentService {
    pub fn new_lazy() -> Self {
        Self {
            storage: None,
            cache: None,
        }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Result<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from_request(request),
        }
    }

    pub(crate) fn get_cache(&self, request: &HttpRequest) -> Result<Arc<dyn ObjectCache>> {
        match &self.cache {
            Some(cache) => Ok(cache.clone()),
            None => super::cache_from_request(request),
        }
    }

    pub async fn next_submission(
        &self,
        request: &HttpRequest,
        exercise_id: i64,
        lock: bool,
    ) -> ActixResult<HttpResponse> {
        next::next_submission(self, request, exercise_id, lock).await
    }

    pub async fn optimal_submissions(
        &self,
        request: &HttpRequest,
        exercise_id: i64,
    ) -> ActixResult<HttpResponse> {
        optimal::optimal_submissions(self, request, exercise_id).await
    }

    pub async fn clear_optimal_submissions(
        &self,
        request: &HttpRequest,
        exercise_id: i64,
    ) -> ActixResult<HttpResponse> {
        optimal::clear_optimal_submissions(self, request, exercise_id).await
    }

    pub async fn save_assessment(
        &self,
        request: &HttpRequest,
        submission_id: i64,
        req: SaveAssessmentRequest,
        submit: bool,
    ) -> ActixResult<HttpResponse> {
        save::save_assessment(self, request, submission_id, req, submit).await
    }

    pub async fn cancel_assessment(
        &self,
        request: &HttpRequest,
        submission_id: i64,
    ) -> ActixResult<HttpResponse> {
        cancel::cancel_assessment(self, request, submission_id).await
    }

    pub async fn locked_submissions(&self, request: &HttpRequest) -> ActixResult<HttpResponse> {
        locked::locked_submissions(self, request).await
    }
}
