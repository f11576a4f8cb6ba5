pub mod create;
pub mod detail;
pub mod latest;
pub mod list;
pub mod update;

use actix_web::{HttpRequest, HttpResponse, Result as ActixResult};
use std::sync::Arc;

use crate::errors::Result;
use crate::models::modeling_submissions::requests::{
    ModelingSubmissionRequest, SubmissionListQuery,
};
use crate::storage::Storage;

pub struct ModelingSubmissionService {
    storage: Option<Arc<dyn Storage>>,
}

impl ModelingSubmissionService {
    pub fn new_lazy() -> Self {
        Self { storage: None }
    }

    pub(crate) fn get_storage(&self, request: &HttpRequest) -> Result<Arc<dyn Storage>> {
        match &self.storage {
            Some(storage) => Ok(storage.clone()),
            None => super::storage_from_request(request),
        }
    }

    pub async fn create_submission(
        &self,
        request: &HttpRequest,
        exercise_id: i64,
        req: ModelingSubmissionRequest,
    ) -> ActixResult<HttpResponse> {
        create::create_submission(self, request, exercise_id, req).await
    }

    pub async fn update_submission(
        &self,
        request: &HttpRequest,
        exercise_id: i64,
        req: ModelingSubmissionRequest,
    ) -> ActixResult<HttpResponse> {
        update::update_submission(self, request, exercise_id, req).await
    }

    pub async fn list_submissions(
        &self,
        request: &HttpRequest,
        exercise_id: i64,
        query: SubmissionListQuery,
    ) -> ActixResult<HttpResponse> {
        list::list_submissions(self, request, exercise_id, query).await
    }

    pub async fn get_submission(
        &self,
        request: &HttpRequest,
        submission_id: i64,
    ) -> ActixResult<HttpResponse> {
        detail::get_submission(self, request, submission_id).await
    }

    pub async fn get_latest_submission(
        &self,
        request: &HttpRequest,
        participation_id: i64,
    ) -> ActixResult<HttpResponse> {
        latest::get_latest_submission(self, request, participation_id).await
    }
}
