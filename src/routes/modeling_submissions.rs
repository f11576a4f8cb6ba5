use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::results::requests::{SaveAssessmentQuery, SaveAssessmentRequest};
use crate::services::{AssessmentService, ModelingSubmissionService};
use crate::utils::SafeIDI64;

// 懒加载的全局服务实例
static SUBMISSION_SERVICE: Lazy<ModelingSubmissionService> =
    Lazy::new(ModelingSubmissionService::new_lazy);
static ASSESSMENT_SERVICE: Lazy<AssessmentService> = Lazy::new(AssessmentService::new_lazy);

// 评审人打开提交（必要时加锁）
pub async fn get_submission(req: HttpRequest, path: SafeIDI64) -> ActixResult<HttpResponse> {
    SUBMISSION_SERVICE.get_submission(&req, path.0).await
}

// 保存或提交评审
pub async fn save_assessment(
    req: HttpRequest,
    path: SafeIDI64,
    query: web::Query<SaveAssessmentQuery>,
    body: web::Json<SaveAssessmentRequest>,
) -> ActixResult<HttpResponse> {
    ASSESSMENT_SERVICE
        .save_assessment(
            &req,
            path.0,
            body.into_inner(),
            query.submit.unwrap_or(false),
        )
        .await
}

// 取消评审
pub async fn cancel_assessment(req: HttpRequest, path: SafeIDI64) -> ActixResult<HttpResponse> {
    ASSESSMENT_SERVICE.cancel_assessment(&req, path.0).await
}

// 当前用户持有的评审锁
pub async fn locked_submissions(req: HttpRequest) -> ActixResult<HttpResponse> {
    ASSESSMENT_SERVICE.locked_submissions(&req).await
}

// 配置路由
pub fn configure_modeling_submissions_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/modeling-submissions")
            .wrap(middlewares::RequireJWT)
            // 必须在 /{id} 之前注册
            .service(web::resource("/locked").route(web::get().to(locked_submissions)))
            .service(web::resource("/{id}").route(web::get().to(get_submission)))
            .service(web::resource("/{id}/assessment").route(web::put().to(save_assessment)))
            .service(
                web::resource("/{id}/cancel-assessment").route(web::put().to(cancel_assessment)),
            ),
    );
}
