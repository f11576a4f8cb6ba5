use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::services::ModelingSubmissionService;
use crate::utils::SafeIDI64;

// 懒加载的全局 ModelingSubmissionService 实例
static SUBMISSION_SERVICE: Lazy<ModelingSubmissionService> =
    Lazy::new(ModelingSubmissionService::new_lazy);

// 获取参与记录的最新建模提交
pub async fn latest_submission(req: HttpRequest, path: SafeIDI64) -> ActixResult<HttpResponse> {
    SUBMISSION_SERVICE.get_latest_submission(&req, path.0).await
}

// 配置路由
pub fn configure_participations_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/participations")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("/{id}/latest-modeling-submission")
                    .route(web::get().to(latest_submission)),
            ),
    );
}

#[cfg(test)]
mod tests {
    use crate::test_utils::TestContext;
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use serde_json::Value;

    #[actix_web::test]
    async fn test_latest_submission_access() {
        let ctx = TestContext::new().await;
        let app = test::init_service(App::new().configure(ctx.configure())).await;
        let submission = ctx
            .submission_for(&ctx.open_exercise, &ctx.student, true)
            .await;
        let uri = format!(
            "/api/v1/participations/{}/latest-modeling-submission",
            submission.participation_id
        );

        let req = test::TestRequest::get()
            .uri(&uri)
            .insert_header(("Authorization", format!("Bearer {}", ctx.token(&ctx.student))))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["id"], submission.id);
        assert!(body["data"]["participation"]["exercise"]["grading_instructions"].is_null());

        let req = test::TestRequest::get()
            .uri(&uri)
            .insert_header(("Authorization", format!("Bearer {}", ctx.token(&ctx.student2))))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let req = test::TestRequest::get()
            .uri(&uri)
            .insert_header(("Authorization", format!("Bearer {}", ctx.token(&ctx.admin))))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["participation"]["student"]["id"], ctx.student.id);
    }

    #[actix_web::test]
    async fn test_missing_participation() {
        let ctx = TestContext::new().await;
        let app = test::init_service(App::new().configure(ctx.configure())).await;

        let req = test::TestRequest::get()
            .uri("/api/v1/participations/4040/latest-modeling-submission")
            .insert_header(("Authorization", format!("Bearer {}", ctx.token(&ctx.student))))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }
}
