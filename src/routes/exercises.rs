use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use once_cell::sync::Lazy;

use crate::middlewares;
use crate::models::modeling_submissions::requests::{
    ModelingSubmissionRequest, NextSubmissionQuery, SubmissionListQuery,
};
use crate::services::{AssessmentService, ModelingSubmissionService, ParticipationService};
use crate::utils::SafeIDI64;

// 懒加载的全局服务实例
static SUBMISSION_SERVICE: Lazy<ModelingSubmissionService> =
    Lazy::new(ModelingSubmissionService::new_lazy);
static ASSESSMENT_SERVICE: Lazy<AssessmentService> = Lazy::new(AssessmentService::new_lazy);
static PARTICIPATION_SERVICE: Lazy<ParticipationService> =
    Lazy::new(ParticipationService::new_lazy);

// 创建建模提交
pub async fn create_submission(
    req: HttpRequest,
    path: SafeIDI64,
    body: web::Json<ModelingSubmissionRequest>,
) -> ActixResult<HttpResponse> {
    SUBMISSION_SERVICE
        .create_submission(&req, path.0, body.into_inner())
        .await
}

// 更新建模提交
pub async fn update_submission(
    req: HttpRequest,
    path: SafeIDI64,
    body: web::Json<ModelingSubmissionRequest>,
) -> ActixResult<HttpResponse> {
    SUBMISSION_SERVICE
        .update_submission(&req, path.0, body.into_inner())
        .await
}

// 列出练习的提交
pub async fn list_submissions(
    req: HttpRequest,
    path: SafeIDI64,
    query: web::Query<SubmissionListQuery>,
) -> ActixResult<HttpResponse> {
    SUBMISSION_SERVICE
        .list_submissions(&req, path.0, query.into_inner())
        .await
}

// 获取下一份待评审提交
pub async fn next_submission(
    req: HttpRequest,
    path: SafeIDI64,
    query: web::Query<NextSubmissionQuery>,
) -> ActixResult<HttpResponse> {
    ASSESSMENT_SERVICE
        .next_submission(&req, path.0, query.lock.unwrap_or(false))
        .await
}

// 获取优先评审的提交
pub async fn optimal_submissions(req: HttpRequest, path: SafeIDI64) -> ActixResult<HttpResponse> {
    ASSESSMENT_SERVICE.optimal_submissions(&req, path.0).await
}

// 清空待评审工作集
pub async fn clear_optimal_submissions(
    req: HttpRequest,
    path: SafeIDI64,
) -> ActixResult<HttpResponse> {
    ASSESSMENT_SERVICE
        .clear_optimal_submissions(&req, path.0)
        .await
}

// 开始练习
pub async fn start_exercise(req: HttpRequest, path: SafeIDI64) -> ActixResult<HttpResponse> {
    PARTICIPATION_SERVICE.start_exercise(&req, path.0).await
}

// 配置路由
// 权限全部在业务层按课程角色检查
pub fn configure_exercises_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/exercises")
            .wrap(middlewares::RequireJWT)
            .service(
                web::resource("/{id}/modeling-submissions")
                    .route(web::post().to(create_submission))
                    .route(web::put().to(update_submission))
                    .route(web::get().to(list_submissions)),
            )
            .service(
                web::resource("/{id}/modeling-submission-without-assessment")
                    .route(web::get().to(next_submission)),
            )
            .service(
                web::resource("/{id}/optimal-model-submissions")
                    .route(web::get().to(optimal_submissions))
                    .route(web::delete().to(clear_optimal_submissions)),
            )
            .service(web::resource("/{id}/participations").route(web::post().to(start_exercise))),
    );
}

#[cfg(test)]
mod tests {
    use crate::test_utils::TestContext;
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use chrono::{Duration, Utc};
    use serde_json::{Value, json};

    #[actix_web::test]
    async fn test_student_submission_flow() {
        let ctx = TestContext::new().await;
        let app = test::init_service(App::new().configure(ctx.configure())).await;
        let token = ctx.token(&ctx.student);
        let base = format!("/api/v1/exercises/{}", ctx.open_exercise.id);

        // 开始练习
        let req = test::TestRequest::post()
            .uri(&format!("{base}/participations"))
            .insert_header(("Authorization", format!("Bearer {token}")))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        // 请求体中的 result 被忽略
        let req = test::TestRequest::post()
            .uri(&format!("{base}/modeling-submissions"))
            .insert_header(("Authorization", format!("Bearer {token}")))
            .set_json(json!({
                "model": "{\"elements\":[]}",
                "explanation_text": "first",
                "submitted": false,
                "result": {"score": 100, "rated": true}
            }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["code"], 0);
        assert!(body["data"]["result"].is_null());
        let submission_id = body["data"]["id"].as_i64().unwrap();

        let req = test::TestRequest::put()
            .uri(&format!("{base}/modeling-submissions"))
            .insert_header(("Authorization", format!("Bearer {token}")))
            .set_json(json!({
                "id": submission_id,
                "model": "{\"elements\":[1]}",
                "submitted": true
            }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["submitted"], true);
        assert!(
            ctx.storage
                .get_result_by_submission_id(submission_id)
                .await
                .unwrap()
                .is_none()
        );

        // 新建时携带 id 被拒绝
        let req = test::TestRequest::post()
            .uri(&format!("{base}/modeling-submissions"))
            .insert_header(("Authorization", format!("Bearer {token}")))
            .set_json(json!({"id": submission_id, "submitted": true}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_submission_after_due_date_is_forbidden() {
        let ctx = TestContext::new().await;
        let app = test::init_service(App::new().configure(ctx.configure())).await;
        ctx.participation(&ctx.closed_exercise, &ctx.student, Utc::now() - Duration::days(2))
            .await;

        let req = test::TestRequest::post()
            .uri(&format!(
                "/api/v1/exercises/{}/modeling-submissions",
                ctx.closed_exercise.id
            ))
            .insert_header(("Authorization", format!("Bearer {}", ctx.token(&ctx.student))))
            .set_json(json!({"model": "{}", "submitted": true}))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn test_listing_permissions() {
        let ctx = TestContext::new().await;
        let app = test::init_service(App::new().configure(ctx.configure())).await;
        ctx.new_submission(&ctx.closed_exercise, true).await;
        let uri = format!(
            "/api/v1/exercises/{}/modeling-submissions",
            ctx.closed_exercise.id
        );

        let req = test::TestRequest::get()
            .uri(&uri)
            .insert_header(("Authorization", format!("Bearer {}", ctx.token(&ctx.instructor))))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 1);

        for user in [&ctx.tutor, &ctx.student, &ctx.outsider] {
            let req = test::TestRequest::get()
                .uri(&uri)
                .insert_header(("Authorization", format!("Bearer {}", ctx.token(user))))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        }

        let req = test::TestRequest::get()
            .uri(&format!("{uri}?assessedByTutor=true"))
            .insert_header(("Authorization", format!("Bearer {}", ctx.token(&ctx.tutor))))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert!(body["data"].as_array().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn test_find_next_with_and_without_lock() {
        let ctx = TestContext::new().await;
        let app = test::init_service(App::new().configure(ctx.configure())).await;
        let submission = ctx.new_submission(&ctx.closed_exercise, true).await;
        let uri = format!(
            "/api/v1/exercises/{}/modeling-submission-without-assessment",
            ctx.closed_exercise.id
        );
        let auth = ("Authorization", format!("Bearer {}", ctx.token(&ctx.tutor)));

        let req = test::TestRequest::get()
            .uri(&uri)
            .insert_header(auth.clone())
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["id"], submission.id);
        assert!(body["data"]["result"].is_null());
        // 助教看不到样例解答与学生身份
        assert!(body["data"]["participation"]["student"].is_null());
        assert!(!body.to_string().contains("sample_solution"));

        let req = test::TestRequest::get()
            .uri(&format!("{uri}?lock=true"))
            .insert_header(auth.clone())
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["id"], submission.id);
        assert_eq!(body["data"]["result"]["assessor"]["id"], ctx.tutor.id);
        assert!(body["data"]["result"]["completion_date"].is_null());

        // 已全部锁定
        let req = test::TestRequest::get()
            .uri(&format!("{uri}?lock=true"))
            .insert_header(auth)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_wrong_exercise_type_is_bad_request() {
        let ctx = TestContext::new().await;
        let app = test::init_service(App::new().configure(ctx.configure())).await;

        let req = test::TestRequest::get()
            .uri(&format!(
                "/api/v1/exercises/{}/modeling-submission-without-assessment?lock=true",
                ctx.text_exercise.id
            ))
            .insert_header(("Authorization", format!("Bearer {}", ctx.token(&ctx.tutor))))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_optimal_submissions_and_clear() {
        let ctx = TestContext::new().await;
        let app = test::init_service(App::new().configure(ctx.configure())).await;
        let first = ctx.new_submission(&ctx.closed_exercise, true).await;
        let second = ctx.new_submission(&ctx.closed_exercise, true).await;
        let uri = format!(
            "/api/v1/exercises/{}/optimal-model-submissions",
            ctx.closed_exercise.id
        );
        let auth = ("Authorization", format!("Bearer {}", ctx.token(&ctx.tutor)));

        let req = test::TestRequest::get()
            .uri(&uri)
            .insert_header(auth.clone())
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"], json!([first.id, second.id]));

        let req = test::TestRequest::delete()
            .uri(&uri)
            .insert_header(auth)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    }

    #[actix_web::test]
    async fn test_requests_without_token_are_unauthorized() {
        let ctx = TestContext::new().await;
        let app = test::init_service(App::new().configure(ctx.configure())).await;

        let req = test::TestRequest::get()
            .uri(&format!(
                "/api/v1/exercises/{}/optimal-model-submissions",
                ctx.closed_exercise.id
            ))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}
