pub mod exercises;

pub mod modeling_submissions;

pub mod participations;

pub use exercises::configure_exercises_routes;
pub use modeling_submissions::configure_modeling_submissions_routes;
pub use participations::configure_participations_routes;

use actix_web::web;

// 配置全部 API 路由
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    configure_exercises_routes(cfg);
    configure_modeling_submissions_routes(cfg);
    configure_participations_routes(cfg);
}
