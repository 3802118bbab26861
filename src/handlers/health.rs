use actix_web::{web, HttpResponse, Result};
use serde::Serialize;

use crate::models::ApiResponse;
use crate::services::providers::{india_now, is_market_open};
use crate::services::DashboardService;

#[derive(Debug, Serialize)]
struct HealthStatus {
    status: &'static str,
    service: String,
    market_open: bool,
}

pub async fn health_check(service: web::Data<DashboardService>) -> Result<HttpResponse> {
    let response = ApiResponse::success(HealthStatus {
        status: "healthy",
        service: service.title().to_string(),
        market_open: is_market_open(india_now()),
    });
    Ok(HttpResponse::Ok().json(response))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check));
}
