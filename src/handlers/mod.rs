pub mod dashboard;
pub mod health;
pub mod indicators;
pub mod page;
pub mod quotes;

use actix_web::{web, HttpResponse};
use serde::Serialize;

use crate::models::ApiResponse;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.configure(page::config).service(
        web::scope("/api/v1")
            .configure(health::config)
            .configure(indicators::config)
            .configure(quotes::config)
            .configure(dashboard::config)
    );
}

/// 参数错误统一返回 400
pub(crate) fn bad_request<T: Serialize>(e: anyhow::Error) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiResponse::<T>::error(e.to_string()))
}
