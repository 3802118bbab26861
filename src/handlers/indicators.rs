use actix_web::{web, HttpResponse, Result};

use crate::handlers::bad_request;
use crate::models::{ApiResponse, FactorCategory, Indicator, IndicatorKind, IndicatorQuery};
use crate::services::DashboardService;

/// 全部实时指标，可按分类过滤
pub async fn list_indicators(
    service: web::Data<DashboardService>,
    query: web::Query<IndicatorQuery>,
) -> Result<HttpResponse> {
    let category = match query.category.as_deref().map(str::parse::<FactorCategory>) {
        Some(Ok(c)) => Some(c),
        Some(Err(e)) => return Ok(bad_request::<Vec<Indicator>>(e)),
        None => None,
    };

    let indicators: Vec<Indicator> = service
        .live_indicators()
        .await
        .into_iter()
        .filter(|i| category.map_or(true, |c| i.category == c))
        .collect();

    Ok(HttpResponse::Ok().json(ApiResponse::success(indicators)))
}

pub async fn get_indicator(
    service: web::Data<DashboardService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let kind = match path.into_inner().parse::<IndicatorKind>() {
        Ok(k) => k,
        Err(e) => return Ok(bad_request::<Indicator>(e)),
    };

    let indicator = service.indicator(kind).await;
    Ok(HttpResponse::Ok().json(ApiResponse::success(indicator)))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/indicators")
            .route("", web::get().to(list_indicators))
            .route("/{kind}", web::get().to(get_indicator))
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::offline_service;
    use actix_web::{http::StatusCode, test, App};

    #[actix_web::test]
    async fn test_indicators_endpoints() {
        let app = test::init_service(App::new().app_data(offline_service()).configure(config)).await;

        let req = test::TestRequest::get().uri("/indicators").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"].as_array().unwrap().len(), 10);

        let req = test::TestRequest::get().uri("/indicators?category=macro").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        let data = body["data"].as_array().unwrap();
        assert_eq!(data.len(), 5);
        assert!(data.iter().all(|i| i["category"] == "macro"));

        let req = test::TestRequest::get().uri("/indicators/exchange_rate").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["data"]["value"], 85.5);
        assert_eq!(body["data"]["is_fallback"], true);
        assert_eq!(body["data"]["source"], "fallback");

        let req = test::TestRequest::get().uri("/indicators/bitcoin").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let req = test::TestRequest::get().uri("/indicators?category=meso").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
