use actix_web::{web, HttpResponse, Result};

use crate::handlers::bad_request;
use crate::models::{
    ApiResponse, ChartKind, DashboardQuery, DashboardView, FactorCategory, Figure, Period,
    PeriodInfo, SummaryMetric,
};
use crate::services::DashboardService;

/// 解析区间参数，缺省为 All Periods
fn parse_period(query: &DashboardQuery) -> anyhow::Result<Period> {
    match query.period.as_deref() {
        Some(p) if !p.trim().is_empty() => p.parse(),
        _ => Ok(Period::default()),
    }
}

/// 完整仪表盘视图
pub async fn get_dashboard(
    service: web::Data<DashboardService>,
    query: web::Query<DashboardQuery>,
) -> Result<HttpResponse> {
    let period = match parse_period(&query) {
        Ok(p) => p,
        Err(e) => return Ok(bad_request::<DashboardView>(e)),
    };

    match service.view(period).await {
        Ok(view) => Ok(HttpResponse::Ok().json(ApiResponse::success(view))),
        Err(e) => {
            let response = ApiResponse::<DashboardView>::error(e.to_string());
            Ok(HttpResponse::InternalServerError().json(response))
        }
    }
}

pub async fn list_periods() -> Result<HttpResponse> {
    let periods: Vec<PeriodInfo> = Period::NAMED
        .iter()
        .chain(std::iter::once(&Period::All))
        .map(|p| PeriodInfo::from(*p))
        .collect();
    Ok(HttpResponse::Ok().json(ApiResponse::success(periods)))
}

pub async fn get_metrics(
    service: web::Data<DashboardService>,
    query: web::Query<DashboardQuery>,
) -> Result<HttpResponse> {
    let period = match parse_period(&query) {
        Ok(p) => p,
        Err(e) => return Ok(bad_request::<Vec<SummaryMetric>>(e)),
    };

    match service.metrics(period) {
        Ok(metrics) => Ok(HttpResponse::Ok().json(ApiResponse::success(metrics))),
        Err(e) => {
            let response = ApiResponse::<Vec<SummaryMetric>>::error(e.to_string());
            Ok(HttpResponse::InternalServerError().json(response))
        }
    }
}

/// 月度因子序列
pub async fn get_series(
    service: web::Data<DashboardService>,
    path: web::Path<String>,
    query: web::Query<DashboardQuery>,
) -> Result<HttpResponse> {
    let parsed = path
        .into_inner()
        .parse::<FactorCategory>()
        .and_then(|c| parse_period(&query).map(|p| (c, p)));
    let (category, period) = match parsed {
        Ok(v) => v,
        Err(e) => return Ok(bad_request::<()>(e)),
    };

    let result = match category {
        FactorCategory::Micro => service
            .micro_series(period)
            .map(|rows| HttpResponse::Ok().json(ApiResponse::success(rows))),
        FactorCategory::Macro => service
            .macro_series(period)
            .map(|rows| HttpResponse::Ok().json(ApiResponse::success(rows))),
    };

    match result {
        Ok(response) => Ok(response),
        Err(e) => {
            let response = ApiResponse::<()>::error(e.to_string());
            Ok(HttpResponse::InternalServerError().json(response))
        }
    }
}

/// 单个图表，对比图无数据时 data 为 null
pub async fn get_chart(
    service: web::Data<DashboardService>,
    path: web::Path<String>,
    query: web::Query<DashboardQuery>,
) -> Result<HttpResponse> {
    let parsed = path
        .into_inner()
        .parse::<ChartKind>()
        .and_then(|k| parse_period(&query).map(|p| (k, p)));
    let (kind, period) = match parsed {
        Ok(v) => v,
        Err(e) => return Ok(bad_request::<Option<Figure>>(e)),
    };

    match service.chart(kind, period) {
        Ok(figure) => Ok(HttpResponse::Ok().json(ApiResponse::success(figure))),
        Err(e) => {
            let response = ApiResponse::<Option<Figure>>::error(e.to_string());
            Ok(HttpResponse::InternalServerError().json(response))
        }
    }
}

/// 清空缓存并重新生成演示数据
pub async fn refresh(service: web::Data<DashboardService>) -> Result<HttpResponse> {
    service.refresh();
    Ok(HttpResponse::Ok().json(ApiResponse::success("Dashboard refreshed")))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/dashboard")
            .route("", web::get().to(get_dashboard))
            .route("/periods", web::get().to(list_periods))
            .route("/metrics", web::get().to(get_metrics))
            .route("/series/{category}", web::get().to(get_series))
            .route("/charts/{kind}", web::get().to(get_chart))
            .route("/refresh", web::post().to(refresh))
    );
}
