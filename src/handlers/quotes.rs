use actix_web::{web, HttpResponse, Result};

use crate::handlers::bad_request;
use crate::models::{ApiResponse, MarketQuote, QuoteHistory, QuoteHistoryQuery, QuoteQuery};
use crate::services::dashboard_service::{validate_history_params, MAX_QUOTE_SYMBOLS};
use crate::services::providers::validate_symbol;
use crate::services::DashboardService;

/// 行情列表，缺省使用配置中的代码
pub async fn list_quotes(
    service: web::Data<DashboardService>,
    query: web::Query<QuoteQuery>,
) -> Result<HttpResponse> {
    let symbols: Vec<String> = match query.symbols.as_deref() {
        Some(s) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
        None => service.quote_symbols().to_vec(),
    };

    if symbols.len() > MAX_QUOTE_SYMBOLS {
        return Ok(bad_request::<Vec<MarketQuote>>(anyhow::anyhow!(
            "行情代码过多: {}（最多 {} 个）",
            symbols.len(),
            MAX_QUOTE_SYMBOLS
        )));
    }

    if let Some(e) = symbols.iter().find_map(|s| validate_symbol(s).err()) {
        return Ok(bad_request::<Vec<MarketQuote>>(e));
    }

    let quotes = service.quotes(&symbols).await;
    Ok(HttpResponse::Ok().json(ApiResponse::success(quotes)))
}

pub async fn get_quote(
    service: web::Data<DashboardService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let symbol = path.into_inner();
    if let Err(e) = validate_symbol(&symbol) {
        return Ok(bad_request::<MarketQuote>(e));
    }

    match service.quote(&symbol).await {
        Ok(quote) => {
            let response = ApiResponse::success(quote);
            Ok(HttpResponse::Ok().json(response))
        }
        Err(e) => {
            let response = ApiResponse::<MarketQuote>::error(e.to_string());
            Ok(HttpResponse::InternalServerError().json(response))
        }
    }
}

pub async fn get_quote_history(
    service: web::Data<DashboardService>,
    path: web::Path<String>,
    query: web::Query<QuoteHistoryQuery>,
) -> Result<HttpResponse> {
    let symbol = path.into_inner();
    let range = query.range.as_deref().unwrap_or("1mo");
    let interval = query.interval.as_deref().unwrap_or("1d");

    if let Err(e) = validate_symbol(&symbol).and_then(|_| validate_history_params(range, interval)) {
        return Ok(bad_request::<QuoteHistory>(e));
    }

    match service.quote_history(&symbol, range, interval).await {
        Ok(history) => {
            let response = ApiResponse::success(history);
            Ok(HttpResponse::Ok().json(response))
        }
        Err(e) => {
            let response = ApiResponse::<QuoteHistory>::error(e.to_string());
            Ok(HttpResponse::InternalServerError().json(response))
        }
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/quotes")
            .route("", web::get().to(list_quotes))
            .route("/{symbol}", web::get().to(get_quote))
            .route("/{symbol}/history", web::get().to(get_quote_history))
    );
}
