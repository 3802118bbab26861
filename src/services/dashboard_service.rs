//! 仪表盘服务
//!
//! 组合各数据源、兜底数据、演示序列、区间统计和图表，生成页面所需的全部数据
//!
//! ## 兜底策略
//! - 指标：World Bank / FRED -> 最近成功值 -> 硬编码常量
//! - 行情：Yahoo Finance -> Alpha Vantage（已配置时）-> 最近成功值 -> 硬编码常量
//! - 不重试、不退避，失败只记录 warn 日志

use anyhow::{anyhow, Result};
use chrono::NaiveDate;
use futures::future::join_all;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

use crate::config::AppConfig;
use crate::models::{
    ChartKind, DashboardCharts, DashboardView, DataSource, Figure, Indicator, IndicatorKind,
    MacroFactorRow, MarketQuote, MicroFactorRow, Period, QuoteHistory, SummaryMetric,
};

use super::analytics::{
    compare_periods, filter_by_period, macro_table, micro_table, recent_macro_table,
    recent_micro_table, summary_metrics,
};
use super::charts::{comparison_chart, macro_factors_chart, micro_factors_chart, price_history_chart};
use super::demo::DemoDataset;
use super::fallback::FallbackStore;
use super::providers::{
    build_client, india_now, indicator_source, validate_symbol, AlphaVantageClient, FredClient,
    IndicatorSource, WorldBankClient, YahooClient,
};

/// 单次行情列表请求的代码上限
pub const MAX_QUOTE_SYMBOLS: usize = 10;

/// 历史行情允许的时间范围
pub const HISTORY_RANGES: [&str; 6] = ["1mo", "3mo", "6mo", "1y", "2y", "5y"];
/// 历史行情允许的周期
pub const HISTORY_INTERVALS: [&str; 3] = ["1d", "1wk", "1mo"];

/// 带时间戳的缓存项
struct Cached<T> {
    at: Instant,
    value: T,
}

/// 仪表盘服务
///
/// 作为 web::Data 在所有 worker 间共享
pub struct DashboardService {
    title: String,
    country_code: String,
    quote_symbols: Vec<String>,
    /// 实时数据缓存时间，为 0 时不缓存
    cache_ttl: Duration,
    auto_refresh_secs: u64,
    yahoo: YahooClient,
    alpha_vantage: AlphaVantageClient,
    world_bank: WorldBankClient,
    fred: FredClient,
    fallback: FallbackStore,
    /// 演示序列，按日生成，刷新时清空
    demo: RwLock<Option<Arc<DemoDataset>>>,
    indicator_cache: RwLock<Option<Cached<Vec<Indicator>>>>,
    quote_cache: RwLock<HashMap<String, Cached<MarketQuote>>>,
}

impl DashboardService {
    /// 创建服务实例
    pub fn new(config: &AppConfig) -> Result<Self> {
        let client = build_client(&config.api)?;
        let providers = &config.providers;

        Ok(Self {
            title: config.dashboard.title.clone(),
            country_code: config.dashboard.country_code.clone(),
            quote_symbols: config.dashboard.quote_symbols.clone(),
            cache_ttl: Duration::from_secs(config.dashboard.cache_ttl_secs),
            auto_refresh_secs: config.dashboard.auto_refresh_secs,
            yahoo: YahooClient::new(client.clone(), providers.yahoo_base_url.clone()),
            alpha_vantage: AlphaVantageClient::new(
                client.clone(),
                providers.alpha_vantage_base_url.clone(),
                providers.alpha_vantage_api_key.clone(),
            ),
            world_bank: WorldBankClient::new(client.clone(), providers.world_bank_base_url.clone()),
            fred: FredClient::new(
                client,
                providers.fred_base_url.clone(),
                providers.fred_api_key.clone(),
            ),
            fallback: FallbackStore::new(),
            demo: RwLock::new(None),
            indicator_cache: RwLock::new(None),
            quote_cache: RwLock::new(HashMap::new()),
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn quote_symbols(&self) -> &[String] {
        &self.quote_symbols
    }

    /// 页面自动刷新间隔（秒）
    pub fn auto_refresh_secs(&self) -> u64 {
        self.auto_refresh_secs
    }

    fn is_fresh(&self, at: Instant) -> bool {
        !self.cache_ttl.is_zero() && at.elapsed() < self.cache_ttl
    }

    // ==================== 演示序列 ====================

    /// 获取演示数据集，跨日自动重新生成
    pub fn dataset(&self) -> Result<Arc<DemoDataset>> {
        let today = india_now().date_naive();
        self.dataset_as_of(today)
    }

    fn dataset_as_of(&self, as_of: NaiveDate) -> Result<Arc<DemoDataset>> {
        if let Some(data) = self.demo.read().unwrap_or_else(|e| e.into_inner()).as_ref() {
            if data.as_of == as_of {
                return Ok(data.clone());
            }
        }

        log::info!("生成演示数据，基准日期 {}", as_of);
        let data = Arc::new(DemoDataset::generate(as_of)?);
        *self.demo.write().unwrap_or_else(|e| e.into_inner()) = Some(data.clone());
        Ok(data)
    }

    /// 区间内的微观因子序列
    pub fn micro_series(&self, period: Period) -> Result<Vec<MicroFactorRow>> {
        let data = self.dataset()?;
        Ok(filter_by_period(&data.micro_factors, period, data.as_of))
    }

    /// 区间内的宏观因子序列
    pub fn macro_series(&self, period: Period) -> Result<Vec<MacroFactorRow>> {
        let data = self.dataset()?;
        Ok(filter_by_period(&data.macro_factors, period, data.as_of))
    }

    /// 区间汇总指标；All 使用最近一个季度
    pub fn metrics(&self, period: Period) -> Result<Vec<SummaryMetric>> {
        let data = self.dataset()?;
        let period = if period == Period::All {
            Period::ZeroToThreeMonths
        } else {
            period
        };
        Ok(summary_metrics(
            &filter_by_period(&data.micro_factors, period, data.as_of),
            &filter_by_period(&data.macro_factors, period, data.as_of),
        ))
    }

    /// 单个图表，对比图无数据时返回 None
    pub fn chart(&self, kind: ChartKind, period: Period) -> Result<Option<Figure>> {
        let data = self.dataset()?;
        let figure = match kind {
            ChartKind::Micro => Some(micro_factors_chart(
                &filter_by_period(&data.micro_factors, period, data.as_of),
                period.label(),
            )),
            ChartKind::Macro => Some(macro_factors_chart(
                &filter_by_period(&data.macro_factors, period, data.as_of),
                period.label(),
            )),
            ChartKind::Comparison => comparison_chart(&compare_periods(
                &data.micro_factors,
                &data.macro_factors,
                data.as_of,
            )),
        };
        Ok(figure)
    }

    // ==================== 实时指标 ====================

    async fn fetch_indicator(&self, kind: IndicatorKind) -> Result<Indicator> {
        match indicator_source(kind) {
            IndicatorSource::WorldBank { code, scale } => {
                let obs = self.world_bank.get_latest(&self.country_code, code).await?;
                Ok(Indicator::live(kind, obs.value * scale, obs.date, DataSource::WorldBank))
            }
            IndicatorSource::Fred { series } => {
                let obs = self.fred.get_latest(series).await?;
                Ok(Indicator::live(kind, obs.value, obs.date, DataSource::Fred))
            }
        }
    }

    /// 获取单个指标，失败时使用兜底值
    pub async fn indicator(&self, kind: IndicatorKind) -> Indicator {
        match self.fetch_indicator(kind).await {
            Ok(indicator) => {
                self.fallback.record_indicator(&indicator);
                indicator
            }
            Err(e) => {
                log::warn!("获取指标 {} 失败，使用兜底值: {}", kind, e);
                self.fallback.indicator(kind)
            }
        }
    }

    /// 并发获取全部指标
    pub async fn live_indicators(&self) -> Vec<Indicator> {
        if let Some(cached) = self
            .indicator_cache
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
        {
            if self.is_fresh(cached.at) {
                return cached.value.clone();
            }
        }

        let indicators = join_all(IndicatorKind::ALL.iter().map(|k| self.indicator(*k))).await;

        let fallbacks = indicators.iter().filter(|i| i.is_fallback).count();
        log::info!(
            "获取实时指标 {} 项，其中兜底 {} 项",
            indicators.len(),
            fallbacks
        );

        *self.indicator_cache.write().unwrap_or_else(|e| e.into_inner()) = Some(Cached {
            at: Instant::now(),
            value: indicators.clone(),
        });
        indicators
    }

    // ==================== 实时行情 ====================

    async fn fetch_quote(&self, symbol: &str) -> Result<MarketQuote> {
        match self.yahoo.get_quote(symbol).await {
            Ok(quote) => Ok(quote),
            Err(e) if self.alpha_vantage.is_configured() => {
                log::warn!("Yahoo 获取 {} 失败，改用 Alpha Vantage: {}", symbol, e);
                self.alpha_vantage.get_quote(symbol).await
            }
            Err(e) => Err(e),
        }
    }

    /// 获取单个行情，失败时使用兜底值；无兜底值时返回错误
    pub async fn quote(&self, symbol: &str) -> Result<MarketQuote> {
        validate_symbol(symbol)?;
        let key = symbol.to_uppercase();

        if let Some(cached) = self
            .quote_cache
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&key)
        {
            if self.is_fresh(cached.at) {
                return Ok(cached.value.clone());
            }
        }

        let quote = match self.fetch_quote(symbol).await {
            Ok(quote) => {
                self.fallback.record_quote(&quote);
                quote
            }
            Err(e) => {
                log::warn!("获取行情 {} 失败，使用兜底值: {}", symbol, e);
                self.fallback
                    .quote(symbol)
                    .ok_or_else(|| anyhow!("行情 {} 获取失败且无兜底值: {}", symbol, e))?
            }
        };

        let mut cache = self.quote_cache.write().unwrap_or_else(|e| e.into_inner());
        cache.retain(|_, c| self.is_fresh(c.at));
        cache.insert(
            key,
            Cached {
                at: Instant::now(),
                value: quote.clone(),
            },
        );
        Ok(quote)
    }

    /// 并发获取多个行情，跳过无兜底值的代码
    pub async fn quotes(&self, symbols: &[String]) -> Vec<MarketQuote> {
        let results = join_all(symbols.iter().map(|s| self.quote(s))).await;

        results
            .into_iter()
            .zip(symbols)
            .filter_map(|(result, symbol)| match result {
                Ok(quote) => Some(quote),
                Err(e) => {
                    log::warn!("跳过行情 {}: {}", symbol, e);
                    None
                }
            })
            .collect()
    }

    /// 历史收盘价（仅 Yahoo，无兜底）
    pub async fn quote_history(&self, symbol: &str, range: &str, interval: &str) -> Result<QuoteHistory> {
        validate_symbol(symbol)?;
        validate_history_params(range, interval)?;

        let points = self.yahoo.get_history(symbol, range, interval).await?;
        let chart = price_history_chart(symbol, &points);
        Ok(QuoteHistory {
            symbol: symbol.to_string(),
            range: range.to_string(),
            interval: interval.to_string(),
            points,
            chart,
        })
    }

    // ==================== 页面视图 ====================

    /// 生成完整的仪表盘视图
    pub async fn view(&self, period: Period) -> Result<DashboardView> {
        let data = self.dataset()?;
        let (indicators, quotes) =
            futures::join!(self.live_indicators(), self.quotes(&self.quote_symbols));
        Ok(self.build_view(&data, period, indicators, quotes))
    }

    fn build_view(
        &self,
        data: &DemoDataset,
        period: Period,
        indicators: Vec<Indicator>,
        quotes: Vec<MarketQuote>,
    ) -> DashboardView {
        let as_of = data.as_of;
        let updated = data
            .last_date()
            .map(|d| d.format("%B %d, %Y").to_string())
            .unwrap_or_else(|| "-".to_string());

        let mut view = DashboardView {
            title: self.title.clone(),
            header: String::new(),
            period,
            metrics_caption: String::new(),
            metrics: Vec::new(),
            indicators,
            quotes,
            charts: DashboardCharts::default(),
            tables: Vec::new(),
            warning: None,
            footer: format!("{} | Data updated: {}", self.title, updated),
        };

        if period == Period::All {
            let latest_micro = filter_by_period(&data.micro_factors, Period::ZeroToThreeMonths, as_of);
            let latest_macro = filter_by_period(&data.macro_factors, Period::ZeroToThreeMonths, as_of);

            view.header = "Comprehensive Economic Overview".to_string();
            view.metrics_caption = "Latest Quarter".to_string();
            view.metrics = summary_metrics(&latest_micro, &latest_macro);
            view.charts.comparison = comparison_chart(&compare_periods(
                &data.micro_factors,
                &data.macro_factors,
                as_of,
            ));
            if !latest_micro.is_empty() {
                view.tables.push(recent_micro_table(&latest_micro));
            }
            if !latest_macro.is_empty() {
                view.tables.push(recent_macro_table(&latest_macro));
            }
            return view;
        }

        let micro = filter_by_period(&data.micro_factors, period, as_of);
        let macro_rows = filter_by_period(&data.macro_factors, period, as_of);

        view.header = format!("Economic Analysis: {}", period.label());
        view.metrics_caption = period.label().to_string();

        if micro.is_empty() || macro_rows.is_empty() {
            view.warning = Some(format!(
                "No data available for the selected period: {}",
                period.label()
            ));
            return view;
        }

        view.metrics = summary_metrics(&micro, &macro_rows);
        view.charts.micro = Some(micro_factors_chart(&micro, period.label()));
        view.charts.macro_factors = Some(macro_factors_chart(&macro_rows, period.label()));
        view.tables.push(micro_table(&micro));
        view.tables.push(macro_table(&macro_rows));
        view
    }

    /// 刷新：丢弃演示数据和实时缓存，最近成功值保留作兜底
    pub fn refresh(&self) {
        *self.demo.write().unwrap_or_else(|e| e.into_inner()) = None;
        *self.indicator_cache.write().unwrap_or_else(|e| e.into_inner()) = None;
        self.quote_cache.write().unwrap_or_else(|e| e.into_inner()).clear();
        log::info!("已清空仪表盘缓存");
    }
}

/// 校验历史行情参数
pub fn validate_history_params(range: &str, interval: &str) -> Result<()> {
    if !HISTORY_RANGES.contains(&range) {
        return Err(anyhow!("不支持的时间范围: {}（可选 {:?}）", range, HISTORY_RANGES));
    }
    if !HISTORY_INTERVALS.contains(&interval) {
        return Err(anyhow!("不支持的周期: {}（可选 {:?}）", interval, HISTORY_INTERVALS));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{web, App, HttpResponse, HttpServer};
    use std::sync::atomic::{AtomicBool, Ordering};

    const UNREACHABLE: &str = "http://127.0.0.1:9";

    fn config_with(base_url: &str, fred_key: &str, ttl: u64) -> AppConfig {
        let mut config = AppConfig::default();
        config.api.timeout_secs = 5;
        config.api.connect_timeout_secs = 2;
        config.providers.yahoo_base_url = base_url.to_string();
        config.providers.alpha_vantage_base_url = base_url.to_string();
        config.providers.world_bank_base_url = base_url.to_string();
        config.providers.fred_base_url = base_url.to_string();
        config.providers.fred_api_key = fred_key.to_string();
        config.dashboard.cache_ttl_secs = ttl;
        config
    }

    // ==================== 模拟上游 ====================

    async fn world_bank_mock(
        healthy: web::Data<AtomicBool>,
        path: web::Path<(String, String)>,
    ) -> HttpResponse {
        if !healthy.load(Ordering::SeqCst) {
            return HttpResponse::InternalServerError().finish();
        }
        let (_, code) = path.into_inner();
        let value = match code.as_str() {
            "FP.CPI.TOTL.ZG" => 5.65,
            "FI.RES.TOTL.CD" => 6.4e11,
            "GC.BAL.CASH.GD.ZS" => -4.9,
            _ => 3.0,
        };
        HttpResponse::Ok().json(serde_json::json!([
            { "page": 1, "pages": 1, "per_page": 5, "total": 1 },
            [ { "date": "2023", "value": value } ]
        ]))
    }

    async fn fred_mock(healthy: web::Data<AtomicBool>) -> HttpResponse {
        if !healthy.load(Ordering::SeqCst) {
            return HttpResponse::InternalServerError().finish();
        }
        HttpResponse::Ok().json(serde_json::json!({
            "observations": [
                { "date": "2025-05-01", "value": "." },
                { "date": "2025-04-01", "value": "6.50" }
            ]
        }))
    }

    async fn yahoo_mock(healthy: web::Data<AtomicBool>, path: web::Path<String>) -> HttpResponse {
        let symbol = path.into_inner();
        if !healthy.load(Ordering::SeqCst) || symbol != "^NSEI" {
            return HttpResponse::NotFound().finish();
        }
        HttpResponse::Ok().json(serde_json::json!({
            "chart": {
                "result": [{
                    "meta": {
                        "symbol": "^NSEI",
                        "shortName": "NIFTY 50",
                        "currency": "INR",
                        "regularMarketPrice": 25000.0,
                        "chartPreviousClose": 24900.0,
                        "regularMarketTime": 1748599200
                    },
                    "timestamp": [1748390400, 1748476800],
                    "indicators": { "quote": [{ "close": [24900.0, 25000.0] }] }
                }],
                "error": null
            }
        }))
    }

    /// 启动本地模拟上游，返回基础地址
    async fn start_mock(healthy: Arc<AtomicBool>) -> String {
        let server = HttpServer::new(move || {
            App::new()
                .app_data(web::Data::from(healthy.clone()))
                .route(
                    "/v2/country/{country}/indicator/{code}",
                    web::get().to(world_bank_mock),
                )
                .route("/fred/series/observations", web::get().to(fred_mock))
                .route("/v8/finance/chart/{symbol}", web::get().to(yahoo_mock))
        })
        .workers(1)
        .disable_signals()
        .bind(("127.0.0.1", 0))
        .unwrap();

        let addr = server.addrs()[0];
        actix_web::rt::spawn(server.run());
        format!("http://{}", addr)
    }

    /// Alpha Vantage 是否返回限流提示
    struct RateLimited(AtomicBool);

    async fn yahoo_down_mock() -> HttpResponse {
        HttpResponse::InternalServerError().finish()
    }

    async fn alpha_vantage_mock(
        limited: web::Data<RateLimited>,
        query: web::Query<HashMap<String, String>>,
    ) -> HttpResponse {
        if query.get("apikey").map(String::as_str) != Some("av-key") {
            return HttpResponse::Unauthorized().finish();
        }
        if limited.0.load(Ordering::SeqCst) {
            return HttpResponse::Ok().json(serde_json::json!({
                "Note": "Thank you for using Alpha Vantage! Our standard API call frequency is 5 calls per minute."
            }));
        }
        HttpResponse::Ok().json(serde_json::json!({
            "Global Quote": {
                "01. symbol": query.get("symbol").cloned().unwrap_or_default(),
                "05. price": "24000.0000",
                "07. latest trading day": "2025-05-30",
                "08. previous close": "23800.0000"
            }
        }))
    }

    /// Yahoo 始终 500，Alpha Vantage 可切换为限流
    async fn start_alpha_vantage_mock(limited: Arc<RateLimited>) -> String {
        let server = HttpServer::new(move || {
            App::new()
                .app_data(web::Data::from(limited.clone()))
                .route("/v8/finance/chart/{symbol}", web::get().to(yahoo_down_mock))
                .route("/query", web::get().to(alpha_vantage_mock))
        })
        .workers(1)
        .disable_signals()
        .bind(("127.0.0.1", 0))
        .unwrap();

        let addr = server.addrs()[0];
        actix_web::rt::spawn(server.run());
        format!("http://{}", addr)
    }

    // ==================== 兜底 ====================

    #[actix_web::test]
    async fn test_yahoo_failure_uses_alpha_vantage() {
        let limited = Arc::new(RateLimited(AtomicBool::new(false)));
        let base = start_alpha_vantage_mock(limited.clone()).await;
        let mut config = config_with(&base, "", 0);
        config.providers.alpha_vantage_api_key = "av-key".to_string();
        let service = DashboardService::new(&config).unwrap();

        let nifty = service.quote("^NSEI").await.unwrap();
        assert_eq!(nifty.source, DataSource::AlphaVantage);
        assert!(!nifty.is_fallback);
        assert_eq!(nifty.price, 24000.0);
        assert!((nifty.change.unwrap() - 200.0).abs() < 1e-9);

        // 限流提示视为失败，使用最近成功值
        limited.0.store(true, Ordering::SeqCst);
        let nifty = service.quote("^NSEI").await.unwrap();
        assert!(nifty.is_fallback);
        assert_eq!(nifty.source, DataSource::AlphaVantage);
        assert_eq!(nifty.price, 24000.0);

        // 无最近成功值时使用硬编码常量
        let sensex = service.quote("^BSESN").await.unwrap();
        assert!(sensex.is_fallback);
        assert_eq!(sensex.source, DataSource::Fallback);
        assert_eq!(sensex.price, 81451.01);
    }

    #[actix_web::test]
    async fn test_unkeyed_alpha_vantage_is_skipped() {
        let limited = Arc::new(RateLimited(AtomicBool::new(false)));
        let base = start_alpha_vantage_mock(limited).await;
        let service = DashboardService::new(&config_with(&base, "", 0)).unwrap();

        let nifty = service.quote("^NSEI").await.unwrap();
        assert!(nifty.is_fallback);
        assert_eq!(nifty.source, DataSource::Fallback);
    }

    #[actix_web::test]
    async fn test_quote_cache_prunes_expired_entries() {
        let service = DashboardService::new(&config_with(UNREACHABLE, "", 0)).unwrap();
        service.quote("^NSEI").await.unwrap();
        service.quote("^BSESN").await.unwrap();
        service.quote("INR=X").await.unwrap();

        // TTL 为 0 时旧条目在写入前全部清除
        let cached = service.quote_cache.read().unwrap().len();
        assert_eq!(cached, 1);
    }

    #[actix_web::test]
    async fn test_unreachable_upstream_uses_fallback() {
        let service = DashboardService::new(&config_with(UNREACHABLE, "key", 0)).unwrap();

        let indicators = service.live_indicators().await;
        assert_eq!(indicators.len(), IndicatorKind::ALL.len());
        assert!(indicators.iter().all(|i| i.is_fallback));
        assert!(indicators.iter().all(|i| i.source == DataSource::Fallback));

        let quote = service.quote("^NSEI").await.unwrap();
        assert!(quote.is_fallback);
        assert_eq!(quote.price, 24750.70);

        assert!(service.quote("UNKNOWN").await.is_err());
        let quotes = service
            .quotes(&["^BSESN".to_string(), "UNKNOWN".to_string()])
            .await;
        assert_eq!(quotes.len(), 1);
    }

    #[actix_web::test]
    async fn test_missing_fred_key_falls_back_only_for_fred_series() {
        let healthy = Arc::new(AtomicBool::new(true));
        let base = start_mock(healthy).await;
        let service = DashboardService::new(&config_with(&base, "", 0)).unwrap();

        let inflation = service.indicator(IndicatorKind::InflationRate).await;
        assert!(!inflation.is_fallback);

        let interest = service.indicator(IndicatorKind::InterestRate).await;
        assert!(interest.is_fallback);
        assert_eq!(interest.source, DataSource::Fallback);
    }

    #[actix_web::test]
    async fn test_live_values_then_last_known() {
        let healthy = Arc::new(AtomicBool::new(true));
        let base = start_mock(healthy.clone()).await;
        let service = DashboardService::new(&config_with(&base, "key", 0)).unwrap();

        let indicators = service.live_indicators().await;
        assert!(indicators.iter().all(|i| !i.is_fallback));

        let by_kind = |kind: IndicatorKind| {
            indicators
                .iter()
                .find(|i| i.kind == kind)
                .map(|i| i.value)
                .unwrap()
        };
        assert!((by_kind(IndicatorKind::InflationRate) - 5.65).abs() < 1e-9);
        assert!((by_kind(IndicatorKind::ForeignReserves) - 640.0).abs() < 1e-6);
        assert!((by_kind(IndicatorKind::FiscalDeficit) - 4.9).abs() < 1e-9);
        assert!((by_kind(IndicatorKind::InterestRate) - 6.5).abs() < 1e-9);

        let nifty = service.quote("^NSEI").await.unwrap();
        assert!(!nifty.is_fallback);
        assert_eq!(nifty.price, 25000.0);
        assert!((nifty.change.unwrap() - 100.0).abs() < 1e-9);

        // 上游故障后使用最近成功值
        healthy.store(false, Ordering::SeqCst);
        let inflation = service.indicator(IndicatorKind::InflationRate).await;
        assert!(inflation.is_fallback);
        assert_eq!(inflation.source, DataSource::WorldBank);
        assert!((inflation.value - 5.65).abs() < 1e-9);

        let nifty = service.quote("^NSEI").await.unwrap();
        assert!(nifty.is_fallback);
        assert_eq!(nifty.price, 25000.0);
        assert_eq!(nifty.source, DataSource::YahooFinance);
    }

    #[actix_web::test]
    async fn test_indicator_cache_ttl() {
        let healthy = Arc::new(AtomicBool::new(true));
        let base = start_mock(healthy.clone()).await;
        let service = DashboardService::new(&config_with(&base, "key", 300)).unwrap();

        let first = service.live_indicators().await;
        healthy.store(false, Ordering::SeqCst);
        let second = service.live_indicators().await;
        assert_eq!(first, second);
        assert!(second.iter().all(|i| !i.is_fallback));

        service.refresh();
        let third = service.live_indicators().await;
        assert!(third.iter().all(|i| i.is_fallback));
    }

    #[actix_web::test]
    async fn test_quote_history() {
        let healthy = Arc::new(AtomicBool::new(true));
        let base = start_mock(healthy).await;
        let service = DashboardService::new(&config_with(&base, "key", 0)).unwrap();

        let history = service.quote_history("^NSEI", "1mo", "1d").await.unwrap();
        assert_eq!(history.points.len(), 2);
        assert_eq!(history.chart.data.len(), 1);

        assert!(service.quote_history("^NSEI", "10y", "1d").await.is_err());
        assert!(service.quote_history("^BSESN", "1mo", "1d").await.is_err());
    }

    // ==================== 页面视图 ====================

    fn offline_service() -> DashboardService {
        DashboardService::new(&config_with(UNREACHABLE, "", 0)).unwrap()
    }

    #[test]
    fn test_build_view_all_periods() {
        let service = offline_service();
        let data = DemoDataset::generate(NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()).unwrap();
        let view = service.build_view(&data, Period::All, Vec::new(), Vec::new());

        assert_eq!(view.header, "Comprehensive Economic Overview");
        assert_eq!(view.metrics_caption, "Latest Quarter");
        assert_eq!(view.metrics.len(), 4);
        assert!(view.charts.comparison.is_some());
        assert!(view.charts.micro.is_none());
        assert_eq!(view.tables.len(), 2);
        assert_eq!(view.tables[0].rows.len(), 3);
        assert!(view.footer.ends_with("Data updated: September 30, 2026"));
        assert!(view.warning.is_none());
    }

    #[test]
    fn test_build_view_named_period() {
        let service = offline_service();
        let data = DemoDataset::generate(NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()).unwrap();
        let view = service.build_view(&data, Period::MoreThanAYear, Vec::new(), Vec::new());

        assert_eq!(view.header, "Economic Analysis: More than a Year");
        assert!(view.charts.micro.is_some());
        assert!(view.charts.macro_factors.is_some());
        assert!(view.charts.comparison.is_none());
        assert_eq!(view.tables.len(), 2);
        assert_eq!(view.tables[0].rows.len(), 12);
        assert_eq!(view.tables[1].columns.len(), 6);
    }

    #[test]
    fn test_build_view_empty_period_warns() {
        let service = offline_service();
        let mut data =
            DemoDataset::generate(NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()).unwrap();
        data.macro_factors.clear();
        let view = service.build_view(&data, Period::SixToNineMonths, Vec::new(), Vec::new());

        assert_eq!(
            view.warning.as_deref(),
            Some("No data available for the selected period: 6-9 months")
        );
        assert!(view.metrics.is_empty());
        assert!(view.tables.is_empty());
    }

    #[test]
    fn test_dataset_cached_until_refresh() {
        let service = offline_service();
        let a = service.dataset().unwrap();
        let b = service.dataset().unwrap();
        assert!(Arc::ptr_eq(&a, &b));

        service.refresh();
        let c = service.dataset().unwrap();
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(a.micro_factors, c.micro_factors);
    }

    #[test]
    fn test_history_params() {
        assert!(validate_history_params("6mo", "1wk").is_ok());
        assert!(validate_history_params("7mo", "1d").is_err());
        assert!(validate_history_params("1y", "5m").is_err());
    }
}
