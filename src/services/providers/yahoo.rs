//! Yahoo Finance 行情接口实现
//!
//! 对接 /v8/finance/chart/{symbol}，提供实时行情和历史收盘价

use anyhow::{anyhow, Result};
use chrono::{TimeZone, Utc};
use chrono_tz::Asia::Kolkata;
use reqwest::Client;
use serde::Deserialize;

use crate::models::{DataSource, MarketQuote, PricePoint};

use super::common::{
    encode_segment, endpoint, india_now, india_time, is_market_open, unix_to_india,
    validate_symbol, YAHOO_CHART_PATH,
};

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    symbol: Option<String>,
    currency: Option<String>,
    short_name: Option<String>,
    long_name: Option<String>,
    regular_market_price: Option<f64>,
    regular_market_time: Option<i64>,
    chart_previous_close: Option<f64>,
    previous_close: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Option<Indicators>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteSeries>,
}

#[derive(Debug, Deserialize)]
struct QuoteSeries {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

/// Yahoo Finance 客户端
pub struct YahooClient {
    /// HTTP 客户端
    client: Client,
    base_url: String,
}

impl YahooClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// 获取实时行情
    ///
    /// 休市时返回最近收盘价；无价格字段视为无数据
    pub async fn get_quote(&self, symbol: &str) -> Result<MarketQuote> {
        let text = self.fetch_chart(symbol, "1d", "1d").await?;
        parse_quote(&text, symbol)
    }

    /// 获取历史收盘价
    ///
    /// range: 1mo, 3mo, 6mo, 1y, 2y；interval: 1d, 1wk, 1mo
    pub async fn get_history(
        &self,
        symbol: &str,
        range: &str,
        interval: &str,
    ) -> Result<Vec<PricePoint>> {
        let text = self.fetch_chart(symbol, range, interval).await?;
        parse_history(&text)
    }

    async fn fetch_chart(&self, symbol: &str, range: &str, interval: &str) -> Result<String> {
        validate_symbol(symbol)?;

        let path = format!("{}/{}", YAHOO_CHART_PATH, encode_segment(symbol));
        let url = endpoint(&self.base_url, &path)?;
        log::debug!("📡 请求 Yahoo 行情 URL: {}", url);

        let response = self
            .client
            .get(url)
            .query(&[("range", range), ("interval", interval)])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!("获取 Yahoo 行情失败: {} ({})", response.status(), symbol));
        }

        Ok(response.text().await?)
    }
}

fn first_result(text: &str) -> Result<ChartData> {
    let parsed: ChartResponse =
        serde_json::from_str(text).map_err(|e| anyhow!("解析 Yahoo 响应失败: {}", e))?;

    if let Some(err) = parsed.chart.error {
        return Err(anyhow!("Yahoo 返回错误: {} - {}", err.code, err.description));
    }

    parsed
        .chart
        .result
        .and_then(|r| r.into_iter().next())
        .ok_or_else(|| anyhow!("Yahoo 响应中无数据"))
}

/// 解析实时行情
fn parse_quote(text: &str, symbol: &str) -> Result<MarketQuote> {
    let data = first_result(text)?;
    let meta = data.meta;

    let price = meta
        .regular_market_price
        .ok_or_else(|| anyhow!("{} 无最新价格（可能休市）", symbol))?;

    let timestamp = meta
        .regular_market_time
        .and_then(unix_to_india)
        .unwrap_or_else(india_time);

    let quote = MarketQuote {
        symbol: meta.symbol.unwrap_or_else(|| symbol.to_string()),
        name: meta
            .short_name
            .or(meta.long_name)
            .unwrap_or_else(|| symbol.to_string()),
        price,
        change: None,
        change_percent: None,
        currency: meta.currency,
        timestamp,
        source: DataSource::YahooFinance,
        market_open: is_market_open(india_now()),
        is_fallback: false,
    };

    Ok(quote.with_previous_close(meta.chart_previous_close.or(meta.previous_close)))
}

/// 解析历史收盘价，跳过空值（周末、节假日）
fn parse_history(text: &str) -> Result<Vec<PricePoint>> {
    let data = first_result(text)?;

    let closes = data
        .indicators
        .and_then(|i| i.quote.into_iter().next())
        .map(|q| q.close)
        .unwrap_or_default();

    let points = data
        .timestamp
        .iter()
        .zip(closes)
        .filter_map(|(ts, close)| {
            let close = close?;
            let date = Utc
                .timestamp_opt(*ts, 0)
                .single()?
                .with_timezone(&Kolkata)
                .format("%Y-%m-%d")
                .to_string();
            Some(PricePoint { date, close })
        })
        .collect();

    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;

    const QUOTE_JSON: &str = r#"{"chart":{"result":[{"meta":{"currency":"INR","symbol":"^NSEI","shortName":"NIFTY 50","regularMarketPrice":24750.7,"regularMarketTime":1748599200,"chartPreviousClose":24833.6},"timestamp":[1748599200],"indicators":{"quote":[{"close":[24750.7]}]}}],"error":null}}"#;

    #[test]
    fn test_parse_quote() {
        let quote = parse_quote(QUOTE_JSON, "^NSEI").unwrap();
        assert_eq!(quote.symbol, "^NSEI");
        assert_eq!(quote.name, "NIFTY 50");
        assert_eq!(quote.currency.as_deref(), Some("INR"));
        assert!((quote.price - 24750.7).abs() < 1e-9);
        assert!((quote.change.unwrap() - (24750.7 - 24833.6)).abs() < 1e-6);
        assert!(quote.timestamp.ends_with("+05:30"));
        assert!(!quote.is_fallback);
    }

    #[test]
    fn test_parse_quote_without_price() {
        let json = r#"{"chart":{"result":[{"meta":{"symbol":"^NSEI"}}],"error":null}}"#;
        assert!(parse_quote(json, "^NSEI").is_err());
    }

    #[test]
    fn test_parse_error_body() {
        let json = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        let err = parse_quote(json, "XXXX").unwrap_err();
        assert!(err.to_string().contains("Not Found"));
    }

    #[test]
    fn test_parse_history_skips_gaps() {
        let json = r#"{"chart":{"result":[{"meta":{"symbol":"^NSEI"},"timestamp":[1748390400,1748476800,1748563200],"indicators":{"quote":[{"close":[24700.0,null,24750.5]}]}}],"error":null}}"#;
        let points = parse_history(json).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].close, 24700.0);
        assert_eq!(points[1].close, 24750.5);
        assert!(points[0].date < points[1].date);
    }
}
