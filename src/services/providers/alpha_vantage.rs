//! Alpha Vantage 行情接口实现
//!
//! 作为 Yahoo Finance 之后的备用行情源：
//! - 股票/指数：GLOBAL_QUOTE
//! - 汇率（如 INR=X）：CURRENCY_EXCHANGE_RATE

use anyhow::{anyhow, Result};
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;

use crate::models::{DataSource, MarketQuote};

use super::common::{endpoint, india_now, india_time, is_market_open, ALPHA_VANTAGE_QUERY_PATH};

#[derive(Debug, Deserialize)]
struct GlobalQuote {
    #[serde(rename = "01. symbol")]
    symbol: Option<String>,
    #[serde(rename = "05. price")]
    price: Option<String>,
    #[serde(rename = "07. latest trading day")]
    latest_trading_day: Option<String>,
    #[serde(rename = "08. previous close")]
    previous_close: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ExchangeRate {
    #[serde(rename = "1. From_Currency Code")]
    from: Option<String>,
    #[serde(rename = "3. To_Currency Code")]
    to: Option<String>,
    #[serde(rename = "5. Exchange Rate")]
    rate: Option<String>,
    #[serde(rename = "6. Last Refreshed")]
    last_refreshed: Option<String>,
}

/// Alpha Vantage 客户端
pub struct AlphaVantageClient {
    client: Client,
    base_url: String,
    /// API Key，为空时不发起请求
    api_key: String,
}

impl AlphaVantageClient {
    pub fn new(client: Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// 是否配置了 API Key
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }

    /// 获取实时行情，汇率代码自动走 CURRENCY_EXCHANGE_RATE
    pub async fn get_quote(&self, symbol: &str) -> Result<MarketQuote> {
        if let Some((from, to)) = fx_pair(symbol)? {
            let text = self
                .fetch(&[
                    ("function", "CURRENCY_EXCHANGE_RATE"),
                    ("from_currency", from.as_str()),
                    ("to_currency", to.as_str()),
                ])
                .await?;
            return parse_exchange_rate(&text, symbol);
        }

        let text = self
            .fetch(&[("function", "GLOBAL_QUOTE"), ("symbol", symbol)])
            .await?;
        parse_global_quote(&text, symbol)
    }

    async fn fetch(&self, params: &[(&str, &str)]) -> Result<String> {
        if !self.is_configured() {
            return Err(anyhow!("未配置 Alpha Vantage API Key"));
        }

        let url = endpoint(&self.base_url, ALPHA_VANTAGE_QUERY_PATH)?;
        log::debug!("📡 请求 Alpha Vantage URL: {} {:?}", url, params);

        let response = self
            .client
            .get(url)
            .query(params)
            .query(&[("apikey", self.api_key.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!("Alpha Vantage 请求失败: {}", response.status()));
        }

        Ok(response.text().await?)
    }
}

/// 识别 Yahoo 风格的汇率代码
///
/// INR=X -> (USD, INR)，EURINR=X -> (EUR, INR)
fn fx_pair(symbol: &str) -> Result<Option<(String, String)>> {
    let re = Regex::new(r"^([A-Z]{3})?([A-Z]{3})=X$")?;
    Ok(re.captures(&symbol.to_uppercase()).map(|cap| {
        let from = cap
            .get(1)
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| "USD".to_string());
        let to = cap.get(2).map(|m| m.as_str().to_string()).unwrap_or_default();
        (from, to)
    }))
}

/// 检查限流、密钥错误等提示
fn check_api_message(value: &serde_json::Value) -> Result<()> {
    for key in ["Note", "Information", "Error Message"] {
        if let Some(msg) = value.get(key).and_then(|v| v.as_str()) {
            return Err(anyhow!("Alpha Vantage 返回提示: {}", msg));
        }
    }
    Ok(())
}

fn parse_number(s: Option<&String>) -> Option<f64> {
    s.and_then(|v| v.trim().parse::<f64>().ok())
}

/// 解析 GLOBAL_QUOTE 响应
fn parse_global_quote(text: &str, symbol: &str) -> Result<MarketQuote> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|e| anyhow!("解析 Alpha Vantage 响应失败: {}", e))?;
    check_api_message(&value)?;

    let body = value
        .get("Global Quote")
        .cloned()
        .ok_or_else(|| anyhow!("Alpha Vantage 响应缺少 Global Quote"))?;
    let quote: GlobalQuote = serde_json::from_value(body)?;

    let price = parse_number(quote.price.as_ref())
        .ok_or_else(|| anyhow!("Alpha Vantage 无 {} 的行情数据", symbol))?;

    let quote_symbol = quote.symbol.unwrap_or_else(|| symbol.to_string());
    let result = MarketQuote {
        name: quote_symbol.clone(),
        symbol: quote_symbol,
        price,
        change: None,
        change_percent: None,
        currency: None,
        timestamp: quote.latest_trading_day.clone().unwrap_or_else(india_time),
        source: DataSource::AlphaVantage,
        market_open: is_market_open(india_now()),
        is_fallback: false,
    };

    Ok(result.with_previous_close(parse_number(quote.previous_close.as_ref())))
}

/// 解析 CURRENCY_EXCHANGE_RATE 响应
fn parse_exchange_rate(text: &str, symbol: &str) -> Result<MarketQuote> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|e| anyhow!("解析 Alpha Vantage 响应失败: {}", e))?;
    check_api_message(&value)?;

    let body = value
        .get("Realtime Currency Exchange Rate")
        .cloned()
        .ok_or_else(|| anyhow!("Alpha Vantage 响应缺少汇率数据"))?;
    let rate: ExchangeRate = serde_json::from_value(body)?;

    let price = parse_number(rate.rate.as_ref())
        .ok_or_else(|| anyhow!("Alpha Vantage 无 {} 的汇率数据", symbol))?;

    Ok(MarketQuote {
        symbol: symbol.to_string(),
        name: format!(
            "{}/{}",
            rate.from.as_deref().unwrap_or("USD"),
            rate.to.as_deref().unwrap_or("")
        ),
        price,
        change: None,
        change_percent: None,
        currency: rate.to,
        timestamp: rate.last_refreshed.unwrap_or_else(india_time),
        source: DataSource::AlphaVantage,
        market_open: is_market_open(india_now()),
        is_fallback: false,
    })
}
