//! 公共常量和辅助函数

use anyhow::{anyhow, Result};
use chrono::{DateTime, Datelike, NaiveTime, TimeZone, Utc, Weekday};
use chrono_tz::Asia::Kolkata;
use chrono_tz::Tz;
use regex::Regex;
use reqwest::Client;
use std::time::Duration;
use url::Url;

use crate::config::ApiConfig;

// ==================== 数据源路径常量 ====================

/// Yahoo Finance 图表 API
pub const YAHOO_CHART_PATH: &str = "/v8/finance/chart";
/// Alpha Vantage 查询 API
pub const ALPHA_VANTAGE_QUERY_PATH: &str = "/query";
/// World Bank 指标 API（/v2/country/{country}/indicator/{code}）
pub const WORLD_BANK_COUNTRY_PATH: &str = "/v2/country";
/// FRED 观测值 API
pub const FRED_OBSERVATIONS_PATH: &str = "/fred/series/observations";

pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// 单个观测值
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub value: f64,
    /// 观测日期（World Bank 为年份，FRED 为 YYYY-MM-DD）
    pub date: String,
}

/// 获取印度标准时间字符串（ISO 8601 格式，带+05:30时区）
pub fn india_time() -> String {
    Utc::now().with_timezone(&Kolkata).to_rfc3339()
}

/// 当前印度时间
pub fn india_now() -> DateTime<Tz> {
    Utc::now().with_timezone(&Kolkata)
}

/// Unix 时间戳转印度时间字符串
pub fn unix_to_india(ts: i64) -> Option<String> {
    Kolkata.timestamp_opt(ts, 0).single().map(|t| t.to_rfc3339())
}

/// NSE 是否开市：周一至周五 09:15-15:30（印度时间）
pub fn is_market_open(now: DateTime<Tz>) -> bool {
    let local = now.with_timezone(&Kolkata);
    if matches!(local.weekday(), Weekday::Sat | Weekday::Sun) {
        return false;
    }
    let t = local.time();
    let open = NaiveTime::from_hms_opt(9, 15, 0);
    let close = NaiveTime::from_hms_opt(15, 30, 0);
    match (open, close) {
        (Some(open), Some(close)) => t >= open && t <= close,
        _ => false,
    }
}

/// 构造共享 HTTP 客户端
pub fn build_client(api: &ApiConfig) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(api.timeout_secs))
        .connect_timeout(Duration::from_secs(api.connect_timeout_secs))
        .gzip(true)
        .build()
        .map_err(|e| anyhow!("创建 HTTP 客户端失败: {}", e))
}

/// 拼接基础地址和路径
///
/// 基础地址可带路径前缀（如反向代理 https://host/yahoo），前缀保留
pub fn endpoint(base_url: &str, path: &str) -> Result<Url> {
    let mut base =
        Url::parse(base_url).map_err(|e| anyhow!("无效的基础地址 {}: {}", base_url, e))?;
    if !base.path().ends_with('/') {
        let prefixed = format!("{}/", base.path());
        base.set_path(&prefixed);
    }
    base.join(path.trim_start_matches('/'))
        .map_err(|e| anyhow!("无效的请求路径 {}: {}", path, e))
}

/// 对单个路径段做百分号编码（^NSEI -> %5ENSEI）
pub fn encode_segment(segment: &str) -> String {
    url::form_urlencoded::byte_serialize(segment.as_bytes()).collect()
}

/// 校验行情代码
pub fn validate_symbol(symbol: &str) -> Result<()> {
    let re = Regex::new(r"^[A-Za-z0-9^.=\-]{1,20}$")?;
    if re.is_match(symbol) {
        Ok(())
    } else {
        Err(anyhow!("无效的行情代码: {}", symbol))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_india_time() {
        let time = india_time();
        assert!(time.contains("+05:30"));
    }

    #[test]
    fn test_market_hours() {
        // 2025-05-30 是周五
        let friday_open = Kolkata.with_ymd_and_hms(2025, 5, 30, 10, 0, 0).unwrap();
        let friday_late = Kolkata.with_ymd_and_hms(2025, 5, 30, 16, 0, 0).unwrap();
        let saturday = Kolkata.with_ymd_and_hms(2025, 5, 31, 10, 0, 0).unwrap();
        let sunday = Kolkata.with_ymd_and_hms(2025, 6, 1, 11, 0, 0).unwrap();

        assert!(is_market_open(friday_open));
        assert!(!is_market_open(friday_late));
        assert!(!is_market_open(saturday));
        assert!(!is_market_open(sunday));
    }

    #[test]
    fn test_validate_symbol() {
        for ok in ["^NSEI", "^BSESN", "INR=X", "RELIANCE.NS", "BRK-B"] {
            assert!(validate_symbol(ok).is_ok(), "{} 应该有效", ok);
        }
        for bad in ["", "a/b", "x y", "<script>"] {
            assert!(validate_symbol(bad).is_err(), "{} 应该无效", bad);
        }
    }

    #[test]
    fn test_endpoint_and_encoding() {
        let path = format!("{}/{}", YAHOO_CHART_PATH, encode_segment("^NSEI"));
        let url = endpoint("https://query1.finance.yahoo.com", &path).unwrap();
        assert_eq!(
            url.as_str(),
            "https://query1.finance.yahoo.com/v8/finance/chart/%5ENSEI"
        );
        assert!(endpoint("not a url", "/x").is_err());
    }

    #[test]
    fn test_endpoint_keeps_base_prefix() {
        let url = endpoint("https://proxy.example.com/yahoo", "/v8/finance/chart/INR%3DX").unwrap();
        assert_eq!(url.as_str(), "https://proxy.example.com/yahoo/v8/finance/chart/INR%3DX");

        let url = endpoint("https://proxy.example.com/fred/", FRED_OBSERVATIONS_PATH).unwrap();
        assert_eq!(url.as_str(), "https://proxy.example.com/fred/fred/series/observations");
    }
}
