//! FRED（圣路易斯联储）时间序列接口实现
//!
//! 对接 /fred/series/observations，缺失值以 "." 表示

use anyhow::{anyhow, Result};
use regex::Regex;
use reqwest::Client;
use serde::Deserialize;

use super::common::{endpoint, Observation, FRED_OBSERVATIONS_PATH};

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    #[serde(default)]
    observations: Vec<RawObservation>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawObservation {
    date: String,
    value: String,
}

/// FRED 客户端
pub struct FredClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl FredClient {
    pub fn new(client: Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// 获取序列最新的有效观测值
    pub async fn get_latest(&self, series_id: &str) -> Result<Observation> {
        if self.api_key.is_empty() {
            return Err(anyhow!("未配置 FRED API Key"));
        }
        validate_series_id(series_id)?;

        let url = endpoint(&self.base_url, FRED_OBSERVATIONS_PATH)?;
        log::debug!("📡 请求 FRED 序列 {} URL: {}", series_id, url);

        let response = self
            .client
            .get(url)
            .query(&[
                ("series_id", series_id),
                ("api_key", self.api_key.as_str()),
                ("file_type", "json"),
                ("sort_order", "desc"),
                ("limit", "12"),
            ])
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            // FRED 的错误信息放在 JSON 体中
            let detail = serde_json::from_str::<ObservationsResponse>(&text)
                .ok()
                .and_then(|r| r.error_message)
                .unwrap_or_default();
            return Err(anyhow!("FRED 请求失败: {} {}", status, detail));
        }

        parse_latest(&text, series_id)
    }
}

fn validate_series_id(series_id: &str) -> Result<()> {
    let re = Regex::new(r"^[A-Z0-9]{1,30}$")?;
    if re.is_match(series_id) {
        Ok(())
    } else {
        Err(anyhow!("无效的 FRED 序列代码: {}", series_id))
    }
}

/// 解析观测值，跳过 "." 缺失值
fn parse_latest(text: &str, series_id: &str) -> Result<Observation> {
    let parsed: ObservationsResponse =
        serde_json::from_str(text).map_err(|e| anyhow!("解析 FRED 响应失败: {}", e))?;

    if let Some(msg) = parsed.error_message {
        return Err(anyhow!("FRED 返回错误: {}", msg));
    }

    parsed
        .observations
        .into_iter()
        .find_map(|o| {
            let value = o.value.trim().parse::<f64>().ok()?;
            Some(Observation { value, date: o.date })
        })
        .ok_or_else(|| anyhow!("FRED {} 无有效观测值", series_id))
}
