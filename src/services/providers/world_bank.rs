//! World Bank 指标接口实现
//!
//! 对接 https://api.worldbank.org/v2/country/{country}/indicator/{code}
//! 年度数据，取最近一个非空观测值

use anyhow::{anyhow, Result};
use reqwest::Client;

use super::common::{encode_segment, endpoint, Observation, WORLD_BANK_COUNTRY_PATH};

/// World Bank 客户端
pub struct WorldBankClient {
    client: Client,
    base_url: String,
}

impl WorldBankClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    /// 获取指定国家某指标的最新值
    ///
    /// # 参数
    /// - country: ISO 国家代码（如 IND）
    /// - indicator: 指标代码（如 FP.CPI.TOTL.ZG）
    pub async fn get_latest(&self, country: &str, indicator: &str) -> Result<Observation> {
        let path = format!(
            "{}/{}/indicator/{}",
            WORLD_BANK_COUNTRY_PATH,
            encode_segment(&country.to_uppercase()),
            encode_segment(indicator)
        );
        let url = endpoint(&self.base_url, &path)?;
        log::debug!("📡 请求 World Bank 指标 URL: {}", url);

        let response = self
            .client
            .get(url)
            .query(&[("format", "json"), ("mrnev", "1"), ("per_page", "5")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!(
                "World Bank 请求失败: {} ({})",
                response.status(),
                indicator
            ));
        }

        let text = response.text().await?;
        parse_latest(&text, indicator)
    }
}

/// 解析 World Bank 响应
///
/// 正常格式: [ {page信息}, [ {"date":"2024","value":4.95,...}, ... ] ]
/// 错误格式: [ {"message":[{"id":"120","key":"Invalid value","value":"..."}]} ]
fn parse_latest(text: &str, indicator: &str) -> Result<Observation> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|e| anyhow!("解析 World Bank 响应失败: {}", e))?;

    let arr = value
        .as_array()
        .ok_or_else(|| anyhow!("World Bank 响应格式无效"))?;

    if let Some(message) = arr
        .first()
        .and_then(|meta| meta.get("message"))
        .and_then(|m| m.get(0))
    {
        let key = message["key"].as_str().unwrap_or("");
        let detail = message["value"].as_str().unwrap_or("");
        return Err(anyhow!("World Bank 返回错误: {} {}", key, detail));
    }

    let points = arr
        .get(1)
        .and_then(|v| v.as_array())
        .ok_or_else(|| anyhow!("World Bank 无 {} 的数据", indicator))?;

    points
        .iter()
        .find_map(|p| {
            let value = p["value"].as_f64()?;
            let date = p["date"].as_str()?.to_string();
            Some(Observation { value, date })
        })
        .ok_or_else(|| anyhow!("World Bank {} 无非空观测值", indicator))
}
