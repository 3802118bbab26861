//! 经济指标数据模型
//!
//! 定义经济指标相关的数据结构，包括：
//! - 数据来源
//! - 微观/宏观因子分类
//! - 指标种类及其展示信息
//! - 单个指标读数

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 数据来源
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    YahooFinance,
    AlphaVantage,
    WorldBank,
    Fred,
    /// 硬编码兜底值
    Fallback,
}

impl DataSource {
    /// 页面展示名称
    pub fn label(&self) -> &'static str {
        match self {
            DataSource::YahooFinance => "Yahoo Finance",
            DataSource::AlphaVantage => "Alpha Vantage",
            DataSource::WorldBank => "World Bank",
            DataSource::Fred => "FRED",
            DataSource::Fallback => "Fallback",
        }
    }
}

/// 因子分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FactorCategory {
    /// 微观因子：通胀、利率、失业率等
    Micro,
    /// 宏观因子：GDP、汇率、财政赤字、外汇储备等
    Macro,
}

impl FromStr for FactorCategory {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "micro" => Ok(FactorCategory::Micro),
            "macro" => Ok(FactorCategory::Macro),
            other => Err(anyhow::anyhow!("未知的因子分类: {}", other)),
        }
    }
}

/// 指标种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorKind {
    InflationRate,
    InterestRate,
    UnemploymentRate,
    ConsumerPriceIndex,
    IndustrialProduction,
    GdpGrowthRate,
    ExchangeRate,
    FiscalDeficit,
    ForeignReserves,
    CurrentAccountBalance,
}

impl IndicatorKind {
    /// 全部指标，微观在前
    pub const ALL: [IndicatorKind; 10] = [
        IndicatorKind::InflationRate,
        IndicatorKind::InterestRate,
        IndicatorKind::UnemploymentRate,
        IndicatorKind::ConsumerPriceIndex,
        IndicatorKind::IndustrialProduction,
        IndicatorKind::GdpGrowthRate,
        IndicatorKind::ExchangeRate,
        IndicatorKind::FiscalDeficit,
        IndicatorKind::ForeignReserves,
        IndicatorKind::CurrentAccountBalance,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            IndicatorKind::InflationRate => "inflation_rate",
            IndicatorKind::InterestRate => "interest_rate",
            IndicatorKind::UnemploymentRate => "unemployment_rate",
            IndicatorKind::ConsumerPriceIndex => "consumer_price_index",
            IndicatorKind::IndustrialProduction => "industrial_production",
            IndicatorKind::GdpGrowthRate => "gdp_growth_rate",
            IndicatorKind::ExchangeRate => "exchange_rate",
            IndicatorKind::FiscalDeficit => "fiscal_deficit",
            IndicatorKind::ForeignReserves => "foreign_reserves",
            IndicatorKind::CurrentAccountBalance => "current_account_balance",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            IndicatorKind::InflationRate => "Inflation Rate",
            IndicatorKind::InterestRate => "Interest Rate",
            IndicatorKind::UnemploymentRate => "Unemployment Rate",
            IndicatorKind::ConsumerPriceIndex => "Consumer Price Index",
            IndicatorKind::IndustrialProduction => "Industrial Production",
            IndicatorKind::GdpGrowthRate => "GDP Growth Rate",
            IndicatorKind::ExchangeRate => "Exchange Rate",
            IndicatorKind::FiscalDeficit => "Fiscal Deficit",
            IndicatorKind::ForeignReserves => "Foreign Reserves",
            IndicatorKind::CurrentAccountBalance => "Current Account Balance",
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            IndicatorKind::ConsumerPriceIndex | IndicatorKind::IndustrialProduction => "index",
            IndicatorKind::ExchangeRate => "INR/USD",
            IndicatorKind::ForeignReserves => "Billion USD",
            IndicatorKind::CurrentAccountBalance => "% of GDP",
            IndicatorKind::FiscalDeficit => "% of GDP",
            _ => "%",
        }
    }

    pub fn category(&self) -> FactorCategory {
        match self {
            IndicatorKind::InflationRate
            | IndicatorKind::InterestRate
            | IndicatorKind::UnemploymentRate
            | IndicatorKind::ConsumerPriceIndex
            | IndicatorKind::IndustrialProduction => FactorCategory::Micro,
            _ => FactorCategory::Macro,
        }
    }
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slug())
    }
}

impl FromStr for IndicatorKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase().replace('-', "_");
        IndicatorKind::ALL
            .iter()
            .copied()
            .find(|k| k.slug() == wanted)
            .ok_or_else(|| anyhow::anyhow!("未知的指标: {}", s))
    }
}

/// 单个经济指标读数
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Indicator {
    /// 指标种类
    pub kind: IndicatorKind,
    /// 指标名称
    pub name: String,
    /// 指标值
    pub value: f64,
    /// 单位
    pub unit: String,
    /// 观测日期（年份或 YYYY-MM-DD）
    pub date: String,
    /// 数据来源
    pub source: DataSource,
    /// 微观/宏观
    pub category: FactorCategory,
    /// 是否为兜底值（接口失败或无数据）
    pub is_fallback: bool,
}

impl Indicator {
    /// 由实时读数构造
    pub fn live(kind: IndicatorKind, value: f64, date: String, source: DataSource) -> Self {
        Self {
            kind,
            name: kind.label().to_string(),
            value,
            unit: kind.unit().to_string(),
            date,
            source,
            category: kind.category(),
            is_fallback: false,
        }
    }

    /// 格式化后的展示值
    pub fn display_value(&self) -> String {
        match self.kind {
            IndicatorKind::ExchangeRate => format!("₹{:.2}", self.value),
            IndicatorKind::ForeignReserves => format!("${:.1}B", self.value),
            IndicatorKind::ConsumerPriceIndex | IndicatorKind::IndustrialProduction => {
                format!("{:.2}", self.value)
            }
            _ => format!("{:.2}%", self.value),
        }
    }
}

/// 指标查询参数
#[derive(Debug, Deserialize)]
pub struct IndicatorQuery {
    /// 分类过滤：micro / macro
    pub category: Option<String>,
}
