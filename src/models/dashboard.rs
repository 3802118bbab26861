//! 仪表盘数据模型
//!
//! 定义时间区间、月度因子序列、汇总指标、图表和页面视图

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{Indicator, MarketQuote};

/// 时间区间
///
/// 以当前日期为基准向前回溯的月份窗口
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Period {
    #[serde(rename = "0-3 months")]
    ZeroToThreeMonths,
    #[serde(rename = "3-6 months")]
    ThreeToSixMonths,
    #[serde(rename = "6-9 months")]
    SixToNineMonths,
    #[serde(rename = "More than a Year")]
    MoreThanAYear,
    #[serde(rename = "All Periods")]
    All,
}

impl Period {
    /// 具名区间（不含 All）
    pub const NAMED: [Period; 4] = [
        Period::ZeroToThreeMonths,
        Period::ThreeToSixMonths,
        Period::SixToNineMonths,
        Period::MoreThanAYear,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Period::ZeroToThreeMonths => "0-3 months",
            Period::ThreeToSixMonths => "3-6 months",
            Period::SixToNineMonths => "6-9 months",
            Period::MoreThanAYear => "More than a Year",
            Period::All => "All Periods",
        }
    }

    pub fn slug(&self) -> &'static str {
        match self {
            Period::ZeroToThreeMonths => "0-3m",
            Period::ThreeToSixMonths => "3-6m",
            Period::SixToNineMonths => "6-9m",
            Period::MoreThanAYear => "1y+",
            Period::All => "all",
        }
    }

    /// 回溯月份范围 (起, 止)，All 返回 None
    pub fn months(&self) -> Option<(u32, u32)> {
        match self {
            Period::ZeroToThreeMonths => Some((0, 3)),
            Period::ThreeToSixMonths => Some((3, 6)),
            Period::SixToNineMonths => Some((6, 9)),
            Period::MoreThanAYear => Some((12, 24)),
            Period::All => None,
        }
    }
}

impl Default for Period {
    fn default() -> Self {
        Period::All
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Period {
    type Err = anyhow::Error;

    /// 接受展示名称（不区分大小写）或简写
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Period::NAMED
            .iter()
            .chain(std::iter::once(&Period::All))
            .copied()
            .find(|p| p.slug() == wanted || p.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| anyhow::anyhow!("未知的时间区间: {}", s))
    }
}

/// 图表种类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    Micro,
    Macro,
    Comparison,
}

impl FromStr for ChartKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "micro" => Ok(ChartKind::Micro),
            "macro" => Ok(ChartKind::Macro),
            "comparison" => Ok(ChartKind::Comparison),
            other => Err(anyhow::anyhow!("未知的图表: {}", other)),
        }
    }
}

/// 带日期的序列行
pub trait Dated {
    fn date(&self) -> NaiveDate;
}

/// 月度微观因子
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MicroFactorRow {
    pub date: NaiveDate,
    /// 通胀率（%）
    pub inflation_rate: f64,
    /// 利率（%）
    pub interest_rate: f64,
    /// 失业率（%）
    pub unemployment_rate: f64,
    /// 消费者价格指数
    pub consumer_price_index: f64,
    /// 工业生产指数
    pub industrial_production: f64,
}

/// 月度宏观因子
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MacroFactorRow {
    pub date: NaiveDate,
    /// GDP 增长率（%）
    pub gdp_growth_rate: f64,
    /// 汇率（INR/USD）
    pub exchange_rate: f64,
    /// 财政赤字（% of GDP）
    pub fiscal_deficit: f64,
    /// 外汇储备（十亿美元）
    pub foreign_reserves: f64,
    /// 经常账户余额（% of GDP）
    pub current_account_balance: f64,
}

impl Dated for MicroFactorRow {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

impl Dated for MacroFactorRow {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

/// 汇总指标卡片
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SummaryMetric {
    pub label: String,
    pub value: f64,
    /// 格式化后的值，如 "5.52%" 或 "₹76.10"
    pub display: String,
    /// 区间末值减首值
    pub delta: f64,
    pub delta_display: String,
}

/// 各区间均值对比
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PeriodComparison {
    pub period: Period,
    pub inflation: f64,
    pub gdp_growth: f64,
    pub unemployment: f64,
    pub exchange_rate: f64,
}

/// Plotly 图表描述（data + layout）
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Figure {
    pub data: Vec<serde_json::Value>,
    pub layout: serde_json::Value,
}

/// 表格（已格式化的单元格）
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Table {
    pub title: String,
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// 页面图表
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct DashboardCharts {
    pub micro: Option<Figure>,
    pub macro_factors: Option<Figure>,
    pub comparison: Option<Figure>,
}

/// 完整的仪表盘视图
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DashboardView {
    /// 页面标题
    pub title: String,
    /// 区块标题
    pub header: String,
    /// 当前区间
    pub period: Period,
    /// 汇总指标说明（如 "Latest Quarter"）
    pub metrics_caption: String,
    pub metrics: Vec<SummaryMetric>,
    /// 实时经济指标
    pub indicators: Vec<Indicator>,
    /// 实时行情
    pub quotes: Vec<MarketQuote>,
    pub charts: DashboardCharts,
    pub tables: Vec<Table>,
    /// 区间无数据时的提示
    pub warning: Option<String>,
    /// 页脚
    pub footer: String,
}

/// 仪表盘查询参数
#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    /// 时间区间（名称或简写），缺省为 All Periods
    pub period: Option<String>,
}

/// 区间列表项
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct PeriodInfo {
    pub slug: String,
    pub label: String,
    pub start_months: Option<u32>,
    pub end_months: Option<u32>,
}

impl From<Period> for PeriodInfo {
    fn from(p: Period) -> Self {
        let months = p.months();
        Self {
            slug: p.slug().to_string(),
            label: p.label().to_string(),
            start_months: months.map(|m| m.0),
            end_months: months.map(|m| m.1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_parse() {
        assert_eq!("0-3m".parse::<Period>().unwrap(), Period::ZeroToThreeMonths);
        assert_eq!("More than a Year".parse::<Period>().unwrap(), Period::MoreThanAYear);
        assert_eq!("all periods".parse::<Period>().unwrap(), Period::All);
        assert_eq!("1y+".parse::<Period>().unwrap(), Period::MoreThanAYear);
        assert!("9-12 months".parse::<Period>().is_err());
    }

    #[test]
    fn test_chart_kind_parse() {
        assert_eq!("Comparison".parse::<ChartKind>().unwrap(), ChartKind::Comparison);
        assert!("pie".parse::<ChartKind>().is_err());
    }

    #[test]
    fn test_period_months() {
        assert_eq!(Period::MoreThanAYear.months(), Some((12, 24)));
        assert_eq!(Period::All.months(), None);
        assert_eq!(serde_json::to_value(Period::SixToNineMonths).unwrap(), "6-9 months");
    }
}
