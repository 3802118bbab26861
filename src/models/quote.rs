//! 行情数据模型
//!
//! 定义指数、汇率等市场行情的数据结构

use serde::{Deserialize, Serialize};

use super::{DataSource, Figure};

/// 市场实时行情
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MarketQuote {
    /// 行情代码（如 ^NSEI）
    pub symbol: String,
    /// 名称
    pub name: String,
    /// 最新价
    pub price: f64,
    /// 涨跌额
    pub change: Option<f64>,
    /// 涨跌幅（百分比）
    pub change_percent: Option<f64>,
    /// 计价货币
    pub currency: Option<String>,
    /// 行情时间
    pub timestamp: String,
    /// 数据来源
    pub source: DataSource,
    /// 印度市场当前是否开市
    pub market_open: bool,
    /// 是否为兜底值
    pub is_fallback: bool,
}

impl MarketQuote {
    /// 按前收盘价计算涨跌
    pub fn with_previous_close(mut self, prev_close: Option<f64>) -> Self {
        if let Some(prev) = prev_close.filter(|p| *p > 0.0) {
            let change = self.price - prev;
            self.change = Some(change);
            self.change_percent = Some(change / prev * 100.0);
        }
        self
    }
}

/// 历史收盘价
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PricePoint {
    /// 日期（YYYY-MM-DD）
    pub date: String,
    /// 收盘价
    pub close: f64,
}

/// 历史行情及图表
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct QuoteHistory {
    pub symbol: String,
    pub range: String,
    pub interval: String,
    pub points: Vec<PricePoint>,
    pub chart: Figure,
}

/// 行情列表查询参数
#[derive(Debug, Deserialize)]
pub struct QuoteQuery {
    /// 逗号分隔的行情代码，缺省使用配置中的代码
    pub symbols: Option<String>,
}

/// 历史行情查询参数
#[derive(Debug, Deserialize)]
pub struct QuoteHistoryQuery {
    /// 时间范围：1mo, 3mo, 6mo, 1y, 2y
    pub range: Option<String>,
    /// K线周期：1d, 1wk, 1mo
    pub interval: Option<String>,
}
