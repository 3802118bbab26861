//! 兜底数据
//!
//! 接口失败或无数据（如周末休市）时使用：
//! 1. 最近一次成功获取的值（保留原数据源和日期）
//! 2. 否则使用硬编码常量

use std::collections::HashMap;
use std::sync::RwLock;

use crate::models::{DataSource, Indicator, IndicatorKind, MarketQuote};

use super::providers::{india_now, is_market_open};

/// 硬编码数据的日期
pub const FALLBACK_DATE: &str = "2025-05-31";

/// 指标硬编码值
pub fn hardcoded_indicator_value(kind: IndicatorKind) -> f64 {
    match kind {
        IndicatorKind::InflationRate => 4.95,
        IndicatorKind::InterestRate => 6.0,
        IndicatorKind::UnemploymentRate => 4.2,
        IndicatorKind::ConsumerPriceIndex => 195.0,
        IndicatorKind::IndustrialProduction => 108.0,
        IndicatorKind::GdpGrowthRate => 6.5,
        IndicatorKind::ExchangeRate => 85.5,
        IndicatorKind::FiscalDeficit => 4.8,
        IndicatorKind::ForeignReserves => 640.0,
        IndicatorKind::CurrentAccountBalance => -0.7,
    }
}

/// 行情硬编码值 (代码, 名称, 价格, 货币)
const HARDCODED_QUOTES: [(&str, &str, f64, &str); 3] = [
    ("^NSEI", "NIFTY 50", 24750.70, "INR"),
    ("^BSESN", "S&P BSE SENSEX", 81451.01, "INR"),
    ("INR=X", "USD/INR", 85.52, "INR"),
];

/// 兜底数据存储
#[derive(Default)]
pub struct FallbackStore {
    indicators: RwLock<HashMap<IndicatorKind, Indicator>>,
    quotes: RwLock<HashMap<String, MarketQuote>>,
}

impl FallbackStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录成功获取的指标
    pub fn record_indicator(&self, indicator: &Indicator) {
        if indicator.is_fallback {
            return;
        }
        let mut map = self.indicators.write().unwrap_or_else(|e| e.into_inner());
        map.insert(indicator.kind, indicator.clone());
    }

    /// 记录成功获取的行情
    pub fn record_quote(&self, quote: &MarketQuote) {
        if quote.is_fallback {
            return;
        }
        let mut map = self.quotes.write().unwrap_or_else(|e| e.into_inner());
        map.insert(quote.symbol.to_uppercase(), quote.clone());
    }

    /// 指标兜底值：最近一次成功值，否则硬编码常量
    pub fn indicator(&self, kind: IndicatorKind) -> Indicator {
        let last_known = self
            .indicators
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&kind)
            .cloned();

        let mut indicator = last_known.unwrap_or_else(|| {
            Indicator::live(
                kind,
                hardcoded_indicator_value(kind),
                FALLBACK_DATE.to_string(),
                DataSource::Fallback,
            )
        });
        indicator.is_fallback = true;
        indicator
    }

    /// 行情兜底值；未知代码且无历史值时返回 None
    pub fn quote(&self, symbol: &str) -> Option<MarketQuote> {
        let key = symbol.to_uppercase();
        let last_known = self
            .quotes
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(&key)
            .cloned();

        let mut quote = last_known.or_else(|| hardcoded_quote(&key))?;
        quote.is_fallback = true;
        quote.market_open = is_market_open(india_now());
        Some(quote)
    }
}

fn hardcoded_quote(symbol: &str) -> Option<MarketQuote> {
    HARDCODED_QUOTES
        .iter()
        .find(|(s, ..)| s.eq_ignore_ascii_case(symbol))
        .map(|(s, name, price, currency)| MarketQuote {
            symbol: s.to_string(),
            name: name.to_string(),
            price: *price,
            change: None,
            change_percent: None,
            currency: Some(currency.to_string()),
            timestamp: FALLBACK_DATE.to_string(),
            source: DataSource::Fallback,
            market_open: false,
            is_fallback: true,
        })
}
