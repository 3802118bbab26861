//! 第三方数据源
//!
//! 封装对外部 REST 接口的调用，所有客户端共享同一个 reqwest::Client
//!
//! ## 数据来源
//! - Yahoo Finance：指数、汇率实时行情及历史收盘价
//! - Alpha Vantage：备用行情源（需 API Key）
//! - World Bank：年度宏观指标（通胀、失业率、GDP、外汇储备等）
//! - FRED：月度序列（利率、CPI、工业生产、汇率，需 API Key）

mod alpha_vantage;
mod common;
mod fred;
mod world_bank;
mod yahoo;

pub use alpha_vantage::AlphaVantageClient;
pub use common::{build_client, india_now, india_time, is_market_open, validate_symbol};
pub use fred::FredClient;
pub use world_bank::WorldBankClient;
pub use yahoo::YahooClient;

use crate::models::IndicatorKind;

/// 指标的实时数据来源
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum IndicatorSource {
    /// World Bank 指标代码及换算系数
    WorldBank { code: &'static str, scale: f64 },
    /// FRED 序列代码
    Fred { series: &'static str },
}

/// 指标与数据源的映射
pub fn indicator_source(kind: IndicatorKind) -> IndicatorSource {
    use IndicatorSource::{Fred, WorldBank};

    match kind {
        IndicatorKind::InflationRate => WorldBank { code: "FP.CPI.TOTL.ZG", scale: 1.0 },
        IndicatorKind::UnemploymentRate => WorldBank { code: "SL.UEM.TOTL.ZS", scale: 1.0 },
        IndicatorKind::GdpGrowthRate => WorldBank { code: "NY.GDP.MKTP.KD.ZG", scale: 1.0 },
        // 美元 -> 十亿美元
        IndicatorKind::ForeignReserves => WorldBank { code: "FI.RES.TOTL.CD", scale: 1e-9 },
        IndicatorKind::CurrentAccountBalance => WorldBank { code: "BN.CAB.XOKA.GD.ZS", scale: 1.0 },
        // 现金盈余/赤字，取负值表示赤字
        IndicatorKind::FiscalDeficit => WorldBank { code: "GC.BAL.CASH.GD.ZS", scale: -1.0 },
        IndicatorKind::InterestRate => Fred { series: "INTDSRINM193N" },
        IndicatorKind::ConsumerPriceIndex => Fred { series: "INDCPIALLMINMEI" },
        IndicatorKind::IndustrialProduction => Fred { series: "INDPROINDMISMEI" },
        IndicatorKind::ExchangeRate => Fred { series: "DEXINUS" },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_has_source() {
        let world_bank = IndicatorKind::ALL
            .iter()
            .filter(|k| matches!(indicator_source(**k), IndicatorSource::WorldBank { .. }))
            .count();
        assert_eq!(world_bank, 6);
        assert_eq!(
            indicator_source(IndicatorKind::ExchangeRate),
            IndicatorSource::Fred { series: "DEXINUS" }
        );
    }
}
