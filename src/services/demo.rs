//! 演示数据
//!
//! 免费接口只提供年度或零散的月度数据，页面上的月度走势图使用固定种子生成的随机游走序列

use anyhow::{anyhow, Result};
use chrono::{Datelike, Months, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};

use crate::models::{MacroFactorRow, MicroFactorRow};

/// 序列长度（月）
pub const DEMO_MONTHS: usize = 24;
const MICRO_SEED: u64 = 42;
const MACRO_SEED: u64 = 43;

/// 演示数据集
#[derive(Debug, Clone)]
pub struct DemoDataset {
    pub micro_factors: Vec<MicroFactorRow>,
    pub macro_factors: Vec<MacroFactorRow>,
    /// 生成基准日期
    pub as_of: NaiveDate,
}

impl DemoDataset {
    /// 以 as_of 为基准生成 24 个月的微观和宏观序列
    pub fn generate(as_of: NaiveDate) -> Result<Self> {
        let dates = month_ends(as_of, DEMO_MONTHS)?;
        Ok(Self {
            micro_factors: generate_micro(&dates)?,
            macro_factors: generate_macro(&dates)?,
            as_of,
        })
    }

    /// 最新数据日期
    pub fn last_date(&self) -> Option<NaiveDate> {
        self.micro_factors.last().map(|r| r.date)
    }
}

fn last_day_of_month(first: NaiveDate) -> Option<NaiveDate> {
    first.checked_add_months(Months::new(1))?.pred_opt()
}

/// as_of 当天或之前的最近 count 个月末，升序
pub fn month_ends(as_of: NaiveDate, count: usize) -> Result<Vec<NaiveDate>> {
    let first = NaiveDate::from_ymd_opt(as_of.year(), as_of.month(), 1)
        .ok_or_else(|| anyhow!("无效日期: {}", as_of))?;
    let this_end = last_day_of_month(first).ok_or_else(|| anyhow!("无效日期: {}", as_of))?;

    // 当月未结束则从上月开始
    let anchor = if this_end == as_of {
        first
    } else {
        first
            .checked_sub_months(Months::new(1))
            .ok_or_else(|| anyhow!("无效日期: {}", as_of))?
    };

    let mut dates = (0..count as u32)
        .map(|i| {
            anchor
                .checked_sub_months(Months::new(i))
                .and_then(last_day_of_month)
                .ok_or_else(|| anyhow!("月份计算溢出: {}", as_of))
        })
        .collect::<Result<Vec<_>>>()?;
    dates.reverse();
    Ok(dates)
}

/// 带截断的随机游走：clip(base + cumsum(N(0, sd) * 0.1), lo, hi)
fn random_walk(rng: &mut StdRng, base: f64, sd: f64, lo: f64, hi: f64, n: usize) -> Result<Vec<f64>> {
    let normal = Normal::new(0.0, sd).map_err(|e| anyhow!("正态分布参数无效: {}", e))?;
    let mut acc = 0.0;
    Ok((0..n)
        .map(|_| {
            acc += normal.sample(&mut *rng) * 0.1;
            (base + acc).clamp(lo, hi)
        })
        .collect())
}

fn uniform(rng: &mut StdRng, lo: f64, hi: f64, n: usize) -> Vec<f64> {
    (0..n).map(|_| rng.gen_range(lo..hi)).collect()
}

fn generate_micro(dates: &[NaiveDate]) -> Result<Vec<MicroFactorRow>> {
    let mut rng = StdRng::seed_from_u64(MICRO_SEED);
    let n = dates.len();

    let inflation = random_walk(&mut rng, 5.5, 0.5, 3.0, 8.0, n)?;
    let interest = random_walk(&mut rng, 6.5, 0.3, 4.0, 9.0, n)?;
    let unemployment = random_walk(&mut rng, 7.0, 0.8, 5.0, 12.0, n)?;
    let cpi = uniform(&mut rng, 180.0, 220.0, n);
    let production = uniform(&mut rng, 95.0, 115.0, n);

    Ok(dates
        .iter()
        .enumerate()
        .map(|(i, date)| MicroFactorRow {
            date: *date,
            inflation_rate: inflation[i],
            interest_rate: interest[i],
            unemployment_rate: unemployment[i],
            consumer_price_index: cpi[i],
            industrial_production: production[i],
        })
        .collect())
}

fn generate_macro(dates: &[NaiveDate]) -> Result<Vec<MacroFactorRow>> {
    let mut rng = StdRng::seed_from_u64(MACRO_SEED);
    let n = dates.len();

    let gdp = random_walk(&mut rng, 6.5, 0.3, 4.0, 9.0, n)?;
    let exchange = random_walk(&mut rng, 75.0, 1.5, 70.0, 85.0, n)?;
    let fiscal = random_walk(&mut rng, 4.5, 0.2, 3.0, 7.0, n)?;
    let reserves = uniform(&mut rng, 580.0, 650.0, n);
    let current_account = uniform(&mut rng, -2.5, 1.5, n);

    Ok(dates
        .iter()
        .enumerate()
        .map(|(i, date)| MacroFactorRow {
            date: *date,
            gdp_growth_rate: gdp[i],
            exchange_rate: exchange[i],
            fiscal_deficit: fiscal[i],
            foreign_reserves: reserves[i],
            current_account_balance: current_account[i],
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_month_ends_mid_month() {
        let dates = month_ends(date(2026, 10, 16), 24).unwrap();
        assert_eq!(dates.len(), 24);
        assert_eq!(dates.first(), Some(&date(2024, 10, 31)));
        assert_eq!(dates.last(), Some(&date(2026, 9, 30)));
        assert!(dates.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_month_ends_on_month_end() {
        let dates = month_ends(date(2025, 5, 31), 24).unwrap();
        assert_eq!(dates.first(), Some(&date(2023, 6, 30)));
        assert_eq!(dates.last(), Some(&date(2025, 5, 31)));
        assert!(dates.contains(&date(2024, 2, 29)));
    }

    #[test]
    fn test_generate_is_deterministic() {
        let a = DemoDataset::generate(date(2025, 5, 31)).unwrap();
        let b = DemoDataset::generate(date(2025, 5, 31)).unwrap();
        assert_eq!(a.micro_factors, b.micro_factors);
        assert_eq!(a.macro_factors, b.macro_factors);
        assert_eq!(a.last_date(), Some(date(2025, 5, 31)));
    }

    #[test]
    fn test_generate_respects_bounds() {
        let data = DemoDataset::generate(date(2026, 10, 16)).unwrap();
        assert_eq!(data.micro_factors.len(), DEMO_MONTHS);
        assert_eq!(data.macro_factors.len(), DEMO_MONTHS);

        for row in &data.micro_factors {
            assert!((3.0..=8.0).contains(&row.inflation_rate));
            assert!((4.0..=9.0).contains(&row.interest_rate));
            assert!((5.0..=12.0).contains(&row.unemployment_rate));
            assert!((180.0..220.0).contains(&row.consumer_price_index));
            assert!((95.0..115.0).contains(&row.industrial_production));
        }
        for row in &data.macro_factors {
            assert!((4.0..=9.0).contains(&row.gdp_growth_rate));
            assert!((70.0..=85.0).contains(&row.exchange_rate));
            assert!((3.0..=7.0).contains(&row.fiscal_deficit));
            assert!((580.0..650.0).contains(&row.foreign_reserves));
            assert!((-2.5..1.5).contains(&row.current_account_balance));
        }
    }
}
