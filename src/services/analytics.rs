//! 区间统计
//!
//! 区间过滤、汇总指标卡片、各区间均值对比、表格格式化

use chrono::{Months, NaiveDate};

use crate::models::{
    Dated, MacroFactorRow, MicroFactorRow, Period, PeriodComparison, SummaryMetric, Table,
};

/// 按区间过滤序列
///
/// 保留 as_of - 止月 <= date <= as_of - 起月 的行；All 返回全部
pub fn filter_by_period<T: Dated + Clone>(rows: &[T], period: Period, as_of: NaiveDate) -> Vec<T> {
    let (start_months, end_months) = match period.months() {
        Some(m) => m,
        None => return rows.to_vec(),
    };

    let start = as_of.checked_sub_months(Months::new(end_months));
    let end = as_of.checked_sub_months(Months::new(start_months));
    let (start, end) = match (start, end) {
        (Some(s), Some(e)) => (s, e),
        _ => return Vec::new(),
    };

    rows.iter()
        .filter(|r| r.date() >= start && r.date() <= end)
        .cloned()
        .collect()
}

pub fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        None
    } else {
        Some(sum / count as f64)
    }
}

/// 末值减首值
fn delta(values: &[f64]) -> f64 {
    match (values.first(), values.last()) {
        (Some(first), Some(last)) => last - first,
        _ => 0.0,
    }
}

fn average_metric(label: &str, values: &[f64]) -> SummaryMetric {
    let value = mean(values.iter().copied()).unwrap_or(0.0);
    let d = delta(values);
    SummaryMetric {
        label: label.to_string(),
        value,
        display: format!("{:.2}%", value),
        delta: d,
        delta_display: format!("{:.2}%", d),
    }
}

/// 汇总指标卡片
///
/// 任一侧为空时返回空列表
pub fn summary_metrics(micro: &[MicroFactorRow], macro_rows: &[MacroFactorRow]) -> Vec<SummaryMetric> {
    if micro.is_empty() || macro_rows.is_empty() {
        return Vec::new();
    }

    let inflation: Vec<f64> = micro.iter().map(|r| r.inflation_rate).collect();
    let unemployment: Vec<f64> = micro.iter().map(|r| r.unemployment_rate).collect();
    let gdp: Vec<f64> = macro_rows.iter().map(|r| r.gdp_growth_rate).collect();
    let exchange: Vec<f64> = macro_rows.iter().map(|r| r.exchange_rate).collect();

    let current_exchange = exchange.last().copied().unwrap_or(0.0);
    let exchange_delta = delta(&exchange);

    vec![
        average_metric("Avg Inflation Rate", &inflation),
        average_metric("Avg GDP Growth", &gdp),
        average_metric("Avg Unemployment", &unemployment),
        SummaryMetric {
            label: "Current Exchange Rate".to_string(),
            value: current_exchange,
            display: format!("₹{:.2}", current_exchange),
            delta: exchange_delta,
            delta_display: format!("{:.2}", exchange_delta),
        },
    ]
}

/// 各具名区间的均值对比，跳过无数据的区间
pub fn compare_periods(
    micro: &[MicroFactorRow],
    macro_rows: &[MacroFactorRow],
    as_of: NaiveDate,
) -> Vec<PeriodComparison> {
    Period::NAMED
        .iter()
        .filter_map(|period| {
            let mi = filter_by_period(micro, *period, as_of);
            let ma = filter_by_period(macro_rows, *period, as_of);
            Some(PeriodComparison {
                period: *period,
                inflation: mean(mi.iter().map(|r| r.inflation_rate))?,
                gdp_growth: mean(ma.iter().map(|r| r.gdp_growth_rate))?,
                unemployment: mean(mi.iter().map(|r| r.unemployment_rate))?,
                exchange_rate: mean(ma.iter().map(|r| r.exchange_rate))?,
            })
        })
        .collect()
}

fn cell(v: f64) -> String {
    format!("{:.2}", v)
}

/// 近期微观因子表（日期、通胀、利率、失业率）
pub fn recent_micro_table(rows: &[MicroFactorRow]) -> Table {
    Table {
        title: "Recent Micro Factors".to_string(),
        columns: vec!["date", "inflation_rate", "interest_rate", "unemployment_rate"]
            .into_iter()
            .map(String::from)
            .collect(),
        rows: rows
            .iter()
            .map(|r| {
                vec![
                    r.date.to_string(),
                    cell(r.inflation_rate),
                    cell(r.interest_rate),
                    cell(r.unemployment_rate),
                ]
            })
            .collect(),
    }
}

/// 近期宏观因子表（日期、GDP、汇率、财政赤字）
pub fn recent_macro_table(rows: &[MacroFactorRow]) -> Table {
    Table {
        title: "Recent Macro Factors".to_string(),
        columns: vec!["date", "gdp_growth_rate", "exchange_rate", "fiscal_deficit"]
            .into_iter()
            .map(String::from)
            .collect(),
        rows: rows
            .iter()
            .map(|r| {
                vec![
                    r.date.to_string(),
                    cell(r.gdp_growth_rate),
                    cell(r.exchange_rate),
                    cell(r.fiscal_deficit),
                ]
            })
            .collect(),
    }
}

/// 完整微观因子表
pub fn micro_table(rows: &[MicroFactorRow]) -> Table {
    Table {
        title: "Micro Factors".to_string(),
        columns: vec![
            "date",
            "inflation_rate",
            "interest_rate",
            "unemployment_rate",
            "consumer_price_index",
            "industrial_production",
        ]
        .into_iter()
        .map(String::from)
        .collect(),
        rows: rows
            .iter()
            .map(|r| {
                vec![
                    r.date.to_string(),
                    cell(r.inflation_rate),
                    cell(r.interest_rate),
                    cell(r.unemployment_rate),
                    cell(r.consumer_price_index),
                    cell(r.industrial_production),
                ]
            })
            .collect(),
    }
}

/// 完整宏观因子表
pub fn macro_table(rows: &[MacroFactorRow]) -> Table {
    Table {
        title: "Macro Factors".to_string(),
        columns: vec![
            "date",
            "gdp_growth_rate",
            "exchange_rate",
            "fiscal_deficit",
            "foreign_reserves",
            "current_account_balance",
        ]
        .into_iter()
        .map(String::from)
        .collect(),
        rows: rows
            .iter()
            .map(|r| {
                vec![
                    r.date.to_string(),
                    cell(r.gdp_growth_rate),
                    cell(r.exchange_rate),
                    cell(r.fiscal_deficit),
                    cell(r.foreign_reserves),
                    cell(r.current_account_balance),
                ]
            })
            .collect(),
    }
}
