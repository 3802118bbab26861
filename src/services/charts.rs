//! 图表构建
//!
//! 生成 Plotly 兼容的 figure JSON，由页面直接交给 Plotly.newPlot 渲染

use serde_json::{json, Value};

use crate::models::{Figure, MacroFactorRow, MicroFactorRow, PeriodComparison, PricePoint};

/// 2x2 子图的坐标轴区域 (x 区域, y 区域)
const GRID: [([f64; 2], [f64; 2]); 4] = [
    ([0.0, 0.45], [0.575, 1.0]),
    ([0.55, 1.0], [0.575, 1.0]),
    ([0.0, 0.45], [0.0, 0.425]),
    ([0.55, 1.0], [0.0, 0.425]),
];

/// 子图中的一条折线
struct Panel<'a> {
    title: &'a str,
    name: &'a str,
    color: &'a str,
    x: Vec<String>,
    y: Vec<f64>,
}

fn axis_suffix(i: usize) -> String {
    if i == 0 {
        String::new()
    } else {
        (i + 1).to_string()
    }
}

/// 2x2 子图布局，每个子图一条 lines+markers 折线
fn subplot_figure(title: String, panels: [Panel<'_>; 4]) -> Figure {
    let mut data = Vec::with_capacity(4);
    let mut layout = json!({
        "title": { "text": title },
        "height": 600,
        "showlegend": false,
        "annotations": [],
    });

    for (i, panel) in panels.iter().enumerate() {
        let suffix = axis_suffix(i);
        let (x_domain, y_domain) = GRID[i];

        data.push(json!({
            "type": "scatter",
            "mode": "lines+markers",
            "name": panel.name,
            "x": panel.x,
            "y": panel.y,
            "line": { "color": panel.color, "width": 2 },
            "xaxis": format!("x{}", suffix),
            "yaxis": format!("y{}", suffix),
        }));

        layout[format!("xaxis{}", suffix)] =
            json!({ "domain": x_domain, "anchor": format!("y{}", suffix) });
        layout[format!("yaxis{}", suffix)] =
            json!({ "domain": y_domain, "anchor": format!("x{}", suffix) });

        if let Some(annotations) = layout["annotations"].as_array_mut() {
            annotations.push(json!({
                "text": panel.title,
                "x": (x_domain[0] + x_domain[1]) / 2.0,
                "y": y_domain[1],
                "xref": "paper",
                "yref": "paper",
                "xanchor": "center",
                "yanchor": "bottom",
                "showarrow": false,
            }));
        }
    }

    Figure { data, layout }
}

/// 微观因子图（通胀、利率、失业率、CPI）
pub fn micro_factors_chart(rows: &[MicroFactorRow], period_label: &str) -> Figure {
    let dates: Vec<String> = rows.iter().map(|r| r.date.to_string()).collect();
    let series = |f: fn(&MicroFactorRow) -> f64| rows.iter().map(f).collect::<Vec<f64>>();

    subplot_figure(
        format!("Micro Economic Factors - {}", period_label),
        [
            Panel {
                title: "Inflation Rate (%)",
                name: "Inflation Rate",
                color: "red",
                x: dates.clone(),
                y: series(|r| r.inflation_rate),
            },
            Panel {
                title: "Interest Rate (%)",
                name: "Interest Rate",
                color: "blue",
                x: dates.clone(),
                y: series(|r| r.interest_rate),
            },
            Panel {
                title: "Unemployment Rate (%)",
                name: "Unemployment Rate",
                color: "orange",
                x: dates.clone(),
                y: series(|r| r.unemployment_rate),
            },
            Panel {
                title: "Consumer Price Index",
                name: "CPI",
                color: "green",
                x: dates,
                y: series(|r| r.consumer_price_index),
            },
        ],
    )
}

/// 宏观因子图（GDP、汇率、财政赤字、外汇储备）
pub fn macro_factors_chart(rows: &[MacroFactorRow], period_label: &str) -> Figure {
    let dates: Vec<String> = rows.iter().map(|r| r.date.to_string()).collect();
    let series = |f: fn(&MacroFactorRow) -> f64| rows.iter().map(f).collect::<Vec<f64>>();

    subplot_figure(
        format!("Macro Economic Factors - {}", period_label),
        [
            Panel {
                title: "GDP Growth Rate (%)",
                name: "GDP Growth",
                color: "green",
                x: dates.clone(),
                y: series(|r| r.gdp_growth_rate),
            },
            Panel {
                title: "Exchange Rate (INR/USD)",
                name: "Exchange Rate",
                color: "purple",
                x: dates.clone(),
                y: series(|r| r.exchange_rate),
            },
            Panel {
                title: "Fiscal Deficit (%)",
                name: "Fiscal Deficit",
                color: "red",
                x: dates.clone(),
                y: series(|r| r.fiscal_deficit),
            },
            Panel {
                title: "Foreign Reserves (Billion USD)",
                name: "Foreign Reserves",
                color: "blue",
                x: dates,
                y: series(|r| r.foreign_reserves),
            },
        ],
    )
}

/// 各区间对比柱状图，无数据时返回 None
pub fn comparison_chart(comparison: &[PeriodComparison]) -> Option<Figure> {
    if comparison.is_empty() {
        return None;
    }

    let periods: Vec<&str> = comparison.iter().map(|c| c.period.label()).collect();
    let bar = |name: &str, color: &str, y: Vec<f64>| -> Value {
        json!({
            "type": "bar",
            "name": name,
            "x": periods,
            "y": y,
            "marker": { "color": color },
            "opacity": 0.7,
        })
    };

    let data = vec![
        bar("Inflation Rate (%)", "red", comparison.iter().map(|c| c.inflation).collect()),
        bar("GDP Growth (%)", "green", comparison.iter().map(|c| c.gdp_growth).collect()),
        bar("Unemployment (%)", "orange", comparison.iter().map(|c| c.unemployment).collect()),
    ];

    Some(Figure {
        data,
        layout: json!({
            "title": { "text": "Economic Indicators Comparison Across Periods" },
            "xaxis": { "title": { "text": "Time Period" } },
            "yaxis": { "title": { "text": "Percentage" } },
            "barmode": "group",
            "height": 500,
        }),
    })
}

/// 行情历史收盘价折线
pub fn price_history_chart(symbol: &str, points: &[PricePoint]) -> Figure {
    Figure {
        data: vec![json!({
            "type": "scatter",
            "mode": "lines",
            "name": symbol,
            "x": points.iter().map(|p| p.date.as_str()).collect::<Vec<_>>(),
            "y": points.iter().map(|p| p.close).collect::<Vec<_>>(),
            "line": { "color": "steelblue", "width": 2 },
        })],
        layout: json!({
            "title": { "text": format!("{} Close", symbol) },
            "height": 400,
            "showlegend": false,
        }),
    }
}
