//! 仪表盘页面
//!
//! 服务端渲染 HTML，图表由浏览器端 Plotly 绘制

use actix_web::{http::header::ContentType, web, HttpResponse, Result};
use serde::Deserialize;

use crate::models::{DashboardView, Figure, Period, SummaryMetric, Table};
use crate::services::DashboardService;

const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.27.0.min.js";

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub period: Option<String>,
    /// 为 1 时先清空缓存
    pub refresh: Option<u8>,
    /// 为 1 时开启自动刷新
    pub auto: Option<u8>,
}

pub async fn index(
    service: web::Data<DashboardService>,
    query: web::Query<PageQuery>,
) -> Result<HttpResponse> {
    let period = match query.period.as_deref() {
        Some(p) if !p.trim().is_empty() => match p.parse::<Period>() {
            Ok(period) => period,
            Err(e) => {
                return Ok(HttpResponse::BadRequest()
                    .content_type(ContentType::html())
                    .body(format!("<p>{}</p>", escape(&e.to_string()))))
            }
        },
        _ => Period::default(),
    };

    if query.refresh == Some(1) {
        service.refresh();
    }
    let auto = query.auto == Some(1);

    match service.view(period).await {
        Ok(view) => Ok(HttpResponse::Ok()
            .content_type(ContentType::html())
            .body(render(&view, auto, service.auto_refresh_secs()))),
        Err(e) => {
            log::error!("渲染仪表盘失败: {}", e);
            Ok(HttpResponse::InternalServerError()
                .content_type(ContentType::html())
                .body(format!("<p>{}</p>", escape(&e.to_string()))))
        }
    }
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index));
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn page_href(period: Period, auto: bool, refresh: bool) -> String {
    let slug: String = url::form_urlencoded::byte_serialize(period.slug().as_bytes()).collect();
    let mut href = format!("/?period={}", slug);
    if auto {
        href.push_str("&auto=1");
    }
    if refresh {
        href.push_str("&refresh=1");
    }
    href
}

/// 渲染完整页面
pub fn render(view: &DashboardView, auto: bool, auto_refresh_secs: u64) -> String {
    let mut html = String::new();

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    // 自动刷新不带 refresh=1，避免每次重载都清空缓存
    if auto && auto_refresh_secs > 0 {
        html.push_str(&format!(
            "<meta http-equiv=\"refresh\" content=\"{}\">\n",
            escape(&format!(
                "{};url={}",
                auto_refresh_secs,
                page_href(view.period, true, false)
            ))
        ));
    }
    html.push_str(&format!("<title>{}</title>\n", escape(&view.title)));
    html.push_str(&format!("<script src=\"{}\"></script>\n", PLOTLY_CDN));
    html.push_str(STYLE);
    html.push_str("</head>\n<body>\n");

    html.push_str(&render_sidebar(view.period, auto, auto_refresh_secs));

    html.push_str("<main>\n");
    html.push_str(&format!("<h1>📈 {}</h1>\n", escape(&view.title)));
    html.push_str(&format!("<h2 id=\"section-header\">{}</h2>\n", escape(&view.header)));

    if let Some(warning) = &view.warning {
        html.push_str(&format!("<div class=\"warning\">{}</div>\n", escape(warning)));
    }

    if !view.metrics.is_empty() {
        html.push_str(&format!("<h3>{}</h3>\n", escape(&view.metrics_caption)));
        html.push_str(&render_metrics(&view.metrics));
    }

    html.push_str(&render_live(view));

    let charts = [
        ("chart-micro", view.charts.micro.as_ref()),
        ("chart-macro", view.charts.macro_factors.as_ref()),
        ("chart-comparison", view.charts.comparison.as_ref()),
    ];
    for (id, figure) in charts {
        if let Some(figure) = figure {
            html.push_str(&render_chart(id, figure));
        }
    }

    for table in &view.tables {
        html.push_str(&render_table(table));
    }

    html.push_str(&format!("<footer>{}</footer>\n", escape(&view.footer)));
    html.push_str("</main>\n</body>\n</html>\n");
    html
}

fn render_sidebar(current: Period, auto: bool, auto_refresh_secs: u64) -> String {
    let mut html = String::from("<nav class=\"sidebar\">\n<h3>Time Period</h3>\n<ul>\n");
    for period in Period::NAMED.iter().chain(std::iter::once(&Period::All)) {
        let class = if *period == current { " class=\"active\"" } else { "" };
        html.push_str(&format!(
            "<li><a{} href=\"{}\">{}</a></li>\n",
            class,
            escape(&page_href(*period, auto, false)),
            escape(period.label())
        ));
    }
    html.push_str("</ul>\n");
    html.push_str(&format!(
        "<a id=\"refresh\" href=\"{}\">🔄 Refresh Data</a>\n",
        escape(&page_href(current, auto, true))
    ));
    let toggle = if auto {
        format!("Auto refresh: on ({}s)", auto_refresh_secs)
    } else {
        "Auto refresh: off".to_string()
    };
    html.push_str(&format!(
        "<a id=\"auto-refresh\" href=\"{}\">{}</a>\n</nav>\n",
        escape(&page_href(current, !auto, false)),
        escape(&toggle)
    ));
    html
}

fn render_metrics(metrics: &[SummaryMetric]) -> String {
    let mut html = String::from("<div class=\"cards metrics\">\n");
    for m in metrics {
        html.push_str(&format!(
            "<div class=\"card\"><div class=\"label\">{}</div><div class=\"value\">{}</div><div class=\"delta\">{}</div></div>\n",
            escape(&m.label),
            escape(&m.display),
            escape(&m.delta_display)
        ));
    }
    html.push_str("</div>\n");
    html
}

fn render_live(view: &DashboardView) -> String {
    let mut html = String::from("<h3>Live Indicators</h3>\n<div class=\"cards indicators\">\n");
    for i in &view.indicators {
        let stale = if i.is_fallback { " stale" } else { "" };
        html.push_str(&format!(
            "<div class=\"card{}\"><div class=\"label\">{}</div><div class=\"value\">{}</div><div class=\"source\">{} · {}</div></div>\n",
            stale,
            escape(&i.name),
            escape(&i.display_value()),
            escape(i.source.label()),
            escape(&i.date)
        ));
    }
    html.push_str("</div>\n");

    html.push_str("<h3>Markets</h3>\n<div class=\"cards quotes\">\n");
    for q in &view.quotes {
        let stale = if q.is_fallback { " stale" } else { "" };
        let change = match (q.change, q.change_percent) {
            (Some(c), Some(p)) => format!("{:+.2} ({:+.2}%)", c, p),
            _ => "-".to_string(),
        };
        let market = if q.market_open { "Market open" } else { "Market closed" };
        html.push_str(&format!(
            "<div class=\"card{}\"><div class=\"label\">{}</div><div class=\"value\">{:.2}</div><div class=\"delta\">{}</div><div class=\"source\">{} · {}</div></div>\n",
            stale,
            escape(&q.name),
            q.price,
            escape(&change),
            escape(q.source.label()),
            market
        ));
    }
    html.push_str("</div>\n");
    html
}

fn render_chart(id: &str, figure: &Figure) -> String {
    // 防止 JSON 中的 "</script>" 提前结束脚本
    let data = serde_json::to_string(&figure.data)
        .unwrap_or_else(|_| "[]".to_string())
        .replace("</", "<\\/");
    let layout = serde_json::to_string(&figure.layout)
        .unwrap_or_else(|_| "{}".to_string())
        .replace("</", "<\\/");
    format!(
        "<div class=\"chart\" id=\"{id}\"></div>\n<script>Plotly.newPlot(\"{id}\", {data}, {layout}, {{responsive: true}});</script>\n",
        id = id,
        data = data,
        layout = layout
    )
}

fn render_table(table: &Table) -> String {
    let mut html = format!("<h3>{}</h3>\n<table>\n<thead><tr>", escape(&table.title));
    for column in &table.columns {
        html.push_str(&format!("<th>{}</th>", escape(column)));
    }
    html.push_str("</tr></thead>\n<tbody>\n");
    for row in &table.rows {
        html.push_str("<tr>");
        for cell in row {
            html.push_str(&format!("<td>{}</td>", escape(cell)));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</tbody>\n</table>\n");
    html
}

const STYLE: &str = r#"<style>
body { margin: 0; font-family: sans-serif; display: flex; }
.sidebar { width: 220px; padding: 16px; background: #f0f2f6; min-height: 100vh; }
.sidebar ul { list-style: none; padding: 0; }
.sidebar a { display: block; padding: 4px 0; color: #262730; }
.sidebar a.active { font-weight: bold; }
main { flex: 1; padding: 16px 32px; }
.cards { display: flex; flex-wrap: wrap; gap: 12px; }
.card { border: 1px solid #ddd; border-radius: 6px; padding: 8px 12px; min-width: 160px; }
.card.stale { border-style: dashed; }
.label { color: #555; font-size: 0.85em; }
.value { font-size: 1.4em; }
.source { color: #888; font-size: 0.75em; }
.warning { background: #fff3cd; padding: 8px; border-radius: 4px; }
table { border-collapse: collapse; margin-bottom: 16px; }
th, td { border: 1px solid #ddd; padding: 4px 8px; }
footer { margin-top: 24px; color: #888; }
</style>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::offline_service;
    use actix_web::{http::StatusCode, App};
    use scraper::{Html, Selector};

    async fn fetch(uri: &str) -> (StatusCode, String) {
        let app = actix_web::test::init_service(App::new().app_data(offline_service()).configure(config)).await;
        let req = actix_web::test::TestRequest::get().uri(uri).to_request();
        let resp = actix_web::test::call_service(&app, req).await;
        let status = resp.status();
        let body = actix_web::test::read_body(resp).await;
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    fn select<'a>(doc: &'a Html, css: &str) -> Vec<scraper::ElementRef<'a>> {
        let selector = Selector::parse(css).unwrap();
        doc.select(&selector).collect()
    }

    #[actix_web::test]
    async fn test_overview_page() {
        let (status, body) = fetch("/").await;
        assert_eq!(status, StatusCode::OK);

        let doc = Html::parse_document(&body);
        let header = select(&doc, "#section-header");
        assert_eq!(header[0].text().collect::<String>(), "Comprehensive Economic Overview");
        assert_eq!(select(&doc, ".sidebar li").len(), 5);
        assert_eq!(select(&doc, ".sidebar a.active")[0].text().collect::<String>(), "All Periods");
        assert_eq!(select(&doc, ".metrics .card").len(), 4);
        assert_eq!(select(&doc, ".indicators .card.stale").len(), 10);
        assert_eq!(select(&doc, "#chart-comparison").len(), 1);
        assert_eq!(select(&doc, "table").len(), 2);
        assert!(select(&doc, "meta[http-equiv=refresh]").is_empty());
        assert!(select(&doc, "footer")[0]
            .text()
            .collect::<String>()
            .contains("Data updated:"));
    }

    #[actix_web::test]
    async fn test_period_page_with_auto_refresh() {
        let (status, body) = fetch("/?period=1y%2B&auto=1").await;
        assert_eq!(status, StatusCode::OK);

        let doc = Html::parse_document(&body);
        let meta = select(&doc, "meta[http-equiv=refresh]");
        assert_eq!(meta[0].value().attr("content"), Some("30;url=/?period=1y%2B&auto=1"));
        assert_eq!(select(&doc, "#chart-micro").len(), 1);
        assert_eq!(select(&doc, "#chart-macro").len(), 1);

        let refresh = select(&doc, "#refresh")[0].value().attr("href").unwrap();
        assert_eq!(refresh, "/?period=1y%2B&auto=1&refresh=1");
    }

    #[actix_web::test]
    async fn test_auto_refresh_does_not_repeat_cache_refresh() {
        let (status, body) = fetch("/?period=all&auto=1&refresh=1").await;
        assert_eq!(status, StatusCode::OK);

        let doc = Html::parse_document(&body);
        let meta = select(&doc, "meta[http-equiv=refresh]");
        let content = meta[0].value().attr("content").unwrap();
        assert_eq!(content, "30;url=/?period=all&auto=1");
        assert!(!content.contains("refresh=1"));
    }

    #[actix_web::test]
    async fn test_bad_period() {
        let (status, _) = fetch("/?period=%3Cscript%3E").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("<a href=\"x\">&'</a>"), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;&lt;/a&gt;");
    }
}
