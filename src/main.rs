//! 印度经济因子仪表盘服务
//!
//! 提供仪表盘页面和 RESTful API
//! 数据来源：Yahoo Finance、Alpha Vantage、World Bank、FRED

mod config;     // 配置
mod handlers;   // HTTP 请求处理器
mod middleware; // 中间件
mod models;     // 数据模型定义
mod services;   // 业务逻辑服务

use actix_web::{middleware::Logger, web, App, HttpServer};
use env_logger::Env;

use crate::config::AppConfig;
use crate::middleware::ApiKeyMiddleware;
use crate::services::DashboardService;

/// 应用程序入口
///
/// 加载配置后启动 HTTP 服务器
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let config = AppConfig::load();

    // 初始化日志系统，RUST_LOG 优先于配置
    env_logger::init_from_env(Env::default().default_filter_or(config.log.level.as_str()));

    if config.api.api_key.is_empty() {
        log::warn!("未设置 API_KEY，/api/v1 接口不做认证");
    }
    if config.providers.fred_api_key.is_empty() {
        log::warn!("未设置 FRED_API_KEY，FRED 指标将使用兜底值");
    }

    let service = DashboardService::new(&config)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    let service = web::Data::new(service);
    let api_key = config.api.api_key.clone();

    log::info!("启动 {}，监听 {}", config.dashboard.title, config.bind_addr());

    // 创建并启动 HTTP 服务器
    let mut server = HttpServer::new(move || {
        App::new()
            .app_data(service.clone())
            .wrap(Logger::default())  // 添加请求日志中间件
            .wrap(ApiKeyMiddleware::new(api_key.clone()))  // API Key 认证
            .configure(handlers::config)  // 配置路由
    });

    if config.server.workers > 0 {
        server = server.workers(config.server.workers);
    }

    server.bind(config.bind_addr())?.run().await
}
