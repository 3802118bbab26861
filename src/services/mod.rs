//! 业务逻辑服务模块
//!
//! 封装数据获取、兜底、统计和图表构建逻辑

pub mod analytics; // 区间统计
pub mod charts; // 图表构建
pub mod dashboard_service; // 仪表盘服务
pub mod demo; // 演示序列
pub mod fallback; // 兜底数据
pub mod providers; // 外部数据源

pub use dashboard_service::DashboardService;
