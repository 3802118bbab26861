//! 配置模块
//!
//! 支持从 JSON 文件加载系统配置，API Key 等密钥可由环境变量覆盖

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// 服务器配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,
    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
    /// 工作线程数（0 表示使用 CPU 核心数）
    #[serde(default)]
    pub workers: usize,
}

/// API 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API Key（为空则不启用认证）
    #[serde(default)]
    pub api_key: String,
    /// 请求超时时间（秒）
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// 连接超时时间（秒）
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// 日志级别: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// 第三方数据源配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default = "default_yahoo_base_url")]
    pub yahoo_base_url: String,
    #[serde(default = "default_alpha_vantage_base_url")]
    pub alpha_vantage_base_url: String,
    /// Alpha Vantage API Key（为空则跳过该数据源）
    #[serde(default)]
    pub alpha_vantage_api_key: String,
    #[serde(default = "default_world_bank_base_url")]
    pub world_bank_base_url: String,
    #[serde(default = "default_fred_base_url")]
    pub fred_base_url: String,
    /// FRED API Key（为空则 FRED 指标直接使用兜底值）
    #[serde(default)]
    pub fred_api_key: String,
}

/// 仪表盘配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// 页面标题
    #[serde(default = "default_title")]
    pub title: String,
    /// World Bank 国家代码
    #[serde(default = "default_country_code")]
    pub country_code: String,
    /// 默认展示的行情代码
    #[serde(default = "default_quote_symbols")]
    pub quote_symbols: Vec<String>,
    /// 实时数据缓存时间（秒，0 表示不缓存）
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,
    /// 页面自动刷新间隔（秒）
    #[serde(default = "default_auto_refresh")]
    pub auto_refresh_secs: u64,
}

/// 应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,
    /// API 配置
    #[serde(default)]
    pub api: ApiConfig,
    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
    /// 数据源配置
    #[serde(default)]
    pub providers: ProvidersConfig,
    /// 仪表盘配置
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

// 默认值函数
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }
fn default_timeout() -> u64 { 30 }
fn default_connect_timeout() -> u64 { 10 }
fn default_log_level() -> String { "info".to_string() }
fn default_yahoo_base_url() -> String { "https://query1.finance.yahoo.com".to_string() }
fn default_alpha_vantage_base_url() -> String { "https://www.alphavantage.co".to_string() }
fn default_world_bank_base_url() -> String { "https://api.worldbank.org".to_string() }
fn default_fred_base_url() -> String { "https://api.stlouisfed.org".to_string() }
fn default_title() -> String { "India Economic Factors Dashboard".to_string() }
fn default_country_code() -> String { "IND".to_string() }
fn default_quote_symbols() -> Vec<String> {
    vec!["^NSEI".to_string(), "^BSESN".to_string(), "INR=X".to_string()]
}
fn default_cache_ttl() -> u64 { 30 }
fn default_auto_refresh() -> u64 { 30 }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: 0,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            timeout_secs: default_timeout(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            yahoo_base_url: default_yahoo_base_url(),
            alpha_vantage_base_url: default_alpha_vantage_base_url(),
            alpha_vantage_api_key: String::new(),
            world_bank_base_url: default_world_bank_base_url(),
            fred_base_url: default_fred_base_url(),
            fred_api_key: String::new(),
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            country_code: default_country_code(),
            quote_symbols: default_quote_symbols(),
            cache_ttl_secs: default_cache_ttl(),
            auto_refresh_secs: default_auto_refresh(),
        }
    }
}

impl AppConfig {
    /// 从 JSON 文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: AppConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// 加载配置，优先从文件，失败则使用默认值；最后应用环境变量覆盖
    pub fn load() -> Self {
        let mut config = Self::load_file();
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    fn load_file() -> Self {
        let config_paths = ["config.json", "config/config.json"];

        for path in config_paths {
            if Path::new(path).exists() {
                match Self::from_file(path) {
                    Ok(config) => {
                        log::info!("从 {} 加载配置成功", path);
                        return config;
                    }
                    Err(e) => {
                        log::warn!("加载配置文件 {} 失败: {}", path, e);
                    }
                }
            }
        }

        log::info!("使用默认配置");
        Self::default()
    }

    /// 用环境变量覆盖密钥和端口
    ///
    /// 支持: API_KEY, ALPHA_VANTAGE_API_KEY, FRED_API_KEY, DASHBOARD_PORT
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("API_KEY") {
            self.api.api_key = key;
        }
        if let Some(key) = lookup("ALPHA_VANTAGE_API_KEY") {
            self.providers.alpha_vantage_api_key = key;
        }
        if let Some(key) = lookup("FRED_API_KEY") {
            self.providers.fred_api_key = key;
        }
        if let Some(port) = lookup("DASHBOARD_PORT") {
            match port.parse::<u16>() {
                Ok(p) => self.server.port = p,
                Err(_) => log::warn!("DASHBOARD_PORT 无效: {}", port),
            }
        }
    }

    /// 获取服务器绑定地址
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
