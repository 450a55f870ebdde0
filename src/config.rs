//! 配置模块
//!
//! 支持从 JSON 文件加载系统配置

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

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

/// 数据库配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite 数据库文件路径
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
    /// 连接池最大连接数
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// 数据库锁等待时间（秒）
    #[serde(default = "default_busy_timeout")]
    pub busy_timeout_secs: u64,
}

/// 上传配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// 表单中文件字段名
    #[serde(default = "default_field_name")]
    pub field_name: String,
    /// 单个文件大小上限（字节）
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: usize,
}

/// 看板配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    /// 图表显示最近多少天的数据
    #[serde(default = "default_chart_window_days")]
    pub chart_window_days: i64,
    /// 窗口内无数据时，退回显示最近多少笔
    #[serde(default = "default_chart_fallback_count")]
    pub chart_fallback_count: usize,
}

/// 日志配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// 日志级别: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// 配置来源，日志系统初始化后再输出
#[derive(Debug, Clone, Default)]
pub enum ConfigSource {
    #[default]
    Default,
    File(PathBuf),
    /// 配置文件存在但解析失败
    Fallback { path: PathBuf, error: String },
}

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,
    /// 数据库配置
    #[serde(default)]
    pub database: DatabaseConfig,
    /// 上传配置
    #[serde(default)]
    pub upload: UploadConfig,
    /// 看板配置
    #[serde(default)]
    pub dashboard: DashboardConfig,
    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
    #[serde(skip)]
    pub source: ConfigSource,
}

// 默认值函数
fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8080 }
fn default_db_path() -> PathBuf { PathBuf::from("data/holdings.db") }
fn default_max_connections() -> u32 { 5 }
fn default_busy_timeout() -> u64 { 30 }
fn default_field_name() -> String { "json_file".to_string() }
fn default_max_file_bytes() -> usize { 10 * 1024 * 1024 }
fn default_chart_window_days() -> i64 { 180 }
fn default_chart_fallback_count() -> usize { 30 }
fn default_log_level() -> String { "info".to_string() }

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            workers: 0,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            max_connections: default_max_connections(),
            busy_timeout_secs: default_busy_timeout(),
        }
    }
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            field_name: default_field_name(),
            max_file_bytes: default_max_file_bytes(),
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            chart_window_days: default_chart_window_days(),
            chart_fallback_count: default_chart_fallback_count(),
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

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::default(),
            upload: UploadConfig::default(),
            dashboard: DashboardConfig::default(),
            log: LogConfig::default(),
            source: ConfigSource::Default,
        }
    }
}

impl AppConfig {
    /// 从 JSON 文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let mut config: AppConfig = serde_json::from_str(&content)?;
        config.source = ConfigSource::File(path.as_ref().to_path_buf());
        Ok(config)
    }

    /// 加载配置，优先从文件，失败则使用默认值
    ///
    /// 查找顺序：环境变量 CONFIG_PATH、config.json、config/config.json
    pub fn load() -> Self {
        let mut config_paths: Vec<PathBuf> = Vec::new();
        if let Ok(path) = env::var("CONFIG_PATH") {
            config_paths.push(PathBuf::from(path));
        }
        config_paths.push(PathBuf::from("config.json"));
        config_paths.push(PathBuf::from("config/config.json"));

        for path in config_paths {
            if path.exists() {
                return match Self::from_file(&path) {
                    Ok(config) => config,
                    Err(e) => Self {
                        source: ConfigSource::Fallback {
                            path,
                            error: e.to_string(),
                        },
                        ..Self::default()
                    },
                };
            }
        }

        Self::default()
    }

    /// 输出配置来源（需在日志初始化之后调用）
    pub fn log_source(&self) {
        match &self.source {
            ConfigSource::Default => log::info!("使用默认配置"),
            ConfigSource::File(path) => log::info!("从 {} 加载配置成功", path.display()),
            ConfigSource::Fallback { path, error } => {
                log::warn!("加载配置文件 {} 失败: {}，使用默认配置", path.display(), error)
            }
        }
    }

    /// 获取服务器绑定地址
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
