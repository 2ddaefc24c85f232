//! Application configuration module / 应用配置模块
//!
//! Configuration is read from an optional JSON file, then overridden by
//! command-line flags. The resulting value is passed to each component;
//! there is no global instance. / 配置显式传递，无全局实例

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration / 应用配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Server configuration / 服务器配置
    pub server: ServerConfig,
    /// Database configuration / 数据库配置
    pub database: DatabaseConfig,
    /// Indexing configuration / 索引配置
    pub index: IndexConfig,
    /// Search page configuration / 搜索页面配置
    pub web: WebConfig,
    /// Verbose logging / 详细日志
    pub verbose: bool,
}

/// Server configuration / 服务器配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host address / 服务器监听地址
    pub host: String,
    /// Server port / 服务器端口
    pub port: u16,
}

/// Database configuration / 数据库配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite index file / 索引数据库文件
    pub db_file: PathBuf,
}

/// Indexing configuration / 索引配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Directory to walk (HTML files, or the site root) / 扫描根目录
    pub root: PathBuf,
    /// Index HTML files under root / 索引 HTML 文件
    pub html: bool,
    /// Index the static site content under root / 索引静态站点内容
    pub site: bool,
    /// Overrides the site's own baseURL / 覆盖站点 baseURL
    pub base_url: Option<String>,
    /// Documents per insert transaction / 每批插入文档数
    pub batch_size: usize,
}

/// Search page configuration / 搜索页面配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    /// Page template; the built-in page is used when unset / 页面模板文件
    pub template: Option<PathBuf>,
    /// Maximum rows per query / 最大返回结果数
    pub max_results: usize,
    /// Start the web server / 启动 Web 服务
    pub serve: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 8086,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            db_file: PathBuf::from("search.db"),
        }
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            html: false,
            site: false,
            base_url: None,
            batch_size: 200,
        }
    }
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            template: None,
            max_results: 100,
            serve: false,
        }
    }
}

impl AppConfig {
    /// Get the server bind address / 获取服务器绑定地址
    pub fn get_bind_address(&self) -> String {
        if self.server.host.contains(':') {
            format!("[{}]:{}", self.server.host, self.server.port)
        } else {
            format!("{}:{}", self.server.host, self.server.port)
        }
    }

    /// Whether the web server should run / 是否启动 Web 服务
    ///
    /// Supplying a template implies serving.
    pub fn should_serve(&self) -> bool {
        self.web.serve || self.web.template.is_some()
    }

    /// Whether any indexing was requested / 是否需要建立索引
    pub fn should_index(&self) -> bool {
        self.index.html || self.index.site
    }
}

/// Load configuration from a JSON file / 从 JSON 文件加载配置
///
/// Missing keys take their default values.
pub fn load_config(config_path: &Path) -> Result<AppConfig, String> {
    let content = std::fs::read_to_string(config_path)
        .map_err(|e| format!("Failed to read config file {:?}: {}", config_path, e))?;

    let config: AppConfig = serde_json::from_str(&content)
        .map_err(|e| format!("Failed to parse config file {:?}: {}", config_path, e))?;

    Ok(config)
}
