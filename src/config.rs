use crate::error::ConfigError;
use crate::models::DocumentLocator;
use crate::services::pagination::DEFAULT_MAX_TOTAL_PAGES;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// 程序配置文件
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 书籍ID
    pub book_id: String,
    /// 书籍名称（用于输出文件名）
    pub book_name: String,
    /// 阅读页地址模板，`{book_id}` 会被替换
    pub base_url_template: String,
    /// 部分编号
    pub part: u32,
    /// 每页最大尝试次数
    pub max_retries: u32,
    /// 重试基础间隔（毫秒），第 n 次重试等待 n 倍
    pub retry_delay_ms: u64,
    /// 单次请求超时（秒）
    pub request_timeout_secs: u64,
    /// 同时获取的页面数量
    pub max_concurrent_pages: usize,
    /// 所有分页策略都失败时使用的总页数
    pub fallback_total_pages: Option<u32>,
    /// 总页数上限，超过即认为页面标记不可信
    pub max_total_pages: u32,
    /// 输出目录
    pub output_dir: PathBuf,
    /// 请求使用的 User-Agent
    pub user_agent: String,
    /// 是否显示详细日志
    pub verbose_logging: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            book_id: "1113".to_string(),
            book_name: "صيد الخاطر".to_string(),
            base_url_template: "https://ketabonline.com/ar/books/{book_id}/read".to_string(),
            part: 1,
            max_retries: 3,
            retry_delay_ms: 100,
            request_timeout_secs: 10,
            max_concurrent_pages: 15,
            fallback_total_pages: None,
            max_total_pages: DEFAULT_MAX_TOTAL_PAGES,
            output_dir: PathBuf::from("."),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".to_string(),
            verbose_logging: false,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// 用环境变量覆盖已有配置，解析失败的值保持原样
    pub fn with_env_overrides(self) -> Self {
        Self {
            book_id: std::env::var("BOOK_ID").unwrap_or(self.book_id),
            book_name: std::env::var("BOOK_NAME").unwrap_or(self.book_name),
            base_url_template: std::env::var("BASE_URL_TEMPLATE").unwrap_or(self.base_url_template),
            part: std::env::var("BOOK_PART").ok().and_then(|v| v.parse().ok()).unwrap_or(self.part),
            max_retries: std::env::var("MAX_RETRIES").ok().and_then(|v| v.parse().ok()).unwrap_or(self.max_retries),
            retry_delay_ms: std::env::var("RETRY_DELAY_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(self.retry_delay_ms),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()).unwrap_or(self.request_timeout_secs),
            max_concurrent_pages: std::env::var("MAX_CONCURRENT_PAGES").ok().and_then(|v| v.parse().ok()).unwrap_or(self.max_concurrent_pages),
            fallback_total_pages: std::env::var("FALLBACK_TOTAL_PAGES").ok().and_then(|v| v.parse().ok()).or(self.fallback_total_pages),
            max_total_pages: std::env::var("MAX_TOTAL_PAGES").ok().and_then(|v| v.parse().ok()).unwrap_or(self.max_total_pages),
            output_dir: std::env::var("OUTPUT_DIR").map(PathBuf::from).unwrap_or(self.output_dir),
            user_agent: std::env::var("USER_AGENT").unwrap_or(self.user_agent),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(self.verbose_logging),
        }
    }

    /// 从 TOML 字符串解析，缺失的字段使用默认值
    pub fn from_toml_str(content: &str, path: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::TomlParseFailed {
            path: path.to_string(),
            source,
        })
    }

    /// 从 TOML 文件加载
    pub async fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::ReadFailed {
                path: display.clone(),
                source,
            })?;
        Self::from_toml_str(&content, &display)
    }

    /// 加载配置：`BOOK_CONFIG` 指定的 TOML 文件（可选）+ 环境变量覆盖
    pub async fn load() -> Result<Self, ConfigError> {
        let base = match std::env::var("BOOK_CONFIG") {
            Ok(path) => Self::from_toml_file(Path::new(&path)).await?,
            Err(_) => Self::default(),
        };
        Ok(base.with_env_overrides())
    }

    /// 校验配置项
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.book_id.trim().is_empty() {
            return Err(ConfigError::invalid("book_id", "不能为空"));
        }
        if self.book_name.trim().is_empty() {
            return Err(ConfigError::invalid("book_name", "不能为空"));
        }
        if self.part == 0 {
            return Err(ConfigError::invalid("part", "必须从 1 开始"));
        }
        if self.max_retries == 0 {
            return Err(ConfigError::invalid("max_retries", "至少尝试 1 次"));
        }
        if self.max_concurrent_pages == 0 {
            return Err(ConfigError::invalid("max_concurrent_pages", "必须大于 0"));
        }
        if self.fallback_total_pages == Some(0) {
            return Err(ConfigError::invalid("fallback_total_pages", "必须大于 0"));
        }
        if self.max_total_pages == 0 {
            return Err(ConfigError::invalid("max_total_pages", "必须大于 0"));
        }
        if let Some(fallback) = self.fallback_total_pages {
            if fallback > self.max_total_pages {
                return Err(ConfigError::invalid(
                    "fallback_total_pages",
                    format!("{} 超过上限 {}", fallback, self.max_total_pages),
                ));
            }
        }
        Ok(())
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn document_locator(&self) -> DocumentLocator {
        DocumentLocator {
            identifier: self.book_id.clone(),
            display_name: self.book_name.clone(),
            base_url: self.base_url_template.replace("{book_id}", &self.book_id),
            part: self.part,
        }
    }
}
