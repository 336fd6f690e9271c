//! HTTP 客户端 - 基础设施层
//!
//! 持有连接池资源，只暴露"GET 一个地址"的能力

use crate::config::Config;
use crate::error::{ConfigError, FetchError};
use std::future::Future;
use tracing::debug;

/// 一次 GET 的原始响应
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// 页面获取能力
///
/// 职责：
/// - 发出单次 GET 请求
/// - 不认识页码 / 书籍
/// - 不处理重试和并发
pub trait PageClient: Send + Sync + 'static {
    fn get(&self, url: &str) -> impl Future<Output = Result<HttpResponse, FetchError>> + Send;
}

/// 基于 reqwest 的实现
#[derive(Clone)]
pub struct ReqwestPageClient {
    client: reqwest::Client,
}

impl ReqwestPageClient {
    /// 按配置创建客户端（超时、User-Agent）
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;
        Ok(Self { client })
    }
}

impl PageClient for ReqwestPageClient {
    async fn get(&self, url: &str) -> Result<HttpResponse, FetchError> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify(url, e))?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(|e| classify(url, e))?;

        Ok(HttpResponse { status, body })
    }
}

fn classify(url: &str, err: reqwest::Error) -> FetchError {
    if err.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else {
        FetchError::Transport {
            url: url.to_string(),
            message: err.to_string(),
        }
    }
}
