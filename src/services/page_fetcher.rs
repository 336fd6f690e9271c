//! 页面获取服务 - 业务能力层
//!
//! 只负责"拿到一页的 HTML"，带并发上限和重试，不关心页面内容

use crate::error::FetchError;
use crate::infrastructure::PageClient;
use crate::models::{DocumentLocator, FetchOutcome, PageRequest};
use crate::services::retry::RetryPolicy;
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::{debug, error, warn};

/// 已获准进入并发闸门的凭证
///
/// 持有期间占用一个并发名额，覆盖整段重试过程
#[derive(Debug)]
pub struct Admission {
    _permit: OwnedSemaphorePermit,
}

/// 页面获取服务
///
/// 职责：
/// - 根据文档地址 + part + page 构建请求地址
/// - 同时在途的页面数不超过 `concurrency`
/// - 失败按线性退避重试，耗尽后返回 Failure，从不抛错
pub struct PageFetcher<C: PageClient> {
    client: C,
    locator: DocumentLocator,
    semaphore: Arc<Semaphore>,
    concurrency: usize,
    retry: RetryPolicy,
}

impl<C: PageClient> PageFetcher<C> {
    pub fn new(client: C, locator: DocumentLocator, concurrency: usize, retry: RetryPolicy) -> Self {
        let concurrency = concurrency.max(1);
        Self {
            client,
            locator,
            semaphore: Arc::new(Semaphore::new(concurrency)),
            concurrency,
            retry,
        }
    }

    pub fn locator(&self) -> &DocumentLocator {
        &self.locator
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// 等待一个并发名额，闸门关闭时返回 None
    pub async fn admit(&self) -> Option<Admission> {
        self.semaphore
            .clone()
            .acquire_owned()
            .await
            .ok()
            .map(|permit| Admission { _permit: permit })
    }

    /// 获取一页（自行排队等待名额）
    pub async fn fetch(&self, request: PageRequest) -> FetchOutcome {
        match self.admit().await {
            Some(admission) => self.fetch_admitted(admission, request).await,
            None => FetchOutcome::Failure {
                page_number: request.page_number,
                reason: "并发闸门已关闭".to_string(),
            },
        }
    }

    /// 使用已有名额获取一页，名额在整段重试结束后释放
    pub async fn fetch_admitted(&self, admission: Admission, request: PageRequest) -> FetchOutcome {
        let url = self.locator.page_url(request.part, request.page_number);
        let max_attempts = self.retry.max_attempts.max(1);

        let result = self
            .retry
            .run(
                |attempt| {
                    let url = url.as_str();
                    async move {
                        debug!(
                            "{} 第 {}/{} 次请求",
                            PageRequest { attempt, ..request },
                            attempt + 1,
                            max_attempts
                        );
                        self.get_once(url).await
                    }
                },
                |attempt, err, delay| {
                    warn!(
                        "{} 请求失败: {}，{:?} 后重试 ({}/{})...",
                        request,
                        err,
                        delay,
                        attempt + 1,
                        max_attempts
                    );
                },
            )
            .await;

        drop(admission);

        match result {
            Ok(raw_markup) => {
                debug!("{} ✓ 获取成功 ({} 字节)", request, raw_markup.len());
                FetchOutcome::Success {
                    page_number: request.page_number,
                    raw_markup,
                }
            }
            Err(err) => {
                error!("{} ❌ 已尝试 {} 次仍然失败: {}", request, max_attempts, err);
                FetchOutcome::Failure {
                    page_number: request.page_number,
                    reason: err.to_string(),
                }
            }
        }
    }

    async fn get_once(&self, url: &str) -> Result<String, FetchError> {
        let response = self.client.get(url).await?;
        if response.is_success() {
            Ok(response.body)
        } else {
            Err(FetchError::Status {
                url: url.to_string(),
                status: response.status,
            })
        }
    }
}
