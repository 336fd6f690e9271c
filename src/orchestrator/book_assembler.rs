//! 整书组装器 - 编排层
//!
//! ## 流程
//!
//! 1. 获取第一页，解析总页数（失败即终止）
//! 2. 为每一页派发一个获取任务，受 PageFetcher 的并发上限约束
//! 3. 任务以任意顺序完成，提取正文后写入对应页码的槽位
//! 4. 全部结束后按页码升序拼接非空槽位
//!
//! 单页失败只会留下空槽位；只有"无法确定页数"和"一页都没拿到"才算失败。

use crate::cancellation::CancellationToken;
use crate::error::{AppResult, AssemblyError, PaginationError};
use crate::infrastructure::PageClient;
use crate::models::{BookDocument, FetchOutcome, PageRequest};
use crate::services::{ContentExtractor, PageFetcher, PaginationResolver, PAGE_SEPARATOR};
use crate::utils::logging::log_progress;
use std::sync::Arc;
use tokio::task::{JoinError, JoinSet};
use tracing::{error, info, warn};

/// 组装统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssemblyStats {
    pub total_pages: u32,
    /// 获取成功且有正文
    pub extracted: usize,
    /// 获取成功但提取为空
    pub empty: usize,
    /// 重试耗尽
    pub failed: usize,
    /// 未派发（已取消）或任务异常退出
    pub skipped: usize,
}

/// 组装结果
#[derive(Debug, Clone)]
pub struct AssembledBook {
    pub document: BookDocument,
    pub text: String,
    pub stats: AssemblyStats,
}

/// 整书组装器
pub struct BookAssembler<C: PageClient> {
    fetcher: Arc<PageFetcher<C>>,
    resolver: PaginationResolver,
    extractor: ContentExtractor,
    cancel: CancellationToken,
}

impl<C: PageClient> BookAssembler<C> {
    pub fn new(fetcher: PageFetcher<C>, resolver: PaginationResolver) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            resolver,
            extractor: ContentExtractor::new(),
            cancel: CancellationToken::new(),
        }
    }

    /// 使用外部的取消标记（例如 Ctrl-C）
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// 组装整本书
    pub async fn assemble(&self) -> AppResult<AssembledBook> {
        let total_pages = self.resolve_total_pages().await?;
        let locator = self.fetcher.locator();
        let mut book = BookDocument::new(locator, total_pages);

        info!(
            "📚 《{}》共 {} 页，并发数 {}",
            locator.display_name,
            total_pages,
            self.fetcher.concurrency()
        );

        let mut stats = AssemblyStats {
            total_pages,
            ..Default::default()
        };
        let mut tasks = JoinSet::new();
        let mut completed = 0u32;
        let mut dispatched = 0u32;

        for page_number in 1..=total_pages {
            if self.cancel.is_cancelled() {
                break;
            }
            let Some(admission) = self.fetcher.admit().await else {
                error!("并发闸门已关闭，停止派发");
                break;
            };
            if self.cancel.is_cancelled() {
                break;
            }

            let fetcher = Arc::clone(&self.fetcher);
            let request = PageRequest::new(page_number, locator.part);
            tasks.spawn(async move { fetcher.fetch_admitted(admission, request).await });
            dispatched += 1;

            while let Some(joined) = tasks.try_join_next() {
                completed += 1;
                self.record(&mut book, &mut stats, joined, completed);
            }
        }

        if dispatched < total_pages {
            warn!(
                "⚠️ 已取消：只派发了 {}/{} 页，等待在途请求结束",
                dispatched, total_pages
            );
        }

        while let Some(joined) = tasks.join_next().await {
            completed += 1;
            self.record(&mut book, &mut stats, joined, completed);
        }

        let missing = book.finalize();
        stats.skipped = missing;

        if dispatched == 0 {
            return Err(AssemblyError::Cancelled { stage: "派发页面" }.into());
        }
        if book.filled_pages() == 0 {
            return Err(AssemblyError::NothingRetrieved { total_pages }.into());
        }

        let text = book.assemble(PAGE_SEPARATOR);
        Ok(AssembledBook {
            document: book,
            text,
            stats,
        })
    }

    /// 获取第一页并解析总页数
    async fn resolve_total_pages(&self) -> AppResult<u32> {
        self.cancel.check_cancelled("解析页数")?;

        let part = self.fetcher.locator().part;
        match self.fetcher.fetch(PageRequest::new(1, part)).await {
            FetchOutcome::Success { raw_markup, .. } => Ok(self.resolver.resolve(&raw_markup)?),
            FetchOutcome::Failure { reason, .. } => {
                Err(PaginationError::FirstPageUnavailable { reason }.into())
            }
        }
    }

    /// 把一个任务结果写入对应槽位
    fn record(
        &self,
        book: &mut BookDocument,
        stats: &mut AssemblyStats,
        joined: Result<FetchOutcome, JoinError>,
        completed: u32,
    ) {
        let total = book.total_pages();
        let outcome = match joined {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("页面任务异常退出: {}", e);
                log_progress(completed, total, None, "任务异常");
                return;
            }
        };

        let page_number = outcome.page_number();
        let written = match outcome {
            FetchOutcome::Success { raw_markup, .. } => {
                let page = self.extractor.extract_page(page_number, &raw_markup);
                if page.is_empty() {
                    warn!("[第 {} 页] ⚠️ 未提取到正文", page_number);
                    stats.empty += 1;
                    log_progress(completed, total, Some(page_number), "空页");
                } else {
                    stats.extracted += 1;
                    log_progress(completed, total, Some(page_number), "成功");
                }
                book.fill(page)
            }
            FetchOutcome::Failure { reason, .. } => {
                warn!("[第 {} 页] ⚠️ 没有获取到内容: {}", page_number, reason);
                stats.failed += 1;
                log_progress(completed, total, Some(page_number), "失败");
                book.mark_empty(page_number)
            }
        };

        if let Err(e) = written {
            error!("[第 {} 页] 写入槽位失败: {}", page_number, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, FetchError};
    use crate::infrastructure::HttpResponse;
    use crate::models::DocumentLocator;
    use crate::services::RetryPolicy;
    use std::collections::HashMap;
    use std::time::Duration;

    fn locator() -> DocumentLocator {
        DocumentLocator {
            identifier: "1113".to_string(),
            display_name: "صيد الخاطر".to_string(),
            base_url: "http://book/read".to_string(),
            part: 1,
        }
    }

    fn url(page: u32) -> String {
        format!("http://book/read?part=1&page={}", page)
    }

    /// 每页一个固定响应 + 固定延迟，用来控制完成顺序
    struct FakeSite {
        pages: HashMap<String, (u16, String, Duration)>,
    }

    impl FakeSite {
        fn new() -> Self {
            Self {
                pages: HashMap::new(),
            }
        }

        fn page(mut self, page: u32, status: u16, body: &str, delay_ms: u64) -> Self {
            self.pages.insert(
                url(page),
                (status, body.to_string(), Duration::from_millis(delay_ms)),
            );
            self
        }
    }

    impl PageClient for FakeSite {
        async fn get(&self, url: &str) -> Result<HttpResponse, FetchError> {
            let Some((status, body, delay)) = self.pages.get(url).cloned() else {
                return Err(FetchError::Transport {
                    url: url.to_string(),
                    message: "connection refused".to_string(),
                });
            };
            tokio::time::sleep(delay).await;
            Ok(HttpResponse { status, body })
        }
    }

    /// 请求到指定地址时触发取消，其余行为与内层站点一致
    struct CancellingSite {
        inner: FakeSite,
        cancel: CancellationToken,
        trigger: String,
    }

    impl PageClient for CancellingSite {
        async fn get(&self, url: &str) -> Result<HttpResponse, FetchError> {
            if url == self.trigger {
                self.cancel.cancel();
            }
            self.inner.get(url).await
        }
    }

    fn first_page(total: u32, text: &str) -> String {
        format!(
            r#"<div class="page-nav"><div>1 / {}</div></div><article><p>{}</p></article>"#,
            total, text
        )
    }

    fn article(text: &str) -> String {
        format!("<article><p>{}</p></article>", text)
    }

    fn assembler(site: FakeSite, concurrency: usize) -> BookAssembler<FakeSite> {
        let fetcher = PageFetcher::new(
            site,
            locator(),
            concurrency,
            RetryPolicy::new(3, Duration::from_millis(10)),
        );
        BookAssembler::new(fetcher, PaginationResolver::new(None))
    }

    #[tokio::test(start_paused = true)]
    async fn test_order_independent_of_completion() {
        // 完成顺序 3, 1, 2
        let site = FakeSite::new()
            .page(1, 200, &first_page(3, "الأولى"), 20)
            .page(2, 200, &article("الثانية"), 30)
            .page(3, 200, &article("الثالثة"), 1);

        let book = assembler(site, 3).assemble().await.unwrap();

        assert_eq!(
            book.text,
            format!("الأولى{}الثانية{}الثالثة", PAGE_SEPARATOR, PAGE_SEPARATOR)
        );
        assert_eq!(book.stats.extracted, 3);
        assert_eq!(book.stats.failed, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_page_leaves_gap() {
        let site = FakeSite::new()
            .page(1, 200, &first_page(3, "الأولى"), 5)
            .page(2, 500, "", 5)
            .page(3, 200, &article("الثالثة"), 5);

        let book = assembler(site, 2).assemble().await.unwrap();

        assert_eq!(book.text, format!("الأولى{}الثالثة", PAGE_SEPARATOR));
        assert_eq!(book.stats.failed, 1);
        assert_eq!(book.document.missing_pages(), vec![2]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_extraction_is_not_failure() {
        let site = FakeSite::new()
            .page(1, 200, &first_page(2, "الأولى"), 5)
            .page(2, 200, "<article><p>12</p></article>", 5);

        let book = assembler(site, 2).assemble().await.unwrap();

        assert_eq!(book.text, "الأولى");
        assert_eq!(book.stats.empty, 1);
        assert_eq!(book.stats.failed, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unreachable_first_page_is_fatal() {
        let site = FakeSite::new().page(2, 200, &article("x"), 1);

        let err = assembler(site, 2).assemble().await.unwrap_err();

        assert!(matches!(
            err,
            AppError::Pagination(PaginationError::FirstPageUnavailable { .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_undeterminable_pagination_is_fatal() {
        let site = FakeSite::new().page(1, 200, &article("بلا ترقيم"), 1);

        let err = assembler(site, 2).assemble().await.unwrap_err();

        assert!(matches!(
            err,
            AppError::Pagination(PaginationError::Undeterminable)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_nothing_retrieved_is_distinct_failure() {
        // 第一页只有分页信息，没有正文；其余页全部失败
        let site = FakeSite::new()
            .page(1, 200, r#"<div class="page-nav"><div>1 / 3</div></div>"#, 1)
            .page(2, 404, "", 1)
            .page(3, 404, "", 1);

        let err = assembler(site, 2).assemble().await.unwrap_err();

        assert!(matches!(
            err,
            AppError::Assembly(AssemblyError::NothingRetrieved { total_pages: 3 })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_before_start() {
        let site = FakeSite::new().page(1, 200, &first_page(2, "x"), 1);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = assembler(site, 2)
            .with_cancellation(cancel)
            .assemble()
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            AppError::Assembly(AssemblyError::Cancelled { .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_mid_run_keeps_dispatched_pages() {
        let cancel = CancellationToken::new();
        let inner = FakeSite::new()
            .page(1, 200, &first_page(5, "الأولى"), 1)
            .page(2, 200, &article("الثانية"), 1)
            .page(3, 200, &article("الثالثة"), 1)
            .page(4, 200, &article("الرابعة"), 1)
            .page(5, 200, &article("الخامسة"), 1);
        let site = CancellingSite {
            inner,
            cancel: cancel.clone(),
            trigger: url(2),
        };
        // 并发数为 1：第 2 页的请求结束、许可释放之后才会轮到第 3 页
        let fetcher = PageFetcher::new(
            site,
            locator(),
            1,
            RetryPolicy::new(3, Duration::from_millis(10)),
        );

        let book = BookAssembler::new(fetcher, PaginationResolver::new(None))
            .with_cancellation(cancel)
            .assemble()
            .await
            .unwrap();

        assert_eq!(book.text, format!("الأولى{}الثانية", PAGE_SEPARATOR));
        assert_eq!(book.stats.extracted, 2);
        assert_eq!(book.stats.failed, 0);
        assert_eq!(book.stats.skipped, 3);
        assert_eq!(book.document.missing_pages(), vec![3, 4, 5]);
    }
}
