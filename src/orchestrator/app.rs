//! 应用入口 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：校验配置、创建 HTTP 客户端、组装各服务
//! 2. **整书提取**：委托 BookAssembler 完成获取和拼接
//! 3. **结果输出**：写入 txt 文件并输出统计信息
//!
//! ## 设计特点
//!
//! - **资源所有者**：唯一持有 HTTP 客户端的模块
//! - **向下委托**：不处理单页细节

use crate::cancellation::CancellationToken;
use crate::config::Config;
use crate::infrastructure::{PageClient, ReqwestPageClient};
use crate::orchestrator::book_assembler::{AssemblyStats, BookAssembler};
use crate::services::{BookWriter, PageFetcher, PaginationResolver, RetryPolicy};
use crate::utils::logging::{log_startup, print_final_stats};
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::info;

/// 单次运行报告
#[derive(Debug, Clone)]
pub struct BookReport {
    pub display_name: String,
    pub stats: AssemblyStats,
    pub output_path: PathBuf,
    pub elapsed: Duration,
    /// 正文开头，用于日志预览
    pub preview: String,
}

/// 应用主结构
pub struct App<C: PageClient = ReqwestPageClient> {
    config: Config,
    assembler: BookAssembler<C>,
    writer: BookWriter,
}

impl App<ReqwestPageClient> {
    /// 初始化应用（使用 reqwest 客户端）
    pub fn initialize(config: Config, cancel: CancellationToken) -> Result<Self> {
        config.validate().context("配置校验失败")?;
        let client = ReqwestPageClient::new(&config)?;
        Ok(Self::with_client(config, client, cancel))
    }
}

impl<C: PageClient> App<C> {
    /// 使用指定的页面客户端创建应用，调用方负责校验配置
    pub fn with_client(config: Config, client: C, cancel: CancellationToken) -> Self {
        let fetcher = PageFetcher::new(
            client,
            config.document_locator(),
            config.max_concurrent_pages,
            RetryPolicy::new(config.max_retries, config.retry_delay()),
        );
        let resolver = PaginationResolver::new(config.fallback_total_pages)
            .with_max_total_pages(config.max_total_pages);
        let assembler = BookAssembler::new(fetcher, resolver).with_cancellation(cancel);
        let writer = BookWriter::new(config.output_dir.clone());

        Self {
            config,
            assembler,
            writer,
        }
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<BookReport> {
        log_startup(&self.config);
        let started = Instant::now();

        let book = self
            .assembler
            .assemble()
            .await
            .with_context(|| format!("提取《{}》失败", self.config.book_name))?;

        if book.stats.failed + book.stats.skipped > 0 {
            info!(
                "⚠️ 部分页面缺失: {:?}",
                book.document.missing_pages()
            );
        }

        let output_path = self
            .writer
            .write(&self.config.book_name, &book.text)
            .await
            .context("保存书籍失败")?;

        let report = BookReport {
            display_name: self.config.book_name.clone(),
            stats: book.stats,
            output_path,
            elapsed: started.elapsed(),
            preview: book.text.chars().take(200).collect(),
        };

        print_final_stats(&report);

        Ok(report)
    }
}
