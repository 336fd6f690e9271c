//! # Book Extractor
//!
//! 把按页分割的在线书籍（`?part=N&page=M`）完整下载为一个 txt 文件
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有 HTTP 客户端，只暴露 GET 能力
//! - `PageClient` - 页面获取能力，`ReqwestPageClient` 为默认实现
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，只处理单个页面
//! - `PageFetcher` - 并发受限、带重试的页面获取
//! - `PaginationResolver` - 从第一页推断总页数
//! - `ContentExtractor` - HTML → 正文
//! - `BookWriter` - 写 txt 文件
//!
//! ### ③ 编排层（Orchestration）
//! - `orchestrator/book_assembler` - 整书组装，管理并发和槽位
//! - `orchestrator/app` - 应用入口，管理资源和输出
//!
//! ## 模块结构

pub mod cancellation;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;

// 重新导出常用类型
pub use cancellation::CancellationToken;
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::{PageClient, ReqwestPageClient};
pub use models::{BookDocument, DocumentLocator, ExtractedPage, FetchOutcome, PageRequest};
pub use orchestrator::{App, BookAssembler, BookReport};
pub use services::{ContentExtractor, PageFetcher, PaginationResolver, RetryPolicy};
