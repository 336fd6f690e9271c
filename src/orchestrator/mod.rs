//! 编排层（Orchestration Layer）
//!
//! ## 模块划分
//!
//! ### `app` - 应用入口
//! - 管理应用生命周期（初始化、运行）
//! - 持有 HTTP 客户端
//! - 写文件、输出全局统计信息
//!
//! ### `book_assembler` - 整书组装器
//! - 解析总页数
//! - 并发派发每一页的获取任务
//! - 按页码顺序拼接正文
//!
//! ## 层次关系
//!
//! ```text
//! app (整本书 → 文件)
//!     ↓
//! book_assembler (Vec<页> → 文本)
//!     ↓
//! services (能力层：fetch / pagination / extract / write)
//!     ↓
//! infrastructure (基础设施：PageClient)
//! ```

pub mod app;
pub mod book_assembler;

// 重新导出主要类型
pub use app::{App, BookReport};
pub use book_assembler::{AssembledBook, AssemblyStats, BookAssembler};
