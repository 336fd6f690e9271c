//! 单页相关的数据模型
//!
//! 请求 → 结果 → 提取文本，三者都只描述"一页"

use std::fmt::Display;

/// 单页请求
///
/// 标识一个可获取的单元：第几部分的第几页，以及当前是第几次尝试
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 页码（从1开始）
    pub page_number: u32,
    /// 部分编号（从1开始）
    pub part: u32,
    /// 已经进行过的尝试次数
    pub attempt: u32,
}

impl PageRequest {
    /// 创建第一次尝试的请求
    pub fn new(page_number: u32, part: u32) -> Self {
        Self {
            page_number,
            part,
            attempt: 0,
        }
    }
}

impl Display for PageRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[第 {} 部分 第 {} 页]", self.part, self.page_number)
    }
}

/// 单页获取结果
///
/// 由 PageFetcher 产生，由 BookAssembler 消费
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// 获取成功，携带原始 HTML
    Success { page_number: u32, raw_markup: String },
    /// 重试耗尽后仍然失败
    Failure { page_number: u32, reason: String },
}

impl FetchOutcome {
    pub fn page_number(&self) -> u32 {
        match self {
            FetchOutcome::Success { page_number, .. } | FetchOutcome::Failure { page_number, .. } => {
                *page_number
            }
        }
    }
}

/// 提取后的单页文本（可能为空）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedPage {
    pub page_number: u32,
    pub text: String,
}

impl ExtractedPage {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}
