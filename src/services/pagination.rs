//! 总页数解析 - 业务能力层
//!
//! 从第一页的 HTML 推断整本书的页数。按顺序尝试：
//! 1. 分页控件 `.page-nav` 中的 "当前 / 总数"
//! 2. 没有分页控件时，任意 `div` 文本中的第一个 "数字 / 数字"
//! 3. 目录链接 `.toc-item a` 的 `page=` 参数最大值
//! 4. 配置的兜底页数
//!
//! 结果超过 `max_total_pages` 时视为页面异常，直接报错。

use crate::error::PaginationError;
use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;
use tracing::{debug, info, warn};

static PAGE_NAV: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".page-nav").expect("hardcoded selector is valid"));
static DIV: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div").expect("hardcoded selector is valid"));
static TOC_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".toc-item a").expect("hardcoded selector is valid"));

static PAGE_RATIO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*/\s*(\d+)").expect("hardcoded regex pattern is valid"));
static PAGE_PARAM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"page=(\d+)").expect("hardcoded regex pattern is valid"));

/// 单个分页策略：找不到就返回 None
pub type PaginationStrategy = fn(&Html) -> Option<u32>;

/// 按优先级排列的策略
pub const STRATEGIES: [(&str, PaginationStrategy); 3] = [
    ("分页控件", from_pagination_widget as PaginationStrategy),
    ("div 文本", from_container_text as PaginationStrategy),
    ("目录链接", from_toc_links as PaginationStrategy),
];

/// 默认的总页数上限
pub const DEFAULT_MAX_TOTAL_PAGES: u32 = 100_000;

/// 总页数解析器
#[derive(Debug, Clone)]
pub struct PaginationResolver {
    fallback_total_pages: Option<u32>,
    max_total_pages: u32,
}

impl Default for PaginationResolver {
    fn default() -> Self {
        Self::new(None)
    }
}

impl PaginationResolver {
    pub fn new(fallback_total_pages: Option<u32>) -> Self {
        Self {
            fallback_total_pages: fallback_total_pages.filter(|pages| *pages > 0),
            max_total_pages: DEFAULT_MAX_TOTAL_PAGES,
        }
    }

    /// 设置总页数上限，超过的结果会被拒绝
    pub fn with_max_total_pages(mut self, max_total_pages: u32) -> Self {
        self.max_total_pages = max_total_pages.max(1);
        self
    }

    /// 解析总页数，所有策略失败且没有兜底值时返回错误
    pub fn resolve(&self, first_page_markup: &str) -> Result<u32, PaginationError> {
        let document = Html::parse_document(first_page_markup);

        for (name, strategy) in STRATEGIES {
            if let Some(total) = strategy(&document) {
                info!("✓ 通过{}确定总页数: {}", name, total);
                return self.check_limit(total);
            }
            debug!("{} 未找到页数", name);
        }

        match self.fallback_total_pages {
            Some(total) => {
                warn!("⚠️ 所有分页策略都失败，使用配置的兜底页数: {}", total);
                self.check_limit(total)
            }
            None => Err(PaginationError::Undeterminable),
        }
    }

    fn check_limit(&self, total: u32) -> Result<u32, PaginationError> {
        if total > self.max_total_pages {
            return Err(PaginationError::TooManyPages {
                total,
                max: self.max_total_pages,
            });
        }
        Ok(total)
    }
}

/// 策略 1：分页控件里包含 "/" 的 div，没有时用控件自身文本
pub fn from_pagination_widget(document: &Html) -> Option<u32> {
    let widget = document.select(&PAGE_NAV).next()?;

    let text = widget
        .select(&DIV)
        .map(|div| div.text().collect::<String>())
        .find(|text| text.contains('/'))
        .unwrap_or_else(|| widget.text().collect());

    total_from_ratio(&text)
}

/// 策略 2：页面没有分页控件时，按文档顺序扫描所有 div
///
/// 控件存在但读不出页数时不扫描，避免误取正文里的日期等比例文本
pub fn from_container_text(document: &Html) -> Option<u32> {
    if document.select(&PAGE_NAV).next().is_some() {
        return None;
    }
    document
        .select(&DIV)
        .map(|div| div.text().collect::<String>())
        .filter(|text| text.contains('/'))
        .find_map(|text| total_from_ratio(&text))
}

/// 策略 3：目录链接中最大的 page 参数
pub fn from_toc_links(document: &Html) -> Option<u32> {
    document
        .select(&TOC_LINK)
        .filter_map(|link| link.value().attr("href"))
        .filter_map(|href| PAGE_PARAM.captures(href))
        .filter_map(|caps| parse_number(&caps[1]))
        .filter(|page| *page > 0)
        .max()
}

fn total_from_ratio(text: &str) -> Option<u32> {
    let caps = PAGE_RATIO.captures(text)?;
    parse_number(&caps[2]).filter(|total| *total > 0)
}

/// 解析十进制数字，兼容阿拉伯-印度数字（٠-٩ 与 ۰-۹）
pub fn parse_number(digits: &str) -> Option<u32> {
    digits.chars().try_fold(0u32, |acc, c| {
        let digit = match c {
            '0'..='9' => c as u32 - '0' as u32,
            '\u{0660}'..='\u{0669}' => c as u32 - 0x0660,
            '\u{06F0}'..='\u{06F9}' => c as u32 - 0x06F0,
            _ => return None,
        };
        acc.checked_mul(10)?.checked_add(digit)
    })
}
