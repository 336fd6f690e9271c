//! 正文提取 - 业务能力层
//!
//! 纯函数：HTML → 纯文本。不做 I/O，相同输入永远得到相同输出。
//!
//! 提取顺序（第一个非空结果生效）：
//! 1. `article` 中的段落
//! 2. `article p, .article-content p, .page-content p`
//! 3. 第一个 `.generic` 容器中的段落
//!
//! 读取文本前先删除脚注、导航按钮、脚本和样式节点。摘除后的节点仍留在
//! 树的存储里，所以各阶段只从根元素向下查找。

use crate::models::ExtractedPage;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

/// 同一页内段落之间的分隔符
pub const PARAGRAPH_SEPARATOR: &str = "\n\n";
/// 页与页之间的分隔符
pub const PAGE_SEPARATOR: &str = "\n\n===========\n\n";

/// 引用段落剩余文字少于该字符数时视为纯脚注引用
const MIN_REFERENCE_TEXT_CHARS: usize = 5;

static NOISE: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(".footnote, .nav-btn, .page-controls, script, style")
        .expect("hardcoded selector is valid")
});
static ARTICLE_PARAGRAPHS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("article p").expect("hardcoded selector is valid"));
static CONTENT_PARAGRAPHS: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("article p, .article-content p, .page-content p")
        .expect("hardcoded selector is valid")
});
static GENERIC_CONTAINER: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(".generic").expect("hardcoded selector is valid"));
static PARAGRAPH: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("p").expect("hardcoded selector is valid"));
static INTERNAL_ANCHOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r##"a[href^="#"]"##).expect("hardcoded selector is valid"));

static BARE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+$").expect("hardcoded regex pattern is valid"));
static FOOTNOTE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+-\s*").expect("hardcoded regex pattern is valid"));

/// 单个提取阶段：返回该阶段找到的段落
pub type ExtractionStage = fn(&Html) -> Vec<String>;

/// 按优先级排列的提取阶段
pub const STAGES: [ExtractionStage; 3] = [
    article_paragraphs as ExtractionStage,
    content_paragraphs as ExtractionStage,
    generic_paragraphs as ExtractionStage,
];

/// 正文提取器
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentExtractor;

impl ContentExtractor {
    pub fn new() -> Self {
        Self
    }

    /// 提取一页正文，没有内容时返回空字符串
    pub fn extract(&self, raw_markup: &str) -> String {
        if raw_markup.trim().is_empty() {
            return String::new();
        }

        let mut document = Html::parse_document(raw_markup);
        remove_noise(&mut document);

        STAGES
            .iter()
            .map(|stage| stage(&document))
            .find(|paragraphs| !paragraphs.is_empty())
            .map(|paragraphs| paragraphs.join(PARAGRAPH_SEPARATOR))
            .unwrap_or_default()
    }

    pub fn extract_page(&self, page_number: u32, raw_markup: &str) -> ExtractedPage {
        ExtractedPage {
            page_number,
            text: self.extract(raw_markup),
        }
    }
}

/// 从树上摘除噪声节点，之后从根元素出发的选择器都看不到它们
fn remove_noise(document: &mut Html) {
    let noise: Vec<_> = document.select(&NOISE).map(|element| element.id()).collect();
    for id in noise {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }
}

pub fn article_paragraphs(document: &Html) -> Vec<String> {
    collect_paragraphs(document.root_element().select(&ARTICLE_PARAGRAPHS))
}

pub fn content_paragraphs(document: &Html) -> Vec<String> {
    collect_paragraphs(document.root_element().select(&CONTENT_PARAGRAPHS))
}

pub fn generic_paragraphs(document: &Html) -> Vec<String> {
    document
        .root_element()
        .select(&GENERIC_CONTAINER)
        .next()
        .map(|container| collect_paragraphs(container.select(&PARAGRAPH)))
        .unwrap_or_default()
}

fn collect_paragraphs<'a>(paragraphs: impl Iterator<Item = ElementRef<'a>>) -> Vec<String> {
    paragraphs.filter_map(clean_paragraph).collect()
}

/// 段落过滤 + 清理，需要跳过时返回 None
fn clean_paragraph(paragraph: ElementRef<'_>) -> Option<String> {
    let text = normalize_whitespace(&paragraph.text().collect::<String>());

    if text.is_empty() || BARE_NUMBER.is_match(&text) {
        return None;
    }

    if paragraph.select(&INTERNAL_ANCHOR).next().is_some()
        && text.chars().count() < MIN_REFERENCE_TEXT_CHARS
    {
        return None;
    }

    let cleaned = FOOTNOTE_MARKER.replace(&text, "").trim().to_string();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
