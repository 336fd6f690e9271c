//! 书籍数据模型
//!
//! `BookDocument` 在总页数确定后创建，每个槽位只写一次，
//! 全部请求结束后按页码顺序拼接

use crate::models::page::ExtractedPage;
use thiserror::Error;

/// 文档定位信息：基础地址 + 部分编号
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentLocator {
    /// 书籍标识（如 ketabonline 的 book id）
    pub identifier: String,
    /// 显示名称，用于生成输出文件名
    pub display_name: String,
    /// 基础 URL，不带查询参数
    pub base_url: String,
    /// 部分编号
    pub part: u32,
}

impl DocumentLocator {
    /// 构建某一页的目标地址：`{base}?part={part}&page={page}`
    pub fn page_url(&self, part: u32, page_number: u32) -> String {
        format!("{}?part={}&page={}", self.base_url, part, page_number)
    }
}

/// 槽位写入错误
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SlotError {
    #[error("页码 {page_number} 超出范围 [1, {total_pages}]")]
    OutOfRange { page_number: u32, total_pages: u32 },
    #[error("页码 {page_number} 的槽位已写入")]
    AlreadyWritten { page_number: u32 },
}

#[derive(Debug, Clone)]
enum Slot {
    Pending,
    Empty,
    Filled(String),
}

/// 整本书
#[derive(Debug, Clone)]
pub struct BookDocument {
    pub identifier: String,
    pub display_name: String,
    total_pages: u32,
    slots: Vec<Slot>,
}

impl BookDocument {
    /// 总页数确定后创建，`total_pages` 之后不再变化
    pub fn new(locator: &DocumentLocator, total_pages: u32) -> Self {
        Self {
            identifier: locator.identifier.clone(),
            display_name: locator.display_name.clone(),
            total_pages,
            slots: vec![Slot::Pending; total_pages as usize],
        }
    }

    pub fn total_pages(&self) -> u32 {
        self.total_pages
    }

    fn index_of(&self, page_number: u32) -> Result<usize, SlotError> {
        if page_number == 0 || page_number > self.total_pages {
            return Err(SlotError::OutOfRange {
                page_number,
                total_pages: self.total_pages,
            });
        }
        Ok((page_number - 1) as usize)
    }

    /// 写入一页提取结果，空文本记为显式空槽
    pub fn fill(&mut self, page: ExtractedPage) -> Result<(), SlotError> {
        let index = self.index_of(page.page_number)?;
        let slot = &mut self.slots[index];
        if !matches!(slot, Slot::Pending) {
            return Err(SlotError::AlreadyWritten {
                page_number: page.page_number,
            });
        }
        *slot = if page.text.is_empty() {
            Slot::Empty
        } else {
            Slot::Filled(page.text)
        };
        Ok(())
    }

    /// 标记某页没有内容（获取失败或未派发）
    pub fn mark_empty(&mut self, page_number: u32) -> Result<(), SlotError> {
        self.fill(ExtractedPage {
            page_number,
            text: String::new(),
        })
    }

    /// 结束写入：仍未写入的槽位记为空，返回这些槽位的数量
    pub fn finalize(&mut self) -> usize {
        let mut pending = 0;
        for slot in self.slots.iter_mut() {
            if matches!(slot, Slot::Pending) {
                *slot = Slot::Empty;
                pending += 1;
            }
        }
        pending
    }

    /// 有内容的页数
    pub fn filled_pages(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| matches!(slot, Slot::Filled(_)))
            .count()
    }

    /// 所有没有内容的页码（升序）
    pub fn missing_pages(&self) -> Vec<u32> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| !matches!(slot, Slot::Filled(_)))
            .map(|(index, _)| index as u32 + 1)
            .collect()
    }

    /// 按页码升序拼接非空槽位
    pub fn assemble(&self, separator: &str) -> String {
        self.slots
            .iter()
            .filter_map(|slot| match slot {
                Slot::Filled(text) => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join(separator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn locator() -> DocumentLocator {
        DocumentLocator {
            identifier: "1113".to_string(),
            display_name: "صيد الخاطر".to_string(),
            base_url: "https://ketabonline.com/ar/books/1113/read".to_string(),
            part: 1,
        }
    }

    fn page(page_number: u32, text: &str) -> ExtractedPage {
        ExtractedPage {
            page_number,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_page_url() {
        assert_eq!(
            locator().page_url(1, 42),
            "https://ketabonline.com/ar/books/1113/read?part=1&page=42"
        );
    }

    #[test]
    fn test_assemble_ignores_fill_order() {
        let mut book = BookDocument::new(&locator(), 3);
        book.fill(page(3, "ثالث")).unwrap();
        book.fill(page(1, "أول")).unwrap();
        book.fill(page(2, "ثان")).unwrap();

        assert_eq!(book.assemble("|"), "أول|ثان|ثالث");
    }

    #[test]
    fn test_slot_is_write_once() {
        let mut book = BookDocument::new(&locator(), 2);
        book.fill(page(1, "a")).unwrap();
        assert_eq!(
            book.fill(page(1, "b")),
            Err(SlotError::AlreadyWritten { page_number: 1 })
        );
        assert_eq!(book.assemble("|"), "a");
    }

    #[test]
    fn test_out_of_range_pages_rejected() {
        let mut book = BookDocument::new(&locator(), 2);
        assert!(matches!(
            book.fill(page(0, "x")),
            Err(SlotError::OutOfRange { .. })
        ));
        assert!(matches!(
            book.fill(page(3, "x")),
            Err(SlotError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_empty_slots_are_skipped() {
        let mut book = BookDocument::new(&locator(), 3);
        book.fill(page(1, "a")).unwrap();
        book.mark_empty(2).unwrap();
        book.fill(page(3, "c")).unwrap();

        assert_eq!(book.assemble("\n---\n"), "a\n---\nc");
        assert_eq!(book.filled_pages(), 2);
        assert_eq!(book.missing_pages(), vec![2]);
    }

    #[test]
    fn test_finalize_closes_pending_slots() {
        let mut book = BookDocument::new(&locator(), 4);
        book.fill(page(2, "b")).unwrap();
        book.mark_empty(3).unwrap();

        assert_eq!(book.finalize(), 2);
        assert_eq!(book.missing_pages(), vec![1, 3, 4]);
        assert!(book.fill(page(1, "late")).is_err());
        assert_eq!(book.assemble("|"), "b");
    }
}
