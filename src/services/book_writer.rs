//! 书籍写入服务 - 业务能力层
//!
//! 只负责"把整本书写成一个 txt 文件"

use crate::error::OutputError;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tracing::{debug, info};

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("hardcoded regex pattern is valid"));
static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w]").expect("hardcoded regex pattern is valid"));

/// 书籍写入服务
pub struct BookWriter {
    output_dir: PathBuf,
}

impl BookWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// 由显示名称生成文件名：空白换成 `_`，只保留单词字符
    pub fn file_stem(display_name: &str) -> Result<String, OutputError> {
        let underscored = WHITESPACE.replace_all(display_name.trim(), "_");
        let stem = NON_WORD.replace_all(&underscored, "").into_owned();
        if stem.trim_matches('_').is_empty() {
            return Err(OutputError::InvalidFileName {
                name: display_name.to_string(),
            });
        }
        Ok(stem)
    }

    pub fn output_path(&self, display_name: &str) -> Result<PathBuf, OutputError> {
        let stem = Self::file_stem(display_name)?;
        Ok(self.output_dir.join(format!("{}.txt", stem)))
    }

    /// 写入 UTF-8 文本，返回文件路径
    pub async fn write(&self, display_name: &str, content: &str) -> Result<PathBuf, OutputError> {
        let path = self.output_path(display_name)?;

        if content.trim().is_empty() {
            return Err(OutputError::EmptyContent {
                path: path.display().to_string(),
            });
        }

        ensure_dir(&self.output_dir, &path).await?;

        debug!("写入 {} 字节到 {}", content.len(), path.display());
        tokio::fs::write(&path, content)
            .await
            .map_err(|source| OutputError::WriteFailed {
                path: path.display().to_string(),
                source,
            })?;

        info!("📄 书籍已保存至: {}", path.display());
        Ok(path)
    }
}

async fn ensure_dir(dir: &Path, path: &Path) -> Result<(), OutputError> {
    if dir.as_os_str().is_empty() {
        return Ok(());
    }
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| OutputError::WriteFailed {
            path: path.display().to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_stem_keeps_arabic_letters() {
        assert_eq!(BookWriter::file_stem("صيد الخاطر").unwrap(), "صيد_الخاطر");
        assert_eq!(BookWriter::file_stem("  A  Book: v2! ").unwrap(), "A_Book_v2");
    }

    #[test]
    fn test_file_stem_rejects_punctuation_only() {
        assert!(matches!(
            BookWriter::file_stem("?!/"),
            Err(OutputError::InvalidFileName { .. })
        ));
        assert!(BookWriter::file_stem("   ").is_err());
    }

    #[test]
    fn test_output_path_in_dir() {
        let writer = BookWriter::new("out");
        assert_eq!(
            writer.output_path("صيد الخاطر").unwrap(),
            PathBuf::from("out").join("صيد_الخاطر.txt")
        );
    }

    #[tokio::test]
    async fn test_write_creates_file() {
        let dir = std::env::temp_dir().join(format!("book_writer_test_{}", std::process::id()));
        let writer = BookWriter::new(&dir);

        let path = writer.write("كتاب تجربة", "نص\n\n===========\n\nنص").await.unwrap();

        let saved = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(saved, "نص\n\n===========\n\nنص");
        assert_eq!(path.file_name().unwrap().to_string_lossy(), "كتاب_تجربة.txt");

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_empty_content_not_written() {
        let writer = BookWriter::new(std::env::temp_dir());
        let result = writer.write("فارغ", "  \n").await;
        assert!(matches!(result, Err(OutputError::EmptyContent { .. })));
    }
}
