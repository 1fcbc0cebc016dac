//! Chunk Sink Port - 分块输出抽象

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::Chunk;

/// 分块之间的分隔行
pub const CHUNK_DELIMITER: &str = "------------";

/// Sink 错误
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("IO error: {0}")]
    IoError(String),
}

/// Chunk Sink Port
///
/// 只会在整篇文档分块成功后被调用一次
#[async_trait]
pub trait ChunkSinkPort: Send + Sync {
    async fn write(&self, chunks: &[Chunk]) -> Result<(), SinkError>;
}

/// 渲染分块输出
///
/// 每个分块: 分隔行、换行、分块文本、换行
pub fn format_chunks(chunks: &[Chunk]) -> String {
    let capacity = chunks
        .iter()
        .map(|c| c.text().len() + CHUNK_DELIMITER.len() + 2)
        .sum();
    let mut out = String::with_capacity(capacity);
    for chunk in chunks {
        out.push_str(CHUNK_DELIMITER);
        out.push('\n');
        out.push_str(chunk.text());
        out.push('\n');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Segment;

    #[test]
    fn test_format_chunks() {
        let chunks = vec![
            Chunk::accepted(0, Segment::new(0, "alpha"), 1),
            Chunk::accepted(1, Segment::new(1, "beta gamma"), 2),
        ];
        assert_eq!(
            format_chunks(&chunks),
            "------------\nalpha\n------------\nbeta gamma\n"
        );
        assert_eq!(format_chunks(&[]), "");
    }
}
