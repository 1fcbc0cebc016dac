//! Chunking Context - Errors

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ChunkingError {
    #[error("无效的 Token 阈值: {0} (必须大于 0)")]
    InvalidThreshold(usize),

    #[error("无效的断点百分位: {0} (必须位于 [0, 1])")]
    InvalidPercentile(f64),

    #[error("无效的标题层级: {0} (必须位于 1..=6)")]
    InvalidHeaderLevel(usize),
}
