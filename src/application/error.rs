//! 应用层错误定义
//!
//! 统一的命令错误类型。片段相关错误携带顶层片段位置（结构分割输出中的下标）。

use thiserror::Error;

use crate::application::ports::{EncodingError, SinkError, SplitError};
use crate::domain::ChunkingError;

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 验证错误
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Token 计数失败，整次运行中止
    #[error("Encoding failed for segment {segment_index}: {source}")]
    Encoding {
        segment_index: usize,
        #[source]
        source: EncodingError,
    },

    /// 语义分割失败（重试耗尽或不可重试）
    #[error("Semantic split failed for segment {segment_index}: {source}")]
    Split {
        segment_index: usize,
        #[source]
        source: SplitError,
    },

    /// 语义分割没有进展
    #[error("No progress refining segment {segment_index} after {attempts} attempts: {reason}")]
    NonProgress {
        segment_index: usize,
        attempts: usize,
        reason: &'static str,
    },

    /// 输出错误
    #[error("Sink error: {0}")]
    SinkError(String),

    /// 内部错误
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ApplicationError {
    /// 创建验证错误
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    /// 创建内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError(message.into())
    }

    /// 出错的顶层片段位置
    pub fn segment_index(&self) -> Option<usize> {
        match self {
            Self::Encoding { segment_index, .. }
            | Self::Split { segment_index, .. }
            | Self::NonProgress { segment_index, .. } => Some(*segment_index),
            _ => None,
        }
    }
}

impl From<ChunkingError> for ApplicationError {
    fn from(err: ChunkingError) -> Self {
        Self::ValidationError(err.to_string())
    }
}

impl From<SinkError> for ApplicationError {
    fn from(err: SinkError) -> Self {
        Self::SinkError(err.to_string())
    }
}
