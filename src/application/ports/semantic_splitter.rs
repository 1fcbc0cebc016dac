//! Semantic Splitter Port - 语义分割抽象
//!
//! 将一个超出预算的片段细分为更小的有序子片段

use async_trait::async_trait;
use thiserror::Error;

use super::EmbeddingError;
use crate::domain::Segment;

/// 语义分割错误
#[derive(Debug, Error)]
pub enum SplitError {
    #[error("Embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("Split timed out")]
    Timeout,

    #[error("Malformed split response: {0}")]
    MalformedResponse(String),

    #[error("Splitter returned no pieces for non-empty text")]
    EmptyResult,
}

impl SplitError {
    pub fn is_transient(&self) -> bool {
        match self {
            SplitError::Embedding(e) => e.is_transient(),
            SplitError::Timeout => true,
            SplitError::MalformedResponse(_) | SplitError::EmptyResult => false,
        }
    }
}

/// 一次语义分割的结果
#[derive(Debug, Clone, PartialEq)]
pub enum SplitOutcome {
    /// 保序、无损的子片段
    Split(Vec<Segment>),
    /// 无法进一步细分（例如只剩一个句子）
    Irreducible,
}

/// Semantic Splitter Port
///
/// 进展契约: 对超出预算的片段，要么返回两个及以上子片段，
/// 要么返回与输入不同的单个片段，要么显式返回 Irreducible。
/// 返回与输入完全相同的单个片段属于违约，由调用方判定为无进展。
#[async_trait]
pub trait SemanticSplitterPort: Send + Sync {
    async fn split(&self, segment: &Segment) -> Result<SplitOutcome, SplitError>;
}
