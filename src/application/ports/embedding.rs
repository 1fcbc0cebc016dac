//! Embedding Port - 文本向量化抽象
//!
//! 定义 Embedding 服务的抽象接口，具体实现在 infrastructure/adapters 层

use async_trait::async_trait;
use thiserror::Error;

/// Embedding 错误
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Service error: {0}")]
    ServiceError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl EmbeddingError {
    /// 网络抖动与超时可以重试，其余错误重试也不会改变结果
    pub fn is_transient(&self) -> bool {
        matches!(self, EmbeddingError::NetworkError(_) | EmbeddingError::Timeout)
    }
}

/// Embedding Port
///
/// 外部 Embedding 服务的抽象接口
#[async_trait]
pub trait EmbeddingPort: Send + Sync {
    /// 批量向量化，返回向量与输入一一对应
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    /// 检查 Embedding 服务是否可用
    async fn health_check(&self) -> bool {
        true // 默认实现
    }
}
