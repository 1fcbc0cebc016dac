//! Token Counter Port - Token 计数抽象
//!
//! 定义 Token 计数的抽象接口，具体实现在 infrastructure/adapters 层

use thiserror::Error;

/// Token 编码错误
#[derive(Debug, Error)]
pub enum EncodingError {
    #[error("Unsupported input at byte offset {offset}")]
    UnsupportedInput { offset: usize },

    #[error("Unknown tokenizer vocabulary: {0}")]
    UnknownVocabulary(String),

    #[error("Tokenizer error: {0}")]
    TokenizerError(String),
}

/// Token Counter Port
///
/// 对固定词表确定且无副作用：不访问网络，不持有可变状态
pub trait TokenCounterPort: Send + Sync {
    /// 返回文本在当前词表下的 Token 数
    fn count(&self, text: &str) -> Result<usize, EncodingError>;

    /// 词表名称（用于日志）
    fn vocabulary(&self) -> &str;
}
