//! Tiktoken Counter - 基于 tiktoken BPE 词表的 Token 计数
//!
//! 词表内置于 tiktoken-rs，构造时加载一次，计数过程不访问网络

use tiktoken_rs::CoreBPE;

use crate::application::ports::{EncodingError, TokenCounterPort};

/// 默认词表
pub const DEFAULT_ENCODING: &str = "cl100k_base";

/// 支持的词表名称
pub const SUPPORTED_ENCODINGS: &[&str] = &["cl100k_base", "o200k_base", "p50k_base", "r50k_base"];

/// Tiktoken Token 计数器
pub struct TiktokenCounter {
    encoding: String,
    bpe: CoreBPE,
}

impl TiktokenCounter {
    /// 按词表名称创建计数器
    pub fn new(encoding: &str) -> Result<Self, EncodingError> {
        let bpe = match encoding {
            "cl100k_base" => tiktoken_rs::cl100k_base(),
            "o200k_base" => tiktoken_rs::o200k_base(),
            "p50k_base" => tiktoken_rs::p50k_base(),
            "r50k_base" => tiktoken_rs::r50k_base(),
            other => return Err(EncodingError::UnknownVocabulary(other.to_string())),
        }
        .map_err(|e| EncodingError::TokenizerError(e.to_string()))?;

        tracing::debug!(encoding = %encoding, "Tokenizer vocabulary loaded");

        Ok(Self {
            encoding: encoding.to_string(),
            bpe,
        })
    }

    pub fn with_default_encoding() -> Result<Self, EncodingError> {
        Self::new(DEFAULT_ENCODING)
    }
}

impl TokenCounterPort for TiktokenCounter {
    fn count(&self, text: &str) -> Result<usize, EncodingError> {
        // NUL 字节不是合法的文本输入
        if let Some(offset) = text.find('\u{0}') {
            return Err(EncodingError::UnsupportedInput { offset });
        }
        Ok(self.bpe.encode_with_special_tokens(text).len())
    }

    fn vocabulary(&self) -> &str {
        &self.encoding
    }
}
