//! Word Token Counter - 以空白分隔的词数作为 Token 数
//!
//! 用于测试与离线演示，结果便于手工推算

use crate::application::ports::{EncodingError, TokenCounterPort};

/// 配置中选择词数计数器的编码名
pub const WORD_ENCODING: &str = "words";

#[derive(Debug, Default, Clone, Copy)]
pub struct WordTokenCounter;

impl WordTokenCounter {
    pub fn new() -> Self {
        Self
    }
}

impl TokenCounterPort for WordTokenCounter {
    fn count(&self, text: &str) -> Result<usize, EncodingError> {
        Ok(text.split_whitespace().count())
    }

    fn vocabulary(&self) -> &str {
        WORD_ENCODING
    }
}
