//! Tokenizer Adapter - Token 计数实现

mod tiktoken_counter;
mod word_counter;

pub use tiktoken_counter::{TiktokenCounter, DEFAULT_ENCODING, SUPPORTED_ENCODINGS};
pub use word_counter::{WordTokenCounter, WORD_ENCODING};
