//! Structural Adapter - 结构分割实现

mod markdown_splitter;

pub use markdown_splitter::{MarkdownHeaderSplitter, DEFAULT_MAX_HEADER_LEVEL};
