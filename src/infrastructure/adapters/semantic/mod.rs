//! Semantic Adapter - 语义分割实现

mod embedding_splitter;
mod scripted_splitter;

pub use embedding_splitter::{EmbeddingSemanticSplitter, SemanticSplitterConfig};
pub use scripted_splitter::ScriptedSemanticSplitter;
