//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod chunk_sink;
mod embedding;
mod semantic_splitter;
mod structural_splitter;
mod token_counter;

pub use chunk_sink::{format_chunks, ChunkSinkPort, SinkError, CHUNK_DELIMITER};
pub use embedding::{EmbeddingError, EmbeddingPort};
pub use semantic_splitter::{SemanticSplitterPort, SplitError, SplitOutcome};
pub use structural_splitter::StructuralSplitterPort;
pub use token_counter::{EncodingError, TokenCounterPort};
