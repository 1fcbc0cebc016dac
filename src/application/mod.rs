//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（TokenCounter、StructuralSplitter、SemanticSplitter、Embedding、ChunkSink）
//! - commands: 命令及处理器（ChunkSizeEnforcer 为核心算法）
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod ports;

// Re-exports
pub use commands::{
    ChunkDocument,
    EnforceChunkSize,
    // Handlers
    handlers::{
        ChunkDocumentHandler, ChunkReport, ChunkSizeEnforcer, ChunkStats, EnforcementResult,
        EnforcerConfig, RetryPolicy, WriteChunksHandler,
    },
};

pub use error::ApplicationError;

pub use ports::{
    // Chunk sink
    format_chunks,
    ChunkSinkPort,
    SinkError,
    CHUNK_DELIMITER,
    // Embedding
    EmbeddingError,
    EmbeddingPort,
    // Splitters
    SemanticSplitterPort,
    SplitError,
    SplitOutcome,
    StructuralSplitterPort,
    // Token counter
    EncodingError,
    TokenCounterPort,
};
