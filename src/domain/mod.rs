//! Domain Layer - 领域层
//!
//! 包含:
//! - Chunking Context: 片段、分块及其值对象
//! - breakpoints: 语义断点计算（纯函数）

pub mod breakpoints;
pub mod chunking;

pub use chunking::{BreakpointPercentile, Chunk, ChunkingError, HeaderPath, Segment, TokenThreshold};
