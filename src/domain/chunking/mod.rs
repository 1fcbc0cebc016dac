//! Chunking Context - 分块限界上下文
//!
//! 职责:
//! - 文本片段 (Segment) 与最终分块 (Chunk) 实体
//! - Token 预算、断点百分位、标题路径等值对象

mod entities;
mod errors;
mod value_objects;

pub use entities::{Chunk, Segment};
pub use errors::ChunkingError;
pub use value_objects::{BreakpointPercentile, HeaderPath, TokenThreshold};
