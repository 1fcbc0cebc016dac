//! Rechunk - 语义文档分块
//!
//! 先按 Markdown 标题结构切分，再以 Token 预算约束每个片段；
//! 超出预算的片段交给基于 Embedding 的语义分割器反复细分。
//!
//! 架构设计: Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Chunking Context: Segment、Chunk、TokenThreshold 等
//! - breakpoints: 分句与语义断点计算
//!
//! 应用层 (application/):
//! - Ports: TokenCounter, StructuralSplitter, SemanticSplitter, Embedding, ChunkSink
//! - Commands: ChunkSizeEnforcer（核心算法）、文档分块流程
//!
//! 基础设施层 (infrastructure/):
//! - Adapters: tiktoken 计数器、Markdown 分割器、语义分割器、Embedding 客户端、文件输出
//! - HTTP: RESTful API

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
