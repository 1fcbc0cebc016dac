//! Chunk Commands

use crate::domain::Segment;

/// 对已有片段序列执行 Token 预算约束
#[derive(Debug, Clone)]
pub struct EnforceChunkSize {
    pub segments: Vec<Segment>,
}

/// 对整篇文档分块（结构分割 + 预算约束）
#[derive(Debug, Clone)]
pub struct ChunkDocument {
    /// 文档来源（文件路径或请求标识，仅用于日志与报告）
    pub source: String,
    pub document: String,
    /// 覆盖配置中的最大 Token 数
    pub max_chunk_token_size: Option<usize>,
}

impl ChunkDocument {
    pub fn new(source: impl Into<String>, document: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            document: document.into(),
            max_chunk_token_size: None,
        }
    }

    pub fn with_max_chunk_token_size(mut self, max_tokens: usize) -> Self {
        self.max_chunk_token_size = Some(max_tokens);
        self
    }
}
