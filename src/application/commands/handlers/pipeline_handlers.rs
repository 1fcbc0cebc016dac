//! Pipeline Command Handlers
//!
//! 文档级流程：结构分割 -> 预算约束 -> 输出

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::ChunkSizeEnforcer;
use crate::application::commands::ChunkDocument;
use crate::application::error::ApplicationError;
use crate::application::ports::{ChunkSinkPort, StructuralSplitterPort};
use crate::domain::{Chunk, TokenThreshold};

/// 单次运行统计
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ChunkStats {
    pub segment_count: usize,
    pub chunk_count: usize,
    pub irreducible_count: usize,
    pub max_token_count: usize,
    pub total_tokens: usize,
    pub splitter_calls: usize,
    pub elapsed_ms: u64,
}

/// 分块报告
#[derive(Debug, Clone, Serialize)]
pub struct ChunkReport {
    pub run_id: Uuid,
    pub source: String,
    pub threshold: usize,
    pub chunks: Vec<Chunk>,
    pub stats: ChunkStats,
    pub completed_at: DateTime<Utc>,
}

/// 文档分块处理器
pub struct ChunkDocumentHandler {
    structural_splitter: Arc<dyn StructuralSplitterPort>,
    enforcer: Arc<ChunkSizeEnforcer>,
}

impl ChunkDocumentHandler {
    pub fn new(
        structural_splitter: Arc<dyn StructuralSplitterPort>,
        enforcer: Arc<ChunkSizeEnforcer>,
    ) -> Self {
        Self {
            structural_splitter,
            enforcer,
        }
    }

    pub async fn handle(&self, cmd: ChunkDocument) -> Result<ChunkReport, ApplicationError> {
        let enforcer = match cmd.max_chunk_token_size {
            Some(size) => self.enforcer.with_threshold(TokenThreshold::new(size)?),
            None => self.enforcer.as_ref().clone(),
        };
        let threshold = enforcer.config().threshold.get();
        let run_id = Uuid::new_v4();
        let started = Instant::now();

        let segments = self.structural_splitter.split(&cmd.document);
        let segment_count = segments.len();

        tracing::info!(
            run_id = %run_id,
            source = %cmd.source,
            bytes = cmd.document.len(),
            segments = segment_count,
            threshold = threshold,
            "Chunking document"
        );

        let result = enforcer.enforce(segments).await.map_err(|e| {
            tracing::error!(run_id = %run_id, error = %e, "Chunking failed");
            e
        })?;

        let stats = ChunkStats {
            segment_count,
            chunk_count: result.chunks.len(),
            irreducible_count: result.chunks.iter().filter(|c| c.is_irreducible()).count(),
            max_token_count: result.chunks.iter().map(Chunk::token_count).max().unwrap_or(0),
            total_tokens: result.chunks.iter().map(Chunk::token_count).sum(),
            splitter_calls: result.splitter_calls,
            elapsed_ms: started.elapsed().as_millis() as u64,
        };

        tracing::info!(
            run_id = %run_id,
            chunks = stats.chunk_count,
            irreducible = stats.irreducible_count,
            splitter_calls = stats.splitter_calls,
            elapsed_ms = stats.elapsed_ms,
            "Document chunked"
        );

        Ok(ChunkReport {
            run_id,
            source: cmd.source,
            threshold,
            chunks: result.chunks,
            stats,
            completed_at: Utc::now(),
        })
    }
}

/// 分块并写出处理器
///
/// 只有整次分块成功后才调用输出端
pub struct WriteChunksHandler {
    chunk_document: Arc<ChunkDocumentHandler>,
    sink: Arc<dyn ChunkSinkPort>,
}

impl WriteChunksHandler {
    pub fn new(chunk_document: Arc<ChunkDocumentHandler>, sink: Arc<dyn ChunkSinkPort>) -> Self {
        Self {
            chunk_document,
            sink,
        }
    }

    pub async fn handle(&self, cmd: ChunkDocument) -> Result<ChunkReport, ApplicationError> {
        let report = self.chunk_document.handle(cmd).await?;
        self.sink.write(&report.chunks).await?;

        tracing::info!(
            run_id = %report.run_id,
            chunks = report.chunks.len(),
            "Chunks written"
        );

        Ok(report)
    }
}
