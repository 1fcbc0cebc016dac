//! Data Transfer Objects

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::{ChunkReport, ChunkStats};
use crate::domain::Chunk;

// ============================================================================
// 统一响应结构
// ============================================================================

/// 统一 API 响应格式
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub errno: i32,
    pub error: String,
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// 成功响应
    pub fn success(data: T) -> Self {
        Self {
            errno: 0,
            error: String::new(),
            data: Some(data),
        }
    }
}

// ============================================================================
// Chunk DTOs
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ChunkRequest {
    pub document: String,
    /// 来源标识（用于日志）
    #[serde(default)]
    pub source: Option<String>,
    /// 覆盖默认的分块 Token 上限
    #[serde(default)]
    pub max_chunk_token_size: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ChunkDto {
    pub index: usize,
    pub text: String,
    pub token_count: usize,
    pub irreducible: bool,
    pub header_path: Vec<String>,
}

impl From<Chunk> for ChunkDto {
    fn from(chunk: Chunk) -> Self {
        Self {
            index: chunk.index(),
            token_count: chunk.token_count(),
            irreducible: chunk.is_irreducible(),
            header_path: chunk.header_path().headers().to_vec(),
            text: chunk.text().to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ChunkResponse {
    pub run_id: Uuid,
    pub threshold: usize,
    pub chunks: Vec<ChunkDto>,
    pub stats: ChunkStats,
    pub completed_at: DateTime<Utc>,
}

impl From<ChunkReport> for ChunkResponse {
    fn from(report: ChunkReport) -> Self {
        Self {
            run_id: report.run_id,
            threshold: report.threshold,
            chunks: report.chunks.into_iter().map(ChunkDto::from).collect(),
            stats: report.stats,
            completed_at: report.completed_at,
        }
    }
}
