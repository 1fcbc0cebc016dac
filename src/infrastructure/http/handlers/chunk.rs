//! Chunk HTTP Handlers

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use std::sync::Arc;

use crate::application::ChunkDocument;
use crate::infrastructure::http::dto::{ApiResponse, ChunkRequest, ChunkResponse};
use crate::infrastructure::http::error::ApiError;
use crate::infrastructure::http::state::AppState;

/// 文档分块
pub async fn chunk_document(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ChunkRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<ChunkResponse>>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let mut command = ChunkDocument::new(
        request.source.unwrap_or_else(|| "http".to_string()),
        request.document,
    );
    if let Some(size) = request.max_chunk_token_size {
        command = command.with_max_chunk_token_size(size);
    }

    let report = state.chunk_document_handler.handle(command).await?;

    Ok(Json(ApiResponse::success(ChunkResponse::from(report))))
}
