//! Application State
//!
//! HTTP 处理器共享的应用状态

use std::sync::Arc;

use crate::application::ChunkDocumentHandler;

/// 应用状态
pub struct AppState {
    pub chunk_document_handler: Arc<ChunkDocumentHandler>,
}

impl AppState {
    pub fn new(chunk_document_handler: Arc<ChunkDocumentHandler>) -> Self {
        Self {
            chunk_document_handler,
        }
    }
}
