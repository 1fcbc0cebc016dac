//! Embedding Adapter - 文本向量化客户端实现

mod cached_embedding_client;
mod fake_embedding_client;
mod http_embedding_client;

pub use cached_embedding_client::{embedding_cache_key, CachedEmbeddingClient, EmbeddingCacheStats};
pub use fake_embedding_client::FakeEmbeddingClient;
pub use http_embedding_client::*;
