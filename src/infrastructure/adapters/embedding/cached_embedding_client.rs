//! Cached Embedding Client - 带内存缓存的 Embedding 客户端
//!
//! 以文本 MD5 为键缓存向量。重复出现的句子窗口（例如同一片段在多轮细分中
//! 被再次切分）只向下游请求一次。条目数有上限，超出时淘汰最久未访问的条目，
//! 服务模式下所有请求共享同一个实例。

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use serde::Serialize;

use crate::application::ports::{EmbeddingError, EmbeddingPort};

/// 生成缓存键
pub fn embedding_cache_key(text: &str) -> String {
    format!("{:x}", md5::compute(text.as_bytes()))
}

/// 缓存统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EmbeddingCacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

struct CacheEntry {
    vector: Vec<f32>,
    /// 逻辑时钟，越小越久未访问
    last_accessed: u64,
}

pub struct CachedEmbeddingClient {
    inner: Arc<dyn EmbeddingPort>,
    cache: DashMap<String, CacheEntry>,
    max_entries: usize,
    clock: AtomicU64,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl CachedEmbeddingClient {
    pub fn new(inner: Arc<dyn EmbeddingPort>, max_entries: usize) -> Self {
        Self {
            inner,
            cache: DashMap::new(),
            max_entries: max_entries.max(1),
            clock: AtomicU64::new(0),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    pub fn stats(&self) -> EmbeddingCacheStats {
        EmbeddingCacheStats {
            entries: self.cache.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }

    pub fn clear(&self) {
        self.cache.clear();
    }

    fn tick(&self) -> u64 {
        self.clock.fetch_add(1, Ordering::Relaxed)
    }

    fn lookup(&self, key: &str) -> Option<Vec<f32>> {
        let mut entry = self.cache.get_mut(key)?;
        entry.last_accessed = self.tick();
        Some(entry.vector.clone())
    }

    fn store(&self, key: String, vector: Vec<f32>) {
        let last_accessed = self.tick();
        self.cache.insert(
            key,
            CacheEntry {
                vector,
                last_accessed,
            },
        );
        while self.cache.len() > self.max_entries {
            if !self.evict_lru() {
                break;
            }
        }
    }

    /// LRU 淘汰
    fn evict_lru(&self) -> bool {
        let oldest = self
            .cache
            .iter()
            .min_by_key(|entry| entry.value().last_accessed)
            .map(|entry| entry.key().clone());

        match oldest {
            Some(key) => {
                self.cache.remove(&key);
                self.evictions.fetch_add(1, Ordering::Relaxed);
                tracing::trace!(key = %key, "LRU evicted embedding");
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl EmbeddingPort for CachedEmbeddingClient {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let keys: Vec<String> = texts.iter().map(|t| embedding_cache_key(t)).collect();
        let mut vectors: Vec<Option<Vec<f32>>> = keys
            .iter()
            .map(|key| self.lookup(key))
            .collect();

        let missing: Vec<usize> = (0..texts.len()).filter(|&i| vectors[i].is_none()).collect();
        self.hits
            .fetch_add((texts.len() - missing.len()) as u64, Ordering::Relaxed);
        self.misses.fetch_add(missing.len() as u64, Ordering::Relaxed);

        if !missing.is_empty() {
            let batch: Vec<String> = missing.iter().map(|&i| texts[i].clone()).collect();
            let fetched = self.inner.embed(&batch).await?;
            if fetched.len() != batch.len() {
                return Err(EmbeddingError::InvalidResponse(format!(
                    "expected {} embeddings, got {}",
                    batch.len(),
                    fetched.len()
                )));
            }
            for (&i, vector) in missing.iter().zip(fetched) {
                self.store(keys[i].clone(), vector.clone());
                vectors[i] = Some(vector);
            }
        }

        tracing::trace!(
            inputs = texts.len(),
            fetched = missing.len(),
            "Embedding cache lookup"
        );

        Ok(vectors.into_iter().flatten().collect())
    }

    async fn health_check(&self) -> bool {
        self.inner.health_check().await
    }
}
