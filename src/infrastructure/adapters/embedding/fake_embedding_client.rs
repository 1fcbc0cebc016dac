//! Fake Embedding Client - 用于测试的 Embedding 客户端
//!
//! 由文本字节生成确定性单位向量，不调用外部服务

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::application::ports::{EmbeddingError, EmbeddingPort};

/// Fake Embedding Client
#[derive(Debug)]
pub struct FakeEmbeddingClient {
    dimensions: usize,
    /// 累计向量化的文本数
    embedded: AtomicUsize,
}

impl Default for FakeEmbeddingClient {
    fn default() -> Self {
        Self::new(8)
    }
}

impl FakeEmbeddingClient {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
            embedded: AtomicUsize::new(0),
        }
    }

    pub fn embedded(&self) -> usize {
        self.embedded.load(Ordering::SeqCst)
    }
}

/// 字节按位置累加到各维度后归一化
fn text_to_vector(text: &str, dimensions: usize) -> Vec<f32> {
    let mut vector = vec![0.0f32; dimensions];
    for (i, byte) in text.bytes().enumerate() {
        vector[i % dimensions] += f32::from(byte);
    }
    let magnitude = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if magnitude > 0.0 {
        vector.iter_mut().for_each(|x| *x /= magnitude);
    }
    vector
}

#[async_trait]
impl EmbeddingPort for FakeEmbeddingClient {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        self.embedded.fetch_add(texts.len(), Ordering::SeqCst);
        tracing::debug!(inputs = texts.len(), "FakeEmbeddingClient: hashing texts");
        Ok(texts
            .iter()
            .map(|t| text_to_vector(t, self.dimensions))
            .collect())
    }
}
