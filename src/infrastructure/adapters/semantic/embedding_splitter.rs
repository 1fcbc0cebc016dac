//! Embedding Semantic Splitter - 基于句向量距离的语义分割
//!
//! 1. 按句子边界分句
//! 2. 每句与两侧 buffer_size 个相邻句子组成上下文窗口并向量化
//! 3. 相邻窗口的余弦距离超过百分位阈值处断开
//!
//! 只有一个句子的片段返回 Irreducible。

use std::sync::Arc;

use async_trait::async_trait;

use crate::application::ports::{EmbeddingPort, SemanticSplitterPort, SplitError, SplitOutcome};
use crate::domain::breakpoints::{
    adjacent_distances, combine_with_neighbours, group_sentences, select_breakpoints,
    split_sentences, DEFAULT_BUFFER_SIZE,
};
use crate::domain::{BreakpointPercentile, Segment};

/// 语义分割器配置
#[derive(Debug, Clone)]
pub struct SemanticSplitterConfig {
    pub breakpoint_percentile: BreakpointPercentile,
    pub buffer_size: usize,
}

impl Default for SemanticSplitterConfig {
    fn default() -> Self {
        Self {
            breakpoint_percentile: BreakpointPercentile::default(),
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }
}

/// 基于 Embedding 的语义分割器
pub struct EmbeddingSemanticSplitter {
    embeddings: Arc<dyn EmbeddingPort>,
    config: SemanticSplitterConfig,
}

impl EmbeddingSemanticSplitter {
    pub fn new(embeddings: Arc<dyn EmbeddingPort>, config: SemanticSplitterConfig) -> Self {
        Self { embeddings, config }
    }
}

#[async_trait]
impl SemanticSplitterPort for EmbeddingSemanticSplitter {
    async fn split(&self, segment: &Segment) -> Result<SplitOutcome, SplitError> {
        let sentences = split_sentences(segment.text());
        if sentences.len() < 2 {
            return Ok(SplitOutcome::Irreducible);
        }

        let windows = combine_with_neighbours(&sentences, self.config.buffer_size);
        let embeddings = self.embeddings.embed(&windows).await?;
        if embeddings.len() != windows.len() {
            return Err(SplitError::MalformedResponse(format!(
                "expected {} embeddings, got {}",
                windows.len(),
                embeddings.len()
            )));
        }

        let distances = adjacent_distances(&embeddings);
        let breakpoints =
            select_breakpoints(&distances, self.config.breakpoint_percentile.get());
        let groups = group_sentences(&sentences, &breakpoints);

        tracing::debug!(
            segment_index = segment.index(),
            sentences = sentences.len(),
            pieces = groups.len(),
            "Segment split at semantic breakpoints"
        );

        if groups.len() < 2 {
            return Ok(SplitOutcome::Irreducible);
        }

        Ok(SplitOutcome::Split(
            groups
                .into_iter()
                .enumerate()
                .map(|(i, text)| segment.child(i, text))
                .collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::EmbeddingError;
    use crate::domain::HeaderPath;
    use crate::infrastructure::adapters::FakeEmbeddingClient;

    /// 按话题关键词给出正交向量
    struct TopicEmbeddings;

    #[async_trait]
    impl EmbeddingPort for TopicEmbeddings {
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            Ok(texts
                .iter()
                .map(|t| {
                    if t.contains("Cat") {
                        vec![1.0, 0.0]
                    } else {
                        vec![0.0, 1.0]
                    }
                })
                .collect())
        }
    }

    struct ShortEmbeddings;

    #[async_trait]
    impl EmbeddingPort for ShortEmbeddings {
        async fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            Ok(vec![vec![1.0]])
        }
    }

    struct DownEmbeddings;

    #[async_trait]
    impl EmbeddingPort for DownEmbeddings {
        async fn embed(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            Err(EmbeddingError::NetworkError("connection refused".into()))
        }
    }

    fn splitter(embeddings: Arc<dyn EmbeddingPort>, buffer_size: usize) -> EmbeddingSemanticSplitter {
        EmbeddingSemanticSplitter::new(
            embeddings,
            SemanticSplitterConfig {
                buffer_size,
                ..Default::default()
            },
        )
    }

    #[tokio::test]
    async fn test_splits_where_topic_changes() {
        let segment = Segment::new(4, "Cats purr. Cats nap. Cars honk. Cars drive fast.")
            .with_header_path(HeaderPath::new(vec!["Animals".to_string()]));
        let outcome = splitter(Arc::new(TopicEmbeddings), 0)
            .split(&segment)
            .await
            .unwrap();

        match outcome {
            SplitOutcome::Split(pieces) => {
                let texts: Vec<&str> = pieces.iter().map(|p| p.text()).collect();
                assert_eq!(texts, vec!["Cats purr. Cats nap. ", "Cars honk. Cars drive fast."]);
                assert!(pieces.iter().all(|p| p.header_path() == segment.header_path()));
            }
            SplitOutcome::Irreducible => panic!("expected a split"),
        }
    }

    #[tokio::test]
    async fn test_single_sentence_is_irreducible() {
        let segment = Segment::new(0, "Just one long sentence without any break");
        let outcome = splitter(Arc::new(DownEmbeddings), 1)
            .split(&segment)
            .await
            .unwrap();
        assert_eq!(outcome, SplitOutcome::Irreducible);
    }

    #[tokio::test]
    async fn test_always_progresses_and_stays_lossless() {
        let text = "Alpha one. Beta two. Gamma three. Delta four. Epsilon five.";
        let outcome = splitter(Arc::new(FakeEmbeddingClient::default()), 1)
            .split(&Segment::new(0, text))
            .await
            .unwrap();

        match outcome {
            SplitOutcome::Split(pieces) => {
                assert!(pieces.len() >= 2);
                let joined: String = pieces.iter().map(|p| p.text()).collect();
                assert_eq!(joined, text);
            }
            SplitOutcome::Irreducible => panic!("expected a split"),
        }
    }

    #[tokio::test]
    async fn test_mismatched_embedding_count() {
        let err = splitter(Arc::new(ShortEmbeddings), 1)
            .split(&Segment::new(0, "One. Two. Three."))
            .await
            .unwrap_err();
        assert!(matches!(err, SplitError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_embedding_failure_is_transient() {
        let err = splitter(Arc::new(DownEmbeddings), 1)
            .split(&Segment::new(0, "One. Two."))
            .await
            .unwrap_err();
        assert!(matches!(err, SplitError::Embedding(EmbeddingError::NetworkError(_))));
        assert!(err.is_transient());
    }
}
