//! Chunk Size Enforcer - Token 预算约束
//!
//! 以双端队列驱动、非递归地细分超出预算的片段，直到每个片段都满足预算
//! 或被语义分割器判定为不可再分。
//!
//! 不变量:
//! - 保序：已输出分块 + 队列内容（从前到后）始终按原文顺序还原输入
//! - 无损：在分割器无损的前提下，输出拼接等于输入拼接
//! - 无重复处理：出队的片段要么输出一次，要么被子片段替换一次
//! - 终止：有进展的分割必使最大子片段变小，无进展次数与分割调用次数均有上限

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use crate::application::commands::EnforceChunkSize;
use crate::application::error::ApplicationError;
use crate::application::ports::{
    SemanticSplitterPort, SplitError, SplitOutcome, TokenCounterPort,
};
use crate::domain::{Chunk, Segment, TokenThreshold};

/// 默认每个顶层片段的基础细分轮数
///
/// 实际预算为该值加上顶层片段的 Token 数，无损分割器每轮至少切出一个
/// 非空子片段，因此持续有进展的运行不会耗尽预算
pub const DEFAULT_MAX_REFINEMENT_ROUNDS: usize = 64;

/// 默认每个顶层片段累计允许的无进展次数
pub const DEFAULT_MAX_NON_PROGRESS_ATTEMPTS: usize = 3;

/// 语义分割调用的重试策略（指数退避）
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// 首次调用之外的最大重试次数
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// 第 attempt 次重试前的等待时间 (从 0 开始)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay
            .saturating_mul(2u32.saturating_pow(attempt))
    }
}

/// Enforcer 配置
#[derive(Debug, Clone)]
pub struct EnforcerConfig {
    pub threshold: TokenThreshold,
    /// 每个顶层片段的基础细分轮数，实际预算随其 Token 数增长
    pub max_refinement_rounds: usize,
    /// 每个顶层片段累计允许的无进展次数
    pub max_non_progress_attempts: usize,
    /// 单次语义分割调用超时
    pub split_timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for EnforcerConfig {
    fn default() -> Self {
        Self {
            threshold: TokenThreshold::default(),
            max_refinement_rounds: DEFAULT_MAX_REFINEMENT_ROUNDS,
            max_non_progress_attempts: DEFAULT_MAX_NON_PROGRESS_ATTEMPTS,
            split_timeout: Duration::from_secs(60),
            retry: RetryPolicy::default(),
        }
    }
}

/// 约束结果
#[derive(Debug, Clone)]
pub struct EnforcementResult {
    pub chunks: Vec<Chunk>,
    /// 语义分割器调用次数（不含重试）
    pub splitter_calls: usize,
}

/// 队列中的待处理片段
struct Pending {
    segment: Segment,
    /// 所属顶层片段下标
    root: usize,
    /// 细分时已计算过的 Token 数
    tokens: Option<usize>,
}

#[derive(Debug, Default, Clone, Copy)]
struct RootProgress {
    rounds: usize,
    /// 细分轮数上限，首次计数时确定
    budget: usize,
    /// 累计值，成功分割后不清零
    stalls: usize,
}

/// Chunk Size Enforcer
///
/// 每次运行独占自己的队列和结果，可对不同文档并发运行
#[derive(Clone)]
pub struct ChunkSizeEnforcer {
    token_counter: Arc<dyn TokenCounterPort>,
    semantic_splitter: Arc<dyn SemanticSplitterPort>,
    config: EnforcerConfig,
}

impl ChunkSizeEnforcer {
    pub fn new(
        token_counter: Arc<dyn TokenCounterPort>,
        semantic_splitter: Arc<dyn SemanticSplitterPort>,
        config: EnforcerConfig,
    ) -> Self {
        Self {
            token_counter,
            semantic_splitter,
            config,
        }
    }

    pub fn config(&self) -> &EnforcerConfig {
        &self.config
    }

    /// 使用不同阈值、共享同一组协作者的 Enforcer
    pub fn with_threshold(&self, threshold: TokenThreshold) -> Self {
        let mut enforcer = self.clone();
        enforcer.config.threshold = threshold;
        enforcer
    }

    pub async fn handle(
        &self,
        command: EnforceChunkSize,
    ) -> Result<EnforcementResult, ApplicationError> {
        self.enforce(command.segments).await
    }

    /// 执行预算约束
    pub async fn enforce(
        &self,
        segments: Vec<Segment>,
    ) -> Result<EnforcementResult, ApplicationError> {
        let threshold = self.config.threshold;
        let mut progress = vec![RootProgress::default(); segments.len()];
        let mut queue: VecDeque<Pending> = segments
            .into_iter()
            .enumerate()
            .map(|(root, segment)| Pending {
                segment,
                root,
                tokens: None,
            })
            .collect();
        let mut chunks = Vec::with_capacity(queue.len());
        let mut splitter_calls = 0;

        while let Some(Pending {
            segment,
            root,
            tokens,
        }) = queue.pop_front()
        {
            let tokens = match tokens {
                Some(tokens) => tokens,
                None => {
                    let tokens = self.count(&segment, root)?;
                    progress[root].budget =
                        self.config.max_refinement_rounds.saturating_add(tokens);
                    tokens
                }
            };

            if threshold.admits(tokens) {
                chunks.push(Chunk::accepted(chunks.len(), segment, tokens));
                continue;
            }

            if progress[root].rounds >= progress[root].budget {
                return Err(ApplicationError::NonProgress {
                    segment_index: root,
                    attempts: progress[root].rounds,
                    reason: "refinement budget exhausted",
                });
            }
            progress[root].rounds += 1;
            splitter_calls += 1;

            tracing::debug!(
                segment_index = root,
                tokens = tokens,
                threshold = threshold.get(),
                round = progress[root].rounds,
                "Refining oversized segment"
            );

            let pieces = match self.split_with_retry(&segment, root).await? {
                SplitOutcome::Split(pieces) => pieces,
                SplitOutcome::Irreducible => {
                    tracing::warn!(
                        segment_index = root,
                        tokens = tokens,
                        threshold = threshold.get(),
                        "Segment is irreducible, emitting oversized chunk"
                    );
                    chunks.push(Chunk::irreducible(chunks.len(), segment, tokens));
                    continue;
                }
            };

            if pieces.is_empty() {
                return Err(ApplicationError::Split {
                    segment_index: root,
                    source: SplitError::EmptyResult,
                });
            }

            let mut measured = Vec::with_capacity(pieces.len());
            for piece in pieces {
                let piece_tokens = self.count(&piece, root)?;
                measured.push((piece, piece_tokens));
            }
            let largest = measured.iter().map(|(_, t)| *t).max().unwrap_or(0);

            // 最大子片段没有变小：重新入队，累计无进展次数
            if largest >= tokens {
                progress[root].stalls += 1;
                let stalls = progress[root].stalls;
                tracing::warn!(
                    segment_index = root,
                    tokens = tokens,
                    largest = largest,
                    stalls = stalls,
                    "Semantic split made no progress"
                );
                if stalls >= self.config.max_non_progress_attempts {
                    return Err(ApplicationError::NonProgress {
                        segment_index: root,
                        attempts: stalls,
                        reason: "largest piece did not shrink",
                    });
                }
                queue.push_front(Pending {
                    segment,
                    root,
                    tokens: Some(tokens),
                });
                continue;
            }

            // 子片段按原相对顺序插入队首
            for (piece, piece_tokens) in measured.into_iter().rev() {
                queue.push_front(Pending {
                    segment: piece,
                    root,
                    tokens: Some(piece_tokens),
                });
            }
        }

        tracing::debug!(
            chunks = chunks.len(),
            splitter_calls = splitter_calls,
            "Chunk size enforcement finished"
        );

        Ok(EnforcementResult {
            chunks,
            splitter_calls,
        })
    }

    fn count(&self, segment: &Segment, root: usize) -> Result<usize, ApplicationError> {
        self.token_counter
            .count(segment.text())
            .map_err(|source| ApplicationError::Encoding {
                segment_index: root,
                source,
            })
    }

    /// 带超时与指数退避重试的语义分割
    ///
    /// 重试只针对同一个片段，队列在调用成功前保持不变
    async fn split_with_retry(
        &self,
        segment: &Segment,
        root: usize,
    ) -> Result<SplitOutcome, ApplicationError> {
        let retry = &self.config.retry;
        let mut attempt = 0u32;

        loop {
            let result = match tokio::time::timeout(
                self.config.split_timeout,
                self.semantic_splitter.split(segment),
            )
            .await
            {
                Ok(result) => result,
                Err(_) => Err(SplitError::Timeout),
            };

            match result {
                Ok(outcome) => return Ok(outcome),
                Err(e) if e.is_transient() && attempt < retry.max_retries => {
                    let delay = retry.delay_for(attempt);
                    tracing::warn!(
                        segment_index = root,
                        attempt = attempt + 1,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Semantic split failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(source) => {
                    tracing::error!(segment_index = root, error = %source, "Semantic split failed");
                    return Err(ApplicationError::Split {
                        segment_index: root,
                        source,
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{EncodingError, StructuralSplitterPort};
    use crate::infrastructure::adapters::{
        EmbeddingSemanticSplitter, FakeEmbeddingClient, MarkdownHeaderSplitter,
        ScriptedSemanticSplitter, SemanticSplitterConfig, WordTokenCounter,
    };
    use std::ops::Range;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// "t0 t1 t2 ... " 形式的文本，每个词一个 Token
    fn words(tag: &str, range: Range<usize>) -> String {
        range.map(|i| format!("{tag}{i} ")).collect()
    }

    fn config(threshold: usize) -> EnforcerConfig {
        EnforcerConfig {
            threshold: TokenThreshold::new(threshold).unwrap(),
            retry: RetryPolicy {
                max_retries: 2,
                base_delay: Duration::from_millis(1),
            },
            ..Default::default()
        }
    }

    fn enforcer(splitter: Arc<ScriptedSemanticSplitter>, config: EnforcerConfig) -> ChunkSizeEnforcer {
        ChunkSizeEnforcer::new(Arc::new(WordTokenCounter::new()), splitter, config)
    }

    fn segments(texts: &[String]) -> Vec<Segment> {
        texts
            .iter()
            .enumerate()
            .map(|(i, text)| Segment::new(i, text.clone()))
            .collect()
    }

    fn concat(chunks: &[Chunk]) -> String {
        chunks.iter().map(|c| c.text()).collect()
    }

    struct CountingCounter {
        calls: AtomicUsize,
    }

    impl TokenCounterPort for CountingCounter {
        fn count(&self, text: &str) -> Result<usize, EncodingError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(text.split_whitespace().count())
        }

        fn vocabulary(&self) -> &str {
            "counting"
        }
    }

    struct RejectingCounter;

    impl TokenCounterPort for RejectingCounter {
        fn count(&self, text: &str) -> Result<usize, EncodingError> {
            match text.find('\u{0}') {
                Some(offset) => Err(EncodingError::UnsupportedInput { offset }),
                None => Ok(text.split_whitespace().count()),
            }
        }

        fn vocabulary(&self) -> &str {
            "rejecting"
        }
    }

    #[tokio::test]
    async fn test_oversized_segment_split_in_two() {
        let text = words("a", 0..600);
        let splitter = Arc::new(
            ScriptedSemanticSplitter::new()
                .with_split(&text, vec![words("a", 0..300), words("a", 300..600)]),
        );
        let result = enforcer(splitter.clone(), config(512))
            .enforce(segments(&[text.clone()]))
            .await
            .unwrap();

        let counts: Vec<usize> = result.chunks.iter().map(|c| c.token_count()).collect();
        assert_eq!(counts, vec![300, 300]);
        assert_eq!(result.chunks[0].text(), words("a", 0..300));
        assert_eq!(result.chunks[1].text(), words("a", 300..600));
        assert_eq!(concat(&result.chunks), text);
        assert_eq!(result.splitter_calls, 1);
    }

    #[tokio::test]
    async fn test_sub_segments_stay_in_place() {
        let big = words("c", 0..900);
        let splitter = Arc::new(ScriptedSemanticSplitter::new().with_split(
            &big,
            vec![words("c", 0..400), words("c", 400..800), words("c", 800..900)],
        ));
        let input = [words("a", 0..100), words("b", 0..50), big];
        let result = enforcer(splitter, config(512))
            .enforce(segments(&input))
            .await
            .unwrap();

        let counts: Vec<usize> = result.chunks.iter().map(|c| c.token_count()).collect();
        assert_eq!(counts, vec![100, 50, 400, 400, 100]);
        let indices: Vec<usize> = result.chunks.iter().map(|c| c.index()).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);
        assert_eq!(concat(&result.chunks), input.concat());
    }

    #[tokio::test]
    async fn test_empty_input_touches_no_collaborator() {
        let counter = Arc::new(CountingCounter {
            calls: AtomicUsize::new(0),
        });
        let splitter = Arc::new(ScriptedSemanticSplitter::new());
        let enforcer = ChunkSizeEnforcer::new(counter.clone(), splitter.clone(), config(512));

        let result = enforcer.enforce(Vec::new()).await.unwrap();

        assert!(result.chunks.is_empty());
        assert_eq!(counter.calls.load(Ordering::SeqCst), 0);
        assert_eq!(splitter.calls(), 0);
    }

    #[tokio::test]
    async fn test_unchanged_split_raises_non_progress() {
        let text = words("x", 0..20);
        let splitter =
            Arc::new(ScriptedSemanticSplitter::new().with_split(&text, vec![text.clone()]));
        let err = enforcer(splitter.clone(), config(10))
            .enforce(segments(&[text]))
            .await
            .unwrap_err();

        match err {
            ApplicationError::NonProgress {
                segment_index,
                attempts,
                ..
            } => {
                assert_eq!(segment_index, 0);
                assert_eq!(attempts, DEFAULT_MAX_NON_PROGRESS_ATTEMPTS);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(splitter.calls(), DEFAULT_MAX_NON_PROGRESS_ATTEMPTS);
    }

    #[tokio::test]
    async fn test_segments_within_budget_pass_through() {
        let input = [words("a", 0..10), words("b", 0..512), words("c", 0..1)];
        let splitter = Arc::new(ScriptedSemanticSplitter::new());
        let result = enforcer(splitter.clone(), config(512))
            .handle(EnforceChunkSize {
                segments: segments(&input),
            })
            .await
            .unwrap();

        let texts: Vec<&str> = result.chunks.iter().map(|c| c.text()).collect();
        assert_eq!(texts, input.iter().map(String::as_str).collect::<Vec<_>>());
        assert_eq!(splitter.calls(), 0);
        assert_eq!(result.splitter_calls, 0);
    }

    #[tokio::test]
    async fn test_still_oversized_pieces_are_refined_again() {
        let text = words("w", 0..40);
        let splitter = Arc::new(
            ScriptedSemanticSplitter::new()
                .with_split(&text, vec![words("w", 0..20), words("w", 20..40)])
                .with_split(words("w", 0..20), vec![words("w", 0..10), words("w", 10..20)])
                .with_split(words("w", 20..40), vec![words("w", 20..30), words("w", 30..40)]),
        );
        let tail = words("z", 0..3);
        let result = enforcer(splitter.clone(), config(10))
            .enforce(segments(&[text.clone(), tail.clone()]))
            .await
            .unwrap();

        assert_eq!(result.chunks.len(), 5);
        assert!(result.chunks.iter().all(|c| c.token_count() <= 10));
        assert_eq!(result.chunks[4].text(), tail);
        assert_eq!(concat(&result.chunks), format!("{text}{tail}"));
        assert_eq!(result.splitter_calls, 3);
    }

    #[tokio::test]
    async fn test_irreducible_segment_is_flagged() {
        let text = words("long", 0..30);
        let splitter = Arc::new(ScriptedSemanticSplitter::new());
        let result = enforcer(splitter, config(10))
            .enforce(segments(&[text.clone()]))
            .await
            .unwrap();

        assert_eq!(result.chunks.len(), 1);
        assert!(result.chunks[0].is_irreducible());
        assert_eq!(result.chunks[0].token_count(), 30);
        assert_eq!(result.chunks[0].text(), text);
    }

    #[tokio::test]
    async fn test_enforcing_output_again_is_identity() {
        let text = words("a", 0..600);
        let splitter = Arc::new(
            ScriptedSemanticSplitter::new()
                .with_split(&text, vec![words("a", 0..300), words("a", 300..600)]),
        );
        let enforcer = enforcer(splitter.clone(), config(512));
        let first = enforcer.enforce(segments(&[text])).await.unwrap();

        let again: Vec<Segment> = first.chunks.iter().map(Chunk::to_segment).collect();
        let second = enforcer.enforce(again).await.unwrap();

        assert_eq!(first.chunks, second.chunks);
        assert_eq!(second.splitter_calls, 0);
    }

    #[tokio::test]
    async fn test_encoding_error_reports_segment_position() {
        let splitter = Arc::new(ScriptedSemanticSplitter::new());
        let enforcer = ChunkSizeEnforcer::new(Arc::new(RejectingCounter), splitter, config(512));
        let input = vec![Segment::new(0, "fine"), Segment::new(1, "bad\u{0}byte")];

        let err = enforcer.enforce(input).await.unwrap_err();

        assert!(matches!(
            err,
            ApplicationError::Encoding {
                segment_index: 1,
                source: EncodingError::UnsupportedInput { offset: 3 }
            }
        ));
    }

    #[tokio::test]
    async fn test_transient_failures_are_retried() {
        let text = words("r", 0..20);
        let splitter = Arc::new(
            ScriptedSemanticSplitter::new()
                .with_split(&text, vec![words("r", 0..10), words("r", 10..20)])
                .with_transient_failures(2),
        );
        let result = enforcer(splitter.clone(), config(10))
            .enforce(segments(&[text]))
            .await
            .unwrap();

        assert_eq!(result.chunks.len(), 2);
        assert_eq!(result.splitter_calls, 1);
        assert_eq!(splitter.calls(), 3);
    }

    #[tokio::test]
    async fn test_retry_exhaustion_surfaces_split_error() {
        let text = words("r", 0..20);
        let splitter = Arc::new(
            ScriptedSemanticSplitter::new()
                .with_split(&text, vec![words("r", 0..10), words("r", 10..20)])
                .with_transient_failures(5),
        );
        let input = [words("ok", 0..5), text];
        let err = enforcer(splitter.clone(), config(10))
            .enforce(segments(&input))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ApplicationError::Split {
                segment_index: 1,
                source: SplitError::Timeout
            }
        ));
        // 首次调用 + 2 次重试
        assert_eq!(splitter.calls(), 3);
    }

    #[tokio::test]
    async fn test_slow_splitter_times_out() {
        let text = words("s", 0..20);
        let splitter = Arc::new(
            ScriptedSemanticSplitter::new()
                .with_split(&text, vec![words("s", 0..10), words("s", 10..20)])
                .with_delay(Duration::from_millis(500)),
        );
        let mut config = config(10);
        config.split_timeout = Duration::from_millis(20);
        config.retry.max_retries = 0;

        let err = enforcer(splitter, config)
            .enforce(segments(&[text]))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ApplicationError::Split {
                source: SplitError::Timeout,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_empty_split_result_is_rejected() {
        let text = words("e", 0..20);
        let splitter =
            Arc::new(ScriptedSemanticSplitter::new().with_split(&text, Vec::<String>::new()));
        let err = enforcer(splitter, config(10))
            .enforce(segments(&[text]))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ApplicationError::Split {
                segment_index: 0,
                source: SplitError::EmptyResult
            }
        ));
    }

    #[tokio::test]
    async fn test_progressing_splits_may_exceed_base_rounds() {
        let text = words("w", 0..40);
        let splitter = Arc::new(
            ScriptedSemanticSplitter::new()
                .with_split(&text, vec![words("w", 0..20), words("w", 20..40)])
                .with_split(words("w", 0..20), vec![words("w", 0..10), words("w", 10..20)])
                .with_split(words("w", 20..40), vec![words("w", 20..30), words("w", 30..40)]),
        );
        let mut config = config(10);
        config.max_refinement_rounds = 1;

        let result = enforcer(splitter, config)
            .enforce(segments(&[text.clone()]))
            .await
            .unwrap();

        assert_eq!(result.splitter_calls, 3);
        assert_eq!(concat(&result.chunks), text);
    }

    #[tokio::test]
    async fn test_refinement_budget_stops_duplicating_splitter() {
        // 每轮都变小但子片段互相重复，调用次数指数增长
        let splitter = Arc::new(
            ScriptedSemanticSplitter::new()
                .with_split(words("w", 0..4), vec![words("w", 0..3), words("w", 0..3)])
                .with_split(words("w", 0..3), vec![words("w", 0..2), words("w", 0..2)])
                .with_split(words("w", 0..2), vec![words("w", 0..1), words("w", 1..2)]),
        );
        let mut config = config(1);
        config.max_refinement_rounds = 1;

        let err = enforcer(splitter.clone(), config)
            .enforce(segments(&[words("w", 0..4)]))
            .await
            .unwrap_err();

        // 预算 = 1 + 4 个 Token
        assert!(matches!(
            err,
            ApplicationError::NonProgress {
                segment_index: 0,
                attempts: 5,
                ..
            }
        ));
        assert_eq!(splitter.calls(), 5);
    }

    fn embedding_enforcer(
        threshold: TokenThreshold,
    ) -> (ChunkSizeEnforcer, Arc<FakeEmbeddingClient>) {
        let embeddings = Arc::new(FakeEmbeddingClient::default());
        let splitter = EmbeddingSemanticSplitter::new(
            embeddings.clone(),
            SemanticSplitterConfig::default(),
        );
        let enforcer = ChunkSizeEnforcer::new(
            Arc::new(WordTokenCounter::new()),
            Arc::new(splitter),
            EnforcerConfig {
                threshold,
                ..Default::default()
            },
        );
        (enforcer, embeddings)
    }

    #[tokio::test]
    async fn test_long_repetitive_section_completes() {
        let text = "All work and no play makes a dull boy. ".repeat(445);
        let (enforcer, _) = embedding_enforcer(TokenThreshold::default());

        let result = enforcer
            .enforce(vec![Segment::new(0, text.clone())])
            .await
            .unwrap();

        assert_eq!(concat(&result.chunks), text);
        assert!(result.chunks.iter().all(|c| !c.is_irreducible()));
        assert!(result.chunks.iter().all(|c| c.token_count() <= 512));
        assert!(result.splitter_calls > DEFAULT_MAX_REFINEMENT_ROUNDS);
    }

    const MULTI_SECTION: &str = "# Guide\n\
Cats purr softly. Cats nap all day. Dogs bark loudly. Dogs chase balls.\n\
## Setup\n\
Install the tool. Configure the path. Run the binary. Check the logs.\n\
## Log\n\
alpha beta gamma delta epsilon zeta eta theta iota kappa lambda mu nu xi omicron\n";

    #[tokio::test]
    async fn test_embedding_splitter_on_sectioned_document() {
        let threshold = TokenThreshold::new(6).unwrap();
        let (enforcer, embeddings) = embedding_enforcer(threshold);
        let input = MarkdownHeaderSplitter::default().split(MULTI_SECTION);
        assert_eq!(input.len(), 3);

        let result = enforcer.enforce(input).await.unwrap();

        assert_eq!(concat(&result.chunks), MULTI_SECTION);
        let indices: Vec<usize> = result.chunks.iter().map(|c| c.index()).collect();
        assert_eq!(indices, (0..result.chunks.len()).collect::<Vec<_>>());
        assert!(result
            .chunks
            .iter()
            .all(|c| threshold.admits(c.token_count()) || c.is_irreducible()));
        assert!(result.splitter_calls > 0);
        assert!(embeddings.embedded() > 0);

        let irreducible: Vec<&Chunk> =
            result.chunks.iter().filter(|c| c.is_irreducible()).collect();
        assert_eq!(irreducible.len(), 1);
        assert!(irreducible[0].text().starts_with("alpha"));
        assert_eq!(irreducible[0].header_path().to_string(), "Guide > Log");
        assert_eq!(result.chunks[0].header_path().to_string(), "Guide");
    }

    #[tokio::test]
    async fn test_enforcing_irreducible_output_again_is_identity() {
        let threshold = TokenThreshold::new(6).unwrap();
        let (enforcer, _) = embedding_enforcer(threshold);
        let input = MarkdownHeaderSplitter::default().split(MULTI_SECTION);
        let first = enforcer.enforce(input).await.unwrap();
        let irreducible = first.chunks.iter().filter(|c| c.is_irreducible()).count();
        assert!(irreducible > 0);

        let again: Vec<Segment> = first.chunks.iter().map(Chunk::to_segment).collect();
        let second = enforcer.enforce(again).await.unwrap();

        assert_eq!(first.chunks, second.chunks);
        // 不可再分的分块会再次交给分割器确认
        assert_eq!(second.splitter_calls, irreducible);
    }

    #[test]
    fn test_retry_delay_doubles() {
        let policy = RetryPolicy {
            max_retries: 3,
            base_delay: Duration::from_millis(100),
        };
        assert_eq!(policy.delay_for(0), Duration::from_millis(100));
        assert_eq!(policy.delay_for(1), Duration::from_millis(200));
        assert_eq!(policy.delay_for(2), Duration::from_millis(400));
    }

    #[test]
    fn test_with_threshold_keeps_other_settings() {
        let splitter = Arc::new(ScriptedSemanticSplitter::new());
        let base = enforcer(splitter, config(512));
        let narrowed = base.with_threshold(TokenThreshold::new(64).unwrap());

        assert_eq!(narrowed.config().threshold.get(), 64);
        assert_eq!(
            narrowed.config().max_refinement_rounds,
            base.config().max_refinement_rounds
        );
    }
}
