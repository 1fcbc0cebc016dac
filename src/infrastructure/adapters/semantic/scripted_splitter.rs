//! Scripted Semantic Splitter - 预设结果的语义分割器
//!
//! 用于测试，按文本返回预先登记的子片段，未登记的文本返回 Irreducible

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::application::ports::{SemanticSplitterPort, SplitError, SplitOutcome};
use crate::domain::Segment;

#[derive(Debug, Default)]
pub struct ScriptedSemanticSplitter {
    scripts: HashMap<String, Vec<String>>,
    /// 剩余的模拟瞬时失败次数
    transient_failures: AtomicUsize,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl ScriptedSemanticSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记 text 的分割结果
    pub fn with_split<I, S>(mut self, text: impl Into<String>, pieces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scripts
            .insert(text.into(), pieces.into_iter().map(Into::into).collect());
        self
    }

    /// 前 n 次调用返回可重试的超时错误
    pub fn with_transient_failures(self, n: usize) -> Self {
        self.transient_failures.store(n, Ordering::SeqCst);
        self
    }

    /// 每次调用前等待
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// 累计调用次数（含失败）
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SemanticSplitterPort for ScriptedSemanticSplitter {
    async fn split(&self, segment: &Segment) -> Result<SplitOutcome, SplitError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let failing = self
            .transient_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(SplitError::Timeout);
        }

        Ok(match self.scripts.get(segment.text()) {
            Some(pieces) => SplitOutcome::Split(
                pieces
                    .iter()
                    .enumerate()
                    .map(|(i, text)| segment.child(i, text.clone()))
                    .collect(),
            ),
            None => SplitOutcome::Irreducible,
        })
    }
}
