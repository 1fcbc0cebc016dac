//! Structural Splitter Port - 结构分割抽象
//!
//! 将原始文档按结构（标题等）切分为有序片段

use crate::domain::Segment;

/// Structural Splitter Port
///
/// 契约:
/// - 保序：片段按文档顺序返回
/// - 无损：按序拼接片段还原文档内容
pub trait StructuralSplitterPort: Send + Sync {
    fn split(&self, document: &str) -> Vec<Segment>;
}
