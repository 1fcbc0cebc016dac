//! Chunking Context - Entities

use serde::{Deserialize, Serialize};

use super::HeaderPath;

/// 文本片段 - 分块过程中的中间单位
///
/// 不变量:
/// - 创建后不可修改，只能被整体接受为 Chunk 或被子片段整体替换
/// - index 为其在产生者输出序列中的位置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    index: usize,
    text: String,
    #[serde(default)]
    header_path: HeaderPath,
}

impl Segment {
    pub fn new(index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
            header_path: HeaderPath::default(),
        }
    }

    pub fn with_header_path(mut self, header_path: HeaderPath) -> Self {
        self.header_path = header_path;
        self
    }

    /// 由本片段细分出的子片段，继承标题路径
    pub fn child(&self, index: usize, text: impl Into<String>) -> Self {
        Self {
            index,
            text: text.into(),
            header_path: self.header_path.clone(),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn header_path(&self) -> &HeaderPath {
        &self.header_path
    }
}

/// 分块 - 最终输出单位
///
/// 不变量:
/// - index 为最终输出顺序
/// - irreducible 为 false 时 token_count <= 阈值
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    index: usize,
    text: String,
    token_count: usize,
    irreducible: bool,
    header_path: HeaderPath,
}

impl Chunk {
    /// 满足预算而被接受的分块
    pub fn accepted(index: usize, segment: Segment, token_count: usize) -> Self {
        Self::from_segment(index, segment, token_count, false)
    }

    /// 超出预算但语义分割器已无法继续细分的分块
    pub fn irreducible(index: usize, segment: Segment, token_count: usize) -> Self {
        Self::from_segment(index, segment, token_count, true)
    }

    fn from_segment(index: usize, segment: Segment, token_count: usize, irreducible: bool) -> Self {
        Self {
            index,
            text: segment.text,
            token_count,
            irreducible,
            header_path: segment.header_path,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn token_count(&self) -> usize {
        self.token_count
    }

    pub fn is_irreducible(&self) -> bool {
        self.irreducible
    }

    pub fn header_path(&self) -> &HeaderPath {
        &self.header_path
    }

    /// 转回片段，用于对输出再次执行分块
    pub fn to_segment(&self) -> Segment {
        Segment::new(self.index, self.text.clone()).with_header_path(self.header_path.clone())
    }
}
