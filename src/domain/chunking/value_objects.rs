//! Chunking Context - Value Objects

use serde::{Deserialize, Serialize};

use super::ChunkingError;

/// 单个分块允许的最大 Token 数 (T)
///
/// 不变量: 值 > 0，一次分块运行内不可变
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenThreshold(usize);

impl TokenThreshold {
    /// 默认阈值，对应常见 embedding 模型的输入上限
    pub const DEFAULT: usize = 512;

    pub fn new(max_tokens: usize) -> Result<Self, ChunkingError> {
        if max_tokens == 0 {
            return Err(ChunkingError::InvalidThreshold(max_tokens));
        }
        Ok(Self(max_tokens))
    }

    pub fn get(&self) -> usize {
        self.0
    }

    /// token_count 是否在预算之内
    pub fn admits(&self, token_count: usize) -> bool {
        token_count <= self.0
    }
}

impl Default for TokenThreshold {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

impl std::fmt::Display for TokenThreshold {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 语义断点百分位
///
/// 相邻句子语义距离超过该百分位时插入断点
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BreakpointPercentile(f64);

impl BreakpointPercentile {
    pub const DEFAULT: f64 = 0.95;

    pub fn new(value: f64) -> Result<Self, ChunkingError> {
        if !(0.0..=1.0).contains(&value) {
            return Err(ChunkingError::InvalidPercentile(value));
        }
        Ok(Self(value))
    }

    pub fn get(&self) -> f64 {
        self.0
    }
}

impl Default for BreakpointPercentile {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

/// 标题路径（由外到内的各级标题文本）
///
/// 结构分割器产生，核心算法不读取，只原样透传
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderPath(Vec<String>);

impl HeaderPath {
    pub fn new(headers: Vec<String>) -> Self {
        Self(headers)
    }

    pub fn headers(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn depth(&self) -> usize {
        self.0.len()
    }
}

impl std::fmt::Display for HeaderPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.join(" > "))
    }
}
