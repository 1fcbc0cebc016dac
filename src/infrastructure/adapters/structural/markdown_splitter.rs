//! Markdown Header Splitter - 按 Markdown 标题切分文档
//!
//! 规则:
//! - 每个不超过 max_level 的 ATX 标题行开启一个新片段，标题行属于它开启的片段
//! - 围栏代码块（``` 或 ~~~）内的 `#` 行不是标题
//! - 标题前纯空白的内容不单独成段，作为下一片段的前缀
//! - 片段携带从顶层到当前标题的标题路径
//!
//! 片段按原文切片拼接，输出拼接后与输入逐字节一致。

use crate::application::ports::StructuralSplitterPort;
use crate::domain::{ChunkingError, HeaderPath, Segment};

/// 默认参与切分的最深标题层级
pub const DEFAULT_MAX_HEADER_LEVEL: usize = 3;

/// Markdown 最多 6 级标题
const MAX_ATX_LEVEL: usize = 6;

/// Markdown 标题分割器
#[derive(Debug, Clone)]
pub struct MarkdownHeaderSplitter {
    max_level: usize,
}

impl Default for MarkdownHeaderSplitter {
    fn default() -> Self {
        Self {
            max_level: DEFAULT_MAX_HEADER_LEVEL,
        }
    }
}

impl MarkdownHeaderSplitter {
    pub fn new(max_level: usize) -> Result<Self, ChunkingError> {
        if max_level == 0 || max_level > MAX_ATX_LEVEL {
            return Err(ChunkingError::InvalidHeaderLevel(max_level));
        }
        Ok(Self { max_level })
    }

    pub fn max_level(&self) -> usize {
        self.max_level
    }
}

impl StructuralSplitterPort for MarkdownHeaderSplitter {
    fn split(&self, document: &str) -> Vec<Segment> {
        let mut segments = Vec::new();
        let mut headers: Vec<(usize, String)> = Vec::new();
        let mut path = HeaderPath::default();
        let mut current = String::new();
        let mut fence: Option<Fence> = None;

        for line in document.split_inclusive('\n') {
            if let Some(marker) = Fence::parse(line) {
                fence = match fence {
                    None => Some(marker),
                    Some(open) if open.closed_by(&marker) => None,
                    open => open,
                };
            } else if fence.is_none() {
                if let Some((level, title)) = parse_atx_header(line) {
                    if level <= self.max_level {
                        if !current.trim().is_empty() {
                            let text = std::mem::take(&mut current);
                            segments.push(
                                Segment::new(segments.len(), text).with_header_path(path.clone()),
                            );
                        }
                        headers.retain(|(l, _)| *l < level);
                        headers.push((level, title));
                        path = HeaderPath::new(headers.iter().map(|(_, t)| t.clone()).collect());
                    }
                }
            }
            current.push_str(line);
        }

        if !current.is_empty() {
            segments.push(Segment::new(segments.len(), current).with_header_path(path));
        }

        tracing::debug!(
            segments = segments.len(),
            max_level = self.max_level,
            "Document split by headers"
        );

        segments
    }
}

/// 围栏代码块标记
#[derive(Debug, Clone, Copy)]
struct Fence {
    marker: char,
    len: usize,
}

impl Fence {
    fn parse(line: &str) -> Option<Self> {
        let trimmed = strip_indent(line)?;
        let marker = trimmed.chars().next()?;
        if marker != '`' && marker != '~' {
            return None;
        }
        let len = trimmed.chars().take_while(|c| *c == marker).count();
        (len >= 3).then_some(Self { marker, len })
    }

    fn closed_by(&self, other: &Fence) -> bool {
        self.marker == other.marker && other.len >= self.len
    }
}

/// 去掉至多 3 个空格的缩进，缩进更多时视为代码而非标记
fn strip_indent(line: &str) -> Option<&str> {
    let indent = line.len() - line.trim_start_matches(' ').len();
    (indent <= 3).then(|| &line[indent..])
}

/// 解析 ATX 标题行，返回 (层级, 标题文本)
fn parse_atx_header(line: &str) -> Option<(usize, String)> {
    let trimmed = strip_indent(line)?;
    let level = trimmed.chars().take_while(|c| *c == '#').count();
    if level == 0 || level > MAX_ATX_LEVEL {
        return None;
    }

    let rest = &trimmed[level..];
    if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
        return None;
    }

    // 结尾 # 序列前须为空白，否则属于标题本身（如 "C#"）
    let content = rest.trim();
    let without_closing = content.trim_end_matches('#');
    let title = if without_closing.is_empty() || without_closing.ends_with(char::is_whitespace) {
        without_closing.trim_end()
    } else {
        content
    };
    Some((level, title.to_string()))
}
