//! 语义断点计算
//!
//! 分句、相邻语义距离、百分位阈值与断点选择。纯函数，不涉及 I/O。
//!
//! 所有切分都以原文切片表示，拼接结果与输入逐字节一致。

use unicode_segmentation::UnicodeSegmentation;

/// 默认上下文窗口（每侧合并的相邻句子数）
pub const DEFAULT_BUFFER_SIZE: usize = 1;

/// 按 Unicode 句子边界分句
///
/// 句子保留其后的空白；纯空白的片段并入前一句（位于开头时并入下一句）。
pub fn split_sentences(text: &str) -> Vec<&str> {
    let mut spans: Vec<(usize, usize)> = Vec::new();
    let mut pending_start: Option<usize> = None;

    for (offset, piece) in text.split_sentence_bound_indices() {
        let end = offset + piece.len();
        if piece.trim().is_empty() {
            match spans.last_mut() {
                Some(last) => last.1 = end,
                None if pending_start.is_none() => pending_start = Some(offset),
                None => {}
            }
            continue;
        }
        let start = pending_start.take().unwrap_or(offset);
        spans.push((start, end));
    }

    // 全部为空白
    if let Some(start) = pending_start {
        spans.push((start, text.len()));
    }

    spans.into_iter().map(|(start, end)| &text[start..end]).collect()
}

/// 为每个句子构造上下文窗口：句子本身加上两侧各 buffer_size 个相邻句子
pub fn combine_with_neighbours(sentences: &[&str], buffer_size: usize) -> Vec<String> {
    (0..sentences.len())
        .map(|i| {
            let start = i.saturating_sub(buffer_size);
            let end = (i + buffer_size + 1).min(sentences.len());
            sentences[start..end].concat()
        })
        .collect()
}

/// 余弦相似度，零向量返回 0
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let (mut dot, mut norm_a, mut norm_b) = (0.0f32, 0.0f32, 0.0f32);
    for (lhs, rhs) in a.iter().zip(b) {
        dot += lhs * rhs;
        norm_a += lhs * lhs;
        norm_b += rhs * rhs;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// 相邻向量之间的语义距离 (1 - 余弦相似度)
pub fn adjacent_distances(embeddings: &[Vec<f32>]) -> Vec<f64> {
    embeddings
        .windows(2)
        .map(|pair| 1.0 - f64::from(cosine_similarity(&pair[0], &pair[1])))
        .collect()
}

/// 百分位数（p 位于 [0, 1]，秩之间线性插值）
///
/// 空输入返回 0
pub fn percentile(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = p.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let weight = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * weight
}

/// 选择断点
///
/// 返回句子下标 i，表示在第 i 句之后断开。距离严格大于百分位阈值处断开；
/// 若没有任何距离超过阈值，则在最大距离处断开，保证至少两句时一定有进展。
pub fn select_breakpoints(distances: &[f64], p: f64) -> Vec<usize> {
    if distances.is_empty() {
        return Vec::new();
    }

    let threshold = percentile(distances, p);
    let breakpoints: Vec<usize> = distances
        .iter()
        .enumerate()
        .filter(|(_, distance)| **distance > threshold)
        .map(|(i, _)| i)
        .collect();

    if !breakpoints.is_empty() {
        return breakpoints;
    }

    let mut widest = 0;
    for (i, distance) in distances.iter().enumerate() {
        if *distance > distances[widest] {
            widest = i;
        }
    }
    vec![widest]
}

/// 按断点将句子拼接成组
pub fn group_sentences(sentences: &[&str], breakpoints: &[usize]) -> Vec<String> {
    let mut groups = Vec::with_capacity(breakpoints.len() + 1);
    let mut start = 0;

    for &breakpoint in breakpoints {
        let end = breakpoint + 1;
        if end <= start || end > sentences.len() {
            continue;
        }
        groups.push(sentences[start..end].concat());
        start = end;
    }

    if start < sentences.len() {
        groups.push(sentences[start..].concat());
    }

    groups
}
