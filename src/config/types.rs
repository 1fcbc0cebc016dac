//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;

/// 运行模式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// 分块单个文件后退出
    #[default]
    File,
    /// 启动 HTTP 服务
    Server,
}

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub mode: RunMode,

    /// 分块配置
    #[serde(default)]
    pub chunking: ChunkingConfig,

    /// 结构分割配置
    #[serde(default)]
    pub structure: StructureConfig,

    /// 分词器配置
    #[serde(default)]
    pub tokenizer: TokenizerConfig,

    /// Embedding 服务配置
    #[serde(default)]
    pub embedding: EmbeddingConfig,

    /// 文件模式输入输出
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 分块配置
#[derive(Debug, Clone, Deserialize)]
pub struct ChunkingConfig {
    /// 单个分块的 Token 上限
    #[serde(default = "default_max_chunk_token_size")]
    pub max_chunk_token_size: usize,

    /// 语义断点百分位 [0, 1]
    #[serde(default = "default_breakpoint_percentile")]
    pub breakpoint_percentile: f64,

    /// 句子上下文窗口（每侧句子数）
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,

    /// 每个顶层片段的基础细分轮数，实际预算另加该片段的 Token 数
    #[serde(default = "default_max_refinement_rounds")]
    pub max_refinement_rounds: usize,

    /// 每个顶层片段累计允许的无进展次数
    #[serde(default = "default_max_non_progress_attempts")]
    pub max_non_progress_attempts: usize,

    /// 单次语义分割超时（秒）
    #[serde(default = "default_split_timeout")]
    pub split_timeout_secs: u64,
}

fn default_max_chunk_token_size() -> usize {
    512
}

fn default_breakpoint_percentile() -> f64 {
    0.95
}

fn default_buffer_size() -> usize {
    1
}

fn default_max_refinement_rounds() -> usize {
    64
}

fn default_max_non_progress_attempts() -> usize {
    3
}

fn default_split_timeout() -> u64 {
    60
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_chunk_token_size: default_max_chunk_token_size(),
            breakpoint_percentile: default_breakpoint_percentile(),
            buffer_size: default_buffer_size(),
            max_refinement_rounds: default_max_refinement_rounds(),
            max_non_progress_attempts: default_max_non_progress_attempts(),
            split_timeout_secs: default_split_timeout(),
        }
    }
}

/// 结构分割配置
#[derive(Debug, Clone, Deserialize)]
pub struct StructureConfig {
    /// 参与切分的最深标题层级
    #[serde(default = "default_max_header_level")]
    pub max_header_level: usize,
}

fn default_max_header_level() -> usize {
    3
}

impl Default for StructureConfig {
    fn default() -> Self {
        Self {
            max_header_level: default_max_header_level(),
        }
    }
}

/// 分词器配置
#[derive(Debug, Clone, Deserialize)]
pub struct TokenizerConfig {
    /// tiktoken 词表名称，或 "words" 按空白分词计数
    #[serde(default = "default_encoding")]
    pub encoding: String,
}

fn default_encoding() -> String {
    "cl100k_base".to_string()
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self {
            encoding: default_encoding(),
        }
    }
}

/// Embedding 服务配置
#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingConfig {
    /// 服务基础 URL（OpenAI 兼容）
    #[serde(default = "default_embedding_url")]
    pub url: String,

    #[serde(default = "default_embedding_model")]
    pub model: String,

    #[serde(default)]
    pub api_key: Option<String>,

    /// 请求超时时间（秒）
    #[serde(default = "default_embedding_timeout")]
    pub timeout_secs: u64,

    /// 瞬时失败的最大重试次数
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// 首次重试等待（毫秒），之后每次翻倍
    #[serde(default = "default_retry_base_delay")]
    pub retry_base_delay_ms: u64,

    /// 是否缓存句子向量
    #[serde(default = "default_cache_enabled")]
    pub cache_enabled: bool,

    /// 缓存条目上限，超出后按 LRU 淘汰
    #[serde(default = "default_cache_max_entries")]
    pub cache_max_entries: usize,
}

fn default_embedding_url() -> String {
    "http://localhost:8000/v1".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

fn default_embedding_timeout() -> u64 {
    60
}

fn default_max_retries() -> u32 {
    2
}

fn default_retry_base_delay() -> u64 {
    500
}

fn default_cache_enabled() -> bool {
    true
}

fn default_cache_max_entries() -> usize {
    50_000
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            url: default_embedding_url(),
            model: default_embedding_model(),
            api_key: None,
            timeout_secs: default_embedding_timeout(),
            max_retries: default_max_retries(),
            retry_base_delay_ms: default_retry_base_delay(),
            cache_enabled: default_cache_enabled(),
            cache_max_entries: default_cache_max_entries(),
        }
    }
}

/// 文件模式配置
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// 输入文档路径（文件模式必填）
    #[serde(default)]
    pub input_path: Option<PathBuf>,

    /// 分块输出路径
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,
}

fn default_output_path() -> PathBuf {
    PathBuf::from("data/chunks.txt")
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_path: None,
            output_path: default_output_path(),
        }
    }
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,

    /// 请求体上限（字节）
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5070
}

fn default_max_body_bytes() -> usize {
    16 * 1024 * 1024 // 16 MB
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}
