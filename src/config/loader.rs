//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（rechunk.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::{AppConfig, RunMode};
use crate::domain::breakpoints::DEFAULT_BUFFER_SIZE;
use crate::infrastructure::adapters::{SUPPORTED_ENCODINGS, WORD_ENCODING};

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["rechunk", "rechunk.local"];

/// 加载应用配置
///
/// 按优先级从高到低合并配置：
/// 1. 环境变量（前缀 `RECHUNK_`，层级分隔符 `__`）
/// 2. 配置文件（rechunk.toml 或 rechunk.local.toml）
/// 3. 默认值
///
/// # 环境变量示例
/// - `RECHUNK_MODE=server`
/// - `RECHUNK_CHUNKING__MAX_CHUNK_TOKEN_SIZE=256`
/// - `RECHUNK_EMBEDDING__URL=http://embedder:8000/v1`
/// - `RECHUNK_PIPELINE__INPUT_PATH=docs/guide.md`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 默认值（最低优先级）
    builder = builder
        .set_default("mode", "file")?
        .set_default("chunking.max_chunk_token_size", 512)?
        .set_default("chunking.breakpoint_percentile", 0.95)?
        .set_default("chunking.buffer_size", DEFAULT_BUFFER_SIZE as u64)?
        .set_default("chunking.max_refinement_rounds", 64)?
        .set_default("chunking.max_non_progress_attempts", 3)?
        .set_default("chunking.split_timeout_secs", 60)?
        .set_default("structure.max_header_level", 3)?
        .set_default("tokenizer.encoding", "cl100k_base")?
        .set_default("embedding.url", "http://localhost:8000/v1")?
        .set_default("embedding.model", "text-embedding-3-small")?
        .set_default("embedding.timeout_secs", 60)?
        .set_default("embedding.max_retries", 2)?
        .set_default("embedding.retry_base_delay_ms", 500)?
        .set_default("embedding.cache_enabled", true)?
        .set_default("embedding.cache_max_entries", 50_000)?
        .set_default("pipeline.output_path", "data/chunks.txt")?
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 5070)?
        .set_default("server.max_body_bytes", 16 * 1024 * 1024)?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 配置文件
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 环境变量（最高优先级）
    // 例如: RECHUNK_EMBEDDING__URL=http://embedder:8000/v1
    builder = builder.add_source(
        Environment::with_prefix("RECHUNK")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    let invalid = |msg: &str| -> Result<(), ConfigError> {
        Err(ConfigError::ValidationError(msg.to_string()))
    };

    if config.chunking.max_chunk_token_size == 0 {
        return invalid("max_chunk_token_size must be greater than 0");
    }

    if !(0.0..=1.0).contains(&config.chunking.breakpoint_percentile) {
        return invalid("breakpoint_percentile must be within [0, 1]");
    }

    if config.chunking.max_refinement_rounds == 0 {
        return invalid("max_refinement_rounds must be greater than 0");
    }

    if config.chunking.max_non_progress_attempts == 0 {
        return invalid("max_non_progress_attempts must be greater than 0");
    }

    if config.chunking.split_timeout_secs == 0 {
        return invalid("split_timeout_secs must be greater than 0");
    }

    if !(1..=6).contains(&config.structure.max_header_level) {
        return invalid("max_header_level must be within [1, 6]");
    }

    let encoding = config.tokenizer.encoding.as_str();
    if encoding != WORD_ENCODING && !SUPPORTED_ENCODINGS.contains(&encoding) {
        return Err(ConfigError::ValidationError(format!(
            "Unknown tokenizer encoding: {} (supported: {}, {})",
            encoding,
            SUPPORTED_ENCODINGS.join(", "),
            WORD_ENCODING
        )));
    }

    if config.embedding.url.is_empty() {
        return invalid("Embedding URL cannot be empty");
    }

    if config.embedding.cache_enabled && config.embedding.cache_max_entries == 0 {
        return invalid("embedding.cache_max_entries must be greater than 0");
    }

    if config.server.port == 0 {
        return invalid("Server port cannot be 0");
    }

    if config.mode == RunMode::File && config.pipeline.input_path.is_none() {
        return invalid("pipeline.input_path is required in file mode");
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Mode: {:?}", config.mode);
    tracing::info!("Max Chunk Tokens: {}", config.chunking.max_chunk_token_size);
    tracing::info!("Breakpoint Percentile: {}", config.chunking.breakpoint_percentile);
    tracing::info!("Max Header Level: {}", config.structure.max_header_level);
    tracing::info!("Tokenizer: {}", config.tokenizer.encoding);
    tracing::info!("Embedding URL: {}", config.embedding.url);
    tracing::info!("Embedding Model: {}", config.embedding.model);
    tracing::info!(
        "Embedding Cache: {} (max {} entries)",
        config.embedding.cache_enabled,
        config.embedding.cache_max_entries
    );
    match config.mode {
        RunMode::File => {
            if let Some(input) = &config.pipeline.input_path {
                tracing::info!("Input: {}", input.display());
            }
            tracing::info!("Output: {}", config.pipeline.output_path.display());
        }
        RunMode::Server => {
            tracing::info!("Server: {}", config.server.addr());
        }
    }
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}
