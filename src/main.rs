//! Rechunk - 语义文档分块
//!
//! 两种运行模式:
//! - file: 分块 pipeline.input_path，写出到 pipeline.output_path
//! - server: 提供 HTTP 分块接口

use std::sync::Arc;
use std::time::Duration;

use rechunk::application::ports::{EmbeddingPort, TokenCounterPort};
use rechunk::application::{
    ChunkDocument, ChunkDocumentHandler, ChunkSizeEnforcer, EnforcerConfig, RetryPolicy,
    WriteChunksHandler,
};
use rechunk::config::{load_config, print_config, AppConfig, LogConfig, RunMode};
use rechunk::domain::{BreakpointPercentile, TokenThreshold};
use rechunk::infrastructure::adapters::{
    CachedEmbeddingClient, EmbeddingSemanticSplitter, FileChunkSink, HttpEmbeddingClient,
    HttpEmbeddingClientConfig, MarkdownHeaderSplitter, SemanticSplitterConfig, TiktokenCounter,
    WordTokenCounter, WORD_ENCODING,
};
use rechunk::infrastructure::http::{AppState, HttpServer, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config.log);

    tracing::info!("Rechunk - 语义文档分块");
    print_config(&config);

    let chunk_document = Arc::new(build_pipeline(&config).await?);

    match config.mode {
        RunMode::File => run_file(&config, chunk_document).await,
        RunMode::Server => run_server(&config, chunk_document).await,
    }
}

fn init_tracing(log: &LogConfig) {
    let log_filter = format!("{},rechunk={},tower_http=debug", log.level, log.level);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    if log.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

/// 按配置组装适配器与处理器
async fn build_pipeline(config: &AppConfig) -> anyhow::Result<ChunkDocumentHandler> {
    let token_counter: Arc<dyn TokenCounterPort> =
        if config.tokenizer.encoding == WORD_ENCODING {
            Arc::new(WordTokenCounter::new())
        } else {
            Arc::new(TiktokenCounter::new(&config.tokenizer.encoding)?)
        };

    let mut client_config = HttpEmbeddingClientConfig::new(&config.embedding.url)
        .with_model(&config.embedding.model)
        .with_timeout(config.embedding.timeout_secs);
    if let Some(api_key) = &config.embedding.api_key {
        client_config = client_config.with_api_key(api_key);
    }
    let http_client: Arc<dyn EmbeddingPort> = Arc::new(HttpEmbeddingClient::new(client_config)?);
    let embeddings: Arc<dyn EmbeddingPort> = if config.embedding.cache_enabled {
        Arc::new(CachedEmbeddingClient::new(
            http_client,
            config.embedding.cache_max_entries,
        ))
    } else {
        http_client
    };

    if !embeddings.health_check().await {
        tracing::warn!(url = %config.embedding.url, "Embedding service is not reachable yet");
    }

    let semantic_splitter = Arc::new(EmbeddingSemanticSplitter::new(
        embeddings,
        SemanticSplitterConfig {
            breakpoint_percentile: BreakpointPercentile::new(config.chunking.breakpoint_percentile)?,
            buffer_size: config.chunking.buffer_size,
        },
    ));

    let enforcer = ChunkSizeEnforcer::new(
        token_counter,
        semantic_splitter,
        EnforcerConfig {
            threshold: TokenThreshold::new(config.chunking.max_chunk_token_size)?,
            max_refinement_rounds: config.chunking.max_refinement_rounds,
            max_non_progress_attempts: config.chunking.max_non_progress_attempts,
            split_timeout: Duration::from_secs(config.chunking.split_timeout_secs),
            retry: RetryPolicy {
                max_retries: config.embedding.max_retries,
                base_delay: Duration::from_millis(config.embedding.retry_base_delay_ms),
            },
        },
    );

    let structural_splitter = Arc::new(MarkdownHeaderSplitter::new(
        config.structure.max_header_level,
    )?);

    Ok(ChunkDocumentHandler::new(
        structural_splitter,
        Arc::new(enforcer),
    ))
}

async fn run_file(
    config: &AppConfig,
    chunk_document: Arc<ChunkDocumentHandler>,
) -> anyhow::Result<()> {
    let input = config
        .pipeline
        .input_path
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("pipeline.input_path is required in file mode"))?;

    let document = tokio::fs::read_to_string(input)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", input.display(), e))?;

    let sink = Arc::new(FileChunkSink::new(&config.pipeline.output_path));
    let handler = WriteChunksHandler::new(chunk_document, sink);

    let report = handler
        .handle(ChunkDocument::new(input.display().to_string(), document))
        .await?;

    tracing::info!(
        run_id = %report.run_id,
        output = %config.pipeline.output_path.display(),
        chunks = report.stats.chunk_count,
        irreducible = report.stats.irreducible_count,
        max_tokens = report.stats.max_token_count,
        elapsed_ms = report.stats.elapsed_ms,
        "Chunking complete"
    );

    Ok(())
}

async fn run_server(
    config: &AppConfig,
    chunk_document: Arc<ChunkDocumentHandler>,
) -> anyhow::Result<()> {
    let server_config = ServerConfig::new(&config.server.host, config.server.port)
        .with_max_body_bytes(config.server.max_body_bytes);
    let server = HttpServer::new(server_config, AppState::new(chunk_document));

    // 启动服务器（带优雅关闭）
    server
        .run_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
            tracing::info!("Received shutdown signal");
        })
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}
