//! HTTP Embedding Client - 调用外部 Embedding HTTP 服务
//!
//! 实现 EmbeddingPort trait，兼容 OpenAI Embeddings API
//!
//! POST {base_url}/embeddings
//! Request: {"model": "...", "input": ["...", "..."]}  (JSON)
//! Response: {"data": [{"index": 0, "embedding": [...]}, ...]}

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::application::ports::{EmbeddingError, EmbeddingPort};

/// Embedding 请求体 (JSON)
#[derive(Debug, Serialize)]
struct EmbeddingHttpRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingHttpResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingItem {
    index: usize,
    embedding: Vec<f32>,
}

/// HTTP Embedding 客户端配置
#[derive(Debug, Clone)]
pub struct HttpEmbeddingClientConfig {
    /// 服务基础 URL（含版本前缀，如 http://localhost:8000/v1）
    pub base_url: String,
    /// 模型名称
    pub model: String,
    /// Bearer API Key
    pub api_key: Option<String>,
    /// 请求超时时间（秒）
    pub timeout_secs: u64,
}

impl Default for HttpEmbeddingClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000/v1".to_string(),
            model: "text-embedding-3-small".to_string(),
            api_key: None,
            timeout_secs: 60,
        }
    }
}

impl HttpEmbeddingClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// HTTP Embedding 客户端
pub struct HttpEmbeddingClient {
    client: Client,
    config: HttpEmbeddingClientConfig,
}

impl HttpEmbeddingClient {
    /// 创建新的 HTTP Embedding 客户端
    pub fn new(config: HttpEmbeddingClientConfig) -> Result<Self, EmbeddingError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| EmbeddingError::NetworkError(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn embeddings_url(&self) -> String {
        format!("{}/embeddings", self.config.base_url.trim_end_matches('/'))
    }

    fn models_url(&self) -> String {
        format!("{}/models", self.config.base_url.trim_end_matches('/'))
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }
}

/// 按 index 排序并校验数量
fn into_vectors(
    response: EmbeddingHttpResponse,
    expected: usize,
) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    let mut data = response.data;
    if data.len() != expected {
        return Err(EmbeddingError::InvalidResponse(format!(
            "expected {} embeddings, got {}",
            expected,
            data.len()
        )));
    }
    data.sort_by_key(|item| item.index);
    Ok(data.into_iter().map(|item| item.embedding).collect())
}

#[async_trait]
impl EmbeddingPort for HttpEmbeddingClient {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let body = EmbeddingHttpRequest {
            model: &self.config.model,
            input: texts,
        };

        tracing::debug!(
            url = %self.embeddings_url(),
            model = %self.config.model,
            inputs = texts.len(),
            "Sending embedding request"
        );

        let response = self
            .request(self.client.post(self.embeddings_url()))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    EmbeddingError::Timeout
                } else if e.is_connect() {
                    EmbeddingError::NetworkError(format!(
                        "Cannot connect to embedding service: {}",
                        e
                    ))
                } else {
                    EmbeddingError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            // 429 与 5xx 属于服务端暂时不可用
            if status.as_u16() == 429 || status.is_server_error() {
                return Err(EmbeddingError::NetworkError(format!(
                    "HTTP {}: {}",
                    status, error_text
                )));
            }
            return Err(EmbeddingError::ServiceError(format!(
                "HTTP {}: {}",
                status, error_text
            )));
        }

        let parsed: EmbeddingHttpResponse = response
            .json()
            .await
            .map_err(|e| EmbeddingError::InvalidResponse(e.to_string()))?;

        into_vectors(parsed, texts.len())
    }

    async fn health_check(&self) -> bool {
        match self
            .request(self.client.get(self.models_url()))
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = HttpEmbeddingClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:8000/v1");
        assert_eq!(config.model, "text-embedding-3-small");
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_config_builder() {
        let config = HttpEmbeddingClientConfig::new("http://example.com/v1/")
            .with_model("bge-m3")
            .with_api_key("sk-test")
            .with_timeout(5);
        let client = HttpEmbeddingClient::new(config).unwrap();

        assert_eq!(client.embeddings_url(), "http://example.com/v1/embeddings");
        assert_eq!(client.config.model, "bge-m3");
        assert_eq!(client.config.timeout_secs, 5);
    }

    #[test]
    fn test_response_is_ordered_by_index() {
        let body = r#"{"data":[
            {"index":1,"embedding":[0.0,1.0]},
            {"index":0,"embedding":[1.0,0.0]}
        ],"model":"m"}"#;
        let parsed: EmbeddingHttpResponse = serde_json::from_str(body).unwrap();
        let vectors = into_vectors(parsed, 2).unwrap();

        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0]]);
    }

    #[test]
    fn test_response_count_mismatch() {
        let parsed: EmbeddingHttpResponse =
            serde_json::from_str(r#"{"data":[{"index":0,"embedding":[1.0]}]}"#).unwrap();
        assert!(matches!(
            into_vectors(parsed, 3),
            Err(EmbeddingError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_input_skips_request() {
        // 不可达地址：若发出请求则会失败
        let client =
            HttpEmbeddingClient::new(HttpEmbeddingClientConfig::new("http://127.0.0.1:9")).unwrap();
        assert!(client.embed(&[]).await.unwrap().is_empty());
    }
}
