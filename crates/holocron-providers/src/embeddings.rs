//! Embedding client for OpenAI-compatible `/embeddings` endpoints.

use async_trait::async_trait;
use holocron_core::config::HolocronConfig;
use holocron_core::error::{HolocronError, Result};
use holocron_core::traits::embedding::Embedder;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::provider_registry::{AuthStyle, ProviderConfig, resolve_base_url};

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
    encoding_format: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    #[serde(default)]
    index: usize,
}

/// Embedder backed by any OpenAI-compatible embeddings API.
pub struct OpenAiCompatibleEmbedder {
    provider: String,
    model: String,
    url: String,
    api_key: String,
    auth_style: AuthStyle,
    batch_size: usize,
    client: reqwest::Client,
}

impl OpenAiCompatibleEmbedder {
    /// Create from a registry entry + the `[embedding]` config section.
    pub fn from_registry(registry: &ProviderConfig, config: &HolocronConfig) -> Result<Self> {
        let api_key = if !config.api_key.is_empty() {
            config.api_key.clone()
        } else {
            registry
                .env_keys
                .iter()
                .find_map(|key| std::env::var(key).ok())
                .unwrap_or_default()
        };
        let base_url = resolve_base_url(registry, &config.embedding.endpoint);

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.embedding.request_timeout_secs))
            .build()
            .map_err(|e| HolocronError::Http(format!("failed to build HTTP client: {e}")))?;

        tracing::info!(
            "🧬 Embedding backend: {} model={} ({})",
            registry.name,
            config.embedding.model,
            base_url
        );

        Ok(Self {
            provider: registry.name.to_string(),
            model: config.embedding.model.clone(),
            url: format!("{}{}", base_url, registry.embeddings_path),
            api_key,
            auth_style: registry.auth_style,
            batch_size: config.embedding.batch_size.max(1),
            client,
        })
    }

    async fn request(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let body = EmbeddingRequest {
            model: &self.model,
            input: texts,
            encoding_format: "float",
        };
        let mut req = self.client.post(&self.url).json(&body);
        if self.auth_style == AuthStyle::Bearer && !self.api_key.is_empty() {
            req = req.header("Authorization", format!("Bearer {}", self.api_key));
        }

        let resp = req.send().await.map_err(|e| {
            HolocronError::Http(format!("{} connection failed ({}): {}", self.provider, self.url, e))
        })?;
        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            return Err(HolocronError::Embedding(format!(
                "{} embedding error {}: {}",
                self.provider, status, text
            )));
        }

        let mut parsed: EmbeddingResponse = resp
            .json()
            .await
            .map_err(|e| HolocronError::Embedding(format!("invalid embedding response: {e}")))?;
        if parsed.data.len() != texts.len() {
            return Err(HolocronError::Embedding(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                parsed.data.len()
            )));
        }
        parsed.data.sort_by_key(|d| d.index);
        Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
    }
}

#[async_trait]
impl Embedder for OpenAiCompatibleEmbedder {
    fn model(&self) -> &str {
        &self.model
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if self.auth_style != AuthStyle::None && self.api_key.is_empty() {
            return Err(HolocronError::ApiKeyMissing(self.provider.clone()));
        }

        let mut vectors = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            tracing::debug!("Embedding batch of {} texts", batch.len());
            vectors.extend(self.request(batch).await?);
        }
        Ok(vectors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openai_compatible::tests::serve_json;
    use crate::provider_registry::get_provider_config;

    fn embedder_at(base_url: &str, batch_size: usize) -> OpenAiCompatibleEmbedder {
        let mut config = HolocronConfig::default();
        config.embedding.endpoint = base_url.to_string();
        config.embedding.batch_size = batch_size;
        OpenAiCompatibleEmbedder::from_registry(get_provider_config("ollama").unwrap(), &config)
            .unwrap()
    }

    #[tokio::test]
    async fn test_embed_orders_by_index_and_batches() {
        let (base, server) = serve_json(vec![
            (
                200,
                r#"{"data":[{"embedding":[0.0,1.0],"index":1},{"embedding":[1.0,0.0],"index":0}]}"#
                    .into(),
            ),
            (200, r#"{"data":[{"embedding":[0.5,0.5],"index":0}]}"#.into()),
        ])
        .await;
        let embedder = embedder_at(&base, 2);

        let texts = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let vectors = embedder.embed(&texts).await.unwrap();
        assert_eq!(vectors, vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![0.5, 0.5]]);

        let requests = server.await.unwrap();
        assert_eq!(requests.len(), 2);
        assert!(requests[0].starts_with("POST /v1/embeddings"));
        assert!(requests[0].contains("nomic-embed-text"));
    }

    #[tokio::test]
    async fn test_embed_count_mismatch_is_error() {
        let (base, _server) =
            serve_json(vec![(200, r#"{"data":[]}"#.into())]).await;
        let embedder = embedder_at(&base, 8);
        let err = embedder.embed_query("Sidious").await.unwrap_err();
        assert!(matches!(err, HolocronError::Embedding(_)));
    }

    #[tokio::test]
    async fn test_embed_http_error() {
        let (base, _server) = serve_json(vec![(404, r#"{"error":"model not found"}"#.into())]).await;
        let embedder = embedder_at(&base, 8);
        let err = embedder.embed(&["x".to_string()]).await.unwrap_err();
        assert!(err.to_string().contains("model not found"));
    }
}
