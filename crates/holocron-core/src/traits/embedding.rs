//! Embedding model trait.

use async_trait::async_trait;

use crate::error::Result;

/// Turns text into dense vectors.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Model identifier, recorded in the persisted index.
    fn model(&self) -> &str;

    /// Embed a batch of texts; the output has one vector per input, in order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Embed a single query string.
    async fn embed_query(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embed(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| crate::error::HolocronError::Embedding("empty embedding response".into()))
    }
}
