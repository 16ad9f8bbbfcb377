//! Query engine — retrieve the closest chunks and let the model answer from
//! them alone.

use holocron_core::error::Result;
use holocron_core::traits::provider::GenerateParams;
use holocron_core::traits::{Embedder, Provider};
use holocron_core::types::Message;
use std::sync::Arc;

use crate::index::VectorIndex;
use crate::search::SearchResult;

/// Answer returned when retrieval finds nothing.
pub const EMPTY_RESPONSE: &str = "Empty Response";

const QA_SYSTEM_PROMPT: &str = "You are an expert Q&A system. Always answer the query using \
the provided context information, and not prior knowledge.";

/// Retrieval + synthesis over a [`VectorIndex`].
pub struct QueryEngine {
    index: Arc<VectorIndex>,
    embedder: Arc<dyn Embedder>,
    provider: Arc<dyn Provider>,
    params: GenerateParams,
    top_k: usize,
}

impl QueryEngine {
    pub fn new(
        index: Arc<VectorIndex>,
        embedder: Arc<dyn Embedder>,
        provider: Arc<dyn Provider>,
        params: GenerateParams,
        top_k: usize,
    ) -> Self {
        Self {
            index,
            embedder,
            provider,
            params,
            top_k,
        }
    }

    /// The `similarity_top_k` chunks closest to `query`.
    pub async fn retrieve(&self, query: &str) -> Result<Vec<SearchResult>> {
        let vector = self.embedder.embed_query(query).await?;
        let hits = self.index.search(&vector, self.top_k)?;
        tracing::debug!("🔍 '{}' → {} chunks", query, hits.len());
        Ok(hits)
    }

    /// Answer `query` from the retrieved context.
    pub async fn query(&self, query: &str) -> Result<String> {
        let hits = self.retrieve(query).await?;
        if hits.is_empty() {
            return Ok(EMPTY_RESPONSE.to_string());
        }

        let messages = [
            Message::system(QA_SYSTEM_PROMPT),
            Message::user(qa_prompt(query, &hits)),
        ];
        let response = self.provider.chat(&messages, &[], &self.params).await?;
        Ok(response
            .content
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| EMPTY_RESPONSE.to_string()))
    }
}

fn qa_prompt(query: &str, hits: &[SearchResult]) -> String {
    let context = hits
        .iter()
        .map(|h| format!("source: {}\n\n{}", h.doc_id, h.text))
        .collect::<Vec<_>>()
        .join("\n\n");
    format!(
        "Context information is below.\n---------------------\n{context}\n---------------------\n\
         Given the context information and not prior knowledge, answer the query.\n\
         Query: {query}\nAnswer: "
    )
}
