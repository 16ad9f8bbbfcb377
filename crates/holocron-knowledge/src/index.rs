//! Persisted vector index.
//!
//! The presence of the persist directory decides between building and
//! loading; there is no invalidation. Delete the directory to rebuild.

use chrono::{DateTime, Utc};
use holocron_core::config::HolocronConfig;
use holocron_core::error::{HolocronError, Result};
use holocron_core::traits::Embedder;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::chunker::chunk_text;
use crate::corpus::{Document, load_corpus};
use crate::search::{SearchResult, top_k};

pub const DOCSTORE_FILE: &str = "docstore.json";
pub const VECTOR_STORE_FILE: &str = "vector_store.json";
pub const INDEX_STORE_FILE: &str = "index_store.json";

/// Chunks sent to the embedder per progress step.
const EMBED_STEP: usize = 64;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredChunk {
    id: String,
    doc_id: String,
    text: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct DocStore {
    chunks: Vec<StoredChunk>,
}

#[derive(Debug, Serialize, Deserialize)]
struct VectorStore {
    embeddings: BTreeMap<String, Vec<f32>>,
}

/// Index metadata, persisted as `index_store.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexMetadata {
    pub embedding_model: String,
    pub dimensions: usize,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub document_count: usize,
    pub chunk_count: usize,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
struct IndexedChunk {
    id: String,
    doc_id: String,
    text: String,
    vector: Vec<f32>,
}

/// Chunks of the corpus with their embedding vectors.
#[derive(Debug, Clone)]
pub struct VectorIndex {
    chunks: Vec<IndexedChunk>,
    metadata: IndexMetadata,
}

impl VectorIndex {
    /// Load the index from `config.index.persist_dir` if that directory
    /// exists; otherwise build it from `config.corpus.dir` and persist it.
    pub async fn build_or_load(config: &HolocronConfig, embedder: &dyn Embedder) -> Result<Self> {
        let persist_dir = Path::new(&config.index.persist_dir);
        if persist_dir.exists() {
            tracing::info!("📦 Loading index from {}", persist_dir.display());
            let index = Self::load(persist_dir)?;
            if index.metadata.embedding_model != embedder.model() {
                tracing::warn!(
                    "⚠️ Index at {} was embedded with '{}' but the embedder is '{}'; \
                     delete the directory to rebuild",
                    persist_dir.display(),
                    index.metadata.embedding_model,
                    embedder.model()
                );
            }
            return Ok(index);
        }

        tracing::info!(
            "🔨 No index at {}, building from {}",
            persist_dir.display(),
            config.corpus.dir
        );
        let documents = load_corpus(Path::new(&config.corpus.dir))?;
        let index = Self::build(
            &documents,
            embedder,
            config.index.chunk_size,
            config.index.chunk_overlap,
        )
        .await?;
        index.persist(persist_dir)?;
        Ok(index)
    }

    /// Chunk and embed `documents`.
    pub async fn build(
        documents: &[Document],
        embedder: &dyn Embedder,
        chunk_size: usize,
        chunk_overlap: usize,
    ) -> Result<Self> {
        let mut stored = Vec::new();
        for doc in documents {
            for (n, text) in chunk_text(&doc.text, chunk_size, chunk_overlap)
                .into_iter()
                .enumerate()
            {
                stored.push(StoredChunk {
                    id: format!("{}#{}", doc.id, n),
                    doc_id: doc.id.clone(),
                    text,
                });
            }
        }
        if stored.is_empty() {
            return Err(HolocronError::Index(
                "cannot build an index from an empty corpus".into(),
            ));
        }

        let total = stored.len();
        let mut vectors = Vec::with_capacity(total);
        for batch in stored.chunks(EMBED_STEP) {
            let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
            let embedded = embedder.embed(&texts).await?;
            if embedded.len() != texts.len() {
                return Err(HolocronError::Embedding(format!(
                    "expected {} embeddings, got {}",
                    texts.len(),
                    embedded.len()
                )));
            }
            vectors.extend(embedded);
            tracing::info!("🧬 Embedded {}/{} chunks", vectors.len(), total);
        }

        let dimensions = vectors.first().map(Vec::len).unwrap_or(0);
        if dimensions == 0 || vectors.iter().any(|v| v.len() != dimensions) {
            return Err(HolocronError::Embedding(
                "embedder returned vectors of inconsistent dimension".into(),
            ));
        }

        let chunks: Vec<IndexedChunk> = stored
            .into_iter()
            .zip(vectors)
            .map(|(c, vector)| IndexedChunk {
                id: c.id,
                doc_id: c.doc_id,
                text: c.text,
                vector,
            })
            .collect();

        let metadata = IndexMetadata {
            embedding_model: embedder.model().to_string(),
            dimensions,
            chunk_size,
            chunk_overlap,
            document_count: documents.len(),
            chunk_count: chunks.len(),
            created_at: Utc::now(),
        };
        tracing::info!(
            "✅ Index built: {} documents, {} chunks, {} dims",
            metadata.document_count,
            metadata.chunk_count,
            dimensions
        );
        Ok(Self { chunks, metadata })
    }

    /// Write the three store files into `dir`.
    ///
    /// The stores are written to a staging directory next to `dir` and moved
    /// into place at the end, so `dir` only ever appears complete.
    pub fn persist(&self, dir: &Path) -> Result<()> {
        let staging = staging_dir(dir)?;
        if staging.exists() {
            std::fs::remove_dir_all(&staging)?;
        }
        std::fs::create_dir_all(&staging)?;

        let docstore = DocStore {
            chunks: self
                .chunks
                .iter()
                .map(|c| StoredChunk {
                    id: c.id.clone(),
                    doc_id: c.doc_id.clone(),
                    text: c.text.clone(),
                })
                .collect(),
        };
        let vector_store = VectorStore {
            embeddings: self
                .chunks
                .iter()
                .map(|c| (c.id.clone(), c.vector.clone()))
                .collect(),
        };

        std::fs::write(staging.join(DOCSTORE_FILE), serde_json::to_string(&docstore)?)?;
        std::fs::write(
            staging.join(VECTOR_STORE_FILE),
            serde_json::to_string(&vector_store)?,
        )?;
        std::fs::write(
            staging.join(INDEX_STORE_FILE),
            serde_json::to_string_pretty(&self.metadata)?,
        )?;

        if dir.exists() {
            std::fs::remove_dir_all(dir)?;
        }
        std::fs::rename(&staging, dir)?;
        tracing::info!("💾 Index persisted to {}", dir.display());
        Ok(())
    }

    /// Load and validate a persisted index.
    pub fn load(dir: &Path) -> Result<Self> {
        let read = |name: &str| -> Result<String> {
            let path = dir.join(name);
            if !path.is_file() {
                return Err(HolocronError::Index(format!(
                    "{} is missing; delete {} to rebuild the index",
                    path.display(),
                    dir.display()
                )));
            }
            Ok(std::fs::read_to_string(path)?)
        };

        let docstore: DocStore = serde_json::from_str(&read(DOCSTORE_FILE)?)?;
        let mut vector_store: VectorStore = serde_json::from_str(&read(VECTOR_STORE_FILE)?)?;
        let metadata: IndexMetadata = serde_json::from_str(&read(INDEX_STORE_FILE)?)?;

        let mut chunks = Vec::with_capacity(docstore.chunks.len());
        for c in docstore.chunks {
            let vector = vector_store.embeddings.remove(&c.id).ok_or_else(|| {
                HolocronError::Index(format!("chunk '{}' has no stored vector", c.id))
            })?;
            if vector.len() != metadata.dimensions {
                return Err(HolocronError::Index(format!(
                    "chunk '{}' has {} dimensions, expected {}",
                    c.id,
                    vector.len(),
                    metadata.dimensions
                )));
            }
            chunks.push(IndexedChunk {
                id: c.id,
                doc_id: c.doc_id,
                text: c.text,
                vector,
            });
        }
        if chunks.is_empty() {
            return Err(HolocronError::Index(format!(
                "index at {} holds no chunks",
                dir.display()
            )));
        }

        tracing::info!(
            "📦 Index loaded: {} chunks ({}, {} dims)",
            chunks.len(),
            metadata.embedding_model,
            metadata.dimensions
        );
        Ok(Self { chunks, metadata })
    }

    /// The `top_k` chunks most similar to `query`, highest first.
    ///
    /// A query vector of another dimension than the index is an error: the
    /// index was built with a different embedding model.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchResult>> {
        if query.len() != self.metadata.dimensions {
            return Err(HolocronError::Index(format!(
                "query has {} dimensions but the index ('{}') has {}; \
                 rebuild the index after changing the embedding model",
                query.len(),
                self.metadata.embedding_model,
                self.metadata.dimensions
            )));
        }

        Ok(
            top_k(query, self.chunks.iter().map(|c| c.vector.as_slice()), k)
                .into_iter()
                .map(|(i, score)| {
                    let chunk = &self.chunks[i];
                    SearchResult {
                        chunk_id: chunk.id.clone(),
                        doc_id: chunk.doc_id.clone(),
                        text: chunk.text.clone(),
                        score,
                    }
                })
                .collect(),
        )
    }

    pub fn metadata(&self) -> &IndexMetadata {
        &self.metadata
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

/// Sibling directory the stores are written to before being moved to `dir`.
fn staging_dir(dir: &Path) -> Result<PathBuf> {
    let name = dir.file_name().ok_or_else(|| {
        HolocronError::Index(format!("cannot persist into {}", dir.display()))
    })?;
    let parent = dir
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    Ok(parent.join(format!(".{}.partial", name.to_string_lossy())))
}
