//! # Holocron Knowledge Base
//!
//! Retrieval-augmented generation over the scraped corpus.
//!
//! ## How it works
//! ```text
//! ./web_pages/*.html
//!   ↓ corpus::load_corpus (tags stripped)
//! Documents
//!   ↓ chunker (1024 chars, 200 overlap)
//! Chunks
//!   ↓ Embedder (batched)
//! VectorIndex ──persist──▶ ./storage/{docstore,vector_store,index_store}.json
//!   ↓ cosine top-k
//! QueryEngine → provider answers from the retrieved context
//! ```

pub mod chunker;
pub mod corpus;
pub mod index;
pub mod query;
pub mod search;

pub use corpus::Document;
pub use index::VectorIndex;
pub use query::QueryEngine;
pub use search::SearchResult;
