//! Trait seams between the Holocron crates.

pub mod embedding;
pub mod provider;
pub mod tool;

pub use embedding::Embedder;
pub use provider::Provider;
pub use tool::Tool;
