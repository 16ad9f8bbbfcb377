//! # Holocron Providers
//!
//! Chat and embedding backends. Every supported backend (Ollama, llama.cpp,
//! LM Studio, OpenAI) speaks the OpenAI wire format and is served by
//! [`OpenAiCompatibleProvider`] / [`OpenAiCompatibleEmbedder`].

pub mod embeddings;
pub mod openai_compatible;
pub mod provider_registry;

use holocron_core::config::HolocronConfig;
use holocron_core::error::{HolocronError, Result};
use holocron_core::traits::{Embedder, Provider};
use std::sync::Arc;

pub use embeddings::OpenAiCompatibleEmbedder;
pub use openai_compatible::OpenAiCompatibleProvider;

/// Create the chat provider named by `config.llm.provider`.
pub fn create_provider(config: &HolocronConfig) -> Result<Arc<dyn Provider>> {
    let provider_name = config.llm.provider.as_str();
    if provider_name.starts_with("custom:") {
        return Ok(Arc::new(OpenAiCompatibleProvider::custom(provider_name, config)?));
    }
    let registry = provider_registry::get_provider_config(provider_name)
        .ok_or_else(|| provider_not_found(provider_name))?;
    Ok(Arc::new(OpenAiCompatibleProvider::from_registry(registry, config)?))
}

/// Create the embedder named by `config.embedding.provider`.
pub fn create_embedder(config: &HolocronConfig) -> Result<Arc<dyn Embedder>> {
    let provider_name = config.embedding.provider.as_str();
    let registry = provider_registry::get_provider_config(provider_name)
        .ok_or_else(|| provider_not_found(provider_name))?;
    Ok(Arc::new(OpenAiCompatibleEmbedder::from_registry(registry, config)?))
}

/// List all available provider names.
pub fn available_providers() -> Vec<&'static str> {
    let mut names = provider_registry::all_provider_names();
    names.push("custom");
    names
}

fn provider_not_found(name: &str) -> HolocronError {
    HolocronError::ProviderNotFound(format!(
        "{name} (available: {})",
        available_providers().join(", ")
    ))
}
