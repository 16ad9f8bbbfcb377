//! Provider registry — maps provider names to endpoint configurations.
//!
//! Every backend speaks the OpenAI wire format; entries differ only by base
//! URL, auth style and the environment variables consulted.

use holocron_core::types::ModelInfo;

/// How to attach auth credentials to requests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AuthStyle {
    /// `Authorization: Bearer <key>`
    Bearer,
    /// No authentication required (local servers).
    None,
}

/// Static model definition for a provider.
#[derive(Debug, Clone)]
pub struct ModelDef {
    pub id: &'static str,
    pub name: &'static str,
    pub context_length: u32,
    pub max_output_tokens: Option<u32>,
}

impl ModelDef {
    pub fn to_model_info(&self, provider: &str) -> ModelInfo {
        ModelInfo {
            id: self.id.into(),
            name: self.name.into(),
            provider: provider.into(),
            context_length: self.context_length,
            max_output_tokens: self.max_output_tokens,
        }
    }
}

/// Configuration for a single provider.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub name: &'static str,
    pub base_url: &'static str,
    pub chat_path: &'static str,
    pub embeddings_path: &'static str,
    pub models_path: &'static str,
    /// Environment variable names to try for the API key (in order).
    pub env_keys: &'static [&'static str],
    pub auth_style: AuthStyle,
    /// Environment variable overriding the base URL (e.g. `OLLAMA_HOST`).
    pub base_url_env: Option<&'static str>,
    pub default_models: &'static [ModelDef],
}

static OLLAMA_MODELS: &[ModelDef] = &[
    ModelDef {
        id: "llama3.2:3b",
        name: "Llama 3.2 3B (Ollama)",
        context_length: 4096,
        max_output_tokens: Some(4096),
    },
    ModelDef {
        id: "nomic-embed-text",
        name: "Nomic Embed Text (Ollama)",
        context_length: 8192,
        max_output_tokens: None,
    },
];

static LLAMACPP_MODELS: &[ModelDef] = &[ModelDef {
    id: "local-model",
    name: "Local llama.cpp Model",
    context_length: 4096,
    max_output_tokens: Some(4096),
}];

static OPENAI_MODELS: &[ModelDef] = &[
    ModelDef {
        id: "gpt-4o-mini",
        name: "GPT-4o Mini",
        context_length: 128000,
        max_output_tokens: Some(4096),
    },
    ModelDef {
        id: "text-embedding-3-small",
        name: "Text Embedding 3 Small",
        context_length: 8191,
        max_output_tokens: None,
    },
];

/// All known providers.
static PROVIDERS: &[ProviderConfig] = &[
    ProviderConfig {
        name: "ollama",
        base_url: "http://localhost:11434/v1",
        chat_path: "/chat/completions",
        embeddings_path: "/embeddings",
        models_path: "/models",
        env_keys: &[],
        auth_style: AuthStyle::None,
        base_url_env: Some("OLLAMA_HOST"),
        default_models: OLLAMA_MODELS,
    },
    ProviderConfig {
        name: "llamacpp",
        base_url: "http://localhost:8080/v1",
        chat_path: "/chat/completions",
        embeddings_path: "/embeddings",
        models_path: "/models",
        env_keys: &[],
        auth_style: AuthStyle::None,
        base_url_env: Some("LLAMACPP_HOST"),
        default_models: LLAMACPP_MODELS,
    },
    ProviderConfig {
        name: "lmstudio",
        base_url: "http://localhost:1234/v1",
        chat_path: "/chat/completions",
        embeddings_path: "/embeddings",
        models_path: "/models",
        env_keys: &[],
        auth_style: AuthStyle::None,
        base_url_env: Some("LMSTUDIO_HOST"),
        default_models: &[],
    },
    ProviderConfig {
        name: "openai",
        base_url: "https://api.openai.com/v1",
        chat_path: "/chat/completions",
        embeddings_path: "/embeddings",
        models_path: "/models",
        env_keys: &["OPENAI_API_KEY", "openai_api_key"],
        auth_style: AuthStyle::Bearer,
        base_url_env: Some("OPENAI_API_BASE"),
        default_models: OPENAI_MODELS,
    },
];

/// Look up a provider config by name.
pub fn get_provider_config(name: &str) -> Option<&'static ProviderConfig> {
    let lookup = match name {
        "llama.cpp" => "llamacpp",
        "lm-studio" | "lm_studio" => "lmstudio",
        other => other,
    };
    PROVIDERS.iter().find(|p| p.name == lookup)
}

/// List all known provider names.
pub fn all_provider_names() -> Vec<&'static str> {
    PROVIDERS.iter().map(|p| p.name).collect()
}

/// Resolve a base URL: explicit endpoint > env override > registry default.
/// Host-style env values get `/v1` appended.
pub fn resolve_base_url(registry: &ProviderConfig, endpoint: &str) -> String {
    if !endpoint.is_empty() {
        return endpoint.trim_end_matches('/').to_string();
    }
    registry
        .base_url_env
        .and_then(|env_key| {
            let val = std::env::var(env_key).ok()?;
            let val = if val.starts_with("http://") || val.starts_with("https://") {
                val
            } else {
                format!("http://{val}")
            };
            if val.ends_with("/v1") {
                Some(val)
            } else {
                Some(format!("{}/v1", val.trim_end_matches('/')))
            }
        })
        .unwrap_or_else(|| registry.base_url.to_string())
}
