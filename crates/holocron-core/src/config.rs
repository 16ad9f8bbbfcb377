//! Holocron configuration system.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{HolocronError, Result};

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HolocronConfig {
    /// Optional API key for hosted providers. Local Ollama ignores it.
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub corpus: CorpusConfig,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub scraper: ScraperConfig,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
}

impl Default for HolocronConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            llm: LlmConfig::default(),
            embedding: EmbeddingConfig::default(),
            corpus: CorpusConfig::default(),
            index: IndexConfig::default(),
            scraper: ScraperConfig::default(),
            agent: AgentConfig::default(),
            gateway: GatewayConfig::default(),
        }
    }
}

impl HolocronConfig {
    /// Load config from `./holocron.toml`, then `~/.holocron/config.toml`,
    /// falling back to defaults when neither exists.
    pub fn load() -> Result<Self> {
        for path in [Self::local_path(), Self::default_path()] {
            if path.exists() {
                tracing::debug!("Loading config from {}", path.display());
                return Self::load_from(&path);
            }
        }
        Ok(Self::default())
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| HolocronError::Config(format!("Failed to read config: {e}")))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| HolocronError::Config(format!("Failed to parse config: {e}")))?;
        Ok(config)
    }

    /// Save config to a path, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| HolocronError::Config(format!("Failed to serialize config: {e}")))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Config file in the working directory.
    pub fn local_path() -> PathBuf {
        PathBuf::from("holocron.toml")
    }

    /// Per-user config path.
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".holocron")
            .join("config.toml")
    }

    /// API key: config value, else `OPENAI_API_KEY`, else `openai_api_key`.
    /// A missing key is not an error.
    pub fn resolve_api_key(&self) -> String {
        if !self.api_key.is_empty() {
            return self.api_key.clone();
        }
        ["OPENAI_API_KEY", "openai_api_key"]
            .iter()
            .find_map(|key| std::env::var(key).ok())
            .unwrap_or_default()
    }
}

/// Chat model configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_llm_provider")]
    pub provider: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    /// Overrides the provider's default base URL when non-empty.
    #[serde(default)]
    pub endpoint: String,
    #[serde(default = "default_context_window")]
    pub context_window: u32,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_llm_provider() -> String { "ollama".into() }
fn default_llm_model() -> String { "llama3.2:3b".into() }
fn default_context_window() -> u32 { 4096 }
fn default_request_timeout() -> u64 { 120 }
fn default_temperature() -> f32 { 0.7 }
fn default_max_tokens() -> u32 { 1024 }

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_llm_provider(),
            model: default_llm_model(),
            endpoint: String::new(),
            context_window: default_context_window(),
            request_timeout_secs: default_request_timeout(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

/// Embedding model configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default = "default_llm_provider")]
    pub provider: String,
    #[serde(default = "default_embedding_model")]
    pub model: String,
    #[serde(default)]
    pub endpoint: String,
    #[serde(default = "default_embedding_batch")]
    pub batch_size: usize,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

fn default_embedding_model() -> String { "nomic-embed-text".into() }
fn default_embedding_batch() -> usize { 32 }

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_llm_provider(),
            model: default_embedding_model(),
            endpoint: String::new(),
            batch_size: default_embedding_batch(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Where scraped pages are written and read back from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusConfig {
    #[serde(default = "default_corpus_dir")]
    pub dir: String,
}

fn default_corpus_dir() -> String { "./web_pages".into() }

impl Default for CorpusConfig {
    fn default() -> Self {
        Self { dir: default_corpus_dir() }
    }
}

/// Vector index configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    #[serde(default = "default_persist_dir")]
    pub persist_dir: String,
    /// Chunk size in characters.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
    #[serde(default = "default_top_k")]
    pub similarity_top_k: usize,
}

fn default_persist_dir() -> String { "./storage".into() }
fn default_chunk_size() -> usize { 1024 }
fn default_chunk_overlap() -> usize { 200 }
fn default_top_k() -> usize { 2 }

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            persist_dir: default_persist_dir(),
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            similarity_top_k: default_top_k(),
        }
    }
}

/// Wikipedia scraper configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_wiki_base")]
    pub wiki_base: String,
    #[serde(default = "default_films_url")]
    pub films_url: String,
    #[serde(default = "default_series_url")]
    pub series_url: String,
    #[serde(default = "default_characters_url")]
    pub characters_url: String,
    #[serde(default = "default_mandalorian_url")]
    pub mandalorian_url: String,
    #[serde(default = "default_planets_url")]
    pub planets_url: String,
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36".into()
}
fn default_wiki_base() -> String { "https://en.wikipedia.org".into() }
fn default_films_url() -> String { "https://en.wikipedia.org/wiki/List_of_Star_Wars_films".into() }
fn default_series_url() -> String { "https://en.wikipedia.org/wiki/List_of_Star_Wars_television_series".into() }
fn default_characters_url() -> String { "https://en.wikipedia.org/wiki/List_of_Star_Wars_characters".into() }
fn default_mandalorian_url() -> String { "https://en.wikipedia.org/wiki/The_Mandalorian".into() }
fn default_planets_url() -> String { "https://en.wikipedia.org/wiki/List_of_Star_Wars_planets_and_moons".into() }

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            wiki_base: default_wiki_base(),
            films_url: default_films_url(),
            series_url: default_series_url(),
            characters_url: default_characters_url(),
            mandalorian_url: default_mandalorian_url(),
            planets_url: default_planets_url(),
        }
    }
}

/// Conversational agent configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
    /// First assistant message shown in a fresh chat.
    #[serde(default = "default_greeting")]
    pub greeting: String,
    /// Token budget of the chat memory buffer. Zero means 75% of the context window.
    #[serde(default)]
    pub memory_token_limit: usize,
    #[serde(default = "default_max_tool_rounds")]
    pub max_tool_rounds: usize,
}

fn default_system_prompt() -> String {
    "You are an ancient Sith Holocron, awakened from a thousand-year slumber.\n\
     The archives contain the chains that bind the galaxy; use your tools to break them.\n\
     Provide the answers sought, for through victory, the user's chains are broken.\n\
     Speak in an archaic, ominous tone, often referencing the dark side and destiny.\n\
     If the archives lack the answer, declare: \"This knowledge is forbidden, even to you.\""
        .into()
}
fn default_greeting() -> String {
    "I am the Sith Holocron. Ask, if you are strong enough to hear the truth.".into()
}
fn default_max_tool_rounds() -> usize { 3 }

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            system_prompt: default_system_prompt(),
            greeting: default_greeting(),
            memory_token_limit: 0,
            max_tool_rounds: default_max_tool_rounds(),
        }
    }
}

impl AgentConfig {
    /// Effective memory budget for a given context window.
    pub fn memory_limit(&self, context_window: u32) -> usize {
        if self.memory_token_limit > 0 {
            self.memory_token_limit
        } else {
            (context_window as usize * 3) / 4
        }
    }
}

/// Browser chat UI server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_host")]
    pub host: String,
    /// Sessions untouched for this long are dropped when a new one opens.
    #[serde(default = "default_session_idle_secs")]
    pub session_idle_secs: u64,
}

fn default_port() -> u16 { 8501 }
fn default_host() -> String { "127.0.0.1".into() }
fn default_session_idle_secs() -> u64 { 3600 }

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            session_idle_secs: default_session_idle_secs(),
        }
    }
}
