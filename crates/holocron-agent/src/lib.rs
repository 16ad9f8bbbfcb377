//! # Holocron Agent
//! The Sith Holocron's conversational engine.
//!
//! - **Multi-round tool calling**: up to `max_tool_rounds` rounds of
//!   tool → LLM → tool; the final round is sent without tools
//! - **Bounded memory**: each agent owns a [`ChatMemoryBuffer`]
//! - **Session isolation**: [`AgentFactory::new_agent`] hands out agents with
//!   fresh memory over shared provider and tools

pub mod memory;
pub mod session;

use holocron_core::config::HolocronConfig;
use holocron_core::error::Result;
use holocron_core::traits::provider::GenerateParams;
use holocron_core::traits::{Embedder, Provider};
use holocron_core::types::{Message, ToolDefinition};
use holocron_knowledge::{QueryEngine, VectorIndex};
use holocron_tools::ToolRegistry;
use std::sync::Arc;

pub use memory::ChatMemoryBuffer;
pub use session::{ChatMessage, ChatSession};

/// Tool output beyond this many characters is truncated before it reaches
/// the model.
const MAX_TOOL_OUTPUT_CHARS: usize = 4000;

/// Builds agents that share a provider and tools but never memory.
pub struct AgentFactory {
    provider: Arc<dyn Provider>,
    tools: Arc<ToolRegistry>,
    system_prompt: String,
    greeting: String,
    params: GenerateParams,
    memory_limit: usize,
    max_tool_rounds: usize,
}

impl AgentFactory {
    pub fn new(provider: Arc<dyn Provider>, tools: Arc<ToolRegistry>, config: &HolocronConfig) -> Self {
        Self {
            provider,
            tools,
            system_prompt: config.agent.system_prompt.clone(),
            greeting: config.agent.greeting.clone(),
            params: generate_params(config),
            memory_limit: config.agent.memory_limit(config.llm.context_window),
            max_tool_rounds: config.agent.max_tool_rounds,
        }
    }

    /// Wire the whole stack from config: provider, embedder, vector index
    /// (built or loaded), query engine and the search tool.
    pub async fn from_config(config: &HolocronConfig) -> Result<Self> {
        let provider = holocron_providers::create_provider(config)?;
        let embedder: Arc<dyn Embedder> = holocron_providers::create_embedder(config)?;
        let index = VectorIndex::build_or_load(config, embedder.as_ref()).await?;
        let engine = QueryEngine::new(
            Arc::new(index),
            embedder,
            provider.clone(),
            generate_params(config),
            config.index.similarity_top_k,
        );
        let tools = Arc::new(ToolRegistry::with_search(Arc::new(engine)));
        tracing::info!(
            "🔮 Holocron ready: {} / {} with {} tool(s)",
            provider.name(),
            config.llm.model,
            tools.len()
        );
        Ok(Self::new(provider, tools, config))
    }

    /// A new agent with empty memory.
    pub fn new_agent(&self) -> Agent {
        Agent {
            provider: self.provider.clone(),
            tools: self.tools.clone(),
            system_prompt: self.system_prompt.clone(),
            params: self.params.clone(),
            memory: ChatMemoryBuffer::new(self.memory_limit),
            max_tool_rounds: self.max_tool_rounds,
            last_tool_rounds: 0,
        }
    }

    pub fn greeting(&self) -> &str {
        &self.greeting
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    pub fn model(&self) -> &str {
        &self.params.model
    }

    /// Whether the language model backend answers right now.
    pub async fn provider_online(&self) -> bool {
        match self.provider.health_check().await {
            Ok(online) => online,
            Err(e) => {
                tracing::warn!("⚠️ Health check of {} failed: {e}", self.provider.name());
                false
            }
        }
    }
}

fn generate_params(config: &HolocronConfig) -> GenerateParams {
    GenerateParams {
        model: config.llm.model.clone(),
        temperature: config.llm.temperature,
        max_tokens: config.llm.max_tokens,
        ..Default::default()
    }
}

/// A conversational agent: system prompt + bounded memory + tools.
pub struct Agent {
    provider: Arc<dyn Provider>,
    tools: Arc<ToolRegistry>,
    system_prompt: String,
    params: GenerateParams,
    memory: ChatMemoryBuffer,
    max_tool_rounds: usize,
    last_tool_rounds: usize,
}

impl Agent {
    /// Run one turn. The turn (user message, tool traffic, answer) enters
    /// memory only once it completes; provider errors propagate and leave
    /// memory untouched.
    pub async fn chat(&mut self, user_message: &str) -> Result<String> {
        let tool_defs = self.tools.list();
        let mut turn = vec![Message::user(user_message)];
        let mut final_content = None;
        self.last_tool_rounds = 0;

        for round in 0..=self.max_tool_rounds {
            let current_tools: &[ToolDefinition] = if round < self.max_tool_rounds {
                tool_defs.as_slice()
            } else {
                &[]
            };

            let mut request = Vec::with_capacity(self.memory.get().len() + turn.len() + 1);
            request.push(Message::system(&self.system_prompt));
            request.extend_from_slice(self.memory.get());
            request.extend_from_slice(&turn);

            let response = self
                .provider
                .chat(&request, current_tools, &self.params)
                .await?;

            if response.tool_calls.is_empty() {
                let content = response.content.unwrap_or_default();
                turn.push(Message::assistant(&content));
                final_content = Some(content);
                break;
            }

            self.last_tool_rounds = round + 1;
            tracing::info!(
                "Tool round {}/{}: {} tool call(s)",
                round + 1,
                self.max_tool_rounds,
                response.tool_calls.len()
            );

            let mut tool_results = Vec::with_capacity(response.tool_calls.len());
            for tc in &response.tool_calls {
                tracing::info!(
                    "  → {} ({})",
                    tc.function.name,
                    tc.function.arguments.chars().take(100).collect::<String>()
                );
                let output = match self.tools.get(&tc.function.name) {
                    Some(tool) => match tool.execute(&tc.function.arguments).await {
                        Ok(result) => truncate_output(result.output),
                        Err(e) => format!("Tool error: {e}"),
                    },
                    None => format!("Tool not found: {}", tc.function.name),
                };
                tool_results.push(Message::tool(output, &tc.id));
            }

            turn.push(Message::assistant_tool_calls(
                response.content.unwrap_or_default(),
                response.tool_calls,
            ));
            turn.extend(tool_results);
        }

        let final_content = match final_content {
            Some(content) => content,
            None => {
                // The no-tools round still answered with tool calls.
                let content = "The archives are silent on this matter.".to_string();
                turn.push(Message::assistant(&content));
                content
            }
        };

        self.memory.extend(turn);
        Ok(final_content)
    }

    pub fn memory(&self) -> &ChatMemoryBuffer {
        &self.memory
    }

    /// Tool rounds used by the last turn.
    pub fn last_tool_rounds(&self) -> usize {
        self.last_tool_rounds
    }
}

fn truncate_output(output: String) -> String {
    let total = output.chars().count();
    if total <= MAX_TOOL_OUTPUT_CHARS {
        return output;
    }
    let head: String = output.chars().take(MAX_TOOL_OUTPUT_CHARS).collect();
    format!("{head}...\n[truncated, {total} total chars]")
}
