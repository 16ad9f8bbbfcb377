//! Chat session — the visible conversation plus the agent behind it.

use holocron_core::error::Result;
use holocron_core::types::Role;
use serde::Serialize;
use std::sync::Arc;

use crate::{Agent, AgentFactory};

/// A message as shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// One user's conversation: visible history and a private agent.
pub struct ChatSession {
    factory: Arc<AgentFactory>,
    agent: Agent,
    history: Vec<ChatMessage>,
}

impl ChatSession {
    pub fn new(factory: Arc<AgentFactory>) -> Self {
        let agent = factory.new_agent();
        let history = vec![ChatMessage::assistant(factory.greeting())];
        Self {
            factory,
            agent,
            history,
        }
    }

    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    pub fn agent(&self) -> &Agent {
        &self.agent
    }

    /// Send a prompt. Both sides of the exchange land in the history; a
    /// failed turn is recorded as `Error: ...` and the error is returned.
    pub async fn send(&mut self, prompt: &str) -> Result<String> {
        self.history.push(ChatMessage::user(prompt));
        match self.agent.chat(prompt).await {
            Ok(reply) => {
                self.history.push(ChatMessage::assistant(&reply));
                Ok(reply)
            }
            Err(e) => {
                tracing::error!("❌ Chat turn failed: {e}");
                self.history.push(ChatMessage::assistant(format!("Error: {e}")));
                Err(e)
            }
        }
    }

    /// Back to the greeting, with a fresh agent and empty memory.
    pub fn clear(&mut self) {
        self.history = vec![ChatMessage::assistant(self.factory.greeting())];
        self.agent = self.factory.new_agent();
        tracing::info!("🧹 Chat history cleared");
    }
}
