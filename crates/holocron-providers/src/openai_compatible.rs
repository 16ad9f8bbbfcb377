//! Unified OpenAI-compatible chat provider.
//!
//! One struct serves every backend in the registry (Ollama, llama.cpp,
//! LM Studio, OpenAI). Backends differ only by base URL, auth style and key.

use async_trait::async_trait;
use holocron_core::config::HolocronConfig;
use holocron_core::error::{HolocronError, Result};
use holocron_core::traits::provider::{GenerateParams, Provider};
use holocron_core::types::{
    FunctionCall, Message, ModelInfo, ProviderResponse, ToolCall, ToolDefinition, Usage,
};
use serde_json::{Value, json};
use std::time::Duration;

use crate::provider_registry::{AuthStyle, ProviderConfig, resolve_base_url};

/// Error fragments servers return when a model cannot do function calling.
const NO_TOOL_SUPPORT: &[&str] = &[
    "does not support tools",
    "tool_use is not supported",
    "does not support function",
];

/// A chat provider for any OpenAI-compatible API.
pub struct OpenAiCompatibleProvider {
    name: String,
    api_key: String,
    /// e.g. `http://localhost:11434/v1`
    base_url: String,
    chat_path: String,
    models_path: String,
    auth_style: AuthStyle,
    default_models: Vec<ModelInfo>,
    client: reqwest::Client,
}

impl OpenAiCompatibleProvider {
    /// Create from a registry entry + config.
    ///
    /// - API key: `config.api_key` > registry env vars > empty
    /// - Base URL: `config.llm.endpoint` > env override > registry default
    pub fn from_registry(registry: &ProviderConfig, config: &HolocronConfig) -> Result<Self> {
        let api_key = if !config.api_key.is_empty() {
            config.api_key.clone()
        } else {
            registry
                .env_keys
                .iter()
                .find_map(|key| std::env::var(key).ok())
                .unwrap_or_default()
        };

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.llm.request_timeout_secs))
            .build()
            .map_err(|e| HolocronError::Http(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            name: registry.name.to_string(),
            api_key,
            base_url: resolve_base_url(registry, &config.llm.endpoint),
            chat_path: registry.chat_path.to_string(),
            models_path: registry.models_path.to_string(),
            auth_style: registry.auth_style,
            default_models: registry
                .default_models
                .iter()
                .map(|m| m.to_model_info(registry.name))
                .collect(),
            client,
        })
    }

    /// Create for a custom endpoint (e.g. `custom:http://gpu-box:8000/v1`).
    pub fn custom(endpoint: &str, config: &HolocronConfig) -> Result<Self> {
        let base_url = endpoint
            .strip_prefix("custom:")
            .unwrap_or(endpoint)
            .trim_end_matches('/')
            .to_string();
        let api_key = config.resolve_api_key();
        let auth_style = if api_key.is_empty() {
            AuthStyle::None
        } else {
            AuthStyle::Bearer
        };

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.llm.request_timeout_secs))
            .build()
            .map_err(|e| HolocronError::Http(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            name: "custom".to_string(),
            api_key,
            base_url,
            chat_path: "/chat/completions".to_string(),
            models_path: "/models".to_string(),
            auth_style,
            default_models: vec![],
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn apply_auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.auth_style {
            AuthStyle::Bearer if !self.api_key.is_empty() => {
                req.header("Authorization", format!("Bearer {}", self.api_key))
            }
            _ => req,
        }
    }

    async fn post(&self, url: &str, body: &Value) -> Result<reqwest::Response> {
        let req = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .json(body);
        self.apply_auth(req).send().await.map_err(|e| {
            HolocronError::Http(format!("{} connection failed ({}): {}", self.name, url, e))
        })
    }
}

/// Request body in the standard OpenAI chat format.
fn build_body(messages: &[Message], tools: &[ToolDefinition], params: &GenerateParams) -> Value {
    let mut body = json!({
        "model": params.model,
        "messages": messages,
        "temperature": params.temperature,
        "max_tokens": params.max_tokens,
        "top_p": params.top_p,
    });
    if !params.stop.is_empty() {
        body["stop"] = json!(params.stop);
    }
    if !tools.is_empty() {
        let tool_defs: Vec<Value> = tools
            .iter()
            .map(|t| {
                json!({
                    "type": "function",
                    "function": {
                        "name": t.name,
                        "description": t.description,
                        "parameters": t.parameters,
                    }
                })
            })
            .collect();
        body["tools"] = Value::Array(tool_defs);
    }
    body
}

/// Parse a chat completion response body.
fn parse_response(json: &Value) -> Result<ProviderResponse> {
    let choice = json["choices"]
        .get(0)
        .ok_or_else(|| HolocronError::Provider("No choices in response".into()))?;

    let content = choice["message"]["content"].as_str().map(String::from);

    let tool_calls = choice["message"]["tool_calls"]
        .as_array()
        .map(|calls| {
            calls
                .iter()
                .enumerate()
                .filter_map(|(i, t)| {
                    let name = t["function"]["name"].as_str()?.to_string();
                    // Some local servers send arguments as an object, not a string.
                    let arguments = match &t["function"]["arguments"] {
                        Value::String(s) => s.clone(),
                        Value::Null => "{}".to_string(),
                        other => other.to_string(),
                    };
                    let id = t["id"]
                        .as_str()
                        .filter(|id| !id.is_empty())
                        .map(String::from)
                        .unwrap_or_else(|| format!("call_{i}"));
                    Some(ToolCall {
                        id,
                        r#type: "function".to_string(),
                        function: FunctionCall { name, arguments },
                    })
                })
                .collect()
        })
        .unwrap_or_default();

    let usage = json["usage"].as_object().map(|u| {
        let field = |k: &str| u.get(k).and_then(|v| v.as_u64()).unwrap_or(0) as u32;
        Usage {
            prompt_tokens: field("prompt_tokens"),
            completion_tokens: field("completion_tokens"),
            total_tokens: field("total_tokens"),
        }
    });

    Ok(ProviderResponse {
        content,
        tool_calls,
        finish_reason: choice["finish_reason"].as_str().map(String::from),
        usage,
    })
}

#[async_trait]
impl Provider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn chat(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
        params: &GenerateParams,
    ) -> Result<ProviderResponse> {
        if self.auth_style != AuthStyle::None && self.api_key.is_empty() {
            return Err(HolocronError::ApiKeyMissing(self.name.clone()));
        }

        let url = format!("{}{}", self.base_url, self.chat_path);
        let mut body = build_body(messages, tools, params);
        let mut resp = self.post(&url, &body).await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();

            let unsupported = status.as_u16() == 400
                && !tools.is_empty()
                && NO_TOOL_SUPPORT.iter().any(|m| text.contains(m));
            if !unsupported {
                return Err(HolocronError::Provider(format!(
                    "{} API error {}: {}",
                    self.name, status, text
                )));
            }

            tracing::warn!(
                "⚠️ Model '{}' doesn't support tools — retrying without tools",
                params.model
            );
            if let Some(obj) = body.as_object_mut() {
                obj.remove("tools");
            }
            resp = self.post(&url, &body).await?;
            if !resp.status().is_success() {
                let status = resp.status();
                let text = resp.text().await.unwrap_or_default();
                return Err(HolocronError::Provider(format!(
                    "{} API error {} (retry without tools): {}",
                    self.name, status, text
                )));
            }
        }

        let json: Value = resp
            .json()
            .await
            .map_err(|e| HolocronError::Http(e.to_string()))?;
        let response = parse_response(&json)?;
        tracing::debug!(
            "🤖 {} replied ({} tool calls, finish: {:?})",
            self.name,
            response.tool_calls.len(),
            response.finish_reason
        );
        Ok(response)
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        let url = format!("{}{}", self.base_url, self.models_path);
        let req = self.apply_auth(self.client.get(&url));

        match req.send().await {
            Ok(r) if r.status().is_success() => {
                let json: Value = r.json().await.unwrap_or_default();
                let models: Vec<ModelInfo> = json["data"]
                    .as_array()
                    .map(|arr| {
                        arr.iter()
                            .filter_map(|m| {
                                let id = m["id"].as_str()?;
                                Some(ModelInfo {
                                    id: id.to_string(),
                                    name: id.to_string(),
                                    provider: self.name.clone(),
                                    context_length: 4096,
                                    max_output_tokens: Some(4096),
                                })
                            })
                            .collect()
                    })
                    .unwrap_or_default();

                if models.is_empty() {
                    Ok(self.default_models.clone())
                } else {
                    Ok(models)
                }
            }
            _ => Ok(self.default_models.clone()),
        }
    }

    async fn health_check(&self) -> Result<bool> {
        if self.auth_style != AuthStyle::None {
            return Ok(!self.api_key.is_empty());
        }
        let url = format!("{}{}", self.base_url, self.models_path);
        Ok(self.client.get(&url).send().await.is_ok())
    }
}
