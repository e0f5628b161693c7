//! Chat assistant backing the side panel.
//!
//! Keeps the provider registry, per-provider API keys (decrypted into
//! memory at startup, sealed at rest by `secret_store`), the in-memory chat
//! history, and the actual completion request path. Requests run on a small
//! private tokio runtime so the GUI thread never blocks; completion is
//! delivered through a callback the shell turns into a user event.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::{debug, warn};
use uuid::Uuid;

use crate::types::ai::{
    AIChatMessage, AIContext, AIProvider, AIProviderConfig, AIProviderName, ChatRole, TokenUsage,
};
use crate::types::errors::AIError;

/// How much page source is forwarded as context, in characters.
const MAX_CONTEXT_SOURCE_CHARS: usize = 12_000;

/// How many trailing history messages are replayed per request.
const MAX_HISTORY_MESSAGES: usize = 20;

/// Invoked once with the assistant's reply (or the failure). Runs on the
/// assistant's runtime thread, NOT the GUI thread.
pub type CompletionCallback = Box<dyn FnOnce(Result<AIChatMessage, AIError>) + Send + 'static>;

/// Trait defining the chat assistant operations.
pub trait AIAssistantTrait {
    fn set_provider(&self, provider: AIProvider);
    fn active_provider(&self) -> Option<AIProvider>;
    fn set_api_key(&self, provider: AIProviderName, api_key: &str);
    fn api_key(&self, provider: AIProviderName) -> Option<String>;
    fn send_message(&self, text: &str, context: Option<AIContext>, done: CompletionCallback);
    fn chat_history(&self) -> Vec<AIChatMessage>;
    fn clear_chat_history(&self);
    fn token_usage(&self) -> TokenUsage;
    fn available_providers(&self) -> Vec<AIProviderConfig>;
}

struct AssistantState {
    active: Option<AIProvider>,
    api_keys: HashMap<AIProviderName, String>,
    history: Vec<AIChatMessage>,
}

/// In-memory chat assistant with an async request path.
pub struct AIAssistant {
    runtime: tokio::runtime::Runtime,
    client: reqwest::Client,
    state: Arc<Mutex<AssistantState>>,
}

impl AIAssistant {
    pub fn new() -> Result<Self, AIError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .map_err(|e| AIError::ProviderError(format!("runtime init failed: {}", e)))?;

        Ok(Self {
            runtime,
            client: reqwest::Client::new(),
            state: Arc::new(Mutex::new(AssistantState {
                active: None,
                api_keys: HashMap::new(),
                history: Vec::new(),
            })),
        })
    }

    fn now() -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs() as i64
    }

    fn message(
        role: ChatRole,
        content: String,
        provider: AIProviderName,
        model: &str,
        tokens_used: Option<u32>,
    ) -> AIChatMessage {
        AIChatMessage {
            id: Uuid::new_v4().to_string(),
            role,
            content,
            timestamp: Self::now(),
            provider,
            model: model.to_string(),
            tokens_used,
        }
    }

    /// Flatten optional page context into a system prompt.
    fn system_prompt(context: Option<&AIContext>) -> String {
        let mut prompt =
            "You are a browsing assistant embedded in a desktop browser.".to_string();
        let Some(ctx) = context else {
            return prompt;
        };
        if let Some(url) = &ctx.page_url {
            prompt.push_str(&format!(" The user is currently viewing {}", url));
            if let Some(title) = &ctx.page_title {
                prompt.push_str(&format!(" ({})", title));
            }
            prompt.push('.');
        }
        if let Some(source) = &ctx.page_source {
            let clipped: String = source.chars().take(MAX_CONTEXT_SOURCE_CHARS).collect();
            prompt.push_str("\n\nPage source:\n");
            prompt.push_str(&clipped);
        }
        prompt
    }

    /// Serialize history into the wire `messages` array shared by every
    /// provider dialect (system prompt is passed separately for Anthropic).
    fn wire_messages(history: &[AIChatMessage], system: Option<&str>) -> Vec<serde_json::Value> {
        let mut messages = Vec::new();
        if let Some(system) = system {
            messages.push(serde_json::json!({"role": "system", "content": system}));
        }
        let tail = history.len().saturating_sub(MAX_HISTORY_MESSAGES);
        for msg in &history[tail..] {
            let role = match msg.role {
                ChatRole::User => "user",
                ChatRole::Assistant => "assistant",
                ChatRole::System => continue,
            };
            messages.push(serde_json::json!({"role": role, "content": msg.content}));
        }
        messages
    }

    async fn request_completion(
        client: reqwest::Client,
        provider: AIProvider,
        api_key: String,
        messages: Vec<serde_json::Value>,
        system: String,
    ) -> Result<(String, Option<u32>), AIError> {
        let is_anthropic = provider.name == AIProviderName::Anthropic;

        let body = if is_anthropic {
            serde_json::json!({
                "model": provider.model,
                "max_tokens": provider.max_tokens,
                "system": system,
                "messages": messages,
            })
        } else {
            serde_json::json!({
                "model": provider.model,
                "max_tokens": provider.max_tokens,
                "messages": messages,
            })
        };

        let mut request = client.post(&provider.api_endpoint).json(&body);
        request = if is_anthropic {
            request
                .header("x-api-key", api_key)
                .header("anthropic-version", "2023-06-01")
        } else {
            request.bearer_auth(api_key)
        };

        let response = request
            .send()
            .await
            .map_err(|e| AIError::NetworkError(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 429 {
            return Err(AIError::RateLimited(format!("{}", status)));
        }
        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AIError::ProviderError(format!("unparseable response: {}", e)))?;
        if !status.is_success() {
            let detail = payload
                .pointer("/error/message")
                .and_then(|v| v.as_str())
                .unwrap_or("no detail");
            return Err(AIError::ProviderError(format!("{}: {}", status, detail)));
        }

        let (content, tokens) = if is_anthropic {
            let content = payload
                .pointer("/content/0/text")
                .and_then(|v| v.as_str())
                .ok_or_else(|| AIError::ProviderError("response missing content".to_string()))?;
            let tokens = payload
                .pointer("/usage/output_tokens")
                .and_then(|v| v.as_u64())
                .and_then(|out| {
                    payload
                        .pointer("/usage/input_tokens")
                        .and_then(|v| v.as_u64())
                        .map(|inp| (inp + out) as u32)
                });
            (content.to_string(), tokens)
        } else {
            let content = payload
                .pointer("/choices/0/message/content")
                .and_then(|v| v.as_str())
                .ok_or_else(|| AIError::ProviderError("response missing content".to_string()))?;
            let tokens = payload
                .pointer("/usage/total_tokens")
                .and_then(|v| v.as_u64())
                .map(|t| t as u32);
            (content.to_string(), tokens)
        };

        Ok((content, tokens))
    }
}

impl AIAssistantTrait for AIAssistant {
    fn set_provider(&self, provider: AIProvider) {
        self.state.lock().unwrap().active = Some(provider);
    }

    fn active_provider(&self) -> Option<AIProvider> {
        self.state.lock().unwrap().active.clone()
    }

    fn set_api_key(&self, provider: AIProviderName, api_key: &str) {
        self.state
            .lock()
            .unwrap()
            .api_keys
            .insert(provider, api_key.to_string());
    }

    fn api_key(&self, provider: AIProviderName) -> Option<String> {
        self.state.lock().unwrap().api_keys.get(&provider).cloned()
    }

    /// Record the user message and fire the completion request. `done` is
    /// invoked exactly once, on the runtime thread.
    fn send_message(&self, text: &str, context: Option<AIContext>, done: CompletionCallback) {
        let (provider, api_key, messages, system) = {
            let mut state = self.state.lock().unwrap();

            let Some(provider) = state.active.clone() else {
                drop(state);
                done(Err(AIError::NoProvider));
                return;
            };
            let Some(api_key) = state.api_keys.get(&provider.name).cloned() else {
                drop(state);
                done(Err(AIError::MissingApiKey(provider.name.as_str().to_string())));
                return;
            };

            state.history.push(Self::message(
                ChatRole::User,
                text.to_string(),
                provider.name,
                &provider.model,
                None,
            ));

            let system = Self::system_prompt(context.as_ref());
            let messages = Self::wire_messages(
                &state.history,
                // OpenAI-style dialects take the system prompt in-band.
                (provider.name != AIProviderName::Anthropic).then_some(system.as_str()),
            );
            (provider, api_key, messages, system)
        };

        debug!(provider = provider.name.as_str(), model = %provider.model, "sending chat request");

        let client = self.client.clone();
        let state = Arc::clone(&self.state);
        self.runtime.spawn(async move {
            let result =
                Self::request_completion(client, provider.clone(), api_key, messages, system)
                    .await;

            let result = result.map(|(content, tokens)| {
                let reply = Self::message(
                    ChatRole::Assistant,
                    content,
                    provider.name,
                    &provider.model,
                    tokens,
                );
                state.lock().unwrap().history.push(reply.clone());
                reply
            });

            if let Err(e) = &result {
                warn!(error = %e, "chat request failed");
            }
            done(result);
        });
    }

    fn chat_history(&self) -> Vec<AIChatMessage> {
        self.state.lock().unwrap().history.clone()
    }

    fn clear_chat_history(&self) {
        self.state.lock().unwrap().history.clear();
    }

    fn token_usage(&self) -> TokenUsage {
        let state = self.state.lock().unwrap();
        TokenUsage {
            total_tokens: state
                .history
                .iter()
                .filter_map(|m| m.tokens_used)
                .map(u64::from)
                .sum(),
            message_count: state.history.len() as u64,
        }
    }

    fn available_providers(&self) -> Vec<AIProviderConfig> {
        vec![
            AIProviderConfig {
                name: AIProviderName::OpenRouter,
                display_name: "OpenRouter".to_string(),
                api_endpoint: "https://openrouter.ai/api/v1/chat/completions".to_string(),
                models: vec![
                    "openai/gpt-4o".to_string(),
                    "anthropic/claude-3.5-sonnet".to_string(),
                    "google/gemini-pro".to_string(),
                ],
                supports_streaming: true,
            },
            AIProviderConfig {
                name: AIProviderName::OpenAI,
                display_name: "OpenAI".to_string(),
                api_endpoint: "https://api.openai.com/v1/chat/completions".to_string(),
                models: vec!["gpt-4o".to_string(), "gpt-4o-mini".to_string()],
                supports_streaming: true,
            },
            AIProviderConfig {
                name: AIProviderName::Anthropic,
                display_name: "Anthropic".to_string(),
                api_endpoint: "https://api.anthropic.com/v1/messages".to_string(),
                models: vec![
                    "claude-3-5-sonnet-20241022".to_string(),
                    "claude-3-haiku-20240307".to_string(),
                ],
                supports_streaming: true,
            },
            AIProviderConfig {
                name: AIProviderName::DeepSeek,
                display_name: "DeepSeek".to_string(),
                api_endpoint: "https://api.deepseek.com/v1/chat/completions".to_string(),
                models: vec!["deepseek-chat".to_string(), "deepseek-coder".to_string()],
                supports_streaming: true,
            },
        ]
    }
}
