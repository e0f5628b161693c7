use serde::{Deserialize, Serialize};

/// Supported AI provider names.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AIProviderName {
    OpenRouter,
    OpenAI,
    Anthropic,
    DeepSeek,
}

impl AIProviderName {
    pub fn as_str(&self) -> &'static str {
        match self {
            AIProviderName::OpenRouter => "openrouter",
            AIProviderName::OpenAI => "openai",
            AIProviderName::Anthropic => "anthropic",
            AIProviderName::DeepSeek => "deepseek",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "openrouter" => Some(AIProviderName::OpenRouter),
            "openai" => Some(AIProviderName::OpenAI),
            "anthropic" => Some(AIProviderName::Anthropic),
            "deepseek" => Some(AIProviderName::DeepSeek),
            _ => None,
        }
    }
}

/// Configuration for an active AI provider connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AIProvider {
    pub name: AIProviderName,
    pub model: String,
    pub api_endpoint: String,
    pub max_tokens: u32,
}

/// Context passed to the assistant from the current page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AIContext {
    pub page_url: Option<String>,
    pub page_title: Option<String>,
    pub page_source: Option<String>,
}

/// A single message in the chat history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AIChatMessage {
    pub id: String,
    pub role: ChatRole,
    pub content: String,
    pub timestamp: i64,
    pub provider: AIProviderName,
    pub model: String,
    pub tokens_used: Option<u32>,
}

/// Role of a participant in a chat conversation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    User,
    Assistant,
    System,
}

/// Aggregated token usage for the session.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub total_tokens: u64,
    pub message_count: u64,
}

/// Static configuration for an AI provider including available models.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AIProviderConfig {
    pub name: AIProviderName,
    pub display_name: String,
    pub api_endpoint: String,
    pub models: Vec<String>,
    pub supports_streaming: bool,
}
