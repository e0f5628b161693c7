//! Unit tests for the chat assistant's offline behavior: provider registry,
//! key management, error short-circuits, and usage accounting. The network
//! path itself is exercised only up to request construction; no test here
//! talks to a live provider.

use std::sync::mpsc;
use std::time::Duration;

use osrbrowser::services::ai_assistant::{AIAssistant, AIAssistantTrait};
use osrbrowser::types::ai::{AIProvider, AIProviderName};
use osrbrowser::types::errors::AIError;

fn assistant() -> AIAssistant {
    AIAssistant::new().expect("assistant init")
}

fn provider(name: AIProviderName) -> AIProvider {
    AIProvider {
        name,
        model: "test-model".to_string(),
        api_endpoint: "http://127.0.0.1:9/unreachable".to_string(),
        max_tokens: 64,
    }
}

#[test]
fn test_registry_lists_all_providers() {
    let ai = assistant();
    let providers = ai.available_providers();
    assert_eq!(providers.len(), 4);
    for name in [
        AIProviderName::OpenRouter,
        AIProviderName::OpenAI,
        AIProviderName::Anthropic,
        AIProviderName::DeepSeek,
    ] {
        let config = providers.iter().find(|p| p.name == name).unwrap();
        assert!(!config.models.is_empty());
        assert!(config.api_endpoint.starts_with("https://"));
    }
}

#[test]
fn test_api_key_storage() {
    let ai = assistant();
    assert_eq!(ai.api_key(AIProviderName::OpenAI), None);

    ai.set_api_key(AIProviderName::OpenAI, "sk-first");
    ai.set_api_key(AIProviderName::OpenAI, "sk-second");
    assert_eq!(ai.api_key(AIProviderName::OpenAI).as_deref(), Some("sk-second"));
    assert_eq!(ai.api_key(AIProviderName::DeepSeek), None);
}

#[test]
fn test_send_without_provider_fails_fast() {
    let ai = assistant();
    let (tx, rx) = mpsc::channel();
    ai.send_message("hello", None, Box::new(move |r| tx.send(r).unwrap()));

    let result = rx.recv_timeout(Duration::from_millis(1000)).unwrap();
    assert!(matches!(result, Err(AIError::NoProvider)));
    // Nothing was recorded.
    assert!(ai.chat_history().is_empty());
}

#[test]
fn test_send_without_key_fails_fast() {
    let ai = assistant();
    ai.set_provider(provider(AIProviderName::Anthropic));

    let (tx, rx) = mpsc::channel();
    ai.send_message("hello", None, Box::new(move |r| tx.send(r).unwrap()));

    let result = rx.recv_timeout(Duration::from_millis(1000)).unwrap();
    match result {
        Err(AIError::MissingApiKey(name)) => assert_eq!(name, "anthropic"),
        other => panic!("expected MissingApiKey, got {:?}", other),
    }
    assert!(ai.chat_history().is_empty());
}

#[test]
fn test_unreachable_endpoint_reports_network_error() {
    let ai = assistant();
    ai.set_provider(provider(AIProviderName::OpenAI));
    ai.set_api_key(AIProviderName::OpenAI, "sk-test");

    let (tx, rx) = mpsc::channel();
    ai.send_message("hello", None, Box::new(move |r| tx.send(r).unwrap()));

    let result = rx.recv_timeout(Duration::from_secs(10)).unwrap();
    assert!(matches!(result, Err(AIError::NetworkError(_))));

    // The user's message is kept even though the request failed, so the
    // conversation is not lost on retry.
    let history = ai.chat_history();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].content, "hello");
}

#[test]
fn test_token_usage_starts_empty() {
    let ai = assistant();
    let usage = ai.token_usage();
    assert_eq!(usage.total_tokens, 0);
    assert_eq!(usage.message_count, 0);
}

#[test]
fn test_clear_history() {
    let ai = assistant();
    ai.set_provider(provider(AIProviderName::OpenAI));
    ai.set_api_key(AIProviderName::OpenAI, "sk-test");

    let (tx, rx) = mpsc::channel();
    ai.send_message("will fail", None, Box::new(move |r| tx.send(r).unwrap()));
    let _ = rx.recv_timeout(Duration::from_secs(10));

    assert!(!ai.chat_history().is_empty());
    ai.clear_chat_history();
    assert!(ai.chat_history().is_empty());
    assert_eq!(ai.token_usage().message_count, 0);
}
