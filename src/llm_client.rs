//! Shared client construction for OpenAI-compatible vision/chat APIs.
//!
//! Both the OCR provider and the remote extractor talk to the same
//! kind of endpoint (a chat/completions API in JSON- or vision-capable
//! mode), so they share one client constructor.

use async_openai::{Client, config::OpenAIConfig};

/// Build an OpenAI-compatible client using an explicit API key, rather
/// than reading it from the environment a second time — the key was
/// already validated once, by [`crate::config::Config::from_env`].
pub fn create_llm_client(api_key: &str) -> Client<OpenAIConfig> {
    let mut client_config = OpenAIConfig::new().with_api_key(api_key);
    if let Ok(api_base) = std::env::var("OPENAI_API_BASE") {
        client_config = client_config.with_api_base(api_base);
    }
    Client::with_config(client_config)
}
