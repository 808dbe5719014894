//! The edge-hosted LLM extractor.
//!
//! spec §4.3 describes `EdgeExtractor` as calling "an edge-hosted LLM
//! binding (model identifier pinned by deployment)". The original
//! deployment platform injects that binding as a runtime handle; there
//! is no equivalent outside it, so we model the binding as a trait
//! object (`EdgeLlmBinding`) supplied by the factory — this is the
//! Rust-native re-expression of "runtime-injected handle" (spec §6).

use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestSystemMessageContent, ChatCompletionRequestUserMessageArgs,
        ChatCompletionRequestUserMessageContent, CreateChatCompletionRequestArgs, FinishReason,
        ResponseFormat,
    },
};

use super::{
    Extractor, ExtractionRequest,
    prompt::{EXTRACTION_SYSTEM_PROMPT, build_extraction_prompt},
    scoring::{apply_consistency_penalty, blend_confidence, finish_reason_quality},
};
use crate::{
    prelude::*,
    retry::{IsKnownTransient, RetryPolicy, retry_with_policy},
    schema::{ExtractedDocument, json_schema_for_kind, validator_for_kind},
};

/// A single call to the edge-hosted model: system + user prompt in,
/// parsed JSON plus a finish-reason quality out.
#[async_trait::async_trait]
pub trait EdgeLlmBinding: Send + Sync {
    async fn run(&self, system_prompt: &str, user_prompt: &str) -> Result<(Value, Option<FinishReason>)>;
}

/// An `EdgeLlmBinding` that calls an OpenAI-compatible endpoint in
/// JSON-object mode, standing in for a true edge-runtime binding.
pub struct OpenAiEdgeBinding {
    client: Client<OpenAIConfig>,
    model: String,
    retry_policy: RetryPolicy,
}

impl OpenAiEdgeBinding {
    pub fn new(client: Client<OpenAIConfig>, model: String, retry_policy: RetryPolicy) -> Self {
        Self {
            client,
            model,
            retry_policy,
        }
    }
}

#[async_trait::async_trait]
impl EdgeLlmBinding for OpenAiEdgeBinding {
    async fn run(&self, system_prompt: &str, user_prompt: &str) -> Result<(Value, Option<FinishReason>)> {
        let attempt = || async {
            let system = ChatCompletionRequestMessage::System(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(ChatCompletionRequestSystemMessageContent::Text(
                        system_prompt.to_string(),
                    ))
                    .build()
                    .map_err(EdgeCallError::Build)?,
            );
            let user = ChatCompletionRequestMessage::User(
                ChatCompletionRequestUserMessageArgs::default()
                    .content(ChatCompletionRequestUserMessageContent::Text(
                        user_prompt.to_string(),
                    ))
                    .build()
                    .map_err(EdgeCallError::Build)?,
            );
            let req = CreateChatCompletionRequestArgs::default()
                .model(self.model.clone())
                .messages(vec![system, user])
                .response_format(ResponseFormat::JsonObject)
                .temperature(0.1)
                .build()
                .map_err(EdgeCallError::Build)?;
            let response = self
                .client
                .chat()
                .create(req)
                .await
                .map_err(EdgeCallError::Api)?;
            let choice = response
                .choices
                .into_iter()
                .next()
                .ok_or(EdgeCallError::NoChoices)?;
            let content = choice.message.content.unwrap_or_default();
            let raw: Value = serde_json::from_str(&content)
                .map_err(|e| EdgeCallError::Parse(e.to_string()))?;
            Ok::<_, EdgeCallError>((raw, choice.finish_reason))
        };

        retry_with_policy(&self.retry_policy, attempt)
            .await
            .map_err(|err| match err {
                EdgeCallError::Api(api_err) if api_err.is_known_transient() => {
                    ScanError::ExtractionTransient(api_err.to_string())
                }
                EdgeCallError::Api(api_err) => ScanError::ExtractionParse(api_err.to_string()),
                EdgeCallError::Parse(message) => ScanError::ExtractionParse(message),
                other => ScanError::ExtractionParse(other.to_string()),
            })
    }
}

/// Errors from a single edge-binding attempt, before classification into
/// a [`ScanError`] — the same shape as `remote.rs`'s `ExtractCallError`,
/// since both extractors share the same vendor API underneath.
#[derive(Debug, thiserror::Error)]
enum EdgeCallError {
    #[error("failed to build edge extraction request: {0}")]
    Build(async_openai::error::OpenAIError),
    #[error(transparent)]
    Api(async_openai::error::OpenAIError),
    #[error("edge extraction response was not valid JSON: {0}")]
    Parse(String),
    #[error("edge extraction response contained no choices")]
    NoChoices,
}

impl IsKnownTransient for EdgeCallError {
    fn is_known_transient(&self) -> bool {
        match self {
            EdgeCallError::Api(err) => err.is_known_transient(),
            EdgeCallError::Build(_) | EdgeCallError::Parse(_) | EdgeCallError::NoChoices => false,
        }
    }
}

/// The edge extractor (spec §4.3, `EdgeExtractor`): equivalent prompt
/// and JSON-response constraint as [`super::remote::RemoteExtractor`],
/// dispatched through an injected [`EdgeLlmBinding`] rather than a
/// direct HTTP client.
pub struct EdgeExtractor {
    binding: std::sync::Arc<dyn EdgeLlmBinding>,
}

impl EdgeExtractor {
    pub fn new(binding: std::sync::Arc<dyn EdgeLlmBinding>) -> Self {
        Self { binding }
    }
}

#[async_trait::async_trait]
impl Extractor for EdgeExtractor {
    #[instrument(level = "debug", skip_all)]
    async fn extract(&self, request: &ExtractionRequest) -> Result<ExtractedDocument> {
        let schema = json_schema_for_kind(request.kind)?;
        let validator = validator_for_kind(request.kind)?;
        let user_prompt = build_extraction_prompt(request.kind, &request.markdown, &schema)?;

        let (raw, finish_reason) = self
            .binding
            .run(EXTRACTION_SYSTEM_PROMPT, &user_prompt)
            .await?;

        let model_stated_confidence = raw.get("confidence").and_then(Value::as_f64).unwrap_or(0.5);
        let mut document = crate::schema::parse_and_validate(request.kind, &validator, raw)?;
        let blended = blend_confidence(
            finish_reason_quality(finish_reason),
            document.structural_completeness(),
            model_stated_confidence,
        );
        document.set_confidence(blended);
        apply_consistency_penalty(&mut document);
        Ok(document)
    }
}
