//! The remote (vendor chat API, JSON mode) extractor.

use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestSystemMessageContent, ChatCompletionRequestUserMessageArgs,
        ChatCompletionRequestUserMessageContent, CreateChatCompletionRequestArgs,
        ResponseFormat, ResponseFormatJsonSchema,
    },
};

use super::{
    Extractor, ExtractionRequest,
    prompt::{EXTRACTION_SYSTEM_PROMPT, build_extraction_prompt},
    scoring::{apply_consistency_penalty, blend_confidence, finish_reason_quality},
};
use crate::{
    llm_client::create_llm_client,
    prelude::*,
    retry::{IsKnownTransient, RetryPolicy, retry_with_policy},
    schema::{ExtractedDocument, json_schema_for_kind, validator_for_kind},
};

/// The remote extractor: calls the vendor's chat/completion API in
/// JSON mode (spec §4.3, `RemoteExtractor`).
pub struct RemoteExtractor {
    client: Client<OpenAIConfig>,
    model: String,
    retry_policy: RetryPolicy,
}

impl RemoteExtractor {
    pub fn new(api_key: &str, model: String, retry_policy: RetryPolicy) -> Self {
        Self {
            client: create_llm_client(api_key),
            model,
            retry_policy,
        }
    }
}

#[async_trait::async_trait]
impl Extractor for RemoteExtractor {
    #[instrument(level = "debug", skip_all)]
    async fn extract(&self, request: &ExtractionRequest) -> Result<ExtractedDocument> {
        let schema = json_schema_for_kind(request.kind)?;
        let validator = validator_for_kind(request.kind)?;
        let user_prompt = build_extraction_prompt(request.kind, &request.markdown, &schema)?;

        let attempt = || async {
            let messages = build_messages(&user_prompt)?;
            let json_schema = ResponseFormatJsonSchema {
                name: request.kind.as_str().to_string(),
                schema: Some(schema.clone()),
                strict: Some(true),
                description: None,
            };
            let req = CreateChatCompletionRequestArgs::default()
                .model(self.model.clone())
                .messages(messages)
                .response_format(ResponseFormat::JsonSchema { json_schema })
                .temperature(0.1)
                .build()
                .map_err(ExtractCallError::Build)?;
            trace!(?req, "extraction request");
            let response = self
                .client
                .chat()
                .create(req)
                .await
                .map_err(ExtractCallError::Api)?;
            let choice = response
                .choices
                .into_iter()
                .next()
                .ok_or(ExtractCallError::NoChoices)?;
            let content = choice.message.content.unwrap_or_default();
            let raw: Value = serde_json::from_str(&content)
                .map_err(|e| ExtractCallError::Parse(e.to_string()))?;
            Ok::<_, ExtractCallError>((raw, choice.finish_reason))
        };

        let (raw, finish_reason) = retry_with_policy(&self.retry_policy, attempt)
            .await
            .map_err(|err| match err {
                ExtractCallError::Api(api_err) if api_err.is_known_transient() => {
                    ScanError::ExtractionTransient(api_err.to_string())
                }
                ExtractCallError::Api(api_err) => ScanError::ExtractionParse(api_err.to_string()),
                ExtractCallError::Parse(message) => ScanError::ExtractionParse(message),
                other => ScanError::ExtractionParse(other.to_string()),
            })?;

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

#[derive(Debug, thiserror::Error)]
enum ExtractCallError {
    #[error("failed to build extraction request: {0}")]
    Build(async_openai::error::OpenAIError),
    #[error(transparent)]
    Api(async_openai::error::OpenAIError),
    #[error("extraction response was not valid JSON: {0}")]
    Parse(String),
    #[error("extraction response contained no choices")]
    NoChoices,
}

impl IsKnownTransient for ExtractCallError {
    fn is_known_transient(&self) -> bool {
        match self {
            ExtractCallError::Api(err) => err.is_known_transient(),
            ExtractCallError::Build(_) | ExtractCallError::Parse(_) | ExtractCallError::NoChoices => {
                false
            }
        }
    }
}

fn build_messages(
    user_prompt: &str,
) -> std::result::Result<Vec<ChatCompletionRequestMessage>, ExtractCallError> {
    let system = ChatCompletionRequestMessage::System(
        ChatCompletionRequestSystemMessageArgs::default()
            .content(ChatCompletionRequestSystemMessageContent::Text(
                EXTRACTION_SYSTEM_PROMPT.to_string(),
            ))
            .build()
            .map_err(ExtractCallError::Build)?,
    );
    let user = ChatCompletionRequestMessage::User(
        ChatCompletionRequestUserMessageArgs::default()
            .content(ChatCompletionRequestUserMessageContent::Text(
                user_prompt.to_string(),
            ))
            .build()
            .map_err(ExtractCallError::Build)?,
    );
    Ok(vec![system, user])
}
