//! The remote (vendor vision-model) OCR provider.

use std::sync::Arc;

use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestMessageContentPartImageArgs,
        ChatCompletionRequestMessageContentPartTextArgs,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestSystemMessageContent,
        ChatCompletionRequestUserMessageArgs, ChatCompletionRequestUserMessageContent,
        ChatCompletionRequestUserMessageContentPart, CreateChatCompletionRequestArgs,
        FinishReason,
    },
};
use leaky_bucket::RateLimiter;

use super::{OcrPage, OcrProvider, synthesize_confidence};
use crate::{
    document::Document,
    llm_client::create_llm_client,
    prelude::*,
    retry::{IsKnownTransient, RetryPolicy, retry_with_policy},
};

/// System prompt instructing the vision model to transcribe, not
/// interpret, the document.
const OCR_SYSTEM_PROMPT: &str = "You are a precise OCR engine. Transcribe every line of \
visible text in the provided image or PDF page into clean Markdown, preserving \
reading order and table structure where apparent. Do not summarize, translate, \
or invent text that is not visibly present. If the page is blank or unreadable, \
return an empty response.";

/// The remote OCR provider: calls the vendor's vision-capable chat
/// model to transcribe each document (spec §4.2).
pub struct RemoteOcrProvider {
    client: Client<OpenAIConfig>,
    model: String,
    retry_policy: RetryPolicy,
    rate_limiter: Arc<RateLimiter>,
}

impl RemoteOcrProvider {
    /// Construct a new provider bound to a pinned OCR model.
    pub fn new(
        api_key: &str,
        model: String,
        retry_policy: RetryPolicy,
        rate_limiter: Arc<RateLimiter>,
    ) -> Self {
        Self {
            client: create_llm_client(api_key),
            model,
            retry_policy,
            rate_limiter,
        }
    }

    #[instrument(level = "debug", skip_all)]
    async fn ocr_one(&self, document: &Document) -> Result<Vec<OcrPage>> {
        self.rate_limiter.acquire_one().await;

        let data_url = document.to_data_url();
        let attempt = || async {
            let messages = build_messages(data_url.clone())?;
            let req = CreateChatCompletionRequestArgs::default()
                .model(self.model.clone())
                .messages(messages)
                .temperature(0.0)
                .build()
                .map_err(OcrCallError::Build)?;
            trace!(?req, "OCR request");
            let response = self
                .client
                .chat()
                .create(req)
                .await
                .map_err(OcrCallError::Api)?;
            let choice = response
                .choices
                .into_iter()
                .next()
                .ok_or(OcrCallError::NoChoices)?;
            let text = choice.message.content.unwrap_or_default();
            let finish_reason_is_stop =
                matches!(choice.finish_reason, Some(FinishReason::Stop) | None);
            let confidence = synthesize_confidence(finish_reason_is_stop, text.trim().is_empty());
            Ok::<_, OcrCallError>(OcrPage {
                text,
                confidence,
                bounding_box: None,
            })
        };

        let page = retry_with_policy(&self.retry_policy, attempt)
            .await
            .map_err(|err| match err {
                OcrCallError::Api(api_err) if api_err.is_known_transient() => {
                    ScanError::OcrTransient(api_err.to_string())
                }
                OcrCallError::Api(api_err) => ScanError::OcrPermanent(api_err.to_string()),
                other => ScanError::OcrPermanent(other.to_string()),
            })?;
        Ok(vec![page])
    }
}

#[async_trait::async_trait]
impl OcrProvider for RemoteOcrProvider {
    async fn process_documents(&self, documents: &[Document]) -> Result<Vec<Vec<OcrPage>>> {
        let mut results = Vec::with_capacity(documents.len());
        for document in documents {
            results.push(self.ocr_one(document).await?);
        }
        Ok(results)
    }
}

/// Errors from a single OCR attempt, before classification into a
/// [`ScanError`].
#[derive(Debug, thiserror::Error)]
enum OcrCallError {
    #[error("failed to build OCR request: {0}")]
    Build(async_openai::error::OpenAIError),
    #[error(transparent)]
    Api(async_openai::error::OpenAIError),
    #[error("OCR response contained no choices")]
    NoChoices,
}

impl IsKnownTransient for OcrCallError {
    fn is_known_transient(&self) -> bool {
        match self {
            OcrCallError::Api(err) => err.is_known_transient(),
            OcrCallError::Build(_) | OcrCallError::NoChoices => false,
        }
    }
}

fn build_messages(data_url: String) -> std::result::Result<Vec<ChatCompletionRequestMessage>, OcrCallError> {
    let system = ChatCompletionRequestMessage::System(
        ChatCompletionRequestSystemMessageArgs::default()
            .content(ChatCompletionRequestSystemMessageContent::Text(
                OCR_SYSTEM_PROMPT.to_string(),
            ))
            .build()
            .map_err(OcrCallError::Build)?,
    );
    let text_part = ChatCompletionRequestUserMessageContentPart::Text(
        ChatCompletionRequestMessageContentPartTextArgs::default()
            .text("Transcribe this document to Markdown.")
            .build()
            .map_err(OcrCallError::Build)?,
    );
    let image_part = ChatCompletionRequestUserMessageContentPart::ImageUrl(
        ChatCompletionRequestMessageContentPartImageArgs::default()
            .image_url(data_url)
            .build()
            .map_err(OcrCallError::Build)?,
    );
    let user = ChatCompletionRequestMessage::User(
        ChatCompletionRequestUserMessageArgs::default()
            .content(ChatCompletionRequestUserMessageContent::Array(vec![
                text_part, image_part,
            ]))
            .build()
            .map_err(OcrCallError::Build)?,
    );
    Ok(vec![system, user])
}
