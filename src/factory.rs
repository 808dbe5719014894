//! Composition root / dependency injection (spec §4.7).
//!
//! One function builds a fully wired [`Scanner`] per document kind from
//! [`Config`], validating eagerly (API key format, retry policy shape)
//! and never contacting an external service during construction —
//! mirroring how the reference CLI's `OpenAiDriver::new` only builds a
//! client, and never makes a network call, at construction time.

use std::sync::Arc;

use leaky_bucket::RateLimiter;

use crate::{
    config::{Config, ExtractorKind},
    document::DocumentKind,
    extraction::{Extractor, edge::OpenAiEdgeBinding, edge::EdgeExtractor, remote::RemoteExtractor},
    llm_client::create_llm_client,
    ocr::{OcrProvider, remote::RemoteOcrProvider},
    prelude::*,
    scanner::{Scanner, check::CheckScanner, receipt::ReceiptScanner},
    schema::validate::validate_retry_policy,
};

/// Build a [`Scanner`] for the given document kind, fully wired from
/// `config` (spec §4.7's `createScanner(type, config) -> Scanner`).
pub fn create_scanner(kind: DocumentKind, config: &Config) -> Result<Box<dyn Scanner>> {
    validate_retry_policy(&config.retry_policy)?;
    crate::config::validate_api_key_format(&config.ocr_api_key)?;

    let rate_limiter = Arc::new(config.ocr_rate_limit.to_rate_limiter());
    let ocr = create_ocr_provider(config, rate_limiter);
    let extractor = create_extractor(config)?;

    Ok(match kind {
        DocumentKind::Check => Box::new(CheckScanner::new(ocr, extractor)),
        DocumentKind::Receipt => Box::new(ReceiptScanner::new(ocr, extractor)),
    })
}

fn create_ocr_provider(config: &Config, rate_limiter: Arc<RateLimiter>) -> Box<dyn OcrProvider> {
    Box::new(RemoteOcrProvider::new(
        &config.ocr_api_key,
        config.ocr_model.clone(),
        config.retry_policy,
        rate_limiter,
    ))
}

fn create_extractor(config: &Config) -> Result<Box<dyn Extractor>> {
    match config.extractor_kind {
        ExtractorKind::Remote => Ok(Box::new(RemoteExtractor::new(
            &config.ocr_api_key,
            config.extraction_model.clone(),
            config.retry_policy,
        ))),
        ExtractorKind::Edge => {
            if !config.edge_binding_available {
                return Err(ScanError::Config(
                    "EXTRACTOR_KIND=edge requires an edge LLM binding".into(),
                ));
            }
            let client = create_llm_client(&config.ocr_api_key);
            let binding = Arc::new(OpenAiEdgeBinding::new(
                client,
                config.extraction_model.clone(),
                config.retry_policy,
            ));
            Ok(Box::new(EdgeExtractor::new(binding)))
        }
    }
}
