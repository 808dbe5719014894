//! Process-wide configuration, assembled once from the environment and
//! threaded explicitly into the factory (spec §9: "no globals").

use std::sync::Arc;

use crate::{prelude::*, rate_limit::RateLimit, retry::RetryPolicy};

/// Which extractor implementation to bind for a given deployment
/// (spec §4.7).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractorKind {
    /// Call the vendor's remote chat/completion API.
    Remote,
    /// Call an edge-hosted LLM binding.
    Edge,
}

impl ExtractorKind {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "remote" => Some(ExtractorKind::Remote),
            "edge" => Some(ExtractorKind::Edge),
            _ => None,
        }
    }
}

/// The deployment environment, which gates debug logging (spec §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl Environment {
    fn parse(value: &str) -> Option<Self> {
        match value {
            "development" => Some(Environment::Development),
            "staging" => Some(Environment::Staging),
            "production" => Some(Environment::Production),
            _ => None,
        }
    }

    /// The default extractor kind for this environment (spec §4.7:
    /// "default per environment, e.g. edge in production, remote
    /// elsewhere").
    fn default_extractor_kind(self) -> ExtractorKind {
        match self {
            Environment::Production => ExtractorKind::Edge,
            Environment::Development | Environment::Staging => ExtractorKind::Remote,
        }
    }
}

/// Process-wide configuration. Constructed once at startup (or once per
/// test), then passed explicitly to [`crate::factory::create_scanner`].
#[derive(Debug, Clone)]
pub struct Config {
    /// Credential for the OCR provider.
    pub ocr_api_key: String,
    /// Which extractor variant to bind.
    pub extractor_kind: ExtractorKind,
    /// Whether an edge-LLM binding handle is available. Standing in for
    /// the runtime-injected handle described in spec §6; see
    /// `SPEC_FULL.md` §6 for why this can't be a literal binding object
    /// outside the original deployment platform.
    pub edge_binding_available: bool,
    /// Pinned OCR model identifier.
    pub ocr_model: String,
    /// Pinned extraction model identifier.
    pub extraction_model: String,
    /// Retry policy overrides (spec §4.6).
    pub retry_policy: RetryPolicy,
    /// Client-side rate limit applied to the OCR vendor (spec §5).
    pub ocr_rate_limit: RateLimit,
    /// Input size ceiling, in bytes.
    pub max_document_bytes: usize,
    /// Gates verbose logging of prompts and non-secret payloads.
    pub debug: bool,
    /// The deployment environment.
    pub environment: Environment,
}

/// Minimum acceptable length for `OCR_API_KEY`. Real vendor keys run far
/// longer than this; this just catches obviously-placeholder values.
const MIN_API_KEY_LEN: usize = 32;

/// Placeholder values we reject outright, even if they happen to be long
/// enough to pass the length check.
const FORBIDDEN_API_KEY_PLACEHOLDERS: &[&str] = &["changeme", "your-api-key-here", "test"];

impl Config {
    /// Load configuration from the process environment, failing fast
    /// with a descriptive [`ScanError::Config`] on any problem (spec
    /// §4.7: "the factory performs eager validation ... and fails fast").
    pub fn from_env() -> Result<Self> {
        let ocr_api_key = require_env("OCR_API_KEY")?;
        validate_api_key_format(&ocr_api_key)?;

        let environment = match std::env::var("ENVIRONMENT").ok() {
            Some(value) => Environment::parse(&value).ok_or_else(|| {
                ScanError::Config(format!("invalid ENVIRONMENT value: {value:?}"))
            })?,
            None => Environment::Development,
        };

        let extractor_kind = match std::env::var("EXTRACTOR_KIND").ok() {
            Some(value) => ExtractorKind::parse(&value).ok_or_else(|| {
                ScanError::Config(format!("invalid EXTRACTOR_KIND value: {value:?}"))
            })?,
            None => environment.default_extractor_kind(),
        };

        let edge_binding_available = std::env::var("EDGE_AI_BINDING")
            .map(|value| !value.is_empty())
            .unwrap_or(false);
        if extractor_kind == ExtractorKind::Edge && !edge_binding_available {
            return Err(ScanError::Config(
                "EXTRACTOR_KIND=edge requires EDGE_AI_BINDING to be set".into(),
            ));
        }

        let debug = std::env::var("DEBUG")
            .map(|value| value == "true")
            .unwrap_or(false);

        Ok(Self {
            ocr_api_key,
            extractor_kind,
            edge_binding_available,
            ocr_model: std::env::var("OCR_MODEL")
                .unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            extraction_model: std::env::var("EXTRACTION_MODEL")
                .unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            retry_policy: RetryPolicy::default(),
            ocr_rate_limit: RateLimit::new(
                10,
                crate::rate_limit::RateLimitPeriod::Second,
            ),
            max_document_bytes: 20 * 1024 * 1024,
            debug,
            environment,
        })
    }

    /// The first four characters of the OCR API key, for the `/health`
    /// response (spec §6: `apiKey: "<first-4-of-key>…"`).
    pub fn api_key_preview(&self) -> String {
        let prefix: String = self.ocr_api_key.chars().take(4).collect();
        format!("{prefix}…")
    }

    /// A config good enough to satisfy [`AppState::with_scanners`]'s
    /// `config` field in tests; none of its values are read on the
    /// stub-scanner request path.
    ///
    /// [`AppState::with_scanners`]: crate::http::state::AppState::with_scanners
    #[doc(hidden)]
    pub fn test_default() -> Self {
        Self {
            ocr_api_key: "sk-abcdefghijklmnopqrstuvwxyz0123456789".to_string(),
            extractor_kind: ExtractorKind::Remote,
            edge_binding_available: false,
            ocr_model: "stub-ocr-model".into(),
            extraction_model: "stub-extraction-model".into(),
            retry_policy: RetryPolicy::default(),
            ocr_rate_limit: RateLimit::new(10, crate::rate_limit::RateLimitPeriod::Second),
            max_document_bytes: 20 * 1024 * 1024,
            debug: false,
            environment: Environment::Development,
        }
    }
}

/// Shared, reference-counted configuration handed to request handlers.
pub type SharedConfig = Arc<Config>;

fn require_env(name: &str) -> Result<String> {
    std::env::var(name)
        .map_err(|_| ScanError::Config(format!("missing required environment variable {name}")))
}

/// Validate the shape of an API-key-format credential (spec §4.5: "an
/// API-key-format validator (length + forbidden placeholder patterns)").
pub fn validate_api_key_format(key: &str) -> Result<()> {
    if key.len() < MIN_API_KEY_LEN {
        return Err(ScanError::Config(format!(
            "OCR_API_KEY must be at least {MIN_API_KEY_LEN} characters"
        )));
    }
    let lower = key.to_ascii_lowercase();
    if FORBIDDEN_API_KEY_PLACEHOLDERS
        .iter()
        .any(|placeholder| lower.contains(placeholder))
    {
        return Err(ScanError::Config(
            "OCR_API_KEY looks like a placeholder value".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_api_key_format_rejects_short_keys() {
        assert!(validate_api_key_format("short").is_err());
    }

    #[test]
    fn test_validate_api_key_format_rejects_placeholders() {
        assert!(validate_api_key_format(&("x".repeat(20) + "changeme" + &"x".repeat(20))).is_err());
    }

    #[test]
    fn test_validate_api_key_format_accepts_real_looking_key() {
        assert!(validate_api_key_format(&"sk-".to_string().repeat(12)).is_ok());
    }

    #[test]
    fn test_api_key_preview() {
        let config = Config {
            ocr_api_key: "sk-abcdefghijklmnopqrstuvwxyz0123456789".to_string(),
            extractor_kind: ExtractorKind::Remote,
            edge_binding_available: false,
            ocr_model: "m".into(),
            extraction_model: "m".into(),
            retry_policy: RetryPolicy::default(),
            ocr_rate_limit: RateLimit::new(10, crate::rate_limit::RateLimitPeriod::Second),
            max_document_bytes: 1024,
            debug: false,
            environment: Environment::Development,
        };
        assert_eq!(config.api_key_preview(), "sk-a…");
    }
}
