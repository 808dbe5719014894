//! The error kinds shared across the scanning pipeline.
//!
//! Every component in the core returns a [`Result`]; nothing in the
//! pipeline panics or throws on expected failure. The HTTP adapter
//! (`src/http`) is the only place these get turned into status codes.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::prelude::json;

/// The result type used throughout the core.
pub type Result<T, E = ScanError> = std::result::Result<T, E>;

/// Error kinds for the scanning pipeline, matching spec's error table.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// Bad input: missing, wrong type, too large, bad credential format.
    #[error("validation error: {0}")]
    Validation(String),

    /// 5xx/429/network from the OCR provider, after retries exhausted.
    #[error("OCR provider unavailable: {0}")]
    OcrTransient(String),

    /// 4xx (not 429) from the OCR provider.
    #[error("OCR request rejected: {0}")]
    OcrPermanent(String),

    /// The extractor returned non-JSON.
    #[error("failed to parse extractor response: {0}")]
    ExtractionParse(String),

    /// Parsed JSON failed schema validation.
    #[error("extracted data failed schema validation: {0}")]
    ExtractionSchema(String),

    /// Upstream model failure after retries exhausted.
    #[error("extraction provider unavailable: {0}")]
    ExtractionTransient(String),

    /// DI / factory misconfiguration at startup or first use.
    #[error("configuration error: {0}")]
    Config(String),

    /// Deadline exceeded or caller cancellation.
    #[error("request cancelled: {0}")]
    Cancelled(String),
}

impl ScanError {
    /// A short machine-readable name for this error kind, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ScanError::Validation(_) => "validation_error",
            ScanError::OcrTransient(_) => "ocr_transient",
            ScanError::OcrPermanent(_) => "ocr_permanent",
            ScanError::ExtractionParse(_) => "extraction_parse_error",
            ScanError::ExtractionSchema(_) => "extraction_schema_error",
            ScanError::ExtractionTransient(_) => "extraction_transient",
            ScanError::Config(_) => "config_error",
            ScanError::Cancelled(_) => "cancelled",
        }
    }

    /// The HTTP status this error kind maps to, per spec §7.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ScanError::Validation(_) => StatusCode::BAD_REQUEST,
            ScanError::OcrTransient(_) => StatusCode::TOO_MANY_REQUESTS,
            ScanError::OcrPermanent(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ScanError::ExtractionParse(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ScanError::ExtractionSchema(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ScanError::ExtractionTransient(_) => StatusCode::TOO_MANY_REQUESTS,
            ScanError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ScanError::Cancelled(_) => StatusCode::from_u16(499).expect("499 is a valid status"),
        }
    }
}

impl IntoResponse for ScanError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = json!({
            "error": self.kind(),
            "message": self.to_string(),
        });
        (status, Json(body)).into_response()
    }
}
