//! JSON extractor abstraction (spec §4.3).

pub mod echo;
pub mod edge;
pub mod flaky;
pub mod prompt;
pub mod remote;
pub mod scoring;

use crate::{document::DocumentKind, prelude::*, schema::ExtractedDocument};

/// Everything an [`Extractor`] needs to turn OCR output into a
/// schema-valid document.
pub struct ExtractionRequest {
    /// The document kind, used to pick the target schema.
    pub kind: DocumentKind,
    /// The OCR markdown to extract from.
    pub markdown: String,
}

/// Turns OCR markdown plus a target schema into a schema-valid object
/// with a confidence score (spec §4.3). The extractor never performs
/// the hallucination audit — that's the scanner's job (spec §4.4);
/// this separation is invariant.
#[async_trait::async_trait]
pub trait Extractor: Send + Sync {
    async fn extract(&self, request: &ExtractionRequest) -> Result<ExtractedDocument>;
}

/// Lets a shared extractor be wired into a scanner while the caller
/// keeps its own handle (used by tests that need to inspect a stub
/// extractor's state after the request completes).
#[async_trait::async_trait]
impl<T: Extractor + ?Sized> Extractor for std::sync::Arc<T> {
    async fn extract(&self, request: &ExtractionRequest) -> Result<ExtractedDocument> {
        (**self).extract(request).await
    }
}
