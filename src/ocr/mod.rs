//! OCR provider abstraction (spec §4.2).

pub mod echo;
pub mod remote;

use crate::{document::Document, prelude::*};

/// A single page of OCR output. A single OCR call produces an ordered,
/// non-empty sequence of these.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct OcrPage {
    /// The page text, rendered as Markdown.
    pub text: String,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
    /// The page's pixel dimensions, if known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,
}

/// A page's pixel dimensions.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct BoundingBox {
    pub width: u32,
    pub height: u32,
}

/// Turns a [`Document`] into an ordered sequence of [`OcrPage`]s by
/// calling an external vision model.
#[async_trait::async_trait]
pub trait OcrProvider: Send + Sync {
    /// OCR a batch of documents, returning one page sequence per
    /// document, in order (spec §4.2's contract).
    async fn process_documents(&self, documents: &[Document]) -> Result<Vec<Vec<OcrPage>>>;
}

/// Synthesize a confidence score when the underlying model doesn't
/// return one explicitly (spec §4.2: "if the provider returns no
/// explicit confidence, synthesize one from response completeness").
pub fn synthesize_confidence(finish_reason_is_stop: bool, text_is_empty: bool) -> f64 {
    match (finish_reason_is_stop, text_is_empty) {
        (true, false) => 0.9,
        (true, true) => 0.3,
        (false, _) => 0.4,
    }
}
