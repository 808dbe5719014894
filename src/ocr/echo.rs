//! Echo OCR provider for tests.
//!
//! Returns a single deterministic page per document rather than calling
//! a vision model, so scanner and scenario tests don't depend on
//! network access or a live API key.

use super::{OcrPage, OcrProvider};
use crate::{document::Document, prelude::*};

/// An OCR provider that echoes a fixed page of text back for every
/// document it's given.
pub struct EchoOcrProvider {
    text: String,
    confidence: f64,
}

impl EchoOcrProvider {
    /// An echo provider returning the given text at a fixed confidence.
    pub fn new(text: impl Into<String>, confidence: f64) -> Self {
        Self {
            text: text.into(),
            confidence,
        }
    }
}

impl Default for EchoOcrProvider {
    fn default() -> Self {
        Self::new("ECHO OCR TEXT", 0.9)
    }
}

#[async_trait::async_trait]
impl OcrProvider for EchoOcrProvider {
    async fn process_documents(&self, documents: &[Document]) -> Result<Vec<Vec<OcrPage>>> {
        Ok(documents
            .iter()
            .map(|_| {
                vec![OcrPage {
                    text: self.text.clone(),
                    confidence: self.confidence,
                    bounding_box: None,
                }]
            })
            .collect())
    }
}
