//! Echo extractor for tests: returns a pre-built document instead of
//! calling a model, so scanner/scenario tests are deterministic.

use std::sync::Mutex;

use super::{Extractor, ExtractionRequest};
use crate::{prelude::*, schema::ExtractedDocument};

/// An extractor that returns one canned [`ExtractedDocument`] per call,
/// cycling through a fixed list (mirroring the real provider's "one
/// request in, one document out" contract without a live model).
pub struct EchoExtractor {
    responses: Mutex<Vec<ExtractedDocument>>,
}

impl EchoExtractor {
    /// Always return a clone of the same document.
    pub fn constant(document: ExtractedDocument) -> Self {
        Self {
            responses: Mutex::new(vec![document]),
        }
    }

    /// Return each document in order, repeating the last one once the
    /// list is exhausted.
    pub fn sequence(documents: Vec<ExtractedDocument>) -> Self {
        Self {
            responses: Mutex::new(documents),
        }
    }
}

#[async_trait::async_trait]
impl Extractor for EchoExtractor {
    async fn extract(&self, _request: &ExtractionRequest) -> Result<ExtractedDocument> {
        let mut responses = self.responses.lock().expect("echo extractor lock poisoned");
        if responses.len() > 1 {
            Ok(responses.remove(0))
        } else {
            Ok(responses
                .first()
                .cloned()
                .expect("EchoExtractor must be constructed with at least one response"))
        }
    }
}
