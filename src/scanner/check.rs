//! The `Check` scanner (spec §4.1).

use super::{ScanResult, Scanner, run_state_machine};
use crate::{document::Document, document::DocumentKind, extraction::Extractor, ocr::OcrProvider, prelude::*};

/// Scans checks: composes an OCR provider with an extractor targeting
/// the `Check` schema. Differs from [`super::receipt::ReceiptScanner`]
/// only in the document kind it passes through the shared state
/// machine — the hallucination detector is picked by
/// [`crate::audit::audit`] from the extracted document's own variant.
pub struct CheckScanner {
    ocr: Box<dyn OcrProvider>,
    extractor: Box<dyn Extractor>,
}

impl CheckScanner {
    pub fn new(ocr: Box<dyn OcrProvider>, extractor: Box<dyn Extractor>) -> Self {
        Self { ocr, extractor }
    }
}

#[async_trait::async_trait]
impl Scanner for CheckScanner {
    #[instrument(level = "info", skip_all)]
    async fn process_document(&self, document: Document) -> Result<ScanResult> {
        run_state_machine(DocumentKind::Check, document, self.ocr.as_ref(), self.extractor.as_ref()).await
    }
}
