//! The `Receipt` scanner (spec §4.1).

use super::{ScanResult, Scanner, run_state_machine};
use crate::{document::Document, document::DocumentKind, extraction::Extractor, ocr::OcrProvider, prelude::*};

/// Scans receipts: composes an OCR provider with an extractor
/// targeting the `Receipt` schema.
pub struct ReceiptScanner {
    ocr: Box<dyn OcrProvider>,
    extractor: Box<dyn Extractor>,
}

impl ReceiptScanner {
    pub fn new(ocr: Box<dyn OcrProvider>, extractor: Box<dyn Extractor>) -> Self {
        Self { ocr, extractor }
    }
}

#[async_trait::async_trait]
impl Scanner for ReceiptScanner {
    #[instrument(level = "info", skip_all)]
    async fn process_document(&self, document: Document) -> Result<ScanResult> {
        run_state_machine(DocumentKind::Receipt, document, self.ocr.as_ref(), self.extractor.as_ref()).await
    }
}
