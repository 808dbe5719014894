//! The scanner state machine (spec §4.1).

pub mod check;
pub mod receipt;

use crate::{
    audit,
    document::Document,
    extraction::{ExtractionRequest, prompt::is_passthrough},
    prelude::*,
    schema::ExtractedDocument,
};

/// The end-to-end result of scanning one document.
#[derive(Debug, Clone, Serialize)]
pub struct ScanResult {
    /// The extracted, audited, schema-valid document.
    pub data: ExtractedDocument,
    /// The OCR markdown this result was extracted from.
    pub raw_text: String,
    /// First-page OCR confidence.
    pub ocr_confidence: f64,
    /// Post-audit extraction confidence.
    pub extraction_confidence: f64,
    /// The fused confidence (spec §4.1's formula).
    pub overall_confidence: f64,
}

/// Orchestrates a single document end-to-end (spec §4.1). `CheckScanner`
/// and `ReceiptScanner` differ only in which extractor and
/// hallucination detector they compose — both are built from this one
/// trait plus [`run_state_machine`].
#[async_trait::async_trait]
pub trait Scanner: Send + Sync {
    /// Scan a single document.
    async fn process_document(&self, document: Document) -> Result<ScanResult>;

    /// Scan a batch of documents sequentially, returning either every
    /// result or the first error (spec §4.1: "no partial success
    /// batching").
    async fn process_documents(&self, documents: Vec<Document>) -> Result<Vec<ScanResult>> {
        let mut results = Vec::with_capacity(documents.len());
        for document in documents {
            results.push(self.process_document(document).await?);
        }
        Ok(results)
    }
}

/// The shared state-machine body (spec §4.1, steps 2-7) used by both
/// `CheckScanner` and `ReceiptScanner`. Step 1 (input validation) has
/// already happened by the time a [`Document`] exists
/// (`Document::from_bytes`).
#[instrument(level = "info", skip_all, fields(kind = ?kind))]
pub(crate) async fn run_state_machine(
    kind: crate::document::DocumentKind,
    document: Document,
    ocr: &dyn crate::ocr::OcrProvider,
    extractor: &dyn crate::extraction::Extractor,
) -> Result<ScanResult> {
    // Step 2: OCR.
    let mut pages = ocr.process_documents(std::slice::from_ref(&document)).await?;
    let pages = pages.pop().unwrap_or_default();
    let first_page = pages.into_iter().next().unwrap_or_default();
    let ocr_confidence = first_page.confidence;
    let raw_text = first_page.text;

    // Release the input bytes now: extraction only needs the OCR
    // markdown, and images can be large.
    drop(document);

    // Step 3: build the extraction request. Double-wrap avoidance lives
    // in `extraction::prompt::build_extraction_prompt`; we only log the
    // decision here.
    debug!(
        passthrough = is_passthrough(&raw_text),
        "built extraction request"
    );
    let request = ExtractionRequest {
        kind,
        markdown: raw_text.clone(),
    };

    // Step 4: extract.
    let mut data = extractor.extract(&request).await?;

    // Step 5: audit (mutates `data` in place).
    audit::audit(&mut data);

    // Step 6: fuse confidences. MUST read the post-audit confidence.
    let extraction_confidence = data.confidence();
    let overall_confidence =
        crate::extraction::scoring::round2_clamp(0.4 * ocr_confidence + 0.6 * extraction_confidence);

    // Step 7: return.
    Ok(ScanResult {
        data,
        raw_text,
        ocr_confidence,
        extraction_confidence,
        overall_confidence,
    })
}
