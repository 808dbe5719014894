//! Confidence scoring for extraction results (spec §4.3, step 5).

use async_openai::types::FinishReason;

use crate::schema::ExtractedDocument;

/// Multiplier applied to a receipt's extraction confidence when its
/// totals don't sum up (spec §3, §9): not a hard rejection, since line
/// items and taxes are themselves extracted fields that can be partly
/// wrong without the whole receipt being fabricated.
const TOTALS_INCONSISTENCY_PENALTY: f64 = 0.9;

/// Apply the soft consistency check: if this is a `Receipt` whose
/// totals don't reconcile with its line items, taxes, tip, and
/// discount, multiply its confidence down. A no-op for checks, and for
/// receipts that are consistent or have too little data to check.
pub fn apply_consistency_penalty(document: &mut ExtractedDocument) {
    if let ExtractedDocument::Receipt(receipt) = document {
        if !receipt.totals_are_consistent() {
            let penalized = round2_clamp(receipt.confidence * TOTALS_INCONSISTENCY_PENALTY);
            receipt.confidence = penalized;
        }
    }
}

/// Round to two decimal places and clamp to `[0, 1]`.
pub fn round2_clamp(value: f64) -> f64 {
    ((value * 100.0).round() / 100.0).clamp(0.0, 1.0)
}

/// The finish-reason quality component: `1.0` for a clean stop, `0.5`
/// for length truncation, `0.0` otherwise (spec §4.3, step 5).
pub fn finish_reason_quality(finish_reason: Option<FinishReason>) -> f64 {
    match finish_reason {
        Some(FinishReason::Stop) => 1.0,
        Some(FinishReason::Length) => 0.5,
        _ => 0.0,
    }
}

/// Blend the extraction confidence from its three weighted components
/// (spec §4.3, step 5): `0.6` finish-reason quality, `0.2` structural
/// completeness, `0.2` the model's own stated confidence (or `0.5` as
/// a neutral prior if the schema has no top-level `confidence` field —
/// our schemas always require one, so this function always receives a
/// real value).
pub fn blend_confidence(
    finish_reason_quality: f64,
    structural_completeness: f64,
    model_stated_confidence: f64,
) -> f64 {
    round2_clamp(
        0.6 * finish_reason_quality
            + 0.2 * structural_completeness
            + 0.2 * model_stated_confidence,
    )
}
