//! Hallucination audit (spec §4.4).
//!
//! A deterministic, declarative second opinion against LLM
//! confabulation: a small fixed-lookup table per document type, scored
//! by a pure function — not an LLM-as-judge. We deliberately do not use
//! the LLM-as-judge pattern seen elsewhere in the broader example
//! corpus (scoring whether an agent's free-text claims are grounded);
//! spec §4.4 is explicit that this is meant to be a "cheap second
//! opinion," which an LLM call would defeat.

pub mod check;
pub mod receipt;

use crate::schema::ExtractedDocument;

/// Mutates `document` in place: sets `isValidInput` and scales
/// `confidence` according to how many suspicious signals matched
/// (spec §4.4's scoring rule). Deterministic for the same input.
pub fn audit(document: &mut ExtractedDocument) {
    let matched = match document {
        ExtractedDocument::Check(check) => check::count_signals(check),
        ExtractedDocument::Receipt(receipt) => receipt::count_signals(receipt),
    };
    apply_score(document, matched);
}

/// Apply spec §4.4's scoring rule for a given signal count.
fn apply_score(document: &mut ExtractedDocument, matched_signals: usize) {
    match matched_signals {
        0 => {}
        1 => {
            document.set_confidence(document.confidence() * 0.7);
        }
        _ => {
            document.set_is_valid_input(false);
            document.set_confidence(document.confidence() * 0.3);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Check;

    fn empty_check(confidence: f64) -> ExtractedDocument {
        ExtractedDocument::Check(Check {
            confidence,
            check_number: None,
            date: None,
            payee: None,
            amount: None,
            payer: None,
            bank_name: None,
            routing_number: None,
            account_number: None,
            memo: None,
            is_valid_input: None,
        })
    }

    #[test]
    fn test_zero_signals_unchanged() {
        let mut document = empty_check(0.8);
        audit(&mut document);
        assert_eq!(document.confidence(), 0.8);
        assert_eq!(document.is_valid_input(), None);
    }

    #[test]
    fn test_two_or_more_signals_invalidates() {
        let mut document = empty_check(0.8);
        if let ExtractedDocument::Check(check) = &mut document {
            check.check_number = Some("1234".into());
            check.payee = Some("John Doe".into());
        }
        audit(&mut document);
        assert_eq!(document.is_valid_input(), Some(false));
        assert!((document.confidence() - 0.24).abs() < 1e-9);
    }

    #[test]
    fn test_one_signal_leaves_flag_true() {
        let mut document = empty_check(0.8);
        if let ExtractedDocument::Check(check) = &mut document {
            check.check_number = Some("1234".into());
        }
        audit(&mut document);
        assert_eq!(document.is_valid_input(), None);
        assert!((document.confidence() - 0.56).abs() < 1e-9);
    }
}
