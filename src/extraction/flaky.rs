//! A flaky extractor test double that drives the real retry loop
//! (spec §8, scenarios S5/S6), rather than the synthetic `FakeError`
//! used by `retry.rs`'s own unit tests. Lets integration tests assert
//! both the final outcome and how many attempts it took to get there.

use std::sync::atomic::{AtomicU32, Ordering};

use super::{ExtractedDocument, Extractor, ExtractionRequest};
use crate::{
    prelude::*,
    retry::{IsKnownTransient, RetryPolicy, retry_with_policy},
};

/// A synthetic failure with a caller-chosen transience, standing in for
/// a classified vendor error (5xx/429 vs. other 4xx).
#[derive(Debug)]
struct FlakyCallError {
    message: String,
    transient: bool,
}

impl std::fmt::Display for FlakyCallError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl IsKnownTransient for FlakyCallError {
    fn is_known_transient(&self) -> bool {
        self.transient
    }
}

/// An extractor that fails `failures_before_success` times, each
/// classified per `transient`, then returns a canned document.
pub struct FlakyExtractor {
    failures_before_success: u32,
    transient: bool,
    result: ExtractedDocument,
    retry_policy: RetryPolicy,
    attempts: AtomicU32,
}

impl FlakyExtractor {
    pub fn new(
        failures_before_success: u32,
        transient: bool,
        result: ExtractedDocument,
        retry_policy: RetryPolicy,
    ) -> Self {
        Self {
            failures_before_success,
            transient,
            result,
            retry_policy,
            attempts: AtomicU32::new(0),
        }
    }

    /// How many attempts `extract` has made so far.
    pub fn attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Extractor for FlakyExtractor {
    async fn extract(&self, _request: &ExtractionRequest) -> Result<ExtractedDocument> {
        let attempt = || async {
            let attempt_number = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
            if attempt_number <= self.failures_before_success {
                Err(FlakyCallError {
                    message: format!("flaky failure #{attempt_number}"),
                    transient: self.transient,
                })
            } else {
                Ok(self.result.clone())
            }
        };
        retry_with_policy(&self.retry_policy, attempt)
            .await
            .map_err(|err| {
                if err.is_known_transient() {
                    ScanError::ExtractionTransient(err.to_string())
                } else {
                    ScanError::ExtractionParse(err.to_string())
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{document::DocumentKind, schema::Check};

    fn canned_check() -> ExtractedDocument {
        ExtractedDocument::Check(Check {
            confidence: 0.9,
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

    fn fast_policy() -> RetryPolicy {
        RetryPolicy {
            initial_delay_millis: 1,
            max_delay_millis: 2,
            max_attempts: 5,
            jitter_ratio: 0.0,
        }
    }

    #[tokio::test]
    async fn test_flaky_extractor_succeeds_after_transient_failures() {
        let extractor = FlakyExtractor::new(3, true, canned_check(), fast_policy());
        let request = ExtractionRequest {
            kind: DocumentKind::Check,
            markdown: "anything".into(),
        };
        let result = extractor.extract(&request).await.unwrap();
        assert_eq!(result.confidence(), 0.9);
        assert_eq!(extractor.attempts(), 4);
    }

    #[tokio::test]
    async fn test_flaky_extractor_gives_up_immediately_on_permanent_failure() {
        let extractor = FlakyExtractor::new(u32::MAX, false, canned_check(), fast_policy());
        let request = ExtractionRequest {
            kind: DocumentKind::Check,
            markdown: "anything".into(),
        };
        let err = extractor.extract(&request).await.unwrap_err();
        assert!(matches!(err, ScanError::ExtractionParse(_)));
        assert_eq!(extractor.attempts(), 1);
    }
}
