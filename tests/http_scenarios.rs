//! End-to-end HTTP scenarios (spec §8, S1-S6), driven against a fully
//! wired [`AppState`] using echo OCR/extraction drivers so results are
//! deterministic without a live vendor.

use std::sync::Arc;

use axum::{Router, body::Body, http::{Request, StatusCode}};
use doc_scan_service::{
    config::Config,
    document::{Document, DocumentKind},
    extraction::{Extractor, echo::EchoExtractor, flaky::FlakyExtractor},
    http::{self, state::AppState},
    ocr::{OcrProvider, echo::EchoOcrProvider},
    retry::RetryPolicy,
    schema::{Check, ExtractedDocument, Receipt, receipt::Merchant},
    scanner::{Scanner, check::CheckScanner, receipt::ReceiptScanner},
};
use http_body_util::BodyExt as _;
use serde_json::Value;
use tower::ServiceExt as _;

const TINY_JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46, 0x49, 0x46, 0x00];

/// Build a router with a given pair of (check scanner, receipt scanner)
/// swapped in, bypassing `factory::create_scanner` entirely.
fn router_with_scanners(check: Box<dyn Scanner>, receipt: Box<dyn Scanner>) -> Router {
    let state = AppState::with_scanners(check.into(), receipt.into());
    http::create_router(state)
}

fn check_scanner(ocr_text: &str, ocr_confidence: f64, extracted: ExtractedDocument) -> Box<dyn Scanner> {
    let ocr: Box<dyn OcrProvider> = Box::new(EchoOcrProvider::new(ocr_text, ocr_confidence));
    let extractor: Box<dyn Extractor> = Box::new(EchoExtractor::constant(extracted));
    Box::new(CheckScanner::new(ocr, extractor))
}

fn receipt_scanner(ocr_text: &str, ocr_confidence: f64, extracted: ExtractedDocument) -> Box<dyn Scanner> {
    let ocr: Box<dyn OcrProvider> = Box::new(EchoOcrProvider::new(ocr_text, ocr_confidence));
    let extractor: Box<dyn Extractor> = Box::new(EchoExtractor::constant(extracted));
    Box::new(ReceiptScanner::new(ocr, extractor))
}

/// A retry policy fast enough that an S5/S6-style test completes in
/// milliseconds instead of waiting out real backoff delays.
fn fast_retry_policy() -> RetryPolicy {
    RetryPolicy {
        initial_delay_millis: 1,
        max_delay_millis: 2,
        max_attempts: 5,
        jitter_ratio: 0.0,
    }
}

fn check_scanner_with_extractor(ocr_confidence: f64, extractor: Arc<FlakyExtractor>) -> Box<dyn Scanner> {
    let ocr: Box<dyn OcrProvider> = Box::new(EchoOcrProvider::new("Check #1", ocr_confidence));
    let extractor: Box<dyn Extractor> = Box::new(extractor);
    Box::new(CheckScanner::new(ocr, extractor))
}

fn healthy_receipt_scanner() -> Box<dyn Scanner> {
    receipt_scanner("", 0.9, ExtractedDocument::Receipt(Receipt::default()))
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// S2 — Minimal image (anti-hallucination): empty OCR text, an
/// extractor response that matches several of the `Check` detector's
/// dummy signals, so `isValidInput` must come back `false` and
/// extraction confidence must be sharply reduced.
#[tokio::test]
async fn test_s2_minimal_image_flags_hallucination() {
    let extracted = ExtractedDocument::Check(Check {
        confidence: 0.8,
        check_number: Some("1234".into()),
        payee: Some("John Doe".into()),
        amount: Some(100.0),
        date: Some("2023-10-05".into()),
        payer: None,
        bank_name: None,
        routing_number: None,
        account_number: None,
        memo: None,
        is_valid_input: None,
    });
    let app = router_with_scanners(
        check_scanner("", 0.3, extracted),
        receipt_scanner("", 0.3, ExtractedDocument::Receipt(Receipt::default())),
    );

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/check")
                .body(Body::from(TINY_JPEG))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["isValidInput"], Value::Bool(false));
    assert!(body["confidence"]["extraction"].as_f64().unwrap() <= 0.24 + 1e-9);
    let ocr = body["confidence"]["ocr"].as_f64().unwrap();
    let extraction = body["confidence"]["extraction"].as_f64().unwrap();
    let expected_overall = ((0.4 * ocr + 0.6 * extraction) * 100.0).round() / 100.0;
    assert_eq!(body["confidence"]["overall"].as_f64().unwrap(), expected_overall);
}

/// S3 — Valid receipt: well-formed, consistent, no suspicious signals.
#[tokio::test]
async fn test_s3_valid_receipt_high_confidence() {
    let extracted = ExtractedDocument::Receipt(Receipt {
        confidence: 0.95,
        merchant: Some(Merchant {
            name: Some("Trattoria Italia".into()),
            ..Default::default()
        }),
        ..Default::default()
    });
    let app = router_with_scanners(
        check_scanner("", 0.9, ExtractedDocument::Check(Check {
            confidence: 0.0,
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
        })),
        receipt_scanner("Receipt from Trattoria Italia", 0.9, extracted),
    );

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/receipt")
                .body(Body::from(TINY_JPEG))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["data"]["isValidInput"].is_null());
    assert!(body["confidence"]["overall"].as_f64().unwrap() >= 0.8);
}

/// S4 — Universal routing: `/process?type=check` behaves like
/// `/check` and adds `documentType`; `type=unknown` is a 400.
#[tokio::test]
async fn test_s4_universal_routing() {
    let extracted = ExtractedDocument::Check(Check {
        confidence: 0.9,
        check_number: Some("77291".into()),
        date: None,
        payee: Some("Acme Hardware".into()),
        amount: Some(42.0),
        payer: None,
        bank_name: None,
        routing_number: None,
        account_number: None,
        memo: None,
        is_valid_input: None,
    });
    let app = router_with_scanners(
        check_scanner("Check #77291", 0.9, extracted),
        receipt_scanner("", 0.9, ExtractedDocument::Receipt(Receipt::default())),
    );

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/process?type=check")
                .body(Body::from(TINY_JPEG))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["documentType"], "check");

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/process?type=unknown")
                .body(Body::from(TINY_JPEG))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// Invariant 4 (atomicity): a malformed document never produces a
/// partial response, only a `ValidationError`.
#[tokio::test]
async fn test_rejects_empty_body() {
    let app = router_with_scanners(
        check_scanner("x", 0.9, ExtractedDocument::Check(Check {
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
        })),
        receipt_scanner("x", 0.9, ExtractedDocument::Receipt(Receipt::default())),
    );

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/check")
                .body(Body::from(Vec::<u8>::new()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// The document validator is exercised directly too, independent of
/// the HTTP layer.
#[tokio::test]
async fn test_document_validation_rejects_oversized_input() {
    let err = Document::from_bytes(vec![0u8; 100], 10).unwrap_err();
    assert!(matches!(err, doc_scan_service::errors::ScanError::Validation(_)));
}

/// S1 — health check: `GET /health` reports `status: "ok"`, an `apiKey`
/// preview matching the config's key, and the crate's own version.
#[tokio::test]
async fn test_s1_health_reports_ok() {
    let app = router_with_scanners(
        check_scanner("", 0.9, ExtractedDocument::Check(Check {
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
        })),
        healthy_receipt_scanner(),
    );

    let response = app
        .oneshot(
            Request::builder()
                .method("GET")
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["apiKey"], Config::test_default().api_key_preview());
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

/// S5 — transient upstream failures: the extractor fails three times
/// with retryable errors before succeeding; the request still ends in
/// 200, proving the retry loop ran rather than surfacing the first
/// failure to the client.
#[tokio::test]
async fn test_s5_retries_transient_failures_then_succeeds() {
    let clean = ExtractedDocument::Check(Check {
        confidence: 0.9,
        check_number: Some("1".into()),
        date: None,
        payee: Some("Acme".into()),
        amount: Some(10.0),
        payer: None,
        bank_name: None,
        routing_number: None,
        account_number: None,
        memo: None,
        is_valid_input: None,
    });
    let extractor = Arc::new(FlakyExtractor::new(3, true, clean, fast_retry_policy()));
    let app = router_with_scanners(
        check_scanner_with_extractor(0.9, extractor.clone()),
        healthy_receipt_scanner(),
    );

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/check")
                .body(Body::from(TINY_JPEG))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(extractor.attempts(), 4);
}

/// S6 — permanent upstream failure: a non-retryable error is reported
/// after exactly one attempt, as a 422 rather than a transient error.
#[tokio::test]
async fn test_s6_permanent_failure_is_not_retried() {
    let clean = ExtractedDocument::Check(Check {
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
    });
    let extractor = Arc::new(FlakyExtractor::new(u32::MAX, false, clean, fast_retry_policy()));
    let app = router_with_scanners(
        check_scanner_with_extractor(0.9, extractor.clone()),
        healthy_receipt_scanner(),
    );

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/check")
                .body(Body::from(TINY_JPEG))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(extractor.attempts(), 1);
}

#[allow(dead_code)]
fn document_kind_roundtrip_smoke() {
    let _ = DocumentKind::Check.as_str();
}
