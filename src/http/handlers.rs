//! HTTP handlers (spec §6). Four routes, one shared [`AppState`], no
//! templating, no session state — the adapter layer is deliberately
//! thin.

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};

use super::state::AppState;
use crate::{document::{Document, DocumentKind}, prelude::*, scanner::ScanResult};

/// `POST /check`.
pub async fn scan_check(State(state): State<AppState>, body: axum::body::Bytes) -> Result<impl IntoResponse> {
    scan(&state, DocumentKind::Check, &body, false).await
}

/// `POST /receipt`.
pub async fn scan_receipt(State(state): State<AppState>, body: axum::body::Bytes) -> Result<impl IntoResponse> {
    scan(&state, DocumentKind::Receipt, &body, false).await
}

#[derive(Deserialize)]
pub struct ProcessQuery {
    #[serde(rename = "type")]
    document_type: Option<String>,
}

/// `POST /process?type=check|receipt`.
pub async fn scan_process(
    State(state): State<AppState>,
    Query(query): Query<ProcessQuery>,
    body: axum::body::Bytes,
) -> Result<impl IntoResponse> {
    let kind = query
        .document_type
        .as_deref()
        .and_then(DocumentKind::parse)
        .ok_or_else(|| {
            ScanError::Validation(
                "query parameter `type` must be one of: check, receipt".into(),
            )
        })?;
    scan(&state, kind, &body, true).await
}

async fn scan(
    state: &AppState,
    kind: DocumentKind,
    body: &[u8],
    include_document_type: bool,
) -> Result<impl IntoResponse + use<>> {
    let document = Document::from_bytes(body.to_vec(), state.config.max_document_bytes)?;
    let result = state.scanner(kind).process_document(document).await?;
    Ok(Json(scan_result_to_json(&result, kind, include_document_type)))
}

fn scan_result_to_json(result: &ScanResult, kind: DocumentKind, include_document_type: bool) -> Value {
    let mut body = json!({
        "data": result.data,
        "markdown": result.raw_text,
        "confidence": {
            "ocr": result.ocr_confidence,
            "extraction": result.extraction_confidence,
            "overall": result.overall_confidence,
        },
    });
    if include_document_type {
        body["documentType"] = json!(kind.as_str());
    }
    body
}

/// `GET /health`. Re-runs the factory's eager validation against the
/// live config without contacting any external service (spec §4.7's
/// supplement); reports `status: "error"` rather than panicking if
/// wiring would fail.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let wiring_ok = crate::factory::create_scanner(DocumentKind::Check, &state.config).is_ok();
    let status = if wiring_ok { "ok" } else { "error" };
    let body = json!({
        "status": status,
        "timestamp": crate::http::unix_timestamp_seconds(),
        "version": env!("CARGO_PKG_VERSION"),
        "apiKey": state.config.api_key_preview(),
    });
    if wiring_ok {
        (axum::http::StatusCode::OK, Json(body))
    } else {
        (axum::http::StatusCode::INTERNAL_SERVER_ERROR, Json(body))
    }
}
