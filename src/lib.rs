//! Document scanning service: extracts structured, confidence-scored
//! financial data (checks, receipts) from photographed documents via a
//! two-stage OCR + LLM-extraction pipeline, audited for hallucination
//! before being returned.

pub mod audit;
pub mod config;
pub mod data_url;
pub mod document;
pub mod errors;
pub mod extraction;
pub mod factory;
pub mod http;
pub mod llm_client;
pub mod ocr;
pub mod prelude;
pub mod rate_limit;
pub mod retry;
pub mod scanner;
pub mod schema;
