//! Document-type schemas and the uniform validator contract (spec §4.5).

pub mod check;
pub mod receipt;
pub mod validate;

use schemars::JsonSchema;

use crate::{document::DocumentKind, prelude::*};

pub use check::Check;
pub use receipt::Receipt;
pub use validate::{SchemaValidator, Validate, ValidationIssue};

/// The extracted document, typed by document kind.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum ExtractedDocument {
    Check(Check),
    Receipt(Receipt),
}

impl ExtractedDocument {
    /// The post-audit confidence, read fresh each time. This is the
    /// value the scanner's confidence fusion (spec §4.1) must read —
    /// never a value cached from before the hallucination audit ran.
    pub fn confidence(&self) -> f64 {
        match self {
            ExtractedDocument::Check(check) => check.confidence,
            ExtractedDocument::Receipt(receipt) => receipt.confidence,
        }
    }

    /// Set the confidence score in place.
    pub fn set_confidence(&mut self, confidence: f64) {
        match self {
            ExtractedDocument::Check(check) => check.confidence = confidence,
            ExtractedDocument::Receipt(receipt) => receipt.confidence = confidence,
        }
    }

    /// Read the post-audit `isValidInput` flag, if the audit has run.
    pub fn is_valid_input(&self) -> Option<bool> {
        match self {
            ExtractedDocument::Check(check) => check.is_valid_input,
            ExtractedDocument::Receipt(receipt) => receipt.is_valid_input,
        }
    }

    /// Set the `isValidInput` flag in place.
    pub fn set_is_valid_input(&mut self, is_valid_input: bool) {
        match self {
            ExtractedDocument::Check(check) => check.is_valid_input = Some(is_valid_input),
            ExtractedDocument::Receipt(receipt) => {
                receipt.is_valid_input = Some(is_valid_input)
            }
        }
    }

    /// The fraction of type-specific optional fields populated, in
    /// `[0, 1]`, used by the extractor's structural-completeness score.
    pub fn structural_completeness(&self) -> f64 {
        match self {
            ExtractedDocument::Check(check) => {
                check.populated_optional_field_count() as f64
                    / Check::OPTIONAL_FIELD_COUNT as f64
            }
            ExtractedDocument::Receipt(receipt) => {
                receipt.populated_optional_field_count() as f64
                    / Receipt::OPTIONAL_FIELD_COUNT as f64
            }
        }
    }
}

/// Build a [`SchemaValidator`] for a given document kind.
pub fn validator_for_kind(kind: DocumentKind) -> Result<SchemaValidator> {
    match kind {
        DocumentKind::Check => SchemaValidator::for_type::<Check>(),
        DocumentKind::Receipt => SchemaValidator::for_type::<Receipt>(),
    }
}

/// Build the JSON Schema (as a [`Value`]) used in the extraction prompt
/// for a given document kind.
pub fn json_schema_for_kind(kind: DocumentKind) -> Result<Value> {
    fn schema_for<T: JsonSchema>() -> Result<Value> {
        let mut settings = schemars::r#gen::SchemaSettings::draft07();
        settings.inline_subschemas = true;
        let generator = schemars::SchemaGenerator::new(settings);
        let schema = generator.into_root_schema_for::<T>();
        serde_json::to_value(schema)
            .map_err(|e| ScanError::Config(format!("failed to build JSON schema: {e}")))
    }
    match kind {
        DocumentKind::Check => schema_for::<Check>(),
        DocumentKind::Receipt => schema_for::<Receipt>(),
    }
}

/// Parse the extractor's raw JSON response into a typed, schema-valid
/// document. This is the "parse, then schema-validate" step of spec
/// §4.3, steps 3-4.
pub fn parse_and_validate(
    kind: DocumentKind,
    validator: &SchemaValidator,
    raw: Value,
) -> Result<ExtractedDocument> {
    let validated = validator
        .validate(raw)
        .map_err(|issues| ScanError::ExtractionSchema(validate::join_issues(&issues)))?;
    match kind {
        DocumentKind::Check => serde_json::from_value::<Check>(validated)
            .map(ExtractedDocument::Check)
            .map_err(|e| ScanError::ExtractionSchema(e.to_string())),
        DocumentKind::Receipt => serde_json::from_value::<Receipt>(validated)
            .map(ExtractedDocument::Receipt)
            .map_err(|e| ScanError::ExtractionSchema(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_and_validate_check() {
        let validator = validator_for_kind(DocumentKind::Check).unwrap();
        let raw = json!({"confidence": 0.8, "payee": "Alice"});
        let doc = parse_and_validate(DocumentKind::Check, &validator, raw).unwrap();
        assert_eq!(doc.confidence(), 0.8);
    }

    #[test]
    fn test_parse_and_validate_rejects_bad_schema() {
        let validator = validator_for_kind(DocumentKind::Check).unwrap();
        let raw = json!({"confidence": "not a number"});
        let err = parse_and_validate(DocumentKind::Check, &validator, raw).unwrap_err();
        assert!(matches!(err, ScanError::ExtractionSchema(_)));
    }

    #[test]
    fn test_structural_completeness_range() {
        let doc = ExtractedDocument::Check(Check {
            confidence: 0.5,
            check_number: Some("123".into()),
            ..empty_check()
        });
        let completeness = doc.structural_completeness();
        assert!((0.0..=1.0).contains(&completeness));
        assert!(completeness > 0.0);
    }

    fn empty_check() -> Check {
        Check {
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
        }
    }
}
