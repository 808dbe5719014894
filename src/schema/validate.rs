//! The uniform validator contract (spec §4.5).
//!
//! `validate(value) -> {ok: true, value} | {ok: false, issues}`. No
//! validator throws for expected bad input; panics are reserved for
//! programmer error (e.g. a malformed hand-authored JSON Schema).

use jsonschema::Validator as CompiledSchema;
use schemars::{JsonSchema, SchemaGenerator, r#gen::SchemaSettings};

use crate::prelude::*;

/// A single validation failure, with a JSON-Pointer-style path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    /// Path to the offending field, e.g. `/items/0/totalPrice`.
    pub path: String,
    /// A human-readable description of the problem.
    pub message: String,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Join a list of issues into the "concatenated path-qualified message"
/// spec §4.3/§7 ask for.
pub fn join_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Something that can validate a [`Value`] against a JSON Schema.
pub trait Validate {
    /// Validate `value`, returning the (possibly normalized) value on
    /// success, or a list of path-qualified issues on failure.
    fn validate(&self, value: Value) -> std::result::Result<Value, Vec<ValidationIssue>>;
}

/// A validator backed by a compiled JSON Schema.
pub struct SchemaValidator {
    compiled: CompiledSchema,
}

impl SchemaValidator {
    /// Compile a validator for a Rust type via [`schemars`].
    ///
    /// Some vision/LLM providers reject `$defs`/`definitions` in
    /// provided schemas, so subschemas are inlined, mirroring how the
    /// extraction prompt embeds a single self-contained schema block.
    pub fn for_type<T: JsonSchema>() -> Result<Self> {
        let mut settings = SchemaSettings::draft07();
        settings.inline_subschemas = true;
        let generator = SchemaGenerator::new(settings);
        let schema = generator.into_root_schema_for::<T>();
        let schema_json = serde_json::to_value(schema)
            .map_err(|e| ScanError::Config(format!("failed to build JSON schema: {e}")))?;
        Self::for_schema(schema_json)
    }

    /// Compile a validator for an arbitrary JSON Schema value.
    pub fn for_schema(schema_json: Value) -> Result<Self> {
        let compiled = jsonschema::validator_for(&schema_json)
            .map_err(|e| ScanError::Config(format!("invalid JSON schema: {e}")))?;
        Ok(Self { compiled })
    }
}

impl Validate for SchemaValidator {
    fn validate(&self, value: Value) -> std::result::Result<Value, Vec<ValidationIssue>> {
        let issues: Vec<ValidationIssue> = self
            .compiled
            .iter_errors(&value)
            .map(|error| ValidationIssue {
                path: error.instance_path.to_string(),
                message: error.to_string(),
            })
            .collect();
        if issues.is_empty() {
            Ok(value)
        } else {
            Err(issues)
        }
    }
}

/// Validate a [`RetryPolicy`](crate::retry::RetryPolicy)'s shape: delays
/// must be positive and ordered, per spec §4.5 ("provider-config
/// validators (retry policy shape)").
pub fn validate_retry_policy(policy: &crate::retry::RetryPolicy) -> Result<()> {
    let mut issues = Vec::new();
    if policy.initial_delay_millis == 0 {
        issues.push(ValidationIssue {
            path: "/initial_delay_millis".into(),
            message: "must be greater than zero".into(),
        });
    }
    if policy.max_delay_millis < policy.initial_delay_millis {
        issues.push(ValidationIssue {
            path: "/max_delay_millis".into(),
            message: "must be >= initial_delay_millis".into(),
        });
    }
    if !(0.0..=1.0).contains(&policy.jitter_ratio) {
        issues.push(ValidationIssue {
            path: "/jitter_ratio".into(),
            message: "must be in [0, 1]".into(),
        });
    }
    if issues.is_empty() {
        Ok(())
    } else {
        Err(ScanError::Config(join_issues(&issues)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::check::Check;

    #[test]
    fn test_schema_validator_accepts_valid_check() {
        let validator = SchemaValidator::for_type::<Check>().unwrap();
        let value = json!({"confidence": 0.9, "payee": "Alice"});
        assert!(validator.validate(value).is_ok());
    }

    #[test]
    fn test_schema_validator_rejects_missing_confidence() {
        let validator = SchemaValidator::for_type::<Check>().unwrap();
        let value = json!({"payee": "Alice"});
        let issues = validator.validate(value).unwrap_err();
        assert!(!issues.is_empty());
    }

    #[test]
    fn test_join_issues() {
        let issues = vec![
            ValidationIssue {
                path: "/confidence".into(),
                message: "is required".into(),
            },
            ValidationIssue {
                path: "/amount".into(),
                message: "must be a number".into(),
            },
        ];
        assert_eq!(
            join_issues(&issues),
            "/confidence: is required; /amount: must be a number"
        );
    }

    #[test]
    fn test_validate_retry_policy_accepts_defaults() {
        assert!(validate_retry_policy(&crate::retry::RetryPolicy::default()).is_ok());
    }

    #[test]
    fn test_validate_retry_policy_rejects_backwards_range() {
        let policy = crate::retry::RetryPolicy {
            initial_delay_millis: 1000,
            max_delay_millis: 500,
            max_attempts: 5,
            jitter_ratio: 0.2,
        };
        assert!(validate_retry_policy(&policy).is_err());
    }
}
