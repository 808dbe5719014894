//! The `Check` document schema (spec §3).

use schemars::JsonSchema;

use crate::prelude::*;

/// A paper check: payer, payee, amount, date, and bank routing/account
/// numbers. Only `confidence` is required; every other field is
/// optional, admitting partial extraction rather than rejecting whole
/// results (spec §4.5).
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Check {
    /// Confidence that this extraction is correct, in `[0, 1]`.
    pub confidence: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub check_number: Option<String>,

    /// ISO-8601 date the check was written.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub payee: Option<String>,

    /// The amount, in the check's currency major unit (e.g. dollars).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub payer: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub routing_number: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_number: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub memo: Option<String>,

    /// Set by the hallucination audit (spec §4.4); absent until then.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_valid_input: Option<bool>,
}

impl Check {
    /// How many of the optional fields (besides `confidence` and
    /// `is_valid_input`, which aren't part of the document's own
    /// content) are populated. Used by the extractor's structural-
    /// completeness score (spec §4.3).
    pub fn populated_optional_field_count(&self) -> usize {
        [
            self.check_number.is_some(),
            self.date.is_some(),
            self.payee.is_some(),
            self.amount.is_some(),
            self.payer.is_some(),
            self.bank_name.is_some(),
            self.routing_number.is_some(),
            self.account_number.is_some(),
            self.memo.is_some(),
        ]
        .into_iter()
        .filter(|populated| *populated)
        .count()
    }

    /// Total number of optional fields considered by
    /// [`Self::populated_optional_field_count`].
    pub const OPTIONAL_FIELD_COUNT: usize = 9;
}
