//! The `Receipt` document schema (spec §3).

use schemars::JsonSchema;

use crate::prelude::*;

/// Identifying and location information about the merchant.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Merchant {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chain_name: Option<String>,
}

/// What kind of transaction this receipt documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReceiptType {
    Sale,
    Return,
    Refund,
    Estimate,
    Proforma,
    Other,
}

/// A single purchased line item.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
}

/// A single tax line.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TaxItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_amount: Option<f64>,
}

/// A single payment method used to settle the receipt.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethod {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_last_four: Option<String>,
}

/// The receipt's money totals.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtotal: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tip: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<f64>,
}

/// A retail receipt: merchant info, line items, totals, taxes, and
/// payment method. Only `confidence` is required (spec §4.5).
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    /// Confidence that this extraction is correct, in `[0, 1]`.
    pub confidence: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant: Option<Merchant>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt_type: Option<ReceiptType>,
    /// ISO-8601 timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub totals: Option<Totals>,
    /// ISO-4217 currency code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<LineItem>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub taxes: Vec<TaxItem>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub payments: Vec<PaymentMethod>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub notes: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,

    /// Set by the hallucination audit (spec §4.4); absent until then.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_valid_input: Option<bool>,
}

impl Receipt {
    /// How many of the top-level optional fields are populated. Used by
    /// the extractor's structural-completeness score (spec §4.3).
    pub fn populated_optional_field_count(&self) -> usize {
        [
            self.merchant.is_some(),
            self.receipt_number.is_some(),
            self.receipt_type.is_some(),
            self.timestamp.is_some(),
            self.totals.is_some(),
            self.currency.is_some(),
            !self.items.is_empty(),
            !self.taxes.is_empty(),
            !self.payments.is_empty(),
            !self.notes.is_empty(),
        ]
        .into_iter()
        .filter(|populated| *populated)
        .count()
    }

    /// Total number of optional fields considered by
    /// [`Self::populated_optional_field_count`].
    pub const OPTIONAL_FIELD_COUNT: usize = 10;

    /// Soft consistency check (spec §3, §9): does
    /// `sum(items.totalPrice) + sum(taxes.taxAmount) + tip - discount`
    /// approximately equal `totals.total`?
    ///
    /// Returns `true` when there isn't enough data to check (no totals,
    /// or `total` missing) — absence of data isn't a contradiction.
    pub fn totals_are_consistent(&self) -> bool {
        let Some(totals) = &self.totals else {
            return true;
        };
        let Some(total) = totals.total else {
            return true;
        };
        let items_sum: f64 = self.items.iter().filter_map(|item| item.total_price).sum();
        let taxes_sum: f64 = self.taxes.iter().filter_map(|tax| tax.tax_amount).sum();
        let tip = totals.tip.unwrap_or(0.0);
        let discount = totals.discount.unwrap_or(0.0);
        let computed = items_sum + taxes_sum + tip - discount;
        let tolerance = (total.abs() * 0.01).max(0.02);
        (computed - total).abs() <= tolerance
    }
}
