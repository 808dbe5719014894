//! Suspicious-signal table for `Receipt` (spec §4.4).

use crate::schema::Receipt;

const PLACEHOLDER_MERCHANT_NAMES: &[&str] = &[
    "Acme Corp",
    "Sample Store",
    "Test Merchant",
    "Example Store",
    "Merchant Name",
];
const PLACEHOLDER_TIMESTAMPS: &[&str] =
    &["1970-01-01T00:00:00Z", "2000-01-01T00:00:00Z", "2020-01-01T00:00:00Z"];

/// Currencies we know how to sanity-check against a merchant's
/// apparent region, inferred crudely from punctuation in the address
/// (spec §4.4: "currency mismatch with merchant region when
/// inferable" — a best-effort signal, not a full geocoder).
const US_CURRENCY: &str = "USD";

/// Count how many suspicious signals this receipt matches.
pub fn count_signals(receipt: &Receipt) -> usize {
    let mut matched = 0;

    if receipt
        .merchant
        .as_ref()
        .and_then(|m| m.name.as_deref())
        .is_some_and(|name| PLACEHOLDER_MERCHANT_NAMES.contains(&name))
    {
        matched += 1;
    }

    if is_round_total_with_no_items(receipt) {
        matched += 1;
    }

    if receipt
        .timestamp
        .as_deref()
        .is_some_and(|ts| PLACEHOLDER_TIMESTAMPS.contains(&ts))
    {
        matched += 1;
    }

    if currency_mismatches_region(receipt) {
        matched += 1;
    }

    matched
}

/// A "too clean" total: a round-dollar figure with no supporting line
/// items, a classic sign of a fabricated receipt.
fn is_round_total_with_no_items(receipt: &Receipt) -> bool {
    let Some(total) = receipt.totals.as_ref().and_then(|t| t.total) else {
        return false;
    };
    receipt.items.is_empty() && total > 0.0 && (total * 100.0).round() % 100.0 == 0.0
}

/// A crude mismatch check: a US street address (contains a two-letter
/// state abbreviation pattern like ", CA ") paired with a non-USD
/// currency, or vice versa.
fn currency_mismatches_region(receipt: &Receipt) -> bool {
    let Some(currency) = receipt.currency.as_deref() else {
        return false;
    };
    let Some(address) = receipt
        .merchant
        .as_ref()
        .and_then(|m| m.address.as_deref())
    else {
        return false;
    };
    let looks_us = address.contains(" CA ")
        || address.contains(" NY ")
        || address.contains(" TX ")
        || address.ends_with("USA");
    looks_us && currency != US_CURRENCY
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::receipt::{Merchant, Totals};

    #[test]
    fn test_no_signals_for_realistic_receipt() {
        let receipt = Receipt {
            confidence: 0.9,
            merchant: Some(Merchant {
                name: Some("Trattoria Italia".into()),
                ..Default::default()
            }),
            totals: Some(Totals {
                total: Some(37.42),
                ..Default::default()
            }),
            items: vec![crate::schema::receipt::LineItem {
                description: Some("Pasta".into()),
                quantity: Some(1.0),
                unit_price: Some(37.42),
                total_price: Some(37.42),
                sku: None,
            }],
            ..Default::default()
        };
        assert_eq!(count_signals(&receipt), 0);
    }

    #[test]
    fn test_placeholder_merchant_and_round_total() {
        let receipt = Receipt {
            confidence: 0.9,
            merchant: Some(Merchant {
                name: Some("Sample Store".into()),
                ..Default::default()
            }),
            totals: Some(Totals {
                total: Some(100.0),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(count_signals(&receipt), 2);
    }

    #[test]
    fn test_currency_region_mismatch() {
        let receipt = Receipt {
            confidence: 0.9,
            merchant: Some(Merchant {
                address: Some("100 Main St, Los Angeles, CA 90001".into()),
                ..Default::default()
            }),
            currency: Some("EUR".into()),
            ..Default::default()
        };
        assert_eq!(count_signals(&receipt), 1);
    }
}
