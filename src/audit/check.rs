//! Suspicious-signal table for `Check` (spec §4.4).

use crate::schema::Check;

const DUMMY_CHECK_NUMBERS: &[&str] = &["1234", "5678", "0000"];
const PLACEHOLDER_PAYEES: &[&str] = &["John Doe", "Jane Doe", "John Smith"];
const SUSPICIOUS_AMOUNTS: &[f64] = &[100.0, 150.75, 200.0, 500.0];
const DUMMY_DATES: &[&str] = &["2023-10-05", "2000-01-01", "1970-01-01", "2020-01-01"];

/// Count how many suspicious signals this check matches.
pub fn count_signals(check: &Check) -> usize {
    let mut matched = 0;
    if check
        .check_number
        .as_deref()
        .is_some_and(|n| DUMMY_CHECK_NUMBERS.contains(&n))
    {
        matched += 1;
    }
    if check
        .payee
        .as_deref()
        .is_some_and(|p| PLACEHOLDER_PAYEES.contains(&p))
    {
        matched += 1;
    }
    if check
        .amount
        .is_some_and(|amount| SUSPICIOUS_AMOUNTS.iter().any(|s| (*s - amount).abs() < 1e-9))
    {
        matched += 1;
    }
    if check
        .date
        .as_deref()
        .is_some_and(|d| DUMMY_DATES.contains(&d))
    {
        matched += 1;
    }
    matched
}
