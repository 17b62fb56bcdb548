//! Quantity reconciliation for the inspection entry forms.
//!
//! Each entry type keeps a conserved partition of a source quantity:
//!
//! | Type | Fields                                  | Invariant                                  |
//! |------|-----------------------------------------|--------------------------------------------|
//! | IPQC | `before`, `after`, `after_postcured`     | `before + after + after_postcured == source` |
//! | OQC  | `before`, `after`, `hold_return`         | `before + after + hold_return == source`     |
//!
//! Setters take raw `i64` input (what a user typed, already coerced by
//! [`parse_raw`]) and never leave a field negative.

pub mod ipqc;
pub mod oqc;

pub use ipqc::IpqcQuantities;
pub use oqc::OqcQuantities;

/// Coerce free-form user input to an integer.
///
/// Empty, non-numeric and non-finite input reads as 0. Decimals are
/// truncated toward zero. The sign is kept so that submit-time validation
/// can still report negative input.
pub fn parse_raw(input: &str) -> i64 {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return 0;
    }
    if let Ok(v) = trimmed.parse::<i64>() {
        return v;
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => v.trunc() as i64,
        _ => 0,
    }
}

/// Floor a raw value at zero.
pub fn clamp(raw: i64) -> u64 {
    raw.max(0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_raw_handles_garbage() {
        assert_eq!(parse_raw(""), 0);
        assert_eq!(parse_raw("   "), 0);
        assert_eq!(parse_raw("NaN"), 0);
        assert_eq!(parse_raw("abc"), 0);
        assert_eq!(parse_raw("inf"), 0);
    }

    #[test]
    fn parse_raw_keeps_sign_and_truncates() {
        assert_eq!(parse_raw("42"), 42);
        assert_eq!(parse_raw(" -7 "), -7);
        assert_eq!(parse_raw("12.9"), 12);
        assert_eq!(parse_raw("-0.5"), 0);
    }

    #[test]
    fn clamp_floors_at_zero() {
        assert_eq!(clamp(-10), 0);
        assert_eq!(clamp(0), 0);
        assert_eq!(clamp(15), 15);
    }
}
