//! Custom validators for request payloads.

use once_cell::sync::Lazy;
use regex::Regex;
use validator::ValidationError;

/// Non-negative decimal with at most two fraction digits, e.g. `24.99`
static AMOUNT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+(\.\d{1,2})?$").expect("amount pattern is valid"));

/// Validate a money amount sent as a decimal string.
pub fn validate_amount(value: &str) -> Result<(), ValidationError> {
    if AMOUNT_RE.is_match(value) {
        Ok(())
    } else {
        let mut err = ValidationError::new("amount");
        err.message = Some("must be a decimal amount such as 24.99".into());
        Err(err)
    }
}

/// Reject strings that are empty once surrounding whitespace is removed.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("must not be blank".into());
        Err(err)
    } else {
        Ok(())
    }
}
