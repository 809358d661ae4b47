// Validation utilities module
// Provides custom validation functions for domain-specific rules

use once_cell::sync::Lazy;
use regex::Regex;
use validator::{ValidationError, ValidationErrors};

/// Accepted employee email shape: ASCII word characters with optional `.`/`-`
/// separators on both sides of `@`, ending in a 2-3 character suffix.
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[A-Za-z0-9_]+([.-]?[A-Za-z0-9_]+)*@[A-Za-z0-9_]+([.-]?[A-Za-z0-9_]+)*(\.[A-Za-z0-9_]{2,3})+$",
    )
    .expect("email regex is valid")
});

// Must agree with the CHECK constraint on employees.mobile
static MOBILE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{10}$").expect("mobile regex is valid"));

/// Validates an employee email address
pub fn validate_employee_email(email: &str) -> Result<(), ValidationError> {
    if EMAIL_RE.is_match(email) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_email"))
    }
}

/// Validates that a mobile number is exactly ten ASCII digits
pub fn validate_mobile(mobile: &str) -> Result<(), ValidationError> {
    if MOBILE_RE.is_match(mobile) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_mobile"))
    }
}

/// Picks a single human-readable message out of a set of field errors.
///
/// Fields are visited in name order so the same input always yields the same message.
pub fn first_message(errors: &ValidationErrors) -> String {
    let field_errors = errors.field_errors();
    let mut fields: Vec<_> = field_errors.keys().copied().collect();
    fields.sort_unstable();

    fields
        .into_iter()
        .filter_map(|field| field_errors.get(field))
        .flat_map(|errs| errs.iter())
        .find_map(|err| err.message.as_ref().map(|m| m.to_string()))
        .unwrap_or_else(|| "Request validation failed".to_string())
}
