//! Internal helpers for input validation and normalization.
//!
//! These utilities are **not** part of the public API. They keep the rules
//! for names, amounts and periods in one place so every write path enforces
//! them the same way.

use chrono::{Datelike, Utc};

use crate::{EngineError, ResultEngine};

pub(crate) const MIN_YEAR: i32 = 1900;
const MAX_YEARS_AHEAD: i32 = 10;
/// Upper bound of a single stored amount.
pub(crate) const MAX_AMOUNT: f64 = 1e12;

/// Trim and lower-case a month label. Empty labels are rejected.
pub(crate) fn normalize_month(month: &str) -> ResultEngine<String> {
    let month = month.trim();
    if month.is_empty() {
        return Err(EngineError::InvalidPeriod(
            "month must not be empty".to_string(),
        ));
    }
    Ok(month.to_lowercase())
}

pub(crate) fn validate_year(year: i32) -> ResultEngine<i32> {
    let max = Utc::now().year() + MAX_YEARS_AHEAD;
    if !(MIN_YEAR..=max).contains(&year) {
        return Err(EngineError::InvalidPeriod(format!(
            "year must be between {MIN_YEAR} and {max}"
        )));
    }
    Ok(year)
}

/// Amounts are finite, non-negative and at most [`MAX_AMOUNT`].
pub(crate) fn validate_amount(amount: f64, label: &str) -> ResultEngine<f64> {
    if !amount.is_finite() {
        return Err(EngineError::InvalidAmount(format!(
            "{label} amount must be a finite number"
        )));
    }
    if amount < 0.0 {
        return Err(EngineError::InvalidAmount(format!(
            "{label} amount must be >= 0"
        )));
    }
    if amount > MAX_AMOUNT {
        return Err(EngineError::InvalidAmount(format!(
            "{label} amount must be <= {MAX_AMOUNT}"
        )));
    }
    Ok(amount)
}

/// Trim a name and check its length in characters.
pub(crate) fn normalize_name(
    value: &str,
    label: &str,
    min: usize,
    max: usize,
) -> ResultEngine<String> {
    let trimmed = value.trim();
    let len = trimmed.chars().count();
    if len < min || len > max {
        return Err(EngineError::InvalidName(format!(
            "{label} must be between {min} and {max} characters"
        )));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}

pub(crate) fn normalize_email(email: &str) -> ResultEngine<String> {
    let email = email.trim().to_lowercase();
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !domain.contains('@')
        }
        None => false,
    };
    if !valid || email.chars().any(char::is_whitespace) {
        return Err(EngineError::InvalidName(format!("invalid email: {email}")));
    }
    Ok(email)
}

pub(crate) fn validate_password(password: &str) -> ResultEngine<()> {
    let len = password.chars().count();
    if !(6..=20).contains(&len) {
        return Err(EngineError::InvalidName(
            "password must be between 6 and 20 characters".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn months_are_trimmed_and_lowercased() {
        assert_eq!(normalize_month("  March ").unwrap(), "march");
        assert!(normalize_month("   ").is_err());
    }

    #[test]
    fn year_bounds() {
        let now = Utc::now().year();
        assert!(validate_year(MIN_YEAR).is_ok());
        assert!(validate_year(now + 10).is_ok());
        assert!(validate_year(MIN_YEAR - 1).is_err());
        assert!(validate_year(now + 11).is_err());
    }

    #[test]
    fn amounts_must_be_finite_and_positive() {
        assert_eq!(validate_amount(0.0, "budget").unwrap(), 0.0);
        assert!(matches!(
            validate_amount(-1.0, "budget"),
            Err(EngineError::InvalidAmount(_))
        ));
        assert!(validate_amount(f64::NAN, "budget").is_err());
        assert!(validate_amount(f64::INFINITY, "budget").is_err());
    }

    #[test]
    fn amounts_have_an_upper_bound() {
        assert_eq!(validate_amount(MAX_AMOUNT, "expense").unwrap(), MAX_AMOUNT);
        assert!(matches!(
            validate_amount(1e308, "expense"),
            Err(EngineError::InvalidAmount(_))
        ));
    }

    #[test]
    fn emails_are_lowercased() {
        assert_eq!(
            normalize_email(" Ada@Example.COM ").unwrap(),
            "ada@example.com"
        );
        assert!(normalize_email("ada.example.com").is_err());
        assert!(normalize_email("ada@example").is_err());
        assert!(normalize_email("@example.com").is_err());
    }

    #[test]
    fn name_length_is_counted_in_chars() {
        assert_eq!(normalize_name(" Zoë ", "first name", 2, 30).unwrap(), "Zoë");
        assert!(normalize_name("A", "first name", 2, 30).is_err());
        assert!(normalize_name(&"x".repeat(31), "first name", 2, 30).is_err());
    }

    #[test]
    fn password_length() {
        assert!(validate_password("12345").is_err());
        assert!(validate_password("123456").is_ok());
        assert!(validate_password(&"p".repeat(21)).is_err());
    }
}
