//! Input validation for API requests.
//!
//! Validators return `Result<(), String>` and are collected into field-level
//! errors with the `ValidationErrorBuilder` from the `error` module.

use lazy_static::lazy_static;
use regex::Regex;

use crate::db::DiscountType;

lazy_static! {
    /// Regex for validating email addresses
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9][-a-zA-Z0-9]*(\.[a-zA-Z0-9][-a-zA-Z0-9]*)+$"
    ).unwrap();

    /// Regex for validating coupon codes (after case normalization)
    static ref COUPON_CODE_REGEX: Regex = Regex::new(
        r"^[A-Z0-9][A-Z0-9-]{2,31}$"
    ).unwrap();
}

/// Validate an email address
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email is too long (max 254 characters)".to_string());
    }

    if !EMAIL_REGEX.is_match(email) {
        return Err("Invalid email address".to_string());
    }

    Ok(())
}

/// Validate a password for registration
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.len() < 8 {
        return Err("Password must be at least 8 characters".to_string());
    }

    if password.len() > 128 {
        return Err("Password is too long (max 128 characters)".to_string());
    }

    Ok(())
}

/// Validate a display name
pub fn validate_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Name is required".to_string());
    }

    if name.len() > 100 {
        return Err("Name is too long (max 100 characters)".to_string());
    }

    Ok(())
}

/// Validate a brand or model label
pub fn validate_label(value: &str, field: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        return Err(format!("{} is required", field));
    }

    if value.len() > 100 {
        return Err(format!("{} is too long (max 100 characters)", field));
    }

    Ok(())
}

/// Validate a device weight in kilograms
pub fn validate_weight(weight: f64) -> Result<(), String> {
    if !weight.is_finite() || weight <= 0.0 {
        return Err("Weight must be a positive number".to_string());
    }

    if weight > 10_000.0 {
        return Err("Weight is out of range (max 10000)".to_string());
    }

    Ok(())
}

/// Validate a coupon code (already case-normalized)
pub fn validate_coupon_code(code: &str) -> Result<(), String> {
    if code.is_empty() {
        return Err("Coupon code is required".to_string());
    }

    if !COUPON_CODE_REGEX.is_match(code) {
        return Err(
            "Coupon code must be 3-32 characters of letters, digits and dashes".to_string(),
        );
    }

    Ok(())
}

/// Validate a discount value against its type
pub fn validate_discount(discount_type: DiscountType, value: f64) -> Result<(), String> {
    if !value.is_finite() || value < 0.0 {
        return Err("Discount value must be non-negative".to_string());
    }

    if discount_type == DiscountType::Percentage && value > 100.0 {
        return Err("Percentage discount cannot exceed 100".to_string());
    }

    Ok(())
}

/// Validate a non-negative monetary amount
pub fn validate_amount(value: f64, field: &str) -> Result<(), String> {
    if !value.is_finite() || value < 0.0 {
        return Err(format!("{} must be non-negative", field));
    }

    Ok(())
}

/// Validate a usage limit
pub fn validate_usage_limit(limit: i64) -> Result<(), String> {
    if limit < 1 {
        return Err("Usage limit must be at least 1".to_string());
    }

    Ok(())
}

/// Validate an RFC 3339 date-time string
pub fn validate_date(value: &str, field: &str) -> Result<(), String> {
    chrono::DateTime::parse_from_rfc3339(value)
        .map(|_| ())
        .map_err(|_| format!("{} must be an RFC 3339 date-time", field))
}

/// Validate a minPrice/maxPrice pair
pub fn validate_price_range(min: Option<f64>, max: Option<f64>) -> Result<(), String> {
    if let Some(min) = min {
        if !min.is_finite() || min < 0.0 {
            return Err("minPrice must be non-negative".to_string());
        }
    }
    if let Some(max) = max {
        if !max.is_finite() || max < 0.0 {
            return Err("maxPrice must be non-negative".to_string());
        }
    }
    if let (Some(min), Some(max)) = (min, max) {
        if min > max {
            return Err("minPrice cannot exceed maxPrice".to_string());
        }
    }

    Ok(())
}

/// Validate that a string is a UUID
pub fn validate_uuid(value: &str, field: &str) -> Result<(), String> {
    uuid::Uuid::parse_str(value)
        .map(|_| ())
        .map_err(|_| format!("{} must be a valid UUID", field))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_email() {
        assert!(validate_email("alice@example.com").is_ok());
        assert!(validate_email("a.b+c@mail.co.uk").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("user@").is_err());
        assert!(validate_email("@example.com").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("longenough").is_ok());
        assert!(validate_password("short").is_err());
        assert!(validate_password(&"x".repeat(200)).is_err());
    }

    #[test]
    fn test_validate_weight() {
        assert!(validate_weight(0.5).is_ok());
        assert!(validate_weight(0.0).is_err());
        assert!(validate_weight(-1.0).is_err());
        assert!(validate_weight(f64::NAN).is_err());
        assert!(validate_weight(20_000.0).is_err());
    }

    #[test]
    fn test_validate_coupon_code() {
        assert!(validate_coupon_code("SUMMER25").is_ok());
        assert!(validate_coupon_code("EARTH-DAY-26").is_ok());
        assert!(validate_coupon_code("AB").is_err());
        assert!(validate_coupon_code("").is_err());
        assert!(validate_coupon_code("lower case").is_err());
    }

    #[test]
    fn test_validate_discount() {
        assert!(validate_discount(DiscountType::Percentage, 25.0).is_ok());
        assert!(validate_discount(DiscountType::Percentage, 101.0).is_err());
        assert!(validate_discount(DiscountType::Fixed, 500.0).is_ok());
        assert!(validate_discount(DiscountType::Fixed, -1.0).is_err());
    }

    #[test]
    fn test_validate_date() {
        assert!(validate_date("2026-01-01T00:00:00+00:00", "expirationDate").is_ok());
        assert!(validate_date("2026-01-01T00:00:00Z", "expirationDate").is_ok());
        assert!(validate_date("2026-01-01", "expirationDate").is_err());
        assert!(validate_date("soon", "expirationDate").is_err());
    }

    #[test]
    fn test_validate_price_range() {
        assert!(validate_price_range(Some(10.0), Some(100.0)).is_ok());
        assert!(validate_price_range(None, None).is_ok());
        assert!(validate_price_range(Some(100.0), Some(10.0)).is_err());
        assert!(validate_price_range(Some(-5.0), None).is_err());
    }
}
