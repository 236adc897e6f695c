//! Input validation for externally supplied identifiers, URLs, and numbers.
//!
//! All validators are pure functions returning a [`ValidationResult`]; they
//! never panic. Failures carry a closed set of [`ValidationErrorCode`]s so
//! callers can react to the code rather than the message. Results become
//! hard errors only at integration boundaries (configuration intake) via
//! `?`, never inside the hot render path.

use std::fmt;

use crate::core::sanitize::is_safe_url;

/// Maximum slot identifier length, inclusive.
pub const SLOT_ID_MAX_LENGTH: usize = 100;

/// Maximum CSP nonce length, inclusive.
pub const CSP_NONCE_MAX_LENGTH: usize = 128;

// =============================================================================
// Result Types
// =============================================================================

/// Closed enumeration of validation error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorCode {
    EmptySlotId,
    InvalidSlotIdFormat,
    SlotIdTooLong,
    InvalidUrl,
    InvalidType,
    OutOfRange,
    InvalidNonceFormat,
    NonceTooLong,
}

impl ValidationErrorCode {
    /// Wire-stable name of this code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EmptySlotId => "EMPTY_SLOT_ID",
            Self::InvalidSlotIdFormat => "INVALID_SLOT_ID_FORMAT",
            Self::SlotIdTooLong => "SLOT_ID_TOO_LONG",
            Self::InvalidUrl => "INVALID_URL",
            Self::InvalidType => "INVALID_TYPE",
            Self::OutOfRange => "OUT_OF_RANGE",
            Self::InvalidNonceFormat => "INVALID_NONCE_FORMAT",
            Self::NonceTooLong => "NONCE_TOO_LONG",
        }
    }
}

impl fmt::Display for ValidationErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed validation with its code and human-readable message.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    pub code: ValidationErrorCode,
    pub message: String,
}

impl ValidationError {
    fn new(code: ValidationErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Outcome of a validation check.
pub type ValidationResult = Result<(), ValidationError>;

// =============================================================================
// Validators
// =============================================================================

/// Validate a slot identifier.
///
/// Must be 1-100 characters, start with a letter, and contain only
/// letters, numbers, hyphens, and underscores. Length exactly
/// [`SLOT_ID_MAX_LENGTH`] is valid.
pub fn validate_slot_id(slot_id: &str) -> ValidationResult {
    if slot_id.is_empty() {
        return Err(ValidationError::new(
            ValidationErrorCode::EmptySlotId,
            "Slot ID cannot be empty",
        ));
    }

    if slot_id.len() > SLOT_ID_MAX_LENGTH {
        return Err(ValidationError::new(
            ValidationErrorCode::SlotIdTooLong,
            format!("Slot ID cannot exceed {} characters", SLOT_ID_MAX_LENGTH),
        ));
    }

    let mut chars = slot_id.chars();
    let starts_with_letter = chars.next().is_some_and(|c| c.is_ascii_alphabetic());
    let rest_valid = chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');

    if !starts_with_letter || !rest_valid {
        return Err(ValidationError::new(
            ValidationErrorCode::InvalidSlotIdFormat,
            "Slot ID must start with a letter and contain only letters, numbers, hyphens, and underscores",
        ));
    }

    Ok(())
}

/// Validate a URL used to build a request.
///
/// Accepts absolute and relative URLs; rejects empty input and
/// dangerous protocols (`javascript:`, `data:`, etc.).
pub fn validate_url(url: &str) -> ValidationResult {
    if url.is_empty() {
        return Err(ValidationError::new(
            ValidationErrorCode::InvalidUrl,
            "URL cannot be empty",
        ));
    }

    if !is_safe_url(url) {
        return Err(ValidationError::new(
            ValidationErrorCode::InvalidUrl,
            "URL contains dangerous protocol",
        ));
    }

    Ok(())
}

/// Validate that a number lies within an inclusive range.
///
/// NaN and non-finite values are rejected with `INVALID_TYPE`, keeping
/// the original wire contract's type/range distinction.
pub fn validate_number_range(value: f64, min: f64, max: f64) -> ValidationResult {
    if value.is_nan() || !value.is_finite() {
        return Err(ValidationError::new(
            ValidationErrorCode::InvalidType,
            "Value must be a finite number",
        ));
    }

    if value < min || value > max {
        return Err(ValidationError::new(
            ValidationErrorCode::OutOfRange,
            format!("Value must be between {} and {}", min, max),
        ));
    }

    Ok(())
}

/// Validate a CSP nonce.
///
/// Empty is valid (nonce is optional). Otherwise the nonce must be at
/// most 128 characters of letters, numbers, hyphens, and underscores.
pub fn validate_csp_nonce(nonce: &str) -> ValidationResult {
    if nonce.is_empty() {
        return Ok(());
    }

    if nonce.len() > CSP_NONCE_MAX_LENGTH {
        return Err(ValidationError::new(
            ValidationErrorCode::NonceTooLong,
            format!("Nonce cannot exceed {} characters", CSP_NONCE_MAX_LENGTH),
        ));
    }

    if !nonce
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::new(
            ValidationErrorCode::InvalidNonceFormat,
            "Nonce must contain only letters, numbers, hyphens, and underscores",
        ));
    }

    Ok(())
}

// =============================================================================
// Configuration Range Wrappers
// =============================================================================

/// Validate a per-attempt timeout: 100..=60000 ms.
pub fn validate_timeout(timeout_ms: f64) -> ValidationResult {
    validate_number_range(timeout_ms, 100.0, 60_000.0)
}

/// Validate a cache TTL: 0..=3600000 ms (1 hour).
pub fn validate_cache_ttl(ttl_ms: f64) -> ValidationResult {
    validate_number_range(ttl_ms, 0.0, 3_600_000.0)
}

/// Validate a retry attempt count: 0..=10.
pub fn validate_retry_attempts(attempts: f64) -> ValidationResult {
    validate_number_range(attempts, 0.0, 10.0)
}

/// Validate a retry delay: 100..=60000 ms.
pub fn validate_retry_delay(delay_ms: f64) -> ValidationResult {
    validate_number_range(delay_ms, 100.0, 60_000.0)
}

// =============================================================================
// Composition
// =============================================================================

/// Run validations in order, short-circuiting on the first failure.
///
/// The first failing check wins; errors are never aggregated. This is
/// the composition policy for multi-field validation at configuration
/// intake.
pub fn validate_batch<I>(checks: I) -> ValidationResult
where
    I: IntoIterator<Item = ValidationResult>,
{
    for check in checks {
        check?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_id_boundaries() {
        assert!(validate_slot_id(&"a".repeat(100)).is_ok());

        let too_long = validate_slot_id(&"a".repeat(101));
        assert_eq!(
            too_long.unwrap_err().code,
            ValidationErrorCode::SlotIdTooLong
        );
    }

    #[test]
    fn slot_id_format() {
        assert!(validate_slot_id("ad-123").is_ok());
        assert!(validate_slot_id("Banner_top").is_ok());

        let digit_start = validate_slot_id("1ad");
        assert_eq!(
            digit_start.unwrap_err().code,
            ValidationErrorCode::InvalidSlotIdFormat
        );

        let bad_char = validate_slot_id("ad.123");
        assert_eq!(
            bad_char.unwrap_err().code,
            ValidationErrorCode::InvalidSlotIdFormat
        );

        let empty = validate_slot_id("");
        assert_eq!(empty.unwrap_err().code, ValidationErrorCode::EmptySlotId);
    }

    #[test]
    fn url_rejects_dangerous_protocols() {
        assert!(validate_url("https://ads.example.com/v1").is_ok());
        assert!(validate_url("/api/v1").is_ok());

        for url in ["javascript:alert(1)", "data:text/html,x", "vbscript:x"] {
            let result = validate_url(url);
            assert_eq!(result.unwrap_err().code, ValidationErrorCode::InvalidUrl);
        }

        let empty = validate_url("");
        assert_eq!(empty.unwrap_err().code, ValidationErrorCode::InvalidUrl);
    }

    #[test]
    fn number_range_is_inclusive() {
        assert!(validate_number_range(100.0, 100.0, 60_000.0).is_ok());
        assert!(validate_number_range(60_000.0, 100.0, 60_000.0).is_ok());

        let below = validate_number_range(99.0, 100.0, 60_000.0);
        assert_eq!(below.unwrap_err().code, ValidationErrorCode::OutOfRange);

        let nan = validate_number_range(f64::NAN, 0.0, 1.0);
        assert_eq!(nan.unwrap_err().code, ValidationErrorCode::InvalidType);

        let inf = validate_number_range(f64::INFINITY, 0.0, 1.0);
        assert_eq!(inf.unwrap_err().code, ValidationErrorCode::InvalidType);
    }

    #[test]
    fn nonce_rules() {
        assert!(validate_csp_nonce("").is_ok());
        assert!(validate_csp_nonce("abc-DEF_123").is_ok());

        let too_long = validate_csp_nonce(&"a".repeat(129));
        assert_eq!(too_long.unwrap_err().code, ValidationErrorCode::NonceTooLong);

        let bad = validate_csp_nonce("abc!");
        assert_eq!(
            bad.unwrap_err().code,
            ValidationErrorCode::InvalidNonceFormat
        );
    }

    #[test]
    fn batch_short_circuits_in_order() {
        let first = ValidationError {
            code: ValidationErrorCode::EmptySlotId,
            message: "first".into(),
        };
        let second = ValidationError {
            code: ValidationErrorCode::InvalidUrl,
            message: "second".into(),
        };

        let result = validate_batch([Err(first.clone()), Err(second)]);
        assert_eq!(result.unwrap_err(), first);

        assert!(validate_batch([Ok(()), Ok(())]).is_ok());
    }
}
