//! # Validation Module
//!
//! Parsing and checks for values that arrive as text (command line,
//! config files) before any business logic or network call runs.
//!
//! ## Usage
//! ```rust
//! use fleetrent_core::validation::{parse_date, parse_daily_rate};
//!
//! let d = parse_date("start date", "05-01-2025").unwrap();
//! assert_eq!(d, parse_date("start date", "2025-01-05").unwrap());
//!
//! assert!(parse_daily_rate("1.5").is_ok());
//! assert!(parse_daily_rate("0").is_err());
//! ```

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::ValidationError;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Date format used by the indicator source in request paths.
pub const INDICATOR_DATE_FORMAT: &str = "%d-%m-%Y";

/// ISO calendar date format.
pub const ISO_DATE_FORMAT: &str = "%Y-%m-%d";

// =============================================================================
// Date Validators
// =============================================================================

/// Parses a calendar date in `YYYY-MM-DD` or `DD-MM-YYYY` form.
///
/// ## Rejects
/// - Empty input
/// - Days that do not exist (`31-02-2025`)
/// - Anything else chrono cannot parse in either format
pub fn parse_date(field: &str, input: &str) -> ValidationResult<NaiveDate> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    NaiveDate::parse_from_str(trimmed, ISO_DATE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(trimmed, INDICATOR_DATE_FORMAT))
        .map_err(|e| ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: format!("'{}' is not a valid date: {}", trimmed, e),
        })
}

/// Formats a date the way the indicator source expects it (`DD-MM-YYYY`).
pub fn format_indicator_date(date: NaiveDate) -> String {
    date.format(INDICATOR_DATE_FORMAT).to_string()
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Parses a daily rate in indicator units. Must be a positive decimal.
pub fn parse_daily_rate(input: &str) -> ValidationResult<Decimal> {
    let rate: Decimal = input
        .trim()
        .parse()
        .map_err(|e: rust_decimal::Error| ValidationError::InvalidFormat {
            field: "daily rate".to_string(),
            reason: e.to_string(),
        })?;

    if rate <= Decimal::ZERO {
        return Err(ValidationError::MustBePositive {
            field: "daily rate".to_string(),
        });
    }
    Ok(rate)
}

// =============================================================================
// String Validators
// =============================================================================

/// Normalizes a license plate: trimmed, uppercase, non-empty.
///
/// Format rules for plates are handled elsewhere.
pub fn normalize_plate(plate: &str) -> ValidationResult<String> {
    let trimmed = plate.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required {
            field: "plate".to_string(),
        });
    }
    Ok(trimmed.to_uppercase())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_date_both_formats() {
        let expected = NaiveDate::from_ymd_opt(2025, 1, 5).unwrap();
        assert_eq!(parse_date("date", "2025-01-05").unwrap(), expected);
        assert_eq!(parse_date("date", "05-01-2025").unwrap(), expected);
        assert_eq!(parse_date("date", "  2025-01-05 ").unwrap(), expected);
    }

    #[test]
    fn test_parse_date_rejects_impossible_day() {
        let err = parse_date("date", "31-02-2025").unwrap_err();
        assert!(matches!(err, ValidationError::InvalidFormat { .. }));
    }

    #[test]
    fn test_parse_date_rejects_garbage_and_empty() {
        assert!(matches!(
            parse_date("date", "tomorrow"),
            Err(ValidationError::InvalidFormat { .. })
        ));
        assert!(matches!(
            parse_date("date", ""),
            Err(ValidationError::Required { .. })
        ));
    }

    #[test]
    fn test_format_indicator_date() {
        let d = NaiveDate::from_ymd_opt(2025, 1, 5).unwrap();
        assert_eq!(format_indicator_date(d), "05-01-2025");
    }

    #[test]
    fn test_parse_daily_rate() {
        assert_eq!(parse_daily_rate("1.25").unwrap(), dec!(1.25));
        assert!(matches!(
            parse_daily_rate("0"),
            Err(ValidationError::MustBePositive { .. })
        ));
        assert!(matches!(
            parse_daily_rate("abc"),
            Err(ValidationError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn test_normalize_plate() {
        assert_eq!(normalize_plate(" ab-cd-12 ").unwrap(), "AB-CD-12");
        assert!(normalize_plate("   ").is_err());
    }
}
