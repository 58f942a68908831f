use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ApiError;

pub const TITLE_MAX_CHARS: usize = 100;
pub const DESCRIPTION_MAX_CHARS: usize = 500;
pub const RATING_MIN: f64 = 1.0;
pub const RATING_MAX: f64 = 10.0;

/// Length checks run against the raw input; trimming happens afterwards, when
/// the value is prepared for storage.
pub fn title(raw: &str) -> Result<(), ApiError> {
    if raw.chars().count() > TITLE_MAX_CHARS {
        return Err(ApiError::Validation(format!(
            "Title must be {TITLE_MAX_CHARS} characters or less"
        )));
    }
    Ok(())
}

pub fn rating(value: f64) -> Result<(), ApiError> {
    if !(RATING_MIN..=RATING_MAX).contains(&value) {
        return Err(ApiError::Validation(
            "Rating must be between 1 and 10".into(),
        ));
    }
    Ok(())
}

pub fn description(raw: &str) -> Result<(), ApiError> {
    if raw.chars().count() > DESCRIPTION_MAX_CHARS {
        return Err(ApiError::Validation(format!(
            "Description must be {DESCRIPTION_MAX_CHARS} characters or less"
        )));
    }
    Ok(())
}

pub fn currency(code: &str) -> Result<(), ApiError> {
    lazy_static! {
        static ref CURRENCY_RE: Regex = Regex::new(r"^[A-Za-z]{3}$").unwrap();
    }
    if !CURRENCY_RE.is_match(code) {
        return Err(ApiError::Validation(
            "Currency must be a 3-letter code".into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_accepts_exactly_max_length() {
        assert!(title(&"x".repeat(100)).is_ok());
        assert!(title(&"x".repeat(101)).is_err());
    }

    #[test]
    fn title_length_is_checked_before_trimming() {
        // 99 chars plus two spaces: would pass if trimmed first, must fail raw
        let padded = format!(" {} ", "x".repeat(99));
        assert!(title(&padded).is_err());
    }

    #[test]
    fn rating_bounds_are_inclusive() {
        assert!(rating(1.0).is_ok());
        assert!(rating(10.0).is_ok());
        assert!(rating(0.0).is_err());
        assert!(rating(11.0).is_err());
        assert!(rating(0.99).is_err());
        assert!(rating(f64::NAN).is_err());
    }

    #[test]
    fn description_limit() {
        assert!(description(&"d".repeat(500)).is_ok());
        assert!(description(&"d".repeat(501)).is_err());
    }

    #[test]
    fn currency_must_be_three_letters() {
        assert!(currency("USD").is_ok());
        assert!(currency("eur").is_ok());
        assert!(currency("US").is_err());
        assert!(currency("DOLLARS").is_err());
        assert!(currency("U$D").is_err());
    }
}
