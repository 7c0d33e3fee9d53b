//! Phone number value objects.
//!
//! [`PhoneNumber`] is a normalized ten-digit North American number, the only
//! shape a validated lead carries. [`E164Number`] is the looser international
//! form accepted as a messaging destination.

use super::errors::ValidationError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

static E164_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[1-9]\d{1,14}$").expect("Failed to compile E.164 regex"));

/// A ten-digit phone number stored as digits only.
///
/// # Example
///
/// ```
/// use lead_stream::domain::PhoneNumber;
///
/// let phone = PhoneNumber::new("(415) 555-0100").unwrap();
/// assert_eq!(phone.as_str(), "4155550100");
/// assert_eq!(phone.formatted(), "(415) 555-0100");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Create a new PhoneNumber from any formatting.
    ///
    /// All non-digit characters are stripped; exactly ten digits must remain.
    /// Seven-digit local numbers, numbers that keep a leading country code and
    /// numbers with extensions are rejected.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidPhone` if the digit count is not ten.
    pub fn new(phone: impl Into<String>) -> Result<Self, ValidationError> {
        let phone = phone.into();
        let digits = Self::digits_of(&phone);

        if digits.len() != 10 {
            return Err(ValidationError::InvalidPhone(phone));
        }

        Ok(Self(digits))
    }

    /// Strip everything except ASCII digits.
    pub fn digits_of(raw: &str) -> String {
        raw.chars().filter(|c| c.is_ascii_digit()).collect()
    }

    /// Get the digits as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert into the underlying String.
    pub fn into_inner(self) -> String {
        self.0
    }

    /// Three-digit area code.
    pub fn area_code(&self) -> &str {
        &self.0[..3]
    }

    /// Human-readable `(AAA) EEE-NNNN` form.
    pub fn formatted(&self) -> String {
        format!("({}) {}-{}", &self.0[..3], &self.0[3..6], &self.0[6..])
    }

    /// International form with the `+1` country code.
    pub fn to_e164(&self) -> E164Number {
        E164Number(format!("+1{}", self.0))
    }
}

impl Serialize for PhoneNumber {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PhoneNumber {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        PhoneNumber::new(s).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A messaging destination in E.164 form (`+` optional, up to 15 digits).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct E164Number(String);

impl E164Number {
    /// Validate a destination number.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidPhone` if the string is not E.164.
    pub fn new(phone: impl Into<String>) -> Result<Self, ValidationError> {
        let phone = phone.into();
        if !E164_RE.is_match(&phone) {
            return Err(ValidationError::InvalidPhone(phone));
        }
        Ok(Self(phone))
    }

    /// Get the number as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for E164Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_normalizes_formats() {
        assert_eq!(PhoneNumber::new("415-555-0100").unwrap().as_str(), "4155550100");
        assert_eq!(PhoneNumber::new("(415) 555-0100").unwrap().as_str(), "4155550100");
        assert_eq!(PhoneNumber::new("415.555.0100").unwrap().as_str(), "4155550100");
        assert_eq!(PhoneNumber::new("4155550100").unwrap().as_str(), "4155550100");
    }

    #[test]
    fn test_phone_rejects_wrong_digit_counts() {
        assert!(PhoneNumber::new("").is_err());
        assert!(PhoneNumber::new("555-0100").is_err());
        assert!(PhoneNumber::new("+1 415 555 0100").is_err());
        assert!(PhoneNumber::new("415-555-0100 x22").is_err());
        assert!(PhoneNumber::new("no digits").is_err());
    }

    #[test]
    fn test_phone_formatting() {
        let phone = PhoneNumber::new("4155550100").unwrap();
        assert_eq!(phone.area_code(), "415");
        assert_eq!(phone.formatted(), "(415) 555-0100");
        assert_eq!(phone.to_e164().as_str(), "+14155550100");
    }

    #[test]
    fn test_phone_serialization() {
        let phone = PhoneNumber::new("(415) 555-0100").unwrap();
        let json = serde_json::to_string(&phone).unwrap();
        assert_eq!(json, "\"4155550100\"");
    }

    #[test]
    fn test_phone_deserialization_invalid_fails() {
        let result: Result<PhoneNumber, _> = serde_json::from_str("\"555-0100\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_e164_validation() {
        assert!(E164Number::new("+14155550100").is_ok());
        assert!(E164Number::new("14155550100").is_ok());
        assert!(E164Number::new("+442071838750").is_ok());
        assert!(E164Number::new("+0123").is_err());
        assert!(E164Number::new("415-555-0100").is_err());
        assert!(E164Number::new("+1234567890123456").is_err());
        assert!(E164Number::new("").is_err());
    }
}
