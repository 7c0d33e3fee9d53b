//! RecordId value object.

use super::errors::ValidationError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A type-safe wrapper for stored record IDs (leads, categories, lists).
///
/// This ensures that IDs are validated at construction time and cannot be
/// empty.
///
/// # Example
///
/// ```
/// use lead_stream::domain::RecordId;
///
/// let id = RecordId::new("lead_123").unwrap();
/// assert_eq!(id.as_str(), "lead_123");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordId(String);

impl RecordId {
    /// Create a new RecordId, validating that it's not blank.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::EmptyId` if the provided ID is blank.
    pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(ValidationError::EmptyId);
        }
        Ok(Self(id))
    }

    /// Generate a fresh random ID.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Get the ID as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert into the underlying String.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl Serialize for RecordId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        RecordId::new(s).map_err(serde::de::Error::custom)
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_id_valid() {
        let id = RecordId::new("lead_123").unwrap();
        assert_eq!(id.as_str(), "lead_123");
        assert_eq!(format!("{}", id), "lead_123");
    }

    #[test]
    fn test_record_id_rejects_blank() {
        assert!(RecordId::new("").is_err());
        assert!(RecordId::new("   ").is_err());
    }

    #[test]
    fn test_record_id_generate_is_unique() {
        assert_ne!(RecordId::generate(), RecordId::generate());
    }

    #[test]
    fn test_record_id_deserialization_empty_fails() {
        let result: Result<RecordId, _> = serde_json::from_str("\"\"");
        assert!(result.is_err());
    }
}
