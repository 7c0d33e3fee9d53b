//! Website value object.

use super::errors::ValidationError;
use std::fmt;
use url::Url;

/// An absolute URL with a scheme and a host.
///
/// The original string is kept verbatim so casing and path survive; the
/// parsed form is only used to decide validity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Website(String);

impl Website {
    /// Validate a website string.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidWebsite` if the string does not parse
    /// as an absolute URL or has no host.
    pub fn new(raw: impl Into<String>) -> Result<Self, ValidationError> {
        let raw = raw.into();
        match Url::parse(&raw) {
            Ok(url) if url.host_str().is_some_and(|h| !h.is_empty()) => Ok(Self(raw)),
            _ => Err(ValidationError::InvalidWebsite(raw)),
        }
    }

    /// Get the URL as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Host portion, lowercased by the URL parser.
    pub fn host(&self) -> Option<String> {
        Url::parse(&self.0)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
    }
}

impl fmt::Display for Website {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
