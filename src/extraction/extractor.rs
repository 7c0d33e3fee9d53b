//! Regex-based contact extraction from free text.

use crate::domain::PhoneNumber;
use crate::models::ContactInfo;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b")
        .expect("Failed to compile email regex")
});

// Optional +1, optional parentheses around the area code, `-` or `.` between
// groups. Whitespace is only allowed right after a closing parenthesis.
static PHONE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\+?1[-.]?)?\(?[0-9]{3}(?:\)\s?|[-.])?[0-9]{3}[-.]?[0-9]{4}")
        .expect("Failed to compile phone regex")
});

static WEBSITE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"https?://(?:www\.)?[a-zA-Z0-9-]+(?:\.[a-zA-Z]{2,})+(?:/\S*)?")
        .expect("Failed to compile website regex")
});

/// Longest line (in characters) still considered a name.
const MAX_NAME_CHARS: usize = 100;

/// Extract contact candidates from `text`.
///
/// Total over all inputs: malformed or empty text yields empty collections.
/// Emails and websites are kept verbatim; phones are reduced to their digits.
/// Each regex family matches independently, so a digit run inside a URL can
/// also surface as a phone.
pub fn extract(text: &str) -> ContactInfo {
    ContactInfo {
        emails: unique(EMAIL_RE.find_iter(text).map(|m| m.as_str().to_string())),
        phones: unique(
            PHONE_RE
                .find_iter(text)
                .map(|m| PhoneNumber::digits_of(m.as_str())),
        ),
        websites: unique(WEBSITE_RE.find_iter(text).map(|m| m.as_str().to_string())),
        name: guess_name(text),
    }
}

/// First line that is non-blank, shorter than 100 characters as written and
/// contains neither `@` nor `http`, trimmed.
pub fn guess_name(text: &str) -> Option<String> {
    text.lines()
        .find(|line| {
            !line.trim().is_empty()
                && line.chars().count() < MAX_NAME_CHARS
                && !line.contains('@')
                && !line.contains("http")
        })
        .map(|line| line.trim().to_string())
}

/// Drop repeats while keeping first-seen order.
fn unique(items: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = HashSet::new();
    items.filter(|item| seen.insert(item.clone())).collect()
}
