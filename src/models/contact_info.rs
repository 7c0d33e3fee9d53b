//! Contact details derived from a search hit.

use serde::{Deserialize, Serialize};

/// Structured contact candidates pulled out of free text.
///
/// Each collection behaves as a set: no duplicates, first-seen order kept.
/// Ephemeral, one per hit; never persisted by the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    #[serde(default)]
    pub emails: Vec<String>,

    /// Phone digits with separators removed.
    #[serde(default)]
    pub phones: Vec<String>,

    #[serde(default)]
    pub websites: Vec<String>,

    /// Guessed business or person name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ContactInfo {
    /// True when there is at least one email or phone, i.e. the hit is a lead.
    pub fn has_contact_channel(&self) -> bool {
        !self.emails.is_empty() || !self.phones.is_empty()
    }

    /// True when every collection is empty and no name was guessed.
    pub fn is_empty(&self) -> bool {
        self.emails.is_empty()
            && self.phones.is_empty()
            && self.websites.is_empty()
            && self.name.is_none()
    }

    /// Compare as sets, ignoring order.
    pub fn same_contents(&self, other: &ContactInfo) -> bool {
        fn sorted(v: &[String]) -> Vec<&String> {
            let mut s: Vec<&String> = v.iter().collect();
            s.sort();
            s
        }
        sorted(&self.emails) == sorted(&other.emails)
            && sorted(&self.phones) == sorted(&other.phones)
            && sorted(&self.websites) == sorted(&other.websites)
            && self.name == other.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_contact_channel() {
        let mut info = ContactInfo::default();
        assert!(!info.has_contact_channel());

        info.websites.push("https://example.com".to_string());
        info.name = Some("Acme".to_string());
        assert!(!info.has_contact_channel());

        info.phones.push("4155550100".to_string());
        assert!(info.has_contact_channel());
    }

    #[test]
    fn test_name_omitted_when_absent() {
        let json = serde_json::to_value(ContactInfo::default()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"emails": [], "phones": [], "websites": []})
        );
    }

    #[test]
    fn test_same_contents_ignores_order() {
        let a = ContactInfo {
            emails: vec!["a@x.com".to_string(), "b@x.com".to_string()],
            ..Default::default()
        };
        let b = ContactInfo {
            emails: vec!["b@x.com".to_string(), "a@x.com".to_string()],
            ..Default::default()
        };
        assert!(a.same_contents(&b));
        assert_ne!(a, b);
    }
}
