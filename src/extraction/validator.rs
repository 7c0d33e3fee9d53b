//! Stricter validation of extracted contact candidates.

use crate::domain::{EmailAddress, PhoneNumber, Website};
use crate::models::ContactInfo;

/// Filters extractor output against the strict value-object formats.
///
/// Emails must match the full-string grammar, phones must reduce to exactly
/// ten digits and websites must parse as absolute URLs with a host. Anything
/// else is dropped silently; nothing is ever added. The name passes through.
///
/// The email grammar is applied independently of the extraction pattern, so
/// an address the extractor accepted can still be dropped here.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContactValidator;

impl ContactValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validate asynchronously. Performs no I/O and never blocks.
    pub async fn validate(&self, contact: ContactInfo) -> ContactInfo {
        self.validate_now(contact)
    }

    /// Synchronous form of [`ContactValidator::validate`].
    pub fn validate_now(&self, contact: ContactInfo) -> ContactInfo {
        let ContactInfo {
            emails,
            phones,
            websites,
            name,
        } = contact;

        let emails: Vec<String> = emails
            .into_iter()
            .filter(|email| EmailAddress::is_valid(email))
            .collect();

        let phones: Vec<String> = phones
            .into_iter()
            .filter(|phone| PhoneNumber::new(phone.as_str()).is_ok())
            .collect();

        let websites: Vec<String> = websites
            .into_iter()
            .filter(|site| Website::new(site.as_str()).is_ok())
            .collect();

        tracing::trace!(
            emails = emails.len(),
            phones = phones.len(),
            websites = websites.len(),
            "Contact info validated"
        );

        ContactInfo {
            emails,
            phones,
            websites,
            name,
        }
    }
}
