//! Stored lead records and the entities that organize them.

use super::event::LeadResult;
use crate::domain::RecordId;
use serde::{Deserialize, Serialize};

/// Where a lead sits in the sales funnel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeadStatus {
    #[default]
    New,
    Contacted,
    Qualified,
    Converted,
    Lost,
}

impl LeadStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Contacted => "contacted",
            Self::Qualified => "qualified",
            Self::Converted => "converted",
            Self::Lost => "lost",
        }
    }
}

/// A saved lead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub id: RecordId,
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    /// Search hit the lead came from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_link: Option<String>,
    #[serde(default)]
    pub status: LeadStatus,
    #[serde(default)]
    pub category_ids: Vec<RecordId>,
    pub created_at: String,
}

impl Lead {
    /// Convert a streamed result into a lead owned by `user_id`.
    ///
    /// The guessed name becomes the company; the first email, phone and
    /// website are kept.
    pub fn from_result(user_id: impl Into<String>, result: &LeadResult) -> Self {
        let contact = &result.contact_info;
        Self {
            id: RecordId::generate(),
            user_id: user_id.into(),
            first_name: None,
            last_name: None,
            email: contact.emails.first().cloned(),
            phone: contact.phones.first().cloned(),
            company: contact
                .name
                .clone()
                .or_else(|| Some(result.hit.title.clone()).filter(|t| !t.is_empty())),
            job_title: None,
            website: contact.websites.first().cloned(),
            source_link: Some(result.hit.link.clone()),
            status: LeadStatus::New,
            category_ids: Vec::new(),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Value of a filterable text column.
    pub fn field(&self, field: LeadField) -> Option<&str> {
        match field {
            LeadField::FirstName => self.first_name.as_deref(),
            LeadField::LastName => self.last_name.as_deref(),
            LeadField::Email => self.email.as_deref(),
            LeadField::Phone => self.phone.as_deref(),
            LeadField::Company => self.company.as_deref(),
            LeadField::JobTitle => self.job_title.as_deref(),
            LeadField::Website => self.website.as_deref(),
            LeadField::Status => Some(self.status.as_str()),
        }
    }
}

/// Lead fields usable in dynamic list filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadField {
    FirstName,
    LastName,
    Email,
    Phone,
    Company,
    JobTitle,
    Website,
    Status,
}

/// Comparison used by a filter criterion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterOperator {
    Eq,
    Neq,
    /// Case-sensitive pattern, `%` matches any run of characters
    Like,
    /// Case-insensitive `like`
    Ilike,
}

/// One condition of a dynamic list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriterion {
    pub column: LeadField,
    pub operator: FilterOperator,
    pub value: String,
}

impl FilterCriterion {
    /// Whether `lead` satisfies this condition. A missing field only
    /// satisfies `neq`.
    pub fn matches(&self, lead: &Lead) -> bool {
        let Some(actual) = lead.field(self.column) else {
            return self.operator == FilterOperator::Neq;
        };

        match self.operator {
            FilterOperator::Eq => actual == self.value,
            FilterOperator::Neq => actual != self.value,
            FilterOperator::Like => like_match(actual, &self.value),
            FilterOperator::Ilike => {
                like_match(&actual.to_lowercase(), &self.value.to_lowercase())
            }
        }
    }
}

/// SQL-style `LIKE` with `%` wildcards.
fn like_match(text: &str, pattern: &str) -> bool {
    let parts: Vec<&str> = pattern.split('%').collect();
    if parts.len() == 1 {
        return text == pattern;
    }

    let mut rest = text;
    let last = parts.len() - 1;
    for (i, part) in parts.iter().enumerate() {
        if part.is_empty() {
            continue;
        }
        if i == 0 {
            match rest.strip_prefix(part) {
                Some(r) => rest = r,
                None => return false,
            }
        } else if i == last {
            return rest.ends_with(part);
        } else {
            match rest.find(part) {
                Some(pos) => rest = &rest[pos + part.len()..],
                None => return false,
            }
        }
    }
    true
}

/// A user-defined lead category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: RecordId,
    pub user_id: String,
    pub name: String,
    /// `#rrggbb`
    pub color: String,
    #[serde(default)]
    pub description: String,
    pub created_at: String,
}

/// A named collection of leads, either explicit or filter-driven.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadList {
    pub id: RecordId,
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_dynamic: bool,
    /// Only meaningful for dynamic lists
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_criteria: Option<Vec<FilterCriterion>>,
    /// Only meaningful for static lists
    #[serde(default)]
    pub members: Vec<RecordId>,
    pub created_at: String,
}

/// Messaging credentials and the active sending number for one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessagingAccount {
    pub user_id: String,
    pub account_sid: String,
    pub auth_token: String,
    pub from_number: String,
}

/// An outbound text message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub account_sid: String,
    pub auth_token: String,
    pub from: String,
    pub to: String,
    pub body: String,
}

/// Provider acknowledgement of a sent message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageReceipt {
    pub sid: String,
    pub status: String,
}

/// Record of a message sent to a lead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmsLog {
    pub lead_id: RecordId,
    pub phone_number: String,
    pub message: String,
    pub message_id: String,
    pub status: String,
    pub created_at: String,
}
