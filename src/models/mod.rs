//! Data models for the search-to-lead pipeline and its collaborators.
//!
//! This module contains the search request/hit types, the contact details
//! extracted per hit, the events pushed over the lead stream, and the stored
//! lead, category, list and messaging records.

pub mod contact_info;
pub mod event;
pub mod lead;
pub mod search;

pub use contact_info::ContactInfo;
pub use event::{LeadResult, StreamEvent};
pub use lead::{
    Category, FilterCriterion, FilterOperator, Lead, LeadField, LeadList, LeadStatus,
    MessageReceipt, MessagingAccount, OutboundMessage, SmsLog,
};
pub use search::{
    EngineSelection, ProviderQuery, RawSearchHit, SearchEngine, SearchRequest, SearchSubmission,
};
