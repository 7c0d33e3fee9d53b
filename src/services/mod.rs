//! Application service layer.
//!
//! Services contain business logic and orchestrate interactions between
//! repositories and provider clients. They provide a clean boundary between
//! the HTTP handlers and the data access layer.

mod lead_service;
mod sms_service;

pub use lead_service::{
    CategoryInput, LeadInput, LeadService, LeadServiceImpl, ListInput, ResolvedList,
};
pub use sms_service::{SmsRequest, SmsService, SmsServiceImpl};
