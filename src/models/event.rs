//! Events pushed to the client over the lead stream.
//!
//! Every event travels as one frame: `data: <json>\n\n`, where the JSON object
//! carries a `type` tag of `status`, `result`, `progress`, `complete` or `error`.

use super::contact_info::ContactInfo;
use super::search::RawSearchHit;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Prefix of every frame on the wire.
pub const FRAME_PREFIX: &str = "data: ";

/// Terminator of every frame on the wire.
pub const FRAME_TERMINATOR: &str = "\n\n";

/// A qualifying hit together with its validated contact details.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadResult {
    #[serde(flatten)]
    pub hit: RawSearchHit,

    pub contact_info: ContactInfo,

    /// Capture time, ISO-8601 UTC with milliseconds
    pub timestamp: String,
}

impl LeadResult {
    /// Tag a hit with its contact details and the current time.
    pub fn capture(hit: RawSearchHit, contact_info: ContactInfo) -> Self {
        Self {
            hit,
            contact_info,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}

/// One server-push event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StreamEvent {
    Status { message: String },
    Result { data: LeadResult },
    Progress { count: usize, message: String },
    Complete { count: usize, message: String },
    Error { message: String, error: String },
}

impl StreamEvent {
    /// Opening status event.
    pub fn started() -> Self {
        Self::Status {
            message: "Starting search...".to_string(),
        }
    }

    /// A qualifying result.
    pub fn result(data: LeadResult) -> Self {
        Self::Result { data }
    }

    /// Running-count progress event.
    pub fn progress(count: usize) -> Self {
        Self::Progress {
            count,
            message: format!("Found {} leads...", count),
        }
    }

    /// Successful terminal event.
    pub fn complete(count: usize) -> Self {
        Self::Complete {
            count,
            message: format!("Search complete. Found {} leads.", count),
        }
    }

    /// Failed terminal event.
    pub fn error(detail: impl Into<String>) -> Self {
        Self::Error {
            message: "Search failed".to_string(),
            error: detail.into(),
        }
    }

    /// Wire tag of this event.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Status { .. } => "status",
            Self::Result { .. } => "result",
            Self::Progress { .. } => "progress",
            Self::Complete { .. } => "complete",
            Self::Error { .. } => "error",
        }
    }

    /// `complete` and `error` end a stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete { .. } | Self::Error { .. })
    }

    /// Encode as a wire frame.
    pub fn to_frame(&self) -> Result<String, serde_json::Error> {
        let json = serde_json::to_string(self)?;
        Ok(format!("{}{}{}", FRAME_PREFIX, json, FRAME_TERMINATOR))
    }

    /// Decode every complete frame in an event-stream body.
    ///
    /// Blank separators and lines without the `data: ` prefix are skipped.
    pub fn parse_frames(body: &str) -> Result<Vec<StreamEvent>, serde_json::Error> {
        body.split(FRAME_TERMINATOR)
            .filter_map(|chunk| chunk.trim_start_matches('\n').strip_prefix(FRAME_PREFIX))
            .map(serde_json::from_str)
            .collect()
    }
}
