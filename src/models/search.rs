//! Search request and search hit models.

use crate::config::{Config, MAX_RESULT_CAP};
use crate::error::RequestError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// An upstream search engine reachable through the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchEngine {
    Google,
    Bing,
    DuckDuckGo,
    Yahoo,
}

impl SearchEngine {
    /// Every engine the provider supports, in fan-out order.
    pub const ALL: [SearchEngine; 4] = [
        SearchEngine::Google,
        SearchEngine::Bing,
        SearchEngine::DuckDuckGo,
        SearchEngine::Yahoo,
    ];

    /// Provider identifier, also used as `RawSearchHit::source`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Bing => "bing",
            Self::DuckDuckGo => "duckduckgo",
            Self::Yahoo => "yahoo",
        }
    }

    /// Name of the query parameter this engine expects.
    pub fn query_param(&self) -> &'static str {
        match self {
            Self::Yahoo => "p",
            _ => "q",
        }
    }

    /// Parameter carrying the page size, if the engine accepts one.
    pub fn page_size_param(&self) -> Option<&'static str> {
        match self {
            Self::Google => Some("num"),
            Self::Bing => Some("count"),
            Self::DuckDuckGo | Self::Yahoo => None,
        }
    }

    /// Parameter carrying the result offset, if the engine can page.
    pub fn offset_param(&self) -> Option<&'static str> {
        match self {
            Self::Google => Some("start"),
            Self::Bing => Some("first"),
            Self::Yahoo => Some("b"),
            Self::DuckDuckGo => None,
        }
    }

    /// Whether the engine accepts a free-text `location`.
    pub fn supports_location(&self) -> bool {
        matches!(self, Self::Google | Self::Bing)
    }
}

impl fmt::Display for SearchEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchEngine {
    type Err = RequestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "google" => Ok(Self::Google),
            "bing" => Ok(Self::Bing),
            "duckduckgo" => Ok(Self::DuckDuckGo),
            "yahoo" => Ok(Self::Yahoo),
            other => Err(RequestError::UnknownEngine(other.to_string())),
        }
    }
}

/// Which engines a stream queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineSelection {
    /// Exactly one engine.
    Single(SearchEngine),
    /// Fan out to several engines, in order.
    All(Vec<SearchEngine>),
}

impl EngineSelection {
    /// Resolve the wire-level engine names.
    ///
    /// No names means `default`; the name `all` expands to every supported
    /// engine; several names fan out to exactly those engines (duplicates
    /// collapse, first occurrence wins).
    pub fn resolve(names: &[String], default: SearchEngine) -> Result<Self, RequestError> {
        if names.is_empty() {
            return Ok(Self::Single(default));
        }

        if names.iter().any(|n| n.trim().eq_ignore_ascii_case("all")) {
            return Ok(Self::All(SearchEngine::ALL.to_vec()));
        }

        let mut engines: Vec<SearchEngine> = Vec::with_capacity(names.len());
        for name in names {
            let engine = name.parse::<SearchEngine>()?;
            if !engines.contains(&engine) {
                engines.push(engine);
            }
        }

        match engines.as_slice() {
            [single] => Ok(Self::Single(*single)),
            _ => Ok(Self::All(engines)),
        }
    }

    /// Engines in query order.
    pub fn engines(&self) -> Vec<SearchEngine> {
        match self {
            Self::Single(engine) => vec![*engine],
            Self::All(engines) => engines.clone(),
        }
    }
}

/// Search submission as received on the wire.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchSubmission {
    #[serde(default)]
    pub search_query: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub engines: Option<Vec<String>>,
    /// Optional result cap overriding the configured default.
    #[serde(default)]
    pub limit: Option<usize>,
}

/// A validated search request. Immutable once a stream starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
    pub location: Option<String>,
    pub engines: EngineSelection,
    pub limit: Option<usize>,
}

impl SearchRequest {
    /// Build a request for a single engine.
    pub fn new(query: impl Into<String>, engine: SearchEngine) -> Self {
        Self {
            query: query.into(),
            location: None,
            engines: EngineSelection::Single(engine),
            limit: None,
        }
    }

    /// Set the location.
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Set the engine selection.
    pub fn with_engines(mut self, engines: EngineSelection) -> Self {
        self.engines = engines;
        self
    }

    /// Set the result cap.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Validate a wire submission.
    ///
    /// # Errors
    ///
    /// `MissingQuery` for a missing or blank query, `UnknownEngine` for an
    /// unrecognized engine name, `InvalidLimit` for a cap outside
    /// `1..=MAX_RESULT_CAP`.
    pub fn from_submission(
        submission: SearchSubmission,
        config: &Config,
    ) -> Result<Self, RequestError> {
        let query = submission
            .search_query
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty())
            .ok_or(RequestError::MissingQuery)?;

        let location = submission
            .location
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty());

        let engines = EngineSelection::resolve(
            submission.engines.as_deref().unwrap_or_default(),
            config.default_engine,
        )?;

        if let Some(limit) = submission.limit {
            if limit == 0 || limit > MAX_RESULT_CAP {
                return Err(RequestError::InvalidLimit {
                    value: limit,
                    max: MAX_RESULT_CAP,
                });
            }
        }

        Ok(Self {
            query,
            location,
            engines,
            limit: submission.limit,
        })
    }
}

/// One normalized hit from one engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSearchHit {
    pub title: String,
    /// Dedup key within a stream.
    pub link: String,
    pub snippet: String,
    pub source: SearchEngine,
    /// 1-based rank on the provider's result page.
    pub position: u32,
}

/// A single page request handed to a [`crate::client::SearchProvider`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderQuery {
    pub engine: SearchEngine,
    pub query: String,
    pub location: Option<String>,
    pub page_size: usize,
    pub offset: usize,
}
