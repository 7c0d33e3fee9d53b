use async_trait::async_trait;
use lead_stream::client::SearchProvider;
use lead_stream::error::{SearchApiError, SearchApiResult};
use lead_stream::models::{ProviderQuery, RawSearchHit, SearchEngine};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// Build a hit for `engine` with the given link and snippet.
#[allow(dead_code)]
pub fn hit(engine: SearchEngine, link: &str, snippet: &str) -> RawSearchHit {
    RawSearchHit {
        title: format!("Result for {}", link),
        link: link.to_string(),
        snippet: snippet.to_string(),
        source: engine,
        position: 1,
    }
}

/// Mock search provider serving canned pages per engine.
///
/// The page served is `offset / page_size`; past the last page an empty
/// page is returned. Engines marked as failing always error.
#[allow(dead_code)]
#[derive(Clone, Default)]
pub struct MockSearchProvider {
    pages: Arc<Mutex<HashMap<SearchEngine, Vec<Vec<RawSearchHit>>>>>,
    failing: Arc<Mutex<HashSet<SearchEngine>>>,
    calls: Arc<Mutex<Vec<ProviderQuery>>>,
}

#[allow(dead_code)]
impl MockSearchProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one page of hits for `engine`.
    pub fn add_page(&self, engine: SearchEngine, hits: Vec<RawSearchHit>) -> &Self {
        self.pages
            .lock()
            .unwrap()
            .entry(engine)
            .or_default()
            .push(hits);
        self
    }

    /// Make every call for `engine` fail.
    pub fn fail_engine(&self, engine: SearchEngine) -> &Self {
        self.failing.lock().unwrap().insert(engine);
        self
    }

    pub fn calls(&self) -> Vec<ProviderQuery> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl SearchProvider for MockSearchProvider {
    async fn search(&self, query: &ProviderQuery) -> SearchApiResult<Vec<RawSearchHit>> {
        self.calls.lock().unwrap().push(query.clone());

        if self.failing.lock().unwrap().contains(&query.engine) {
            return Err(SearchApiError::ApiError {
                status: 503,
                message: format!("{} unavailable", query.engine),
            });
        }

        let page = query.offset / query.page_size.max(1);
        Ok(self
            .pages
            .lock()
            .unwrap()
            .get(&query.engine)
            .and_then(|pages| pages.get(page))
            .cloned()
            .unwrap_or_default())
    }
}
