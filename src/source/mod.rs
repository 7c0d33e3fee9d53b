//! Lazy, deduplicated search hit sequences.
//!
//! [`SearchResultSource`] turns a [`SearchRequest`] into a [`HitStream`] that
//! fetches provider pages on demand and yields one hit at a time. The stream
//! owns its seen-link set exclusively; it is dropped with the stream.

use crate::client::SearchProvider;
use crate::config::Config;
use crate::error::{SearchApiError, SearchApiResult};
use crate::metrics::Metrics;
use crate::models::{ProviderQuery, RawSearchHit, SearchEngine, SearchRequest};
use futures::Stream;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

/// Fetch tunables for a [`SearchResultSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceOptions {
    /// Results requested per provider call
    pub page_size: usize,

    /// Cap applied when a request carries no `limit`
    pub max_results: usize,

    /// Pages fetched per engine
    pub max_pages: usize,
}

impl SourceOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            page_size: config.page_size,
            max_results: config.max_results,
            max_pages: config.max_pages,
        }
    }
}

impl Default for SourceOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Producer of hit streams over a pluggable provider.
#[derive(Clone)]
pub struct SearchResultSource {
    provider: Arc<dyn SearchProvider>,
    options: SourceOptions,
    metrics: Metrics,
}

impl SearchResultSource {
    pub fn new(provider: Arc<dyn SearchProvider>, options: SourceOptions) -> Self {
        Self {
            provider,
            options,
            metrics: Metrics::new(),
        }
    }

    /// Record into a shared collector instead of a private one.
    pub fn with_metrics(mut self, metrics: Metrics) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn options(&self) -> &SourceOptions {
        &self.options
    }

    /// Start a new lazy sequence for `request`. Nothing is fetched until the
    /// first call to [`HitStream::next`].
    pub fn stream(&self, request: &SearchRequest) -> HitStream {
        let engines: VecDeque<SearchEngine> = request.engines.engines().into();
        HitStream {
            provider: self.provider.clone(),
            metrics: self.metrics.clone(),
            query: request.query.clone(),
            location: request.location.clone(),
            page_size: self.options.page_size,
            max_pages: self.options.max_pages,
            cap: request.limit.unwrap_or(self.options.max_results),
            engine_count: engines.len(),
            pending: engines,
            current: None,
            buffer: VecDeque::new(),
            seen: HashSet::new(),
            yielded: 0,
            failed_engines: 0,
            last_error: None,
        }
    }

    /// Drain a whole stream into memory.
    ///
    /// # Errors
    ///
    /// Returns the last provider error when every engine failed.
    pub async fn collect(&self, request: &SearchRequest) -> SearchApiResult<Vec<RawSearchHit>> {
        let mut stream = self.stream(request);
        let mut hits = Vec::new();
        while let Some(hit) = stream.next().await {
            hits.push(hit);
        }

        if stream.all_engines_failed() {
            if let Some(err) = stream.take_last_error() {
                return Err(err);
            }
        }
        Ok(hits)
    }
}

/// Paging position within the engine currently being drained.
#[derive(Debug, Clone, Copy)]
struct EngineCursor {
    engine: SearchEngine,
    pages_fetched: usize,
}

/// One stream's lazy, ordered, link-unique hit sequence.
pub struct HitStream {
    provider: Arc<dyn SearchProvider>,
    metrics: Metrics,
    query: String,
    location: Option<String>,
    page_size: usize,
    max_pages: usize,
    cap: usize,
    engine_count: usize,
    pending: VecDeque<SearchEngine>,
    current: Option<EngineCursor>,
    buffer: VecDeque<RawSearchHit>,
    seen: HashSet<String>,
    yielded: usize,
    failed_engines: usize,
    last_error: Option<SearchApiError>,
}

impl HitStream {
    /// Pull the next unseen hit, fetching the next page when the buffer runs
    /// dry. `None` once the cap is reached or every engine is exhausted.
    pub async fn next(&mut self) -> Option<RawSearchHit> {
        loop {
            if self.yielded >= self.cap {
                return None;
            }

            while let Some(hit) = self.buffer.pop_front() {
                if self.seen.insert(hit.link.clone()) {
                    self.yielded += 1;
                    self.metrics.record_hit_yielded();
                    return Some(hit);
                }
                tracing::trace!(link = %hit.link, "Dropping duplicate hit");
                self.metrics.record_duplicate_dropped();
            }

            if !self.fetch_page().await {
                return None;
            }
        }
    }

    /// Adapt into a `futures::Stream`.
    pub fn into_stream(self) -> impl Stream<Item = RawSearchHit> + Send {
        futures::stream::unfold(self, |mut hits| async move {
            let hit = hits.next().await?;
            Some((hit, hits))
        })
    }

    /// Hits handed out so far.
    pub fn yielded(&self) -> usize {
        self.yielded
    }

    /// True when every engine errored before returning a single page.
    pub fn all_engines_failed(&self) -> bool {
        self.engine_count > 0 && self.failed_engines == self.engine_count
    }

    /// Most recent absorbed provider error.
    pub fn last_error(&self) -> Option<&SearchApiError> {
        self.last_error.as_ref()
    }

    pub fn take_last_error(&mut self) -> Option<SearchApiError> {
        self.last_error.take()
    }

    /// Fetch one page into the buffer. Returns `false` when no engine has
    /// anything left to fetch. Provider errors end the failing engine only.
    async fn fetch_page(&mut self) -> bool {
        let cursor = match self.current.take() {
            Some(cursor) => cursor,
            None => match self.pending.pop_front() {
                Some(engine) => EngineCursor {
                    engine,
                    pages_fetched: 0,
                },
                None => return false,
            },
        };

        let query = ProviderQuery {
            engine: cursor.engine,
            query: self.query.clone(),
            location: self.location.clone(),
            page_size: self.page_size,
            offset: cursor.pages_fetched * self.page_size,
        };

        match self.provider.search(&query).await {
            Ok(hits) => {
                let pages_fetched = cursor.pages_fetched + 1;
                let more = hits.len() >= self.page_size
                    && pages_fetched < self.max_pages
                    && cursor.engine.offset_param().is_some();

                if more {
                    self.current = Some(EngineCursor {
                        engine: cursor.engine,
                        pages_fetched,
                    });
                }
                self.buffer.extend(hits);
            }
            Err(err) => {
                tracing::warn!(
                    engine = %cursor.engine,
                    error = %err,
                    "Search provider call failed"
                );
                self.metrics.record_provider_error();
                if cursor.pages_fetched == 0 {
                    self.failed_engines += 1;
                }
                self.last_error = Some(err);
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EngineSelection;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Serves canned pages keyed by engine and records every query.
    struct PagedProvider {
        pages: Vec<(SearchEngine, SearchApiResult<Vec<RawSearchHit>>)>,
        calls: Mutex<Vec<ProviderQuery>>,
    }

    impl PagedProvider {
        fn new(pages: Vec<(SearchEngine, SearchApiResult<Vec<RawSearchHit>>)>) -> Self {
            Self {
                pages,
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl SearchProvider for PagedProvider {
        async fn search(&self, query: &ProviderQuery) -> SearchApiResult<Vec<RawSearchHit>> {
            let mut calls = self.calls.lock().unwrap();
            let page = calls.iter().filter(|q| q.engine == query.engine).count();
            calls.push(query.clone());

            match self
                .pages
                .iter()
                .filter(|(engine, _)| *engine == query.engine)
                .nth(page)
            {
                Some((_, Ok(hits))) => Ok(hits.clone()),
                Some((_, Err(_))) => Err(SearchApiError::Timeout),
                None => Ok(Vec::new()),
            }
        }
    }

    fn hit(engine: SearchEngine, link: &str) -> RawSearchHit {
        RawSearchHit {
            title: link.to_string(),
            link: link.to_string(),
            snippet: String::new(),
            source: engine,
            position: 1,
        }
    }

    fn options(page_size: usize, max_pages: usize) -> SourceOptions {
        SourceOptions {
            page_size,
            max_results: 100,
            max_pages,
        }
    }

    async fn drain(stream: &mut HitStream) -> Vec<String> {
        let mut links = Vec::new();
        while let Some(hit) = stream.next().await {
            links.push(hit.link);
        }
        links
    }

    #[tokio::test]
    async fn test_duplicate_links_yield_once() {
        let google = SearchEngine::Google;
        let provider = Arc::new(PagedProvider::new(vec![(
            google,
            Ok(vec![
                hit(google, "https://a.com"),
                hit(google, "https://a.com"),
                hit(google, "https://b.com"),
            ]),
        )]));
        let source = SearchResultSource::new(provider, options(10, 1));

        let mut stream = source.stream(&SearchRequest::new("q", google));
        assert_eq!(drain(&mut stream).await, vec!["https://a.com", "https://b.com"]);
        assert_eq!(stream.yielded(), 2);
        assert!(!stream.all_engines_failed());
    }

    #[tokio::test]
    async fn test_dedup_spans_engines() {
        let provider = Arc::new(PagedProvider::new(vec![
            (SearchEngine::Google, Ok(vec![hit(SearchEngine::Google, "https://a.com")])),
            (
                SearchEngine::Bing,
                Ok(vec![
                    hit(SearchEngine::Bing, "https://a.com"),
                    hit(SearchEngine::Bing, "https://c.com"),
                ]),
            ),
        ]));
        let source = SearchResultSource::new(provider, options(10, 1));
        let request = SearchRequest::new("q", SearchEngine::Google)
            .with_engines(EngineSelection::All(vec![SearchEngine::Google, SearchEngine::Bing]));

        let hits = source.collect(&request).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].source, SearchEngine::Google);
        assert_eq!(hits[1].link, "https://c.com");
    }

    #[tokio::test]
    async fn test_cap_stops_fetching() {
        let google = SearchEngine::Google;
        let page: Vec<RawSearchHit> = (0..3)
            .map(|i| hit(google, &format!("https://{}.com", i)))
            .collect();
        let provider = Arc::new(PagedProvider::new(vec![
            (google, Ok(page.clone())),
            (google, Ok(page)),
        ]));
        let source = SearchResultSource::new(provider.clone(), options(3, 5));

        let mut stream = source.stream(&SearchRequest::new("q", google).with_limit(2));
        assert_eq!(drain(&mut stream).await.len(), 2);
        assert_eq!(provider.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_pages_until_short_page() {
        let google = SearchEngine::Google;
        let full: Vec<RawSearchHit> = (0..2)
            .map(|i| hit(google, &format!("https://p1-{}.com", i)))
            .collect();
        let short = vec![hit(google, "https://p2.com")];
        let provider = Arc::new(PagedProvider::new(vec![(google, Ok(full)), (google, Ok(short))]));
        let source = SearchResultSource::new(provider.clone(), options(2, 5));

        let mut stream = source.stream(&SearchRequest::new("q", google));
        assert_eq!(drain(&mut stream).await.len(), 3);

        let calls = provider.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].offset, 0);
        assert_eq!(calls[1].offset, 2);
    }

    #[tokio::test]
    async fn test_engine_without_paging_fetches_once() {
        let ddg = SearchEngine::DuckDuckGo;
        let full: Vec<RawSearchHit> = (0..2)
            .map(|i| hit(ddg, &format!("https://{}.com", i)))
            .collect();
        let provider = Arc::new(PagedProvider::new(vec![(ddg, Ok(full.clone())), (ddg, Ok(full))]));
        let source = SearchResultSource::new(provider.clone(), options(2, 5));

        let mut stream = source.stream(&SearchRequest::new("q", ddg));
        drain(&mut stream).await;
        assert_eq!(provider.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failing_engine_is_absorbed() {
        let provider = Arc::new(PagedProvider::new(vec![
            (SearchEngine::Google, Err(SearchApiError::Timeout)),
            (SearchEngine::Bing, Ok(vec![hit(SearchEngine::Bing, "https://b.com")])),
        ]));
        let source = SearchResultSource::new(provider, options(10, 1));
        let request = SearchRequest::new("q", SearchEngine::Google)
            .with_engines(EngineSelection::All(vec![SearchEngine::Google, SearchEngine::Bing]));

        let mut stream = source.stream(&request);
        assert_eq!(drain(&mut stream).await, vec!["https://b.com"]);
        assert!(!stream.all_engines_failed());
        assert!(matches!(stream.last_error(), Some(SearchApiError::Timeout)));
    }

    #[tokio::test]
    async fn test_all_engines_failed() {
        let google = SearchEngine::Google;
        let failing = || Arc::new(PagedProvider::new(vec![(google, Err(SearchApiError::Timeout))]));

        let source = SearchResultSource::new(failing(), options(10, 1));
        let mut stream = source.stream(&SearchRequest::new("q", google));
        assert!(stream.next().await.is_none());
        assert!(stream.all_engines_failed());

        let source = SearchResultSource::new(failing(), options(10, 1));
        let err = source.collect(&SearchRequest::new("q", google)).await.unwrap_err();
        assert!(matches!(err, SearchApiError::Timeout));
    }

    #[tokio::test]
    async fn test_into_stream() {
        use futures::StreamExt;

        let google = SearchEngine::Google;
        let provider = Arc::new(PagedProvider::new(vec![(
            google,
            Ok(vec![hit(google, "https://a.com"), hit(google, "https://b.com")]),
        )]));
        let source = SearchResultSource::new(provider, options(10, 1));

        let links: Vec<String> = source
            .stream(&SearchRequest::new("q", google))
            .into_stream()
            .map(|hit| hit.link)
            .collect()
            .await;
        assert_eq!(links, vec!["https://a.com", "https://b.com"]);
    }
}
