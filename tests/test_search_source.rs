//! Integration tests for paging, fan-out and dedup in the search source.

mod mocks;

use futures::StreamExt;
use lead_stream::error::SearchApiError;
use lead_stream::models::{EngineSelection, SearchEngine, SearchRequest};
use lead_stream::source::{SearchResultSource, SourceOptions};
use mocks::{hit, MockSearchProvider};
use std::sync::Arc;

fn source(provider: &MockSearchProvider, page_size: usize, max_pages: usize) -> SearchResultSource {
    SearchResultSource::new(
        Arc::new(provider.clone()),
        SourceOptions {
            page_size,
            max_results: 100,
            max_pages,
        },
    )
}

fn links(engine: SearchEngine, names: &[&str]) -> Vec<lead_stream::RawSearchHit> {
    names
        .iter()
        .map(|n| hit(engine, &format!("https://{}.example", n), ""))
        .collect()
}

#[tokio::test]
async fn test_pages_until_short_page() {
    let provider = MockSearchProvider::new();
    provider
        .add_page(SearchEngine::Google, links(SearchEngine::Google, &["a", "b"]))
        .add_page(SearchEngine::Google, links(SearchEngine::Google, &["c", "d"]))
        .add_page(SearchEngine::Google, links(SearchEngine::Google, &["e"]));

    let hits = source(&provider, 2, 5)
        .collect(&SearchRequest::new("plumbers", SearchEngine::Google))
        .await
        .unwrap();

    assert_eq!(hits.len(), 5);
    let offsets: Vec<usize> = provider.calls().iter().map(|q| q.offset).collect();
    assert_eq!(offsets, vec![0, 2, 4]);
}

#[tokio::test]
async fn test_max_pages_bounds_fetching() {
    let provider = MockSearchProvider::new();
    provider
        .add_page(SearchEngine::Google, links(SearchEngine::Google, &["a", "b"]))
        .add_page(SearchEngine::Google, links(SearchEngine::Google, &["c", "d"]));

    let hits = source(&provider, 2, 1)
        .collect(&SearchRequest::new("plumbers", SearchEngine::Google))
        .await
        .unwrap();

    assert_eq!(hits.len(), 2);
    assert_eq!(provider.call_count(), 1);
}

#[tokio::test]
async fn test_engine_without_offset_fetches_once() {
    let provider = MockSearchProvider::new();
    provider
        .add_page(SearchEngine::DuckDuckGo, links(SearchEngine::DuckDuckGo, &["a", "b"]))
        .add_page(SearchEngine::DuckDuckGo, links(SearchEngine::DuckDuckGo, &["c", "d"]));

    let hits = source(&provider, 2, 5)
        .collect(&SearchRequest::new("plumbers", SearchEngine::DuckDuckGo))
        .await
        .unwrap();

    assert_eq!(hits.len(), 2);
    assert_eq!(provider.call_count(), 1);
}

#[tokio::test]
async fn test_fan_out_dedups_in_engine_order() {
    let provider = MockSearchProvider::new();
    provider
        .add_page(SearchEngine::Google, links(SearchEngine::Google, &["a", "b"]))
        .add_page(SearchEngine::Yahoo, links(SearchEngine::Yahoo, &["b", "c"]));

    let request = SearchRequest::new("plumbers", SearchEngine::Google)
        .with_engines(EngineSelection::All(vec![SearchEngine::Google, SearchEngine::Yahoo]));
    let hits: Vec<_> = source(&provider, 10, 1).stream(&request).into_stream().collect().await;

    let got: Vec<&str> = hits.iter().map(|h| h.link.as_str()).collect();
    assert_eq!(
        got,
        vec!["https://a.example", "https://b.example", "https://c.example"]
    );
    assert_eq!(hits[2].source, SearchEngine::Yahoo);
}

#[tokio::test]
async fn test_lazy_until_first_pull() {
    let provider = MockSearchProvider::new();
    provider.add_page(SearchEngine::Google, links(SearchEngine::Google, &["a"]));

    let source = source(&provider, 10, 1);
    let mut stream = source.stream(&SearchRequest::new("plumbers", SearchEngine::Google));
    assert_eq!(provider.call_count(), 0);

    assert!(stream.next().await.is_some());
    assert_eq!(provider.call_count(), 1);
    assert_eq!(stream.yielded(), 1);
}

#[tokio::test]
async fn test_collect_reports_total_failure() {
    let provider = MockSearchProvider::new();
    provider
        .fail_engine(SearchEngine::Google)
        .fail_engine(SearchEngine::Bing);

    let request = SearchRequest::new("plumbers", SearchEngine::Google)
        .with_engines(EngineSelection::All(vec![SearchEngine::Google, SearchEngine::Bing]));
    let result = source(&provider, 10, 1).collect(&request).await;

    assert!(matches!(result, Err(SearchApiError::ApiError { status: 503, .. })));
}

#[tokio::test]
async fn test_location_forwarded() {
    let provider = MockSearchProvider::new();
    let request =
        SearchRequest::new("plumbers", SearchEngine::Bing).with_location("Denver, CO");
    source(&provider, 10, 1).collect(&request).await.unwrap();

    let calls = provider.calls();
    assert_eq!(calls[0].location.as_deref(), Some("Denver, CO"));
    assert_eq!(calls[0].page_size, 10);
}
