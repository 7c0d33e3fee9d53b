//! Performance benchmarks for contact extraction and the lead stream.
//!
//! These benchmarks measure:
//! - Extraction over short and long snippets
//! - Validation of extractor output
//! - A full stream over an in-memory provider at different result counts

use async_trait::async_trait;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use lead_stream::client::SearchProvider;
use lead_stream::error::{SearchApiResult, SinkError};
use lead_stream::extraction::{extract, ContactValidator};
use lead_stream::models::{ProviderQuery, RawSearchHit, SearchEngine, SearchRequest, StreamEvent};
use lead_stream::source::{SearchResultSource, SourceOptions};
use lead_stream::stream::{EventSink, LeadStreamController};
use std::hint::black_box;
use std::sync::Arc;
use tokio::runtime::Runtime;

const SHORT_SNIPPET: &str =
    "Acme Plumbing\nCall (512) 555-0100 or email service@acme-plumbing.com, https://acme-plumbing.com";

fn long_snippet() -> String {
    (0..50)
        .map(|i| {
            format!(
                "Branch {} open daily. Reach us at branch{}@acme.example or 512-555-{:04}. ",
                i, i, i
            )
        })
        .collect()
}

/// Provider serving a single page of generated hits.
struct StaticProvider {
    hits: Vec<RawSearchHit>,
}

impl StaticProvider {
    fn new(count: usize) -> Self {
        let hits = (0..count)
            .map(|i| RawSearchHit {
                title: format!("Business {}", i),
                link: format!("https://biz{}.example", i),
                snippet: format!("Business {}\nCall (512) 555-{:04}", i, i),
                source: SearchEngine::Google,
                position: i as u32 + 1,
            })
            .collect();
        Self { hits }
    }
}

#[async_trait]
impl SearchProvider for StaticProvider {
    async fn search(&self, query: &ProviderQuery) -> SearchApiResult<Vec<RawSearchHit>> {
        Ok(if query.offset == 0 {
            self.hits.clone()
        } else {
            Vec::new()
        })
    }
}

/// Sink that only counts frames.
#[derive(Default)]
struct CountingSink {
    frames: usize,
    closed: bool,
}

#[async_trait]
impl EventSink for CountingSink {
    async fn send(&mut self, event: &StreamEvent) -> Result<(), SinkError> {
        let frame = event
            .to_frame()
            .map_err(|e| SinkError::Encode(e.to_string()))?;
        black_box(frame);
        self.frames += 1;
        Ok(())
    }

    async fn close(&mut self) {
        self.closed = true;
    }

    fn is_open(&self) -> bool {
        !self.closed
    }
}

fn bench_extract(c: &mut Criterion) {
    let long = long_snippet();

    let mut group = c.benchmark_group("extract");
    group.bench_function("short_snippet", |b| b.iter(|| extract(black_box(SHORT_SNIPPET))));
    group.bench_function("long_snippet", |b| b.iter(|| extract(black_box(&long))));
    group.finish();
}

fn bench_validate(c: &mut Criterion) {
    let validator = ContactValidator::new();
    let info = extract(&long_snippet());

    c.bench_function("validate_long_snippet", |b| {
        b.iter(|| validator.validate_now(black_box(info.clone())))
    });
}

fn bench_stream(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();

    let mut group = c.benchmark_group("lead_stream");
    for count in [10usize, 100, 500] {
        let source = SearchResultSource::new(
            Arc::new(StaticProvider::new(count)),
            SourceOptions {
                page_size: 1000,
                max_results: 1000,
                max_pages: 1,
            },
        );
        let controller = LeadStreamController::new(source, 5);
        let request = SearchRequest::new("plumbers", SearchEngine::Google);

        let (controller, request) = (&controller, &request);
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.to_async(&rt).iter(move || async move {
                let mut sink = CountingSink::default();
                controller.run(request, &mut sink).await;
                black_box(sink.frames)
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_extract, bench_validate, bench_stream);
criterion_main!(benches);
