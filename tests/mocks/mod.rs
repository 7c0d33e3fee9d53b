//! Test doubles shared by the integration tests.

pub mod mock_event_sink;
pub mod mock_search_provider;

#[allow(unused_imports)]
pub use mock_event_sink::RecordingSink;
#[allow(unused_imports)]
pub use mock_search_provider::{hit, MockSearchProvider};
