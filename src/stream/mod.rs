//! The lead stream: controller and outbound sinks.

mod controller;
mod sink;

pub use controller::{LeadStreamController, StreamOutcome};
pub use sink::{ChannelSink, EventSink};
