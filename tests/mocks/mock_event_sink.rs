use async_trait::async_trait;
use lead_stream::error::SinkError;
use lead_stream::models::StreamEvent;
use lead_stream::stream::EventSink;
use std::sync::{Arc, Mutex};

/// Sink that records every event it accepts.
///
/// Can be told to fail after a number of accepted writes, or to report
/// itself disconnected after a number of accepted writes.
#[allow(dead_code)]
#[derive(Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<StreamEvent>>>,
    closes: Arc<Mutex<usize>>,
    fail_after: Option<usize>,
    disconnect_after: Option<usize>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject writes once `n` events were accepted.
    pub fn failing_after(n: usize) -> Self {
        Self {
            fail_after: Some(n),
            ..Self::default()
        }
    }

    /// Report closed once `n` events were accepted, without failing writes.
    pub fn disconnecting_after(n: usize) -> Self {
        Self {
            disconnect_after: Some(n),
            ..Self::default()
        }
    }

    pub fn events(&self) -> Vec<StreamEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn kinds(&self) -> Vec<&'static str> {
        self.events().iter().map(StreamEvent::kind).collect()
    }

    pub fn close_count(&self) -> usize {
        *self.closes.lock().unwrap()
    }

    fn accepted(&self) -> usize {
        self.events.lock().unwrap().len()
    }
}

#[async_trait]
impl EventSink for RecordingSink {
    async fn send(&mut self, event: &StreamEvent) -> Result<(), SinkError> {
        if *self.closes.lock().unwrap() > 0 {
            return Err(SinkError::Closed);
        }
        if self.fail_after.is_some_and(|n| self.accepted() >= n) {
            return Err(SinkError::Disconnected);
        }
        self.events.lock().unwrap().push(event.clone());
        Ok(())
    }

    async fn close(&mut self) {
        *self.closes.lock().unwrap() += 1;
    }

    fn is_open(&self) -> bool {
        *self.closes.lock().unwrap() == 0
            && !self.disconnect_after.is_some_and(|n| self.accepted() >= n)
    }
}
