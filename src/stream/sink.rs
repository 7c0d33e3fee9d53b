//! Outbound event sinks.

use crate::error::SinkError;
use crate::models::StreamEvent;
use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

/// Destination for one stream's events.
///
/// `close` must be idempotent; writes after it fail with [`SinkError::Closed`].
#[async_trait]
pub trait EventSink: Send {
    async fn send(&mut self, event: &StreamEvent) -> Result<(), SinkError>;

    async fn close(&mut self);

    /// False once closed or once the receiving side is gone.
    fn is_open(&self) -> bool;
}

/// Sink that frames events into a bounded channel.
///
/// The receiving half becomes the HTTP response body. A full channel makes
/// `send` wait, which is the only backpressure the stream applies.
pub struct ChannelSink {
    tx: Option<mpsc::Sender<Bytes>>,
}

impl ChannelSink {
    /// Create a sink and the receiver its frames arrive on.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Bytes>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx: Some(tx) }, rx)
    }

    /// Create a sink whose frames arrive as a `Stream` of byte chunks.
    pub fn stream(capacity: usize) -> (Self, ReceiverStream<Bytes>) {
        let (sink, rx) = Self::channel(capacity);
        (sink, ReceiverStream::new(rx))
    }
}

#[async_trait]
impl EventSink for ChannelSink {
    async fn send(&mut self, event: &StreamEvent) -> Result<(), SinkError> {
        let tx = self.tx.as_ref().ok_or(SinkError::Closed)?;
        let frame = event
            .to_frame()
            .map_err(|e| SinkError::Encode(e.to_string()))?;

        tx.send(Bytes::from(frame))
            .await
            .map_err(|_| SinkError::Disconnected)
    }

    async fn close(&mut self) {
        // Dropping the sender ends the receiver's stream
        self.tx.take();
    }

    fn is_open(&self) -> bool {
        self.tx.as_ref().is_some_and(|tx| !tx.is_closed())
    }
}
