//! In-process publication of session events to renderers and observers.

use async_trait::async_trait;
use futures::{stream::BoxStream, StreamExt};
use gambit_types::{events::SessionEvent, Result};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tracing::{debug, warn};

#[async_trait]
pub trait SessionFeed: Send + Sync {
    async fn publish(&self, event: SessionEvent) -> Result<()>;
    fn subscribe(&self) -> BoxStream<'static, SessionEvent>;
}

/// Broadcast-backed feed. Publishing with no subscribers is not an error;
/// slow subscribers skip the events they lagged behind on.
#[derive(Clone)]
pub struct LocalFeed {
    tx: broadcast::Sender<SessionEvent>,
}

impl LocalFeed {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[async_trait]
impl SessionFeed for LocalFeed {
    async fn publish(&self, event: SessionEvent) -> Result<()> {
        match self.tx.send(event) {
            Ok(receivers) => debug!(receivers, "session event published"),
            Err(_) => debug!("session event dropped, no subscribers"),
        }
        Ok(())
    }

    fn subscribe(&self) -> BoxStream<'static, SessionEvent> {
        BroadcastStream::new(self.tx.subscribe())
            .filter_map(|event| async move {
                match event {
                    Ok(event) => Some(event),
                    Err(err) => {
                        warn!(%err, "feed subscriber lagged");
                        None
                    }
                }
            })
            .boxed()
    }
}
