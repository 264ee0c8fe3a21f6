//! Viewer subscribers

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use uuid::Uuid;

use tanod_core::TrackingMessage;

/// Identity of one viewer connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(pub Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Why a delivery to a subscriber failed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    #[error("subscriber closed")]
    Closed,

    #[error("subscriber queue full")]
    Full,
}

/// A member of the tracking channel.
///
/// `deliver` is awaited from the hub task and must not wait on the viewer;
/// return an error instead and the hub drops the subscriber.
#[async_trait]
pub trait Subscriber: Send + Sync {
    async fn deliver(&self, message: Arc<TrackingMessage>) -> Result<(), DeliveryError>;
}

/// Subscriber backed by a bounded queue drained by a connection task
#[derive(Debug, Clone)]
pub struct ChannelSubscriber {
    tx: mpsc::Sender<Arc<TrackingMessage>>,
}

impl ChannelSubscriber {
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<Arc<TrackingMessage>>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { tx }, rx)
    }
}

#[async_trait]
impl Subscriber for ChannelSubscriber {
    async fn deliver(&self, message: Arc<TrackingMessage>) -> Result<(), DeliveryError> {
        self.tx.try_send(message).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => DeliveryError::Full,
            mpsc::error::TrySendError::Closed(_) => DeliveryError::Closed,
        })
    }
}
