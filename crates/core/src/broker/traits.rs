use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use super::Result;

/// One message pulled from a topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub topic: String,
    pub payload: Vec<u8>,
}

impl Envelope {
    pub fn new(topic: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
        }
    }
}

/// Resolves deliveries on the broker side.
#[async_trait]
pub trait Acknowledger: Send + Sync {
    /// Marks the message as durably processed.
    async fn ack(&self, envelope: &Envelope) -> Result<()>;

    /// Drops the message without redelivery.
    async fn reject(&self, envelope: &Envelope) -> Result<()>;
}

/// A dequeued message awaiting resolution.
///
/// `ack` and `reject` consume the delivery, so a message is resolved at most
/// once; consumers resolve every delivery they pull.
pub struct Delivery {
    envelope: Envelope,
    acknowledger: Arc<dyn Acknowledger>,
}

impl Delivery {
    pub fn new(envelope: Envelope, acknowledger: Arc<dyn Acknowledger>) -> Self {
        Self {
            envelope,
            acknowledger,
        }
    }

    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }

    pub fn payload(&self) -> &[u8] {
        &self.envelope.payload
    }

    pub async fn ack(self) -> Result<()> {
        self.acknowledger.ack(&self.envelope).await
    }

    pub async fn reject(self) -> Result<()> {
        self.acknowledger.reject(&self.envelope).await
    }
}

impl fmt::Debug for Delivery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Delivery")
            .field("envelope", &self.envelope)
            .finish_non_exhaustive()
    }
}

/// An ordered stream of deliveries for a single topic.
#[async_trait]
pub trait Subscription: Send {
    /// Waits for the next delivery. `None` means the topic was closed.
    ///
    /// Implementations must be cancel safe: dropping the future before it
    /// completes must not lose a message for good.
    async fn next_delivery(&mut self) -> Result<Option<Delivery>>;
}

/// Publish and subscribe entry points of a message broker.
#[async_trait]
pub trait Broker: Send + Sync {
    async fn publish(&self, topic: &str, payload: &[u8]) -> Result<()>;

    async fn subscribe(&self, topic: &str) -> Result<Box<dyn Subscription>>;
}
