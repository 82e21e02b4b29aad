//! In-process broker.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{mpsc, watch, Mutex};

use budgeting_core::broker::{
    Acknowledger, Broker, BrokerError, Delivery, Envelope, Result, Subscription,
};

/// How a delivery was resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Acked,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub resolution: Resolution,
    pub envelope: Envelope,
}

struct Topic {
    sender: mpsc::UnboundedSender<Vec<u8>>,
    receiver: Option<mpsc::UnboundedReceiver<Vec<u8>>>,
}

impl Topic {
    fn new() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            sender,
            receiver: Some(receiver),
        }
    }
}

/// Records every resolution, in order.
struct Ledger {
    resolved: watch::Sender<Vec<Resolved>>,
}

impl Ledger {
    fn record(&self, resolution: Resolution, envelope: &Envelope) {
        self.resolved.send_modify(|resolved| {
            resolved.push(Resolved {
                resolution,
                envelope: envelope.clone(),
            })
        });
    }
}

#[async_trait]
impl Acknowledger for Ledger {
    async fn ack(&self, envelope: &Envelope) -> Result<()> {
        self.record(Resolution::Acked, envelope);
        Ok(())
    }

    async fn reject(&self, envelope: &Envelope) -> Result<()> {
        tracing::debug!(topic = %envelope.topic, "Message dropped");
        self.record(Resolution::Rejected, envelope);
        Ok(())
    }
}

/// In-process broker with one unbounded FIFO queue per topic.
///
/// Each topic accepts a single subscriber. Messages published before the
/// subscription are buffered. Resolutions are kept in a ledger that can be
/// inspected, which is what the consumer tests assert against.
#[derive(Clone)]
pub struct MemoryBroker {
    topics: Arc<Mutex<HashMap<String, Topic>>>,
    ledger: Arc<Ledger>,
}

impl Default for MemoryBroker {
    fn default() -> Self {
        let (resolved, _) = watch::channel(Vec::new());
        Self {
            topics: Arc::default(),
            ledger: Arc::new(Ledger { resolved }),
        }
    }
}

impl MemoryBroker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Closes a topic: its subscriber drains what is queued, then sees the
    /// end of the stream.
    #[cfg(test)]
    pub async fn close_topic(&self, topic: &str) {
        self.topics.lock().await.remove(topic);
    }

    /// Every resolution so far.
    #[cfg(test)]
    pub fn resolutions(&self) -> Vec<Resolved> {
        self.ledger.resolved.borrow().clone()
    }

    /// Waits until at least `count` deliveries have been resolved.
    #[cfg(test)]
    pub async fn wait_for_resolutions(&self, count: usize) -> Vec<Resolved> {
        let mut receiver = self.ledger.resolved.subscribe();
        let resolved = match receiver.wait_for(|resolved| resolved.len() >= count).await {
            Ok(resolved) => resolved.clone(),
            // The sender lives as long as `self`.
            Err(_) => self.resolutions(),
        };
        resolved
    }
}

#[async_trait]
impl Broker for MemoryBroker {
    async fn publish(&self, topic: &str, payload: &[u8]) -> Result<()> {
        let mut topics = self.topics.lock().await;
        topics
            .entry(topic.to_string())
            .or_insert_with(Topic::new)
            .sender
            .send(payload.to_vec())
            .map_err(|_| BrokerError::OperationFailed(format!("Topic {topic} has no receiver")))
    }

    async fn subscribe(&self, topic: &str) -> Result<Box<dyn Subscription>> {
        let mut topics = self.topics.lock().await;
        let receiver = topics
            .entry(topic.to_string())
            .or_insert_with(Topic::new)
            .receiver
            .take()
            .ok_or_else(|| BrokerError::AlreadySubscribed(topic.to_string()))?;

        Ok(Box::new(MemorySubscription {
            topic: topic.to_string(),
            receiver,
            ledger: self.ledger.clone(),
        }))
    }
}

struct MemorySubscription {
    topic: String,
    receiver: mpsc::UnboundedReceiver<Vec<u8>>,
    ledger: Arc<Ledger>,
}

#[async_trait]
impl Subscription for MemorySubscription {
    async fn next_delivery(&mut self) -> Result<Option<Delivery>> {
        let Some(payload) = self.receiver.recv().await else {
            return Ok(None);
        };
        let acknowledger: Arc<dyn Acknowledger> = self.ledger.clone();
        Ok(Some(Delivery::new(
            Envelope::new(self.topic.clone(), payload),
            acknowledger,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_messages_are_delivered_in_order() {
        let broker = MemoryBroker::new();
        broker.publish("budget_updated", b"one").await.unwrap();
        let mut subscription = broker.subscribe("budget_updated").await.unwrap();
        broker.publish("budget_updated", b"two").await.unwrap();

        let first = subscription.next_delivery().await.unwrap().unwrap();
        let second = subscription.next_delivery().await.unwrap().unwrap();

        assert_eq!(first.payload(), b"one");
        assert_eq!(second.payload(), b"two");
        assert_eq!(second.envelope().topic, "budget_updated");
    }

    #[tokio::test]
    async fn test_second_subscriber_is_rejected() {
        let broker = MemoryBroker::new();
        let _first = broker.subscribe("goal_progress_updated").await.unwrap();

        let err = broker.subscribe("goal_progress_updated").await.err();

        assert_eq!(
            err,
            Some(BrokerError::AlreadySubscribed(
                "goal_progress_updated".to_string()
            ))
        );
    }

    #[tokio::test]
    async fn test_resolutions_are_recorded() {
        let broker = MemoryBroker::new();
        let mut subscription = broker.subscribe("t").await.unwrap();
        broker.publish("t", b"good").await.unwrap();
        broker.publish("t", b"bad").await.unwrap();

        subscription.next_delivery().await.unwrap().unwrap().ack().await.unwrap();
        subscription
            .next_delivery()
            .await
            .unwrap()
            .unwrap()
            .reject()
            .await
            .unwrap();

        let resolved = broker.wait_for_resolutions(2).await;
        assert_eq!(resolved[0].resolution, Resolution::Acked);
        assert_eq!(resolved[0].envelope.payload, b"good");
        assert_eq!(resolved[1].resolution, Resolution::Rejected);
        assert_eq!(resolved[1].envelope.payload, b"bad");
    }

    #[tokio::test]
    async fn test_closed_topic_drains_then_ends() {
        let broker = MemoryBroker::new();
        let mut subscription = broker.subscribe("t").await.unwrap();
        broker.publish("t", b"last").await.unwrap();
        broker.close_topic("t").await;

        assert!(subscription.next_delivery().await.unwrap().is_some());
        assert!(subscription.next_delivery().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_publish_after_subscriber_dropped_fails() {
        let broker = MemoryBroker::new();
        drop(broker.subscribe("t").await.unwrap());

        let err = broker.publish("t", b"lost").await.unwrap_err();

        assert!(matches!(err, BrokerError::OperationFailed(_)));
    }
}
