//! Single-topic consume, decode, dispatch, resolve loop.

use std::sync::Arc;
use std::time::Duration;

use budgeting_core::broker::{Delivery, Subscription};

use super::registration::{HandleError, MessageHandler};
use super::shutdown::ShutdownListener;

/// Counters reported when a consumer stops.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ConsumerStats {
    pub acked: u64,
    pub rejected: u64,
    /// Deliveries whose ack or reject call itself failed.
    pub resolve_failures: u64,
}

/// Drains one subscription, one message at a time, until cancelled.
pub struct TopicConsumer {
    topic: &'static str,
    subscription: Box<dyn Subscription>,
    handler: Arc<dyn MessageHandler>,
    retry_delay: Duration,
}

impl TopicConsumer {
    pub fn new(
        topic: &'static str,
        subscription: Box<dyn Subscription>,
        handler: Arc<dyn MessageHandler>,
        retry_delay: Duration,
    ) -> Self {
        Self {
            topic,
            subscription,
            handler,
            retry_delay,
        }
    }

    pub fn topic(&self) -> &'static str {
        self.topic
    }

    /// Runs until the listener is cancelled or the subscription ends.
    ///
    /// Cancellation is observed while waiting for a message and between
    /// messages, never while a handler runs: a dequeued message is always
    /// resolved before this returns.
    pub async fn run(mut self, mut listener: ShutdownListener) -> ConsumerStats {
        let mut stats = ConsumerStats::default();
        tracing::info!(topic = self.topic, "Consumer started");

        loop {
            let received = tokio::select! {
                biased;
                _ = listener.cancelled() => break,
                received = self.subscription.next_delivery() => received,
            };

            match received {
                Ok(Some(delivery)) => {
                    process(self.topic, self.handler.as_ref(), delivery, &mut stats).await
                }
                Ok(None) => {
                    tracing::info!(topic = self.topic, "Subscription closed");
                    break;
                }
                Err(err) => {
                    tracing::error!(
                        topic = self.topic,
                        error = %err,
                        retry_in_ms = self.retry_delay.as_millis() as u64,
                        "Failed to receive message"
                    );
                    tokio::select! {
                        biased;
                        _ = listener.cancelled() => break,
                        _ = tokio::time::sleep(self.retry_delay) => {}
                    }
                }
            }
        }

        tracing::info!(
            topic = self.topic,
            acked = stats.acked,
            rejected = stats.rejected,
            resolve_failures = stats.resolve_failures,
            "Consumer stopped"
        );
        stats
    }
}

/// Handles one delivery and resolves it: ack on success, reject otherwise.
async fn process(
    topic: &'static str,
    handler: &dyn MessageHandler,
    delivery: Delivery,
    stats: &mut ConsumerStats,
) {
    let resolved = match handler.handle(delivery.payload()).await {
        Ok(()) => {
            tracing::debug!(topic, "Message processed");
            stats.acked += 1;
            delivery.ack().await
        }
        Err(err @ HandleError::Decode(_)) => {
            tracing::warn!(topic, error = %err, "Rejecting undecodable message");
            stats.rejected += 1;
            delivery.reject().await
        }
        Err(err @ HandleError::Handler(_)) => {
            tracing::error!(topic, error = %err, "Rejecting message after handler failure");
            stats.rejected += 1;
            delivery.reject().await
        }
    };

    if let Err(err) = resolved {
        tracing::error!(topic, error = %err, "Failed to resolve message");
        stats.resolve_failures += 1;
    }
}
