//! Redis broker using the reliable-queue pattern.
//!
//! Publishers `LPUSH` onto `queue:{topic}`. A subscriber atomically moves the
//! oldest message into `queue:{topic}:processing` with `BLMOVE`, so a crash
//! between dequeue and ack never loses it. Ack removes it from the processing
//! list; reject moves it to `queue:{topic}:dead`.

use std::sync::Arc;

use async_trait::async_trait;
use redis::aio::{ConnectionManager, MultiplexedConnection};
use redis::{AsyncCommands, Direction};

use budgeting_core::broker::{
    dead_letter_key, processing_key, queue_key, Acknowledger, Broker, Delivery, Envelope, Result,
    Subscription,
};

use crate::cache::redis_impl::error::map_redis_broker_error;

/// Seconds a single `BLMOVE` blocks before the subscription polls again.
const BLOCK_TIMEOUT_SECS: f64 = 1.0;

/// Redis broker backend.
pub struct RedisBroker {
    client: redis::Client,
    conn: ConnectionManager,
}

impl RedisBroker {
    /// Connects to Redis.
    ///
    /// # Errors
    ///
    /// Returns `BrokerError::ConnectionFailed` if the connection cannot be established.
    pub async fn new(url: &str) -> Result<Self> {
        let client = redis::Client::open(url).map_err(map_redis_broker_error)?;
        let conn = ConnectionManager::new(client.clone())
            .await
            .map_err(map_redis_broker_error)?;
        Ok(Self { client, conn })
    }

    /// Moves messages left in the processing list by a previous run back to
    /// the consuming end of the queue, oldest first.
    async fn recover(&self, topic: &str) -> Result<usize> {
        let mut conn = self.conn.clone();
        let mut recovered = 0;
        loop {
            let moved: Option<Vec<u8>> = conn
                .lmove(
                    processing_key(topic),
                    queue_key(topic),
                    Direction::Left,
                    Direction::Right,
                )
                .await
                .map_err(map_redis_broker_error)?;
            if moved.is_none() {
                break;
            }
            recovered += 1;
        }
        Ok(recovered)
    }
}

#[async_trait]
impl Broker for RedisBroker {
    async fn publish(&self, topic: &str, payload: &[u8]) -> Result<()> {
        let mut conn = self.conn.clone();
        conn.lpush::<_, _, ()>(queue_key(topic), payload)
            .await
            .map_err(map_redis_broker_error)
    }

    async fn subscribe(&self, topic: &str) -> Result<Box<dyn Subscription>> {
        let recovered = self.recover(topic).await?;
        if recovered > 0 {
            tracing::info!(topic, recovered, "Requeued unacknowledged messages");
        }

        // BLMOVE blocks its connection, so each subscription gets its own.
        let blocking = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(map_redis_broker_error)?;

        Ok(Box::new(RedisSubscription {
            topic: topic.to_string(),
            conn: blocking,
            acknowledger: Arc::new(RedisAcknowledger {
                conn: self.conn.clone(),
            }),
        }))
    }
}

struct RedisSubscription {
    topic: String,
    conn: MultiplexedConnection,
    acknowledger: Arc<RedisAcknowledger>,
}

#[async_trait]
impl Subscription for RedisSubscription {
    async fn next_delivery(&mut self) -> Result<Option<Delivery>> {
        // A cancelled BLMOVE may still land its message in the processing
        // list; the next subscribe requeues it.
        loop {
            let payload: Option<Vec<u8>> = self
                .conn
                .blmove(
                    queue_key(&self.topic),
                    processing_key(&self.topic),
                    Direction::Right,
                    Direction::Left,
                    BLOCK_TIMEOUT_SECS,
                )
                .await
                .map_err(map_redis_broker_error)?;

            if let Some(payload) = payload {
                let acknowledger: Arc<dyn Acknowledger> = self.acknowledger.clone();
                return Ok(Some(Delivery::new(
                    Envelope::new(self.topic.clone(), payload),
                    acknowledger,
                )));
            }
        }
    }
}

struct RedisAcknowledger {
    conn: ConnectionManager,
}

#[async_trait]
impl Acknowledger for RedisAcknowledger {
    async fn ack(&self, envelope: &Envelope) -> Result<()> {
        let mut conn = self.conn.clone();
        conn.lrem::<_, _, ()>(processing_key(&envelope.topic), 1, envelope.payload.as_slice())
            .await
            .map_err(map_redis_broker_error)
    }

    async fn reject(&self, envelope: &Envelope) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: () = redis::pipe()
            .atomic()
            .lrem(processing_key(&envelope.topic), 1, envelope.payload.as_slice())
            .ignore()
            .lpush(dead_letter_key(&envelope.topic), envelope.payload.as_slice())
            .ignore()
            .query_async(&mut conn)
            .await
            .map_err(map_redis_broker_error)?;
        Ok(())
    }
}
