//! Lifecycle owner of the topic consumers.

use std::time::Duration;

use futures_util::future::join_all;
use tokio::task::JoinHandle;

use budgeting_core::broker::{Broker, Result};

use super::registration::TopicRegistration;
use super::shutdown::{CompletionBarrier, ShutdownSignal};
use super::topic::{ConsumerStats, TopicConsumer};

/// Runs one task per registered topic and stops them together.
///
/// Every task holds a completion guard on a
/// barrier sized to the number of topics; [`shutdown`](Self::shutdown)
/// cancels the shared signal and returns only once the barrier releases.
pub struct ConsumerSupervisor {
    signal: ShutdownSignal,
    barrier: CompletionBarrier,
    tasks: Vec<(&'static str, JoinHandle<ConsumerStats>)>,
}

impl ConsumerSupervisor {
    /// Subscribes to every topic, then spawns the consumers.
    ///
    /// Subscriptions are all opened before any task starts, so a failure
    /// leaves nothing running.
    pub async fn start(
        broker: &dyn Broker,
        registrations: Vec<TopicRegistration>,
        retry_delay: Duration,
    ) -> Result<Self> {
        let mut consumers = Vec::with_capacity(registrations.len());
        for registration in registrations {
            let subscription = broker.subscribe(registration.topic).await?;
            consumers.push(TopicConsumer::new(
                registration.topic,
                subscription,
                registration.handler,
                retry_delay,
            ));
        }

        let signal = ShutdownSignal::new();
        let barrier = CompletionBarrier::new(consumers.len());

        let tasks = consumers
            .into_iter()
            .map(|consumer| {
                let topic = consumer.topic();
                let guard = barrier.guard();
                let listener = signal.listener();
                let task = tokio::spawn(async move {
                    let _guard = guard;
                    consumer.run(listener).await
                });
                (topic, task)
            })
            .collect::<Vec<_>>();

        tracing::info!(consumers = tasks.len(), "Consumer supervisor started");

        Ok(Self {
            signal,
            barrier,
            tasks,
        })
    }

    /// The shared cancellation signal. Cancelling it stops every consumer;
    /// call [`shutdown`](Self::shutdown) to wait for them.
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.signal.clone()
    }

    pub fn topics(&self) -> Vec<&'static str> {
        self.tasks.iter().map(|(topic, _)| *topic).collect()
    }

    /// Cancels every consumer and waits until all of them have returned.
    ///
    /// A handler already running finishes and its message is resolved
    /// before this returns.
    pub async fn shutdown(self) -> Vec<(&'static str, ConsumerStats)> {
        tracing::info!(consumers = self.tasks.len(), "Stopping consumers");
        self.signal.cancel();
        self.barrier.wait().await;

        let (topics, tasks): (Vec<_>, Vec<_>) = self.tasks.into_iter().unzip();
        let results = join_all(tasks).await;

        let mut stats = Vec::with_capacity(topics.len());
        for (topic, result) in topics.into_iter().zip(results) {
            match result {
                Ok(consumer_stats) => stats.push((topic, consumer_stats)),
                Err(err) => tracing::error!(topic, error = %err, "Consumer task failed"),
            }
        }

        tracing::info!("All consumers stopped");
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use async_trait::async_trait;
    use chrono::NaiveDate;
    use tokio::sync::Notify;

    use budgeting_core::broker::{BrokerError, BUDGET_UPDATED, TOPICS, TRANSACTION_CREATED};
    use budgeting_core::finance::{BudgetPeriod, NewBudget, TransactionQuery};

    use crate::broker::{MemoryBroker, Resolution};
    use crate::cache::MemoryCache;
    use crate::consumer::{registrations, HandleError, MessageHandler};
    use crate::services::Services;
    use crate::storage::InMemoryStore;

    const RETRY: Duration = Duration::from_millis(10);

    fn services() -> Services {
        Services::new(
            Arc::new(InMemoryStore::new()),
            Arc::new(MemoryCache::new(100)),
            Duration::from_secs(60),
        )
    }

    /// Blocks inside the handler until released.
    #[derive(Default)]
    struct BlockingHandler {
        started: Notify,
        release: Notify,
    }

    #[async_trait]
    impl MessageHandler for BlockingHandler {
        async fn handle(&self, _payload: &[u8]) -> std::result::Result<(), HandleError> {
            self.started.notify_one();
            self.release.notified().await;
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_starts_one_consumer_per_topic() {
        let broker = MemoryBroker::new();
        let supervisor = ConsumerSupervisor::start(&broker, registrations(&services()), RETRY)
            .await
            .unwrap();

        assert_eq!(supervisor.topics(), TOPICS.to_vec());

        let stats = supervisor.shutdown().await;
        assert_eq!(stats.len(), TOPICS.len());
    }

    #[tokio::test]
    async fn test_failed_subscription_fails_start() {
        let broker = MemoryBroker::new();
        let _taken = broker.subscribe(BUDGET_UPDATED).await.unwrap();

        let result = ConsumerSupervisor::start(&broker, registrations(&services()), RETRY).await;

        assert_eq!(
            result.err().map(|err| err.to_string()),
            Some(BrokerError::AlreadySubscribed(BUDGET_UPDATED.to_string()).to_string())
        );
    }

    #[tokio::test]
    async fn test_shutdown_waits_for_in_flight_handler() {
        let broker = MemoryBroker::new();
        let handler = Arc::new(BlockingHandler::default());
        let supervisor = ConsumerSupervisor::start(
            &broker,
            vec![TopicRegistration::new("slow", handler.clone())],
            RETRY,
        )
        .await
        .unwrap();

        broker.publish("slow", b"{}").await.unwrap();
        handler.started.notified().await;

        let mut shutdown = tokio::spawn(supervisor.shutdown());
        assert!(
            tokio::time::timeout(Duration::from_millis(100), &mut shutdown)
                .await
                .is_err(),
            "shutdown returned while a handler was still running"
        );
        assert!(broker.resolutions().is_empty());

        handler.release.notify_one();
        let stats = tokio::time::timeout(Duration::from_secs(1), shutdown)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(stats, vec![("slow", ConsumerStats { acked: 1, ..Default::default() })]);
        let resolved = broker.resolutions();
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].resolution, Resolution::Acked);
    }

    #[tokio::test]
    async fn test_shutdown_signal_is_shared() {
        let broker = MemoryBroker::new();
        let supervisor = ConsumerSupervisor::start(&broker, registrations(&services()), RETRY)
            .await
            .unwrap();

        let signal = supervisor.shutdown_signal();
        signal.cancel();

        tokio::time::timeout(Duration::from_secs(1), supervisor.shutdown())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_interrupt_stops_consumers_before_shutdown_is_awaited() {
        let broker = MemoryBroker::new();
        let supervisor = ConsumerSupervisor::start(&broker, registrations(&services()), RETRY)
            .await
            .unwrap();
        let (interrupt, interrupted) = tokio::sync::oneshot::channel::<()>();
        let graceful = tokio::spawn(supervisor.shutdown_signal().cancel_after(async move {
            let _ = interrupted.await;
        }));

        // Nothing stops before the interrupt arrives
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(supervisor.barrier.pending(), TOPICS.len());

        interrupt.send(()).unwrap();
        graceful.await.unwrap();

        // Every consumer returns without waiting for `shutdown`
        tokio::time::timeout(Duration::from_secs(1), supervisor.barrier.wait())
            .await
            .unwrap();
        assert!(broker.resolutions().is_empty());

        let stats = supervisor.shutdown().await;
        assert_eq!(stats.len(), TOPICS.len());
    }

    #[tokio::test]
    async fn test_malformed_transaction_does_not_stop_pipeline() {
        let broker = MemoryBroker::new();
        let services = services();
        let supervisor = ConsumerSupervisor::start(&broker, registrations(&services), RETRY)
            .await
            .unwrap();

        broker
            .publish(TRANSACTION_CREATED, b"{\"user_id\":\"u1\",")
            .await
            .unwrap();
        broker
            .publish(
                TRANSACTION_CREATED,
                br#"{"user_id":"u1","account_id":"a1","category_id":"c1","amount":9.99,"type":"expense","date":"2024-01-02"}"#,
            )
            .await
            .unwrap();
        let resolved = broker.wait_for_resolutions(2).await;

        assert_eq!(resolved[0].resolution, Resolution::Rejected);
        assert_eq!(resolved[1].resolution, Resolution::Acked);
        let stored = services
            .transactions
            .list(&TransactionQuery::default())
            .await
            .unwrap();
        assert_eq!(stored.len(), 1);

        supervisor.shutdown().await;
    }

    #[tokio::test]
    async fn test_budget_updated_end_to_end() {
        let broker = MemoryBroker::new();
        let services = services();
        let budget = services
            .budgets
            .create(NewBudget {
                user_id: "u1".to_string(),
                category_id: "groceries".to_string(),
                name: "Groceries".to_string(),
                amount: 100.0,
                period: BudgetPeriod::Monthly,
                start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
                end_date: NaiveDate::from_ymd_opt(2024, 1, 31).unwrap(),
            })
            .await
            .unwrap();
        let supervisor = ConsumerSupervisor::start(&broker, registrations(&services), RETRY)
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(2)).await;

        let payload = format!(
            r#"{{"id":"{}","user_id":"u1","name":"Groceries","amount":150,"period":"monthly","start_date":"2024-01-01","end_date":"2024-01-31"}}"#,
            budget.id
        );
        broker
            .publish(BUDGET_UPDATED, payload.as_bytes())
            .await
            .unwrap();
        let resolved = broker.wait_for_resolutions(1).await;
        supervisor.shutdown().await;

        assert_eq!(resolved[0].resolution, Resolution::Acked);
        let updated = services.budgets.get(&budget.id).await.unwrap().unwrap();
        assert_eq!(updated.amount, 150.0);
        assert!(updated.updated_at > budget.updated_at);
        assert_eq!(updated.created_at, budget.created_at);
    }
}
