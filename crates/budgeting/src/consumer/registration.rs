//! Declarative topic-to-handler table.

use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use thiserror::Error;

use budgeting_core::broker::{
    BUDGET_UPDATED, GOAL_PROGRESS_UPDATED, NOTIFICATION_CREATED, TRANSACTION_CREATED,
};
use budgeting_core::finance::{
    BudgetPatch, GoalPatch, NewNotification, NewTransaction, UpdateRequest,
};

use crate::services::{ServiceError, Services};

/// Why a message could not be processed.
#[derive(Debug, Error)]
pub enum HandleError {
    #[error("Failed to decode payload: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Handler failed: {0}")]
    Handler(#[from] ServiceError),
}

/// Decodes a payload and dispatches it to a domain handler.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    async fn handle(&self, payload: &[u8]) -> Result<(), HandleError>;
}

/// A [`MessageHandler`] decoding JSON payloads into `Req`.
pub struct JsonHandler<Req, F> {
    handler: F,
    _request: PhantomData<fn(Req)>,
}

impl<Req, F> JsonHandler<Req, F> {
    pub fn new(handler: F) -> Self {
        Self {
            handler,
            _request: PhantomData,
        }
    }
}

#[async_trait]
impl<Req, F, Fut> MessageHandler for JsonHandler<Req, F>
where
    Req: DeserializeOwned + Send + 'static,
    F: Fn(Req) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), ServiceError>> + Send + 'static,
{
    async fn handle(&self, payload: &[u8]) -> Result<(), HandleError> {
        let request: Req = serde_json::from_slice(payload)?;
        (self.handler)(request).await?;
        Ok(())
    }
}

/// One topic bound to its decode shape and handler.
#[derive(Clone)]
pub struct TopicRegistration {
    pub topic: &'static str,
    pub handler: Arc<dyn MessageHandler>,
}

impl TopicRegistration {
    pub fn new(topic: &'static str, handler: Arc<dyn MessageHandler>) -> Self {
        Self { topic, handler }
    }

    /// Binds `topic` to a handler taking a JSON-decoded `Req`.
    pub fn json<Req, F, Fut>(topic: &'static str, handler: F) -> Self
    where
        Req: DeserializeOwned + Send + 'static,
        F: Fn(Req) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), ServiceError>> + Send + 'static,
    {
        Self::new(topic, Arc::new(JsonHandler::new(handler)))
    }
}

/// The fixed set of topics the backend consumes.
///
/// Update events that find no active record, or carry nothing to change,
/// are successful outcomes and get acknowledged.
pub fn registrations(services: &Services) -> Vec<TopicRegistration> {
    let transactions = services.transactions.clone();
    let budgets = services.budgets.clone();
    let goals = services.goals.clone();
    let notifications = services.notifications.clone();

    vec![
        TopicRegistration::json(TRANSACTION_CREATED, move |draft: NewTransaction| {
            let transactions = transactions.clone();
            async move { transactions.create(draft).await.map(|_| ()) }
        }),
        TopicRegistration::json(
            BUDGET_UPDATED,
            move |request: UpdateRequest<BudgetPatch>| {
                let budgets = budgets.clone();
                async move { budgets.update(request).await.map(|_| ()) }
            },
        ),
        TopicRegistration::json(
            GOAL_PROGRESS_UPDATED,
            move |request: UpdateRequest<GoalPatch>| {
                let goals = goals.clone();
                async move { goals.update(request).await.map(|_| ()) }
            },
        ),
        TopicRegistration::json(NOTIFICATION_CREATED, move |draft: NewNotification| {
            let notifications = notifications.clone();
            async move { notifications.create(draft).await.map(|_| ()) }
        }),
    ]
}
