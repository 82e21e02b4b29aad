mod error;
mod topics;
mod traits;

pub use error::{BrokerError, Result};
pub use topics::{
    dead_letter_key, processing_key, queue_key, BUDGET_UPDATED, GOAL_PROGRESS_UPDATED,
    NOTIFICATION_CREATED, TOPICS, TRANSACTION_CREATED,
};
pub use traits::{Acknowledger, Broker, Delivery, Envelope, Subscription};
