//! Topic names and the queue keys derived from them.

pub const TRANSACTION_CREATED: &str = "transaction_created";
pub const BUDGET_UPDATED: &str = "budget_updated";
pub const GOAL_PROGRESS_UPDATED: &str = "goal_progress_updated";
pub const NOTIFICATION_CREATED: &str = "notification_created";

/// Every topic the consumers subscribe to.
pub const TOPICS: [&str; 4] = [
    TRANSACTION_CREATED,
    BUDGET_UPDATED,
    GOAL_PROGRESS_UPDATED,
    NOTIFICATION_CREATED,
];

/// List holding messages waiting to be delivered.
pub fn queue_key(topic: &str) -> String {
    format!("queue:{topic}")
}

/// List holding messages delivered but not yet resolved.
pub fn processing_key(topic: &str) -> String {
    format!("queue:{topic}:processing")
}

/// List holding rejected messages, kept for inspection only.
pub fn dead_letter_key(topic: &str) -> String {
    format!("queue:{topic}:dead")
}
