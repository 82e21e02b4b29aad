//! Event ingestion pipeline.
//!
//! A [`ConsumerSupervisor`] owns one `TopicConsumer` task per registered
//! topic. Tasks share a `ShutdownSignal` and a `CompletionBarrier`; no
//! other state is shared between them.

mod registration;
mod shutdown;
mod supervisor;
mod topic;

pub use registration::registrations;
pub use supervisor::ConsumerSupervisor;

#[cfg(test)]
pub use registration::{HandleError, MessageHandler, TopicRegistration};
#[cfg(test)]
pub use shutdown::ShutdownSignal;
