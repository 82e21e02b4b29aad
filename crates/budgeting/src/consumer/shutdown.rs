//! Cancellation signal and completion barrier shared by consumer tasks.

use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{watch, Notify};

/// Process-wide cancellation, fanned out to every listener at once.
#[derive(Debug, Clone)]
pub struct ShutdownSignal {
    sender: Arc<watch::Sender<bool>>,
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
        }
    }
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancels every listener. Idempotent.
    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }

    #[cfg(test)]
    pub fn is_cancelled(&self) -> bool {
        *self.sender.borrow()
    }

    /// Waits for `trigger`, then cancels every listener before resolving.
    pub async fn cancel_after<F>(self, trigger: F)
    where
        F: Future<Output = ()>,
    {
        trigger.await;
        self.cancel();
    }

    pub fn listener(&self) -> ShutdownListener {
        ShutdownListener {
            receiver: self.sender.subscribe(),
        }
    }
}

/// Receiving half of a [`ShutdownSignal`].
#[derive(Debug, Clone)]
pub struct ShutdownListener {
    receiver: watch::Receiver<bool>,
}

impl ShutdownListener {
    /// Resolves once the signal is cancelled, immediately if it already was.
    ///
    /// Cancel safe.
    pub async fn cancelled(&mut self) {
        // An error means the signal was dropped, which also ends the wait.
        let _ = self.receiver.wait_for(|cancelled| *cancelled).await;
    }
}

#[derive(Debug)]
struct BarrierState {
    pending: AtomicUsize,
    notify: Notify,
}

/// Releases once a fixed number of tasks have reported completion.
#[derive(Debug, Clone)]
pub struct CompletionBarrier {
    state: Arc<BarrierState>,
}

impl CompletionBarrier {
    pub fn new(expected: usize) -> Self {
        Self {
            state: Arc::new(BarrierState {
                pending: AtomicUsize::new(expected),
                notify: Notify::new(),
            }),
        }
    }

    /// A token that reports completion when dropped, panics included.
    pub fn guard(&self) -> CompletionGuard {
        CompletionGuard {
            barrier: self.clone(),
        }
    }

    pub fn pending(&self) -> usize {
        self.state.pending.load(Ordering::SeqCst)
    }

    fn arrive(&self) {
        let previous = self
            .state
            .pending
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        if previous == Ok(1) {
            self.state.notify.notify_waiters();
        }
    }

    /// Waits until every expected task has arrived.
    pub async fn wait(&self) {
        loop {
            // Registered before the check so a concurrent last arrival is not missed.
            let notified = self.state.notify.notified();
            if self.pending() == 0 {
                return;
            }
            notified.await;
        }
    }
}

/// Reports one completion to its [`CompletionBarrier`] on drop.
#[derive(Debug)]
pub struct CompletionGuard {
    barrier: CompletionBarrier,
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        self.barrier.arrive();
    }
}
