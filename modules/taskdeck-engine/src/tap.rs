//! ActionTap implementations.

use std::pin::pin;
use std::sync::{Mutex, PoisonError};

use tokio::sync::Notify;
use tracing::debug;

use crate::traits::{ActionLike, ActionTap};

// ---------------------------------------------------------------------------
// TracingTap (production: structured log line per action)
// ---------------------------------------------------------------------------

/// Logs every applied action kind at `debug`.
pub struct TracingTap;

impl<A: ActionLike> ActionTap<A> for TracingTap {
    fn record(&self, action: &A) {
        debug!(action = action.action_type(), "Action applied");
    }
}

// ---------------------------------------------------------------------------
// MemoryActionLog (tests: records everything, lets callers await arrivals)
// ---------------------------------------------------------------------------

/// In-memory action recorder. Thread-safe.
///
/// Share it with the store through `Arc` and assert on [`actions`](Self::actions)
/// or await [`wait_for`](Self::wait_for) for actions emitted by async epics.
pub struct MemoryActionLog<A> {
    actions: Mutex<Vec<A>>,
    arrived: Notify,
}

impl<A: ActionLike> MemoryActionLog<A> {
    pub fn new() -> Self {
        Self {
            actions: Mutex::new(Vec::new()),
            arrived: Notify::new(),
        }
    }

    /// Every recorded action, in application order.
    pub fn actions(&self) -> Vec<A> {
        self.lock().clone()
    }

    pub fn action_types(&self) -> Vec<&'static str> {
        self.lock().iter().map(ActionLike::action_type).collect()
    }

    /// Number of recorded actions of kind `action_type`.
    pub fn count(&self, action_type: &str) -> usize {
        self.lock()
            .iter()
            .filter(|a| a.action_type() == action_type)
            .count()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Resolve once `predicate` holds for the recorded actions. Callers put
    /// their own timeout around this.
    pub async fn wait_for<F>(&self, predicate: F)
    where
        F: Fn(&[A]) -> bool,
    {
        loop {
            let mut notified = pin!(self.arrived.notified());
            notified.as_mut().enable();
            if predicate(self.lock().as_slice()) {
                return;
            }
            notified.await;
        }
    }

    /// Resolve once at least `n` actions of kind `action_type` were recorded.
    pub async fn wait_for_count(&self, action_type: &str, n: usize) {
        self.wait_for(|actions| {
            actions
                .iter()
                .filter(|a| a.action_type() == action_type)
                .count()
                >= n
        })
        .await
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<A>> {
        self.actions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<A: ActionLike> Default for MemoryActionLog<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: ActionLike> ActionTap<A> for MemoryActionLog<A> {
    fn record(&self, action: &A) {
        self.lock().push(action.clone());
        self.arrived.notify_waiters();
    }
}
