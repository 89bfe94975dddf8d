//! Core traits for the store.

use std::fmt::Debug;
use std::sync::Arc;

use crate::store::EpicContext;

/// Actions carry a stable kind string used for logging and filtering.
pub trait ActionLike: Debug + Clone + Send + Sync + 'static {
    /// The action kind, e.g. `"SET_PROJECT_ROOT"`.
    fn action_type(&self) -> &'static str;
}

/// Pure state transitions. No I/O, no side effects, never fails.
///
/// Returning `Arc::clone(state)` signals "nothing changed"; the store then
/// keeps the existing snapshot instead of swapping in a new one.
pub trait Reducer<A: ActionLike, S: Send + Sync>: Send + Sync + 'static {
    fn reduce(&self, state: &Arc<S>, action: &A) -> Arc<S>;
}

/// Reacts to dispatched actions. May start async work, may emit new actions.
///
/// `route` runs synchronously under the dispatch lock right after the
/// reducer, with the freshly reduced state. Immediate follow-ups are
/// returned and queued behind the current action. Anything slower is spawned
/// through [`EpicContext::spawn`] and emits later through a ticket-guarded
/// [`Emitter`](crate::Emitter).
///
/// Implementations must not call [`Store::dispatch`](crate::Store::dispatch)
/// from inside `route`.
pub trait Epic<A: ActionLike, S: Send + Sync + 'static>: Send + Sync + 'static {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    fn route(&self, action: &A, ctx: &EpicContext<'_, A, S>) -> Vec<A>;
}

/// Observes every action after it has been reduced and routed.
///
/// Runs under the dispatch lock, so taps see actions in exactly the order
/// the reducer applied them.
pub trait ActionTap<A: ActionLike>: Send + Sync + 'static {
    fn record(&self, action: &A);
}

impl<A: ActionLike, T: ActionTap<A> + ?Sized> ActionTap<A> for Arc<T> {
    fn record(&self, action: &A) {
        (**self).record(action)
    }
}
