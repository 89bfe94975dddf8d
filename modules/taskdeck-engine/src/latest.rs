//! Latest-wins generation tokens.
//!
//! Each kind of async operation owns one [`Latest`]. Starting a new
//! operation calls [`Latest::supersede`], which bumps the generation, aborts
//! the previous task and hands out a [`Ticket`]. A completion may only emit
//! while its ticket is current; the store checks this under its dispatch
//! lock, so a superseded result can never reach the reducer.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::task::AbortHandle;
use tracing::trace;

/// Generation counter plus the abort handle of the in-flight task.
pub struct Latest {
    generation: Arc<AtomicU64>,
    inflight: Mutex<Option<AbortHandle>>,
}

impl Latest {
    pub fn new() -> Self {
        Self {
            generation: Arc::new(AtomicU64::new(0)),
            inflight: Mutex::new(None),
        }
    }

    /// Invalidate whatever is in flight and return the ticket for the next
    /// operation. Also used on its own to cancel without starting anything.
    pub fn supersede(&self) -> Ticket {
        let id = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(previous) = self.lock_inflight().take() {
            trace!(generation = id, "Aborting superseded task");
            previous.abort();
        }
        Ticket {
            id,
            generation: Arc::clone(&self.generation),
        }
    }

    /// The generation handed out by the most recent `supersede`.
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Remember the task started for `ticket` so the next `supersede` can
    /// abort it. A task whose ticket is already stale is aborted on the spot.
    pub(crate) fn track(&self, ticket: &Ticket, handle: AbortHandle) {
        if !ticket.is_current() {
            handle.abort();
            return;
        }
        if let Some(previous) = self.lock_inflight().replace(handle) {
            previous.abort();
        }
    }

    fn lock_inflight(&self) -> std::sync::MutexGuard<'_, Option<AbortHandle>> {
        self.inflight.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Latest {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Latest {
    fn drop(&mut self) {
        if let Some(handle) = self.lock_inflight().take() {
            handle.abort();
        }
    }
}

/// Proof that an operation was started at a given generation.
#[derive(Debug, Clone)]
pub struct Ticket {
    id: u64,
    generation: Arc<AtomicU64>,
}

impl Ticket {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// True until a newer operation of the same kind supersedes this one.
    pub fn is_current(&self) -> bool {
        self.generation.load(Ordering::SeqCst) == self.id
    }
}
