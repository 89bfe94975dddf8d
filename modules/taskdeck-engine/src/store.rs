//! The dispatch loop.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError, Weak};

use arc_swap::ArcSwap;
use tokio::runtime::Handle;
use tracing::{debug, trace, warn};

use crate::error::EngineError;
use crate::latest::{Latest, Ticket};
use crate::traits::{ActionLike, ActionTap, Epic, Reducer};

/// Single-writer state container.
///
/// Reduce → route → tap → drain follow-ups until settled. Dispatch is
/// serialized by one lock; snapshots are lock-free via `ArcSwap`.
pub struct Store<A: ActionLike, S: Send + Sync + 'static> {
    inner: Arc<Inner<A, S>>,
}

struct Inner<A: ActionLike, S: Send + Sync + 'static> {
    state: ArcSwap<S>,
    reducer: Box<dyn Reducer<A, S>>,
    epics: Vec<Box<dyn Epic<A, S>>>,
    taps: Vec<Box<dyn ActionTap<A>>>,
    serial: Mutex<()>,
    runtime: Option<Handle>,
}

impl<A: ActionLike, S: Send + Sync + 'static> Clone for Store<A, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A: ActionLike, S: Send + Sync + 'static> Store<A, S> {
    pub fn builder(reducer: impl Reducer<A, S>, initial: S) -> StoreBuilder<A, S> {
        StoreBuilder::new(reducer, initial)
    }

    /// Current state snapshot. Never blocks on an in-progress dispatch.
    pub fn get_state(&self) -> Arc<S> {
        self.inner.state.load_full()
    }

    /// Reduce `action` and everything it synchronously triggers.
    pub fn dispatch(&self, action: A) {
        self.apply(None, |_| vec![action]);
    }

    /// Dispatch several actions back to back under one lock acquisition.
    pub fn dispatch_all(&self, actions: impl IntoIterator<Item = A>) {
        let actions: Vec<A> = actions.into_iter().collect();
        self.apply(None, |_| actions);
    }

    pub fn downgrade(&self) -> WeakStore<A, S> {
        WeakStore {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Build the actions from the live state and apply them. Returns false
    /// (and builds nothing) when `guard` has been superseded.
    fn apply<F>(&self, guard: Option<&Ticket>, actions: F) -> bool
    where
        F: FnOnce(&Arc<S>) -> Vec<A>,
    {
        let _serial = self
            .inner
            .serial
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(ticket) = guard {
            if !ticket.is_current() {
                debug!(ticket = ticket.id(), "Discarding superseded result");
                return false;
            }
        }

        let mut queue: VecDeque<A> = actions(&self.inner.state.load_full()).into();
        while let Some(action) = queue.pop_front() {
            // 1. Reduce
            let current = self.inner.state.load_full();
            let next = self.inner.reducer.reduce(&current, &action);
            if Arc::ptr_eq(&current, &next) {
                trace!(action = action.action_type(), "Action left state unchanged");
            } else {
                self.inner.state.store(Arc::clone(&next));
            }

            // 2. Route (may spawn async work, may return follow-ups)
            let ctx = EpicContext {
                state: &next,
                store: self,
            };
            for epic in &self.inner.epics {
                let follow_ups = epic.route(&action, &ctx);
                if !follow_ups.is_empty() {
                    trace!(
                        epic = epic.name(),
                        trigger = action.action_type(),
                        count = follow_ups.len(),
                        "Queued follow-up actions"
                    );
                }
                queue.extend(follow_ups);
            }

            // 3. Tap
            for tap in &self.inner.taps {
                tap.record(&action);
            }
        }

        true
    }
}

/// Non-owning store handle held by in-flight async work.
pub struct WeakStore<A: ActionLike, S: Send + Sync + 'static> {
    inner: Weak<Inner<A, S>>,
}

impl<A: ActionLike, S: Send + Sync + 'static> Clone for WeakStore<A, S> {
    fn clone(&self) -> Self {
        Self {
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<A: ActionLike, S: Send + Sync + 'static> WeakStore<A, S> {
    pub fn upgrade(&self) -> Option<Store<A, S>> {
        self.inner.upgrade().map(|inner| Store { inner })
    }
}

// ---------------------------------------------------------------------------
// Epic plumbing
// ---------------------------------------------------------------------------

/// What an epic sees while routing one action.
pub struct EpicContext<'a, A: ActionLike, S: Send + Sync + 'static> {
    state: &'a Arc<S>,
    store: &'a Store<A, S>,
}

impl<'a, A: ActionLike, S: Send + Sync + 'static> EpicContext<'a, A, S> {
    /// State right after the action being routed was reduced.
    pub fn state(&self) -> &Arc<S> {
        self.state
    }

    /// Run `work` on the store's runtime. Its emitter only gets through
    /// while `ticket` is current, and `latest` aborts the task once a newer
    /// operation supersedes it.
    pub fn spawn<F, Fut>(&self, latest: &Latest, ticket: Ticket, work: F)
    where
        F: FnOnce(Emitter<A, S>) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let Some(runtime) = &self.store.inner.runtime else {
            warn!(ticket = ticket.id(), "No runtime to spawn epic work on, dropping it");
            return;
        };
        let emitter = Emitter {
            store: self.store.downgrade(),
            ticket: ticket.clone(),
        };
        let handle = runtime.spawn(work(emitter));
        latest.track(&ticket, handle.abort_handle());
    }
}

/// Feeds async results back through the store, guarded by a ticket.
pub struct Emitter<A: ActionLike, S: Send + Sync + 'static> {
    store: WeakStore<A, S>,
    ticket: Ticket,
}

impl<A: ActionLike, S: Send + Sync + 'static> Clone for Emitter<A, S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            ticket: self.ticket.clone(),
        }
    }
}

impl<A: ActionLike, S: Send + Sync + 'static> Emitter<A, S> {
    /// Dispatch `actions` atomically if the ticket is still current.
    /// Returns false once superseded or once the store is gone.
    pub fn emit(&self, actions: impl IntoIterator<Item = A>) -> bool {
        let actions: Vec<A> = actions.into_iter().collect();
        self.emit_with(|_| actions)
    }

    /// Like [`emit`](Self::emit), but builds the actions from the state as
    /// it is at the moment they are applied.
    pub fn emit_with<F>(&self, actions: F) -> bool
    where
        F: FnOnce(&S) -> Vec<A>,
    {
        match self.store.upgrade() {
            Some(store) => store.apply(Some(&self.ticket), |state| actions(&**state)),
            None => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

pub struct StoreBuilder<A: ActionLike, S: Send + Sync + 'static> {
    reducer: Box<dyn Reducer<A, S>>,
    initial: S,
    epics: Vec<Box<dyn Epic<A, S>>>,
    taps: Vec<Box<dyn ActionTap<A>>>,
    runtime: Option<Handle>,
}

impl<A: ActionLike, S: Send + Sync + 'static> StoreBuilder<A, S> {
    pub fn new(reducer: impl Reducer<A, S>, initial: S) -> Self {
        Self {
            reducer: Box::new(reducer),
            initial,
            epics: Vec::new(),
            taps: Vec::new(),
            runtime: None,
        }
    }

    pub fn epic(mut self, epic: impl Epic<A, S>) -> Self {
        self.epics.push(Box::new(epic));
        self
    }

    pub fn tap(mut self, tap: impl ActionTap<A>) -> Self {
        self.taps.push(Box::new(tap));
        self
    }

    /// Spawn epic work on `handle` instead of the ambient runtime.
    pub fn runtime(mut self, handle: Handle) -> Self {
        self.runtime = Some(handle);
        self
    }

    pub fn build(self) -> Result<Store<A, S>, EngineError> {
        let runtime = self.runtime.or_else(|| Handle::try_current().ok());
        if runtime.is_none() && !self.epics.is_empty() {
            return Err(EngineError::NoRuntime {
                epics: self.epics.len(),
            });
        }

        debug!(
            epics = self.epics.len(),
            taps = self.taps.len(),
            "Store built"
        );

        Ok(Store {
            inner: Arc::new(Inner {
                state: ArcSwap::new(Arc::new(self.initial)),
                reducer: self.reducer,
                epics: self.epics,
                taps: self.taps,
                serial: Mutex::new(()),
                runtime,
            }),
        })
    }
}
