//! Action store.
//!
//! Provides a single-writer dispatch loop: reduce → route → tap → drain
//! follow-ups until settled. Async work started by epics re-enters through
//! the same loop, guarded by latest-wins tickets.
//!
//! Consumers define their domain by implementing `Reducer` (pure state
//! transitions) and `Epic` (reactions that start async lookups and emit new
//! actions).

pub mod error;
pub mod latest;
pub mod store;
pub mod tap;
pub mod traits;

pub use error::EngineError;
pub use latest::{Latest, Ticket};
pub use store::{Emitter, EpicContext, Store, StoreBuilder, WeakStore};
pub use tap::{MemoryActionLog, TracingTap};
pub use traits::{ActionLike, ActionTap, Epic, Reducer};
