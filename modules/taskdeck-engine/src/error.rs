use thiserror::Error;

/// Errors raised while assembling a store.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Built outside a tokio runtime with epics and no explicit handle.
    #[error("store has {epics} epic(s) but no tokio runtime is available")]
    NoRuntime { epics: usize },
}
