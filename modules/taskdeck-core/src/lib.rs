//! Coordination core for the build/task panel.
//!
//! `AppState` is only ever changed by [`reducer::reduce`]. The epics in
//! [`epics`] turn project-root, build-target and rule-type changes into
//! cancellable lookups and follow task-runner lists, feeding results back as
//! actions. [`PanelDeps`] wires both into a [`taskdeck_engine::Store`].

pub mod action;
pub mod config;
pub mod deps;
pub mod epics;
pub mod error;
pub mod reducer;
pub mod registry;
pub mod resolver;
pub mod state;
pub mod traits;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use action::Action;
pub use config::{load_config, PanelConfig};
pub use deps::{PanelDeps, PanelStore};
pub use error::ConfigError;
pub use reducer::{reduce, AppReducer};
pub use registry::RunnerMap;
pub use resolver::FsBuckRootResolver;
pub use state::{
    AnnotatedTaskMetadata, AppState, PanelHandle, Platform, SessionSnapshot, TaskId, TaskInfo,
    TaskMetadata, TaskRunnerDescriptor, TaskStatus,
};
pub use traits::{
    BuckRootResolver, BuckService, BuckServiceProvider, NoPlatforms, PlatformService, TaskRunner,
    UnavailableBuckService,
};
