// Trait abstractions for the collaborators the epics consult.
//
// BuckRootResolver: project path → enclosing build root.
// BuckServiceProvider / BuckService: rule-type lookups for a build root.
// PlatformService: long-lived platform list per rule type.
// TaskRunner: pluggable backend that publishes its task list.
//
// Mocks for all of these live in `testing.rs` behind `test-support`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};

use crate::state::{Platform, TaskMetadata};

// ---------------------------------------------------------------------------
// BuckRootResolver
// ---------------------------------------------------------------------------

#[async_trait]
pub trait BuckRootResolver: Send + Sync {
    /// Resolve `project_root` to the build root enclosing it. `None` when the
    /// path is not inside any build root.
    async fn resolve(&self, project_root: &Path) -> Result<Option<PathBuf>>;
}

// ---------------------------------------------------------------------------
// BuckServiceProvider / BuckService
// ---------------------------------------------------------------------------

/// Hands out the build service for a root, if one can be reached.
pub trait BuckServiceProvider: Send + Sync {
    fn service_for(&self, buck_root: &Path) -> Option<Arc<dyn BuckService>>;
}

#[async_trait]
pub trait BuckService: Send + Sync {
    /// Rule type of `build_target` (e.g. `python_binary`).
    async fn build_rule_type_for(&self, buck_root: &Path, build_target: &str) -> Result<String>;
}

/// Provider for hosts with no build service at all. Every lookup short-circuits
/// to an unknown rule type.
pub struct UnavailableBuckService;

impl BuckServiceProvider for UnavailableBuckService {
    fn service_for(&self, _buck_root: &Path) -> Option<Arc<dyn BuckService>> {
        None
    }
}

// ---------------------------------------------------------------------------
// PlatformService
// ---------------------------------------------------------------------------

/// Platforms applicable to a rule type. The stream stays open and may emit
/// again whenever the set changes.
pub trait PlatformService: Send + Sync {
    fn get_platforms(&self, rule_type: &str) -> BoxStream<'static, Result<Vec<Platform>>>;
}

/// Emits a single empty list for every rule type.
pub struct NoPlatforms;

impl PlatformService for NoPlatforms {
    fn get_platforms(&self, _rule_type: &str) -> BoxStream<'static, Result<Vec<Platform>>> {
        stream::once(async { Ok(Vec::new()) }).boxed()
    }
}

// ---------------------------------------------------------------------------
// TaskRunner
// ---------------------------------------------------------------------------

/// A pluggable backend exposing runnable tasks. Running them is the
/// backend's business; the panel only tracks what it publishes.
pub trait TaskRunner: Send + Sync {
    fn id(&self) -> &str;

    /// Human-readable name, stamped onto every published task.
    fn name(&self) -> &str;

    /// Current task list followed by every change to it.
    fn observe_task_list(&self) -> BoxStream<'static, Vec<TaskMetadata>>;
}
