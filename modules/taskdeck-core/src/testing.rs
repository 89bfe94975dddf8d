// Test mocks for the panel collaborators.
//
// One mock per trait boundary:
// - MockRootResolver (BuckRootResolver): path→root map, failures, release gates,
//   calls and completions
// - MockBuckService (BuckServiceProvider + BuckService): target→rule type map
// - MockPlatformService (PlatformService): per-rule-type push channels
// - StaticTaskRunner (TaskRunner): task list backed by a watch channel
//
// Plus `settle()` for letting spawned epic work run to its next await point.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::{bail, Result};
use async_trait::async_trait;
use futures::channel::mpsc;
use futures::stream::{self, BoxStream, StreamExt};
use tokio::sync::{oneshot, watch};

use crate::state::{Platform, TaskMetadata};
use crate::traits::{BuckRootResolver, BuckService, BuckServiceProvider, PlatformService, TaskRunner};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Yield to the runtime a few times so spawned epic tasks get to run.
pub async fn settle() {
    for _ in 0..10 {
        tokio::task::yield_now().await;
    }
}

// ---------------------------------------------------------------------------
// MockRootResolver
// ---------------------------------------------------------------------------

/// Map-based root resolver. Unknown paths resolve to `None`.
/// Builder pattern: `.on_root()`, `.failing()`; `.gate()` holds a path's
/// resolution until the returned [`Gate`] is released.
#[derive(Default)]
pub struct MockRootResolver {
    roots: Mutex<HashMap<PathBuf, PathBuf>>,
    failing: Mutex<HashSet<PathBuf>>,
    gates: Mutex<HashMap<PathBuf, oneshot::Receiver<()>>>,
    calls: Mutex<Vec<PathBuf>>,
    completions: Mutex<Vec<PathBuf>>,
}

/// Releases one gated resolution.
pub struct Gate(oneshot::Sender<()>);

impl Gate {
    pub fn release(self) {
        // The resolution may already have been aborted.
        let _ = self.0.send(());
    }
}

impl MockRootResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_root(self, project_root: impl Into<PathBuf>, buck_root: impl Into<PathBuf>) -> Self {
        lock(&self.roots).insert(project_root.into(), buck_root.into());
        self
    }

    pub fn failing(self, project_root: impl Into<PathBuf>) -> Self {
        lock(&self.failing).insert(project_root.into());
        self
    }

    /// Hold the next resolution of `project_root` until the gate is released.
    pub fn gate(&self, project_root: impl Into<PathBuf>) -> Gate {
        let (tx, rx) = oneshot::channel();
        lock(&self.gates).insert(project_root.into(), rx);
        Gate(tx)
    }

    pub fn calls(&self) -> Vec<PathBuf> {
        lock(&self.calls).clone()
    }

    pub fn call_count(&self) -> usize {
        lock(&self.calls).len()
    }

    /// Paths whose resolution ran to completion, success or failure.
    /// A resolution aborted at its gate never shows up here.
    pub fn completed(&self) -> Vec<PathBuf> {
        lock(&self.completions).clone()
    }
}

#[async_trait]
impl BuckRootResolver for MockRootResolver {
    async fn resolve(&self, project_root: &Path) -> Result<Option<PathBuf>> {
        lock(&self.calls).push(project_root.to_path_buf());

        let gate = lock(&self.gates).remove(project_root);
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        lock(&self.completions).push(project_root.to_path_buf());
        if lock(&self.failing).contains(project_root) {
            bail!("no build root for {}", project_root.display());
        }
        Ok(lock(&self.roots).get(project_root).cloned())
    }
}

// ---------------------------------------------------------------------------
// MockBuckService
// ---------------------------------------------------------------------------

/// Target→rule type lookup shared between the provider and the services it
/// hands out. Unknown targets fail the lookup.
#[derive(Clone, Default)]
pub struct MockBuckService {
    inner: Arc<MockBuckInner>,
}

#[derive(Default)]
struct MockBuckInner {
    rule_types: Mutex<HashMap<String, String>>,
    unavailable_roots: Mutex<HashSet<PathBuf>>,
    lookups: Mutex<Vec<(PathBuf, String)>>,
}

impl MockBuckService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_target(self, build_target: &str, rule_type: &str) -> Self {
        lock(&self.inner.rule_types).insert(build_target.to_string(), rule_type.to_string());
        self
    }

    /// No service is handed out for `buck_root`.
    pub fn unavailable_for(self, buck_root: impl Into<PathBuf>) -> Self {
        lock(&self.inner.unavailable_roots).insert(buck_root.into());
        self
    }

    pub fn lookups(&self) -> Vec<(PathBuf, String)> {
        lock(&self.inner.lookups).clone()
    }

    pub fn lookup_count(&self) -> usize {
        lock(&self.inner.lookups).len()
    }
}

impl BuckServiceProvider for MockBuckService {
    fn service_for(&self, buck_root: &Path) -> Option<Arc<dyn BuckService>> {
        if lock(&self.inner.unavailable_roots).contains(buck_root) {
            return None;
        }
        Some(Arc::new(self.clone()))
    }
}

#[async_trait]
impl BuckService for MockBuckService {
    async fn build_rule_type_for(&self, buck_root: &Path, build_target: &str) -> Result<String> {
        lock(&self.inner.lookups).push((buck_root.to_path_buf(), build_target.to_string()));
        match lock(&self.inner.rule_types).get(build_target) {
            Some(rule_type) => Ok(rule_type.clone()),
            None => bail!("unknown build target {build_target}"),
        }
    }
}

// ---------------------------------------------------------------------------
// MockPlatformService
// ---------------------------------------------------------------------------

type PlatformSender = mpsc::UnboundedSender<Result<Vec<Platform>>>;
type PlatformReceiver = mpsc::UnboundedReceiver<Result<Vec<Platform>>>;

/// Platform streams the test pushes into. A rule type with no channel gets
/// a stream that never emits.
#[derive(Default)]
pub struct MockPlatformService {
    channels: Mutex<HashMap<String, PlatformReceiver>>,
    subscriptions: Mutex<Vec<String>>,
}

impl MockPlatformService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sender feeding the next subscription to `rule_type`.
    pub fn channel(&self, rule_type: &str) -> PlatformSender {
        let (tx, rx) = mpsc::unbounded();
        lock(&self.channels).insert(rule_type.to_string(), rx);
        tx
    }

    pub fn subscriptions(&self) -> Vec<String> {
        lock(&self.subscriptions).clone()
    }
}

impl PlatformService for MockPlatformService {
    fn get_platforms(&self, rule_type: &str) -> BoxStream<'static, Result<Vec<Platform>>> {
        lock(&self.subscriptions).push(rule_type.to_string());
        match lock(&self.channels).remove(rule_type) {
            Some(rx) => rx.boxed(),
            None => stream::pending().boxed(),
        }
    }
}

// ---------------------------------------------------------------------------
// StaticTaskRunner
// ---------------------------------------------------------------------------

/// Task runner whose list the test replaces at will. Every subscriber sees
/// the current list first, then each replacement.
pub struct StaticTaskRunner {
    id: String,
    name: String,
    tasks: watch::Sender<Vec<TaskMetadata>>,
}

impl StaticTaskRunner {
    pub fn new(id: &str, name: &str) -> Self {
        Self::with_tasks(id, name, Vec::new())
    }

    pub fn with_tasks(id: &str, name: &str, tasks: Vec<TaskMetadata>) -> Self {
        let (tasks, _) = watch::channel(tasks);
        Self {
            id: id.to_string(),
            name: name.to_string(),
            tasks,
        }
    }

    /// Shorthand for a runner publishing one task per type, labelled by type.
    pub fn with_task_types(id: &str, name: &str, task_types: &[&str]) -> Self {
        let tasks = task_types
            .iter()
            .map(|task_type| TaskMetadata::new(*task_type, *task_type))
            .collect();
        Self::with_tasks(id, name, tasks)
    }

    pub fn publish(&self, tasks: Vec<TaskMetadata>) {
        self.tasks.send_replace(tasks);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tasks.receiver_count()
    }
}

impl TaskRunner for StaticTaskRunner {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn observe_task_list(&self) -> BoxStream<'static, Vec<TaskMetadata>> {
        let rx = self.tasks.subscribe();
        stream::unfold((rx, true), |(mut rx, first)| async move {
            if !first {
                rx.changed().await.ok()?;
            }
            let tasks = rx.borrow_and_update().clone();
            Some((tasks, (rx, false)))
        })
        .boxed()
    }
}
