//! Panel state and the records it is built from.

use std::any::Any;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::registry::RunnerMap;
use crate::traits::TaskRunner;

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

/// A `(runner, task type)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId {
    pub task_runner_id: String,
    pub task_type: String,
}

impl TaskId {
    pub fn new(task_runner_id: impl Into<String>, task_type: impl Into<String>) -> Self {
        Self {
            task_runner_id: task_runner_id.into(),
            task_type: task_type.into(),
        }
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.task_runner_id, self.task_type)
    }
}

/// A task as published by its runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskMetadata {
    #[serde(rename = "type")]
    pub task_type: String,
    pub label: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default = "default_true")]
    pub runnable: bool,
    #[serde(default)]
    pub cancelable: bool,
}

fn default_true() -> bool {
    true
}

impl TaskMetadata {
    pub fn new(task_type: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            task_type: task_type.into(),
            label: label.into(),
            description: String::new(),
            icon: String::new(),
            runnable: true,
            cancelable: false,
        }
    }
}

/// Task metadata stamped with its runner when the list was published.
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedTaskMetadata {
    pub metadata: TaskMetadata,
    pub task_runner_id: String,
    /// `None` when the list arrived for a runner that is not registered.
    pub task_runner_name: Option<String>,
}

impl AnnotatedTaskMetadata {
    pub fn task_type(&self) -> &str {
        &self.metadata.task_type
    }

    pub fn task_id(&self) -> TaskId {
        TaskId::new(&self.task_runner_id, &self.metadata.task_type)
    }

    pub fn matches(&self, id: &TaskId) -> bool {
        self.task_runner_id == id.task_runner_id && self.metadata.task_type == id.task_type
    }
}

/// Registry entry for a task runner.
#[derive(Clone)]
pub struct TaskRunnerDescriptor {
    pub id: String,
    pub name: String,
    pub runner: Arc<dyn TaskRunner>,
}

impl TaskRunnerDescriptor {
    pub fn from_runner(runner: Arc<dyn TaskRunner>) -> Self {
        Self {
            id: runner.id().to_string(),
            name: runner.name().to_string(),
            runner,
        }
    }
}

impl fmt::Debug for TaskRunnerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskRunnerDescriptor")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Build pipeline
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Platform {
    pub name: String,
    pub flavor: String,
}

impl Platform {
    pub fn new(name: impl Into<String>, flavor: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            flavor: flavor.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Execution status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskInfo {
    pub id: Uuid,
    pub task_id: TaskId,
    pub started_at: DateTime<Utc>,
}

impl TaskInfo {
    pub fn new(task_id: TaskId) -> Self {
        Self {
            id: Uuid::new_v4(),
            task_id,
            started_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaskStatus {
    pub info: TaskInfo,
    /// Fraction complete in `[0, 1]`, when the runner reports one.
    pub progress: Option<f64>,
}

// ---------------------------------------------------------------------------
// Panel
// ---------------------------------------------------------------------------

/// Opaque handle to whatever the host uses as its panel.
#[derive(Clone)]
pub struct PanelHandle(Arc<dyn Any + Send + Sync>);

impl PanelHandle {
    pub fn new<T: Any + Send + Sync>(panel: T) -> Self {
        Self(Arc::new(panel))
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.downcast_ref::<T>()
    }

    /// Identity comparison; two handles are the same panel only if they
    /// share one allocation.
    pub fn same_panel(&self, other: &PanelHandle) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for PanelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("PanelHandle")
            .field(&Arc::as_ptr(&self.0))
            .finish()
    }
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

/// Everything the panel knows. Only the reducer produces new values.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub project_root: Option<PathBuf>,
    pub buck_root: Option<PathBuf>,
    pub build_target: String,
    pub rule_type: Option<String>,
    pub platforms: Vec<Platform>,
    pub task_runners: RunnerMap<TaskRunnerDescriptor>,
    pub task_lists: RunnerMap<Vec<AnnotatedTaskMetadata>>,
    pub active_task_id: Option<TaskId>,
    pub previous_session_active_task_id: Option<TaskId>,
    pub task_status: Option<TaskStatus>,
    pub panel: Option<PanelHandle>,
    pub visible: bool,
}

impl AppState {
    /// Fresh state seeded from a previous session. The old active task
    /// becomes a pending restoration target.
    pub fn from_session(snapshot: SessionSnapshot) -> Self {
        Self {
            build_target: snapshot.build_target,
            visible: snapshot.visible,
            previous_session_active_task_id: snapshot.active_task_id,
            ..Self::default()
        }
    }

    /// What to hand to the next session. A pending restoration target wins
    /// over a fallback that is merely active in its place.
    pub fn session_snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            active_task_id: self
                .previous_session_active_task_id
                .clone()
                .or_else(|| self.active_task_id.clone()),
            visible: self.visible,
            build_target: self.build_target.clone(),
        }
    }

    /// The published task `id` points at, if it exists.
    pub fn resolve_task(&self, id: &TaskId) -> Option<&AnnotatedTaskMetadata> {
        self.task_lists
            .get(&id.task_runner_id)?
            .iter()
            .find(|task| task.matches(id))
    }

    pub fn active_task(&self) -> Option<&AnnotatedTaskMetadata> {
        self.active_task_id
            .as_ref()
            .and_then(|id| self.resolve_task(id))
    }

    /// First task across all runners, runners and tasks in insertion order.
    pub fn first_task(&self) -> Option<&AnnotatedTaskMetadata> {
        self.task_lists.values().flat_map(|list| list.iter()).next()
    }
}

/// In-memory carry-over between panel sessions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSnapshot {
    pub active_task_id: Option<TaskId>,
    pub visible: bool,
    pub build_target: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn annotated(runner: &str, task_type: &str) -> AnnotatedTaskMetadata {
        AnnotatedTaskMetadata {
            metadata: TaskMetadata::new(task_type, task_type),
            task_runner_id: runner.to_string(),
            task_runner_name: Some(runner.to_uppercase()),
        }
    }

    #[test]
    fn first_task_follows_runner_then_task_order() {
        let mut state = AppState::default();
        state.task_lists.insert("b", vec![]);
        state
            .task_lists
            .insert("a", vec![annotated("a", "build"), annotated("a", "test")]);

        assert_eq!(state.first_task().unwrap().task_id(), TaskId::new("a", "build"));
    }

    #[test]
    fn resolve_task_requires_matching_runner_list() {
        let mut state = AppState::default();
        state.task_lists.insert("a", vec![annotated("a", "build")]);

        assert!(state.resolve_task(&TaskId::new("a", "build")).is_some());
        assert!(state.resolve_task(&TaskId::new("a", "test")).is_none());
        assert!(state.resolve_task(&TaskId::new("b", "build")).is_none());
    }

    #[test]
    fn session_snapshot_prefers_pending_restoration() {
        let state = AppState {
            active_task_id: Some(TaskId::new("b", "lint")),
            previous_session_active_task_id: Some(TaskId::new("a", "test")),
            visible: true,
            ..AppState::default()
        };

        let snapshot = state.session_snapshot();
        assert_eq!(snapshot.active_task_id, Some(TaskId::new("a", "test")));
        assert!(snapshot.visible);
    }

    #[test]
    fn from_session_seeds_pending_slot() {
        let snapshot: SessionSnapshot = serde_json::from_value(serde_json::json!({
            "active_task_id": { "task_runner_id": "a", "task_type": "test" },
            "visible": true
        }))
        .unwrap();

        let state = AppState::from_session(snapshot);
        assert_eq!(state.active_task_id, None);
        assert_eq!(
            state.previous_session_active_task_id,
            Some(TaskId::new("a", "test"))
        );
        assert!(state.visible);
        assert_eq!(state.build_target, "");
    }

    #[test]
    fn task_metadata_defaults_when_fields_missing() {
        let meta: TaskMetadata =
            serde_json::from_value(serde_json::json!({ "type": "build", "label": "Build" }))
                .unwrap();
        assert!(meta.runnable);
        assert!(!meta.cancelable);
        assert_eq!(meta.description, "");
    }

    #[test]
    fn panel_identity_is_by_allocation() {
        let a = PanelHandle::new("panel");
        let b = PanelHandle::new("panel");
        assert!(a.same_panel(&a.clone()));
        assert!(!a.same_panel(&b));
        assert_eq!(a.downcast_ref::<&str>(), Some(&"panel"));
    }
}
