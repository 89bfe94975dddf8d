//! Intents and events dispatched to the panel store.

use std::path::PathBuf;
use std::sync::Arc;

use taskdeck_engine::ActionLike;

use crate::state::{PanelHandle, Platform, TaskId, TaskInfo, TaskMetadata, TaskRunnerDescriptor};
use crate::traits::TaskRunner;

#[derive(Debug, Clone)]
pub enum Action {
    // Build pipeline
    SetProjectRoot { project_root: Option<PathBuf> },
    SetBuckRoot { buck_root: Option<PathBuf> },
    SetBuildTarget { build_target: String },
    SetRuleType { rule_type: Option<String> },
    SetPlatforms { platforms: Vec<Platform> },

    // Task runner registry
    RegisterTaskRunner { task_runner: TaskRunnerDescriptor },
    UnregisterTaskRunner { id: String },
    TaskListUpdated {
        task_runner_id: String,
        task_list: Vec<TaskMetadata>,
    },
    SelectTask { task_id: TaskId },

    // Execution status
    TaskStarted { task_info: TaskInfo },
    TaskProgress { progress: Option<f64> },
    TaskCompleted,
    TaskErrored,
    TaskStopped,

    // Panel
    PanelCreated { panel: PanelHandle },
    PanelDestroyed { panel: PanelHandle },
    ToolbarVisibilityUpdated { visible: bool },
}

impl ActionLike for Action {
    fn action_type(&self) -> &'static str {
        match self {
            Action::SetProjectRoot { .. } => "SET_PROJECT_ROOT",
            Action::SetBuckRoot { .. } => "SET_BUCK_ROOT",
            Action::SetBuildTarget { .. } => "SET_BUILD_TARGET",
            Action::SetRuleType { .. } => "SET_RULE_TYPE",
            Action::SetPlatforms { .. } => "SET_PLATFORMS",
            Action::RegisterTaskRunner { .. } => "REGISTER_TASK_RUNNER",
            Action::UnregisterTaskRunner { .. } => "UNREGISTER_TASK_RUNNER",
            Action::TaskListUpdated { .. } => "TASK_LIST_UPDATED",
            Action::SelectTask { .. } => "SELECT_TASK",
            Action::TaskStarted { .. } => "TASK_STARTED",
            Action::TaskProgress { .. } => "TASK_PROGRESS",
            Action::TaskCompleted => "TASK_COMPLETED",
            Action::TaskErrored => "TASK_ERRORED",
            Action::TaskStopped => "TASK_STOPPED",
            Action::PanelCreated { .. } => "PANEL_CREATED",
            Action::PanelDestroyed { .. } => "PANEL_DESTROYED",
            Action::ToolbarVisibilityUpdated { .. } => "TOOLBAR_VISIBILITY_UPDATED",
        }
    }
}

impl Action {
    pub fn set_project_root(project_root: impl Into<PathBuf>) -> Self {
        Action::SetProjectRoot {
            project_root: Some(project_root.into()),
        }
    }

    pub fn clear_project_root() -> Self {
        Action::SetProjectRoot { project_root: None }
    }

    pub fn set_build_target(build_target: impl Into<String>) -> Self {
        Action::SetBuildTarget {
            build_target: build_target.into(),
        }
    }

    pub fn register_task_runner(runner: Arc<dyn TaskRunner>) -> Self {
        Action::RegisterTaskRunner {
            task_runner: TaskRunnerDescriptor::from_runner(runner),
        }
    }

    pub fn unregister_task_runner(id: impl Into<String>) -> Self {
        Action::UnregisterTaskRunner { id: id.into() }
    }

    pub fn task_list_updated(task_runner_id: impl Into<String>, task_list: Vec<TaskMetadata>) -> Self {
        Action::TaskListUpdated {
            task_runner_id: task_runner_id.into(),
            task_list,
        }
    }

    pub fn select_task(task_runner_id: impl Into<String>, task_type: impl Into<String>) -> Self {
        Action::SelectTask {
            task_id: TaskId::new(task_runner_id, task_type),
        }
    }
}
