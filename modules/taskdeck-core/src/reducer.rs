//! The panel reducer: the only code that produces new `AppState` values.

use std::sync::Arc;

use taskdeck_engine::Reducer;

use crate::action::Action;
use crate::state::{AnnotatedTaskMetadata, AppState, TaskStatus};

/// [`Reducer`] adapter around [`reduce`].
pub struct AppReducer;

impl Reducer<Action, AppState> for AppReducer {
    fn reduce(&self, state: &Arc<AppState>, action: &Action) -> Arc<AppState> {
        reduce(state, action)
    }
}

/// Pure and total. Returns the same `Arc` when `action` changes nothing.
pub fn reduce(state: &Arc<AppState>, action: &Action) -> Arc<AppState> {
    match next_state(state, action) {
        Some(next) => Arc::new(next),
        None => Arc::clone(state),
    }
}

fn next_state(state: &AppState, action: &Action) -> Option<AppState> {
    match action {
        Action::SetProjectRoot { project_root } => {
            (state.project_root != *project_root).then(|| AppState {
                project_root: project_root.clone(),
                ..state.clone()
            })
        }
        Action::SetBuckRoot { buck_root } => (state.buck_root != *buck_root).then(|| AppState {
            buck_root: buck_root.clone(),
            ..state.clone()
        }),
        Action::SetBuildTarget { build_target } => {
            (state.build_target != *build_target).then(|| AppState {
                build_target: build_target.clone(),
                ..state.clone()
            })
        }
        Action::SetRuleType { rule_type } => (state.rule_type != *rule_type).then(|| AppState {
            rule_type: rule_type.clone(),
            ..state.clone()
        }),
        Action::SetPlatforms { platforms } => (state.platforms != *platforms).then(|| AppState {
            platforms: platforms.clone(),
            ..state.clone()
        }),

        Action::RegisterTaskRunner { task_runner } => {
            // Re-sending the registration we already hold changes nothing.
            if let Some(existing) = state.task_runners.get(&task_runner.id) {
                if existing.name == task_runner.name
                    && Arc::ptr_eq(&existing.runner, &task_runner.runner)
                {
                    return None;
                }
            }
            let mut next = state.clone();
            next.task_runners.insert(task_runner.id.clone(), task_runner.clone());
            Some(validate_active_task(next))
        }
        Action::UnregisterTaskRunner { id } => {
            if !state.task_runners.contains_key(id) && !state.task_lists.contains_key(id) {
                return None;
            }
            let mut next = state.clone();
            next.task_runners.remove(id);
            next.task_lists.remove(id);
            Some(validate_active_task(next))
        }
        Action::TaskListUpdated {
            task_runner_id,
            task_list,
        } => {
            let task_runner_name = state
                .task_runners
                .get(task_runner_id)
                .map(|runner| runner.name.clone());
            let annotated: Vec<AnnotatedTaskMetadata> = task_list
                .iter()
                .map(|metadata| AnnotatedTaskMetadata {
                    metadata: metadata.clone(),
                    task_runner_id: task_runner_id.clone(),
                    task_runner_name: task_runner_name.clone(),
                })
                .collect();

            let mut next = state.clone();

            // Restore the task the previous session had selected once its
            // runner publishes it again.
            let restores = next
                .previous_session_active_task_id
                .as_ref()
                .is_some_and(|pending| {
                    pending.task_runner_id == *task_runner_id
                        && annotated
                            .iter()
                            .any(|task| task.task_type() == pending.task_type)
                });

            next.task_lists.insert(task_runner_id.clone(), annotated);

            if restores {
                next.active_task_id = next.previous_session_active_task_id.take();
                return Some(next);
            }
            Some(validate_active_task(next))
        }
        Action::SelectTask { task_id } => {
            state.resolve_task(task_id)?;
            Some(AppState {
                active_task_id: Some(task_id.clone()),
                previous_session_active_task_id: None,
                ..state.clone()
            })
        }

        Action::TaskStarted { task_info } => Some(AppState {
            task_status: Some(TaskStatus {
                info: task_info.clone(),
                progress: None,
            }),
            ..state.clone()
        }),
        Action::TaskProgress { progress } => {
            let status = state.task_status.as_ref()?;
            let progress = progress.filter(|p| !p.is_nan()).map(|p| p.clamp(0.0, 1.0));
            if status.progress == progress {
                return None;
            }
            Some(AppState {
                task_status: Some(TaskStatus {
                    info: status.info.clone(),
                    progress,
                }),
                ..state.clone()
            })
        }
        Action::TaskCompleted | Action::TaskErrored | Action::TaskStopped => {
            state.task_status.as_ref()?;
            Some(AppState {
                task_status: None,
                ..state.clone()
            })
        }

        Action::PanelCreated { panel } => {
            if state.panel.as_ref().is_some_and(|current| current.same_panel(panel)) {
                return None;
            }
            Some(AppState {
                panel: Some(panel.clone()),
                ..state.clone()
            })
        }
        Action::PanelDestroyed { panel } => {
            let current = state.panel.as_ref()?;
            if !current.same_panel(panel) {
                return None;
            }
            Some(AppState {
                panel: None,
                ..state.clone()
            })
        }
        Action::ToolbarVisibilityUpdated { visible } => {
            (state.visible != *visible).then(|| AppState {
                visible: *visible,
                ..state.clone()
            })
        }
    }
}

/// Make sure the active task is one we actually have. If not, fall back to
/// the first available task and remember what was really wanted.
fn validate_active_task(mut state: AppState) -> AppState {
    if state.active_task().is_some() {
        return state;
    }

    let fallback = state.first_task().map(AnnotatedTaskMetadata::task_id);
    let wanted = state.active_task_id.take();
    if state.previous_session_active_task_id.is_none() {
        state.previous_session_active_task_id = wanted;
    }
    state.active_task_id = fallback;
    state
}
