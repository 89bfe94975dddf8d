use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use futures::StreamExt;
use taskdeck_engine::{Epic, EpicContext, Latest};
use tracing::{debug, info};

use crate::action::Action;
use crate::state::AppState;

/// Follows each registered runner's task list.
///
/// One subscription per runner id. Registering an id again replaces its
/// subscription; unregistering ends it, and no list for that runner is
/// dispatched afterwards.
#[derive(Default)]
pub struct TaskRunnerEpic {
    subscriptions: Mutex<HashMap<String, Latest>>,
}

impl TaskRunnerEpic {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Epic<Action, AppState> for TaskRunnerEpic {
    fn name(&self) -> &'static str {
        "task_runner"
    }

    fn route(&self, action: &Action, ctx: &EpicContext<'_, Action, AppState>) -> Vec<Action> {
        let mut subscriptions = self
            .subscriptions
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        match action {
            Action::RegisterTaskRunner { task_runner } => {
                let latest = subscriptions.entry(task_runner.id.clone()).or_default();
                let ticket = latest.supersede();
                let mut task_lists = task_runner.runner.observe_task_list();
                let task_runner_id = task_runner.id.clone();
                info!(task_runner_id, name = %task_runner.name, "Task runner registered");

                ctx.spawn(latest, ticket, move |emitter| async move {
                    while let Some(task_list) = task_lists.next().await {
                        debug!(task_runner_id, tasks = task_list.len(), "Task list published");
                        let update = Action::TaskListUpdated {
                            task_runner_id: task_runner_id.clone(),
                            task_list,
                        };
                        if !emitter.emit([update]) {
                            return;
                        }
                    }
                });
            }
            Action::UnregisterTaskRunner { id } => {
                if let Some(latest) = subscriptions.remove(id) {
                    latest.supersede();
                    info!(task_runner_id = %id, "Task runner unregistered");
                }
            }
            _ => {}
        }

        Vec::new()
    }
}
