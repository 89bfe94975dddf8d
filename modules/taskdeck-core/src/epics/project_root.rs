use std::path::PathBuf;
use std::sync::Arc;

use taskdeck_engine::{Epic, EpicContext, Latest};
use tracing::{debug, warn};

use crate::action::Action;
use crate::state::AppState;
use crate::traits::BuckRootResolver;

/// SET_PROJECT_ROOT → SET_BUCK_ROOT + SET_BUILD_TARGET.
///
/// Re-issuing the current build target once the root settles lets the
/// rule-type lookup run against the new root.
pub struct ProjectRootEpic {
    resolver: Arc<dyn BuckRootResolver>,
    latest: Latest,
}

impl ProjectRootEpic {
    pub fn new(resolver: Arc<dyn BuckRootResolver>) -> Self {
        Self {
            resolver,
            latest: Latest::new(),
        }
    }
}

fn settled(buck_root: Option<PathBuf>, state: &AppState) -> Vec<Action> {
    vec![
        Action::SetBuckRoot { buck_root },
        Action::SetBuildTarget {
            build_target: state.build_target.clone(),
        },
    ]
}

impl Epic<Action, AppState> for ProjectRootEpic {
    fn name(&self) -> &'static str {
        "project_root"
    }

    fn route(&self, action: &Action, ctx: &EpicContext<'_, Action, AppState>) -> Vec<Action> {
        let Action::SetProjectRoot { project_root } = action else {
            return Vec::new();
        };

        let ticket = self.latest.supersede();
        let Some(project_root) = project_root.clone() else {
            debug!("Project root cleared");
            return settled(None, ctx.state());
        };

        let resolver = Arc::clone(&self.resolver);
        ctx.spawn(&self.latest, ticket, move |emitter| async move {
            let buck_root = match resolver.resolve(&project_root).await {
                Ok(buck_root) => buck_root,
                Err(e) => {
                    warn!(
                        project_root = %project_root.display(),
                        error = %e,
                        "Build root resolution failed"
                    );
                    None
                }
            };
            debug!(
                project_root = %project_root.display(),
                buck_root = ?buck_root,
                "Build root resolved"
            );
            // Build target is read when the result lands, not when the
            // resolution started.
            emitter.emit_with(|state| settled(buck_root, state));
        });

        Vec::new()
    }
}
