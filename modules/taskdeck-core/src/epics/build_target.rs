use std::sync::Arc;

use taskdeck_engine::{Epic, EpicContext, Latest};
use tracing::debug;

use crate::action::Action;
use crate::state::AppState;
use crate::traits::BuckServiceProvider;

/// SET_BUILD_TARGET → SET_RULE_TYPE.
pub struct BuildTargetEpic {
    services: Arc<dyn BuckServiceProvider>,
    latest: Latest,
}

impl BuildTargetEpic {
    pub fn new(services: Arc<dyn BuckServiceProvider>) -> Self {
        Self {
            services,
            latest: Latest::new(),
        }
    }
}

fn unknown_rule_type() -> Vec<Action> {
    vec![Action::SetRuleType { rule_type: None }]
}

impl Epic<Action, AppState> for BuildTargetEpic {
    fn name(&self) -> &'static str {
        "build_target"
    }

    fn route(&self, action: &Action, ctx: &EpicContext<'_, Action, AppState>) -> Vec<Action> {
        let Action::SetBuildTarget { build_target } = action else {
            return Vec::new();
        };

        let ticket = self.latest.supersede();
        let Some(buck_root) = ctx.state().buck_root.clone() else {
            return unknown_rule_type();
        };
        if build_target.is_empty() {
            return unknown_rule_type();
        }
        let Some(service) = self.services.service_for(&buck_root) else {
            debug!(buck_root = %buck_root.display(), "No build service for root");
            return unknown_rule_type();
        };

        let build_target = build_target.clone();
        ctx.spawn(&self.latest, ticket, move |emitter| async move {
            let rule_type = match service.build_rule_type_for(&buck_root, &build_target).await {
                Ok(rule_type) => Some(rule_type),
                Err(e) => {
                    debug!(build_target, error = %e, "Rule type lookup failed");
                    None
                }
            };
            emitter.emit([Action::SetRuleType { rule_type }]);
        });

        Vec::new()
    }
}
