use std::sync::Arc;

use futures::StreamExt;
use taskdeck_engine::{Epic, EpicContext, Latest};
use tracing::{debug, trace};

use crate::action::Action;
use crate::state::AppState;
use crate::traits::PlatformService;

/// SET_RULE_TYPE → SET_PLATFORMS, once per platform stream emission until
/// the next rule type arrives.
pub struct RuleTypeEpic {
    platforms: Arc<dyn PlatformService>,
    latest: Latest,
}

impl RuleTypeEpic {
    pub fn new(platforms: Arc<dyn PlatformService>) -> Self {
        Self {
            platforms,
            latest: Latest::new(),
        }
    }
}

impl Epic<Action, AppState> for RuleTypeEpic {
    fn name(&self) -> &'static str {
        "rule_type"
    }

    fn route(&self, action: &Action, ctx: &EpicContext<'_, Action, AppState>) -> Vec<Action> {
        let Action::SetRuleType { rule_type } = action else {
            return Vec::new();
        };

        let ticket = self.latest.supersede();
        let Some(rule_type) = rule_type.as_deref().filter(|rule_type| !rule_type.is_empty()) else {
            return vec![Action::SetPlatforms {
                platforms: Vec::new(),
            }];
        };

        let mut updates = self.platforms.get_platforms(rule_type);
        let rule_type = rule_type.to_string();
        ctx.spawn(&self.latest, ticket, move |emitter| async move {
            while let Some(update) = updates.next().await {
                let platforms = match update {
                    Ok(platforms) => platforms,
                    Err(e) => {
                        debug!(rule_type, error = %e, "Platform enumeration failed");
                        emitter.emit([Action::SetPlatforms {
                            platforms: Vec::new(),
                        }]);
                        return;
                    }
                };
                if !emitter.emit([Action::SetPlatforms { platforms }]) {
                    return;
                }
            }
            trace!(rule_type, "Platform stream ended");
        });

        Vec::new()
    }
}
