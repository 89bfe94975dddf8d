use std::sync::Arc;

use taskdeck_engine::{Store, StoreBuilder, TracingTap};
use typed_builder::TypedBuilder;

use crate::action::Action;
use crate::epics::{BuildTargetEpic, ProjectRootEpic, RuleTypeEpic, TaskRunnerEpic};
use crate::reducer::AppReducer;
use crate::state::AppState;
use crate::traits::{
    BuckRootResolver, BuckServiceProvider, NoPlatforms, PlatformService, UnavailableBuckService,
};

pub type PanelStore = Store<Action, AppState>;

/// Collaborators the epics consult, chosen once at construction.
#[derive(Clone, TypedBuilder)]
pub struct PanelDeps {
    pub root_resolver: Arc<dyn BuckRootResolver>,
    #[builder(default = Arc::new(UnavailableBuckService) as Arc<dyn BuckServiceProvider>)]
    pub buck_services: Arc<dyn BuckServiceProvider>,
    #[builder(default = Arc::new(NoPlatforms) as Arc<dyn PlatformService>)]
    pub platform_service: Arc<dyn PlatformService>,
}

impl PanelDeps {
    /// Store builder wired with the panel reducer, all four epics and
    /// action logging. Add taps or a runtime, then `build()`.
    pub fn store_builder(&self, initial: AppState) -> StoreBuilder<Action, AppState> {
        Store::builder(AppReducer, initial)
            .epic(ProjectRootEpic::new(Arc::clone(&self.root_resolver)))
            .epic(BuildTargetEpic::new(Arc::clone(&self.buck_services)))
            .epic(RuleTypeEpic::new(Arc::clone(&self.platform_service)))
            .epic(TaskRunnerEpic::new())
            .tap(TracingTap)
    }
}
