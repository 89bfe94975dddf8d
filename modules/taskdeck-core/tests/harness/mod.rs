//! Shared fixtures: a fully wired panel store over mock collaborators.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use taskdeck_core::testing::{MockBuckService, MockPlatformService, MockRootResolver};
use taskdeck_core::{Action, AppState, PanelDeps, PanelStore};
use taskdeck_engine::{ActionLike, ActionTap, MemoryActionLog};

pub struct Panel {
    pub store: PanelStore,
    pub log: Arc<MemoryActionLog<Action>>,
    pub resolver: Arc<MockRootResolver>,
    pub buck: MockBuckService,
    pub platforms: Arc<MockPlatformService>,
}

impl Panel {
    pub fn new(resolver: MockRootResolver, buck: MockBuckService) -> Self {
        Self::with_state(resolver, buck, AppState::default())
    }

    pub fn with_state(resolver: MockRootResolver, buck: MockBuckService, initial: AppState) -> Self {
        Self::build(resolver, buck, initial, None)
    }

    /// Like [`Panel::new`], with `tap` recording after the action log.
    pub fn with_tap(
        resolver: MockRootResolver,
        buck: MockBuckService,
        tap: impl ActionTap<Action>,
    ) -> Self {
        let tap: Arc<dyn ActionTap<Action>> = Arc::new(tap);
        Self::build(resolver, buck, AppState::default(), Some(tap))
    }

    fn build(
        resolver: MockRootResolver,
        buck: MockBuckService,
        initial: AppState,
        extra_tap: Option<Arc<dyn ActionTap<Action>>>,
    ) -> Self {
        let resolver = Arc::new(resolver);
        let platforms = Arc::new(MockPlatformService::new());
        let log = Arc::new(MemoryActionLog::new());

        let deps = PanelDeps::builder()
            .root_resolver(resolver.clone())
            .buck_services(Arc::new(buck.clone()))
            .platform_service(platforms.clone())
            .build();
        let mut builder = deps.store_builder(initial).tap(Arc::clone(&log));
        if let Some(tap) = extra_tap {
            builder = builder.tap(tap);
        }
        let store = builder.build().expect("store builds inside a tokio runtime");

        Self {
            store,
            log,
            resolver,
            buck,
            platforms,
        }
    }

    pub fn state(&self) -> Arc<AppState> {
        self.store.get_state()
    }

    pub fn count(&self, action_type: &str) -> usize {
        self.log.count(action_type)
    }

    /// Wait until at least `n` actions of `action_type` have been applied.
    pub async fn wait_for_count(&self, action_type: &str, n: usize) {
        tokio::time::timeout(Duration::from_secs(5), self.log.wait_for_count(action_type, n))
            .await
            .unwrap_or_else(|_| {
                panic!(
                    "timed out waiting for {n}x {action_type}, saw {:?}",
                    self.log.action_types()
                )
            });
    }

    pub async fn wait_for(&self, what: &str, predicate: impl Fn(&[Action]) -> bool) {
        tokio::time::timeout(Duration::from_secs(5), self.log.wait_for(predicate))
            .await
            .unwrap_or_else(|_| panic!("timed out waiting for {what}"));
    }

    /// Kinds applied since the log was last cleared, in order.
    pub fn kinds(&self) -> Vec<&'static str> {
        self.log.actions().iter().map(ActionLike::action_type).collect()
    }
}

/// Poll `condition` until it holds, for state the action log cannot see.
pub async fn eventually(what: &str, condition: impl Fn() -> bool) {
    let poll = async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    };
    tokio::time::timeout(Duration::from_secs(5), poll)
        .await
        .unwrap_or_else(|_| panic!("timed out waiting for {what}"));
}
