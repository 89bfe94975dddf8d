//! Async orchestration around the reducer.
//!
//! Each epic watches for one or two action kinds and answers with follow-up
//! actions, either immediately (short-circuits) or from a spawned task guarded
//! by a latest-wins ticket. Failures never escape an epic; they degrade to a
//! benign value and are logged.

mod build_target;
mod project_root;
mod rule_type;
mod task_runner;

pub use build_target::BuildTargetEpic;
pub use project_root::ProjectRootEpic;
pub use rule_type::RuleTypeEpic;
pub use task_runner::TaskRunnerEpic;
