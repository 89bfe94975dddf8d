use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use taskdeck_engine::{ActionLike, MemoryActionLog};
use tracing::info;
use tracing_subscriber::EnvFilter;

use taskdeck_core::{load_config, Action, FsBuckRootResolver, PanelConfig, PanelDeps};

#[derive(Parser)]
#[command(name = "taskdeck", about = "Inspect how the task panel resolves a project")]
struct Cli {
    /// TOML config file. Without it, TASKDECK_* environment variables are used.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a project root (and optionally a build target) through the panel
    /// pipeline and print the resulting state as JSON.
    Resolve {
        #[arg(long)]
        project_root: PathBuf,

        /// Build target label, e.g. //app:main
        #[arg(long)]
        target: Option<String>,

        /// Give up if the pipeline has not settled after this many seconds.
        #[arg(long, default_value_t = 10)]
        timeout_secs: u64,
    },
    /// Print the effective configuration.
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => PanelConfig::from_env()?,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(config.log_filter.parse()?))
        .with_writer(std::io::stderr)
        .init();

    config.log_summary();

    match cli.command {
        Command::Resolve {
            project_root,
            target,
            timeout_secs,
        } => resolve(&config, project_root, target, timeout_secs).await,
        Command::Config => {
            println!("marker_file = {:?}", config.marker_file);
            println!("initial_build_target = {:?}", config.initial_build_target);
            println!("initial_visible = {}", config.initial_visible);
            println!("log_filter = {:?}", config.log_filter);
            Ok(())
        }
    }
}

async fn resolve(
    config: &PanelConfig,
    project_root: PathBuf,
    target: Option<String>,
    timeout_secs: u64,
) -> Result<()> {
    let log = Arc::new(MemoryActionLog::<Action>::new());
    let deps = PanelDeps::builder()
        .root_resolver(Arc::new(FsBuckRootResolver::new(&config.marker_file)))
        .build();
    let store = deps
        .store_builder(config.initial_state())
        .tap(Arc::clone(&log))
        .build()?;

    if let Some(target) = target {
        store.dispatch(Action::set_build_target(target));
    }
    info!(project_root = %project_root.display(), "Resolving project");
    store.dispatch(Action::set_project_root(project_root));

    // Settled once platforms have been set downstream of the resolved root.
    tokio::time::timeout(
        Duration::from_secs(timeout_secs),
        log.wait_for(|actions| {
            actions
                .iter()
                .skip_while(|a| a.action_type() != "SET_BUCK_ROOT")
                .any(|a| a.action_type() == "SET_PLATFORMS")
        }),
    )
    .await
    .context("panel pipeline did not settle in time")?;

    let state = store.get_state();
    let summary = serde_json::json!({
        "project_root": state.project_root,
        "buck_root": state.buck_root,
        "build_target": state.build_target,
        "rule_type": state.rule_type,
        "platforms": state.platforms,
        "actions": log.action_types(),
    });
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
