use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::error::ConfigError;
use crate::state::AppState;

pub const DEFAULT_MARKER_FILE: &str = ".buckconfig";
pub const DEFAULT_LOG_FILTER: &str = "taskdeck=info";

/// Panel configuration. Read from `TASKDECK_*` environment variables or
/// from a TOML file; anything missing falls back to the defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PanelConfig {
    /// File whose presence marks a directory as a build root.
    pub marker_file: String,
    pub initial_build_target: String,
    pub initial_visible: bool,
    /// Default `tracing` directive, applied on top of `RUST_LOG`.
    pub log_filter: String,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            marker_file: DEFAULT_MARKER_FILE.to_string(),
            initial_build_target: String::new(),
            initial_visible: false,
            log_filter: DEFAULT_LOG_FILTER.to_string(),
        }
    }
}

impl PanelConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let initial_visible = match lookup("TASKDECK_VISIBLE") {
            Some(value) => parse_bool("TASKDECK_VISIBLE", value)?,
            None => defaults.initial_visible,
        };

        Ok(Self {
            marker_file: lookup("TASKDECK_MARKER_FILE")
                .filter(|s| !s.is_empty())
                .unwrap_or(defaults.marker_file),
            initial_build_target: lookup("TASKDECK_BUILD_TARGET")
                .unwrap_or(defaults.initial_build_target),
            initial_visible,
            log_filter: lookup("TASKDECK_LOG")
                .filter(|s| !s.is_empty())
                .unwrap_or(defaults.log_filter),
        })
    }

    /// Fresh panel state carrying the configured initial values.
    pub fn initial_state(&self) -> AppState {
        AppState {
            build_target: self.initial_build_target.clone(),
            visible: self.initial_visible,
            ..AppState::default()
        }
    }

    pub fn log_summary(&self) {
        info!(
            marker_file = %self.marker_file,
            initial_build_target = %self.initial_build_target,
            initial_visible = self.initial_visible,
            log_filter = %self.log_filter,
            "Panel config loaded"
        );
    }
}

fn parse_bool(key: &'static str, value: String) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidVar { key, value }),
    }
}

/// Read a `PanelConfig` from a TOML file.
pub fn load_config(path: &Path) -> Result<PanelConfig, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let config = PanelConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, PanelConfig::default());
        assert_eq!(config.marker_file, ".buckconfig");
    }

    #[test]
    fn env_overrides_defaults() {
        let config = PanelConfig::from_lookup(lookup(&[
            ("TASKDECK_MARKER_FILE", ".root"),
            ("TASKDECK_BUILD_TARGET", "//app:main"),
            ("TASKDECK_VISIBLE", "Yes"),
        ]))
        .unwrap();

        assert_eq!(config.marker_file, ".root");
        assert_eq!(config.initial_build_target, "//app:main");
        assert!(config.initial_visible);
        assert_eq!(config.log_filter, DEFAULT_LOG_FILTER);
    }

    #[test]
    fn unparseable_visibility_is_an_error() {
        let err = PanelConfig::from_lookup(lookup(&[("TASKDECK_VISIBLE", "sometimes")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidVar { key: "TASKDECK_VISIBLE", .. }
        ));
    }

    #[test]
    fn initial_state_carries_target_and_visibility() {
        let config = PanelConfig {
            initial_build_target: "//app:main".into(),
            initial_visible: true,
            ..PanelConfig::default()
        };
        let state = config.initial_state();
        assert_eq!(state.build_target, "//app:main");
        assert!(state.visible);
        assert!(state.project_root.is_none());
    }

    #[test]
    fn toml_fills_missing_keys_with_defaults() {
        let config: PanelConfig = toml::from_str(r#"initial_build_target = "//a:b""#).unwrap();
        assert_eq!(config.initial_build_target, "//a:b");
        assert_eq!(config.marker_file, DEFAULT_MARKER_FILE);
    }

    #[test]
    fn toml_rejects_unknown_keys() {
        assert!(toml::from_str::<PanelConfig>("colour = \"blue\"").is_err());
    }
}
