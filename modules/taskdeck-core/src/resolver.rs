use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::trace;

use crate::config::DEFAULT_MARKER_FILE;
use crate::traits::BuckRootResolver;

/// Resolves a project path to the nearest ancestor (the path itself
/// included) that contains the marker file.
#[derive(Debug, Clone)]
pub struct FsBuckRootResolver {
    marker_file: String,
}

impl FsBuckRootResolver {
    pub fn new(marker_file: impl Into<String>) -> Self {
        Self {
            marker_file: marker_file.into(),
        }
    }
}

impl Default for FsBuckRootResolver {
    fn default() -> Self {
        Self::new(DEFAULT_MARKER_FILE)
    }
}

#[async_trait]
impl BuckRootResolver for FsBuckRootResolver {
    async fn resolve(&self, project_root: &Path) -> Result<Option<PathBuf>> {
        // A relative path would walk down to "" and report it as the root.
        let start = std::path::absolute(project_root)
            .with_context(|| format!("making {} absolute", project_root.display()))?;
        for dir in start.ancestors() {
            let marker = dir.join(&self.marker_file);
            let found = tokio::fs::try_exists(&marker)
                .await
                .with_context(|| format!("checking {}", marker.display()))?;
            trace!(dir = %dir.display(), found, "Probed for build root marker");
            if found {
                return Ok(Some(dir.to_path_buf()));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn finds_marker_in_ancestor() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join(".buckconfig"), "").unwrap();
        let project = root.path().join("apps/web");
        std::fs::create_dir_all(&project).unwrap();

        let resolved = FsBuckRootResolver::default().resolve(&project).await.unwrap();
        assert_eq!(resolved.as_deref(), Some(root.path()));
    }

    #[tokio::test]
    async fn project_root_itself_counts() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join(".root"), "").unwrap();

        let resolved = FsBuckRootResolver::new(".root")
            .resolve(root.path())
            .await
            .unwrap();
        assert_eq!(resolved.as_deref(), Some(root.path()));
    }

    #[tokio::test]
    async fn nearest_marker_wins() {
        let root = tempfile::tempdir().unwrap();
        let inner = root.path().join("third-party/lib");
        std::fs::create_dir_all(&inner).unwrap();
        std::fs::write(root.path().join(".buckconfig"), "").unwrap();
        std::fs::write(root.path().join("third-party/.buckconfig"), "").unwrap();

        let resolved = FsBuckRootResolver::default().resolve(&inner).await.unwrap();
        assert_eq!(resolved, Some(root.path().join("third-party")));
    }

    #[tokio::test]
    async fn relative_project_root_resolves_to_absolute_dir() {
        // Tests run from the package directory, which holds Cargo.toml.
        let cwd = std::env::current_dir().unwrap();

        let resolved = FsBuckRootResolver::new("Cargo.toml")
            .resolve(Path::new("src/epics"))
            .await
            .unwrap()
            .unwrap();
        assert!(resolved.is_absolute());
        assert_eq!(resolved, cwd);
    }

    #[tokio::test]
    async fn empty_project_root_is_an_error() {
        let result = FsBuckRootResolver::default().resolve(Path::new("")).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn no_marker_resolves_to_none() {
        let root = tempfile::tempdir().unwrap();
        let resolver = FsBuckRootResolver::new("taskdeck-test-marker-that-does-not-exist");

        assert_eq!(resolver.resolve(root.path()).await.unwrap(), None);
    }
}
