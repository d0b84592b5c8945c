//! Project management
//!
//! Handles project initialization and provides access to stores.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;
use tracing::{debug, info};

use super::{Cache, Config, NetworkStore};

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Not in a subway project. Run 'subway init' first.")]
    NotInProject,
}

/// A subway project
pub struct Project {
    root: PathBuf,
    config: Config,
}

impl Project {
    /// Opens an existing project at the given path
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();

        if !root.join(".subway").is_dir() {
            return Err(ProjectError::NotInProject.into());
        }

        let config = Config::for_project(&root)?;

        Ok(Self { root, config })
    }

    /// Opens the project at the current directory or a parent
    pub fn open_current() -> Result<Self> {
        let root = Config::find_project_root().ok_or(ProjectError::NotInProject)?;

        Self::open(root)
    }

    /// Initializes a new project at the given path
    pub fn init(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let subway_dir = root.join(".subway");

        fs::create_dir_all(&subway_dir).with_context(|| {
            format!(
                "Failed to create .subway directory: {}",
                subway_dir.display()
            )
        })?;

        let config_path = subway_dir.join("config.toml");
        if !config_path.exists() {
            let default_config = r#"# subway configuration

# Unit shown next to section distances
distance_unit = "km"

# Log filter when RUST_LOG is unset (error, warn, info, debug, trace)
log_level = "warn"
"#;
            fs::write(&config_path, default_config)
                .with_context(|| format!("Failed to write config: {}", config_path.display()))?;
        }

        let gitignore_path = subway_dir.join(".gitignore");
        if !gitignore_path.exists() {
            let gitignore = r#"# Ignore SQLite cache (regenerated from network.jsonl)
.cache/

# Ignore writer lock
network.lock
"#;
            fs::write(&gitignore_path, gitignore).with_context(|| {
                format!("Failed to write .gitignore: {}", gitignore_path.display())
            })?;
        }

        info!(root = %root.display(), "Project initialized");
        Self::open(root)
    }

    /// Returns the project root path
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the .subway directory path
    pub fn subway_dir(&self) -> PathBuf {
        self.root.join(".subway")
    }

    /// Returns the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the network store
    pub fn store(&self) -> NetworkStore {
        NetworkStore::for_project(&self.root)
    }

    /// Opens the SQLite cache for this project
    pub fn cache(&self) -> Result<Cache> {
        Cache::open(&self.root)
    }

    /// Rebuilds the cache from the network store
    pub fn rebuild_cache(&self) -> Result<Cache> {
        let mut cache = self.cache()?;
        let network = self.store().load()?;
        cache.rebuild(&network)?;
        Ok(cache)
    }

    /// Gets the cache if it's fresh, or rebuilds it if stale
    pub fn get_or_rebuild_cache(&self) -> Result<Cache> {
        let mut cache = self.cache()?;

        if cache.is_stale()? {
            debug!("Cache is stale, rebuilding");
            let network = self.store().load()?;
            cache.rebuild(&network)?;
        }

        Ok(cache)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::NetworkRepository;
    use tempfile::TempDir;

    #[test]
    fn init_creates_structure() {
        let dir = TempDir::new().unwrap();
        let project = Project::init(dir.path()).unwrap();

        assert!(project.subway_dir().is_dir());
        assert!(project.subway_dir().join("config.toml").is_file());
        assert!(project.subway_dir().join(".gitignore").is_file());
        assert_eq!(project.config().project.distance_unit, "km");
    }

    #[test]
    fn init_is_idempotent() {
        let dir = TempDir::new().unwrap();

        Project::init(dir.path()).unwrap();
        Project::init(dir.path()).unwrap();

        assert!(dir.path().join(".subway").is_dir());
    }

    #[test]
    fn init_keeps_existing_config() {
        let dir = TempDir::new().unwrap();
        Project::init(dir.path()).unwrap();
        fs::write(
            dir.path().join(".subway").join("config.toml"),
            "distance_unit = \"mi\"\n",
        )
        .unwrap();

        let project = Project::init(dir.path()).unwrap();
        assert_eq!(project.config().project.distance_unit, "mi");
    }

    #[test]
    fn open_existing_project() {
        let dir = TempDir::new().unwrap();
        Project::init(dir.path()).unwrap();

        let project = Project::open(dir.path()).unwrap();
        assert_eq!(project.root(), dir.path());
    }

    #[test]
    fn open_non_project_fails() {
        let dir = TempDir::new().unwrap();
        let result = Project::open(dir.path());

        assert!(result.is_err());
    }

    #[test]
    fn store_lives_in_subway_dir() {
        let dir = TempDir::new().unwrap();
        let project = Project::init(dir.path()).unwrap();

        assert!(project.store().path().ends_with(".subway/network.jsonl"));
    }

    #[test]
    fn cache_follows_store() {
        let dir = TempDir::new().unwrap();
        let project = Project::init(dir.path()).unwrap();

        project
            .store()
            .transaction(|network| Ok(network.create_station("Hongik Univ.")?))
            .unwrap();

        let cache = project.get_or_rebuild_cache().unwrap();
        assert!(!cache.is_stale().unwrap());
        assert_eq!(cache.counts().unwrap(), (1, 0, 0));
    }
}
