//! Project discovery: a directory holding `.arex/config.yaml`

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the per-project settings directory
pub const PROJECT_DIR: &str = ".arex";

/// Represents a directory configured for arex
#[derive(Debug)]
pub struct Project {
    /// Root directory of the project (parent of .arex/)
    root: PathBuf,
}

impl Project {
    /// Find project root by walking up from the current directory
    pub fn discover() -> Result<Self, ProjectError> {
        let current = std::env::current_dir()
            .map_err(|e| ProjectError::IoError(e.to_string()))?;
        Self::discover_from(&current)
    }

    /// Find project root by walking up from the given directory
    pub fn discover_from(start: &Path) -> Result<Self, ProjectError> {
        let mut current = start
            .canonicalize()
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        loop {
            if current.join(PROJECT_DIR).is_dir() {
                return Ok(Self { root: current });
            }

            if !current.pop() {
                return Err(ProjectError::NotFound {
                    searched_from: start.to_path_buf(),
                });
            }
        }
    }

    /// Create `.arex/config.yaml` at the given path
    pub fn init(path: &Path, force: bool) -> Result<Self, ProjectError> {
        let root = path
            .canonicalize()
            .unwrap_or_else(|_| path.to_path_buf());

        let dir = root.join(PROJECT_DIR);
        if dir.exists() && !force {
            return Err(ProjectError::AlreadyExists(root.clone()));
        }

        std::fs::create_dir_all(&dir).map_err(|e| ProjectError::IoError(e.to_string()))?;
        std::fs::write(dir.join("config.yaml"), Self::default_config())
            .map_err(|e| ProjectError::IoError(e.to_string()))?;

        Ok(Self { root })
    }

    fn default_config() -> &'static str {
        r#"# arex project configuration

# ArangoDB endpoint and database
# endpoint: http://localhost:8529
# database: _system

# Credentials (password and token are better kept in AREX_PASSWORD / AREX_TOKEN)
# username: root

# Set to false when the server runs with authentication disabled
# authentication: true

# Where datasets are written: arango (live server) or sqlite (local file)
# store: arango
# store_path: .arex/data.db
"#
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn arex_dir(&self) -> PathBuf {
        self.root.join(PROJECT_DIR)
    }

    pub fn config_path(&self) -> PathBuf {
        self.arex_dir().join("config.yaml")
    }
}

/// Errors from project discovery and initialization
#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("no .arex directory found (searched upward from {searched_from})")]
    NotFound { searched_from: PathBuf },

    #[error("project already initialized at {0}")]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    IoError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_and_discover() {
        let tmp = TempDir::new().unwrap();
        let project = Project::init(tmp.path(), false).unwrap();
        assert!(project.config_path().exists());

        let nested = tmp.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        let found = Project::discover_from(&nested).unwrap();
        assert_eq!(found.root(), project.root());
    }

    #[test]
    fn test_init_twice_requires_force() {
        let tmp = TempDir::new().unwrap();
        Project::init(tmp.path(), false).unwrap();
        assert!(matches!(
            Project::init(tmp.path(), false),
            Err(ProjectError::AlreadyExists(_))
        ));
        assert!(Project::init(tmp.path(), true).is_ok());
    }

    #[test]
    fn test_discover_not_found() {
        let tmp = TempDir::new().unwrap();
        assert!(matches!(
            Project::discover_from(tmp.path()),
            Err(ProjectError::NotFound { .. })
        ));
    }
}
