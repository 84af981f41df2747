//! Project discovery and layout
//!
//! A project is any directory containing a `.pdt/` marker directory. Commands
//! search upward from the current directory to find it.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::identity::{EntityId, EntityPrefix};

/// Name of the project marker directory
pub const PROJECT_DIR: &str = ".pdt";

/// Default project configuration written by `pdt init`
const DEFAULT_CONFIG: &str = "\
# PDT project configuration
# author: Your Name
# editor: vim
";

#[derive(Debug, Error)]
pub enum ProjectError {
    #[error("Not inside a PDT project (no .pdt directory found). Run 'pdt init' first")]
    NotFound,

    #[error("A PDT project already exists at {0}")]
    AlreadyExists(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A discovered PDT project
#[derive(Debug, Clone)]
pub struct Project {
    root: PathBuf,
}

impl Project {
    /// Search upward from the current directory for a project
    pub fn discover() -> Result<Self, ProjectError> {
        let cwd = std::env::current_dir()?;
        Self::discover_from(&cwd)
    }

    /// Search upward from `start` for a project
    pub fn discover_from(start: &Path) -> Result<Self, ProjectError> {
        start
            .ancestors()
            .find(|dir| dir.join(PROJECT_DIR).is_dir())
            .map(|dir| Self {
                root: dir.to_path_buf(),
            })
            .ok_or(ProjectError::NotFound)
    }

    /// Create the project structure at `root`
    ///
    /// With `force`, an existing project is re-initialised (missing directories
    /// are created, existing files are left alone).
    pub fn init(root: &Path, force: bool) -> Result<Self, ProjectError> {
        let marker = root.join(PROJECT_DIR);
        if marker.exists() && !force {
            return Err(ProjectError::AlreadyExists(root.to_path_buf()));
        }

        fs::create_dir_all(&marker)?;
        let config_path = marker.join("config.yaml");
        if !config_path.exists() {
            fs::write(&config_path, DEFAULT_CONFIG)?;
        }

        for prefix in EntityPrefix::all() {
            fs::create_dir_all(root.join(prefix.dir()))?;
        }

        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the project config file
    pub fn config_path(&self) -> PathBuf {
        self.root.join(PROJECT_DIR).join("config.yaml")
    }

    /// Directory for an entity type
    pub fn entity_dir(&self, prefix: EntityPrefix) -> PathBuf {
        self.root.join(prefix.dir())
    }

    /// File path for an entity
    pub fn entity_path(&self, id: &EntityId) -> PathBuf {
        self.entity_dir(id.prefix()).join(format!("{}.pdt.yaml", id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init_creates_structure() {
        let tmp = TempDir::new().unwrap();
        let project = Project::init(tmp.path(), false).unwrap();

        assert!(project.config_path().exists());
        for prefix in EntityPrefix::all() {
            assert!(project.entity_dir(*prefix).is_dir());
        }
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
    fn test_discover_from_subdirectory() {
        let tmp = TempDir::new().unwrap();
        Project::init(tmp.path(), false).unwrap();
        let nested = tmp.path().join("drop-tests");

        let project = Project::discover_from(&nested).unwrap();
        assert_eq!(project.root(), tmp.path());
    }

    #[test]
    fn test_discover_outside_project_fails() {
        let tmp = TempDir::new().unwrap();
        assert!(matches!(
            Project::discover_from(tmp.path()),
            Err(ProjectError::NotFound)
        ));
    }

    #[test]
    fn test_entity_path_uses_prefix_dir() {
        let tmp = TempDir::new().unwrap();
        let project = Project::init(tmp.path(), false).unwrap();
        let id = EntityId::new(EntityPrefix::Drop);

        let path = project.entity_path(&id);
        assert!(path.starts_with(tmp.path().join("drop-tests")));
        assert!(path.to_string_lossy().ends_with(".pdt.yaml"));
    }
}
