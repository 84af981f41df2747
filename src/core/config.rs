//! Layered configuration
//!
//! Values are merged in order, later layers winning:
//! 1. User config (`<config dir>/pdt/config.yaml`)
//! 2. Project config (`.pdt/config.yaml`)
//! 3. Environment (`PDT_AUTHOR`, `PDT_EDITOR`)

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::core::project::Project;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Author recorded on new entities
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    /// Editor command for `edit` subcommands
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor: Option<String>,
}

impl Config {
    /// Load the merged configuration for the current directory
    pub fn load() -> Self {
        let mut config = Self::user_config_path()
            .and_then(|p| Self::load_file(&p))
            .unwrap_or_default();

        if let Ok(project) = Project::discover() {
            if let Some(project_config) = Self::load_file(&project.config_path()) {
                config.merge(project_config);
            }
        }

        config.merge(Self::from_env());
        config
    }

    /// Location of the user-level config file
    pub fn user_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "pdt").map(|d| d.config_dir().join("config.yaml"))
    }

    fn load_file(path: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        if !has_yaml_content(&content) {
            return Some(Self::default());
        }
        match serde_yml::from_str::<Config>(&content) {
            Ok(config) => Some(config),
            Err(e) => {
                log::warn!("ignoring unreadable config {}: {}", path.display(), e);
                None
            }
        }
    }

    fn from_env() -> Self {
        Self {
            author: std::env::var("PDT_AUTHOR").ok().filter(|s| !s.is_empty()),
            editor: std::env::var("PDT_EDITOR").ok().filter(|s| !s.is_empty()),
        }
    }

    /// Overlay values set in `other`
    pub fn merge(&mut self, other: Config) {
        if other.author.is_some() {
            self.author = other.author;
        }
        if other.editor.is_some() {
            self.editor = other.editor;
        }
    }

    /// Author name, falling back to the login name
    pub fn author(&self) -> String {
        self.author
            .clone()
            .or_else(|| std::env::var("USER").ok())
            .or_else(|| std::env::var("USERNAME").ok())
            .unwrap_or_else(|| "unknown".to_string())
    }

    /// Editor command, falling back to $EDITOR then vi
    pub fn editor(&self) -> String {
        self.editor
            .clone()
            .or_else(|| std::env::var("EDITOR").ok())
            .unwrap_or_else(|| "vi".to_string())
    }

    /// Open a file in the configured editor and wait for it to exit
    pub fn run_editor(&self, path: &Path) -> std::io::Result<()> {
        let editor = self.editor();
        let mut parts = editor.split_whitespace();
        let program = parts.next().unwrap_or("vi");

        let status = Command::new(program).args(parts).arg(path).status()?;
        if status.success() {
            Ok(())
        } else {
            Err(std::io::Error::other(format!(
                "editor '{}' exited with {}",
                editor, status
            )))
        }
    }
}

/// True when the text has anything besides blank lines and comments
fn has_yaml_content(content: &str) -> bool {
    content
        .lines()
        .map(str::trim)
        .any(|l| !l.is_empty() && !l.starts_with('#'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_prefers_later_layer() {
        let mut base = Config {
            author: Some("base".to_string()),
            editor: Some("nano".to_string()),
        };
        base.merge(Config {
            author: Some("project".to_string()),
            editor: None,
        });

        assert_eq!(base.author.as_deref(), Some("project"));
        assert_eq!(base.editor.as_deref(), Some("nano"));
    }

    #[test]
    fn test_explicit_author_wins() {
        let config = Config {
            author: Some("inspector".to_string()),
            editor: None,
        };
        assert_eq!(config.author(), "inspector");
    }

    #[test]
    fn test_parse_commented_config() {
        assert!(!has_yaml_content("# only comments\n\n"));
        assert!(has_yaml_content("# header\nauthor: Jane\n"));

        let config: Config = serde_yml::from_str("author: Jane\n").unwrap();
        assert_eq!(config.author.as_deref(), Some("Jane"));
    }
}
