//! Short ID aliases for easier entity selection
//!
//! Every entity gets a persistent alias `PREFIX@N` (e.g. `PRMR@2`, `DROP@14`)
//! the first time it is listed or created. Aliases are stored in
//! `.pdt/shortids.json` and never reused within a project.

use std::collections::HashMap;
use std::fs;

use crate::core::project::{Project, PROJECT_DIR};

/// Index file name within the project marker directory
const INDEX_FILE: &str = "shortids.json";

/// Mapping of `PREFIX@N` aliases to full entity IDs
#[derive(Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct ShortIdIndex {
    /// "PREFIX@N" -> full entity ID
    entries: HashMap<String, String>,
    /// Full entity ID -> "PREFIX@N"
    #[serde(skip)]
    reverse: HashMap<String, String>,
    /// Next alias number per prefix
    next_ids: HashMap<String, u32>,
}

impl ShortIdIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the index from a project, or start empty if missing or unreadable
    pub fn load(project: &Project) -> Self {
        let path = project.root().join(PROJECT_DIR).join(INDEX_FILE);
        let Ok(content) = fs::read_to_string(&path) else {
            return Self::new();
        };

        match serde_json::from_str::<ShortIdIndex>(&content) {
            Ok(mut index) => {
                index.reverse = index
                    .entries
                    .iter()
                    .map(|(k, v)| (v.clone(), k.clone()))
                    .collect();
                index
            }
            Err(e) => {
                log::warn!("short ID index unreadable, starting fresh: {}", e);
                Self::new()
            }
        }
    }

    /// Save the index to a project
    pub fn save(&self, project: &Project) -> std::io::Result<()> {
        let path = project.root().join(PROJECT_DIR).join(INDEX_FILE);
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)
    }

    /// Prefix part of an entity ID ("DROP" from "DROP-01ABC...")
    fn extract_prefix(entity_id: &str) -> Option<&str> {
        entity_id.split_once('-').map(|(prefix, _)| prefix)
    }

    /// Register an entity ID, returning its alias
    pub fn add(&mut self, entity_id: &str) -> Option<String> {
        if let Some(existing) = self.reverse.get(entity_id) {
            return Some(existing.clone());
        }

        let prefix = Self::extract_prefix(entity_id)?;
        let next = self.next_ids.entry(prefix.to_string()).or_insert(1);
        let alias = format!("{}@{}", prefix, next);
        *next += 1;

        self.entries.insert(alias.clone(), entity_id.to_string());
        self.reverse.insert(entity_id.to_string(), alias.clone());
        Some(alias)
    }

    /// Register many IDs at once
    pub fn ensure_all<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for id in ids {
            self.add(id.as_ref());
        }
    }

    /// Forget an entity (its alias number is not reused)
    pub fn remove(&mut self, entity_id: &str) {
        if let Some(alias) = self.reverse.remove(entity_id) {
            self.entries.remove(&alias);
        }
    }

    /// Resolve an alias to a full entity ID
    ///
    /// `PREFIX@N` is looked up (prefix is case-insensitive). Anything else is
    /// passed through unchanged for full or partial ID matching.
    pub fn resolve(&self, reference: &str) -> Option<String> {
        match reference.split_once('@') {
            Some((prefix, num)) if !prefix.is_empty() => {
                let key = format!("{}@{}", prefix.to_ascii_uppercase(), num);
                self.entries.get(&key).cloned()
            }
            _ => Some(reference.to_string()),
        }
    }

    /// Alias for a full entity ID
    pub fn get_short_id(&self, entity_id: &str) -> Option<String> {
        self.reverse.get(entity_id).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_resolve() {
        let mut index = ShortIdIndex::new();

        assert_eq!(index.add("DROP-01ABC").as_deref(), Some("DROP@1"));
        assert_eq!(index.add("DROP-02DEF").as_deref(), Some("DROP@2"));
        assert_eq!(index.add("PRMR-01GHI").as_deref(), Some("PRMR@1"));

        assert_eq!(index.resolve("DROP@2"), Some("DROP-02DEF".to_string()));
        assert_eq!(index.resolve("prmr@1"), Some("PRMR-01GHI".to_string()));
        assert_eq!(index.resolve("DROP@99"), None);
    }

    #[test]
    fn test_passthrough() {
        let index = ShortIdIndex::new();
        assert_eq!(index.resolve("DROP-01ABC"), Some("DROP-01ABC".to_string()));
        assert_eq!(index.resolve("01ABC"), Some("01ABC".to_string()));
    }

    #[test]
    fn test_no_duplicates() {
        let mut index = ShortIdIndex::new();
        let first = index.add("SITE-001");
        let second = index.add("SITE-001");

        assert_eq!(first, second);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_removed_alias_not_reused() {
        let mut index = ShortIdIndex::new();
        index.add("SITE-001");
        index.remove("SITE-001");

        assert_eq!(index.resolve("SITE@1"), None);
        assert_eq!(index.add("SITE-002").as_deref(), Some("SITE@2"));
    }

    #[test]
    fn test_save_and_load() {
        let tmp = tempfile::TempDir::new().unwrap();
        let project = Project::init(tmp.path(), false).unwrap();

        let mut index = ShortIdIndex::new();
        index.ensure_all(["DEPT-001", "DEPT-002"]);
        index.save(&project).unwrap();

        let loaded = ShortIdIndex::load(&project);
        assert_eq!(loaded.get_short_id("DEPT-002").as_deref(), Some("DEPT@2"));
        assert_eq!(loaded.resolve("DEPT@1"), Some("DEPT-001".to_string()));
    }
}
