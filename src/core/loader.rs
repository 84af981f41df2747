//! Entity loading and storage helpers

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::core::entity::Entity;
use crate::core::identity::EntityPrefix;
use crate::core::project::Project;
use crate::yaml::{parse_yaml_file, write_yaml_file, YamlError};

/// File suffix for all entity files
pub const ENTITY_SUFFIX: &str = ".pdt.yaml";

/// True for paths that look like entity files
pub fn is_entity_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(ENTITY_SUFFIX))
}

/// Entity prefix encoded in a file name (`DROP-01ABC.pdt.yaml` -> Drop)
pub fn prefix_from_path(path: &Path) -> Option<EntityPrefix> {
    let name = path.file_name()?.to_str()?;
    let (prefix, _) = name.split_once('-')?;
    prefix.parse().ok()
}

/// All entity files of a type, sorted by path
pub fn entity_files(project: &Project, prefix: EntityPrefix) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(project.entity_dir(prefix))
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file() && is_entity_file(e.path()))
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}

/// Load every entity of type `T`
///
/// Files that fail to parse are skipped with a warning; `pdt validate`
/// reports them in full.
pub fn load_all<T: Entity>(project: &Project) -> Vec<(T, PathBuf)> {
    entity_files(project, T::PREFIX)
        .into_iter()
        .filter_map(|path| match parse_yaml_file::<T>(&path) {
            Ok(entity) => Some((entity, path)),
            Err(e) => {
                log::warn!("skipping {}: {}", path.display(), e);
                None
            }
        })
        .collect()
}

/// Find the file for a full or partial entity ID
pub fn find_entity_file(project: &Project, prefix: EntityPrefix, id: &str) -> Option<PathBuf> {
    let needle = id.trim();
    if needle.is_empty() {
        return None;
    }

    let matches: Vec<PathBuf> = entity_files(project, prefix)
        .into_iter()
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.contains(needle))
        })
        .collect();

    match matches.len() {
        1 => matches.into_iter().next(),
        0 => None,
        n => {
            log::warn!("'{}' matches {} {} files, refusing to guess", needle, n, prefix);
            None
        }
    }
}

/// Write an entity to its canonical path
pub fn save<T: Entity>(project: &Project, entity: &T) -> Result<PathBuf, YamlError> {
    let path = project.entity_path(entity.id());
    write_yaml_file(&path, entity)?;
    log::debug!("wrote {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::Site;
    use tempfile::TempDir;

    #[test]
    fn test_save_and_load_all() {
        let tmp = TempDir::new().unwrap();
        let project = Project::init(tmp.path(), false).unwrap();

        let a = Site::new("AAA", "Alpha", "test");
        let b = Site::new("BBB", "Bravo", "test");
        save(&project, &a).unwrap();
        save(&project, &b).unwrap();

        let sites: Vec<Site> = load_all(&project).into_iter().map(|(s, _)| s).collect();
        assert_eq!(sites.len(), 2);
        assert!(sites.iter().any(|s| s.site_code == "BBB"));
    }

    #[test]
    fn test_load_all_skips_broken_files() {
        let tmp = TempDir::new().unwrap();
        let project = Project::init(tmp.path(), false).unwrap();
        save(&project, &Site::new("AAA", "Alpha", "test")).unwrap();
        std::fs::write(
            project.entity_dir(EntityPrefix::Site).join("SITE-BROKEN.pdt.yaml"),
            "site_code: [",
        )
        .unwrap();

        assert_eq!(load_all::<Site>(&project).len(), 1);
    }

    #[test]
    fn test_find_by_partial_id() {
        let tmp = TempDir::new().unwrap();
        let project = Project::init(tmp.path(), false).unwrap();
        let site = Site::new("AAA", "Alpha", "test");
        let path = save(&project, &site).unwrap();

        let full = site.id.to_string();
        assert_eq!(find_entity_file(&project, EntityPrefix::Site, &full), Some(path.clone()));
        assert_eq!(find_entity_file(&project, EntityPrefix::Site, &full[5..20]), Some(path));
        assert_eq!(find_entity_file(&project, EntityPrefix::Site, "ZZZZ"), None);
        assert_eq!(find_entity_file(&project, EntityPrefix::Site, ""), None);
    }

    #[test]
    fn test_prefix_from_path() {
        assert_eq!(
            prefix_from_path(Path::new("drop-tests/DROP-01ABC.pdt.yaml")),
            Some(EntityPrefix::Drop)
        );
        assert_eq!(prefix_from_path(Path::new("notes.yaml")), None);
    }
}
