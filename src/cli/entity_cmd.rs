//! Shared entity command infrastructure
//!
//! Common show / list / edit / delete plumbing so the per-entity command
//! modules only describe their fields.

use console::style;
use miette::{IntoDiagnostic, Result};
use std::fs;
use std::path::PathBuf;
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::cli::helpers::escape_tsv;
use crate::cli::output::{print_json, print_yaml};
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::entity::Entity;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::loader;
use crate::core::project::Project;
use crate::core::shortid::ShortIdIndex;
use crate::core::Config;
use crate::yaml::parse_yaml_file;

// =========================================================================
// Entity Configuration
// =========================================================================

/// Static configuration for an entity type
pub struct EntityConfig {
    /// Entity prefix
    pub prefix: EntityPrefix,
    /// Singular name for messages (e.g., "primer")
    pub name: &'static str,
    /// Plural name for messages (e.g., "primers")
    pub name_plural: &'static str,
}

/// Discover the project or fail with a diagnostic
pub fn discover_project() -> Result<Project> {
    Project::discover().map_err(|e| miette::miette!("{}", e))
}

// =========================================================================
// Lookup
// =========================================================================

/// Find the file for a short ID, full ID or unique partial ID
pub fn resolve_path(project: &Project, reference: &str, config: &EntityConfig) -> Result<PathBuf> {
    let short_ids = ShortIdIndex::load(project);
    let resolved = short_ids.resolve(reference).ok_or_else(|| {
        miette::miette!("No {} found with short ID '{}'", config.name, reference)
    })?;

    loader::find_entity_file(project, config.prefix, &resolved).ok_or_else(|| {
        miette::miette!(
            help = format!("Run 'pdt {} list' to see available IDs", cli_name(config.prefix)),
            "No {} found matching '{}'",
            config.name,
            reference
        )
    })
}

/// Load an entity by reference
pub fn load_entity<T: Entity>(
    project: &Project,
    reference: &str,
    config: &EntityConfig,
) -> Result<(T, PathBuf)> {
    let path = resolve_path(project, reference, config)?;
    let entity: T = parse_yaml_file(&path)?;
    Ok((entity, path))
}

/// Resolve a reference to the full ID of an existing entity
pub fn resolve_id(project: &Project, reference: &str, config: &EntityConfig) -> Result<EntityId> {
    let path = resolve_path(project, reference, config)?;
    let stem = path
        .file_name()
        .and_then(|n| n.to_str())
        .and_then(|n| n.strip_suffix(loader::ENTITY_SUFFIX))
        .ok_or_else(|| miette::miette!("Unexpected entity file name: {}", path.display()))?;
    stem.parse().into_diagnostic()
}

fn cli_name(prefix: EntityPrefix) -> &'static str {
    match prefix {
        EntityPrefix::Site => "site",
        EntityPrefix::Dept => "dept",
        EntityPrefix::Prmr => "primer",
        EntityPrefix::Drop => "drop",
    }
}

// =========================================================================
// Create
// =========================================================================

/// Save a new entity, assign its short ID and report it
pub fn save_new<T: Entity>(
    project: &Project,
    entity: &T,
    config: &EntityConfig,
    global: &GlobalOpts,
) -> Result<String> {
    let path = loader::save(project, entity)?;

    let mut short_ids = ShortIdIndex::load(project);
    let id = entity.id().to_string();
    let alias = short_ids.add(&id).unwrap_or_else(|| id.clone());
    short_ids.save(project).into_diagnostic()?;

    match global.format {
        OutputFormat::Id => println!("{}", id),
        OutputFormat::ShortId => println!("{}", alias),
        _ if global.quiet => {}
        _ => {
            println!(
                "{} Created {} {} {}",
                style("✓").green(),
                config.name,
                style(&alias).cyan(),
                style(&id).dim()
            );
            println!("   {}", style(path.display()).dim());
        }
    }

    Ok(alias)
}

/// Write an updated entity back to its file
pub fn save_existing<T: Entity>(project: &Project, entity: &T) -> Result<PathBuf> {
    Ok(loader::save(project, entity)?)
}

// =========================================================================
// Show
// =========================================================================

/// Generic show: YAML/JSON/ID formats are handled here, everything else is
/// handed to `pretty`
pub fn run_show_generic<T, F>(
    reference: &str,
    config: &EntityConfig,
    global: &GlobalOpts,
    pretty: F,
) -> Result<()>
where
    T: Entity,
    F: FnOnce(&T, &Project, &ShortIdIndex) -> Result<()>,
{
    let project = discover_project()?;
    let (entity, path) = load_entity::<T>(&project, reference, config)?;

    let mut short_ids = ShortIdIndex::load(&project);
    let id = entity.id().to_string();
    short_ids.add(&id);

    match global.format {
        OutputFormat::Yaml => {
            let content = fs::read_to_string(&path).into_diagnostic()?;
            print!("{}", content);
        }
        OutputFormat::Json => print_json(&entity)?,
        OutputFormat::Id => println!("{}", id),
        OutputFormat::ShortId => println!("{}", short_ids.get_short_id(&id).unwrap_or(id)),
        OutputFormat::Auto | OutputFormat::Tsv => pretty(&entity, &project, &short_ids)?,
    }

    Ok(())
}

/// Print a labelled field line for pretty show output
pub fn print_field(label: &str, value: impl std::fmt::Display) {
    println!("{:<22} {}", style(format!("{}:", label)).bold(), value);
}

// =========================================================================
// List
// =========================================================================

/// A column in list output
pub struct Column<T> {
    pub header: &'static str,
    pub value: fn(&T) -> String,
}

/// Print a filtered list of entities in the requested format
///
/// The short ID column is always first in table and TSV output.
pub fn print_list<T: Entity>(
    project: &Project,
    entities: &[T],
    columns: &[Column<T>],
    config: &EntityConfig,
    global: &GlobalOpts,
) -> Result<()> {
    let mut short_ids = ShortIdIndex::load(project);
    short_ids.ensure_all(entities.iter().map(|e| e.id().to_string()));
    short_ids.save(project).into_diagnostic()?;

    let short_of = |e: &T| {
        let id = e.id().to_string();
        short_ids.get_short_id(&id).unwrap_or(id)
    };

    match global.format {
        OutputFormat::Json => print_json(entities)?,
        OutputFormat::Yaml => print_yaml(entities)?,
        OutputFormat::Id => entities.iter().for_each(|e| println!("{}", e.id())),
        OutputFormat::ShortId => entities.iter().for_each(|e| println!("{}", short_of(e))),
        OutputFormat::Tsv => {
            let header: Vec<&str> = std::iter::once("SHORT")
                .chain(columns.iter().map(|c| c.header))
                .collect();
            println!("{}", header.join("\t"));
            for entity in entities {
                let row: Vec<String> = std::iter::once(short_of(entity))
                    .chain(columns.iter().map(|c| escape_tsv(&(c.value)(entity))))
                    .collect();
                println!("{}", row.join("\t"));
            }
        }
        OutputFormat::Auto => {
            if entities.is_empty() {
                println!("No {} found.", config.name_plural);
                return Ok(());
            }

            let mut builder = Builder::default();
            builder.push_record(
                std::iter::once("SHORT".to_string())
                    .chain(columns.iter().map(|c| c.header.to_string())),
            );
            for entity in entities {
                builder.push_record(
                    std::iter::once(short_of(entity)).chain(columns.iter().map(|c| (c.value)(entity))),
                );
            }
            let mut table = builder.build();
            table.with(Style::rounded());

            println!("{}", table);
            println!(
                "{} {}(s) found",
                style(entities.len()).cyan(),
                config.name
            );
        }
    }

    Ok(())
}

// =========================================================================
// Edit / Delete
// =========================================================================

/// Open an entity file in the configured editor
pub fn run_edit_generic(reference: &str, config: &EntityConfig) -> Result<()> {
    let project = discover_project()?;
    let cli_config = Config::load();
    let path = resolve_path(&project, reference, config)?;

    println!(
        "Opening {} in {}...",
        style(path.display()).cyan(),
        style(cli_config.editor()).yellow()
    );

    cli_config.run_editor(&path).into_diagnostic()?;
    Ok(())
}

/// Delete an entity file
///
/// `referenced_by` lists entities that still point at this one; deletion is
/// refused unless `force` is set.
pub fn run_delete_generic<F>(
    reference: &str,
    config: &EntityConfig,
    force: bool,
    global: &GlobalOpts,
    referenced_by: F,
) -> Result<()>
where
    F: FnOnce(&Project, &EntityId) -> Vec<String>,
{
    let project = discover_project()?;
    let id = resolve_id(&project, reference, config)?;

    let referrers = referenced_by(&project, &id);
    if !referrers.is_empty() && !force {
        return Err(miette::miette!(
            help = "Use --force to delete anyway",
            "Cannot delete {} {}: still referenced by {}",
            config.name,
            id,
            referrers.join(", ")
        ));
    }

    let path = project.entity_path(&id);
    fs::remove_file(&path).into_diagnostic()?;

    let mut short_ids = ShortIdIndex::load(&project);
    short_ids.remove(&id.to_string());
    short_ids.save(&project).into_diagnostic()?;

    if !global.quiet {
        println!("{} Deleted {} {}", style("✓").green(), config.name, id);
    }
    Ok(())
}
