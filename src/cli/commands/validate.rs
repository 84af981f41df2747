//! `pdt validate` command - Validate entity files against schemas and rules

use console::style;
use miette::Result;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::cli::entity_cmd;
use crate::cli::GlobalOpts;
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::loader;
use crate::core::project::Project;
use crate::entities::drop_test::Severity;
use crate::entities::DropTest;
use crate::schema::Validator;
use crate::yaml::parse_yaml;

#[derive(clap::Args, Debug)]
pub struct ValidateArgs {
    /// Files or directories to validate (default: entire project)
    #[arg()]
    pub paths: Vec<PathBuf>,

    /// Strict mode - warnings become errors
    #[arg(long)]
    pub strict: bool,

    /// Show summary only, don't show individual findings
    #[arg(long)]
    pub summary: bool,
}

#[derive(Default)]
struct ValidationStats {
    files_checked: usize,
    files_passed: usize,
    files_failed: usize,
    total_errors: usize,
    total_warnings: usize,
}

/// Findings for one file
#[derive(Default)]
struct FileReport {
    errors: Vec<String>,
    warnings: Vec<String>,
}

pub fn run(args: ValidateArgs, global: &GlobalOpts) -> Result<()> {
    let project = entity_cmd::discover_project()?;
    let validator = Validator::new().map_err(|e| miette::miette!("{}", e))?;
    let known_ids = collect_ids(&project);

    let files = if args.paths.is_empty() {
        EntityPrefix::all()
            .iter()
            .flat_map(|p| loader::entity_files(&project, *p))
            .collect()
    } else {
        expand_paths(&args.paths)
    };

    let verbose = !args.summary && !global.quiet;
    let mut stats = ValidationStats::default();

    for path in &files {
        let Some(prefix) = loader::prefix_from_path(path) else {
            if verbose {
                println!(
                    "{} {} - unknown entity type (skipped)",
                    style("?").yellow(),
                    path.display()
                );
            }
            continue;
        };

        stats.files_checked += 1;
        let mut report = check_file(path, prefix, &validator, &known_ids);
        if args.strict {
            report.errors.append(&mut report.warnings);
        }

        stats.total_errors += report.errors.len();
        stats.total_warnings += report.warnings.len();

        if report.errors.is_empty() {
            stats.files_passed += 1;
            if verbose {
                println!("{} {}", style("✓").green(), path.display());
            }
        } else {
            stats.files_failed += 1;
            if verbose {
                println!(
                    "{} {} - {} error(s)",
                    style("✗").red(),
                    path.display(),
                    report.errors.len()
                );
            }
        }

        if verbose {
            for error in &report.errors {
                println!("    {} {}", style("error:").red(), error);
            }
            for warning in &report.warnings {
                println!("    {} {}", style("warning:").yellow(), warning);
            }
        }
    }

    if !global.quiet {
        println!();
        println!("{}", style("─".repeat(60)).dim());
        println!("{}", style("Validation Summary").bold());
        println!("{}", style("─".repeat(60)).dim());
        println!("  Files checked:  {}", style(stats.files_checked).cyan());
        println!("  Files passed:   {}", style(stats.files_passed).green());
        println!("  Files failed:   {}", style(stats.files_failed).red());
        println!("  Total errors:   {}", style(stats.total_errors).red());
        if stats.total_warnings > 0 {
            println!("  Total warnings: {}", style(stats.total_warnings).yellow());
        }
        println!();
    }

    match stats.files_failed {
        0 => {
            if !global.quiet {
                println!("{} All files passed validation!", style("✓").green().bold());
            }
            Ok(())
        }
        1 => Err(miette::miette!("Validation failed: 1 file has errors")),
        n => Err(miette::miette!("Validation failed: {} files have errors", n)),
    }
}

/// Schema, parse and business-rule checks for one file
fn check_file(
    path: &Path,
    prefix: EntityPrefix,
    validator: &Validator,
    known_ids: &HashSet<EntityId>,
) -> FileReport {
    let mut report = FileReport::default();

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            report.errors.push(e.to_string());
            return report;
        }
    };

    match validator.validate_yaml(prefix, &content) {
        Ok(violations) => report.errors.extend(violations.iter().map(|v| v.to_string())),
        Err(e) => {
            report.errors.push(e.to_string());
            return report;
        }
    }

    if prefix != EntityPrefix::Drop || !report.errors.is_empty() {
        return report;
    }

    let filename = path.file_name().unwrap_or_default().to_string_lossy();
    let test: DropTest = match parse_yaml(&content, &filename) {
        Ok(t) => t,
        Err(e) => {
            report.errors.push(e.to_string());
            return report;
        }
    };

    for issue in test.validate() {
        let line = format!("{}: {}", issue.field, issue.message);
        match issue.severity {
            Severity::Error => report.errors.push(line),
            Severity::Warning => report.warnings.push(line),
        }
    }

    let references = [
        ("primer", test.primer),
        ("site", test.site),
        ("department", test.department),
    ];
    for (field, id) in references {
        if let Some(id) = id {
            if !known_ids.contains(&id) {
                report
                    .warnings
                    .push(format!("{}: {} does not exist in this project", field, id));
            }
        }
    }

    report
}

/// IDs of every entity file in the project, taken from file names
fn collect_ids(project: &Project) -> HashSet<EntityId> {
    EntityPrefix::all()
        .iter()
        .flat_map(|p| loader::entity_files(project, *p))
        .filter_map(|path| {
            path.file_name()?
                .to_str()?
                .strip_suffix(loader::ENTITY_SUFFIX)?
                .parse()
                .ok()
        })
        .collect()
}

/// Expand directories into the entity files they contain
fn expand_paths(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(path)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file() && loader::is_entity_file(e.path()))
                .map(|e| e.into_path())
                .collect();
            found.sort();
            files.extend(found);
        } else {
            files.push(path.clone());
        }
    }
    files
}
