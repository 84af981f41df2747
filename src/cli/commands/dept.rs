//! `pdt dept` command - Department reference data

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::entity_cmd::{self, Column, EntityConfig};
use crate::cli::helpers::truncate_str;
use crate::cli::output::fmt_opt_display;
use crate::cli::{GlobalOpts, StatusFilter};
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::loader;
use crate::core::project::Project;
use crate::core::Config;
use crate::entities::{Department, DropTest, Primer, Site};

const ENTITY_CONFIG: EntityConfig = EntityConfig {
    prefix: EntityPrefix::Dept,
    name: "department",
    name_plural: "departments",
};

const SITE_CONFIG: EntityConfig = EntityConfig {
    prefix: EntityPrefix::Site,
    name: "site",
    name_plural: "sites",
};

#[derive(Subcommand, Debug)]
pub enum DeptCommands {
    /// Create a new department
    New(NewArgs),

    /// List departments
    List(ListArgs),

    /// Show a department's details
    Show(ShowArgs),

    /// Edit a department in your editor
    Edit(ShowArgs),

    /// Delete a department
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Department name
    #[arg(long, short = 'n')]
    pub name: String,

    /// Owning site (ID or short ID)
    #[arg(long, short = 's')]
    pub site: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Filter by status
    #[arg(long, default_value = "active")]
    pub status: StatusFilter,

    /// Only departments of this site (ID or short ID)
    #[arg(long, short = 's')]
    pub site: Option<String>,

    /// Print only the number of matches
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Department ID, short ID (DEPT@N) or partial ID
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Department ID, short ID (DEPT@N) or partial ID
    pub id: String,

    /// Delete even if primers or drop tests still reference it
    #[arg(long)]
    pub force: bool,
}

pub fn run(cmd: DeptCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        DeptCommands::New(args) => run_new(args, global),
        DeptCommands::List(args) => run_list(args, global),
        DeptCommands::Show(args) => run_show(args, global),
        DeptCommands::Edit(args) => entity_cmd::run_edit_generic(&args.id, &ENTITY_CONFIG),
        DeptCommands::Delete(args) => {
            entity_cmd::run_delete_generic(&args.id, &ENTITY_CONFIG, args.force, global, referrers)
        }
    }
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let project = entity_cmd::discover_project()?;
    let config = Config::load();

    if args.name.trim().is_empty() {
        return Err(miette::miette!("Department name cannot be empty"));
    }

    let site = args
        .site
        .as_deref()
        .map(|r| entity_cmd::resolve_id(&project, r, &SITE_CONFIG))
        .transpose()?;

    let dept = Department::new(args.name, site, config.author());
    entity_cmd::save_new(&project, &dept, &ENTITY_CONFIG, global)?;
    Ok(())
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let project = entity_cmd::discover_project()?;

    let site_filter = args
        .site
        .as_deref()
        .map(|r| entity_cmd::resolve_id(&project, r, &SITE_CONFIG))
        .transpose()?;

    let mut depts: Vec<Department> = loader::load_all::<Department>(&project)
        .into_iter()
        .map(|(d, _)| d)
        .filter(|d| args.status.matches(&d.status))
        .filter(|d| site_filter.is_none() || d.site == site_filter)
        .collect();
    depts.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));

    if args.count {
        println!("{}", depts.len());
        return Ok(());
    }

    let columns: [Column<Department>; 3] = [
        Column {
            header: "NAME",
            value: |d: &Department| truncate_str(&d.name, 40),
        },
        Column {
            header: "SITE",
            value: |d: &Department| fmt_opt_display(d.site.map(|s| truncate_str(&s.to_string(), 16))),
        },
        Column {
            header: "STATUS",
            value: |d: &Department| d.status.to_string(),
        },
    ];

    entity_cmd::print_list(&project, &depts, &columns, &ENTITY_CONFIG, global)
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    entity_cmd::run_show_generic::<Department, _>(&args.id, &ENTITY_CONFIG, global, |dept, project, short_ids| {
        let id = dept.id.to_string();
        println!(
            "{} {}",
            style(short_ids.get_short_id(&id).unwrap_or_else(|| id.clone())).cyan(),
            style(&id).dim()
        );
        entity_cmd::print_field("Name", &dept.name);

        match dept.site {
            Some(site_id) => {
                let site = loader::load_all::<Site>(project)
                    .into_iter()
                    .find(|(s, _)| s.id == site_id)
                    .map(|(s, _)| format!("{} - {}", s.site_code, s.site_name));
                entity_cmd::print_field("Site", site.unwrap_or_else(|| format!("{} (missing)", site_id)));
            }
            None => entity_cmd::print_field("Site", "-"),
        }

        entity_cmd::print_field("Status", &dept.status);
        entity_cmd::print_field("Author", &dept.author);
        entity_cmd::print_field("Created", dept.created.format("%Y-%m-%d %H:%M"));
        Ok(())
    })
}

fn referrers(project: &Project, id: &EntityId) -> Vec<String> {
    let primers = loader::load_all::<Primer>(project)
        .into_iter()
        .filter(|(p, _)| p.department.as_ref() == Some(id))
        .map(|(p, _)| p.id.to_string());
    let drops = loader::load_all::<DropTest>(project)
        .into_iter()
        .filter(|(t, _)| t.department.as_ref() == Some(id))
        .map(|(t, _)| t.id.to_string());
    primers.chain(drops).collect()
}
