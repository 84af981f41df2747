//! `pdt site` command - Site reference data

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::entity_cmd::{self, Column, EntityConfig};
use crate::cli::{GlobalOpts, StatusFilter};
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::loader;
use crate::core::project::Project;
use crate::core::Config;
use crate::entities::{Department, DropTest, Site};

const ENTITY_CONFIG: EntityConfig = EntityConfig {
    prefix: EntityPrefix::Site,
    name: "site",
    name_plural: "sites",
};

#[derive(Subcommand, Debug)]
pub enum SiteCommands {
    /// Create a new site
    New(NewArgs),

    /// List sites
    List(ListArgs),

    /// Show a site's details
    Show(ShowArgs),

    /// Edit a site in your editor
    Edit(ShowArgs),

    /// Delete a site
    Delete(DeleteArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Short site code (e.g., LKC)
    #[arg(long, short = 'c')]
    pub code: String,

    /// Site name
    #[arg(long, short = 'n')]
    pub name: String,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Filter by status
    #[arg(long, short = 's', default_value = "active")]
    pub status: StatusFilter,

    /// Print only the number of matches
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Site ID, short ID (SITE@N) or partial ID
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Site ID, short ID (SITE@N) or partial ID
    pub id: String,

    /// Delete even if departments or drop tests still reference it
    #[arg(long)]
    pub force: bool,
}

pub fn run(cmd: SiteCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        SiteCommands::New(args) => run_new(args, global),
        SiteCommands::List(args) => run_list(args, global),
        SiteCommands::Show(args) => run_show(args, global),
        SiteCommands::Edit(args) => entity_cmd::run_edit_generic(&args.id, &ENTITY_CONFIG),
        SiteCommands::Delete(args) => {
            entity_cmd::run_delete_generic(&args.id, &ENTITY_CONFIG, args.force, global, referrers)
        }
    }
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let project = entity_cmd::discover_project()?;
    let config = Config::load();

    if args.code.trim().is_empty() {
        return Err(miette::miette!("Site code cannot be empty"));
    }

    let duplicate = loader::load_all::<Site>(&project)
        .into_iter()
        .any(|(s, _)| s.site_code.eq_ignore_ascii_case(args.code.trim()));
    if duplicate {
        return Err(miette::miette!("A site with code '{}' already exists", args.code.trim()));
    }

    let site = Site::new(args.code, args.name, config.author());
    entity_cmd::save_new(&project, &site, &ENTITY_CONFIG, global)?;
    Ok(())
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let project = entity_cmd::discover_project()?;

    let mut sites: Vec<Site> = loader::load_all::<Site>(&project)
        .into_iter()
        .map(|(s, _)| s)
        .filter(|s| args.status.matches(&s.status))
        .collect();
    sites.sort_by(|a, b| a.site_code.cmp(&b.site_code));

    if args.count {
        println!("{}", sites.len());
        return Ok(());
    }

    let columns: [Column<Site>; 3] = [
        Column {
            header: "CODE",
            value: |s: &Site| s.site_code.clone(),
        },
        Column {
            header: "NAME",
            value: |s: &Site| s.site_name.clone(),
        },
        Column {
            header: "STATUS",
            value: |s: &Site| s.status.to_string(),
        },
    ];

    entity_cmd::print_list(&project, &sites, &columns, &ENTITY_CONFIG, global)
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    entity_cmd::run_show_generic::<Site, _>(&args.id, &ENTITY_CONFIG, global, |site, project, short_ids| {
        let id = site.id.to_string();
        println!(
            "{} {}",
            style(short_ids.get_short_id(&id).unwrap_or_else(|| id.clone())).cyan(),
            style(&id).dim()
        );
        entity_cmd::print_field("Code", &site.site_code);
        entity_cmd::print_field("Name", &site.site_name);
        entity_cmd::print_field("Status", &site.status);

        let departments: Vec<String> = loader::load_all::<Department>(project)
            .into_iter()
            .filter(|(d, _)| d.site == Some(site.id))
            .map(|(d, _)| d.name)
            .collect();
        if !departments.is_empty() {
            entity_cmd::print_field("Departments", departments.join(", "));
        }

        entity_cmd::print_field("Author", &site.author);
        entity_cmd::print_field("Created", site.created.format("%Y-%m-%d %H:%M"));
        Ok(())
    })
}

fn referrers(project: &Project, id: &EntityId) -> Vec<String> {
    let depts = loader::load_all::<Department>(project)
        .into_iter()
        .filter(|(d, _)| d.site.as_ref() == Some(id))
        .map(|(d, _)| d.id.to_string());
    let drops = loader::load_all::<DropTest>(project)
        .into_iter()
        .filter(|(t, _)| t.site.as_ref() == Some(id))
        .map(|(t, _)| t.id.to_string());
    depts.chain(drops).collect()
}
