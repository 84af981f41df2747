//! `pdt primer` command - Primer types and their drop test specs

use clap::{Subcommand, ValueEnum};
use console::style;
use miette::Result;

use crate::cli::entity_cmd::{self, Column, EntityConfig};
use crate::cli::helpers::truncate_str;
use crate::cli::output::fmt_opt;
use crate::cli::{GlobalOpts, StatusFilter};
use crate::core::identity::{EntityId, EntityPrefix};
use crate::core::loader;
use crate::core::project::Project;
use crate::core::Config;
use crate::entities::primer::CertCategory;
use crate::entities::{DropTest, Primer};

const ENTITY_CONFIG: EntityConfig = EntityConfig {
    prefix: EntityPrefix::Prmr,
    name: "primer",
    name_plural: "primers",
};

const DEPT_CONFIG: EntityConfig = EntityConfig {
    prefix: EntityPrefix::Dept,
    name: "department",
    name_plural: "departments",
};

#[derive(Subcommand, Debug)]
pub enum PrimerCommands {
    /// Create a new primer type
    New(NewArgs),

    /// List primer types
    List(ListArgs),

    /// Show a primer's spec
    Show(ShowArgs),

    /// Edit a primer in your editor
    Edit(ShowArgs),

    /// Delete a primer
    Delete(DeleteArgs),
}

/// Certification category argument
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq)]
pub enum CertArg {
    /// Commercial (25 per level)
    Comm,
    /// Military (50 per level)
    Mil,
    /// Certified (50 per level)
    Cert,
}

impl From<CertArg> for CertCategory {
    fn from(arg: CertArg) -> Self {
        match arg {
            CertArg::Comm => CertCategory::Commercial,
            CertArg::Mil => CertCategory::Military,
            CertArg::Cert => CertCategory::Certified,
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Primer type designation
    #[arg(long = "type", short = 't')]
    pub primer_type: String,

    /// Certification category
    #[arg(long, short = 'c', default_value = "comm")]
    pub cert: CertArg,

    /// Owning department (ID or short ID)
    #[arg(long, short = 'd')]
    pub dept: Option<String>,

    /// H+ multiplier
    #[arg(long)]
    pub h_plus_type: Option<f64>,

    /// H- multiplier
    #[arg(long)]
    pub h_minus_type: Option<f64>,

    /// H+ spec for a regular run
    #[arg(long)]
    pub test_h_plus: Option<f64>,

    /// H- spec for a regular run
    #[arg(long)]
    pub test_h_minus: Option<f64>,

    /// H+ spec for a retest
    #[arg(long)]
    pub retest_h_plus: Option<f64>,

    /// H- spec for a retest
    #[arg(long)]
    pub retest_h_minus: Option<f64>,

    /// Minimum firing pin protrusion (0 disables the check)
    #[arg(long)]
    pub firing_pin_min: Option<f64>,

    #[arg(long)]
    pub firing_pin_max: Option<f64>,

    #[arg(long)]
    pub ball_weight: Option<f64>,

    #[arg(long)]
    pub ball_diameter: Option<f64>,

    #[arg(long)]
    pub head_space: Option<f64>,

    /// Highest drop height used for this primer
    #[arg(long)]
    pub high_drop_test: Option<f64>,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Filter by status
    #[arg(long, short = 's', default_value = "active")]
    pub status: StatusFilter,

    /// Filter by certification category
    #[arg(long, short = 'c')]
    pub cert: Option<CertArg>,

    /// Print only the number of matches
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Primer ID, short ID (PRMR@N) or partial ID
    pub id: String,
}

#[derive(clap::Args, Debug)]
pub struct DeleteArgs {
    /// Primer ID, short ID (PRMR@N) or partial ID
    pub id: String,

    /// Delete even if drop tests still reference it
    #[arg(long)]
    pub force: bool,
}

pub fn run(cmd: PrimerCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        PrimerCommands::New(args) => run_new(args, global),
        PrimerCommands::List(args) => run_list(args, global),
        PrimerCommands::Show(args) => run_show(args, global),
        PrimerCommands::Edit(args) => entity_cmd::run_edit_generic(&args.id, &ENTITY_CONFIG),
        PrimerCommands::Delete(args) => {
            entity_cmd::run_delete_generic(&args.id, &ENTITY_CONFIG, args.force, global, referrers)
        }
    }
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let project = entity_cmd::discover_project()?;
    let config = Config::load();

    if args.primer_type.trim().is_empty() {
        return Err(miette::miette!("Primer type cannot be empty"));
    }

    let department = args
        .dept
        .as_deref()
        .map(|r| entity_cmd::resolve_id(&project, r, &DEPT_CONFIG))
        .transpose()?;

    let mut primer = Primer::new(args.primer_type, args.cert.into(), config.author());
    primer.department = department;
    primer.h_plus_type = args.h_plus_type;
    primer.h_minus_type = args.h_minus_type;
    primer.test_h_plus = args.test_h_plus;
    primer.test_h_minus = args.test_h_minus;
    primer.retest_h_plus = args.retest_h_plus;
    primer.retest_h_minus = args.retest_h_minus;
    primer.firing_pin_min = args.firing_pin_min;
    primer.firing_pin_max = args.firing_pin_max;
    primer.ball_weight = args.ball_weight;
    primer.ball_diameter = args.ball_diameter;
    primer.head_space = args.head_space;
    primer.high_drop_test = args.high_drop_test;

    entity_cmd::save_new(&project, &primer, &ENTITY_CONFIG, global)?;
    Ok(())
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let project = entity_cmd::discover_project()?;
    let cert_filter: Option<CertCategory> = args.cert.map(Into::into);

    let mut primers: Vec<Primer> = loader::load_all::<Primer>(&project)
        .into_iter()
        .map(|(p, _)| p)
        .filter(|p| args.status.matches(&p.status))
        .filter(|p| cert_filter.is_none_or(|c| p.cert == c))
        .collect();
    primers.sort_by(|a, b| a.primer_type.cmp(&b.primer_type));

    if args.count {
        println!("{}", primers.len());
        return Ok(());
    }

    let columns: [Column<Primer>; 6] = [
        Column {
            header: "TYPE",
            value: |p: &Primer| truncate_str(&p.primer_type, 30),
        },
        Column {
            header: "CERT",
            value: |p: &Primer| p.cert.to_string(),
        },
        Column {
            header: "N",
            value: |p: &Primer| p.sample_size().to_string(),
        },
        Column {
            header: "H+ SPEC",
            value: |p: &Primer| fmt_opt(p.test_h_plus, 2),
        },
        Column {
            header: "H- SPEC",
            value: |p: &Primer| fmt_opt(p.test_h_minus, 2),
        },
        Column {
            header: "STATUS",
            value: |p: &Primer| p.status.to_string(),
        },
    ];

    entity_cmd::print_list(&project, &primers, &columns, &ENTITY_CONFIG, global)
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    entity_cmd::run_show_generic::<Primer, _>(&args.id, &ENTITY_CONFIG, global, |primer, _, short_ids| {
        let id = primer.id.to_string();
        println!(
            "{} {}",
            style(short_ids.get_short_id(&id).unwrap_or_else(|| id.clone())).cyan(),
            style(&id).dim()
        );
        entity_cmd::print_field("Type", &primer.primer_type);
        entity_cmd::print_field(
            "Cert",
            format!("{} (sample size {})", primer.cert, primer.sample_size()),
        );
        if let Some(dept) = primer.department {
            entity_cmd::print_field("Department", dept);
        }
        entity_cmd::print_field("Status", &primer.status);

        println!();
        println!("{}", style("Drop test spec").bold().underlined());
        entity_cmd::print_field("H+ / H- type", format!(
            "{} / {}",
            fmt_opt(primer.h_plus_type, 2),
            fmt_opt(primer.h_minus_type, 2)
        ));
        entity_cmd::print_field("Test H+ / H-", format!(
            "{} / {}",
            fmt_opt(primer.test_h_plus, 2),
            fmt_opt(primer.test_h_minus, 2)
        ));
        entity_cmd::print_field("Retest H+ / H-", format!(
            "{} / {}",
            fmt_opt(primer.retest_h_plus, 2),
            fmt_opt(primer.retest_h_minus, 2)
        ));
        entity_cmd::print_field("Firing pin min / max", format!(
            "{} / {}",
            fmt_opt(primer.firing_pin_min, 4),
            fmt_opt(primer.firing_pin_max, 4)
        ));
        entity_cmd::print_field("Ball weight", fmt_opt(primer.ball_weight, 3));
        entity_cmd::print_field("Ball diameter", fmt_opt(primer.ball_diameter, 3));
        entity_cmd::print_field("Head space", fmt_opt(primer.head_space, 4));
        entity_cmd::print_field("High drop test", fmt_opt(primer.high_drop_test, 2));

        println!();
        entity_cmd::print_field("Author", &primer.author);
        entity_cmd::print_field("Created", primer.created.format("%Y-%m-%d %H:%M"));
        Ok(())
    })
}

fn referrers(project: &Project, id: &EntityId) -> Vec<String> {
    loader::load_all::<DropTest>(project)
        .into_iter()
        .filter(|(t, _)| t.primer.as_ref() == Some(id))
        .map(|(t, _)| t.id.to_string())
        .collect()
}
