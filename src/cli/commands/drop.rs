//! `pdt drop` command - Record and evaluate primer drop tests

use chrono::NaiveDate;
use clap::{Subcommand, ValueEnum};
use console::style;
use miette::{IntoDiagnostic, Result};
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::cli::entity_cmd::{self, Column, EntityConfig};
use crate::cli::helpers::{parse_level_assignment, truncate_str};
use crate::cli::output::{fmt_opt, fmt_opt_display, print_json, print_yaml, styled_disposition};
use crate::cli::{DispositionFilter, GlobalOpts, OutputFormat, TestTypeFilter};
use crate::core::entity::Status;
use crate::core::evaluator::{Disposition, DropHeightRow, Evaluation, TestType};
use crate::core::identity::EntityPrefix;
use crate::core::loader;
use crate::core::{Config, EntityId, Project};
use crate::entities::drop_test::Severity;
use crate::entities::{Department, DropTest, Primer, Site};

const ENTITY_CONFIG: EntityConfig = EntityConfig {
    prefix: EntityPrefix::Drop,
    name: "drop test",
    name_plural: "drop tests",
};

const PRIMER_CONFIG: EntityConfig = EntityConfig {
    prefix: EntityPrefix::Prmr,
    name: "primer",
    name_plural: "primers",
};

const SITE_CONFIG: EntityConfig = EntityConfig {
    prefix: EntityPrefix::Site,
    name: "site",
    name_plural: "sites",
};

const DEPT_CONFIG: EntityConfig = EntityConfig {
    prefix: EntityPrefix::Dept,
    name: "department",
    name_plural: "departments",
};

#[derive(Subcommand, Debug)]
pub enum DropCommands {
    /// Start a new drop test for a primer
    New(NewArgs),

    /// Record misfire counts (LEVEL=COUNT, LEVEL=- clears)
    Record(RecordArgs),

    /// Calculate results and disposition
    Calc(CalcArgs),

    /// Set the disposition by hand (accept, retest or reject)
    Disposition(DispositionArgs),

    /// Lock a decided test against further changes
    Finalize(ShowArgs),

    /// List drop tests
    List(ListArgs),

    /// Show a drop test
    Show(ShowArgs),

    /// Edit a drop test in your editor
    Edit(ShowArgs),

    /// Delete a drop test
    Delete(ShowArgs),
}

#[derive(clap::Args, Debug)]
pub struct NewArgs {
    /// Primer under test (ID or short ID)
    #[arg(long, short = 'p')]
    pub primer: String,

    /// Test type; only "retest" selects the retest spec
    #[arg(long = "type", short = 't', default_value = "regular-run")]
    pub test_type: String,

    /// Lot number
    #[arg(long, short = 'l')]
    pub lot: Option<String>,

    /// Inspector running the test
    #[arg(long, short = 'i')]
    pub inspector: Option<String>,

    /// Testing site (ID or short ID); defaults to the primer department's site
    #[arg(long, short = 's')]
    pub site: Option<String>,

    /// Test date (YYYY-MM-DD)
    #[arg(long)]
    pub test_date: Option<NaiveDate>,

    /// Test shift
    #[arg(long)]
    pub shift: Option<u8>,

    /// Manufacturing date (YYYY-MM-DD)
    #[arg(long)]
    pub mfg_date: Option<NaiveDate>,

    /// Measured firing pin protrusion
    #[arg(long)]
    pub firing_pin: Option<f64>,

    #[arg(long)]
    pub test_number: Option<u32>,

    #[arg(long)]
    pub eotm: Option<String>,

    #[arg(long)]
    pub head_stamp: Option<String>,
}

#[derive(clap::Args, Debug)]
pub struct RecordArgs {
    /// Drop test ID, short ID (DROP@N) or partial ID
    pub id: String,

    /// Misfire counts as LEVEL=COUNT (e.g., 4=25 5=20)
    #[arg(required = true, value_parser = parse_level_assignment)]
    pub counts: Vec<(u8, Option<u32>)>,

    /// Set the measured firing pin protrusion
    #[arg(long)]
    pub firing_pin: Option<f64>,

    /// Calculate results after recording
    #[arg(long)]
    pub calc: bool,
}

#[derive(clap::Args, Debug)]
pub struct CalcArgs {
    /// Drop test ID, short ID (DROP@N) or partial ID
    pub id: String,

    /// Print the calculation without saving it
    #[arg(long)]
    pub dry_run: bool,
}

/// Dispositions that can be set by hand
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum DispositionArg {
    Accept,
    Retest,
    Reject,
}

impl From<DispositionArg> for Disposition {
    fn from(arg: DispositionArg) -> Self {
        match arg {
            DispositionArg::Accept => Disposition::Accept,
            DispositionArg::Retest => Disposition::Retest,
            DispositionArg::Reject => Disposition::Reject,
        }
    }
}

#[derive(clap::Args, Debug)]
pub struct DispositionArgs {
    /// Drop test ID, short ID (DROP@N) or partial ID
    pub id: String,

    /// New disposition
    #[arg(value_enum)]
    pub disposition: DispositionArg,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Filter by disposition
    #[arg(long, short = 'd', default_value = "all")]
    pub disposition: DispositionFilter,

    /// Only tests of this primer (ID or short ID)
    #[arg(long, short = 'p')]
    pub primer: Option<String>,

    /// Only tests of this department (ID or short ID)
    #[arg(long)]
    pub dept: Option<String>,

    /// Only tests run at this site (site code, ID or short ID)
    #[arg(long, short = 's')]
    pub site: Option<String>,

    /// Only regular runs or only retests
    #[arg(long = "type", short = 't')]
    pub test_type: Option<TestTypeFilter>,

    /// Case-insensitive text matched against lot, inspector, primer type and head stamp
    #[arg(long)]
    pub search: Option<String>,

    /// Print only the number of matches
    #[arg(long)]
    pub count: bool,
}

#[derive(clap::Args, Debug)]
pub struct ShowArgs {
    /// Drop test ID, short ID (DROP@N) or partial ID
    pub id: String,
}

pub fn run(cmd: DropCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        DropCommands::New(args) => run_new(args, global),
        DropCommands::Record(args) => run_record(args, global),
        DropCommands::Calc(args) => run_calc(args, global),
        DropCommands::Disposition(args) => run_disposition(args, global),
        DropCommands::Finalize(args) => run_finalize(args, global),
        DropCommands::List(args) => run_list(args, global),
        DropCommands::Show(args) => run_show(args, global),
        DropCommands::Edit(args) => run_edit(args),
        DropCommands::Delete(args) => {
            entity_cmd::run_delete_generic(&args.id, &ENTITY_CONFIG, false, global, |_, _| Vec::new())
        }
    }
}

fn run_new(args: NewArgs, global: &GlobalOpts) -> Result<()> {
    let project = entity_cmd::discover_project()?;
    let config = Config::load();

    let (primer, _) = entity_cmd::load_entity::<Primer>(&project, &args.primer, &PRIMER_CONFIG)?;
    if primer.status == Status::Inactive {
        log::warn!("primer {} is inactive", primer.id);
    }

    let site = match args.site.as_deref() {
        Some(reference) => Some(entity_cmd::resolve_id(&project, reference, &SITE_CONFIG)?),
        None => primer.department.and_then(|dept_id| {
            loader::load_all::<Department>(&project)
                .into_iter()
                .find(|(d, _)| d.id == dept_id)
                .and_then(|(d, _)| d.site)
        }),
    };

    let mut test = DropTest::from_primer(&primer, TestType::from_label(&args.test_type), config.author());
    test.site = site;
    test.lot_number = args.lot;
    test.inspector = args.inspector;
    test.testing.date = args.test_date;
    test.testing.shift = args.shift;
    test.manufacturing.date = args.mfg_date;
    test.test_number = args.test_number;
    test.eotm_number = args.eotm;
    test.head_stamp = args.head_stamp;
    if args.firing_pin.is_some() {
        test.firing_pin_meas = args.firing_pin;
    }

    log::info!(
        "new {} drop test for {} (sample size {})",
        test.test_type,
        test.primer_type,
        test.sample_size
    );
    entity_cmd::save_new(&project, &test, &ENTITY_CONFIG, global)?;
    Ok(())
}

fn run_record(args: RecordArgs, global: &GlobalOpts) -> Result<()> {
    let project = entity_cmd::discover_project()?;
    let (mut test, _) = entity_cmd::load_entity::<DropTest>(&project, &args.id, &ENTITY_CONFIG)?;
    test.ensure_editable().into_diagnostic()?;

    for (level, count) in &args.counts {
        test.set_misfires(*level, *count).into_diagnostic()?;
        if let Some(count) = count {
            if test.sample_size > 0 && *count > test.sample_size {
                eprintln!(
                    "{} Level {} has {} misfires, more than the sample size of {}",
                    style("!").yellow(),
                    level,
                    count,
                    test.sample_size
                );
            }
        }
    }

    if args.firing_pin.is_some() {
        test.firing_pin_meas = args.firing_pin;
    }

    let eval = args
        .calc
        .then(|| test.calculate())
        .transpose()
        .into_diagnostic()?;
    let path = entity_cmd::save_existing(&project, &test)?;
    log::debug!("recorded {} level(s) in {}", args.counts.len(), path.display());

    if global.quiet {
        return Ok(());
    }

    println!(
        "{} Recorded {} level(s) on {}",
        style("✓").green(),
        args.counts.len(),
        style(test.id).cyan()
    );
    match eval {
        Some(eval) => println!("   Disposition: {}", styled_disposition(eval.disposition)),
        None if test.results.is_some() && !test.results_are_current() => {
            println!(
                "   {} Results are out of date; run {}",
                style("!").yellow(),
                style("pdt drop calc").yellow()
            );
        }
        None => {}
    }
    Ok(())
}

fn run_calc(args: CalcArgs, global: &GlobalOpts) -> Result<()> {
    let project = entity_cmd::discover_project()?;
    let (mut test, _) = entity_cmd::load_entity::<DropTest>(&project, &args.id, &ENTITY_CONFIG)?;

    let eval = if args.dry_run {
        test.evaluate()
    } else {
        let eval = test.calculate().into_diagnostic()?;
        entity_cmd::save_existing(&project, &test)?;
        log::info!("{} -> {}", test.id, eval.disposition);
        eval
    };

    match global.format {
        OutputFormat::Json => print_json(&eval)?,
        OutputFormat::Yaml => print_yaml(&eval)?,
        OutputFormat::Id | OutputFormat::ShortId => println!("{}", eval.disposition),
        OutputFormat::Tsv => print_rows_tsv(&eval),
        OutputFormat::Auto => {
            println!(
                "{} {} {}",
                style(&test.primer_type).bold(),
                style(test.test_type).dim(),
                style(test.id).dim()
            );
            println!("{}", rows_table(&eval));
            print_summary(&test, &eval);
            if args.dry_run {
                println!("{}", style("(dry run, results not saved)").dim());
            }
        }
    }

    Ok(())
}

fn run_disposition(args: DispositionArgs, global: &GlobalOpts) -> Result<()> {
    let project = entity_cmd::discover_project()?;
    let (mut test, _) = entity_cmd::load_entity::<DropTest>(&project, &args.id, &ENTITY_CONFIG)?;

    let calculated = test.disposition;
    test.override_disposition(args.disposition.into()).into_diagnostic()?;
    entity_cmd::save_existing(&project, &test)?;
    log::info!("{} disposition {} -> {} (set by hand)", test.id, calculated, test.disposition);

    if !global.quiet {
        println!(
            "{} {} disposition set to {}",
            style("✓").green(),
            style(test.id).cyan(),
            styled_disposition(test.disposition)
        );
    }
    Ok(())
}

fn run_finalize(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    let project = entity_cmd::discover_project()?;
    let (mut test, _) = entity_cmd::load_entity::<DropTest>(&project, &args.id, &ENTITY_CONFIG)?;

    test.finalize().into_diagnostic()?;
    entity_cmd::save_existing(&project, &test)?;
    log::info!("finalized {} as {}", test.id, test.disposition);

    if !global.quiet {
        println!(
            "{} Finalized {} ({})",
            style("✓").green(),
            style(test.id).cyan(),
            styled_disposition(test.disposition)
        );
    }
    Ok(())
}

fn run_edit(args: ShowArgs) -> Result<()> {
    let project = entity_cmd::discover_project()?;
    let (test, _) = entity_cmd::load_entity::<DropTest>(&project, &args.id, &ENTITY_CONFIG)?;
    test.ensure_editable().into_diagnostic()?;

    entity_cmd::run_edit_generic(&args.id, &ENTITY_CONFIG)
}

/// Site filter accepts a site code as well as an ID
fn resolve_site(project: &Project, reference: &str) -> Result<EntityId> {
    let by_code = loader::load_all::<Site>(project)
        .into_iter()
        .find(|(site, _)| site.site_code.eq_ignore_ascii_case(reference));
    match by_code {
        Some((site, _)) => Ok(site.id),
        None => entity_cmd::resolve_id(project, reference, &SITE_CONFIG),
    }
}

fn matches_search(test: &DropTest, needle: &str) -> bool {
    [
        test.lot_number.as_deref(),
        test.inspector.as_deref(),
        Some(test.primer_type.as_str()),
        test.head_stamp.as_deref(),
    ]
    .into_iter()
    .flatten()
    .any(|field| field.to_lowercase().contains(needle))
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let project = entity_cmd::discover_project()?;

    let primer_filter = args
        .primer
        .as_deref()
        .map(|r| entity_cmd::resolve_id(&project, r, &PRIMER_CONFIG))
        .transpose()?;
    let dept_filter = args
        .dept
        .as_deref()
        .map(|r| entity_cmd::resolve_id(&project, r, &DEPT_CONFIG))
        .transpose()?;
    let site_filter = args
        .site
        .as_deref()
        .map(|r| resolve_site(&project, r))
        .transpose()?;
    let needle = args.search.as_deref().map(str::to_lowercase);

    let mut tests: Vec<DropTest> = loader::load_all::<DropTest>(&project)
        .into_iter()
        .map(|(t, _)| t)
        .filter(|t| args.disposition.matches(&t.disposition))
        .filter(|t| primer_filter.is_none() || t.primer == primer_filter)
        .filter(|t| dept_filter.is_none() || t.department == dept_filter)
        .filter(|t| site_filter.is_none() || t.site == site_filter)
        .filter(|t| args.test_type.is_none_or(|f| f.matches(&t.test_type)))
        .filter(|t| needle.as_deref().is_none_or(|n| matches_search(t, n)))
        .collect();
    tests.sort_by(|a, b| b.created.cmp(&a.created));

    if args.count {
        println!("{}", tests.len());
        return Ok(());
    }

    let columns: [Column<DropTest>; 7] = [
        Column {
            header: "PRIMER",
            value: |t: &DropTest| truncate_str(&t.primer_type, 24),
        },
        Column {
            header: "LOT",
            value: |t: &DropTest| fmt_opt_display(t.lot_number.as_deref()),
        },
        Column {
            header: "TYPE",
            value: |t: &DropTest| t.test_type.to_string(),
        },
        Column {
            header: "H-BAR",
            value: |t: &DropTest| fmt_opt(t.results.as_ref().and_then(|r| r.h_bar), 2),
        },
        Column {
            header: "H5S",
            value: |t: &DropTest| fmt_opt(t.results.as_ref().and_then(|r| r.h5s), 2),
        },
        Column {
            header: "H2S",
            value: |t: &DropTest| fmt_opt(t.results.as_ref().and_then(|r| r.h2s), 2),
        },
        Column {
            header: "DISPOSITION",
            value: |t: &DropTest| {
                if t.has_data() && !t.results_are_current() {
                    format!("{} *", t.disposition)
                } else {
                    t.disposition.to_string()
                }
            },
        },
    ];

    entity_cmd::print_list(&project, &tests, &columns, &ENTITY_CONFIG, global)
}

fn run_show(args: ShowArgs, global: &GlobalOpts) -> Result<()> {
    entity_cmd::run_show_generic::<DropTest, _>(&args.id, &ENTITY_CONFIG, global, |test, _, short_ids| {
        let id = test.id.to_string();
        println!(
            "{} {}",
            style(short_ids.get_short_id(&id).unwrap_or_else(|| id.clone())).cyan(),
            style(&id).dim()
        );
        entity_cmd::print_field("Primer", &test.primer_type);
        entity_cmd::print_field("Cert", format!("{} (sample size {})", test.cert, test.sample_size));
        entity_cmd::print_field("Test type", test.test_type);
        entity_cmd::print_field("Lot", fmt_opt_display(test.lot_number.as_deref()));
        entity_cmd::print_field("Inspector", fmt_opt_display(test.inspector.as_deref()));
        entity_cmd::print_field("Test date", fmt_opt_display(test.testing.date));
        entity_cmd::print_field("Manufacturing date", fmt_opt_display(test.manufacturing.date));
        if let Some(site) = test.site {
            entity_cmd::print_field("Site", site);
        }

        let (spec_plus, spec_minus) = test.height_specs();
        entity_cmd::print_field(
            "Spec H+ / H-",
            format!("{} / {}", fmt_opt(spec_plus, 2), fmt_opt(spec_minus, 2)),
        );
        entity_cmd::print_field(
            "Firing pin min / meas",
            format!(
                "{} / {}",
                fmt_opt(test.spec.firing_pin_min, 4),
                fmt_opt(test.firing_pin_meas, 4)
            ),
        );

        println!();
        let recorded: Vec<String> = test
            .misfires
            .iter()
            .enumerate()
            .filter_map(|(idx, count)| count.map(|c| format!("{}={}", idx + 1, c)))
            .collect();
        if recorded.is_empty() {
            entity_cmd::print_field("Misfires", style("none recorded").dim());
        } else {
            entity_cmd::print_field("Misfires", recorded.join(" "));
        }

        if let Some(results) = &test.results {
            entity_cmd::print_field("All fire height", fmt_opt_display(results.all_fire_height));
            entity_cmd::print_field("No fire height", fmt_opt_display(results.no_fire_height));
            entity_cmd::print_field("H-bar", fmt_opt(results.h_bar, 2));
            entity_cmd::print_field("S", fmt_opt(results.s_dev, 4));
            entity_cmd::print_field("H+", fmt_opt(results.h5s, 2));
            entity_cmd::print_field("H-", fmt_opt(results.h2s, 2));
            entity_cmd::print_field("Calculated", results.calculated.format("%Y-%m-%d %H:%M"));
        }
        if test.disposition_override {
            entity_cmd::print_field(
                "Disposition",
                format!("{} {}", styled_disposition(test.disposition), style("(set by hand)").dim()),
            );
        } else {
            entity_cmd::print_field("Disposition", styled_disposition(test.disposition));
        }
        if let Some(finalized) = test.finalized {
            entity_cmd::print_field("Finalized", finalized.format("%Y-%m-%d %H:%M"));
        }

        if test.has_data() && !test.results_are_current() {
            println!(
                "{} Results are out of date; run {}",
                style("!").yellow(),
                style("pdt drop calc").yellow()
            );
        }

        for issue in test.validate().iter().filter(|i| i.severity == Severity::Error) {
            println!("{} {}: {}", style("✗").red(), issue.field, issue.message);
        }
        Ok(())
    })
}

// =========================================================================
// Calculation output
// =========================================================================

/// One line of the drop height table
#[derive(Tabled)]
struct RowView {
    #[tabled(rename = "LEVEL")]
    level: u8,
    #[tabled(rename = "MISFIRES")]
    misfires: String,
    #[tabled(rename = "#FR")]
    fired: String,
    #[tabled(rename = "%MF")]
    percent: String,
    #[tabled(rename = "K")]
    k: String,
    #[tabled(rename = "P*K")]
    pk: String,
    #[tabled(rename = "S")]
    s: String,
    #[tabled(rename = "P*S")]
    ps: String,
}

impl From<&DropHeightRow> for RowView {
    fn from(row: &DropHeightRow) -> Self {
        let derived = |v: i64| {
            if row.misfires.is_some() {
                v.to_string()
            } else {
                String::new()
            }
        };
        Self {
            level: row.level,
            misfires: fmt_opt_display(row.misfires),
            fired: derived(row.number_fired),
            percent: derived(row.percent_misfire),
            k: derived(row.variance_factor_k),
            pk: derived(row.ptimes_k),
            s: derived(row.skewness_factor_s),
            ps: derived(row.ptimes_s),
        }
    }
}

fn rows_table(eval: &Evaluation) -> Table {
    let mut table = Table::new(eval.rows.iter().map(RowView::from));
    table.with(Style::rounded());
    table
}

fn print_rows_tsv(eval: &Evaluation) {
    println!("LEVEL\tMISFIRES\t#FR\t%MF\tK\tP*K\tS\tP*S");
    for row in eval.rows.iter() {
        let view = RowView::from(row);
        println!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            view.level, view.misfires, view.fired, view.percent, view.k, view.pk, view.s, view.ps
        );
    }
}

fn print_summary(test: &DropTest, eval: &Evaluation) {
    entity_cmd::print_field(
        "Totals (%MF, P*K, P*S)",
        format!(
            "{}, {}, {}",
            eval.percent_misfire_sum(),
            eval.ptimes_k_sum(),
            eval.ptimes_s_sum()
        ),
    );
    entity_cmd::print_field("All fire height", fmt_opt_display(eval.all_fire_height));
    entity_cmd::print_field("No fire height", fmt_opt_display(eval.no_fire_height));
    entity_cmd::print_field("H-bar", fmt_opt(eval.h_bar, 2));
    entity_cmd::print_field("S", fmt_opt(eval.s_dev, 4));
    entity_cmd::print_field(
        "H-bar + H+ type * S",
        format!("{}  (spec {})", fmt_opt(eval.h5s, 2), fmt_opt(eval.spec_h_plus, 2)),
    );
    entity_cmd::print_field(
        "H-bar - H- type * S",
        format!("{}  (spec {})", fmt_opt(eval.h2s, 2), fmt_opt(eval.spec_h_minus, 2)),
    );
    if test.spec.firing_pin_min.is_some_and(|min| min != 0.0) {
        entity_cmd::print_field(
            "Firing pin",
            format!(
                "{}  (min {})",
                fmt_opt(test.firing_pin_meas, 4),
                fmt_opt(test.spec.firing_pin_min, 4)
            ),
        );
    }
    entity_cmd::print_field("Disposition", styled_disposition(eval.disposition));
}
