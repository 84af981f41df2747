//! `pdt init` command - Initialize a new PDT project

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::GlobalOpts;
use crate::core::identity::EntityPrefix;
use crate::core::project::{Project, ProjectError};

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Re-initialize an existing project (existing files are kept)
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs, global: &GlobalOpts) -> Result<()> {
    let cwd = std::env::current_dir().into_diagnostic()?;

    match Project::init(&cwd, args.force) {
        Ok(project) => {
            log::info!("initialized project at {}", project.root().display());
            if global.quiet {
                return Ok(());
            }

            println!(
                "{} Initialized PDT project in {}",
                style("✓").green(),
                style(project.root().display()).cyan()
            );
            println!();
            println!("Created:");
            println!("  {}", style(".pdt/config.yaml").dim());
            for prefix in EntityPrefix::all() {
                println!("  {}/", style(prefix.dir()).dim());
            }
            println!();
            println!("Next: {}", style("pdt site new --code LKC --name \"Lake City\"").yellow());
            Ok(())
        }
        Err(ProjectError::AlreadyExists(path)) => {
            println!(
                "{} PDT project already exists in {}",
                style("!").yellow(),
                path.display()
            );
            println!("  Use {} to re-initialize", style("--force").yellow());
            Ok(())
        }
        Err(e) => Err(miette::miette!("{}", e)),
    }
}
