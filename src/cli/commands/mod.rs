//! CLI command implementations

pub mod completions;
pub mod dept;
pub mod drop;
pub mod init;
pub mod primer;
pub mod site;
pub mod validate;

use miette::Result;

use crate::cli::{Cli, Commands};

/// Dispatch a parsed command line
pub fn run(cli: Cli) -> Result<()> {
    let global = cli.global;
    match cli.command {
        Commands::Init(args) => init::run(args, &global),
        Commands::Site(cmd) => site::run(cmd, &global),
        Commands::Dept(cmd) => dept::run(cmd, &global),
        Commands::Primer(cmd) => primer::run(cmd, &global),
        Commands::Drop(cmd) => drop::run(cmd, &global),
        Commands::Validate(args) => validate::run(args, &global),
        Commands::Completions(args) => completions::run(args),
    }
}
