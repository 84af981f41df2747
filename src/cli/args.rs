//! Command-line argument definitions

use clap::{Parser, Subcommand, ValueEnum};

use crate::cli::commands::{
    completions::CompletionsArgs, dept::DeptCommands, drop::DropCommands, init::InitArgs,
    primer::PrimerCommands, site::SiteCommands, validate::ValidateArgs,
};

/// PDT - record and evaluate primer drop tests as plain-text YAML files
#[derive(Parser, Debug)]
#[command(name = "pdt", version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command
#[derive(clap::Args, Debug, Clone)]
pub struct GlobalOpts {
    /// Output format
    #[arg(long, short = 'f', global = true, default_value = "auto", env = "PDT_FORMAT")]
    pub format: OutputFormat,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress informational output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,
}

impl Default for GlobalOpts {
    fn default() -> Self {
        Self {
            format: OutputFormat::Auto,
            verbose: 0,
            quiet: false,
        }
    }
}

/// Output format for show/list commands
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Table for lists, human-readable view for single entities
    #[default]
    Auto,
    /// Raw YAML
    Yaml,
    /// Pretty-printed JSON
    Json,
    /// Tab-separated values
    Tsv,
    /// Full entity IDs only
    Id,
    /// Short IDs (PREFIX@N) only
    ShortId,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new PDT project in the current directory
    Init(InitArgs),

    /// Manage sites
    #[command(subcommand)]
    Site(SiteCommands),

    /// Manage departments
    #[command(subcommand)]
    Dept(DeptCommands),

    /// Manage primer types and their drop test specs
    #[command(subcommand)]
    Primer(PrimerCommands),

    /// Record and evaluate drop tests
    #[command(subcommand)]
    Drop(DropCommands),

    /// Validate entity files against schemas and business rules
    Validate(ValidateArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}
