use clap::Parser;
use miette::Result;
use pdt::cli::Cli;

fn main() -> Result<()> {
    // Install miette's fancy error handler for source-annotated diagnostics
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    pdt::cli::commands::run(cli)
}

/// RUST_LOG wins; otherwise -v flags raise the level from warnings upward
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}
