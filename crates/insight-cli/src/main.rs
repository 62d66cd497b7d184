//! Program Insight CLI: the `program-insight` command.

mod cli;
mod commands;
mod support;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn init_tracing(debug: bool) {
    let default = if debug { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.command.debug());

    match cli.command {
        Commands::Parse {
            program,
            source,
            include_packages,
            strict_packages,
            debug,
            json,
            deny_errors,
        } => commands::parse::run(commands::parse::Args {
            program,
            source,
            include_packages,
            strict_packages,
            debug,
            json,
            deny_errors,
        }),

        Commands::Descriptor {
            file,
            root,
            json,
            deny_errors,
        } => commands::descriptor::run(file, root, json, deny_errors),

        Commands::Lookup {
            program,
            source,
            json,
        } => commands::lookup::run(program, source, json),
    }
}
