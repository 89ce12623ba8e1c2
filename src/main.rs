//! Rulecat CLI binary entry point.
//! Resolves configuration, runs the export and prints the result.

use clap::Parser;
use rulecat::cli::{Cli, Commands, ExportArgs};
use rulecat::utils::{error_chain, error_prefix, note_prefix};
use rulecat::{config, export, output};
use std::process;
use tracing_subscriber::EnvFilter;

fn init_tracing(fallback: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    match cli.cmd {
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::Export(args) => run_export(args),
    }
}

fn run_export(args: ExportArgs) {
    let eff = match config::resolve_effective(args.into()) {
        Ok(eff) => eff,
        Err(e) => {
            eprintln!("{} {}", error_prefix(), error_chain(&e));
            process::exit(2);
        }
    };
    init_tracing(&eff.log);

    let (Some(source), Some(target)) = (eff.source.as_deref(), eff.target.as_deref()) else {
        eprintln!(
            "{} Source and target are not configured. Pass --source/--target or add rulecat.toml.",
            error_prefix()
        );
        process::exit(2);
    };
    // Friendly note if no config was found
    if eff.config_file.is_none() && eff.output != "json" {
        eprintln!("{} No rulecat.toml found; using defaults.", note_prefix());
    }

    match export::process_tree(source, target, &eff.export_config()) {
        Ok(result) => {
            output::print_run(&result, &eff.output);
            if !result.failures.is_empty() {
                process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("{} {}", error_prefix(), error_chain(&e));
            process::exit(1);
        }
    }
}
