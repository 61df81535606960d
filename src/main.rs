//! blitzd — daemon bootstrap entry point.
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Parse CLI (global `--dir` and `-v` flags, one subcommand)
//!   3. Init logger (`-v` forces debug, RUST_LOG otherwise)
//!   4. Resolve configuration (defaults → system file → user file → env)
//!   5. Persist the `saved.toml` snapshot, start the config-file watcher
//!   6. Dispatch to the subcommand

mod commands;
mod config;
mod error;
mod logger;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;

use config::ConfigStore;
use error::AppError;

/// blitzd daemon bootstrap.
#[derive(Parser, Debug)]
#[command(name = "blitzd", version, about = "blitzd daemon")]
struct Cli {
    /// blitzd home directory.
    #[arg(long, global = true, value_name = "PATH")]
    dir: Option<String>,

    /// Print more log messages.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the effective configuration.
    Demo,
    /// Show where TLS certificates are expected.
    Gencert,
    /// Run until interrupted, observing live config reloads.
    Grace,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), AppError> {
    // Load .env if present — ignore errors (file is optional).
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    logger::init(level, cli.verbose)?;

    // --dir must be applied before resolution: every path default derives
    // from the home directory.
    let blitzd_dir = cli
        .dir
        .as_deref()
        .map(config::expand_home)
        .unwrap_or_else(config::default_blitzd_dir);

    let resolution = config::init(&blitzd_dir)?;
    info!(
        blitzd_dir = %blitzd_dir.display(),
        active_file = %resolution.active_file.display(),
        alias = %resolution.settings.alias,
        "configuration resolved"
    );

    let active_file = resolution.active_file.clone();
    let store = Arc::new(ConfigStore::new(blitzd_dir, resolution));
    // Held for the life of the process; dropping it would stop the watch.
    let _watcher = config::watch(Arc::clone(&store), active_file)?;

    match cli.command {
        Command::Demo => commands::demo::run(&store),
        Command::Gencert => commands::gencert::run(&store),
        Command::Grace => commands::grace::run(&store),
    }
}
