use anyhow::{Context, Result};
use clap::Parser;
use std::io;
use tracing_subscriber::EnvFilter;

use expense_tracker::{cli, Cli, Command, ExpenseStore};

fn main() -> Result<()> {
    // Diagnostics go to stderr so menu output stays readable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Cli::parse();

    let mut store = ExpenseStore::open(&args.file)
        .with_context(|| format!("Failed to load expenses from {:?}", args.file))?;

    let command = args.command.unwrap_or(Command::Menu);
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    cli::run(&mut store, command, stdin.lock(), &mut stdout)
}
