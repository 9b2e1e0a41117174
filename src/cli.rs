// ⌨️ Command line - storage location and one-shot commands
//
// With no subcommand the interactive menu runs.

use crate::expense::{parse_amount, Expense, ExpenseUpdate};
use crate::export;
use crate::menu::{self, Menu};
use crate::report;
use crate::store::{ExpenseStore, DEFAULT_STORAGE_FILE};
use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::{BufRead, Write};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "expense-tracker", version)]
#[command(about = "Record, search and summarize personal expenses", long_about = None)]
pub struct Cli {
    /// JSON file holding the expenses
    #[arg(long, short = 'f', env = "EXPENSE_TRACKER_FILE", default_value = DEFAULT_STORAGE_FILE)]
    pub file: PathBuf,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Interactive menu (default)
    Menu,

    /// Record a new expense
    Add {
        description: String,
        #[arg(allow_negative_numbers = true, value_parser = parse_amount)]
        amount: f64,
        category: String,
        /// YYYY-MM-DD, defaults to today
        #[arg(long)]
        date: Option<String>,
    },

    /// List all expenses
    List,

    /// Find expenses by description or category
    Search { keyword: String },

    /// Delete an expense by its listed number
    Delete {
        #[arg(allow_negative_numbers = true)]
        number: i64,
    },

    /// Change fields of an expense by its listed number
    Edit {
        #[arg(allow_negative_numbers = true)]
        number: i64,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, allow_negative_numbers = true, value_parser = parse_amount)]
        amount: Option<f64>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        date: Option<String>,
    },

    /// Total spent
    Total,

    /// Total spent per category
    ByCategory,

    /// Write all expenses to a CSV file
    Export { path: PathBuf },

    /// Browse expenses in a terminal UI
    Browse,
}

/// Run `command` against `store`. Menu input comes from `input`.
pub fn run<R: BufRead, W: Write>(
    store: &mut ExpenseStore,
    command: Command,
    input: R,
    out: &mut W,
) -> Result<()> {
    match command {
        Command::Menu => Menu::new(store, input, out).run()?,
        Command::Add {
            description,
            amount,
            category,
            date,
        } => {
            let date = date.unwrap_or_else(menu::today);
            let added = store
                .add(Expense::new(description, amount, category, date))
                .context("Failed to save expense")?;
            report::write_added(out, added)?;
        }
        Command::List => report::write_listing(out, store.list())?,
        Command::Search { keyword } => {
            let results = store.search(&keyword);
            report::write_search(out, &keyword, &results)?;
        }
        Command::Delete { number } => match store.resolve_number(number) {
            Ok(index) => {
                let removed = store.delete(index).context("Failed to delete expense")?;
                report::write_deleted(out, &removed)?;
            }
            Err(e) if e.is_recoverable() => report::write_invalid_number(out)?,
            Err(e) => return Err(e.into()),
        },
        Command::Edit {
            number,
            description,
            amount,
            category,
            date,
        } => match store.resolve_number(number) {
            Ok(index) => {
                let update = ExpenseUpdate {
                    description,
                    amount,
                    category,
                    date,
                };
                let edited = store.edit(index, update).context("Failed to edit expense")?;
                report::write_edited(out, index, edited)?;
            }
            Err(e) if e.is_recoverable() => report::write_invalid_number(out)?,
            Err(e) => return Err(e.into()),
        },
        Command::Total => report::write_total(out, store.total())?,
        Command::ByCategory => report::write_by_category(out, &store.total_by_category())?,
        Command::Export { path } => {
            let count = export::export_csv(&path, store.list())?;
            writeln!(out, "📤 Exported {} expenses to {}", count, path.display())?;
        }
        Command::Browse => browse(store)?,
    }

    Ok(())
}

#[cfg(feature = "tui")]
fn browse(store: &ExpenseStore) -> Result<()> {
    let mut app = crate::ui::App::new(store.list().to_vec());
    crate::ui::run_ui(&mut app)
}

#[cfg(not(feature = "tui"))]
fn browse(_store: &ExpenseStore) -> Result<()> {
    anyhow::bail!("TUI mode not available, rebuild with: cargo build --features tui")
}
