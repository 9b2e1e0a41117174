// Expense Tracker - Core Library
// Exposes the store and the dispatch layers for the binary and tests

pub mod error;
pub mod expense;
pub mod store;
pub mod report;
pub mod menu;
pub mod export;
pub mod cli;

// Terminal browser, only with the TUI feature
#[cfg(feature = "tui")]
pub mod ui;

// Re-export commonly used types
pub use error::StoreError;
pub use expense::{Expense, ExpenseUpdate};
pub use store::{ExpenseStore, DEFAULT_STORAGE_FILE};
pub use menu::{Menu, MenuChoice};
pub use cli::{Cli, Command};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
