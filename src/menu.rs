// 📋 Interactive menu - numbered choices looping until Exit
//
// Reads from any BufRead and writes to any Write so the whole loop can be
// driven from a test script. Parsing typed input (amounts, numbers) happens
// here; the store only ever sees typed values.

use crate::expense::{parse_amount, Expense, ExpenseUpdate};
use crate::report;
use crate::store::{self, ExpenseStore};
use anyhow::{Context, Result};
use chrono::Local;
use std::io::{BufRead, Write};
use tracing::debug;

const MENU: &str = "\n=== Expense Tracker ===
1. Add Expense
2. View All Expenses
3. Search Expenses
4. Delete Expense
5. Show Total Spent
6. Show Total by Category
7. Modify Expense
8. Exit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Add,
    ViewAll,
    Search,
    Delete,
    Total,
    TotalByCategory,
    Modify,
    Exit,
}

impl MenuChoice {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "1" => Some(MenuChoice::Add),
            "2" => Some(MenuChoice::ViewAll),
            "3" => Some(MenuChoice::Search),
            "4" => Some(MenuChoice::Delete),
            "5" => Some(MenuChoice::Total),
            "6" => Some(MenuChoice::TotalByCategory),
            "7" => Some(MenuChoice::Modify),
            "8" => Some(MenuChoice::Exit),
            _ => None,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

pub struct Menu<'a, R, W> {
    store: &'a mut ExpenseStore,
    input: R,
    out: W,
}

impl<'a, R: BufRead, W: Write> Menu<'a, R, W> {
    pub fn new(store: &'a mut ExpenseStore, input: R, out: W) -> Self {
        Menu { store, input, out }
    }

    /// Loop until the user picks Exit or input runs out
    pub fn run(&mut self) -> Result<()> {
        loop {
            writeln!(self.out, "{}", MENU)?;
            let Some(choice) = self.prompt("Enter Choice: ")? else {
                break;
            };

            let flow = match MenuChoice::parse(&choice) {
                Some(choice) => self.handle(choice)?,
                None => {
                    writeln!(self.out, "Invalid choice. Try again.")?;
                    Flow::Continue
                }
            };

            if flow == Flow::Exit {
                break;
            }
        }

        writeln!(self.out, "Goodbye! 👋")?;
        Ok(())
    }

    fn handle(&mut self, choice: MenuChoice) -> Result<Flow> {
        debug!(?choice, "menu choice");

        match choice {
            MenuChoice::Add => self.add(),
            MenuChoice::ViewAll => {
                report::write_listing(&mut self.out, self.store.list())?;
                Ok(Flow::Continue)
            }
            MenuChoice::Search => {
                let Some(keyword) = self.prompt("Enter search keyword: ")? else {
                    return Ok(Flow::Exit);
                };
                let results = self.store.search(&keyword);
                report::write_search(&mut self.out, &keyword, &results)?;
                Ok(Flow::Continue)
            }
            MenuChoice::Delete => self.delete(),
            MenuChoice::Total => {
                report::write_total(&mut self.out, self.store.total())?;
                Ok(Flow::Continue)
            }
            MenuChoice::TotalByCategory => {
                report::write_by_category(&mut self.out, &self.store.total_by_category())?;
                Ok(Flow::Continue)
            }
            MenuChoice::Modify => self.modify(),
            MenuChoice::Exit => Ok(Flow::Exit),
        }
    }

    fn add(&mut self) -> Result<Flow> {
        let Some(description) = self.prompt("Enter description: ")? else {
            return Ok(Flow::Exit);
        };
        let Some(amount) = self.prompt_amount("Enter amount: ")? else {
            return Ok(Flow::Exit);
        };
        let Some(category) = self.prompt("Enter category: ")? else {
            return Ok(Flow::Exit);
        };
        let Some(date) = self.prompt("Enter Date (YYYY-MM-DD): ")? else {
            return Ok(Flow::Exit);
        };
        let date = if date.is_empty() { today() } else { date };

        let added = self
            .store
            .add(Expense::new(description, amount, category, date))
            .context("Failed to save expense")?;
        report::write_added(&mut self.out, added)?;
        Ok(Flow::Continue)
    }

    fn delete(&mut self) -> Result<Flow> {
        report::write_listing(&mut self.out, self.store.list())?;
        let Some(number) = self.prompt_number("Enter expense number to delete: ")? else {
            return Ok(Flow::Exit);
        };

        let resolved = self.store.resolve_number(number);
        let Some(index) = self.recover(resolved)? else {
            return Ok(Flow::Continue);
        };
        let removed = self.store.delete(index).context("Failed to delete expense")?;
        report::write_deleted(&mut self.out, &removed)?;
        Ok(Flow::Continue)
    }

    fn modify(&mut self) -> Result<Flow> {
        report::write_listing(&mut self.out, self.store.list())?;
        let Some(number) = self.prompt_number("Enter expense number to edit: ")? else {
            return Ok(Flow::Exit);
        };
        let resolved = self.store.resolve_number(number);
        let Some(index) = self.recover(resolved)? else {
            return Ok(Flow::Continue);
        };

        let Some(description) = self.prompt("Enter new description (leave blank to keep same): ")?
        else {
            return Ok(Flow::Exit);
        };
        let Some(amount) = self.prompt_optional_amount("Enter new amount (leave blank to keep same): ")?
        else {
            return Ok(Flow::Exit);
        };
        let Some(category) = self.prompt("Enter new category (leave blank to keep same): ")? else {
            return Ok(Flow::Exit);
        };
        let Some(date) = self.prompt("Enter new date (YYYY-MM-DD) (leave blank to keep same): ")?
        else {
            return Ok(Flow::Exit);
        };

        let update = ExpenseUpdate {
            description: non_blank(description),
            amount,
            category: non_blank(category),
            date: non_blank(date),
        };

        let edited = self.store.edit(index, update).context("Failed to edit expense")?;
        report::write_edited(&mut self.out, index, edited)?;
        Ok(Flow::Continue)
    }

    // ========================================================================
    // INPUT HELPERS
    // ========================================================================

    /// Print `text`, read one line. `None` at end of input.
    fn prompt(&mut self, text: &str) -> Result<Option<String>> {
        write!(self.out, "{}", text)?;
        self.out.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn prompt_amount(&mut self, text: &str) -> Result<Option<f64>> {
        loop {
            let Some(line) = self.prompt(text)? else {
                return Ok(None);
            };
            match parse_amount(&line) {
                Ok(amount) => return Ok(Some(amount)),
                Err(_) => writeln!(self.out, "Please enter a number.")?,
            }
        }
    }

    /// Blank keeps the existing amount; `0` is a real value
    fn prompt_optional_amount(&mut self, text: &str) -> Result<Option<Option<f64>>> {
        loop {
            let Some(line) = self.prompt(text)? else {
                return Ok(None);
            };
            if line.is_empty() {
                return Ok(Some(None));
            }
            match parse_amount(&line) {
                Ok(amount) => return Ok(Some(Some(amount))),
                Err(_) => writeln!(self.out, "Please enter a number.")?,
            }
        }
    }

    fn prompt_number(&mut self, text: &str) -> Result<Option<i64>> {
        loop {
            let Some(line) = self.prompt(text)? else {
                return Ok(None);
            };
            match line.parse::<i64>() {
                Ok(number) => return Ok(Some(number)),
                Err(_) => writeln!(self.out, "Please enter a whole number.")?,
            }
        }
    }

    /// Report recoverable store errors and carry on; anything else is fatal
    fn recover<T>(&mut self, result: store::Result<T>) -> Result<Option<T>> {
        match result {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.is_recoverable() => {
                report::write_invalid_number(&mut self.out)?;
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}

fn non_blank(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Today's local date as `YYYY-MM-DD`
pub fn today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}
