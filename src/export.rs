// 📤 CSV export of the whole store

use crate::expense::Expense;
use anyhow::{Context, Result};
use serde::Serialize;
use std::io::Write;
use std::path::Path;

#[derive(Serialize)]
struct CsvRow<'a> {
    date: &'a str,
    description: &'a str,
    amount: String,
    category: &'a str,
}

impl<'a> From<&'a Expense> for CsvRow<'a> {
    fn from(expense: &'a Expense) -> Self {
        CsvRow {
            date: &expense.date,
            description: &expense.description,
            amount: format!("{:.2}", expense.amount),
            category: &expense.category,
        }
    }
}

/// Write `expenses` as CSV with a header row, in store order
pub fn write_csv<W: Write>(writer: W, expenses: &[Expense]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    // serialize() only emits the header with the first row
    if expenses.is_empty() {
        wtr.write_record(["date", "description", "amount", "category"])?;
    }
    for expense in expenses {
        wtr.serialize(CsvRow::from(expense))?;
    }

    wtr.flush().context("Failed to flush CSV output")?;
    Ok(())
}

pub fn export_csv(path: &Path, expenses: &[Expense]) -> Result<usize> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create CSV file {:?}", path))?;
    write_csv(file, expenses)?;
    Ok(expenses.len())
}
