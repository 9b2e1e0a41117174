// 🖨️ Text output shared by the menu and the one-shot commands

use crate::expense::Expense;
use std::io::{self, Write};

pub fn write_added<W: Write>(out: &mut W, expense: &Expense) -> io::Result<()> {
    writeln!(
        out,
        "✅ Expense '{}' in category '{}' added!",
        expense.description, expense.category
    )
}

/// Numbered listing, 1-based
pub fn write_listing<W: Write>(out: &mut W, expenses: &[Expense]) -> io::Result<()> {
    if expenses.is_empty() {
        return writeln!(out, "🚫 No Expenses recorded yet.");
    }

    writeln!(out, "\n--- All Expenses ---")?;
    for (i, expense) in expenses.iter().enumerate() {
        writeln!(out, "{}. {}", i + 1, expense)?;
    }
    Ok(())
}

pub fn write_search<W: Write>(out: &mut W, keyword: &str, results: &[&Expense]) -> io::Result<()> {
    if results.is_empty() {
        return writeln!(out, "No expenses found for '{}'.", keyword);
    }

    writeln!(out, "\n🔍 Search results for '{}':", keyword)?;
    for expense in results {
        writeln!(out, "{}", expense)?;
    }
    Ok(())
}

pub fn write_deleted<W: Write>(out: &mut W, expense: &Expense) -> io::Result<()> {
    writeln!(out, "❌ Deleted expense: {}", expense)
}

/// `index` is 0-based; shown 1-based
pub fn write_edited<W: Write>(out: &mut W, index: usize, expense: &Expense) -> io::Result<()> {
    writeln!(out, "✏️ Updated expense #{}: {}", index + 1, expense)
}

pub fn write_invalid_number<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "Invalid expense number.")
}

pub fn write_total<W: Write>(out: &mut W, total: f64) -> io::Result<()> {
    writeln!(out, "\n💰 Total Spent: ${:.2}", total)
}

pub fn write_by_category<W: Write>(out: &mut W, totals: &[(String, f64)]) -> io::Result<()> {
    writeln!(out, "\n📊 Total Spent by Category:")?;
    for (category, amount) in totals {
        writeln!(out, "{}: ${:.2}", category, amount)?;
    }
    Ok(())
}
