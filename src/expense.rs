// 🧾 Expense Record - one tracked transaction
//
// "The four fields are the VALUE, the UUID is only a handle for this process"
//
// The persisted shape is exactly: description, amount, category, date.
// The id never touches disk; it is regenerated on every load.

use crate::error::StoreError;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// EXPENSE
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    /// Process-local identity, never serialized
    #[serde(skip, default = "new_id")]
    id: Uuid,

    pub description: String,

    /// Currency value, not validated (negative amounts load fine)
    pub amount: f64,

    /// Free-text label used for grouping
    pub category: String,

    /// `YYYY-MM-DD` by convention, stored and compared as text
    pub date: String,
}

fn new_id() -> Uuid {
    Uuid::new_v4()
}

impl Expense {
    pub fn new(
        description: impl Into<String>,
        amount: f64,
        category: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Expense {
            id: new_id(),
            description: description.into(),
            amount,
            category: category.into(),
            date: date.into(),
        }
    }

    /// Stable handle for this record while the process runs
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Mapping with the four persisted fields
    pub fn to_value(&self) -> serde_json::Value {
        serde_json::json!({
            "description": self.description,
            "amount": self.amount,
            "category": self.category,
            "date": self.date,
        })
    }

    /// Build a record from a persisted mapping.
    ///
    /// `index` is the entry's position in the stored array and ends up in the
    /// error so a broken file can be fixed by hand.
    pub fn from_value(index: usize, value: serde_json::Value) -> Result<Self, StoreError> {
        if !value.is_object() {
            return Err(StoreError::MalformedRecord {
                index,
                reason: format!("expected an object, found {}", kind_of(&value)),
            });
        }

        serde_json::from_value(value).map_err(|e| StoreError::MalformedRecord {
            index,
            reason: e.to_string(),
        })
    }

    /// Case-insensitive substring match on description or category
    pub fn matches(&self, keyword: &str) -> bool {
        let keyword = keyword.to_lowercase();
        self.description.to_lowercase().contains(&keyword)
            || self.category.to_lowercase().contains(&keyword)
    }
}

pub(crate) fn kind_of(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

/// Parse a typed amount, refusing NaN and infinities
pub fn parse_amount(text: &str) -> Result<f64, String> {
    match text.trim().parse::<f64>() {
        Ok(amount) if amount.is_finite() => Ok(amount),
        Ok(_) => Err(format!("'{}' is not a finite amount", text)),
        Err(_) => Err(format!("'{}' is not a number", text)),
    }
}

// Equality is value equality: two records with the same four fields are the
// same expense, whatever handle they were given.
impl PartialEq for Expense {
    fn eq(&self, other: &Self) -> bool {
        self.description == other.description
            && self.amount == other.amount
            && self.category == other.category
            && self.date == other.date
    }
}

impl fmt::Display for Expense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {} | ${:.2} | Category: {}",
            self.date, self.description, self.amount, self.category
        )
    }
}

// ============================================================================
// EXPENSE UPDATE
// ============================================================================

/// Partial edit of an expense.
///
/// `None` keeps the current value, `Some` replaces it. `Some(0.0)` is a real
/// amount, not "keep".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseUpdate {
    pub description: Option<String>,
    pub amount: Option<f64>,
    pub category: Option<String>,
    pub date: Option<String>,
}

impl ExpenseUpdate {
    pub fn is_empty(&self) -> bool {
        self.description.is_none()
            && self.amount.is_none()
            && self.category.is_none()
            && self.date.is_none()
    }

    /// Overwrite the supplied fields of `expense`
    pub fn apply_to(self, expense: &mut Expense) {
        if let Some(description) = self.description {
            expense.description = description;
        }
        if let Some(amount) = self.amount {
            expense.amount = amount;
        }
        if let Some(category) = self.category {
            expense.category = category;
        }
        if let Some(date) = self.date {
            expense.date = date;
        }
    }
}
