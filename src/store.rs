// 💾 Expense Store - ordered expenses backed by one JSON file
//
// Every mutation rewrites the whole file before returning, so the in-memory
// list and the file on disk always agree.
//
// File layout (top-level array, 4-space indent):
//
// [
//     {
//         "description": "Coffee",
//         "amount": 4.5,
//         "category": "Food",
//         "date": "2024-01-01"
//     }
// ]

use crate::error::StoreError;
use crate::expense::{kind_of, Expense, ExpenseUpdate};
use serde::Serialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Storage file used when the caller does not pick one
pub const DEFAULT_STORAGE_FILE: &str = "expenses.json";

pub type Result<T> = std::result::Result<T, StoreError>;

pub struct ExpenseStore {
    path: PathBuf,
    expenses: Vec<Expense>,
}

impl ExpenseStore {
    /// Open the store at `path`, loading whatever is there.
    ///
    /// A missing file is an empty store. A file that exists but does not
    /// decode is an error; it is never silently replaced.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let expenses = load_expenses(&path)?;
        Ok(ExpenseStore { path, expenses })
    }

    /// Open `expenses.json` in the working directory
    pub fn open_default() -> Result<Self> {
        Self::open(DEFAULT_STORAGE_FILE)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-read the storage file, dropping the in-memory copy
    pub fn reload(&mut self) -> Result<()> {
        self.expenses = load_expenses(&self.path)?;
        Ok(())
    }

    // ========================================================================
    // QUERIES (no mutation)
    // ========================================================================

    /// All expenses in insertion order. Empty slice means nothing recorded.
    pub fn list(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn len(&self) -> usize {
        self.expenses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expenses.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Expense> {
        self.expenses.get(index)
    }

    /// Current position of the expense with this id
    pub fn position_of(&self, id: Uuid) -> Option<usize> {
        self.expenses.iter().position(|e| e.id() == id)
    }

    /// Expenses whose description or category contains `keyword`,
    /// ignoring case. An empty keyword matches everything.
    pub fn search(&self, keyword: &str) -> Vec<&Expense> {
        self.expenses.iter().filter(|e| e.matches(keyword)).collect()
    }

    /// Sum of all amounts, unrounded
    pub fn total(&self) -> f64 {
        self.expenses.iter().map(|e| e.amount).sum()
    }

    /// Subtotal per exact category label, in first-seen order
    pub fn total_by_category(&self) -> Vec<(String, f64)> {
        summarize_by_category(&self.expenses)
            .into_iter()
            .map(|(category, _, total)| (category, total))
            .collect()
    }

    /// Turn a 1-based number as shown to the user into an index.
    ///
    /// `0` and negatives are the user's way of writing index -1 and below.
    pub fn resolve_number(&self, number: i64) -> Result<usize> {
        // i64::MIN has no predecessor; it stays out of range either way
        let index = number.saturating_sub(1);
        self.check_index(index)
    }

    fn check_index(&self, index: i64) -> Result<usize> {
        match usize::try_from(index) {
            Ok(i) if i < self.expenses.len() => Ok(i),
            _ => {
                warn!(index, len = self.expenses.len(), "expense index out of range");
                Err(StoreError::OutOfRange {
                    index,
                    len: self.expenses.len(),
                })
            }
        }
    }

    // ========================================================================
    // MUTATIONS (each one saves before returning)
    // ========================================================================

    /// Append an expense and save
    pub fn add(&mut self, expense: Expense) -> Result<&Expense> {
        check_amount(expense.amount)?;
        self.expenses.push(expense);

        if let Err(e) = self.save() {
            self.expenses.pop();
            return Err(e);
        }

        let added = &self.expenses[self.expenses.len() - 1];
        info!(description = %added.description, category = %added.category, "expense added");
        Ok(added)
    }

    /// Remove the expense at `index` and save. Later expenses shift down.
    pub fn delete(&mut self, index: usize) -> Result<Expense> {
        let index = self.check_index(index as i64)?;
        let removed = self.expenses.remove(index);

        if let Err(e) = self.save() {
            self.expenses.insert(index, removed);
            return Err(e);
        }

        info!(index, expense = %removed, "expense deleted");
        Ok(removed)
    }

    /// Overwrite the supplied fields of the expense at `index` and save
    pub fn edit(&mut self, index: usize, update: ExpenseUpdate) -> Result<&Expense> {
        let index = self.check_index(index as i64)?;
        if let Some(amount) = update.amount {
            check_amount(amount)?;
        }
        let previous = self.expenses[index].clone();
        update.apply_to(&mut self.expenses[index]);

        if let Err(e) = self.save() {
            self.expenses[index] = previous;
            return Err(e);
        }

        let edited = &self.expenses[index];
        info!(index, expense = %edited, "expense edited");
        Ok(edited)
    }

    // ========================================================================
    // PERSISTENCE
    // ========================================================================

    /// Rewrite the whole storage file.
    ///
    /// Writes a sibling temp file and renames it over the target.
    pub fn save(&self) -> Result<()> {
        let bytes = encode(&self.expenses)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, bytes).map_err(|source| StoreError::Io {
            path: temp_path.clone(),
            source,
        })?;
        if let Err(source) = fs::rename(&temp_path, &self.path) {
            let _ = fs::remove_file(&temp_path);
            return Err(StoreError::Io {
                path: self.path.clone(),
                source,
            });
        }

        debug!("Saved {} expenses to {:?}", self.expenses.len(), self.path);
        Ok(())
    }
}

/// (category, count, total) per exact category label, in first-seen order
pub fn summarize_by_category(expenses: &[Expense]) -> Vec<(String, usize, f64)> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut summary: Vec<(String, usize, f64)> = Vec::new();

    for expense in expenses {
        match positions.get(expense.category.as_str()) {
            Some(&i) => {
                summary[i].1 += 1;
                summary[i].2 += expense.amount;
            }
            None => {
                positions.insert(expense.category.as_str(), summary.len());
                summary.push((expense.category.clone(), 1, expense.amount));
            }
        }
    }

    summary
}

/// JSON has no NaN or infinity; such an amount would not load back
fn check_amount(amount: f64) -> Result<()> {
    if amount.is_finite() {
        Ok(())
    } else {
        warn!(amount, "refusing non-finite amount");
        Err(StoreError::InvalidAmount { amount })
    }
}

/// Pretty JSON with 4-space indentation, like earlier versions wrote
fn encode(expenses: &[Expense]) -> Result<Vec<u8>> {
    let mut bytes = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut bytes, formatter);
    expenses.serialize(&mut serializer)?;
    Ok(bytes)
}

fn load_expenses(path: &Path) -> Result<Vec<Expense>> {
    if !path.exists() {
        debug!("No storage file at {:?}, starting empty", path);
        return Ok(Vec::new());
    }

    let text = fs::read_to_string(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let value: serde_json::Value =
        serde_json::from_str(&text).map_err(|source| StoreError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    let malformed = |source: StoreError| StoreError::MalformedStorage {
        path: path.to_path_buf(),
        source: Box::new(source),
    };

    let entries = match value {
        serde_json::Value::Array(entries) => entries,
        other => return Err(malformed(StoreError::NotAList { found: kind_of(&other) })),
    };

    let expenses = entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| Expense::from_value(index, entry))
        .collect::<Result<Vec<_>>>()
        .map_err(malformed)?;

    debug!("Loaded {} expenses from {:?}", expenses.len(), path);
    Ok(expenses)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("expenses.json");
        (dir, path)
    }

    fn coffee() -> Expense {
        Expense::new("Coffee", 4.50, "Food", "2024-01-01")
    }

    fn bus() -> Expense {
        Expense::new("Bus", 2.00, "Transport", "2024-01-02")
    }

    #[test]
    fn test_missing_file_is_empty_store() {
        let (_dir, path) = setup();
        let store = ExpenseStore::open(&path).unwrap();

        assert!(store.is_empty());
        assert!(store.list().is_empty());
        assert!(!path.exists(), "opening must not create the file");
    }

    #[test]
    fn test_round_trip_preserves_order() {
        let (_dir, path) = setup();
        let expected = vec![
            coffee(),
            bus(),
            Expense::new("Lunch", 12.25, "Food", "2024-01-03"),
            Expense::new("Refund", -5.0, "Misc", "not a date"),
        ];

        let mut store = ExpenseStore::open(&path).unwrap();
        for expense in expected.clone() {
            store.add(expense).unwrap();
        }

        let reopened = ExpenseStore::open(&path).unwrap();
        assert_eq!(reopened.list(), expected.as_slice());
    }

    #[test]
    fn test_add_then_fresh_load_appends_at_end() {
        let (_dir, path) = setup();
        let mut store = ExpenseStore::open(&path).unwrap();
        store.add(coffee()).unwrap();

        let added = store.add(bus()).unwrap();
        assert_eq!(added.description, "Bus");
        assert_eq!(added.category, "Transport");

        let fresh = ExpenseStore::open(&path).unwrap();
        assert_eq!(fresh.len(), 2);
        assert_eq!(fresh.list()[1], bus());
    }

    #[test]
    fn test_delete_then_load() {
        let (_dir, path) = setup();
        let mut store = ExpenseStore::open(&path).unwrap();
        let lunch = Expense::new("Lunch", 12.0, "Food", "2024-01-03");
        for e in [coffee(), bus(), lunch.clone()] {
            store.add(e).unwrap();
        }

        let removed = store.delete(1).unwrap();
        assert_eq!(removed, bus());

        let fresh = ExpenseStore::open(&path).unwrap();
        assert_eq!(fresh.list(), &[coffee(), lunch]);
    }

    #[test]
    fn test_out_of_range_leaves_store_unchanged() {
        let (_dir, path) = setup();
        let mut store = ExpenseStore::open(&path).unwrap();
        store.add(coffee()).unwrap();
        store.add(bus()).unwrap();
        let before = fs::read_to_string(&path).unwrap();

        // number 0 is index -1
        let err = store.resolve_number(0).unwrap_err();
        assert!(matches!(err, StoreError::OutOfRange { index: -1, len: 2 }));
        assert!(err.is_recoverable());

        let err = store.delete(store.len()).unwrap_err();
        assert!(matches!(err, StoreError::OutOfRange { index: 2, len: 2 }));

        let err = store
            .edit(2, ExpenseUpdate { amount: Some(1.0), ..Default::default() })
            .unwrap_err();
        assert!(matches!(err, StoreError::OutOfRange { .. }));

        assert_eq!(store.list(), &[coffee(), bus()]);
        assert_eq!(fs::read_to_string(&path).unwrap(), before);
    }

    #[test]
    fn test_resolve_number_is_one_based() {
        let (_dir, path) = setup();
        let mut store = ExpenseStore::open(&path).unwrap();
        store.add(coffee()).unwrap();
        store.add(bus()).unwrap();

        assert_eq!(store.resolve_number(1).unwrap(), 0);
        assert_eq!(store.resolve_number(2).unwrap(), 1);
        assert!(store.resolve_number(3).is_err());
        assert!(store.resolve_number(-7).is_err());
    }

    #[test]
    fn test_resolve_number_lowest_i64() {
        let (_dir, path) = setup();
        let mut store = ExpenseStore::open(&path).unwrap();
        store.add(coffee()).unwrap();

        let err = store.resolve_number(i64::MIN).unwrap_err();
        assert!(matches!(err, StoreError::OutOfRange { index: i64::MIN, len: 1 }));
        assert!(store.resolve_number(i64::MAX).is_err());
    }

    #[test]
    fn test_non_finite_amounts_are_refused() {
        let (_dir, path) = setup();
        let mut store = ExpenseStore::open(&path).unwrap();
        store.add(coffee()).unwrap();
        let before = fs::read_to_string(&path).unwrap();

        for amount in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = store
                .add(Expense::new("Broken", amount, "Food", "2024-01-02"))
                .unwrap_err();
            assert!(matches!(err, StoreError::InvalidAmount { .. }));

            let err = store
                .edit(0, ExpenseUpdate { amount: Some(amount), ..Default::default() })
                .unwrap_err();
            assert!(matches!(err, StoreError::InvalidAmount { .. }));
        }

        assert_eq!(store.list(), &[coffee()]);
        assert_eq!(fs::read_to_string(&path).unwrap(), before);
        assert_eq!(ExpenseStore::open(&path).unwrap().list(), &[coffee()]);
    }

    #[test]
    fn test_summarize_by_category_counts() {
        let expenses = vec![
            coffee(),
            bus(),
            Expense::new("Lunch", 12.0, "Food", "2024-01-03"),
        ];

        assert_eq!(
            summarize_by_category(&expenses),
            vec![("Food".to_string(), 2, 16.5), ("Transport".to_string(), 1, 2.0)]
        );
        assert!(summarize_by_category(&[]).is_empty());
    }

    #[test]
    fn test_search() {
        let (_dir, path) = setup();
        let mut store = ExpenseStore::open(&path).unwrap();
        let lunch = Expense::new("Team lunch", 30.0, "food", "2024-01-03");
        for e in [coffee(), bus(), lunch.clone()] {
            store.add(e).unwrap();
        }

        let hits: Vec<Expense> = store.search("FOOD").into_iter().cloned().collect();
        assert_eq!(hits, vec![coffee(), lunch]);

        // matches description
        assert_eq!(store.search("bu").len(), 1);

        // empty keyword returns everything, in order
        let all: Vec<Expense> = store.search("").into_iter().cloned().collect();
        assert_eq!(all, store.list());

        assert!(store.search("rent").is_empty());
    }

    #[test]
    fn test_queries_are_idempotent() {
        let (_dir, path) = setup();
        let mut store = ExpenseStore::open(&path).unwrap();
        store.add(coffee()).unwrap();
        store.add(bus()).unwrap();

        assert_eq!(store.list().to_vec(), store.list().to_vec());
        assert_eq!(store.search("o"), store.search("o"));
        assert_eq!(store.total(), store.total());
        assert_eq!(store.total_by_category(), store.total_by_category());
    }

    #[test]
    fn test_total_by_category_partitions_total() {
        let (_dir, path) = setup();
        let mut store = ExpenseStore::open(&path).unwrap();
        for e in [
            Expense::new("Rent", 900.10, "Housing", "2024-01-01"),
            Expense::new("Coffee", 3.30, "Food", "2024-01-02"),
            Expense::new("Snack", 1.15, "food", "2024-01-02"),
            Expense::new("Dinner", 22.40, "Food", "2024-01-03"),
        ] {
            store.add(e).unwrap();
        }

        let by_category = store.total_by_category();
        let names: Vec<&str> = by_category.iter().map(|(c, _)| c.as_str()).collect();
        assert_eq!(names, vec!["Housing", "Food", "food"]);

        let sum: f64 = by_category.iter().map(|(_, t)| t).sum();
        assert!((sum - store.total()).abs() < 1e-9);
    }

    #[test]
    fn test_empty_store_totals() {
        let (_dir, path) = setup();
        let store = ExpenseStore::open(&path).unwrap();

        assert_eq!(store.total(), 0.0);
        assert!(store.total_by_category().is_empty());
    }

    #[test]
    fn test_coffee_and_bus_scenario() {
        let (_dir, path) = setup();
        let mut store = ExpenseStore::open(&path).unwrap();

        store.add(coffee()).unwrap();
        store.add(bus()).unwrap();

        assert_eq!(format!("{:.2}", store.total()), "6.50");
        assert_eq!(
            store.total_by_category(),
            vec![("Food".to_string(), 4.50), ("Transport".to_string(), 2.00)]
        );

        store.delete(0).unwrap();
        assert_eq!(store.list(), &[bus()]);

        store
            .edit(0, ExpenseUpdate { amount: Some(3.00), ..Default::default() })
            .unwrap();

        let edited = &store.list()[0];
        assert_eq!(edited.amount, 3.00);
        assert_eq!(edited.description, "Bus");
        assert_eq!(edited.category, "Transport");
        assert_eq!(edited.date, "2024-01-02");

        let fresh = ExpenseStore::open(&path).unwrap();
        assert_eq!(fresh.list(), store.list());
    }

    #[test]
    fn test_edit_can_set_zero_amount() {
        let (_dir, path) = setup();
        let mut store = ExpenseStore::open(&path).unwrap();
        store.add(coffee()).unwrap();

        store
            .edit(0, ExpenseUpdate { amount: Some(0.0), ..Default::default() })
            .unwrap();

        let fresh = ExpenseStore::open(&path).unwrap();
        assert_eq!(fresh.list()[0].amount, 0.0);
    }

    #[test]
    fn test_ids_survive_shifts() {
        let (_dir, path) = setup();
        let mut store = ExpenseStore::open(&path).unwrap();
        store.add(coffee()).unwrap();
        let bus_id = store.add(bus()).unwrap().id();

        assert_eq!(store.position_of(bus_id), Some(1));
        store.delete(0).unwrap();
        assert_eq!(store.position_of(bus_id), Some(0));
        assert_eq!(store.position_of(Uuid::new_v4()), None);
    }

    #[test]
    fn test_file_format() {
        let (_dir, path) = setup();
        let mut store = ExpenseStore::open(&path).unwrap();
        store.add(coffee()).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("[\n    {\n        \"description\": \"Coffee\""));

        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        let entry = value[0].as_object().unwrap();
        assert_eq!(entry.len(), 4);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_loads_older_output() {
        let (_dir, path) = setup();
        fs::write(
            &path,
            r#"[
    {
        "description": "Coffee",
        "amount": 4.5,
        "category": "Food",
        "date": "2024-01-01"
    },
    {
        "description": "Bus",
        "amount": 2,
        "category": "Transport",
        "date": "2024-01-02"
    }
]"#,
        )
        .unwrap();

        let store = ExpenseStore::open(&path).unwrap();
        assert_eq!(store.list(), &[coffee(), bus()]);
    }

    #[test]
    fn test_malformed_entry_is_fatal() {
        let (_dir, path) = setup();
        fs::write(
            &path,
            r#"[{"description": "Coffee", "amount": 4.5, "category": "Food", "date": "2024-01-01"},
                {"description": "Bus", "amount": 2.0, "category": "Transport"}]"#,
        )
        .unwrap();

        let err = ExpenseStore::open(&path).err().unwrap();
        let message = err.to_string();
        assert!(matches!(err, StoreError::MalformedStorage { .. }));
        assert!(message.contains("entry 1"), "message was: {}", message);
        assert!(message.contains("date"), "message was: {}", message);
    }

    #[test]
    fn test_unparseable_file_is_fatal() {
        let (_dir, path) = setup();
        fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            ExpenseStore::open(&path),
            Err(StoreError::Parse { .. })
        ));

        fs::write(&path, r#"{"description": "Coffee"}"#).unwrap();
        assert!(matches!(
            ExpenseStore::open(&path),
            Err(StoreError::MalformedStorage { .. })
        ));
    }

    #[test]
    fn test_failed_save_rolls_back() {
        let dir = TempDir::new().unwrap();
        // A directory where the file should be makes the rename fail
        let path = dir.path().join("expenses.json");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), "x").unwrap();

        let mut store = ExpenseStore {
            path: path.clone(),
            expenses: vec![coffee()],
        };

        assert!(matches!(store.add(bus()), Err(StoreError::Io { .. })));
        assert_eq!(store.list(), &[coffee()]);

        assert!(store.delete(0).is_err());
        assert_eq!(store.list(), &[coffee()]);

        assert!(store
            .edit(0, ExpenseUpdate { description: Some("Tea".into()), ..Default::default() })
            .is_err());
        assert_eq!(store.list(), &[coffee()]);

        // no temp file left beside the target
        assert!(!dir.path().join("expenses.json.tmp").exists());
    }

    #[test]
    fn test_reload_picks_up_external_changes() {
        let (_dir, path) = setup();
        let mut first = ExpenseStore::open(&path).unwrap();
        let mut second = ExpenseStore::open(&path).unwrap();

        first.add(coffee()).unwrap();
        assert!(second.is_empty());

        second.reload().unwrap();
        assert_eq!(second.list(), &[coffee()]);
    }

    #[test]
    fn test_creates_missing_parent_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("expenses.json");

        let mut store = ExpenseStore::open(&path).unwrap();
        store.add(coffee()).unwrap();
        assert!(path.exists());
    }
}
