// 📒 Expense Repository - the append-only collection and its persistence
//
// Hydrated once from the store, then every `add` rewrites the whole
// collection under the repository key. Reads and writes never fail loudly:
// a broken payload means "start empty", a failed write means "keep going
// with the in-memory state". Array elements that fail to decode are kept
// verbatim and written back after the valid ones, so a rewrite never erases
// them.

use crate::expense::Expense;
use crate::store::PersistentStore;
use tracing::{debug, info, warn};

/// Store key holding the serialized collection.
pub const DEFAULT_STORE_KEY: &str = "expenses";

pub struct ExpenseRepository<S: PersistentStore> {
    store: S,
    key: String,
    expenses: Vec<Expense>,
    unreadable: Vec<serde_json::Value>,
}

/// A decoded payload: the valid expenses plus the raw elements that were not.
#[derive(Debug, Default, PartialEq)]
pub struct DecodedCollection {
    pub expenses: Vec<Expense>,
    pub unreadable: Vec<serde_json::Value>,
}

impl<S: PersistentStore> ExpenseRepository<S> {
    /// Load the collection stored under the default key.
    pub fn load(store: S) -> Self {
        Self::load_with_key(store, DEFAULT_STORE_KEY)
    }

    pub fn load_with_key(store: S, key: &str) -> Self {
        let decoded = match store.read(key) {
            Ok(Some(payload)) => decode_payload(&payload),
            Ok(None) => {
                debug!(key, "No stored expenses, starting empty");
                DecodedCollection::default()
            }
            Err(err) => {
                warn!(key, error = %err, "Failed to read stored expenses, starting empty");
                DecodedCollection::default()
            }
        };

        info!(
            key,
            count = decoded.expenses.len(),
            unreadable = decoded.unreadable.len(),
            "Loaded expenses"
        );

        ExpenseRepository {
            store,
            key: key.to_string(),
            expenses: decoded.expenses,
            unreadable: decoded.unreadable,
        }
    }

    /// Append an already-validated expense and flush the full collection.
    pub fn add(&mut self, expense: Expense) {
        self.expenses.push(expense);
        debug!(
            amount = expense.amount(),
            category = %expense.category(),
            date = %expense.date(),
            "Expense added"
        );
        self.persist();
    }

    fn persist(&mut self) {
        let items: Result<Vec<serde_json::Value>, _> =
            self.expenses.iter().map(serde_json::to_value).collect();
        let payload = match items.and_then(|mut items| {
            items.extend(self.unreadable.iter().cloned());
            serde_json::to_string(&items)
        }) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(error = %err, "Failed to serialize expenses, not persisted");
                return;
            }
        };

        if let Err(err) = self.store.write(&self.key, &payload) {
            warn!(key = %self.key, error = %err, "Failed to persist expenses");
        }
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn len(&self) -> usize {
        self.expenses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expenses.is_empty()
    }

    /// Stored elements that could not be decoded, preserved across rewrites.
    pub fn unreadable(&self) -> &[serde_json::Value] {
        &self.unreadable
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}

/// Decode a stored payload into its valid expenses.
///
/// Anything that is not a JSON array yields an empty collection. Inside the
/// array, elements that are not valid expenses are skipped one by one so a
/// single bad record does not discard the rest.
pub fn decode_collection(payload: &str) -> Vec<Expense> {
    decode_payload(payload).expenses
}

/// Like [`decode_collection`], but hands back the skipped elements too.
pub fn decode_payload(payload: &str) -> DecodedCollection {
    let items: Vec<serde_json::Value> = match serde_json::from_str(payload) {
        Ok(items) => items,
        Err(err) => {
            warn!(error = %err, "Stored expenses are malformed, starting empty");
            return DecodedCollection::default();
        }
    };

    let mut decoded = DecodedCollection::default();
    for (index, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<Expense>(item.clone()) {
            Ok(expense) => decoded.expenses.push(expense),
            Err(err) => {
                warn!(index, error = %err, "Skipping invalid stored expense");
                decoded.unreadable.push(item);
            }
        }
    }

    if !decoded.unreadable.is_empty() {
        warn!(
            kept = decoded.expenses.len(),
            skipped = decoded.unreadable.len(),
            "Some stored expenses were skipped"
        );
    }

    decoded
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expense::{parse_date, Category};
    use crate::store::{MemoryStore, SqliteStore};
    use anyhow::anyhow;

    fn expense(amount: f64, category: Category, date: &str) -> Expense {
        Expense::new(amount, category, parse_date(date).unwrap()).unwrap()
    }

    /// Store whose reads and writes always fail.
    struct BrokenStore;

    impl PersistentStore for BrokenStore {
        fn read(&self, _key: &str) -> anyhow::Result<Option<String>> {
            Err(anyhow!("disk on fire"))
        }

        fn write(&mut self, _key: &str, _value: &str) -> anyhow::Result<()> {
            Err(anyhow!("disk on fire"))
        }
    }

    #[test]
    fn test_load_missing_key_is_empty() {
        let repo = ExpenseRepository::load(MemoryStore::new());

        assert!(repo.is_empty());
        assert_eq!(repo.key(), "expenses");
    }

    #[test]
    fn test_load_malformed_payload_is_empty() {
        for payload in ["not json", "{\"amount\": 5}", "42", ""] {
            let repo = ExpenseRepository::load(MemoryStore::with_entry("expenses", payload));
            assert!(repo.is_empty(), "payload {:?} should load empty", payload);
        }
    }

    #[test]
    fn test_load_skips_invalid_records() {
        let payload = r#"[
            {"amount": 30, "category": "Food", "date": "2024-01-01"},
            {"amount": -1, "category": "Food", "date": "2024-01-02"},
            {"amount": 5, "category": "Rent", "date": "2024-01-03"},
            {"amount": 20, "category": "Transport", "date": "2024-02-01"}
        ]"#;

        let repo = ExpenseRepository::load(MemoryStore::with_entry("expenses", payload));

        assert_eq!(
            repo.expenses(),
            &[
                expense(30.0, Category::Food, "2024-01-01"),
                expense(20.0, Category::Transport, "2024-02-01"),
            ]
        );
    }

    #[test]
    fn test_add_keeps_unreadable_records_in_store() {
        let payload = r#"[
            {"amount": 30, "category": "Food", "date": "2024-01-01"},
            {"amount": 5, "category": "Rent", "date": "2024-01-03"}
        ]"#;
        let mut repo = ExpenseRepository::load(MemoryStore::with_entry("expenses", payload));
        assert_eq!(repo.len(), 1);
        assert_eq!(repo.unreadable().len(), 1);

        repo.add(expense(20.0, Category::Transport, "2024-02-01"));

        let stored = repo.store().read("expenses").unwrap().unwrap();
        let decoded = decode_payload(&stored);
        assert_eq!(decoded.expenses, repo.expenses());
        assert_eq!(
            decoded.unreadable,
            vec![serde_json::json!({"amount": 5, "category": "Rent", "date": "2024-01-03"})]
        );

        // Survives a second rewrite as well
        let mut reloaded = ExpenseRepository::load(MemoryStore::with_entry("expenses", &stored));
        reloaded.add(expense(1.0, Category::Other, "2024-03-01"));
        let stored = reloaded.store().read("expenses").unwrap().unwrap();
        assert_eq!(decode_payload(&stored).unreadable.len(), 1);
        assert_eq!(decode_collection(&stored).len(), 3);
    }

    #[test]
    fn test_add_appends_and_persists() {
        let mut repo = ExpenseRepository::load(MemoryStore::new());

        repo.add(expense(30.0, Category::Food, "2024-01-01"));
        repo.add(expense(20.0, Category::Transport, "2024-02-01"));

        assert_eq!(repo.len(), 2);
        assert_eq!(repo.expenses()[1].category(), Category::Transport);

        let stored = repo.store().read("expenses").unwrap().unwrap();
        assert_eq!(decode_collection(&stored), repo.expenses());
    }

    #[test]
    fn test_round_trip_preserves_order() {
        let mut repo = ExpenseRepository::load(MemoryStore::new());
        let originals = vec![
            expense(12.34, Category::Utilities, "2024-03-10"),
            expense(0.01, Category::Other, "2023-12-31"),
            expense(999.99, Category::Entertainment, "2024-03-10"),
        ];
        for e in &originals {
            repo.add(*e);
        }

        let stored = repo.store().read("expenses").unwrap().unwrap();
        let reloaded = ExpenseRepository::load(MemoryStore::with_entry("expenses", &stored));

        assert_eq!(reloaded.expenses(), originals.as_slice());
    }

    #[test]
    fn test_custom_key() {
        let mut repo = ExpenseRepository::load_with_key(MemoryStore::new(), "household");
        repo.add(expense(5.0, Category::Food, "2024-01-01"));

        assert!(repo.store().read("expenses").unwrap().is_none());
        assert!(repo.store().read("household").unwrap().is_some());
    }

    #[test]
    fn test_broken_store_keeps_in_memory_state() {
        let mut repo = ExpenseRepository::load(BrokenStore);
        assert!(repo.is_empty());

        repo.add(expense(5.0, Category::Food, "2024-01-01"));
        repo.add(expense(6.0, Category::Food, "2024-01-02"));

        assert_eq!(repo.len(), 2);
    }

    #[test]
    fn test_restart_reloads_without_duplication() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("expenses.db");

        {
            let mut repo = ExpenseRepository::load(SqliteStore::open(&path).unwrap());
            repo.add(expense(30.0, Category::Food, "2024-01-01"));
            repo.add(expense(20.0, Category::Transport, "2024-02-01"));
            repo.add(expense(15.5, Category::Utilities, "2024-02-15"));
        }

        let repo = ExpenseRepository::load(SqliteStore::open(&path).unwrap());
        assert_eq!(repo.len(), 3);
        assert_eq!(repo.expenses()[2].amount(), 15.5);

        let again = ExpenseRepository::load(SqliteStore::open(&path).unwrap());
        assert_eq!(again.expenses(), repo.expenses());

        println!("✅ Restart test PASSED: 3 expenses reloaded, no duplicates");
    }
}
