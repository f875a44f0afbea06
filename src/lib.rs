// Budget Tracker - Core Library
// Exposes all modules for use in the terminal UI, the report mode, and tests

pub mod expense;
pub mod validation;
pub mod store;
pub mod repository;
pub mod filter;
pub mod aggregate;
pub mod tracker;
pub mod report;
pub mod config;
pub mod logging;

// Re-export commonly used types
pub use expense::{Category, Expense, parse_date, DATE_FORMAT};
pub use validation::{DraftExpense, DraftField, ValidationError, INVALID_DETAILS_NOTICE};
pub use store::{PersistentStore, SqliteStore, MemoryStore};
pub use repository::{ExpenseRepository, DEFAULT_STORE_KEY};
pub use filter::{FilterCriteria, FilterField, FilterInputs, filter_expenses};
pub use aggregate::{CategoryTotal, aggregate, grand_total};
pub use tracker::{Action, Tracker, format_amount};
pub use report::render_report;
pub use config::{Config, Mode};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
