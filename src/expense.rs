// 🧾 Expense - the one value type the tracker records
//
// An expense is a (amount, category, date) triple. It is created once from a
// validated draft (or decoded from persisted state) and never changes after.
//
// Persisted shape (one element of the "expenses" array):
//   {"amount": 50.0, "category": "Food", "date": "2024-01-05"}

use crate::validation::ValidationError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Date format used for storage, the date inputs and the table.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// ============================================================================
// CATEGORY
// ============================================================================

/// Fixed, closed set of spending categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Food,
    Transport,
    Entertainment,
    Utilities,
    Other,
}

impl Category {
    /// Every category, in display order (selectors, chart bars, aggregation).
    pub const ALL: [Category; 5] = [
        Category::Food,
        Category::Transport,
        Category::Entertainment,
        Category::Utilities,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Food => "Food",
            Category::Transport => "Transport",
            Category::Entertainment => "Entertainment",
            Category::Utilities => "Utilities",
            Category::Other => "Other",
        }
    }

    /// Position inside `Category::ALL`.
    pub fn index(&self) -> usize {
        match self {
            Category::Food => 0,
            Category::Transport => 1,
            Category::Entertainment => 2,
            Category::Utilities => 3,
            Category::Other => 4,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::MissingCategory);
        }

        Category::ALL
            .iter()
            .copied()
            .find(|c| c.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ValidationError::UnknownCategory(trimmed.to_string()))
    }
}

// ============================================================================
// EXPENSE
// ============================================================================

/// One recorded spending event.
///
/// Fields are private so the `amount > 0` invariant can only be established
/// through `Expense::new` (or the equivalent check during deserialization).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ExpenseRecord")]
pub struct Expense {
    amount: f64,
    category: Category,
    date: NaiveDate,
}

/// Unchecked wire shape, promoted to `Expense` through `TryFrom`.
#[derive(Deserialize)]
struct ExpenseRecord {
    amount: f64,
    category: Category,
    date: NaiveDate,
}

impl TryFrom<ExpenseRecord> for Expense {
    type Error = ValidationError;

    fn try_from(record: ExpenseRecord) -> Result<Self, Self::Error> {
        Expense::new(record.amount, record.category, record.date)
    }
}

impl Expense {
    /// Create an expense; the amount must be finite and strictly positive.
    pub fn new(amount: f64, category: Category, date: NaiveDate) -> Result<Self, ValidationError> {
        if !amount.is_finite() {
            return Err(ValidationError::InvalidAmount(amount.to_string()));
        }
        if amount <= 0.0 {
            return Err(ValidationError::NonPositiveAmount(amount));
        }

        Ok(Expense {
            amount,
            category,
            date,
        })
    }

    pub fn amount(&self) -> f64 {
        self.amount
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }
}

/// Parse a `YYYY-MM-DD` calendar date, ignoring surrounding whitespace.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok()
}

// ============================================================================
// TESTS
// ============================================================================
