// ✅ Validation - turning a raw draft into an Expense
//
// The entry form edits a DraftExpense (raw text, no checks at keystroke time).
// Only on submit is the draft validated; the user sees a single notice no
// matter which check failed, the detailed reason goes to the log.

use crate::expense::{parse_date, Category, Expense};
use thiserror::Error;

/// The one user-facing message for every rejected submission.
pub const INVALID_DETAILS_NOTICE: &str = "Please enter valid details.";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("amount is required")]
    MissingAmount,

    #[error("amount {0:?} is not a number")]
    InvalidAmount(String),

    #[error("amount must be greater than zero (got {0})")]
    NonPositiveAmount(f64),

    #[error("category is required")]
    MissingCategory,

    #[error("unknown category {0:?}")]
    UnknownCategory(String),

    #[error("date is required")]
    MissingDate,

    #[error("date {0:?} is not a YYYY-MM-DD calendar date")]
    InvalidDate(String),
}

// ============================================================================
// DRAFT EXPENSE
// ============================================================================

/// Staging record for the entry form, mirroring Expense as raw text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftExpense {
    pub amount: String,
    pub category: String,
    pub date: String,
}

/// Which draft field an edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftField {
    Amount,
    Category,
    Date,
}

impl DraftExpense {
    pub fn field(&self, field: DraftField) -> &str {
        match field {
            DraftField::Amount => &self.amount,
            DraftField::Category => &self.category,
            DraftField::Date => &self.date,
        }
    }

    pub fn set(&mut self, field: DraftField, value: impl Into<String>) {
        let value = value.into();
        match field {
            DraftField::Amount => self.amount = value,
            DraftField::Category => self.category = value,
            DraftField::Date => self.date = value,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.amount.is_empty() && self.category.is_empty() && self.date.is_empty()
    }

    /// Back to the empty state shown after a successful submission.
    pub fn reset(&mut self) {
        *self = DraftExpense::default();
    }

    /// Validate the draft without consuming or modifying it.
    pub fn validate(&self) -> Result<Expense, ValidationError> {
        let amount = parse_amount(&self.amount)?;
        let category: Category = self.category.parse()?;
        let date = parse_required_date(&self.date)?;

        Expense::new(amount, category, date)
    }
}

fn parse_amount(raw: &str) -> Result<f64, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingAmount);
    }

    let amount: f64 = trimmed
        .parse()
        .map_err(|_| ValidationError::InvalidAmount(trimmed.to_string()))?;

    if !amount.is_finite() {
        return Err(ValidationError::InvalidAmount(trimmed.to_string()));
    }
    if amount <= 0.0 {
        return Err(ValidationError::NonPositiveAmount(amount));
    }

    Ok(amount)
}

fn parse_required_date(raw: &str) -> Result<chrono::NaiveDate, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingDate);
    }

    parse_date(trimmed).ok_or_else(|| ValidationError::InvalidDate(trimmed.to_string()))
}

// ============================================================================
// TESTS
// ============================================================================
