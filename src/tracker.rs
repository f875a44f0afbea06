// 🧭 Tracker - the presentation state machine, without any terminal code
//
// Holds the two pieces of mutable UI state (the draft entry and the filter
// panel) next to the repository, and keeps the derived views (visible table
// rows and per-category totals) in sync: every action ends with `refresh()`,
// so whatever gets drawn next is always consistent with the repository.

use crate::aggregate::{aggregate, CategoryTotal};
use crate::expense::{Category, Expense};
use crate::filter::{filter_expenses, FilterField, FilterInputs};
use crate::repository::ExpenseRepository;
use crate::store::PersistentStore;
use crate::validation::{DraftExpense, DraftField, ValidationError, INVALID_DETAILS_NOTICE};
use tracing::{debug, info};

pub const CHART_TITLE: &str = "Spending by Category";
pub const CATEGORY_PLACEHOLDER: &str = "Select Category";
pub const ALL_CATEGORIES: &str = "All Categories";

/// Every user-triggered state change.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    EditDraft(DraftField, String),
    SetFilterCategory(Option<Category>),
    EditFilter(FilterField, String),
    ClearFilters,
    Submit,
    DismissNotice,
}

pub struct Tracker<S: PersistentStore> {
    repository: ExpenseRepository<S>,
    draft: DraftExpense,
    filters: FilterInputs,
    notice: Option<&'static str>,
    visible: Vec<Expense>,
    totals: Vec<CategoryTotal>,
}

impl<S: PersistentStore> Tracker<S> {
    pub fn new(repository: ExpenseRepository<S>) -> Self {
        let mut tracker = Tracker {
            repository,
            draft: DraftExpense::default(),
            filters: FilterInputs::default(),
            notice: None,
            visible: Vec::new(),
            totals: Vec::new(),
        };
        tracker.refresh();
        tracker
    }

    pub fn apply(&mut self, action: Action) {
        match action {
            Action::EditDraft(field, value) => self.draft.set(field, value),
            Action::SetFilterCategory(category) => self.filters.category = category,
            Action::EditFilter(field, value) => self.filters.set(field, value),
            Action::ClearFilters => self.filters.clear(),
            Action::Submit => {
                // Rejections surface through `notice`
                let _ = self.submit();
                return;
            }
            Action::DismissNotice => self.notice = None,
        }

        self.refresh();
    }

    /// Validate the draft; on success record it and reset the draft, on
    /// failure raise the notice and keep the draft for correction.
    pub fn submit(&mut self) -> Result<Expense, ValidationError> {
        let result = self.draft.validate();

        match &result {
            Ok(expense) => {
                self.repository.add(*expense);
                self.draft.reset();
                self.notice = None;
                info!(
                    category = %expense.category(),
                    total = self.repository.len(),
                    "Expense recorded"
                );
            }
            Err(err) => {
                debug!(reason = %err, draft = ?self.draft, "Submission rejected");
                self.notice = Some(INVALID_DETAILS_NOTICE);
            }
        }

        self.refresh();
        result
    }

    /// Recompute the table rows and chart totals from current state.
    pub fn refresh(&mut self) {
        let criteria = self.filters.criteria();
        self.visible = filter_expenses(self.repository.expenses(), &criteria);
        self.totals = aggregate(self.repository.expenses());
    }

    pub fn draft(&self) -> &DraftExpense {
        &self.draft
    }

    pub fn filters(&self) -> &FilterInputs {
        &self.filters
    }

    pub fn notice(&self) -> Option<&'static str> {
        self.notice
    }

    pub fn repository(&self) -> &ExpenseRepository<S> {
        &self.repository
    }

    /// Expenses passing the current filters, in insertion order.
    pub fn visible_expenses(&self) -> &[Expense] {
        &self.visible
    }

    /// Totals over all expenses, filters ignored.
    pub fn category_totals(&self) -> &[CategoryTotal] {
        &self.totals
    }

    /// Table rows as displayed: `[Amount, Category, Date]`.
    pub fn table_rows(&self) -> Vec<[String; 3]> {
        self.visible.iter().map(table_row).collect()
    }
}

pub fn table_row(expense: &Expense) -> [String; 3] {
    [
        format_amount(expense.amount()),
        expense.category().to_string(),
        expense.date().to_string(),
    ]
}

/// `$` followed by the amount with two decimals, exact half-cent ties
/// rounded away from zero.
pub fn format_amount(amount: f64) -> String {
    // `{:.2}` breaks exact ties to even. Only multiples of 1/8 with an odd
    // numerator sit exactly on a half cent, and for those `amount * 100` is exact.
    let eighths = amount * 8.0;
    if eighths.is_finite() && eighths.fract() == 0.0 && eighths % 2.0 != 0.0 {
        return format!("${:.2}", (amount * 100.0).round() / 100.0);
    }

    format!("${:.2}", amount)
}

/// Step a category selector. `None` is the placeholder slot that sits before
/// the first category, so cycling visits it too.
pub fn cycle_category(current: Option<Category>, forward: bool) -> Option<Category> {
    let slots = Category::ALL.len() + 1;
    let position = current.map_or(0, |c| c.index() + 1);
    let next = if forward {
        (position + 1) % slots
    } else {
        (position + slots - 1) % slots
    };

    if next == 0 {
        None
    } else {
        Some(Category::ALL[next - 1])
    }
}

// ============================================================================
// TESTS
// ============================================================================
