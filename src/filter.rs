// 🔍 Filter Engine - which expenses the table shows
//
// Filtering only narrows the table; the chart always aggregates the full
// collection.

use crate::expense::{parse_date, Category, Expense};
use chrono::NaiveDate;

/// Constraints on the visible expenses. `None` means "no constraint".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub category: Option<Category>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl FilterCriteria {
    pub fn is_empty(&self) -> bool {
        self.category.is_none() && self.start_date.is_none() && self.end_date.is_none()
    }

    /// Both date bounds are inclusive.
    pub fn matches(&self, expense: &Expense) -> bool {
        let matches_category = self
            .category
            .map_or(true, |category| expense.category() == category);

        let matches_start_date = self
            .start_date
            .map_or(true, |start| expense.date() >= start);

        let matches_end_date = self.end_date.map_or(true, |end| expense.date() <= end);

        matches_category && matches_start_date && matches_end_date
    }
}

/// Ordered subsequence of `expenses` matching `criteria`.
pub fn filter_expenses(expenses: &[Expense], criteria: &FilterCriteria) -> Vec<Expense> {
    expenses
        .iter()
        .filter(|expense| criteria.matches(expense))
        .copied()
        .collect()
}

// ============================================================================
// FILTER INPUTS (raw filter panel state)
// ============================================================================

/// Which filter panel field an edit targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    StartDate,
    EndDate,
}

/// Filter panel as the user sees it: a category selector and two date texts.
///
/// Date texts that do not parse as `YYYY-MM-DD` leave that bound open; the UI
/// uses `start_date_is_valid` / `end_date_is_valid` to flag them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterInputs {
    pub category: Option<Category>,
    pub start_date: String,
    pub end_date: String,
}

impl FilterInputs {
    pub fn criteria(&self) -> FilterCriteria {
        FilterCriteria {
            category: self.category,
            start_date: parse_date(&self.start_date),
            end_date: parse_date(&self.end_date),
        }
    }

    pub fn field(&self, field: FilterField) -> &str {
        match field {
            FilterField::StartDate => &self.start_date,
            FilterField::EndDate => &self.end_date,
        }
    }

    pub fn set(&mut self, field: FilterField, value: impl Into<String>) {
        let value = value.into();
        match field {
            FilterField::StartDate => self.start_date = value,
            FilterField::EndDate => self.end_date = value,
        }
    }

    pub fn is_valid(&self, field: FilterField) -> bool {
        let raw = self.field(field);
        raw.trim().is_empty() || parse_date(raw).is_some()
    }

    pub fn clear(&mut self) {
        *self = FilterInputs::default();
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    fn expense(amount: f64, category: Category, d: &str) -> Expense {
        Expense::new(amount, category, date(d)).unwrap()
    }

    fn sample() -> Vec<Expense> {
        vec![
            expense(30.0, Category::Food, "2024-01-01"),
            expense(20.0, Category::Transport, "2024-02-01"),
            expense(12.0, Category::Food, "2024-02-15"),
            expense(80.0, Category::Utilities, "2024-03-01"),
        ]
    }

    #[test]
    fn test_empty_criteria_returns_everything() {
        let expenses = sample();
        let criteria = FilterCriteria::default();

        assert!(criteria.is_empty());
        assert_eq!(filter_expenses(&expenses, &criteria), expenses);
    }

    #[test]
    fn test_category_filter_preserves_order() {
        let expenses = sample();
        let criteria = FilterCriteria {
            category: Some(Category::Food),
            ..Default::default()
        };

        let result = filter_expenses(&expenses, &criteria);
        assert_eq!(result, vec![expenses[0], expenses[2]]);
    }

    #[test]
    fn test_start_date_filter() {
        let expenses = vec![
            expense(30.0, Category::Food, "2024-01-01"),
            expense(20.0, Category::Transport, "2024-02-01"),
        ];
        let criteria = FilterCriteria {
            start_date: Some(date("2024-01-15")),
            ..Default::default()
        };

        let result = filter_expenses(&expenses, &criteria);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].category(), Category::Transport);
    }

    #[test]
    fn test_date_bounds_are_inclusive() {
        let expenses = sample();
        let criteria = FilterCriteria {
            category: None,
            start_date: Some(date("2024-02-01")),
            end_date: Some(date("2024-03-01")),
        };

        let result = filter_expenses(&expenses, &criteria);
        assert_eq!(result, vec![expenses[1], expenses[2], expenses[3]]);
    }

    #[test]
    fn test_all_constraints_combined() {
        let expenses = sample();
        let criteria = FilterCriteria {
            category: Some(Category::Food),
            start_date: Some(date("2024-02-01")),
            end_date: Some(date("2024-02-28")),
        };

        assert_eq!(filter_expenses(&expenses, &criteria), vec![expenses[2]]);
    }

    #[test]
    fn test_inverted_range_is_empty() {
        let criteria = FilterCriteria {
            category: None,
            start_date: Some(date("2024-03-01")),
            end_date: Some(date("2024-01-01")),
        };

        assert!(filter_expenses(&sample(), &criteria).is_empty());
    }

    #[test]
    fn test_filter_is_idempotent() {
        let expenses = sample();
        let criteria_set = [
            FilterCriteria::default(),
            FilterCriteria {
                category: Some(Category::Food),
                ..Default::default()
            },
            FilterCriteria {
                category: None,
                start_date: Some(date("2024-01-15")),
                end_date: Some(date("2024-02-20")),
            },
        ];

        for criteria in &criteria_set {
            let once = filter_expenses(&expenses, criteria);
            let twice = filter_expenses(&once, criteria);
            assert_eq!(once, twice);
        }
    }

    #[test]
    fn test_inputs_to_criteria() {
        let inputs = FilterInputs {
            category: Some(Category::Transport),
            start_date: "2024-01-15".to_string(),
            end_date: String::new(),
        };

        let criteria = inputs.criteria();
        assert_eq!(criteria.category, Some(Category::Transport));
        assert_eq!(criteria.start_date, Some(date("2024-01-15")));
        assert_eq!(criteria.end_date, None);
    }

    #[test]
    fn test_malformed_input_dates_leave_bound_open() {
        let mut inputs = FilterInputs::default();
        inputs.set(FilterField::StartDate, "2024-01");
        inputs.set(FilterField::EndDate, "2024-12-31");

        assert!(!inputs.is_valid(FilterField::StartDate));
        assert!(inputs.is_valid(FilterField::EndDate));
        assert_eq!(inputs.criteria().start_date, None);
        assert_eq!(inputs.criteria().end_date, Some(date("2024-12-31")));

        inputs.clear();
        assert!(inputs.criteria().is_empty());
    }
}
