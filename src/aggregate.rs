// 📊 Aggregator - spending per category over the whole collection

use crate::expense::{Category, Expense};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CategoryTotal {
    pub category: Category,
    pub total: f64,
}

/// One total per category, in `Category::ALL` order, zeros included.
pub fn aggregate(expenses: &[Expense]) -> Vec<CategoryTotal> {
    let mut totals = vec![0.0_f64; Category::ALL.len()];

    for expense in expenses {
        totals[expense.category().index()] += expense.amount();
    }

    Category::ALL
        .iter()
        .zip(totals)
        .map(|(&category, total)| CategoryTotal { category, total })
        .collect()
}

pub fn grand_total(totals: &[CategoryTotal]) -> f64 {
    totals.iter().map(|t| t.total).sum()
}
