// 🖨️ Plain-text report - the table and chart without a terminal UI
//
// Used by the `report` subcommand. Same derived views as the interactive
// screen: the table honours the filters, the chart always covers everything.

use crate::aggregate::{aggregate, CategoryTotal};
use crate::expense::Expense;
use crate::filter::{filter_expenses, FilterCriteria};
use crate::tracker::{format_amount, table_row, CHART_TITLE};

const BAR_WIDTH: usize = 30;

pub fn render_report(expenses: &[Expense], criteria: &FilterCriteria) -> String {
    let visible = filter_expenses(expenses, criteria);
    let totals = aggregate(expenses);

    let mut out = String::new();
    out.push_str("Expenses\n");
    out.push_str(&render_table(&visible));
    out.push('\n');
    out.push_str(&render_chart(&totals, BAR_WIDTH));
    out
}

pub fn render_table(expenses: &[Expense]) -> String {
    let mut out = String::from("Amount | Category | Date\n");
    out.push_str(&"-".repeat(24));
    out.push('\n');

    if expenses.is_empty() {
        out.push_str("(no expenses)\n");
        return out;
    }

    for expense in expenses {
        out.push_str(&table_row(expense).join(" | "));
        out.push('\n');
    }

    out
}

pub fn render_chart(totals: &[CategoryTotal], width: usize) -> String {
    let max = totals.iter().map(|t| t.total).fold(0.0_f64, f64::max);

    let mut out = format!("{}\n", CHART_TITLE);
    for t in totals {
        out.push_str(&format!(
            "{:<13} {} {}\n",
            t.category.as_str(),
            ascii_bar(t.total, max, width),
            format_amount(t.total)
        ));
    }
    out
}

/// `████████░░░░` style bar for `value` relative to `max`.
pub fn ascii_bar(value: f64, max: f64, width: usize) -> String {
    if max <= 0.0 {
        return "░".repeat(width);
    }

    let ratio = (value / max).clamp(0.0, 1.0);
    let filled = ((ratio * width as f64).round() as usize).min(width);
    let empty = width.saturating_sub(filled);

    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}
