use std::collections::BTreeMap;

use chrono::{NaiveDate, TimeZone};

use super::period::{compute_bounds, PeriodBoundary, PeriodStartDay};
use super::record::ExpenseRecord;
use crate::currency::CurrencyCode;

/// Expenses of the period containing `reference`, newest first.
pub fn select_current_period<'a, Tz: TimeZone>(
    expenses: &'a [ExpenseRecord],
    reference: NaiveDate,
    start_day: PeriodStartDay,
    tz: &Tz,
) -> Vec<&'a ExpenseRecord> {
    let bounds = compute_bounds(reference, start_day);
    select_in_period(expenses, &bounds, tz)
}

/// Expenses whose local wall-clock time lies inside `bounds`, newest first.
pub fn select_in_period<'a, Tz: TimeZone>(
    expenses: &'a [ExpenseRecord],
    bounds: &PeriodBoundary,
    tz: &Tz,
) -> Vec<&'a ExpenseRecord> {
    let mut selected: Vec<&ExpenseRecord> = expenses
        .iter()
        .filter(|expense| bounds.contains(expense.local_datetime(tz)))
        .collect();
    selected.sort_by(|a, b| b.date.cmp(&a.date));
    tracing::debug!(
        total = expenses.len(),
        selected = selected.len(),
        "filtered expenses to period"
    );
    selected
}

/// Sums amounts per currency. Records without a currency count toward `default_currency`.
pub fn period_totals(
    selection: &[&ExpenseRecord],
    default_currency: &CurrencyCode,
) -> BTreeMap<CurrencyCode, f64> {
    let mut totals = BTreeMap::new();
    for expense in selection {
        let code = expense
            .currency_code()
            .unwrap_or_else(|| default_currency.clone());
        *totals.entry(code).or_insert(0.0) += expense.amount;
    }
    totals
}
