//! Expense records and the period, aggregation, and rate-request logic built on them.

pub mod aggregate;
pub mod period;
pub mod rates;
pub mod record;

pub use aggregate::{period_totals, select_current_period, select_in_period};
pub use period::{compute_bounds, month_label, PeriodBoundary, PeriodStartDay};
pub use rates::{day_key, extract_request, RateRequest, RateTable};
pub use record::{date_input_with_time, parse_date_input, parse_expense_date, ExpenseRecord};
