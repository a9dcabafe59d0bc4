use chrono::{NaiveDate, TimeZone};

use crate::currency::{CurrencyCode, CurrencyFormatter, CurrencyRegistry};
use crate::expense::{
    compute_bounds, extract_request, month_label, select_in_period, ExpenseRecord,
    PeriodBoundary, PeriodStartDay, RateRequest,
};

/// Immutable bundle of the viewer's display currency, reference date, and period start day.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewContext {
    pub currency: CurrencyCode,
    pub reference: NaiveDate,
    pub start_day: PeriodStartDay,
}

impl ViewContext {
    pub fn new(currency: CurrencyCode, reference: NaiveDate, start_day: PeriodStartDay) -> Self {
        Self {
            currency,
            reference,
            start_day,
        }
    }

    /// Same preferences anchored at another date.
    pub fn at(&self, reference: NaiveDate) -> Self {
        Self {
            reference,
            ..self.clone()
        }
    }

    pub fn bounds(&self) -> PeriodBoundary {
        compute_bounds(self.reference, self.start_day)
    }

    pub fn label(&self) -> String {
        month_label(self.reference)
    }

    pub fn current_expenses<'a, Tz: TimeZone>(
        &self,
        expenses: &'a [ExpenseRecord],
        tz: &Tz,
    ) -> Vec<&'a ExpenseRecord> {
        select_in_period(expenses, &self.bounds(), tz)
    }

    pub fn rate_request(&self, expenses: &[ExpenseRecord]) -> RateRequest {
        extract_request(expenses, self.currency.as_str())
    }

    pub fn formatter<'a>(&'a self, registry: &'a CurrencyRegistry) -> CurrencyFormatter<'a> {
        CurrencyFormatter::new(registry, &self.currency)
    }
}
