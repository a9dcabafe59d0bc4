use chrono::{
    DateTime, Duration, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::currency::CurrencyCode;
use crate::errors::ExpenseError;

const DATE_INPUT_FORMAT: &str = "%Y-%m-%d";

/// A single spending entry as supplied by the storage layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExpenseRecord {
    pub id: String,
    #[serde(rename = "recurringID", default, skip_serializing_if = "String::is_empty")]
    pub recurring_id: String,
    pub name: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub category: String,
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    pub date: DateTime<FixedOffset>,
}

impl ExpenseRecord {
    pub fn new(
        name: impl Into<String>,
        category: impl Into<String>,
        amount: f64,
        currency: Option<&str>,
        date: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            recurring_id: String::new(),
            name: name.into(),
            tags: Vec::new(),
            category: category.into(),
            amount,
            currency: currency.map(str::to_string),
            date,
        }
    }

    /// Normalized source currency, `None` when absent or blank.
    pub fn currency_code(&self) -> Option<CurrencyCode> {
        self.currency
            .as_deref()
            .map(CurrencyCode::new)
            .filter(|code| !code.is_empty())
    }

    /// Wall-clock time of the expense in the viewer's zone.
    pub fn local_datetime<Tz: TimeZone>(&self, tz: &Tz) -> NaiveDateTime {
        self.date.with_timezone(tz).naive_local()
    }

    /// Sanitizes free-text fields and rejects records the ledger cannot hold.
    pub fn validate(&mut self) -> Result<(), ExpenseError> {
        self.name = sanitize(&self.name);
        if self.name.is_empty() {
            return Err(ExpenseError::Validation(
                "expense 'name' cannot be empty".into(),
            ));
        }
        self.category = sanitize(&self.category);
        if self.category.is_empty() {
            return Err(ExpenseError::Validation(
                "expense 'category' cannot be empty".into(),
            ));
        }
        if self.amount == 0.0 || !self.amount.is_finite() {
            return Err(ExpenseError::Validation(format!(
                "expense 'amount' must be a non-zero number, got {}",
                self.amount
            )));
        }
        self.tags = self
            .tags
            .iter()
            .map(|tag| sanitize(tag))
            .filter(|tag| !tag.is_empty())
            .collect();
        Ok(())
    }
}

fn sanitize(raw: &str) -> String {
    raw.split(|ch: char| ch.is_whitespace() || ch.is_control())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parses a stored RFC 3339 timestamp such as `2025-07-08T14:03:00Z`.
pub fn parse_expense_date(input: &str) -> Result<DateTime<FixedOffset>, ExpenseError> {
    DateTime::parse_from_rfc3339(input.trim()).map_err(|err| ExpenseError::InvalidDate {
        input: input.to_string(),
        reason: err.to_string(),
    })
}

/// Parses a `YYYY-MM-DD` form value.
pub fn parse_date_input(input: &str) -> Result<NaiveDate, ExpenseError> {
    NaiveDate::parse_from_str(input.trim(), DATE_INPUT_FORMAT).map_err(|err| {
        ExpenseError::InvalidDate {
            input: input.to_string(),
            reason: err.to_string(),
        }
    })
}

/// Combines a `YYYY-MM-DD` form value with a wall-clock time in `tz` and returns the UTC instant.
///
/// A time inside a daylight-saving gap is pushed forward by whole hours until it exists,
/// so 02:30 on a night that skips 02:00-03:00 becomes 03:30. A repeated time takes its
/// earlier instant.
pub fn date_input_with_time<Tz: TimeZone>(
    input: &str,
    time: NaiveTime,
    tz: &Tz,
) -> Result<DateTime<Utc>, ExpenseError> {
    let date = parse_date_input(input)?;
    let local = date.and_time(time);
    (0..=3)
        .find_map(|hours| {
            tz.from_local_datetime(&(local + Duration::hours(hours)))
                .earliest()
        })
        .map(|resolved| resolved.with_timezone(&Utc))
        .ok_or_else(|| ExpenseError::InvalidDate {
            input: input.to_string(),
            reason: "local time does not exist in the target zone".into(),
        })
}
