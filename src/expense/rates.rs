//! Conversion-rate lookups: building the request for the rate provider and
//! reading back the table it answers with.

use std::collections::BTreeMap;

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::record::ExpenseRecord;
use crate::currency::CurrencyCode;
use crate::errors::ExpenseError;

const DAY_KEY_FORMAT: &str = "%Y-%m-%d";

/// `day -> source currency -> [target currency]`, one entry per distinct pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RateRequest(BTreeMap<String, BTreeMap<String, Vec<String>>>);

impl RateRequest {
    /// Number of distinct (day, source currency) pairs.
    pub fn len(&self) -> usize {
        self.0.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn days(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn targets(&self, day: &str, source: &str) -> Option<&[String]> {
        self.0
            .get(day)
            .and_then(|sources| sources.get(&source.to_uppercase()))
            .map(Vec::as_slice)
    }

    /// Flattened `(day, source, target)` triples in day order.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str, &str)> {
        self.0.iter().flat_map(|(day, sources)| {
            sources.iter().flat_map(move |(source, targets)| {
                targets
                    .iter()
                    .map(move |target| (day.as_str(), source.as_str(), target.as_str()))
            })
        })
    }

    pub fn to_json(&self) -> Result<String, ExpenseError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Calendar day, in UTC, used to key the rate of an expense.
pub fn day_key(expense: &ExpenseRecord) -> String {
    expense
        .date
        .with_timezone(&Utc)
        .format(DAY_KEY_FORMAT)
        .to_string()
}

/// Collects the (day, currency) pairs that need a rate into `target`.
///
/// Expenses without a currency, or already in `target`, need no conversion and are skipped.
pub fn extract_request(expenses: &[ExpenseRecord], target: &str) -> RateRequest {
    let target = CurrencyCode::new(target);
    let mut request = RateRequest::default();
    for expense in expenses {
        let Some(source) = expense.currency_code() else {
            continue;
        };
        if source == target {
            continue;
        }
        request
            .0
            .entry(day_key(expense))
            .or_default()
            .insert(source.0, vec![target.0.clone()]);
    }
    tracing::debug!(
        expenses = expenses.len(),
        pairs = request.len(),
        target = %target,
        "extracted rate request"
    );
    request
}

/// Rates answered by the provider: `day -> base -> quote -> rate`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RateTable(BTreeMap<String, BTreeMap<String, BTreeMap<String, f64>>>);

impl RateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a provider response, normalizing currency keys to uppercase.
    pub fn from_json(json: &str) -> Result<Self, ExpenseError> {
        let raw: RateTable = serde_json::from_str(json)?;
        let mut table = Self::new();
        for (day, bases) in raw.0 {
            for (base, quotes) in bases {
                for (quote, rate) in quotes {
                    table.insert(&day, &base, &quote, rate);
                }
            }
        }
        Ok(table)
    }

    pub fn insert(&mut self, day: &str, base: &str, quote: &str, rate: f64) {
        self.0
            .entry(day.to_string())
            .or_default()
            .entry(base.to_uppercase())
            .or_default()
            .insert(quote.to_uppercase(), rate);
    }

    pub fn rate(&self, day: &str, base: &str, quote: &str) -> Option<f64> {
        self.0
            .get(day)?
            .get(&base.to_uppercase())?
            .get(&quote.to_uppercase())
            .copied()
    }

    /// Rate that converts `expense` into `target`.
    ///
    /// `1.0` when no conversion is needed, `0.0` when the table has no rate for the pair.
    pub fn rate_for(&self, expense: &ExpenseRecord, target: &str) -> f64 {
        let target = CurrencyCode::new(target);
        match expense.currency_code() {
            None => 1.0,
            Some(source) if source == target => 1.0,
            Some(source) => self
                .rate(&day_key(expense), source.as_str(), target.as_str())
                .unwrap_or(0.0),
        }
    }
}
