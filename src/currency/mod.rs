//! Currency display rules and the registry that serves them.

pub mod format;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::errors::ExpenseError;

pub use format::{format_number, CurrencyFormatter, NumberStyle};

/// ISO 4217 currency representation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CurrencyCode(pub String);

impl CurrencyCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for CurrencyCode {
    fn default() -> Self {
        Self::new("USD")
    }
}

impl std::fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One entry of the currency catalog as shipped to the client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    pub code: String,
    pub symbol: String,
    #[serde(default)]
    pub decimals: u8,
    #[serde(default)]
    pub comma_decimal: bool,
    #[serde(default)]
    pub post_fix_currency: bool,
}

/// Display parameters for a single currency.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CurrencyRule {
    pub code: CurrencyCode,
    pub symbol: String,
    pub decimal_digits: u8,
    /// Selects `1.234,50` over `1,234.50`.
    pub comma_decimal: bool,
    pub symbol_is_suffix: bool,
}

impl CurrencyRule {
    /// Rule used whenever a code is missing from the registry.
    pub fn fallback() -> Self {
        Self {
            code: CurrencyCode::default(),
            symbol: "$".into(),
            decimal_digits: 2,
            comma_decimal: false,
            symbol_is_suffix: false,
        }
    }

    pub fn number_style(&self) -> NumberStyle {
        if self.comma_decimal {
            NumberStyle::CommaDecimal
        } else {
            NumberStyle::DotDecimal
        }
    }
}

impl From<&CatalogEntry> for CurrencyRule {
    fn from(entry: &CatalogEntry) -> Self {
        Self {
            code: CurrencyCode::new(&entry.code),
            symbol: entry.symbol.clone(),
            decimal_digits: entry.decimals,
            comma_decimal: entry.comma_decimal,
            symbol_is_suffix: entry.post_fix_currency,
        }
    }
}

/// Keyed store of currency rules, populated from the catalog at startup.
#[derive(Debug, Clone)]
pub struct CurrencyRegistry {
    rules: HashMap<CurrencyCode, CurrencyRule>,
    fallback: CurrencyRule,
}

impl CurrencyRegistry {
    pub fn new() -> Self {
        Self {
            rules: HashMap::new(),
            fallback: CurrencyRule::fallback(),
        }
    }

    /// Builds a registry from a JSON catalog array.
    pub fn from_json(catalog: &str) -> Result<Self, ExpenseError> {
        let entries: Vec<CatalogEntry> = serde_json::from_str(catalog)?;
        let mut registry = Self::new();
        registry.load(&entries);
        Ok(registry)
    }

    /// Upserts every catalog entry. Later entries replace earlier ones with the same code.
    pub fn load<'a>(&mut self, catalog: impl IntoIterator<Item = &'a CatalogEntry>) {
        let mut loaded = 0usize;
        for entry in catalog {
            let rule = CurrencyRule::from(entry);
            if rule.code.is_empty() {
                tracing::warn!("skipping catalog entry without a currency code");
                continue;
            }
            self.rules.insert(rule.code.clone(), rule);
            loaded += 1;
        }
        tracing::info!(loaded, total = self.rules.len(), "currency catalog loaded");
    }

    /// Returns the rule for `code`, or the `$`/2-digit fallback rule. Never fails.
    pub fn lookup(&self, code: &str) -> &CurrencyRule {
        match self.rules.get(&CurrencyCode::new(code)) {
            Some(rule) => rule,
            None => {
                tracing::trace!(code, "unknown currency, using fallback rule");
                &self.fallback
            }
        }
    }

    pub fn contains(&self, code: &str) -> bool {
        self.rules.contains_key(&CurrencyCode::new(code))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Sorted list of registered codes.
    pub fn codes(&self) -> Vec<&CurrencyCode> {
        let mut codes: Vec<_> = self.rules.keys().collect();
        codes.sort();
        codes
    }

    /// Drops every rate whose currency is not registered and uppercases the surviving keys.
    pub fn retain_known(&self, rates: &mut HashMap<String, f64>) {
        let drained: Vec<(String, f64)> = rates.drain().collect();
        for (code, rate) in drained {
            let normalized = CurrencyCode::new(code);
            if self.rules.contains_key(&normalized) {
                rates.insert(normalized.0, rate);
            }
        }
    }
}

impl Default for CurrencyRegistry {
    fn default() -> Self {
        Self::new()
    }
}
