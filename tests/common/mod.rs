#![allow(dead_code)]

use std::sync::Mutex;

use chrono::{Datelike, Duration, NaiveDate};
use expense_period::{
    currency::CurrencyRegistry,
    expense::{parse_expense_date, ExpenseRecord},
};
use once_cell::sync::Lazy;
use tempfile::TempDir;

/// Holds TempDir guards so temporary folders live for the duration of the test run.
static TEST_DIRS: Lazy<Mutex<Vec<TempDir>>> = Lazy::new(|| Mutex::new(Vec::new()));

pub const CATALOG_JSON: &str = r#"[
    {"code": "USD", "symbol": "$", "name": "US Dollar", "decimals": 2, "commaDecimal": false, "postFixCurrency": false},
    {"code": "EUR", "symbol": "€", "name": "Euro", "decimals": 2, "commaDecimal": true, "postFixCurrency": true},
    {"code": "JPY", "symbol": "¥", "name": "Japanese Yen", "decimals": 0, "commaDecimal": false, "postFixCurrency": false},
    {"code": "BRL", "symbol": "R$", "name": "Brazilian Real", "decimals": 2, "commaDecimal": true, "postFixCurrency": false}
]"#;

pub fn registry() -> CurrencyRegistry {
    CurrencyRegistry::from_json(CATALOG_JSON).expect("fixture catalog parses")
}

/// Creates a directory that outlives the calling test.
pub fn temp_dir() -> std::path::PathBuf {
    let temp = TempDir::new().expect("create temp dir");
    let path = temp.path().to_path_buf();
    TEST_DIRS.lock().expect("lock temp dir registry").push(temp);
    path
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid fixture date")
}

pub fn expense(name: &str, stamp: &str, amount: f64, currency: Option<&str>) -> ExpenseRecord {
    ExpenseRecord::new(
        name,
        "General",
        amount,
        currency,
        parse_expense_date(stamp).expect("valid fixture timestamp"),
    )
}

/// One expense per day at noon UTC across `days` days starting at `from`.
pub fn daily_expenses(from: NaiveDate, days: i64) -> Vec<ExpenseRecord> {
    (0..days)
        .map(|offset| {
            let day = from + Duration::days(offset);
            let stamp = format!(
                "{:04}-{:02}-{:02}T12:00:00Z",
                day.year(),
                day.month(),
                day.day()
            );
            let currency = if offset % 3 == 0 { Some("EUR") } else { None };
            expense(&format!("day-{offset}"), &stamp, 10.0 + offset as f64, currency)
        })
        .collect()
}
