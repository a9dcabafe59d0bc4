#![doc(test(attr(deny(warnings))))]

//! Expense Period computes custom billing-period windows over expense records,
//! renders amounts with per-currency display rules, and prepares the lookup
//! parameters needed to convert foreign-currency expenses.

pub mod cli;
pub mod config;
pub mod currency;
pub mod errors;
pub mod expense;
pub mod utils;
pub mod view;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup info log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::info!("Expense Period tracing initialized.");
    });
}
