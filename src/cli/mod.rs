//! Command-line front end that renders the current period to the terminal.

pub mod output;

use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::{Local, NaiveDate};
use thiserror::Error;

use crate::config::{Config, ConfigManager};
use crate::currency::CurrencyRegistry;
use crate::errors::ExpenseError;
use crate::expense::{parse_date_input, period_totals, ExpenseRecord, RateTable};
use crate::view::ViewContext;

pub const USAGE: &str = "\
usage: expense_period_cli <command> [options]

commands:
  report                   list the expenses of the current period
  rates                    print the rate request for the current period as JSON
  config show              print the stored preferences
  config set-start-date N  set the day of month periods begin on (1-31)
  config set-currency CODE set the display currency (requires --catalog)
  version                  print build information

options:
  --expenses FILE   JSON array of expense records
  --catalog FILE    JSON currency catalog
  --rates FILE      JSON rate table used to show converted amounts
  --date YYYY-MM-DD reference date (defaults to today)
  --all             use every expense instead of the current period (rates only)";

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Expense(#[from] ExpenseError),
    #[error("IO error reading `{path}`: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{0}")]
    Usage(String),
}

#[derive(Debug, Default)]
struct Options {
    positional: Vec<String>,
    expenses: Option<PathBuf>,
    catalog: Option<PathBuf>,
    rates: Option<PathBuf>,
    date: Option<String>,
    all: bool,
}

impl Options {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Self, CliError> {
        let mut options = Options::default();
        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            let mut value = |flag: &str| {
                args.next()
                    .ok_or_else(|| CliError::Usage(format!("`{}` expects a value", flag)))
            };
            match arg.as_str() {
                "--expenses" => options.expenses = Some(PathBuf::from(value("--expenses")?)),
                "--catalog" => options.catalog = Some(PathBuf::from(value("--catalog")?)),
                "--rates" => options.rates = Some(PathBuf::from(value("--rates")?)),
                "--date" => options.date = Some(value("--date")?),
                "--all" => options.all = true,
                "--version" | "-V" => options.positional.push("version".into()),
                "--help" | "-h" => options.positional.push("help".into()),
                flag if flag.starts_with("--") => {
                    return Err(CliError::Usage(format!("unknown option `{}`", flag)))
                }
                _ => options.positional.push(arg.clone()),
            }
        }
        Ok(options)
    }

    fn reference(&self) -> Result<NaiveDate, CliError> {
        match &self.date {
            Some(raw) => Ok(parse_date_input(raw)?),
            None => Ok(Local::now().date_naive()),
        }
    }

    fn registry(&self) -> Result<CurrencyRegistry, CliError> {
        match &self.catalog {
            Some(path) => Ok(CurrencyRegistry::from_json(&read(path)?)?),
            None => Ok(CurrencyRegistry::new()),
        }
    }

    fn expenses(&self) -> Result<Vec<ExpenseRecord>, CliError> {
        let path = self
            .expenses
            .as_ref()
            .ok_or_else(|| CliError::Usage("`--expenses FILE` is required".into()))?;
        let records: Vec<ExpenseRecord> =
            serde_json::from_str(&read(path)?).map_err(ExpenseError::from)?;
        Ok(records)
    }
}

fn read(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}

/// Parses `args` (without the program name) and runs the requested command.
pub fn run_cli(args: impl IntoIterator<Item = String>) -> Result<(), CliError> {
    let options = Options::parse(args)?;
    let command: Vec<&str> = options.positional.iter().map(String::as_str).collect();
    match command.as_slice() {
        ["report"] => {
            let config = ConfigManager::new()?.load()?;
            report(&options, &config)
        }
        ["rates"] => {
            let config = ConfigManager::new()?.load()?;
            rates(&options, &config)
        }
        ["config"] | ["config", "show"] => {
            let manager = ConfigManager::new()?;
            let config = manager.load()?;
            output::info(format!("config file:      {}", manager.path().display()));
            output::info(format!("default currency: {}", config.default_currency));
            output::info(format!("period start day: {}", config.start_date));
            Ok(())
        }
        ["config", "set-start-date", day] => {
            let day: u32 = day
                .parse()
                .map_err(|_| CliError::Usage(format!("`{}` is not a day of month", day)))?;
            ConfigManager::new()?.update_start_date(day)?;
            output::success(format!("Periods now start on day {}.", day));
            Ok(())
        }
        ["config", "set-currency", code] => {
            if options.catalog.is_none() {
                return Err(CliError::Usage(
                    "`--catalog FILE` is required to validate the currency".into(),
                ));
            }
            let registry = options.registry()?;
            let config = ConfigManager::new()?.update_currency(code, &registry)?;
            output::success(format!(
                "Default currency set to {}.",
                config.default_currency
            ));
            Ok(())
        }
        ["version"] => {
            output::info(format!(
                "expense_period {} ({} {}, {} build {} for {})",
                env!("CARGO_PKG_VERSION"),
                env!("EXPENSE_PERIOD_BUILD_HASH"),
                env!("EXPENSE_PERIOD_BUILD_STATUS"),
                env!("EXPENSE_PERIOD_BUILD_PROFILE"),
                env!("EXPENSE_PERIOD_BUILD_TIMESTAMP"),
                env!("EXPENSE_PERIOD_BUILD_TARGET"),
            ));
            Ok(())
        }
        ["help"] | [] => {
            output::info(USAGE);
            Ok(())
        }
        other => Err(CliError::Usage(format!(
            "unknown command `{}`",
            other.join(" ")
        ))),
    }
}

fn report(options: &Options, config: &Config) -> Result<(), CliError> {
    let ctx: ViewContext = config.view_context(options.reference()?)?;
    let registry = options.registry()?;
    let expenses = options.expenses()?;
    let table = match &options.rates {
        Some(path) => Some(RateTable::from_json(&read(path)?)?),
        None => None,
    };
    let formatter = ctx.formatter(&registry);
    let bounds = ctx.bounds();
    let selected = ctx.current_expenses(&expenses, &Local);

    output::section(format!(
        "{} ({} to {})",
        ctx.label(),
        bounds.first_day(),
        bounds.last_day()
    ));
    if selected.is_empty() {
        output::info("No expenses in this period.");
        return Ok(());
    }

    for expense in &selected {
        let currency = expense
            .currency_code()
            .unwrap_or_else(|| ctx.currency.clone());
        let mut line = format!(
            "{}  {:<24} {:<14} {:>16}",
            expense.date.with_timezone(&Local).format("%Y-%m-%d"),
            expense.name,
            expense.category,
            formatter.format(expense.amount, currency.as_str())
        );
        if let Some(table) = &table {
            if currency != ctx.currency {
                let rate = table.rate_for(expense, ctx.currency.as_str());
                match formatter.format_converted(expense.amount, rate, ctx.currency.as_str()) {
                    Some(converted) => line.push_str(&format!("  ({})", converted)),
                    None => tracing::debug!(id = %expense.id, "no rate for converted amount"),
                }
            }
        }
        output::info(line);
    }

    output::section("Totals");
    for (currency, total) in period_totals(&selected, &ctx.currency) {
        output::info(format!(
            "{:<6} {:>16}",
            currency.as_str(),
            formatter.format(total, currency.as_str())
        ));
    }
    Ok(())
}

fn rates(options: &Options, config: &Config) -> Result<(), CliError> {
    let ctx = config.view_context(options.reference()?)?;
    let expenses = options.expenses()?;
    let request = if options.all {
        ctx.rate_request(&expenses)
    } else {
        let selected: Vec<ExpenseRecord> = ctx
            .current_expenses(&expenses, &Local)
            .into_iter()
            .cloned()
            .collect();
        ctx.rate_request(&selected)
    };
    if request.is_empty() {
        output::warning("No expenses need conversion.");
    }
    output::info(request.to_json()?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_flags_and_positionals() {
        let options = Options::parse(args(&[
            "report",
            "--expenses",
            "e.json",
            "--date",
            "2025-03-20",
            "--all",
        ]))
        .expect("valid args");
        assert_eq!(options.positional, vec!["report".to_string()]);
        assert_eq!(options.expenses, Some(PathBuf::from("e.json")));
        assert!(options.all);
        assert_eq!(
            options.reference().expect("date"),
            NaiveDate::from_ymd_opt(2025, 3, 20).unwrap()
        );
    }

    #[test]
    fn missing_flag_value_is_usage_error() {
        let err = Options::parse(args(&["report", "--expenses"])).expect_err("missing value");
        assert!(matches!(err, CliError::Usage(_)));
    }

    #[test]
    fn unknown_option_is_rejected() {
        assert!(Options::parse(args(&["--verbose"])).is_err());
    }

    #[test]
    fn malformed_reference_date_fails() {
        let options = Options::parse(args(&["report", "--date", "20/03/2025"])).unwrap();
        assert!(matches!(
            options.reference(),
            Err(CliError::Expense(ExpenseError::InvalidDate { .. }))
        ));
    }
}
