use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::{
    env,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use crate::{
    currency::{CurrencyCode, CurrencyRegistry},
    errors::ExpenseError,
    expense::PeriodStartDay,
    view::ViewContext,
};

const DEFAULT_DIR_NAME: &str = ".expense_period";
const CONFIG_FILE: &str = "config.json";
const HOME_ENV: &str = "EXPENSE_PERIOD_HOME";
const TMP_SUFFIX: &str = "tmp";

/// User preferences that shape how expenses are viewed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default = "Config::default_currency_value")]
    pub default_currency: String,
    #[serde(default = "Config::default_start_date_value")]
    pub start_date: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_currency: Self::default_currency_value(),
            start_date: Self::default_start_date_value(),
        }
    }
}

impl Config {
    pub fn default_currency_value() -> String {
        "USD".into()
    }

    pub fn default_start_date_value() -> u32 {
        1
    }

    pub fn start_day(&self) -> Result<PeriodStartDay, ExpenseError> {
        PeriodStartDay::new(self.start_date)
    }

    /// Snapshot of these preferences anchored at `reference`.
    pub fn view_context(&self, reference: NaiveDate) -> Result<ViewContext, ExpenseError> {
        Ok(ViewContext::new(
            CurrencyCode::new(&self.default_currency),
            reference,
            self.start_day()?,
        ))
    }
}

/// Loads and persists [`Config`] as JSON under the application data directory.
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    /// Uses `$EXPENSE_PERIOD_HOME`, falling back to `~/.expense_period`.
    pub fn new() -> Result<Self, ExpenseError> {
        Self::with_base_dir(base_dir())
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self, ExpenseError> {
        fs::create_dir_all(&base)?;
        Ok(Self {
            path: base.join(CONFIG_FILE),
        })
    }

    pub fn load(&self) -> Result<Config, ExpenseError> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            let config: Config = serde_json::from_str(&data)?;
            tracing::debug!(path = %self.path.display(), "loaded config");
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self, config: &Config) -> Result<(), ExpenseError> {
        let json = serde_json::to_string_pretty(config)?;
        let tmp = tmp_path(&self.path);
        write_file(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        tracing::debug!(path = %self.path.display(), "saved config");
        Ok(())
    }

    pub fn update_start_date(&self, start_date: u32) -> Result<Config, ExpenseError> {
        PeriodStartDay::new(start_date)?;
        let mut config = self.load()?;
        config.start_date = start_date;
        self.save(&config)?;
        tracing::info!(start_date, "period start date updated");
        Ok(config)
    }

    /// Sets the display currency; the code must be present in `registry`.
    pub fn update_currency(
        &self,
        currency: &str,
        registry: &CurrencyRegistry,
    ) -> Result<Config, ExpenseError> {
        let code = CurrencyCode::new(currency);
        if !registry.contains(code.as_str()) {
            return Err(ExpenseError::Validation(format!(
                "invalid currency: `{}`",
                currency
            )));
        }
        let mut config = self.load()?;
        config.default_currency = code.0;
        self.save(&config)?;
        tracing::info!(currency = %config.default_currency, "default currency updated");
        Ok(config)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn base_dir() -> PathBuf {
    if let Some(custom) = env::var_os(HOME_ENV) {
        return PathBuf::from(custom);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DEFAULT_DIR_NAME)
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_file(path: &Path, data: &str) -> Result<(), ExpenseError> {
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}
