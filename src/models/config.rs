use std::path::PathBuf;

use chrono::NaiveDate;
use serde::Deserialize;

use crate::errors::AppError;

use super::transaction::Transaction;

/// Date format accepted for `--start-date` / `--end-date`.
pub const CLI_DATE_FORMAT: &str = "%d-%m-%Y";

/// Parse a `DD-MM-YYYY` command-line date.
pub fn parse_cli_date(s: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(s.trim(), CLI_DATE_FORMAT)
        .map_err(|_| AppError::MalformedDate(s.to_string()))
}

/// Inclusive trade-date window. Unbounded sides default to the extremes
/// `chrono` can represent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Default for DateRange {
    fn default() -> Self {
        DateRange {
            start: NaiveDate::MIN,
            end: NaiveDate::MAX,
        }
    }
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        DateRange {
            start: start.unwrap_or(NaiveDate::MIN),
            end: end.unwrap_or(NaiveDate::MAX),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Optional scoping of a replay to one symbol and/or one group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchFilter {
    pub symbol: Option<String>,
    pub group: Option<String>,
}

impl DispatchFilter {
    pub fn matches(&self, txn: &Transaction) -> bool {
        if let Some(group) = &self.group {
            if &txn.group != group {
                return false;
            }
        }
        if let Some(symbol) = &self.symbol {
            if &txn.symbol != symbol {
                return false;
            }
        }
        true
    }
}

/// What the dispatcher does when a transaction names a group without a target.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnknownGroupPolicy {
    /// Stop the whole batch with `AppError::UnknownGroup`.
    #[default]
    Abort,
    /// Log the record as failed and carry on with the next one.
    Skip,
}

/// Options consumed by the dispatcher.
#[derive(Debug, Clone, Default)]
pub struct DispatchOptions {
    pub filter: DispatchFilter,
    pub unknown_group: UnknownGroupPolicy,
}

/// Everything a replay run needs, resolved from the command line.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub directory: PathBuf,
    pub date_range: DateRange,
    pub dispatch: DispatchOptions,
    pub mfa_wait: bool,
    pub dry_run: bool,
    pub settings_path: Option<PathBuf>,
    pub report_path: Option<PathBuf>,
}

impl RunConfig {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.date_range.start > self.date_range.end {
            return Err(AppError::InvalidConfig(format!(
                "start date {} is after end date {}",
                self.date_range.start, self.date_range.end
            )));
        }
        Ok(())
    }
}

/// Sign-in credentials. `Debug` never prints the password.
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

/// CSS selectors for the elements the WebDriver session interacts with.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Selectors {
    pub email_input: String,
    pub email_next: String,
    pub password_input: String,
    pub password_next: String,
    pub add_investment: String,
    pub symbol_input: String,
    /// First entry of the symbol autocomplete list. Empty to skip the click.
    pub symbol_suggestion: String,
    pub quantity_input: String,
    pub date_input: String,
    pub price_input: String,
    pub save_button: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Selectors {
            email_input: "input[type='email']".into(),
            email_next: "#identifierNext button".into(),
            password_input: "input[type='password']".into(),
            password_next: "#passwordNext button".into(),
            add_investment: "button[aria-label='Add investment']".into(),
            symbol_input: "input[aria-label='Type an investment name or symbol']".into(),
            symbol_suggestion: "ul[role='listbox'] li[role='option']".into(),
            quantity_input: "input[aria-label='Quantity']".into(),
            date_input: "input[aria-label='Purchase date']".into(),
            price_input: "input[aria-label='Purchase price']".into(),
            save_button: "button[data-mdc-dialog-action='ok']".into(),
        }
    }
}

/// WebDriver connection settings, loaded from an optional JSON file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DriverSettings {
    /// Base URL of a W3C WebDriver endpoint (chromedriver, geckodriver, ...).
    pub webdriver_url: String,
    pub browser_name: String,
    pub headless: bool,
    pub sign_in_url: String,
    /// Bounded wait for an element to become available and interactable.
    pub element_wait_ms: u64,
    pub poll_interval_ms: u64,
    /// How long to wait for a second-factor confirmation after sign-in.
    pub mfa_wait_secs: u64,
    pub selectors: Selectors,
}

impl Default for DriverSettings {
    fn default() -> Self {
        DriverSettings {
            webdriver_url: "http://localhost:4444".into(),
            browser_name: "chrome".into(),
            headless: false,
            sign_in_url: "https://accounts.google.com/ServiceLogin".into(),
            element_wait_ms: 10_000,
            poll_interval_ms: 250,
            mfa_wait_secs: 60,
            selectors: Selectors::default(),
        }
    }
}
