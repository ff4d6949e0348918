use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use clap::Parser;
use tracing::{info, warn};

use crate::data::{loader, settings};
use crate::driver::dry_run::DryRunDriver;
use crate::driver::webdriver::WebDriverSession;
use crate::driver::{Authenticator, PortfolioUiDriver};
use crate::engine::dispatcher;
use crate::errors::AppError;
use crate::logging::{ActivityLog, TracingLog};
use crate::models::config::{
    parse_cli_date, Credentials, DateRange, DispatchFilter, DispatchOptions, RunConfig,
    UnknownGroupPolicy,
};
use crate::models::result::DispatchReport;
use crate::utils::export;

/// Replay buy/sell transaction files into a portfolio-tracking web app.
#[derive(Debug, Parser)]
#[command(name = "portfolio-replay", version, about, long_about = None)]
pub struct Cli {
    /// Directory containing the .tsv transaction files and .csv portfolio files
    #[arg(long)]
    pub directory: PathBuf,

    /// Account email used to sign in
    #[arg(short = 'u', long)]
    pub email: String,

    /// Account password used to sign in
    #[arg(short = 'p', long)]
    pub password: String,

    /// Only replay transactions on or after this date (DD-MM-YYYY)
    #[arg(long, alias = "start_date", value_parser = parse_cli_date)]
    pub start_date: Option<NaiveDate>,

    /// Only replay transactions on or before this date (DD-MM-YYYY)
    #[arg(long, alias = "end_date", value_parser = parse_cli_date)]
    pub end_date: Option<NaiveDate>,

    /// Only replay this symbol
    #[arg(long)]
    pub symbol: Option<String>,

    /// Only replay this portfolio group
    #[arg(long)]
    pub group: Option<String>,

    /// Wait for a second-factor confirmation after signing in
    #[arg(long, alias = "mfa_wait")]
    pub mfa_wait: bool,

    /// JSON file with WebDriver endpoint, selectors and wait budgets
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// Journal the UI actions instead of driving a browser
    #[arg(long)]
    pub dry_run: bool,

    /// Log and skip transactions whose group has no portfolio target instead of stopping
    #[arg(long)]
    pub skip_unknown_groups: bool,

    /// Write a per-transaction CSV report to this path
    #[arg(long)]
    pub report: Option<PathBuf>,
}

impl Cli {
    pub fn run_config(&self) -> RunConfig {
        RunConfig {
            directory: self.directory.clone(),
            date_range: DateRange::new(self.start_date, self.end_date),
            dispatch: DispatchOptions {
                filter: DispatchFilter {
                    symbol: self.symbol.clone(),
                    group: self.group.clone(),
                },
                unknown_group: if self.skip_unknown_groups {
                    UnknownGroupPolicy::Skip
                } else {
                    UnknownGroupPolicy::Abort
                },
            },
            mfa_wait: self.mfa_wait,
            dry_run: self.dry_run,
            settings_path: self.settings.clone(),
            report_path: self.report.clone(),
        }
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            email: self.email.clone(),
            password: self.password.clone(),
        }
    }
}

/// Sign in, then dispatch every transaction found in `config.directory`.
///
/// Errors here mean nothing was dispatched. A dispatch that stops part way
/// comes back as a report with `aborted` set.
pub async fn replay<D, L>(
    driver: &mut D,
    log: &L,
    config: &RunConfig,
    credentials: &Credentials,
) -> Result<DispatchReport, AppError>
where
    D: PortfolioUiDriver + Authenticator,
    L: ActivityLog + ?Sized,
{
    config.validate()?;
    let store = loader::load_directory(&config.directory, &config.date_range)?;
    if store.is_empty() {
        warn!("No transactions to replay");
        return Ok(DispatchReport::default());
    }

    driver
        .authenticate(&credentials.email, &credentials.password, config.mfa_wait)
        .await?;

    let report = dispatcher::dispatch(
        driver,
        log,
        store.transactions(),
        store.portfolios(),
        &config.dispatch,
    )
    .await;
    Ok(report)
}

/// Entry point behind `main`: resolve configuration, pick a driver, replay, report.
///
/// The summary and the CSV report are written even when dispatch stopped
/// early; the stop is returned as an error afterwards.
pub async fn execute(cli: Cli) -> anyhow::Result<()> {
    let config = cli.run_config();
    let credentials = cli.credentials();
    info!(
        "Replaying {} ({} to {})",
        config.directory.display(),
        config.date_range.start,
        config.date_range.end
    );

    let mut report = if config.dry_run {
        let mut driver = DryRunDriver::new();
        let report = replay(&mut driver, &TracingLog, &config, &credentials).await?;
        info!("Dry run recorded {} driver calls", driver.calls().len());
        report
    } else {
        let driver_settings = settings::load_optional_settings(config.settings_path.as_deref())?;
        let mut session = WebDriverSession::connect(driver_settings)
            .await
            .context("starting browser session")?;
        let result = replay(&mut session, &TracingLog, &config, &credentials).await;
        if let Err(e) = session.close().await {
            warn!("Failed to close browser session: {}", e);
        }
        result?
    };

    info!("Replay finished: {}", report.summary());

    if let Some(path) = &config.report_path {
        export::write_report_csv(&report, path)
            .with_context(|| format!("writing report to {}", path.display()))?;
        info!("Report written to {}", path.display());
    }

    if let Some(err) = report.aborted.take() {
        return Err(anyhow::Error::new(err).context("replay stopped before the last transaction"));
    }
    if report.has_failures() {
        warn!("Some transactions were not recorded; see the log above");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        let mut argv = vec![
            "portfolio-replay",
            "--directory",
            "data",
            "-u",
            "me@example.com",
            "-p",
            "pw",
        ];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv)
    }

    #[test]
    fn test_cli_defaults() {
        let cli = parse(&[]).unwrap();
        let config = cli.run_config();
        assert_eq!(config.date_range, DateRange::default());
        assert_eq!(config.dispatch.unknown_group, UnknownGroupPolicy::Abort);
        assert!(config.dispatch.filter.symbol.is_none());
        assert!(!config.mfa_wait);
    }

    #[test]
    fn test_cli_dates_and_scope() {
        let cli = parse(&[
            "--start_date",
            "01-01-2024",
            "--end-date",
            "31-03-2024",
            "--group",
            "Tech",
            "--symbol",
            "AAPL",
            "--skip-unknown-groups",
        ])
        .unwrap();
        let config = cli.run_config();
        assert_eq!(config.date_range.start, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(config.date_range.end, NaiveDate::from_ymd_opt(2024, 3, 31).unwrap());
        assert_eq!(config.dispatch.filter.group.as_deref(), Some("Tech"));
        assert_eq!(config.dispatch.filter.symbol.as_deref(), Some("AAPL"));
        assert_eq!(config.dispatch.unknown_group, UnknownGroupPolicy::Skip);
    }

    #[test]
    fn test_cli_rejects_malformed_date() {
        let err = parse(&["--start-date", "2024-01-01"]).unwrap_err();
        assert!(err.to_string().contains("expected DD-MM-YYYY"));
    }

    #[test]
    fn test_cli_requires_credentials() {
        assert!(Cli::try_parse_from(["portfolio-replay", "--directory", "data"]).is_err());
    }
}
