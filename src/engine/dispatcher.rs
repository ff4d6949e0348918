use tracing::info;

use crate::driver::PortfolioUiDriver;
use crate::errors::AppError;
use crate::logging::ActivityLog;
use crate::models::config::{DispatchOptions, UnknownGroupPolicy};
use crate::models::portfolio::PortfolioMap;
use crate::models::result::{DispatchReport, OutcomeStatus, TransactionOutcome};
use crate::models::transaction::{Action, Transaction};

use super::{purchase, sale};

/// Replay `transactions` in order against `driver`.
///
/// The driver is only navigated when the group changes between two dispatched
/// transactions; records excluded by the filter leave the current group alone.
/// A failed purchase is logged, the UI is sent back to the group's target, and
/// the loop moves on.
///
/// Dispatch stops early on a group without a target under
/// [`UnknownGroupPolicy::Abort`], or when navigating to a new group fails. The
/// report returned then carries the cause in `aborted` along with every outcome
/// recorded so far.
pub async fn dispatch<D, L>(
    driver: &mut D,
    log: &L,
    transactions: &[Transaction],
    portfolios: &PortfolioMap,
    options: &DispatchOptions,
) -> DispatchReport
where
    D: PortfolioUiDriver,
    L: ActivityLog + ?Sized,
{
    info!("Dispatching {} transactions", transactions.len());

    let mut report = DispatchReport::default();
    let mut current_group: Option<&str> = None;

    for (index, txn) in transactions.iter().enumerate() {
        // ── 1. Scope ──
        if !options.filter.matches(txn) {
            report
                .outcomes
                .push(TransactionOutcome::new(index, txn, OutcomeStatus::Skipped));
            continue;
        }

        // ── 2. Position the UI on the transaction's group ──
        let Some(target) = portfolios.target(&txn.group) else {
            let err = AppError::UnknownGroup(txn.group.clone());
            log.error(&format!("Cannot dispatch {}: {}", txn.describe(), err));
            report.outcomes.push(
                TransactionOutcome::new(index, txn, OutcomeStatus::UnknownGroup).with_error(&err),
            );
            match options.unknown_group {
                UnknownGroupPolicy::Abort => {
                    report.aborted = Some(err);
                    break;
                }
                UnknownGroupPolicy::Skip => continue,
            }
        };

        if current_group != Some(txn.group.as_str()) {
            if let Err(err) = driver.navigate(target).await {
                log.error(&format!(
                    "Cannot open group '{}' for {}: {}",
                    txn.group,
                    txn.describe(),
                    err
                ));
                report.outcomes.push(
                    TransactionOutcome::new(index, txn, OutcomeStatus::Failed).with_error(&err),
                );
                report.aborted = Some(err);
                break;
            }
            report.navigations += 1;
            current_group = Some(txn.group.as_str());
        }

        // ── 3. Route by action ──
        match txn.action {
            Action::Buy => match purchase::process(driver, txn).await {
                Ok(()) => {
                    log.info(&format!("Recorded purchase: {}", txn.describe()));
                    report
                        .outcomes
                        .push(TransactionOutcome::new(index, txn, OutcomeStatus::Purchased));
                }
                Err(err) => {
                    log.error(&format!(
                        "Failed to record purchase of {} (quantity {}, price {}, date {}): {}",
                        txn.symbol, txn.quantity, txn.price, txn.trade_date, err
                    ));
                    report.outcomes.push(
                        TransactionOutcome::new(index, txn, OutcomeStatus::Failed).with_error(&err),
                    );

                    // ── 4. Recover: reload the group's view ──
                    match driver.navigate(target).await {
                        Ok(()) => report.navigations += 1,
                        Err(nav_err) => {
                            log.error(&format!(
                                "Could not return to group '{}' after failure: {}",
                                txn.group, nav_err
                            ));
                            current_group = None;
                        }
                    }
                }
            },
            Action::Sell => {
                sale::process(log, txn);
                report
                    .outcomes
                    .push(TransactionOutcome::new(index, txn, OutcomeStatus::ManualSale));
            }
        }
    }

    info!("Dispatch complete: {}", report.summary());
    report
}
