use chrono::NaiveDate;

use crate::errors::{AppError, ErrorResponse};

use super::transaction::{Action, Transaction};

/// How a single transaction ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeStatus {
    /// Purchase entered and saved in the UI.
    Purchased,
    /// Sale announced for manual handling.
    ManualSale,
    /// Purchase entry failed; the UI was reset.
    Failed,
    /// Excluded by the symbol/group scope.
    Skipped,
    /// Group has no portfolio target.
    UnknownGroup,
}

impl OutcomeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeStatus::Purchased => "purchased",
            OutcomeStatus::ManualSale => "manual_sale",
            OutcomeStatus::Failed => "failed",
            OutcomeStatus::Skipped => "skipped",
            OutcomeStatus::UnknownGroup => "unknown_group",
        }
    }
}

/// Result of dispatching one transaction.
#[derive(Debug, Clone)]
pub struct TransactionOutcome {
    /// Position of the transaction in store order.
    pub index: usize,
    pub symbol: String,
    pub action: Action,
    pub trade_date: NaiveDate,
    pub quantity: String,
    pub price: String,
    pub group: String,
    pub status: OutcomeStatus,
    pub error: Option<ErrorResponse>,
}

impl TransactionOutcome {
    pub fn new(index: usize, txn: &Transaction, status: OutcomeStatus) -> Self {
        TransactionOutcome {
            index,
            symbol: txn.symbol.clone(),
            action: txn.action,
            trade_date: txn.trade_date,
            quantity: txn.quantity.clone(),
            price: txn.price.clone(),
            group: txn.group.clone(),
            status,
            error: None,
        }
    }

    pub fn with_error(mut self, err: &AppError) -> Self {
        self.error = Some(ErrorResponse::from(err));
        self
    }
}

/// Everything the dispatcher did during one run.
///
/// When dispatch stops early the report still holds every outcome up to and
/// including the record that stopped it, and `aborted` holds the cause.
#[derive(Debug, Default)]
pub struct DispatchReport {
    pub outcomes: Vec<TransactionOutcome>,
    /// Navigations to a group target, recovery navigations included.
    pub navigations: usize,
    pub aborted: Option<AppError>,
}

impl DispatchReport {
    pub fn count(&self, status: OutcomeStatus) -> usize {
        self.outcomes.iter().filter(|o| o.status == status).count()
    }

    pub fn purchased(&self) -> usize {
        self.count(OutcomeStatus::Purchased)
    }

    pub fn manual_sales(&self) -> usize {
        self.count(OutcomeStatus::ManualSale)
    }

    pub fn failed(&self) -> usize {
        self.count(OutcomeStatus::Failed)
    }

    pub fn skipped(&self) -> usize {
        self.count(OutcomeStatus::Skipped)
    }

    pub fn unknown_groups(&self) -> usize {
        self.count(OutcomeStatus::UnknownGroup)
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.is_some()
    }

    pub fn has_failures(&self) -> bool {
        self.failed() > 0 || self.unknown_groups() > 0 || self.is_aborted()
    }

    pub fn summary(&self) -> String {
        let mut line = format!(
            "{} purchased, {} manual sales, {} failed, {} unknown group, {} skipped ({} navigations)",
            self.purchased(),
            self.manual_sales(),
            self.failed(),
            self.unknown_groups(),
            self.skipped(),
            self.navigations
        );
        if let Some(err) = &self.aborted {
            line.push_str(&format!("; stopped early: {}", err));
        }
        line
    }
}
