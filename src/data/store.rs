use std::io::{BufRead, Read};

use tracing::info;

use crate::engine::filter::filter_by_date;
use crate::errors::AppError;
use crate::models::config::DateRange;
use crate::models::portfolio::PortfolioMap;
use crate::models::transaction::Transaction;

use super::parser::{parse_portfolio_entries, parse_transactions};

/// Parsed transactions, in load order, plus the group → target mapping.
///
/// Nothing here checks that a transaction's group has a target; that surfaces
/// at dispatch time.
#[derive(Debug, Default)]
pub struct TransactionStore {
    transactions: Vec<Transaction>,
    portfolios: PortfolioMap,
}

impl TransactionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a transaction file, keep the records inside `range` and append them.
    /// Returns the number of records kept. On a malformed line nothing from the
    /// file is appended.
    pub fn load_transactions<R: BufRead>(
        &mut self,
        reader: R,
        source_name: &str,
        range: &DateRange,
    ) -> Result<usize, AppError> {
        let mut parsed = parse_transactions(reader, source_name)?;
        let removed = filter_by_date(&mut parsed, range);
        let kept = parsed.len();
        info!(
            "Loaded {} transactions from {} ({} outside date range)",
            kept, source_name, removed
        );
        self.transactions.extend(parsed);
        Ok(kept)
    }

    /// Parse a portfolio-directory file. Groups already registered keep their target.
    pub fn load_portfolios<R: Read>(
        &mut self,
        reader: R,
        source_name: &str,
    ) -> Result<usize, AppError> {
        let entries = parse_portfolio_entries(reader, source_name)?;
        let mut added = 0;
        for entry in entries {
            if self.portfolios.insert(entry) {
                added += 1;
            }
        }
        info!("Loaded {} portfolio groups from {}", added, source_name);
        Ok(added)
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn portfolios(&self) -> &PortfolioMap {
        &self.portfolios
    }

    /// Groups referenced by transactions but missing from the mapping, in first-seen order.
    pub fn unmapped_groups(&self) -> Vec<&str> {
        let mut missing: Vec<&str> = Vec::new();
        for txn in &self.transactions {
            let group = txn.group.as_str();
            if !self.portfolios.contains(group) && !missing.contains(&group) {
                missing.push(group);
            }
        }
        missing
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}
