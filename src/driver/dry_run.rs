use tracing::info;

use crate::errors::AppError;

use super::{Authenticator, PortfolioUiDriver};

/// A single call made against a driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverCall {
    Authenticate { email: String, mfa_wait: bool },
    Navigate(String),
    BeginPurchaseEntry,
    EnterSymbol(String),
    EnterQuantity(String),
    EnterDate(String),
    EnterPrice(String),
    Save,
}

/// Driver that performs nothing and journals every call. Backs `--dry-run`.
#[derive(Debug, Default)]
pub struct DryRunDriver {
    calls: Vec<DriverCall>,
}

impl DryRunDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[DriverCall] {
        &self.calls
    }

    /// Navigation targets, in call order.
    pub fn navigations(&self) -> Vec<&str> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                DriverCall::Navigate(target) => Some(target.as_str()),
                _ => None,
            })
            .collect()
    }

    fn record(&mut self, call: DriverCall) {
        info!("[dry-run] {:?}", call);
        self.calls.push(call);
    }
}

impl PortfolioUiDriver for DryRunDriver {
    async fn navigate(&mut self, target: &str) -> Result<(), AppError> {
        self.record(DriverCall::Navigate(target.to_string()));
        Ok(())
    }

    async fn begin_purchase_entry(&mut self) -> Result<(), AppError> {
        self.record(DriverCall::BeginPurchaseEntry);
        Ok(())
    }

    async fn enter_symbol(&mut self, symbol: &str) -> Result<(), AppError> {
        self.record(DriverCall::EnterSymbol(symbol.to_string()));
        Ok(())
    }

    async fn enter_quantity(&mut self, quantity: &str) -> Result<(), AppError> {
        self.record(DriverCall::EnterQuantity(quantity.to_string()));
        Ok(())
    }

    async fn enter_date(&mut self, date: &str) -> Result<(), AppError> {
        self.record(DriverCall::EnterDate(date.to_string()));
        Ok(())
    }

    async fn enter_price(&mut self, price: &str) -> Result<(), AppError> {
        self.record(DriverCall::EnterPrice(price.to_string()));
        Ok(())
    }

    async fn save(&mut self) -> Result<(), AppError> {
        self.record(DriverCall::Save);
        Ok(())
    }
}

impl Authenticator for DryRunDriver {
    async fn authenticate(
        &mut self,
        email: &str,
        _password: &str,
        mfa_wait: bool,
    ) -> Result<(), AppError> {
        self.record(DriverCall::Authenticate {
            email: email.to_string(),
            mfa_wait,
        });
        Ok(())
    }
}
