//! Seams to the browser side of a replay.
//!
//! The dispatcher only talks to [`PortfolioUiDriver`]; sign-in goes through
//! [`Authenticator`]. Each operation owns its own bounded wait, so a returned
//! error means the step gave up.

pub mod dry_run;
pub mod webdriver;

use crate::errors::AppError;

/// Operations the portfolio web app must support to record a purchase.
#[allow(async_fn_in_trait)]
pub trait PortfolioUiDriver {
    /// Open a group's portfolio view.
    async fn navigate(&mut self, target: &str) -> Result<(), AppError>;
    /// Open the "add investment" dialog.
    async fn begin_purchase_entry(&mut self) -> Result<(), AppError>;
    async fn enter_symbol(&mut self, symbol: &str) -> Result<(), AppError>;
    async fn enter_quantity(&mut self, quantity: &str) -> Result<(), AppError>;
    /// `date` is already in `DD/MM/YYYY` form.
    async fn enter_date(&mut self, date: &str) -> Result<(), AppError>;
    /// Replaces any pre-filled value.
    async fn enter_price(&mut self, price: &str) -> Result<(), AppError>;
    async fn save(&mut self) -> Result<(), AppError>;
}

/// Establishes the signed-in session the driver operates in.
#[allow(async_fn_in_trait)]
pub trait Authenticator {
    async fn authenticate(
        &mut self,
        email: &str,
        password: &str,
        mfa_wait: bool,
    ) -> Result<(), AppError>;
}
