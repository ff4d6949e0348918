use crate::driver::PortfolioUiDriver;
use crate::errors::AppError;
use crate::models::transaction::Transaction;

/// Record one purchase through the driver's add-investment flow.
///
/// Any failing step ends the purchase with `AppError::PurchaseFailed`; the UI
/// may be left mid-dialog, so the caller is expected to reset it.
pub async fn process<D: PortfolioUiDriver>(
    driver: &mut D,
    txn: &Transaction,
) -> Result<(), AppError> {
    let entry_date = txn.entry_date();
    let steps = async {
        driver.begin_purchase_entry().await?;
        driver.enter_symbol(txn.base_symbol()).await?;
        driver.enter_quantity(&txn.quantity).await?;
        driver.enter_date(&entry_date).await?;
        driver.enter_price(&txn.price).await?;
        driver.save().await
    };
    steps.await.map_err(|e| AppError::PurchaseFailed {
        symbol: txn.symbol.clone(),
        reason: e.to_string(),
    })
}
