use crate::logging::ActivityLog;
use crate::models::transaction::Transaction;

/// Sales are not automated. Emit a notice asking for manual entry and return it.
pub fn process<L: ActivityLog + ?Sized>(log: &L, txn: &Transaction) -> String {
    let notice = format!(
        "Sale must be recorded manually: {} in group {}",
        txn.describe(),
        txn.group
    );
    log.info(&notice);
    notice
}
