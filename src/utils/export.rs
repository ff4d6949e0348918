use std::io::Write;
use std::path::Path;

use crate::errors::AppError;
use crate::models::result::DispatchReport;
use crate::models::transaction::RECORD_DATE_FORMAT;

const HEADER: [&str; 10] = [
    "Index",
    "Symbol",
    "Action",
    "Date",
    "Quantity",
    "Price",
    "Group",
    "Status",
    "Error Code",
    "Error",
];

/// Write one row per dispatched transaction to a CSV file.
pub fn write_report_csv(report: &DispatchReport, path: &Path) -> Result<(), AppError> {
    let file = std::fs::File::create(path)
        .map_err(|e| AppError::FileWrite(format!("Cannot create {}: {}", path.display(), e)))?;
    write_report(report, file)
}

/// Write the report as CSV to any writer.
pub fn write_report<W: Write>(report: &DispatchReport, writer: W) -> Result<(), AppError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(HEADER)?;

    for o in &report.outcomes {
        let (code, message) = match &o.error {
            Some(e) => (e.code.as_str(), e.message.as_str()),
            None => ("", ""),
        };
        let index = o.index.to_string();
        let date = o.trade_date.format(RECORD_DATE_FORMAT).to_string();
        wtr.write_record([
            index.as_str(),
            o.symbol.as_str(),
            o.action.as_str(),
            date.as_str(),
            o.quantity.as_str(),
            o.price.as_str(),
            o.group.as_str(),
            o.status.as_str(),
            code,
            message,
        ])?;
    }

    wtr.flush().map_err(|e| AppError::FileWrite(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;
    use crate::models::result::{OutcomeStatus, TransactionOutcome};
    use crate::models::transaction::{Action, Transaction};
    use chrono::NaiveDate;

    #[test]
    fn test_report_rows() {
        let txn = Transaction {
            symbol: "AAPL".into(),
            action: Action::Buy,
            trade_date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            quantity: "5".into(),
            price: "185.6".into(),
            group: "Tech, US".into(),
        };
        let report = DispatchReport {
            outcomes: vec![
                TransactionOutcome::new(0, &txn, OutcomeStatus::Purchased),
                TransactionOutcome::new(1, &txn, OutcomeStatus::Failed).with_error(
                    &AppError::PurchaseFailed {
                        symbol: "AAPL".into(),
                        reason: "save button missing".into(),
                    },
                ),
            ],
            navigations: 2,
            aborted: None,
        };

        let mut buf = Vec::new();
        write_report(&report, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Index,Symbol,Action,Date"));
        assert_eq!(lines[1], "0,AAPL,BUY,2024-01-02,5,185.6,\"Tech, US\",purchased,,");
        assert!(lines[2].contains("failed,PURCHASE_FAILED,"));
        assert!(lines[2].contains("save button missing"));
    }

    #[test]
    fn test_write_report_csv_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv");
        write_report_csv(&DispatchReport::default(), &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 1);
    }
}
