use std::io::{BufRead, Read};

use chrono::NaiveDate;
use csv::StringRecord;

use crate::errors::AppError;
use crate::models::portfolio::PortfolioEntry;
use crate::models::transaction::{Action, Transaction, RECORD_DATE_FORMAT};

/// Header prefix of transaction files.
pub const TRANSACTION_HEADER: &str = "Symbol";

/// Header prefix of portfolio-directory files.
pub const PORTFOLIO_HEADER: &str = "Group_Name";

/// Positional fields of a transaction line:
/// `symbol action trade_date quantity price <reserved> group`.
const TRANSACTION_FIELDS: usize = 7;

/// Blank lines, `#` comments and header lines carry no record.
fn is_skippable(line: &str, header: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.is_empty() || trimmed.starts_with('#') || trimmed.starts_with(header)
}

/// Parse one whitespace-delimited transaction line.
pub fn parse_transaction_line(line: &str) -> Result<Transaction, String> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() < TRANSACTION_FIELDS {
        return Err(format!(
            "expected {} fields, got {}",
            TRANSACTION_FIELDS,
            fields.len()
        ));
    }

    let action: Action = fields[1].parse()?;
    let trade_date = NaiveDate::parse_from_str(fields[2], RECORD_DATE_FORMAT)
        .map_err(|e| format!("invalid trade date '{}': {}", fields[2], e))?;

    Ok(Transaction {
        symbol: fields[0].to_string(),
        action,
        trade_date,
        quantity: fields[3].to_string(),
        price: fields[4].to_string(),
        // fields[5] is reserved
        group: fields[6].to_string(),
    })
}

/// Build an entry from one `group_name,target_reference` record.
fn portfolio_entry(record: &StringRecord) -> Result<PortfolioEntry, String> {
    if record.len() != 2 {
        return Err(format!("expected 2 comma-separated fields, got {}", record.len()));
    }
    Ok(PortfolioEntry {
        group: record[0].to_string(),
        target: record[1].trim_start().to_string(),
    })
}

/// Whitespace-only lines, indented comments and the header row.
fn is_skippable_record(record: &StringRecord) -> bool {
    match record.get(0) {
        None => true,
        Some(first) if record.len() == 1 && first.trim().is_empty() => true,
        Some(first) => is_skippable(first, PORTFOLIO_HEADER),
    }
}

/// Parse every record of a transaction file. The first bad line fails the whole file.
pub fn parse_transactions<R: BufRead>(
    reader: R,
    source_name: &str,
) -> Result<Vec<Transaction>, AppError> {
    let mut records = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if is_skippable(&line, TRANSACTION_HEADER) {
            continue;
        }
        let txn = parse_transaction_line(&line)
            .map_err(|msg| AppError::malformed(source_name, idx + 1, msg))?;
        records.push(txn);
    }
    Ok(records)
}

/// Parse every entry of a portfolio-directory file.
///
/// Fields are split on bare commas; quotes carry no meaning in these files.
pub fn parse_portfolio_entries<R: Read>(
    reader: R,
    source_name: &str,
) -> Result<Vec<PortfolioEntry>, AppError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .comment(Some(b'#'))
        .from_reader(reader);

    let mut entries = Vec::new();
    for result in rdr.records() {
        let record = result.map_err(|e| {
            let line = e.position().map_or(0, |p| p.line() as usize);
            AppError::malformed(source_name, line, e.to_string())
        })?;
        if is_skippable_record(&record) {
            continue;
        }
        let line = record.position().map_or(0, |p| p.line() as usize);
        let entry =
            portfolio_entry(&record).map_err(|msg| AppError::malformed(source_name, line, msg))?;
        entries.push(entry);
    }
    Ok(entries)
}
