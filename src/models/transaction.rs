use chrono::NaiveDate;

/// Date format used by transaction files.
pub const RECORD_DATE_FORMAT: &str = "%Y-%m-%d";

/// Date format the purchase dialog expects.
pub const ENTRY_DATE_FORMAT: &str = "%d/%m/%Y";

/// Direction of a recorded trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Buy,
    Sell,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::Buy => "BUY",
            Action::Sell => "SELL",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "BUY" => Ok(Action::Buy),
            "SELL" => Ok(Action::Sell),
            _ => Err(format!("Unknown action: {}", s)),
        }
    }
}

/// One buy or sell record, as read from a transaction file.
///
/// Quantity and price are kept verbatim: they are typed into the UI as-is and
/// never used for arithmetic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    /// Ticker, optionally exchange-qualified (e.g. `INFY.NS`).
    pub symbol: String,
    pub action: Action,
    pub trade_date: NaiveDate,
    pub quantity: String,
    pub price: String,
    /// Portfolio group this record belongs to.
    pub group: String,
}

impl Transaction {
    /// Symbol without its exchange suffix: everything before the first `.`.
    pub fn base_symbol(&self) -> &str {
        self.symbol.split('.').next().unwrap_or(&self.symbol)
    }

    /// Trade date in the `DD/MM/YYYY` form used for purchase entry.
    pub fn entry_date(&self) -> String {
        self.trade_date.format(ENTRY_DATE_FORMAT).to_string()
    }

    /// Human-readable detail line used in notices and error logs.
    pub fn describe(&self) -> String {
        format!(
            "symbol={} quantity={} price={} date={}",
            self.symbol,
            self.quantity,
            self.price,
            self.trade_date.format(RECORD_DATE_FORMAT)
        )
    }
}
