use crate::models::config::DateRange;
use crate::models::transaction::Transaction;

/// Drop transactions traded outside `range` (both ends inclusive).
/// Returns how many were removed.
pub fn filter_by_date(transactions: &mut Vec<Transaction>, range: &DateRange) -> usize {
    let before = transactions.len();
    transactions.retain(|t| range.contains(t.trade_date));
    before - transactions.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::transaction::Action;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn on(day: NaiveDate) -> Transaction {
        Transaction {
            symbol: "AAPL".to_string(),
            action: Action::Buy,
            trade_date: day,
            quantity: "1".to_string(),
            price: "100".to_string(),
            group: "Tech".to_string(),
        }
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let range = DateRange::new(Some(date(2024, 1, 10)), Some(date(2024, 1, 20)));
        let mut txns = vec![
            on(date(2024, 1, 9)),
            on(date(2024, 1, 10)),
            on(date(2024, 1, 15)),
            on(date(2024, 1, 20)),
            on(date(2024, 1, 21)),
        ];
        let removed = filter_by_date(&mut txns, &range);
        assert_eq!(removed, 2);
        let kept: Vec<NaiveDate> = txns.iter().map(|t| t.trade_date).collect();
        assert_eq!(kept, vec![date(2024, 1, 10), date(2024, 1, 15), date(2024, 1, 20)]);
    }

    #[test]
    fn test_open_ended_range_keeps_everything() {
        let mut txns = vec![on(date(1999, 12, 31)), on(date(2030, 6, 1))];
        assert_eq!(filter_by_date(&mut txns, &DateRange::default()), 0);
        assert_eq!(txns.len(), 2);
    }

    #[test]
    fn test_filter_is_idempotent() {
        let range = DateRange::new(Some(date(2024, 1, 10)), None);
        let mut txns = vec![on(date(2024, 1, 1)), on(date(2024, 1, 10)), on(date(2024, 2, 1))];
        filter_by_date(&mut txns, &range);
        let once = txns.clone();
        assert_eq!(filter_by_date(&mut txns, &range), 0);
        assert_eq!(txns, once);
    }
}
