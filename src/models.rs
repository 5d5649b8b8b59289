use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// Reserved period label holding a customer's points across all months.
pub const TOTAL_REWARDS_KEY: &str = "Total Rewards";

/// Points per period label for one customer, e.g. `{"January": 90, "Total Rewards": 90}`.
pub type MonthlyRewards = BTreeMap<String, u64>;

/// Customer name -> monthly rewards.
pub type RewardReport = BTreeMap<String, MonthlyRewards>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i64,
    /// Purchase amount in currency units, expected to be >= 0
    pub purchase_amount: f64,
    pub date: NaiveDate,
}

impl Transaction {
    pub fn new(id: i64, purchase_amount: f64, date: NaiveDate) -> Self {
        Self { id, purchase_amount, date }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

impl Customer {
    pub fn new(id: i64, name: impl Into<String>, transactions: Vec<Transaction>) -> Self {
        Self { id, name: name.into(), transactions }
    }
}

/// Used for the "report" table output
#[derive(Debug, Clone, PartialEq, Serialize, Tabled)]
pub struct RewardRow {
    pub customer: String,
    /// Month name or "Total Rewards"
    pub period: String,
    pub points: u64,
}

/// Flattens a report into table rows, months first and the total last for each customer.
pub fn report_rows(report: &RewardReport) -> Vec<RewardRow> {
    let mut rows = Vec::new();
    for (customer, monthly) in report {
        let months = monthly.iter().filter(|(period, _)| *period != TOTAL_REWARDS_KEY);
        for (period, points) in months {
            rows.push(RewardRow {
                customer: customer.clone(),
                period: period.clone(),
                points: *points,
            });
        }
        if let Some(total) = monthly.get(TOTAL_REWARDS_KEY) {
            rows.push(RewardRow {
                customer: customer.clone(),
                period: TOTAL_REWARDS_KEY.to_string(),
                points: *total,
            });
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_deserializes_iso_date() {
        let tx: Transaction =
            serde_json::from_str(r#"{"id": 7, "purchase_amount": 120.5, "date": "2024-01-04"}"#).unwrap();
        assert_eq!(tx.id, 7);
        assert_eq!(tx.purchase_amount, 120.5);
        assert_eq!(tx.date, NaiveDate::from_ymd_opt(2024, 1, 4).unwrap());
    }

    #[test]
    fn test_customer_without_transactions_field() {
        let customer: Customer = serde_json::from_str(r#"{"id": 1, "name": "Ann"}"#).unwrap();
        assert!(customer.transactions.is_empty());
    }

    #[test]
    fn test_report_rows_total_last() {
        let mut monthly = MonthlyRewards::new();
        monthly.insert("March".to_string(), 10);
        monthly.insert(TOTAL_REWARDS_KEY.to_string(), 15);
        monthly.insert("February".to_string(), 5);
        let mut report = RewardReport::new();
        report.insert("Ann".to_string(), monthly);

        let rows = report_rows(&report);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].period, "February");
        assert_eq!(rows[1].period, "March");
        assert_eq!(rows[2].period, TOTAL_REWARDS_KEY);
        assert_eq!(rows[2].points, 15);
    }
}
