use std::fs;
use std::path::Path;

use anyhow::{Context, bail};
use chrono::NaiveDate;
use tracing::info;

use crate::error::{Result, RewardError};
use crate::models::{Customer, Transaction};

/// Read-only, in-memory directory of customers and their purchases.
#[derive(Debug, Clone, Default)]
pub struct CustomerStore {
    customers: Vec<Customer>,
}

impl CustomerStore {
    pub fn new(customers: Vec<Customer>) -> Self {
        Self { customers }
    }

    /// Built-in demonstration data set.
    pub fn sample() -> Self {
        Self::new(vec![
            Customer::new(
                10,
                "James Brown",
                vec![
                    Transaction::new(100, 120.0, ymd(2024, 1, 4)),
                    Transaction::new(101, 100.0, ymd(2024, 1, 5)),
                ],
            ),
            Customer::new(
                11,
                "Michael Phelps",
                vec![
                    Transaction::new(102, 50.0, ymd(2024, 1, 4)),
                    Transaction::new(103, 150.0, ymd(2024, 1, 8)),
                ],
            ),
            Customer::new(
                12,
                "Robert Williams",
                vec![
                    Transaction::new(104, 250.0, ymd(2024, 2, 8)),
                    Transaction::new(105, 60.0, ymd(2024, 3, 8)),
                ],
            ),
            Customer::new(
                13,
                "Linda Hamilton",
                vec![
                    Transaction::new(106, 200.0, ymd(2024, 1, 8)),
                    Transaction::new(107, 300.0, ymd(2024, 2, 8)),
                    Transaction::new(108, 400.0, ymd(2024, 3, 8)),
                ],
            ),
        ])
    }

    /// Loads a JSON array of customers, e.g.
    /// `[{"id": 1, "name": "Ann", "transactions": [{"id": 1, "purchase_amount": 120.0, "date": "2024-01-04"}]}]`
    pub fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("Failed to read customer data from {}", path.display()))?;
        let customers: Vec<Customer> = serde_json::from_str(&raw)
            .with_context(|| format!("Invalid customer data in {}", path.display()))?;

        for customer in &customers {
            if customer.name.trim().is_empty() {
                bail!(
                    "Customer {} in {} has an empty name",
                    customer.id,
                    path.display()
                );
            }
        }

        info!(path = %path.display(), customers = customers.len(), "Loaded customer data");
        Ok(Self::new(customers))
    }

    pub fn all(&self) -> &[Customer] {
        &self.customers
    }

    pub fn find_by_id(&self, id: i64) -> Result<&Customer> {
        self.customers
            .iter()
            .find(|c| c.id == id)
            .ok_or(RewardError::CustomerNotFound(id))
    }
}

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    // Only called with literal calendar dates above
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default()
}
