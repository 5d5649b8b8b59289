use chrono::{Datelike, Month};
use tracing::{debug, info};

use crate::settings::RewardRates;
use crate::error::{Result, RewardError};
use crate::models::{Customer, MonthlyRewards, RewardReport, TOTAL_REWARDS_KEY};

const UPPER_THRESHOLD: f64 = 100.0;
const LOWER_THRESHOLD: f64 = 50.0;

/// Tiered reward-points calculator.
///
/// Every currency unit spent above 100 earns `rates.over_100` points, and every
/// unit between 50 and 100 earns `rates.between_50_and_100` points.
#[derive(Debug, Clone, Copy, Default)]
pub struct RewardCalculator {
    rates: RewardRates,
}

impl RewardCalculator {
    pub fn new(rates: RewardRates) -> Self {
        Self { rates }
    }

    pub fn rates(&self) -> RewardRates {
        self.rates
    }

    /// Points earned by a single purchase.
    ///
    /// Each tier's product is truncated toward zero before it is added.
    /// Amounts are expected to be >= 0; a negative amount earns nothing.
    pub fn points_for_transaction(&self, amount: f64) -> Result<u64> {
        if !amount.is_finite() {
            return Err(RewardError::Computation(format!(
                "purchase amount is not a finite number: {}",
                amount
            )));
        }

        let mut points: u64 = 0;
        let mut remaining = amount;

        if remaining > UPPER_THRESHOLD {
            points = add_points(points, tier_points(remaining - UPPER_THRESHOLD, self.rates.over_100))?;
            remaining = UPPER_THRESHOLD;
        }

        if remaining > LOWER_THRESHOLD {
            points = add_points(
                points,
                tier_points(remaining - LOWER_THRESHOLD, self.rates.between_50_and_100),
            )?;
        }

        Ok(points)
    }

    /// Rewards for one customer, grouped by month name.
    ///
    /// The year is ignored, so January 2023 and January 2024 land in the same bucket.
    /// The returned report has a single entry keyed by the customer's name.
    pub fn rewards_for_customer(&self, customer: &Customer) -> Result<RewardReport> {
        let monthly = self.monthly_rewards(customer)?;
        let mut report = RewardReport::new();
        report.insert(customer.name.clone(), monthly);
        Ok(report)
    }

    /// Rewards for every customer, keyed by customer name.
    pub fn rewards_for_customers(&self, customers: &[Customer]) -> Result<RewardReport> {
        if customers.is_empty() {
            return Err(RewardError::Validation(
                "Customer list cannot be null or empty".to_string(),
            ));
        }

        let mut report = RewardReport::new();
        for customer in customers {
            report.extend(self.rewards_for_customer(customer)?);
        }

        info!(customers = report.len(), "Reward points calculation completed");
        Ok(report)
    }

    fn monthly_rewards(&self, customer: &Customer) -> Result<MonthlyRewards> {
        if customer.name.trim().is_empty() {
            return Err(RewardError::Validation(format!(
                "Customer name cannot be empty. Customer ID: {}",
                customer.id
            )));
        }
        if customer.transactions.is_empty() {
            return Err(RewardError::Validation(format!(
                "Customer transactions cannot be null or empty. Customer ID: {}",
                customer.id
            )));
        }

        let mut monthly = MonthlyRewards::new();
        let mut total: u64 = 0;

        for transaction in &customer.transactions {
            let points = self.points_for_transaction(transaction.purchase_amount)?;
            total = add_points(total, points)?;

            let entry = monthly.entry(month_label(transaction.date.month())?).or_insert(0);
            *entry = add_points(*entry, points)?;
        }

        monthly.insert(TOTAL_REWARDS_KEY.to_string(), total);
        debug!(customer = %customer.name, total, "Total points for customer");
        Ok(monthly)
    }
}

/// Float-to-integer `as` casts truncate toward zero and saturate at the bounds.
fn tier_points(excess: f64, rate: u32) -> u64 {
    (excess * f64::from(rate)) as u64
}

fn add_points(acc: u64, points: u64) -> Result<u64> {
    acc.checked_add(points)
        .ok_or_else(|| RewardError::Computation("reward points overflowed".to_string()))
}

fn month_label(month: u32) -> Result<String> {
    u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map(|m| m.name().to_string())
        .ok_or_else(|| RewardError::Computation(format!("invalid calendar month: {}", month)))
}
