//! Daily profit derivation from monthly revenue.

use chrono::{Datelike, Local, NaiveDate};
use tracing::{debug, instrument};

use crate::domain::arena::ValidatedForest;
use crate::domain::error::{DomainError, DomainResult};

/// Divide, returning 0 when the denominator is 0.
pub fn safe_divide(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Number of calendar days in the given month, leap years included.
pub fn days_in_month(year: i32, month: u32) -> DomainResult<u32> {
    let invalid = || DomainError::InvalidDate(format!("{:04}-{:02}", year, month));
    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(invalid)?;
    u32::try_from(next.signed_duration_since(first).num_days()).map_err(|_| invalid())
}

/// Parse a reference date given as `YYYY-MM-DD` or `YYYY-MM`.
///
/// A bare month resolves to its first day.
pub fn parse_reference_date(s: &str) -> DomainResult<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d"))
        .map_err(|_| DomainError::InvalidDate(s.to_string()))
}

/// Sets every partner's daily profit from its monthly revenue.
#[derive(Debug, Default)]
pub struct DailyProfitCalculator;

impl DailyProfitCalculator {
    pub fn new() -> Self {
        Self
    }

    /// Derive daily profits for the month of `target_date` (today if None).
    ///
    /// Returns the number of days used as divisor.
    #[instrument(level = "debug", skip(self, forest))]
    pub fn calculate_daily_profits(
        &self,
        forest: &mut ValidatedForest,
        target_date: Option<NaiveDate>,
    ) -> DomainResult<u32> {
        let date = target_date.unwrap_or_else(|| Local::now().date_naive());
        let days = days_in_month(date.year(), date.month())?;
        debug!("{} days in month of {}", days, date);

        let forest = forest.forest_mut();
        for idx in forest.indices().to_vec() {
            if let Some(node) = forest.get_node_mut(idx) {
                node.data.daily_profit = safe_divide(node.data.monthly_revenue, f64::from(days));
            }
        }
        Ok(days)
    }
}
