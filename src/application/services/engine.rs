//! Commission engine: orchestrates build, validation, profit derivation and aggregation.

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, info, instrument};

use crate::application::ApplicationResult;
use crate::domain::{
    CommissionCalculator, CommissionMap, DailyProfitCalculator, DomainError, DomainResult,
    ForestBuilder, ForestValidator, LevelDistribution, NetworkStats, PerformanceMetrics,
    TreeStatistics, ValidatedForest,
};

/// Outcome of one complete calculation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommissionReport {
    pub commissions: CommissionMap,
    /// Days in the reference month used as divisor
    pub days_in_month: u32,
    pub stats: NetworkStats,
}

/// Run the whole pipeline on one request: build, validate, derive, aggregate.
#[instrument(level = "debug", skip(data))]
pub fn calculate_commissions(
    data: &Value,
    target_date: Option<NaiveDate>,
) -> ApplicationResult<CommissionReport> {
    let forest = ForestBuilder::new().build_from_json(data)?;
    let mut forest = ForestValidator::new().validate(forest)?;
    let days = DailyProfitCalculator::new().calculate_daily_profits(&mut forest, target_date)?;
    let commissions = CommissionCalculator::new().calculate_commissions(&mut forest);
    Ok(CommissionReport {
        commissions,
        days_in_month: days,
        stats: TreeStatistics::new().get_stats(&forest),
    })
}

/// Holds the currently loaded network for a sequence of calls.
///
/// The engine is a plain value owned by its caller. A failed load leaves it
/// empty, and every query on an empty engine fails with [`DomainError::NotLoaded`].
#[derive(Debug, Default)]
pub struct CommissionEngine {
    forest: Option<ValidatedForest>,
    builder: ForestBuilder,
    validator: ForestValidator,
    profit_calculator: DailyProfitCalculator,
    commission_calculator: CommissionCalculator,
    statistics: TreeStatistics,
}

impl CommissionEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build and validate the partner network from JSON input.
    #[instrument(level = "debug", skip_all)]
    pub fn load_partners(&mut self, data: &Value) -> ApplicationResult<()> {
        self.forest = None;
        let loaded = self
            .builder
            .build_from_json(data)
            .and_then(|forest| self.validator.validate(forest));
        match loaded {
            Ok(forest) => {
                info!("Successfully loaded {} partners", forest.len());
                self.forest = Some(forest);
                Ok(())
            }
            Err(e) => {
                error!("Failed to load partners: {}", e);
                Err(e.into())
            }
        }
    }

    /// Derive daily profits for the month of `target_date` (today if None).
    pub fn calculate_daily_profits(&mut self, target_date: Option<NaiveDate>) -> ApplicationResult<()> {
        let forest = self.forest.as_mut().ok_or(DomainError::NotLoaded)?;
        debug!("Calculating daily profits for date: {:?}", target_date);
        self.profit_calculator
            .calculate_daily_profits(forest, target_date)
            .inspect_err(|e| error!("Failed to calculate daily profits: {}", e))?;
        Ok(())
    }

    pub fn calculate_commissions(&mut self) -> ApplicationResult<CommissionMap> {
        let forest = self.forest.as_mut().ok_or(DomainError::NotLoaded)?;
        let result = self.commission_calculator.calculate_commissions(forest);
        info!("Commission calculation completed for {} partners", result.len());
        Ok(result)
    }

    pub fn get_stats(&self) -> ApplicationResult<NetworkStats> {
        Ok(self.statistics.get_stats(self.forest()?))
    }

    pub fn get_level_distribution(&self) -> ApplicationResult<LevelDistribution> {
        Ok(self.statistics.get_level_distribution(self.forest()?))
    }

    pub fn get_performance_metrics(&self) -> ApplicationResult<PerformanceMetrics> {
        Ok(self.statistics.get_performance_metrics(self.forest()?))
    }

    /// The loaded forest.
    pub fn forest(&self) -> DomainResult<&ValidatedForest> {
        self.forest.as_ref().ok_or(DomainError::NotLoaded)
    }

    pub fn reset(&mut self) {
        debug!("Resetting commission engine state");
        self.forest = None;
    }

    pub fn is_loaded(&self) -> bool {
        self.forest.is_some()
    }
}
