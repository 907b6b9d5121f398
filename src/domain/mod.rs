//! Domain layer: partner forest and commission calculation
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod builder;
pub mod commission;
pub mod entities;
pub mod error;
pub mod profit;
pub mod stats;
pub mod validator;

pub use arena::{Forest, TreeNode, ValidatedForest};
pub use builder::ForestBuilder;
pub use commission::{round_currency, CommissionCalculator, CommissionMap, COMMISSION_RATE};
pub use entities::*;
pub use error::{DomainError, DomainResult};
pub use profit::{days_in_month, parse_reference_date, safe_divide, DailyProfitCalculator};
pub use stats::{LevelDistribution, NetworkStats, PerformanceMetrics, TreeStatistics};
pub use validator::{CycleDetector, ForestValidator};
