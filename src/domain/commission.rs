//! Commission aggregation over the forest.

use std::collections::{BTreeMap, HashMap};

use generational_arena::Index;
use tracing::{debug, instrument};

use crate::domain::arena::ValidatedForest;

/// Share of the descendants' daily profit paid to a partner.
pub const COMMISSION_RATE: f64 = 0.05;

/// Decimal places of reported commissions.
pub const CURRENCY_DECIMALS: usize = 2;

/// Partner id (as string) to rounded commission.
pub type CommissionMap = BTreeMap<String, f64>;

/// Round to `decimal_places` on the exact binary value, ties to even.
///
/// `1.075` is stored as `1.07499..` and therefore rounds to `1.07`.
pub fn round_currency(value: f64, decimal_places: usize) -> f64 {
    format!("{:.*}", decimal_places, value)
        .parse()
        .unwrap_or(value)
}

/// Computes commissions with one post-order pass per root.
#[derive(Debug, Default)]
pub struct CommissionCalculator;

impl CommissionCalculator {
    pub fn new() -> Self {
        Self
    }

    /// Calculate every partner's commission from its descendants' daily profit.
    ///
    /// A partner earns on its subtree profit minus its own profit, so leaves earn 0.
    /// Runs in O(n) with an explicit stack of O(h).
    #[instrument(level = "debug", skip_all, fields(partners = forest.len()))]
    pub fn calculate_commissions(&self, forest: &mut ValidatedForest) -> CommissionMap {
        let forest = forest.forest_mut();

        for idx in forest.indices().to_vec() {
            if let Some(node) = forest.get_node_mut(idx) {
                node.data.total_commission = 0.0;
            }
        }

        let order: Vec<Index> = forest.iter_postorder().map(|(idx, _)| idx).collect();
        let mut subtree_profit: HashMap<Index, f64> = HashMap::with_capacity(order.len());

        for idx in order {
            let Some(node) = forest.get_node(idx) else {
                continue;
            };
            let mut profit = 0.0;
            for child in &node.children {
                profit += subtree_profit.get(child).copied().unwrap_or_default();
            }
            profit += node.data.daily_profit;
            let commission = (profit - node.data.daily_profit) * COMMISSION_RATE;
            subtree_profit.insert(idx, profit);

            if let Some(node) = forest.get_node_mut(idx) {
                node.data.total_commission = commission;
            }
        }
        debug!("aggregated {} subtrees", subtree_profit.len());

        forest
            .partners()
            .map(|p| {
                (
                    p.id.to_string(),
                    round_currency(p.total_commission, CURRENCY_DECIMALS),
                )
            })
            .collect()
    }
}
