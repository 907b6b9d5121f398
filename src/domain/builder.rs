//! Forest builder: turns a flat list of partner records into a linked forest.

use serde_json::Value;
use tracing::{debug, instrument};

use crate::domain::arena::Forest;
use crate::domain::entities::{Partner, PartnerRecord};
use crate::domain::error::{DomainError, DomainResult};

/// Constructs a [`Forest`] from input records.
///
/// Children are wired in a second pass after all nodes exist, so a child
/// record may appear before its parent in the input.
#[derive(Debug, Default)]
pub struct ForestBuilder;

impl ForestBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Build a forest from a JSON array of partner records.
    ///
    /// The returned forest is NOT checked for cycles or roots; run
    /// [`crate::domain::ForestValidator::validate`] on it next.
    #[instrument(level = "debug", skip_all)]
    pub fn build_from_json(&self, data: &Value) -> DomainResult<Forest> {
        let items = data
            .as_array()
            .ok_or_else(|| DomainError::invalid_type("list", data))?;
        if items.is_empty() {
            return Err(DomainError::Validation(
                "partner data cannot be empty".to_string(),
            ));
        }

        let records = items
            .iter()
            .enumerate()
            .map(|(i, item)| PartnerRecord::from_json(item, i))
            .collect::<DomainResult<Vec<_>>>()?;

        self.build(records)
    }

    /// Build a forest from already parsed records.
    #[instrument(level = "debug", skip_all, fields(records = records.len()))]
    pub fn build(&self, records: Vec<PartnerRecord>) -> DomainResult<Forest> {
        if records.is_empty() {
            return Err(DomainError::Validation(
                "partner data cannot be empty".to_string(),
            ));
        }

        let mut forest = Forest::with_capacity(records.len());

        // Pass 1: one node per record
        for (index, record) in records.into_iter().enumerate() {
            let id = record.id;
            if forest.insert_partner(Partner::from(record)).is_none() {
                return Err(DomainError::DuplicateId { id, index });
            }
        }

        // Pass 2: parent -> children edges, in input order
        let indices = forest.indices().to_vec();
        for idx in indices {
            let Some(node) = forest.get_node(idx) else {
                continue;
            };
            let Some(parent_id) = node.data.parent_id else {
                continue;
            };
            let partner_id = node.data.id;
            let parent_idx = forest
                .index_of(parent_id)
                .ok_or(DomainError::ParentNotFound {
                    parent_id,
                    partner_id,
                })?;
            forest.link(parent_idx, idx);
        }

        debug!(
            "built forest: {} partners, {} roots",
            forest.len(),
            forest.roots().len()
        );
        Ok(forest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn given_child_before_parent_when_building_then_edge_is_wired() {
        let data = json!([
            {"id": 2, "parent_id": 1, "monthly_revenue": 10},
            {"id": 1, "monthly_revenue": 20},
        ]);
        let forest = ForestBuilder::new().build_from_json(&data).unwrap();

        let root = forest.index_of(1).unwrap();
        let child = forest.index_of(2).unwrap();
        assert_eq!(forest.roots(), &[root]);
        assert_eq!(forest.get_node(root).unwrap().children, vec![child]);
        assert_eq!(forest.get_node(child).unwrap().parent, Some(root));
    }

    #[test]
    fn given_children_when_building_then_input_order_is_kept() {
        let data = json!([
            {"id": 1, "monthly_revenue": 0},
            {"id": 4, "parent_id": 1, "monthly_revenue": 0},
            {"id": 3, "parent_id": 1, "monthly_revenue": 0},
            {"id": 2, "parent_id": 1, "monthly_revenue": 0},
        ]);
        let forest = ForestBuilder::new().build_from_json(&data).unwrap();
        let root = forest.get_node(forest.index_of(1).unwrap()).unwrap();
        let children: Vec<_> = root
            .children
            .iter()
            .map(|&c| forest.get_node(c).unwrap().data.id)
            .collect();
        assert_eq!(children, vec![4, 3, 2]);
    }

    #[test]
    fn given_not_a_list_when_building_then_type_error() {
        let data = json!({"id": 1, "monthly_revenue": 0});
        let err = ForestBuilder::new().build_from_json(&data).unwrap_err();
        assert_eq!(
            err,
            DomainError::InvalidType {
                expected: "list".to_string(),
                actual: "object".to_string()
            }
        );
    }

    #[test]
    fn given_empty_list_when_building_then_validation_error() {
        let err = ForestBuilder::new().build_from_json(&json!([])).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn given_missing_parent_when_building_then_names_both_ids() {
        let data = json!([{"id": 1, "parent_id": 999, "monthly_revenue": 100}]);
        let err = ForestBuilder::new().build_from_json(&data).unwrap_err();
        assert_eq!(
            err,
            DomainError::ParentNotFound {
                parent_id: 999,
                partner_id: 1
            }
        );
    }

    #[test]
    fn given_duplicate_ids_when_building_then_rejected() {
        let data = json!([
            {"id": 1, "monthly_revenue": 0},
            {"id": 1, "monthly_revenue": 5},
        ]);
        let err = ForestBuilder::new().build_from_json(&data).unwrap_err();
        assert_eq!(err, DomainError::DuplicateId { id: 1, index: 1 });
    }

    #[test]
    fn given_cycle_when_building_then_builder_does_not_reject_it() {
        let data = json!([
            {"id": 1, "parent_id": 2, "monthly_revenue": 0},
            {"id": 2, "parent_id": 1, "monthly_revenue": 0},
        ]);
        let forest = ForestBuilder::new().build_from_json(&data).unwrap();
        assert!(forest.roots().is_empty());
    }
}
