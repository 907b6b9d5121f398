//! Domain entities: partner records and network participants

use std::fmt;

use serde_json::{Map, Value};

use crate::domain::error::{json_type_name, DomainError, DomainResult};

/// Identifier of a partner, unique across one network.
pub type PartnerId = i64;

/// One validated input record, before it is linked into a forest.
#[derive(Debug, Clone, PartialEq)]
pub struct PartnerRecord {
    pub id: PartnerId,
    pub parent_id: Option<PartnerId>,
    pub name: String,
    pub monthly_revenue: f64,
}

impl PartnerRecord {
    /// Parse one element of the input list.
    ///
    /// `index` is the position in the input list and only used for error messages.
    pub fn from_json(value: &Value, index: usize) -> DomainResult<Self> {
        let obj = value.as_object().ok_or_else(|| DomainError::InvalidType {
            expected: format!("object for partner at index {}", index),
            actual: json_type_name(value).to_string(),
        })?;

        let id = Self::required(obj, "id", index)?;
        let id = id.as_i64().ok_or_else(|| {
            DomainError::Validation(format!("partner id at index {} must be integer", index))
        })?;

        let parent_id = match obj.get("parent_id") {
            None | Some(Value::Null) => None,
            Some(v) => Some(v.as_i64().ok_or_else(|| {
                DomainError::Validation(format!(
                    "parent id of partner {} must be integer or null",
                    id
                ))
            })?),
        };

        let name = match obj.get("name") {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => {
                return Err(DomainError::InvalidType {
                    expected: format!("string name for partner {}", id),
                    actual: json_type_name(other).to_string(),
                })
            }
        };

        let revenue = Self::required(obj, "monthly_revenue", index)?;
        let monthly_revenue = revenue.as_f64().ok_or_else(|| {
            DomainError::Validation(format!("monthly revenue at index {} must be numeric", index))
        })?;
        if monthly_revenue < 0.0 {
            return Err(DomainError::Validation(format!(
                "monthly revenue of partner {} must not be negative: {}",
                id, monthly_revenue
            )));
        }

        Ok(Self {
            id,
            parent_id,
            name,
            monthly_revenue,
        })
    }

    fn required<'a>(obj: &'a Map<String, Value>, field: &str, index: usize) -> DomainResult<&'a Value> {
        obj.get(field).ok_or_else(|| {
            DomainError::Validation(format!(
                "partner at index {} missing required field: {}",
                index, field
            ))
        })
    }
}

/// A participant of the partner network with its derived figures.
#[derive(Debug, Clone, PartialEq)]
pub struct Partner {
    pub id: PartnerId,
    /// None for root partners
    pub parent_id: Option<PartnerId>,
    pub name: String,
    pub monthly_revenue: f64,
    /// Set by the profit deriver, 0 before
    pub daily_profit: f64,
    /// Set by the commission aggregator, 0 before
    pub total_commission: f64,
}

impl Partner {
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

impl From<PartnerRecord> for Partner {
    fn from(record: PartnerRecord) -> Self {
        Self {
            id: record.id,
            parent_id: record.parent_id,
            name: record.name,
            monthly_revenue: record.monthly_revenue,
            daily_profit: 0.0,
            total_commission: 0.0,
        }
    }
}

impl fmt::Display for Partner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "#{}", self.id)
        } else {
            write!(f, "#{} {}", self.id, self.name)
        }
    }
}
