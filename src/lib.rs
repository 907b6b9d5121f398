//! Daily commission calculation for multilevel partner networks.
//!
//! Partners form a forest: each has at most one parent. A partner earns a
//! fixed share of the daily profit generated by all of its descendants.
//! The pipeline is build, validate, derive daily profits, aggregate.

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;

pub use application::services::{calculate_commissions, CommissionEngine, CommissionReport};
pub use domain::{CommissionMap, DomainError, PartnerId, COMMISSION_RATE};
