//! Application services

pub mod engine;
pub mod processor;

pub use engine::{calculate_commissions, CommissionEngine, CommissionReport};
pub use processor::{FileProcessor, ProcessingReport, ValidationReport};
