//! File processing: JSON partner list in, JSON commission mapping out.

use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, instrument};

use crate::application::services::engine::CommissionEngine;
use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{CommissionMap, LevelDistribution, NetworkStats};
use crate::infrastructure::traits::FileSystem;

/// Default indentation of written JSON files.
pub const DEFAULT_JSON_INDENT: usize = 2;

/// Result of processing one input file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessingReport {
    pub commissions: CommissionMap,
    pub total_partners: usize,
    /// Reference date if one was given, ISO formatted
    pub processing_date: Option<String>,
    pub statistics: Option<NetworkStats>,
    pub level_distribution: Option<LevelDistribution>,
}

/// Result of a validate-only run. Never an error: failures are reported in the struct.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub partner_count: Option<usize>,
    pub statistics: Option<NetworkStats>,
    pub message: String,
    pub error: Option<String>,
}

/// Handles file I/O around the commission engine.
pub struct FileProcessor {
    fs: Arc<dyn FileSystem>,
    json_indent: usize,
}

impl FileProcessor {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self {
            fs,
            json_indent: DEFAULT_JSON_INDENT,
        }
    }

    pub fn with_indent(mut self, json_indent: usize) -> Self {
        self.json_indent = json_indent;
        self
    }

    /// Read and parse a JSON input file.
    pub fn read_json(&self, path: &Path) -> ApplicationResult<Value> {
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read input file", path)?;
        serde_json::from_str(&content).map_err(|source| ApplicationError::InvalidJson {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Serialize `data` as indented JSON, creating the parent directory if needed.
    pub fn write_json<T: Serialize + ?Sized>(&self, path: &Path, data: &T) -> ApplicationResult<()> {
        let indent = " ".repeat(self.json_indent);
        let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
        let mut buf = Vec::new();
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        data.serialize(&mut ser)
            .map_err(|e| ApplicationError::OperationFailed {
                context: format!("serialize output for {}", path.display()),
                source: Box::new(e),
            })?;
        buf.push(b'\n');
        let content = String::from_utf8(buf).map_err(|e| ApplicationError::OperationFailed {
            context: format!("encode output for {}", path.display()),
            source: Box::new(e),
        })?;

        self.fs
            .ensure_parent(path)
            .with_path_context("create output directory", path)?;
        self.fs
            .write(path, &content)
            .with_path_context("write output file", path)
    }

    /// Load an input file into a fresh engine (build + validate only).
    pub fn load_engine(&self, input: &Path) -> ApplicationResult<(CommissionEngine, usize)> {
        let data = self.read_json(input)?;
        let count = data.as_array().map(Vec::len).unwrap_or_default();
        let mut engine = CommissionEngine::new();
        engine.load_partners(&data)?;
        Ok((engine, count))
    }

    /// Calculate commissions for `input` and write the mapping to `output`.
    #[instrument(level = "debug", skip(self))]
    pub fn process_commission_file(
        &self,
        input: &Path,
        output: &Path,
        target_date: Option<NaiveDate>,
        include_stats: bool,
    ) -> ApplicationResult<ProcessingReport> {
        info!(
            "Starting commission processing: {} -> {}",
            input.display(),
            output.display()
        );
        let (mut engine, total_partners) = self.load_engine(input)?;
        info!("Loaded {} partners from input file", total_partners);

        engine.calculate_daily_profits(target_date)?;
        let commissions = engine.calculate_commissions()?;

        self.write_json(output, &commissions)?;
        info!("Commission results saved to {}", output.display());

        let (statistics, level_distribution) = if include_stats {
            (
                Some(engine.get_stats()?),
                Some(engine.get_level_distribution()?),
            )
        } else {
            (None, None)
        };

        Ok(ProcessingReport {
            commissions,
            total_partners,
            processing_date: target_date.map(|d| d.format("%Y-%m-%d").to_string()),
            statistics,
            level_distribution,
        })
    }

    /// Check an input file's structure without calculating anything.
    #[instrument(level = "debug", skip(self))]
    pub fn validate_input_file(&self, input: &Path) -> ValidationReport {
        match self.load_engine(input) {
            Ok((engine, partner_count)) => ValidationReport {
                valid: true,
                partner_count: Some(partner_count),
                statistics: engine.get_stats().ok(),
                message: "Input file is valid".to_string(),
                error: None,
            },
            Err(e) => {
                debug!("validation failed: {}", e);
                ValidationReport {
                    valid: false,
                    partner_count: None,
                    statistics: None,
                    message: format!("Input file validation failed: {}", e),
                    error: Some(e.to_string()),
                }
            }
        }
    }
}
