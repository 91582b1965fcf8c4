//! # somatic-qc-rs - Somatic Workflow QC Utilities
//!
//! Helpers for a tumor/normal somatic variant-calling pipeline: detection of
//! the human reference build an alignment was made against, and an HTML QC
//! report comparing alignment and coverage statistics of the paired samples.

pub mod bam;
pub mod genome;
pub mod html;
pub mod inputs;
pub mod report;
pub mod stats;
pub mod utils;

use std::fmt;

/// Which half of the tumor/normal pair a set of inputs belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SampleType {
    Tumor,
    Normal,
}

impl SampleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SampleType::Tumor => "Tumor",
            SampleType::Normal => "Normal",
        }
    }
}

impl fmt::Display for SampleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration parameters for the QC report
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub tumor_cov_threshold: f64,
    pub normal_cov_threshold: f64,
    pub read_length_binwidth: f64,
    pub quality_binwidth: f64,
    pub accuracy_binwidth: f64,
}

impl ReportConfig {
    pub fn threshold(&self, sample: SampleType) -> f64 {
        match sample {
            SampleType::Tumor => self.tumor_cov_threshold,
            SampleType::Normal => self.normal_cov_threshold,
        }
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            tumor_cov_threshold: 30.0,
            normal_cov_threshold: 20.0,
            read_length_binwidth: 1000.0,
            quality_binwidth: 0.5,
            accuracy_binwidth: 0.1,
        }
    }
}

/// Validate report configuration parameters
pub fn validate_report_config(config: &ReportConfig) -> QcResult<()> {
    for (name, value) in [
        ("tumor_cov_threshold", config.tumor_cov_threshold),
        ("normal_cov_threshold", config.normal_cov_threshold),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(QcError::InvalidConfig(format!(
                "{} must be a non-negative number, got {}",
                name, value
            )));
        }
    }

    for (name, value) in [
        ("read_length_binwidth", config.read_length_binwidth),
        ("quality_binwidth", config.quality_binwidth),
        ("accuracy_binwidth", config.accuracy_binwidth),
    ] {
        if !value.is_finite() || value <= 0.0 {
            return Err(QcError::InvalidConfig(format!(
                "{} must be greater than 0, got {}",
                name, value
            )));
        }
    }

    Ok(())
}

/// Error types for the somatic QC library
#[derive(Debug, thiserror::Error)]
pub enum QcError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTSlib error: {0}")]
    Htslib(#[from] rust_htslib::errors::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed chromosome index line {line}: {content:?}")]
    MalformedIndex { line: usize, content: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type QcResult<T> = Result<T, QcError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_report_config(&ReportConfig::default()).is_ok());
    }

    #[test]
    fn test_invalid_config() {
        let config = ReportConfig {
            tumor_cov_threshold: -1.0,
            ..ReportConfig::default()
        };
        assert!(validate_report_config(&config).is_err());

        let config = ReportConfig {
            accuracy_binwidth: 0.0,
            ..ReportConfig::default()
        };
        assert!(validate_report_config(&config).is_err());

        let config = ReportConfig {
            normal_cov_threshold: f64::NAN,
            ..ReportConfig::default()
        };
        assert!(validate_report_config(&config).is_err());
    }

    #[test]
    fn test_threshold_lookup() {
        let config = ReportConfig::default();
        assert_eq!(config.threshold(SampleType::Tumor), 30.0);
        assert_eq!(config.threshold(SampleType::Normal), 20.0);
        assert_eq!(SampleType::Tumor.to_string(), "Tumor");
    }
}
