use thiserror::Error;

use crate::species::Species;

/// Errors raised by the AQI engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AqiError {
    #[error("invalid concentration for {species}: {value}")]
    InvalidInput { species: Species, value: f64 },
    #[error("unsupported species: {0}")]
    UnsupportedSpecies(String),
    #[error("no pollutant data present")]
    NoData,
    #[error("invalid breakpoint table for {species}: {reason}")]
    InvalidTable {
        species: Species,
        reason: &'static str,
    },
}

/// Errors from unit normalization.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum UnitError {
    #[error("unsupported unit {unit:?} for {species}")]
    UnsupportedUnit { species: Species, unit: String },
    #[error("invalid value for {species}: {value}")]
    InvalidInput { species: Species, value: f64 },
}

/// Errors from CSV ingest.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("line {line}: {reason}")]
    Malformed { line: usize, reason: String },
    #[error("line {line}")]
    Species {
        line: usize,
        #[source]
        source: AqiError,
    },
    #[error("line {line}")]
    Unit {
        line: usize,
        #[source]
        source: UnitError,
    },
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config {path}: {message}")]
    Parse { path: String, message: String },
    #[error("invalid config field {field}: {message}")]
    Validation { field: String, message: String },
}
