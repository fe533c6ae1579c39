#![forbid(unsafe_code)]

//! AQI computation and categorization for AirGuard.
//!
//! The engine turns pollutant concentrations into EPA sub-indices, an
//! overall AQI, its category and the dominant pollutant. It is pure: no I/O,
//! no logging, no default values invented for missing data. Unit
//! normalization, CSV ingest and configuration live alongside it for the
//! calling layer.

pub mod breakpoints;
pub mod category;
pub mod config;
pub mod engine;
pub mod error;
pub mod ingest;
pub mod reading;
pub mod species;
pub mod units;

pub use breakpoints::{Breakpoint, BreakpointTable, AQI_CEILING};
pub use category::Category;
pub use config::{AirGuardConfig, CliOverrides};
pub use engine::{aggregate, aggregate_sub_indices, epa_engine, sub_index, AqiEngine};
pub use error::{AqiError, ConfigError, IngestError, UnitError};
pub use reading::{AqiReading, Concentrations};
pub use species::{CanonicalUnit, Species};
