//! `airguard.toml` configuration.
//!
//! Resolution order (highest priority first):
//! 1. CLI flags (applied via [`AirGuardConfig::apply_cli_overrides`])
//! 2. Environment variables (`AIRGUARD_*`)
//! 3. The config file, if one is given
//! 4. Compiled defaults

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::breakpoints::{Breakpoint, BreakpointTable};
use crate::engine::AqiEngine;
use crate::error::ConfigError;
use crate::species::Species;
use crate::units::REFERENCE_TEMPERATURE_K;

pub const TEMPERATURE_ENV: &str = "AIRGUARD_TEMPERATURE_K";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UnitsConfig {
    /// Air temperature used for mass/mixing-ratio conversion.
    pub temperature_k: f64,
}

impl Default for UnitsConfig {
    fn default() -> Self {
        Self {
            temperature_k: REFERENCE_TEMPERATURE_K,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AirGuardConfig {
    pub units: UnitsConfig,
    /// Per-species table overrides keyed by species identifier; rows are
    /// `[c_low, c_high, i_low, i_high]`.
    pub breakpoints: BTreeMap<String, Vec<[f64; 4]>>,
}

/// Values supplied on the command line.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub temperature_k: Option<f64>,
}

impl AirGuardConfig {
    pub fn load(path: Option<&Path>, cli: Option<&CliOverrides>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides()?;
        if let Some(cli) = cli {
            config.apply_cli_overrides(cli);
        }
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::Parse {
            path: "<string>".to_string(),
            message: e.to_string(),
        })
    }

    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(raw) = std::env::var(TEMPERATURE_ENV) {
            self.units.temperature_k =
                raw.trim().parse().map_err(|_| ConfigError::Validation {
                    field: TEMPERATURE_ENV.to_string(),
                    message: format!("not a number: {raw:?}"),
                })?;
        }
        Ok(())
    }

    pub fn apply_cli_overrides(&mut self, cli: &CliOverrides) {
        if let Some(t) = cli.temperature_k {
            self.units.temperature_k = t;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let t = self.units.temperature_k;
        if !t.is_finite() || t <= 0.0 {
            return Err(ConfigError::Validation {
                field: "units.temperature_k".to_string(),
                message: "must be a positive temperature in kelvin".to_string(),
            });
        }
        self.build_engine().map(|_| ())
    }

    /// EPA engine with the configured table overrides applied.
    pub fn build_engine(&self) -> Result<AqiEngine, ConfigError> {
        let mut engine = AqiEngine::epa();
        for (key, rows) in &self.breakpoints {
            let field = format!("breakpoints.{key}");
            let species: Species = key.parse().map_err(|e| ConfigError::Validation {
                field: field.clone(),
                message: format!("{e}"),
            })?;
            let segments = rows
                .iter()
                .map(|row| to_breakpoint(row, &field))
                .collect::<Result<Vec<_>, _>>()?;
            let table =
                BreakpointTable::new(species, segments).map_err(|e| ConfigError::Validation {
                    field: field.clone(),
                    message: e.to_string(),
                })?;
            engine = engine.with_table(table);
        }
        Ok(engine)
    }
}

fn to_breakpoint(row: &[f64; 4], field: &str) -> Result<Breakpoint, ConfigError> {
    let index = |v: f64| -> Result<u16, ConfigError> {
        if v.fract() == 0.0 && (0.0..=f64::from(u16::MAX)).contains(&v) {
            Ok(v as u16)
        } else {
            Err(ConfigError::Validation {
                field: field.to_string(),
                message: format!("index bound {v} is not a non-negative integer"),
            })
        }
    };
    Ok(Breakpoint::new(row[0], row[1], index(row[2])?, index(row[3])?))
}
