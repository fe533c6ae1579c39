//! Conversion of reported concentrations into each species' canonical unit.
//!
//! Mass-to-volume conversion for gases uses the ideal gas law at 1 atm.

use crate::error::UnitError;
use crate::species::{CanonicalUnit, Species};

/// Standard reference temperature (25 °C).
pub const REFERENCE_TEMPERATURE_K: f64 = 298.15;

/// Gas constant in L·atm/(mol·K).
const R_L_ATM: f64 = 0.082_057_366;

/// Molar volume of an ideal gas at 1 atm, in L/mol.
pub fn molar_volume_l_per_mol(temperature_k: f64) -> f64 {
    R_L_ATM * temperature_k
}

/// A reported amount, either as mass density or as mixing ratio.
enum Amount {
    MicrogramsPerCubicMeter(f64),
    Ppb(f64),
}

fn parse_amount(species: Species, value: f64, unit: &str) -> Result<Amount, UnitError> {
    let normalized = unit.trim().to_ascii_lowercase().replace(['µ', 'μ'], "u").replace('³', "3");
    match normalized.as_str() {
        "ug/m3" | "ugm3" | "ug m-3" => Ok(Amount::MicrogramsPerCubicMeter(value)),
        "mg/m3" | "mgm3" | "mg m-3" => Ok(Amount::MicrogramsPerCubicMeter(value * 1e3)),
        "ppb" => Ok(Amount::Ppb(value)),
        "ppm" => Ok(Amount::Ppb(value * 1e3)),
        _ => Err(UnitError::UnsupportedUnit {
            species,
            unit: unit.to_string(),
        }),
    }
}

/// Converts `value` in `unit` into `species`' canonical unit.
///
/// Particulates accept mass units only. Gases convert between mass and
/// mixing ratio at `temperature_k`.
pub fn normalize(
    species: Species,
    value: f64,
    unit: &str,
    temperature_k: f64,
) -> Result<f64, UnitError> {
    if !value.is_finite() || value < 0.0 {
        return Err(UnitError::InvalidInput { species, value });
    }
    let amount = parse_amount(species, value, unit)?;

    let Some(molar_mass) = species.molar_mass_g_per_mol() else {
        return match amount {
            Amount::MicrogramsPerCubicMeter(v) => Ok(v),
            Amount::Ppb(_) => Err(UnitError::UnsupportedUnit {
                species,
                unit: unit.to_string(),
            }),
        };
    };

    // ppb = ug/m3 * Vm / MW
    let ppb = match amount {
        Amount::Ppb(v) => v,
        Amount::MicrogramsPerCubicMeter(v) => {
            v * molar_volume_l_per_mol(temperature_k) / molar_mass
        }
    };
    Ok(match species.canonical_unit() {
        CanonicalUnit::Ppb => ppb,
        CanonicalUnit::Ppm => ppb / 1e3,
        CanonicalUnit::MicrogramsPerCubicMeter => {
            ppb * molar_mass / molar_volume_l_per_mol(temperature_k)
        }
    })
}
