use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AqiError;

/// Pollutant species tracked by AirGuard.
///
/// Declaration order is the canonical order used for tie-breaking the
/// dominant pollutant, so `Ord` follows it.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Species {
    #[serde(rename = "PM2.5", alias = "pm2_5")]
    Pm25,
    #[serde(rename = "PM10", alias = "pm10")]
    Pm10,
    #[serde(rename = "O3", alias = "o3")]
    O3,
    #[serde(rename = "NO2", alias = "no2")]
    No2,
    #[serde(rename = "SO2", alias = "so2")]
    So2,
    #[serde(rename = "CO", alias = "co")]
    Co,
}

/// Unit a species' breakpoint table is expressed in.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CanonicalUnit {
    MicrogramsPerCubicMeter,
    Ppm,
    Ppb,
}

impl CanonicalUnit {
    pub fn symbol(self) -> &'static str {
        match self {
            CanonicalUnit::MicrogramsPerCubicMeter => "ug/m3",
            CanonicalUnit::Ppm => "ppm",
            CanonicalUnit::Ppb => "ppb",
        }
    }
}

impl Species {
    /// All species in canonical order.
    pub const ALL: [Species; 6] = [
        Species::Pm25,
        Species::Pm10,
        Species::O3,
        Species::No2,
        Species::So2,
        Species::Co,
    ];

    /// Identifier stored as `dominantPollutant`.
    pub fn as_str(self) -> &'static str {
        match self {
            Species::Pm25 => "PM2.5",
            Species::Pm10 => "PM10",
            Species::O3 => "O3",
            Species::No2 => "NO2",
            Species::So2 => "SO2",
            Species::Co => "CO",
        }
    }

    /// Field name in the AQI record's `pollutants` object.
    pub fn key(self) -> &'static str {
        match self {
            Species::Pm25 => "pm2_5",
            Species::Pm10 => "pm10",
            Species::O3 => "o3",
            Species::No2 => "no2",
            Species::So2 => "so2",
            Species::Co => "co",
        }
    }

    /// Position in canonical order.
    pub fn index(self) -> usize {
        self as usize
    }

    pub fn canonical_unit(self) -> CanonicalUnit {
        match self {
            Species::Pm25 | Species::Pm10 => CanonicalUnit::MicrogramsPerCubicMeter,
            Species::O3 | Species::Co => CanonicalUnit::Ppm,
            Species::No2 | Species::So2 => CanonicalUnit::Ppb,
        }
    }

    /// Truncation step applied before breakpoint lookup.
    pub fn resolution(self) -> f64 {
        match self {
            Species::Pm25 | Species::Co => 0.1,
            Species::Pm10 | Species::No2 | Species::So2 => 1.0,
            Species::O3 => 0.001,
        }
    }

    /// Molar mass in g/mol; `None` for particulates.
    pub fn molar_mass_g_per_mol(self) -> Option<f64> {
        match self {
            Species::Pm25 | Species::Pm10 => None,
            Species::O3 => Some(48.00),
            Species::No2 => Some(46.01),
            Species::So2 => Some(64.07),
            Species::Co => Some(28.01),
        }
    }

    pub fn is_particulate(self) -> bool {
        self.molar_mass_g_per_mol().is_none()
    }
}

impl fmt::Display for Species {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Species {
    type Err = AqiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "pm2.5" | "pm2_5" | "pm25" | "pm_2_5" => Ok(Species::Pm25),
            "pm10" | "pm_10" => Ok(Species::Pm10),
            "o3" | "ozone" => Ok(Species::O3),
            "no2" => Ok(Species::No2),
            "so2" => Ok(Species::So2),
            "co" => Ok(Species::Co),
            _ => Err(AqiError::UnsupportedSpecies(s.trim().to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_identifiers_and_record_keys() {
        for species in Species::ALL {
            assert_eq!(species.as_str().parse::<Species>().unwrap(), species);
            assert_eq!(species.key().parse::<Species>().unwrap(), species);
        }
        assert_eq!("pm25".parse::<Species>().unwrap(), Species::Pm25);
        assert_eq!(" Ozone ".parse::<Species>().unwrap(), Species::O3);
    }

    #[test]
    fn rejects_unknown_species() {
        let err = "NH3".parse::<Species>().unwrap_err();
        assert_eq!(err, AqiError::UnsupportedSpecies("NH3".into()));
    }

    #[test]
    fn canonical_order_matches_ord() {
        let mut sorted = Species::ALL;
        sorted.sort();
        assert_eq!(sorted, Species::ALL);
        for (i, s) in Species::ALL.iter().enumerate() {
            assert_eq!(s.index(), i);
        }
    }

    #[test]
    fn serializes_as_display_identifier() {
        let json = serde_json::to_string(&Species::Pm25).unwrap();
        assert_eq!(json, "\"PM2.5\"");
        let back: Species = serde_json::from_str("\"pm2_5\"").unwrap();
        assert_eq!(back, Species::Pm25);
    }
}
