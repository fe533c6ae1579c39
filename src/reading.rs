use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::error::AqiError;
use crate::species::Species;

/// Concentrations for one site, one optional slot per species, each in the
/// species' canonical unit. `None` marks the species as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<Species, Option<f64>>", into = "BTreeMap<Species, Option<f64>>")]
pub struct Concentrations {
    values: [Option<f64>; 6],
}

impl Concentrations {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    pub fn with(mut self, species: Species, value: f64) -> Self {
        self.set(species, Some(value));
        self
    }

    pub fn set(&mut self, species: Species, value: Option<f64>) {
        self.values[species.index()] = value;
    }

    pub fn get(&self, species: Species) -> Option<f64> {
        self.values[species.index()]
    }

    /// Every species in canonical order with its value or `None`.
    pub fn iter(&self) -> impl Iterator<Item = (Species, Option<f64>)> + '_ {
        Species::ALL.iter().map(move |&s| (s, self.get(s)))
    }

    /// Present species only, in canonical order.
    pub fn present(&self) -> impl Iterator<Item = (Species, f64)> + '_ {
        self.iter().filter_map(|(s, v)| v.map(|v| (s, v)))
    }

    pub fn is_empty(&self) -> bool {
        self.values.iter().all(Option::is_none)
    }

    /// Builds a set from identifier-keyed values, e.g. a record's
    /// `pollutants` object.
    pub fn from_named<I, K>(entries: I) -> Result<Self, AqiError>
    where
        I: IntoIterator<Item = (K, Option<f64>)>,
        K: AsRef<str>,
    {
        let mut out = Self::new();
        for (name, value) in entries {
            let species: Species = name.as_ref().parse()?;
            out.set(species, value);
        }
        Ok(out)
    }
}

impl FromIterator<(Species, f64)> for Concentrations {
    fn from_iter<T: IntoIterator<Item = (Species, f64)>>(iter: T) -> Self {
        let mut out = Self::new();
        for (species, value) in iter {
            out.set(species, Some(value));
        }
        out
    }
}

impl From<BTreeMap<Species, Option<f64>>> for Concentrations {
    fn from(map: BTreeMap<Species, Option<f64>>) -> Self {
        let mut out = Self::new();
        for (species, value) in map {
            out.set(species, value);
        }
        out
    }
}

impl From<Concentrations> for BTreeMap<Species, Option<f64>> {
    fn from(set: Concentrations) -> Self {
        set.iter().collect()
    }
}

/// Aggregate air-quality reading derived from a concentration set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AqiReading {
    #[serde(rename = "overallAQI")]
    pub overall_aqi: u16,
    pub category: Category,
    #[serde(rename = "dominantPollutant")]
    pub dominant_pollutant: Species,
    #[serde(rename = "subIndices")]
    pub sub_indices: BTreeMap<Species, u16>,
}

impl AqiReading {
    /// Builds a reading from per-species sub-indices.
    ///
    /// The dominant pollutant is the first species in canonical order that
    /// reaches the maximum.
    pub fn from_sub_indices(sub_indices: BTreeMap<Species, u16>) -> Result<Self, AqiError> {
        let mut best: Option<(Species, u16)> = None;
        for (&species, &index) in &sub_indices {
            match best {
                Some((_, max)) if index <= max => {}
                _ => best = Some((species, index)),
            }
        }
        let (dominant_pollutant, overall_aqi) = best.ok_or(AqiError::NoData)?;
        Ok(Self {
            overall_aqi,
            category: Category::from_aqi(overall_aqi),
            dominant_pollutant,
            sub_indices,
        })
    }

    pub fn sub_index(&self, species: Species) -> Option<u16> {
        self.sub_indices.get(&species).copied()
    }

    pub fn health_implications(&self) -> &'static str {
        self.category.health_implications()
    }

    pub fn cautionary_statement(&self) -> &'static str {
        self.category.cautionary_statement()
    }
}
