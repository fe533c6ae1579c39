use std::collections::BTreeMap;
use std::sync::OnceLock;

use crate::breakpoints::BreakpointTable;
use crate::error::AqiError;
use crate::reading::{AqiReading, Concentrations};
use crate::species::Species;

/// Immutable AQI engine holding one breakpoint table per supported species.
///
/// Cheap to share: all methods take `&self` and nothing is mutated after
/// construction.
#[derive(Debug, Clone, PartialEq)]
pub struct AqiEngine {
    tables: [Option<BreakpointTable>; 6],
}

impl Default for AqiEngine {
    fn default() -> Self {
        Self::epa()
    }
}

impl AqiEngine {
    /// Engine over the official EPA tables for all six species.
    pub fn epa() -> Self {
        Self {
            tables: Species::ALL.map(|s| Some(BreakpointTable::epa(s))),
        }
    }

    /// Engine with no tables; every lookup fails until tables are added.
    pub fn empty() -> Self {
        Self {
            tables: Default::default(),
        }
    }

    /// Replaces the table for the table's species.
    pub fn with_table(mut self, table: BreakpointTable) -> Self {
        let idx = table.species().index();
        self.tables[idx] = Some(table);
        self
    }

    pub fn without(mut self, species: Species) -> Self {
        self.tables[species.index()] = None;
        self
    }

    pub fn table(&self, species: Species) -> Option<&BreakpointTable> {
        self.tables[species.index()].as_ref()
    }

    /// AQI sub-index for one species at `concentration` (canonical unit).
    ///
    /// Concentrations above the table's ceiling saturate at 500.
    pub fn sub_index(&self, species: Species, concentration: f64) -> Result<u16, AqiError> {
        if !concentration.is_finite() || concentration < 0.0 {
            return Err(AqiError::InvalidInput {
                species,
                value: concentration,
            });
        }
        let table = self
            .table(species)
            .ok_or_else(|| AqiError::UnsupportedSpecies(species.to_string()))?;
        Ok(table.index_for(concentration))
    }

    /// Overall reading for a concentration set.
    pub fn aggregate(&self, concentrations: &Concentrations) -> Result<AqiReading, AqiError> {
        if concentrations.is_empty() {
            return Err(AqiError::NoData);
        }
        let sub_indices = concentrations
            .present()
            .map(|(species, value)| self.sub_index(species, value).map(|index| (species, index)))
            .collect::<Result<BTreeMap<_, _>, AqiError>>()?;
        AqiReading::from_sub_indices(sub_indices)
    }
}

/// Reading from sub-indices the caller already holds.
///
/// Values above 500 are kept as given and categorize as hazardous.
pub fn aggregate_sub_indices<I>(sub_indices: I) -> Result<AqiReading, AqiError>
where
    I: IntoIterator<Item = (Species, u16)>,
{
    AqiReading::from_sub_indices(sub_indices.into_iter().collect())
}

/// Shared engine over the EPA tables.
pub fn epa_engine() -> &'static AqiEngine {
    static ENGINE: OnceLock<AqiEngine> = OnceLock::new();
    ENGINE.get_or_init(AqiEngine::epa)
}

/// [`AqiEngine::sub_index`] on the shared EPA engine.
pub fn sub_index(species: Species, concentration: f64) -> Result<u16, AqiError> {
    epa_engine().sub_index(species, concentration)
}

/// [`AqiEngine::aggregate`] on the shared EPA engine.
pub fn aggregate(concentrations: &Concentrations) -> Result<AqiReading, AqiError> {
    epa_engine().aggregate(concentrations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breakpoints::Breakpoint;
    use crate::category::Category;

    #[test]
    fn rejects_negative_and_non_finite() {
        for bad in [-0.1, f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = sub_index(Species::Pm25, bad).unwrap_err();
            assert!(matches!(err, AqiError::InvalidInput { species: Species::Pm25, .. }));
        }
    }

    #[test]
    fn missing_table_is_unsupported() {
        let engine = AqiEngine::epa().without(Species::So2);
        assert_eq!(
            engine.sub_index(Species::So2, 10.0).unwrap_err(),
            AqiError::UnsupportedSpecies("SO2".into())
        );
        assert!(AqiEngine::empty().sub_index(Species::Pm25, 1.0).is_err());
    }

    #[test]
    fn aggregate_propagates_invalid_input() {
        let set = Concentrations::new()
            .with(Species::Pm25, 10.0)
            .with(Species::Co, -1.0);
        let err = aggregate(&set).unwrap_err();
        assert!(matches!(err, AqiError::InvalidInput { species: Species::Co, .. }));
    }

    #[test]
    fn custom_table_replaces_epa() {
        let table = BreakpointTable::new(
            Species::Pm10,
            vec![
                Breakpoint::new(0.0, 99.0, 0, 99),
                Breakpoint::new(100.0, 500.0, 100, 500),
            ],
        )
        .unwrap();
        let engine = AqiEngine::epa().with_table(table);
        assert_eq!(engine.sub_index(Species::Pm10, 42.0).unwrap(), 42);
        assert_eq!(engine.sub_index(Species::Pm25, 12.0).unwrap(), 50);
    }

    #[test]
    fn single_species_reading() {
        let reading = aggregate(&Concentrations::new().with(Species::O3, 0.080)).unwrap();
        assert_eq!(reading.dominant_pollutant, Species::O3);
        assert_eq!(reading.category, Category::UnhealthyForSensitiveGroups);
        assert_eq!(reading.sub_indices.len(), 1);
    }

    #[test]
    fn sub_index_aggregation_keeps_out_of_range_value() {
        let reading = aggregate_sub_indices([(Species::Pm25, 501), (Species::O3, 40)]).unwrap();
        assert_eq!(reading.overall_aqi, 501);
        assert_eq!(reading.category, Category::Hazardous);
        assert_eq!(reading.dominant_pollutant, Species::Pm25);
    }
}
