use serde::{Deserialize, Serialize};

use crate::error::AqiError;
use crate::species::Species;

/// Ceiling of the AQI scale.
pub const AQI_CEILING: u16 = 500;

/// One linear segment of a species' concentration-to-index function.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct Breakpoint {
    pub c_low: f64,
    pub c_high: f64,
    pub i_low: u16,
    pub i_high: u16,
}

impl Breakpoint {
    pub const fn new(c_low: f64, c_high: f64, i_low: u16, i_high: u16) -> Self {
        Self {
            c_low,
            c_high,
            i_low,
            i_high,
        }
    }

    /// EPA linear interpolation, rounded half up.
    pub fn interpolate(&self, concentration: f64) -> u16 {
        let c = concentration.max(self.c_low).min(self.c_high);
        let slope = f64::from(self.i_high.saturating_sub(self.i_low)) / (self.c_high - self.c_low);
        let raw = slope * (c - self.c_low) + f64::from(self.i_low);
        let rounded = (raw + 0.5).floor() as u16;
        rounded.clamp(self.i_low, self.i_high)
    }
}

/// Ordered, contiguous breakpoint segments for one species.
#[derive(Debug, Clone, PartialEq)]
pub struct BreakpointTable {
    species: Species,
    segments: Vec<Breakpoint>,
}

impl BreakpointTable {
    /// Builds a table, rejecting gaps, overlaps and incomplete coverage.
    pub fn new(species: Species, segments: Vec<Breakpoint>) -> Result<Self, AqiError> {
        let invalid = |reason| AqiError::InvalidTable { species, reason };
        let res = species.resolution();
        let tol = res * 1e-6;

        let first = segments.first().ok_or_else(|| invalid("table is empty"))?;
        if first.c_low.abs() > tol || first.i_low != 0 {
            return Err(invalid("table must start at concentration 0, index 0"));
        }
        if segments.last().map(|s| s.i_high) != Some(AQI_CEILING) {
            return Err(invalid("table must end at index 500"));
        }
        for seg in &segments {
            if !seg.c_low.is_finite() || !seg.c_high.is_finite() {
                return Err(invalid("non-finite concentration bound"));
            }
            if seg.c_high <= seg.c_low || seg.i_high <= seg.i_low {
                return Err(invalid("segment bounds must be increasing"));
            }
        }
        for pair in segments.windows(2) {
            if ((pair[0].c_high + res) - pair[1].c_low).abs() > tol {
                return Err(invalid("concentration segments must be contiguous"));
            }
            if pair[0].i_high.checked_add(1) != Some(pair[1].i_low) {
                return Err(invalid("index segments must be contiguous"));
            }
        }
        Ok(Self { species, segments })
    }

    /// The official EPA table for `species`.
    pub fn epa(species: Species) -> Self {
        Self {
            species,
            segments: epa_segments(species).to_vec(),
        }
    }

    pub fn species(&self) -> Species {
        self.species
    }

    pub fn segments(&self) -> &[Breakpoint] {
        &self.segments
    }

    /// Upper end of the covered concentration domain.
    pub fn ceiling(&self) -> f64 {
        self.segments.last().map_or(0.0, |s| s.c_high)
    }

    /// Sub-index for a finite, non-negative concentration.
    ///
    /// The value is truncated to the species' resolution first so that
    /// readings between two published bounds land in the lower segment.
    pub(crate) fn index_for(&self, concentration: f64) -> u16 {
        let res = self.species.resolution();
        let truncated = (concentration / res + 1e-9).floor() * res;
        self.segments
            .iter()
            .find(|seg| truncated <= seg.c_high + res / 2.0)
            .map_or(AQI_CEILING, |seg| seg.interpolate(truncated))
    }
}

const INDEX_BANDS: [(u16, u16); 7] = [
    (0, 50),
    (51, 100),
    (101, 150),
    (151, 200),
    (201, 300),
    (301, 400),
    (401, 500),
];

macro_rules! table {
    ($( ($lo:expr, $hi:expr) ),* $(,)?) => {{
        let bounds: &[(f64, f64)] = &[$(($lo, $hi)),*];
        let mut out = [Breakpoint::new(0.0, 0.0, 0, 0); 7];
        let mut i = 0;
        while i < 7 {
            out[i] = Breakpoint::new(bounds[i].0, bounds[i].1, INDEX_BANDS[i].0, INDEX_BANDS[i].1);
            i += 1;
        }
        out
    }};
}

static PM25: [Breakpoint; 7] = table![
    (0.0, 12.0),
    (12.1, 35.4),
    (35.5, 55.4),
    (55.5, 150.4),
    (150.5, 250.4),
    (250.5, 350.4),
    (350.5, 500.4),
];

static PM10: [Breakpoint; 7] = table![
    (0.0, 54.0),
    (55.0, 154.0),
    (155.0, 254.0),
    (255.0, 354.0),
    (355.0, 424.0),
    (425.0, 504.0),
    (505.0, 604.0),
];

// 8-hour segments up to 0.200 ppm, then the 1-hour hazardous segments.
static O3: [Breakpoint; 7] = table![
    (0.000, 0.054),
    (0.055, 0.070),
    (0.071, 0.085),
    (0.086, 0.105),
    (0.106, 0.200),
    (0.201, 0.504),
    (0.505, 0.604),
];

static NO2: [Breakpoint; 7] = table![
    (0.0, 53.0),
    (54.0, 100.0),
    (101.0, 360.0),
    (361.0, 649.0),
    (650.0, 1249.0),
    (1250.0, 1649.0),
    (1650.0, 2049.0),
];

static SO2: [Breakpoint; 7] = table![
    (0.0, 35.0),
    (36.0, 75.0),
    (76.0, 185.0),
    (186.0, 304.0),
    (305.0, 604.0),
    (605.0, 804.0),
    (805.0, 1004.0),
];

static CO: [Breakpoint; 7] = table![
    (0.0, 4.4),
    (4.5, 9.4),
    (9.5, 12.4),
    (12.5, 15.4),
    (15.5, 30.4),
    (30.5, 40.4),
    (40.5, 50.4),
];

fn epa_segments(species: Species) -> &'static [Breakpoint] {
    match species {
        Species::Pm25 => &PM25,
        Species::Pm10 => &PM10,
        Species::O3 => &O3,
        Species::No2 => &NO2,
        Species::So2 => &SO2,
        Species::Co => &CO,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epa_tables_are_valid() {
        for species in Species::ALL {
            let table = BreakpointTable::epa(species);
            let rebuilt = BreakpointTable::new(species, table.segments().to_vec());
            assert!(rebuilt.is_ok(), "{species}: {rebuilt:?}");
        }
    }

    #[test]
    fn rejects_gap_between_segments() {
        let segments = vec![
            Breakpoint::new(0.0, 54.0, 0, 50),
            Breakpoint::new(60.0, 604.0, 51, 500),
        ];
        let err = BreakpointTable::new(Species::Pm10, segments).unwrap_err();
        assert!(matches!(err, AqiError::InvalidTable { species: Species::Pm10, .. }));
    }

    #[test]
    fn rejects_empty_and_truncated_tables() {
        assert!(BreakpointTable::new(Species::Co, vec![]).is_err());
        let partial = vec![Breakpoint::new(0.0, 4.4, 0, 50)];
        assert!(BreakpointTable::new(Species::Co, partial).is_err());
    }

    #[test]
    fn interpolates_segment_endpoints() {
        let seg = Breakpoint::new(12.1, 35.4, 51, 100);
        assert_eq!(seg.interpolate(12.1), 51);
        assert_eq!(seg.interpolate(35.4), 100);
    }

    #[test]
    fn inverted_segment_does_not_panic() {
        let seg = Breakpoint::new(0.0, 10.0, 80, 20);
        assert_eq!(seg.interpolate(5.0), 80);
    }

    #[test]
    fn truncates_to_resolution_before_lookup() {
        let table = BreakpointTable::epa(Species::Pm25);
        assert_eq!(table.index_for(12.05), 50);
        assert_eq!(table.index_for(12.1), 51);
        assert_eq!(table.index_for(35.4), 100);
        assert_eq!(table.index_for(500.4), 500);
        assert_eq!(table.index_for(500.5), 500);
    }
}
