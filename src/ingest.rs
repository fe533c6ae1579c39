use std::io::BufRead;

use crate::error::IngestError;
use crate::reading::Concentrations;
use crate::species::Species;
use crate::units::normalize;

/// One parsed input row: `station,pollutant,concentration,unit`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConcentrationRow {
    pub station: String,
    pub species: Species,
    /// Canonical-unit value; `None` when the field was empty.
    pub concentration: Option<f64>,
}

/// Concentrations collected for one station.
///
/// `error` holds the first row failure seen for the station; such a station
/// should not be reported.
#[derive(Debug)]
pub struct StationConcentrations {
    pub station: String,
    pub concentrations: Concentrations,
    pub error: Option<IngestError>,
}

impl StationConcentrations {
    fn new(station: &str) -> Self {
        Self {
            station: station.to_string(),
            concentrations: Concentrations::new(),
            error: None,
        }
    }

    /// The station's concentrations, or the row error that invalidated it.
    pub fn result(&self) -> Result<&Concentrations, &IngestError> {
        match &self.error {
            Some(err) => Err(err),
            None => Ok(&self.concentrations),
        }
    }
}

fn is_header(parts: &[&str]) -> bool {
    parts.len() >= 2 && parts[1].eq_ignore_ascii_case("pollutant")
}

/// Parses a single CSV row with no embedded commas. The unit column is
/// optional and defaults to the species' canonical unit.
pub fn parse_row(
    line_no: usize,
    line: &str,
    temperature_k: f64,
) -> Result<ConcentrationRow, IngestError> {
    let parts: Vec<&str> = line.split(',').map(str::trim).collect();
    if parts.len() < 3 || parts.len() > 4 {
        return Err(IngestError::Malformed {
            line: line_no,
            reason: format!("expected 3 or 4 columns, found {}", parts.len()),
        });
    }
    if parts[0].is_empty() {
        return Err(IngestError::Malformed {
            line: line_no,
            reason: "empty station".into(),
        });
    }
    let species: Species = parts[1]
        .parse()
        .map_err(|source| IngestError::Species {
            line: line_no,
            source,
        })?;

    let concentration = if parts[2].is_empty() {
        None
    } else {
        let raw: f64 = parts[2].parse().map_err(|_| IngestError::Malformed {
            line: line_no,
            reason: format!("unparseable concentration {:?}", parts[2]),
        })?;
        let unit = parts
            .get(3)
            .copied()
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| species.canonical_unit().symbol());
        let value = normalize(species, raw, unit, temperature_k).map_err(|source| {
            IngestError::Unit {
                line: line_no,
                source,
            }
        })?;
        Some(value)
    };

    Ok(ConcentrationRow {
        station: parts[0].to_string(),
        species,
        concentration,
    })
}

/// Reads all rows and groups them by station in first-seen order.
///
/// A later value for the same station and species replaces an earlier one;
/// an empty field never erases a value already seen. A bad row marks only
/// its own station as failed; rows without a station and read failures
/// abort the whole input.
pub fn read_stations<R: BufRead>(
    reader: R,
    temperature_k: f64,
) -> Result<Vec<StationConcentrations>, IngestError> {
    let mut stations: Vec<StationConcentrations> = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line_no = idx + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let parts: Vec<&str> = trimmed.split(',').map(str::trim).collect();
        if stations.is_empty() && is_header(&parts) {
            continue;
        }

        let station = parts[0];
        if station.is_empty() {
            return Err(IngestError::Malformed {
                line: line_no,
                reason: "empty station".into(),
            });
        }
        let pos = match stations.iter().position(|s| s.station == station) {
            Some(pos) => pos,
            None => {
                stations.push(StationConcentrations::new(station));
                stations.len() - 1
            }
        };
        let entry = &mut stations[pos];
        match parse_row(line_no, trimmed, temperature_k) {
            Ok(row) => {
                if let Some(value) = row.concentration {
                    entry.concentrations.set(row.species, Some(value));
                }
            }
            Err(err) => {
                if entry.error.is_none() {
                    entry.error = Some(err);
                }
            }
        }
    }
    Ok(stations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::REFERENCE_TEMPERATURE_K as T;

    const SAMPLE: &str = "\
station,pollutant,concentration,unit
# downtown monitor
Zone 1,PM2.5,35.4,ug/m3
Zone 1,PM10,154,
Zone 2,O3,70,ppb

Zone 1,O3,,
Zone 2,CO,,ppm
";

    #[test]
    fn groups_rows_by_station_in_order() {
        let stations = read_stations(SAMPLE.as_bytes(), T).unwrap();
        assert_eq!(stations.len(), 2);
        assert_eq!(stations[0].station, "Zone 1");
        assert_eq!(stations[0].concentrations.get(Species::Pm25), Some(35.4));
        assert_eq!(stations[0].concentrations.get(Species::Pm10), Some(154.0));
        assert_eq!(stations[0].concentrations.get(Species::O3), None);
        assert_eq!(stations[1].station, "Zone 2");
        let o3 = stations[1].concentrations.get(Species::O3).unwrap();
        assert!((o3 - 0.070).abs() < 1e-12);
        assert_eq!(stations[1].concentrations.get(Species::Co), None);
    }

    #[test]
    fn station_with_only_absent_values_is_kept_empty() {
        let stations = read_stations("Zone 3,SO2,,ppb\n".as_bytes(), T).unwrap();
        assert_eq!(stations.len(), 1);
        assert!(stations[0].concentrations.is_empty());
    }

    #[test]
    fn malformed_row_fails_only_its_station() {
        let input = "Zone 1,PM2.5,12\nZone 2,PM10\nZone 3,CO,4.4\n";
        let stations = read_stations(input.as_bytes(), T).unwrap();
        assert_eq!(stations.len(), 3);
        assert!(stations[0].result().is_ok());
        match stations[1].result().unwrap_err() {
            IngestError::Malformed { line, .. } => assert_eq!(*line, 2),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(stations[2].result().unwrap().get(Species::Co), Some(4.4));
    }

    #[test]
    fn bad_values_keep_other_stations() {
        let input = "\
Zone 1,PM2.5,35.4,ug/m3
Zone 2,PM2.5,-3,ug/m3
Zone 3,PM10,154,
Zone 2,PM10,20,
";
        let stations = read_stations(input.as_bytes(), T).unwrap();
        assert_eq!(stations.len(), 3);
        assert_eq!(stations[0].result().unwrap().get(Species::Pm25), Some(35.4));
        assert!(matches!(
            stations[1].result(),
            Err(IngestError::Unit { line: 2, .. })
        ));
        assert_eq!(stations[2].result().unwrap().get(Species::Pm10), Some(154.0));
    }

    #[test]
    fn reports_unknown_species_and_units() {
        let stations = read_stations("Zone 1,NH3,4\n".as_bytes(), T).unwrap();
        assert!(matches!(stations[0].result(), Err(IngestError::Species { line: 1, .. })));
        let stations = read_stations("Zone 1,PM10,4,ppb\n".as_bytes(), T).unwrap();
        assert!(matches!(stations[0].result(), Err(IngestError::Unit { line: 1, .. })));
    }

    #[test]
    fn row_without_station_is_fatal() {
        let err = read_stations("Zone 1,CO,1\n,PM10,3\n".as_bytes(), T).unwrap_err();
        assert!(matches!(err, IngestError::Malformed { line: 2, .. }));
    }

    #[test]
    fn line_error_message_leaves_detail_to_source() {
        let err = parse_row(4, "Zone 1,PM10,4,ppb", T).unwrap_err();
        assert_eq!(err.to_string(), "line 4");
        let source = std::error::Error::source(&err).unwrap();
        assert!(source.to_string().contains("ppb"));
    }

    #[test]
    fn rejects_non_numeric_concentration() {
        let err = parse_row(7, "Zone 1,CO,lots,ppm", T).unwrap_err();
        assert!(matches!(err, IngestError::Malformed { line: 7, .. }));
    }
}
