use std::error::Error;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use airguard_aqi::ingest::read_stations;
use airguard_aqi::units::normalize;
use airguard_aqi::{AirGuardConfig, AqiEngine, AqiReading, CliOverrides, Species};

#[derive(Parser, Debug)]
#[command(name = "airguard", about = "Compute EPA air quality index readings")]
struct Cli {
    /// Path to an airguard.toml config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Air temperature in kelvin for unit conversion
    #[arg(long, global = true)]
    temperature_k: Option<f64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sub-index for a single pollutant concentration
    Index {
        /// Pollutant, e.g. PM2.5, pm10, O3
        species: Species,
        #[arg(allow_negative_numbers = true)]
        concentration: f64,
        /// Unit of the concentration; defaults to the species' canonical unit
        #[arg(long)]
        unit: Option<String>,
    },
    /// Readings per station from `station,pollutant,concentration,unit` CSV
    Report {
        /// CSV file; reads stdin when omitted
        file: Option<PathBuf>,
        /// Emit one JSON reading per line instead of CSV
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let overrides = CliOverrides {
        temperature_k: cli.temperature_k,
    };
    let config = AirGuardConfig::load(cli.config.as_deref(), Some(&overrides))
        .context("loading configuration")?;
    match &cli.config {
        Some(path) => info!(path = %path.display(), "loaded config"),
        None => info!("using default config"),
    }
    let engine = config.build_engine()?;
    let temperature_k = config.units.temperature_k;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.command {
        Command::Index {
            species,
            concentration,
            unit,
        } => {
            let line = index_line(&engine, species, concentration, unit.as_deref(), temperature_k)?;
            writeln!(out, "{line}")?;
        }
        Command::Report { file, json } => {
            let reader: Box<dyn BufRead> = match &file {
                Some(path) => Box::new(BufReader::new(
                    File::open(path).with_context(|| format!("opening {}", path.display()))?,
                )),
                None => Box::new(io::stdin().lock()),
            };
            report(&engine, reader, temperature_k, json, &mut out)?;
        }
    }
    Ok(())
}

/// `species,canonical value,sub-index` for a single concentration.
fn index_line(
    engine: &AqiEngine,
    species: Species,
    concentration: f64,
    unit: Option<&str>,
    temperature_k: f64,
) -> Result<String> {
    let unit = unit.unwrap_or_else(|| species.canonical_unit().symbol());
    let value = normalize(species, concentration, unit, temperature_k)?;
    let index = engine.sub_index(species, value)?;
    Ok(format!("{species},{value},{index}"))
}

#[derive(Serialize)]
struct StationReading<'a> {
    station: &'a str,
    reading: &'a AqiReading,
}

fn error_chain(err: &dyn Error) -> String {
    let mut msg = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        msg.push_str(": ");
        msg.push_str(&cause.to_string());
        source = cause.source();
    }
    msg
}

/// Writes one line per valid station and returns how many were written.
fn report(
    engine: &AqiEngine,
    reader: impl BufRead,
    temperature_k: f64,
    json: bool,
    out: &mut impl Write,
) -> Result<usize> {
    let stations = read_stations(reader, temperature_k).context("reading concentrations")?;
    debug!(stations = stations.len(), "parsed input");

    let mut reported = 0usize;
    for station in &stations {
        let aggregated = match station.result() {
            Ok(concentrations) => engine.aggregate(concentrations).map_err(|e| error_chain(&e)),
            Err(err) => Err(error_chain(err)),
        };
        let reading = match aggregated {
            Ok(reading) => reading,
            Err(error) => {
                warn!(station = %station.station, %error, "skipping station");
                continue;
            }
        };
        if json {
            let line = serde_json::to_string(&StationReading {
                station: &station.station,
                reading: &reading,
            })?;
            writeln!(out, "{line}")?;
        } else {
            writeln!(
                out,
                "{},{},{},{}",
                station.station, reading.overall_aqi, reading.category, reading.dominant_pollutant
            )?;
        }
        reported += 1;
    }
    info!(reported, skipped = stations.len() - reported, "report complete");
    Ok(reported)
}
