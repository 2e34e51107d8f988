use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use serde::Serialize;

use super::database::NeoDatabase;
use super::model::{format_time, CloseApproach, NearEarthObject};
use crate::error::{FilterError, NeoError};

/// CSV header, in column order.
pub const CSV_FIELDS: [&str; 7] = [
    "datetime_utc",
    "distance_au",
    "velocity_km_s",
    "designation",
    "name",
    "diameter_km",
    "potentially_hazardous",
];

// ---------------------------------------------------------------------------
// Export records
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    datetime_utc: String,
    distance_au: f64,
    velocity_km_s: f64,
    designation: &'a str,
    name: &'a str,
    #[serde(serialize_with = "nan_as_lowercase")]
    diameter_km: f64,
    potentially_hazardous: bool,
}

/// Unknown diameters are written as `nan`.
fn nan_as_lowercase<S: serde::Serializer>(value: &f64, s: S) -> Result<S::Ok, S::Error> {
    if value.is_nan() {
        s.serialize_str("nan")
    } else {
        s.serialize_f64(*value)
    }
}

#[derive(Debug, Serialize)]
struct JsonNeo<'a> {
    designation: &'a str,
    name: Option<&'a str>,
    diameter_km: f64,
    potentially_hazardous: bool,
}

#[derive(Debug, Serialize)]
struct JsonApproach<'a> {
    datetime_utc: String,
    distance_au: f64,
    velocity_km_s: f64,
    neo: JsonNeo<'a>,
}

/// Pair a query result with its NEO, or say why it cannot be exported.
fn resolve<'a>(
    db: &'a NeoDatabase,
    result: Result<&'a CloseApproach, FilterError>,
) -> Result<(&'a CloseApproach, &'a NearEarthObject), NeoError> {
    let approach = result?;
    let neo = db.neo_of(approach).ok_or_else(|| NeoError::Unlinked {
        designation: approach.designation().to_string(),
    })?;
    Ok((approach, neo))
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Write query results to `path`, choosing CSV or JSON by extension.
/// Returns the number of close approaches written.
pub fn write_results<'a, I>(path: &Path, db: &'a NeoDatabase, results: I) -> Result<usize>
where
    I: Iterator<Item = Result<&'a CloseApproach, FilterError>>,
{
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    // Render in memory so a failed row never leaves a partial file behind.
    let mut buf = Vec::new();
    let written = match ext.as_str() {
        "csv" => write_csv(&mut buf, db, results)?,
        "json" => write_json(&mut buf, db, results)?,
        other => return Err(NeoError::UnsupportedFormat(other.to_string()).into()),
    };
    std::fs::write(path, buf).with_context(|| format!("writing {}", path.display()))?;

    info!("wrote {written} close approaches to {}", path.display());
    Ok(written)
}

/// One header row, then one row per close approach.
pub fn write_csv<'a, W, I>(out: W, db: &'a NeoDatabase, results: I) -> Result<usize>
where
    W: Write,
    I: Iterator<Item = Result<&'a CloseApproach, FilterError>>,
{
    let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(out);
    writer.write_record(CSV_FIELDS).context("writing CSV header")?;

    let mut count = 0;
    for result in results {
        let (approach, neo) = resolve(db, result)?;
        writer
            .serialize(CsvRow {
                datetime_utc: format_time(&approach.time),
                distance_au: approach.distance,
                velocity_km_s: approach.velocity,
                designation: &neo.designation,
                name: neo.name.as_deref().unwrap_or(""),
                diameter_km: neo.diameter,
                potentially_hazardous: neo.hazardous,
            })
            .with_context(|| format!("writing CSV row {count}"))?;
        count += 1;
    }
    writer.flush().context("flushing CSV")?;
    Ok(count)
}

/// A pretty-printed array of approaches, each with a nested `neo` object.
/// Unknown names and diameters become `null`.
pub fn write_json<'a, W, I>(mut out: W, db: &'a NeoDatabase, results: I) -> Result<usize>
where
    W: Write,
    I: Iterator<Item = Result<&'a CloseApproach, FilterError>>,
{
    let entries = results
        .map(|result| {
            let (approach, neo) = resolve(db, result)?;
            Ok(JsonApproach {
                datetime_utc: format_time(&approach.time),
                distance_au: approach.distance,
                velocity_km_s: approach.velocity,
                neo: JsonNeo {
                    designation: &neo.designation,
                    name: neo.name.as_deref(),
                    diameter_km: neo.diameter,
                    potentially_hazardous: neo.hazardous,
                },
            })
        })
        .collect::<Result<Vec<_>, NeoError>>()?;

    serde_json::to_writer_pretty(&mut out, &entries).context("writing JSON")?;
    out.flush().context("flushing JSON")?;
    Ok(entries.len())
}
