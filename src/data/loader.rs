use std::io::Read;
use std::path::Path;

use anyhow::{bail, Context, Result};
use log::info;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use super::model::{parse_approach_time, ApproachInfo, CloseApproach, NearEarthObject, NeoInfo};

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase()
}

/// Load near-Earth objects from the JPL small-body database export.
///
/// Supported formats:
/// * `.csv` – header row including `pdes`, `name`, `diameter`, `pha`
pub fn load_neos(path: &Path) -> Result<Vec<NearEarthObject>> {
    let neos = match extension(path).as_str() {
        "csv" => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("opening {}", path.display()))?;
            read_neos_csv(file)?
        }
        other => bail!("Unsupported NEO file extension: .{other}"),
    };
    info!("loaded {} NEOs from {}", neos.len(), path.display());
    Ok(neos)
}

/// Load close approaches from the JPL close-approach data API response.
///
/// Supported formats:
/// * `.json` – `{ "fields": ["des", "cd", "dist", "v_rel", ...], "data": [[...], ...] }`
pub fn load_approaches(path: &Path) -> Result<Vec<CloseApproach>> {
    let approaches = match extension(path).as_str() {
        "json" => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            parse_cad_json(&text)?
        }
        other => bail!("Unsupported close-approach file extension: .{other}"),
    };
    info!(
        "loaded {} close approaches from {}",
        approaches.len(),
        path.display()
    );
    Ok(approaches)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Columns of `neos.csv` we care about; the rest are ignored.
#[derive(Debug, Deserialize)]
struct NeoRow {
    pdes: String,
    name: Option<String>,
    diameter: Option<String>,
    pha: Option<String>,
}

pub(crate) fn read_neos_csv<R: Read>(reader: R) -> Result<Vec<NearEarthObject>> {
    let mut reader = csv::Reader::from_reader(reader);
    let mut neos = Vec::new();

    for (row_no, result) in reader.deserialize::<NeoRow>().enumerate() {
        let row = result.with_context(|| format!("NEO CSV row {row_no}"))?;

        let diameter = match row.diameter.as_deref().map(str::trim) {
            None | Some("") => None,
            Some(d) => Some(
                d.parse::<f64>()
                    .with_context(|| format!("NEO CSV row {row_no}: diameter '{d}' is not a number"))?,
            ),
        };
        let hazardous = row
            .pha
            .as_deref()
            .is_some_and(|p| p.trim().eq_ignore_ascii_case("y"));

        neos.push(NearEarthObject::new(NeoInfo {
            designation: row.pdes,
            name: row.name,
            diameter,
            hazardous,
        }));
    }

    Ok(neos)
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (the JPL SBDB close-approach API):
///
/// ```json
/// {
///   "fields": ["des", "orbit_id", "jd", "cd", "dist", "dist_min", "dist_max", "v_rel", ...],
///   "data": [
///     ["170903", "105", "2415020.507669067", "1900-Jan-01 00:11", "0.0921795123769547", ...],
///     ...
///   ]
/// }
/// ```
pub(crate) fn parse_cad_json(text: &str) -> Result<Vec<CloseApproach>> {
    let root: JsonValue = serde_json::from_str(text).context("parsing close-approach JSON")?;

    let fields: Vec<&str> = root
        .get("fields")
        .and_then(|f| f.as_array())
        .context("Expected a 'fields' array")?
        .iter()
        .map(|f| f.as_str().unwrap_or(""))
        .collect();
    let column = |name: &str| {
        fields
            .iter()
            .position(|f| *f == name)
            .with_context(|| format!("close-approach JSON missing '{name}' field"))
    };
    let des_idx = column("des")?;
    let cd_idx = column("cd")?;
    let dist_idx = column("dist")?;
    let v_rel_idx = column("v_rel")?;

    let rows = root
        .get("data")
        .and_then(|d| d.as_array())
        .context("Expected a 'data' array")?;

    let mut approaches = Vec::with_capacity(rows.len());

    for (i, row) in rows.iter().enumerate() {
        let row = row
            .as_array()
            .with_context(|| format!("Row {i} is not a JSON array"))?;

        let designation = json_text(row.get(des_idx), i, "des")?;
        let cd = json_text(row.get(cd_idx), i, "cd")?;
        let time = parse_approach_time(&cd).with_context(|| format!("Row {i}: bad 'cd'"))?;

        approaches.push(CloseApproach::new(ApproachInfo {
            designation,
            time,
            distance: json_f64(row.get(dist_idx), i, "dist")?,
            velocity: json_f64(row.get(v_rel_idx), i, "v_rel")?,
        }));
    }

    Ok(approaches)
}

fn json_text(val: Option<&JsonValue>, row: usize, col: &str) -> Result<String> {
    match val {
        Some(JsonValue::String(s)) => Ok(s.clone()),
        Some(JsonValue::Number(n)) => Ok(n.to_string()),
        _ => bail!("Row {row}: missing or invalid '{col}'"),
    }
}

/// The API encodes numbers as strings; accept both.
fn json_f64(val: Option<&JsonValue>, row: usize, col: &str) -> Result<f64> {
    match val {
        Some(JsonValue::Number(n)) => n
            .as_f64()
            .with_context(|| format!("Row {row}, {col}: not a number")),
        Some(JsonValue::String(s)) => s
            .trim()
            .parse::<f64>()
            .with_context(|| format!("Row {row}, {col}: '{s}' is not a number")),
        _ => bail!("Row {row}: missing or invalid '{col}'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NEOS_CSV: &str = "\
id,spkid,full_name,pdes,name,prefix,neo,pha,H,G,M1,M2,K1,K2,PC,diameter,extent,albedo
a0000433,2000433,\"   433 Eros (A898 PA)\",433,Eros,,Y,N,10.4,0.46,,,,,,16.84,34.4x11.2x11.2,0.25
a0099942,2099942,\"99942 Apophis (2004 MN4)\",99942,Apophis,,Y,Y,19.09,,,,,,,0.37,,0.23
bK20F00K,3843255,\"       (2020 FK)\",2020 FK,,,Y,,27.1,,,,,,,,,
";

    const CAD_JSON: &str = r#"{
        "signature": {"source": "NASA/JPL SBDB Close Approach Data API", "version": "1.1"},
        "count": "3",
        "fields": ["des", "orbit_id", "jd", "cd", "dist", "dist_min", "dist_max", "v_rel", "v_inf", "t_sigma_f", "h"],
        "data": [
            ["170903", "105", "2415020.507669067", "1900-Jan-01 00:11", "0.0921795123769547", "0.0912006569517418", "0.0931589328621254", "16.7523040362574", "16.7505784933163", "01:00", "18.1"],
            ["433", "659", "2415385.120300937", "1900-Dec-27 01:30", "0.314928840880911", "0.314928355525414", "0.314929326236409", "5.47", "5.47", "< 00:01", null],
            ["2020 FK", "3", "2458926.5", "2020-Mar-18 00:00", 0.02, 0.02, 0.02, 11, 11, "00:05", "27.1"]
        ]
    }"#;

    #[test]
    fn reads_neo_csv() {
        let neos = read_neos_csv(NEOS_CSV.as_bytes()).unwrap();
        assert_eq!(neos.len(), 3);

        assert_eq!(neos[0].designation, "433");
        assert_eq!(neos[0].name.as_deref(), Some("Eros"));
        assert_eq!(neos[0].diameter, 16.84);
        assert!(!neos[0].hazardous);

        assert!(neos[1].hazardous);

        assert_eq!(neos[2].designation, "2020 FK");
        assert_eq!(neos[2].name, None);
        assert!(neos[2].diameter.is_nan());
        assert!(!neos[2].hazardous);
    }

    #[test]
    fn rejects_bad_diameter() {
        let csv = "pdes,name,diameter,pha\n1,,wide,N\n";
        let err = read_neos_csv(csv.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("row 0"));
    }

    #[test]
    fn parses_cad_json() {
        let approaches = parse_cad_json(CAD_JSON).unwrap();
        assert_eq!(approaches.len(), 3);

        assert_eq!(approaches[0].designation(), "170903");
        assert_eq!(approaches[0].time_str(), "1900-01-01 00:11");
        assert!((approaches[0].distance - 0.0921795123769547).abs() < 1e-12);
        assert!((approaches[0].velocity - 16.7523040362574).abs() < 1e-12);

        assert_eq!(approaches[1].velocity, 5.47);
        assert_eq!(approaches[2].distance, 0.02);
        assert_eq!(approaches[2].velocity, 11.0);
        assert!(approaches.iter().all(|a| a.neo_id().is_none()));
    }

    #[test]
    fn cad_json_requires_known_fields() {
        let err = parse_cad_json(r#"{"fields": ["des", "cd"], "data": []}"#).unwrap_err();
        assert!(err.to_string().contains("dist"));
    }

    #[test]
    fn unsupported_extensions_fail() {
        assert!(load_neos(Path::new("neos.parquet")).is_err());
        assert!(load_approaches(Path::new("cad.csv")).is_err());
    }
}
