//! Deterministic synthetic data in the JPL `neos.csv` / `cad.json` layouts.

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;
use serde_json::json;

use super::model::APPROACH_TIME_FORMAT;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    /// Log-uniform, for quantities spanning orders of magnitude.
    fn log_range(&mut self, lo: f64, hi: f64) -> f64 {
        self.range(lo.ln(), hi.ln()).exp()
    }

    fn below(&mut self, n: u64) -> u64 {
        self.next_u64() % n
    }
}

const NAMES: [&str; 8] = [
    "Eros", "Apophis", "Bennu", "Ryugu", "Toutatis", "Geographos", "Icarus", "Phaethon",
];

#[derive(Serialize)]
struct NeoRow {
    pdes: String,
    name: String,
    pha: &'static str,
    diameter: String,
}

struct Approach {
    designation: String,
    time: NaiveDateTime,
    distance: f64,
    velocity: f64,
}

fn designation(i: usize) -> String {
    let letters = b"ABCDEFGHJKLMNOPQRSTUVWXY";
    let first = letters[i % letters.len()] as char;
    let second = letters[(i / letters.len()) % letters.len()] as char;
    format!("{} {first}{second}{}", 1990 + i % 35, i / 576)
}

/// Contents of a generated dataset, ready to be written out.
#[derive(Debug, Clone)]
pub struct SampleData {
    pub neos_csv: String,
    pub cad_json: String,
    pub neo_count: usize,
    pub approach_count: usize,
}

/// Generate `count` NEOs with one to four approaches each, plus a few
/// approaches by objects missing from the NEO file, as in the real data.
pub fn generate(count: usize, seed: u64) -> Result<SampleData> {
    let mut rng = SimpleRng::new(seed);

    let epoch = NaiveDate::from_ymd_opt(1900, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .context("invalid epoch")?;
    let span_minutes = 300 * 365 * 24 * 60;

    let mut neos = Vec::with_capacity(count);
    let mut approaches = Vec::new();

    for i in 0..count {
        let pdes = designation(i);
        let name = NAMES.get(i).map(|n| n.to_string()).unwrap_or_default();
        let diameter = if rng.next_f64() < 0.3 {
            String::new()
        } else {
            format!("{:.3}", rng.log_range(0.005, 20.0))
        };
        let hazardous = rng.next_f64() < 0.15;

        for _ in 0..=rng.below(4) {
            approaches.push(Approach {
                designation: pdes.clone(),
                time: epoch + Duration::minutes(rng.below(span_minutes) as i64),
                distance: rng.log_range(0.0001, 0.5),
                velocity: rng.range(1.0, 40.0),
            });
        }

        neos.push(NeoRow {
            pdes,
            name,
            pha: if hazardous { "Y" } else { "N" },
            diameter,
        });
    }

    for k in 0..3 {
        approaches.push(Approach {
            designation: format!("C/{} Z{k}", 2000 + k),
            time: epoch + Duration::minutes(rng.below(span_minutes) as i64),
            distance: rng.log_range(0.0001, 0.5),
            velocity: rng.range(1.0, 70.0),
        });
    }
    approaches.sort_by_key(|a| a.time);

    let mut writer = csv::Writer::from_writer(Vec::new());
    for row in &neos {
        writer.serialize(row).context("writing NEO row")?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("flushing NEO rows: {}", e.error()))?;
    let neos_csv = String::from_utf8(bytes).context("NEO rows are not UTF-8")?;

    let data: Vec<_> = approaches
        .iter()
        .map(|a| {
            json!([
                a.designation,
                a.time.format(APPROACH_TIME_FORMAT).to_string(),
                format!("{:.10}", a.distance),
                format!("{:.6}", a.velocity),
            ])
        })
        .collect();
    let cad = json!({
        "signature": { "source": "generate_sample", "version": "1.0" },
        "count": data.len().to_string(),
        "fields": ["des", "cd", "dist", "v_rel"],
        "data": data,
    });

    Ok(SampleData {
        neos_csv,
        cad_json: serde_json::to_string_pretty(&cad)?,
        neo_count: neos.len(),
        approach_count: approaches.len(),
    })
}
