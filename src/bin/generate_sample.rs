use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use neo_atlas::data::sample;

/// Write a small synthetic neos.csv / cad.json pair in the JPL formats.
#[derive(Parser)]
#[command(name = "generate_sample")]
struct Args {
    /// Output directory
    #[arg(long, default_value = "data")]
    out: PathBuf,

    /// Number of NEOs to generate
    #[arg(long, default_value = "200")]
    count: usize,

    /// PRNG seed
    #[arg(long, default_value = "42")]
    seed: u64,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let data = sample::generate(args.count, args.seed)?;

    std::fs::create_dir_all(&args.out)
        .with_context(|| format!("creating {}", args.out.display()))?;

    let neo_path = args.out.join("neos.csv");
    std::fs::write(&neo_path, &data.neos_csv)
        .with_context(|| format!("writing {}", neo_path.display()))?;
    let cad_path = args.out.join("cad.json");
    std::fs::write(&cad_path, &data.cad_json)
        .with_context(|| format!("writing {}", cad_path.display()))?;

    info!(
        "wrote {} NEOs to {} and {} close approaches to {}",
        data.neo_count,
        neo_path.display(),
        data.approach_count,
        cad_path.display()
    );
    println!(
        "Wrote {} NEOs and {} close approaches to {}",
        data.neo_count,
        data.approach_count,
        args.out.display()
    );
    Ok(())
}
