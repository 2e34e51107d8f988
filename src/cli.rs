//! Command-line definitions for neo-atlas

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use neo_atlas::Criteria;

#[derive(Parser)]
#[command(name = "neo-atlas")]
#[command(about = "Explore past and future close approaches of near-Earth objects")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging (RUST_LOG overrides)
    #[arg(long, global = true)]
    pub debug: bool,

    /// CSV file of near-Earth objects
    #[arg(long, global = true, default_value = "data/neos.csv")]
    pub neofile: PathBuf,

    /// JSON file of close approaches
    #[arg(long, global = true, default_value = "data/cad.json")]
    pub cadfile: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Look up a single NEO by designation or name
    Inspect(InspectArgs),

    /// Find close approaches matching the given criteria
    Query(QueryArgs),
}

#[derive(Args)]
#[group(required = true, multiple = false)]
pub struct InspectTarget {
    /// Primary designation, e.g. 433
    #[arg(short, long)]
    pub pdes: Option<String>,

    /// IAU name, e.g. Eros
    #[arg(short, long)]
    pub name: Option<String>,
}

#[derive(Args)]
pub struct InspectArgs {
    #[command(flatten)]
    pub target: InspectTarget,

    /// Also list every known close approach
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Args)]
pub struct QueryArgs {
    /// Only approaches on this date (YYYY-MM-DD)
    #[arg(short, long, value_parser = parse_date)]
    pub date: Option<NaiveDate>,

    /// Only approaches on or after this date (YYYY-MM-DD)
    #[arg(short, long, value_parser = parse_date)]
    pub start_date: Option<NaiveDate>,

    /// Only approaches on or before this date (YYYY-MM-DD)
    #[arg(short, long, value_parser = parse_date)]
    pub end_date: Option<NaiveDate>,

    /// Minimum approach distance in au
    #[arg(long)]
    pub min_distance: Option<f64>,

    /// Maximum approach distance in au
    #[arg(long)]
    pub max_distance: Option<f64>,

    /// Minimum relative velocity in km/s
    #[arg(long)]
    pub min_velocity: Option<f64>,

    /// Maximum relative velocity in km/s
    #[arg(long)]
    pub max_velocity: Option<f64>,

    /// Minimum NEO diameter in km
    #[arg(long)]
    pub min_diameter: Option<f64>,

    /// Maximum NEO diameter in km
    #[arg(long)]
    pub max_diameter: Option<f64>,

    /// Only potentially hazardous NEOs
    #[arg(long, conflicts_with = "not_hazardous")]
    pub hazardous: bool,

    /// Only NEOs that are not potentially hazardous
    #[arg(long)]
    pub not_hazardous: bool,

    /// Maximum number of results (0 for no limit)
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Write results to a .csv or .json file instead of printing them
    #[arg(short, long)]
    pub outfile: Option<PathBuf>,
}

impl QueryArgs {
    pub fn criteria(&self) -> Criteria {
        let hazardous = match (self.hazardous, self.not_hazardous) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        };
        Criteria {
            date: self.date,
            start_date: self.start_date,
            end_date: self.end_date,
            distance_min: self.min_distance,
            distance_max: self.max_distance,
            velocity_min: self.min_velocity,
            velocity_max: self.max_velocity,
            diameter_min: self.min_diameter,
            diameter_max: self.max_diameter,
            hazardous,
        }
    }
}

fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|e| format!("'{s}' is not a YYYY-MM-DD date: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(args: &[&str]) -> QueryArgs {
        let argv = ["neo-atlas", "query"].iter().chain(args);
        match Cli::try_parse_from(argv).unwrap().command {
            Commands::Query(q) => q,
            Commands::Inspect(_) => unreachable!(),
        }
    }

    #[test]
    fn maps_flags_to_criteria() {
        let criteria = query(&[
            "--start-date",
            "2020-01-01",
            "--max-distance",
            "0",
            "--not-hazardous",
            "--limit",
            "5",
        ])
        .criteria();
        assert_eq!(criteria.start_date, NaiveDate::from_ymd_opt(2020, 1, 1));
        assert_eq!(criteria.distance_max, Some(0.0));
        assert_eq!(criteria.hazardous, Some(false));
        assert_eq!(criteria.date, None);
        assert_eq!(criteria.velocity_min, None);
    }

    #[test]
    fn no_flags_means_no_criteria() {
        assert_eq!(query(&[]).criteria(), Criteria::default());
    }

    #[test]
    fn rejects_bad_input() {
        assert!(Cli::try_parse_from(["neo-atlas", "query", "--date", "2020-13-01"]).is_err());
        assert!(
            Cli::try_parse_from(["neo-atlas", "query", "--hazardous", "--not-hazardous"]).is_err()
        );
        assert!(Cli::try_parse_from(["neo-atlas", "inspect"]).is_err());
        assert!(Cli::try_parse_from(["neo-atlas", "inspect", "-p", "433", "-n", "Eros"]).is_err());
    }
}
