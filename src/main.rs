mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, warn};

use cli::{Cli, Commands, InspectArgs, QueryArgs};
use neo_atlas::data::{loader, writer};
use neo_atlas::{
    create_filters, limit, requires_linked_neo, CloseApproach, FilterError, NeoDatabase,
};

/// Results printed to the terminal when `--limit` is not given.
const DEFAULT_PRINT_LIMIT: usize = 10;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let neos = loader::load_neos(&cli.neofile).context("loading NEOs")?;
    let approaches = loader::load_approaches(&cli.cadfile).context("loading close approaches")?;
    let db = NeoDatabase::new(neos, approaches);

    match cli.command {
        Commands::Inspect(args) => inspect(&db, &args),
        Commands::Query(args) => query(&db, &args),
    }
}

fn inspect(db: &NeoDatabase, args: &InspectArgs) -> Result<()> {
    let found = match (&args.target.pdes, &args.target.name) {
        (Some(pdes), _) => db.get_neo_by_designation(pdes),
        (None, Some(name)) => db.get_neo_by_name(name),
        (None, None) => None,
    };

    let Some(neo) = found else {
        println!("No matching NEOs exist in the database.");
        return Ok(());
    };

    println!("{neo}");
    if args.verbose {
        for approach in db.approaches_of(neo) {
            println!("- {}", approach.describe(Some(neo)));
        }
    }
    Ok(())
}

fn query(db: &NeoDatabase, args: &QueryArgs) -> Result<()> {
    let filters = create_filters(&args.criteria());
    for filter in &filters {
        debug!("filter: {filter}");
    }

    // Exports need NEO columns, and diameter/hazard filters need an NEO to read.
    let linked_only = args.outfile.is_some() || requires_linked_neo(&filters);
    let results: Box<dyn Iterator<Item = Result<&CloseApproach, FilterError>> + '_> =
        if linked_only {
            debug!("leaving out close approaches without a known NEO");
            Box::new(db.query_linked(&filters))
        } else {
            Box::new(db.query(&filters))
        };

    if let Some(outfile) = &args.outfile {
        writer::write_results(outfile, db, limit(results, args.limit))?;
        return Ok(());
    }

    let shown = args.limit.unwrap_or(DEFAULT_PRINT_LIMIT);
    let mut printed = 0;
    for result in limit(results, Some(shown)) {
        let approach = result?;
        let neo = db.neo_of(approach);
        if neo.is_none() {
            warn!(
                "close approach of '{}' has no matching NEO",
                approach.designation()
            );
        }
        println!("{}", approach.describe(neo));
        printed += 1;
    }
    if printed == 0 {
        println!("No matching close approaches.");
    }
    Ok(())
}
