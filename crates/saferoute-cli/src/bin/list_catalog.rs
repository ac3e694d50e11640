//! Print the bundled location and hazard catalogs.

use clap::{Parser, ValueEnum};
use saferoute_cli::{init_tracing, report, Config};
use saferoute_core::{HazardCatalog, HazardQuery, LocationCatalog};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Section {
    Locations,
    Hazards,
    All,
}

/// List known locations and hazard zones
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Which catalog to print
    #[arg(long, value_enum, default_value_t = Section::All)]
    show: Section,

    /// Mark zones active with every avoidance toggle on (default: toggles off)
    #[arg(long)]
    avoid_all: bool,

    /// Print the catalogs as JSON
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = Config::from_env();
    init_tracing(config.log_format)?;

    let locations = LocationCatalog::chennai();
    let hazards = HazardCatalog::chennai();
    let query = if args.avoid_all {
        HazardQuery::ALL
    } else {
        HazardQuery::NONE
    };

    if args.json {
        let value = match args.show {
            Section::Locations => serde_json::to_value(&locations)?,
            Section::Hazards => serde_json::to_value(&hazards)?,
            Section::All => serde_json::json!({
                "locations": locations,
                "hazards": hazards,
            }),
        };
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    if args.show != Section::Hazards {
        println!("Locations");
        print!("{}", report::locations_report(&locations));
        println!();
    }
    if args.show != Section::Locations {
        println!("Hazard zones (* = active)");
        print!("{}", report::hazards_report(&hazards, &query));
    }
    Ok(())
}
