//! Plan a route between two named Chennai locations.
//!
//! Usage:
//!   cargo run -p saferoute-cli --bin plan_route -- --from "Chennai Central" --to "Chennai Airport" --avoid-all

use anyhow::Context;
use clap::{Parser, ValueEnum};
use saferoute_cli::{init_tracing, report, Config};
use saferoute_core::{
    sort_by_exposure, to_geojson_string, HazardQuery, Route, RouteResult, TravelMode,
};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Kind {
    /// Never enters an avoided zone
    Safe,
    /// Minimum travel time; avoided zones only cost more
    Fastest,
    /// Both, least hazard-exposed first
    Both,
}

/// Compute a fastest or secure route
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Start location name
    #[arg(long)]
    from: String,

    /// Destination location name
    #[arg(long)]
    to: String,

    /// Travel mode: car, walk or bike
    #[arg(long, default_value = "car")]
    mode: TravelMode,

    /// Route kind
    #[arg(long, value_enum, default_value_t = Kind::Safe)]
    kind: Kind,

    /// Avoid high-crime areas
    #[arg(long)]
    avoid_crime: bool,

    /// Avoid flood-prone areas
    #[arg(long)]
    avoid_flood: bool,

    /// Avoid heavy-traffic areas
    #[arg(long)]
    avoid_traffic: bool,

    /// Shorthand for all three avoidance flags
    #[arg(long)]
    avoid_all: bool,

    /// Print only the start, direction changes and end
    #[arg(long)]
    turns: bool,

    /// Print the route as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Also write the least exposed route as a GeoJSON feature to this file
    #[arg(long)]
    geojson: Option<PathBuf>,
}

impl Args {
    fn query(&self) -> HazardQuery {
        if self.avoid_all {
            return HazardQuery::ALL;
        }
        HazardQuery {
            avoid_high_crime: self.avoid_crime,
            avoid_flood_prone: self.avoid_flood,
            avoid_heavy_traffic: self.avoid_traffic,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = Config::from_env();
    init_tracing(config.log_format)?;

    let service = config.build_service();
    let query = args.query();
    tracing::info!(
        from = %args.from,
        to = %args.to,
        mode = %args.mode,
        kind = ?args.kind,
        "planning route"
    );

    let safe = || service.find_safe_route(&args.from, &args.to, args.mode, &query);
    let fastest = || service.find_fastest_route(&args.from, &args.to, args.mode, &query);
    let mut routes = match args.kind {
        Kind::Safe => vec![planned(safe())?],
        Kind::Fastest => vec![planned(fastest())?],
        Kind::Both => {
            // A secure route may not exist; the fastest one still gets reported.
            let mut routes = vec![planned(fastest())?];
            match safe() {
                Ok(route) => routes.push(route),
                Err(failure) => eprintln!("{}", failure.user_message()),
            }
            routes
        }
    };
    sort_by_exposure(&mut routes);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&routes)?);
    } else {
        for (i, route) in routes.iter().enumerate() {
            if i > 0 {
                println!();
            }
            print!("{}", report::route_report(route, args.turns));
        }
    }

    if let (Some(path), Some(route)) = (&args.geojson, routes.first()) {
        let text = to_geojson_string(route)?;
        std::fs::write(path, text)
            .with_context(|| format!("failed to write {}", path.display()))?;
        tracing::info!(path = %path.display(), "wrote GeoJSON");
    }
    Ok(())
}

fn planned(result: RouteResult<Route>) -> anyhow::Result<Route> {
    result.map_err(|failure| {
        tracing::warn!(%failure, "route planning failed");
        anyhow::anyhow!(failure.user_message())
    })
}
