//! Report active hazard zones near a coordinate or named place.

use clap::Parser;
use saferoute_cli::{init_tracing, report, Config};
use saferoute_core::{Coordinate, HazardQuery, DEFAULT_ALERT_RADIUS_M};

/// Check for hazards near a location
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Named location (overrides --lat/--lon)
    #[arg(long)]
    place: Option<String>,

    /// Latitude
    #[arg(long, default_value_t = 13.0827, allow_negative_numbers = true)]
    lat: f64,

    /// Longitude
    #[arg(long, default_value_t = 80.2707, allow_negative_numbers = true)]
    lon: f64,

    /// Alert radius in meters
    #[arg(long, default_value_t = DEFAULT_ALERT_RADIUS_M)]
    radius_m: f64,

    /// Include high-crime areas
    #[arg(long)]
    avoid_crime: bool,

    /// Include flood-prone areas
    #[arg(long)]
    avoid_flood: bool,

    /// Include heavy-traffic areas
    #[arg(long)]
    avoid_traffic: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = Config::from_env();
    init_tracing(config.log_format)?;

    let service = config.build_service();
    let point = match &args.place {
        Some(name) => service
            .locations()
            .resolve(name)
            .map_err(|failure| anyhow::anyhow!(failure.user_message()))?
            .coordinate,
        None => Coordinate::new(args.lat, args.lon),
    };
    if !service.grid().bounds().contains(&point) {
        tracing::warn!(lat = point.lat, lon = point.lon, "point is outside the planning area");
    }

    let query = HazardQuery {
        avoid_high_crime: args.avoid_crime,
        avoid_flood_prone: args.avoid_flood,
        avoid_heavy_traffic: args.avoid_traffic,
    };
    let alerts = service
        .hazards()
        .proximity_alerts(&point, args.radius_m, &query);

    println!(
        "Hazards within {:.0} m of ({:.4}, {:.4}):",
        args.radius_m, point.lat, point.lon
    );
    print!("{}", report::alerts_report(&alerts));
    Ok(())
}
