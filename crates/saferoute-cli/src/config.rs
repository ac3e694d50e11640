//! CLI configuration from environment.

use saferoute_core::{
    GeoBounds, GridIndex, HazardCatalog, LocationCatalog, RouteEngineConfig, RouteService,
    DEFAULT_CELL_SIZE_DEG,
};
use std::env;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LOG_DIRECTIVES: &str = "saferoute_cli=info,saferoute_core=info";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub cell_size_deg: f64,
    pub repulsion_weight: f64,
    pub max_expansions: Option<usize>,
    pub strict_locations: bool,
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cell_size_deg: DEFAULT_CELL_SIZE_DEG,
            repulsion_weight: RouteEngineConfig::default().repulsion_weight,
            max_expansions: None,
            strict_locations: false,
            log_format: LogFormat::Text,
        }
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unparsable values keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            cell_size_deg: lookup("SAFEROUTE_CELL_SIZE_DEG")
                .and_then(|s| s.trim().parse().ok())
                .filter(|size: &f64| size.is_finite() && *size > 0.0)
                .unwrap_or(defaults.cell_size_deg),
            repulsion_weight: lookup("SAFEROUTE_REPULSION_WEIGHT")
                .and_then(|s| s.trim().parse().ok())
                .filter(|weight: &f64| weight.is_finite() && *weight >= 0.0)
                .unwrap_or(defaults.repulsion_weight),
            max_expansions: lookup("SAFEROUTE_MAX_EXPANSIONS")
                .and_then(|s| s.trim().parse().ok())
                .or(defaults.max_expansions),
            strict_locations: lookup("SAFEROUTE_STRICT_LOCATIONS")
                .and_then(|s| parse_flag(&s))
                .unwrap_or(defaults.strict_locations),
            log_format: match lookup("SAFEROUTE_LOG_FORMAT").as_deref().map(str::trim) {
                Some(format) if format.eq_ignore_ascii_case("json") => LogFormat::Json,
                _ => defaults.log_format,
            },
        }
    }

    pub fn engine_config(&self) -> RouteEngineConfig {
        RouteEngineConfig {
            repulsion_weight: self.repulsion_weight,
            max_expansions: self.max_expansions,
            ..RouteEngineConfig::default()
        }
    }

    /// Chennai catalogs on a grid of the configured cell size.
    pub fn build_service(&self) -> RouteService {
        RouteService::new(
            GridIndex::new(GeoBounds::CHENNAI, self.cell_size_deg),
            HazardCatalog::chennai(),
            LocationCatalog::chennai(),
            self.engine_config(),
        )
        .with_strict_locations(self.strict_locations)
    }
}

/// Install the global subscriber. `RUST_LOG` directives extend the defaults.
pub fn init_tracing(format: LogFormat) -> anyhow::Result<()> {
    let mut filter = EnvFilter::from_default_env();
    for directive in DEFAULT_LOG_DIRECTIVES.split(',') {
        filter = filter.add_directive(directive.parse()?);
    }
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()?,
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init()?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let config = Config::from_lookup(|_| None);
        assert_eq!(config, Config::default());
        assert_eq!(config.cell_size_deg, 0.005);
        assert_eq!(config.repulsion_weight, 1000.0);
    }

    #[test]
    fn reads_every_variable() {
        let config = Config::from_lookup(lookup_from(&[
            ("SAFEROUTE_CELL_SIZE_DEG", "0.01"),
            ("SAFEROUTE_REPULSION_WEIGHT", " 250 "),
            ("SAFEROUTE_MAX_EXPANSIONS", "5000"),
            ("SAFEROUTE_STRICT_LOCATIONS", "yes"),
            ("SAFEROUTE_LOG_FORMAT", "JSON"),
        ]));
        assert_eq!(config.cell_size_deg, 0.01);
        assert_eq!(config.repulsion_weight, 250.0);
        assert_eq!(config.max_expansions, Some(5000));
        assert!(config.strict_locations);
        assert_eq!(config.log_format, LogFormat::Json);

        let service = config.build_service();
        assert_eq!(service.grid().rows(), 30);
        assert_eq!(service.config().max_expansions, Some(5000));
    }

    #[test]
    fn bad_values_fall_back() {
        let config = Config::from_lookup(lookup_from(&[
            ("SAFEROUTE_CELL_SIZE_DEG", "-1"),
            ("SAFEROUTE_REPULSION_WEIGHT", "lots"),
            ("SAFEROUTE_MAX_EXPANSIONS", "-3"),
            ("SAFEROUTE_STRICT_LOCATIONS", "maybe"),
        ]));
        assert_eq!(config, Config::default());
    }
}
