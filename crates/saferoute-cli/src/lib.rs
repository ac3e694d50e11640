//! SafeRoute CLI - command line front end for the route planner.
//!
//! Binaries:
//! - plan_route: fastest or secure route between two named places
//! - list_catalog: bundled locations and hazard zones
//! - hazard_check: proximity alerts around a coordinate

pub mod config;
pub mod report;

pub use config::{init_tracing, Config, LogFormat};
