//! Failure reasons returned by the planners and the route service.

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum RouteFailure {
    #[error("start location is inside the danger zone '{zone}'")]
    StartInHazard { zone: String },

    #[error("destination is inside the danger zone '{zone}'")]
    EndInHazard { zone: String },

    #[error("no route found")]
    NoPathFound,

    /// The finished safe path failed its hazard re-check. Indicates a planner defect.
    #[error("safe route waypoint {index} lies inside the danger zone '{zone}'")]
    InternalInconsistency { index: usize, zone: String },

    #[error("unknown location '{name}'")]
    InputLocationUnknown { name: String },

    #[error("search abandoned after expanding {expanded} cells")]
    SearchLimitExceeded { expanded: usize },
}

impl RouteFailure {
    /// Message suitable for showing to the person who asked for the route.
    pub fn user_message(&self) -> String {
        match self {
            RouteFailure::NoPathFound => "No route found between these locations.".to_string(),
            RouteFailure::InternalInconsistency { .. } => {
                "Route could not be verified as safe. Please try again.".to_string()
            }
            other => {
                let mut text = other.to_string();
                if let Some(first) = text.get_mut(0..1) {
                    first.make_ascii_uppercase();
                }
                text
            }
        }
    }
}

pub type RouteResult<T> = Result<T, RouteFailure>;
