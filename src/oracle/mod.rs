pub mod mapbox;

use async_trait::async_trait;
use geo_types::Coord;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Travel profile requested from the street-routing service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteMode {
    #[default]
    Walking,
    Cycling,
    Driving,
}

impl RouteMode {
    pub fn profile(self) -> &'static str {
        match self {
            RouteMode::Walking => "walking",
            RouteMode::Cycling => "cycling",
            RouteMode::Driving => "driving",
        }
    }
}

/// A street-following polyline returned by the routing service.
///
/// Coordinates use `x` = longitude, `y` = latitude.
#[derive(Debug, Clone)]
pub struct OraclePolyline {
    pub coords: Vec<Coord<f64>>,
    pub distance_m: f64,
    pub duration_s: f64,
}

#[derive(Error, Debug)]
pub enum OracleError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("unexpected status {0}")]
    Status(u16),
    #[error("malformed response: {0}")]
    Malformed(String),
    #[error("no routes in response")]
    NoRoutes,
}

/// Street-routing capability: an ordered waypoint list in, one polyline out.
///
/// Implementations must visit the waypoints in order and return a densely
/// sampled geometry, not just the waypoints themselves.
#[async_trait(?Send)]
pub trait RouteOracle {
    async fn route(
        &self,
        waypoints: &[Coord<f64>],
        mode: RouteMode,
    ) -> Result<OraclePolyline, OracleError>;
}
