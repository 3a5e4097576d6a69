use std::time::Duration;

use async_trait::async_trait;
use geo_types::Coord;
use serde::Deserialize;

use super::{OracleError, OraclePolyline, RouteMode, RouteOracle};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Directions client for a Mapbox-style HTTP API.
///
/// The wire protocol takes coordinates as `lng,lat` pairs and returns GeoJSON
/// geometry in the same order; everything above this adapter works in
/// latitude/longitude.
pub struct MapboxDirections {
    client: awc::Client,
    base_url: String,
    access_token: String,
}

impl MapboxDirections {
    pub fn new(base_url: impl Into<String>, access_token: impl Into<String>) -> Self {
        let client = awc::Client::builder().timeout(REQUEST_TIMEOUT).finish();
        MapboxDirections {
            client,
            base_url: base_url.into(),
            access_token: access_token.into(),
        }
    }
}

#[derive(Deserialize)]
struct DirectionsResponse {
    #[serde(default)]
    routes: Vec<DirectionsRoute>,
}

#[derive(Deserialize)]
struct DirectionsRoute {
    geometry: DirectionsGeometry,
    distance: f64,
    duration: f64,
}

#[derive(Deserialize)]
struct DirectionsGeometry {
    coordinates: Vec<[f64; 2]>,
}

fn into_polyline(response: DirectionsResponse) -> Result<OraclePolyline, OracleError> {
    let route = response.routes.into_iter().next().ok_or(OracleError::NoRoutes)?;
    let coords = route
        .geometry
        .coordinates
        .into_iter()
        .map(|[lng, lat]| Coord { x: lng, y: lat })
        .collect();
    Ok(OraclePolyline {
        coords,
        distance_m: route.distance,
        duration_s: route.duration,
    })
}

#[async_trait(?Send)]
impl RouteOracle for MapboxDirections {
    async fn route(
        &self,
        waypoints: &[Coord<f64>],
        mode: RouteMode,
    ) -> Result<OraclePolyline, OracleError> {
        let coords = waypoints
            .iter()
            .map(|c| format!("{:.6},{:.6}", c.x, c.y))
            .collect::<Vec<_>>()
            .join(";");
        let url = format!("{}/{}/{}", self.base_url, mode.profile(), coords);

        log::debug!("requesting directions for {} waypoints", waypoints.len());

        let mut response = self
            .client
            .get(url)
            .query(&[
                ("access_token", self.access_token.as_str()),
                ("geometries", "geojson"),
                ("overview", "full"),
                ("alternatives", "false"),
            ])
            .map_err(|e| OracleError::Request(e.to_string()))?
            .send()
            .await
            .map_err(|e| OracleError::Request(e.to_string()))?;

        if !response.status().is_success() {
            log::error!("directions API returned status {}", response.status());
            return Err(OracleError::Status(response.status().as_u16()));
        }

        let body: DirectionsResponse = response
            .json()
            .await
            .map_err(|e| OracleError::Malformed(e.to_string()))?;

        into_polyline(body)
    }
}
