use std::cell::{Cell, RefCell};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use geo_types::Coord;

use safepath_route_service::layers::crime::CrimePoint;
use safepath_route_service::layers::crime_store::CrimeStore;
use safepath_route_service::layers::error::Error;
use safepath_route_service::layers::geo_util::{self, BBox};
use safepath_route_service::oracle::{OracleError, OraclePolyline, RouteMode, RouteOracle};

pub const START: Coord<f64> = Coord {
    x: -122.4194,
    y: 37.7749,
};
pub const END: Coord<f64> = Coord {
    x: -122.4094,
    y: 37.7849,
};
pub const MID: Coord<f64> = Coord {
    x: -122.4144,
    y: 37.7799,
};

pub fn crime(lat: f64, lng: f64, severity: u8, age_hours: f64) -> CrimePoint {
    CrimePoint {
        lat,
        lng,
        severity,
        crime_type: "assault".to_string(),
        occurred_at: Utc::now() - Duration::minutes((age_hours * 60.0) as i64),
        age_hours,
    }
}

/// In-memory store that ignores the bounding box and serves a fixed
/// snapshot, or fails on demand.
pub struct FakeCrimeStore {
    crimes: Vec<CrimePoint>,
    fail: bool,
}

impl FakeCrimeStore {
    pub fn with(crimes: Vec<CrimePoint>) -> Self {
        FakeCrimeStore {
            crimes,
            fail: false,
        }
    }

    pub fn unavailable() -> Self {
        FakeCrimeStore {
            crimes: Vec::new(),
            fail: true,
        }
    }
}

#[async_trait(?Send)]
impl CrimeStore for FakeCrimeStore {
    async fn crimes_in_bbox(&self, _bbox: BBox) -> Result<Vec<CrimePoint>, Error> {
        if self.fail {
            Err(Error::StoreUnavailable("connection refused".to_string()))
        } else {
            Ok(self.crimes.clone())
        }
    }
}

const POINTS_PER_LEG: usize = 10;
const WALKING_SPEED_M_S: f64 = 1.4;

/// Oracle fake that answers with a straight, densely sampled polyline
/// through the requested waypoints and records every call.
pub struct FakeOracle {
    calls: Cell<usize>,
    waypoint_log: RefCell<Vec<Vec<Coord<f64>>>>,
    mode_log: RefCell<Vec<RouteMode>>,
    fail_from_call: Option<usize>,
    degenerate: bool,
}

impl FakeOracle {
    pub fn new() -> Self {
        FakeOracle {
            calls: Cell::new(0),
            waypoint_log: RefCell::new(Vec::new()),
            mode_log: RefCell::new(Vec::new()),
            fail_from_call: None,
            degenerate: false,
        }
    }

    /// Fails every call starting with the `call`-th (1-based).
    pub fn failing_from(call: usize) -> Self {
        FakeOracle {
            fail_from_call: Some(call),
            ..FakeOracle::new()
        }
    }

    /// Answers every call with a single-point polyline.
    pub fn degenerate() -> Self {
        FakeOracle {
            degenerate: true,
            ..FakeOracle::new()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.get()
    }

    pub fn waypoints_of_call(&self, idx: usize) -> Vec<Coord<f64>> {
        self.waypoint_log.borrow()[idx].clone()
    }

    pub fn mode_of_call(&self, idx: usize) -> RouteMode {
        self.mode_log.borrow()[idx]
    }
}

#[async_trait(?Send)]
impl RouteOracle for FakeOracle {
    async fn route(
        &self,
        waypoints: &[Coord<f64>],
        mode: RouteMode,
    ) -> Result<OraclePolyline, OracleError> {
        let call = self.calls.get() + 1;
        self.calls.set(call);
        self.waypoint_log.borrow_mut().push(waypoints.to_vec());
        self.mode_log.borrow_mut().push(mode);

        if let Some(fail_from) = self.fail_from_call {
            if call >= fail_from {
                return Err(OracleError::Request("connection timed out".to_string()));
            }
        }
        if self.degenerate {
            return Ok(OraclePolyline {
                coords: vec![waypoints[0]],
                distance_m: 0.0,
                duration_s: 0.0,
            });
        }
        Ok(interpolate(waypoints))
    }
}

/// Straight-line polyline through the waypoints with interior samples,
/// distances summed with the same geodesy the engine uses.
pub fn interpolate(waypoints: &[Coord<f64>]) -> OraclePolyline {
    let mut coords = vec![waypoints[0]];
    for pair in waypoints.windows(2) {
        for i in 1..=POINTS_PER_LEG {
            let t = i as f64 / POINTS_PER_LEG as f64;
            coords.push(Coord {
                x: pair[0].x + (pair[1].x - pair[0].x) * t,
                y: pair[0].y + (pair[1].y - pair[0].y) * t,
            });
        }
    }
    let distance_m: f64 = coords
        .windows(2)
        .map(|pair| geo_util::distance_m(pair[0], pair[1]))
        .sum();
    OraclePolyline {
        coords,
        distance_m,
        duration_s: distance_m / WALKING_SPEED_M_S,
    }
}
