//! Routing orchestrator: composes the crime store, route oracle, exposure
//! model, and detour synthesizer into full route plans.

use std::rc::Rc;

use geo_types::Coord;

use crate::layers::crime::{CrimePoint, CrimeSnapshot};
use crate::layers::crime_store::CrimeStore;
use crate::layers::error::{Error, OracleCall};
use crate::layers::geo_util::{self, BBox};
use crate::oracle::{OraclePolyline, RouteOracle};

use super::config::RouterConfig;
use super::density;
use super::detour;
use super::exposure;
use super::types::{
    safety_grade, BlockedArea, CrimeZone, HeatmapSummary, Route, RouteComparison, RouteKind,
    RoutePlan, Segment,
};
use super::weights::HIGH_SEVERITY;

/// Guard against a zero denominator in the distance delta percentage.
const DISTANCE_EPSILON_M: f64 = 1e-6;
/// Floor for the safety-improvement percentage denominator.
const SAFETY_EPSILON: f64 = 0.1;

/// Stateless per-request router over injected store and oracle capabilities.
///
/// Holds no mutable state; every operation is reentrant and deterministic
/// for a fixed crime snapshot and oracle responses.
pub struct RouteEngine {
    store: Rc<dyn CrimeStore>,
    oracle: Rc<dyn RouteOracle>,
    config: RouterConfig,
}

impl RouteEngine {
    pub fn new(store: Rc<dyn CrimeStore>, oracle: Rc<dyn RouteOracle>, config: RouterConfig) -> Self {
        RouteEngine {
            store,
            oracle,
            config,
        }
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Computes the fastest and safest routes between two coordinates with
    /// the comparison summary.
    pub async fn optimal_route(&self, start: Coord<f64>, end: Coord<f64>) -> Result<RoutePlan, Error> {
        validate(start)?;
        validate(end)?;

        let bbox = BBox::from_corners(start, end).expanded(self.config.bbox_buffer_deg);
        let crimes = self.store.crimes_in_bbox(bbox).await?;
        log::debug!("routing with {} incidents in scope", crimes.len());
        let snapshot = CrimeSnapshot::new(crimes);

        let baseline = self
            .oracle
            .route(&[start, end], self.config.mode)
            .await
            .map_err(|source| Error::OracleUnavailable {
                which: OracleCall::Baseline,
                source,
            })?;
        if baseline.coords.len() < 2 {
            return Err(Error::DegenerateRoute);
        }

        let fastest = self.build_route(RouteKind::Fastest, &baseline, &snapshot);

        let waypoints =
            detour::synthesize_waypoints(&baseline.coords, &snapshot, start, end, &self.config);

        let (safest, fallback) = if waypoints.len() > 2 {
            match self.oracle.route(&waypoints, self.config.mode).await {
                Ok(alternative) => {
                    if alternative.coords.len() < 2 {
                        return Err(Error::DegenerateRoute);
                    }
                    let candidate = self.build_route(RouteKind::Safest, &alternative, &snapshot);
                    // never report an alternative that scored worse than
                    // the baseline it was meant to improve on
                    if candidate.total_safety_score < fastest.total_safety_score {
                        log::debug!(
                            "alternative scored {:.1} below baseline {:.1}, keeping baseline",
                            candidate.total_safety_score,
                            fastest.total_safety_score
                        );
                        (fastest.relabeled(RouteKind::Safest), false)
                    } else {
                        (candidate, false)
                    }
                }
                Err(source) => {
                    log::error!("alternative oracle call failed: {source}");
                    (fastest.relabeled(RouteKind::Safest), true)
                }
            }
        } else {
            (fastest.relabeled(RouteKind::Safest), false)
        };

        let comparison = compare(&fastest, &safest);
        Ok(RoutePlan {
            fastest_route: fastest,
            safest_route: safest,
            comparison,
            safest_fallback: fallback,
        })
    }

    /// Crime density cells plus counters for a bounding box.
    pub async fn crime_density_heatmap(&self, bbox: BBox) -> Result<HeatmapSummary, Error> {
        validate_bbox(&bbox)?;
        let crimes = self.store.crimes_in_bbox(bbox).await?;
        Ok(density::heatmap(bbox, &crimes, &self.config))
    }

    /// Critical-window incidents wrapped with the advisory radius.
    pub async fn blocked_areas(&self, bbox: BBox) -> Result<Vec<BlockedArea>, Error> {
        validate_bbox(&bbox)?;
        let crimes = self.store.crimes_in_bbox(bbox).await?;
        Ok(density::blocked_areas(&crimes, &self.config))
    }

    /// Recent incidents for a bounding box, most recent first.
    pub async fn crimes_in_bbox(&self, bbox: BBox) -> Result<Vec<CrimePoint>, Error> {
        validate_bbox(&bbox)?;
        self.store.crimes_in_bbox(bbox).await
    }

    fn build_route(&self, kind: RouteKind, polyline: &OraclePolyline, snapshot: &CrimeSnapshot) -> Route {
        let segments = exposure::build_segments(&polyline.coords, snapshot, &self.config);
        let total_safety_score = exposure::route_safety_score(&segments);
        let critical_crime_zones = self.critical_zones(&segments, snapshot);

        Route {
            route_type: kind,
            total_distance: polyline.distance_m,
            total_duration: polyline.duration_s,
            total_safety_score,
            total_crime_penalty: exposure::total_penalty(&segments),
            safety_grade: safety_grade(total_safety_score),
            path_coordinates: polyline.coords.iter().map(|c| [c.y, c.x]).collect(),
            segments,
            critical_crime_zones,
        }
    }

    /// The most critical incidents sitting inside the route's influence
    /// region, worst first, capped.
    fn critical_zones(&self, segments: &[Segment], snapshot: &CrimeSnapshot) -> Vec<CrimeZone> {
        let mut zones: Vec<&CrimePoint> = snapshot
            .crimes()
            .iter()
            .filter(|c| c.age_hours <= self.config.critical_hours && c.severity >= HIGH_SEVERITY)
            .filter(|c| {
                segments.iter().any(|s| {
                    geo_util::point_to_segment_m(c.position(), s.start(), s.end())
                        < self.config.influence_radius_m
                })
            })
            .collect();
        zones.sort_by(|a, b| {
            b.severity
                .cmp(&a.severity)
                .then(a.age_hours.total_cmp(&b.age_hours))
        });
        zones.truncate(self.config.max_critical_zones);
        zones
            .into_iter()
            .map(|c| CrimeZone {
                lat: c.lat,
                lng: c.lng,
                severity: c.severity,
                crime_type: c.crime_type.clone(),
                hours_ago: c.age_hours,
            })
            .collect()
    }
}

fn validate(c: Coord<f64>) -> Result<(), Error> {
    if geo_util::is_plausible(c.y, c.x) {
        Ok(())
    } else {
        Err(Error::InvalidCoordinate { lat: c.y, lng: c.x })
    }
}

fn validate_bbox(bbox: &BBox) -> Result<(), Error> {
    validate(Coord {
        x: bbox.min_lng,
        y: bbox.min_lat,
    })?;
    validate(Coord {
        x: bbox.max_lng,
        y: bbox.max_lat,
    })
}

fn compare(fastest: &Route, safest: &Route) -> RouteComparison {
    let time_diff = safest.total_duration - fastest.total_duration;
    let distance_diff = safest.total_distance - fastest.total_distance;
    let safety_diff = safest.total_safety_score - fastest.total_safety_score;

    RouteComparison {
        time_difference_seconds: round1(time_diff),
        time_difference_minutes: round1(time_diff / 60.0),
        distance_difference_meters: round1(distance_diff),
        distance_difference_percent: round1(
            distance_diff / fastest.total_distance.max(DISTANCE_EPSILON_M) * 100.0,
        ),
        safety_improvement: round1(safety_diff),
        safety_improvement_percent: round1(
            safety_diff / fastest.total_safety_score.max(SAFETY_EPSILON) * 100.0,
        ),
    }
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}
