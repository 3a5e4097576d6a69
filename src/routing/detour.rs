//! Detour waypoint synthesis: pushes the alternative route away from the
//! worst-exposed stretch of the baseline polyline.

use geo_types::Coord;

use crate::layers::crime::CrimeSnapshot;
use crate::layers::geo_util;

use super::config::RouterConfig;
use super::weights::{severity_weight, HIGH_SEVERITY};

/// Radius around a candidate waypoint checked for high-severity incidents
/// when choosing which side of the route to detour to.
const CANDIDATE_CLEARANCE_M: f64 = 300.0;

/// Severity-weighted exposure of one polyline segment, counting only
/// high-severity incidents within the detection radius.
fn detour_score(a: Coord<f64>, b: Coord<f64>, snapshot: &CrimeSnapshot, config: &RouterConfig) -> f64 {
    snapshot
        .near_segment(a, b, config.detection_radius_m)
        .iter()
        .filter(|hit| hit.crime.severity >= HIGH_SEVERITY)
        .map(|hit| severity_weight(hit.crime.severity))
        .sum()
}

/// Index and score of the worst segment; ties go to the lowest index.
fn worst_segment(
    polyline: &[Coord<f64>],
    snapshot: &CrimeSnapshot,
    config: &RouterConfig,
) -> Option<(usize, f64)> {
    let mut worst: Option<(usize, f64)> = None;
    for (idx, pair) in polyline.windows(2).enumerate() {
        let score = detour_score(pair[0], pair[1], snapshot, config);
        match worst {
            Some((_, best)) if score <= best => {}
            _ => worst = Some((idx, score)),
        }
    }
    worst
}

fn high_severity_count_near(p: Coord<f64>, snapshot: &CrimeSnapshot) -> usize {
    snapshot
        .within_radius(p, CANDIDATE_CLEARANCE_M)
        .into_iter()
        .filter(|c| c.severity >= HIGH_SEVERITY)
        .count()
}

/// Waypoint list for the alternative routing call.
///
/// Returns `[start, end]` when the baseline is already acceptable, otherwise
/// `[start, detour, end]` with a single interior waypoint offset
/// perpendicular to the overall route direction from the midpoint of the
/// worst segment. Deterministic for a fixed snapshot; never fails.
pub fn synthesize_waypoints(
    polyline: &[Coord<f64>],
    snapshot: &CrimeSnapshot,
    start: Coord<f64>,
    end: Coord<f64>,
    config: &RouterConfig,
) -> Vec<Coord<f64>> {
    let direct = vec![start, end];

    let Some((idx, score)) = worst_segment(polyline, snapshot, config) else {
        return direct;
    };
    if score <= config.detour_trigger_score {
        return direct;
    }

    let a = polyline[idx];
    let b = polyline[idx + 1];
    let mid = Coord {
        x: (a.x + b.x) / 2.0,
        y: (a.y + b.y) / 2.0,
    };

    // offset perpendicular to the overall direction, not the segment's own;
    // short or oddly angled worst segments would otherwise fling the
    // waypoint in arbitrary directions
    let dir_x = end.x - start.x;
    let dir_y = end.y - start.y;
    let norm = (dir_x * dir_x + dir_y * dir_y).sqrt();
    if norm == 0.0 {
        return direct;
    }
    let perp_x = -dir_y / norm;
    let perp_y = dir_x / norm;

    let plus = Coord {
        x: mid.x + config.detour_offset_deg * perp_x,
        y: mid.y + config.detour_offset_deg * perp_y,
    };
    let minus = Coord {
        x: mid.x - config.detour_offset_deg * perp_x,
        y: mid.y - config.detour_offset_deg * perp_y,
    };

    let plus_count = high_severity_count_near(plus, snapshot);
    let minus_count = high_severity_count_near(minus, snapshot);
    let detour = if plus_count <= minus_count { plus } else { minus };

    log::debug!(
        "detour from segment {idx} (score {score:.2}), candidates +{plus_count}/-{minus_count}"
    );

    vec![start, detour, end]
}

/// Distance in meters from `p` to the nearest point of the polyline.
pub fn distance_to_polyline_m(p: Coord<f64>, polyline: &[Coord<f64>]) -> f64 {
    polyline
        .windows(2)
        .map(|pair| geo_util::point_to_segment_m(p, pair[0], pair[1]))
        .fold(f64::INFINITY, f64::min)
}
