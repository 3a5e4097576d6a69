//! Per-segment crime exposure: penalties for edge weighting and the
//! 0–100 safety scores reported to clients.

use geo_types::Coord;

use crate::layers::crime::{CrimeSnapshot, NearbyCrime};
use crate::layers::geo_util;

use super::config::RouterConfig;
use super::types::Segment;
use super::weights::{severity_weight, time_decay, HIGH_SEVERITY};

/// Flat penalty factor for incidents outside the critical window.
const BASE_PENALTY_FACTOR: f64 = 100.0;
/// Per-meter multiplier applied to critical-window incidents, making long
/// segments through fresh crime scenes catastrophically expensive.
const CRITICAL_DISTANCE_FACTOR: f64 = 1000.0;
/// Scale converting a weighted exposure sum into safety-score points.
const SAFETY_SCORE_SCALE: f64 = 200.0;
/// Floor on segment length (km) when computing crimes-per-km density.
const MIN_DENSITY_KM: f64 = 0.001;

/// Penalty contributed by the crimes within the influence radius of a
/// segment of length `distance_m`.
pub fn segment_penalty(distance_m: f64, nearby: &[NearbyCrime<'_>], config: &RouterConfig) -> f64 {
    let mut penalty = 0.0;
    for hit in nearby {
        let t = time_decay(hit.crime.age_hours);
        let d = (1.0 - hit.distance_m / config.influence_radius_m).max(0.0);
        let sigma = severity_weight(hit.crime.severity);
        let scale = if hit.crime.age_hours <= config.critical_hours {
            distance_m * CRITICAL_DISTANCE_FACTOR
        } else {
            BASE_PENALTY_FACTOR
        };
        penalty += t * d * sigma * scale;
    }
    penalty
}

fn segment_safety_score(nearby: &[NearbyCrime<'_>], config: &RouterConfig) -> f64 {
    let exposure: f64 = nearby
        .iter()
        .map(|hit| {
            let t = time_decay(hit.crime.age_hours);
            let sigma = severity_weight(hit.crime.severity);
            let d = (1.0 - hit.distance_m / config.influence_radius_m).max(0.0);
            t * sigma * d * SAFETY_SCORE_SCALE
        })
        .sum();
    (100.0 - exposure).clamp(0.0, 100.0)
}

fn build_segment(a: Coord<f64>, b: Coord<f64>, snapshot: &CrimeSnapshot, config: &RouterConfig) -> Segment {
    let distance = geo_util::distance_m(a, b);

    // degenerate joins appear in oracle geometry; they carry no exposure
    if distance <= 0.0 {
        return Segment {
            start_lat: a.y,
            start_lng: a.x,
            end_lat: b.y,
            end_lng: b.x,
            distance,
            safety_score: 100.0,
            crime_density: 0.0,
            high_severity_crimes: 0,
            critical_crimes_24h: 0,
            hours_to_nearest_crime: None,
            edge_weight: distance,
            crime_penalty: 0.0,
        };
    }

    let nearby = snapshot.near_segment(a, b, config.influence_radius_m);
    let crime_penalty = segment_penalty(distance, &nearby, config);
    let safety_score = segment_safety_score(&nearby, config);
    let crime_density = nearby.len() as f64 / (distance / 1000.0).max(MIN_DENSITY_KM);
    let high_severity_crimes = nearby
        .iter()
        .filter(|hit| hit.crime.severity >= HIGH_SEVERITY)
        .count();
    let critical_crimes_24h = nearby
        .iter()
        .filter(|hit| hit.crime.age_hours <= config.critical_hours)
        .count();
    let hours_to_nearest_crime = nearby
        .iter()
        .map(|hit| hit.crime.age_hours)
        .min_by(f64::total_cmp);

    Segment {
        start_lat: a.y,
        start_lng: a.x,
        end_lat: b.y,
        end_lng: b.x,
        distance,
        safety_score,
        crime_density,
        high_severity_crimes,
        critical_crimes_24h,
        hours_to_nearest_crime,
        edge_weight: distance + crime_penalty,
        crime_penalty,
    }
}

/// Decomposes a polyline into scored segments.
pub fn build_segments(
    polyline: &[Coord<f64>],
    snapshot: &CrimeSnapshot,
    config: &RouterConfig,
) -> Vec<Segment> {
    polyline
        .windows(2)
        .map(|pair| build_segment(pair[0], pair[1], snapshot, config))
        .collect()
}

/// Distance-weighted mean of segment safety scores.
///
/// Weighting by distance keeps short, coincidentally clean segments from
/// masking long exposed stretches.
pub fn route_safety_score(segments: &[Segment]) -> f64 {
    let total: f64 = segments.iter().map(|s| s.distance).sum();
    if total <= 0.0 {
        return 100.0;
    }
    let mean = segments
        .iter()
        .map(|s| s.safety_score * s.distance)
        .sum::<f64>()
        / total;
    mean.clamp(0.0, 100.0)
}

pub fn total_penalty(segments: &[Segment]) -> f64 {
    segments.iter().map(|s| s.crime_penalty).sum()
}
