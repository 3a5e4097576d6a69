//! Weighted density aggregation over a 100 m grid, for heatmaps and the
//! blocked-area listing.

use std::collections::BTreeMap;

use crate::layers::crime::CrimePoint;
use crate::layers::geo_util::{self, BBox};

use super::config::RouterConfig;
use super::types::{BlockedArea, DensityCell, HeatmapSummary};
use super::weights::{severity_weight, time_decay, HIGH_SEVERITY};

/// Advisory radius reported for every blocked area, meters.
const BLOCKED_RADIUS_M: f64 = 100.0;
/// Density value at which cell intensity saturates.
const INTENSITY_SATURATION: f64 = 10.0;

/// Aggregates incidents into grid cells weighted by recency and severity.
///
/// Cells are emitted in row-major order so the output is deterministic for
/// a fixed snapshot.
pub fn density_grid(bbox: BBox, crimes: &[CrimePoint], config: &RouterConfig) -> Vec<DensityCell> {
    let cell_lat = geo_util::meters_to_lat_deg(config.grid_cell_m);
    let cell_lng = geo_util::meters_to_lng_deg(config.grid_cell_m, bbox.mean_lat());

    let rows = ((bbox.max_lat - bbox.min_lat) / cell_lat).ceil() as i64 + 1;
    let cols = ((bbox.max_lng - bbox.min_lng) / cell_lng).ceil() as i64 + 1;

    let mut cells: BTreeMap<(i64, i64), f64> = BTreeMap::new();
    for crime in crimes {
        let row = ((crime.lat - bbox.min_lat) / cell_lat).floor() as i64;
        let col = ((crime.lng - bbox.min_lng) / cell_lng).floor() as i64;
        // upstream expansion can hand us incidents outside the grid
        if row < 0 || row >= rows || col < 0 || col >= cols {
            continue;
        }
        let weight = time_decay(crime.age_hours) * severity_weight(crime.severity);
        *cells.entry((row, col)).or_insert(0.0) += weight;
    }

    cells
        .into_iter()
        .map(|((row, col), density)| DensityCell {
            lat: bbox.min_lat + (row as f64 + 0.5) * cell_lat,
            lng: bbox.min_lng + (col as f64 + 0.5) * cell_lng,
            density,
            intensity: (density / INTENSITY_SATURATION).min(1.0),
        })
        .collect()
}

/// Heatmap cells plus snapshot-wide counters.
pub fn heatmap(bbox: BBox, crimes: &[CrimePoint], config: &RouterConfig) -> HeatmapSummary {
    HeatmapSummary {
        heatmap_data: density_grid(bbox, crimes, config),
        total_crimes: crimes.len(),
        critical_crimes_24h: crimes
            .iter()
            .filter(|c| c.age_hours <= config.critical_hours)
            .count(),
        high_severity_crimes: crimes.iter().filter(|c| c.severity >= HIGH_SEVERITY).count(),
    }
}

/// Incidents inside the critical window, each wrapped with the fixed
/// advisory radius. No spatial merging; duplicates pass through.
pub fn blocked_areas(crimes: &[CrimePoint], config: &RouterConfig) -> Vec<BlockedArea> {
    crimes
        .iter()
        .filter(|c| c.age_hours <= config.critical_hours)
        .map(|c| BlockedArea {
            lat: c.lat,
            lng: c.lng,
            severity: c.severity,
            crime_type: c.crime_type.clone(),
            hours_ago: c.age_hours,
            blocked_radius: BLOCKED_RADIUS_M,
            penalty_level: "CRITICAL",
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn crime(lat: f64, lng: f64, severity: u8, age_hours: f64) -> CrimePoint {
        CrimePoint {
            lat,
            lng,
            severity,
            crime_type: "burglary".to_string(),
            occurred_at: Utc::now(),
            age_hours,
        }
    }

    fn square_km_bbox() -> BBox {
        BBox {
            min_lat: 37.7700,
            min_lng: -122.4200,
            max_lat: 37.7790,
            max_lng: -122.4086,
        }
    }

    #[test]
    fn one_crime_lands_in_one_cell() {
        let config = RouterConfig::default();
        let bbox = square_km_bbox();
        let cells = density_grid(bbox, &[crime(37.7745, -122.4143, 5, 48.0)], &config);
        assert_eq!(cells.len(), 1);
        // decay 10.0 * weight 0.5
        assert!((cells[0].density - 5.0).abs() < 1e-9);
        assert!(bbox.contains(cells[0].lat, cells[0].lng));
    }

    #[test]
    fn colocated_crimes_accumulate() {
        let config = RouterConfig::default();
        let crimes = vec![
            crime(37.7745, -122.4143, 5, 48.0),
            crime(37.7745, -122.4143, 5, 48.0),
        ];
        let cells = density_grid(square_km_bbox(), &crimes, &config);
        assert_eq!(cells.len(), 1);
        assert!((cells[0].density - 10.0).abs() < 1e-9);
        assert_eq!(cells[0].intensity, 1.0);
    }

    #[test]
    fn intensity_saturates_at_one() {
        let config = RouterConfig::default();
        // fresh critical incident: decay 10 000
        let cells = density_grid(
            square_km_bbox(),
            &[crime(37.7745, -122.4143, 10, 1.0)],
            &config,
        );
        assert_eq!(cells[0].intensity, 1.0);
        assert!(cells[0].density > 100.0);
    }

    #[test]
    fn out_of_bbox_incidents_are_dropped() {
        let config = RouterConfig::default();
        let cells = density_grid(square_km_bbox(), &[crime(37.90, -122.41, 5, 48.0)], &config);
        assert!(cells.is_empty());
    }

    #[test]
    fn uniform_spread_populates_one_cell_each() {
        let config = RouterConfig::default();
        let bbox = square_km_bbox();
        // 10x10 lattice, one crime per 100 m cell
        let cell_lat = geo_util::meters_to_lat_deg(config.grid_cell_m);
        let cell_lng = geo_util::meters_to_lng_deg(config.grid_cell_m, bbox.mean_lat());
        let mut crimes = Vec::new();
        for i in 0..10 {
            for j in 0..10 {
                crimes.push(crime(
                    bbox.min_lat + (i as f64 + 0.5) * cell_lat,
                    bbox.min_lng + (j as f64 + 0.5) * cell_lng,
                    5,
                    12.0,
                ));
            }
        }

        let summary = heatmap(bbox, &crimes, &config);
        assert_eq!(summary.total_crimes, 100);
        assert_eq!(summary.critical_crimes_24h, 100);
        assert_eq!(summary.high_severity_crimes, 0);
        assert_eq!(summary.heatmap_data.len(), 100);
        assert!(summary.heatmap_data.iter().all(|c| c.intensity <= 1.0));
    }

    #[test]
    fn blocked_areas_are_critical_only() {
        let config = RouterConfig::default();
        let crimes = vec![
            crime(37.7745, -122.4143, 8, 3.0),
            crime(37.7746, -122.4143, 9, 30.0),
        ];
        let blocked = blocked_areas(&crimes, &config);
        assert_eq!(blocked.len(), 1);
        assert_eq!(blocked[0].severity, 8);
        assert_eq!(blocked[0].blocked_radius, 100.0);
        assert_eq!(blocked[0].penalty_level, "CRITICAL");
    }
}
