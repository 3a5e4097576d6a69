use chrono::{DateTime, Utc};
use geo_types::Coord;
use rstar::{RTree, RTreeObject, AABB};
use serde::{Deserialize, Serialize};

use super::geo_util;

/// One reported incident, as read from the crime store.
///
/// `age_hours` is derived at query time against the server clock and is
/// immutable for the lifetime of a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrimePoint {
    pub lat: f64,
    pub lng: f64,
    pub severity: u8,
    pub crime_type: String,
    pub occurred_at: DateTime<Utc>,
    pub age_hours: f64,
}

impl CrimePoint {
    pub fn position(&self) -> Coord<f64> {
        Coord {
            x: self.lng,
            y: self.lat,
        }
    }
}

/// A crime within reach of a segment, paired with its measured offset.
#[derive(Debug, Clone, Copy)]
pub struct NearbyCrime<'a> {
    pub crime: &'a CrimePoint,
    pub distance_m: f64,
}

struct SnapshotEntry {
    pos: [f64; 2],
    idx: usize,
}

impl RTreeObject for SnapshotEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.pos)
    }
}

/// Immutable per-request view of the fetched incidents with a spatial index.
///
/// The R-tree narrows candidates by envelope; exact membership is always
/// re-checked with the geodesy kernel.
pub struct CrimeSnapshot {
    crimes: Vec<CrimePoint>,
    rtree: RTree<SnapshotEntry>,
}

impl CrimeSnapshot {
    pub fn new(crimes: Vec<CrimePoint>) -> CrimeSnapshot {
        let entries = crimes
            .iter()
            .enumerate()
            .map(|(idx, c)| SnapshotEntry {
                pos: [c.lng, c.lat],
                idx,
            })
            .collect();
        CrimeSnapshot {
            rtree: RTree::bulk_load(entries),
            crimes,
        }
    }

    pub fn crimes(&self) -> &[CrimePoint] {
        &self.crimes
    }

    pub fn len(&self) -> usize {
        self.crimes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.crimes.is_empty()
    }

    /// Crimes strictly within `radius_m` of segment `ab`, with distances.
    ///
    /// Results are ordered by snapshot index so repeated queries over the
    /// same snapshot are deterministic.
    pub fn near_segment(&self, a: Coord<f64>, b: Coord<f64>, radius_m: f64) -> Vec<NearbyCrime<'_>> {
        let mean_lat = (a.y + b.y) / 2.0;
        let lat_pad = geo_util::meters_to_lat_deg(radius_m);
        let lng_pad = geo_util::meters_to_lng_deg(radius_m, mean_lat);
        let envelope = AABB::from_corners(
            [a.x.min(b.x) - lng_pad, a.y.min(b.y) - lat_pad],
            [a.x.max(b.x) + lng_pad, a.y.max(b.y) + lat_pad],
        );

        let mut hits: Vec<(usize, f64)> = self
            .rtree
            .locate_in_envelope_intersecting(&envelope)
            .filter_map(|entry| {
                let crime = &self.crimes[entry.idx];
                let distance_m = geo_util::point_to_segment_m(crime.position(), a, b);
                (distance_m < radius_m).then_some((entry.idx, distance_m))
            })
            .collect();
        hits.sort_unstable_by_key(|(idx, _)| *idx);
        hits.into_iter()
            .map(|(idx, distance_m)| NearbyCrime {
                crime: &self.crimes[idx],
                distance_m,
            })
            .collect()
    }

    /// Crimes strictly within `radius_m` of a point, in snapshot order.
    pub fn within_radius(&self, p: Coord<f64>, radius_m: f64) -> Vec<&CrimePoint> {
        let lat_pad = geo_util::meters_to_lat_deg(radius_m);
        let lng_pad = geo_util::meters_to_lng_deg(radius_m, p.y);
        let envelope = AABB::from_corners(
            [p.x - lng_pad, p.y - lat_pad],
            [p.x + lng_pad, p.y + lat_pad],
        );

        let mut indices: Vec<usize> = self
            .rtree
            .locate_in_envelope_intersecting(&envelope)
            .filter(|entry| {
                geo_util::distance_m(self.crimes[entry.idx].position(), p) < radius_m
            })
            .map(|entry| entry.idx)
            .collect();
        indices.sort_unstable();
        indices.into_iter().map(|idx| &self.crimes[idx]).collect()
    }
}
