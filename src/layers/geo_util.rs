use geo_types::Coord;
use serde::{Deserialize, Serialize};

const EARTH_RADIUS_M: f64 = 6_371_000.0;
const DEGREE_METERS: f64 = 111_000.0;

/// Great-circle distance between two points in meters.
///
/// # Parameters
/// - `a`: First point in WGS84 coordinates (`x` = longitude, `y` = latitude).
/// - `b`: Second point in WGS84 coordinates.
///
/// # Returns
/// The haversine distance in meters.
pub fn distance_m(a: Coord<f64>, b: Coord<f64>) -> f64 {
    let lat1 = a.y.to_radians();
    let lat2 = b.y.to_radians();
    let delta_lat = (b.y - a.y).to_radians();
    let delta_lng = (b.x - a.x).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_M * c
}

/// Distance from a point to a line segment in meters.
///
/// Projects in degree space and scales by 111 000 m/deg; at urban segment
/// lengths the planar error is below the positional noise of the data.
///
/// # Parameters
/// - `p`: Query point.
/// - `a`: Segment start.
/// - `b`: Segment end.
///
/// # Returns
/// Distance from `p` to the closest point on segment `ab`, in meters.
pub fn point_to_segment_m(p: Coord<f64>, a: Coord<f64>, b: Coord<f64>) -> f64 {
    let ap_x = p.x - a.x;
    let ap_y = p.y - a.y;
    let ab_x = b.x - a.x;
    let ab_y = b.y - a.y;

    let len_sq = ab_x * ab_x + ab_y * ab_y;
    if len_sq == 0.0 {
        return (ap_x * ap_x + ap_y * ap_y).sqrt() * DEGREE_METERS;
    }

    let t = ((ap_x * ab_x + ap_y * ab_y) / len_sq).clamp(0.0, 1.0);
    let dx = p.x - (a.x + t * ab_x);
    let dy = p.y - (a.y + t * ab_y);
    (dx * dx + dy * dy).sqrt() * DEGREE_METERS
}

pub fn meters_to_lat_deg(meters: f64) -> f64 {
    meters / DEGREE_METERS
}

pub fn meters_to_lng_deg(meters: f64, ref_lat: f64) -> f64 {
    meters / (DEGREE_METERS * ref_lat.to_radians().cos())
}

/// Whether a coordinate is within the plausible Earth range.
pub fn is_plausible(lat: f64, lng: f64) -> bool {
    lat.is_finite()
        && lng.is_finite()
        && (-90.0..=90.0).contains(&lat)
        && (-180.0..=180.0).contains(&lng)
}

/// Axis-aligned bounding box in WGS84 coordinates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BBox {
    pub min_lat: f64,
    pub min_lng: f64,
    pub max_lat: f64,
    pub max_lng: f64,
}

impl BBox {
    pub fn from_corners(a: Coord<f64>, b: Coord<f64>) -> BBox {
        BBox {
            min_lat: a.y.min(b.y),
            min_lng: a.x.min(b.x),
            max_lat: a.y.max(b.y),
            max_lng: a.x.max(b.x),
        }
    }

    /// Returns this box grown by `deg` degrees on every side.
    pub fn expanded(&self, deg: f64) -> BBox {
        BBox {
            min_lat: self.min_lat - deg,
            min_lng: self.min_lng - deg,
            max_lat: self.max_lat + deg,
            max_lng: self.max_lng + deg,
        }
    }

    pub fn mean_lat(&self) -> f64 {
        (self.min_lat + self.max_lat) / 2.0
    }

    pub fn contains(&self, lat: f64, lng: f64) -> bool {
        (self.min_lat..=self.max_lat).contains(&lat) && (self.min_lng..=self.max_lng).contains(&lng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coord(lat: f64, lng: f64) -> Coord<f64> {
        Coord { x: lng, y: lat }
    }

    #[test]
    fn haversine_union_square_walk() {
        let a = coord(37.7749, -122.4194);
        let b = coord(37.7849, -122.4094);
        let d = distance_m(a, b);
        // ~1.41 km diagonal
        assert!((d - 1410.0).abs() < 30.0, "got {d}");
    }

    #[test]
    fn haversine_zero_for_coincident_points() {
        let p = coord(37.78, -122.41);
        assert_eq!(distance_m(p, p), 0.0);
    }

    #[test]
    fn point_to_segment_perpendicular_offset() {
        // point 0.001 deg (~111 m) north of a west-east segment
        let a = coord(37.78, -122.42);
        let b = coord(37.78, -122.40);
        let p = coord(37.781, -122.41);
        let d = point_to_segment_m(p, a, b);
        assert!((d - 111.0).abs() < 1.0, "got {d}");
    }

    #[test]
    fn point_to_segment_degenerate_segment_is_point_distance() {
        let a = coord(37.78, -122.41);
        let p = coord(37.781, -122.41);
        let d = point_to_segment_m(p, a, a);
        assert!((d - 111.0).abs() < 1.0, "got {d}");
    }

    #[test]
    fn point_beyond_endpoint_clamps_to_endpoint() {
        let a = coord(37.78, -122.42);
        let b = coord(37.78, -122.41);
        let p = coord(37.78, -122.405);
        let d = point_to_segment_m(p, a, b);
        let endpoint = point_to_segment_m(p, b, b);
        assert!((d - endpoint).abs() < 1e-9);
    }

    #[test]
    fn degree_meter_helpers_invert() {
        assert!((meters_to_lat_deg(111_000.0) - 1.0).abs() < 1e-12);
        let lng_deg = meters_to_lng_deg(100.0, 37.78);
        assert!(lng_deg > meters_to_lat_deg(100.0));
    }

    #[test]
    fn plausibility_bounds() {
        assert!(is_plausible(37.7, -122.4));
        assert!(!is_plausible(91.0, 0.0));
        assert!(!is_plausible(0.0, -181.0));
        assert!(!is_plausible(f64::NAN, 0.0));
    }

    #[test]
    fn bbox_expansion_is_symmetric() {
        let bbox = BBox::from_corners(coord(37.77, -122.42), coord(37.78, -122.41)).expanded(0.01);
        assert!((bbox.min_lat - 37.76).abs() < 1e-12);
        assert!((bbox.max_lat - 37.79).abs() < 1e-12);
        assert!((bbox.min_lng - -122.43).abs() < 1e-12);
        assert!((bbox.max_lng - -122.40).abs() < 1e-12);
    }
}
