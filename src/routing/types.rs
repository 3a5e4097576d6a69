use geo_types::Coord;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteKind {
    Fastest,
    Safest,
}

/// One edge of a returned polyline with its safety metrics.
#[derive(Debug, Clone, Serialize)]
pub struct Segment {
    pub start_lat: f64,
    pub start_lng: f64,
    pub end_lat: f64,
    pub end_lng: f64,
    /// Segment length in meters.
    pub distance: f64,
    pub safety_score: f64,
    /// Crimes per km within the influence radius.
    pub crime_density: f64,
    pub high_severity_crimes: usize,
    pub critical_crimes_24h: usize,
    pub hours_to_nearest_crime: Option<f64>,
    pub edge_weight: f64,
    #[serde(skip)]
    pub crime_penalty: f64,
}

impl Segment {
    pub fn start(&self) -> Coord<f64> {
        Coord {
            x: self.start_lng,
            y: self.start_lat,
        }
    }

    pub fn end(&self) -> Coord<f64> {
        Coord {
            x: self.end_lng,
            y: self.end_lat,
        }
    }
}

/// A critical incident attached to a returned route.
#[derive(Debug, Clone, Serialize)]
pub struct CrimeZone {
    pub lat: f64,
    pub lng: f64,
    pub severity: u8,
    pub crime_type: String,
    pub hours_ago: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Route {
    pub route_type: RouteKind,
    pub total_distance: f64,
    pub total_duration: f64,
    pub total_safety_score: f64,
    pub total_crime_penalty: f64,
    pub safety_grade: char,
    /// Ordered `[lat, lng]` pairs.
    pub path_coordinates: Vec<[f64; 2]>,
    pub segments: Vec<Segment>,
    pub critical_crime_zones: Vec<CrimeZone>,
}

impl Route {
    /// The same route re-labeled, for the no-detour and fallback paths.
    pub fn relabeled(&self, kind: RouteKind) -> Route {
        let mut route = self.clone();
        route.route_type = kind;
        route
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RouteComparison {
    pub time_difference_seconds: f64,
    pub time_difference_minutes: f64,
    pub distance_difference_meters: f64,
    pub distance_difference_percent: f64,
    pub safety_improvement: f64,
    pub safety_improvement_percent: f64,
}

/// Full response for one routing request.
#[derive(Debug, Clone, Serialize)]
pub struct RoutePlan {
    pub fastest_route: Route,
    pub safest_route: Route,
    pub comparison: RouteComparison,
    /// True when the alternative oracle call failed and the baseline was
    /// reused as the safest route.
    pub safest_fallback: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct DensityCell {
    pub lat: f64,
    pub lng: f64,
    pub density: f64,
    pub intensity: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct HeatmapSummary {
    pub heatmap_data: Vec<DensityCell>,
    pub total_crimes: usize,
    pub critical_crimes_24h: usize,
    pub high_severity_crimes: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct BlockedArea {
    pub lat: f64,
    pub lng: f64,
    pub severity: u8,
    pub crime_type: String,
    pub hours_ago: f64,
    pub blocked_radius: f64,
    pub penalty_level: &'static str,
}

/// Letter grade for a route safety score.
pub fn safety_grade(score: f64) -> char {
    if score >= 85.0 {
        'A'
    } else if score >= 70.0 {
        'B'
    } else if score >= 50.0 {
        'C'
    } else if score >= 30.0 {
        'D'
    } else {
        'F'
    }
}
