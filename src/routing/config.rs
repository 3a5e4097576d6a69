use crate::oracle::RouteMode;

/// Tunables recognized by the routing engine.
///
/// The defaults are the operational values; tests tighten or loosen
/// individual knobs.
#[derive(Debug, Clone)]
pub struct RouterConfig {
    /// Membership radius for safety scoring and penalties, meters.
    pub influence_radius_m: f64,
    /// Wider radius used only when ranking segments for detour selection.
    pub detection_radius_m: f64,
    /// Upper bound of the extreme-penalty time window, hours.
    pub critical_hours: f64,
    /// Incidents older than this are excluded from store queries entirely.
    pub retention_days: i64,
    /// Perpendicular offset of the synthesized detour waypoint, degrees.
    pub detour_offset_deg: f64,
    /// Minimum severity-weighted segment score that triggers a detour.
    pub detour_trigger_score: f64,
    /// Density grid cell edge, meters.
    pub grid_cell_m: f64,
    /// Bounding-box inflation applied before fetching the crime snapshot.
    pub bbox_buffer_deg: f64,
    /// Cap on critical crime zones attached to a returned route.
    pub max_critical_zones: usize,
    /// Travel profile requested from the oracle.
    pub mode: RouteMode,
}

impl Default for RouterConfig {
    fn default() -> RouterConfig {
        RouterConfig {
            influence_radius_m: 100.0,
            detection_radius_m: 200.0,
            critical_hours: super::weights::CRITICAL_AGE_HOURS,
            retention_days: 90,
            detour_offset_deg: 0.003,
            detour_trigger_score: 0.3,
            grid_cell_m: 100.0,
            bbox_buffer_deg: 0.01,
            max_critical_zones: 20,
            mode: RouteMode::Walking,
        }
    }
}
