//! Fixed weight tables mapping incident age and severity to scalars.

/// Severity at or above which an incident counts as high-severity.
pub const HIGH_SEVERITY: u8 = 7;

/// Upper bound of the extreme-penalty time window, in hours.
pub const CRITICAL_AGE_HOURS: f64 = 24.0;

const RECENT_AGE_HOURS: f64 = 7.0 * 24.0;
const MEDIUM_AGE_HOURS: f64 = 30.0 * 24.0;
const OLD_AGE_HOURS: f64 = 90.0 * 24.0;

/// Per-severity scalar in `[0.1, 1.0]`; unknown severities weigh 0.5.
pub fn severity_weight(severity: u8) -> f64 {
    match severity {
        1..=5 => 0.1 * f64::from(severity),
        6 => 0.7,
        7 => 0.8,
        8 => 0.9,
        9 | 10 => 1.0,
        _ => 0.5,
    }
}

/// Piecewise-constant decay factor over incident age.
///
/// The 10 000 factor inside the critical window is what lets a single fresh
/// incident outweigh any plausible detour cost.
pub fn time_decay(age_hours: f64) -> f64 {
    if age_hours <= CRITICAL_AGE_HOURS {
        10_000.0
    } else if age_hours <= RECENT_AGE_HOURS {
        10.0
    } else if age_hours <= MEDIUM_AGE_HOURS {
        1.0
    } else if age_hours <= OLD_AGE_HOURS {
        0.3
    } else {
        0.1
    }
}
