//! Angle helpers shared by the solar model, crossing solver and band generator.

use serde::{Deserialize, Serialize};

use crate::constants::{MINUTES_PER_DAY, MINUTES_PER_DEGREE, MINUTES_PER_HALF_DAY};

/// A geographic point in degrees.
///
/// Longitude is in [-180, 180], latitude in [-90, 90].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LonLatPoint {
    pub lon: f64,
    pub lat: f64,
}

impl LonLatPoint {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

/// Signed distance from a point to a meridian, east positive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeridianDistance {
    /// Longitude difference in degrees, in (-180, 180].
    pub delta_longitude: f64,
    /// Same difference expressed as solar-clock minutes.
    pub delta_minutes: f64,
}

/// Wrap an angle in degrees into (-180, 180].
///
/// -180 is folded onto +180 so every longitude has a single representation.
///
/// # Examples
/// ```
/// use deadline_meridian::geo::angles::wrap180;
/// assert_eq!(wrap180(190.0), -170.0);
/// assert_eq!(wrap180(-180.0), 180.0);
/// assert_eq!(wrap180(540.0), 180.0);
/// ```
pub fn wrap180(degrees: f64) -> f64 {
    let wrapped = (degrees + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped <= -180.0 { wrapped + 360.0 } else { wrapped }
}

/// Clamp `value` into `[min, max]`.
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}

pub fn deg_to_rad(degrees: f64) -> f64 {
    degrees.to_radians()
}

pub fn rad_to_deg(radians: f64) -> f64 {
    radians.to_degrees()
}

/// Signed wrap-around difference `a - b` between two minute-of-day values.
///
/// The result lies in (-720, 720], so 23:50 vs 00:10 is -20 minutes.
///
/// # Examples
/// ```
/// use deadline_meridian::geo::angles::circular_minute_diff;
/// assert_eq!(circular_minute_diff(1430.0, 10.0), -20.0);
/// assert_eq!(circular_minute_diff(10.0, 1430.0), 20.0);
/// ```
pub fn circular_minute_diff(a: f64, b: f64) -> f64 {
    let day = MINUTES_PER_DAY as f64;
    let diff = (a - b).rem_euclid(day);
    if diff > MINUTES_PER_HALF_DAY { diff - day } else { diff }
}

/// Distance from `point` to the meridian at `meridian_lon`.
///
/// A positive result means the point lies east of the meridian, so its solar
/// clock is ahead of the meridian's by `delta_minutes`.
pub fn meridian_distance(point: LonLatPoint, meridian_lon: f64) -> MeridianDistance {
    let delta_longitude = wrap180(point.lon - meridian_lon);
    MeridianDistance {
        delta_longitude,
        delta_minutes: delta_longitude * MINUTES_PER_DEGREE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap180_range() {
        assert_eq!(wrap180(0.0), 0.0);
        assert_eq!(wrap180(180.0), 180.0);
        assert_eq!(wrap180(-180.0), 180.0);
        assert_eq!(wrap180(181.0), -179.0);
        assert_eq!(wrap180(-181.0), 179.0);
        assert_eq!(wrap180(720.0), 0.0);
        assert!((wrap180(-725.5) - -5.5).abs() < 1e-12);
    }

    #[test]
    fn test_clamp() {
        assert_eq!(clamp(95.0, -90.0, 90.0), 90.0);
        assert_eq!(clamp(-95.0, -90.0, 90.0), -90.0);
        assert_eq!(clamp(12.5, -90.0, 90.0), 12.5);
    }

    #[test]
    fn test_degree_radian_conversion() {
        assert!((deg_to_rad(180.0) - std::f64::consts::PI).abs() < 1e-12);
        assert!((rad_to_deg(std::f64::consts::FRAC_PI_2) - 90.0).abs() < 1e-12);
    }

    #[test]
    fn test_circular_minute_diff_wraps_midnight() {
        assert_eq!(circular_minute_diff(0.0, 1439.0), 1.0);
        assert_eq!(circular_minute_diff(1439.0, 0.0), -1.0);
        assert_eq!(circular_minute_diff(720.0, 0.0), 720.0);
        assert_eq!(circular_minute_diff(0.0, 720.0), 720.0);
        assert_eq!(circular_minute_diff(600.0, 615.0), -15.0);
    }

    #[test]
    fn test_meridian_distance_east_positive() {
        let prague = LonLatPoint::new(14.42, 50.08);
        let d = meridian_distance(prague, 0.0);
        assert!((d.delta_longitude - 14.42).abs() < 1e-12);
        assert!((d.delta_minutes - 57.68).abs() < 1e-9);

        // Across the antimeridian
        let fiji = LonLatPoint::new(178.0, -18.0);
        let d = meridian_distance(fiji, -178.0);
        assert!((d.delta_longitude - -4.0).abs() < 1e-12);
    }
}
