//! Civil bands: which parts of the world currently read close to the
//! target wall-clock time.
//!
//! Two models are provided:
//! - **Coarse**: one 15°-wide slice per whole-hour UTC offset from -12 to
//!   +14, lit when that offset's clock is within the glow window.
//! - **Precise**: the true local clock of a named IANA zone, applied to each
//!   feature of a normalised timezone polygon dataset.
//!
//! Both use the same linear falloff: intensity 1 at the target minute,
//! dropping to 0 at the edge of the window.

use chrono::{DateTime, Timelike, Utc};
use chrono_tz::Tz;
use std::collections::HashMap;

use crate::constants::{
    BAND_HALF_WIDTH_DEGREES, DEGREES_PER_HOUR, MAX_BAND_OFFSET_HOURS, MINIMUM_GLOW_WINDOW_MINUTES,
    MINUTES_PER_DAY, MIN_BAND_OFFSET_HOURS,
};
use crate::geo::angles::{circular_minute_diff, wrap180};
use crate::geo::polygons::TimezonePolygonFeature;
use crate::geo::solar::utc_minutes_of_day;

/// A whole-hour UTC offset slice of the globe near the target time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CivilBand {
    pub offset_hours: i32,
    /// Centre longitude in (-180, 180].
    pub center_lon: f64,
    /// Slice edges at `center_lon ∓ 7.5`; they may step past ±180 for
    /// slices straddling the antimeridian.
    pub start_lon: f64,
    pub end_lon: f64,
    /// Signed minutes from the target, in (-720, 720].
    pub minute_diff: f64,
    pub intensity: f64,
}

/// Intensity of a polygon feature whose zone is near the target time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneIntensity<'a> {
    pub feature: &'a TimezonePolygonFeature,
    pub intensity: f64,
}

/// Linear falloff from 1 at zero distance to 0 at the window edge.
///
/// The window is floored to one minute. Returns `None` outside the window
/// and exactly on its edge, so every returned value lies in (0, 1].
///
/// # Examples
/// ```
/// use deadline_meridian::civil_bands::glow_intensity;
/// assert_eq!(glow_intensity(0.0, 15.0), Some(1.0));
/// assert_eq!(glow_intensity(-7.5, 15.0), Some(0.5));
/// assert_eq!(glow_intensity(15.0, 15.0), None);
/// ```
pub fn glow_intensity(minute_diff: f64, glow_window_minutes: f64) -> Option<f64> {
    let window = glow_window_minutes.max(MINIMUM_GLOW_WINDOW_MINUTES as f64);
    let distance = minute_diff.abs();
    if distance > window {
        return None;
    }
    let intensity = 1.0 - distance / window;
    (intensity > 0.0).then_some(intensity)
}

/// Coarse bands for every whole-hour offset within the glow window.
///
/// # Arguments
/// * `instant` - Current UTC instant
/// * `target_minutes_of_day` - Civil clock reading of the deadline
/// * `glow_window_minutes` - Tolerance, floored to one minute
pub fn build_bands(
    instant: DateTime<Utc>,
    target_minutes_of_day: f64,
    glow_window_minutes: f64,
) -> Vec<CivilBand> {
    let utc_minutes = utc_minutes_of_day(instant);

    (MIN_BAND_OFFSET_HOURS..=MAX_BAND_OFFSET_HOURS)
        .filter_map(|offset_hours| {
            let local_minutes =
                (utc_minutes + offset_hours as f64 * 60.0).rem_euclid(MINUTES_PER_DAY as f64);
            let minute_diff = circular_minute_diff(local_minutes, target_minutes_of_day);
            let intensity = glow_intensity(minute_diff, glow_window_minutes)?;
            let center_lon = wrap180(offset_hours as f64 * DEGREES_PER_HOUR);

            Some(CivilBand {
                offset_hours,
                center_lon,
                start_lon: center_lon - BAND_HALF_WIDTH_DEGREES,
                end_lon: center_lon + BAND_HALF_WIDTH_DEGREES,
                minute_diff,
                intensity,
            })
        })
        .collect()
}

/// Local wall clock of `zone_id` at `instant`, in minutes after midnight.
///
/// Returns `None` for identifiers the zone database does not know.
pub fn local_minutes_of_day(zone_id: &str, instant: DateTime<Utc>) -> Option<f64> {
    let tz: Tz = zone_id.trim().parse().ok()?;
    let local = instant.with_timezone(&tz);
    Some(local.num_seconds_from_midnight() as f64 / 60.0)
}

/// Precise intensity for one zone, or `None` when the zone is unknown or
/// its clock is outside the glow window.
pub fn zone_intensity(
    zone_id: &str,
    instant: DateTime<Utc>,
    target_minutes_of_day: f64,
    glow_window_minutes: f64,
) -> Option<f64> {
    let local_minutes = local_minutes_of_day(zone_id, instant)?;
    let minute_diff = circular_minute_diff(local_minutes, target_minutes_of_day);
    glow_intensity(minute_diff, glow_window_minutes)
}

/// Apply [`zone_intensity`] to every feature of a polygon dataset.
///
/// Features sharing a zone id are looked up once per call.
pub fn zone_intensities<'a>(
    features: &'a [TimezonePolygonFeature],
    instant: DateTime<Utc>,
    target_minutes_of_day: f64,
    glow_window_minutes: f64,
) -> Vec<ZoneIntensity<'a>> {
    let mut by_zone: HashMap<&str, Option<f64>> = HashMap::new();

    features
        .iter()
        .filter_map(|feature| {
            let intensity = *by_zone.entry(feature.zone_id.as_str()).or_insert_with(|| {
                zone_intensity(
                    &feature.zone_id,
                    instant,
                    target_minutes_of_day,
                    glow_window_minutes,
                )
            });
            intensity.map(|intensity| ZoneIntensity { feature, intensity })
        })
        .collect()
}
