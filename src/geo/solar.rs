//! Solar position model for the deadline meridian.
//!
//! This module computes where the sun is for a given UTC instant using the
//! low-order Fourier series for the equation of time and solar declination
//! (fractional-year formulation). On top of that it derives:
//! - the sub-solar point (mean or apparent solar time)
//! - the "deadline meridian": the longitude whose local solar time equals a
//!   target minute-of-day, and an unwrapped phase of it for root finding
//! - the angular speed of that meridian
//! - the day/night terminator and the night polygon
//!
//! Every function here is closed-form; there is no iterative refinement.
//! Longitudes are normalised to (-180, 180].

use chrono::{DateTime, Datelike, Timelike, Utc};
use std::f64::consts::PI;

use crate::constants::{
    DECLINATION_EPSILON, MINUTES_PER_DEGREE, MINUTES_PER_HALF_DAY, MS_PER_HOUR, MS_PER_MINUTE,
    POLE_PROBE_LATITUDE, TERMINATOR_MAX_LATITUDE, TERMINATOR_STEP_DEGREES,
};
use crate::geo::angles::{LonLatPoint, clamp, deg_to_rad, rad_to_deg, wrap180};

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Fractional hours elapsed since UTC midnight, including milliseconds.
fn utc_hours_of_day(instant: DateTime<Utc>) -> f64 {
    let seconds = instant.num_seconds_from_midnight() as f64
        + instant.timestamp_subsec_millis() as f64 / 1000.0;
    seconds / 3600.0
}

/// Fractional minutes elapsed since UTC midnight.
pub fn utc_minutes_of_day(instant: DateTime<Utc>) -> f64 {
    utc_hours_of_day(instant) * 60.0
}

/// Radian phase of the instant around the year.
///
/// Uses the UTC day of year and hour of day, with the year length taken
/// from the calendar (365 or 366 days).
pub fn fractional_year_phase(instant: DateTime<Utc>) -> f64 {
    let days_in_year = if is_leap_year(instant.year()) { 366.0 } else { 365.0 };
    let day_index = instant.ordinal0() as f64;
    let hour = utc_hours_of_day(instant);
    2.0 * PI / days_in_year * (day_index + (hour - 12.0) / 24.0)
}

/// Equation of time in minutes (apparent minus mean solar time).
pub fn equation_of_time_minutes(instant: DateTime<Utc>) -> f64 {
    let g = fractional_year_phase(instant);
    229.18
        * (0.000075 + 0.001868 * g.cos()
            - 0.032077 * g.sin()
            - 0.014615 * (2.0 * g).cos()
            - 0.040849 * (2.0 * g).sin())
}

/// Solar declination in radians.
pub fn solar_declination_radians(instant: DateTime<Utc>) -> f64 {
    let g = fractional_year_phase(instant);
    0.006918 - 0.399912 * g.cos() + 0.070257 * g.sin() - 0.006758 * (2.0 * g).cos()
        + 0.000907 * (2.0 * g).sin()
        - 0.002697 * (3.0 * g).cos()
        + 0.00148 * (3.0 * g).sin()
}

/// Equation-of-time correction for the selected mode.
fn time_correction_minutes(instant: DateTime<Utc>, apparent: bool) -> f64 {
    if apparent { equation_of_time_minutes(instant) } else { 0.0 }
}

/// Longitude directly beneath the sun.
///
/// Local solar noon sweeps 15°/hour westward starting from the antimeridian
/// at 00:00 UTC.
pub fn subsolar_longitude(instant: DateTime<Utc>, apparent: bool) -> f64 {
    let minutes = utc_minutes_of_day(instant);
    let correction = time_correction_minutes(instant, apparent);
    wrap180((MINUTES_PER_HALF_DAY - minutes - correction) / MINUTES_PER_DEGREE)
}

/// Latitude directly beneath the sun, i.e. the declination in degrees.
///
/// Declination does not depend on the solar time mode; the flag is accepted
/// so that both sub-solar coordinates share one signature.
pub fn subsolar_latitude(instant: DateTime<Utc>, _apparent: bool) -> f64 {
    rad_to_deg(solar_declination_radians(instant))
}

pub fn subsolar_point(instant: DateTime<Utc>, apparent: bool) -> LonLatPoint {
    LonLatPoint::new(
        subsolar_longitude(instant, apparent),
        subsolar_latitude(instant, apparent),
    )
}

/// Longitude at which local solar time equals `target_minutes_of_day`.
///
/// This is the deadline meridian: it moves westward at roughly 15°/hour.
pub fn meridian_longitude_for_target(
    instant: DateTime<Utc>,
    target_minutes_of_day: f64,
    apparent: bool,
) -> f64 {
    let minutes = utc_minutes_of_day(instant);
    let correction = time_correction_minutes(instant, apparent);
    wrap180((target_minutes_of_day - minutes - correction) / MINUTES_PER_DEGREE)
}

/// Unwrapped phase of the deadline meridian in degrees.
///
/// Congruent to [`meridian_longitude_for_target`] modulo 360, but measured
/// from the Unix epoch so it decreases monotonically (modulo the small
/// equation-of-time wobble) and full rotations can be told apart by plain
/// subtraction.
pub fn phase_degrees(instant: DateTime<Utc>, target_minutes_of_day: f64, apparent: bool) -> f64 {
    phase_degrees_at_millis(instant.timestamp_millis() as f64, target_minutes_of_day, apparent)
}

/// [`phase_degrees`] for a fractional millisecond timestamp.
///
/// The bisection in the crossing solver narrows below one millisecond, so it
/// evaluates the phase here rather than through a `DateTime`.
pub(crate) fn phase_degrees_at_millis(millis: f64, target_minutes_of_day: f64, apparent: bool) -> f64 {
    let correction = if apparent {
        DateTime::from_timestamp_millis(millis.round() as i64)
            .map(equation_of_time_minutes)
            .unwrap_or(0.0)
    } else {
        0.0
    };
    (target_minutes_of_day - millis / MS_PER_MINUTE - correction) / MINUTES_PER_DEGREE
}

/// Westward angular speed of the deadline meridian in degrees per hour.
///
/// Finite difference over a one-hour step. The step is taken on the
/// millisecond timestamp so instants near the end of the calendar stay valid.
pub fn line_speed_degrees_per_hour(
    instant: DateTime<Utc>,
    target_minutes_of_day: f64,
    apparent: bool,
) -> f64 {
    let millis = instant.timestamp_millis() as f64;
    phase_degrees_at_millis(millis, target_minutes_of_day, apparent)
        - phase_degrees_at_millis(millis + MS_PER_HOUR, target_minutes_of_day, apparent)
}

/// Solar altitude in degrees above the horizon at the given point.
pub fn solar_altitude_degrees(instant: DateTime<Utc>, lat: f64, lon: f64, apparent: bool) -> f64 {
    let declination = solar_declination_radians(instant);
    let hour_angle = deg_to_rad(lon - subsolar_longitude(instant, apparent));
    let phi = deg_to_rad(lat);
    let sin_altitude =
        phi.sin() * declination.sin() + phi.cos() * declination.cos() * hour_angle.cos();
    rad_to_deg(clamp(sin_altitude, -1.0, 1.0).asin())
}

/// Whether the sun is below the horizon at the given point.
pub fn is_night(instant: DateTime<Utc>, lat: f64, lon: f64, apparent: bool) -> bool {
    solar_altitude_degrees(instant, lat, lon, apparent) < 0.0
}

/// Latitude at which the sun sits exactly on the horizon along `longitude`.
///
/// The formula degenerates when the declination vanishes at an equinox;
/// latitude 0 is returned there. Results are clamped short of the poles.
pub fn terminator_latitude_at_longitude(
    instant: DateTime<Utc>,
    longitude: f64,
    apparent: bool,
) -> f64 {
    let declination = solar_declination_radians(instant);
    if declination.abs() < DECLINATION_EPSILON {
        return 0.0;
    }
    let hour_angle = deg_to_rad(longitude - subsolar_longitude(instant, apparent));
    let latitude = rad_to_deg((-hour_angle.cos() / declination.tan()).atan());
    clamp(latitude, -TERMINATOR_MAX_LATITUDE, TERMINATOR_MAX_LATITUDE)
}

/// Sample longitudes from -180 to 180 inclusive at the terminator step.
fn terminator_longitudes() -> impl Iterator<Item = f64> {
    let steps = (360.0 / TERMINATOR_STEP_DEGREES).ceil() as usize;
    (0..=steps).map(|i| (-180.0 + i as f64 * TERMINATOR_STEP_DEGREES).min(180.0))
}

/// Day/night boundary sampled west to east, both ±180° endpoints included.
pub fn terminator_polyline(instant: DateTime<Utc>, apparent: bool) -> Vec<LonLatPoint> {
    terminator_longitudes()
        .map(|lon| LonLatPoint::new(lon, terminator_latitude_at_longitude(instant, lon, apparent)))
        .collect()
}

/// Closed ring covering the night side of the globe.
///
/// The terminator is closed against whichever pole is currently dark.
pub fn night_polygon(instant: DateTime<Utc>, apparent: bool) -> Vec<LonLatPoint> {
    let mut ring = terminator_polyline(instant, apparent);
    let pole_lat = if is_night(instant, POLE_PROBE_LATITUDE, 0.0, apparent) {
        90.0
    } else {
        -90.0
    };

    ring.push(LonLatPoint::new(180.0, pole_lat));
    ring.push(LonLatPoint::new(-180.0, pole_lat));
    if let Some(first) = ring.first().copied() {
        ring.push(first);
    }
    ring
}
