//! Application constants and default values for deadline-meridian.
//!
//! This module contains the configuration defaults, validation limits,
//! and numeric constants used by the solar model, the crossing solver
//! and the civil band generator.

// ═══ Application Configuration Defaults ═══
// These values are used when config options are not specified by the user

pub const DEFAULT_TIE_BREAK: &str = "earlier"; // Prefer the first instant in a fall-back overlap
pub const DEFAULT_APPARENT_SOLAR: bool = false; // Mean solar time unless asked otherwise
pub const DEFAULT_GLOW_WINDOW_MINUTES: u32 = 15; // minutes - civil band tolerance
pub const DEFAULT_CROSSING_HORIZON_HOURS: u32 = 24; // hours - how far ahead to look for crossings
pub const CONFIG_FILE_NAME: &str = "deadline-meridian.toml";
pub const CONFIG_DIR_NAME: &str = "deadline-meridian";

// ═══ Validation Limits ═══
// These limits ensure user inputs are within reasonable ranges

pub const MINIMUM_GLOW_WINDOW_MINUTES: u32 = 1; // Window is always floored to one minute
pub const MAXIMUM_GLOW_WINDOW_MINUTES: u32 = 720; // Half a day covers every offset
pub const MINIMUM_CROSSING_HORIZON_HOURS: u32 = 1;
pub const MAXIMUM_CROSSING_HORIZON_HOURS: u32 = 8784; // One leap year

// ═══ Time Constants ═══

pub const MINUTES_PER_DAY: i64 = 1440;
pub const MINUTES_PER_HALF_DAY: f64 = 720.0;
pub const MS_PER_MINUTE: f64 = 60_000.0;
pub const MS_PER_HOUR: f64 = 3_600_000.0;
pub const MINUTES_PER_DEGREE: f64 = 4.0; // Earth turns one degree every four minutes
pub const DEGREES_PER_HOUR: f64 = 15.0;

// ═══ Solar Model Constants ═══

pub const TERMINATOR_STEP_DEGREES: f64 = 2.0; // Longitude sampling step for the terminator
pub const TERMINATOR_MAX_LATITUDE: f64 = 89.999; // Keeps the poles from degenerating
pub const DECLINATION_EPSILON: f64 = 1e-6; // radians - treat as equinox below this
pub const POLE_PROBE_LATITUDE: f64 = 89.9; // Probe point used to find the dark pole

// ═══ Crossing Solver Constants ═══

pub const BISECTION_ITERATIONS: u32 = 40;

// ═══ Civil Band Constants ═══

pub const MIN_BAND_OFFSET_HOURS: i32 = -12;
pub const MAX_BAND_OFFSET_HOURS: i32 = 14;
pub const BAND_HALF_WIDTH_DEGREES: f64 = 7.5;

// ═══ Timezone Resolution Constants ═══

pub const OFFSET_PROBE_SPAN_MINUTES: i64 = 16 * 60; // Widest plausible UTC offset, with margin
pub const OFFSET_PROBE_STEP_MINUTES: i64 = 15;

// ═══ Report Constants ═══

pub const NEAREST_LANDMARK_COUNT: usize = 5; // Landmarks listed beside the meridian

// ═══ Exit Codes ═══

pub const EXIT_FAILURE: i32 = 1; // General failure

// ═══ Test Constants ═══
// Common values used in tests for consistency
#[cfg(test)]
pub mod test_constants {
    pub const TEST_ZONE: &str = "Europe/Prague";
    pub const TEST_DATE: &str = "2026-03-15";
    pub const TEST_TIME: &str = "22:00";
    pub const TEST_SPRING_FORWARD_DATE: &str = "2025-03-30";
    pub const TEST_FALL_BACK_DATE: &str = "2025-10-26";
    pub const TEST_OVERLAP_TIME: &str = "02:30";
}
