//! Meridian crossing solver for fixed landmarks.
//!
//! The deadline meridian sweeps westward at about 15°/hour. For every
//! landmark this module finds each instant inside a time range at which the
//! meridian's longitude equals the landmark's longitude (mod 360°).
//!
//! Rotations are enumerated on the unwrapped phase from
//! [`crate::geo::solar::phase_degrees`], so a range longer than a day yields
//! one crossing per rotation. Each candidate is then located by bisection.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::constants::BISECTION_ITERATIONS;
use crate::geo::solar::phase_degrees_at_millis;
use crate::logger::Log;

/// A fixed reference point, loaded from an external dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// One pass of the deadline meridian over a landmark.
#[derive(Debug, Clone, PartialEq)]
pub struct LandmarkCrossing<'a> {
    /// `<landmark id>-<crossing unix second>`, unique across rotations.
    pub id: String,
    pub landmark: &'a Landmark,
    pub at_ms: i64,
}

impl<'a> LandmarkCrossing<'a> {
    fn new(landmark: &'a Landmark, at_ms: i64) -> Self {
        let second = (at_ms as f64 / 1000.0).round() as i64;
        Self {
            id: format!("{}-{}", landmark.id, second),
            landmark,
            at_ms,
        }
    }

    pub fn at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.at_ms)
    }
}

/// Read a landmark dataset: a JSON array of `{id, name, lat, lon, tags}`.
///
/// Duplicates are kept; deduplication is up to the caller.
pub fn load_landmarks(path: &Path) -> Result<Vec<Landmark>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read landmarks from {}", path.display()))?;
    let landmarks: Vec<Landmark> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse landmarks from {}", path.display()))?;

    Log::log_decorated(&format!(
        "Loaded {} landmarks from {}",
        landmarks.len(),
        path.display()
    ));
    Ok(landmarks)
}

/// Find every crossing of the deadline meridian over `landmarks` within
/// `[range_start, range_end]`, sorted by instant.
///
/// An empty or inverted range has no crossings.
///
/// # Arguments
/// * `landmarks` - Points to test
/// * `range_start`, `range_end` - Inclusive search window
/// * `target_minutes_of_day` - Civil clock reading the meridian tracks (0–1439)
/// * `apparent` - Apply the equation of time
pub fn find_crossings<'a>(
    landmarks: &'a [Landmark],
    range_start: DateTime<Utc>,
    range_end: DateTime<Utc>,
    target_minutes_of_day: f64,
    apparent: bool,
) -> Vec<LandmarkCrossing<'a>> {
    if range_end <= range_start {
        return Vec::new();
    }

    let start_ms = range_start.timestamp_millis();
    let end_ms = range_end.timestamp_millis();
    let phase = |ms: f64| phase_degrees_at_millis(ms, target_minutes_of_day, apparent);

    let start_phase = phase(start_ms as f64);
    let end_phase = phase(end_ms as f64);
    let low_phase = start_phase.min(end_phase);
    let high_phase = start_phase.max(end_phase);

    let mut crossings = Vec::new();
    for landmark in landmarks {
        let first_turn = ((low_phase - landmark.lon) / 360.0).ceil() as i64;
        let last_turn = ((high_phase - landmark.lon) / 360.0).floor() as i64;

        for turn in first_turn..=last_turn {
            let target_phase = landmark.lon + 360.0 * turn as f64;
            let crossing_ms = solve_crossing(&phase, target_phase, start_ms, end_ms);
            if let Some(at_ms) = crossing_ms {
                crossings.push(LandmarkCrossing::new(landmark, at_ms));
            }
        }
    }

    crossings.sort_by_key(|crossing| crossing.at_ms);
    crossings
}

/// Locate the instant at which `phase` reaches `target_phase` within
/// `[start_ms, end_ms]`.
fn solve_crossing<F>(phase: &F, target_phase: f64, start_ms: i64, end_ms: i64) -> Option<i64>
where
    F: Fn(f64) -> f64,
{
    let diff = |ms: f64| phase(ms) - target_phase;

    let start_diff = diff(start_ms as f64);
    let end_diff = diff(end_ms as f64);
    if !start_diff.is_finite() || !end_diff.is_finite() {
        return None;
    }

    if start_diff == 0.0 {
        return Some(start_ms);
    }
    if end_diff == 0.0 {
        return Some(end_ms);
    }
    if start_diff.signum() == end_diff.signum() {
        return None;
    }

    let mut low = start_ms as f64;
    let mut high = end_ms as f64;
    let mut low_diff = start_diff;
    for _ in 0..BISECTION_ITERATIONS {
        let mid = low + (high - low) / 2.0;
        let mid_diff = diff(mid);
        if mid_diff.signum() == low_diff.signum() {
            low = mid;
            low_diff = mid_diff;
        } else {
            high = mid;
        }
    }

    let at_ms = ((low + high) / 2.0).round() as i64;
    (start_ms..=end_ms).contains(&at_ms).then_some(at_ms)
}
