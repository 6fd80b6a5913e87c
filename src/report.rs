//! Deadline report: everything the CLI prints for one instant.
//!
//! [`DeadlineReport::build`] is pure; it only combines the solar model, the
//! crossing solver and the band generator. [`DeadlineReport::log`] renders
//! it through the logger.

use chrono::{DateTime, Duration, Utc};

use crate::civil_bands::{CivilBand, ZoneIntensity, build_bands, zone_intensities};
use crate::config::ReportOptions;
use crate::constants::NEAREST_LANDMARK_COUNT;
use crate::deadline::ResolvedDeadline;
use crate::geo::angles::{LonLatPoint, MeridianDistance, meridian_distance};
use crate::geo::crossing::{Landmark, LandmarkCrossing, find_crossings};
use crate::geo::polygons::TimezonePolygonFeature;
use crate::geo::solar::{
    line_speed_degrees_per_hour, meridian_longitude_for_target, night_polygon, subsolar_point,
};
use crate::logger::Log;

/// A landmark and how far it sits from the meridian right now.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LandmarkDistance<'a> {
    pub landmark: &'a Landmark,
    pub distance: MeridianDistance,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeadlineReport<'a> {
    pub now: DateTime<Utc>,
    pub deadline: &'a ResolvedDeadline,
    pub apparent: bool,
    /// Milliseconds until the deadline; negative once it has passed.
    pub remaining_ms: i64,
    pub meridian_longitude: f64,
    pub line_speed_degrees_per_hour: f64,
    pub subsolar: LonLatPoint,
    pub night_polygon: Vec<LonLatPoint>,
    /// Closest landmarks to the meridian, nearest first.
    pub nearest_landmarks: Vec<LandmarkDistance<'a>>,
    pub crossings: Vec<LandmarkCrossing<'a>>,
    pub bands: Vec<CivilBand>,
    pub zones: Vec<ZoneIntensity<'a>>,
}

impl<'a> DeadlineReport<'a> {
    pub fn build(
        now: DateTime<Utc>,
        deadline: &'a ResolvedDeadline,
        landmarks: &'a [Landmark],
        features: &'a [TimezonePolygonFeature],
        options: ReportOptions,
    ) -> Self {
        let target = deadline.target_minutes_of_day as f64;
        let apparent = options.apparent;
        let meridian_longitude = meridian_longitude_for_target(now, target, apparent);

        let mut nearest_landmarks: Vec<LandmarkDistance<'a>> = landmarks
            .iter()
            .map(|landmark| LandmarkDistance {
                landmark,
                distance: meridian_distance(
                    LonLatPoint::new(landmark.lon, landmark.lat),
                    meridian_longitude,
                ),
            })
            .collect();
        nearest_landmarks.sort_by(|a, b| {
            a.distance
                .delta_longitude
                .abs()
                .total_cmp(&b.distance.delta_longitude.abs())
        });
        nearest_landmarks.truncate(NEAREST_LANDMARK_COUNT);

        let horizon_end = now
            .checked_add_signed(Duration::hours(options.crossing_horizon_hours as i64))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        DeadlineReport {
            now,
            deadline,
            apparent,
            remaining_ms: deadline.deadline_utc_ms() - now.timestamp_millis(),
            meridian_longitude,
            line_speed_degrees_per_hour: line_speed_degrees_per_hour(now, target, apparent),
            subsolar: subsolar_point(now, apparent),
            night_polygon: night_polygon(now, apparent),
            nearest_landmarks,
            crossings: find_crossings(landmarks, now, horizon_end, target, apparent),
            bands: build_bands(now, target, options.glow_window_minutes),
            zones: zone_intensities(features, now, target, options.glow_window_minutes),
        }
    }

    /// Latitude of the pole currently in darkness.
    pub fn dark_pole_latitude(&self) -> Option<f64> {
        let len = self.night_polygon.len();
        (len >= 3).then(|| self.night_polygon[len - 2].lat)
    }

    pub fn log(&self, debug_enabled: bool) {
        let deadline = self.deadline;

        Log::log_block_start(&format!(
            "Deadline: {} ({})",
            deadline.deadline_utc.to_rfc3339(),
            format_offset(deadline.offset_minutes)
        ));
        if deadline.ambiguous {
            let offsets: Vec<String> = deadline
                .candidate_offsets_minutes
                .iter()
                .map(|offset| format_offset(*offset))
                .collect();
            Log::log_indented(&format!(
                "Wall clock occurs {} times; candidates {}",
                offsets.len(),
                offsets.join(", ")
            ));
        }
        Log::log_indented(&format!("Time remaining: {}", format_remaining(self.remaining_ms)));

        Log::log_block_start(&format!(
            "Meridian at {} ({} solar time)",
            self.now.to_rfc3339(),
            if self.apparent { "apparent" } else { "mean" }
        ));
        Log::log_indented(&format!("Longitude: {}", format_longitude(self.meridian_longitude)));
        Log::log_indented(&format!(
            "Speed: {:.3}°/h westward",
            self.line_speed_degrees_per_hour
        ));
        Log::log_indented(&format!(
            "Sub-solar point: {}, {}",
            format_latitude(self.subsolar.lat),
            format_longitude(self.subsolar.lon)
        ));

        if !self.nearest_landmarks.is_empty() {
            Log::log_block_start("Nearest landmarks:");
            for entry in &self.nearest_landmarks {
                Log::log_indented(&format!(
                    "{}: {:+.2}° ({:+.1} min)",
                    entry.landmark.name,
                    entry.distance.delta_longitude,
                    entry.distance.delta_minutes
                ));
            }
        }

        if !self.crossings.is_empty() {
            Log::log_block_start("Upcoming crossings:");
            for crossing in &self.crossings {
                let at = crossing
                    .at()
                    .map(|at| at.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                    .unwrap_or_else(|| crossing.at_ms.to_string());
                Log::log_indented(&format!("{} at {}", crossing.landmark.name, at));
            }
        }

        if self.bands.is_empty() {
            Log::log_block_start("No whole-hour offset is near the target time");
        } else {
            Log::log_block_start("Civil bands:");
            for band in &self.bands {
                Log::log_indented(&format!(
                    "UTC{:+03}: {} to {}, {:+.0} min, intensity {:.2}",
                    band.offset_hours,
                    format_longitude(band.start_lon),
                    format_longitude(band.end_lon),
                    band.minute_diff,
                    band.intensity
                ));
            }
        }

        if !self.zones.is_empty() {
            Log::log_block_start("Zones near the target time:");
            for zone in &self.zones {
                Log::log_indented(&format!(
                    "{}: intensity {:.2}",
                    zone.feature.zone_id, zone.intensity
                ));
            }
        }

        if debug_enabled {
            Log::log_pipe();
            Log::log_debug(&format!(
                "Night polygon: {} points, dark pole at {:?}",
                self.night_polygon.len(),
                self.dark_pole_latitude()
            ));
            Log::log_debug(&format!(
                "Target minute of day: {}",
                deadline.target_minutes_of_day
            ));
        }
    }
}

/// Human-readable countdown: `1d 02:03:04`, `00:05:00`, or `passed`.
///
/// # Examples
/// ```
/// use deadline_meridian::report::format_remaining;
/// assert_eq!(format_remaining(93_784_000), "1d 02:03:04");
/// assert_eq!(format_remaining(-1), "passed");
/// ```
pub fn format_remaining(ms: i64) -> String {
    if ms < 0 {
        return "passed".to_string();
    }
    let total_seconds = ms / 1000;
    let days = total_seconds / 86_400;
    let hours = (total_seconds % 86_400) / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if days > 0 {
        format!("{}d {:02}:{:02}:{:02}", days, hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
    }
}

fn format_offset(offset_minutes: i32) -> String {
    let sign = if offset_minutes < 0 { '-' } else { '+' };
    let abs = offset_minutes.unsigned_abs();
    format!("UTC{}{:02}:{:02}", sign, abs / 60, abs % 60)
}

fn format_longitude(lon: f64) -> String {
    let dir = if lon >= 0.0 { "E" } else { "W" };
    format!("{:.2}°{}", lon.abs(), dir)
}

fn format_latitude(lat: f64) -> String {
    let dir = if lat >= 0.0 { "N" } else { "S" };
    format!("{:.2}°{}", lat.abs(), dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deadline::{TieBreak, resolve};
    use crate::geo::polygons::PolygonGeometry;
    use chrono::TimeZone;

    fn landmark(id: &str, lon: f64) -> Landmark {
        Landmark {
            id: id.to_string(),
            name: id.to_string(),
            lat: 10.0,
            lon,
            tags: vec![],
        }
    }

    fn options() -> ReportOptions {
        ReportOptions {
            apparent: false,
            glow_window_minutes: 15.0,
            crossing_horizon_hours: 24,
        }
    }

    #[test]
    fn test_format_remaining() {
        assert_eq!(format_remaining(0), "00:00:00");
        assert_eq!(format_remaining(59_999), "00:00:59");
        assert_eq!(format_remaining(3_600_000), "01:00:00");
        assert_eq!(format_remaining(86_400_000), "1d 00:00:00");
        assert_eq!(format_remaining(-60_000), "passed");
    }

    #[test]
    fn test_format_offset() {
        assert_eq!(format_offset(60), "UTC+01:00");
        assert_eq!(format_offset(330), "UTC+05:30");
        assert_eq!(format_offset(-240), "UTC-04:00");
        assert_eq!(format_offset(0), "UTC+00:00");
    }

    #[test]
    fn test_build_report_two_hours_before_deadline() {
        let deadline = resolve("2026-03-15", "22:00", "Europe/Prague", TieBreak::Earlier).unwrap();
        let now = Utc.with_ymd_and_hms(2026, 3, 15, 20, 0, 0).unwrap();
        let landmarks = vec![landmark("far", -100.0), landmark("near", 15.0)];
        let features = vec![
            TimezonePolygonFeature {
                zone_id: "Europe/Athens".to_string(),
                geometry: PolygonGeometry::Polygon(vec![]),
            },
            TimezonePolygonFeature {
                zone_id: "Europe/Prague".to_string(),
                geometry: PolygonGeometry::Polygon(vec![]),
            },
        ];

        let report = DeadlineReport::build(now, &deadline, &landmarks, &features, options());

        assert_eq!(report.remaining_ms, 3_600_000);
        // 22:00 mean solar time is 30°E at 20:00 UTC
        assert!((report.meridian_longitude - 30.0).abs() < 1e-9);
        assert!((report.line_speed_degrees_per_hour - 15.0).abs() < 1e-6);

        let nearest: Vec<&str> = report
            .nearest_landmarks
            .iter()
            .map(|d| d.landmark.id.as_str())
            .collect();
        assert_eq!(nearest, vec!["near", "far"]);

        // 15°E reads 22:00 at 21:00 UTC, -100° at 04:40 UTC the next day
        assert_eq!(report.crossings.len(), 2);
        assert_eq!(report.crossings[0].landmark.id, "near");
        assert_eq!(report.crossings[1].landmark.id, "far");
        let expected = Utc.with_ymd_and_hms(2026, 3, 15, 21, 0, 0).unwrap();
        assert!((report.crossings[0].at_ms - expected.timestamp_millis()).abs() < 1000);
        let expected = Utc.with_ymd_and_hms(2026, 3, 16, 4, 40, 0).unwrap();
        assert!((report.crossings[1].at_ms - expected.timestamp_millis()).abs() < 1000);

        assert_eq!(report.bands.len(), 1);
        assert_eq!(report.bands[0].offset_hours, 2);

        // Athens is on UTC+2 before its spring change; Prague reads 21:00
        assert_eq!(report.zones.len(), 1);
        assert_eq!(report.zones[0].feature.zone_id, "Europe/Athens");

        // The sun is still south of the equator, so the north pole is dark
        assert_eq!(report.dark_pole_latitude(), Some(90.0));
    }

    #[test]
    fn test_build_report_after_deadline() {
        let deadline = resolve("2026-03-15", "22:00", "Europe/Prague", TieBreak::Earlier).unwrap();
        let now = Utc.with_ymd_and_hms(2026, 3, 16, 0, 0, 0).unwrap();
        let report = DeadlineReport::build(now, &deadline, &[], &[], options());

        assert!(report.remaining_ms < 0);
        assert_eq!(format_remaining(report.remaining_ms), "passed");
        assert!(report.nearest_landmarks.is_empty());
        assert!(report.crossings.is_empty());
        assert!(report.zones.is_empty());
    }

    #[test]
    fn test_build_report_at_end_of_calendar() {
        let deadline = resolve("2026-03-15", "22:00", "UTC", TieBreak::Earlier).unwrap();
        let now = DateTime::<Utc>::MAX_UTC;
        let landmarks = vec![landmark("near", 0.0)];
        let report = DeadlineReport::build(now, &deadline, &landmarks, &[], options());

        assert!(report.remaining_ms < 0);
        assert!(report.line_speed_degrees_per_hour.is_finite());
        // The horizon is cut at the last representable instant
        assert!(report.crossings.is_empty());
        assert_eq!(report.nearest_landmarks.len(), 1);
    }

    #[test]
    fn test_nearest_landmarks_truncated() {
        let deadline = resolve("2026-03-15", "22:00", "UTC", TieBreak::Earlier).unwrap();
        let now = Utc.with_ymd_and_hms(2026, 3, 15, 12, 0, 0).unwrap();
        let landmarks: Vec<Landmark> = (0..12)
            .map(|i| landmark(&format!("l{}", i), -170.0 + 30.0 * i as f64))
            .collect();
        let report = DeadlineReport::build(now, &deadline, &landmarks, &[], options());
        assert_eq!(report.nearest_landmarks.len(), NEAREST_LANDMARK_COUNT);
        let deltas: Vec<f64> = report
            .nearest_landmarks
            .iter()
            .map(|d| d.distance.delta_longitude.abs())
            .collect();
        assert!(deltas.windows(2).all(|w| w[0] <= w[1]));
    }
}
