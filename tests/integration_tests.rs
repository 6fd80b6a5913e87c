use chrono::{DateTime, TimeZone, Utc};
use serial_test::serial;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

use deadline_meridian::civil_bands::zone_intensity;
use deadline_meridian::config::validate_config;
use deadline_meridian::deadline::DeadlineErrorKind;
use deadline_meridian::geo::{Landmark, find_crossings, is_night, subsolar_point};
use deadline_meridian::{Config, DeadlineReport, Log, TieBreak, resolve};

fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

fn create_test_config_file(content: &str) -> (tempfile::TempDir, PathBuf) {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("deadline-meridian").join("deadline-meridian.toml");

    fs::create_dir_all(config_path.parent().unwrap()).unwrap();
    fs::write(&config_path, content).unwrap();

    (temp_dir, config_path)
}

#[test]
fn test_prague_evening_deadline() {
    let resolved = resolve("2026-03-15", "22:00", "Europe/Prague", TieBreak::Earlier).unwrap();
    assert_eq!(resolved.target_minutes_of_day, 1320);
    assert!(!resolved.ambiguous);
    assert_eq!(resolved.deadline_utc, utc(2026, 3, 15, 21, 0));
}

#[test]
fn test_spring_forward_gap() {
    let err = resolve("2025-03-30", "02:30", "Europe/Prague", TieBreak::Earlier).unwrap_err();
    assert!(err.is_nonexistent_wall_time());
    assert!(err.to_string().contains("does not exist"));
}

#[test]
fn test_fall_back_overlap() {
    let resolved = resolve("2025-10-26", "02:30", "Europe/Prague", TieBreak::Earlier).unwrap();
    assert!(resolved.ambiguous);
    assert!(resolved.candidate_offsets_minutes.contains(&60));
    assert!(resolved.candidate_offsets_minutes.contains(&120));
    assert_eq!(resolved.deadline_utc, utc(2025, 10, 26, 0, 30));
}

#[test]
fn test_error_classification() {
    let kind = |date: &str, time: &str, zone: &str| {
        resolve(date, time, zone, TieBreak::Earlier)
            .unwrap_err()
            .kind()
    };
    assert_eq!(kind("2026-13-01", "10:00", "UTC"), DeadlineErrorKind::InvalidFormat);
    assert_eq!(kind("2026-01-01", "24:00", "UTC"), DeadlineErrorKind::InvalidFormat);
    assert_eq!(kind("2026-01-01", "10:00", "Atlantis/Capital"), DeadlineErrorKind::InvalidZone);
}

#[test]
fn test_solstice_day_and_night() {
    let noon = utc(2026, 6, 21, 12, 0);
    let sun = subsolar_point(noon, false);
    assert!(sun.lat > 23.0 && sun.lat < 23.5);
    assert!(!is_night(noon, sun.lat, sun.lon, false));

    let antipode_lon = if sun.lon > 0.0 { sun.lon - 180.0 } else { sun.lon + 180.0 };
    assert!(is_night(noon, -sun.lat, antipode_lon, false));
}

#[test]
fn test_single_landmark_crossing() {
    let landmarks = vec![Landmark {
        id: "azores".to_string(),
        name: "Azores".to_string(),
        lat: 38.0,
        lon: -30.0,
        tags: vec!["island".to_string()],
    }];
    let crossings = find_crossings(
        &landmarks,
        utc(2026, 1, 1, 0, 0),
        utc(2026, 1, 1, 6, 0),
        0.0,
        false,
    );

    assert_eq!(crossings.len(), 1);
    let expected = utc(2026, 1, 1, 2, 0).timestamp_millis();
    assert!((crossings[0].at_ms - expected).abs() <= 1000);
}

#[test]
fn test_prague_zone_glows_near_target() {
    let intensity = zone_intensity("Europe/Prague", utc(2026, 1, 1, 21, 0), 1320.0, 15.0);
    assert!(intensity.unwrap() > 0.9);
}

#[test]
#[serial]
fn test_integration_config_to_report() {
    let config_content = r#"
date = "2026-03-15"
time = "22:00"
timezone = "Europe/Prague"
glow_window_minutes = 30
crossing_horizon_hours = 12
landmarks = "landmarks.json"
timezone_polygons = "zones.geojson"
"#;
    let (_temp_dir, config_path) = create_test_config_file(config_content);
    let data_dir = config_path.parent().unwrap();
    fs::write(
        data_dir.join("landmarks.json"),
        r#"[{"id":"ist","name":"Istanbul","lat":41.0,"lon":28.97,"tags":["city"]},
            {"id":"rio","name":"Rio","lat":-22.9,"lon":-43.2,"tags":[]}]"#,
    )
    .unwrap();
    fs::write(
        data_dir.join("zones.geojson"),
        r#"{"type":"FeatureCollection","features":[
            {"type":"Feature","properties":{"tzid":"Europe/Athens"},
             "geometry":{"type":"Polygon","coordinates":[[[20,35],[28,35],[28,41],[20,35]]]}},
            {"type":"Feature","properties":{"tzid":"Europe/Lisbon"},
             "geometry":{"type":"Polygon","coordinates":[[[-9,37],[-6,37],[-6,42],[-9,37]]]}},
            {"type":"Feature","properties":{"label":"sea"},"geometry":null}
        ]}"#,
    )
    .unwrap();

    Log::set_enabled(false);
    let config = Config::load_from_path(&config_path).unwrap();
    let deadline = config.deadline_input().unwrap().resolve().unwrap();
    let landmarks = deadline_meridian::geo::load_landmarks(config.landmarks.as_ref().unwrap()).unwrap();
    let features =
        deadline_meridian::geo::load_feature_collection(config.timezone_polygons.as_ref().unwrap())
            .unwrap();
    Log::set_enabled(true);

    assert_eq!(landmarks.len(), 2);
    assert_eq!(features.len(), 2);

    let now = utc(2026, 3, 15, 20, 0);
    let report = DeadlineReport::build(now, &deadline, &landmarks, &features, config.report_options());

    assert_eq!(report.remaining_ms, 3_600_000);
    assert!((report.meridian_longitude - 30.0).abs() < 1e-9);

    // Istanbul sits just west of the meridian and is crossed within minutes;
    // Rio is 73° further west, about 4h53m later, still inside the horizon
    let ids: Vec<&str> = report.crossings.iter().map(|c| c.landmark.id.as_str()).collect();
    assert_eq!(ids, vec!["ist", "rio"]);
    assert_eq!(report.nearest_landmarks[0].landmark.id, "ist");

    // Athens reads 22:00 exactly; Lisbon reads 20:00
    assert_eq!(report.zones.len(), 1);
    assert_eq!(report.zones[0].feature.zone_id, "Europe/Athens");
    assert_eq!(report.zones[0].intensity, 1.0);
}

#[test]
#[serial]
fn test_integration_cli_style_overrides_are_validated() {
    let (_temp_dir, config_path) = create_test_config_file(
        r#"
date = "2026-03-15"
time = "22:00"
timezone = "UTC"
"#,
    );
    let mut config = Config::load_from_path(&config_path).unwrap();
    assert!(validate_config(&config).is_ok());

    config.glow_window_minutes = Some(10_000);
    assert!(validate_config(&config).is_err());
}

#[test]
#[serial]
fn test_integration_rejects_unknown_zone_in_config() {
    let (_temp_dir, config_path) = create_test_config_file(
        r#"
date = "2026-03-15"
time = "22:00"
timezone = "Europe/Atlantis"
"#,
    );
    let err = Config::load_from_path(&config_path).unwrap_err();
    assert!(format!("{:#}", err).contains("Europe/Atlantis"));
}
