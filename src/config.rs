//! Configuration system for deadline-meridian.
//!
//! Handles the TOML configuration file, default value generation and
//! validation. Command-line flags are layered on top by [`crate::args`].
//!
//! ## Configuration Source
//!
//! The file lives at **XDG_CONFIG_HOME**/deadline-meridian/deadline-meridian.toml
//! unless `--config` points elsewhere. When the default file is missing a
//! commented one is generated on first run.
//!
//! ## Configuration Structure
//!
//! ```toml
//! # Deadline
//! date = "2026-03-15"              # YYYY-MM-DD
//! time = "22:00"                   # HH:MM, 24-hour clock
//! timezone = "Europe/Prague"       # IANA zone identifier
//! tie_break = "earlier"            # "earlier" or "later" for fall-back overlaps
//!
//! # Solar model
//! apparent_solar = false           # Apply the equation of time
//!
//! # Report
//! glow_window_minutes = 15         # Civil band tolerance
//! crossing_horizon_hours = 24      # How far ahead to look for landmark crossings
//!
//! # Datasets (optional, relative paths resolve against the config directory)
//! landmarks = "landmarks.json"
//! timezone_polygons = "timezones.geojson"
//! ```
//!
//! ## Validation
//!
//! Numeric settings are range-checked and an unknown `timezone` is rejected
//! up front. The date and time themselves are checked when the deadline is
//! resolved, so the error names exactly which field is wrong.

use anyhow::{Context, Result};
use chrono::Utc;
use chrono_tz::Tz;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::*;
use crate::deadline::{DeadlineInput, TieBreak};
use crate::logger::Log;

/// Configuration loaded from `deadline-meridian.toml`.
///
/// Every field is optional in the file. After
/// [`Config::apply_defaults`] the numeric and boolean settings are always
/// `Some`; the deadline fields stay `None` until the user supplies them.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct Config {
    /// Deadline calendar date, "YYYY-MM-DD".
    pub date: Option<String>,
    /// Deadline wall clock, "HH:MM".
    pub time: Option<String>,
    /// IANA zone the wall clock is read in.
    pub timezone: Option<String>,
    pub tie_break: Option<TieBreak>,
    /// Use apparent solar time (equation of time) instead of mean solar time.
    pub apparent_solar: Option<bool>,
    pub glow_window_minutes: Option<u32>,
    pub crossing_horizon_hours: Option<u32>,
    /// JSON array of landmarks.
    pub landmarks: Option<PathBuf>,
    /// GeoJSON feature collection of timezone polygons.
    pub timezone_polygons: Option<PathBuf>,
}

/// Settings the report needs, with defaults already applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReportOptions {
    pub apparent: bool,
    pub glow_window_minutes: f64,
    pub crossing_horizon_hours: u32,
}

impl Config {
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Could not determine config directory")?;
        Ok(config_dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Write a commented default configuration to `path`.
    ///
    /// The deadline defaults to 23:59 UTC today; the dataset paths are left
    /// commented out.
    pub fn create_default_config(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let today = Utc::now().date_naive().format("%Y-%m-%d").to_string();

        let config_content = ConfigBuilder::new()
            .add_section("Deadline")
            .add_setting("date", &format!("\"{}\"", today), "Deadline date (YYYY-MM-DD)")
            .add_setting("time", "\"23:59\"", "Deadline wall clock (HH:MM, 24-hour)")
            .add_setting("timezone", "\"UTC\"", "IANA zone, e.g. \"Europe/Prague\"")
            .add_setting(
                "tie_break",
                &format!("\"{}\"", DEFAULT_TIE_BREAK),
                "\"earlier\" or \"later\" when clocks fall back",
            )
            .add_section("Solar model")
            .add_setting(
                "apparent_solar",
                &DEFAULT_APPARENT_SOLAR.to_string(),
                "Apply the equation of time (true) or use mean solar time (false)",
            )
            .add_section("Report")
            .add_setting(
                "glow_window_minutes",
                &DEFAULT_GLOW_WINDOW_MINUTES.to_string(),
                &format!(
                    "Civil band tolerance ({}-{} minutes)",
                    MINIMUM_GLOW_WINDOW_MINUTES, MAXIMUM_GLOW_WINDOW_MINUTES
                ),
            )
            .add_setting(
                "crossing_horizon_hours",
                &DEFAULT_CROSSING_HORIZON_HOURS.to_string(),
                &format!(
                    "Look-ahead for landmark crossings ({}-{} hours)",
                    MINIMUM_CROSSING_HORIZON_HOURS, MAXIMUM_CROSSING_HORIZON_HOURS
                ),
            )
            .add_section("Datasets")
            .add_commented_setting(
                "landmarks",
                "\"landmarks.json\"",
                "JSON array of {id, name, lat, lon, tags}",
            )
            .add_commented_setting(
                "timezone_polygons",
                "\"timezones.geojson\"",
                "GeoJSON timezone polygons",
            )
            .build();

        fs::write(path, config_content)
            .with_context(|| format!("Failed to write default config to {}", path.display()))?;

        Log::log_indented(&format!("Created default config at {}", path.display()));
        Ok(())
    }

    /// Fill every unset non-deadline field with its default.
    pub fn apply_defaults(&mut self) {
        if self.tie_break.is_none() {
            self.tie_break = Some(TieBreak::default());
        }
        if self.apparent_solar.is_none() {
            self.apparent_solar = Some(DEFAULT_APPARENT_SOLAR);
        }
        if self.glow_window_minutes.is_none() {
            self.glow_window_minutes = Some(DEFAULT_GLOW_WINDOW_MINUTES);
        }
        if self.crossing_horizon_hours.is_none() {
            self.crossing_horizon_hours = Some(DEFAULT_CROSSING_HORIZON_HOURS);
        }
    }

    /// Relative dataset paths are taken relative to the config file's directory.
    fn resolve_dataset_paths(&mut self, config_path: &Path) {
        let Some(base) = config_path.parent() else {
            return;
        };
        for dataset in [&mut self.landmarks, &mut self.timezone_polygons] {
            if let Some(path) = dataset.as_mut() {
                if path.is_relative() {
                    *path = base.join(&*path);
                }
            }
        }
    }

    /// Load from a specific path. Does NOT create a default config if the
    /// path doesn't exist.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            anyhow::bail!(
                "Configuration file not found at specified path: {}",
                path.display()
            );
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        config.apply_defaults();
        config.resolve_dataset_paths(path);
        validate_config(&config)?;

        Ok(config)
    }

    /// Load from the default location, creating a default config first if
    /// none exists.
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            Log::log_block_start("No configuration found");
            Self::create_default_config(&config_path)
                .context("Failed to create default config during load")?;
        }

        Self::load_from_path(&config_path).with_context(|| {
            format!(
                "Failed to load configuration from {}",
                config_path.display()
            )
        })
    }

    /// Assemble the deadline request, failing if any of its fields is unset.
    pub fn deadline_input(&self) -> Result<DeadlineInput> {
        let missing = |key: &str, flag: &str| {
            anyhow::anyhow!(
                "No deadline {} configured. Set `{}` in {} or pass --{}",
                key,
                key,
                CONFIG_FILE_NAME,
                flag
            )
        };

        Ok(DeadlineInput {
            date: self.date.clone().ok_or_else(|| missing("date", "date"))?,
            time: self.time.clone().ok_or_else(|| missing("time", "time"))?,
            zone_id: self
                .timezone
                .clone()
                .ok_or_else(|| missing("timezone", "timezone"))?,
            tie_break: self.tie_break.unwrap_or_default(),
        })
    }

    pub fn report_options(&self) -> ReportOptions {
        ReportOptions {
            apparent: self.apparent_solar.unwrap_or(DEFAULT_APPARENT_SOLAR),
            glow_window_minutes: self
                .glow_window_minutes
                .unwrap_or(DEFAULT_GLOW_WINDOW_MINUTES) as f64,
            crossing_horizon_hours: self
                .crossing_horizon_hours
                .unwrap_or(DEFAULT_CROSSING_HORIZON_HOURS),
        }
    }

    pub fn log_config(&self, source: Option<&Path>) {
        match source {
            Some(path) => {
                Log::log_block_start(&format!("Loaded configuration from {}", path.display()))
            }
            None => Log::log_block_start("Loaded configuration"),
        }

        let unset = || "(unset)".to_string();
        Log::log_indented(&format!("Date: {}", self.date.clone().unwrap_or_else(unset)));
        Log::log_indented(&format!("Time: {}", self.time.clone().unwrap_or_else(unset)));
        Log::log_indented(&format!(
            "Timezone: {}",
            self.timezone.clone().unwrap_or_else(unset)
        ));
        Log::log_indented(&format!(
            "Tie break: {}",
            self.tie_break.unwrap_or_default()
        ));

        let options = self.report_options();
        Log::log_indented(&format!(
            "Solar time: {}",
            if options.apparent { "apparent" } else { "mean" }
        ));
        Log::log_indented(&format!(
            "Glow window: {} minutes",
            options.glow_window_minutes
        ));
        Log::log_indented(&format!(
            "Crossing horizon: {} hours",
            options.crossing_horizon_hours
        ));

        if let Some(path) = &self.landmarks {
            Log::log_indented(&format!("Landmarks: {}", path.display()));
        }
        if let Some(path) = &self.timezone_polygons {
            Log::log_indented(&format!("Timezone polygons: {}", path.display()));
        }
    }
}

/// Range and identifier checks for a loaded or overridden configuration.
pub fn validate_config(config: &Config) -> Result<()> {
    if let Some(window) = config.glow_window_minutes {
        if !(MINIMUM_GLOW_WINDOW_MINUTES..=MAXIMUM_GLOW_WINDOW_MINUTES).contains(&window) {
            anyhow::bail!(
                "Glow window must be between {} and {} minutes (got {})",
                MINIMUM_GLOW_WINDOW_MINUTES,
                MAXIMUM_GLOW_WINDOW_MINUTES,
                window
            );
        }
    }

    if let Some(horizon) = config.crossing_horizon_hours {
        if !(MINIMUM_CROSSING_HORIZON_HOURS..=MAXIMUM_CROSSING_HORIZON_HOURS).contains(&horizon) {
            anyhow::bail!(
                "Crossing horizon must be between {} and {} hours (got {})",
                MINIMUM_CROSSING_HORIZON_HOURS,
                MAXIMUM_CROSSING_HORIZON_HOURS,
                horizon
            );
        }
    }

    if let Some(zone) = &config.timezone {
        if zone.trim().parse::<Tz>().is_err() {
            anyhow::bail!(
                "Unknown timezone '{}'. Use an IANA identifier such as \"Europe/Prague\"",
                zone
            );
        }
    }

    Ok(())
}

/// Builds the default config file with aligned trailing comments.
struct ConfigBuilder {
    entries: Vec<ConfigEntry>,
}

enum ConfigEntry {
    Section(String),
    Setting { line: String, comment: String },
}

impl ConfigBuilder {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    fn add_section(mut self, title: &str) -> Self {
        self.entries.push(ConfigEntry::Section(format!("#[{}]", title)));
        self
    }

    fn add_setting(mut self, key: &str, value: &str, comment: &str) -> Self {
        self.entries.push(ConfigEntry::Setting {
            line: format!("{} = {}", key, value),
            comment: format!("# {}", comment),
        });
        self
    }

    fn add_commented_setting(self, key: &str, value: &str, comment: &str) -> Self {
        self.add_setting(&format!("# {}", key), value, comment)
    }

    fn build(self) -> String {
        let max_width = self
            .entries
            .iter()
            .filter_map(|entry| match entry {
                ConfigEntry::Setting { line, .. } => Some(line.len()),
                ConfigEntry::Section(_) => None,
            })
            .max()
            .unwrap_or(0)
            + 1;

        let mut result = Vec::new();
        let mut first_section = true;

        for entry in self.entries {
            match entry {
                ConfigEntry::Section(title) => {
                    if !first_section {
                        result.push(String::new());
                    }
                    result.push(title);
                    first_section = false;
                }
                ConfigEntry::Setting { line, comment } => {
                    let padding = " ".repeat(max_width - line.len());
                    result.push(format!("{}{}{}", line, padding, comment));
                }
            }
        }

        result.push(String::new());
        result.join("\n")
    }
}
