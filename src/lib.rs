//! # Deadline Meridian
//!
//! Tracks a civil-time deadline as a line sweeping the globe.
//!
//! A deadline such as "22:00 in Europe/Prague" is resolved to one absolute
//! instant, then projected onto the Earth as the meridian where the solar
//! clock currently reads 22:00. That meridian moves west at about 15° per
//! hour; this crate reports where it is, which landmarks it will pass and
//! which time zones read close to the target time.
//!
//! ## Architecture
//!
//! - **deadline**: Civil deadline resolution across DST gaps and overlaps
//! - **geo**: Solar model, meridian crossing solver and polygon datasets
//! - **civil_bands**: Coarse UTC-offset bands and precise per-zone intensities
//! - **report**: Combines the above for one instant
//! - **config**: Configuration loading, validation, and default generation
//! - **args**: Command-line parsing
//! - **constants**: Application-wide constants and defaults
//! - **logger**: Structured logging with visual formatting

pub mod args;
pub mod civil_bands;
pub mod config;
pub mod constants;
pub mod deadline;
pub mod geo;
pub mod logger;
pub mod report;

// Re-export important types for easier access
pub use civil_bands::{CivilBand, ZoneIntensity, build_bands, zone_intensities};
pub use config::Config;
pub use deadline::{DeadlineError, DeadlineInput, ResolvedDeadline, TieBreak, resolve};
pub use logger::{Log, LogLevel};
pub use report::{DeadlineReport, format_remaining};
