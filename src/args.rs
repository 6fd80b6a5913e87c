//! Command-line argument parsing and processing.
//!
//! Flags are declared with `clap` but help and version output go through
//! the logger so they match the rest of the report. Any parse failure is
//! turned into [`CliAction::ShowHelpDueToError`] instead of exiting inside
//! the parser.

use chrono::{DateTime, Utc};
use clap::Parser;
use std::path::PathBuf;

use crate::config::Config;
use crate::deadline::TieBreak;
use crate::logger::Log;

/// Raw command-line flags.
#[derive(Parser, Debug, Clone, Default, PartialEq)]
#[command(
    name = "deadline-meridian",
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct RunArgs {
    /// Load configuration from this file instead of the default location
    #[arg(short = 'c', long)]
    pub config: Option<PathBuf>,

    /// Deadline date, YYYY-MM-DD
    #[arg(long)]
    pub date: Option<String>,

    /// Deadline wall clock, HH:MM
    #[arg(long)]
    pub time: Option<String>,

    /// IANA zone identifier
    #[arg(short = 'z', long)]
    pub timezone: Option<String>,

    /// Instant to pick when the wall clock occurs twice
    #[arg(long)]
    pub tie_break: Option<TieBreak>,

    /// Use apparent solar time
    #[arg(short = 'a', long)]
    pub apparent: bool,

    /// Civil band tolerance in minutes
    #[arg(long)]
    pub glow_window: Option<u32>,

    /// Crossing look-ahead in hours
    #[arg(long)]
    pub horizon: Option<u32>,

    /// Evaluate at this RFC 3339 instant instead of now
    #[arg(long)]
    pub at: Option<DateTime<Utc>>,

    #[arg(short = 'd', long)]
    pub debug: bool,

    #[arg(short = 'h', long)]
    pub help: bool,

    #[arg(short = 'V', long)]
    pub version: bool,
}

impl RunArgs {
    /// Layer these flags over a loaded configuration.
    pub fn apply_to(&self, config: &mut Config) {
        if let Some(date) = &self.date {
            config.date = Some(date.clone());
        }
        if let Some(time) = &self.time {
            config.time = Some(time.clone());
        }
        if let Some(zone) = &self.timezone {
            config.timezone = Some(zone.clone());
        }
        if let Some(tie_break) = self.tie_break {
            config.tie_break = Some(tie_break);
        }
        if self.apparent {
            config.apparent_solar = Some(true);
        }
        if let Some(window) = self.glow_window {
            config.glow_window_minutes = Some(window);
        }
        if let Some(horizon) = self.horizon {
            config.crossing_horizon_hours = Some(horizon);
        }
    }
}

/// Represents the parsed command-line arguments and their intended actions.
#[derive(Debug, PartialEq)]
pub enum CliAction {
    /// Resolve the deadline and print the report
    Run(RunArgs),
    /// Display help information and exit
    ShowHelp,
    /// Display version information and exit
    ShowVersion,
    /// Show help due to invalid arguments and exit
    ShowHelpDueToError,
}

/// Result of parsing command-line arguments.
pub struct ParsedArgs {
    pub action: CliAction,
}

impl ParsedArgs {
    /// Parse command-line arguments into a structured result.
    ///
    /// # Arguments
    /// * `args` - Iterator over command-line arguments, program name first
    pub fn parse<I, S>(args: I) -> ParsedArgs
    where
        I: IntoIterator<Item = S>,
        S: Into<std::ffi::OsString> + Clone,
    {
        let action = match RunArgs::try_parse_from(args) {
            Ok(run) if run.version => CliAction::ShowVersion,
            Ok(run) if run.help => CliAction::ShowHelp,
            Ok(run) => CliAction::Run(run),
            Err(e) => {
                let rendered = e.to_string();
                let first_line = rendered.lines().next().unwrap_or("invalid arguments");
                Log::log_warning(first_line.trim_start_matches("error: "));
                CliAction::ShowHelpDueToError
            }
        };

        ParsedArgs { action }
    }

    /// Convenience method to parse from std::env::args_os()
    pub fn from_env() -> ParsedArgs {
        Self::parse(std::env::args_os())
    }
}

/// Displays version information using custom logging style.
pub fn display_version_info() {
    Log::log_version();
    Log::log_pipe();
    println!("┗ {}", env!("CARGO_PKG_DESCRIPTION"));
}

/// Displays custom help message using logger methods.
pub fn display_help() {
    Log::log_version();
    Log::log_block_start(env!("CARGO_PKG_DESCRIPTION"));
    Log::log_block_start("Usage: deadline-meridian [OPTIONS]");
    Log::log_block_start("Options:");
    Log::log_indented("-c, --config <PATH>        Use this configuration file");
    Log::log_indented("    --date <YYYY-MM-DD>    Deadline date");
    Log::log_indented("    --time <HH:MM>         Deadline wall clock");
    Log::log_indented("-z, --timezone <ZONE>      IANA zone, e.g. Europe/Prague");
    Log::log_indented("    --tie-break <WHICH>    earlier|later when clocks fall back");
    Log::log_indented("-a, --apparent             Use apparent solar time");
    Log::log_indented("    --glow-window <MIN>    Civil band tolerance in minutes");
    Log::log_indented("    --horizon <HOURS>      Landmark crossing look-ahead");
    Log::log_indented("    --at <RFC3339>         Evaluate at this instant instead of now");
    Log::log_indented("-d, --debug                Enable detailed debug output");
    Log::log_indented("-h, --help                 Print help information");
    Log::log_indented("-V, --version              Print version information");
    Log::log_end();
}
