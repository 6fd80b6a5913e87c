use anyhow::{Context, Result};
use chrono::Utc;

use deadline_meridian::args::{CliAction, ParsedArgs, RunArgs, display_help, display_version_info};
use deadline_meridian::config::{Config, validate_config};
use deadline_meridian::constants::EXIT_FAILURE;
use deadline_meridian::geo::{load_feature_collection, load_landmarks};
use deadline_meridian::logger::Log;
use deadline_meridian::report::DeadlineReport;

fn main() -> Result<()> {
    match ParsedArgs::from_env().action {
        CliAction::ShowVersion => display_version_info(),
        CliAction::ShowHelp => display_help(),
        CliAction::ShowHelpDueToError => {
            display_help();
            std::process::exit(EXIT_FAILURE);
        }
        CliAction::Run(args) => {
            Log::log_version();
            if let Err(e) = run(&args) {
                Log::log_pipe();
                Log::log_error(&format!("{:#}", e));
                Log::log_end();
                std::process::exit(EXIT_FAILURE);
            }
            Log::log_end();
        }
    }
    Ok(())
}

/// Load configuration, resolve the deadline and print the report.
fn run(args: &RunArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => Config::load_from_path(path)?,
        None => Config::load()?,
    };
    args.apply_to(&mut config);
    validate_config(&config).context("Invalid command-line override")?;

    if args.debug {
        config.log_config(args.config.as_deref());
    }

    let deadline = config.deadline_input()?.resolve()?;

    let landmarks = match &config.landmarks {
        Some(path) => load_landmarks(path)?,
        None => Vec::new(),
    };
    let features = match &config.timezone_polygons {
        Some(path) => load_feature_collection(path)?,
        None => Vec::new(),
    };

    let now = args.at.unwrap_or_else(Utc::now);
    let report = DeadlineReport::build(
        now,
        &deadline,
        &landmarks,
        &features,
        config.report_options(),
    );
    report.log(args.debug);

    Ok(())
}
