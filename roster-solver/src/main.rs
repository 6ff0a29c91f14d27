use std::{env, fs, process::ExitCode};

use roster_solver::{RosterInput, SolverConfig, solve_week};

fn main() -> ExitCode {
    shared::telemetry::init_telemetry("roster-solver");

    let input_path = env::var("ROSTER_INPUT_PATH").unwrap_or_else(|_| "roster-input.json".to_string());
    let config_path = env::var("ROSTER_CONFIG_PATH").unwrap_or_else(|_| "roster.toml".to_string());

    let config = match SolverConfig::load_or_default(&config_path) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Failed to load solver config from {config_path}: {e}");
            return ExitCode::FAILURE;
        }
    };

    let raw = match fs::read_to_string(&input_path) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::error!("Failed to read roster input from {input_path}: {e}");
            return ExitCode::FAILURE;
        }
    };
    let input: RosterInput = match serde_json::from_str(&raw) {
        Ok(input) => input,
        Err(e) => {
            tracing::error!("Failed to parse roster input: {e}");
            return ExitCode::FAILURE;
        }
    };

    if input.week_start < shared::time::today_in(config.timezone) {
        tracing::warn!(week_start = %input.week_start, "Planning a week that already started");
    }

    match solve_week(&input, &config) {
        Ok(result) => {
            if !result.validation.is_valid {
                tracing::warn!(
                    errors = result.validation.errors.len(),
                    warnings = result.validation.warnings.len(),
                    "Roster produced with validation errors"
                );
            }
            let rendered =
                serde_json::to_string_pretty(&result).expect("Roster result serializes to JSON");
            println!("{rendered}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("Invalid roster input: {e}");
            ExitCode::FAILURE
        }
    }
}
