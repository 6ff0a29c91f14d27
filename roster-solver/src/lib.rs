pub mod config;
pub mod domain;
pub mod error;

pub use config::{ConfigError, SolverConfig};
pub use domain::input::RosterInput;
pub use error::RosterError;

use shared::types::RosterResult;

/// Produces the weekly roster for one immutable input snapshot.
///
/// Runs single-threaded and synchronously: no I/O, no shared state, and no
/// source of nondeterminism, so identical input yields identical output.
/// Business infeasibility is not an error; the result carries a validation
/// report and the caller decides what to do with an invalid roster. Only a
/// malformed snapshot fails.
#[tracing::instrument(skip_all, fields(week_start = %input.week_start))]
pub fn solve_week(input: &RosterInput, config: &SolverConfig) -> Result<RosterResult, RosterError> {
    input.validate()?;
    Ok(domain::engine::RosterEngine::new(input, config).run())
}
