use std::path::Path;

use chrono::NaiveTime;
use chrono_tz::Tz;
use serde::Deserialize;
use thiserror::Error;

use shared::types::{Company, ContractType};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// All solver tunables. `Default` carries the production constants; a TOML
/// file may override any subset. Durations are minutes, times of day use
/// `HH:MM:SS`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Timezone the shops operate in.
    pub timezone: Tz,
    /// Weekly full-time contract target, Monday to Saturday.
    pub full_time_target_minutes: u32,
    /// Hard weekly cap for full-timers, Monday to Saturday.
    pub full_time_max_minutes: u32,
    /// Weekly part-time cap, Monday to Saturday.
    pub part_time_cap_minutes: u32,
    /// Below this a full-timer is reported under-hours; at or above it a
    /// full-timer qualifies for the Sunday rescue shift.
    pub full_time_floor_minutes: u32,
    /// Shortest shift the balance stage may leave behind after a trim.
    pub min_shift_minutes: u32,
    /// Shortest shift the issuer accepts at all.
    pub min_issue_minutes: u32,
    /// Longest second shift on the same day.
    pub second_shift_max_minutes: u32,
    /// Maximum shifts per employee per day; a full day counts as two.
    pub max_shifts_per_day: u32,
    /// Sweep count for the gap filler.
    pub gap_fill_passes: u32,
    /// The gap filler skips employees closer than this to their target.
    pub gap_min_remaining_minutes: u32,
    /// Preferred gap-filler shift length when enough contract hours remain.
    pub gap_base_shift_minutes: u32,
    /// Length of the Sunday afternoon rescue shift.
    pub sunday_rescue_minutes: u32,
    /// Length of the Saturday morning rescue shift.
    pub saturday_rescue_minutes: u32,
    /// Special intervals at least this long classify as full-day.
    pub full_day_threshold_minutes: u32,
    /// AM/PM boundary for Company A shops.
    pub company_a_midpoint: NaiveTime,
    /// AM/PM boundary for Company B shops.
    pub company_b_midpoint: NaiveTime,
    /// Special intervals starting before this time classify as morning.
    pub morning_cutoff: NaiveTime,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            timezone: chrono_tz::Europe::Malta,
            full_time_target_minutes: 40 * 60,
            full_time_max_minutes: 42 * 60,
            part_time_cap_minutes: 30 * 60,
            full_time_floor_minutes: 38 * 60,
            min_shift_minutes: 4 * 60,
            min_issue_minutes: 30,
            second_shift_max_minutes: 8 * 60,
            max_shifts_per_day: 2,
            gap_fill_passes: 5,
            gap_min_remaining_minutes: 150,
            gap_base_shift_minutes: 5 * 60,
            sunday_rescue_minutes: 450,
            saturday_rescue_minutes: 6 * 60,
            full_day_threshold_minutes: 10 * 60,
            company_a_midpoint: NaiveTime::from_hms_opt(14, 0, 0).expect("valid time"),
            company_b_midpoint: NaiveTime::from_hms_opt(13, 0, 0).expect("valid time"),
            morning_cutoff: NaiveTime::from_hms_opt(12, 0, 0).expect("valid time"),
        }
    }
}

impl SolverConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&raw)?)
    }

    /// Loads the file if it exists; a missing file means defaults, a
    /// malformed file is still an error.
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn midpoint(&self, company: Company) -> NaiveTime {
        match company {
            Company::A => self.company_a_midpoint,
            Company::B => self.company_b_midpoint,
        }
    }

    /// Hard weekday ceiling the feasibility check enforces.
    pub fn weekday_cap(&self, contract: ContractType) -> u32 {
        match contract {
            ContractType::FullTime => self.full_time_max_minutes,
            ContractType::PartTime => self.part_time_cap_minutes,
        }
    }

    /// Contract hours the gap filler tops employees up to and the balance
    /// stage trims back down to.
    pub fn weekday_target(&self, contract: ContractType) -> u32 {
        match contract {
            ContractType::FullTime => self.full_time_target_minutes,
            ContractType::PartTime => self.part_time_cap_minutes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_contract_constants() {
        let config = SolverConfig::default();

        assert_eq!(config.full_time_target_minutes, 2400);
        assert_eq!(config.full_time_max_minutes, 2520);
        assert_eq!(config.part_time_cap_minutes, 1800);
        assert_eq!(config.weekday_cap(ContractType::FullTime), 2520);
        assert_eq!(config.weekday_target(ContractType::PartTime), 1800);
    }

    #[test]
    fn partial_toml_overrides_keep_defaults_elsewhere() {
        let config: SolverConfig = toml::from_str(
            r#"
            full_time_target_minutes = 2100
            company_a_midpoint = "15:00:00"
            timezone = "Europe/Paris"
            "#,
        )
        .unwrap();

        assert_eq!(config.full_time_target_minutes, 2100);
        assert_eq!(
            config.midpoint(Company::A),
            NaiveTime::from_hms_opt(15, 0, 0).unwrap()
        );
        assert_eq!(
            config.midpoint(Company::B),
            NaiveTime::from_hms_opt(13, 0, 0).unwrap()
        );
        assert_eq!(config.timezone, chrono_tz::Europe::Paris);
    }

    #[test]
    fn load_or_default_on_missing_file() {
        let config = SolverConfig::load_or_default("does-not-exist.toml").unwrap();
        assert_eq!(config.gap_fill_passes, 5);
    }
}
