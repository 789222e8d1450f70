//! Simulation configuration
//!
//! Every field has a default, so a partial JSON document (or none at all)
//! yields a usable config.

use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::FamilyError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Wall-clock delay between ticks, in milliseconds.
    pub tick_interval_ms: u64,
    /// Virtual years the clock advances per tick.
    pub years_per_tick: u32,
    pub max_unions_per_family_per_tick: usize,
    /// Chance each birth attempt succeeds, per union per tick.
    pub birth_probability: f64,
    pub max_births_per_union: u32,
    pub seed: Option<u64>,
    /// Virtual start date; today when absent.
    pub start_date: Option<NaiveDate>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 10_000,
            years_per_tick: 1,
            max_unions_per_family_per_tick: 1,
            birth_probability: 0.25,
            max_births_per_union: 2,
            seed: None,
            start_date: None,
        }
    }
}

impl SimulationConfig {
    pub fn from_json_str(json: &str) -> Result<Self, FamilyError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| FamilyError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn validate(&self) -> Result<(), FamilyError> {
        if self.tick_interval_ms == 0 {
            return Err(FamilyError::InvalidConfig(
                "tick_interval_ms must be positive".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.birth_probability) {
            return Err(FamilyError::InvalidConfig(format!(
                "birth_probability {} outside [0, 1]",
                self.birth_probability
            )));
        }
        Ok(())
    }
}
