//! Engine tuning. Every field has a default so a partial TOML file works.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{BLINK_INTERVAL_RANGE, VITAL_MAX, VITAL_MIN, VITAL_START};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub vitals: VitalsConfig,
    /// Idle blink cadence in seconds.
    pub blink_interval_secs: f64,
    /// A chat milestone is awarded on every Nth chat turn.
    pub chat_milestone_every: u64,
    /// Probability that a returning expedition brings back an item.
    pub loot_chance: f64,
    pub cargo_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            vitals: VitalsConfig::default(),
            blink_interval_secs: 45.0,
            chat_milestone_every: 10,
            loot_chance: 0.7,
            cargo_capacity: 8,
        }
    }
}

/// Decay tuning. Drain times are how long a full vital takes to empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VitalsConfig {
    pub start_level: f64,
    pub hunger_drain_hours: f64,
    pub energy_drain_hours: f64,
    pub happiness_drain_hours: f64,
    /// Longest stretch of absence charged in a single update.
    pub max_catch_up_secs: f64,
    /// Happiness decay never drops below this fraction of its base rate.
    pub happiness_floor_factor: f64,
}

impl Default for VitalsConfig {
    fn default() -> Self {
        Self {
            start_level: VITAL_START,
            hunger_drain_hours: 12.0,
            energy_drain_hours: 16.0,
            happiness_drain_hours: 48.0,
            max_catch_up_secs: 15.0 * 60.0,
            happiness_floor_factor: 0.05,
        }
    }
}

impl VitalsConfig {
    pub fn hunger_per_min(&self) -> f64 {
        VITAL_MAX / (self.hunger_drain_hours * 60.0)
    }

    pub fn energy_per_min(&self) -> f64 {
        VITAL_MAX / (self.energy_drain_hours * 60.0)
    }

    pub fn happiness_per_min(&self) -> f64 {
        VITAL_MAX / (self.happiness_drain_hours * 60.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConfigError(pub String);

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid config: {}", self.0)
    }
}

impl std::error::Error for ConfigError {}

impl EngineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let v = &self.vitals;
        if !(VITAL_MIN..=VITAL_MAX).contains(&v.start_level) {
            return Err(ConfigError(format!(
                "vitals.start_level must be within [{VITAL_MIN}, {VITAL_MAX}], got {}",
                v.start_level
            )));
        }
        for (name, hours) in [
            ("hunger_drain_hours", v.hunger_drain_hours),
            ("energy_drain_hours", v.energy_drain_hours),
            ("happiness_drain_hours", v.happiness_drain_hours),
        ] {
            if !(hours.is_finite() && hours > 0.0) {
                return Err(ConfigError(format!(
                    "vitals.{name} must be positive, got {hours}"
                )));
            }
        }
        if !(v.max_catch_up_secs.is_finite() && v.max_catch_up_secs >= 0.0) {
            return Err(ConfigError(format!(
                "vitals.max_catch_up_secs must be non-negative, got {}",
                v.max_catch_up_secs
            )));
        }
        if !(0.0..=1.0).contains(&v.happiness_floor_factor) {
            return Err(ConfigError(format!(
                "vitals.happiness_floor_factor must be within [0, 1], got {}",
                v.happiness_floor_factor
            )));
        }
        let (lo, hi) = BLINK_INTERVAL_RANGE;
        if !(lo..=hi).contains(&self.blink_interval_secs) {
            return Err(ConfigError(format!(
                "blink_interval_secs must be within [{lo}, {hi}], got {}",
                self.blink_interval_secs
            )));
        }
        if self.chat_milestone_every == 0 {
            return Err(ConfigError("chat_milestone_every must be at least 1".into()));
        }
        if !(0.0..=1.0).contains(&self.loot_chance) {
            return Err(ConfigError(format!(
                "loot_chance must be within [0, 1], got {}",
                self.loot_chance
            )));
        }
        Ok(())
    }
}
