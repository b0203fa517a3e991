//! Hunger, happiness and energy: bounded decay and gain.
//!
//! Vitals only move when [`apply_vitals_update`] is called, which the
//! engine does only after the trigger gate approves a sync. Decay is
//! computed lazily from the time elapsed since `last_sync`.

use serde::{Deserialize, Serialize};

use crate::config::VitalsConfig;
use crate::constants::{VITAL_MAX, VITAL_MIN};
use crate::state::CompanionState;
use crate::temperament::Disposition;

/// Clamp a raw value into the vital range. NaN collapses to the floor.
pub fn clamp_vital(value: f64) -> f64 {
    if value.is_nan() {
        VITAL_MIN
    } else {
        value.clamp(VITAL_MIN, VITAL_MAX)
    }
}

/// The three bounded vitals. Hunger is satiety: 10 is full, 0 is starving.
///
/// Fields are private so every write goes through the clamp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "VitalsRepr", into = "VitalsRepr")]
pub struct Vitals {
    hunger: f64,
    happiness: f64,
    energy: f64,
}

#[derive(Serialize, Deserialize)]
struct VitalsRepr {
    hunger: f64,
    happiness: f64,
    energy: f64,
}

impl From<VitalsRepr> for Vitals {
    fn from(r: VitalsRepr) -> Self {
        Vitals::new(r.hunger, r.happiness, r.energy)
    }
}

impl From<Vitals> for VitalsRepr {
    fn from(v: Vitals) -> Self {
        VitalsRepr {
            hunger: v.hunger,
            happiness: v.happiness,
            energy: v.energy,
        }
    }
}

impl Vitals {
    pub fn new(hunger: f64, happiness: f64, energy: f64) -> Self {
        Self {
            hunger: clamp_vital(hunger),
            happiness: clamp_vital(happiness),
            energy: clamp_vital(energy),
        }
    }

    pub fn uniform(level: f64) -> Self {
        Self::new(level, level, level)
    }

    pub fn hunger(&self) -> f64 {
        self.hunger
    }

    pub fn happiness(&self) -> f64 {
        self.happiness
    }

    pub fn energy(&self) -> f64 {
        self.energy
    }

    /// Add a delta and clamp every vital.
    pub fn apply(&mut self, delta: &VitalsDelta) {
        self.hunger = clamp_vital(self.hunger + delta.hunger);
        self.happiness = clamp_vital(self.happiness + delta.happiness);
        self.energy = clamp_vital(self.energy + delta.energy);
    }

    /// Mean of hunger and energy, scaled to `[0, 1]`.
    pub fn wellbeing(&self) -> f64 {
        (self.hunger + self.energy) / (2.0 * VITAL_MAX)
    }
}

/// Signed change to each vital.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct VitalsDelta {
    pub hunger: f64,
    pub happiness: f64,
    pub energy: f64,
}

impl VitalsDelta {
    pub const ZERO: VitalsDelta = VitalsDelta {
        hunger: 0.0,
        happiness: 0.0,
        energy: 0.0,
    };

    pub fn happiness(amount: f64) -> Self {
        Self {
            happiness: amount,
            ..Self::ZERO
        }
    }

    pub fn energy(amount: f64) -> Self {
        Self {
            energy: amount,
            ..Self::ZERO
        }
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl std::ops::Add for VitalsDelta {
    type Output = VitalsDelta;

    fn add(self, rhs: VitalsDelta) -> VitalsDelta {
        VitalsDelta {
            hunger: self.hunger + rhs.hunger,
            happiness: self.happiness + rhs.happiness,
            energy: self.energy + rhs.energy,
        }
    }
}

/// Decay owed for `elapsed_secs` of absence. All components are <= 0.
///
/// Happiness drain scales with how neglected the other two vitals are:
/// a fed, rested companion barely loses happiness.
pub fn decay(
    vitals: &Vitals,
    elapsed_secs: f64,
    disposition: Disposition,
    config: &VitalsConfig,
) -> VitalsDelta {
    let elapsed = elapsed_secs.max(0.0).min(config.max_catch_up_secs);
    if elapsed <= 0.0 {
        return VitalsDelta::ZERO;
    }
    let minutes = elapsed / 60.0;
    let happy_factor = (1.0 - vitals.wellbeing()).max(config.happiness_floor_factor);

    VitalsDelta {
        hunger: -minutes * config.hunger_per_min() * disposition.hunger_modifier(),
        happiness: -minutes * config.happiness_per_min() * happy_factor,
        energy: -minutes * config.energy_per_min() * disposition.energy_modifier(),
    }
}

/// Outcome of one vitals update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VitalsReport {
    /// Seconds charged after clamping skew and the catch-up cap.
    pub charged_secs: f64,
    /// The stored sync time was ahead of `now`; elapsed was treated as zero.
    pub clock_skew: bool,
    pub before: Vitals,
    pub after: Vitals,
}

/// Apply decay since the last sync plus an interaction gain, then clamp.
///
/// Negative or NaN elapsed time counts as zero. `last_sync` always moves
/// to `now` (when finite), so a stored timestamp from the future is
/// discarded on the first sync instead of freezing decay.
pub fn apply_vitals_update(
    state: &mut CompanionState,
    now: f64,
    gain: &VitalsDelta,
    config: &VitalsConfig,
) -> VitalsReport {
    let raw_elapsed = now - state.last_sync;
    let clock_skew = raw_elapsed < 0.0;
    let elapsed = if raw_elapsed.is_nan() || clock_skew {
        0.0
    } else {
        raw_elapsed
    };

    let before = state.vitals;
    let disposition = state.temperament.current(now);
    let owed = decay(&state.vitals, elapsed, disposition, config);

    state.vitals.apply(&owed);
    state.vitals.apply(gain);
    if now.is_finite() {
        state.last_sync = now;
    }

    VitalsReport {
        charged_secs: elapsed.min(config.max_catch_up_secs).max(0.0),
        clock_skew,
        before,
        after: state.vitals,
    }
}
