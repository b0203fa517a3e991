//! Personality traits and the temporary states layered on top of them.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::inventory::normalize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Disposition {
    // Hatchling traits
    Chill,
    Hyper,
    Sweet,

    // Rolled on evolution
    Stoic,
    Wild,
    Brilliant,

    // Temporary
    DeepSleep,
    Caffeinated,
    SugarRush,
}

/// Traits a new companion can be born with.
pub const HATCHLING_TRAITS: [Disposition; 3] =
    [Disposition::Chill, Disposition::Hyper, Disposition::Sweet];

/// Traits rolled each time the companion evolves.
pub const EVOLVED_TRAITS: [Disposition; 3] =
    [Disposition::Stoic, Disposition::Wild, Disposition::Brilliant];

/// How long a food-induced trait lasts.
pub const FOOD_TRAIT_SECS: f64 = 30.0 * 60.0;

impl Disposition {
    pub fn label(self) -> &'static str {
        match self {
            Self::Chill => "Chill",
            Self::Hyper => "Hyper",
            Self::Sweet => "Sweet",
            Self::Stoic => "Stoic",
            Self::Wild => "Wild",
            Self::Brilliant => "Brilliant",
            Self::DeepSleep => "Deep Sleep",
            Self::Caffeinated => "Caffeinated",
            Self::SugarRush => "Sugar Rush",
        }
    }

    /// Multiplier on the hunger drain rate.
    pub fn hunger_modifier(self) -> f64 {
        match self {
            Self::SugarRush => 1.10,
            Self::DeepSleep => 0.30,
            _ => 1.0,
        }
    }

    /// Multiplier on the energy drain rate.
    pub fn energy_modifier(self) -> f64 {
        match self {
            Self::Caffeinated => 0.70,
            Self::DeepSleep => 0.10,
            Self::Hyper => 1.10,
            _ => 1.0,
        }
    }
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

pub const ALL_DISPOSITIONS: [Disposition; 9] = [
    Disposition::Chill,
    Disposition::Hyper,
    Disposition::Sweet,
    Disposition::Stoic,
    Disposition::Wild,
    Disposition::Brilliant,
    Disposition::DeepSleep,
    Disposition::Caffeinated,
    Disposition::SugarRush,
];

impl FromStr for Disposition {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = normalize(s);
        ALL_DISPOSITIONS
            .into_iter()
            .find(|d| normalize(d.label()) == key)
            .ok_or_else(|| EngineError::UnknownTrait(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemporaryTrait {
    pub disposition: Disposition,
    pub expires_at: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Temperament {
    pub base: Disposition,
    pub temporary: Option<TemporaryTrait>,
}

impl Temperament {
    pub fn new(base: Disposition) -> Self {
        Self {
            base,
            temporary: None,
        }
    }

    pub fn hatch(rng: &mut impl Rng) -> Self {
        Self::new(roll(&HATCHLING_TRAITS, rng))
    }

    /// The trait in effect at `now`. An expired temporary trait falls back to the base.
    pub fn current(&self, now: f64) -> Disposition {
        match self.temporary {
            Some(t) if now < t.expires_at => t.disposition,
            _ => self.base,
        }
    }

    pub fn is_sleeping(&self, now: f64) -> bool {
        self.current(now) == Disposition::DeepSleep
    }

    pub fn set_temporary(&mut self, disposition: Disposition, now: f64, secs: f64) {
        self.temporary = Some(TemporaryTrait {
            disposition,
            expires_at: now + secs,
        });
    }

    pub fn clear_temporary(&mut self) {
        self.temporary = None;
    }

    pub fn evolve(&mut self, rng: &mut impl Rng) {
        self.base = roll(&EVOLVED_TRAITS, rng);
    }
}

fn roll(pool: &[Disposition], rng: &mut impl Rng) -> Disposition {
    pool.choose(rng).copied().unwrap_or(Disposition::Chill)
}
