//! Arcade games: Comet-Paper-Scissors and Number Pulse.
//!
//! These functions only decide outcomes. Awards and vitals gains are
//! applied by the engine once a game actually finishes.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::PULSE_MAX;
use crate::economy::GameOutcome;
use crate::error::{EngineError, Result};
use crate::inventory::normalize;
use crate::state::CompanionState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Signal {
    Comet,
    Paper,
    Scissors,
}

pub const ALL_SIGNALS: [Signal; 3] = [Signal::Comet, Signal::Paper, Signal::Scissors];

impl Signal {
    pub fn label(self) -> &'static str {
        match self {
            Signal::Comet => "Comet",
            Signal::Paper => "Paper",
            Signal::Scissors => "Scissors",
        }
    }

    pub fn random(rng: &mut impl Rng) -> Self {
        ALL_SIGNALS[rng.random_range(0..ALL_SIGNALS.len())]
    }

    fn beats(self, other: Signal) -> bool {
        matches!(
            (self, other),
            (Signal::Comet, Signal::Scissors)
                | (Signal::Paper, Signal::Comet)
                | (Signal::Scissors, Signal::Paper)
        )
    }

    /// Outcome for the player throwing `self` against `companion`.
    pub fn against(self, companion: Signal) -> GameOutcome {
        if self == companion {
            GameOutcome::Draw
        } else if self.beats(companion) {
            GameOutcome::Win
        } else {
            GameOutcome::Loss
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Signal {
    type Err = EngineError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let key = normalize(s);
        let found = match key.as_str() {
            "comet" | "rock" => Some(Signal::Comet),
            "paper" => Some(Signal::Paper),
            "scissors" => Some(Signal::Scissors),
            _ => None,
        };
        found.ok_or_else(|| EngineError::UnknownSignal(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Round {
    pub player: Signal,
    pub companion: Signal,
    pub outcome: GameOutcome,
}

pub fn play_round(player: Signal, rng: &mut impl Rng) -> Round {
    let companion = Signal::random(rng);
    Round {
        player,
        companion,
        outcome: player.against(companion),
    }
}

/// An open Number Pulse round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PulseRound {
    pub target: u8,
    pub attempts: u32,
}

impl PulseRound {
    pub fn start(rng: &mut impl Rng) -> Self {
        Self {
            target: rng.random_range(1..=PULSE_MAX),
            attempts: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PulseResult {
    TooLow,
    TooHigh,
    Locked { attempts: u32 },
}

/// Make one Number Pulse guess, opening a round if none is running.
///
/// A lock closes the round. Out-of-range guesses are rejected before
/// anything changes, so they neither open a round nor count as attempts.
pub fn guess_pulse(state: &mut CompanionState, guess: u8, rng: &mut impl Rng) -> Result<PulseResult> {
    if !(1..=PULSE_MAX).contains(&guess) {
        return Err(EngineError::InvalidGuess(guess));
    }
    let round = state.pulse.get_or_insert_with(|| PulseRound::start(rng));
    round.attempts += 1;

    let result = match guess.cmp(&round.target) {
        std::cmp::Ordering::Less => PulseResult::TooLow,
        std::cmp::Ordering::Greater => PulseResult::TooHigh,
        std::cmp::Ordering::Equal => PulseResult::Locked {
            attempts: round.attempts,
        },
    };
    if matches!(result, PulseResult::Locked { .. }) {
        state.pulse = None;
    }
    Ok(result)
}
