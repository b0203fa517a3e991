//! Mood derivation and avatar selection.
//!
//! Pure functions of `(state, now)`. Nothing here mutates state, and
//! nothing returned carries the numeric vitals it was derived from.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{
    BLINK_HOLD_SECS, CRITICAL_LEVEL, HAPPY_LEVEL, RADIANT_HAPPINESS, RADIANT_SUPPORT,
    WARNING_LEVEL,
};
use crate::economy::Tier;
use crate::state::CompanionState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mood {
    Sleeping,
    Exploring,
    Hungry,
    Exhausted,
    Sad,
    Peckish,
    Tired,
    Radiant,
    Happy,
    Neutral,
}

/// Coarse grouping used to pick reaction and voice variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoodBucket {
    Low,
    Mid,
    High,
}

impl Mood {
    pub fn label(self) -> &'static str {
        match self {
            Mood::Sleeping => "Sleeping",
            Mood::Exploring => "Exploring",
            Mood::Hungry => "Hungry",
            Mood::Exhausted => "Exhausted",
            Mood::Sad => "Sad",
            Mood::Peckish => "Peckish",
            Mood::Tired => "Tired",
            Mood::Radiant => "Radiant",
            Mood::Happy => "Happy",
            Mood::Neutral => "Neutral",
        }
    }

    pub fn bucket(self) -> MoodBucket {
        match self {
            Mood::Sleeping | Mood::Hungry | Mood::Exhausted | Mood::Sad => MoodBucket::Low,
            Mood::Happy | Mood::Radiant => MoodBucket::High,
            Mood::Exploring | Mood::Peckish | Mood::Tired | Mood::Neutral => MoodBucket::Mid,
        }
    }

    /// Voice guidance for the chat collaborator.
    pub fn tone(self) -> &'static str {
        match self {
            Mood::Sleeping => "drowsy and dreamy; a sentence or two that trails off",
            Mood::Exploring => "far away and distracted by the view; brief replies",
            Mood::Hungry => "subdued and a little plaintive; hints at wanting a snack",
            Mood::Exhausted => "slow and quiet; short gentle sentences, needs rest",
            Mood::Sad => "softly melancholy; warm but without forced cheer",
            Mood::Peckish => "warm and curious with a passing thought of food",
            Mood::Tired => "unhurried and soft; the occasional yawn",
            Mood::Radiant => "glowing with wonder; vivid cosmic imagery and delight",
            Mood::Happy => "content and conversational; asks gentle questions",
            Mood::Neutral => "calm, observant and steady",
        }
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Map state to a mood. The first matching rule wins.
pub fn derive_mood(state: &CompanionState, now: f64) -> Mood {
    if state.temperament.is_sleeping(now) {
        return Mood::Sleeping;
    }
    if state.active_mission.is_some() {
        return Mood::Exploring;
    }

    let v = &state.vitals;
    let (hunger, happiness, energy) = (v.hunger(), v.happiness(), v.energy());
    if hunger <= CRITICAL_LEVEL {
        Mood::Hungry
    } else if energy <= CRITICAL_LEVEL {
        Mood::Exhausted
    } else if happiness <= CRITICAL_LEVEL {
        Mood::Sad
    } else if hunger <= WARNING_LEVEL {
        Mood::Peckish
    } else if energy <= WARNING_LEVEL {
        Mood::Tired
    } else if happiness >= RADIANT_HAPPINESS
        && hunger >= RADIANT_SUPPORT
        && energy >= RADIANT_SUPPORT
    {
        Mood::Radiant
    } else if happiness >= HAPPY_LEVEL {
        Mood::Happy
    } else {
        Mood::Neutral
    }
}

/// Which picture the renderer should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Avatar {
    Sleeping,
    Exploring,
    Hungry,
    Tired,
    Sad,
    Radiant,
    Blink,
    Stage(Tier),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Presentation {
    pub mood: Mood,
    pub avatar: Avatar,
    pub idle_animation_due: bool,
}

/// True during the first instants of each blink window.
///
/// A non-positive or non-finite interval disables blinking.
pub fn blink_due(now: f64, interval_secs: f64) -> bool {
    if !(interval_secs.is_finite() && interval_secs > 0.0) || !now.is_finite() {
        return false;
    }
    now.rem_euclid(interval_secs) < BLINK_HOLD_SECS
}

pub fn present(state: &CompanionState, now: f64, blink_interval_secs: f64) -> Presentation {
    let mood = derive_mood(state, now);
    let idle_animation_due =
        !matches!(mood, Mood::Sleeping | Mood::Exploring) && blink_due(now, blink_interval_secs);

    // Only critical moods get their own portrait; milder ones keep the stage.
    let avatar = match mood {
        Mood::Sleeping => Avatar::Sleeping,
        Mood::Exploring => Avatar::Exploring,
        _ if idle_animation_due => Avatar::Blink,
        Mood::Hungry => Avatar::Hungry,
        Mood::Exhausted => Avatar::Tired,
        Mood::Sad => Avatar::Sad,
        Mood::Radiant => Avatar::Radiant,
        Mood::Peckish | Mood::Tired | Mood::Happy | Mood::Neutral => Avatar::Stage(state.tier()),
    };

    Presentation {
        mood,
        avatar,
        idle_animation_due,
    }
}
