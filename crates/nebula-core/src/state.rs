use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::arcade::PulseRound;
use crate::constants::{JOURNAL_CAP, VITAL_START};
use crate::economy::Tier;
use crate::inventory::Inventory;
use crate::mission::ActiveMission;
use crate::temperament::Temperament;
use crate::vitals::Vitals;

/// A life event, written without numbers so it can be quoted in chat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub at: f64,
    pub text: String,
}

/// Root aggregate for one companion.
///
/// Tier and mood are not fields: both are derived on demand from the
/// values stored here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanionState {
    pub name: String,
    pub vitals: Vitals,
    pub experience: f64,
    pub temperament: Temperament,
    pub inventory: Inventory,
    pub active_mission: Option<ActiveMission>,
    /// Unix seconds of the last vitals update.
    pub last_sync: f64,
    pub journal: Vec<JournalEntry>,
    pub chat_turns: u64,
    pub pulse: Option<PulseRound>,
    pub born_at: f64,
}

impl CompanionState {
    pub fn new(name: &str, now: f64, rng: &mut impl Rng) -> Self {
        Self::with_start_level(name, now, VITAL_START, rng)
    }

    /// A fresh hatchling with every vital at `level`.
    pub fn with_start_level(name: &str, now: f64, level: f64, rng: &mut impl Rng) -> Self {
        let temperament = Temperament::hatch(rng);
        let mut state = Self {
            name: name.to_string(),
            vitals: Vitals::uniform(level),
            experience: 0.0,
            temperament,
            inventory: Inventory::starter(),
            active_mission: None,
            last_sync: now,
            journal: Vec::new(),
            chat_turns: 0,
            pulse: None,
            born_at: now,
        };
        let base = state.temperament.base;
        state.record(now, format!("Hatched with a {base} temperament."));
        state
    }

    pub fn tier(&self) -> Tier {
        Tier::from_experience(self.experience)
    }

    /// Append a journal entry, dropping the oldest past the cap.
    pub fn record(&mut self, now: f64, text: String) {
        self.journal.push(JournalEntry { at: now, text });
        if self.journal.len() > JOURNAL_CAP {
            let excess = self.journal.len() - JOURNAL_CAP;
            self.journal.drain(..excess);
        }
    }

    /// Most recent journal entries, newest last.
    pub fn recent_journal(&self, n: usize) -> &[JournalEntry] {
        let start = self.journal.len().saturating_sub(n);
        &self.journal[start..]
    }
}
