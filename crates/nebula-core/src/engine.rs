//! Engine facade: sequences gate, vitals, economy and missions for each
//! interaction.
//!
//! Every fallible operation validates before it mutates, so an `Err`
//! leaves the companion exactly as it was.

use rand::Rng;

use crate::arcade::{PulseResult, Round, Signal, guess_pulse, play_round};
use crate::config::EngineConfig;
use crate::constants::DEEP_SLEEP_SECS;
use crate::economy::{Activity, AwardReport, GameOutcome, Tier, award_experience};
use crate::error::{EngineError, Result};
use crate::hooks::NarrativeHook;
use crate::inventory::Item;
use crate::mission::{
    self, ActiveMission, Destination, MissionCheck, MissionStatus, mission_status,
};
use crate::mood::{self, Mood, Presentation};
use crate::state::CompanionState;
use crate::temperament::{Disposition, FOOD_TRAIT_SECS};
use crate::trigger::{self, Interaction, TriggerKind};
use crate::vitals::{Vitals, VitalsReport};

/// Result of an operation plus the narrative hooks it produced.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome<T> {
    pub value: T,
    pub hooks: Vec<NarrativeHook>,
}

impl<T> Outcome<T> {
    fn new(value: T) -> Self {
        Self {
            value,
            hooks: Vec::new(),
        }
    }

    fn with_award(mut self, award: &AwardReport) -> Self {
        if let Some(t) = award.transition {
            self.hooks.push(NarrativeHook::Evolved { to: t.to });
        }
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeedReport {
    pub item: Item,
    pub vitals: VitalsReport,
    /// Temporary trait the food left behind.
    pub after_effect: Option<Disposition>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GameReport {
    pub round: Round,
    pub award: AwardReport,
    pub vitals: VitalsReport,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PulseReport {
    pub result: PulseResult,
    /// Present only when the round locked.
    pub award: Option<AwardReport>,
    pub vitals: Option<VitalsReport>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChatReport {
    pub turn: u64,
    pub vitals: VitalsReport,
    pub milestone: Option<AwardReport>,
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Status {
    pub name: String,
    pub vitals: Vitals,
    pub experience: f64,
    pub tier: Tier,
    pub disposition: Disposition,
    pub presentation: Presentation,
    pub mission: MissionStatus,
    pub cargo: Vec<Item>,
}

#[derive(Debug, Clone, Default)]
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn new_companion(&self, name: &str, now: f64, rng: &mut impl Rng) -> CompanionState {
        CompanionState::with_start_level(name, now, self.config.vitals.start_level, rng)
    }

    /// Run the sync gate and, if it opens, update vitals.
    pub fn sync(
        &self,
        state: &mut CompanionState,
        trigger: &TriggerKind,
        now: f64,
    ) -> Option<VitalsReport> {
        trigger::sync(state, trigger, now, &self.config.vitals)
    }

    /// Gated update for an interaction the caller has already validated.
    fn interact(
        &self,
        state: &mut CompanionState,
        interaction: Interaction,
        now: f64,
    ) -> Result<VitalsReport> {
        self.sync(state, &TriggerKind::Interaction(interaction), now)
            .ok_or(EngineError::InvalidTransition("the sync gate is closed"))
    }

    pub fn award(
        &self,
        state: &mut CompanionState,
        activity: &Activity,
        now: f64,
        rng: &mut impl Rng,
    ) -> AwardReport {
        award_experience(state, activity, now, rng)
    }

    pub fn start_mission(
        &self,
        state: &mut CompanionState,
        destination: Destination,
        now: f64,
    ) -> Result<ActiveMission> {
        mission::start_mission(state, destination, now).cloned()
    }

    pub fn check_mission(
        &self,
        state: &mut CompanionState,
        now: f64,
        rng: &mut impl Rng,
    ) -> Outcome<MissionCheck> {
        let check = mission::check_mission(state, now, &self.config, rng);
        let mut hooks = Vec::new();
        let mut award = None;
        if let MissionCheck::Completed(report) = &check {
            hooks.push(NarrativeHook::Returned {
                destination: report.mission.destination,
                found: report.found,
                mood: mood::derive_mood(state, now),
            });
            award = Some(report.award);
        }
        let outcome = Outcome { value: check, hooks };
        match award {
            Some(award) => outcome.with_award(&award),
            None => outcome,
        }
    }

    pub fn derive_mood(&self, state: &CompanionState, now: f64) -> Mood {
        mood::derive_mood(state, now)
    }

    pub fn present(&self, state: &CompanionState, now: f64) -> Presentation {
        mood::present(state, now, self.config.blink_interval_secs)
    }

    /// Read-only snapshot for renderers. Never moves vitals.
    pub fn status(&self, state: &CompanionState, now: f64) -> Status {
        Status {
            name: state.name.clone(),
            vitals: state.vitals,
            experience: state.experience,
            tier: state.tier(),
            disposition: state.temperament.current(now),
            presentation: self.present(state, now),
            mission: mission_status(state, now),
            cargo: state.inventory.items.clone(),
        }
    }

    pub fn feed(
        &self,
        state: &mut CompanionState,
        item: Item,
        now: f64,
    ) -> Result<Outcome<FeedReport>> {
        let vitals = self
            .interact(state, Interaction::Feed(item), now)
            .map_err(|_| EngineError::ItemNotInCargo(item))?;
        state.inventory.take(item)?;

        let after_effect = item
            .after_effect()
            .filter(|_| !state.temperament.is_sleeping(now));
        if let Some(d) = after_effect {
            state.temperament.set_temporary(d, now, FOOD_TRAIT_SECS);
        }

        let mut outcome = Outcome::new(FeedReport {
            item,
            vitals,
            after_effect,
        });
        outcome.hooks.push(NarrativeHook::Fed {
            item,
            mood: mood::derive_mood(state, now),
        });
        Ok(outcome)
    }

    /// Put the companion into a deep sleep.
    pub fn rest(&self, state: &mut CompanionState, now: f64) -> Result<VitalsReport> {
        if state.temperament.is_sleeping(now) {
            return Err(EngineError::InvalidTransition("the companion is already asleep"));
        }
        if state.active_mission.is_some() {
            return Err(EngineError::InvalidTransition(
                "the companion is away on a mission",
            ));
        }
        let report = self.interact(state, Interaction::Rest, now)?;
        state
            .temperament
            .set_temporary(Disposition::DeepSleep, now, DEEP_SLEEP_SECS);
        state.record(now, "Curled up for a deep sleep.".into());
        Ok(report)
    }

    pub fn wake(&self, state: &mut CompanionState, now: f64) -> Result<VitalsReport> {
        if !state.temperament.is_sleeping(now) {
            return Err(EngineError::InvalidTransition("the companion is not asleep"));
        }
        // Charge the sleep so far at the slowed rates before the trait lifts.
        let report = self.interact(state, Interaction::Wake, now)?;
        state.temperament.clear_temporary();
        Ok(report)
    }

    /// One round of Comet-Paper-Scissors.
    pub fn play_signal(
        &self,
        state: &mut CompanionState,
        signal: Signal,
        now: f64,
        rng: &mut impl Rng,
    ) -> Result<Outcome<GameReport>> {
        ensure_awake(state, now)?;
        let round = play_round(signal, rng);
        let vitals = self.interact(state, Interaction::Game(round.outcome), now)?;
        let award = award_experience(
            state,
            &Activity::CometPaperScissors(round.outcome),
            now,
            rng,
        );
        Ok(Outcome::new(GameReport {
            round,
            award,
            vitals,
        })
        .with_award(&award))
    }

    /// One Number Pulse guess. Only a lock counts as a finished game.
    pub fn pulse(
        &self,
        state: &mut CompanionState,
        guess: u8,
        now: f64,
        rng: &mut impl Rng,
    ) -> Result<Outcome<PulseReport>> {
        ensure_awake(state, now)?;
        let result = guess_pulse(state, guess, rng)?;
        let PulseResult::Locked { attempts } = result else {
            return Ok(Outcome::new(PulseReport {
                result,
                award: None,
                vitals: None,
            }));
        };

        let vitals = self.interact(state, Interaction::Game(GameOutcome::Win), now)?;
        let award = award_experience(state, &Activity::NumberPulse { attempts }, now, rng);
        Ok(Outcome::new(PulseReport {
            result,
            award: Some(award),
            vitals: Some(vitals),
        })
        .with_award(&award))
    }

    /// Count one chat turn. Every Nth turn is a milestone worth experience.
    pub fn chat_turn(
        &self,
        state: &mut CompanionState,
        now: f64,
        rng: &mut impl Rng,
    ) -> Result<Outcome<ChatReport>> {
        let vitals = self.interact(state, Interaction::ChatTurn, now)?;
        state.chat_turns += 1;

        let every = self.config.chat_milestone_every.max(1);
        let milestone = (state.chat_turns % every == 0)
            .then(|| award_experience(state, &Activity::ChatMilestone, now, rng));

        let mut outcome = Outcome::new(ChatReport {
            turn: state.chat_turns,
            vitals,
            milestone,
        });
        if let Some(award) = milestone {
            outcome.hooks.push(NarrativeHook::Milestone);
            outcome = outcome.with_award(&award);
        }
        Ok(outcome)
    }

    /// Replace the companion with a fresh hatchling of the same name.
    pub fn reset(&self, state: &mut CompanionState, now: f64, rng: &mut impl Rng) {
        let name = std::mem::take(&mut state.name);
        *state = self.new_companion(&name, now, rng);
    }
}

fn ensure_awake(state: &CompanionState, now: f64) -> Result<()> {
    if state.temperament.is_sleeping(now) {
        Err(EngineError::InvalidTransition("the companion is asleep"))
    } else {
        Ok(())
    }
}
