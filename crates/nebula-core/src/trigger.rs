//! Sync gate: decides whether an explicit user action may update vitals.
//!
//! Vitals never drift on their own. Only a manual sync or a qualifying
//! interaction opens the gate; renders, polls and timers never do.

use serde::{Deserialize, Serialize};

use crate::config::VitalsConfig;
use crate::constants::REST_ENERGY_GAIN;
use crate::economy::GameOutcome;
use crate::inventory::Item;
use crate::state::CompanionState;
use crate::vitals::{VitalsDelta, VitalsReport, apply_vitals_update};

/// Interactions that count as activity and carry a vitals gain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Interaction {
    Game(GameOutcome),
    ChatTurn,
    MissionComplete,
    Feed(Item),
    Rest,
    /// Ending a deep sleep. Charges the sleep at the slowed rates.
    Wake,
}

impl Interaction {
    /// Vitals gained from the interaction itself, applied after decay.
    pub fn gain(&self) -> VitalsDelta {
        match self {
            Interaction::Game(GameOutcome::Win) => VitalsDelta::happiness(2.0),
            Interaction::Game(GameOutcome::Draw) => VitalsDelta::happiness(1.0),
            Interaction::Game(GameOutcome::Loss) => VitalsDelta::happiness(0.5),
            Interaction::ChatTurn => VitalsDelta::happiness(0.25),
            Interaction::MissionComplete => VitalsDelta::happiness(1.0),
            Interaction::Feed(item) => item.nourishment(),
            Interaction::Rest => VitalsDelta::energy(REST_ENERGY_GAIN),
            Interaction::Wake => VitalsDelta::ZERO,
        }
    }
}

/// Sources that may ask for state but must never move it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PassiveSource {
    Render,
    Poll,
    Timer,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TriggerKind {
    ManualSync,
    Interaction(Interaction),
    Passive(PassiveSource),
}

impl TriggerKind {
    pub fn gain(&self) -> VitalsDelta {
        match self {
            TriggerKind::Interaction(i) => i.gain(),
            _ => VitalsDelta::ZERO,
        }
    }
}

/// Whether `trigger` may update the vitals of `state`.
///
/// A mission-complete interaction only qualifies while a mission is in
/// flight, a feed only when the item is actually in cargo, and a wake
/// only while the companion is asleep.
pub fn should_sync(state: &CompanionState, trigger: &TriggerKind, now: f64) -> bool {
    match trigger {
        TriggerKind::ManualSync => true,
        TriggerKind::Interaction(Interaction::MissionComplete) => state.active_mission.is_some(),
        TriggerKind::Interaction(Interaction::Feed(item)) => state.inventory.contains(*item),
        TriggerKind::Interaction(Interaction::Wake) => state.temperament.is_sleeping(now),
        TriggerKind::Interaction(_) => true,
        TriggerKind::Passive(_) => false,
    }
}

/// The only path to a vitals update: run the gate and, if it opens,
/// charge decay and apply the trigger's gain.
pub fn sync(
    state: &mut CompanionState,
    trigger: &TriggerKind,
    now: f64,
    config: &VitalsConfig,
) -> Option<VitalsReport> {
    should_sync(state, trigger, now)
        .then(|| apply_vitals_update(state, now, &trigger.gain(), config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mission::{ActiveMission, Destination};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn state() -> CompanionState {
        let mut rng = SmallRng::seed_from_u64(42);
        CompanionState::new("Nebula", 0.0, &mut rng)
    }

    #[test]
    fn test_manual_and_interactions_open_gate() {
        let s = state();
        assert!(should_sync(&s, &TriggerKind::ManualSync, 0.0));
        assert!(should_sync(&s, &TriggerKind::Interaction(Interaction::ChatTurn), 0.0));
        assert!(should_sync(
            &s,
            &TriggerKind::Interaction(Interaction::Game(GameOutcome::Loss)),
            0.0
        ));
        assert!(should_sync(&s, &TriggerKind::Interaction(Interaction::Rest), 0.0));
    }

    #[test]
    fn test_passive_sources_never_sync() {
        let s = state();
        for source in [PassiveSource::Render, PassiveSource::Poll, PassiveSource::Timer] {
            assert!(!should_sync(&s, &TriggerKind::Passive(source), 0.0));
        }
    }

    #[test]
    fn test_mission_complete_requires_active_mission() {
        let mut s = state();
        let trigger = TriggerKind::Interaction(Interaction::MissionComplete);
        assert!(!should_sync(&s, &trigger, 0.0));
        s.active_mission = Some(ActiveMission::launch(Destination::AsteroidBelt, 0.0));
        assert!(should_sync(&s, &trigger, 0.0));
    }

    #[test]
    fn test_feed_requires_cargo() {
        let s = state();
        assert!(should_sync(
            &s,
            &TriggerKind::Interaction(Interaction::Feed(Item::Apple)),
            0.0
        ));
        assert!(!should_sync(
            &s,
            &TriggerKind::Interaction(Interaction::Feed(Item::StarMote)),
            0.0
        ));
    }

    #[test]
    fn test_wake_requires_sleep() {
        let mut s = state();
        let trigger = TriggerKind::Interaction(Interaction::Wake);
        assert!(!should_sync(&s, &trigger, 10.0));
        s.temperament
            .set_temporary(crate::temperament::Disposition::DeepSleep, 0.0, 60.0);
        assert!(should_sync(&s, &trigger, 10.0));
        assert!(!should_sync(&s, &trigger, 61.0));
    }

    #[test]
    fn test_closed_gate_leaves_state_alone() {
        let cfg = VitalsConfig::default();
        let mut s = state();
        let before = s.clone();
        for source in [PassiveSource::Render, PassiveSource::Poll, PassiveSource::Timer] {
            assert!(sync(&mut s, &TriggerKind::Passive(source), 7200.0, &cfg).is_none());
        }
        let feed_missing = TriggerKind::Interaction(Interaction::Feed(Item::StarMote));
        assert!(sync(&mut s, &feed_missing, 7200.0, &cfg).is_none());
        assert_eq!(s, before);

        let report = sync(&mut s, &TriggerKind::ManualSync, 7200.0, &cfg).unwrap();
        assert!(report.charged_secs > 0.0);
        assert_eq!(s.last_sync, 7200.0);
    }

    #[test]
    fn test_gain_table() {
        assert_eq!(
            TriggerKind::Interaction(Interaction::Game(GameOutcome::Win)).gain(),
            VitalsDelta::happiness(2.0)
        );
        assert_eq!(
            TriggerKind::Interaction(Interaction::Rest).gain(),
            VitalsDelta::energy(2.0)
        );
        assert!(TriggerKind::ManualSync.gain().is_zero());
        assert!(TriggerKind::Passive(PassiveSource::Render).gain().is_zero());
    }
}
