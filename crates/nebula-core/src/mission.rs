//! Timed expeditions: `Idle → Active → Complete → Idle`.
//!
//! There is no timer. A mission whose due time has passed stays pending
//! until the next [`check_mission`], which resolves it exactly once no
//! matter how late the check arrives.

use std::fmt;
use std::str::FromStr;

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::economy::{Activity, AwardReport, RewardRange, award_experience};
use crate::error::{EngineError, Result};
use crate::inventory::{Item, normalize};
use crate::state::CompanionState;
use crate::trigger::{self, Interaction, TriggerKind};
use crate::vitals::{VitalsDelta, VitalsReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Destination {
    AsteroidBelt,
    StellarNursery,
    CrabNebula,
}

pub const ALL_DESTINATIONS: [Destination; 3] = [
    Destination::AsteroidBelt,
    Destination::StellarNursery,
    Destination::CrabNebula,
];

/// Fixed parameters of a destination.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DestinationInfo {
    pub name: &'static str,
    pub duration_secs: f64,
    /// Energy spent at launch.
    pub energy_cost: f64,
    pub reward: RewardRange,
    /// Items that may be found on the way.
    pub loot: &'static [Item],
}

impl Destination {
    pub fn info(self) -> DestinationInfo {
        match self {
            Self::AsteroidBelt => DestinationInfo {
                name: "Asteroid Belt",
                duration_secs: 300.0,
                energy_cost: 1.0,
                reward: RewardRange::new(20, 40),
                loot: &[Item::Apple, Item::Berry],
            },
            Self::StellarNursery => DestinationInfo {
                name: "Stellar Nursery",
                duration_secs: 600.0,
                energy_cost: 1.5,
                reward: RewardRange::new(40, 60),
                loot: &[Item::Coffee, Item::MagicCookie],
            },
            Self::CrabNebula => DestinationInfo {
                name: "Crab Nebula",
                duration_secs: 900.0,
                energy_cost: 2.0,
                reward: RewardRange::new(60, 80),
                loot: &[Item::StarMote],
            },
        }
    }

    pub fn name(self) -> &'static str {
        self.info().name
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Destination {
    type Err = EngineError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let key = normalize(s);
        ALL_DESTINATIONS
            .into_iter()
            .find(|d| normalize(d.name()) == key)
            .ok_or_else(|| EngineError::UnknownDestination(s.to_string()))
    }
}

/// The mission currently in flight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveMission {
    pub id: Uuid,
    pub destination: Destination,
    pub start_time: f64,
    pub duration_secs: f64,
    pub reward_range: RewardRange,
}

impl ActiveMission {
    pub fn launch(destination: Destination, now: f64) -> Self {
        let info = destination.info();
        Self {
            id: Uuid::new_v4(),
            destination,
            start_time: now,
            duration_secs: info.duration_secs,
            reward_range: info.reward,
        }
    }

    pub fn due_at(&self) -> f64 {
        self.start_time + self.duration_secs
    }

    pub fn is_due(&self, now: f64) -> bool {
        now - self.start_time >= self.duration_secs
    }

    pub fn remaining_secs(&self, now: f64) -> f64 {
        (self.due_at() - now).max(0.0)
    }
}

/// Read-only mission view for renderers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MissionStatus {
    Idle,
    Active {
        destination: Destination,
        remaining_secs: f64,
    },
    /// Due but not yet checked in.
    Returning { destination: Destination },
}

pub fn mission_status(state: &CompanionState, now: f64) -> MissionStatus {
    match &state.active_mission {
        None => MissionStatus::Idle,
        Some(m) if m.is_due(now) => MissionStatus::Returning {
            destination: m.destination,
        },
        Some(m) => MissionStatus::Active {
            destination: m.destination,
            remaining_secs: m.remaining_secs(now),
        },
    }
}

/// Start an expedition. Nothing changes if the launch is rejected.
pub fn start_mission<'s>(
    state: &'s mut CompanionState,
    destination: Destination,
    now: f64,
) -> Result<&'s ActiveMission> {
    if state.active_mission.is_some() {
        return Err(EngineError::InvalidTransition(
            "a mission is already in flight",
        ));
    }
    if state.temperament.is_sleeping(now) {
        return Err(EngineError::InvalidTransition("the companion is asleep"));
    }
    let info = destination.info();
    let available = state.vitals.energy();
    if available < info.energy_cost {
        return Err(EngineError::InsufficientEnergy {
            required: info.energy_cost,
            available,
        });
    }

    state.vitals.apply(&VitalsDelta::energy(-info.energy_cost));
    state.record(now, format!("Launched toward the {destination}."));
    Ok(state.active_mission.insert(ActiveMission::launch(destination, now)))
}

#[derive(Debug, Clone, PartialEq)]
pub struct MissionReport {
    pub mission: ActiveMission,
    pub award: AwardReport,
    pub vitals: VitalsReport,
    /// Item brought back and stowed.
    pub found: Option<Item>,
    /// Item found but left behind because the cargo bay was full.
    pub dropped: Option<Item>,
    /// How long after the due time the check arrived.
    pub late_by_secs: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MissionCheck {
    Idle,
    InFlight { remaining_secs: f64 },
    Completed(Box<MissionReport>),
}

impl MissionCheck {
    pub fn completed(&self) -> bool {
        matches!(self, MissionCheck::Completed(_))
    }
}

/// Resolve the active mission if it is due.
///
/// On completion: vitals sync with the mission-complete gain, experience
/// is awarded from the mission's reward range, loot is rolled, and the
/// mission is cleared. Later calls see `Idle`.
pub fn check_mission(
    state: &mut CompanionState,
    now: f64,
    config: &EngineConfig,
    rng: &mut impl Rng,
) -> MissionCheck {
    let Some(mission) = state.active_mission.clone() else {
        return MissionCheck::Idle;
    };
    if !mission.is_due(now) {
        return MissionCheck::InFlight {
            remaining_secs: mission.remaining_secs(now),
        };
    }

    let trigger = TriggerKind::Interaction(Interaction::MissionComplete);
    let Some(vitals) = trigger::sync(state, &trigger, now, &config.vitals) else {
        return MissionCheck::Idle;
    };

    let award = award_experience(state, &Activity::Expedition(mission.reward_range), now, rng);

    let loot = mission.destination.info().loot;
    let roll = if rng.random::<f64>() < config.loot_chance {
        loot.choose(rng).copied()
    } else {
        None
    };
    let (found, dropped) = match roll {
        Some(item) if state.inventory.stow(item, config.cargo_capacity) => (Some(item), None),
        Some(item) => (None, Some(item)),
        None => (None, None),
    };

    state.active_mission = None;
    state.record(now, format!("Returned from the {}.", mission.destination));

    MissionCheck::Completed(Box::new(MissionReport {
        late_by_secs: (now - mission.due_at()).max(0.0),
        mission,
        award,
        vitals,
        found,
        dropped,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{AWARD_MAX, AWARD_MIN};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn rng() -> SmallRng {
        SmallRng::seed_from_u64(42)
    }

    fn fresh() -> CompanionState {
        CompanionState::new("Nebula", 0.0, &mut rng())
    }

    #[test]
    fn test_parse_destinations() {
        assert_eq!(
            "Stellar Nursery".parse::<Destination>().unwrap(),
            Destination::StellarNursery
        );
        assert_eq!(
            "crab-nebula".parse::<Destination>().unwrap(),
            Destination::CrabNebula
        );
        assert_eq!(
            "asteroid_belt".parse::<Destination>().unwrap(),
            Destination::AsteroidBelt
        );
        assert_eq!(
            "Andromeda".parse::<Destination>(),
            Err(EngineError::UnknownDestination("Andromeda".into()))
        );
    }

    #[test]
    fn test_reward_ranges_inside_band() {
        for d in ALL_DESTINATIONS {
            let r = d.info().reward;
            assert!(r.min >= AWARD_MIN && r.max <= AWARD_MAX && r.min <= r.max);
        }
    }

    #[test]
    fn test_start_sets_mission_and_spends_energy() {
        let mut s = fresh();
        let m = start_mission(&mut s, Destination::StellarNursery, 0.0).unwrap();
        assert_eq!(m.destination, Destination::StellarNursery);
        assert_eq!(m.start_time, 0.0);
        assert_eq!(m.duration_secs, 600.0);
        assert_eq!(s.vitals.energy(), 3.5);
    }

    #[test]
    fn test_start_while_active_is_invalid() {
        let mut s = fresh();
        start_mission(&mut s, Destination::AsteroidBelt, 0.0).unwrap();
        let before = s.clone();

        let err = start_mission(&mut s, Destination::CrabNebula, 10.0).unwrap_err();
        assert!(matches!(err, EngineError::InvalidTransition(_)));
        assert_eq!(s, before);
    }

    #[test]
    fn test_start_without_energy_is_rejected() {
        let mut s = fresh();
        s.vitals = crate::vitals::Vitals::new(5.0, 5.0, 1.0);
        let before = s.clone();
        let err = start_mission(&mut s, Destination::CrabNebula, 0.0).unwrap_err();
        assert!(matches!(err, EngineError::InsufficientEnergy { .. }));
        assert_eq!(s, before);
    }

    #[test]
    fn test_start_while_asleep_is_invalid() {
        let mut s = fresh();
        s.temperament
            .set_temporary(crate::temperament::Disposition::DeepSleep, 0.0, 3600.0);
        let err = start_mission(&mut s, Destination::AsteroidBelt, 10.0).unwrap_err();
        assert!(matches!(err, EngineError::InvalidTransition(_)));
        assert!(s.active_mission.is_none());
    }

    #[test]
    fn test_check_before_due_changes_nothing() {
        let cfg = EngineConfig::default();
        let mut s = fresh();
        start_mission(&mut s, Destination::StellarNursery, 0.0).unwrap();
        let before = s.clone();

        let check = check_mission(&mut s, 599.0, &cfg, &mut rng());
        assert_eq!(check, MissionCheck::InFlight { remaining_secs: 1.0 });
        assert!(!check.completed());
        assert_eq!(s, before);
    }

    #[test]
    fn test_check_completes_exactly_once() {
        let cfg = EngineConfig::default();
        let mut rng = rng();
        let mut s = fresh();
        start_mission(&mut s, Destination::StellarNursery, 0.0).unwrap();

        let check = check_mission(&mut s, 601.0, &cfg, &mut rng);
        let MissionCheck::Completed(report) = check else {
            panic!("expected completion, got {check:?}");
        };
        assert!((40..=60).contains(&report.award.amount));
        assert_eq!(s.experience, f64::from(report.award.amount));
        assert!((report.late_by_secs - 1.0).abs() < 1e-9);
        assert!(s.active_mission.is_none());

        let after = s.clone();
        for t in [601.0, 700.0, 10_000.0] {
            let again = check_mission(&mut s, t, &cfg, &mut rng);
            assert_eq!(again, MissionCheck::Idle);
            assert_eq!(s, after);
        }
    }

    #[test]
    fn test_late_check_still_rewards_once() {
        let cfg = EngineConfig::default();
        let mut s = fresh();
        start_mission(&mut s, Destination::AsteroidBelt, 0.0).unwrap();
        let check = check_mission(&mut s, 86_400.0 * 3.0, &cfg, &mut rng());
        let MissionCheck::Completed(report) = check else {
            panic!("expected completion");
        };
        assert!((20..=40).contains(&report.award.amount));
        assert!(report.vitals.charged_secs <= cfg.vitals.max_catch_up_secs);
    }

    #[test]
    fn test_loot_dropped_when_cargo_full() {
        let cfg = EngineConfig {
            loot_chance: 1.0,
            cargo_capacity: 5,
            ..Default::default()
        };
        let mut s = fresh();
        start_mission(&mut s, Destination::CrabNebula, 0.0).unwrap();
        let MissionCheck::Completed(report) = check_mission(&mut s, 900.0, &cfg, &mut rng()) else {
            panic!("expected completion");
        };
        assert_eq!(report.found, None);
        assert_eq!(report.dropped, Some(Item::StarMote));
        assert_eq!(s.inventory.len(), 5);
    }

    #[test]
    fn test_loot_stowed() {
        let cfg = EngineConfig {
            loot_chance: 1.0,
            ..Default::default()
        };
        let mut s = fresh();
        start_mission(&mut s, Destination::CrabNebula, 0.0).unwrap();
        let MissionCheck::Completed(report) = check_mission(&mut s, 900.0, &cfg, &mut rng()) else {
            panic!("expected completion");
        };
        assert_eq!(report.found, Some(Item::StarMote));
        assert_eq!(s.inventory.count(Item::StarMote), 1);
    }

    #[test]
    fn test_status_view() {
        let mut s = fresh();
        assert_eq!(mission_status(&s, 0.0), MissionStatus::Idle);
        start_mission(&mut s, Destination::AsteroidBelt, 100.0).unwrap();
        assert_eq!(
            mission_status(&s, 150.0),
            MissionStatus::Active {
                destination: Destination::AsteroidBelt,
                remaining_secs: 250.0
            }
        );
        assert_eq!(
            mission_status(&s, 400.0),
            MissionStatus::Returning {
                destination: Destination::AsteroidBelt
            }
        );
    }
}
