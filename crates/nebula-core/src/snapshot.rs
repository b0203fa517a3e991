//! JSON serde for the companion export format.
//!
//! The wire format uses camelCase field names and flattens the vitals
//! onto the companion object. Tier and mood are never written; an import
//! recomputes them from experience and vitals.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::arcade::PulseRound;
use crate::constants::PULSE_MAX;
use crate::economy::RewardRange;
use crate::inventory::{Inventory, Item};
use crate::mission::{ActiveMission, Destination};
use crate::state::{CompanionState, JournalEntry};
use crate::temperament::{Disposition, Temperament, TemporaryTrait};
use crate::time::now_iso8601;
use crate::vitals::Vitals;

pub const CURRENT_VERSION: &str = "1.0";

// --- Wire format types ---

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct WireExport {
    pub version: String,
    #[serde(default)]
    pub exported_at: String,
    pub companion: WireCompanion,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct WireCompanion {
    pub name: String,
    pub hunger: f64,
    pub happiness: f64,
    pub energy: f64,
    /// Older saves call this `xp`.
    #[serde(alias = "xp", default)]
    pub experience: f64,
    pub temperament: Disposition,
    #[serde(default)]
    pub temporary_trait: Option<WireTrait>,
    #[serde(default)]
    pub cargo: Vec<Item>,
    #[serde(default)]
    pub active_mission: Option<WireMission>,
    pub last_sync: f64,
    #[serde(default)]
    pub journal: Vec<WireJournalEntry>,
    #[serde(default)]
    pub chat_turns: u64,
    #[serde(default)]
    pub pulse: Option<WirePulse>,
    #[serde(default)]
    pub born_at: f64,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct WireTrait {
    pub disposition: Disposition,
    pub expires_at: f64,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct WireMission {
    #[serde(default)]
    pub id: String,
    pub destination: Destination,
    pub start_time: f64,
    pub duration_secs: f64,
    pub reward_min: u32,
    pub reward_max: u32,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct WireJournalEntry {
    pub at: f64,
    pub text: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct WirePulse {
    pub target: u8,
    pub attempts: u32,
}

// --- Conversion ---

impl WireExport {
    pub fn into_state(self) -> CompanionState {
        let c = self.companion;
        CompanionState {
            name: c.name,
            vitals: Vitals::new(c.hunger, c.happiness, c.energy),
            experience: if c.experience.is_finite() {
                c.experience.max(0.0)
            } else {
                0.0
            },
            temperament: Temperament {
                base: c.temperament,
                temporary: c.temporary_trait.map(|t| TemporaryTrait {
                    disposition: t.disposition,
                    expires_at: t.expires_at,
                }),
            },
            inventory: Inventory { items: c.cargo },
            active_mission: c.active_mission.map(wire_mission_to_domain),
            last_sync: c.last_sync,
            journal: c
                .journal
                .into_iter()
                .map(|e| JournalEntry {
                    at: e.at,
                    text: e.text,
                })
                .collect(),
            chat_turns: c.chat_turns,
            pulse: c
                .pulse
                .filter(|p| (1..=PULSE_MAX).contains(&p.target))
                .map(|p| PulseRound {
                    target: p.target,
                    attempts: p.attempts,
                }),
            born_at: c.born_at,
        }
    }

    pub fn from_state(state: &CompanionState) -> Self {
        WireExport {
            version: CURRENT_VERSION.to_string(),
            exported_at: now_iso8601(),
            companion: WireCompanion {
                name: state.name.clone(),
                hunger: state.vitals.hunger(),
                happiness: state.vitals.happiness(),
                energy: state.vitals.energy(),
                experience: state.experience,
                temperament: state.temperament.base,
                temporary_trait: state.temperament.temporary.map(|t| WireTrait {
                    disposition: t.disposition,
                    expires_at: t.expires_at,
                }),
                cargo: state.inventory.items.clone(),
                active_mission: state.active_mission.as_ref().map(domain_mission_to_wire),
                last_sync: state.last_sync,
                journal: state
                    .journal
                    .iter()
                    .map(|e| WireJournalEntry {
                        at: e.at,
                        text: e.text.clone(),
                    })
                    .collect(),
                chat_turns: state.chat_turns,
                pulse: state.pulse.map(|p| WirePulse {
                    target: p.target,
                    attempts: p.attempts,
                }),
                born_at: state.born_at,
            },
        }
    }
}

fn wire_mission_to_domain(wire: WireMission) -> ActiveMission {
    ActiveMission {
        id: Uuid::parse_str(&wire.id).unwrap_or_else(|_| Uuid::new_v4()),
        destination: wire.destination,
        start_time: wire.start_time,
        duration_secs: wire.duration_secs,
        reward_range: RewardRange::new(wire.reward_min, wire.reward_max),
    }
}

fn domain_mission_to_wire(m: &ActiveMission) -> WireMission {
    WireMission {
        id: m.id.to_string(),
        destination: m.destination,
        start_time: m.start_time,
        duration_secs: m.duration_secs,
        reward_min: m.reward_range.min,
        reward_max: m.reward_range.max,
    }
}

/// Deserialize a JSON export into a companion.
pub fn import_json(json: &str) -> Result<CompanionState, serde_json::Error> {
    let wire: WireExport = serde_json::from_str(json)?;
    Ok(wire.into_state())
}

/// Serialize a companion to the JSON wire format.
pub fn export_json(state: &CompanionState) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&WireExport::from_state(state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mission::start_mission;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    fn busy_companion() -> CompanionState {
        let mut rng = SmallRng::seed_from_u64(42);
        let mut s = CompanionState::new("Nebula", 100.0, &mut rng);
        s.experience = 612.5;
        s.chat_turns = 7;
        s.pulse = Some(PulseRound {
            target: 3,
            attempts: 2,
        });
        s.temperament
            .set_temporary(Disposition::Caffeinated, 100.0, 1800.0);
        start_mission(&mut s, Destination::StellarNursery, 150.0).unwrap();
        s
    }

    #[test]
    fn test_roundtrip_preserves_state() {
        let original = busy_companion();
        let json = export_json(&original).unwrap();
        let restored = import_json(&json).unwrap();
        assert_eq!(restored, original);
    }

    #[test]
    fn test_wire_uses_camel_case_and_no_tier() {
        let json = export_json(&busy_companion()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let c = &value["companion"];
        assert_eq!(value["version"], CURRENT_VERSION);
        assert!(c.get("lastSync").is_some());
        assert!(c.get("activeMission").is_some());
        assert!(c.get("chatTurns").is_some());
        assert!(c.get("tier").is_none());
        assert!(c.get("mood").is_none());
    }

    #[test]
    fn test_import_accepts_legacy_xp_and_clamps() {
        let json = r#"{
            "version": "0.9",
            "companion": {
                "name": "Nebula",
                "hunger": 14.0,
                "happiness": -2.0,
                "energy": 6.0,
                "xp": 520,
                "tier": "Adult",
                "temperament": "Sweet",
                "lastSync": 1700000000.0
            }
        }"#;
        let s = import_json(json).unwrap();
        assert_eq!(s.experience, 520.0);
        assert_eq!(s.tier(), crate::economy::Tier::Teen);
        assert_eq!(s.vitals, Vitals::new(10.0, 0.0, 6.0));
        assert!(s.active_mission.is_none());
        assert!(s.inventory.is_empty());
    }

    #[test]
    fn test_negative_experience_is_floored() {
        let json = r#"{"version":"1.0","companion":{"name":"N","hunger":5,"happiness":5,
            "energy":5,"experience":-40,"temperament":"Chill","lastSync":0}}"#;
        assert_eq!(import_json(json).unwrap().experience, 0.0);
    }

    #[test]
    fn test_unreachable_pulse_is_dropped() {
        let doc = |target: u8| {
            format!(
                r#"{{"version":"1.0","companion":{{"name":"N","hunger":5,"happiness":5,
                "energy":5,"experience":0,"temperament":"Chill","lastSync":0,
                "pulse":{{"target":{target},"attempts":1}}}}}}"#
            )
        };
        assert!(import_json(&doc(0)).unwrap().pulse.is_none());
        assert!(import_json(&doc(11)).unwrap().pulse.is_none());
        let kept = import_json(&doc(10)).unwrap().pulse.unwrap();
        assert_eq!(kept.target, 10);
        assert_eq!(kept.attempts, 1);
    }

    #[test]
    fn test_garbage_is_an_error() {
        assert!(import_json("{\"version\": 1}").is_err());
        assert!(import_json("not json").is_err());
    }
}
