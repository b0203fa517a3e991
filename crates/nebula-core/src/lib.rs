//! Nebula companion state engine.
//!
//! A virtual companion with bounded vitals (hunger, happiness, energy),
//! an experience economy with evolution tiers, timed expeditions and a
//! deterministic mood mapper. Vitals move only when an explicit action
//! opens the sync gate; time effects are evaluated lazily from the clock
//! value each operation is handed.
//!
//! Zero I/O. Persistence sits behind the [`Persistence`] trait.

pub mod arcade;
pub mod config;
pub mod constants;
pub mod economy;
pub mod engine;
pub mod error;
pub mod hooks;
pub mod inventory;
pub mod mission;
pub mod mood;
pub mod persistence;
pub mod snapshot;
pub mod state;
pub mod temperament;
pub mod time;
pub mod trigger;
pub mod vitals;

pub use arcade::{PulseResult, Signal};
pub use config::{ConfigError, EngineConfig, VitalsConfig};
pub use constants::{ADULT_THRESHOLD, AWARD_MAX, AWARD_MIN, TEEN_THRESHOLD, VITAL_MAX, VITAL_MIN};
pub use economy::{Activity, AwardReport, GameOutcome, Tier, TierTransition};
pub use engine::{ChatReport, Engine, FeedReport, GameReport, Outcome, PulseReport, Status};
pub use error::EngineError;
pub use hooks::NarrativeHook;
pub use inventory::{Inventory, Item};
pub use mission::{ActiveMission, Destination, MissionCheck, MissionReport, MissionStatus};
pub use mood::{Avatar, Mood, MoodBucket, Presentation};
pub use persistence::{MemoryPersistence, Persistence, PersistenceError, Session, SessionError};
pub use snapshot::{CURRENT_VERSION, export_json, import_json};
pub use state::{CompanionState, JournalEntry};
pub use temperament::{Disposition, Temperament};
pub use time::{Clock, ManualClock, SystemClock};
pub use trigger::{Interaction, PassiveSource, TriggerKind, should_sync};
pub use vitals::{Vitals, VitalsDelta, VitalsReport};
