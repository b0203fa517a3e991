use std::path::Path;

use rusqlite::{Connection, OptionalExtension, params};
use uuid::Uuid;

use nebula_core::arcade::PulseRound;
use nebula_core::economy::RewardRange;
use nebula_core::temperament::TemporaryTrait;
use nebula_core::time::now_iso8601;
use nebula_core::{
    ActiveMission, CompanionState, Destination, Disposition, Inventory, Item, JournalEntry,
    Persistence, PersistenceError, Temperament, Vitals,
};

use crate::error::{Result, StoreError};
use crate::schema;

pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        schema::initialize(&conn)?;
        let store = Self { conn };
        tracing::debug!(
            path = %path.display(),
            schema_version = ?store.schema_version()?,
            "opened store"
        );
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::initialize(&conn)?;
        Ok(Self { conn })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    // --- Metadata ---

    fn metadata(&self, key: &str) -> Result<Option<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT value FROM metadata WHERE key = ?1")?;
        let result = stmt.query_row([key], |row| row.get(0)).optional()?;
        Ok(result)
    }

    /// Schema version recorded by the last `initialize`.
    pub fn schema_version(&self) -> Result<Option<i64>> {
        self.metadata("schema_version")?
            .map(|v| {
                v.parse::<i64>()
                    .map_err(|e| StoreError::InvalidData(format!("schema_version '{v}': {e}")))
            })
            .transpose()
    }

    // --- Save ---

    /// Write the whole companion in one transaction, replacing any
    /// previous rows for `id`.
    pub fn save_companion(&self, id: &str, state: &CompanionState) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;

        let temp = state.temperament.temporary;
        let pulse = state.pulse;
        tx.execute(
            "INSERT INTO companions (id, name, hunger, happiness, energy, experience,
                 base_trait, temp_trait, temp_expires_at, last_sync, chat_turns,
                 pulse_target, pulse_attempts, born_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
             ON CONFLICT(id) DO UPDATE SET
                 name = excluded.name, hunger = excluded.hunger,
                 happiness = excluded.happiness, energy = excluded.energy,
                 experience = excluded.experience, base_trait = excluded.base_trait,
                 temp_trait = excluded.temp_trait, temp_expires_at = excluded.temp_expires_at,
                 last_sync = excluded.last_sync, chat_turns = excluded.chat_turns,
                 pulse_target = excluded.pulse_target, pulse_attempts = excluded.pulse_attempts,
                 born_at = excluded.born_at, updated_at = excluded.updated_at",
            params![
                id,
                state.name,
                state.vitals.hunger(),
                state.vitals.happiness(),
                state.vitals.energy(),
                state.experience,
                state.temperament.base.label(),
                temp.map(|t| t.disposition.label()),
                temp.map(|t| t.expires_at),
                state.last_sync,
                state.chat_turns as i64,
                pulse.map(|p| p.target),
                pulse.map(|p| p.attempts),
                state.born_at,
                now_iso8601(),
            ],
        )?;

        tx.execute("DELETE FROM missions WHERE companion_id = ?1", [id])?;
        if let Some(m) = &state.active_mission {
            tx.execute(
                "INSERT INTO missions (companion_id, id, destination, start_time, duration_secs,
                     reward_min, reward_max)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    id,
                    m.id.to_string(),
                    m.destination.name(),
                    m.start_time,
                    m.duration_secs,
                    m.reward_range.min,
                    m.reward_range.max,
                ],
            )?;
        }

        tx.execute("DELETE FROM cargo WHERE companion_id = ?1", [id])?;
        {
            let mut insert =
                tx.prepare("INSERT INTO cargo (companion_id, item) VALUES (?1, ?2)")?;
            for item in &state.inventory.items {
                insert.execute(params![id, item.label()])?;
            }
        }

        tx.execute("DELETE FROM journal WHERE companion_id = ?1", [id])?;
        {
            let mut insert =
                tx.prepare("INSERT INTO journal (companion_id, at, text) VALUES (?1, ?2, ?3)")?;
            for entry in &state.journal {
                insert.execute(params![id, entry.at, entry.text])?;
            }
        }

        tx.commit()?;
        tracing::debug!(companion = id, "saved companion");
        Ok(())
    }

    // --- Load ---

    pub fn load_companion(&self, id: &str) -> Result<Option<CompanionState>> {
        let row = self
            .conn
            .query_row(
                "SELECT name, hunger, happiness, energy, experience, base_trait, temp_trait,
                        temp_expires_at, last_sync, chat_turns, pulse_target, pulse_attempts,
                        born_at
                 FROM companions WHERE id = ?1",
                [id],
                |row| {
                    Ok(CompanionRow {
                        name: row.get(0)?,
                        hunger: row.get(1)?,
                        happiness: row.get(2)?,
                        energy: row.get(3)?,
                        experience: row.get(4)?,
                        base_trait: row.get(5)?,
                        temp_trait: row.get(6)?,
                        temp_expires_at: row.get(7)?,
                        last_sync: row.get(8)?,
                        chat_turns: row.get(9)?,
                        pulse_target: row.get(10)?,
                        pulse_attempts: row.get(11)?,
                        born_at: row.get(12)?,
                    })
                },
            )
            .optional()?;
        let Some(row) = row else {
            return Ok(None);
        };

        let temporary = match (row.temp_trait, row.temp_expires_at) {
            (Some(label), Some(expires_at)) => Some(TemporaryTrait {
                disposition: parse_label::<Disposition>(&label)?,
                expires_at,
            }),
            _ => None,
        };
        let pulse = match (row.pulse_target, row.pulse_attempts) {
            (Some(target), Some(attempts)) => Some(PulseRound { target, attempts }),
            _ => None,
        };

        Ok(Some(CompanionState {
            name: row.name,
            vitals: Vitals::new(row.hunger, row.happiness, row.energy),
            experience: row.experience.max(0.0),
            temperament: Temperament {
                base: parse_label(&row.base_trait)?,
                temporary,
            },
            inventory: Inventory {
                items: self.load_cargo(id)?,
            },
            active_mission: self.load_mission(id)?,
            last_sync: row.last_sync,
            journal: self.load_journal(id)?,
            chat_turns: u64::try_from(row.chat_turns).unwrap_or(0),
            pulse,
            born_at: row.born_at,
        }))
    }

    fn load_mission(&self, id: &str) -> Result<Option<ActiveMission>> {
        let row = self
            .conn
            .query_row(
                "SELECT id, destination, start_time, duration_secs, reward_min, reward_max
                 FROM missions WHERE companion_id = ?1",
                [id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, f64>(2)?,
                        row.get::<_, f64>(3)?,
                        row.get::<_, u32>(4)?,
                        row.get::<_, u32>(5)?,
                    ))
                },
            )
            .optional()?;

        row.map(|(mission_id, dest, start_time, duration_secs, min, max)| {
            Ok(ActiveMission {
                id: parse_uuid(&mission_id)?,
                destination: parse_label::<Destination>(&dest)?,
                start_time,
                duration_secs,
                reward_range: RewardRange::new(min, max),
            })
        })
        .transpose()
    }

    fn load_cargo(&self, id: &str) -> Result<Vec<Item>> {
        let mut stmt = self
            .conn
            .prepare("SELECT item FROM cargo WHERE companion_id = ?1 ORDER BY id")?;
        let labels: Vec<String> = stmt
            .query_map([id], |row| row.get(0))?
            .collect::<std::result::Result<_, _>>()?;
        labels.iter().map(|l| parse_label(l)).collect()
    }

    fn load_journal(&self, id: &str) -> Result<Vec<JournalEntry>> {
        let mut stmt = self
            .conn
            .prepare("SELECT at, text FROM journal WHERE companion_id = ?1 ORDER BY id")?;
        let entries = stmt
            .query_map([id], |row| {
                Ok(JournalEntry {
                    at: row.get(0)?,
                    text: row.get(1)?,
                })
            })?
            .collect::<std::result::Result<_, _>>()?;
        Ok(entries)
    }

    pub fn list_companions(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT id FROM companions ORDER BY id")?;
        let ids = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<_, _>>()?;
        Ok(ids)
    }

    /// Remove a companion and everything attached to it.
    pub fn delete_companion(&self, id: &str) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM companions WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }
}

impl Persistence for Store {
    fn load(&mut self, id: &str) -> std::result::Result<Option<CompanionState>, PersistenceError> {
        Ok(self.load_companion(id)?)
    }

    fn save(&mut self, id: &str, state: &CompanionState) -> std::result::Result<(), PersistenceError> {
        Ok(self.save_companion(id, state)?)
    }
}

struct CompanionRow {
    name: String,
    hunger: f64,
    happiness: f64,
    energy: f64,
    experience: f64,
    base_trait: String,
    temp_trait: Option<String>,
    temp_expires_at: Option<f64>,
    last_sync: f64,
    chat_turns: i64,
    pulse_target: Option<u8>,
    pulse_attempts: Option<u32>,
    born_at: f64,
}

fn parse_uuid(s: &str) -> Result<Uuid> {
    Uuid::parse_str(s).map_err(|e| StoreError::InvalidData(format!("invalid UUID '{s}': {e}")))
}

fn parse_label<T>(s: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    s.parse::<T>()
        .map_err(|e| StoreError::InvalidData(e.to_string()))
}
