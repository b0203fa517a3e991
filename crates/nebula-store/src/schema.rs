use rusqlite::Connection;

use crate::error::Result;

pub const SCHEMA_VERSION: i64 = 2;

pub fn initialize(conn: &Connection) -> Result<()> {
    conn.execute_batch("PRAGMA journal_mode = WAL;")?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.pragma_update(None, "busy_timeout", 5000)?;

    // Tier and mood are derived values and deliberately have no column.
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS metadata (
            key   TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS companions (
            id              TEXT PRIMARY KEY,
            name            TEXT NOT NULL,
            hunger          REAL NOT NULL,
            happiness       REAL NOT NULL,
            energy          REAL NOT NULL,
            experience      REAL NOT NULL DEFAULT 0,
            base_trait      TEXT NOT NULL,
            temp_trait      TEXT,
            temp_expires_at REAL,
            last_sync       REAL NOT NULL,
            chat_turns      INTEGER NOT NULL DEFAULT 0,
            born_at         REAL NOT NULL DEFAULT 0,
            updated_at      TEXT NOT NULL DEFAULT ''
        );

        CREATE TABLE IF NOT EXISTS missions (
            companion_id  TEXT PRIMARY KEY REFERENCES companions(id) ON DELETE CASCADE,
            id            TEXT NOT NULL,
            destination   TEXT NOT NULL,
            start_time    REAL NOT NULL,
            duration_secs REAL NOT NULL,
            reward_min    INTEGER NOT NULL,
            reward_max    INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS cargo (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            companion_id TEXT NOT NULL REFERENCES companions(id) ON DELETE CASCADE,
            item         TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS journal (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            companion_id TEXT NOT NULL REFERENCES companions(id) ON DELETE CASCADE,
            at           REAL NOT NULL,
            text         TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_cargo_companion ON cargo(companion_id);
        CREATE INDEX IF NOT EXISTS idx_journal_companion ON journal(companion_id);
        ",
    )?;

    // v1 databases predate Number Pulse
    for column in ["pulse_target", "pulse_attempts"] {
        if conn
            .prepare(&format!("SELECT {column} FROM companions LIMIT 0"))
            .is_err()
        {
            conn.execute_batch(&format!(
                "ALTER TABLE companions ADD COLUMN {column} INTEGER;"
            ))?;
            tracing::info!("added companions.{column}");
        }
    }

    conn.execute(
        "INSERT OR REPLACE INTO metadata (key, value) VALUES ('schema_version', ?1)",
        [SCHEMA_VERSION.to_string()],
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(conn: &Connection, table: &str) -> Vec<String> {
        let mut stmt = conn
            .prepare(&format!("PRAGMA table_info({table})"))
            .unwrap();
        stmt.query_map([], |row| row.get::<_, String>(1))
            .unwrap()
            .collect::<std::result::Result<_, _>>()
            .unwrap()
    }

    #[test]
    fn test_initialize_creates_tables() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        for table in &["metadata", "companions", "missions", "cargo", "journal"] {
            let count: i64 = conn
                .query_row(&format!("SELECT count(*) FROM {table}"), [], |row| {
                    row.get(0)
                })
                .unwrap();
            assert!(count >= 0, "table {table} should exist");
        }
    }

    #[test]
    fn test_no_tier_column() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let cols = columns(&conn, "companions");
        assert!(cols.contains(&"experience".to_string()));
        assert!(!cols.iter().any(|c| c == "tier" || c == "mood"));
    }

    #[test]
    fn test_idempotent_initialize() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        initialize(&conn).unwrap();
    }

    #[test]
    fn test_busy_timeout_set() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        let timeout: i64 = conn
            .query_row("PRAGMA busy_timeout", [], |row| row.get(0))
            .unwrap();
        assert_eq!(timeout, 5000);
    }

    #[test]
    fn test_migrates_v1_companions() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE companions (
                id TEXT PRIMARY KEY, name TEXT NOT NULL,
                hunger REAL NOT NULL, happiness REAL NOT NULL, energy REAL NOT NULL,
                experience REAL NOT NULL DEFAULT 0, base_trait TEXT NOT NULL,
                temp_trait TEXT, temp_expires_at REAL, last_sync REAL NOT NULL,
                chat_turns INTEGER NOT NULL DEFAULT 0, born_at REAL NOT NULL DEFAULT 0,
                updated_at TEXT NOT NULL DEFAULT ''
            );
            INSERT INTO companions (id, name, hunger, happiness, energy, base_trait, last_sync)
            VALUES ('nebula', 'Nebula', 5, 5, 5, 'Chill', 0);",
        )
        .unwrap();

        initialize(&conn).unwrap();
        let cols = columns(&conn, "companions");
        assert!(cols.contains(&"pulse_target".to_string()));
        assert!(cols.contains(&"pulse_attempts".to_string()));

        let name: String = conn
            .query_row("SELECT name FROM companions WHERE id = 'nebula'", [], |r| r.get(0))
            .unwrap();
        assert_eq!(name, "Nebula");
    }
}
