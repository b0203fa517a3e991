use std::fs;
use std::path::Path;

use nebula_core::{CompanionState, export_json, import_json};

use crate::error::{Result, StoreError};
use crate::store::Store;

impl Store {
    /// Import a JSON export file as companion `id`, replacing what is stored.
    /// Legacy `xp` keys are accepted through the nebula-core serde alias.
    pub fn import_json_file(&self, id: &str, path: &Path) -> Result<CompanionState> {
        let json = fs::read_to_string(path).map_err(|e| {
            StoreError::InvalidData(format!("failed to read {}: {e}", path.display()))
        })?;
        self.import_json_str(id, &json)
    }

    pub fn import_json_str(&self, id: &str, json: &str) -> Result<CompanionState> {
        let state =
            import_json(json).map_err(|e| StoreError::InvalidData(format!("invalid JSON: {e}")))?;
        self.save_companion(id, &state)?;
        tracing::info!(companion = id, "imported companion");
        Ok(state)
    }

    pub fn export_json_file(&self, id: &str, path: &Path) -> Result<()> {
        let json = self.export_json_string(id)?;
        fs::write(path, json).map_err(|e| {
            StoreError::InvalidData(format!("failed to write {}: {e}", path.display()))
        })
    }

    pub fn export_json_string(&self, id: &str) -> Result<String> {
        let state = self
            .load_companion(id)?
            .ok_or_else(|| StoreError::InvalidData(format!("no companion named '{id}'")))?;
        export_json(&state).map_err(|e| StoreError::InvalidData(format!("JSON export failed: {e}")))
    }
}
