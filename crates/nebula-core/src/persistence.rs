//! Persistence boundary and the scoped session around it.
//!
//! The engine never performs I/O itself. A [`Session`] loads a companion
//! through a [`Persistence`] backend, applies operations to it, and
//! writes it back after every operation, including failed ones.

use std::collections::HashMap;
use std::fmt;

use crate::error::EngineError;
use crate::state::CompanionState;

/// Failure reported by a persistence backend.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistenceError {
    pub message: String,
}

impl PersistenceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "persistence error: {}", self.message)
    }
}

impl std::error::Error for PersistenceError {}

pub trait Persistence {
    /// `Ok(None)` when no companion is stored under `id`.
    fn load(&mut self, id: &str) -> Result<Option<CompanionState>, PersistenceError>;
    fn save(&mut self, id: &str, state: &CompanionState) -> Result<(), PersistenceError>;
}

impl<P: Persistence + ?Sized> Persistence for &mut P {
    fn load(&mut self, id: &str) -> Result<Option<CompanionState>, PersistenceError> {
        (**self).load(id)
    }

    fn save(&mut self, id: &str, state: &CompanionState) -> Result<(), PersistenceError> {
        (**self).save(id, state)
    }
}

/// In-process backend, used by tests and as a scratch store.
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    companions: HashMap<String, CompanionState>,
    saves: usize,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&CompanionState> {
        self.companions.get(id)
    }

    /// Number of successful saves so far.
    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl Persistence for MemoryPersistence {
    fn load(&mut self, id: &str) -> Result<Option<CompanionState>, PersistenceError> {
        Ok(self.companions.get(id).cloned())
    }

    fn save(&mut self, id: &str, state: &CompanionState) -> Result<(), PersistenceError> {
        self.companions.insert(id.to_string(), state.clone());
        self.saves += 1;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionError {
    /// The operation was rejected; state was restored and still flushed.
    Engine(EngineError),
    /// The operation succeeded in memory but could not be saved.
    Persistence(PersistenceError),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::Engine(e) => write!(f, "{e}"),
            SessionError::Persistence(e) => write!(f, "{e}"),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::Engine(e) => Some(e),
            SessionError::Persistence(e) => Some(e),
        }
    }
}

impl From<EngineError> for SessionError {
    fn from(e: EngineError) -> Self {
        SessionError::Engine(e)
    }
}

impl From<PersistenceError> for SessionError {
    fn from(e: PersistenceError) -> Self {
        SessionError::Persistence(e)
    }
}

/// One companion checked out of a backend.
pub struct Session<P: Persistence> {
    backend: P,
    id: String,
    state: CompanionState,
    created: bool,
}

impl<P: Persistence> Session<P> {
    /// Load `id`, or build a new companion with `init` if none is stored.
    pub fn open(
        mut backend: P,
        id: &str,
        init: impl FnOnce() -> CompanionState,
    ) -> Result<Self, PersistenceError> {
        let loaded = backend.load(id)?;
        let created = loaded.is_none();
        Ok(Self {
            backend,
            id: id.to_string(),
            state: loaded.unwrap_or_else(init),
            created,
        })
    }

    pub fn state(&self) -> &CompanionState {
        &self.state
    }

    /// True when `open` found nothing stored and initialised a companion.
    pub fn is_new(&self) -> bool {
        self.created
    }

    /// Run one operation atomically and flush.
    ///
    /// A failed operation rolls the state back to what it was before the
    /// call. The flush happens either way; when the operation fails, its
    /// error is reported in preference to a flush failure.
    pub fn apply<T>(
        &mut self,
        op: impl FnOnce(&mut CompanionState) -> Result<T, EngineError>,
    ) -> Result<T, SessionError> {
        let snapshot = self.state.clone();
        let result = op(&mut self.state);
        if result.is_err() {
            self.state = snapshot;
        }
        let flushed = self.flush();
        match (result, flushed) {
            (Err(e), _) => Err(SessionError::Engine(e)),
            (Ok(_), Err(e)) => Err(SessionError::Persistence(e)),
            (Ok(value), Ok(())) => Ok(value),
        }
    }

    pub fn flush(&mut self) -> Result<(), PersistenceError> {
        self.backend.save(&self.id, &self.state)?;
        self.created = false;
        Ok(())
    }
}
