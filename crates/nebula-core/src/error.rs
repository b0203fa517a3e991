use std::fmt;

use crate::inventory::Item;

/// Rejected engine operation. The companion state is left untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    /// The operation is not valid from the current lifecycle state.
    InvalidTransition(&'static str),
    UnknownDestination(String),
    InsufficientEnergy { required: f64, available: f64 },
    ItemNotInCargo(Item),
    UnknownItem(String),
    UnknownSignal(String),
    UnknownTrait(String),
    InvalidGuess(u8),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::InvalidTransition(msg) => write!(f, "invalid transition: {msg}"),
            EngineError::UnknownDestination(name) => write!(f, "unknown destination: {name}"),
            EngineError::InsufficientEnergy {
                required,
                available,
            } => write!(
                f,
                "not enough energy: launch needs {required:.1}, companion has {available:.1}"
            ),
            EngineError::ItemNotInCargo(item) => write!(f, "no {item} in cargo"),
            EngineError::UnknownItem(name) => write!(f, "unknown item: {name}"),
            EngineError::UnknownSignal(name) => write!(f, "unknown signal: {name}"),
            EngineError::UnknownTrait(name) => write!(f, "unknown trait: {name}"),
            EngineError::InvalidGuess(guess) => write!(f, "guess {guess} is outside 1-10"),
        }
    }
}

impl std::error::Error for EngineError {}

pub type Result<T> = std::result::Result<T, EngineError>;
