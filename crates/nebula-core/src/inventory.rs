//! Cargo bay: food items the companion can be fed.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::temperament::Disposition;
use crate::vitals::VitalsDelta;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Item {
    Apple,
    Berry,
    Coffee,
    MagicCookie,
    StarMote,
}

pub const ALL_ITEMS: [Item; 5] = [
    Item::Apple,
    Item::Berry,
    Item::Coffee,
    Item::MagicCookie,
    Item::StarMote,
];

impl Item {
    pub fn label(self) -> &'static str {
        match self {
            Self::Apple => "Apple",
            Self::Berry => "Berry",
            Self::Coffee => "Coffee",
            Self::MagicCookie => "Magic Cookie",
            Self::StarMote => "Star Mote",
        }
    }

    /// Vitals restored by eating this item.
    pub fn nourishment(self) -> VitalsDelta {
        let (hunger, happiness, energy) = match self {
            Self::Apple => (5.0, 0.0, 0.0),
            Self::Berry => (3.0, 1.0, 0.0),
            Self::Coffee => (1.0, 0.0, 4.0),
            Self::MagicCookie => (8.0, 2.0, 0.0),
            Self::StarMote => (0.0, 0.0, 8.0),
        };
        VitalsDelta {
            hunger,
            happiness,
            energy,
        }
    }

    /// Temporary trait triggered by eating this item, if any.
    pub fn after_effect(self) -> Option<Disposition> {
        match self {
            Self::Coffee => Some(Disposition::Caffeinated),
            Self::MagicCookie => Some(Disposition::SugarRush),
            _ => None,
        }
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Item {
    type Err = EngineError;

    /// Accepts the display label in any case, with spaces, dashes or underscores.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = normalize(s);
        ALL_ITEMS
            .into_iter()
            .find(|item| normalize(item.label()) == key)
            .ok_or_else(|| EngineError::UnknownItem(s.to_string()))
    }
}

pub(crate) fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    pub items: Vec<Item>,
}

impl Inventory {
    /// Starter cargo for a new companion.
    pub fn starter() -> Self {
        Self {
            items: vec![
                Item::Apple,
                Item::Apple,
                Item::Berry,
                Item::Berry,
                Item::Coffee,
            ],
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn contains(&self, item: Item) -> bool {
        self.items.contains(&item)
    }

    pub fn count(&self, item: Item) -> usize {
        self.items.iter().filter(|&&i| i == item).count()
    }

    /// Stow an item. Returns false (and drops it) when the bay is full.
    pub fn stow(&mut self, item: Item, capacity: usize) -> bool {
        if self.items.len() >= capacity {
            return false;
        }
        self.items.push(item);
        true
    }

    /// Remove one unit of `item`.
    pub fn take(&mut self, item: Item) -> Result<(), EngineError> {
        let idx = self
            .items
            .iter()
            .position(|&i| i == item)
            .ok_or(EngineError::ItemNotInCargo(item))?;
        self.items.remove(idx);
        Ok(())
    }
}
