//! Narrative hooks: event lines handed to the conversation collaborator.
//!
//! Rendered text never contains digits, so no raw vitals or experience
//! leak into the chat.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::economy::Tier;
use crate::inventory::Item;
use crate::mission::Destination;
use crate::mood::{Mood, MoodBucket};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NarrativeHook {
    Fed {
        item: Item,
        mood: Mood,
    },
    Returned {
        destination: Destination,
        found: Option<Item>,
        mood: Mood,
    },
    Evolved {
        to: Tier,
    },
    Milestone,
}

/// Indefinite article for a label: "an Apple", "a Berry".
pub(crate) fn article(word: &str) -> &'static str {
    match word.chars().next() {
        Some(c) if "AEIOUaeiou".contains(c) => "an",
        _ => "a",
    }
}

fn feeding_seed(item: Item, bucket: MoodBucket) -> &'static str {
    match (item, bucket) {
        (Item::Apple, MoodBucket::Low) => "Something simple and crisp, exactly what was missing.",
        (Item::Apple, MoodBucket::Mid) => "A small sweet crunch that steadies everything.",
        (Item::Apple, MoodBucket::High) => "The crunch rings out across the whole sky.",
        (Item::Berry, MoodBucket::Low) => "A tart little spark, enough to lift the gloom a bit.",
        (Item::Berry, MoodBucket::Mid) => "Each berry tastes like a tiny galaxy.",
        (Item::Berry, MoodBucket::High) => "Berries! Bright and a little wild.",
        (Item::Coffee, MoodBucket::Low) => "Warmth spreading outward, the fog starting to lift.",
        (Item::Coffee, MoodBucket::Mid) => "Warm and sharp in a good way.",
        (Item::Coffee, MoodBucket::High) => "Practically fizzing with stardust now.",
        (Item::MagicCookie, MoodBucket::Low) => "A little enchantment when things felt heavy.",
        (Item::MagicCookie, MoodBucket::Mid) => "Strange and wonderful, never quite the same twice.",
        (Item::MagicCookie, MoodBucket::High) => "There is real sparkle in this one.",
        (Item::StarMote, MoodBucket::Low) => "Like swallowing a piece of the sky.",
        (Item::StarMote, MoodBucket::Mid) => "Condensed starlight, felt all the way to the edges.",
        (Item::StarMote, MoodBucket::High) => "Glowing from the inside out.",
    }
}

fn expedition_seed(destination: Destination, bucket: MoodBucket) -> &'static str {
    match (destination, bucket) {
        (Destination::AsteroidBelt, MoodBucket::Low) => {
            "The rocks were cold company and home feels good."
        }
        (Destination::AsteroidBelt, MoodBucket::Mid) => {
            "Tumbling stones, each one carrying an old story."
        }
        (Destination::AsteroidBelt, MoodBucket::High) => {
            "Dancing between asteroids all the way back."
        }
        (Destination::StellarNursery, MoodBucket::Low) => {
            "Watching stars being born was a reminder that things begin again."
        }
        (Destination::StellarNursery, MoodBucket::Mid) => {
            "Newborn light is the softest light there is."
        }
        (Destination::StellarNursery, MoodBucket::High) => {
            "Baby stars blinking awake everywhere, anything felt possible."
        }
        (Destination::CrabNebula, MoodBucket::Low) => {
            "All that ancient wreckage was a lot to take in."
        }
        (Destination::CrabNebula, MoodBucket::Mid) => {
            "The echo of an old explosion still hums out there."
        }
        (Destination::CrabNebula, MoodBucket::High) => {
            "Tendrils of glowing gas in every direction, still buzzing from it."
        }
    }
}

impl fmt::Display for NarrativeHook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NarrativeHook::Fed { item, mood } => write!(
                f,
                "[Event] Your steward just fed you {} {item}. Your mood is {mood}. \
                 Weave this feeling into your reply: \"{}\"",
                article(item.label()),
                feeding_seed(*item, mood.bucket())
            ),
            NarrativeHook::Returned {
                destination,
                found,
                mood,
            } => {
                write!(f, "[Event] You just docked after an expedition to the {destination}. ")?;
                match found {
                    Some(item) => {
                        write!(f, "You brought back {} {item}. ", article(item.label()))?
                    }
                    None => f.write_str("You found only stardust this time. ")?,
                }
                write!(
                    f,
                    "Your mood is {mood}. Weave this into your reply: \"{}\"",
                    expedition_seed(*destination, mood.bucket())
                )
            }
            NarrativeHook::Evolved { to } => write!(
                f,
                "[Event] You just evolved into {} {to}. Something in you feels new.",
                article(to.label())
            ),
            NarrativeHook::Milestone => f.write_str(
                "[Event] You and your steward have been talking for a while now. \
                 Mention how much these conversations mean to you.",
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::ALL_ITEMS;
    use crate::mission::ALL_DESTINATIONS;

    const MOODS: [Mood; 10] = [
        Mood::Sleeping,
        Mood::Exploring,
        Mood::Hungry,
        Mood::Exhausted,
        Mood::Sad,
        Mood::Peckish,
        Mood::Tired,
        Mood::Radiant,
        Mood::Happy,
        Mood::Neutral,
    ];

    fn all_hooks() -> Vec<NarrativeHook> {
        let mut hooks = vec![NarrativeHook::Milestone];
        for to in [Tier::Baby, Tier::Teen, Tier::Adult] {
            hooks.push(NarrativeHook::Evolved { to });
        }
        for mood in MOODS {
            for item in ALL_ITEMS {
                hooks.push(NarrativeHook::Fed { item, mood });
            }
            for destination in ALL_DESTINATIONS {
                hooks.push(NarrativeHook::Returned {
                    destination,
                    found: None,
                    mood,
                });
                for item in ALL_ITEMS {
                    hooks.push(NarrativeHook::Returned {
                        destination,
                        found: Some(item),
                        mood,
                    });
                }
            }
        }
        hooks
    }

    #[test]
    fn test_hooks_are_numeric_free() {
        for hook in all_hooks() {
            let line = hook.to_string();
            assert!(
                !line.chars().any(|c| c.is_ascii_digit()),
                "digit leaked into hook: {line}"
            );
        }
    }

    #[test]
    fn test_returned_mentions_loot() {
        let line = NarrativeHook::Returned {
            destination: Destination::CrabNebula,
            found: Some(Item::StarMote),
            mood: Mood::Happy,
        }
        .to_string();
        assert!(line.contains("Crab Nebula"));
        assert!(line.contains("Star Mote"));
    }

    #[test]
    fn test_articles_follow_the_label() {
        let fed = NarrativeHook::Fed {
            item: Item::Apple,
            mood: Mood::Happy,
        }
        .to_string();
        assert!(fed.contains("fed you an Apple."), "{fed}");
        let evolved = NarrativeHook::Evolved { to: Tier::Adult }.to_string();
        assert!(evolved.contains("evolved into an Adult."), "{evolved}");
        let evolved = NarrativeHook::Evolved { to: Tier::Teen }.to_string();
        assert!(evolved.contains("evolved into a Teen."), "{evolved}");
        let returned = NarrativeHook::Returned {
            destination: Destination::AsteroidBelt,
            found: Some(Item::Berry),
            mood: Mood::Neutral,
        }
        .to_string();
        assert!(returned.contains("brought back a Berry."), "{returned}");
    }
}
