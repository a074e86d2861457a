use std::collections::HashMap;

use crate::core::{
    utils::title_case,
    CartomancyType,
};

use super::Preset;

pub const SUIT_KEYS: [&str; 4] = ["wands", "cups", "swords", "pentacles"];
pub const DEFAULT_SUIT_NAMES: [&str; 4] = ["Wands", "Cups", "Swords", "Pentacles"];

pub const PIP_WORDS: [&str; 10] =
    ["ace", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten"];
pub const DEFAULT_COURTS: [&str; 4] = ["page", "knight", "queen", "king"];
pub const THOTH_COURTS: [&str; 4] = ["princess", "prince", "queen", "king"];

/// Major arcana in Rider-Waite-Smith numbering (Strength VIII, Justice XI).
pub const RWS_MAJORS: [&str; 22] = [
    "The Fool",
    "The Magician",
    "The High Priestess",
    "The Empress",
    "The Emperor",
    "The Hierophant",
    "The Lovers",
    "The Chariot",
    "Strength",
    "The Hermit",
    "Wheel of Fortune",
    "Justice",
    "The Hanged Man",
    "Death",
    "Temperance",
    "The Devil",
    "The Tower",
    "The Star",
    "The Moon",
    "The Sun",
    "Judgement",
    "The World",
];

/// Continental numbering used before the Golden Dawn swap (Justice VIII,
/// Strength XI).
pub const PRE_GOLDEN_DAWN_MAJORS: [&str; 22] = [
    "The Fool",
    "The Magician",
    "The High Priestess",
    "The Empress",
    "The Emperor",
    "The Hierophant",
    "The Lovers",
    "The Chariot",
    "Justice",
    "The Hermit",
    "Wheel of Fortune",
    "Strength",
    "The Hanged Man",
    "Death",
    "Temperance",
    "The Devil",
    "The Tower",
    "The Star",
    "The Moon",
    "The Sun",
    "Judgement",
    "The World",
];

pub const THOTH_MAJORS: [&str; 22] = [
    "The Fool",
    "The Magus",
    "The Priestess",
    "The Empress",
    "The Emperor",
    "The Hierophant",
    "The Lovers",
    "The Chariot",
    "Adjustment",
    "The Hermit",
    "Fortune",
    "Lust",
    "The Hanged Man",
    "Death",
    "Art",
    "The Devil",
    "The Tower",
    "The Star",
    "The Moon",
    "The Sun",
    "The Aeon",
    "The Universe",
];

pub const LENORMAND_CARDS: [&str; 36] = [
    "Rider", "Clover", "Ship", "House", "Tree", "Clouds", "Snake", "Coffin", "Bouquet", "Scythe",
    "Whip", "Birds", "Child", "Fox", "Bear", "Stars", "Stork", "Dog", "Tower", "Garden",
    "Mountain", "Crossroads", "Mice", "Heart", "Ring", "Book", "Letter", "Man", "Woman", "Lily",
    "Sun", "Moon", "Key", "Fish", "Anchor", "Cross",
];

pub const PLAYING_SUIT_KEYS: [&str; 4] = ["hearts", "diamonds", "clubs", "spades"];
pub const PLAYING_SUIT_NAMES: [&str; 4] = ["Hearts", "Diamonds", "Clubs", "Spades"];
pub const PLAYING_RANK_WORDS: [&str; 13] = [
    "ace", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten", "jack",
    "queen", "king",
];

/// Lowercase, separator-stripped form of a mapping key. Same rule the
/// resolver applies to filename stems before lookup.
pub fn normalize_key(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-' && *c != '.')
        .flat_map(|c| c.to_lowercase())
        .collect()
}

fn insert_name_keys(mappings: &mut HashMap<String, String>, name: &str) {
    let canonical = name.to_string();
    mappings.insert(normalize_key(name), canonical.clone());

    let lower = name.to_lowercase();
    if let Some(stripped) = lower.strip_prefix("the ") {
        mappings.insert(normalize_key(stripped), canonical);
    }
}

fn insert_numeric_keys(mappings: &mut HashMap<String, String>, number: usize, name: &str) {
    mappings.insert(format!("{:02}", number), name.to_string());
    mappings.insert(number.to_string(), name.to_string());
}

/// Build one tarot tradition's preset from its major ordering, suit display
/// names, and court titles. All four built-in tarot presets share this.
fn tarot_preset(
    majors: &[&str; 22],
    suit_names: &[&str; 4],
    courts: &[&str; 4],
    description: &str,
) -> Preset {
    let mut mappings = HashMap::new();

    for (i, major) in majors.iter().enumerate() {
        insert_numeric_keys(&mut mappings, i, major);
        insert_name_keys(&mut mappings, major);
    }

    for (si, suit_key) in SUIT_KEYS.iter().enumerate() {
        let display = suit_names[si];
        let letter = suit_key.chars().next().unwrap_or('x');

        let rank_words = PIP_WORDS.iter().chain(courts.iter());
        for (ri, word) in rank_words.enumerate() {
            let rank = ri + 1;
            let canonical = format!("{} of {}", title_case(word), display);

            mappings.insert(format!("{}{:02}", letter, rank), canonical.clone());
            mappings.insert(format!("{}{}", letter, rank), canonical.clone());
            mappings.insert(format!("{}{:02}", suit_key, rank), canonical.clone());
            mappings.insert(normalize_key(&format!("{} of {}", word, suit_key)), canonical.clone());
            mappings.insert(normalize_key(&canonical), canonical.clone());
        }
    }

    let suit_name_map = SUIT_KEYS
        .iter()
        .zip(suit_names.iter())
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    Preset {
        cartomancy_type: CartomancyType::Tarot,
        mappings,
        description: description.to_string(),
        suit_names: suit_name_map,
    }
}

fn lenormand_preset() -> Preset {
    let mut mappings = HashMap::new();
    for (i, name) in LENORMAND_CARDS.iter().enumerate() {
        insert_numeric_keys(&mut mappings, i + 1, name);
        insert_name_keys(&mut mappings, name);
    }

    Preset {
        cartomancy_type: CartomancyType::Lenormand,
        mappings,
        description: "Petit Lenormand, 36 cards numbered 1-36.".to_string(),
        suit_names: HashMap::new(),
    }
}

fn playing_cards_preset() -> Preset {
    let mut mappings = HashMap::new();
    for (si, suit_key) in PLAYING_SUIT_KEYS.iter().enumerate() {
        let display = PLAYING_SUIT_NAMES[si];
        let letter = suit_key.chars().next().unwrap_or('x');

        for (ri, word) in PLAYING_RANK_WORDS.iter().enumerate() {
            let rank = ri + 1;
            let canonical = format!("{} of {}", title_case(word), display);

            mappings.insert(format!("{}{:02}", letter, rank), canonical.clone());
            mappings.insert(format!("{}{}", letter, rank), canonical.clone());
            mappings.insert(format!("{}{:02}", suit_key, rank), canonical.clone());
            mappings.insert(normalize_key(&canonical), canonical.clone());
        }
    }
    mappings.insert("joker".to_string(), "Joker".to_string());

    let suit_name_map = PLAYING_SUIT_KEYS
        .iter()
        .zip(PLAYING_SUIT_NAMES.iter())
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    Preset {
        cartomancy_type: CartomancyType::PlayingCards,
        mappings,
        description: "Standard 52-card pack plus Joker.".to_string(),
        suit_names: suit_name_map,
    }
}

/// The immutable built-in catalogue, in display order. Custom presets may
/// shadow these by name but never mutate them.
pub fn builtin_presets() -> Vec<(String, Preset)> {
    vec![
        (
            "Tarot (RWS Ordering)".to_string(),
            tarot_preset(
                &RWS_MAJORS,
                &DEFAULT_SUIT_NAMES,
                &DEFAULT_COURTS,
                "Rider-Waite-Smith naming and numbering (Strength VIII, Justice XI).",
            ),
        ),
        (
            "Tarot (Pre-Golden Dawn Ordering)".to_string(),
            tarot_preset(
                &PRE_GOLDEN_DAWN_MAJORS,
                &DEFAULT_SUIT_NAMES,
                &DEFAULT_COURTS,
                "Traditional continental numbering (Justice VIII, Strength XI).",
            ),
        ),
        (
            "Tarot (Thoth)".to_string(),
            tarot_preset(
                &THOTH_MAJORS,
                &["Wands", "Cups", "Swords", "Disks"],
                &THOTH_COURTS,
                "Crowley-Harris Thoth naming: Disks, Princess/Prince courts, renamed trumps.",
            ),
        ),
        (
            "Tarot (Marseille)".to_string(),
            tarot_preset(
                &PRE_GOLDEN_DAWN_MAJORS,
                &["Batons", "Cups", "Swords", "Coins"],
                &DEFAULT_COURTS,
                "Tarot de Marseille suits (Batons, Coins) with continental trump numbering.",
            ),
        ),
        ("Lenormand".to_string(), lenormand_preset()),
        ("Playing Cards".to_string(), playing_cards_preset()),
    ]
}
