use std::{
    collections::HashMap,
    path::Path,
    sync::OnceLock,
};

use regex::Regex;

use crate::core::{
    utils::title_case,
    CardMetadata,
    CartomancyType,
};

use super::{
    builtin::{
        normalize_key,
        DEFAULT_SUIT_NAMES,
        LENORMAND_CARDS,
        PIP_WORDS,
        PLAYING_SUIT_NAMES,
        RWS_MAJORS,
        SUIT_KEYS,
    },
    Preset,
};

pub const UNKNOWN_SORT_ORDER: i64 = 999;
const SUIT_ONLY_OFFSET: i64 = 50;

/// One major arcana slot: its fixed sort position and the RWS name other
/// traditions' trumps link back to.
#[derive(Debug, Clone, Copy)]
struct MajorEntry {
    position: i64,
    archetype: &'static str,
}

/// Sort positions for major arcana names, case- and article-insensitive.
/// RWS numbering is the fixed reference; Thoth trump names are aliased in so
/// Thoth decks still land on 0-21. Note that Thoth swaps VIII/XI relative to
/// RWS, so Adjustment sorts at 8 but links to Justice, and Lust sorts at 11
/// but links to Strength.
fn major_table() -> &'static HashMap<String, MajorEntry> {
    static TABLE: OnceLock<HashMap<String, MajorEntry>> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut table = HashMap::new();
        for (i, name) in RWS_MAJORS.iter().enumerate() {
            insert_major(&mut table, name, i as i64, name);
        }
        for (name, position, archetype) in [
            ("The Magus", 1, "The Magician"),
            ("The Priestess", 2, "The High Priestess"),
            ("Adjustment", 8, "Justice"),
            ("Fortune", 10, "Wheel of Fortune"),
            ("Lust", 11, "Strength"),
            ("Art", 14, "Temperance"),
            ("The Aeon", 20, "Judgement"),
            ("Judgment", 20, "Judgement"),
            ("The Universe", 21, "The World"),
        ] {
            insert_major(&mut table, name, position, archetype);
        }
        table
    })
}

fn insert_major(
    table: &mut HashMap<String, MajorEntry>,
    name: &str,
    position: i64,
    archetype: &'static str,
) {
    let entry = MajorEntry { position, archetype };
    let lower = name.to_lowercase();
    table.insert(lower.clone(), entry);
    if let Some(stripped) = lower.strip_prefix("the ") {
        table.insert(stripped.to_string(), entry);
    }
}

fn major_entry(card_name: &str) -> Option<MajorEntry> {
    let lower = card_name.trim().to_lowercase();
    major_table().get(&lower).copied()
}

fn major_position(card_name: &str) -> Option<i64> {
    major_entry(card_name).map(|entry| entry.position)
}

fn trailing_number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+)\D*$").unwrap())
}

fn file_stem(filename: &str) -> &str {
    Path::new(filename).file_stem().and_then(|s| s.to_str()).unwrap_or(filename)
}

/// Last-resort display name when no mapping matches: separators become
/// spaces, words get title-cased. Never empty for a non-empty stem.
pub fn clean_filename(stem: &str) -> String {
    let spaced: String =
        stem.chars().map(|c| if c == '_' || c == '-' || c == '.' { ' ' } else { c }).collect();
    let cleaned = title_case(&spaced);
    if cleaned.is_empty() {
        title_case(stem)
    } else {
        cleaned
    }
}

/// Resolve a filename to a canonical card name. First match wins:
/// normalized stem, raw lowercased stem, trailing digit run, then the
/// cleaned-filename fallback. Total: always yields a displayable name.
pub fn map_filename_to_card(
    filename: &str,
    preset: Option<&Preset>,
    custom_suit_names: Option<&HashMap<String, String>>,
) -> String {
    let stem = file_stem(filename);

    let mut resolved: Option<String> = None;

    if let Some(preset) = preset {
        let normalized = normalize_key(stem);
        if let Some(name) = preset.mappings.get(&normalized) {
            resolved = Some(name.clone());
        }

        if resolved.is_none() {
            if let Some(name) = preset.mappings.get(&stem.to_lowercase()) {
                resolved = Some(name.clone());
            }
        }

        if resolved.is_none() {
            if let Some(captures) = trailing_number_re().captures(stem) {
                if let Some(number) = captures.get(1) {
                    if let Some(name) = preset.mappings.get(number.as_str()) {
                        resolved = Some(name.clone());
                    }
                }
            }
        }
    }

    let name = resolved.unwrap_or_else(|| clean_filename(stem));

    match custom_suit_names {
        Some(custom) => substitute_suit_name(&name, custom),
        None => name,
    }
}

/// Replace the `"of {DefaultSuit}"` segment with a custom display name.
/// First matching default suit wins; at most one substitution.
pub fn substitute_suit_name(card_name: &str, custom_suit_names: &HashMap<String, String>) -> String {
    for (suit_key, default_name) in SUIT_KEYS.iter().zip(DEFAULT_SUIT_NAMES.iter()) {
        let segment = format!("of {}", default_name);
        if card_name.contains(&segment) {
            if let Some(custom) = custom_suit_names.get(*suit_key) {
                return card_name.replace(&segment, &format!("of {}", custom));
            }
        }
    }
    card_name.to_string()
}

/// Candidate display names for one suit slot: the default, the tradition's
/// own name, and any per-import override.
fn suit_candidates<'a>(
    suit_key: &str,
    default_name: &'a str,
    preset: Option<&'a Preset>,
    custom_suit_names: Option<&'a HashMap<String, String>>,
) -> Vec<&'a str> {
    let mut candidates = vec![default_name];
    if let Some(preset) = preset {
        if let Some(name) = preset.suit_names.get(suit_key) {
            candidates.push(name.as_str());
        }
    }
    if let Some(custom) = custom_suit_names {
        if let Some(name) = custom.get(suit_key) {
            candidates.push(name.as_str());
        }
    }
    candidates
}

fn detect_suit(name_lower: &str, candidates_per_suit: &[Vec<&str>]) -> Option<(usize, String)> {
    for (idx, candidates) in candidates_per_suit.iter().enumerate() {
        for candidate in candidates {
            if name_lower.contains(&format!("of {}", candidate.to_lowercase())) {
                return Some((idx, candidate.to_string()));
            }
        }
    }
    None
}

/// Ordinal within a suit for the sort score: ace=0 .. ten=9, then the
/// courts. Page/Princess and Knight/Prince are equivalent slots.
fn rank_ordinal(name_lower: &str) -> Option<i64> {
    let rank_word = name_lower.split(" of ").next().unwrap_or(name_lower).trim();
    for (i, word) in PIP_WORDS.iter().enumerate() {
        if rank_word == *word {
            return Some(i as i64);
        }
    }
    match rank_word {
        "page" | "princess" => Some(10),
        "knight" | "prince" => Some(11),
        "jack" => Some(10),
        "queen" => Some(12),
        "king" => Some(13),
        _ => None,
    }
}

fn lenormand_position(card_name: &str) -> Option<i64> {
    let lower = card_name.trim().to_lowercase();
    let bare = lower.strip_prefix("the ").unwrap_or(&lower);
    LENORMAND_CARDS.iter().position(|name| name.to_lowercase() == bare).map(|i| i as i64)
}

/// Domain-aware sort score. Majors take 0-21 from the fixed table, minors
/// take suit_base + rank ordinal (Wands 100, Cups 200, Swords 300,
/// Pentacles 400), a suit with no readable rank takes base+50, and anything
/// unrecognized sorts last at 999.
pub fn card_sort_order(
    card_name: &str,
    preset: Option<&Preset>,
    custom_suit_names: Option<&HashMap<String, String>>,
) -> i64 {
    match preset.map(|p| p.cartomancy_type) {
        Some(CartomancyType::Lenormand) => {
            lenormand_position(card_name).unwrap_or(UNKNOWN_SORT_ORDER)
        }
        Some(CartomancyType::PlayingCards) => {
            playing_card_sort_order(card_name).unwrap_or(UNKNOWN_SORT_ORDER)
        }
        _ => tarot_sort_order(card_name, preset, custom_suit_names),
    }
}

fn tarot_sort_order(
    card_name: &str,
    preset: Option<&Preset>,
    custom_suit_names: Option<&HashMap<String, String>>,
) -> i64 {
    if let Some(position) = major_position(card_name) {
        return position;
    }

    let lower = card_name.to_lowercase();
    let candidates: Vec<Vec<&str>> = SUIT_KEYS
        .iter()
        .zip(DEFAULT_SUIT_NAMES.iter())
        .map(|(key, default)| suit_candidates(key, default, preset, custom_suit_names))
        .collect();

    if let Some((suit_idx, _)) = detect_suit(&lower, &candidates) {
        let base = 100 * (suit_idx as i64 + 1);
        match rank_ordinal(&lower) {
            Some(ordinal) => base + ordinal,
            None => base + SUIT_ONLY_OFFSET,
        }
    } else {
        UNKNOWN_SORT_ORDER
    }
}

fn playing_card_sort_order(card_name: &str) -> Option<i64> {
    let lower = card_name.to_lowercase();
    let suit_idx = PLAYING_SUIT_NAMES
        .iter()
        .position(|name| lower.contains(&format!("of {}", name.to_lowercase())))?;
    let base = 100 * (suit_idx as i64 + 1);
    match rank_ordinal(&lower) {
        Some(ordinal) => Some(base + ordinal),
        None => Some(base + SUIT_ONLY_OFFSET),
    }
}

/// Archetype, numeric rank, suit, and sort position for a resolved name.
/// The archetype always uses default suit names so same-meaning cards link
/// across decks (Thoth "Ace of Disks" -> archetype "Ace of Pentacles").
pub fn card_metadata(
    card_name: &str,
    preset: Option<&Preset>,
    custom_suit_names: Option<&HashMap<String, String>>,
) -> CardMetadata {
    match preset.map(|p| p.cartomancy_type) {
        Some(CartomancyType::Lenormand) => lenormand_metadata(card_name),
        Some(CartomancyType::PlayingCards) => playing_card_metadata(card_name),
        _ => tarot_metadata(card_name, preset, custom_suit_names),
    }
}

fn tarot_metadata(
    card_name: &str,
    preset: Option<&Preset>,
    custom_suit_names: Option<&HashMap<String, String>>,
) -> CardMetadata {
    if let Some(entry) = major_entry(card_name) {
        return CardMetadata {
            archetype: Some(entry.archetype.to_string()),
            rank: Some(entry.position.to_string()),
            suit: None,
            sort_order: entry.position,
        };
    }

    let lower = card_name.to_lowercase();
    let candidates: Vec<Vec<&str>> = SUIT_KEYS
        .iter()
        .zip(DEFAULT_SUIT_NAMES.iter())
        .map(|(key, default)| suit_candidates(key, default, preset, custom_suit_names))
        .collect();

    if let Some((suit_idx, matched)) = detect_suit(&lower, &candidates) {
        let base = 100 * (suit_idx as i64 + 1);
        match rank_ordinal(&lower) {
            Some(ordinal) => {
                let rank_word = card_name.split(" of ").next().unwrap_or(card_name).trim();
                CardMetadata {
                    archetype: Some(format!(
                        "{} of {}",
                        title_case(rank_word),
                        DEFAULT_SUIT_NAMES[suit_idx]
                    )),
                    // Rank encodes suit and ordinal: base + 1..14.
                    rank: Some((base + ordinal + 1).to_string()),
                    suit: Some(matched),
                    sort_order: base + ordinal,
                }
            }
            None => CardMetadata {
                archetype: None,
                rank: None,
                suit: Some(matched),
                sort_order: base + SUIT_ONLY_OFFSET,
            },
        }
    } else {
        CardMetadata { archetype: None, rank: None, suit: None, sort_order: UNKNOWN_SORT_ORDER }
    }
}

fn lenormand_metadata(card_name: &str) -> CardMetadata {
    match lenormand_position(card_name) {
        Some(position) => CardMetadata {
            archetype: Some(LENORMAND_CARDS[position as usize].to_string()),
            rank: Some((position + 1).to_string()),
            suit: None,
            sort_order: position,
        },
        None => {
            CardMetadata { archetype: None, rank: None, suit: None, sort_order: UNKNOWN_SORT_ORDER }
        }
    }
}

fn playing_card_metadata(card_name: &str) -> CardMetadata {
    let lower = card_name.to_lowercase();
    let suit_idx = PLAYING_SUIT_NAMES
        .iter()
        .position(|name| lower.contains(&format!("of {}", name.to_lowercase())));

    match (suit_idx, rank_ordinal(&lower)) {
        (Some(idx), Some(ordinal)) => {
            let base = 100 * (idx as i64 + 1);
            CardMetadata {
                archetype: Some(card_name.to_string()),
                rank: Some((base + ordinal + 1).to_string()),
                suit: Some(PLAYING_SUIT_NAMES[idx].to_string()),
                sort_order: base + ordinal,
            }
        }
        (Some(idx), None) => CardMetadata {
            archetype: None,
            rank: None,
            suit: Some(PLAYING_SUIT_NAMES[idx].to_string()),
            sort_order: 100 * (idx as i64 + 1) + SUIT_ONLY_OFFSET,
        },
        _ => {
            CardMetadata { archetype: None, rank: None, suit: None, sort_order: UNKNOWN_SORT_ORDER }
        }
    }
}
