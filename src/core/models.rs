use std::collections::HashMap;

use serde::{
    Deserialize,
    Serialize,
};

/// The broad category of card system a deck belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CartomancyType {
    Tarot,
    Lenormand,
    Oracle,
    #[serde(rename = "Playing Cards")]
    PlayingCards,
    Kipper,
    #[serde(rename = "I Ching")]
    IChing,
}

impl CartomancyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CartomancyType::Tarot => "Tarot",
            CartomancyType::Lenormand => "Lenormand",
            CartomancyType::Oracle => "Oracle",
            CartomancyType::PlayingCards => "Playing Cards",
            CartomancyType::Kipper => "Kipper",
            CartomancyType::IChing => "I Ching",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Tarot" => Some(CartomancyType::Tarot),
            "Lenormand" => Some(CartomancyType::Lenormand),
            "Oracle" => Some(CartomancyType::Oracle),
            "Playing Cards" => Some(CartomancyType::PlayingCards),
            "Kipper" => Some(CartomancyType::Kipper),
            "I Ching" => Some(CartomancyType::IChing),
            _ => None,
        }
    }
}

impl std::fmt::Display for CartomancyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Deck {
    pub id: String,
    pub name: String,
    pub cartomancy_type: CartomancyType,
    #[serde(default)]
    pub description: String,
    pub card_back_path: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Card {
    pub id: String,
    pub deck_id: String,
    pub name: String,
    pub image_path: Option<String>,
    pub sort_order: i64,
    pub archetype: Option<String>,
    pub rank: Option<String>,
    pub suit: Option<String>,
    #[serde(default)]
    pub custom_fields: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: String,
    pub deck_id: Option<String>,
    pub title: String,
    pub content: String,
    /// Card names drawn for this reading, in drawn order.
    #[serde(default)]
    pub drawn_cards: Vec<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Spread {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Position labels in layout order, e.g. ["Past", "Present", "Future"].
    pub positions: Vec<String>,
}

/// Naming metadata derived for one filename under one preset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardMetadata {
    pub archetype: Option<String>,
    pub rank: Option<String>,
    pub suit: Option<String>,
    pub sort_order: i64,
}

/// One row of an import preview: where the file is, what we think it is,
/// and where it sorts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportPreviewEntry {
    pub filename: String,
    pub card_name: String,
    pub sort_order: i64,
    pub archetype: Option<String>,
    pub rank: Option<String>,
    pub suit: Option<String>,
    #[serde(default)]
    pub custom_fields: HashMap<String, String>,
}
