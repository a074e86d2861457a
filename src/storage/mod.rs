use std::{
    collections::HashMap,
    fs,
    path::Path,
};

use rusqlite::{
    params,
    Connection,
    OptionalExtension,
    Row,
};

use crate::core::{
    utils::now_rfc3339,
    Card,
    CartomancyType,
    Deck,
    JournalEntry,
    Spread,
    TarologueError,
};

/// Numbered, linear migrations. Each entry runs once, inside a transaction,
/// and is recorded in `schema_version`.
const MIGRATIONS: &[(i64, &str)] = &[
    (
        1,
        "
        CREATE TABLE IF NOT EXISTS decks (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            cartomancy_type TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            card_back_path TEXT,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS cards (
            id TEXT PRIMARY KEY,
            deck_id TEXT NOT NULL REFERENCES decks(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            image_path TEXT,
            sort_order INTEGER NOT NULL DEFAULT 0,
            archetype TEXT,
            rank TEXT,
            suit TEXT,
            custom_fields TEXT NOT NULL DEFAULT '{}'
        );

        CREATE INDEX IF NOT EXISTS idx_cards_deck ON cards(deck_id);
        ",
    ),
    (
        2,
        "
        CREATE TABLE IF NOT EXISTS journal_entries (
            id TEXT PRIMARY KEY,
            deck_id TEXT REFERENCES decks(id) ON DELETE SET NULL,
            title TEXT NOT NULL,
            content TEXT NOT NULL DEFAULT '',
            drawn_cards TEXT NOT NULL DEFAULT '[]',
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS spreads (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            positions TEXT NOT NULL DEFAULT '[]'
        );

        CREATE INDEX IF NOT EXISTS idx_journal_deck ON journal_entries(deck_id);
        ",
    ),
];

/// A card about to be inserted; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewCard {
    pub name: String,
    pub image_path: Option<String>,
    pub sort_order: i64,
    pub archetype: Option<String>,
    pub rank: Option<String>,
    pub suit: Option<String>,
    pub custom_fields: HashMap<String, String>,
}

pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self, TarologueError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        let mut store = Store { conn };
        store.apply_pragmas()?;
        store.migrate()?;
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self, TarologueError> {
        let conn = Connection::open_in_memory()?;
        let mut store = Store { conn };
        store.apply_pragmas()?;
        store.migrate()?;
        Ok(store)
    }

    fn apply_pragmas(&self) -> Result<(), TarologueError> {
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(())
    }

    fn migrate(&mut self) -> Result<(), TarologueError> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            );",
        )?;

        let current: i64 = self
            .conn
            .query_row("SELECT COALESCE(MAX(version), 0) FROM schema_version", [], |row| {
                row.get(0)
            })?;

        for (version, sql) in MIGRATIONS {
            if *version <= current {
                continue;
            }
            let tx = self.conn.transaction()?;
            tx.execute_batch(sql)?;
            tx.execute(
                "INSERT INTO schema_version (version, applied_at) VALUES (?1, ?2)",
                params![version, now_rfc3339()],
            )?;
            tx.commit()?;
            log::info!("Applied schema migration {}", version);
        }

        Ok(())
    }

    pub fn schema_version(&self) -> Result<i64, TarologueError> {
        let version = self.conn.query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |row| row.get(0),
        )?;
        Ok(version)
    }

    // ── Decks ──

    pub fn create_deck(
        &self,
        name: &str,
        cartomancy_type: CartomancyType,
        description: &str,
        card_back_path: Option<&str>,
    ) -> Result<Deck, TarologueError> {
        let deck = Deck {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            cartomancy_type,
            description: description.to_string(),
            card_back_path: card_back_path.map(|s| s.to_string()),
            created_at: now_rfc3339(),
        };

        self.conn.execute(
            "INSERT INTO decks (id, name, cartomancy_type, description, card_back_path, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                deck.id,
                deck.name,
                deck.cartomancy_type.as_str(),
                deck.description,
                deck.card_back_path,
                deck.created_at
            ],
        )?;

        Ok(deck)
    }

    pub fn list_decks(&self) -> Result<Vec<Deck>, TarologueError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, cartomancy_type, description, card_back_path, created_at
             FROM decks ORDER BY created_at",
        )?;
        let decks = stmt
            .query_map([], deck_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(decks)
    }

    pub fn get_deck(&self, id: &str) -> Result<Option<Deck>, TarologueError> {
        let deck = self
            .conn
            .query_row(
                "SELECT id, name, cartomancy_type, description, card_back_path, created_at
                 FROM decks WHERE id = ?1",
                params![id],
                deck_from_row,
            )
            .optional()?;
        Ok(deck)
    }

    pub fn delete_deck(&self, id: &str) -> Result<bool, TarologueError> {
        let changed = self.conn.execute("DELETE FROM decks WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    // ── Cards ──

    pub fn add_card(&self, deck_id: &str, card: &NewCard) -> Result<Card, TarologueError> {
        let id = uuid::Uuid::new_v4().to_string();
        self.conn.execute(
            "INSERT INTO cards
             (id, deck_id, name, image_path, sort_order, archetype, rank, suit, custom_fields)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                id,
                deck_id,
                card.name,
                card.image_path,
                card.sort_order,
                card.archetype,
                card.rank,
                card.suit,
                serde_json::to_string(&card.custom_fields)?,
            ],
        )?;

        Ok(Card {
            id,
            deck_id: deck_id.to_string(),
            name: card.name.clone(),
            image_path: card.image_path.clone(),
            sort_order: card.sort_order,
            archetype: card.archetype.clone(),
            rank: card.rank.clone(),
            suit: card.suit.clone(),
            custom_fields: card.custom_fields.clone(),
        })
    }

    /// Insert a batch in one transaction, preserving the given order. The
    /// caller hands us rows already sorted by the import preview.
    pub fn bulk_add_cards(
        &mut self,
        deck_id: &str,
        cards: &[NewCard],
    ) -> Result<Vec<String>, TarologueError> {
        let tx = self.conn.transaction()?;
        let mut ids = Vec::with_capacity(cards.len());

        {
            let mut stmt = tx.prepare(
                "INSERT INTO cards
                 (id, deck_id, name, image_path, sort_order, archetype, rank, suit, custom_fields)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            )?;
            for card in cards {
                let id = uuid::Uuid::new_v4().to_string();
                stmt.execute(params![
                    id,
                    deck_id,
                    card.name,
                    card.image_path,
                    card.sort_order,
                    card.archetype,
                    card.rank,
                    card.suit,
                    serde_json::to_string(&card.custom_fields)?,
                ])?;
                ids.push(id);
            }
        }

        tx.commit()?;
        Ok(ids)
    }

    pub fn get_card(&self, id: &str) -> Result<Option<Card>, TarologueError> {
        let card = self
            .conn
            .query_row(
                "SELECT id, deck_id, name, image_path, sort_order, archetype, rank, suit,
                        custom_fields
                 FROM cards WHERE id = ?1",
                params![id],
                card_from_row,
            )
            .optional()?;
        Ok(card)
    }

    pub fn cards_for_deck(&self, deck_id: &str) -> Result<Vec<Card>, TarologueError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, deck_id, name, image_path, sort_order, archetype, rank, suit,
                    custom_fields
             FROM cards WHERE deck_id = ?1 ORDER BY sort_order, name",
        )?;
        let cards = stmt
            .query_map(params![deck_id], card_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(cards)
    }

    pub fn update_card_metadata(
        &self,
        card_id: &str,
        archetype: Option<&str>,
        rank: Option<&str>,
        suit: Option<&str>,
        sort_order: i64,
    ) -> Result<bool, TarologueError> {
        let changed = self.conn.execute(
            "UPDATE cards SET archetype = ?2, rank = ?3, suit = ?4, sort_order = ?5
             WHERE id = ?1",
            params![card_id, archetype, rank, suit, sort_order],
        )?;
        Ok(changed > 0)
    }

    // ── Journal ──

    pub fn add_journal_entry(
        &self,
        deck_id: Option<&str>,
        title: &str,
        content: &str,
        drawn_cards: &[String],
    ) -> Result<JournalEntry, TarologueError> {
        let entry = JournalEntry {
            id: uuid::Uuid::new_v4().to_string(),
            deck_id: deck_id.map(|s| s.to_string()),
            title: title.to_string(),
            content: content.to_string(),
            drawn_cards: drawn_cards.to_vec(),
            created_at: now_rfc3339(),
        };

        self.conn.execute(
            "INSERT INTO journal_entries (id, deck_id, title, content, drawn_cards, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                entry.id,
                entry.deck_id,
                entry.title,
                entry.content,
                serde_json::to_string(&entry.drawn_cards)?,
                entry.created_at
            ],
        )?;

        Ok(entry)
    }

    pub fn list_journal_entries(&self) -> Result<Vec<JournalEntry>, TarologueError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, deck_id, title, content, drawn_cards, created_at
             FROM journal_entries ORDER BY created_at DESC",
        )?;
        let entries = stmt
            .query_map([], journal_entry_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    pub fn delete_journal_entry(&self, id: &str) -> Result<bool, TarologueError> {
        let changed =
            self.conn.execute("DELETE FROM journal_entries WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    // ── Spreads ──

    pub fn add_spread(
        &self,
        name: &str,
        description: &str,
        positions: &[String],
    ) -> Result<Spread, TarologueError> {
        let spread = Spread {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            description: description.to_string(),
            positions: positions.to_vec(),
        };

        self.conn.execute(
            "INSERT INTO spreads (id, name, description, positions) VALUES (?1, ?2, ?3, ?4)",
            params![
                spread.id,
                spread.name,
                spread.description,
                serde_json::to_string(&spread.positions)?
            ],
        )?;

        Ok(spread)
    }

    pub fn list_spreads(&self) -> Result<Vec<Spread>, TarologueError> {
        let mut stmt =
            self.conn.prepare("SELECT id, name, description, positions FROM spreads ORDER BY name")?;
        let spreads = stmt
            .query_map([], spread_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(spreads)
    }
}

fn deck_from_row(row: &Row) -> rusqlite::Result<Deck> {
    let type_str: String = row.get(2)?;
    Ok(Deck {
        id: row.get(0)?,
        name: row.get(1)?,
        cartomancy_type: CartomancyType::parse(&type_str).unwrap_or(CartomancyType::Oracle),
        description: row.get(3)?,
        card_back_path: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn card_from_row(row: &Row) -> rusqlite::Result<Card> {
    let custom_fields_json: String = row.get(8)?;
    Ok(Card {
        id: row.get(0)?,
        deck_id: row.get(1)?,
        name: row.get(2)?,
        image_path: row.get(3)?,
        sort_order: row.get(4)?,
        archetype: row.get(5)?,
        rank: row.get(6)?,
        suit: row.get(7)?,
        custom_fields: serde_json::from_str(&custom_fields_json).unwrap_or_default(),
    })
}

fn journal_entry_from_row(row: &Row) -> rusqlite::Result<JournalEntry> {
    let drawn_json: String = row.get(4)?;
    Ok(JournalEntry {
        id: row.get(0)?,
        deck_id: row.get(1)?,
        title: row.get(2)?,
        content: row.get(3)?,
        drawn_cards: serde_json::from_str(&drawn_json).unwrap_or_default(),
        created_at: row.get(5)?,
    })
}

fn spread_from_row(row: &Row) -> rusqlite::Result<Spread> {
    let positions_json: String = row.get(3)?;
    Ok(Spread {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        positions: serde_json::from_str(&positions_json).unwrap_or_default(),
    })
}
