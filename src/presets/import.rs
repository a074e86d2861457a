use std::{
    collections::HashMap,
    fs,
    path::Path,
};

use crate::core::{
    models::ImportPreviewEntry,
    utils::is_image_file,
    TarologueError,
};

use super::{
    builtin::normalize_key,
    resolver::{
        card_metadata,
        map_filename_to_card,
    },
    Preset,
};

/// Normalized stems treated as a card back rather than a card face.
const CARD_BACK_TOKENS: &[&str] = &["back", "cardback", "cardsback", "backofcard", "cover", "verso"];

pub fn is_card_back_file(filename: &str) -> bool {
    let stem = Path::new(filename).file_stem().and_then(|s| s.to_str()).unwrap_or(filename);
    let key = normalize_key(stem);

    CARD_BACK_TOKENS.iter().any(|token| {
        key == *token
            || (key.starts_with(token)
                && !key[token.len()..].is_empty()
                && key[token.len()..].chars().all(|c| c.is_ascii_digit()))
    })
}

/// Image filenames in `folder`, in filesystem listing order.
pub fn list_image_files(folder: &Path) -> Result<Vec<String>, TarologueError> {
    if !folder.is_dir() {
        return Err(TarologueError::FolderNotFound(folder.display().to_string()));
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(folder)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() && is_image_file(&path) {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                files.push(name.to_string());
            }
        }
    }
    Ok(files)
}

pub fn find_card_back_image(folder: &Path) -> Result<Option<String>, TarologueError> {
    let files = list_image_files(folder)?;
    Ok(files.into_iter().find(|name| is_card_back_file(name)))
}

/// Preview rows `(filename, card_name, sort_order)`, stable-sorted by sort
/// order. Deck insertion order equals this order.
pub fn preview_import(
    folder: &Path,
    preset: Option<&Preset>,
    custom_suit_names: Option<&HashMap<String, String>>,
) -> Result<Vec<(String, String, i64)>, TarologueError> {
    let mut rows: Vec<(String, String, i64)> = list_image_files(folder)?
        .into_iter()
        .map(|filename| {
            let name = map_filename_to_card(&filename, preset, custom_suit_names);
            let sort_order = card_metadata(&name, preset, custom_suit_names).sort_order;
            (filename, name, sort_order)
        })
        .collect();

    rows.sort_by_key(|(_, _, sort_order)| *sort_order);
    Ok(rows)
}

/// Full preview with archetype/rank/suit per card. The card-back file, if
/// any, is excluded here and reported by `find_card_back_image`.
pub fn preview_import_with_metadata(
    folder: &Path,
    preset: Option<&Preset>,
    custom_suit_names: Option<&HashMap<String, String>>,
) -> Result<Vec<ImportPreviewEntry>, TarologueError> {
    let mut rows: Vec<ImportPreviewEntry> = list_image_files(folder)?
        .into_iter()
        .filter(|filename| !is_card_back_file(filename))
        .map(|filename| {
            let card_name = map_filename_to_card(&filename, preset, custom_suit_names);
            let meta = card_metadata(&card_name, preset, custom_suit_names);
            ImportPreviewEntry {
                filename,
                card_name,
                sort_order: meta.sort_order,
                archetype: meta.archetype,
                rank: meta.rank,
                suit: meta.suit,
                custom_fields: HashMap::new(),
            }
        })
        .collect();

    rows.sort_by_key(|row| row.sort_order);
    Ok(rows)
}
