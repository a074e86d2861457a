pub mod builtin;
pub mod import;
pub mod resolver;

#[cfg(test)]
mod resolver_tests;

use std::{
    collections::{
        BTreeMap,
        HashMap,
    },
    path::{
        Path,
        PathBuf,
    },
};

use serde::{
    Deserialize,
    Serialize,
};

use crate::{
    core::{
        models::ImportPreviewEntry,
        CardMetadata,
        CartomancyType,
        TarologueError,
    },
    persistence,
};

/// One deck tradition's naming convention: normalized filename keys mapped to
/// canonical card names, plus the tradition's suit display names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    #[serde(rename = "type")]
    pub cartomancy_type: CartomancyType,
    pub mappings: HashMap<String, String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub suit_names: HashMap<String, String>,
}

/// Display prefix for custom presets that do not shadow a built-in. Never
/// stored on disk.
pub const CUSTOM_PREFIX: &str = "Custom: ";

/// Registry of built-in presets overlaid with the persisted custom store.
/// Built-ins are immutable; a same-named custom shadows one until deleted.
#[derive(Debug)]
pub struct PresetLibrary {
    builtins: Vec<(String, Preset)>,
    customs: BTreeMap<String, Preset>,
    store_path: PathBuf,
}

impl PresetLibrary {
    pub fn with_store_path(store_path: PathBuf) -> Self {
        let customs: BTreeMap<String, Preset> = persistence::load_json_or_default(&store_path);
        PresetLibrary { builtins: builtin::builtin_presets(), customs, store_path }
    }

    /// Built-ins (with in-place custom overrides) followed by the remaining
    /// customs under their `"Custom: "` display key.
    pub fn all_presets(&self) -> Vec<(String, Preset)> {
        let mut result = Vec::with_capacity(self.builtins.len() + self.customs.len());

        for (name, preset) in &self.builtins {
            let body = self.customs.get(name).unwrap_or(preset);
            result.push((name.clone(), body.clone()));
        }

        for (name, preset) in &self.customs {
            if !self.is_builtin(name) {
                result.push((format!("{}{}", CUSTOM_PREFIX, name), preset.clone()));
            }
        }

        result
    }

    /// Resolve a display or bare name, preferring a custom override over the
    /// pristine built-in.
    pub fn get(&self, name: &str) -> Option<&Preset> {
        let bare = name.strip_prefix(CUSTOM_PREFIX).unwrap_or(name);

        self.customs.get(bare).or_else(|| {
            self.builtins.iter().find(|(builtin_name, _)| builtin_name == bare).map(|(_, p)| p)
        })
    }

    pub fn is_builtin(&self, name: &str) -> bool {
        let bare = name.strip_prefix(CUSTOM_PREFIX).unwrap_or(name);
        self.builtins.iter().any(|(builtin_name, _)| builtin_name == bare)
    }

    pub fn is_customized(&self, name: &str) -> bool {
        let bare = name.strip_prefix(CUSTOM_PREFIX).unwrap_or(name);
        self.customs.contains_key(bare)
    }

    /// Insert or replace a custom preset and persist the store. Mapping keys
    /// are taken as-is; keys that are not normalized simply never match.
    pub fn add_custom(
        &mut self,
        name: &str,
        cartomancy_type: CartomancyType,
        mappings: HashMap<String, String>,
        description: &str,
        suit_names: HashMap<String, String>,
    ) {
        self.customs.insert(
            name.to_string(),
            Preset {
                cartomancy_type,
                mappings,
                description: description.to_string(),
                suit_names,
            },
        );
        self.persist();
    }

    /// Remove a custom preset. A shadowed built-in becomes visible again.
    pub fn delete_custom(&mut self, name: &str) -> bool {
        let bare = name.strip_prefix(CUSTOM_PREFIX).unwrap_or(name);
        let removed = self.customs.remove(bare).is_some();
        if removed {
            self.persist();
        }
        removed
    }

    /// Edit as one operation: the removal of the old entry and the insert of
    /// the new one land in a single document write, so a rename cannot
    /// half-persist.
    pub fn replace_custom(&mut self, old_name: &str, new_name: &str, preset: Preset) {
        let bare = old_name.strip_prefix(CUSTOM_PREFIX).unwrap_or(old_name);
        self.customs.remove(bare);
        self.customs.insert(new_name.to_string(), preset);
        self.persist();
    }

    // Write failures are logged and swallowed: the in-memory change stays for
    // the rest of the process but is not durable.
    fn persist(&self) {
        if let Err(e) = persistence::save_json(&self.customs, &self.store_path) {
            log::warn!("Failed to save custom presets to {}: {}", self.store_path.display(), e);
        }
    }

    pub fn map_filename_to_card(
        &self,
        filename: &str,
        preset_name: &str,
        custom_suit_names: Option<&HashMap<String, String>>,
    ) -> String {
        resolver::map_filename_to_card(filename, self.get(preset_name), custom_suit_names)
    }

    pub fn sort_order(&self, card_name: &str, preset_name: &str) -> i64 {
        resolver::card_sort_order(card_name, self.get(preset_name), None)
    }

    pub fn metadata(
        &self,
        card_name: &str,
        preset_name: &str,
        custom_suit_names: Option<&HashMap<String, String>>,
    ) -> CardMetadata {
        resolver::card_metadata(card_name, self.get(preset_name), custom_suit_names)
    }

    pub fn preview_import(
        &self,
        folder: &Path,
        preset_name: &str,
        custom_suit_names: Option<&HashMap<String, String>>,
    ) -> Result<Vec<(String, String, i64)>, TarologueError> {
        import::preview_import(folder, self.get(preset_name), custom_suit_names)
    }

    pub fn preview_import_with_metadata(
        &self,
        folder: &Path,
        preset_name: &str,
        custom_suit_names: Option<&HashMap<String, String>>,
    ) -> Result<Vec<ImportPreviewEntry>, TarologueError> {
        import::preview_import_with_metadata(folder, self.get(preset_name), custom_suit_names)
    }
}
