use std::{
    fs,
    path::PathBuf,
};

use serde::{
    Deserialize,
    Serialize,
};

use crate::core::TarologueError;

const APP_NAME: &str = "tarologue";

pub fn get_app_data_dir() -> PathBuf {
    if let Some(data_dir) = dirs::data_local_dir() {
        let app_dir = data_dir.join(APP_NAME);
        let _ = fs::create_dir_all(&app_dir);
        app_dir
    } else {
        PathBuf::from(".")
    }
}

/// Whole-document overwrite. Callers decide whether a failure is fatal.
pub fn save_json<T: Serialize>(data: &T, path: &PathBuf) -> Result<(), TarologueError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(data)?;
    fs::write(path, json)?;
    log::debug!("Data saved to: {}", path.display());
    Ok(())
}

pub fn load_json<T: for<'de> Deserialize<'de> + Default>(
    path: &PathBuf,
) -> Result<T, TarologueError> {
    if !path.exists() {
        return Ok(T::default());
    }

    let json = fs::read_to_string(path)?;
    let data: T = serde_json::from_str(&json)?;
    log::debug!("Data loaded from: {}", path.display());
    Ok(data)
}

/// Corrupt or unreadable documents fall back to defaults rather than failing
/// the caller.
pub fn load_json_or_default<T: for<'de> Deserialize<'de> + Default>(path: &PathBuf) -> T {
    match load_json::<T>(path) {
        Ok(data) => data,
        Err(e) => {
            log::warn!("Failed to load {}: {}. Using defaults.", path.display(), e);
            T::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn temp_file() -> PathBuf {
        std::env::temp_dir().join(format!("tarologue-test-{}.json", uuid::Uuid::new_v4()))
    }

    #[test]
    fn save_then_load_round_trips() {
        let path = temp_file();
        let mut data: HashMap<String, String> = HashMap::new();
        data.insert("w01".to_string(), "Ace of Wands".to_string());

        save_json(&data, &path).unwrap();
        let loaded: HashMap<String, String> = load_json(&path).unwrap();
        assert_eq!(loaded, data);

        let _ = fs::remove_file(&path);
    }

    #[test]
    fn missing_file_loads_default() {
        let path = temp_file();
        let loaded: HashMap<String, String> = load_json_or_default(&path);
        assert!(loaded.is_empty());
    }

    #[test]
    fn corrupt_file_loads_default() {
        let path = temp_file();
        fs::write(&path, "{not json").unwrap();
        let loaded: HashMap<String, String> = load_json_or_default(&path);
        assert!(loaded.is_empty());
        let _ = fs::remove_file(&path);
    }
}
