use std::sync::Mutex;

use tarologue::{
    persistence,
    presets::PresetLibrary,
    server::{
        self,
        AppState,
    },
    storage::Store,
    thumbnails::ThumbnailCache,
};

const DEFAULT_BIND: &str = "127.0.0.1:7491";

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();
    let data_dir = args
        .get(1)
        .map(std::path::PathBuf::from)
        .unwrap_or_else(persistence::get_app_data_dir);
    let bind = args.get(2).map(String::as_str).unwrap_or(DEFAULT_BIND);

    log::info!("Data dir: {}", data_dir.display());

    let store = match Store::open(&data_dir.join("tarologue.db")) {
        Ok(store) => store,
        Err(e) => {
            log::error!("Failed to open database: {}", e);
            std::process::exit(1);
        }
    };

    let library = PresetLibrary::with_store_path(data_dir.join("custom_presets.json"));
    let cache = ThumbnailCache::new(data_dir.join("thumbnails"));

    let state = AppState { store: Mutex::new(store), library: Mutex::new(library), cache };

    if let Err(e) = server::serve(bind, &state) {
        log::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
