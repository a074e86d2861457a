use std::{
    collections::HashMap,
    fs::File,
    path::{
        Path,
        PathBuf,
    },
    sync::Mutex,
};

use serde::Deserialize;
use serde_json::{
    json,
    Value,
};
use tiny_http::{
    Header,
    Method,
    Request,
    Response,
    Server,
};

use crate::{
    core::{
        CartomancyType,
        TarologueError,
    },
    presets::{
        import::find_card_back_image,
        PresetLibrary,
    },
    storage::{
        NewCard,
        Store,
    },
    thumbnails::{
        ThumbnailCache,
        PREVIEW_SIZE,
        THUMBNAIL_SIZE,
    },
};

/// Everything a request handler needs, wired once at startup.
pub struct AppState {
    pub store: Mutex<Store>,
    pub library: Mutex<PresetLibrary>,
    pub cache: ThumbnailCache,
}

#[derive(Debug, Deserialize)]
struct ScanFolderRequest {
    folder: String,
    preset: String,
    #[serde(default)]
    custom_suit_names: Option<HashMap<String, String>>,
}

#[derive(Debug, Deserialize)]
struct ImportFolderRequest {
    folder: String,
    preset: String,
    deck_name: String,
    cartomancy_type: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    custom_suit_names: Option<HashMap<String, String>>,
}

#[derive(Debug, Deserialize)]
struct AddPresetRequest {
    name: String,
    #[serde(rename = "type")]
    cartomancy_type: CartomancyType,
    mappings: HashMap<String, String>,
    #[serde(default)]
    description: String,
    #[serde(default)]
    suit_names: HashMap<String, String>,
}

enum ApiResponse {
    Json { status: u16, body: Value },
    ImageFile { path: PathBuf },
}

fn ok(body: Value) -> ApiResponse {
    ApiResponse::Json { status: 200, body }
}

fn not_found() -> ApiResponse {
    ApiResponse::Json { status: 404, body: json!({ "error": "not found" }) }
}

/// Single-threaded accept loop. This is a single-user local tool; requests
/// are short and there is no concurrency to coordinate.
pub fn serve(addr: &str, state: &AppState) -> Result<(), TarologueError> {
    let server = Server::http(addr)
        .map_err(|e| TarologueError::Custom(format!("Failed to bind {}: {}", addr, e)))?;
    log::info!("Listening on http://{}", addr);

    for request in server.incoming_requests() {
        handle_request(state, request);
    }

    Ok(())
}

fn handle_request(state: &AppState, mut request: Request) {
    let url = request.url().to_string();
    let (path, query) = match url.split_once('?') {
        Some((p, q)) => (p.to_string(), q.to_string()),
        None => (url, String::new()),
    };

    let mut body = String::new();
    if let Err(e) = request.as_reader().read_to_string(&mut body) {
        log::warn!("Failed to read request body: {}", e);
    }

    let method = request.method().clone();
    log::debug!("{} {}", method, path);

    let api_response = match route(state, &method, &path, &query, &body) {
        Ok(response) => response,
        Err(e) => {
            let status = match e {
                TarologueError::MissingDeckName
                | TarologueError::MissingCartomancyType
                | TarologueError::FolderNotFound(_) => 400,
                _ => 500,
            };
            ApiResponse::Json { status, body: json!({ "error": e.to_string() }) }
        }
    };

    let result = match api_response {
        ApiResponse::Json { status, body } => {
            let response = Response::from_string(body.to_string())
                .with_status_code(status)
                .with_header(content_type("application/json"));
            request.respond(response)
        }
        ApiResponse::ImageFile { path } => match File::open(&path) {
            Ok(file) => {
                let response = Response::from_file(file)
                    .with_header(content_type("image/png"))
                    .with_header(header("Cache-Control", "max-age=86400"));
                request.respond(response)
            }
            Err(_) => {
                let response = Response::from_string(json!({ "error": "not found" }).to_string())
                    .with_status_code(404)
                    .with_header(content_type("application/json"));
                request.respond(response)
            }
        },
    };

    if let Err(e) = result {
        log::warn!("Failed to send response: {}", e);
    }
}

fn route(
    state: &AppState,
    method: &Method,
    path: &str,
    query: &str,
    body: &str,
) -> Result<ApiResponse, TarologueError> {
    match (method, path) {
        (Method::Get, "/api/import/presets") => list_presets(state),
        (Method::Post, "/api/import/scan-folder") => scan_folder(state, body),
        (Method::Post, "/api/import/from-folder") => import_from_folder(state, body),
        (Method::Post, "/api/presets/custom") => add_custom_preset(state, body),
        (Method::Get, "/api/decks") => list_decks(state),
        (Method::Get, "/api/cache/stats") => cache_stats(state),
        (Method::Post, "/api/cache/clear") => clear_cache(state),
        _ => {
            if let (Method::Delete, Some(name)) = (method, path.strip_prefix("/api/presets/custom/"))
            {
                return delete_custom_preset(state, &percent_decode(name));
            }
            if let (Method::Get, Some(rest)) = (method, path.strip_prefix("/api/decks/")) {
                if let Some(deck_id) = rest.strip_suffix("/cards") {
                    return deck_cards(state, deck_id);
                }
            }
            if let (Method::Get, Some(rest)) = (method, path.strip_prefix("/api/cards/")) {
                if let Some(card_id) = rest.strip_suffix("/image") {
                    return card_image(state, card_id, query);
                }
            }
            Ok(not_found())
        }
    }
}

fn list_presets(state: &AppState) -> Result<ApiResponse, TarologueError> {
    let library = state.library.lock().expect("library lock");
    let mut presets = serde_json::Map::new();
    for (name, preset) in library.all_presets() {
        presets.insert(name, serde_json::to_value(&preset)?);
    }
    Ok(ok(Value::Object(presets)))
}

fn scan_folder(state: &AppState, body: &str) -> Result<ApiResponse, TarologueError> {
    let req: ScanFolderRequest = serde_json::from_str(body)?;
    let folder = PathBuf::from(&req.folder);

    let library = state.library.lock().expect("library lock");
    let entries = library.preview_import_with_metadata(
        &folder,
        &req.preset,
        req.custom_suit_names.as_ref(),
    )?;
    let card_back = find_card_back_image(&folder)?;

    Ok(ok(json!({ "cards": entries, "card_back": card_back })))
}

fn import_from_folder(state: &AppState, body: &str) -> Result<ApiResponse, TarologueError> {
    let req: ImportFolderRequest = serde_json::from_str(body)?;

    if req.deck_name.trim().is_empty() {
        return Err(TarologueError::MissingDeckName);
    }
    let cartomancy_type = CartomancyType::parse(req.cartomancy_type.trim())
        .ok_or(TarologueError::MissingCartomancyType)?;

    let folder = PathBuf::from(&req.folder);
    let entries = {
        let library = state.library.lock().expect("library lock");
        library.preview_import_with_metadata(&folder, &req.preset, req.custom_suit_names.as_ref())?
    };
    let card_back = find_card_back_image(&folder)?
        .map(|name| folder.join(name).display().to_string());

    let cards: Vec<NewCard> = entries
        .iter()
        .map(|entry| NewCard {
            name: entry.card_name.clone(),
            image_path: Some(folder.join(&entry.filename).display().to_string()),
            sort_order: entry.sort_order,
            archetype: entry.archetype.clone(),
            rank: entry.rank.clone(),
            suit: entry.suit.clone(),
            custom_fields: entry.custom_fields.clone(),
        })
        .collect();

    let mut store = state.store.lock().expect("store lock");
    let deck = store.create_deck(
        req.deck_name.trim(),
        cartomancy_type,
        &req.description,
        card_back.as_deref(),
    )?;
    let ids = store.bulk_add_cards(&deck.id, &cards)?;

    log::info!("Imported {} cards into deck '{}'", ids.len(), deck.name);
    Ok(ok(json!({ "deck": deck, "imported": ids.len(), "card_back": card_back })))
}

fn add_custom_preset(state: &AppState, body: &str) -> Result<ApiResponse, TarologueError> {
    let req: AddPresetRequest = serde_json::from_str(body)?;
    if req.name.trim().is_empty() {
        return Err(TarologueError::Custom("Preset name required".to_string()));
    }

    let mut library = state.library.lock().expect("library lock");
    library.add_custom(
        req.name.trim(),
        req.cartomancy_type,
        req.mappings,
        &req.description,
        req.suit_names,
    );
    Ok(ok(json!({ "saved": req.name.trim() })))
}

fn delete_custom_preset(state: &AppState, name: &str) -> Result<ApiResponse, TarologueError> {
    let mut library = state.library.lock().expect("library lock");
    if library.delete_custom(name) {
        Ok(ok(json!({ "deleted": name })))
    } else {
        Ok(not_found())
    }
}

fn list_decks(state: &AppState) -> Result<ApiResponse, TarologueError> {
    let store = state.store.lock().expect("store lock");
    Ok(ok(serde_json::to_value(store.list_decks()?)?))
}

fn deck_cards(state: &AppState, deck_id: &str) -> Result<ApiResponse, TarologueError> {
    let store = state.store.lock().expect("store lock");
    if store.get_deck(deck_id)?.is_none() {
        return Ok(not_found());
    }
    Ok(ok(serde_json::to_value(store.cards_for_deck(deck_id)?)?))
}

fn card_image(state: &AppState, card_id: &str, query: &str) -> Result<ApiResponse, TarologueError> {
    let size = if query_param(query, "size").as_deref() == Some("preview") {
        PREVIEW_SIZE
    } else {
        THUMBNAIL_SIZE
    };

    let image_path = {
        let store = state.store.lock().expect("store lock");
        match store.get_card(card_id)? {
            Some(card) => card.image_path,
            None => return Ok(not_found()),
        }
    };

    let Some(image_path) = image_path else {
        return Ok(not_found());
    };

    match state.cache.get_thumbnail_path(Path::new(&image_path), size) {
        Some(path) => Ok(ApiResponse::ImageFile { path }),
        None => Ok(not_found()),
    }
}

fn cache_stats(state: &AppState) -> Result<ApiResponse, TarologueError> {
    Ok(ok(json!({
        "count": state.cache.cache_count(),
        "size_bytes": state.cache.cache_size_bytes(),
    })))
}

fn clear_cache(state: &AppState) -> Result<ApiResponse, TarologueError> {
    let removed = state.cache.clear_cache()?;
    Ok(ok(json!({ "removed": removed })))
}

fn content_type(value: &str) -> Header {
    header("Content-Type", value)
}

fn header(name: &str, value: &str) -> Header {
    Header::from_bytes(name.as_bytes(), value.as_bytes()).expect("static header")
}

fn query_param(query: &str, key: &str) -> Option<String> {
    query.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=')?;
        (k == key).then(|| percent_decode(v))
    })
}

/// Minimal percent-decoding for path segments and query values. Invalid
/// escapes pass through untouched. Works on raw bytes only; slicing the
/// `&str` would panic on multibyte input.
fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' if i + 2 < bytes.len() => {
                match (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                    (Some(hi), Some(lo)) => {
                        out.push(hi << 4 | lo);
                        i += 3;
                    }
                    _ => {
                        out.push(b'%');
                        i += 1;
                    }
                }
            }
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            other => {
                out.push(other);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_value(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}
