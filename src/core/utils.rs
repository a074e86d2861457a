use std::path::Path;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];

pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let ext = e.to_lowercase();
            IMAGE_EXTENSIONS.iter().any(|known| *known == ext)
        })
        .unwrap_or(false)
}

/// Title-case each whitespace-separated word, collapsing repeated whitespace.
pub fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn image_extension_check_is_case_insensitive() {
        assert!(is_image_file(Path::new("cards/w01.JPG")));
        assert!(is_image_file(Path::new("cards/back.webp")));
        assert!(!is_image_file(Path::new("cards/readme.txt")));
        assert!(!is_image_file(Path::new("cards/noext")));
    }

    #[test]
    fn title_case_collapses_whitespace() {
        assert_eq!(title_case("unknown  card"), "Unknown Card");
        assert_eq!(title_case("THE fool"), "The Fool");
    }
}
