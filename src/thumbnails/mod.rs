pub mod worker;

use std::{
    fs,
    path::{
        Path,
        PathBuf,
    },
    time::SystemTime,
};

use image::{
    DynamicImage,
    ImageFormat,
};
use md5::{
    Digest,
    Md5,
};
use serde::{
    Deserialize,
    Serialize,
};

use crate::core::TarologueError;

/// Bounding box a thumbnail must fit inside; aspect ratio is preserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ThumbnailSize {
    pub width: u32,
    pub height: u32,
}

impl ThumbnailSize {
    pub const fn new(width: u32, height: u32) -> Self {
        ThumbnailSize { width, height }
    }
}

impl std::fmt::Display for ThumbnailSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Card grid size.
pub const THUMBNAIL_SIZE: ThumbnailSize = ThumbnailSize::new(300, 450);
/// Single-card preview size.
pub const PREVIEW_SIZE: ThumbnailSize = ThumbnailSize::new(500, 750);

/// Disk-backed, content-addressed thumbnail store. Keys derive from the
/// source path, its mtime, and the target size, so a touched source simply
/// orphans its old entry. Append-only: nothing is evicted except by
/// `clear_cache`.
#[derive(Debug, Clone)]
pub struct ThumbnailCache {
    cache_dir: PathBuf,
}

impl ThumbnailCache {
    pub fn new(cache_dir: PathBuf) -> Self {
        if let Err(e) = fs::create_dir_all(&cache_dir) {
            log::warn!("Failed to create thumbnail cache dir {}: {}", cache_dir.display(), e);
        }
        ThumbnailCache { cache_dir }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    fn source_mtime_secs(source: &Path) -> Option<u64> {
        let modified = fs::metadata(source).ok()?.modified().ok()?;
        modified.duration_since(SystemTime::UNIX_EPOCH).ok().map(|d| d.as_secs())
    }

    /// `md5("{path}:{mtime}:{WxH}")` as 32 lowercase hex chars. `None` when
    /// the source file does not exist.
    pub fn cache_key(&self, source: &Path, size: ThumbnailSize) -> Option<String> {
        let mtime = Self::source_mtime_secs(source)?;
        let input = format!("{}:{}:{}", source.display(), mtime, size);
        Some(format!("{:x}", Md5::digest(input.as_bytes())))
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.cache_dir.join(format!("{}.png", key))
    }

    /// Decoded, resized copy of `source`, generated and persisted on a miss.
    /// `None` when the source is missing or unreadable. A corrupt cached
    /// entry counts as a miss: it is deleted and regenerated.
    pub fn get_thumbnail(&self, source: &Path, size: ThumbnailSize) -> Option<DynamicImage> {
        let key = self.cache_key(source, size)?;
        let entry = self.entry_path(&key);

        if entry.exists() {
            match image::open(&entry) {
                Ok(img) => return Some(img),
                Err(e) => {
                    log::warn!("Corrupt thumbnail {}, regenerating: {}", entry.display(), e);
                    let _ = fs::remove_file(&entry);
                }
            }
        }

        let source_img = match image::open(source) {
            Ok(img) => img,
            Err(e) => {
                log::warn!("Failed to decode {}: {}", source.display(), e);
                return None;
            }
        };

        let resized = source_img.thumbnail(size.width, size.height);

        // Publish via temp file + rename so a half-written PNG is never
        // visible under the final key.
        let tmp = self.cache_dir.join(format!("{}.png.tmp", key));
        match resized.save_with_format(&tmp, ImageFormat::Png) {
            Ok(()) => {
                if let Err(e) = fs::rename(&tmp, &entry) {
                    log::warn!("Failed to publish thumbnail {}: {}", entry.display(), e);
                    let _ = fs::remove_file(&tmp);
                }
            }
            Err(e) => {
                log::warn!("Failed to write thumbnail {}: {}", tmp.display(), e);
                let _ = fs::remove_file(&tmp);
            }
        }

        Some(resized)
    }

    /// Path of the cached entry, generating it first if needed. Does not
    /// decode when the entry already exists.
    pub fn get_thumbnail_path(&self, source: &Path, size: ThumbnailSize) -> Option<PathBuf> {
        let key = self.cache_key(source, size)?;
        let entry = self.entry_path(&key);

        if entry.exists() {
            return Some(entry);
        }

        self.get_thumbnail(source, size)?;
        entry.exists().then_some(entry)
    }

    /// Sequential cache warm-up for a batch of images, e.g. right after a
    /// deck import. Missing paths are skipped silently.
    pub fn pregenerate<F>(&self, paths: &[PathBuf], size: ThumbnailSize, mut progress: Option<F>)
    where
        F: FnMut(usize, usize),
    {
        let total = paths.len();
        for (i, path) in paths.iter().enumerate() {
            if path.exists() {
                let _ = self.get_thumbnail(path, size);
            }
            if let Some(callback) = progress.as_mut() {
                callback(i + 1, total);
            }
        }
    }

    /// Unconditionally delete every cache entry. Returns how many entries
    /// were removed; stray temp files are deleted too but not counted, so
    /// the total matches what `cache_count` reported. Confirmation is the
    /// caller's concern.
    pub fn clear_cache(&self) -> Result<usize, TarologueError> {
        let mut removed = 0;
        for entry in fs::read_dir(&self.cache_dir)? {
            let Ok(entry) = entry else { continue };
            let path = entry.path();
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else { continue };
            let is_entry = name.ends_with(".png");
            let is_temp = name.ends_with(".png.tmp");

            if path.is_file() && (is_entry || is_temp) && fs::remove_file(&path).is_ok() && is_entry
            {
                removed += 1;
            }
        }
        Ok(removed)
    }

    /// Total bytes on disk. Tolerates entries disappearing mid-scan.
    pub fn cache_size_bytes(&self) -> u64 {
        let Ok(entries) = fs::read_dir(&self.cache_dir) else { return 0 };
        entries
            .flatten()
            .filter(|e| e.path().extension().and_then(|x| x.to_str()) == Some("png"))
            .filter_map(|e| e.metadata().ok())
            .map(|m| m.len())
            .sum()
    }

    pub fn cache_count(&self) -> usize {
        let Ok(entries) = fs::read_dir(&self.cache_dir) else { return 0 };
        entries
            .flatten()
            .filter(|e| e.path().extension().and_then(|x| x.to_str()) == Some("png"))
            .count()
    }
}
