//! Media catalog scanning for Encore.
//!
//! The catalog is built once, at server start, by scanning a media
//! directory. The resulting ordered [`MediaItem`] list is shared read-only
//! by every room the registry creates — there is no hot-reload.
//!
//! Scan rules:
//! - A missing directory yields an empty catalog, not an error.
//! - Regular files only; subdirectories are skipped.
//! - Entries are sorted by file name so the round order is deterministic.
//! - `.mp4` files (case-insensitive) are video, everything else is audio.
//! - The title is the file stem; the source locator is `/media/<file>`.

use std::path::Path;

use encore_protocol::{MediaItem, MediaKind};
use nanoid::nanoid;

mod error;

pub use error::CatalogError;

/// Scans `dir` and builds the ordered, immutable media catalog.
///
/// # Errors
/// Returns `CatalogError::Io` if the directory exists but reading it (or
/// one of its entries) fails.
pub fn scan(dir: &Path) -> Result<Vec<MediaItem>, CatalogError> {
    if !dir.exists() {
        tracing::warn!(dir = %dir.display(), "media directory missing, catalog is empty");
        return Ok(Vec::new());
    }

    let mut names = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            tracing::debug!(
                entry = %entry.path().display(),
                "skipping non-file catalog entry"
            );
            continue;
        }
        names.push(entry.file_name().to_string_lossy().into_owned());
    }

    // Platform readdir order is unspecified; pin it by file name.
    names.sort();

    let items: Vec<MediaItem> = names
        .into_iter()
        .map(|name| {
            let path = Path::new(&name);
            let kind = match path.extension().and_then(|e| e.to_str()) {
                Some(ext) if ext.eq_ignore_ascii_case("mp4") => {
                    MediaKind::Video
                }
                _ => MediaKind::Audio,
            };
            let title = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| name.clone());
            MediaItem {
                id: nanoid!(),
                title,
                kind,
                source: format!("/media/{name}"),
            }
        })
        .collect();

    tracing::info!(dir = %dir.display(), items = items.len(), "media catalog scanned");
    Ok(items)
}

// =========================================================================
// Tests
// =========================================================================
