//! # Map Persistence
//!
//! Reading and writing the text map format. Generated maps are saved into a
//! maps directory as `map1.txt`, `map2.txt`, ... with the next free number.

use crate::config::MAP_FILE_PREFIX;
use crate::map::MapDocument;
use crate::SlitheriaResult;
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

/// Number embedded in a `mapN.txt` file name.
pub fn map_number(file_name: &str) -> Option<u32> {
    file_name
        .strip_prefix(MAP_FILE_PREFIX)?
        .strip_suffix(".txt")
        .filter(|digits| !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()))?
        .parse()
        .ok()
}

/// The number the next saved map will get: one past the highest existing,
/// or 1 for an empty or missing directory.
pub fn next_map_number(dir: &Path) -> SlitheriaResult<u32> {
    if !dir.exists() {
        return Ok(1);
    }

    let mut next = 1;
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if let Some(number) = entry.file_name().to_str().and_then(map_number) {
            next = next.max(number.saturating_add(1));
        }
    }
    Ok(next)
}

/// Writes a document to `path` in the text format.
pub fn save(path: &Path, document: &MapDocument) -> SlitheriaResult<()> {
    fs::write(path, document.to_text())?;
    Ok(())
}

/// Writes a document as the next numbered map in `dir`, creating the
/// directory if needed. Returns the path written.
pub fn save_numbered(dir: &Path, document: &MapDocument) -> SlitheriaResult<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}{}.txt", MAP_FILE_PREFIX, next_map_number(dir)?));
    save(&path, document)?;
    info!("Map saved as: {}", path.display());
    Ok(path)
}

/// Reads a document from a text map file.
pub fn load(path: &Path) -> SlitheriaResult<MapDocument> {
    let text = fs::read_to_string(path)?;
    MapDocument::from_text(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_number_parsing() {
        assert_eq!(map_number("map1.txt"), Some(1));
        assert_eq!(map_number("map42.txt"), Some(42));
        assert_eq!(map_number("map.txt"), None);
        assert_eq!(map_number("mapx.txt"), None);
        assert_eq!(map_number("map-3.txt"), None);
        assert_eq!(map_number("level3.txt"), None);
        assert_eq!(map_number("map3.json"), None);
    }

    #[test]
    fn test_missing_directory_starts_at_one() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(next_map_number(&dir.path().join("maps")).unwrap(), 1);
    }

    #[test]
    fn test_next_number_skips_gaps() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["map1.txt", "map7.txt", "notes.txt", "map3.txt.bak"] {
            fs::write(dir.path().join(name), "x").unwrap();
        }
        assert_eq!(next_map_number(dir.path()).unwrap(), 8);
    }
}
