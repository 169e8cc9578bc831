//! Atomic replace of the storage document
//!
//! Readers see either the previous document or the new one, never a
//! partially written file. Each write stages into its own uniquely named
//! sibling, so handles in different processes never share a temp file.

use crate::errors::{io_error, Result};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Write `content` to a fresh sibling temp file, then rename it over `target_path`
pub fn atomic_write(target_path: &Path, content: &[u8]) -> Result<()> {
    let parent = match target_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(|e| io_error("create_storage_dir", e))?;

    let mut staged = NamedTempFile::new_in(parent).map_err(|e| io_error("create_storage_temp", e))?;
    staged
        .write_all(content)
        .map_err(|e| io_error("write_storage_temp", e))?;
    staged
        .as_file()
        .sync_all()
        .map_err(|e| io_error("sync_storage_temp", e))?;
    staged
        .persist(target_path)
        .map_err(|e| io_error("rename_storage_temp", e.error))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use tempfile::TempDir;

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_atomic_write_creates_parent() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("nested").join("storage.json");

        atomic_write(&target, b"[]").unwrap();

        assert_eq!(fs::read(&target).unwrap(), b"[]");
    }

    #[test]
    fn test_atomic_write_replaces_and_cleans_up() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("storage.json");

        atomic_write(&target, b"first").unwrap();
        atomic_write(&target, b"second").unwrap();

        assert_eq!(fs::read(&target).unwrap(), b"second");
        assert_eq!(entries(temp_dir.path()), vec!["storage.json"]);
    }

    #[test]
    fn test_concurrent_writers_never_fail_or_tear() {
        // Given: Several unsynchronized writers on one target
        let temp_dir = TempDir::new().unwrap();
        let target = Arc::new(temp_dir.path().join("storage.json"));
        let payloads: Vec<Vec<u8>> = (0..4u8).map(|n| vec![b'a' + n; 64 * 1024]).collect();

        // When: They all write repeatedly at the same time
        let handles: Vec<_> = payloads
            .iter()
            .cloned()
            .map(|payload| {
                let target = Arc::clone(&target);
                thread::spawn(move || {
                    for _ in 0..50 {
                        atomic_write(&target, &payload).unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        // Then: The file holds one complete payload and no temp files remain
        let content = fs::read(target.as_ref()).unwrap();
        assert!(payloads.contains(&content));
        assert_eq!(entries(temp_dir.path()), vec!["storage.json"]);
    }
}
