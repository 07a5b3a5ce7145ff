//! Output directory preparation and the ownership manifest.
//!
//! Every run is a full regeneration. Before anything is written, each output
//! directory is created if missing and purged of generator-owned entries:
//!
//! 1. Entries listed in the previous run's `.kinds-manifest`
//! 2. Entries whose name starts with the reserved prefix
//! 3. The manifest itself
//!
//! The manifest makes ownership explicit (it still covers files written
//! under a prefix that has since changed); the prefix scan keeps directories
//! written before manifests existed clean.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::errors::GeneratorError;
use crate::output::write_atomic;

/// Name of the manifest file kept in each output directory.
pub const MANIFEST_FILE: &str = ".kinds-manifest";

/// Files written by the last successful run into one directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub prefix: String,
    /// Plain file names, sorted.
    pub files: Vec<String>,
}

/// Creates each directory and removes generator-owned entries from it.
///
/// Directories are processed in order. A prefixed subdirectory is removed
/// only when empty.
///
/// ## Errors
///
/// - [`GeneratorError::CreateDir`] if a directory cannot be created
/// - [`GeneratorError::ReadDir`] if a directory cannot be listed
/// - [`GeneratorError::Cleanup`] naming the entry that could not be deleted
pub fn prepare_dirs<P: AsRef<Path>>(dirs: &[P], prefix: &str) -> Result<(), GeneratorError> {
    for dir in dirs {
        prepare_dir(dir.as_ref(), prefix)?;
    }
    Ok(())
}

fn prepare_dir(dir: &Path, prefix: &str) -> Result<(), GeneratorError> {
    fs::create_dir_all(dir).map_err(|e| GeneratorError::CreateDir {
        path: dir.display().to_string(),
        source: e,
    })?;

    if let Some(manifest) = read_manifest(dir) {
        for name in &manifest.files {
            if !is_plain_file_name(name) {
                warn!(dir = %dir.display(), entry = %name, "Ignoring manifest entry outside the directory");
                continue;
            }
            remove_entry(&dir.join(name), true)?;
        }
    }

    let entries = fs::read_dir(dir).map_err(|e| GeneratorError::ReadDir {
        path: dir.display().to_string(),
        source: e,
    })?;

    for entry in entries {
        let entry = entry.map_err(|e| GeneratorError::ReadDir {
            path: dir.display().to_string(),
            source: e,
        })?;

        if entry.file_name().to_string_lossy().starts_with(prefix) {
            remove_entry(&entry.path(), false)?;
        }
    }

    remove_entry(&dir.join(MANIFEST_FILE), true)
}

/// Deletes a file or an empty directory.
fn remove_entry(path: &Path, missing_ok: bool) -> Result<(), GeneratorError> {
    let result = match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => fs::remove_dir(path),
        Ok(_) => fs::remove_file(path),
        Err(e) => Err(e),
    };

    match result {
        Ok(()) => {
            debug!(path = %path.display(), "Removed stale artifact");
            Ok(())
        }
        Err(e) if missing_ok && e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(GeneratorError::Cleanup {
            path: path.display().to_string(),
            source: e,
        }),
    }
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && name != MANIFEST_FILE
        && !name.contains(['/', '\\'])
}

/// Reads the manifest of `dir`, if present and readable.
///
/// A manifest that cannot be parsed is reported and treated as absent.
pub fn read_manifest(dir: &Path) -> Option<Manifest> {
    let path = dir.join(MANIFEST_FILE);
    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Cannot read manifest, falling back to prefix scan");
            return None;
        }
    };

    match serde_json::from_str(&text) {
        Ok(manifest) => Some(manifest),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Corrupt manifest, falling back to prefix scan");
            None
        }
    }
}

/// Records every prefixed file currently in `dir`.
///
/// ## Errors
///
/// Returns [`GeneratorError::ReadDir`] or [`GeneratorError::WriteError`].
pub fn write_manifest(dir: &Path, prefix: &str) -> Result<Manifest, GeneratorError> {
    let entries = fs::read_dir(dir).map_err(|e| GeneratorError::ReadDir {
        path: dir.display().to_string(),
        source: e,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| GeneratorError::ReadDir {
            path: dir.display().to_string(),
            source: e,
        })?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with(prefix) {
            files.push(name);
        }
    }
    files.sort();

    let manifest = Manifest {
        prefix: prefix.to_string(),
        files,
    };
    let json = serde_json::to_string_pretty(&manifest).map_err(|e| GeneratorError::WriteError {
        path: dir.join(MANIFEST_FILE).display().to_string(),
        source: io::Error::other(e),
    })?;

    write_atomic(&dir.join(MANIFEST_FILE), &format!("{json}\n"))?;
    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn prepare_creates_missing_directories() {
        let temp_dir = TempDir::new().unwrap();
        let types = temp_dir.path().join("pkg/types");
        let controllers = temp_dir.path().join("pkg/controllers");

        prepare_dirs(&[&types, &controllers], "zz_generated").unwrap();

        assert!(types.is_dir());
        assert!(controllers.is_dir());
    }

    #[test]
    fn prepare_removes_only_prefixed_entries() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        fs::write(dir.join("zz_generated_pod.rs"), "").unwrap();
        fs::write(dir.join("zz_generated_old.rs"), "").unwrap();
        fs::write(dir.join("mod.rs"), "").unwrap();
        fs::write(dir.join("handwritten_zz_generated.rs"), "").unwrap();

        prepare_dirs(&[dir], "zz_generated").unwrap();

        assert!(!dir.join("zz_generated_pod.rs").exists());
        assert!(!dir.join("zz_generated_old.rs").exists());
        assert!(dir.join("mod.rs").exists());
        assert!(dir.join("handwritten_zz_generated.rs").exists());
    }

    #[test]
    fn prepare_removes_manifest_entries_under_old_prefix() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        fs::write(dir.join("gen_pod.rs"), "").unwrap();
        fs::write(dir.join("keep.rs"), "").unwrap();
        write_manifest(dir, "gen").unwrap();

        prepare_dirs(&[dir], "zz_generated").unwrap();

        assert!(!dir.join("gen_pod.rs").exists());
        assert!(dir.join("keep.rs").exists());
        assert!(!dir.join(MANIFEST_FILE).exists());
    }

    #[test]
    fn manifest_entries_outside_directory_are_ignored() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("out");
        fs::create_dir(&dir).unwrap();
        fs::write(temp_dir.path().join("victim.rs"), "").unwrap();
        fs::write(
            dir.join(MANIFEST_FILE),
            r#"{"prefix":"zz_generated","files":["../victim.rs"]}"#,
        )
        .unwrap();

        prepare_dirs(&[&dir], "zz_generated").unwrap();

        assert!(temp_dir.path().join("victim.rs").exists());
    }

    #[test]
    fn corrupt_manifest_falls_back_to_prefix_scan() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        fs::write(dir.join(MANIFEST_FILE), "not json").unwrap();
        fs::write(dir.join("zz_generated_pod.rs"), "").unwrap();

        prepare_dirs(&[dir], "zz_generated").unwrap();

        assert!(!dir.join("zz_generated_pod.rs").exists());
        assert!(!dir.join(MANIFEST_FILE).exists());
    }

    #[test]
    fn non_empty_prefixed_directory_fails_with_path() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        let stuck = dir.join("zz_generated_stuck");
        fs::create_dir(&stuck).unwrap();
        fs::write(stuck.join("inner.rs"), "").unwrap();

        match prepare_dirs(&[dir], "zz_generated") {
            Err(GeneratorError::Cleanup { path, .. }) => {
                assert!(path.ends_with("zz_generated_stuck"));
            }
            other => panic!("Unexpected result: {:?}", other),
        }
    }

    #[test]
    fn empty_prefixed_directory_is_removed() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        fs::create_dir(dir.join("zz_generated_empty")).unwrap();

        prepare_dirs(&[dir], "zz_generated").unwrap();

        assert!(!dir.join("zz_generated_empty").exists());
    }

    #[test]
    fn write_manifest_lists_sorted_prefixed_files() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path();
        fs::write(dir.join("zz_generated_service.rs"), "").unwrap();
        fs::write(dir.join("zz_generated_pod.rs"), "").unwrap();
        fs::write(dir.join("mod.rs"), "").unwrap();

        write_manifest(dir, "zz_generated").unwrap();

        let manifest = read_manifest(dir).unwrap();
        assert_eq!(manifest.prefix, "zz_generated");
        assert_eq!(manifest.files, ["zz_generated_pod.rs", "zz_generated_service.rs"]);
    }

    #[test]
    fn missing_manifest_reads_as_none() {
        let temp_dir = TempDir::new().unwrap();
        assert!(read_manifest(temp_dir.path()).is_none());
    }
}
