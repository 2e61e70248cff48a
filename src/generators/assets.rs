// Copyright © 2024 Folio. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Static asset copying.

use crate::{FolioError, Result};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Recursively copies `source_dir` into `dest_dir`, merging with what is there.
///
/// A missing `source_dir` is a no-op. Files only present in `dest_dir` are
/// left alone; files with the same relative path are overwritten. Returns the
/// copied files, relative to `dest_dir`.
pub fn copy_assets(source_dir: &Path, dest_dir: &Path) -> Result<Vec<PathBuf>> {
    if !source_dir.exists() {
        debug!("No assets at {}, skipping", source_dir.display());
        return Ok(Vec::new());
    }

    let mut copied = Vec::new();
    for entry in WalkDir::new(source_dir).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            let path = e
                .path()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| source_dir.to_path_buf());
            FolioError::io_error(path, e.into())
        })?;

        let relative = entry
            .path()
            .strip_prefix(source_dir)
            .map_err(|e| FolioError::internal_error(e.to_string()))?;
        let target = dest_dir.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)
                .map_err(|e| FolioError::io_error(target.clone(), e))?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|e| {
                    FolioError::io_error(parent.to_path_buf(), e)
                })?;
            }
            _ = fs::copy(entry.path(), &target)
                .map_err(|e| FolioError::io_error(entry.path().to_path_buf(), e))?;
            debug!("Copied asset {}", target.display());
            copied.push(relative.to_path_buf());
        }
    }

    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_source_is_noop() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let dest = temp_dir.path().join("dist").join("assets");

        let copied = copy_assets(&temp_dir.path().join("absent"), &dest)?;

        assert!(copied.is_empty());
        assert!(!dest.exists());
        Ok(())
    }

    #[test]
    fn test_copies_nested_tree() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let src = temp_dir.path().join("assets");
        let dest = temp_dir.path().join("dist").join("assets");
        fs::create_dir_all(src.join("js"))?;
        fs::create_dir_all(src.join("empty"))?;
        fs::write(src.join("styles.css"), "body{}")?;
        fs::write(src.join("js").join("site.js"), "// js")?;

        let copied = copy_assets(&src, &dest)?;

        assert_eq!(
            copied,
            [PathBuf::from("js").join("site.js"), PathBuf::from("styles.css")]
        );
        assert_eq!(fs::read_to_string(dest.join("styles.css"))?, "body{}");
        assert_eq!(fs::read_to_string(dest.join("js").join("site.js"))?, "// js");
        assert!(dest.join("empty").is_dir());
        Ok(())
    }

    #[test]
    fn test_merges_into_existing_destination() -> Result<()> {
        let temp_dir = TempDir::new()?;
        let src = temp_dir.path().join("assets");
        let dest = temp_dir.path().join("out");
        fs::create_dir_all(&src)?;
        fs::create_dir_all(&dest)?;
        fs::write(src.join("styles.css"), "new")?;
        fs::write(dest.join("styles.css"), "old")?;
        fs::write(dest.join("keep.txt"), "keep")?;

        _ = copy_assets(&src, &dest)?;

        assert_eq!(fs::read_to_string(dest.join("styles.css"))?, "new");
        assert_eq!(fs::read_to_string(dest.join("keep.txt"))?, "keep");
        Ok(())
    }
}
