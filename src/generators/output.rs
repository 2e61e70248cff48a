// Copyright © 2024 Folio. All rights reserved.
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Output root management: every build starts from an empty directory.

use crate::{FolioError, Result};
use log::debug;
use std::fs;
use std::path::Path;

/// Deletes `path` if it exists, then recreates it as an empty directory.
///
/// Missing parent directories are created. A regular file at `path` is
/// removed too.
pub fn reset_output_dir(path: &Path) -> Result<()> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => {
            debug!("Removing previous output at {}", path.display());
            fs::remove_dir_all(path)
                .map_err(|e| FolioError::io_error(path.to_path_buf(), e))?;
        }
        Ok(_) => {
            fs::remove_file(path)
                .map_err(|e| FolioError::io_error(path.to_path_buf(), e))?;
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => return Err(FolioError::io_error(path.to_path_buf(), e)),
    }

    fs::create_dir_all(path)
        .map_err(|e| FolioError::io_error(path.to_path_buf(), e))
}
