//! Utility methods
use std::path::{Path, PathBuf};

use crate::{HpoError, HpoResult};

/// Returns the absolute path of `path` without symlinks
///
/// The file itself does not have to exist (e.g. an output file that
/// will be created later). In that case the nearest existing parent
/// directory is resolved and the remaining components are appended.
pub(crate) fn canonical_path<P: AsRef<Path>>(path: P) -> HpoResult<PathBuf> {
    let path = path.as_ref();
    if let Ok(canonical) = path.canonicalize() {
        return Ok(canonical);
    }

    let Some(name) = path.file_name() else {
        return Err(HpoError::CannotOpenFile(path.display().to_string()));
    };

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => canonical_path(parent)?,
        _ => Path::new(".")
            .canonicalize()
            .map_err(|_| HpoError::CannotOpenFile(path.display().to_string()))?,
    };
    Ok(parent.join(name))
}
