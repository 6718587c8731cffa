//! Filename protocol for the shared directory.
//!
//! A request is `<prefix>-input-<token>`; its response is the same path with the
//! first `-input-` replaced by `-output-`. Files ending in `.tmp` are transient
//! write targets and never count as requests.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

pub const INPUT_MARKER: &str = "-input-";
pub const OUTPUT_MARKER: &str = "-output-";
pub const TMP_SUFFIX: &str = ".tmp";

/// Default file name prefix used by the shell plugin.
pub const DEFAULT_PREFIX: &str = "zsh-ai";

/// True iff `path` contains the input marker, does not contain the output marker,
/// and does not end in `.tmp`. Non UTF-8 paths are never eligible.
pub fn is_eligible(path: &Path) -> bool {
    match path.to_str() {
        Some(s) => {
            s.contains(INPUT_MARKER) && !s.contains(OUTPUT_MARKER) && !s.ends_with(TMP_SUFFIX)
        }
        None => false,
    }
}

/// The response path paired with a request path, or `None` if `path` carries no
/// input marker.
pub fn response_path(path: &Path) -> Option<PathBuf> {
    let s = path.to_str()?;
    if !s.contains(INPUT_MARKER) {
        return None;
    }
    Some(PathBuf::from(s.replacen(INPUT_MARKER, OUTPUT_MARKER, 1)))
}

/// The `.tmp` sibling a file is staged in before being renamed into place.
pub fn tmp_sibling(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(TMP_SUFFIX);
    PathBuf::from(name)
}

/// Leftovers the startup sweep removes: input-role files and `.tmp` files.
/// Response files are left alone.
pub fn is_stale(file_name: &str) -> bool {
    file_name.ends_with(TMP_SUFFIX)
        || (file_name.contains(INPUT_MARKER) && !file_name.contains(OUTPUT_MARKER))
}

/// `<prefix>-input-<token>`
pub fn request_file_name(prefix: &str, token: &str) -> String {
    format!("{prefix}{INPUT_MARKER}{token}")
}
