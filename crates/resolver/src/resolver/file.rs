//! Default file resolver for plain (non-entity) asset paths.
//!
//! Three kinds of plain paths:
//! - absolute paths, used as-is after normalization
//! - file-relative paths (`./x`, `../x`), always anchored to the anchor's directory
//! - search paths (`x/y.usd`), anchored only when the anchored file exists,
//!   otherwise looked up under the working directory and then the search roots

use std::io::ErrorKind;
use std::path::Path;

use chrono::{DateTime, Utc};

use crate::context::ResolutionContext;
use crate::errors::{ResolverError, Result};
use crate::models::{ResolvedPath, Timestamp};
use crate::paths;

fn to_identifier(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn anchor_dir(anchor: Option<&ResolvedPath>) -> Option<&Path> {
    anchor
        .filter(|a| !a.is_empty())
        .and_then(|a| a.as_path().parent())
}

pub(crate) fn create_identifier(asset_path: &str, anchor: Option<&ResolvedPath>) -> String {
    if asset_path.is_empty() {
        return String::new();
    }

    let path = Path::new(asset_path);
    if path.is_absolute() {
        return to_identifier(&paths::normalize(path));
    }

    let file_relative = paths::is_file_relative(asset_path);
    match anchor_dir(anchor) {
        Some(dir) => {
            let anchored = paths::normalize(&dir.join(path));
            if file_relative || anchored.exists() {
                to_identifier(&anchored)
            } else {
                to_identifier(&paths::normalize(path))
            }
        }
        None if file_relative => paths::absolutize(path)
            .map(|p| to_identifier(&p))
            .unwrap_or_else(|_| to_identifier(&paths::normalize(path))),
        None => to_identifier(&paths::normalize(path)),
    }
}

pub(crate) fn create_identifier_for_new_asset(
    asset_path: &str,
    anchor: Option<&ResolvedPath>,
) -> Result<String> {
    if asset_path.is_empty() {
        return Ok(String::new());
    }

    let path = Path::new(asset_path);
    let identifier = match anchor_dir(anchor) {
        Some(dir) if !path.is_absolute() => paths::normalize(&dir.join(path)),
        _ => paths::absolutize(path)?,
    };
    Ok(to_identifier(&identifier))
}

pub(crate) fn resolve(asset_path: &str, context: &ResolutionContext) -> Result<ResolvedPath> {
    if asset_path.is_empty() {
        return Ok(ResolvedPath::empty());
    }

    let path = Path::new(asset_path);
    if path.is_absolute() || paths::is_file_relative(asset_path) {
        let absolute = paths::absolutize(path)?;
        return Ok(if absolute.exists() {
            ResolvedPath::new(absolute)
        } else {
            ResolvedPath::empty()
        });
    }

    let from_cwd = paths::absolutize(path)?;
    if from_cwd.exists() {
        return Ok(ResolvedPath::new(from_cwd));
    }

    match context.find_in_search_paths(path) {
        Some(found) => Ok(ResolvedPath::new(paths::absolutize(&found)?)),
        None => Ok(ResolvedPath::empty()),
    }
}

pub(crate) fn resolve_for_new_asset(asset_path: &str) -> Result<ResolvedPath> {
    if asset_path.is_empty() {
        return Ok(ResolvedPath::empty());
    }
    Ok(ResolvedPath::new(paths::absolutize(Path::new(asset_path))?))
}

pub(crate) fn extension(asset_path: &str) -> String {
    paths::extension_of(Path::new(asset_path)).unwrap_or_default()
}

/// Modification time from file metadata; none when the file is missing.
pub(crate) fn modification_timestamp(path: &Path) -> Result<Timestamp> {
    if path.as_os_str().is_empty() {
        return Ok(None);
    }

    match std::fs::metadata(path).and_then(|m| m.modified()) {
        Ok(modified) => Ok(Some(DateTime::<Utc>::from(modified))),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(ResolverError::io(path, e)),
    }
}

/// Whether a plain resolved path may be written.
pub(crate) fn check_writable(path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Err(ResolverError::io(
            path,
            std::io::Error::new(ErrorKind::InvalidInput, "empty resolved path"),
        ));
    }

    match std::fs::metadata(path) {
        Ok(metadata) if metadata.is_dir() => Err(ResolverError::io(
            path,
            std::io::Error::new(ErrorKind::InvalidInput, "resolved path is a directory"),
        )),
        Ok(metadata) if metadata.permissions().readonly() => Err(ResolverError::io(
            path,
            std::io::Error::new(ErrorKind::PermissionDenied, "file is read-only"),
        )),
        _ => Ok(()),
    }
}
