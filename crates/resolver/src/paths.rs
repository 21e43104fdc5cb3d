//! Lexical path helpers shared by the engine and the default file resolver.

use std::path::{Component, Path, PathBuf};

use crate::errors::{ResolverError, Result};

const FILE_URL_SCHEME: &str = "file://";

/// Normalize `.` and `..` components without touching the file system.
///
/// `..` never climbs above the root of an absolute path; leading `..`
/// components of a relative path are kept.
pub fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match normalized.components().next_back() {
                Some(Component::Normal(_)) => {
                    normalized.pop();
                }
                Some(Component::RootDir) | Some(Component::Prefix(_)) => {}
                _ => normalized.push(".."),
            },
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}

/// Make `path` absolute against the process working directory, then normalize.
pub fn absolutize(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(normalize(path));
    }
    let cwd = std::env::current_dir().map_err(|e| ResolverError::io(path, e))?;
    Ok(normalize(&cwd.join(path)))
}

/// Turn a `file://` URL into a path string; other strings pass through.
pub fn strip_file_url(location: &str) -> &str {
    let Some(rest) = location.strip_prefix(FILE_URL_SCHEME) else {
        return location;
    };
    let rest = rest.strip_prefix("localhost").unwrap_or(rest);

    // file:///C:/dir -> C:/dir
    let bytes = rest.as_bytes();
    if bytes.len() >= 3 && bytes[0] == b'/' && bytes[1].is_ascii_alphabetic() && bytes[2] == b':' {
        return &rest[1..];
    }
    rest
}

/// Extension of the final path component, without the dot.
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| ext.to_string_lossy().into_owned())
        .filter(|ext| !ext.is_empty())
}

/// Whether `path` is explicitly relative to its anchor (`./x`, `../x`).
pub fn is_file_relative(path: &str) -> bool {
    path == "."
        || path == ".."
        || path.starts_with("./")
        || path.starts_with("../")
        || path.starts_with(".\\")
        || path.starts_with("..\\")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
        assert_eq!(normalize(Path::new("/../a")), PathBuf::from("/a"));
        assert_eq!(normalize(Path::new("../a/./b")), PathBuf::from("../a/b"));
        assert_eq!(normalize(Path::new("a/../../b")), PathBuf::from("../b"));
    }

    #[test]
    fn test_strip_file_url() {
        assert_eq!(strip_file_url("file:///lib/cat.usda"), "/lib/cat.usda");
        assert_eq!(strip_file_url("file://localhost/lib/cat.usda"), "/lib/cat.usda");
        assert_eq!(strip_file_url("file:///C:/lib/cat.usda"), "C:/lib/cat.usda");
        assert_eq!(strip_file_url("relative/cat.usda"), "relative/cat.usda");
    }

    #[test]
    fn test_extension_of() {
        assert_eq!(extension_of(Path::new("/a/b.usda")), Some("usda".to_string()));
        assert_eq!(extension_of(Path::new("/a/b.tar.gz")), Some("gz".to_string()));
        assert_eq!(extension_of(Path::new("/a/b")), None);
        assert_eq!(extension_of(Path::new("/a/.hidden")), None);
    }

    #[test]
    fn test_is_file_relative() {
        assert!(is_file_relative("./a.usd"));
        assert!(is_file_relative("../a.usd"));
        assert!(!is_file_relative("a.usd"));
        assert!(!is_file_relative(".hidden/a.usd"));
    }

    #[test]
    fn test_absolutize_keeps_absolute() {
        assert_eq!(absolutize(Path::new("/a/../b")).unwrap(), PathBuf::from("/b"));
        assert!(absolutize(Path::new("rel/a.usd")).unwrap().is_absolute());
    }
}
