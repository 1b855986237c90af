//! Path normalization utilities
//!
//! Ensures all paths are normalized to use '/' as separator and are relative to root.

use std::path::Path;

/// Normalize a path to use '/' as separator (for cross-platform consistency)
pub fn normalize_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Make a path relative to the root directory
pub fn make_relative(path: &Path, root: &Path) -> Option<String> {
    path.strip_prefix(root).ok().map(normalize_path)
}

/// Document name for a root-relative path: the path without its extension.
///
/// `docs/CHANGELOG.rst` becomes `docs/CHANGELOG`; extensionless names are
/// returned unchanged.
pub fn docname(relative: &str) -> String {
    let (dir, file) = match relative.rfind('/') {
        Some(idx) => relative.split_at(idx + 1),
        None => ("", relative),
    };
    let stem = match file.rfind('.') {
        Some(idx) if idx > 0 => &file[..idx],
        _ => file,
    };
    format!("{dir}{stem}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(normalize_path(Path::new("docs/news.md")), "docs/news.md");
    }

    #[test]
    fn test_make_relative() {
        let root = Path::new("/project");
        let path = Path::new("/project/docs/changelog.rst");
        assert_eq!(
            make_relative(path, root),
            Some("docs/changelog.rst".to_string())
        );
    }

    #[test]
    fn test_make_relative_not_under_root() {
        let root = Path::new("/project");
        let path = Path::new("/other/file.md");
        assert_eq!(make_relative(path, root), None);
    }

    #[test]
    fn test_docname() {
        assert_eq!(docname("CHANGELOG.md"), "CHANGELOG");
        assert_eq!(docname("docs/release-notes.rst"), "docs/release-notes");
        assert_eq!(docname("NEWS"), "NEWS");
        assert_eq!(docname("docs.v2/HISTORY"), "docs.v2/HISTORY");
        assert_eq!(docname("notes/.hidden"), "notes/.hidden");
        assert_eq!(docname("a.b.txt"), "a.b");
    }
}
