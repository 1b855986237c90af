//! Changelog detection by filename markers

/// True iff the lowercased `name` contains any of the lowercased `markers`.
///
/// Markers match anywhere in the name, including directory components of a
/// docname such as `releases/index`.
pub fn is_changelog_file<S: AsRef<str>>(name: &str, markers: &[S]) -> bool {
    let name = name.to_lowercase();
    markers
        .iter()
        .map(|m| m.as_ref().to_lowercase())
        .any(|m| !m.is_empty() && name.contains(&m))
}
