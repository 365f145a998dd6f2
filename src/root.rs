use std::path::PathBuf;

/// Characters that start glob syntax. Anything before the first of these is
/// a plain filesystem path.
pub(crate) const GLOB_META: [char; 4] = ['*', '?', '[', '{'];

pub(crate) fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

/// Split a pattern into its constant filesystem root and the glob remainder.
///
/// - No glob metacharacter: the whole pattern is the root, the remainder is empty.
/// - No separator before the first metacharacter: the root is `.`.
/// - Otherwise the root runs up to and including the last separator before
///   the first metacharacter.
///
/// An empty pattern is treated as `*`.
///
/// ```
/// assert_eq!(globex::split_root("src/lib.rs"), (String::from("src/lib.rs"), String::new()));
/// assert_eq!(globex::split_root("path\\*.jpg"), (String::from("path\\"), String::from("*.jpg")));
/// assert_eq!(globex::split_root("*.rs"), (String::from("."), String::from("*.rs")));
/// ```
pub fn split_root(pattern: &str) -> (String, String) {
    let pattern = if pattern.is_empty() { "*" } else { pattern };

    let Some(meta) = pattern.find(GLOB_META) else {
        return (pattern.to_string(), String::new());
    };

    match pattern[..meta].rfind(is_separator) {
        None => (".".to_string(), pattern.to_string()),
        Some(sep) => {
            let (root, rest) = pattern.split_at(sep + 1);
            (root.to_string(), rest.to_string())
        }
    }
}

/// Filesystem form of an extracted root. Patterns accept `\` as a separator
/// on every platform; off Windows it has to become `/` before the path is
/// handed to the OS. Trailing separators are dropped unless the root is a
/// filesystem or drive root.
pub(crate) fn fs_path(root: &str) -> PathBuf {
    let trimmed = root.trim_end_matches(is_separator);
    let root = if trimmed.is_empty() || trimmed.ends_with(':') {
        root
    } else {
        trimmed
    };

    if cfg!(windows) {
        PathBuf::from(root)
    } else {
        PathBuf::from(root.replace('\\', "/"))
    }
}
