//! Field path utilities.
//!
//! Paths address a value from the document root using dots for object
//! properties and brackets for array positions: `root.a.b`,
//! `root.items[0].x`. Property names that cannot be written as a plain
//! dotted segment are quoted inside brackets (`root["a.b"]`), so a path
//! is always unique within one document.
//!
//! # Example
//!
//! ```
//! use json_field_path::{child_path, format_path, parse_relative_path, strip_root};
//!
//! let path = child_path(&child_path("root", "items", false), "0", true);
//! assert_eq!(path, "root.items[0]");
//! assert_eq!(strip_root(&path), "items[0]");
//!
//! let steps = parse_relative_path("items[0]").unwrap();
//! assert_eq!(format_path(&steps), path);
//! ```

use thiserror::Error;

pub mod types;
pub use types::{Path, PathStep};

mod parse;
pub use parse::{parse_path, parse_relative_path};

/// Path of the document root.
pub const ROOT: &str = "root";

/// Maximum number of steps the parsers accept.
pub const MAX_PATH_DEPTH: usize = 256;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("path must start with `root`")]
    MissingRoot,
    #[error("unterminated bracket at byte {0}")]
    UnterminatedBracket(usize),
    #[error("invalid array index `{0}`")]
    InvalidIndex(String),
    #[error("invalid quoted key at byte {0}")]
    InvalidQuotedKey(usize),
    #[error("unexpected character at byte {0}")]
    UnexpectedChar(usize),
    #[error("path too deep")]
    PathTooLong,
}

/// Returns `true` when `key` can be written as `.key`.
///
/// ```
/// use json_field_path::is_plain_key;
///
/// assert!(is_plain_key("name"));
/// assert!(!is_plain_key("a.b"));
/// assert!(!is_plain_key(""));
/// ```
pub fn is_plain_key(key: &str) -> bool {
    !key.is_empty() && !key.contains(['.', '[', ']', '"'])
}

/// Returns `true` for canonical non-negative decimal integers (`0`, `17`,
/// but not `01` or `-1`).
pub fn is_index(s: &str) -> bool {
    match s.as_bytes() {
        [] => false,
        [b'0'] => true,
        [b'0', ..] => false,
        bytes => bytes.iter().all(u8::is_ascii_digit),
    }
}

/// JSON-quotes a property name for the bracketed form.
pub(crate) fn quote_key(key: &str) -> String {
    serde_json::Value::String(key.to_string()).to_string()
}

/// Appends one step to `parent`.
///
/// Children of arrays are written `[key]`, children of objects `.key`
/// (or `["key"]` when the key is not plain).
pub fn child_path(parent: &str, key: &str, parent_is_array: bool) -> String {
    let mut out = String::with_capacity(parent.len() + key.len() + 2);
    out.push_str(parent);
    if parent_is_array {
        out.push('[');
        out.push_str(key);
        out.push(']');
    } else if is_plain_key(key) {
        out.push('.');
        out.push_str(key);
    } else {
        out.push('[');
        out.push_str(&quote_key(key));
        out.push(']');
    }
    out
}

/// Formats steps into a full path, starting at `root`.
///
/// ```
/// use json_field_path::{format_path, PathStep};
///
/// assert_eq!(format_path(&[]), "root");
/// assert_eq!(
///     format_path(&[PathStep::Key("a".into()), PathStep::Index(3)]),
///     "root.a[3]",
/// );
/// ```
pub fn format_path(steps: &[PathStep]) -> String {
    let mut out = String::from(ROOT);
    for step in steps {
        out.push_str(&step.to_string());
    }
    out
}

/// Strips the leading `root` segment and a following `.`, if present.
/// Paths whose first segment merely starts with `root` are returned as is.
///
/// ```
/// use json_field_path::strip_root;
///
/// assert_eq!(strip_root("root.a.b"), "a.b");
/// assert_eq!(strip_root("root[0].x"), "[0].x");
/// assert_eq!(strip_root("root"), "");
/// assert_eq!(strip_root("a.b"), "a.b");
/// assert_eq!(strip_root("rooted.x"), "rooted.x");
/// ```
pub fn strip_root(path: &str) -> &str {
    match path.strip_prefix(ROOT) {
        Some("") => "",
        Some(rest) if rest.starts_with('[') => rest,
        Some(rest) => rest.strip_prefix('.').unwrap_or(path),
        None => path,
    }
}
