//! Type definitions for field paths.

use std::fmt;

/// One step of a field path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathStep {
    /// An object property name.
    Key(String),
    /// A position within an array.
    Index(usize),
}

impl fmt::Display for PathStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathStep::Key(key) if crate::is_plain_key(key) => write!(f, ".{key}"),
            PathStep::Key(key) => write!(f, "[{}]", crate::quote_key(key)),
            PathStep::Index(idx) => write!(f, "[{idx}]"),
        }
    }
}

/// A parsed field path, root excluded.
pub type Path = Vec<PathStep>;
