//! Parser for the textual path notation.

use crate::types::{Path, PathStep};
use crate::{PathError, MAX_PATH_DEPTH, ROOT};

/// Parse a full path (`root.a[0]["x.y"]`) into its steps.
///
/// # Example
///
/// ```
/// use json_field_path::{parse_path, PathStep};
///
/// assert_eq!(parse_path("root").unwrap(), Vec::<PathStep>::new());
/// assert_eq!(
///     parse_path("root.items[1]").unwrap(),
///     vec![PathStep::Key("items".into()), PathStep::Index(1)],
/// );
/// assert!(parse_path("items[1]").is_err());
/// ```
pub fn parse_path(path: &str) -> Result<Path, PathError> {
    let rest = path.strip_prefix(ROOT).ok_or(PathError::MissingRoot)?;
    parse_steps(rest, ROOT.len())
}

/// Parse a path with its `root` prefix already stripped (`a[0].b`,
/// `[0].b`, or the empty string for the root itself).
pub fn parse_relative_path(path: &str) -> Result<Path, PathError> {
    if path.is_empty() || path.starts_with('[') || path.starts_with('.') {
        return parse_steps(path, 0);
    }
    let mut dotted = String::with_capacity(path.len() + 1);
    dotted.push('.');
    dotted.push_str(path);
    parse_steps(&dotted, 0)
}

fn parse_steps(input: &str, offset: usize) -> Result<Path, PathError> {
    let bytes = input.as_bytes();
    let mut steps = Vec::new();
    let mut pos = 0;
    while pos < bytes.len() {
        if steps.len() == MAX_PATH_DEPTH {
            return Err(PathError::PathTooLong);
        }
        match bytes[pos] {
            b'.' => {
                let start = pos + 1;
                let end = input[start..]
                    .find(['.', '['])
                    .map_or(input.len(), |i| start + i);
                let key = &input[start..end];
                if key.is_empty() || key.contains([']', '"']) {
                    return Err(PathError::UnexpectedChar(offset + start));
                }
                steps.push(PathStep::Key(key.to_string()));
                pos = end;
            }
            b'[' => {
                let start = pos + 1;
                if bytes.get(start) == Some(&b'"') {
                    let end = quoted_end(bytes, start)
                        .ok_or(PathError::UnterminatedBracket(offset + pos))?;
                    let key: String = serde_json::from_str(&input[start..=end])
                        .map_err(|_| PathError::InvalidQuotedKey(offset + start))?;
                    if bytes.get(end + 1) != Some(&b']') {
                        return Err(PathError::UnterminatedBracket(offset + pos));
                    }
                    steps.push(PathStep::Key(key));
                    pos = end + 2;
                } else {
                    let close = input[start..]
                        .find(']')
                        .map(|i| start + i)
                        .ok_or(PathError::UnterminatedBracket(offset + pos))?;
                    let digits = &input[start..close];
                    if !crate::is_index(digits) {
                        return Err(PathError::InvalidIndex(digits.to_string()));
                    }
                    let idx = digits
                        .parse::<usize>()
                        .map_err(|_| PathError::InvalidIndex(digits.to_string()))?;
                    steps.push(PathStep::Index(idx));
                    pos = close + 1;
                }
            }
            _ => return Err(PathError::UnexpectedChar(offset + pos)),
        }
    }
    Ok(steps)
}

/// Index of the closing quote of a JSON string literal starting at `open`.
fn quoted_end(bytes: &[u8], open: usize) -> Option<usize> {
    let mut i = open + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return Some(i),
            _ => i += 1,
        }
    }
    None
}
