//! Key path lookup
//!
//! Dot notation with optional `$.` prefix and array indexing
//! (`items[0]`, `items[-1]`).

use serde_json::Value;

/// Locate the value at `key_path`, or the root when no path is given
pub fn value_at_key_path<'a>(value: &'a Value, key_path: Option<&str>) -> Option<&'a Value> {
    let Some(path) = key_path else {
        return Some(value);
    };
    let path = path.strip_prefix("$.").unwrap_or(path);
    if path.is_empty() || path == "$" {
        return Some(value);
    }

    let mut current = value;
    for part in path.split('.') {
        if let Some(bracket_pos) = part.find('[') {
            let name = &part[..bracket_pos];
            let index_str = part[bracket_pos + 1..].strip_suffix(']')?;

            if !name.is_empty() {
                current = current.get(name)?;
            }

            let index = index_str.parse::<i64>().ok()?;
            let Value::Array(arr) = current else {
                return None;
            };
            #[allow(clippy::cast_possible_wrap)]
            let idx = if index < 0 {
                usize::try_from(arr.len() as i64 + index).ok()?
            } else {
                usize::try_from(index).ok()?
            };
            current = arr.get(idx)?;
        } else {
            current = current.get(part)?;
        }
    }

    Some(current)
}
