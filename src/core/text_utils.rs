//! Text manipulation utilities for working with skin source.

/// Check if a character can appear in a definition or variable name.
///
/// Skin names allow dots (`Button.hover`), brackets (`sprite[icon]`) and
/// slashes for namespace qualification (`NS/Name`).
#[inline]
pub fn is_name_character(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '/' | '[' | ']' | '-')
}

/// Check if a character can appear in a `$variable` name.
///
/// Variable names are narrower than definition names: dots participate
/// (`$Theme.spacing`) but slashes and brackets do not.
#[inline]
pub fn is_variable_character(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.')
}

/// Extract the symbol at a byte offset within a single string.
///
/// Returns `(start, end)` byte bounds of the name the offset falls in,
/// or `None` when the offset sits on a separator.
pub fn name_bounds_at(text: &str, offset: usize) -> Option<(usize, usize)> {
    if offset > text.len() {
        return None;
    }
    let bytes = text.as_bytes();
    let at_name = |i: usize| i < bytes.len() && is_name_character(bytes[i] as char);
    if !at_name(offset) && (offset == 0 || !at_name(offset - 1)) {
        return None;
    }

    let mut start = offset;
    while start > 0 && at_name(start - 1) {
        start -= 1;
    }
    let mut end = offset;
    while at_name(end) {
        end += 1;
    }
    Some((start, end))
}

/// Extract the `$variable` token covering a byte offset, if any.
///
/// The returned string includes the leading `$`.
pub fn variable_at(text: &str, offset: usize) -> Option<(usize, String)> {
    let bytes = text.as_bytes();
    let len = bytes.len();
    if len == 0 {
        return None;
    }
    let mut i = offset.min(len);
    let start = loop {
        if i < len && bytes[i] == b'$' {
            break i;
        }
        if i == 0 {
            return None;
        }
        let prev = bytes[i - 1];
        if prev == b'$' {
            break i - 1;
        }
        if !is_variable_character(prev as char) {
            return None;
        }
        i -= 1;
    };
    let mut end = start + 1;
    while end < len && is_variable_character(bytes[end] as char) {
        end += 1;
    }
    if end == start + 1 || offset > end {
        return None;
    }
    Some((start, text[start..end].to_string()))
}

/// Split a whitespace-separated list, keeping the token covering `offset`.
pub fn list_token_at(text: &str, offset: usize) -> Option<(usize, usize)> {
    let bytes = text.as_bytes();
    if offset > bytes.len() {
        return None;
    }
    let is_ws = |i: usize| i < bytes.len() && (bytes[i] as char).is_whitespace();
    if is_ws(offset) && (offset == 0 || is_ws(offset - 1)) {
        return None;
    }
    let mut start = offset.min(bytes.len());
    while start > 0 && !is_ws(start - 1) {
        start -= 1;
    }
    let mut end = offset;
    while end < bytes.len() && !is_ws(end) {
        end += 1;
    }
    if start == end {
        return None;
    }
    Some((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_bounds_at() {
        let text = "NS/Style.one other";
        assert_eq!(name_bounds_at(text, 0), Some((0, 12)));
        assert_eq!(name_bounds_at(text, 5), Some((0, 12)));
        assert_eq!(name_bounds_at(text, 12), Some((0, 12)));
        assert_eq!(name_bounds_at(text, 14), Some((13, 18)));
    }

    #[test]
    fn test_name_bounds_on_space() {
        assert_eq!(name_bounds_at("a b", 1), Some((0, 1)));
        assert_eq!(name_bounds_at("  b", 1), None);
    }

    #[test]
    fn test_variable_at() {
        let text = "Row_$i.end";
        assert_eq!(variable_at(text, 5), Some((4, "$i.end".to_string())));
        assert_eq!(variable_at(text, 8), Some((4, "$i.end".to_string())));
        assert_eq!(variable_at(text, 2), None);
    }

    #[test]
    fn test_variable_at_theme() {
        let text = "$Theme.spacing";
        assert_eq!(variable_at(text, 3), Some((0, "$Theme.spacing".to_string())));
    }

    #[test]
    fn test_list_token_at() {
        let text = "one two  three";
        assert_eq!(list_token_at(text, 0), Some((0, 3)));
        assert_eq!(list_token_at(text, 5), Some((4, 7)));
        assert_eq!(list_token_at(text, 10), Some((9, 14)));
        assert_eq!(list_token_at(text, 8), None);
    }
}
