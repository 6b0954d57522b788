//! Raw-text tag scanner.
//!
//! Editors query positions inside tags that are still being typed, where
//! the recovered DOM may not reflect what is under the cursor. The scanner
//! re-reads the enclosing tag's bytes directly from the source and reports
//! what the offset sits on.

use super::parser::parse_attrs;
use crate::syntax::Attr;

/// An attribute as re-read from raw tag text.
pub type ScannedAttr = Attr;

/// What the cursor is on inside a tag.
#[derive(Debug, Clone)]
pub enum Token {
    /// Inside the tag name, right after `<` or `</`. For processing
    /// instructions the name includes the leading `?`.
    TagName {
        tag: String,
        closing: bool,
        start: usize,
        end: usize,
    },
    /// On an attribute name. `index == attrs.len()` means the cursor sits
    /// in whitespace where a new attribute would start.
    AttributeName {
        tag: String,
        index: usize,
        attrs: Vec<ScannedAttr>,
        before_cursor: String,
        start: usize,
        end: usize,
    },
    /// Inside an attribute value.
    AttributeValue {
        tag: String,
        index: usize,
        attrs: Vec<ScannedAttr>,
        before_cursor: String,
        start: usize,
        end: usize,
    },
    /// Not inside any tag.
    Invalid,
}

/// Determine what token the byte offset falls on.
pub fn token_at(text: &str, offset: usize) -> Token {
    let bytes = text.as_bytes();
    let offset = offset.min(bytes.len());

    // Walk the text up to the offset tracking whether we are inside a tag.
    let mut tag_start: Option<usize> = None;
    let mut in_quote: Option<u8> = None;
    let mut i = 0;
    while i < offset {
        let ch = bytes[i];
        if let Some(quote) = in_quote {
            if ch == quote {
                in_quote = None;
            }
        } else if tag_start.is_some() {
            match ch {
                b'"' | b'\'' => in_quote = Some(ch),
                b'>' => tag_start = None,
                _ => {}
            }
        } else if ch == b'<' {
            // Comments are opaque to the scanner.
            if text[i..].starts_with("<!--") {
                match text[i..].find("-->") {
                    Some(rel) => {
                        i += rel + 3;
                        continue;
                    }
                    None => return Token::Invalid,
                }
            }
            tag_start = Some(i);
        }
        i += 1;
    }

    let Some(tag_start) = tag_start else {
        return Token::Invalid;
    };

    // Find the end of this tag (quote state carried over from the walk).
    let mut tag_end = offset;
    while tag_end < bytes.len() {
        let ch = bytes[tag_end];
        if let Some(quote) = in_quote {
            if ch == quote {
                in_quote = None;
            }
        } else if ch == b'"' || ch == b'\'' {
            in_quote = Some(ch);
        } else if ch == b'>' || ch == b'<' {
            break;
        }
        tag_end += 1;
    }

    analyze_tag(text, tag_start, tag_end, offset)
}

fn analyze_tag(text: &str, tag_start: usize, tag_end: usize, offset: usize) -> Token {
    let bytes = text.as_bytes();
    let mut pos = tag_start + 1;
    let mut closing = false;
    if pos < tag_end && bytes[pos] == b'/' {
        closing = true;
        pos += 1;
    }

    let name_start = pos;
    // A leading '?' belongs to the instruction name.
    if pos < tag_end && bytes[pos] == b'?' {
        pos += 1;
    }
    while pos < tag_end
        && !bytes[pos].is_ascii_whitespace()
        && !matches!(bytes[pos], b'>' | b'/')
    {
        pos += 1;
    }
    let name_end = pos;
    let tag = text[name_start..name_end].to_string();

    if offset <= name_end {
        return Token::TagName {
            tag,
            closing,
            start: name_start,
            end: name_end,
        };
    }
    if closing {
        return Token::Invalid;
    }

    let attrs = parse_attrs(text, name_end, tag_end);
    for (index, attr) in attrs.iter().enumerate() {
        if offset >= attr.name_start && offset <= attr.name_end {
            let before_cursor = text[attr.name_start..offset].to_string();
            return Token::AttributeName {
                tag,
                index,
                start: attr.name_start,
                end: attr.name_end,
                before_cursor,
                attrs,
            };
        }
        if attr.value_end > attr.value_start || attr.value_start > attr.name_end {
            if offset >= attr.value_start && offset <= attr.value_end {
                let before_cursor = text[attr.value_start..offset].to_string();
                return Token::AttributeValue {
                    tag,
                    index,
                    start: attr.value_start,
                    end: attr.value_end,
                    before_cursor,
                    attrs,
                };
            }
        } else if attr.value_start == attr.value_end && attr.value_start >= attr.name_end {
            // Empty quoted value: the cursor may sit exactly between quotes.
            let inside_quotes = attr.value_start > attr.name_end && offset == attr.value_start;
            if inside_quotes {
                return Token::AttributeValue {
                    tag,
                    index,
                    start: attr.value_start,
                    end: attr.value_end,
                    before_cursor: String::new(),
                    attrs,
                };
            }
        }
    }

    // Whitespace between attributes: a new attribute would start here.
    let index = attrs.len();
    Token::AttributeName {
        tag,
        index,
        attrs,
        before_cursor: String::new(),
        start: offset,
        end: offset,
    }
}

/// Element names opened but not yet closed before `offset`, bottom of the
/// stack first. Drives close-tag completion.
pub fn pending_open_tags(text: &str, offset: usize) -> Vec<String> {
    let bytes = text.as_bytes();
    let offset = offset.min(bytes.len());
    let mut stack: Vec<String> = Vec::new();
    let mut i = 0;

    while i < offset {
        if bytes[i] != b'<' {
            i += 1;
            continue;
        }
        if text[i..].starts_with("<!--") {
            match text[i..].find("-->") {
                Some(rel) => i += rel + 3,
                None => break,
            }
            continue;
        }
        let mut pos = i + 1;
        if pos >= bytes.len() {
            break;
        }
        let closing = bytes[pos] == b'/';
        if closing {
            pos += 1;
        }
        if pos < bytes.len() && matches!(bytes[pos], b'?' | b'!') {
            // Instructions and declarations do not nest.
            while pos < bytes.len() && bytes[pos] != b'>' {
                pos += 1;
            }
            i = pos + 1;
            continue;
        }

        let name_start = pos;
        while pos < bytes.len()
            && !bytes[pos].is_ascii_whitespace()
            && !matches!(bytes[pos], b'>' | b'/')
        {
            pos += 1;
        }
        let name = &text[name_start..pos];

        // Quote-aware scan for the end of the tag.
        let mut in_quote: Option<u8> = None;
        while pos < bytes.len() {
            let ch = bytes[pos];
            if let Some(quote) = in_quote {
                if ch == quote {
                    in_quote = None;
                }
            } else if ch == b'"' || ch == b'\'' {
                in_quote = Some(ch);
            } else if ch == b'>' {
                break;
            }
            pos += 1;
        }
        let self_closing = pos > name_start && pos > 0 && bytes[pos - 1] == b'/';

        if closing {
            if let Some(found) = stack.iter().rposition(|open| open == name) {
                stack.truncate(found);
            }
        } else if !name.is_empty() && !self_closing {
            stack.push(name.to_string());
        }
        i = pos + 1;
    }

    stack
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_name_token() {
        let text = "<Skin><But";
        match token_at(text, 10) {
            Token::TagName { tag, closing, .. } => {
                assert_eq!(tag, "But");
                assert!(!closing);
            }
            other => panic!("expected tag name, got {other:?}"),
        }
    }

    #[test]
    fn test_attribute_name_token() {
        let text = r#"<Style name="A" col"#;
        match token_at(text, 19) {
            Token::AttributeName {
                tag,
                index,
                before_cursor,
                attrs,
                ..
            } => {
                assert_eq!(tag, "Style");
                assert_eq!(index, 1);
                assert_eq!(before_cursor, "col");
                assert_eq!(attrs[0].name, "name");
            }
            other => panic!("expected attribute name, got {other:?}"),
        }
    }

    #[test]
    fn test_attribute_value_token() {
        let text = r#"<Button style="My."/>"#;
        match token_at(text, 18) {
            Token::AttributeValue {
                tag,
                index,
                before_cursor,
                attrs,
                ..
            } => {
                assert_eq!(tag, "Button");
                assert_eq!(attrs[index].name, "style");
                assert_eq!(before_cursor, "My.");
            }
            other => panic!("expected attribute value, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_value_token() {
        let text = r#"<Style color=""/>"#;
        match token_at(text, 14) {
            Token::AttributeValue { before_cursor, .. } => assert!(before_cursor.is_empty()),
            other => panic!("expected attribute value, got {other:?}"),
        }
    }

    #[test]
    fn test_outside_tag_is_invalid() {
        assert!(matches!(token_at("<a>text</a>", 5), Token::Invalid));
    }

    #[test]
    fn test_instruction_name_includes_question_mark() {
        let text = "<Skin><?plat";
        match token_at(text, 12) {
            Token::TagName { tag, .. } => assert_eq!(tag, "?plat"),
            other => panic!("expected tag name, got {other:?}"),
        }
    }

    #[test]
    fn test_pending_open_tags() {
        let text = "<Skin>\n  <Styles><Style name=\"A\"/></Styles>\n  <Variant>\n  ";
        assert_eq!(pending_open_tags(text, text.len()), vec!["Skin", "Variant"]);
    }

    #[test]
    fn test_pending_open_tags_after_close() {
        let text = "<Skin><Form name=\"F\"></Form>";
        assert_eq!(pending_open_tags(text, text.len()), vec!["Skin"]);
    }
}
