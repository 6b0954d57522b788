//! Symbol extraction, find-references and rename.

use crate::base::{Location, Position, Range};
use crate::core::text_utils::{is_name_character, list_token_at, variable_at};
use crate::documents::DocumentManager;
use crate::model::ClassModel;
use crate::semantic::{ScopeOptions, ScopeResolver};
use crate::syntax::{token_at, NodeId, Token};

use super::goto::definitions_of;

/// What the symbol under the cursor is.
#[derive(Debug, Clone)]
pub enum SymbolContext {
    /// Inside an attribute value: one list token or `$variable`.
    Value {
        elem: String,
        attr: String,
        node: NodeId,
    },
    /// The name of a `<define>` attribute (a variable definition site).
    DefineName,
}

/// The symbol at a cursor position.
#[derive(Debug, Clone)]
pub struct Symbol {
    pub text: String,
    pub range: Range,
    pub context: SymbolContext,
}

/// One rename edit.
#[derive(Debug, Clone)]
pub struct RenameEdit {
    pub location: Location,
    pub new_text: String,
}

/// Extract the symbol at a position: a value token, a `$variable`, or a
/// `<define>` attribute name.
pub fn symbol_at(docs: &mut DocumentManager, uri: &str, position: Position) -> Option<Symbol> {
    let state = docs.get(uri)?;
    let offset = state.offset_at(position)?;

    match token_at(&state.text, offset) {
        Token::AttributeValue {
            tag,
            index,
            attrs,
            start,
            ..
        } => {
            let attr = attrs.get(index)?;
            let node = state.document.node_at_offset(offset)?;
            let rel = offset.saturating_sub(start);

            if let Some((var_start, var)) = variable_at(&attr.value, rel) {
                let abs = start + var_start;
                return Some(Symbol {
                    range: state.range_at(abs, abs + var.len()),
                    text: var,
                    context: SymbolContext::Value {
                        elem: tag,
                        attr: attr.name.clone(),
                        node,
                    },
                });
            }

            let (token_start, token_end) =
                list_token_at(&attr.value, rel).unwrap_or((0, attr.value.len()));
            if token_start == token_end {
                return None;
            }
            Some(Symbol {
                text: attr.value[token_start..token_end].to_string(),
                range: state.range_at(start + token_start, start + token_end),
                context: SymbolContext::Value {
                    elem: tag,
                    attr: attr.name.clone(),
                    node,
                },
            })
        }
        Token::AttributeName {
            tag, index, attrs, ..
        } if tag == "define" => {
            let attr = attrs.get(index)?;
            Some(Symbol {
                text: attr.name.clone(),
                range: state.range_at(attr.name_start, attr.name_end),
                context: SymbolContext::DefineName,
            })
        }
        _ => None,
    }
}

/// The range and text the editor may rename.
pub fn prepare_rename(
    docs: &mut DocumentManager,
    uri: &str,
    position: Position,
) -> Option<(Range, String)> {
    symbol_at(docs, uri, position).map(|s| (s.range, s.text))
}

/// Find every reference to the symbol at a position.
///
/// Occurrences of the literal text across the repository are kept only
/// when re-resolving the symbol at that occurrence leads back to one of
/// the original definitions (or the occurrence is a definition site
/// itself).
pub fn find_references(
    model: &ClassModel,
    scope: &mut ScopeResolver,
    docs: &mut DocumentManager,
    uri: &str,
    position: Position,
) -> Vec<Location> {
    let Some(symbol) = symbol_at(docs, uri, position) else {
        return Vec::new();
    };
    let definitions = definitions_of(model, scope, docs, uri, &symbol);
    if definitions.is_empty() {
        return Vec::new();
    }

    let uris = scope.scope_uris(uri, &ScopeOptions::foreign(), docs, Some(model));
    let mut out: Vec<Location> = Vec::new();

    for file_uri in uris {
        let Some(state) = docs.get(&file_uri) else {
            continue;
        };
        for start in occurrences(&state.text, &symbol.text) {
            let range = state.range_at(start, start + symbol.text.len());
            let location = Location::new(file_uri.clone(), range);
            if out.contains(&location) {
                continue;
            }

            // A hit inside one of the defining elements is the definition.
            let within_definition = definitions
                .iter()
                .any(|d| d.uri == file_uri && d.range.contains(range.start));
            if within_definition {
                out.push(location);
                continue;
            }

            let mid = state.position_at(start + symbol.text.len() / 2);
            if let Some(occurrence) = symbol_at(docs, &file_uri, mid) {
                if occurrence.text != symbol.text {
                    continue;
                }
                let resolved = definitions_of(model, scope, docs, &file_uri, &occurrence);
                if resolved.iter().any(|d| definitions.contains(d)) {
                    out.push(location);
                }
            }
        }
    }
    out
}

/// Apply a rename: every reference range gets the new text.
pub fn rename(
    model: &ClassModel,
    scope: &mut ScopeResolver,
    docs: &mut DocumentManager,
    uri: &str,
    position: Position,
    new_text: &str,
) -> Vec<RenameEdit> {
    find_references(model, scope, docs, uri, position)
        .into_iter()
        .map(|location| RenameEdit {
            location,
            new_text: new_text.to_string(),
        })
        .collect()
}

/// Literal occurrences of `needle` at name boundaries.
fn occurrences(text: &str, needle: &str) -> Vec<usize> {
    if needle.is_empty() {
        return Vec::new();
    }
    let bytes = text.as_bytes();
    let mut out = Vec::new();
    let mut from = 0;
    while let Some(rel) = text[from..].find(needle) {
        let start = from + rel;
        let end = start + needle.len();
        let boundary_before = start == 0
            || (!is_name_character(bytes[start - 1] as char) && bytes[start - 1] != b'$');
        let boundary_after = end >= bytes.len() || !is_name_character(bytes[end] as char);
        if boundary_before && boundary_after {
            out.push(start);
        }
        from = start + 1;
    }
    out
}
