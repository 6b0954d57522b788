//! Go-to-definition.

use crate::base::{Location, Position, Range};
use crate::documents::DocumentManager;
use crate::model::{AttrTypeMask, ClassModel};
use crate::semantic::{DefinitionKind, ScopeOptions, ScopeResolver, VariableResolver};

use super::references::{symbol_at, Symbol, SymbolContext};

/// Definition kinds a type mask can reference, in lookup order.
pub(crate) fn definition_kinds(mask: AttrTypeMask) -> Vec<DefinitionKind> {
    let mut kinds = Vec::new();
    if mask.intersects(AttrTypeMask::STYLE | AttrTypeMask::STYLE_ARRAY) {
        kinds.push(DefinitionKind::Style);
    }
    if mask.contains(AttrTypeMask::IMAGE) {
        kinds.push(DefinitionKind::Image);
    }
    if mask.contains(AttrTypeMask::SHAPE) {
        kinds.push(DefinitionKind::Shape);
    }
    if mask.contains(AttrTypeMask::FONT) {
        kinds.push(DefinitionKind::Font);
    }
    if mask.contains(AttrTypeMask::FORM) {
        kinds.push(DefinitionKind::Form);
    }
    if mask.contains(AttrTypeMask::COLOR) {
        kinds.push(DefinitionKind::Color);
    }
    kinds
}

/// Definitions of the symbol at a position.
pub fn find_symbol_definitions(
    model: &ClassModel,
    scope: &mut ScopeResolver,
    docs: &mut DocumentManager,
    uri: &str,
    position: Position,
) -> Vec<Location> {
    let Some(symbol) = symbol_at(docs, uri, position) else {
        return Vec::new();
    };
    definitions_of(model, scope, docs, uri, &symbol)
}

/// Definitions of an already-extracted symbol.
pub(crate) fn definitions_of(
    model: &ClassModel,
    scope: &mut ScopeResolver,
    docs: &mut DocumentManager,
    uri: &str,
    symbol: &Symbol,
) -> Vec<Location> {
    match &symbol.context {
        SymbolContext::DefineName => {
            // Its own location, useful as the anchor for find-references.
            vec![Location::new(uri, symbol.range)]
        }
        SymbolContext::Value { elem, attr, node } => {
            if symbol.text.starts_with('$') {
                let mut resolver = VariableResolver::new(scope, docs, Some(model));
                return resolver.find_define_sites(uri, *node, &symbol.text, false);
            }

            let mask = model
                .find_attribute_type(elem, attr)
                .map(|t| t.mask)
                .unwrap_or_default();
            for kind in definition_kinds(mask) {
                let found = scope.lookup_definition(
                    kind,
                    &symbol.text,
                    uri,
                    Some(*node),
                    &ScopeOptions::default(),
                    docs,
                    Some(model),
                );
                if !found.is_empty() {
                    return found.into_iter().map(|f| f.location).collect();
                }
            }

            if mask.contains(AttrTypeMask::URI) {
                if let Some(path) = scope.resolve_value_uri(&symbol.text, uri) {
                    return vec![Location::new(
                        path.to_string_lossy().as_ref(),
                        Range::default(),
                    )];
                }
            }

            // No concrete type matched; treat the text as a variable.
            let mut resolver = VariableResolver::new(scope, docs, Some(model));
            resolver.find_define_sites(uri, *node, &symbol.text, false)
        }
    }
}
