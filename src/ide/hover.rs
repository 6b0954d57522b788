//! Hover rendering.

use crate::base::{Position, Range};
use crate::documents::DocumentManager;
use crate::model::{ClassModel, Documentation};
use crate::semantic::{DefinitionKind, ScopeOptions, ScopeResolver, VariableResolver};
use crate::syntax::{token_at, Token};

use super::goto::definition_kinds;

/// Markdown hover content with the range it applies to.
#[derive(Debug, Clone)]
pub struct HoverResult {
    pub contents: String,
    pub range: Range,
}

fn render_doc(out: &mut String, doc: &Documentation) {
    if let Some(brief) = &doc.brief {
        out.push_str("\n\n");
        out.push_str(brief);
    }
    if let Some(detailed) = &doc.detailed {
        out.push_str("\n\n");
        out.push_str(detailed);
    }
    if let Some(code) = &doc.code {
        out.push_str("\n\n```xml\n");
        out.push_str(code);
        out.push_str("\n```");
    }
}

/// Hover for the token at a position.
pub fn hover(
    model: &ClassModel,
    scope: &mut ScopeResolver,
    docs: &mut DocumentManager,
    uri: &str,
    position: Position,
) -> Option<HoverResult> {
    let state = docs.get(uri)?;
    let offset = state.offset_at(position)?;

    match token_at(&state.text, offset) {
        Token::TagName {
            tag, start, end, ..
        } => {
            let class = model.class(&tag).or_else(|| model.class_ci(&tag))?;
            let mut contents = format!("**{}**", class.name);
            if let Some(parent) = &class.parent {
                contents.push_str(&format!(" : {parent}"));
            }
            if class.is_abstract {
                contents.push_str(" *(abstract)*");
            }
            // Documentation is inherited from the nearest documented ancestor.
            let doc = model
                .parent_chain(&class.name)
                .into_iter()
                .map(|c| &c.doc)
                .find(|d| !d.is_empty());
            if let Some(doc) = doc {
                render_doc(&mut contents, doc);
            }
            Some(HoverResult {
                contents,
                range: state.range_at(start, end),
            })
        }
        Token::AttributeName {
            tag,
            index,
            attrs,
            start,
            end,
            ..
        } => {
            let attr = attrs.get(index)?;
            if tag == "define" {
                return Some(HoverResult {
                    contents: format!("**${}** — variable definition", attr.name),
                    range: state.range_at(start, end),
                });
            }
            let ty = model.find_attribute_type(&tag, &attr.name)?;
            let mut contents = format!("**{}**: {}", attr.name, ty.mask.describe());
            if ty.defining_class.as_ref() != tag {
                contents.push_str(&format!(" *(from {})*", ty.defining_class));
            }
            if let Some(doc) = model.attribute_docs(&tag, &attr.name) {
                render_doc(&mut contents, doc);
            }
            Some(HoverResult {
                contents,
                range: state.range_at(start, end),
            })
        }
        Token::AttributeValue {
            tag,
            index,
            attrs,
            start,
            end,
            ..
        } => {
            let attr = attrs.get(index)?;
            let value = attr.value.clone();
            let range = state.range_at(start, end);

            // Variables render their concrete expansions.
            if value.contains('$') {
                let node = state.document.node_at_offset(offset)?;
                let expansions = VariableResolver::new(scope, docs, Some(model))
                    .resolve(uri, node, &value);
                if expansions.len() != 1 || expansions[0] != value {
                    let mut contents = format!("**{value}** expands to:");
                    for expansion in expansions.iter().take(12) {
                        contents.push_str(&format!("\n- `{expansion}`"));
                    }
                    return Some(HoverResult { contents, range });
                }
            }

            // Enum entries carry model documentation.
            if let Some(doc) = model.enum_entry_docs(&tag, &attr.name, &value) {
                let mut contents = format!("**{value}**");
                render_doc(&mut contents, doc);
                return Some(HoverResult { contents, range });
            }

            // Definitions: show kind, qualified name and defining file.
            let mask = model.find_attribute_type(&tag, &attr.name)?.mask;
            let node = state.document.node_at_offset(offset)?;
            for kind in definition_kinds(mask) {
                let found = scope.lookup_definition(
                    kind,
                    &value,
                    uri,
                    Some(node),
                    &ScopeOptions::default(),
                    docs,
                    Some(model),
                );
                if let Some(first) = found.first() {
                    let mut contents =
                        format!("**{}** `{}`", first.kind.display(), first.name);
                    if first.external {
                        contents.push_str("\n\nProvided externally.");
                    } else {
                        contents.push_str(&format!("\n\nDefined in `{}`.", first.location.uri));
                        if kind == DefinitionKind::Style {
                            if let Some(chain) = style_inherit_chain(scope, first) {
                                contents.push_str(&format!("\n\nInherits: {chain}"));
                            }
                        }
                    }
                    return Some(HoverResult { contents, range });
                }
            }
            None
        }
        _ => None,
    }
}

/// Render a defined style's `inherit` chain, when it has one.
fn style_inherit_chain(
    scope: &ScopeResolver,
    found: &crate::semantic::FoundDefinition,
) -> Option<String> {
    let info = scope.info(&found.location.uri)?;
    let doc = &info.document;
    let local = found.name.rsplit('/').next().unwrap_or(&found.name);
    let node = doc
        .all_nodes()
        .find(|&id| {
            let n = doc.node(id);
            n.is_element()
                && (n.name == "Style" || n.name == "StyleAlias")
                && n.attr_value("name") == Some(local)
        })?;
    let inherit = doc.node(node).attr_value("inherit")?;
    if inherit.is_empty() {
        return None;
    }
    Some(
        inherit
            .split_whitespace()
            .map(|s| format!("`{s}`"))
            .collect::<Vec<_>>()
            .join(", "),
    )
}
