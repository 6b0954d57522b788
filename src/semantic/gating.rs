//! Processing-instruction gating.
//!
//! Regions between `<?platform mac?>` and the bare terminator
//! `<?platform?>` only exist on that platform. `<?language …?>`,
//! `<?defined …?>`, `<?config …?>` and any `<?not:…?>` form make the
//! region conditional: definitions inside are still considered defined,
//! but never raise duplicate errors.
//!
//! Gates are evaluated by scanning preceding siblings at every ancestor
//! level — they are instructions in the node stream, not attributes.

use crate::syntax::{Document, Node, NodeId};

/// Directive families recognized in gating scans.
fn directive(node: &Node) -> Option<(&str, bool)> {
    if !node.is_instruction() {
        return None;
    }
    match node.name.strip_prefix("not:") {
        Some(rest) => Some((rest, true)),
        None => Some((node.name.as_str(), false)),
    }
}

fn is_platform_directive(name: &str) -> bool {
    name == "platform" || name == "desktop_platform"
}

fn is_optional_directive(name: &str) -> bool {
    matches!(name, "language" | "defined" | "config")
}

/// The platform gate active at one sibling position, if any.
fn platform_gate_before(doc: &Document, node: NodeId) -> Option<(bool, Vec<String>)> {
    let mut gate = None;
    for sibling in doc.preceding_siblings(node) {
        let sib = doc.node(sibling);
        let Some((name, negated)) = directive(sib) else {
            continue;
        };
        if !is_platform_directive(name) {
            continue;
        }
        if sib.value.is_empty() {
            // Bare `<?platform?>` terminates the region.
            gate = None;
        } else {
            let values = sib
                .value
                .split_whitespace()
                .map(str::to_string)
                .collect::<Vec<_>>();
            gate = Some((negated, values));
        }
    }
    gate
}

fn optional_gate_before(doc: &Document, node: NodeId) -> bool {
    let mut gated = false;
    for sibling in doc.preceding_siblings(node) {
        let sib = doc.node(sibling);
        let Some((name, negated)) = directive(sib) else {
            continue;
        };
        if is_optional_directive(name) || (negated && !is_platform_directive(name)) {
            gated = !sib.value.is_empty();
        }
    }
    gated
}

/// Whether the node sits inside a platform region excluding `platform`.
///
/// Without a current platform, no gating applies.
pub fn is_platform_excluded(doc: &Document, node: NodeId, platform: Option<&str>) -> bool {
    let Some(platform) = platform else {
        return false;
    };
    let mut current = Some(node);
    while let Some(id) = current {
        if let Some((negated, values)) = platform_gate_before(doc, id) {
            let listed = values.iter().any(|v| v == platform);
            if listed == negated {
                return true;
            }
        }
        current = doc.node(id).parent;
    }
    false
}

/// Whether the node sits inside a conditional (`?language` / `?defined` /
/// `?config` / `?not:…`) region at any ancestor level.
pub fn is_optionally_gated(doc: &Document, node: NodeId) -> bool {
    let mut current = Some(node);
    while let Some(id) = current {
        if optional_gate_before(doc, id) {
            return true;
        }
        current = doc.node(id).parent;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parse;

    fn form_node(doc: &Document, name: &str) -> NodeId {
        doc.all_nodes()
            .find(|&id| doc.node(id).attr_value("name") == Some(name))
            .unwrap_or_else(|| panic!("no node named {name}"))
    }

    #[test]
    fn test_platform_region() {
        let doc = parse(
            "<Skin>\
             <?platform mac?><Form name=\"MacOnly\"/><?platform?>\
             <Form name=\"Everywhere\"/>\
             </Skin>",
        );
        let mac_only = form_node(&doc, "MacOnly");
        let everywhere = form_node(&doc, "Everywhere");

        assert!(is_platform_excluded(&doc, mac_only, Some("win")));
        assert!(!is_platform_excluded(&doc, mac_only, Some("mac")));
        assert!(!is_platform_excluded(&doc, mac_only, None));
        assert!(!is_platform_excluded(&doc, everywhere, Some("win")));
    }

    #[test]
    fn test_negated_platform_region() {
        let doc = parse("<Skin><?not:platform win?><Form name=\"F\"/><?platform?></Skin>");
        let f = form_node(&doc, "F");
        assert!(is_platform_excluded(&doc, f, Some("win")));
        assert!(!is_platform_excluded(&doc, f, Some("mac")));
    }

    #[test]
    fn test_ancestor_gating() {
        let doc = parse(
            "<Skin><?platform mac?><Styles><Style name=\"S\"/></Styles><?platform?></Skin>",
        );
        let style = form_node(&doc, "S");
        assert!(is_platform_excluded(&doc, style, Some("win")));
        assert!(!is_platform_excluded(&doc, style, Some("mac")));
    }

    #[test]
    fn test_optional_region() {
        let doc = parse(
            "<Skin>\
             <?defined ENABLE_X?><Form name=\"Opt\"/><?defined?>\
             <Form name=\"Plain\"/>\
             </Skin>",
        );
        assert!(is_optionally_gated(&doc, form_node(&doc, "Opt")));
        assert!(!is_optionally_gated(&doc, form_node(&doc, "Plain")));
    }

    #[test]
    fn test_language_region_is_optional() {
        let doc = parse("<Skin><?language ja?><Form name=\"F\"/></Skin>");
        assert!(is_optionally_gated(&doc, form_node(&doc, "F")));
    }
}
