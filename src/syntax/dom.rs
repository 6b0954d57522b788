//! Arena DOM for skin documents.
//!
//! Nodes are stored in one vector and addressed by [`NodeId`]; parent and
//! child links are indices, so scope walks (variable resolution ascends
//! parents, gating scans preceding siblings) are plain index lookups.

/// Index of a node within its [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// What kind of node this is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Element,
    /// `<?name args?>`. `complete` is false when the trailing `?` before
    /// `>` is missing, which the checker reports as malformed.
    Instruction { complete: bool },
    Text,
    Comment,
}

/// An attribute written on an element tag, with byte offsets for the name
/// and the value (inside the quotes, when quoted).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attr {
    pub name: String,
    pub value: String,
    pub name_start: usize,
    pub name_end: usize,
    pub value_start: usize,
    pub value_end: usize,
}

/// One node of the arena.
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    /// Element or instruction name; empty for text and comments.
    pub name: String,
    /// Instruction arguments or text content.
    pub value: String,
    pub attrs: Vec<Attr>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Byte offset of the opening `<` (or text start).
    pub start: usize,
    /// Byte offset just past the node's end (close tag, `/>`, or recovery point).
    pub end: usize,
    /// Byte offset just past the open tag's `>`.
    pub open_end: usize,
    /// False when the close tag was missing and the node was recovered.
    pub closed: bool,
    pub self_closing: bool,
}

impl Node {
    pub fn is_element(&self) -> bool {
        self.kind == NodeKind::Element
    }

    pub fn is_instruction(&self) -> bool {
        matches!(self.kind, NodeKind::Instruction { .. })
    }

    pub fn attr(&self, name: &str) -> Option<&Attr> {
        self.attrs.iter().find(|a| a.name == name)
    }

    pub fn attr_value(&self, name: &str) -> Option<&str> {
        self.attr(name).map(|a| a.value.as_str())
    }
}

/// A `</name>` with no matching open tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingTag {
    pub name: String,
    pub start: usize,
    pub end: usize,
}

/// A parsed skin document.
#[derive(Debug, Clone, Default)]
pub struct Document {
    nodes: Vec<Node>,
    pub roots: Vec<NodeId>,
    pub dangling: Vec<DanglingTag>,
}

impl Document {
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.index()]
    }

    pub(crate) fn push(&mut self, node: Node) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(node);
        id
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// The first element among the roots, usually `<Skin>`.
    pub fn root_element(&self) -> Option<NodeId> {
        self.roots
            .iter()
            .copied()
            .find(|&id| self.node(id).is_element())
    }

    /// Every node id in document order.
    pub fn all_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len()).map(NodeId::new)
    }

    /// Elements that were recovered because their close tag was missing.
    pub fn unclosed(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.all_nodes().filter(|&id| {
            let node = self.node(id);
            node.is_element() && !node.closed && !node.self_closing
        })
    }

    pub fn element_children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.node(id)
            .children
            .iter()
            .copied()
            .filter(|&c| self.node(c).is_element())
    }

    pub fn first_child_named(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.element_children(id)
            .find(|&c| self.node(c).name == name)
    }

    pub fn children_named<'a>(
        &'a self,
        id: NodeId,
        name: &'a str,
    ) -> impl Iterator<Item = NodeId> + 'a {
        self.element_children(id)
            .filter(move |&c| self.node(c).name == name)
    }

    /// First child element with the given name carrying `attr="value"`.
    pub fn child_with_attr(
        &self,
        id: NodeId,
        name: &str,
        attr: &str,
        value: &str,
    ) -> Option<NodeId> {
        self.children_named(id, name)
            .find(|&c| self.node(c).attr_value(attr) == Some(value))
    }

    /// Parent chain from the node upward, excluding the node itself.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let mut current = self.node(id).parent;
        std::iter::from_fn(move || {
            let next = current?;
            current = self.node(next).parent;
            Some(next)
        })
    }

    /// The innermost element whose span contains the byte offset.
    pub fn node_at_offset(&self, offset: usize) -> Option<NodeId> {
        let mut best: Option<NodeId> = None;
        for id in self.all_nodes() {
            let node = self.node(id);
            if !node.is_element() || offset < node.start || offset >= node.end {
                continue;
            }
            let replace = match best {
                Some(current) => {
                    let cur = self.node(current);
                    node.end - node.start <= cur.end - cur.start
                }
                None => true,
            };
            if replace {
                best = Some(id);
            }
        }
        best
    }

    /// Siblings before the node, in document order.
    pub fn preceding_siblings(&self, id: NodeId) -> Vec<NodeId> {
        let Some(parent) = self.node(id).parent else {
            let pos = self.roots.iter().position(|&r| r == id);
            return match pos {
                Some(pos) => self.roots[..pos].to_vec(),
                None => Vec::new(),
            };
        };
        let children = &self.node(parent).children;
        match children.iter().position(|&c| c == id) {
            Some(pos) => children[..pos].to_vec(),
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::parse;

    #[test]
    fn test_child_lookup() {
        let doc = parse(
            r#"<Skin><Styles><Style name="A"/><Style name="B"/></Styles></Skin>"#,
        );
        let skin = doc.root_element().unwrap();
        let styles = doc.first_child_named(skin, "Styles").unwrap();
        assert_eq!(doc.children_named(styles, "Style").count(), 2);

        let b = doc.child_with_attr(styles, "Style", "name", "B").unwrap();
        assert_eq!(doc.node(b).attr_value("name"), Some("B"));
    }

    #[test]
    fn test_ancestors_and_siblings() {
        let doc = parse(r#"<Skin><Form name="F"><define a="1"/><View name="V"/></Form></Skin>"#);
        let skin = doc.root_element().unwrap();
        let form = doc.first_child_named(skin, "Form").unwrap();
        let view = doc.first_child_named(form, "View").unwrap();

        let chain: Vec<String> = doc
            .ancestors(view)
            .map(|id| doc.node(id).name.clone())
            .collect();
        assert_eq!(chain, vec!["Form", "Skin"]);

        let before = doc.preceding_siblings(view);
        assert_eq!(before.len(), 1);
        assert_eq!(doc.node(before[0]).name, "define");
    }
}
