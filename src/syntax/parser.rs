//! Lenient scanner-based DOM builder.
//!
//! Parsing never fails. Unclosed elements are recovered when an ancestor's
//! close tag (or end of input) arrives; dangling close tags are recorded on
//! the document. Quotes are respected when scanning for `>`, so attribute
//! values may contain angle brackets.

use super::dom::{Attr, DanglingTag, Document, Node, NodeId, NodeKind};

/// Parse skin XML text into a [`Document`].
pub fn parse(text: &str) -> Document {
    Parser::new(text).run()
}

struct Parser<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
    doc: Document,
    stack: Vec<NodeId>,
}

impl<'a> Parser<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            bytes: text.as_bytes(),
            pos: 0,
            doc: Document::default(),
            stack: Vec::new(),
        }
    }

    fn run(mut self) -> Document {
        let len = self.bytes.len();
        while self.pos < len {
            let Some(rel) = self.text[self.pos..].find('<') else {
                self.text_node(self.pos, len);
                break;
            };
            let tag_start = self.pos + rel;
            self.text_node(self.pos, tag_start);
            self.pos = tag_start + 1;

            if self.pos >= len {
                break;
            }
            match self.bytes[self.pos] {
                b'/' => {
                    self.pos += 1;
                    self.close_tag(tag_start);
                }
                b'!' => self.comment_or_decl(tag_start),
                b'?' => {
                    self.pos += 1;
                    self.instruction(tag_start);
                }
                _ => self.open_tag(tag_start),
            }
        }

        // Recover whatever is still open at end of input.
        while let Some(id) = self.stack.pop() {
            let node = self.doc.node_mut(id);
            node.closed = false;
            node.end = len;
        }
        self.doc
    }

    fn attach(&mut self, node: Node) -> NodeId {
        let parent = self.stack.last().copied();
        let mut node = node;
        node.parent = parent;
        let id = self.doc.push(node);
        match parent {
            Some(parent) => self.doc.node_mut(parent).children.push(id),
            None => self.doc.roots.push(id),
        }
        id
    }

    fn text_node(&mut self, start: usize, end: usize) {
        if start >= end {
            return;
        }
        let content = &self.text[start..end];
        if content.trim().is_empty() {
            return;
        }
        self.attach(Node {
            kind: NodeKind::Text,
            name: String::new(),
            value: content.to_string(),
            attrs: Vec::new(),
            parent: None,
            children: Vec::new(),
            start,
            end,
            open_end: end,
            closed: true,
            self_closing: true,
        });
    }

    fn close_tag(&mut self, tag_start: usize) {
        let name_start = self.pos;
        while self.pos < self.bytes.len()
            && !self.bytes[self.pos].is_ascii_whitespace()
            && self.bytes[self.pos] != b'>'
        {
            self.pos += 1;
        }
        let name = self.text[name_start..self.pos].to_string();
        while self.pos < self.bytes.len() && self.bytes[self.pos] != b'>' {
            self.pos += 1;
        }
        let tag_end = (self.pos + 1).min(self.bytes.len());
        if self.pos < self.bytes.len() {
            self.pos += 1;
        }

        let matching = self
            .stack
            .iter()
            .rposition(|&id| self.doc.node(id).name == name);
        match matching {
            Some(depth) => {
                // Elements above the match lost their close tag.
                while let Some(id) = self.stack.pop() {
                    let matched = self.stack.len() == depth;
                    let node = self.doc.node_mut(id);
                    node.closed = matched;
                    node.end = if matched { tag_end } else { tag_start };
                    if matched {
                        break;
                    }
                }
            }
            None => self.doc.dangling.push(DanglingTag {
                name,
                start: tag_start,
                end: tag_end,
            }),
        }
    }

    fn comment_or_decl(&mut self, tag_start: usize) {
        if self.text[tag_start..].starts_with("<!--") {
            let end = match self.text[tag_start + 4..].find("-->") {
                Some(rel) => tag_start + 4 + rel + 3,
                None => self.bytes.len(),
            };
            self.attach(Node {
                kind: NodeKind::Comment,
                name: String::new(),
                value: self.text[tag_start..end].to_string(),
                attrs: Vec::new(),
                parent: None,
                children: Vec::new(),
                start: tag_start,
                end,
                open_end: end,
                closed: true,
                self_closing: true,
            });
            self.pos = end;
            return;
        }
        if self.text[tag_start..].starts_with("<![CDATA[") {
            let end = match self.text[tag_start + 9..].find("]]>") {
                Some(rel) => tag_start + 9 + rel + 3,
                None => self.bytes.len(),
            };
            self.pos = end;
            return;
        }
        // DOCTYPE and friends: skip to the closing '>'.
        while self.pos < self.bytes.len() && self.bytes[self.pos] != b'>' {
            self.pos += 1;
        }
        if self.pos < self.bytes.len() {
            self.pos += 1;
        }
    }

    fn instruction(&mut self, tag_start: usize) {
        let content_start = self.pos;
        let mut complete = false;
        let content_end;
        loop {
            if self.pos >= self.bytes.len() {
                content_end = self.bytes.len();
                break;
            }
            if self.bytes[self.pos] == b'>' {
                complete = self.pos > content_start && self.bytes[self.pos - 1] == b'?';
                content_end = if complete { self.pos - 1 } else { self.pos };
                self.pos += 1;
                break;
            }
            self.pos += 1;
        }
        let content = self.text[content_start..content_end].trim();
        let (name, value) = match content.split_once(char::is_whitespace) {
            Some((name, rest)) => (name.to_string(), rest.trim().to_string()),
            None => (content.to_string(), String::new()),
        };
        self.attach(Node {
            kind: NodeKind::Instruction { complete },
            name,
            value,
            attrs: Vec::new(),
            parent: None,
            children: Vec::new(),
            start: tag_start,
            end: self.pos,
            open_end: self.pos,
            closed: true,
            self_closing: true,
        });
    }

    fn open_tag(&mut self, tag_start: usize) {
        let len = self.bytes.len();
        let name_start = self.pos;
        while self.pos < len
            && !self.bytes[self.pos].is_ascii_whitespace()
            && !matches!(self.bytes[self.pos], b'>' | b'/')
        {
            self.pos += 1;
        }
        let name = self.text[name_start..self.pos].to_string();

        // Quote-aware scan for the end of the tag.
        let mut cursor = self.pos;
        let mut in_quote: Option<u8> = None;
        while cursor < len {
            let ch = self.bytes[cursor];
            if let Some(quote) = in_quote {
                if ch == quote {
                    in_quote = None;
                }
            } else if ch == b'"' || ch == b'\'' {
                in_quote = Some(ch);
            } else if ch == b'>' {
                break;
            }
            cursor += 1;
        }
        let tag_end = cursor; // position of '>' or EOF
        let open_end = (tag_end + 1).min(len);

        let self_closing = {
            let mut probe = tag_end;
            loop {
                if probe <= self.pos {
                    break false;
                }
                let ch = self.bytes[probe - 1];
                if ch.is_ascii_whitespace() {
                    probe -= 1;
                    continue;
                }
                break ch == b'/';
            }
        };

        let attrs = parse_attrs(self.text, self.pos, tag_end);
        self.pos = open_end;

        let id = self.attach(Node {
            kind: NodeKind::Element,
            name,
            value: String::new(),
            attrs,
            parent: None,
            children: Vec::new(),
            start: tag_start,
            end: open_end,
            open_end,
            closed: self_closing,
            self_closing,
        });
        if !self_closing {
            self.stack.push(id);
        }
    }
}

/// Parse the attribute region of a tag, `[start, tag_end)`.
pub(crate) fn parse_attrs(text: &str, start: usize, tag_end: usize) -> Vec<Attr> {
    let bytes = text.as_bytes();
    let mut attrs = Vec::new();
    let mut pos = start;
    while pos < tag_end {
        while pos < tag_end && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }
        if pos >= tag_end {
            break;
        }
        if bytes[pos] == b'/' || bytes[pos] == b'?' {
            pos += 1;
            continue;
        }

        let name_start = pos;
        while pos < tag_end
            && !bytes[pos].is_ascii_whitespace()
            && !matches!(bytes[pos], b'=' | b'/')
        {
            pos += 1;
        }
        let name_end = pos;
        if name_start == name_end {
            pos += 1;
            continue;
        }

        while pos < tag_end && bytes[pos].is_ascii_whitespace() {
            pos += 1;
        }

        let (value_start, value_end) = if pos < tag_end && bytes[pos] == b'=' {
            pos += 1;
            while pos < tag_end && bytes[pos].is_ascii_whitespace() {
                pos += 1;
            }
            if pos < tag_end && matches!(bytes[pos], b'"' | b'\'') {
                let quote = bytes[pos];
                pos += 1;
                let value_start = pos;
                while pos < tag_end && bytes[pos] != quote {
                    pos += 1;
                }
                let value_end = pos;
                if pos < tag_end {
                    pos += 1;
                }
                (value_start, value_end)
            } else {
                let value_start = pos;
                while pos < tag_end && !bytes[pos].is_ascii_whitespace() && bytes[pos] != b'/' {
                    pos += 1;
                }
                (value_start, pos)
            }
        } else {
            (name_end, name_end)
        };

        attrs.push(Attr {
            name: text[name_start..name_end].to_string(),
            value: text[value_start..value_end].to_string(),
            name_start,
            name_end,
            value_start,
            value_end,
        });
    }
    attrs
}
