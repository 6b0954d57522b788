//! Per-URI document cache.
//!
//! Editor overlays (open buffers) take precedence over disk. Each entry
//! keeps the text, its [`LineIndex`] and the parsed DOM together, so every
//! range produced for a document comes from the same snapshot.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::SystemTime;

use crate::base::{Position, Range};
use crate::core::LineIndex;
use crate::project::{DocumentProvider, FileSystem};
use crate::syntax::{self, Document, Token};

/// One cached document snapshot.
#[derive(Debug, Clone)]
pub struct DocumentState {
    pub uri: Arc<str>,
    pub text: Arc<str>,
    pub line_index: Arc<LineIndex>,
    pub document: Arc<Document>,
    pub from_overlay: bool,
    pub mtime: Option<SystemTime>,
    /// Bumped on every text change; indexes record the version they saw.
    pub version: u64,
}

impl DocumentState {
    pub fn position_at(&self, offset: usize) -> Position {
        self.line_index.position_at(&self.text, offset)
    }

    pub fn offset_at(&self, position: Position) -> Option<usize> {
        self.line_index.offset_at(&self.text, position)
    }

    pub fn range_at(&self, start: usize, end: usize) -> Range {
        self.line_index.range_at(&self.text, start, end)
    }
}

/// Loads and caches parses per URI.
pub struct DocumentManager {
    fs: Arc<dyn FileSystem>,
    provider: Arc<dyn DocumentProvider>,
    entries: HashMap<Arc<str>, DocumentState>,
    next_version: u64,
}

impl DocumentManager {
    pub fn new(fs: Arc<dyn FileSystem>, provider: Arc<dyn DocumentProvider>) -> Self {
        Self {
            fs,
            provider,
            entries: HashMap::new(),
            next_version: 1,
        }
    }

    fn insert(
        &mut self,
        uri: Arc<str>,
        text: Arc<str>,
        from_overlay: bool,
        mtime: Option<SystemTime>,
    ) {
        let line_index = Arc::new(LineIndex::new(&text));
        let document = Arc::new(syntax::parse(&text));
        let version = self.next_version;
        self.next_version += 1;
        self.entries.insert(
            uri.clone(),
            DocumentState {
                uri,
                text,
                line_index,
                document,
                from_overlay,
                mtime,
                version,
            },
        );
    }

    /// Current snapshot for a URI, loading or refreshing as needed.
    pub fn get(&mut self, uri: &str) -> Option<DocumentState> {
        let key: Arc<str> = Arc::from(uri);

        if let Some(text) = self.provider.get(uri) {
            let stale = self
                .entries
                .get(&key)
                .map(|e| !e.from_overlay || e.text.as_ref() != text)
                .unwrap_or(true);
            if stale {
                self.insert(key.clone(), Arc::from(text), true, None);
            }
            return self.entries.get(&key).cloned();
        }

        let mtime = self.fs.mtime(Path::new(uri));
        let stale = match self.entries.get(&key) {
            Some(entry) => entry.from_overlay || entry.mtime != mtime,
            None => true,
        };
        if stale {
            match self.fs.read_to_string(Path::new(uri)) {
                Ok(text) => self.insert(key.clone(), Arc::from(text.as_str()), false, mtime),
                Err(_) => return self.entries.get(&key).cloned(),
            }
        }
        self.entries.get(&key).cloned()
    }

    /// Push edited text for a URI (editor change notification).
    pub fn set_text(&mut self, uri: &str, text: &str) {
        self.insert(Arc::from(uri), Arc::from(text), true, None);
    }

    /// Drop a cached entry (document closed or deleted).
    pub fn invalidate(&mut self, uri: &str) {
        self.entries.remove(uri);
    }

    /// What the cursor is on, re-read from raw tag text.
    pub fn token_at(&mut self, uri: &str, position: Position) -> Token {
        let Some(state) = self.get(uri) else {
            return Token::Invalid;
        };
        let Some(offset) = state.offset_at(position) else {
            return Token::Invalid;
        };
        syntax::token_at(&state.text, offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::{NoOverlay, OsFileSystem};
    use std::io::Write;

    fn manager() -> DocumentManager {
        DocumentManager::new(Arc::new(OsFileSystem), Arc::new(NoOverlay))
    }

    #[test]
    fn test_overlay_text_wins() {
        let mut docs = manager();
        docs.set_text("mem.xml", "<Skin></Skin>");
        let state = docs.get("mem.xml").unwrap();
        assert!(state.from_overlay);
        assert_eq!(state.document.root_element().map(|id| state.document.node(id).name.clone()),
            Some("Skin".to_string()));
    }

    #[test]
    fn test_version_bumps_on_edit() {
        let mut docs = manager();
        docs.set_text("mem.xml", "<Skin></Skin>");
        let v1 = docs.get("mem.xml").unwrap().version;
        docs.set_text("mem.xml", "<Skin><Styles/></Skin>");
        let v2 = docs.get("mem.xml").unwrap().version;
        assert!(v2 > v1);
    }

    #[test]
    fn test_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("skin.xml");
        let mut file = std::fs::File::create(&path).unwrap();
        write!(file, "<Skin></Skin>").unwrap();

        let mut docs = manager();
        let state = docs.get(path.to_str().unwrap()).unwrap();
        assert!(!state.from_overlay);
        assert_eq!(state.text.as_ref(), "<Skin></Skin>");
    }

    #[test]
    fn test_token_at_position() {
        let mut docs = manager();
        docs.set_text("mem.xml", "<Skin>\n  <Button style=\"x\"/>\n</Skin>");
        match docs.token_at("mem.xml", Position::new(1, 18)) {
            Token::AttributeValue { tag, .. } => assert_eq!(tag, "Button"),
            other => panic!("expected attribute value, got {other:?}"),
        }
    }
}
