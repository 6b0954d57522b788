//! Completion items and kinds.

use std::sync::Arc;

use crate::semantic::DefinitionKind;

/// Kind of completion item, mapped to LSP item-kind numbers at the glue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionKind {
    Class,
    Attribute,
    Value,
    Definition(DefinitionKind),
    /// Second-level style segment from the Visual Styles model.
    Module,
    Variable,
    Keyword,
    Snippet,
    File,
    Folder,
    Color,
}

impl CompletionKind {
    /// Convert to LSP completion item kind number.
    pub fn to_lsp(self) -> u32 {
        match self {
            CompletionKind::Class => 7,          // Class
            CompletionKind::Attribute => 10,     // Property
            CompletionKind::Value => 12,         // Value
            CompletionKind::Definition(_) => 18, // Reference
            CompletionKind::Module => 9,         // Module
            CompletionKind::Variable => 6,       // Variable
            CompletionKind::Keyword => 14,       // Keyword
            CompletionKind::Snippet => 15,       // Snippet
            CompletionKind::File => 17,          // File
            CompletionKind::Folder => 19,        // Folder
            CompletionKind::Color => 16,         // Color
        }
    }
}

/// A completion suggestion.
#[derive(Debug, Clone)]
pub struct CompletionItem {
    pub label: Arc<str>,
    pub kind: CompletionKind,
    pub detail: Option<Arc<str>>,
    /// Text to insert when different from the label.
    pub insert_text: Option<Arc<str>>,
    pub preselect: bool,
    /// Lower sorts first.
    pub sort_priority: u32,
}

impl CompletionItem {
    pub fn new(label: impl Into<Arc<str>>, kind: CompletionKind) -> Self {
        Self {
            label: label.into(),
            kind,
            detail: None,
            insert_text: None,
            preselect: false,
            sort_priority: 100,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<Arc<str>>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn with_insert_text(mut self, text: impl Into<Arc<str>>) -> Self {
        self.insert_text = Some(text.into());
        self
    }

    pub fn preselected(mut self) -> Self {
        self.preselect = true;
        self
    }

    pub fn with_priority(mut self, priority: u32) -> Self {
        self.sort_priority = priority;
        self
    }
}

/// Sort by priority, then label; deduplicate by label keeping the first.
pub(crate) fn finish(mut items: Vec<CompletionItem>) -> Vec<CompletionItem> {
    items.sort_by(|a, b| {
        a.sort_priority
            .cmp(&b.sort_priority)
            .then_with(|| a.label.cmp(&b.label))
    });
    let mut seen = std::collections::HashSet::new();
    items.retain(|item| seen.insert(item.label.clone()));
    items
}
