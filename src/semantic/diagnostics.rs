//! Diagnostic types produced by the checker.

use std::sync::Arc;

use crate::base::{Location, Range};

/// Severity level of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    /// Convert to LSP severity number.
    pub fn to_lsp(self) -> u32 {
        match self {
            Severity::Error => 1,
            Severity::Warning => 2,
        }
    }
}

/// Related information attached to a diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedInfo {
    pub location: Location,
    pub message: Arc<str>,
}

/// A diagnostic message with location.
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub uri: Arc<str>,
    pub range: Range,
    pub severity: Severity,
    pub message: Arc<str>,
    pub source: &'static str,
    pub related: Vec<RelatedInfo>,
}

impl Diagnostic {
    pub fn error(uri: impl Into<Arc<str>>, range: Range, message: impl Into<Arc<str>>) -> Self {
        Self {
            uri: uri.into(),
            range,
            severity: Severity::Error,
            message: message.into(),
            source: "skincheck",
            related: Vec::new(),
        }
    }

    pub fn warning(uri: impl Into<Arc<str>>, range: Range, message: impl Into<Arc<str>>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(uri, range, message)
        }
    }

    pub fn with_related(mut self, location: Location, message: impl Into<Arc<str>>) -> Self {
        self.related.push(RelatedInfo {
            location,
            message: message.into(),
        });
        self
    }
}

/// Collects diagnostics during a document check.
#[derive(Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn into_vec(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}
