//! AnalysisHost and Analysis — unified state management for IDE features.
//!
//! The `AnalysisHost` owns all mutable state: the class model, the
//! per-URI document cache, the scope registry and the color index.
//! Editor glue applies changes (`set_document_text`, `configure_for`) and
//! queries through an [`Analysis`] handle.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::base::{Position, Range};
use crate::check::{check_document, color_to_string, Budget, Color};
use crate::documents::DocumentManager;
use crate::model::{AttrTypeMask, ClassModel};
use crate::project::{
    current_platform, find_repo_root, load_repo_config, Clock, DocumentProvider, FileSystem,
    NoOverlay, OsFileSystem, SystemClock, SKIN_ELEMENTS_FILE, VISUAL_STYLES_FILE,
};
use crate::semantic::{
    DefinitionKind, Diagnostic, ScopeOptions, ScopeResolver, VariableResolver,
};
use crate::syntax::{self, Token};

use super::completion::{finish, CompletionItem, CompletionKind};
use super::goto::find_symbol_definitions;
use super::hover::{hover, HoverResult};
use super::references::{self, RenameEdit};

/// Processing-instruction vocabulary offered after `<?`.
const PI_VOCABULARY: [&str; 7] = [
    "platform",
    "xstring",
    "language",
    "defined",
    "config",
    "desktop_platform",
    "not",
];

/// Explicit configuration overrides (the editor's settings keys).
#[derive(Debug, Clone, Default)]
pub struct HostConfig {
    pub skin_elements_path: Option<PathBuf>,
    pub visual_styles_path: Option<PathBuf>,
    pub skins_locations: Option<Vec<String>>,
}

/// Owns all mutable analyzer state.
pub struct AnalysisHost {
    fs: Arc<dyn FileSystem>,
    clock: Arc<dyn Clock>,
    model: ClassModel,
    docs: DocumentManager,
    scope: ScopeResolver,
    colors: HashMap<Arc<str>, Vec<(Range, Color)>>,
    epochs: Arc<AtomicU64>,
}

impl Default for AnalysisHost {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalysisHost {
    pub fn new() -> Self {
        Self::with_seams(
            Arc::new(OsFileSystem),
            Arc::new(SystemClock),
            Arc::new(NoOverlay),
            current_platform().map(str::to_string),
        )
    }

    /// Construct with explicit seams (editor glue and tests).
    pub fn with_seams(
        fs: Arc<dyn FileSystem>,
        clock: Arc<dyn Clock>,
        provider: Arc<dyn DocumentProvider>,
        platform: Option<String>,
    ) -> Self {
        Self {
            model: ClassModel::new(),
            docs: DocumentManager::new(fs.clone(), provider),
            scope: ScopeResolver::new(fs.clone(), clock.clone(), platform),
            colors: HashMap::new(),
            epochs: Arc::new(AtomicU64::new(0)),
            fs,
            clock,
        }
    }

    pub fn model(&self) -> &ClassModel {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut ClassModel {
        &mut self.model
    }

    /// Locate the repository for a file and load its configuration and
    /// class models. Explicit overrides win over `repo.json`.
    pub fn configure_for(&mut self, uri: &str, overrides: &HostConfig) {
        let root = find_repo_root(self.fs.as_ref(), Path::new(uri));
        let mut config = match &root {
            Some(root) => load_repo_config(self.fs.as_ref(), root),
            None => Default::default(),
        };
        if let Some(locations) = &overrides.skins_locations {
            config.skins = locations.clone();
        }

        let (mut elements, mut styles) = match &root {
            Some(root) => config.class_model_paths(self.fs.as_ref(), root),
            None => (None, None),
        };
        if let Some(path) = &overrides.skin_elements_path {
            elements = Some(path.clone());
        }
        if let Some(path) = &overrides.visual_styles_path {
            styles = Some(path.clone());
        }
        self.scope.set_repo(root, config);

        match elements {
            Some(path) => {
                if let Err(e) = self.model.load_class_model(self.fs.as_ref(), &path) {
                    tracing::warn!("failed to load {}: {e}", SKIN_ELEMENTS_FILE);
                }
            }
            None => tracing::warn!("no {SKIN_ELEMENTS_FILE} found"),
        }
        match styles {
            Some(path) => {
                if let Err(e) = self.model.load_style_model(self.fs.as_ref(), &path) {
                    tracing::warn!("failed to load {}: {e}", VISUAL_STYLES_FILE);
                }
            }
            None => tracing::warn!("no {VISUAL_STYLES_FILE} found"),
        }
    }

    /// Editor change notification: replaces the overlay text.
    pub fn set_document_text(&mut self, uri: &str, text: &str) {
        self.docs.set_text(uri, text);
    }

    /// Invalidate in-flight validations; call when scheduling a new one.
    pub fn bump_check_epoch(&self) {
        self.epochs.fetch_add(1, Ordering::SeqCst);
    }

    /// A budget bound to the current check epoch.
    pub fn new_budget(&self) -> Budget {
        Budget::new(self.clock.clone(), self.epochs.clone())
    }

    /// Validate a document. `None` means the run was aborted by a newer
    /// check; the caller keeps its previously published diagnostics.
    pub fn check_document(&mut self, uri: &str, budget: &mut Budget) -> Option<Vec<Diagnostic>> {
        let outcome = check_document(
            uri,
            &self.model,
            &mut self.scope,
            &mut self.docs,
            self.fs.clone(),
            budget,
        )?;
        self.colors.insert(Arc::from(uri), outcome.colors);
        Some(outcome.diagnostics)
    }

    /// Colors the last check found in a document.
    pub fn document_colors(&self, uri: &str) -> &[(Range, Color)] {
        self.colors.get(uri).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Presentation strings for a picked color, in the original's format.
    pub fn color_presentations(&self, color: Color, original: &str) -> Vec<String> {
        vec![color_to_string(color, original)]
    }

    pub fn find_hover(&mut self, uri: &str, position: Position) -> Option<HoverResult> {
        hover(&self.model, &mut self.scope, &mut self.docs, uri, position)
    }

    pub fn find_definitions(&mut self, uri: &str, position: Position) -> Vec<crate::base::Location> {
        find_symbol_definitions(&self.model, &mut self.scope, &mut self.docs, uri, position)
    }

    pub fn find_references(&mut self, uri: &str, position: Position) -> Vec<crate::base::Location> {
        references::find_references(&self.model, &mut self.scope, &mut self.docs, uri, position)
    }

    pub fn prepare_rename(&mut self, uri: &str, position: Position) -> Option<(Range, String)> {
        references::prepare_rename(&mut self.docs, uri, position)
    }

    pub fn rename(&mut self, uri: &str, position: Position, new_text: &str) -> Vec<RenameEdit> {
        references::rename(
            &self.model,
            &mut self.scope,
            &mut self.docs,
            uri,
            position,
            new_text,
        )
    }

    /// Querying handle (kept separate so call sites read like snapshots).
    pub fn analysis(&mut self) -> Analysis<'_> {
        Analysis { host: self }
    }

    // ========================================================================
    // COMPLETION
    // ========================================================================

    pub fn find_completions(&mut self, uri: &str, position: Position) -> Vec<CompletionItem> {
        let Some(state) = self.docs.get(uri) else {
            return Vec::new();
        };
        let Some(offset) = state.offset_at(position) else {
            return Vec::new();
        };

        let mut items = Vec::new();
        match syntax::token_at(&state.text, offset) {
            Token::TagName {
                tag,
                closing,
                start,
                ..
            } => {
                if let Some(prefix) = tag.strip_prefix('?') {
                    for word in PI_VOCABULARY {
                        if word.starts_with(prefix) {
                            items.push(
                                CompletionItem::new(word, CompletionKind::Keyword)
                                    .with_priority(10),
                            );
                        }
                    }
                    return finish(items);
                }

                // Stop the stack scan before this tag's own `<` (or `</`).
                let tag_open = if closing {
                    start.saturating_sub(2)
                } else {
                    start.saturating_sub(1)
                };
                let pending = syntax::pending_open_tags(&state.text, tag_open);
                if closing {
                    if let Some(top) = pending.last() {
                        items.push(
                            CompletionItem::new(format!("{top}>"), CompletionKind::Snippet)
                                .with_priority(0)
                                .preselected(),
                        );
                    }
                    return finish(items);
                }
                if let Some(top) = pending.last() {
                    items.push(
                        CompletionItem::new(format!("/{top}>"), CompletionKind::Snippet)
                            .with_priority(0)
                            .preselected(),
                    );
                }
                let parent = pending.last().cloned();
                for class in self.model.find_skin_element_definitions(&tag, true) {
                    let valid = parent
                        .as_deref()
                        .map(|p| self.model.is_valid_in_scope(p, &class))
                        .unwrap_or(true);
                    if valid {
                        items.push(
                            CompletionItem::new(class, CompletionKind::Class).with_priority(10),
                        );
                    }
                }
            }
            Token::AttributeName {
                tag,
                index,
                attrs,
                before_cursor,
                ..
            } => {
                if tag == "define" {
                    return Vec::new();
                }
                let valid = self.model.find_valid_attributes(&tag);
                for (name, mask) in &valid {
                    let written_elsewhere = attrs
                        .iter()
                        .enumerate()
                        .any(|(i, a)| i != index && a.name == *name);
                    if written_elsewhere {
                        continue;
                    }
                    // Legacy behavior: substring filtering, not prefix.
                    if !before_cursor.is_empty() && !name.contains(before_cursor.as_str()) {
                        continue;
                    }
                    items.push(
                        CompletionItem::new(name.clone(), CompletionKind::Attribute)
                            .with_detail(mask.describe())
                            .with_insert_text(format!("{name}=\"\"")),
                    );
                }
            }
            Token::AttributeValue {
                tag,
                index,
                attrs,
                before_cursor,
                ..
            } => {
                items = self.value_completions(
                    uri,
                    offset,
                    &tag,
                    index,
                    &attrs,
                    &before_cursor,
                );
            }
            Token::Invalid => {}
        }
        finish(items)
    }

    #[allow(clippy::too_many_arguments)]
    fn value_completions(
        &mut self,
        uri: &str,
        offset: usize,
        elem: &str,
        index: usize,
        attrs: &[syntax::ScannedAttr],
        before_cursor: &str,
    ) -> Vec<CompletionItem> {
        let Some(attr) = attrs.get(index) else {
            return Vec::new();
        };
        let attr_name = attr.name.clone();
        let mut items = Vec::new();

        let node = self
            .docs
            .get(uri)
            .and_then(|state| state.document.node_at_offset(offset));

        // `$` contexts offer in-scope variables plus the theme tree.
        if let Some(dollar) = before_cursor.rfind('$') {
            let prefix = before_cursor[dollar + 1..].to_string();
            if let Some(node) = node {
                let variables =
                    VariableResolver::new(&mut self.scope, &mut self.docs, Some(&self.model))
                        .variables_in_scope(uri, node, &prefix);
                for variable in variables {
                    items.push(
                        CompletionItem::new(variable, CompletionKind::Variable)
                            .with_priority(5),
                    );
                }
            }
        }

        if elem == "define" {
            for marker in ["@property:", "@select:", "@eval:"] {
                items.push(
                    CompletionItem::new(marker, CompletionKind::Keyword).with_priority(10),
                );
            }
            return items;
        }

        let Some(ty) = self.model.find_attribute_type(elem, &attr_name) else {
            return items;
        };
        let mask = ty.mask;
        let options = ScopeOptions {
            allow_foreign_namespaces: true,
            force_qualified: attr_name == "form.name",
            ..ScopeOptions::default()
        };

        if mask.contains(AttrTypeMask::BOOL) {
            items.push(CompletionItem::new("true", CompletionKind::Value).with_priority(10));
            items.push(CompletionItem::new("false", CompletionKind::Value).with_priority(10));
        }

        if mask.contains(AttrTypeMask::ENUM) {
            let siblings: Vec<(String, String)> = attrs
                .iter()
                .map(|a| (a.name.clone(), a.value.clone()))
                .collect();
            let present: Vec<&str> = attr.value.split_whitespace().collect();
            for entry in self.model.find_valid_enum_entries(elem, &attr_name, &siblings) {
                if !present.contains(&entry.as_str()) {
                    items.push(
                        CompletionItem::new(entry, CompletionKind::Value).with_priority(10),
                    );
                }
            }
        }

        if mask.contains(AttrTypeMask::COLOR) {
            for name in self.model.default_color_names() {
                items.push(
                    CompletionItem::new(name, CompletionKind::Color).with_priority(30),
                );
            }
            for (name, _) in self.scope.find_definitions(
                &[DefinitionKind::Color],
                uri,
                &options,
                &mut self.docs,
                Some(&self.model),
            ) {
                items.push(CompletionItem::new(name, CompletionKind::Color).with_priority(20));
            }
        }

        if mask.intersects(AttrTypeMask::STYLE | AttrTypeMask::STYLE_ARRAY) {
            // After a dot, the Visual Styles classes complete the segment.
            let token_prefix = before_cursor
                .rsplit(char::is_whitespace)
                .next()
                .unwrap_or("");
            if token_prefix.contains('.') {
                for class in self.model.style_class_names() {
                    items.push(
                        CompletionItem::new(class, CompletionKind::Module).with_priority(0),
                    );
                }
            }
            for (name, kind) in self.scope.find_definitions(
                &[DefinitionKind::Style, DefinitionKind::AppStyle],
                uri,
                &options,
                &mut self.docs,
                Some(&self.model),
            ) {
                items.push(
                    CompletionItem::new(name, CompletionKind::Definition(kind))
                        .with_priority(20),
                );
            }
        }

        for (bit, kind) in [
            (AttrTypeMask::IMAGE, DefinitionKind::Image),
            (AttrTypeMask::SHAPE, DefinitionKind::Shape),
            (AttrTypeMask::FONT, DefinitionKind::Font),
            (AttrTypeMask::FORM, DefinitionKind::Form),
        ] {
            if !mask.contains(bit) {
                continue;
            }
            for (name, kind) in self.scope.find_definitions(
                &[kind],
                uri,
                &options,
                &mut self.docs,
                Some(&self.model),
            ) {
                items.push(
                    CompletionItem::new(name, CompletionKind::Definition(kind))
                        .with_priority(20),
                );
            }
        }

        if mask.contains(AttrTypeMask::URI) {
            if elem == "Import" && attr_name == "url" {
                for pack in self.scope.available_packs() {
                    items.push(
                        CompletionItem::new(format!("@{pack}"), CompletionKind::Folder)
                            .with_priority(10),
                    );
                }
            }
            let dir_part = match before_cursor.rfind('/') {
                Some(slash) => &before_cursor[..slash + 1],
                None => "",
            };
            let resolved = if dir_part.is_empty() {
                Path::new(uri).parent().map(Path::to_path_buf)
            } else {
                self.scope.resolve_value_uri(dir_part, uri)
            };
            if let Some(dir) = resolved {
                if let Ok(entries) = self.fs.read_dir(&dir) {
                    for entry in entries {
                        let Some(name) = entry.file_name().and_then(|n| n.to_str()) else {
                            continue;
                        };
                        let kind = if self.fs.is_dir(&entry) {
                            CompletionKind::Folder
                        } else {
                            CompletionKind::File
                        };
                        items.push(CompletionItem::new(name, kind).with_priority(40));
                    }
                }
            }
        }

        items
    }
}

/// Query handle over an [`AnalysisHost`].
pub struct Analysis<'a> {
    host: &'a mut AnalysisHost,
}

impl<'a> Analysis<'a> {
    pub fn completions(&mut self, uri: &str, position: Position) -> Vec<CompletionItem> {
        self.host.find_completions(uri, position)
    }

    pub fn hover(&mut self, uri: &str, position: Position) -> Option<HoverResult> {
        self.host.find_hover(uri, position)
    }

    pub fn goto_definition(&mut self, uri: &str, position: Position) -> Vec<crate::base::Location> {
        self.host.find_definitions(uri, position)
    }

    pub fn find_references(&mut self, uri: &str, position: Position) -> Vec<crate::base::Location> {
        self.host.find_references(uri, position)
    }

    pub fn prepare_rename(&mut self, uri: &str, position: Position) -> Option<(Range, String)> {
        self.host.prepare_rename(uri, position)
    }

    pub fn rename(&mut self, uri: &str, position: Position, new_text: &str) -> Vec<RenameEdit> {
        self.host.rename(uri, position, new_text)
    }

    pub fn document_colors(&self, uri: &str) -> &[(Range, Color)] {
        self.host.document_colors(uri)
    }
}
