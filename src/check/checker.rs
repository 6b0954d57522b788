//! The skin document checker.
//!
//! Walks a parsed document depth-first in document order and validates
//! node structure, attribute legality and attribute values, then reports
//! unclosed tags, dangling tags and duplicate definitions. Diagnostic
//! order is deterministic. An exception while checking one element is
//! contained, logged, and counted as a single error on that element.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::base::Range;
use crate::documents::{DocumentManager, DocumentState};
use crate::model::{AttrTypeMask, ClassModel};
use crate::project::{Clock, FileSystem};
use crate::semantic::{
    Diagnostic, DiagnosticCollector, DefinitionKind, ScopeOptions, ScopeResolver, Severity,
    VariableResolver,
};
use crate::syntax::{Attr, Document, NodeId, NodeKind};

use super::colors::{parse_color, Color};

/// Value checks run one bit at a time; Uri is tried last so "not defined"
/// beats "file not found" for shape-or-uri values.
const CHECK_ORDER: [AttrTypeMask; 21] = [
    AttrTypeMask::BOOL,
    AttrTypeMask::INT,
    AttrTypeMask::FLOAT,
    AttrTypeMask::STRING,
    AttrTypeMask::ENUM,
    AttrTypeMask::COLOR,
    AttrTypeMask::SIZE,
    AttrTypeMask::RECT,
    AttrTypeMask::IMAGE,
    AttrTypeMask::POINT,
    AttrTypeMask::POINT3D,
    AttrTypeMask::STYLE,
    AttrTypeMask::STYLE_ARRAY,
    AttrTypeMask::SHAPE,
    AttrTypeMask::FONT,
    AttrTypeMask::FORM,
    AttrTypeMask::FONT_SIZE,
    AttrTypeMask::DURATION,
    AttrTypeMask::STR_NONE,
    AttrTypeMask::STR_FOREVER,
    AttrTypeMask::URI,
];

/// Cooperative budget for one validation run.
///
/// The walk calls [`Budget::tick`] between elements; once the current
/// check epoch has moved on (a newer validation was requested), the walk
/// aborts. Chunk boundaries fall roughly every 500 ms.
pub struct Budget {
    clock: Arc<dyn Clock>,
    epoch: u64,
    epochs: Arc<AtomicU64>,
    chunk_start: Instant,
    chunk: Duration,
}

impl Budget {
    /// A budget bound to the host's epoch counter.
    pub fn new(clock: Arc<dyn Clock>, epochs: Arc<AtomicU64>) -> Self {
        let epoch = epochs.load(Ordering::SeqCst);
        let chunk_start = clock.now();
        Self {
            clock,
            epoch,
            epochs,
            chunk_start,
            chunk: Duration::from_millis(500),
        }
    }

    /// A budget that can never go stale (CLI runs).
    pub fn unlimited(clock: Arc<dyn Clock>) -> Self {
        Self::new(clock, Arc::new(AtomicU64::new(0)))
    }

    pub fn is_stale(&self) -> bool {
        self.epochs.load(Ordering::SeqCst) != self.epoch
    }

    /// Returns false when the walk must abort.
    pub fn tick(&mut self) -> bool {
        if self.is_stale() {
            return false;
        }
        let now = self.clock.now();
        if now.duration_since(self.chunk_start) >= self.chunk {
            // Chunk boundary: a cooperative embedder re-enters here.
            self.chunk_start = now;
            if self.is_stale() {
                return false;
            }
        }
        true
    }
}

/// Everything one validation produced.
#[derive(Debug)]
pub struct CheckOutcome {
    pub diagnostics: Vec<Diagnostic>,
    /// Concrete color literals found, for the color picker.
    pub colors: Vec<(Range, Color)>,
}

/// Validate one document. Returns `None` when the run went stale and was
/// aborted; the caller keeps its previously published diagnostics.
pub fn check_document(
    uri: &str,
    model: &ClassModel,
    scope: &mut ScopeResolver,
    docs: &mut DocumentManager,
    fs: Arc<dyn FileSystem>,
    budget: &mut Budget,
) -> Option<CheckOutcome> {
    let Some(state) = docs.get(uri) else {
        return Some(CheckOutcome {
            diagnostics: Vec::new(),
            colors: Vec::new(),
        });
    };

    let mut checker = Checker {
        uri,
        state,
        model,
        scope,
        docs,
        fs,
        diags: DiagnosticCollector::new(),
        colors: Vec::new(),
        is_root: false,
    };
    checker.run(budget)
}

struct Checker<'a> {
    uri: &'a str,
    state: DocumentState,
    model: &'a ClassModel,
    scope: &'a mut ScopeResolver,
    docs: &'a mut DocumentManager,
    fs: Arc<dyn FileSystem>,
    diags: DiagnosticCollector,
    colors: Vec<(Range, Color)>,
    is_root: bool,
}

impl<'a> Checker<'a> {
    fn run(mut self, budget: &mut Budget) -> Option<CheckOutcome> {
        if !self.model.is_loaded() {
            self.diags.add(Diagnostic::error(
                self.uri,
                Range::default(),
                "The class model could not be found. Validation is disabled.",
            ));
            return Some(self.finish());
        }

        let doc = self.state.document.clone();
        let Some(root) = doc.root_element() else {
            return Some(self.finish());
        };
        if doc.node(root).name != "Skin" {
            return Some(self.finish());
        }

        let root_dir = self.scope.skin_root_dir(self.uri);
        self.is_root = root_dir
            .as_deref()
            .map(|dir| dir.join("skin.xml").to_string_lossy() == self.uri)
            .unwrap_or(false);

        // Make sure the pack scope is known before structural checks.
        self.scope
            .scope_uris(self.uri, &ScopeOptions::foreign(), self.docs, Some(self.model));
        if !self
            .scope
            .is_in_include_graph(self.uri, self.docs, Some(self.model))
        {
            self.diags.add(Diagnostic::warning(
                self.uri,
                Range::default(),
                "File is not included in its skin pack.",
            ));
        }

        if self.is_root {
            self.report_external_requests();
        }

        // Document-order walk.
        let mut stack: Vec<NodeId> = doc.roots.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            if !budget.tick() {
                tracing::debug!("validation of {} aborted by newer check", self.uri);
                return None;
            }
            let caught = panic::catch_unwind(AssertUnwindSafe(|| self.check_node(&doc, id)));
            if caught.is_err() {
                let node = doc.node(id);
                tracing::error!("checker failed on <{}> in {}", node.name, self.uri);
                self.diags.add(Diagnostic::error(
                    self.uri,
                    self.state.range_at(node.start, node.open_end),
                    "Internal error while checking this element.",
                ));
            }
            for &child in doc.node(id).children.iter().rev() {
                stack.push(child);
            }
        }

        self.report_structure(&doc);
        self.report_duplicates();
        Some(self.finish())
    }

    fn finish(self) -> CheckOutcome {
        CheckOutcome {
            diagnostics: self.diags.into_vec(),
            colors: self.colors,
        }
    }

    fn report_external_requests(&mut self) {
        self.scope
            .scan_external_requests(self.uri, self.docs, Some(self.model));
        let requests = self.scope.external_requests.clone();
        for request in requests {
            self.diags.add(
                Diagnostic::error(
                    self.uri,
                    request.pattern_location.range,
                    format!(
                        "No definition found for {} \"{}\".",
                        request.kind.display(),
                        request.name
                    ),
                )
                .with_related(request.location.clone(), "Requested here."),
            );
        }
    }

    // ========================================================================
    // PER-NODE CHECKS
    // ========================================================================

    fn check_node(&mut self, doc: &Document, id: NodeId) {
        let node = doc.node(id);
        match node.kind {
            NodeKind::Instruction { complete } => {
                if !complete {
                    self.diags.add(Diagnostic::error(
                        self.uri,
                        self.state.range_at(node.start, node.end),
                        "Malformed processing instruction.",
                    ));
                }
            }
            NodeKind::Element => self.check_element(doc, id),
            NodeKind::Text | NodeKind::Comment => {}
        }
    }

    fn name_range(&self, doc: &Document, id: NodeId) -> Range {
        let node = doc.node(id);
        let start = node.start + 1;
        self.state.range_at(start, start + node.name.len())
    }

    fn check_element(&mut self, doc: &Document, id: NodeId) {
        let node = doc.node(id);
        let name = node.name.clone();
        let name_range = self.name_range(doc, id);

        let effective = if self.model.class(&name).is_some() {
            name.clone()
        } else {
            match self.model.class_ci(&name) {
                Some(class) => {
                    self.diags.add(Diagnostic::warning(
                        self.uri,
                        name_range,
                        format!("Incorrect casing. Did you mean \"{}\"?", class.name),
                    ));
                    class.name.to_string()
                }
                None => {
                    let mut diag = Diagnostic::error(
                        self.uri,
                        name_range,
                        format!("Unknown element \"{name}\"."),
                    );
                    if let Some(valid) = self.valid_children_hint(doc, id) {
                        diag = diag.with_related(
                            crate::base::Location::new(self.uri, name_range),
                            valid,
                        );
                    }
                    self.diags.add(diag);
                    return;
                }
            }
        };

        self.check_parent_scope(doc, id, &effective, name_range);
        self.check_element_special_cases(doc, id, &effective, name_range);
        self.check_attributes(doc, id, &effective);
    }

    /// Suggest classes valid under the parent, for unknown-element errors.
    fn valid_children_hint(&self, doc: &Document, id: NodeId) -> Option<String> {
        let parent = doc.node(id).parent?;
        let parent_node = doc.node(parent);
        if !parent_node.is_element() {
            return None;
        }
        let mut valid: Vec<String> = self
            .model
            .find_skin_element_definitions("", true)
            .into_iter()
            .filter(|c| self.model.is_valid_in_scope(&parent_node.name, c))
            .collect();
        if valid.is_empty() {
            return None;
        }
        valid.truncate(10);
        Some(format!("Valid elements here: {}.", valid.join(", ")))
    }

    fn check_parent_scope(&mut self, doc: &Document, id: NodeId, name: &str, range: Range) {
        let Some(parent) = doc.node(id).parent else {
            return;
        };
        let parent_node = doc.node(parent);
        if !parent_node.is_element() {
            return;
        }
        let parent_name = parent_node.name.clone();

        if name == "default" && parent_name != "switch" {
            let attrs: Vec<String> = doc
                .node(id)
                .attrs
                .iter()
                .map(|a| format!("{}=\"{}\"", a.name, a.value))
                .collect();
            self.diags.add(Diagnostic::warning(
                self.uri,
                range,
                format!(
                    "<default> belongs inside <switch>. Try <switch><default {}/></switch>.",
                    attrs.join(" ")
                ),
            ));
            return;
        }
        if (name == "Externals" || name == "External") && !self.is_root {
            self.diags.add(Diagnostic::error(
                self.uri,
                range,
                "Externals are only allowed in the skin root file.",
            ));
            return;
        }
        if !self.model.is_valid_in_scope(&parent_name, name) {
            self.diags.add(Diagnostic::error(
                self.uri,
                range,
                format!("Element \"{name}\" is not a valid child for \"{parent_name}\"."),
            ));
        }
    }

    fn check_element_special_cases(
        &mut self,
        doc: &Document,
        id: NodeId,
        name: &str,
        range: Range,
    ) {
        let node = doc.node(id);
        if name == "Form" {
            if let Some(form_name) = node.attr_value("name") {
                if node.attr("attach").is_none()
                    && self.scope.is_defined_strict(
                        DefinitionKind::SizedDelegate,
                        form_name,
                        self.uri,
                        None,
                        self.docs,
                        Some(self.model),
                    )
                {
                    self.diags.add(Diagnostic::warning(
                        self.uri,
                        range,
                        format!(
                            "Form \"{form_name}\" is used by a sized delegate and should set \"attach\"."
                        ),
                    ));
                }
            }
        }

        let has_command_name = node.attr("command.name").is_some();
        let has_command_category = node.attr("command.category").is_some();
        if has_command_name != has_command_category {
            let (present, missing) = if has_command_name {
                ("command.name", "command.category")
            } else {
                ("command.category", "command.name")
            };
            self.diags.add(Diagnostic::warning(
                self.uri,
                range,
                format!("\"{present}\" requires \"{missing}\"."),
            ));
        }
    }

    // ========================================================================
    // ATTRIBUTES
    // ========================================================================

    fn check_attributes(&mut self, doc: &Document, id: NodeId, elem: &str) {
        let attrs = doc.node(id).attrs.clone();

        // <define> attributes are variable names; always allowed.
        if elem == "define" {
            return;
        }

        let valid = self.model.find_valid_attributes(elem);
        let mut seen: Vec<&str> = Vec::new();

        for attr in &attrs {
            let attr_range = self.state.range_at(attr.name_start, attr.name_end);
            if seen.contains(&attr.name.as_str()) {
                self.diags.add(Diagnostic::error(
                    self.uri,
                    attr_range,
                    format!("Attribute \"{}\" is already defined.", attr.name),
                ));
                continue;
            }
            seen.push(attr.name.as_str());

            if attr.name.starts_with("data.") {
                continue;
            }

            let canonical = if valid.contains_key(&attr.name) {
                Some(attr.name.clone())
            } else {
                let flat = attr.name.replace('_', "");
                valid
                    .keys()
                    .find(|k| k.replace('_', "") == flat)
                    .or_else(|| valid.keys().find(|k| k.eq_ignore_ascii_case(&attr.name)))
                    .cloned()
            };
            let Some(canonical) = canonical else {
                self.diags.add(Diagnostic::error(
                    self.uri,
                    attr_range,
                    format!("Invalid attribute \"{}\" for element \"{elem}\".", attr.name),
                ));
                continue;
            };
            if canonical != attr.name {
                self.diags.add(Diagnostic::warning(
                    self.uri,
                    attr_range,
                    format!("Incorrect casing. Did you mean \"{canonical}\"?"),
                ));
            }

            self.check_attribute_hints(doc, id, elem, attr);

            let mask = valid.get(&canonical).copied().unwrap_or_default();
            self.check_value(doc, id, elem, &canonical, attr, mask);
        }
    }

    fn check_attribute_hints(&mut self, doc: &Document, id: NodeId, elem: &str, attr: &Attr) {
        let range = self.state.range_at(attr.name_start, attr.name_end);
        if elem == "Delegate" && attr.name == "name" {
            if doc.node(id).attr("form.name").is_none() {
                self.diags.add(Diagnostic::warning(
                    self.uri,
                    range,
                    "Did you mean \"form.name\"?",
                ));
            }
        }
        if elem == "Delegate" && attr.name == "style" {
            self.diags.add(Diagnostic::warning(
                self.uri,
                range,
                "Style needs to be defined by the referenced Form.",
            ));
        }
        if elem == "Slider"
            && attr.name == "width"
            && doc.node(id).attr("height").is_some()
            && doc.node(id).attr("style").is_none()
        {
            self.diags.add(Diagnostic::warning(
                self.uri,
                range,
                "Slider with the default style should not set both width and height.",
            ));
        }
        if (elem == "foreach" || elem == "styleselector")
            && attr.name == "variable"
            && !attr.value.is_empty()
            && !attr.value.starts_with('$')
        {
            self.diags.add(Diagnostic::warning(
                self.uri,
                self.state.range_at(attr.value_start, attr.value_end),
                "Variable names should start with \"$\".",
            ));
        }
        if (elem == "if" || elem == "switch")
            && !attr.value.is_empty()
            && !attr.value.contains('$')
        {
            let in_scope = VariableResolver::new(self.scope, self.docs, Some(self.model))
                .variables_in_scope(self.uri, id, &attr.value);
            if in_scope.iter().any(|v| v == &attr.value) {
                self.diags.add(Diagnostic::warning(
                    self.uri,
                    self.state.range_at(attr.value_start, attr.value_end),
                    format!(
                        "\"{}\" seems to be a variable. Did you mean \"${}\"?",
                        attr.value, attr.value
                    ),
                ));
            }
        }
    }

    // ========================================================================
    // VALUES
    // ========================================================================

    fn check_value(
        &mut self,
        doc: &Document,
        id: NodeId,
        elem: &str,
        attr_name: &str,
        attr: &Attr,
        mask: AttrTypeMask,
    ) {
        let value_range = self.state.range_at(attr.value_start, attr.value_end);
        let value = attr.value.as_str();

        if value.is_empty() {
            if attr_name == "name" || !mask.contains(AttrTypeMask::STRING) {
                self.diags.add(Diagnostic::warning(
                    self.uri,
                    value_range,
                    format!("{attr_name} has no value. Consider removing it."),
                ));
            }
            return;
        }

        for marker in ["@eval:", "@select:", "@property:"] {
            if value.contains(marker) {
                self.diags.add(Diagnostic::error(
                    self.uri,
                    value_range,
                    format!("{marker} expressions are only allowed inside <define>."),
                ));
                return;
            }
        }

        if mask.is_empty() {
            return;
        }

        // Colors defined as resources keep their `$` prefix, so the raw
        // lookup runs before variable expansion.
        if mask.contains(AttrTypeMask::COLOR) && value.starts_with('$') {
            if self.scope.is_defined(
                DefinitionKind::Color,
                value,
                self.uri,
                Some(id),
                self.docs,
                Some(self.model),
            ) {
                return;
            }
        }

        if value.contains('$') {
            let expansions = VariableResolver::new(self.scope, self.docs, Some(self.model))
                .resolve(self.uri, id, value);
            let mut reported = Vec::new();
            for expansion in expansions {
                if expansion.contains('$') {
                    // Unresolved here; an outer scope may provide it.
                    continue;
                }
                if let Some(diag) =
                    self.typed_value_diag(doc, id, elem, attr_name, &expansion, mask, None)
                {
                    if !reported.contains(&diag.message) {
                        reported.push(diag.message.clone());
                        self.diags.add(Diagnostic {
                            range: value_range,
                            ..diag
                        });
                    }
                }
            }
            return;
        }

        if let Some(diag) =
            self.typed_value_diag(doc, id, elem, attr_name, value, mask, Some(value_range))
        {
            self.diags.add(Diagnostic {
                range: value_range,
                ..diag
            });
        }
    }

    /// Run every bit's check; accept when any passes, otherwise return the
    /// first failure's diagnostic.
    #[allow(clippy::too_many_arguments)]
    fn typed_value_diag(
        &mut self,
        doc: &Document,
        id: NodeId,
        elem: &str,
        attr_name: &str,
        value: &str,
        mask: AttrTypeMask,
        color_range: Option<Range>,
    ) -> Option<Diagnostic> {
        let mut first_failure: Option<(Severity, String)> = None;
        let mut warning: Option<String> = None;

        for bit in CHECK_ORDER {
            if !mask.contains(bit) {
                continue;
            }
            match self.check_bit(doc, id, elem, attr_name, value, bit, color_range) {
                BitResult::Ok => {
                    if bit == AttrTypeMask::FORM {
                        self.check_form_dependencies(id, value);
                    }
                    if let Some(message) = warning {
                        return Some(Diagnostic::warning(self.uri, Range::default(), message));
                    }
                    return None;
                }
                BitResult::OkWarn(message) => {
                    warning = Some(message);
                }
                BitResult::Fail(severity, message) => {
                    if first_failure.is_none() {
                        first_failure = Some((severity, message));
                    }
                }
            }
        }
        if let Some(message) = warning {
            return Some(Diagnostic::warning(self.uri, Range::default(), message));
        }
        let (severity, message) = first_failure?;
        Some(match severity {
            Severity::Error => Diagnostic::error(self.uri, Range::default(), message),
            Severity::Warning => Diagnostic::warning(self.uri, Range::default(), message),
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn check_bit(
        &mut self,
        doc: &Document,
        id: NodeId,
        elem: &str,
        attr_name: &str,
        value: &str,
        bit: AttrTypeMask,
        color_range: Option<Range>,
    ) -> BitResult {
        match bit {
            AttrTypeMask::STRING => BitResult::Ok,
            AttrTypeMask::BOOL => {
                if value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("false") {
                    BitResult::Ok
                } else {
                    BitResult::Fail(
                        Severity::Error,
                        format!("\"{value}\" is not a boolean."),
                    )
                }
            }
            AttrTypeMask::INT => {
                if value.contains("@property:") {
                    return BitResult::Ok;
                }
                numeric_check(value, |v| is_int(v), "an integer")
            }
            AttrTypeMask::FLOAT => numeric_check(value, |v| is_float(v), "a number"),
            AttrTypeMask::FONT_SIZE => {
                let body = value.strip_prefix('+').unwrap_or(value);
                numeric_check(body, |v| is_float(v), "a font size")
            }
            AttrTypeMask::DURATION => {
                let body = value.trim().strip_suffix("ms").unwrap_or(value.trim());
                if is_float(body.trim()) {
                    BitResult::Ok
                } else {
                    BitResult::Fail(
                        Severity::Error,
                        format!("\"{value}\" is not a duration."),
                    )
                }
            }
            AttrTypeMask::COLOR => {
                if let Some(color) = parse_color(value, Some(self.model)) {
                    if let Some(range) = color_range {
                        self.colors.push((range, color));
                    }
                    return BitResult::Ok;
                }
                if self.scope.is_defined(
                    DefinitionKind::Color,
                    value,
                    self.uri,
                    Some(id),
                    self.docs,
                    Some(self.model),
                ) {
                    return BitResult::Ok;
                }
                BitResult::Fail(
                    Severity::Error,
                    format!("No definition found for color \"{value}\"."),
                )
            }
            AttrTypeMask::SIZE => float_list_check(value, 1..=4, "size"),
            AttrTypeMask::RECT => float_list_check(value, 4..=4, "rect"),
            AttrTypeMask::POINT => float_list_check(value, 2..=2, "point"),
            AttrTypeMask::POINT3D => float_list_check(value, 3..=3, "point3d"),
            AttrTypeMask::STYLE => self.style_check(value, id),
            AttrTypeMask::STYLE_ARRAY => {
                for token in value.split_whitespace() {
                    if let fail @ BitResult::Fail(..) = self.style_check(token, id) {
                        return fail;
                    }
                }
                BitResult::Ok
            }
            AttrTypeMask::IMAGE => self.defined_check(DefinitionKind::Image, value, id),
            AttrTypeMask::SHAPE => self.defined_check(DefinitionKind::Shape, value, id),
            AttrTypeMask::FONT => self.defined_check(DefinitionKind::Font, value, id),
            AttrTypeMask::FORM => {
                let force_qualified = attr_name == "form.name";
                if self.defined(DefinitionKind::Form, value, id) {
                    return BitResult::Ok;
                }
                if force_qualified {
                    let candidates = self.scope.find_qualified_candidates(
                        DefinitionKind::Form,
                        value,
                        self.uri,
                        self.docs,
                        Some(self.model),
                    );
                    if let Some(candidate) = candidates.first() {
                        return BitResult::Fail(
                            Severity::Error,
                            format!(
                                "No definition found for form \"{value}\". Did you mean \"{candidate}\"?"
                            ),
                        );
                    }
                }
                BitResult::Fail(
                    Severity::Error,
                    format!("No definition found for form \"{value}\"."),
                )
            }
            AttrTypeMask::ENUM => {
                let siblings: Vec<(String, String)> = doc
                    .node(id)
                    .attrs
                    .iter()
                    .map(|a| (a.name.clone(), a.value.clone()))
                    .collect();
                let entries = self.model.find_valid_enum_entries(elem, attr_name, &siblings);
                for token in value.split_whitespace() {
                    let flat = token.replace('_', "");
                    let valid = entries
                        .iter()
                        .any(|e| e == token || e.replace('_', "") == flat);
                    if !valid {
                        return BitResult::Fail(
                            Severity::Error,
                            format!("\"{token}\" is not a valid value for \"{attr_name}\"."),
                        );
                    }
                }
                BitResult::Ok
            }
            AttrTypeMask::URI => {
                for prefix in ["https://", "http://", "local://$", "object://"] {
                    if value.starts_with(prefix) {
                        return BitResult::Ok;
                    }
                }
                match self.scope.resolve_value_uri(value, self.uri) {
                    Some(path) if self.fs.exists(&path) => BitResult::Ok,
                    _ => BitResult::Fail(
                        Severity::Error,
                        format!("File not found: \"{value}\"."),
                    ),
                }
            }
            AttrTypeMask::STR_NONE => literal_check(value, "none"),
            AttrTypeMask::STR_FOREVER => literal_check(value, "forever"),
            _ => BitResult::Ok,
        }
    }

    /// A style reference whose last segment is empty (`My.`) is incomplete
    /// and never resolves, even against a same-named definition.
    fn style_check(&mut self, token: &str, node: NodeId) -> BitResult {
        if token == "native"
            || (!token.ends_with('.') && self.defined(DefinitionKind::Style, token, node))
        {
            BitResult::Ok
        } else {
            BitResult::Fail(
                Severity::Error,
                format!("No definition found for style \"{token}\"."),
            )
        }
    }

    fn defined(&mut self, kind: DefinitionKind, value: &str, node: NodeId) -> bool {
        self.scope.is_defined(
            kind,
            value,
            self.uri,
            Some(node),
            self.docs,
            Some(self.model),
        )
    }

    fn defined_check(&mut self, kind: DefinitionKind, value: &str, node: NodeId) -> BitResult {
        if self.defined(kind, value, node) {
            BitResult::Ok
        } else {
            BitResult::Fail(
                Severity::Error,
                format!("No definition found for {} \"{value}\".", kind.display()),
            )
        }
    }

    /// A form reference pulls in the form's dependency variables; any one
    /// not defined at the call site is an error.
    fn check_form_dependencies(&mut self, call_site: NodeId, value: &str) {
        let found = self.scope.lookup_definition(
            DefinitionKind::Form,
            value,
            self.uri,
            Some(call_site),
            &ScopeOptions::default(),
            self.docs,
            Some(self.model),
        );
        let Some(form) = found.iter().find(|f| !f.external) else {
            return;
        };
        let Some(info) = self.scope.info(&form.location.uri) else {
            return;
        };
        let local = form
            .name
            .rsplit('/')
            .next()
            .unwrap_or(form.name.as_str())
            .to_string();
        let Some(dependencies) = info.form_dependencies.get(&local) else {
            return;
        };
        let dependencies = dependencies.clone();
        let form_uri = form.location.uri.clone();

        for dependency in dependencies {
            let sites = VariableResolver::new(self.scope, self.docs, Some(self.model))
                .find_define_sites(self.uri, call_site, &dependency.name, false);
            if !sites.is_empty() {
                continue;
            }
            let related = self
                .docs
                .get(&form_uri)
                .map(|form_state| {
                    let scope_node = form_state.document.node(dependency.scope);
                    crate::base::Location::new(
                        form_uri.clone(),
                        form_state.range_at(scope_node.start, scope_node.open_end),
                    )
                });
            let node = self.state.document.node(call_site);
            let mut diag = Diagnostic::error(
                self.uri,
                self.state.range_at(node.start, node.open_end),
                format!("No definition found for variable {}.", dependency.name),
            );
            if let Some(related) = related {
                diag = diag.with_related(related, "Required here.");
            }
            self.diags.add(diag);
        }
    }

    // ========================================================================
    // POST-WALK REPORTS
    // ========================================================================

    fn report_structure(&mut self, doc: &Document) {
        for id in doc.unclosed() {
            let node = doc.node(id);
            let start = node.start + 1;
            self.diags.add(Diagnostic::error(
                self.uri,
                self.state.range_at(start, start + node.name.len()),
                format!("No closing tag found for <{}>.", node.name),
            ));
        }

        // <?xstring …?> pairs: an opener without its bare terminator.
        let mut last_opener: Option<NodeId> = None;
        let mut balance = 0i32;
        for id in doc.all_nodes() {
            let node = doc.node(id);
            if node.is_instruction() && node.name == "xstring" {
                if node.value.is_empty() {
                    balance -= 1;
                } else {
                    balance += 1;
                    last_opener = Some(id);
                }
            }
        }
        if balance > 0 {
            if let Some(id) = last_opener {
                let node = doc.node(id);
                self.diags.add(Diagnostic::warning(
                    self.uri,
                    self.state.range_at(node.start, node.end),
                    "No terminator found for <?xstring?>.",
                ));
            }
        }

        for dangling in &doc.dangling {
            self.diags.add(Diagnostic::error(
                self.uri,
                self.state.range_at(dangling.start, dangling.end),
                format!("Dangling tag </{}> found.", dangling.name),
            ));
        }
    }

    fn report_duplicates(&mut self) {
        let Some(info) = self.scope.info(self.uri) else {
            return;
        };
        for duplicate in info.duplicates.clone() {
            self.diags.add(
                Diagnostic::error(
                    self.uri,
                    duplicate.range,
                    format!(
                        "Duplicate definition of {} \"{}\".",
                        duplicate.kind.display(),
                        duplicate.name
                    ),
                )
                .with_related(duplicate.other.clone(), "Also defined here."),
            );
        }
    }
}

enum BitResult {
    Ok,
    /// The value passes, with a cosmetic warning ("contains spaces").
    OkWarn(String),
    Fail(Severity, String),
}

fn is_int(value: &str) -> bool {
    let body = value.strip_prefix('-').unwrap_or(value);
    !body.is_empty() && body.bytes().all(|b| b.is_ascii_digit())
}

fn is_float(value: &str) -> bool {
    let body = value.strip_prefix('-').unwrap_or(value);
    if body.is_empty() {
        return false;
    }
    let mut dots = 0;
    for b in body.bytes() {
        match b {
            b'0'..=b'9' => {}
            b'.' => dots += 1,
            _ => return false,
        }
    }
    dots <= 1 && body != "."
}

fn numeric_check(value: &str, accepts: impl Fn(&str) -> bool, what: &str) -> BitResult {
    if accepts(value) {
        return BitResult::Ok;
    }
    let trimmed = value.trim();
    if trimmed != value && accepts(trimmed) {
        return BitResult::OkWarn("Value contains spaces.".to_string());
    }
    BitResult::Fail(Severity::Error, format!("\"{value}\" is not {what}."))
}

fn float_list_check(
    value: &str,
    arity: std::ops::RangeInclusive<usize>,
    what: &str,
) -> BitResult {
    let parts: Vec<&str> = value.split(',').collect();
    if !arity.contains(&parts.len()) || !parts.iter().all(|p| is_float(p.trim())) {
        return BitResult::Fail(
            Severity::Error,
            format!("\"{value}\" is not a valid {what}."),
        );
    }
    BitResult::Ok
}

fn literal_check(value: &str, literal: &str) -> BitResult {
    if value == literal {
        BitResult::Ok
    } else {
        BitResult::Fail(
            Severity::Error,
            format!("\"{value}\" is not \"{literal}\"."),
        )
    }
}
