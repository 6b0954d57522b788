//! Per-file index of a skin document.
//!
//! Built lazily the first time a URI is touched, refreshed no more than
//! once per 500 ms and only when the source actually changed. The index
//! records every named definition with its platform/optional gating
//! already applied, plus the per-form tables the variable resolver and
//! checker need.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use indexmap::IndexMap;

use crate::base::{Location, Range};
use crate::core::text_utils::is_variable_character;
use crate::documents::DocumentState;
use crate::model::{AttrTypeMask, ClassModel};
use crate::syntax::{Document, NodeId};

use super::definitions::{
    DefineInfo, DefineValue, DefinitionKind, DuplicateDefinition, ExternalPattern,
    FormDependency, IncludeRef, ViewInstantiation,
};
use super::gating::{is_optionally_gated, is_platform_excluded};
use super::variables::{WELL_KNOWN_GLOBALS, WELL_KNOWN_URL_LOCATIONS};

/// Elements that instantiate a form from inside another form.
const VIEW_ELEMENTS: [&str; 5] = ["ScrollView", "View", "Target", "Delegate", "PopupBox"];

/// One indexed definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefEntry {
    pub range: Range,
    /// Defined under a conditional gate; never raises duplicate errors.
    pub optional: bool,
    pub is_override: bool,
}

/// The per-file index.
#[derive(Debug, Clone)]
pub struct SkinFileInfo {
    pub uri: Arc<str>,
    /// Namespace assigned by the `<Include>` that brought the file in;
    /// empty for the skin root.
    pub namespace: String,
    pub text: Arc<str>,
    pub document: Arc<Document>,
    /// Version of the [`DocumentState`] this index was built from.
    pub version: u64,
    definitions: HashMap<DefinitionKind, IndexMap<String, DefEntry>>,
    /// `scheme → (name → range)`; `""` is the anonymous/resource scheme,
    /// resource color names carry a `$` prefix.
    pub color_schemes: IndexMap<String, IndexMap<String, Range>>,
    pub form_defines: HashMap<String, Vec<DefineInfo>>,
    /// Instantiated form name (as written) → sites.
    pub view_instantiations: IndexMap<String, Vec<ViewInstantiation>>,
    pub form_dependencies: HashMap<String, Vec<FormDependency>>,
    pub duplicates: Vec<DuplicateDefinition>,
    pub includes: Vec<IncludeRef>,
    pub externals: Vec<ExternalPattern>,
    pub has_platform_pi: bool,
    pub has_optional_pi: bool,
    pub last_refresh: Option<Instant>,
}

impl SkinFileInfo {
    /// Index a document snapshot.
    pub fn build(
        state: &DocumentState,
        namespace: String,
        platform: Option<&str>,
        model: Option<&ClassModel>,
    ) -> Self {
        let mut info = Self {
            uri: state.uri.clone(),
            namespace,
            text: state.text.clone(),
            document: state.document.clone(),
            version: state.version,
            definitions: HashMap::new(),
            color_schemes: IndexMap::new(),
            form_defines: HashMap::new(),
            view_instantiations: IndexMap::new(),
            form_dependencies: HashMap::new(),
            duplicates: Vec::new(),
            includes: Vec::new(),
            externals: Vec::new(),
            has_platform_pi: state.text.contains("<?platform")
                || state.text.contains("<?desktop_platform"),
            has_optional_pi: state.text.contains("<?language")
                || state.text.contains("<?defined")
                || state.text.contains("<?not:"),
            last_refresh: None,
        };
        info.extract(state, platform, model);
        info
    }

    fn extract(
        &mut self,
        state: &DocumentState,
        platform: Option<&str>,
        model: Option<&ClassModel>,
    ) {
        let doc = state.document.clone();
        let Some(root) = doc.root_element() else {
            return;
        };

        for child in doc.element_children(root) {
            if is_platform_excluded(&doc, child, platform) {
                continue;
            }
            let node = doc.node(child);
            match node.name.as_str() {
                "Include" | "Import" => {
                    if let Some(url) = node.attr_value("url") {
                        self.includes.push(IncludeRef {
                            namespace: node.attr_value("name").unwrap_or("").to_string(),
                            url: url.to_string(),
                            node: child,
                            imported: node.name == "Import",
                        });
                    }
                }
                "Externals" => {
                    for external in doc.children_named(child, "External") {
                        self.record_external(state, external);
                    }
                }
                "External" => self.record_external(state, child),
                "Styles" => self.extract_styles(state, child, platform),
                "Resources" => self.extract_resources(state, child, platform),
                "ColorScheme" => self.extract_color_scheme(state, child, platform),
                "ThemeElements" => self.extract_theme_elements(state, child, platform),
                "Shapes" => self.extract_shapes(state, child, platform),
                "Form" => self.extract_form(state, child, platform, model),
                _ => {}
            }
        }

        // Sized delegates can appear anywhere in the document.
        for id in doc.all_nodes() {
            let node = doc.node(id);
            if node.name != "Delegate" || !node.is_element() {
                continue;
            }
            if node.attr("width").is_none()
                && node.attr("height").is_none()
                && node.attr("size").is_none()
            {
                continue;
            }
            if is_platform_excluded(&doc, id, platform) {
                continue;
            }
            if let Some(name) = node.attr_value("form.name") {
                // Lookup cache only: repeated names never raise duplicates.
                self.definitions
                    .entry(DefinitionKind::SizedDelegate)
                    .or_default()
                    .entry(name.to_string())
                    .or_insert(DefEntry {
                        range: state.range_at(node.start, node.end),
                        optional: is_optionally_gated(&doc, id),
                        is_override: false,
                    });
            }
        }
    }

    fn record_external(&mut self, state: &DocumentState, node_id: NodeId) {
        let node = state.document.node(node_id);
        if let Some(pattern) = node.attr_value("name") {
            self.externals.push(ExternalPattern {
                pattern: pattern.to_string(),
                location: Location::new(
                    state.uri.clone(),
                    state.range_at(node.start, node.end),
                ),
            });
        }
    }

    fn extract_styles(&mut self, state: &DocumentState, styles: NodeId, platform: Option<&str>) {
        let doc = state.document.clone();
        for child in doc.element_children(styles) {
            let node = doc.node(child);
            if node.name != "Style" && node.name != "StyleAlias" {
                continue;
            }
            let Some(name) = node.attr_value("name") else {
                continue;
            };
            if is_platform_excluded(&doc, child, platform) {
                continue;
            }
            self.add_definition(state, DefinitionKind::Style, name.to_string(), child);
            if node.attr_value("appstyle") == Some("true") {
                self.add_definition(state, DefinitionKind::AppStyle, name.to_string(), child);
            }
        }
    }

    fn extract_resources(
        &mut self,
        state: &DocumentState,
        resources: NodeId,
        platform: Option<&str>,
    ) {
        let doc = state.document.clone();
        for child in doc.element_children(resources) {
            if is_platform_excluded(&doc, child, platform) {
                continue;
            }
            let node = doc.node(child);
            match node.name.as_str() {
                "Color" => {
                    if let Some(name) = node.attr_value("name") {
                        self.color_schemes
                            .entry(String::new())
                            .or_default()
                            .insert(
                                format!("${name}"),
                                state.range_at(node.start, node.end),
                            );
                    }
                }
                "Image" | "ImagePart" | "ShapeImage" | "IconSet" => {
                    let Some(name) = node.attr_value("name") else {
                        continue;
                    };
                    self.add_definition(state, DefinitionKind::Image, name.to_string(), child);
                    for sub in doc.element_children(child) {
                        if let Some(sub_name) = doc.node(sub).attr_value("name") {
                            self.add_definition(
                                state,
                                DefinitionKind::Image,
                                format!("{name}[{sub_name}]"),
                                sub,
                            );
                        }
                    }
                    if let Some(frames) = node.attr_value("frames") {
                        for frame in frames.split_whitespace() {
                            self.add_definition(
                                state,
                                DefinitionKind::Image,
                                format!("{name}[{frame}]"),
                                child,
                            );
                        }
                    }
                }
                _ => {}
            }
        }
    }

    fn extract_color_scheme(
        &mut self,
        state: &DocumentState,
        scheme_node: NodeId,
        platform: Option<&str>,
    ) {
        let doc = state.document.clone();
        let scheme = doc
            .node(scheme_node)
            .attr_value("name")
            .unwrap_or("")
            .to_string();
        for child in doc.children_named(scheme_node, "ColorScheme.Color") {
            if is_platform_excluded(&doc, child, platform) {
                continue;
            }
            let node = doc.node(child);
            if let Some(name) = node.attr_value("name") {
                self.color_schemes
                    .entry(scheme.clone())
                    .or_default()
                    .insert(name.to_string(), state.range_at(node.start, node.end));
            }
        }
    }

    fn extract_theme_elements(
        &mut self,
        state: &DocumentState,
        theme: NodeId,
        platform: Option<&str>,
    ) {
        let doc = state.document.clone();
        for child in doc.element_children(theme) {
            if is_platform_excluded(&doc, child, platform) {
                continue;
            }
            let node = doc.node(child);
            let kind = match node.name.as_str() {
                "Font" => DefinitionKind::Font,
                "Metric" => DefinitionKind::Metric,
                "Color" => DefinitionKind::Color,
                _ => continue,
            };
            if let Some(name) = node.attr_value("name") {
                self.add_definition(state, kind, name.to_string(), child);
            }
        }
    }

    fn extract_shapes(&mut self, state: &DocumentState, shapes: NodeId, platform: Option<&str>) {
        let doc = state.document.clone();
        for child in doc.children_named(shapes, "Shape") {
            if is_platform_excluded(&doc, child, platform) {
                continue;
            }
            let Some(name) = doc.node(child).attr_value("name").map(str::to_string) else {
                continue;
            };
            self.add_definition(state, DefinitionKind::Shape, name.clone(), child);
            for sub in doc.element_children(child) {
                if let Some(sub_name) = doc.node(sub).attr_value("name") {
                    self.add_definition(
                        state,
                        DefinitionKind::Shape,
                        format!("{name}[{sub_name}]"),
                        sub,
                    );
                }
            }
        }
    }

    fn extract_form(
        &mut self,
        state: &DocumentState,
        form: NodeId,
        platform: Option<&str>,
        model: Option<&ClassModel>,
    ) {
        let doc = state.document.clone();
        let Some(form_name) = doc.node(form).attr_value("name").map(str::to_string) else {
            return;
        };
        self.add_definition(state, DefinitionKind::Form, form_name.clone(), form);

        // Defines, instantiation sites and dependencies for this form.
        let mut defines: Vec<DefineInfo> = Vec::new();
        let mut defined_names: Vec<String> = Vec::new();
        let mut dependencies: Vec<FormDependency> = Vec::new();
        self.walk_form(
            state,
            &doc,
            form,
            &form_name,
            model,
            &mut defines,
            &mut defined_names,
            &mut dependencies,
        );
        if !defines.is_empty() {
            self.form_defines.insert(form_name.clone(), defines);
        }
        if !dependencies.is_empty() {
            self.form_dependencies.insert(form_name, dependencies);
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn walk_form(
        &mut self,
        state: &DocumentState,
        doc: &Document,
        node_id: NodeId,
        form_name: &str,
        model: Option<&ClassModel>,
        defines: &mut Vec<DefineInfo>,
        defined_names: &mut Vec<String>,
        dependencies: &mut Vec<FormDependency>,
    ) {
        for child in doc.element_children(node_id) {
            let node = doc.node(child);
            let name = node.name.as_str();

            if name == "define" {
                for attr in &node.attrs {
                    defined_names.push(attr.name.clone());
                    let value = DefineValue {
                        value: attr.value.clone(),
                        location: Location::new(
                            state.uri.clone(),
                            state.range_at(attr.value_start, attr.value_end),
                        ),
                    };
                    match defines.iter_mut().find(|d| d.name == attr.name) {
                        Some(info) => info.values.push(value),
                        None => defines.push(DefineInfo {
                            name: attr.name.clone(),
                            values: vec![value],
                        }),
                    }
                }
                continue;
            }

            if VIEW_ELEMENTS.contains(&name) {
                let attr = if name == "Delegate" || name == "PopupBox" {
                    "form.name"
                } else {
                    "name"
                };
                if let Some(target) = node.attr_value(attr) {
                    if !target.is_empty() {
                        self.view_instantiations
                            .entry(target.to_string())
                            .or_default()
                            .push(ViewInstantiation {
                                parent_form: form_name.to_string(),
                                node: child,
                            });
                    }
                }
            }

            // Attribute values referencing variables become dependencies
            // unless a define in the walk already provided them.
            for attr in &node.attrs {
                if !attr.value.contains('$') {
                    continue;
                }
                let is_uri = model
                    .and_then(|m| m.find_attribute_type(name, &attr.name))
                    .map(|t| t.mask.contains(AttrTypeMask::URI))
                    .unwrap_or(false);
                for var in variable_tokens(&attr.value) {
                    if WELL_KNOWN_GLOBALS.contains(&var.as_str()) {
                        continue;
                    }
                    if var.starts_with("Theme.") {
                        continue;
                    }
                    if is_uri && WELL_KNOWN_URL_LOCATIONS.contains(&var.as_str()) {
                        continue;
                    }
                    if defined_names.iter().any(|d| d == &var || var.starts_with(d.as_str())) {
                        continue;
                    }
                    record_dependency(dependencies, format!("${var}"), child);
                }
            }

            // `<if>`/`<switch>` bodies are opaque to the dependency walk.
            if name == "if" || name == "switch" {
                continue;
            }
            self.walk_form(
                state,
                doc,
                child,
                form_name,
                model,
                defines,
                defined_names,
                dependencies,
            );
        }
    }

    fn add_definition(
        &mut self,
        state: &DocumentState,
        kind: DefinitionKind,
        name: String,
        node_id: NodeId,
    ) {
        let doc = &state.document;
        let node = doc.node(node_id);
        let range = state.range_at(node.start, node.end);
        let optional = is_optionally_gated(doc, node_id);
        let is_override = node.attr_value("override") == Some("true");
        let entry = DefEntry {
            range,
            optional,
            is_override,
        };

        let map = self.definitions.entry(kind).or_default();
        match map.get(&name) {
            None => {
                map.insert(name, entry);
            }
            Some(existing) => {
                // An override replaces any other definition, silently.
                if is_override && !existing.is_override {
                    map.insert(name, entry);
                    return;
                }
                if existing.is_override {
                    return;
                }
                if !optional && !existing.optional {
                    let duplicate = DuplicateDefinition {
                        name: name.clone(),
                        kind,
                        range,
                        other: Location::new(self.uri.clone(), existing.range),
                    };
                    if !self.duplicates.contains(&duplicate) {
                        self.duplicates.push(duplicate);
                    }
                }
            }
        }
    }

    // ========================================================================
    // LOOKUP
    // ========================================================================

    /// Map a namespace-qualified query to this file's local name.
    fn local_name<'v>(&self, kind: DefinitionKind, qualified: &'v str) -> Option<&'v str> {
        if !kind.is_qualifiable() {
            return Some(qualified);
        }
        if self.namespace.is_empty() {
            if qualified.contains('/') {
                return None;
            }
            return Some(qualified);
        }
        qualified
            .strip_prefix(self.namespace.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
    }

    /// Definition entry for a qualified name, if this file defines it.
    pub fn lookup(&self, kind: DefinitionKind, qualified: &str) -> Option<&DefEntry> {
        let local = self.local_name(kind, qualified)?;
        self.definitions.get(&kind).and_then(|m| m.get(local))
    }

    /// Color lookup also searches the color schemes.
    pub fn lookup_color_range(&self, name: &str) -> Option<Range> {
        if let Some(entry) = self
            .definitions
            .get(&DefinitionKind::Color)
            .and_then(|m| m.get(name))
        {
            return Some(entry.range);
        }
        self.color_schemes
            .values()
            .find_map(|scheme| scheme.get(name).copied())
    }

    /// All names this file defines for a kind, as written.
    pub fn definition_names(&self, kind: DefinitionKind) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .definitions
            .get(&kind)
            .map(|m| m.keys().map(String::as_str).collect())
            .unwrap_or_default();
        if kind == DefinitionKind::Color {
            for scheme in self.color_schemes.values() {
                for name in scheme.keys() {
                    if !names.contains(&name.as_str()) {
                        names.push(name);
                    }
                }
            }
        }
        names
    }

    /// Refresh gate: at most once per 500 ms.
    pub fn refresh_due(&self, now: Instant) -> bool {
        match self.last_refresh {
            Some(last) => now.duration_since(last).as_millis() >= 500,
            None => true,
        }
    }
}

/// All `$variable` names (without `$`) referenced in a value.
pub(crate) fn variable_tokens(value: &str) -> Vec<String> {
    let bytes = value.as_bytes();
    let mut out = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'$' {
            let start = i + 1;
            let mut end = start;
            while end < bytes.len() && is_variable_character(bytes[end] as char) {
                end += 1;
            }
            if end > start {
                out.push(value[start..end].to_string());
            }
            i = end;
        } else {
            i += 1;
        }
    }
    out
}

fn record_dependency(dependencies: &mut Vec<FormDependency>, name: String, scope: NodeId) {
    // Longest name wins; shorter prefixes are subsumed.
    if dependencies
        .iter()
        .any(|d| d.name.starts_with(&name) && d.name.len() >= name.len())
    {
        return;
    }
    dependencies.retain(|d| !name.starts_with(&d.name));
    dependencies.push(FormDependency { name, scope });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::DocumentManager;
    use crate::project::{NoOverlay, OsFileSystem};

    fn build(text: &str) -> SkinFileInfo {
        build_ns(text, "")
    }

    fn build_ns(text: &str, namespace: &str) -> SkinFileInfo {
        let mut docs = DocumentManager::new(Arc::new(OsFileSystem), Arc::new(NoOverlay));
        docs.set_text("test.xml", text);
        let state = docs.get("test.xml").unwrap();
        SkinFileInfo::build(&state, namespace.to_string(), None, None)
    }

    #[test]
    fn test_styles_and_appstyles() {
        let info = build(
            r#"<Skin><Styles>
                 <Style name="Plain"/>
                 <Style name="App" appstyle="true"/>
                 <StyleAlias name="Alias" styles="Plain"/>
               </Styles></Skin>"#,
        );
        assert!(info.lookup(DefinitionKind::Style, "Plain").is_some());
        assert!(info.lookup(DefinitionKind::Style, "Alias").is_some());
        assert!(info.lookup(DefinitionKind::AppStyle, "App").is_some());
        assert!(info.lookup(DefinitionKind::AppStyle, "Plain").is_none());
    }

    #[test]
    fn test_resource_colors_and_schemes() {
        let info = build(
            r##"<Skin>
                 <Resources><Color name="accent" value="#f00"/></Resources>
                 <ColorScheme name="dark"><ColorScheme.Color name="bg" value="#000"/></ColorScheme>
               </Skin>"##,
        );
        assert!(info.color_schemes[""].contains_key("$accent"));
        assert!(info.color_schemes["dark"].contains_key("bg"));
        assert!(info.lookup_color_range("$accent").is_some());
        assert!(info.lookup_color_range("bg").is_some());
    }

    #[test]
    fn test_images_with_subnames_and_frames() {
        let info = build(
            r#"<Skin><Resources>
                 <IconSet name="icons"><Icon name="play"/></IconSet>
                 <Image name="sprite" frames="on off"/>
               </Resources></Skin>"#,
        );
        assert!(info.lookup(DefinitionKind::Image, "icons").is_some());
        assert!(info.lookup(DefinitionKind::Image, "icons[play]").is_some());
        assert!(info.lookup(DefinitionKind::Image, "sprite[on]").is_some());
        assert!(info.lookup(DefinitionKind::Image, "sprite[off]").is_some());
    }

    #[test]
    fn test_duplicate_detection() {
        let info = build(
            r#"<Skin><Styles>
                 <Style name="X"/>
                 <Style name="X"/>
               </Styles></Skin>"#,
        );
        assert_eq!(info.duplicates.len(), 1);
        assert_eq!(info.duplicates[0].name, "X");
        assert_eq!(info.duplicates[0].kind, DefinitionKind::Style);
    }

    #[test]
    fn test_override_suppresses_duplicate() {
        let info = build(
            r#"<Skin><Styles>
                 <Style name="X"/>
                 <Style name="X" override="true"/>
               </Styles></Skin>"#,
        );
        assert!(info.duplicates.is_empty());
        let entry = info.lookup(DefinitionKind::Style, "X").unwrap();
        assert!(entry.is_override);
    }

    #[test]
    fn test_conditional_definitions_never_duplicate() {
        let info = build(
            r#"<Skin><Styles>
                 <Style name="X"/>
                 <?defined EXTRA?><Style name="X"/><?defined?>
               </Styles></Skin>"#,
        );
        assert!(info.duplicates.is_empty());
    }

    #[test]
    fn test_form_defines_and_instantiations() {
        let info = build(
            r#"<Skin>
                 <Form name="Root">
                   <define width="10" height="20"/>
                   <View name="Child"/>
                   <Delegate form.name="Row"/>
                 </Form>
               </Skin>"#,
        );
        let defines = &info.form_defines["Root"];
        assert_eq!(defines.len(), 2);
        assert_eq!(defines[0].name, "width");
        assert_eq!(defines[0].values[0].value, "10");

        assert!(info.view_instantiations.contains_key("Child"));
        assert!(info.view_instantiations.contains_key("Row"));
        assert_eq!(info.view_instantiations["Child"][0].parent_form, "Root");
    }

    #[test]
    fn test_form_dependencies() {
        let info = build(
            r#"<Skin>
                 <Form name="Row">
                   <define known="5"/>
                   <View name="Cell" width="$known" height="$rowheight"/>
                   <if test="$ignored"><View name="X" width="$alsoignored"/></if>
                 </Form>
               </Skin>"#,
        );
        let deps = &info.form_dependencies["Row"];
        assert_eq!(deps.len(), 2);
        assert!(deps.iter().any(|d| d.name == "$rowheight"));
        // The <if> element's own attributes count, its body does not.
        assert!(deps.iter().any(|d| d.name == "$ignored"));
        assert!(!deps.iter().any(|d| d.name == "$alsoignored"));
    }

    #[test]
    fn test_sized_delegates_never_duplicate() {
        let info = build(
            r#"<Skin>
                 <Form name="A"><Delegate form.name="Row" width="10"/></Form>
                 <Form name="B"><Delegate form.name="Row" size="5,5"/></Form>
               </Skin>"#,
        );
        assert!(info.lookup(DefinitionKind::SizedDelegate, "Row").is_some());
        assert!(info.duplicates.is_empty());
    }

    #[test]
    fn test_namespace_lookup() {
        let info = build_ns(r#"<Skin><Styles><Style name="S"/></Styles></Skin>"#, "NS");
        assert!(info.lookup(DefinitionKind::Style, "NS/S").is_some());
        assert!(info.lookup(DefinitionKind::Style, "S").is_none());
        assert!(info.lookup(DefinitionKind::Style, "Other/S").is_none());
    }

    #[test]
    fn test_platform_gated_definition_absent() {
        let text = r#"<Skin><Styles>
             <?platform mac?><Style name="MacStyle"/><?platform?>
           </Styles></Skin>"#;
        let mut docs = DocumentManager::new(Arc::new(OsFileSystem), Arc::new(NoOverlay));
        docs.set_text("test.xml", text);
        let state = docs.get("test.xml").unwrap();

        let on_win = SkinFileInfo::build(&state, String::new(), Some("win"), None);
        assert!(on_win.lookup(DefinitionKind::Style, "MacStyle").is_none());

        let on_mac = SkinFileInfo::build(&state, String::new(), Some("mac"), None);
        assert!(on_mac.lookup(DefinitionKind::Style, "MacStyle").is_some());
    }

    #[test]
    fn test_includes_and_externals() {
        let info = build(
            r#"<Skin>
                 <Include name="NS" url="sub/other.xml"/>
                 <Import url="@common"/>
                 <Externals><External name="dynamic.*"/></Externals>
               </Skin>"#,
        );
        assert_eq!(info.includes.len(), 2);
        assert_eq!(info.includes[0].namespace, "NS");
        assert!(!info.includes[0].imported);
        assert!(info.includes[1].imported);
        assert_eq!(info.externals.len(), 1);
        assert_eq!(info.externals[0].pattern, "dynamic.*");
    }

    #[test]
    fn test_idempotent_rebuild() {
        let text = r#"<Skin><Styles><Style name="A"/><Style name="A"/></Styles></Skin>"#;
        let mut docs = DocumentManager::new(Arc::new(OsFileSystem), Arc::new(NoOverlay));
        docs.set_text("test.xml", text);
        let state = docs.get("test.xml").unwrap();

        let first = SkinFileInfo::build(&state, String::new(), None, None);
        let second = SkinFileInfo::build(&state, String::new(), None, None);
        assert_eq!(first.duplicates, second.duplicates);
        assert_eq!(
            first.definition_names(DefinitionKind::Style),
            second.definition_names(DefinitionKind::Style)
        );
    }
}
