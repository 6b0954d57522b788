//! Class model manager — the type system for skin elements.
//!
//! Two model files ("Skin Elements" and "Visual Styles") declare element
//! classes, their inheritance, attributes, enumerations and schema groups.
//! This module loads and caches both, reloading only when a file's
//! modification timestamp changes, and answers every schema query the
//! checker and the IDE features need.
//!
//! ## Key Types
//!
//! - [`ClassModel`] — the loaded, merged model with all queries
//! - [`AttrTypeMask`] — bitmask attribute type
//! - [`ClassDef`] / [`EnumDef`] — raw model records

mod heuristics;
mod loader;
mod types;

pub use heuristics::{guess_type, CLASS_ALIASES};
pub use types::{AttrTypeMask, ClassDef, Documentation, EnumDef, ModelSource};

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;

use indexmap::IndexMap;
use thiserror::Error;

use crate::project::FileSystem;

/// Errors raised while loading a model file.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML error: {0}")]
    Xml(String),

    #[error("class model not found: {0}")]
    NotFound(String),
}

impl ModelError {
    pub fn xml(message: impl Into<String>) -> Self {
        Self::Xml(message.into())
    }
}

/// Result of an attribute type lookup.
#[derive(Debug, Clone)]
pub struct AttributeType {
    pub mask: AttrTypeMask,
    /// The class in the parent chain that declares the attribute.
    pub defining_class: Arc<str>,
}

#[derive(Debug, Clone)]
struct LoadedFile {
    path: PathBuf,
    mtime: Option<SystemTime>,
}

/// Auxiliary tables one model file contributes alongside classes/enums.
#[derive(Debug, Default)]
struct AuxTables {
    attr_docs: HashMap<String, Documentation>,
    enum_entry_docs: HashMap<String, Documentation>,
    default_colors: IndexMap<String, String>,
    theme_metrics: IndexMap<String, String>,
    languages: Vec<String>,
}

/// The loaded class model, merged from both model files.
#[derive(Debug, Default)]
pub struct ClassModel {
    classes: IndexMap<String, ClassDef>,
    enums: IndexMap<String, EnumDef>,
    aux_elements: AuxTables,
    aux_styles: AuxTables,
    elements_file: Option<LoadedFile>,
    styles_file: Option<LoadedFile>,
}

impl ClassModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load (or reload on timestamp change) the "Skin Elements" model.
    pub fn load_class_model(
        &mut self,
        fs: &dyn FileSystem,
        path: &Path,
    ) -> Result<bool, ModelError> {
        self.load(fs, path, ModelSource::Elements)
    }

    /// Load (or reload on timestamp change) the "Visual Styles" model.
    pub fn load_style_model(
        &mut self,
        fs: &dyn FileSystem,
        path: &Path,
    ) -> Result<bool, ModelError> {
        self.load(fs, path, ModelSource::Styles)
    }

    fn load(
        &mut self,
        fs: &dyn FileSystem,
        path: &Path,
        source: ModelSource,
    ) -> Result<bool, ModelError> {
        if !fs.exists(path) {
            tracing::warn!("class model missing: {}", path.display());
            self.purge(source);
            self.set_state(source, None);
            return Err(ModelError::NotFound(path.display().to_string()));
        }

        let mtime = fs.mtime(path);
        if let Some(prev) = self.state(source) {
            if prev.path == path && mtime.is_some() && prev.mtime == mtime {
                return Ok(false);
            }
        }

        let text = fs.read_to_string(path)?;
        self.load_from_str(&text, source)?;
        self.set_state(
            source,
            Some(LoadedFile {
                path: path.to_path_buf(),
                mtime,
            }),
        );
        tracing::info!(
            "loaded {} classes, {} enums from {}",
            self.classes.values().filter(|c| c.source == source).count(),
            self.enums.values().filter(|e| e.source == source).count(),
            path.display()
        );
        Ok(true)
    }

    /// Replace one model file's portion from already-read text.
    pub fn load_from_str(&mut self, text: &str, source: ModelSource) -> Result<(), ModelError> {
        let payload = loader::parse_model(text, source)?;
        self.purge(source);
        for (name, class) in payload.classes {
            self.classes.insert(name, class);
        }
        for (name, en) in payload.enums {
            self.enums.insert(name, en);
        }
        let aux = self.aux_mut(source);
        aux.attr_docs = payload.attr_docs;
        aux.enum_entry_docs = payload.enum_entry_docs;
        aux.default_colors = payload.default_colors;
        aux.theme_metrics = payload.theme_metrics;
        aux.languages = payload.languages;
        Ok(())
    }

    fn purge(&mut self, source: ModelSource) {
        self.classes.retain(|_, c| c.source != source);
        self.enums.retain(|_, e| e.source != source);
        *self.aux_mut(source) = AuxTables::default();
    }

    fn state(&self, source: ModelSource) -> Option<&LoadedFile> {
        match source {
            ModelSource::Elements => self.elements_file.as_ref(),
            ModelSource::Styles => self.styles_file.as_ref(),
        }
    }

    fn set_state(&mut self, source: ModelSource, state: Option<LoadedFile>) {
        match source {
            ModelSource::Elements => self.elements_file = state,
            ModelSource::Styles => self.styles_file = state,
        }
    }

    fn aux_mut(&mut self, source: ModelSource) -> &mut AuxTables {
        match source {
            ModelSource::Elements => &mut self.aux_elements,
            ModelSource::Styles => &mut self.aux_styles,
        }
    }

    fn aux_tables(&self) -> [&AuxTables; 2] {
        [&self.aux_elements, &self.aux_styles]
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    pub fn is_loaded(&self) -> bool {
        !self.classes.is_empty()
    }

    pub fn class(&self, name: &str) -> Option<&ClassDef> {
        self.classes.get(name)
    }

    /// Case-insensitive class lookup, used to downgrade "unknown element"
    /// to a casing warning.
    pub fn class_ci(&self, name: &str) -> Option<&ClassDef> {
        self.classes
            .values()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Walk the class and its ancestors, self first. Cycles are cut.
    pub fn parent_chain(&self, name: &str) -> Vec<&ClassDef> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut current = self.classes.get(name);
        while let Some(class) = current {
            if !seen.insert(class.name.clone()) {
                break;
            }
            chain.push(class);
            current = class.parent.as_deref().and_then(|p| self.classes.get(p));
        }
        chain
    }

    /// Inclusive subclass test (`is_subclass_of(x, x)` is true when known).
    pub fn is_subclass_of(&self, name: &str, ancestor: &str) -> bool {
        self.parent_chain(name)
            .iter()
            .any(|c| c.name.as_ref() == ancestor)
    }

    /// Class names matching a case-insensitive prefix. The layout aliases
    /// (`box`, `clipper`, `sizevariant`, `table`) expand to the classes
    /// they stand for.
    pub fn find_skin_element_definitions(
        &self,
        prefix: &str,
        ignore_abstract: bool,
    ) -> Vec<String> {
        let prefix = prefix.to_ascii_lowercase();
        let mut out: Vec<String> = self
            .classes
            .values()
            .filter(|c| !(ignore_abstract && c.is_abstract))
            .filter(|c| c.name.to_ascii_lowercase().starts_with(&prefix))
            .map(|c| c.name.to_string())
            .collect();
        for (alias, targets) in CLASS_ALIASES {
            if alias.starts_with(&prefix) {
                for target in *targets {
                    if !out.iter().any(|n| n == target) {
                        out.push((*target).to_string());
                    }
                }
            }
        }
        out
    }

    /// All attributes writable on an element, declared types refined by the
    /// name heuristics. Control-flow statements lose `name`, except
    /// `styleselector`.
    pub fn find_valid_attributes(&self, elem: &str) -> IndexMap<String, AttrTypeMask> {
        let mut declared = IndexMap::new();
        for class in self.parent_chain(elem) {
            for (name, mask) in &class.attributes {
                declared.entry(name.clone()).or_insert(*mask);
            }
        }
        if elem != "styleselector" && self.is_subclass_of(elem, "statement") {
            declared.shift_remove("name");
        }
        declared
            .into_iter()
            .map(|(name, mask)| {
                let refined = guess_type(elem, &name, mask);
                (name, refined)
            })
            .collect()
    }

    /// Resolve one attribute's type through the parent chain.
    pub fn find_attribute_type(&self, elem: &str, attr: &str) -> Option<AttributeType> {
        for class in self.parent_chain(elem) {
            if let Some(&mask) = class.attributes.get(attr) {
                return Some(AttributeType {
                    mask: guess_type(elem, attr, mask),
                    defining_class: class.name.clone(),
                });
            }
        }
        None
    }

    /// Valid entries for an enum attribute.
    ///
    /// `Options.options` redirects through the sibling `type` attribute
    /// (`Class.Attribute`); `layout.class` accepts every concrete class
    /// plus the layout aliases.
    pub fn find_valid_enum_entries(
        &self,
        elem: &str,
        attr: &str,
        sibling_attrs: &[(String, String)],
    ) -> Vec<String> {
        if elem == "Options" && attr == "options" {
            if let Some((_, ty)) = sibling_attrs.iter().find(|(name, _)| name == "type") {
                if let Some((class, attribute)) = ty.split_once('.') {
                    return self.find_valid_enum_entries(class, attribute, &[]);
                }
            }
            return Vec::new();
        }
        if attr == "layout.class" && self.is_subclass_of(elem, "Layout") {
            let mut entries = self.find_skin_element_definitions("", true);
            for (alias, _) in CLASS_ALIASES {
                if !entries.iter().any(|e| e == alias) {
                    entries.push((*alias).to_string());
                }
            }
            return entries;
        }

        for class in self.parent_chain(elem) {
            let key = format!("{}.{}", class.name, attr);
            if let Some(en) = self.enums.get(&key) {
                let mut entries = Vec::new();
                let mut seen = HashSet::new();
                let mut hops = 0;
                let mut current = Some(en);
                while let Some(e) = current {
                    hops += 1;
                    if hops > 32 {
                        break;
                    }
                    for entry in &e.entries {
                        if seen.insert(entry.clone()) {
                            entries.push(entry.clone());
                        }
                    }
                    current = e.parent.as_deref().and_then(|p| self.enums.get(p));
                }
                return entries;
            }
        }
        Vec::new()
    }

    fn inherited_children_group(&self, name: &str) -> Option<&str> {
        self.parent_chain(name)
            .iter()
            .find_map(|c| c.children_group.as_deref())
    }

    fn inherited_schema_groups(&self, name: &str) -> Option<&[String]> {
        self.parent_chain(name)
            .iter()
            .find_map(|c| c.schema_groups.as_deref())
    }

    /// Whether `child` may appear inside `parent`, by schema groups.
    pub fn is_valid_in_scope(&self, parent: &str, child: &str) -> bool {
        let any_schema_info = self
            .classes
            .values()
            .any(|c| c.schema_groups.is_some() || c.children_group.is_some());
        if !any_schema_info {
            return true;
        }
        let Some(group) = self.inherited_children_group(parent) else {
            return true;
        };
        let mut groups: Vec<&str> = self
            .inherited_schema_groups(child)
            .map(|g| g.iter().map(String::as_str).collect())
            .unwrap_or_default();
        groups.push(child);
        groups.iter().any(|g| *g == group)
    }

    // ========================================================================
    // DOCUMENTATION
    // ========================================================================

    pub fn class_docs(&self, name: &str) -> Option<&Documentation> {
        self.classes
            .get(name)
            .map(|c| &c.doc)
            .filter(|d| !d.is_empty())
    }

    pub fn attribute_docs(&self, elem: &str, attr: &str) -> Option<&Documentation> {
        for class in self.parent_chain(elem) {
            let key = format!("{}.{}", class.name, attr);
            for aux in self.aux_tables() {
                if let Some(doc) = aux.attr_docs.get(&key) {
                    return Some(doc);
                }
            }
        }
        None
    }

    pub fn enum_entry_docs(&self, elem: &str, attr: &str, entry: &str) -> Option<&Documentation> {
        for class in self.parent_chain(elem) {
            let key = format!("{}.{}.{}", class.name, attr, entry);
            for aux in self.aux_tables() {
                if let Some(doc) = aux.enum_entry_docs.get(&key) {
                    return Some(doc);
                }
            }
        }
        None
    }

    // ========================================================================
    // AUXILIARY TABLES
    // ========================================================================

    /// Case-insensitive default color lookup (`red`, `transparent`, …).
    pub fn default_color(&self, name: &str) -> Option<&str> {
        self.aux_tables().into_iter().find_map(|aux| {
            aux.default_colors
                .iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value.as_str())
        })
    }

    pub fn default_color_names(&self) -> Vec<&str> {
        self.aux_tables()
            .into_iter()
            .flat_map(|aux| aux.default_colors.keys().map(String::as_str))
            .collect()
    }

    pub fn theme_metric(&self, name: &str) -> Option<&str> {
        self.aux_tables()
            .into_iter()
            .find_map(|aux| aux.theme_metrics.get(name).map(String::as_str))
    }

    /// Metric names sorted longest first, for longest-name matching of
    /// `$Theme.<metric>` tokens.
    pub fn theme_metric_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .aux_tables()
            .into_iter()
            .flat_map(|aux| aux.theme_metrics.keys().map(String::as_str))
            .collect();
        names.sort_by_key(|n| std::cmp::Reverse(n.len()));
        names
    }

    /// Concrete classes of the Visual Styles model — the vocabulary of
    /// final style-name segments (`My.primary`).
    pub fn style_class_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .classes
            .values()
            .filter(|c| c.source == ModelSource::Styles && !c.is_abstract)
            .map(|c| c.name.as_ref())
            .collect();
        names.sort_unstable();
        names
    }

    pub fn languages(&self) -> Vec<&str> {
        self.aux_tables()
            .into_iter()
            .flat_map(|aux| aux.languages.iter().map(String::as_str))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_model() -> ClassModel {
        let mut model = ClassModel::new();
        model
            .load_from_str(
                r#"
<Model>
  <Model.Class name="statement" abstract="true">
    <Attributes x:id="attributes" Class:SchemaGroups="controls statements"/>
    <List x:id="members">
      <Model.Member name="name" type="string"/>
    </List>
  </Model.Class>
  <Model.Class name="if" parent="statement"/>
  <Model.Class name="styleselector" parent="statement">
    <List x:id="members">
      <Model.Member name="styles" type="string"/>
    </List>
  </Model.Class>
  <Model.Class name="Control" abstract="true">
    <Attributes x:id="attributes" Class:SchemaGroups="controls"/>
    <List x:id="members">
      <Model.Member name="name" type="string"/>
      <Model.Member name="style" type="string"/>
      <Model.Member name="align" type="enum"/>
    </List>
  </Model.Class>
  <Model.Class name="Button" parent="Control"/>
  <Model.Class name="Skin">
    <Attributes x:id="attributes" Class:ChildGroup="skinroot"/>
  </Model.Class>
  <Model.Class name="Styles">
    <Attributes x:id="attributes" Class:SchemaGroups="skinroot"/>
  </Model.Class>
  <Model.Enumeration name="Control.align">
    <Model.Enumerator name="left"/>
    <Model.Enumerator name="right"/>
  </Model.Enumeration>
</Model>
"#,
                ModelSource::Elements,
            )
            .unwrap();
        model
    }

    #[test]
    fn test_parent_chain_and_subclassing() {
        let model = test_model();
        let chain: Vec<_> = model
            .parent_chain("Button")
            .iter()
            .map(|c| c.name.to_string())
            .collect();
        assert_eq!(chain, vec!["Button", "Control"]);
        assert!(model.is_subclass_of("Button", "Control"));
        assert!(!model.is_subclass_of("Control", "Button"));
        assert!(model.is_subclass_of("if", "statement"));
    }

    #[test]
    fn test_find_valid_attributes_inherits_and_refines() {
        let model = test_model();
        let attrs = model.find_valid_attributes("Button");
        // Declared string, refined to a style array by name.
        assert!(attrs["style"].contains(AttrTypeMask::STYLE_ARRAY));
        assert!(attrs["name"].contains(AttrTypeMask::STRING));
    }

    #[test]
    fn test_statements_lose_name_except_styleselector() {
        let model = test_model();
        assert!(!model.find_valid_attributes("if").contains_key("name"));
        assert!(model
            .find_valid_attributes("styleselector")
            .contains_key("name"));
    }

    #[test]
    fn test_enum_entries() {
        let model = test_model();
        let entries = model.find_valid_enum_entries("Button", "align", &[]);
        assert_eq!(entries, vec!["left", "right"]);
    }

    #[test]
    fn test_scope_validity() {
        let model = test_model();
        assert!(model.is_valid_in_scope("Skin", "Styles"));
        assert!(!model.is_valid_in_scope("Skin", "Button"));
        // A parent without a child group cannot be judged.
        assert!(model.is_valid_in_scope("Styles", "Button"));
    }

    #[test]
    fn test_case_insensitive_class_lookup() {
        let model = test_model();
        assert!(model.class("button").is_none());
        assert_eq!(model.class_ci("button").map(|c| c.name.to_string()), Some("Button".into()));
    }

    #[test]
    fn test_element_completion_includes_aliases() {
        let model = test_model();
        let names = model.find_skin_element_definitions("bo", true);
        // No real class starts with "bo"; the alias expands to its targets.
        assert!(names.iter().any(|n| n == "Horizontal"));
        assert!(names.iter().any(|n| n == "Vertical"));
    }

    #[test]
    fn test_reload_replaces_portion() {
        let mut model = test_model();
        model
            .load_from_str(
                r#"<Model><Model.Class name="Style"/></Model>"#,
                ModelSource::Styles,
            )
            .unwrap();
        assert!(model.class("Style").is_some());
        assert!(model.class("Button").is_some());

        model
            .load_from_str(
                r#"<Model><Model.Class name="StyleAlias"/></Model>"#,
                ModelSource::Styles,
            )
            .unwrap();
        assert!(model.class("Style").is_none());
        assert!(model.class("StyleAlias").is_some());
        assert!(model.class("Button").is_some());
    }
}
