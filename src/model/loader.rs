//! `.classModel` file reader.
//!
//! Model files are well-formed XML:
//!
//! ```xml
//! <Model>
//!   <Model.Class name="Button" parent="Control" abstract="false">
//!     <Attributes x:id="attributes"
//!                 Class:SchemaGroups="controls" Class:ChildGroup="buttonchildren"/>
//!     <List x:id="members">
//!       <Model.Member name="text" type="string"/>
//!     </List>
//!     <Model.Documentation>
//!       <String x:id="brief">A push button.</String>
//!     </Model.Documentation>
//!   </Model.Class>
//!   <Model.Enumeration name="Button.align" parent="Control.align">
//!     <Model.Enumerator name="left"/>
//!   </Model.Enumeration>
//! </Model>
//! ```

use std::collections::HashMap;

use indexmap::IndexMap;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::types::{AttrTypeMask, ClassDef, Documentation, EnumDef, ModelSource};
use super::ModelError;

/// Everything one model file contributes.
#[derive(Debug, Default)]
pub struct ModelFilePayload {
    pub classes: IndexMap<String, ClassDef>,
    pub enums: IndexMap<String, EnumDef>,
    /// Keyed `Class.member`.
    pub attr_docs: HashMap<String, Documentation>,
    /// Keyed `Enum.entry` (enum names are already dotted `Class.attribute`).
    pub enum_entry_docs: HashMap<String, Documentation>,
    /// Members of the `DefaultColors` class: name → color literal.
    pub default_colors: IndexMap<String, String>,
    /// Members of the `ThemeMetrics` class: name → numeric literal.
    pub theme_metrics: IndexMap<String, String>,
    /// Entries of the `Language` enumeration.
    pub languages: Vec<String>,
}

/// Where documentation text currently being read belongs.
enum DocTarget {
    Class,
    Member(String),
    Enumerator(String),
}

struct ModelReader {
    source: ModelSource,
    payload: ModelFilePayload,
    current_class: Option<ClassDef>,
    current_enum: Option<EnumDef>,
    doc_target: Option<DocTarget>,
    doc_field: Option<String>,
    elem_stack: Vec<String>,
}

/// Parse one model file's text.
pub fn parse_model(text: &str, source: ModelSource) -> Result<ModelFilePayload, ModelError> {
    ModelReader {
        source,
        payload: ModelFilePayload::default(),
        current_class: None,
        current_enum: None,
        doc_target: None,
        doc_field: None,
        elem_stack: Vec::new(),
    }
    .read(text)
}

impl ModelReader {
    fn read(mut self, text: &str) -> Result<ModelFilePayload, ModelError> {
        let mut reader = Reader::from_reader(text.as_bytes());
        reader.config_mut().trim_text(true);

        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    self.handle_start(e)?;
                }
                Ok(Event::Empty(ref e)) => {
                    self.handle_start(e)?;
                    self.handle_end();
                }
                Ok(Event::End(_)) => {
                    self.handle_end();
                }
                Ok(Event::Text(ref t)) => {
                    if let (Some(_), Some(field)) = (&self.doc_target, &self.doc_field) {
                        let value = t
                            .unescape()
                            .map_err(|e| ModelError::xml(format!("text error: {e}")))?
                            .to_string();
                        self.record_doc(field.clone(), value);
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(ModelError::xml(format!(
                        "XML parse error at position {}: {e}",
                        reader.error_position()
                    )));
                }
                _ => {}
            }
            buf.clear();
        }

        Ok(self.payload)
    }

    fn handle_start(&mut self, e: &BytesStart<'_>) -> Result<(), ModelError> {
        let tag = std::str::from_utf8(e.name().as_ref())
            .map_err(|e| ModelError::xml(format!("invalid tag name: {e}")))?
            .to_string();
        let attrs = read_attrs(e)?;

        match tag.as_str() {
            "Model.Class" => {
                let name = required(&attrs, "name", &tag)?;
                self.current_class = Some(ClassDef {
                    name: name.into(),
                    parent: attrs
                        .get("parent")
                        .filter(|p| !p.is_empty())
                        .map(|p| p.as_str().into()),
                    is_abstract: attrs.get("abstract").map(|v| v == "true").unwrap_or(false),
                    attributes: IndexMap::new(),
                    schema_groups: None,
                    children_group: None,
                    doc: Documentation::default(),
                    source: self.source,
                });
            }
            "Model.Member" => {
                let name = required(&attrs, "name", &tag)?;
                let mask = attrs
                    .get("type")
                    .map(|t| AttrTypeMask::from_model_type(t))
                    .unwrap_or(AttrTypeMask::NO_TYPE);
                if let Some(class) = &mut self.current_class {
                    class.attributes.insert(name.clone(), mask);
                    match class.name.as_ref() {
                        "DefaultColors" => {
                            if let Some(default) = attrs.get("default") {
                                self.payload
                                    .default_colors
                                    .insert(name.clone(), default.clone());
                            }
                        }
                        "ThemeMetrics" => {
                            if let Some(default) = attrs.get("default") {
                                self.payload
                                    .theme_metrics
                                    .insert(name.clone(), default.clone());
                            }
                        }
                        _ => {}
                    }
                }
                self.doc_target = Some(DocTarget::Member(name));
            }
            "Model.Enumeration" => {
                let name = required(&attrs, "name", &tag)?;
                self.current_enum = Some(EnumDef {
                    name: name.into(),
                    entries: Vec::new(),
                    parent: attrs.get("parent").filter(|p| !p.is_empty()).cloned(),
                    source: self.source,
                });
            }
            "Model.Enumerator" => {
                let name = required(&attrs, "name", &tag)?;
                if let Some(en) = &mut self.current_enum {
                    en.entries.push(name.clone());
                    if en.name.as_ref() == "Language" {
                        self.payload.languages.push(name.clone());
                    }
                }
                self.doc_target = Some(DocTarget::Enumerator(name));
            }
            "Attributes" => {
                if attrs.get("x:id").map(String::as_str) == Some("attributes") {
                    if let Some(class) = &mut self.current_class {
                        if let Some(groups) = attrs.get("Class:SchemaGroups") {
                            class.schema_groups =
                                Some(groups.split_whitespace().map(str::to_string).collect());
                        }
                        if let Some(group) = attrs.get("Class:ChildGroup") {
                            if !group.is_empty() {
                                class.children_group = Some(group.clone());
                            }
                        }
                    }
                }
            }
            "Model.Documentation" => {
                if self.doc_target.is_none() {
                    self.doc_target = Some(DocTarget::Class);
                }
            }
            "String" => {
                if self.doc_target.is_some() {
                    self.doc_field = attrs.get("x:id").cloned();
                }
            }
            _ => {}
        }

        self.elem_stack.push(tag);
        Ok(())
    }

    fn handle_end(&mut self) {
        let Some(tag) = self.elem_stack.pop() else {
            return;
        };
        match tag.as_str() {
            "Model.Class" => {
                if let Some(class) = self.current_class.take() {
                    self.payload.classes.insert(class.name.to_string(), class);
                }
                self.doc_target = None;
            }
            "Model.Member" | "Model.Enumerator" => {
                self.doc_target = None;
            }
            "Model.Enumeration" => {
                if let Some(en) = self.current_enum.take() {
                    self.payload.enums.insert(en.name.to_string(), en);
                }
                self.doc_target = None;
            }
            "Model.Documentation" => {
                if matches!(self.doc_target, Some(DocTarget::Class)) {
                    self.doc_target = None;
                }
                self.doc_field = None;
            }
            "String" => {
                self.doc_field = None;
            }
            _ => {}
        }
    }

    fn record_doc(&mut self, field: String, value: String) {
        let doc = match &self.doc_target {
            Some(DocTarget::Class) => match &mut self.current_class {
                Some(class) => &mut class.doc,
                None => return,
            },
            Some(DocTarget::Member(member)) => {
                let Some(class) = &self.current_class else {
                    return;
                };
                let key = format!("{}.{}", class.name, member);
                self.payload.attr_docs.entry(key).or_default()
            }
            Some(DocTarget::Enumerator(entry)) => {
                let Some(en) = &self.current_enum else {
                    return;
                };
                let key = format!("{}.{}", en.name, entry);
                self.payload.enum_entry_docs.entry(key).or_default()
            }
            None => return,
        };
        match field.as_str() {
            "brief" => doc.brief = Some(value),
            "detailed" => doc.detailed = Some(value),
            "code" => doc.code = Some(value),
            _ => {}
        }
    }
}

fn read_attrs(e: &BytesStart<'_>) -> Result<HashMap<String, String>, ModelError> {
    let mut out = HashMap::new();
    for attr_result in e.attributes() {
        let attr = attr_result.map_err(|e| ModelError::xml(format!("attribute error: {e}")))?;
        let key = std::str::from_utf8(attr.key.as_ref())
            .map_err(|e| ModelError::xml(format!("attribute key error: {e}")))?
            .to_string();
        let value = attr
            .unescape_value()
            .map_err(|e| ModelError::xml(format!("attribute value error: {e}")))?
            .to_string();
        out.insert(key, value);
    }
    Ok(out)
}

fn required(
    attrs: &HashMap<String, String>,
    key: &str,
    tag: &str,
) -> Result<String, ModelError> {
    attrs
        .get(key)
        .cloned()
        .ok_or_else(|| ModelError::xml(format!("missing {key} attribute on {tag}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r##"
<Model>
  <Model.Class name="Control" abstract="true">
    <Attributes x:id="attributes" Class:SchemaGroups="controls"/>
    <List x:id="members">
      <Model.Member name="style" type="stylearray"/>
      <Model.Member name="visible" type="bool">
        <Model.Documentation>
          <String x:id="brief">Whether the control is drawn.</String>
        </Model.Documentation>
      </Model.Member>
    </List>
    <Model.Documentation>
      <String x:id="brief">Base class for controls.</String>
      <String x:id="detailed">Everything visible derives from Control.</String>
    </Model.Documentation>
  </Model.Class>
  <Model.Class name="Button" parent="Control">
    <List x:id="members">
      <Model.Member name="text" type="string"/>
    </List>
  </Model.Class>
  <Model.Enumeration name="Button.align" parent="Control.align">
    <Model.Enumerator name="left"/>
    <Model.Enumerator name="right"/>
  </Model.Enumeration>
  <Model.Class name="DefaultColors">
    <List x:id="members">
      <Model.Member name="red" type="color" default="#FF0000"/>
    </List>
  </Model.Class>
</Model>
"##;

    #[test]
    fn test_parse_classes() {
        let payload = parse_model(SAMPLE, ModelSource::Elements).unwrap();

        let control = &payload.classes["Control"];
        assert!(control.is_abstract);
        assert_eq!(
            control.schema_groups.as_deref(),
            Some(&["controls".to_string()][..])
        );
        assert!(control.attributes["style"].contains(AttrTypeMask::STYLE_ARRAY));
        assert!(control.attributes["visible"].contains(AttrTypeMask::BOOL));

        let button = &payload.classes["Button"];
        assert_eq!(button.parent.as_deref(), Some("Control"));
        assert!(!button.is_abstract);
    }

    #[test]
    fn test_parse_docs() {
        let payload = parse_model(SAMPLE, ModelSource::Elements).unwrap();

        let control = &payload.classes["Control"];
        assert_eq!(control.doc.brief.as_deref(), Some("Base class for controls."));
        assert!(control.doc.detailed.is_some());

        let visible = &payload.attr_docs["Control.visible"];
        assert_eq!(visible.brief.as_deref(), Some("Whether the control is drawn."));
    }

    #[test]
    fn test_parse_enums_and_default_colors() {
        let payload = parse_model(SAMPLE, ModelSource::Elements).unwrap();

        let align = &payload.enums["Button.align"];
        assert_eq!(align.entries, vec!["left", "right"]);
        assert_eq!(align.parent.as_deref(), Some("Control.align"));

        assert_eq!(payload.default_colors["red"], "#FF0000");
    }

    #[test]
    fn test_malformed_model_is_an_error() {
        assert!(parse_model("<Model><Model.Class></Model>", ModelSource::Elements).is_err());
    }
}
