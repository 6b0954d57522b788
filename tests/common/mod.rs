//! Shared fixtures: a small but realistic class model pair and a
//! temporary repository to build skin packs in.
#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use skincheck::ide::{AnalysisHost, HostConfig};
use skincheck::semantic::Diagnostic;

pub const SKIN_ELEMENTS: &str = r##"
<Model>
  <Model.Class name="Skin">
    <Attributes x:id="attributes" Class:ChildGroup="skinroot"/>
  </Model.Class>

  <Model.Class name="Include">
    <Attributes x:id="attributes" Class:SchemaGroups="skinroot"/>
    <List x:id="members">
      <Model.Member name="name" type="string"/>
      <Model.Member name="url" type="uri"/>
    </List>
  </Model.Class>
  <Model.Class name="Import">
    <Attributes x:id="attributes" Class:SchemaGroups="skinroot"/>
    <List x:id="members">
      <Model.Member name="url" type="uri"/>
    </List>
  </Model.Class>
  <Model.Class name="Externals">
    <Attributes x:id="attributes" Class:SchemaGroups="skinroot" Class:ChildGroup="externalsbody"/>
  </Model.Class>
  <Model.Class name="External">
    <Attributes x:id="attributes" Class:SchemaGroups="externalsbody"/>
    <List x:id="members">
      <Model.Member name="name" type="string"/>
    </List>
  </Model.Class>

  <Model.Class name="Styles">
    <Attributes x:id="attributes" Class:SchemaGroups="skinroot" Class:ChildGroup="stylesbody"/>
  </Model.Class>
  <Model.Class name="Style">
    <Attributes x:id="attributes" Class:SchemaGroups="stylesbody"/>
    <List x:id="members">
      <Model.Member name="name" type="string"/>
      <Model.Member name="color" type="color"/>
      <Model.Member name="inherit" type="string"/>
      <Model.Member name="appstyle" type="bool"/>
      <Model.Member name="textsize" type="string"/>
      <Model.Member name="override" type="bool"/>
    </List>
    <Model.Documentation>
      <String x:id="brief">A named visual style.</String>
    </Model.Documentation>
  </Model.Class>
  <Model.Class name="StyleAlias">
    <Attributes x:id="attributes" Class:SchemaGroups="stylesbody"/>
    <List x:id="members">
      <Model.Member name="name" type="string"/>
      <Model.Member name="styles" type="string"/>
      <Model.Member name="appstyle" type="bool"/>
    </List>
  </Model.Class>

  <Model.Class name="Resources">
    <Attributes x:id="attributes" Class:SchemaGroups="skinroot" Class:ChildGroup="resourcesbody"/>
  </Model.Class>
  <Model.Class name="Color">
    <Attributes x:id="attributes" Class:SchemaGroups="resourcesbody themebody"/>
    <List x:id="members">
      <Model.Member name="name" type="string"/>
      <Model.Member name="value" type="color"/>
    </List>
  </Model.Class>
  <Model.Class name="Image">
    <Attributes x:id="attributes" Class:SchemaGroups="resourcesbody"/>
    <List x:id="members">
      <Model.Member name="name" type="string"/>
      <Model.Member name="url" type="uri"/>
      <Model.Member name="frames" type="string"/>
    </List>
  </Model.Class>
  <Model.Class name="ImagePart" parent="Image"/>
  <Model.Class name="ShapeImage" parent="Image"/>
  <Model.Class name="IconSet" parent="Image"/>

  <Model.Class name="Shapes">
    <Attributes x:id="attributes" Class:SchemaGroups="skinroot" Class:ChildGroup="shapesbody"/>
  </Model.Class>
  <Model.Class name="Shape">
    <Attributes x:id="attributes" Class:SchemaGroups="shapesbody"/>
    <List x:id="members">
      <Model.Member name="name" type="string"/>
    </List>
  </Model.Class>

  <Model.Class name="ThemeElements">
    <Attributes x:id="attributes" Class:SchemaGroups="skinroot" Class:ChildGroup="themebody"/>
  </Model.Class>
  <Model.Class name="Font">
    <Attributes x:id="attributes" Class:SchemaGroups="themebody"/>
    <List x:id="members">
      <Model.Member name="name" type="string"/>
      <Model.Member name="size" type="float"/>
      <Model.Member name="themeid" type="string"/>
    </List>
  </Model.Class>
  <Model.Class name="Metric">
    <Attributes x:id="attributes" Class:SchemaGroups="themebody"/>
    <List x:id="members">
      <Model.Member name="name" type="string"/>
      <Model.Member name="value" type="float"/>
    </List>
  </Model.Class>

  <Model.Class name="ColorScheme">
    <Attributes x:id="attributes" Class:SchemaGroups="skinroot" Class:ChildGroup="schemebody"/>
    <List x:id="members">
      <Model.Member name="name" type="string"/>
    </List>
  </Model.Class>
  <Model.Class name="ColorScheme.Color">
    <Attributes x:id="attributes" Class:SchemaGroups="schemebody"/>
    <List x:id="members">
      <Model.Member name="name" type="string"/>
      <Model.Member name="value" type="color"/>
    </List>
  </Model.Class>

  <Model.Class name="Form">
    <Attributes x:id="attributes" Class:SchemaGroups="skinroot" Class:ChildGroup="formbody"/>
    <List x:id="members">
      <Model.Member name="name" type="string"/>
      <Model.Member name="attach" type="string"/>
    </List>
  </Model.Class>

  <Model.Class name="Control" abstract="true">
    <Attributes x:id="attributes" Class:SchemaGroups="formbody"/>
    <List x:id="members">
      <Model.Member name="name" type="string"/>
      <Model.Member name="style" type="string"/>
      <Model.Member name="width" type="float"/>
      <Model.Member name="height" type="float"/>
      <Model.Member name="visible" type="bool"/>
      <Model.Member name="sizelimits" type="string"/>
    </List>
    <Model.Documentation>
      <String x:id="brief">Base class for visible controls.</String>
    </Model.Documentation>
  </Model.Class>
  <Model.Class name="Button" parent="Control">
    <List x:id="members">
      <Model.Member name="text" type="string"/>
      <Model.Member name="command.name" type="string"/>
      <Model.Member name="command.category" type="string"/>
      <Model.Member name="align" type="enum"/>
    </List>
  </Model.Class>
  <Model.Class name="Variant" parent="Control"/>
  <Model.Class name="Slider" parent="Control"/>
  <Model.Class name="Options" parent="Control">
    <List x:id="members">
      <Model.Member name="options" type="enum"/>
      <Model.Member name="type" type="string"/>
    </List>
  </Model.Class>
  <Model.Class name="Animation" parent="Control">
    <List x:id="members">
      <Model.Member name="repeat" type="int"/>
    </List>
  </Model.Class>
  <Model.Class name="Layout" parent="Control">
    <Attributes x:id="attributes" Class:SchemaGroups="formbody" Class:ChildGroup="formbody"/>
    <List x:id="members">
      <Model.Member name="layout.class" type="enum"/>
    </List>
  </Model.Class>
  <Model.Class name="Horizontal" parent="Layout"/>
  <Model.Class name="Vertical" parent="Layout"/>
  <Model.Class name="View" parent="Control"/>
  <Model.Class name="ScrollView" parent="Control"/>
  <Model.Class name="Target" parent="Control"/>
  <Model.Class name="Delegate" parent="Control">
    <List x:id="members">
      <Model.Member name="form.name" type="string"/>
      <Model.Member name="size" type="string"/>
    </List>
  </Model.Class>
  <Model.Class name="PopupBox" parent="Control">
    <List x:id="members">
      <Model.Member name="form.name" type="string"/>
    </List>
  </Model.Class>

  <Model.Class name="statement" abstract="true">
    <Attributes x:id="attributes" Class:SchemaGroups="skinroot formbody stylesbody"/>
    <List x:id="members">
      <Model.Member name="name" type="string"/>
    </List>
  </Model.Class>
  <Model.Class name="define" parent="statement"/>
  <Model.Class name="foreach" parent="statement">
    <List x:id="members">
      <Model.Member name="variable" type="string"/>
      <Model.Member name="in" type="string"/>
      <Model.Member name="start" type="int"/>
      <Model.Member name="count" type="int"/>
    </List>
  </Model.Class>
  <Model.Class name="if" parent="statement">
    <Attributes x:id="attributes" Class:SchemaGroups="skinroot formbody stylesbody" Class:ChildGroup="formbody"/>
    <List x:id="members">
      <Model.Member name="test" type="string"/>
    </List>
  </Model.Class>
  <Model.Class name="switch" parent="statement">
    <Attributes x:id="attributes" Class:SchemaGroups="skinroot formbody stylesbody" Class:ChildGroup="switchbody"/>
    <List x:id="members">
      <Model.Member name="value" type="string"/>
    </List>
  </Model.Class>
  <Model.Class name="case">
    <Attributes x:id="attributes" Class:SchemaGroups="switchbody"/>
    <List x:id="members">
      <Model.Member name="value" type="string"/>
    </List>
  </Model.Class>
  <Model.Class name="default">
    <Attributes x:id="attributes" Class:SchemaGroups="switchbody"/>
  </Model.Class>
  <Model.Class name="styleselector" parent="statement">
    <List x:id="members">
      <Model.Member name="variable" type="string"/>
      <Model.Member name="styles" type="string"/>
    </List>
  </Model.Class>

  <Model.Enumeration name="Button.align">
    <Model.Enumerator name="left"/>
    <Model.Enumerator name="center"/>
    <Model.Enumerator name="right"/>
  </Model.Enumeration>

  <Model.Class name="DefaultColors">
    <List x:id="members">
      <Model.Member name="red" type="color" default="#FF0000"/>
      <Model.Member name="white" type="color" default="#FFFFFF"/>
      <Model.Member name="transparent" type="color" default="#00000000"/>
    </List>
  </Model.Class>
  <Model.Class name="ThemeMetrics">
    <List x:id="members">
      <Model.Member name="spacing" type="float" default="8"/>
      <Model.Member name="spacing.large" type="float" default="16"/>
    </List>
  </Model.Class>
  <Model.Enumeration name="Language">
    <Model.Enumerator name="en"/>
    <Model.Enumerator name="ja"/>
  </Model.Enumeration>
</Model>
"##;

pub const VISUAL_STYLES: &str = r#"
<Model>
  <Model.Class name="styleclass" abstract="true"/>
  <Model.Class name="primary" parent="styleclass"/>
  <Model.Class name="secondary" parent="styleclass"/>
</Model>
"#;

/// A temporary repository with class models installed.
pub struct Fixture {
    pub dir: tempfile::TempDir,
    pub host: AnalysisHost,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let models = dir.path().join("classmodels");
        std::fs::create_dir_all(&models).unwrap();
        std::fs::write(models.join("Skin Elements.classModel"), SKIN_ELEMENTS).unwrap();
        std::fs::write(models.join("Visual Styles.classModel"), VISUAL_STYLES).unwrap();
        std::fs::write(
            dir.path().join("repo.json"),
            r#"{ "skins": ["skins/"] }"#,
        )
        .unwrap();

        Self {
            dir,
            host: AnalysisHost::new(),
        }
    }

    /// Write a file under the repository; returns its URI.
    pub fn write(&self, rel: &str, text: &str) -> String {
        let path = self.dir.path().join(rel);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, text).unwrap();
        path.to_string_lossy().to_string()
    }

    pub fn path(&self, rel: &str) -> String {
        self.dir.path().join(rel).to_string_lossy().to_string()
    }

    /// Validate one document end to end.
    pub fn check(&mut self, uri: &str) -> Vec<Diagnostic> {
        self.host.configure_for(uri, &HostConfig::default());
        let mut budget = self.host.new_budget();
        self.host
            .check_document(uri, &mut budget)
            .expect("check was not cancelled")
    }
}

/// Seam helpers for semantic-level tests.
pub fn semantic_seams() -> (
    skincheck::semantic::ScopeResolver,
    skincheck::documents::DocumentManager,
) {
    use skincheck::project::{NoOverlay, OsFileSystem, SystemClock};
    let resolver = skincheck::semantic::ScopeResolver::new(
        Arc::new(OsFileSystem),
        Arc::new(SystemClock),
        None,
    );
    let docs =
        skincheck::documents::DocumentManager::new(Arc::new(OsFileSystem), Arc::new(NoOverlay));
    (resolver, docs)
}

/// Write a standalone pack file outside any fixture.
pub fn write_file(path: &Path, text: &str) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, text).unwrap();
}
