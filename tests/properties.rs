//! Cross-cutting invariants of the scope and index layers.

mod common;

use common::{semantic_seams, Fixture};
use skincheck::semantic::{DefinitionKind, ScopeOptions};

#[test]
fn is_defined_iff_some_file_defines_it() {
    let fixture = Fixture::new();
    let root = fixture.write(
        "skins/Pack/skin.xml",
        r##"<Skin>
             <Include name="NS" url="extra.xml"/>
             <Styles><Style name="Root.primary" color="#fff"/></Styles>
           </Skin>"##,
    );
    fixture.write(
        "skins/Pack/extra.xml",
        r##"<Skin><Styles><Style name="Sub.primary" color="#000"/></Styles></Skin>"##,
    );

    let (mut scope, mut docs) = semantic_seams();
    for (value, expected) in [
        ("Root.primary", true),
        ("NS/Sub.primary", true),
        ("Sub.primary", false),
        ("Nowhere.primary", false),
    ] {
        assert_eq!(
            scope.is_defined(DefinitionKind::Style, value, &root, None, &mut docs, None),
            expected,
            "{value}"
        );
    }
}

#[test]
fn refresh_without_change_is_idempotent() {
    let fixture = Fixture::new();
    let root = fixture.write(
        "skins/Pack/skin.xml",
        r##"<Skin><Styles><Style name="A.primary" color="#fff"/></Styles></Skin>"##,
    );

    let (mut scope, mut docs) = semantic_seams();
    scope.ensure_info(&root, None, &mut docs, None);
    let first: Vec<String> = scope
        .info(&root)
        .unwrap()
        .definition_names(DefinitionKind::Style)
        .iter()
        .map(|s| s.to_string())
        .collect();

    scope.ensure_info(&root, None, &mut docs, None);
    let second: Vec<String> = scope
        .info(&root)
        .unwrap()
        .definition_names(DefinitionKind::Style)
        .iter()
        .map(|s| s.to_string())
        .collect();
    assert_eq!(first, second);
}

#[test]
fn foreign_namespaces_hidden_unless_requested() {
    let fixture = Fixture::new();
    let root = fixture.write(
        "skins/Pack/skin.xml",
        r#"<Skin><Include name="NS" url="extra.xml"/></Skin>"#,
    );
    fixture.write(
        "skins/Pack/extra.xml",
        r##"<Skin><Styles><Style name="Sub.primary" color="#000"/></Styles></Skin>"##,
    );

    let (mut scope, mut docs) = semantic_seams();
    let hidden = scope.find_definitions(
        &[DefinitionKind::Style],
        &root,
        &ScopeOptions::default(),
        &mut docs,
        None,
    );
    // The root itself has no namespace, but the included file does; its
    // names are reachable only through qualification.
    assert!(
        hidden.iter().any(|(name, _)| name == "NS/Sub.primary"),
        "{hidden:?}"
    );

    let foreign = scope.find_definitions(
        &[DefinitionKind::Style],
        &root,
        &ScopeOptions::foreign(),
        &mut docs,
        None,
    );
    assert!(foreign.iter().any(|(name, _)| name == "NS/Sub.primary"));
}

#[test]
fn sized_delegates_index_without_duplicates() {
    let fixture = Fixture::new();
    let root = fixture.write(
        "skins/Pack/skin.xml",
        r#"<Skin>
             <Form name="A"><Delegate form.name="Row" width="10"/></Form>
             <Form name="B"><Delegate form.name="Row" height="20"/></Form>
             <Form name="Row"><Button/></Form>
           </Skin>"#,
    );

    let (mut scope, mut docs) = semantic_seams();
    scope.ensure_info(&root, None, &mut docs, None);
    let info = scope.info(&root).unwrap();
    assert!(info
        .lookup(DefinitionKind::SizedDelegate, "Row")
        .is_some());
    assert!(info.duplicates.is_empty());
}
