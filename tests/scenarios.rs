//! End-to-end scenarios: one skin pack on disk, checked and queried
//! through the public surface.

mod common;

use common::{semantic_seams, write_file, Fixture};
use skincheck::base::Position;
use skincheck::ide::CompletionKind;
use skincheck::semantic::{
    eval::{evaluate, EvalError, Value},
    DefinitionKind, ScopeOptions, Severity, VariableResolver,
};

const BROKEN_SKIN: &str = r#"<Skin>
  <Styles><Style name="My." color="" /></Styles>
  <Button style="My."/>
  <Variant>
</Skin>"#;

#[test]
fn diagnostic_snapshot_for_broken_skin() {
    let mut fixture = Fixture::new();
    let uri = fixture.write("skins/MySkinPack/skin.xml", BROKEN_SKIN);
    let diagnostics = fixture.check(&uri);

    let rendered: Vec<(Severity, String)> = diagnostics
        .iter()
        .map(|d| (d.severity, d.message.to_string()))
        .collect();
    assert_eq!(
        rendered,
        vec![
            (
                Severity::Warning,
                "color has no value. Consider removing it.".to_string()
            ),
            (
                Severity::Error,
                "Element \"Button\" is not a valid child for \"Skin\".".to_string()
            ),
            (
                Severity::Error,
                "No definition found for style \"My.\".".to_string()
            ),
            (
                Severity::Error,
                "Element \"Variant\" is not a valid child for \"Skin\".".to_string()
            ),
            (
                Severity::Error,
                "No closing tag found for <Variant>.".to_string()
            ),
        ]
    );

    // Ranges come from the file's own line index.
    let empty_color = &diagnostics[0];
    assert_eq!(empty_color.range.start, empty_color.range.end);
    assert_eq!(empty_color.range.start.line, 1);

    let button = &diagnostics[1];
    assert_eq!(button.range.start.line, 2);
    assert_eq!(button.range.start.column, 3);
    assert_eq!(button.range.end.column, 9);
}

#[test]
fn style_completion_offers_second_level_segments() {
    let mut fixture = Fixture::new();
    let uri = fixture.write("skins/MySkinPack/skin.xml", BROKEN_SKIN);
    fixture
        .host
        .configure_for(&uri, &Default::default());

    // Cursor at the end of style="My." (line 2, inside the quotes).
    let items = fixture
        .host
        .find_completions(&uri, Position::new(2, 20));
    assert!(items.len() >= 2, "no completions returned");
    assert_eq!(items[0].label.as_ref(), "primary");
    assert_eq!(items[0].kind, CompletionKind::Module);
    assert_eq!(items[1].label.as_ref(), "secondary");
    assert_eq!(items[1].kind, CompletionKind::Module);
}

#[test]
fn close_tag_completion_is_preselected() {
    let mut fixture = Fixture::new();
    let text = "<Skin>\n  <Variant>\n  <\n</Skin>";
    let uri = fixture.write("skins/MySkinPack/skin.xml", text);
    fixture
        .host
        .configure_for(&uri, &Default::default());

    let items = fixture
        .host
        .find_completions(&uri, Position::new(2, 3));
    let close = items
        .iter()
        .find(|i| i.label.as_ref() == "/Variant>")
        .expect("close-tag completion missing");
    assert!(close.preselect);
    assert_eq!(close.kind, CompletionKind::Snippet);
    // The snippet leads the list.
    assert_eq!(items[0].label.as_ref(), "/Variant>");
}

#[test]
fn foreach_expansion_yields_all_rows() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pack/skin.xml");
    write_file(
        &path,
        r#"<Skin><Form name="F"><foreach variable="i" start="1" count="3"><View name="Row_$i"/></foreach></Form></Skin>"#,
    );
    let uri = path.to_string_lossy().to_string();

    let (mut scope, mut docs) = semantic_seams();
    let state = docs.get(&uri).unwrap();
    let view = state
        .document
        .all_nodes()
        .find(|&id| state.document.node(id).name == "View")
        .unwrap();

    let mut resolver = VariableResolver::new(&mut scope, &mut docs, None);
    let mut expansions = resolver.resolve(&uri, view, "Row_$i");
    expansions.sort();
    assert_eq!(expansions, vec!["Row_1", "Row_2", "Row_3"]);
}

#[test]
fn override_wins_and_raises_no_duplicate() {
    let mut fixture = Fixture::new();
    let root = fixture.write(
        "skins/Pack/skin.xml",
        r#"<Skin>
             <Include url="a.xml"/>
             <Include url="b.xml"/>
           </Skin>"#,
    );
    fixture.write(
        "skins/Pack/a.xml",
        r##"<Skin><Styles><Style name="X" color="#fff"/></Styles></Skin>"##,
    );
    fixture.write(
        "skins/Pack/b.xml",
        r##"<Skin><Styles><Style name="X" color="#000" override="true"/></Styles></Skin>"##,
    );

    // Validating each file raises no duplicate-definition diagnostics.
    for rel in ["skins/Pack/a.xml", "skins/Pack/b.xml"] {
        let uri = fixture.path(rel);
        let diagnostics = fixture.check(&uri);
        assert!(
            diagnostics.iter().all(|d| !d.message.contains("Duplicate")),
            "unexpected duplicate report in {rel}: {diagnostics:?}"
        );
    }

    let (mut scope, mut docs) = semantic_seams();
    let hits = scope.lookup_definition(
        DefinitionKind::Style,
        "X",
        &root,
        None,
        &ScopeOptions::default(),
        &mut docs,
        None,
    );
    assert_eq!(hits.len(), 1);
    assert!(hits[0].is_override);
    assert!(hits[0].location.uri.ends_with("b.xml"));
}

#[test]
fn expression_scenarios() {
    let result = evaluate("(2+3)*4 > 19 & 1");
    assert_eq!(result.value, Value::Bool(true));
    assert!(result.errors.is_empty());

    let result = evaluate("1/0");
    assert_eq!(result.value, Value::Num(0.0));
    assert_eq!(result.errors, vec![EvalError::DivideByZero]);

    let result = evaluate("'a'+'b'");
    assert!(result
        .errors
        .iter()
        .any(|e| matches!(e, EvalError::NonNumeric(_))));
}
