//! Definition records extracted from skin files.

use crate::base::{Location, Range};
use crate::syntax::NodeId;

/// The kind of a named definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DefinitionKind {
    Color,
    Style,
    /// Styles flagged `appstyle="true"` — a filtered view of `Style`.
    AppStyle,
    Image,
    Shape,
    Font,
    Metric,
    Form,
    SizedDelegate,
    Variable,
}

impl DefinitionKind {
    pub const ALL: [DefinitionKind; 10] = [
        DefinitionKind::Color,
        DefinitionKind::Style,
        DefinitionKind::AppStyle,
        DefinitionKind::Image,
        DefinitionKind::Shape,
        DefinitionKind::Font,
        DefinitionKind::Metric,
        DefinitionKind::Form,
        DefinitionKind::SizedDelegate,
        DefinitionKind::Variable,
    ];

    /// Namespace qualification applies to every kind except colors and fonts.
    pub fn is_qualifiable(self) -> bool {
        !matches!(self, DefinitionKind::Color | DefinitionKind::Font)
    }

    /// Lowercase word used in messages ("No definition found for style …").
    pub fn display(self) -> &'static str {
        match self {
            DefinitionKind::Color => "color",
            DefinitionKind::Style => "style",
            DefinitionKind::AppStyle => "app style",
            DefinitionKind::Image => "image",
            DefinitionKind::Shape => "shape",
            DefinitionKind::Font => "font",
            DefinitionKind::Metric => "metric",
            DefinitionKind::Form => "form",
            DefinitionKind::SizedDelegate => "sized delegate",
            DefinitionKind::Variable => "variable",
        }
    }
}

/// One value a `<define>` gives a variable, with its defining location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefineValue {
    pub value: String,
    pub location: Location,
}

/// All values a form's `<define>` elements give one variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefineInfo {
    pub name: String,
    pub values: Vec<DefineValue>,
}

/// A site instantiating a form (`<View name="F"/>`, `<Delegate
/// form.name="F"/>`, …) inside some parent form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewInstantiation {
    pub parent_form: String,
    pub node: NodeId,
}

/// A `$variable` a form's body needs but does not define itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormDependency {
    /// Variable name including the leading `$`.
    pub name: String,
    /// The element whose attribute referenced the variable.
    pub scope: NodeId,
}

/// Two same-named, same-kind definitions in one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateDefinition {
    pub name: String,
    pub kind: DefinitionKind,
    pub range: Range,
    pub other: Location,
}

/// An `<Include name="NS" url="…"/>` (or `<Import url="@pack"/>`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncludeRef {
    /// Namespace the included file gets; empty for unnamed includes.
    pub namespace: String,
    pub url: String,
    pub node: NodeId,
    /// True for `<Import>`: the target is another skin pack's root.
    pub imported: bool,
}

/// An `<External name="pat*"/>` glob declared in a skin root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalPattern {
    pub pattern: String,
    pub location: Location,
}
