//! The attribute type system.
//!
//! Attribute types are a bitmask: composite declarations like `shape|uri`
//! are disjunctions, and a value is accepted when any single bit's check
//! accepts it. `NO_TYPE` is the identity under `|`.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use std::sync::Arc;

use indexmap::IndexMap;

/// Bitmask of possible attribute value kinds.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct AttrTypeMask(u32);

impl AttrTypeMask {
    pub const NO_TYPE: Self = Self(0);
    pub const BOOL: Self = Self(1);
    pub const INT: Self = Self(1 << 1);
    pub const FLOAT: Self = Self(1 << 2);
    pub const STRING: Self = Self(1 << 3);
    pub const ENUM: Self = Self(1 << 4);
    pub const COLOR: Self = Self(1 << 5);
    pub const SIZE: Self = Self(1 << 6);
    pub const RECT: Self = Self(1 << 7);
    pub const IMAGE: Self = Self(1 << 8);
    pub const POINT: Self = Self(1 << 9);
    pub const POINT3D: Self = Self(1 << 10);
    pub const URI: Self = Self(1 << 11);
    pub const STYLE: Self = Self(1 << 12);
    pub const STYLE_ARRAY: Self = Self(1 << 13);
    pub const SHAPE: Self = Self(1 << 14);
    pub const FONT: Self = Self(1 << 15);
    pub const FORM: Self = Self(1 << 16);
    pub const FONT_SIZE: Self = Self(1 << 17);
    pub const DURATION: Self = Self(1 << 18);
    pub const STR_NONE: Self = Self(1 << 19);
    pub const STR_FOREVER: Self = Self(1 << 20);

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn contains(self, bit: Self) -> bool {
        bit.0 != 0 && self.0 & bit.0 == bit.0
    }

    pub fn intersects(self, other: Self) -> bool {
        self.0 & other.0 != 0
    }

    /// Iterate the individual bits set in this mask.
    pub fn bits(self) -> impl Iterator<Item = AttrTypeMask> {
        (0..21u32)
            .map(|i| AttrTypeMask(1 << i))
            .filter(move |bit| self.0 & bit.0 != 0)
    }

    /// Parse a declared member type. Composite declarations use `|`.
    /// Unknown names yield `NO_TYPE`, which the name heuristics refine.
    pub fn from_model_type(decl: &str) -> Self {
        decl.split('|')
            .map(|part| match part.trim().to_ascii_lowercase().as_str() {
                "bool" | "boolean" => Self::BOOL,
                "int" | "integer" => Self::INT,
                "float" | "double" => Self::FLOAT,
                "string" => Self::STRING,
                "enum" => Self::ENUM,
                "color" => Self::COLOR,
                "size" => Self::SIZE,
                "rect" => Self::RECT,
                "image" => Self::IMAGE,
                "point" => Self::POINT,
                "point3d" => Self::POINT3D,
                "uri" | "url" => Self::URI,
                "style" => Self::STYLE,
                "stylearray" => Self::STYLE_ARRAY,
                "shape" => Self::SHAPE,
                "font" => Self::FONT,
                "form" => Self::FORM,
                "fontsize" => Self::FONT_SIZE,
                "duration" => Self::DURATION,
                "none" => Self::STR_NONE,
                "forever" => Self::STR_FOREVER,
                _ => Self::NO_TYPE,
            })
            .fold(Self::NO_TYPE, Self::bitor)
    }

    fn bit_name(self) -> &'static str {
        match self {
            Self::BOOL => "bool",
            Self::INT => "int",
            Self::FLOAT => "float",
            Self::STRING => "string",
            Self::ENUM => "enum",
            Self::COLOR => "color",
            Self::SIZE => "size",
            Self::RECT => "rect",
            Self::IMAGE => "image",
            Self::POINT => "point",
            Self::POINT3D => "point3d",
            Self::URI => "uri",
            Self::STYLE => "style",
            Self::STYLE_ARRAY => "style[]",
            Self::SHAPE => "shape",
            Self::FONT => "font",
            Self::FORM => "form",
            Self::FONT_SIZE => "fontsize",
            Self::DURATION => "duration",
            Self::STR_NONE => "\"none\"",
            Self::STR_FOREVER => "\"forever\"",
            _ => "unknown",
        }
    }

    /// Human-readable rendering for hover, e.g. `shape | uri`.
    pub fn describe(self) -> String {
        if self.is_empty() {
            return "untyped".to_string();
        }
        self.bits()
            .map(|b| b.bit_name())
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

impl BitOr for AttrTypeMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for AttrTypeMask {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for AttrTypeMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AttrTypeMask({})", self.describe())
    }
}

/// Which model file a definition came from. Reloading a file replaces only
/// its own portion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelSource {
    Elements,
    Styles,
}

/// Documentation strings attached to classes, members and enumerators.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Documentation {
    pub brief: Option<String>,
    pub detailed: Option<String>,
    pub code: Option<String>,
}

impl Documentation {
    pub fn is_empty(&self) -> bool {
        self.brief.is_none() && self.detailed.is_none() && self.code.is_none()
    }
}

/// One element class from the model.
#[derive(Debug, Clone)]
pub struct ClassDef {
    pub name: Arc<str>,
    pub parent: Option<Arc<str>>,
    pub is_abstract: bool,
    /// Declared attributes, in model order.
    pub attributes: IndexMap<String, AttrTypeMask>,
    /// Schema groups this class belongs to; `None` inherits the parent's.
    pub schema_groups: Option<Vec<String>>,
    /// The group children must belong to; `None` inherits the parent's.
    pub children_group: Option<String>,
    pub doc: Documentation,
    pub source: ModelSource,
}

/// One enumeration from the model, keyed by its dotted `Class.attribute`
/// name. `parent` chains to another dotted key whose entries are inherited.
#[derive(Debug, Clone)]
pub struct EnumDef {
    pub name: Arc<str>,
    pub entries: Vec<String>,
    pub parent: Option<String>,
    pub source: ModelSource,
}
