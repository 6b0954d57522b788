//! Semantic model of a skin pack.
//!
//! ## Layers
//!
//! ```text
//! SkinFileInfo (per file)      ← definitions, forms, duplicates, includes
//!     │
//!     ▼
//! ScopeResolver (per pack)     ← include/import graph, namespaces,
//!     │                          is_defined / lookup_definition
//!     ▼
//! VariableResolver             ← $token expansion across scopes
//! ```
//!
//! The expression evaluator ([`eval`]) is independent of file state.

mod definitions;
mod diagnostics;
pub mod eval;
mod file_info;
mod gating;
mod scope;
mod variables;

pub use definitions::{
    DefineInfo, DefineValue, DefinitionKind, DuplicateDefinition, ExternalPattern,
    FormDependency, IncludeRef, ViewInstantiation,
};
pub use diagnostics::{Diagnostic, DiagnosticCollector, RelatedInfo, Severity};
pub use file_info::{DefEntry, SkinFileInfo};
pub use gating::{is_optionally_gated, is_platform_excluded};
pub use scope::{ExternalRequest, FoundDefinition, ScopeOptions, ScopeResolver};
pub use variables::{VariableResolver, WELL_KNOWN_GLOBALS, WELL_KNOWN_URL_LOCATIONS};
