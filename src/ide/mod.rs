//! IDE features — high-level APIs for editor handlers.
//!
//! Everything here takes data in and returns data out; no editor-protocol
//! types. The [`AnalysisHost`] owns all mutable state (class model,
//! document cache, scope registry, color index); [`Analysis`] wraps it for
//! querying.

mod analysis;
mod completion;
mod goto;
mod hover;
mod references;

pub use analysis::{Analysis, AnalysisHost, HostConfig};
pub use completion::{CompletionItem, CompletionKind};
pub use goto::find_symbol_definitions;
pub use hover::HoverResult;
pub use references::{RenameEdit, Symbol, SymbolContext};
