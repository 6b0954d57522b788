//! XML layer for skin documents.
//!
//! Skin files are edited live and must index and validate even while
//! structurally broken, so parsing never fails: the parser recovers from
//! unclosed and dangling tags and records them on the [`Document`]. Every
//! node and attribute keeps its byte offsets in the source text.
//!
//! ## Key Types
//!
//! - [`Document`] — arena DOM with parent links and recovery records
//! - [`Node`] / [`Attr`] — offsets into the source for every piece
//! - [`Token`] — what the cursor is on, re-read from raw tag text

mod dom;
mod parser;
mod scanner;

pub use dom::{Attr, DanglingTag, Document, Node, NodeId, NodeKind};
pub use parser::parse;
pub use scanner::{pending_open_tags, token_at, ScannedAttr, Token};
