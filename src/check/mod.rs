//! Document validation.
//!
//! ## Key Types
//!
//! - [`check_document`] — validate one skin document
//! - [`Budget`] — cooperative chunking + check-epoch cancellation
//! - [`Color`] — parsed color literals, fed back to the color picker

mod checker;
mod colors;

pub use checker::{check_document, Budget, CheckOutcome};
pub use colors::{color_to_string, parse_color, Color};
