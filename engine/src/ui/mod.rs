//! UI-facing types for the engine.

mod input;
mod options;
mod scroll;

pub use input::{FieldCursor, grapheme_count};
pub use options::UiOptions;
pub use scroll::ScrollState;
