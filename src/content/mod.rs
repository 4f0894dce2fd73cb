//! Content stream interpretation.
//!
//! Tracks just enough graphics and text state to position the words of a
//! page, which is what caption-based field labelling needs.

pub mod graphics_state;
pub mod text_runs;

pub use graphics_state::{GraphicsState, GraphicsStateStack, Matrix};
pub use text_runs::{page_text_runs, sort_reading_order, TextRun};
