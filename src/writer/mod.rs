//! Form writing.
//!
//! ## Architecture
//!
//! ```text
//! PDF bytes + { field_name: value }
//!     ↓
//! [FormFiller] (parse into an in-memory copy, locate widgets by name)
//!     ↓
//! [FormAppearanceGenerator] (text and check box appearance streams)
//!     ↓
//! new PDF bytes (NeedAppearances set, XFA removed)
//! ```

pub mod form_appearance;
pub mod form_filler;

pub use form_appearance::{
    checkbox_off_appearance, checkbox_on_appearance, wrap_lines, Alignment, DefaultAppearance,
    FormAppearanceGenerator,
};
pub use form_filler::{fill_form, is_truthy, FillOptions, FormFiller};
