//! Extraction of form fields and text from PDF documents.

pub mod forms;
pub mod text;
pub mod widgets;

pub use forms::{caption_label, extract_form_fields, read_field_values, FormExtractor, FormField};
pub use text::{extract_text, TextExtractor};
pub use widgets::{collect_widgets, load_document, open_document, FieldFlags, FieldType, Widget};
