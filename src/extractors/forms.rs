//! AcroForm text field extraction.
//!
//! Lists every fillable text widget of a document together with a human
//! label: the field's accessible name (`/TU`) when it has a meaningful one,
//! otherwise the words printed just above and to the left of the widget.
//! See ISO 32000-1:2008, Section 12.7 - Interactive Forms.

use super::widgets::{collect_widgets, load_document, FieldType};
use crate::content::{page_text_runs, TextRun};
use crate::error::Result;
use crate::fonts::decode_text_string;
use crate::geometry::Rect;
use crate::object::{get_name, get_text, inherited, terminal_field_id};
use indexmap::IndexMap;
use lopdf::{Document, Object, ObjectId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How far left of the widget the caption search extends, in widget widths.
pub const CAPTION_WIDTH_FACTOR: f32 = 1.5;

/// How far above the widget's top edge the caption search extends, in points.
pub const CAPTION_MARGIN: f32 = 30.0;

/// Maximum number of words kept in a synthesized label.
pub const CAPTION_MAX_WORDS: usize = 7;

/// A fillable text field and its human label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormField {
    /// Fully qualified field identifier
    pub field_name: String,
    /// Explicit or synthesized human label (may be empty)
    pub label: String,
}

impl FormField {
    /// Create a field record.
    pub fn new(field_name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            label: label.into(),
        }
    }
}

/// Extracts text form fields and their labels from PDF documents.
pub struct FormExtractor;

impl FormExtractor {
    /// Extract one record per fillable text widget, in page order and then
    /// `/Annots` order.
    ///
    /// A document without text widgets yields an empty list; only bytes that
    /// cannot be opened as a PDF produce an error.
    pub fn extract_fields(doc: &Document) -> Vec<FormField> {
        let mut fields = Vec::new();
        let mut page_runs: HashMap<ObjectId, Vec<TextRun>> = HashMap::new();

        for widget in collect_widgets(doc) {
            if !widget.is_text() {
                log::trace!(
                    "Skipping {:?} widget '{}'",
                    widget.field_type,
                    widget.field_name
                );
                continue;
            }
            let label = match (Self::explicit_label(doc, widget.id, &widget.field_name), widget.rect) {
                (Some(label), _) => label,
                (None, Some(rect)) => {
                    let runs = page_runs
                        .entry(widget.page_id)
                        .or_insert_with(|| page_text_runs(doc, widget.page_id));
                    caption_label(runs, &rect)
                },
                (None, None) => {
                    log::debug!("Text widget '{}' has no /Rect and no /TU", widget.field_name);
                    String::new()
                },
            };

            fields.push(FormField::new(widget.field_name, label));
        }

        log::debug!("Extracted {} text fields", fields.len());
        fields
    }

    /// The inherited `/TU` of a widget when it is non-empty and differs from
    /// the field identifier.
    fn explicit_label(doc: &Document, widget_id: ObjectId, field_name: &str) -> Option<String> {
        let dict = doc.get_dictionary(widget_id).ok()?;
        let label = match inherited(doc, dict, b"TU")? {
            Object::String(bytes, _) => decode_text_string(bytes),
            _ => return None,
        };
        if label.is_empty() || label == field_name {
            None
        } else {
            Some(label)
        }
    }

    /// Current value (`/V`) of every text widget, keyed by field identifier.
    pub fn read_values(doc: &Document) -> IndexMap<String, String> {
        let mut values = IndexMap::new();
        for widget in collect_widgets(doc) {
            if !matches!(widget.field_type, FieldType::Text | FieldType::Choice) {
                continue;
            }
            let field_id = terminal_field_id(doc, widget.id);
            let Ok(field) = doc.get_dictionary(field_id) else {
                continue;
            };
            let value = get_text(doc, field, b"V").or_else(|| get_name(doc, field, b"V"));
            if let Some(value) = value {
                values.insert(widget.field_name, value);
            }
        }
        values
    }
}

/// Synthesize a label from the words intersecting the caption region of a
/// widget: a band above the widget reaching left by 1.5 widget widths.
///
/// `runs` must already be in reading order.
pub fn caption_label(runs: &[TextRun], widget_rect: &Rect) -> String {
    let region = widget_rect.caption_region(CAPTION_WIDTH_FACTOR, CAPTION_MARGIN);
    runs.iter()
        .filter(|run| run.bbox.intersects(&region))
        .take(CAPTION_MAX_WORDS)
        .map(|run| run.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string()
}

/// Extract the text form fields of a PDF.
///
/// # Examples
///
/// ```no_run
/// use taxform_oxide::extractors::extract_form_fields;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let pdf = std::fs::read("f1040.pdf")?;
/// for field in extract_form_fields(&pdf)? {
///     println!("{} => {}", field.field_name, field.label);
/// }
/// # Ok(())
/// # }
/// ```
pub fn extract_form_fields(pdf: &[u8]) -> Result<Vec<FormField>> {
    let doc = load_document(pdf)?;
    Ok(FormExtractor::extract_fields(&doc))
}

/// Read the current value of every text field of a PDF.
pub fn read_field_values(pdf: &[u8]) -> Result<IndexMap<String, String>> {
    let doc = load_document(pdf)?;
    Ok(FormExtractor::read_values(&doc))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(text: &str, x0: f32, y0: f32, x1: f32, y1: f32) -> TextRun {
        TextRun {
            text: text.to_string(),
            bbox: Rect::from_corners(x0, y0, x1, y1),
        }
    }

    #[test]
    fn test_caption_label_takes_words_above() {
        // Widget 100 wide at y 600..612; region is x -100..150, y 612..642.
        let widget = Rect::from_corners(50.0, 600.0, 150.0, 612.0);
        let runs = vec![
            run("Your", 10.0, 615.0, 30.0, 625.0),
            run("first", 32.0, 615.0, 50.0, 625.0),
            run("name", 52.0, 615.0, 75.0, 625.0),
            run("far", 400.0, 615.0, 420.0, 625.0),
            run("below", 60.0, 580.0, 90.0, 590.0),
        ];
        assert_eq!(caption_label(&runs, &widget), "Your first name");
    }

    #[test]
    fn test_caption_label_limits_words() {
        let widget = Rect::from_corners(100.0, 600.0, 200.0, 612.0);
        let runs: Vec<TextRun> = (0..10)
            .map(|i| {
                let x = 60.0 + i as f32 * 12.0;
                run(&format!("w{}", i), x, 615.0, x + 10.0, 625.0)
            })
            .collect();
        assert_eq!(caption_label(&runs, &widget), "w0 w1 w2 w3 w4 w5 w6");
    }

    #[test]
    fn test_caption_label_edge_contact_excluded() {
        let widget = Rect::from_corners(100.0, 600.0, 200.0, 612.0);
        // Touches the region's top edge only.
        let runs = vec![run("Header", 100.0, 642.0, 150.0, 652.0)];
        assert_eq!(caption_label(&runs, &widget), "");
    }
}
