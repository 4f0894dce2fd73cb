//! Writing values into AcroForm widgets.
//!
//! The input bytes are parsed into an independent in-memory document; values
//! are written into that copy and the whole document is serialized to a new
//! buffer. See ISO 32000-1:2008, Section 12.7.3.3 (variable text) and
//! 12.7.4.2.3 (check boxes).

use super::form_appearance::{
    checkbox_off_appearance, checkbox_on_appearance, Alignment, DefaultAppearance,
    FormAppearanceGenerator,
};
use crate::error::Result;
use crate::extractors::widgets::{collect_widgets, max_len, open_document, FieldFlags, FieldType, Widget};
use crate::fonts::encode_text_string;
use crate::fonts::metrics::{DEFAULT_BASE_FONT, DEFAULT_FONT_RESOURCE};
use crate::object::{get, get_dict, get_text, inherited, terminal_field_id};
use indexmap::IndexMap;
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};

/// Values (compared case-insensitively) that switch a check box on.
const TRUTHY_VALUES: [&str; 6] = ["yes", "on", "true", "x", "1", "checked"];

/// Options for [`FormFiller`].
#[derive(Debug, Clone)]
pub struct FillOptions {
    /// Set `/NeedAppearances true` so viewers regenerate appearances
    pub need_appearances: bool,
    /// Remove the `/XFA` entry so viewers render the AcroForm values
    pub remove_xfa: bool,
    /// Flate-compress uncompressed streams before saving
    pub compress: bool,
}

impl Default for FillOptions {
    fn default() -> Self {
        Self {
            need_appearances: true,
            remove_xfa: true,
            compress: true,
        }
    }
}

impl FillOptions {
    /// Set whether `/NeedAppearances` is turned on.
    pub fn with_need_appearances(mut self, enable: bool) -> Self {
        self.need_appearances = enable;
        self
    }

    /// Set whether `/XFA` is removed.
    pub fn with_remove_xfa(mut self, enable: bool) -> Self {
        self.remove_xfa = enable;
        self
    }

    /// Set whether streams are compressed on save.
    pub fn with_compress(mut self, enable: bool) -> Self {
        self.compress = enable;
        self
    }
}

/// Fills form widgets by fully qualified field name.
#[derive(Debug, Clone, Default)]
pub struct FormFiller {
    options: FillOptions,
}

impl FormFiller {
    /// Create a filler with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a filler with the given options.
    pub fn with_options(options: FillOptions) -> Self {
        Self { options }
    }

    /// Fill `values` into a copy of `pdf` and return the new document bytes.
    ///
    /// Keys that match no widget are ignored. An encrypted input is saved
    /// with its original `/Encrypt` dictionary and key. Fails only when `pdf`
    /// cannot be opened or the result cannot be serialized.
    pub fn fill(&self, pdf: &[u8], values: &IndexMap<String, String>) -> Result<Vec<u8>> {
        let (mut doc, encryption) = open_document(pdf)?;
        let updated = self.fill_document(&mut doc, values)?;
        log::info!("Filled {} widgets from {} values", updated, values.len());

        self.update_acroform(&mut doc)?;
        if self.options.compress {
            doc.compress();
        }
        if let Some(handler) = &encryption {
            handler.encrypt_document(&mut doc);
        }

        let mut out = Vec::with_capacity(pdf.len());
        doc.save_to(&mut out)?;
        Ok(out)
    }

    /// Fill widgets of an already loaded document; returns the number of
    /// widgets updated.
    pub fn fill_document(&self, doc: &mut Document, values: &IndexMap<String, String>) -> Result<usize> {
        let mut fonts = FontCache::default();
        let mut updated = 0;

        for widget in collect_widgets(doc) {
            let Some(value) = values.get(&widget.field_name) else {
                continue;
            };
            match widget.field_type {
                FieldType::Text | FieldType::Choice => {
                    fill_text_widget(doc, &widget, value, &mut fonts)?;
                    updated += 1;
                },
                FieldType::Button if widget.is_toggle() => {
                    fill_toggle_widget(doc, &widget, value)?;
                    updated += 1;
                },
                _ => {
                    log::debug!("Leaving {:?} widget '{}' untouched", widget.field_type, widget.field_name);
                },
            }
        }

        Ok(updated)
    }

    fn update_acroform(&self, doc: &mut Document) -> Result<()> {
        if !self.options.need_appearances && !self.options.remove_xfa {
            return Ok(());
        }
        let Ok(catalog) = doc.catalog() else {
            return Ok(());
        };
        let acroform_id = match catalog.get(b"AcroForm") {
            Ok(Object::Reference(id)) => Some(*id),
            Ok(Object::Dictionary(_)) => None,
            _ => return Ok(()),
        };
        let acroform = match acroform_id {
            Some(id) => doc.get_dictionary_mut(id)?,
            None => doc.catalog_mut()?.get_mut(b"AcroForm")?.as_dict_mut()?,
        };

        if self.options.need_appearances {
            acroform.set("NeedAppearances", true);
        }
        if self.options.remove_xfa && acroform.remove(b"XFA").is_some() {
            log::debug!("Removed /XFA from AcroForm");
        }
        Ok(())
    }
}

/// Check-box semantics: is `value` a request to switch the box on?
///
/// ```
/// use taxform_oxide::writer::is_truthy;
///
/// assert!(is_truthy("Yes", "Yes"));
/// assert!(is_truthy("x", "1"));
/// assert!(is_truthy("Married", "Married"));
/// assert!(!is_truthy("No", "Yes"));
/// assert!(!is_truthy("", "Yes"));
/// ```
pub fn is_truthy(value: &str, on_state: &str) -> bool {
    let value = value.trim();
    value.eq_ignore_ascii_case(on_state)
        || TRUTHY_VALUES.iter().any(|truthy| value.eq_ignore_ascii_case(truthy))
}

/// Fill `values` into a copy of `pdf` with default options.
pub fn fill_form(pdf: &[u8], values: &IndexMap<String, String>) -> Result<Vec<u8>> {
    FormFiller::new().fill(pdf, values)
}

/// Font object IDs created while filling one document.
#[derive(Default)]
struct FontCache {
    helvetica: Option<ObjectId>,
}

impl FontCache {
    fn helvetica(&mut self, doc: &mut Document) -> Object {
        let id = *self.helvetica.get_or_insert_with(|| {
            doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => DEFAULT_BASE_FONT,
                "Encoding" => "WinAnsiEncoding",
            })
        });
        Object::Reference(id)
    }
}

fn acroform(doc: &Document) -> Option<&Dictionary> {
    let catalog = doc.catalog().ok()?;
    get_dict(doc, catalog, b"AcroForm")
}

/// Font named `name` in the AcroForm default resources.
fn dr_font(doc: &Document, name: &str) -> Option<Object> {
    let dr = get_dict(doc, acroform(doc)?, b"DR")?;
    let fonts = get_dict(doc, dr, b"Font")?;
    fonts.get(name.as_bytes()).ok().cloned()
}

fn text_object(value: &str) -> Object {
    let encoded = encode_text_string(value);
    if encoded.starts_with(&[0xFE, 0xFF]) {
        Object::String(encoded, StringFormat::Hexadecimal)
    } else {
        Object::String(encoded, StringFormat::Literal)
    }
}

fn fill_text_widget(doc: &mut Document, widget: &Widget, value: &str, fonts: &mut FontCache) -> Result<()> {
    let field_id = terminal_field_id(doc, widget.id);
    doc.get_dictionary_mut(field_id)?.set("V", text_object(value));

    let Some(rect) = widget.rect else {
        return Ok(());
    };

    let widget_dict = doc.get_dictionary(widget.id)?;
    let da_string = match inherited(doc, widget_dict, b"DA") {
        Some(Object::String(bytes, _)) => Some(String::from_utf8_lossy(bytes).into_owned()),
        _ => acroform(doc).and_then(|form| get_text(doc, form, b"DA")),
    }
    .unwrap_or_default();
    let quadding = match inherited(doc, widget_dict, b"Q") {
        Some(Object::Integer(q)) => *q,
        _ => acroform(doc)
            .and_then(|form| get(doc, form, b"Q"))
            .and_then(|q| q.as_i64().ok())
            .unwrap_or(0),
    };

    let mut da = DefaultAppearance::parse(&da_string).unwrap_or(DefaultAppearance {
        font: DEFAULT_FONT_RESOURCE.to_string(),
        size: 0.0,
    });
    let font = match dr_font(doc, &da.font) {
        Some(font) => font,
        None => {
            log::debug!("Font /{} not in /DR; using Helvetica", da.font);
            da.font = DEFAULT_FONT_RESOURCE.to_string();
            fonts.helvetica(doc)
        },
    };

    let comb = if widget.flags.contains(FieldFlags::COMB) {
        max_len(doc, widget.id)
    } else {
        None
    };
    let shown = if widget.flags.contains(FieldFlags::PASSWORD) {
        "*".repeat(value.chars().count())
    } else {
        value.to_string()
    };
    let content = FormAppearanceGenerator::new(da.font.clone(), da.size)
        .with_alignment(Alignment::from_quadding(quadding))
        .with_multiline(widget.flags.contains(FieldFlags::MULTILINE))
        .with_comb(comb)
        .text_field_appearance(&rect, &shown);

    let appearance = Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Form",
            "BBox" => vec![0.into(), 0.into(), rect.width().into(), rect.height().into()],
            "Resources" => dictionary! {
                "Font" => dictionary! { da.font.clone() => font },
            },
        },
        content.into_bytes(),
    );
    let appearance_id = doc.add_object(appearance);

    let widget_dict = doc.get_dictionary_mut(widget.id)?;
    widget_dict.set("DA", Object::string_literal(da.to_black_string()));
    widget_dict.set("AP", dictionary! { "N" => appearance_id });
    log::trace!("Filled '{}' ({} chars)", widget.field_name, value.chars().count());
    Ok(())
}

/// The widget's "on" appearance state: the first `/AP /N` key that is not
/// `Off`.
fn on_state(doc: &Document, widget_id: ObjectId) -> Option<String> {
    let dict = doc.get_dictionary(widget_id).ok()?;
    let normal = get_dict(doc, get_dict(doc, dict, b"AP")?, b"N")?;
    normal
        .iter()
        .map(|(key, _)| String::from_utf8_lossy(key).into_owned())
        .find(|key| key != "Off")
}

fn fill_toggle_widget(doc: &mut Document, widget: &Widget, value: &str) -> Result<()> {
    let existing_on = on_state(doc, widget.id);
    let on = existing_on.clone().unwrap_or_else(|| "Yes".to_string());
    let radio = widget.flags.contains(FieldFlags::RADIO);
    let checked = if radio {
        value.trim() == on
    } else {
        is_truthy(value, &on)
    };
    let state = if checked { on.as_str() } else { "Off" };

    let field_id = terminal_field_id(doc, widget.id);
    if !radio || checked || field_id == widget.id {
        doc.get_dictionary_mut(field_id)?
            .set("V", Object::Name(state.as_bytes().to_vec()));
    }

    if existing_on.is_none() {
        if let Some(rect) = widget.rect {
            let bbox = || vec![0.into(), 0.into(), rect.width().into(), rect.height().into()];
            let on_stream = Stream::new(
                dictionary! { "Type" => "XObject", "Subtype" => "Form", "BBox" => bbox() },
                checkbox_on_appearance(&rect).into_bytes(),
            );
            let off_stream = Stream::new(
                dictionary! { "Type" => "XObject", "Subtype" => "Form", "BBox" => bbox() },
                checkbox_off_appearance().into_bytes(),
            );
            let on_id = doc.add_object(on_stream);
            let off_id = doc.add_object(off_stream);
            doc.get_dictionary_mut(widget.id)?.set(
                "AP",
                dictionary! { "N" => dictionary! { on.clone() => on_id, "Off" => off_id } },
            );
        }
    }

    doc.get_dictionary_mut(widget.id)?
        .set("AS", Object::Name(state.as_bytes().to_vec()));
    log::trace!("Set '{}' to /{}", widget.field_name, state);
    Ok(())
}
