//! Widget annotation enumeration shared by field extraction and filling.
//!
//! Interactive form fields are reached through the `/Annots` array of each
//! page rather than the AcroForm `/Fields` tree: every widget is seen exactly
//! once, in page order, together with the page it sits on.
//! See ISO 32000-1:2008, Section 12.5.6.19 (widget annotations) and 12.7.3
//! (field dictionaries).

use crate::encryption::EncryptionHandler;
use crate::error::Result;
use crate::geometry::Rect;
use crate::object::{get_name, get_rect, inherited, qualified_field_name, resolve};
use bitflags::bitflags;
use lopdf::{Document, Object, ObjectId};

bitflags! {
    /// Field flags (`/Ff`) relevant to extraction and appearance generation.
    ///
    /// Per PDF spec Tables 221, 226 and 228.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct FieldFlags: u32 {
        /// Bit 1: Field is read-only
        const READ_ONLY = 1 << 0;
        /// Bit 2: Field is required
        const REQUIRED = 1 << 1;
        /// Bit 13: Text may span multiple lines
        const MULTILINE = 1 << 12;
        /// Bit 14: Password field
        const PASSWORD = 1 << 13;
        /// Bit 15: Radio buttons cannot all be off
        const NO_TOGGLE_TO_OFF = 1 << 14;
        /// Bit 16: Button is a radio button
        const RADIO = 1 << 15;
        /// Bit 17: Button is a push button
        const PUSHBUTTON = 1 << 16;
        /// Bit 21: Text field selects a file
        const FILE_SELECT = 1 << 20;
        /// Bit 25: Text is spread across `/MaxLen` equal cells
        const COMB = 1 << 24;
    }
}

/// Field type from the (inherited) `/FT` key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    /// Button field (/Btn): check box, radio button or push button
    Button,
    /// Text field (/Tx)
    Text,
    /// Choice field (/Ch): list box or combo box
    Choice,
    /// Signature field (/Sig)
    Signature,
    /// Missing or unrecognized field type
    Unknown(String),
}

impl FieldType {
    /// Parse a field type from its PDF name.
    pub fn from_pdf_name(name: &str) -> Self {
        match name {
            "Btn" => FieldType::Button,
            "Tx" => FieldType::Text,
            "Ch" => FieldType::Choice,
            "Sig" => FieldType::Signature,
            other => FieldType::Unknown(other.to_string()),
        }
    }
}

/// One widget annotation on a page.
#[derive(Debug, Clone)]
pub struct Widget {
    /// Object ID of the widget annotation
    pub id: ObjectId,
    /// 1-based page number
    pub page_number: u32,
    /// Object ID of the page the widget sits on
    pub page_id: ObjectId,
    /// Fully qualified field identifier
    pub field_name: String,
    /// Inherited field type
    pub field_type: FieldType,
    /// Inherited field flags
    pub flags: FieldFlags,
    /// Widget rectangle, when present and well formed
    pub rect: Option<Rect>,
}

impl Widget {
    /// True for text-type widgets (the only kind the extractor reports).
    pub fn is_text(&self) -> bool {
        self.field_type == FieldType::Text
    }

    /// True for check boxes and radio buttons.
    pub fn is_toggle(&self) -> bool {
        self.field_type == FieldType::Button && !self.flags.contains(FieldFlags::PUSHBUTTON)
    }
}

/// Parse PDF bytes into a decrypted document.
///
/// Encrypted files are opened with the empty user password; see
/// [`open_document`] for keeping the key to encrypt the result again.
pub fn load_document(pdf: &[u8]) -> Result<Document> {
    open_document(pdf).map(|(doc, _)| doc)
}

/// Parse PDF bytes, decrypting in memory when the file is encrypted with an
/// empty user password.
///
/// Returns the handler that re-encrypts the document before saving, or
/// [`Error::Encrypted`](crate::error::Error::Encrypted) when a user password
/// is required.
pub fn open_document(pdf: &[u8]) -> Result<(Document, Option<EncryptionHandler>)> {
    let mut doc = Document::load_mem(pdf)?;
    let handler = EncryptionHandler::open(&doc, b"")?;
    if let Some(handler) = &handler {
        log::debug!("Decrypting document opened with the empty user password");
        handler.decrypt_document(&mut doc);
    }
    Ok((doc, handler))
}

/// Enumerate all widget annotations, page by page in `/Annots` order.
///
/// Annotation entries that are not widget dictionaries are skipped.
pub fn collect_widgets(doc: &Document) -> Vec<Widget> {
    let mut widgets = Vec::new();

    for (page_number, page_id) in doc.get_pages() {
        let Ok(page) = doc.get_dictionary(page_id) else {
            continue;
        };
        let annots = match page.get(b"Annots").ok().and_then(|obj| resolve(doc, obj)) {
            Some(Object::Array(items)) => items,
            _ => continue,
        };

        for annot in annots {
            let Object::Reference(id) = annot else {
                log::debug!("Page {}: skipping direct annotation object", page_number);
                continue;
            };
            let Ok(dict) = doc.get_dictionary(*id) else {
                log::debug!("Page {}: annotation {:?} is not a dictionary", page_number, id);
                continue;
            };
            if get_name(doc, dict, b"Subtype").as_deref() != Some("Widget") {
                continue;
            }

            let field_type = match inherited(doc, dict, b"FT") {
                Some(Object::Name(name)) => FieldType::from_pdf_name(&String::from_utf8_lossy(name)),
                _ => FieldType::Unknown(String::new()),
            };
            let flags = match inherited(doc, dict, b"Ff") {
                Some(Object::Integer(bits)) => FieldFlags::from_bits_truncate(*bits as u32),
                _ => FieldFlags::empty(),
            };

            widgets.push(Widget {
                id: *id,
                page_number,
                page_id,
                field_name: qualified_field_name(doc, dict),
                field_type,
                flags,
                rect: get_rect(doc, dict, b"Rect"),
            });
        }
    }

    widgets
}

/// `/MaxLen` of a text widget (inheritable).
pub fn max_len(doc: &Document, widget_id: ObjectId) -> Option<usize> {
    let dict = doc.get_dictionary(widget_id).ok()?;
    match inherited(doc, dict, b"MaxLen") {
        Some(Object::Integer(n)) if *n > 0 => Some(*n as usize),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_field_type_names() {
        assert_eq!(FieldType::from_pdf_name("Tx"), FieldType::Text);
        assert_eq!(FieldType::from_pdf_name("Btn"), FieldType::Button);
        assert_eq!(FieldType::from_pdf_name("Ch"), FieldType::Choice);
        assert_eq!(FieldType::from_pdf_name("Sig"), FieldType::Signature);
        assert_eq!(FieldType::from_pdf_name("XX"), FieldType::Unknown("XX".to_string()));
    }

    #[test]
    fn test_flags_from_bits() {
        let flags = FieldFlags::from_bits_truncate((1 << 12) | (1 << 24) | (1 << 30));
        assert!(flags.contains(FieldFlags::MULTILINE));
        assert!(flags.contains(FieldFlags::COMB));
        assert!(!flags.contains(FieldFlags::READ_ONLY));
    }

    #[test]
    fn test_load_garbage_fails() {
        let err = load_document(b"definitely not a pdf").unwrap_err();
        assert!(matches!(err, Error::Pdf(_)));
    }
}
