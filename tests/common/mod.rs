//! Fixture PDFs built with lopdf.

#![allow(dead_code)]

use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};
use taxform_oxide::encryption::EncryptionHandler;

/// Page text of the sample form.
pub const SAMPLE_CONTENT: &[u8] = b"BT /F1 8 Tf 400 770 Td (OMB No. 1545-0074) Tj ET \
BT /F1 10 Tf 72 716 Td (Your first name) Tj ET \
BT /F1 10 Tf 300 716 Td (Last name) Tj ET \
BT /F1 10 Tf 72 500 Td (Wages, salaries, tips) Tj ET";

/// Field names of the sample form, in `/Annots` order, for every text widget.
pub const SAMPLE_TEXT_FIELDS: [&str; 7] = [
    "f1_01",
    "f1_02",
    "f1_03",
    "f1_04",
    "Page1[0].f1_05[0]",
    "ssn",
    "Address_ReadOrder",
];

fn rect(x0: i64, y0: i64, x1: i64, y1: i64) -> Object {
    vec![x0.into(), y0.into(), x1.into(), y1.into()].into()
}

fn appearance(doc: &mut Document, content: &[u8]) -> ObjectId {
    doc.add_object(Stream::new(
        dictionary! { "Type" => "XObject", "Subtype" => "Form", "BBox" => rect(0, 0, 12, 12) },
        content.to_vec(),
    ))
}

/// Build a one-page form with text fields (plain, `/TU`-labelled, unlabelled,
/// boilerplate, hierarchical, kid widget without `/T`, layout-only), a
/// check box, a push button, an `/XFA` entry and Helvetica in `/DR`.
pub fn sample_form_document() -> Document {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let content_id = doc.add_object(Stream::new(dictionary! {}, SAMPLE_CONTENT.to_vec()));
    let page_id = doc.new_object_id();

    let text_widget = |name: &str, label: Option<&str>, r: Object| {
        let mut dict = dictionary! {
            "Type" => "Annot",
            "Subtype" => "Widget",
            "FT" => "Tx",
            "T" => Object::string_literal(name),
            "Rect" => r,
            "P" => page_id,
            "DA" => Object::string_literal("/Helv 0 Tf 0 0 1 rg"),
        };
        if let Some(label) = label {
            dict.set("TU", Object::string_literal(label));
        }
        dict
    };

    let first = doc.add_object(text_widget("f1_01", None, rect(72, 700, 200, 712)));
    let last = doc.add_object(text_widget("f1_02", Some("Last name"), rect(300, 700, 450, 712)));
    let blank = doc.add_object(text_widget("f1_03", None, rect(72, 100, 200, 112)));
    let omb = doc.add_object(text_widget("f1_04", Some("OMB No. 1545-0074"), rect(400, 750, 550, 762)));
    let layout = doc.add_object(text_widget("Address_ReadOrder", Some("Address"), rect(72, 300, 200, 312)));

    // Page1[0] -> f1_05[0]
    let subform_id = doc.new_object_id();
    let mut address = text_widget("f1_05[0]", Some("Home address (number and street)"), rect(72, 650, 300, 662));
    address.set("Parent", subform_id);
    let address_id = doc.add_object(address);
    doc.objects.insert(
        subform_id,
        Object::Dictionary(dictionary! {
            "T" => Object::string_literal("Page1[0]"),
            "Kids" => vec![address_id.into()],
        }),
    );

    // Terminal field "ssn" with a separate widget that has no /T
    let ssn_field_id = doc.new_object_id();
    let ssn_widget_id = doc.add_object(dictionary! {
        "Type" => "Annot",
        "Subtype" => "Widget",
        "Rect" => rect(300, 650, 450, 662),
        "P" => page_id,
        "Parent" => ssn_field_id,
    });
    doc.objects.insert(
        ssn_field_id,
        Object::Dictionary(dictionary! {
            "FT" => "Tx",
            "T" => Object::string_literal("ssn"),
            "TU" => Object::string_literal("Social security number"),
            "MaxLen" => 11,
            "Kids" => vec![ssn_widget_id.into()],
        }),
    );

    let on = appearance(&mut doc, b"q 0 g BT /ZaDb 10 Tf 2 2 Td (4) Tj ET Q");
    let off = appearance(&mut doc, b"");
    let checkbox = doc.add_object(dictionary! {
        "Type" => "Annot",
        "Subtype" => "Widget",
        "FT" => "Btn",
        "T" => Object::string_literal("c1_1"),
        "TU" => Object::string_literal("Married filing jointly"),
        "Rect" => rect(72, 600, 84, 612),
        "P" => page_id,
        "V" => "Off",
        "AS" => "Off",
        "AP" => dictionary! { "N" => dictionary! { "1" => on, "Off" => off } },
    });
    let button = doc.add_object(dictionary! {
        "Type" => "Annot",
        "Subtype" => "Widget",
        "FT" => "Btn",
        "Ff" => 1 << 16,
        "T" => Object::string_literal("print"),
        "Rect" => rect(500, 50, 560, 70),
        "P" => page_id,
    });

    let annots: Vec<Object> = vec![
        first.into(),
        last.into(),
        blank.into(),
        omb.into(),
        address_id.into(),
        ssn_widget_id.into(),
        layout.into(),
        checkbox.into(),
        button.into(),
    ];
    doc.objects.insert(
        page_id,
        Object::Dictionary(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => rect(0, 0, 612, 792),
            "Contents" => content_id,
            "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
            "Annots" => annots,
        }),
    );
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );

    let helv_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let acroform_id = doc.add_object(dictionary! {
        "Fields" => vec![
            first.into(),
            last.into(),
            blank.into(),
            omb.into(),
            subform_id.into(),
            ssn_field_id.into(),
            layout.into(),
            checkbox.into(),
            button.into(),
        ],
        "DR" => dictionary! { "Font" => dictionary! { "Helv" => helv_id } },
        "DA" => Object::string_literal("/Helv 0 Tf 0 g"),
        "XFA" => Object::string_literal("<xdp:xdp/>"),
    });
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
        "AcroForm" => acroform_id,
    });
    doc.trailer.set("Root", catalog_id);
    doc
}

/// The sample form serialized to bytes.
pub fn sample_form() -> Vec<u8> {
    save(&mut sample_form_document())
}

/// A one-page document with text but no interactive form.
pub fn plain_document(content: &[u8]) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.to_vec()));
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => rect(0, 0, 612, 792),
        "Contents" => content_id,
        "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
    });
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! { "Type" => "Catalog", "Pages" => pages_id });
    doc.trailer.set("Root", catalog_id);
    save(&mut doc)
}

/// Serialize a document.
pub fn save(doc: &mut Document) -> Vec<u8> {
    let mut out = Vec::new();
    doc.save_to(&mut out).unwrap();
    out
}

/// Dictionary of the widget named `field_name` in `pdf`.
pub fn widget_dict(doc: &Document, field_name: &str) -> lopdf::Dictionary {
    let widget = taxform_oxide::extractors::collect_widgets(doc)
        .into_iter()
        .find(|w| w.field_name == field_name)
        .unwrap_or_else(|| panic!("no widget named {}", field_name));
    doc.get_dictionary(widget.id).unwrap().clone()
}

/// Set `key` on the widget named `field_name`.
pub fn set_widget_entry(doc: &mut Document, field_name: &str, key: &str, value: Object) {
    let id = widget_id(doc, field_name);
    doc.get_dictionary_mut(id).unwrap().set(key, value);
}

/// Remove `key` from the widget named `field_name`.
pub fn remove_widget_entry(doc: &mut Document, field_name: &str, key: &[u8]) {
    let id = widget_id(doc, field_name);
    doc.get_dictionary_mut(id).unwrap().remove(key);
}

fn widget_id(doc: &Document, field_name: &str) -> ObjectId {
    taxform_oxide::extractors::collect_widgets(doc)
        .into_iter()
        .find(|w| w.field_name == field_name)
        .unwrap_or_else(|| panic!("no widget named {}", field_name))
        .id
}

/// A page whose only caption is painted by a Form XObject, above a text
/// widget named `spouse` that has no `/TU`.
pub fn xobject_caption_form() -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let caption_id = doc.add_object(Stream::new(
        dictionary! {
            "Type" => "XObject",
            "Subtype" => "Form",
            "BBox" => rect(0, 0, 200, 20),
            "Resources" => dictionary! { "Font" => dictionary! { "F1" => font_id } },
        },
        b"BT /F1 10 Tf 0 0 Td (Spouse first name) Tj ET".to_vec(),
    ));
    let content_id = doc.add_object(Stream::new(dictionary! {}, b"q 1 0 0 1 72 716 cm /Cap Do Q".to_vec()));
    let page_id = doc.new_object_id();
    let widget_id = doc.add_object(dictionary! {
        "Type" => "Annot",
        "Subtype" => "Widget",
        "FT" => "Tx",
        "T" => Object::string_literal("spouse"),
        "Rect" => rect(72, 700, 200, 712),
        "P" => page_id,
    });
    doc.objects.insert(
        page_id,
        Object::Dictionary(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => rect(0, 0, 612, 792),
            "Contents" => content_id,
            "Resources" => dictionary! { "XObject" => dictionary! { "Cap" => caption_id } },
            "Annots" => vec![widget_id.into()],
        }),
    );
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );
    let acroform_id = doc.add_object(dictionary! { "Fields" => vec![widget_id.into()] });
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
        "AcroForm" => acroform_id,
    });
    doc.trailer.set("Root", catalog_id);
    save(&mut doc)
}

/// Password padding string (ISO 32000-1:2008, Algorithm 2 step a).
const PASSWORD_PAD: [u8; 32] = [
    0x28, 0xBF, 0x4E, 0x5E, 0x4E, 0x75, 0x8A, 0x41, 0x64, 0x00, 0x4E, 0x56, 0xFF, 0xFA, 0x01, 0x08, 0x2E, 0x2E, 0x00,
    0xB6, 0xD0, 0x68, 0x3E, 0x80, 0x2F, 0x0C, 0xA9, 0xFE, 0x64, 0x53, 0x69, 0x7A,
];

fn rc4(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut s: Vec<u8> = (0..=255).collect();
    let mut j: u8 = 0;
    for i in 0..256 {
        j = j.wrapping_add(s[i]).wrapping_add(key[i % key.len()]);
        s.swap(i, j as usize);
    }
    let (mut i, mut j) = (0u8, 0u8);
    data.iter()
        .map(|byte| {
            i = i.wrapping_add(1);
            j = j.wrapping_add(s[i as usize]);
            s.swap(i as usize, j as usize);
            byte ^ s[s[i as usize].wrapping_add(s[j as usize]) as usize]
        })
        .collect()
}

/// Encrypt `doc` in place with 40-bit RC4 (V 1, R 2) and an empty user
/// password. The owner entry is arbitrary: only the user password is ever
/// authenticated.
pub fn encrypt_with_empty_password(doc: &mut Document) {
    let file_id = Object::String(b"taxform-fixture!".to_vec(), StringFormat::Hexadecimal);
    doc.trailer.set("ID", vec![file_id.clone(), file_id]);
    let encrypt_id = doc.add_object(dictionary! {
        "Filter" => "Standard",
        "V" => 1,
        "R" => 2,
        "Length" => 40,
        "O" => Object::String(vec![0x5A; 32], StringFormat::Hexadecimal),
        "P" => -1028,
    });
    doc.trailer.set("Encrypt", encrypt_id);

    // Algorithm 4: /U is the padding string encrypted with the file key.
    let key = lopdf::encryption::get_encryption_key(doc, "", false).unwrap();
    doc.get_dictionary_mut(encrypt_id)
        .unwrap()
        .set("U", Object::String(rc4(&key, &PASSWORD_PAD), StringFormat::Hexadecimal));

    let handler = EncryptionHandler::open(doc, b"").unwrap().unwrap();
    handler.encrypt_document(doc);
}

/// Byte-string search.
pub fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|window| window == needle)
}
