//! Encrypted forms: open with the empty user password, fill, keep encryption.

mod common;

use indexmap::IndexMap;
use lopdf::{Document, Object, StringFormat};
use taxform_oxide::extractors::{extract_form_fields, extract_text, read_field_values};
use taxform_oxide::writer::{FillOptions, FormFiller};
use taxform_oxide::Error;

fn encrypted_sample() -> Vec<u8> {
    let mut doc = common::sample_form_document();
    common::encrypt_with_empty_password(&mut doc);
    common::save(&mut doc)
}

#[test]
fn test_encrypted_form_hides_plaintext() {
    let pdf = encrypted_sample();
    assert!(!common::contains(&pdf, b"Your first name"));
    assert!(!common::contains(&pdf, b"Social security number"));
    assert!(Document::load_mem(&pdf).unwrap().is_encrypted());
}

#[test]
fn test_encrypted_form_extracts_like_plain() {
    let plain = extract_form_fields(&common::sample_form()).unwrap();
    let encrypted = extract_form_fields(&encrypted_sample()).unwrap();
    assert_eq!(encrypted, plain);
    assert_eq!(
        extract_text(&encrypted_sample()).unwrap(),
        extract_text(&common::sample_form()).unwrap()
    );
}

#[test]
fn test_rc4_round_trip_keeps_encryption() {
    let pdf = encrypted_sample();
    let original = Document::load_mem(&pdf).unwrap();

    let mut values = IndexMap::new();
    values.insert("f1_01".to_string(), "John".to_string());
    values.insert("ssn".to_string(), "123-45-6789".to_string());
    let filler = FormFiller::with_options(FillOptions::default().with_compress(false));
    let filled = filler.fill(&pdf, &values).unwrap();

    // Neither /V nor the appearance stream is readable without the key.
    assert!(!common::contains(&filled, b"John"));
    assert!(!common::contains(&filled, b"123-45-6789"));

    let doc = Document::load_mem(&filled).unwrap();
    assert!(doc.is_encrypted());
    assert_eq!(doc.trailer.get(b"Encrypt").unwrap(), original.trailer.get(b"Encrypt").unwrap());
    assert_eq!(doc.trailer.get(b"ID").unwrap(), original.trailer.get(b"ID").unwrap());
    assert_eq!(doc.get_encrypted().unwrap().get(b"P").unwrap(), &Object::Integer(-1028));

    assert_eq!(read_field_values(&filled).unwrap(), values);
}

#[test]
fn test_encrypted_fill_with_compression() {
    let mut values = IndexMap::new();
    values.insert("f1_02".to_string(), "Smith".to_string());
    let filled = FormFiller::new().fill(&encrypted_sample(), &values).unwrap();
    assert!(Document::load_mem(&filled).unwrap().is_encrypted());
    assert_eq!(read_field_values(&filled).unwrap()["f1_02"], "Smith");
}

#[test]
fn test_user_password_required_is_refused() {
    let mut doc = common::sample_form_document();
    common::encrypt_with_empty_password(&mut doc);
    let encrypt_id = doc.trailer.get(b"Encrypt").unwrap().as_reference().unwrap();
    doc.get_dictionary_mut(encrypt_id)
        .unwrap()
        .set("U", Object::String(vec![0; 32], StringFormat::Hexadecimal));
    let pdf = common::save(&mut doc);

    assert!(matches!(extract_form_fields(&pdf), Err(Error::Encrypted)));
    assert!(matches!(
        FormFiller::new().fill(&pdf, &IndexMap::new()),
        Err(Error::Encrypted)
    ));
}
