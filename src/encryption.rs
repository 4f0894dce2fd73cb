//! Standard security handler support for encrypted forms.
//!
//! Blank government forms are sometimes shipped with an `/Encrypt`
//! dictionary that restricts permissions but has an empty user password.
//! Such documents are opened with the empty password, decrypted in memory,
//! edited, and encrypted again with the same key before saving, so the
//! output keeps the input's encryption and permission state.
//!
//! Key derivation is lopdf's (Algorithm 2, RC4 with V 1-2, R 2-3). The
//! per-object transform is applied here to every string and stream in the
//! object graph, including strings nested in dictionaries and arrays.
//!
//! PDF Spec: ISO 32000-1:2008, Section 7.6 - Encryption.

use crate::error::{Error, Result};
use lopdf::encryption::{decrypt_object, get_encryption_key};
use lopdf::{Document, Object, ObjectId, StringFormat};

/// Encryption state of an opened document.
///
/// RC4 is symmetric, so the same per-object keystream both decrypts the
/// loaded objects and re-encrypts them on save.
#[derive(Debug, Clone)]
pub struct EncryptionHandler {
    /// File encryption key derived from the password
    encryption_key: Vec<u8>,
    /// Object holding the `/Encrypt` dictionary
    encrypt_id: ObjectId,
    /// Whether metadata streams are encrypted (`/EncryptMetadata`)
    encrypt_metadata: bool,
}

impl EncryptionHandler {
    /// Authenticate `password` against the document's `/Encrypt` dictionary.
    ///
    /// Returns `Ok(None)` for unencrypted documents and [`Error::Encrypted`]
    /// when the password is wrong or the security handler is unsupported.
    pub fn open(doc: &Document, password: &[u8]) -> Result<Option<Self>> {
        let encrypt_id = match doc.trailer.get(b"Encrypt") {
            Ok(Object::Reference(id)) => *id,
            Ok(_) => {
                log::warn!("/Encrypt is not an indirect reference");
                return Err(Error::Encrypted);
            },
            Err(_) => return Ok(None),
        };

        let encrypt_metadata = doc
            .get_dictionary(encrypt_id)
            .ok()
            .and_then(|dict| dict.get(b"EncryptMetadata").ok())
            .and_then(|obj| obj.as_bool().ok())
            .unwrap_or(true);

        let encryption_key = get_encryption_key(doc, password, true).map_err(|e| {
            log::warn!("Cannot open encrypted document: {}", e);
            Error::Encrypted
        })?;

        Ok(Some(Self {
            encryption_key,
            encrypt_id,
            encrypt_metadata,
        }))
    }

    /// The file encryption key.
    pub fn encryption_key(&self) -> &[u8] {
        &self.encryption_key
    }

    /// Whether metadata streams are encrypted.
    pub fn encrypt_metadata(&self) -> bool {
        self.encrypt_metadata
    }

    /// Decrypt every string and stream in place and detach `/Encrypt` from
    /// the trailer.
    pub fn decrypt_document(&self, doc: &mut Document) {
        self.transform_objects(doc, false);
        doc.trailer.remove(b"Encrypt");
    }

    /// Encrypt every string and stream in place and attach `/Encrypt` to the
    /// trailer.
    ///
    /// Streams must already carry their final filters: encryption is applied
    /// to the encoded bytes.
    pub fn encrypt_document(&self, doc: &mut Document) {
        self.transform_objects(doc, true);
        doc.trailer.set("Encrypt", self.encrypt_id);
    }

    fn transform_objects(&self, doc: &mut Document, encrypting: bool) {
        for (&id, object) in doc.objects.iter_mut() {
            if id == self.encrypt_id || self.is_exempt(object) {
                continue;
            }
            self.transform(id, object, encrypting);
        }
    }

    /// Cross-reference streams are never encrypted; metadata streams only
    /// when `/EncryptMetadata` is true.
    fn is_exempt(&self, object: &Object) -> bool {
        let Object::Stream(stream) = object else {
            return false;
        };
        match stream.dict.get(b"Type").and_then(Object::as_name) {
            Ok(b"XRef") => true,
            Ok(b"Metadata") => !self.encrypt_metadata,
            _ => false,
        }
    }

    fn transform(&self, id: ObjectId, object: &mut Object, encrypting: bool) {
        match object {
            Object::String(bytes, format) => {
                *bytes = self.crypt(id, bytes);
                // Ciphertext is binary; hex keeps it intact through any
                // literal-string escaping.
                if encrypting {
                    *format = StringFormat::Hexadecimal;
                }
            },
            Object::Array(items) => {
                for item in items.iter_mut() {
                    self.transform(id, item, encrypting);
                }
            },
            Object::Dictionary(dict) => {
                for (_, value) in dict.iter_mut() {
                    self.transform(id, value, encrypting);
                }
            },
            Object::Stream(stream) => {
                for (_, value) in stream.dict.iter_mut() {
                    self.transform(id, value, encrypting);
                }
                let content = self.crypt(id, &stream.content);
                stream.set_content(content);
            },
            _ => {},
        }
    }

    fn crypt(&self, id: ObjectId, data: &[u8]) -> Vec<u8> {
        let wrapped = Object::String(data.to_vec(), StringFormat::Literal);
        match decrypt_object(&self.encryption_key, id, &wrapped) {
            Ok(out) => out,
            Err(e) => {
                log::warn!("Object {:?} left as is: {}", id, e);
                data.to_vec()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{dictionary, Stream};

    fn encrypted_doc() -> (Document, ObjectId, ObjectId) {
        let mut doc = Document::with_version("1.4");
        let encrypt_id = doc.add_object(dictionary! {
            "Filter" => "Standard",
            "V" => 1,
            "R" => 2,
            "Length" => 40,
            "O" => Object::String(vec![0x42; 32], StringFormat::Hexadecimal),
            "P" => -1028,
        });
        doc.trailer.set("Encrypt", encrypt_id);
        doc.trailer.set(
            "ID",
            vec![
                Object::String(b"0123456789abcdef".to_vec(), StringFormat::Hexadecimal),
                Object::String(b"0123456789abcdef".to_vec(), StringFormat::Hexadecimal),
            ],
        );
        let field_id = doc.add_object(dictionary! {
            "T" => Object::string_literal("f1_01"),
            "Kids" => vec![Object::string_literal("nested")],
        });
        let stream_id = doc.add_object(Stream::new(dictionary! {}, b"BT (Wages) Tj ET".to_vec()));
        (doc, field_id, stream_id)
    }

    #[test]
    fn test_unencrypted_document_has_no_handler() {
        let doc = Document::with_version("1.7");
        assert!(EncryptionHandler::open(&doc, b"").unwrap().is_none());
    }

    #[test]
    fn test_direct_encrypt_dictionary_rejected() {
        let mut doc = Document::with_version("1.7");
        doc.trailer.set("Encrypt", dictionary! { "Filter" => "Standard" });
        assert!(matches!(EncryptionHandler::open(&doc, b""), Err(Error::Encrypted)));
    }

    #[test]
    fn test_encrypt_then_decrypt_restores_nested_strings() {
        let (mut doc, field_id, stream_id) = encrypted_doc();
        let handler = EncryptionHandler::open(&doc, b"").unwrap().unwrap();
        assert!(handler.encrypt_metadata());
        assert_eq!(handler.encryption_key().len(), 5);

        handler.encrypt_document(&mut doc);
        let field = doc.get_dictionary(field_id).unwrap();
        assert_ne!(field.get(b"T").unwrap().as_str().unwrap(), b"f1_01");
        assert!(matches!(field.get(b"T").unwrap(), Object::String(_, StringFormat::Hexadecimal)));
        let stream = doc.get_object(stream_id).unwrap().as_stream().unwrap();
        assert_ne!(stream.content, b"BT (Wages) Tj ET");
        assert!(doc.trailer.has(b"Encrypt"));

        handler.decrypt_document(&mut doc);
        let field = doc.get_dictionary(field_id).unwrap();
        assert_eq!(field.get(b"T").unwrap().as_str().unwrap(), b"f1_01");
        let kids = field.get(b"Kids").unwrap().as_array().unwrap();
        assert_eq!(kids[0].as_str().unwrap(), b"nested");
        let stream = doc.get_object(stream_id).unwrap().as_stream().unwrap();
        assert_eq!(stream.content, b"BT (Wages) Tj ET");
        assert!(!doc.trailer.has(b"Encrypt"));
    }

    #[test]
    fn test_encrypt_dictionary_left_alone() {
        let (mut doc, _, _) = encrypted_doc();
        let encrypt_id = doc.trailer.get(b"Encrypt").unwrap().as_reference().unwrap();
        let handler = EncryptionHandler::open(&doc, b"").unwrap().unwrap();
        handler.encrypt_document(&mut doc);
        let owner = doc.get_dictionary(encrypt_id).unwrap().get(b"O").unwrap();
        assert_eq!(owner.as_str().unwrap(), vec![0x42; 32].as_slice());
    }
}
