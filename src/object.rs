//! Helpers over the lopdf object model.
//!
//! Form dictionaries mix direct and indirect objects freely and inherit
//! attributes from their `/Parent` chain, so every accessor here resolves
//! references and tolerates missing or mistyped entries by returning `None`.

use crate::fonts::decode_text_string;
use crate::geometry::Rect;
use lopdf::{Dictionary, Document, Object, ObjectId};

/// Longest `/Parent` chain followed before giving up (guards against cycles).
pub const MAX_PARENT_DEPTH: usize = 32;

/// Resolve an indirect reference; direct objects are returned unchanged.
pub fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Option<&'a Object> {
    match obj {
        Object::Reference(id) => doc.get_object(*id).ok(),
        other => Some(other),
    }
}

/// Look up `key` in `dict` and resolve it.
pub fn get<'a>(doc: &'a Document, dict: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
    dict.get(key).ok().and_then(|obj| resolve(doc, obj))
}

/// Look up `key` and return it as a dictionary (stream dictionaries included).
pub fn get_dict<'a>(doc: &'a Document, dict: &'a Dictionary, key: &[u8]) -> Option<&'a Dictionary> {
    match get(doc, dict, key)? {
        Object::Dictionary(d) => Some(d),
        Object::Stream(s) => Some(&s.dict),
        _ => None,
    }
}

/// Look up `key` and return it as an array.
pub fn get_array<'a>(doc: &'a Document, dict: &'a Dictionary, key: &[u8]) -> Option<&'a Vec<Object>> {
    match get(doc, dict, key)? {
        Object::Array(items) => Some(items),
        _ => None,
    }
}

/// Look up `key` and return it as a name.
pub fn get_name(doc: &Document, dict: &Dictionary, key: &[u8]) -> Option<String> {
    match get(doc, dict, key)? {
        Object::Name(name) => Some(String::from_utf8_lossy(name).into_owned()),
        _ => None,
    }
}

/// Look up `key` and decode it as a PDF text string.
pub fn get_text(doc: &Document, dict: &Dictionary, key: &[u8]) -> Option<String> {
    match get(doc, dict, key)? {
        Object::String(bytes, _) => Some(decode_text_string(bytes)),
        _ => None,
    }
}

/// Look up `key` and return it as an integer.
pub fn get_int(doc: &Document, dict: &Dictionary, key: &[u8]) -> Option<i64> {
    match get(doc, dict, key)? {
        Object::Integer(i) => Some(*i),
        Object::Real(r) => Some(*r as i64),
        _ => None,
    }
}

/// Numeric value of an object (integers and reals).
pub fn as_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Read a `[x0 y0 x1 y1]` rectangle entry.
pub fn get_rect(doc: &Document, dict: &Dictionary, key: &[u8]) -> Option<Rect> {
    let items = get_array(doc, dict, key)?;
    if items.len() != 4 {
        return None;
    }
    let mut coords = [0.0f32; 4];
    for (slot, item) in coords.iter_mut().zip(items) {
        *slot = as_number(resolve(doc, item)?)?;
    }
    Some(Rect::from_corners(coords[0], coords[1], coords[2], coords[3]))
}

/// The `/Parent` of a field dictionary, when it is an indirect reference.
pub fn parent_id(dict: &Dictionary) -> Option<ObjectId> {
    match dict.get(b"Parent").ok()? {
        Object::Reference(id) => Some(*id),
        _ => None,
    }
}

/// Find an attribute on a field dictionary or the nearest ancestor that
/// defines it (inheritable field attributes, ISO 32000-1:2008, 12.7.3.1).
pub fn inherited<'a>(doc: &'a Document, dict: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
    let mut current = dict;
    for _ in 0..MAX_PARENT_DEPTH {
        if let Some(value) = get(doc, current, key) {
            return Some(value);
        }
        let parent = parent_id(current)?;
        current = doc.get_dictionary(parent).ok()?;
    }
    None
}

/// Fully qualified field name: the partial `/T` names of the field and its
/// ancestors joined with `.`.
///
/// Widgets without their own `/T` take their parent field's name.
pub fn qualified_field_name(doc: &Document, dict: &Dictionary) -> String {
    let mut parts = Vec::new();
    let mut current = dict;
    for _ in 0..MAX_PARENT_DEPTH {
        if let Some(partial) = get_text(doc, current, b"T") {
            if !partial.is_empty() {
                parts.push(partial);
            }
        }
        match parent_id(current).and_then(|id| doc.get_dictionary(id).ok()) {
            Some(parent) => current = parent,
            None => break,
        }
    }
    parts.reverse();
    parts.join(".")
}

/// Object ID of the terminal field that owns a widget: the widget itself if
/// it carries `/T`, otherwise the nearest ancestor that does.
pub fn terminal_field_id(doc: &Document, widget_id: ObjectId) -> ObjectId {
    let mut current = widget_id;
    for _ in 0..MAX_PARENT_DEPTH {
        let Ok(dict) = doc.get_dictionary(current) else {
            break;
        };
        if dict.has(b"T") {
            return current;
        }
        match parent_id(dict) {
            Some(parent) => current = parent,
            None => break,
        }
    }
    widget_id
}

/// Inherited page attribute (`/Resources`, `/MediaBox`, ...), following the
/// page tree upwards.
pub fn page_attribute<'a>(doc: &'a Document, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
    let dict = doc.get_dictionary(page_id).ok()?;
    inherited(doc, dict, key)
}
