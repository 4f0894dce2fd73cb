//! Font dictionary parsing for text decoding and glyph advances.
//!
//! PDF Spec: ISO 32000-1:2008, Section 9.6 (simple fonts) and 9.7
//! (composite fonts).

use super::cmap::{parse_tounicode_cmap, CMap};
use super::encoding::win_ansi_char;
use crate::object::{as_number, get, get_array, get_dict, get_int, get_name, resolve};
use lopdf::{Dictionary, Document, Object};
use std::collections::HashMap;

/// Font encoding types.
#[derive(Debug, Clone)]
pub enum Encoding {
    /// WinAnsiEncoding, also used for StandardEncoding and unknown bases
    WinAnsi,
    /// WinAnsi base with `/Differences` overrides
    Custom(HashMap<u8, char>),
    /// Two-byte identity encoding of composite fonts
    Identity,
}

/// Parsed font resource.
#[derive(Debug, Clone)]
pub struct FontInfo {
    /// `/BaseFont` name
    pub base_font: String,
    /// `/Subtype` name
    pub subtype: String,
    /// Code-to-text encoding
    pub encoding: Encoding,
    /// ToUnicode CMap, when present
    pub to_unicode: Option<CMap>,
    /// Glyph widths in 1/1000 em, indexed from `first_char`
    pub widths: Vec<f32>,
    /// First code covered by `widths`
    pub first_char: u32,
    /// CID widths of composite fonts (`/W` array)
    pub cid_widths: HashMap<u32, f32>,
    /// Width used for codes without an explicit entry
    pub default_width: f32,
}

impl FontInfo {
    /// Fallback font used when a `Tf` operand names a missing resource.
    pub fn fallback() -> Self {
        Self {
            base_font: "Helvetica".to_string(),
            subtype: "Type1".to_string(),
            encoding: Encoding::WinAnsi,
            to_unicode: None,
            widths: Vec::new(),
            first_char: 0,
            cid_widths: HashMap::new(),
            default_width: 500.0,
        }
    }

    /// Parse a font dictionary.
    ///
    /// Missing or malformed entries fall back to defaults; parsing never fails
    /// because text extraction should degrade rather than abort.
    pub fn from_dict(doc: &Document, dict: &Dictionary) -> Self {
        let base_font = get_name(doc, dict, b"BaseFont").unwrap_or_else(|| "Unknown".to_string());
        let subtype = get_name(doc, dict, b"Subtype").unwrap_or_else(|| "Unknown".to_string());

        let to_unicode = match get(doc, dict, b"ToUnicode") {
            Some(Object::Stream(stream)) => {
                let data = stream
                    .decompressed_content()
                    .unwrap_or_else(|_| stream.content.clone());
                Some(parse_tounicode_cmap(&data))
            },
            _ => None,
        };

        if subtype == "Type0" {
            let (cid_widths, default_width) = Self::composite_widths(doc, dict);
            return Self {
                base_font,
                subtype,
                encoding: Encoding::Identity,
                to_unicode,
                widths: Vec::new(),
                first_char: 0,
                cid_widths,
                default_width,
            };
        }

        let first_char = get_int(doc, dict, b"FirstChar").unwrap_or(0).max(0) as u32;
        let widths = get_array(doc, dict, b"Widths")
            .map(|items| {
                items
                    .iter()
                    .map(|w| resolve(doc, w).and_then(as_number).unwrap_or(0.0))
                    .collect()
            })
            .unwrap_or_default();
        let default_width = get_dict(doc, dict, b"FontDescriptor")
            .and_then(|fd| get(doc, fd, b"MissingWidth"))
            .and_then(as_number)
            .filter(|w| *w > 0.0)
            .unwrap_or(500.0);

        Self {
            base_font,
            subtype,
            encoding: Self::simple_encoding(doc, dict),
            to_unicode,
            widths,
            first_char,
            cid_widths: HashMap::new(),
            default_width,
        }
    }

    fn simple_encoding(doc: &Document, dict: &Dictionary) -> Encoding {
        let Some(Object::Dictionary(enc)) = get(doc, dict, b"Encoding") else {
            return Encoding::WinAnsi;
        };
        let Some(differences) = get_array(doc, enc, b"Differences") else {
            return Encoding::WinAnsi;
        };

        let mut map = HashMap::new();
        let mut code: i64 = 0;
        for item in differences {
            match resolve(doc, item) {
                Some(Object::Integer(start)) => code = *start,
                Some(Object::Name(name)) => {
                    if let (Ok(byte), Some(ch)) = (u8::try_from(code), glyph_name_to_char(name)) {
                        map.insert(byte, ch);
                    }
                    code += 1;
                },
                _ => {},
            }
        }
        Encoding::Custom(map)
    }

    /// Read `/DW` and the `/W` array from the descendant CIDFont.
    fn composite_widths(doc: &Document, dict: &Dictionary) -> (HashMap<u32, f32>, f32) {
        let mut widths = HashMap::new();
        let descendant = get_array(doc, dict, b"DescendantFonts")
            .and_then(|fonts| fonts.first())
            .and_then(|first| resolve(doc, first))
            .and_then(|obj| obj.as_dict().ok());
        let Some(cid_font) = descendant else {
            return (widths, 1000.0);
        };

        let default_width = get(doc, cid_font, b"DW").and_then(as_number).unwrap_or(1000.0);
        let Some(w) = get_array(doc, cid_font, b"W") else {
            return (widths, default_width);
        };

        // Entries are either `c [w1 w2 ...]` or `c_first c_last w`.
        let mut i = 0;
        while i < w.len() {
            let Some(start) = resolve(doc, &w[i]).and_then(as_number) else {
                break;
            };
            let start = start as u32;
            match w.get(i + 1).and_then(|obj| resolve(doc, obj)) {
                Some(Object::Array(list)) => {
                    for (offset, width) in list.iter().enumerate() {
                        if let Some(width) = as_number(width) {
                            widths.insert(start + offset as u32, width);
                        }
                    }
                    i += 2;
                },
                Some(end) => {
                    let end = as_number(end).unwrap_or(start as f32) as u32;
                    let width = w
                        .get(i + 2)
                        .and_then(|obj| resolve(doc, obj))
                        .and_then(as_number)
                        .unwrap_or(default_width);
                    for cid in start..=end.min(start.saturating_add(0xFFFF)) {
                        widths.insert(cid, width);
                    }
                    i += 3;
                },
                None => break,
            }
        }
        (widths, default_width)
    }

    /// Number of bytes per character code.
    pub fn code_length(&self) -> usize {
        match self.encoding {
            Encoding::Identity => 2,
            _ => 1,
        }
    }

    /// Split a string operand into character codes.
    pub fn codes(&self, bytes: &[u8]) -> Vec<u32> {
        match self.code_length() {
            2 => bytes
                .chunks(2)
                .map(|pair| match pair {
                    [hi, lo] => (u32::from(*hi) << 8) | u32::from(*lo),
                    [single] => u32::from(*single),
                    _ => 0,
                })
                .collect(),
            _ => bytes.iter().map(|&b| u32::from(b)).collect(),
        }
    }

    /// Width of a character code in 1/1000 em.
    pub fn get_glyph_width(&self, code: u32) -> f32 {
        if let Encoding::Identity = self.encoding {
            return self.cid_widths.get(&code).copied().unwrap_or(self.default_width);
        }
        code.checked_sub(self.first_char)
            .and_then(|index| self.widths.get(index as usize))
            .copied()
            .filter(|w| *w > 0.0)
            .unwrap_or(self.default_width)
    }

    /// Convert a character code to text.
    ///
    /// The ToUnicode CMap wins when it has a usable entry; U+FFFD entries are
    /// treated as missing.
    pub fn char_to_unicode(&self, code: u32) -> Option<String> {
        if let Some(text) = self.to_unicode.as_ref().and_then(|cmap| cmap.get(&code)) {
            if text != "\u{FFFD}" {
                return Some(text.clone());
            }
            log::debug!("ToUnicode maps 0x{:02X} to U+FFFD in font '{}'", code, self.base_font);
        }

        match &self.encoding {
            Encoding::Identity => None,
            Encoding::Custom(map) => {
                let byte = u8::try_from(code).ok()?;
                map.get(&byte)
                    .copied()
                    .or_else(|| win_ansi_char(byte))
                    .map(String::from)
            },
            Encoding::WinAnsi => u8::try_from(code).ok().and_then(win_ansi_char).map(String::from),
        }
    }
}

/// Map a glyph name from a `/Differences` array to a character.
fn glyph_name_to_char(name: &[u8]) -> Option<char> {
    let name = std::str::from_utf8(name).ok()?;
    if let Some(hex) = name.strip_prefix("uni") {
        if hex.len() == 4 {
            return u32::from_str_radix(hex, 16).ok().and_then(char::from_u32);
        }
    }
    let mut chars = name.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Some(c);
    }
    let ch = match name {
        "space" => ' ',
        "exclam" => '!',
        "quotedbl" => '"',
        "numbersign" => '#',
        "dollar" => '$',
        "percent" => '%',
        "ampersand" => '&',
        "quotesingle" | "quoteright" => '\'',
        "parenleft" => '(',
        "parenright" => ')',
        "asterisk" => '*',
        "plus" => '+',
        "comma" => ',',
        "hyphen" | "minus" => '-',
        "period" => '.',
        "slash" => '/',
        "zero" => '0',
        "one" => '1',
        "two" => '2',
        "three" => '3',
        "four" => '4',
        "five" => '5',
        "six" => '6',
        "seven" => '7',
        "eight" => '8',
        "nine" => '9',
        "colon" => ':',
        "semicolon" => ';',
        "less" => '<',
        "equal" => '=',
        "greater" => '>',
        "question" => '?',
        "at" => '@',
        "bracketleft" => '[',
        "backslash" => '\\',
        "bracketright" => ']',
        "underscore" => '_',
        "bullet" => '\u{2022}',
        "endash" => '\u{2013}',
        "emdash" => '\u{2014}',
        "section" => '\u{A7}',
        "fi" => '\u{FB01}',
        "fl" => '\u{FB02}',
        _ => return None,
    };
    Some(ch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    #[test]
    fn test_simple_font_widths() {
        let doc = Document::with_version("1.7");
        let dict = dictionary! {
            "Type" => "Font",
            "Subtype" => "TrueType",
            "BaseFont" => "Arial",
            "FirstChar" => 32,
            "Widths" => vec![278.into(), 278.into(), 355.into()],
        };
        let font = FontInfo::from_dict(&doc, &dict);
        assert_eq!(font.get_glyph_width(32), 278.0);
        assert_eq!(font.get_glyph_width(34), 355.0);
        assert_eq!(font.get_glyph_width(65), 500.0);
        assert_eq!(font.char_to_unicode(65).as_deref(), Some("A"));
    }

    #[test]
    fn test_differences_encoding() {
        let doc = Document::with_version("1.7");
        let dict = dictionary! {
            "Subtype" => "Type1",
            "Encoding" => dictionary! {
                "Differences" => vec![1.into(), Object::Name(b"S".to_vec()), Object::Name(b"hyphen".to_vec())],
            },
        };
        let font = FontInfo::from_dict(&doc, &dict);
        assert_eq!(font.char_to_unicode(1).as_deref(), Some("S"));
        assert_eq!(font.char_to_unicode(2).as_deref(), Some("-"));
        assert_eq!(font.char_to_unicode(0x42).as_deref(), Some("B"));
    }

    #[test]
    fn test_composite_font_codes() {
        let mut doc = Document::with_version("1.7");
        let cid_font = doc.add_object(dictionary! {
            "Subtype" => "CIDFontType2",
            "DW" => 1000,
            "W" => vec![3.into(), Object::Array(vec![250.into(), 600.into()]), 10.into(), 12.into(), 400.into()],
        });
        let dict = dictionary! {
            "Subtype" => "Type0",
            "Encoding" => "Identity-H",
            "DescendantFonts" => vec![cid_font.into()],
        };
        let font = FontInfo::from_dict(&doc, &dict);
        assert_eq!(font.codes(&[0x00, 0x03, 0x00, 0x0B]), vec![3, 11]);
        assert_eq!(font.get_glyph_width(4), 600.0);
        assert_eq!(font.get_glyph_width(11), 400.0);
        assert_eq!(font.get_glyph_width(99), 1000.0);
        assert!(font.char_to_unicode(3).is_none());
    }
}
