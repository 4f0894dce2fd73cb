//! ToUnicode CMap parser.
//!
//! Fonts in fillable government forms are frequently subset with custom
//! encodings; the ToUnicode CMap is the only reliable route back to text.
//! See ISO 32000-1:2008, Section 9.10.3.

use regex::Regex;
use std::collections::HashMap;

/// Character code to Unicode string mapping.
pub type CMap = HashMap<u32, String>;

/// Upper bound on the number of codes expanded from a single bfrange.
const MAX_RANGE: u32 = 0xFFFF;

/// Parse the `bfchar` and `bfrange` sections of a ToUnicode CMap.
///
/// Unparsable lines are skipped; the parser never fails.
///
/// # Examples
///
/// ```
/// use taxform_oxide::fonts::parse_tounicode_cmap;
///
/// let cmap = parse_tounicode_cmap(b"beginbfchar\n<0041> <0041>\nendbfchar");
/// assert_eq!(cmap.get(&0x41).map(String::as_str), Some("A"));
/// ```
pub fn parse_tounicode_cmap(data: &[u8]) -> CMap {
    let mut cmap = HashMap::new();
    let content = String::from_utf8_lossy(data);

    for section in extract_sections(&content, "beginbfchar", "endbfchar") {
        for caps in BFCHAR_RE.captures_iter(section) {
            let Ok(src) = u32::from_str_radix(&caps[1], 16) else {
                continue;
            };
            if let Some(dst) = decode_utf16_hex(&caps[2]) {
                log::trace!("ToUnicode bfchar: 0x{:02X} -> {:?}", src, dst);
                cmap.insert(src, dst);
            }
        }
    }

    for section in extract_sections(&content, "beginbfrange", "endbfrange") {
        for line in section.lines() {
            parse_bfrange_line(line, &mut cmap);
        }
    }

    cmap
}

lazy_static::lazy_static! {
    static ref BFCHAR_RE: Regex =
        Regex::new(r"<([0-9A-Fa-f]+)>\s*<([0-9A-Fa-f]+)>").expect("valid bfchar pattern");
    static ref BFRANGE_SEQ_RE: Regex = Regex::new(
        r"<([0-9A-Fa-f]+)>\s*<([0-9A-Fa-f]+)>\s*<([0-9A-Fa-f]+)>"
    ).expect("valid bfrange pattern");
    static ref BFRANGE_ARRAY_RE: Regex = Regex::new(
        r"<([0-9A-Fa-f]+)>\s*<([0-9A-Fa-f]+)>\s*\[((?:\s*<[0-9A-Fa-f]+>\s*)+)\]"
    ).expect("valid bfrange array pattern");
    static ref HEX_RE: Regex = Regex::new(r"<([0-9A-Fa-f]+)>").expect("valid hex pattern");
}

fn extract_sections<'a>(content: &'a str, begin: &str, end: &str) -> Vec<&'a str> {
    let mut sections = Vec::new();
    let mut remaining = content;

    while let Some(begin_pos) = remaining.find(begin) {
        let after_begin = &remaining[begin_pos + begin.len()..];
        match after_begin.find(end) {
            Some(end_pos) => {
                sections.push(&after_begin[..end_pos]);
                remaining = &after_begin[end_pos + end.len()..];
            },
            None => break,
        }
    }

    sections
}

/// Decode a destination hex string as UTF-16BE (handles surrogate pairs
/// and multi-character ligature mappings).
fn decode_utf16_hex(hex: &str) -> Option<String> {
    if hex.len() <= 2 {
        let code = u32::from_str_radix(hex, 16).ok()?;
        return char::from_u32(code).map(|c| c.to_string());
    }
    let units: Vec<u16> = hex
        .as_bytes()
        .chunks(4)
        .filter_map(|chunk| std::str::from_utf8(chunk).ok())
        .filter_map(|s| u16::from_str_radix(s, 16).ok())
        .collect();
    let decoded = String::from_utf16(&units).ok()?;
    if decoded.is_empty() {
        None
    } else {
        Some(decoded)
    }
}

fn parse_bfrange_line(line: &str, cmap: &mut CMap) {
    if let Some(caps) = BFRANGE_ARRAY_RE.captures(line) {
        let (Ok(start), Ok(end)) = (
            u32::from_str_radix(&caps[1], 16),
            u32::from_str_radix(&caps[2], 16),
        ) else {
            return;
        };
        let count = end.saturating_sub(start).min(MAX_RANGE) as usize + 1;
        for (i, dst) in HEX_RE.captures_iter(&caps[3]).take(count).enumerate() {
            if let Some(text) = decode_utf16_hex(&dst[1]) {
                cmap.insert(start + i as u32, text);
            }
        }
        return;
    }

    if let Some(caps) = BFRANGE_SEQ_RE.captures(line) {
        let (Ok(start), Ok(end)) = (
            u32::from_str_radix(&caps[1], 16),
            u32::from_str_radix(&caps[2], 16),
        ) else {
            return;
        };
        let Some(first) = decode_utf16_hex(&caps[3]) else {
            return;
        };
        // Only the last UTF-16 unit increments across the range.
        let mut units: Vec<u16> = first.encode_utf16().collect();
        for code in start..=end.min(start.saturating_add(MAX_RANGE)) {
            if let Ok(text) = String::from_utf16(&units) {
                cmap.insert(code, text);
            }
            if let Some(last) = units.last_mut() {
                *last = last.wrapping_add(1);
            }
        }
    }
}
