//! Byte-level text encodings: PDF text strings and WinAnsiEncoding.
//!
//! Field names, labels and values are PDF text strings (PDFDocEncoding or
//! UTF-16BE with a byte order mark, ISO 32000-1:2008, Section 7.9.2.2).
//! Simple fonts without a ToUnicode CMap are decoded as WinAnsiEncoding,
//! which covers the standard fonts used on IRS forms.

/// Decode a PDF text string.
///
/// # Examples
///
/// ```
/// use taxform_oxide::fonts::decode_text_string;
///
/// assert_eq!(decode_text_string(b"f1_01[0]"), "f1_01[0]");
/// assert_eq!(decode_text_string(&[0xFE, 0xFF, 0x00, 0x41]), "A");
/// ```
pub fn decode_text_string(bytes: &[u8]) -> String {
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let units: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|chunk| u16::from_be_bytes([chunk[0], chunk[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    } else if bytes.len() >= 3 && bytes[..3] == [0xEF, 0xBB, 0xBF] {
        // PDF 2.0 UTF-8 text strings
        String::from_utf8_lossy(&bytes[3..]).into_owned()
    } else {
        bytes.iter().filter_map(|&b| pdfdoc_char(b)).collect()
    }
}

/// Encode a string as a PDF text string.
///
/// PDFDocEncoding is used when every character is representable, otherwise
/// UTF-16BE with a byte order mark.
pub fn encode_text_string(text: &str) -> Vec<u8> {
    let pdfdoc: Option<Vec<u8>> = text.chars().map(pdfdoc_byte).collect();
    match pdfdoc {
        Some(bytes) => bytes,
        None => {
            let mut bytes = vec![0xFE, 0xFF];
            for unit in text.encode_utf16() {
                bytes.extend_from_slice(&unit.to_be_bytes());
            }
            bytes
        },
    }
}

/// Decode one byte of a simple font using WinAnsiEncoding.
pub fn win_ansi_char(code: u8) -> Option<char> {
    match code {
        0x20..=0x7E | 0xA0..=0xFF => Some(code as char),
        0x80..=0x9F => WIN_ANSI_HIGH[(code - 0x80) as usize],
        0x09 | 0x0A | 0x0D => Some(' '),
        _ => None,
    }
}

/// Encode a string for a WinAnsiEncoding font; unmappable characters
/// become `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c as u32 {
            0x20..=0x7E | 0xA0..=0xFF => c as u8,
            _ => WIN_ANSI_HIGH
                .iter()
                .position(|&mapped| mapped == Some(c))
                .map(|i| 0x80 + i as u8)
                .unwrap_or(b'?'),
        })
        .collect()
}

const WIN_ANSI_HIGH: [Option<char>; 32] = [
    Some('\u{20AC}'),
    None,
    Some('\u{201A}'),
    Some('\u{0192}'),
    Some('\u{201E}'),
    Some('\u{2026}'),
    Some('\u{2020}'),
    Some('\u{2021}'),
    Some('\u{02C6}'),
    Some('\u{2030}'),
    Some('\u{0160}'),
    Some('\u{2039}'),
    Some('\u{0152}'),
    None,
    Some('\u{017D}'),
    None,
    None,
    Some('\u{2018}'),
    Some('\u{2019}'),
    Some('\u{201C}'),
    Some('\u{201D}'),
    Some('\u{2022}'),
    Some('\u{2013}'),
    Some('\u{2014}'),
    Some('\u{02DC}'),
    Some('\u{2122}'),
    Some('\u{0161}'),
    Some('\u{203A}'),
    Some('\u{0153}'),
    None,
    Some('\u{017E}'),
    Some('\u{0178}'),
];

const PDFDOC_HIGH: [Option<char>; 32] = [
    Some('\u{2022}'),
    Some('\u{2020}'),
    Some('\u{2021}'),
    Some('\u{2026}'),
    Some('\u{2014}'),
    Some('\u{2013}'),
    Some('\u{0192}'),
    Some('\u{2044}'),
    Some('\u{2039}'),
    Some('\u{203A}'),
    Some('\u{2212}'),
    Some('\u{2030}'),
    Some('\u{201E}'),
    Some('\u{201C}'),
    Some('\u{201D}'),
    Some('\u{2018}'),
    Some('\u{2019}'),
    Some('\u{201A}'),
    Some('\u{2122}'),
    Some('\u{FB01}'),
    Some('\u{FB02}'),
    Some('\u{0141}'),
    Some('\u{0152}'),
    Some('\u{0160}'),
    Some('\u{0178}'),
    Some('\u{017D}'),
    Some('\u{0131}'),
    Some('\u{0142}'),
    Some('\u{0153}'),
    Some('\u{0161}'),
    Some('\u{017E}'),
    None,
];

fn pdfdoc_char(code: u8) -> Option<char> {
    match code {
        0x00..=0x7F => Some(code as char),
        0x80..=0x9F => PDFDOC_HIGH[(code - 0x80) as usize],
        0xA0 => Some('\u{20AC}'),
        0xAD => None,
        _ => Some(code as char),
    }
}

fn pdfdoc_byte(c: char) -> Option<u8> {
    match c as u32 {
        0x00..=0x7F => Some(c as u8),
        0xA1..=0xAC | 0xAE..=0xFF => Some(c as u8),
        _ => PDFDOC_HIGH
            .iter()
            .position(|&mapped| mapped == Some(c))
            .map(|i| 0x80 + i as u8)
            .or(if c == '\u{20AC}' { Some(0xA0) } else { None }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_utf16() {
        let bytes = [0xFE, 0xFF, 0x00, 0x53, 0x00, 0x53, 0x00, 0x4E];
        assert_eq!(decode_text_string(&bytes), "SSN");
    }

    #[test]
    fn test_pdfdoc_round_trip() {
        let text = "Caf\u{e9} \u{2014} total";
        let encoded = encode_text_string(text);
        assert_ne!(encoded[0], 0xFE);
        assert_eq!(decode_text_string(&encoded), text);
    }

    #[test]
    fn test_utf16_fallback_round_trip() {
        let text = "\u{4e2d}\u{6587} name";
        let encoded = encode_text_string(text);
        assert_eq!(&encoded[..2], &[0xFE, 0xFF]);
        assert_eq!(decode_text_string(&encoded), text);
    }

    #[test]
    fn test_win_ansi() {
        assert_eq!(win_ansi_char(0x41), Some('A'));
        assert_eq!(win_ansi_char(0x96), Some('\u{2013}'));
        assert_eq!(win_ansi_char(0x81), None);
        assert_eq!(encode_win_ansi("A\u{2013}\u{4e2d}"), vec![0x41, 0x96, b'?']);
    }
}
