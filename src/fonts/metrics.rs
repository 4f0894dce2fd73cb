//! Helvetica metrics used to lay out generated field appearances.
//!
//! Widths are the standard Adobe font metrics in units of 1/1000 em.

/// Default appearance font resource name.
pub const DEFAULT_FONT_RESOURCE: &str = "Helv";

/// Base font used when the form does not supply its own.
pub const DEFAULT_BASE_FONT: &str = "Helvetica";

/// Helvetica ascender in 1/1000 em.
pub const HELVETICA_ASCENT: f32 = 718.0;

/// Helvetica descender in 1/1000 em.
pub const HELVETICA_DESCENT: f32 = -207.0;

/// Helvetica widths for ASCII 0x20..=0x7E.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // '0'..'9'
    278, 278, 584, 584, 584, 556, 1015, // ':'..'@'
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // 'A'..'M'
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // 'N'..'Z'
    278, 278, 278, 469, 556, 333, // '['..'`'
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // 'a'..'m'
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // 'n'..'z'
    334, 260, 334, 584, // '{'..'~'
];

/// Width of a character in 1/1000 em.
pub fn char_width(ch: char) -> f32 {
    match ch as u32 {
        code @ 0x20..=0x7E => HELVETICA_WIDTHS[(code - 0x20) as usize] as f32,
        _ => 556.0,
    }
}

/// Width of `text` in points at `font_size`.
///
/// # Examples
///
/// ```
/// use taxform_oxide::fonts::text_width;
///
/// assert_eq!(text_width("11", 10.0), 11.12);
/// ```
pub fn text_width(text: &str, font_size: f32) -> f32 {
    text.chars().map(char_width).sum::<f32>() * font_size / 1000.0
}
