//! Font handling and text encodings.
//!
//! Font dictionaries and ToUnicode CMaps turn content stream bytes back into
//! text; the encoding helpers cover PDF text strings and WinAnsiEncoding;
//! the Helvetica metrics drive generated field appearances.

pub mod cmap;
pub mod encoding;
pub mod font_dict;
pub mod metrics;

pub use cmap::{parse_tounicode_cmap, CMap};
pub use encoding::{decode_text_string, encode_text_string, encode_win_ansi, win_ansi_char};
pub use font_dict::{Encoding, FontInfo};
pub use metrics::{char_width, text_width};
