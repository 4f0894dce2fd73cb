//! Text run extraction from page content streams.
//!
//! Interprets the text showing operators of a page (and the Form XObjects it
//! paints) and groups positioned glyphs into words. Each word is a
//! [`TextRun`] with a bounding box in page user space.
//!
//! PDF Spec: ISO 32000-1:2008, Section 9.4 (text objects) and 9.4.4 (text
//! space details).

use super::graphics_state::{GraphicsStateStack, Matrix};
use crate::fonts::FontInfo;
use crate::geometry::Rect;
use crate::object::{as_number, get_dict, page_attribute, resolve};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::HashMap;

/// Maximum nesting of Form XObjects followed while collecting text.
const MAX_XOBJECT_DEPTH: usize = 8;

/// Glyph descent below the baseline, as a fraction of the font size.
const DESCENT: f32 = 0.2;

/// Glyph ascent above the baseline, as a fraction of the font size.
const ASCENT: f32 = 0.8;

/// A horizontal gap wider than this fraction of the font size starts a new
/// word even without a space glyph.
const WORD_GAP: f32 = 0.2;

/// A word of page text with its bounding box.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    /// The word text (never empty, never containing whitespace)
    pub text: String,
    /// Bounding box in page user space
    pub bbox: Rect,
}

/// Extract the words of a page in reading order: top-to-bottom, then
/// left-to-right.
///
/// A malformed content stream yields the words decoded before the error
/// (typically none) and a warning; it never fails the caller.
pub fn page_text_runs(doc: &Document, page_id: ObjectId) -> Vec<TextRun> {
    let content = match doc.get_page_content(page_id) {
        Ok(bytes) => bytes,
        Err(e) => {
            log::warn!("Page {:?} content unreadable: {}", page_id, e);
            return Vec::new();
        },
    };
    let resources = match page_attribute(doc, page_id, b"Resources").and_then(|obj| resolve(doc, obj)) {
        Some(Object::Dictionary(dict)) => Some(dict),
        _ => None,
    };

    let mut collector = RunCollector::new(doc);
    collector.run_stream(&content, resources, Matrix::identity(), 0);
    let mut runs = collector.finish();
    sort_reading_order(&mut runs);
    runs
}

/// Sort runs top-to-bottom, then left-to-right.
pub fn sort_reading_order(runs: &mut [TextRun]) {
    runs.sort_by(|a, b| {
        b.bbox
            .top()
            .total_cmp(&a.bbox.top())
            .then(a.bbox.x0.total_cmp(&b.bbox.x0))
    });
}

/// Word currently being assembled.
struct PendingWord {
    text: String,
    bbox: Rect,
    baseline: f32,
    font_size: f32,
}

struct RunCollector<'a> {
    doc: &'a Document,
    fonts: HashMap<ObjectId, FontInfo>,
    runs: Vec<TextRun>,
    pending: Option<PendingWord>,
}

impl<'a> RunCollector<'a> {
    fn new(doc: &'a Document) -> Self {
        Self {
            doc,
            fonts: HashMap::new(),
            runs: Vec::new(),
            pending: None,
        }
    }

    fn finish(mut self) -> Vec<TextRun> {
        self.flush();
        self.runs
    }

    fn flush(&mut self) {
        if let Some(word) = self.pending.take() {
            if !word.text.is_empty() {
                self.runs.push(TextRun {
                    text: word.text,
                    bbox: word.bbox,
                });
            }
        }
    }

    fn run_stream(&mut self, data: &[u8], resources: Option<&'a Dictionary>, ctm: Matrix, depth: usize) {
        let content = match Content::decode(data) {
            Ok(content) => content,
            Err(e) => {
                log::warn!("Skipping malformed content stream: {}", e);
                return;
            },
        };

        let mut stack = GraphicsStateStack::with_ctm(ctm);
        let mut text_matrix = Matrix::identity();
        let mut line_matrix = Matrix::identity();

        for Operation { operator, operands } in &content.operations {
            let nums: Vec<f32> = operands.iter().filter_map(as_number).collect();
            match operator.as_str() {
                "q" => stack.save(),
                "Q" => stack.restore(),
                "cm" if nums.len() == 6 => {
                    let m = Matrix::new(nums[0], nums[1], nums[2], nums[3], nums[4], nums[5]);
                    let state = stack.current_mut();
                    state.ctm = m.multiply(&state.ctm);
                },
                "BT" => {
                    text_matrix = Matrix::identity();
                    line_matrix = Matrix::identity();
                },
                "ET" => self.flush(),
                "Tf" => {
                    if let (Some(Object::Name(name)), Some(size)) =
                        (operands.first(), operands.get(1).and_then(as_number))
                    {
                        let font = self.load_font(resources, name);
                        let state = stack.current_mut();
                        state.font = font;
                        state.font_size = size;
                    }
                },
                "Tc" if !nums.is_empty() => stack.current_mut().char_space = nums[0],
                "Tw" if !nums.is_empty() => stack.current_mut().word_space = nums[0],
                "Tz" if !nums.is_empty() => stack.current_mut().horizontal_scaling = nums[0],
                "TL" if !nums.is_empty() => stack.current_mut().leading = nums[0],
                "Ts" if !nums.is_empty() => stack.current_mut().text_rise = nums[0],
                "Td" if nums.len() == 2 => {
                    line_matrix = Matrix::translation(nums[0], nums[1]).multiply(&line_matrix);
                    text_matrix = line_matrix;
                },
                "TD" if nums.len() == 2 => {
                    stack.current_mut().leading = -nums[1];
                    line_matrix = Matrix::translation(nums[0], nums[1]).multiply(&line_matrix);
                    text_matrix = line_matrix;
                },
                "Tm" if nums.len() == 6 => {
                    line_matrix = Matrix::new(nums[0], nums[1], nums[2], nums[3], nums[4], nums[5]);
                    text_matrix = line_matrix;
                },
                "T*" => {
                    let leading = stack.current().leading;
                    line_matrix = Matrix::translation(0.0, -leading).multiply(&line_matrix);
                    text_matrix = line_matrix;
                },
                "Tj" => {
                    if let Some(Object::String(bytes, _)) = operands.first() {
                        self.show(bytes, &stack, &mut text_matrix);
                    }
                },
                "'" => {
                    let leading = stack.current().leading;
                    line_matrix = Matrix::translation(0.0, -leading).multiply(&line_matrix);
                    text_matrix = line_matrix;
                    if let Some(Object::String(bytes, _)) = operands.first() {
                        self.show(bytes, &stack, &mut text_matrix);
                    }
                },
                "\"" => {
                    if nums.len() >= 2 {
                        let state = stack.current_mut();
                        state.word_space = nums[0];
                        state.char_space = nums[1];
                    }
                    let leading = stack.current().leading;
                    line_matrix = Matrix::translation(0.0, -leading).multiply(&line_matrix);
                    text_matrix = line_matrix;
                    if let Some(Object::String(bytes, _)) = operands.get(2) {
                        self.show(bytes, &stack, &mut text_matrix);
                    }
                },
                "TJ" => {
                    if let Some(Object::Array(items)) = operands.first() {
                        for item in items {
                            match item {
                                Object::String(bytes, _) => {
                                    self.show(bytes, &stack, &mut text_matrix);
                                },
                                other => {
                                    if let Some(adjust) = as_number(other) {
                                        let state = stack.current();
                                        let tx = -adjust / 1000.0
                                            * state.font_size
                                            * (state.horizontal_scaling / 100.0);
                                        text_matrix = Matrix::translation(tx, 0.0).multiply(&text_matrix);
                                    }
                                },
                            }
                        }
                    }
                },
                "Do" if depth < MAX_XOBJECT_DEPTH => {
                    if let Some(Object::Name(name)) = operands.first() {
                        self.flush();
                        self.run_xobject(resources, name, stack.current().ctm, depth);
                    }
                },
                _ => {},
            }
        }
    }

    fn run_xobject(&mut self, resources: Option<&'a Dictionary>, name: &[u8], ctm: Matrix, depth: usize) {
        let doc = self.doc;
        let Some(xobjects) = resources.and_then(|res| get_dict(doc, res, b"XObject")) else {
            return;
        };
        let Some(Object::Stream(stream)) = xobjects.get(name).ok().and_then(|obj| resolve(doc, obj)) else {
            return;
        };
        if stream.dict.get(b"Subtype").and_then(|s| s.as_name()).ok() != Some(b"Form".as_slice()) {
            return;
        }

        let matrix = match stream.dict.get(b"Matrix").and_then(|m| m.as_array()) {
            Ok(items) if items.len() == 6 => {
                let m: Vec<f32> = items.iter().filter_map(as_number).collect();
                if m.len() == 6 {
                    Matrix::new(m[0], m[1], m[2], m[3], m[4], m[5])
                } else {
                    Matrix::identity()
                }
            },
            _ => Matrix::identity(),
        };
        let data = stream
            .decompressed_content()
            .unwrap_or_else(|_| stream.content.clone());
        let inner_resources = get_dict(doc, &stream.dict, b"Resources").or(resources);
        self.run_stream(&data, inner_resources, matrix.multiply(&ctm), depth + 1);
    }

    fn load_font(&mut self, resources: Option<&Dictionary>, name: &[u8]) -> FontInfo {
        let doc = self.doc;
        let font_ref = resources
            .and_then(|res| get_dict(doc, res, b"Font"))
            .and_then(|fonts| fonts.get(name).ok());
        match font_ref {
            Some(Object::Reference(id)) => {
                if let Some(font) = self.fonts.get(id) {
                    return font.clone();
                }
                let font = match doc.get_dictionary(*id) {
                    Ok(dict) => FontInfo::from_dict(doc, dict),
                    Err(_) => FontInfo::fallback(),
                };
                self.fonts.insert(*id, font.clone());
                font
            },
            Some(Object::Dictionary(dict)) => FontInfo::from_dict(doc, dict),
            _ => {
                log::debug!("Font resource /{} not found", String::from_utf8_lossy(name));
                FontInfo::fallback()
            },
        }
    }

    /// Show a string: decode each code, place its glyph and advance the text
    /// matrix.
    fn show(&mut self, bytes: &[u8], stack: &GraphicsStateStack, text_matrix: &mut Matrix) {
        let state = stack.current();
        let font = &state.font;
        let size = state.font_size;
        let h_scale = state.horizontal_scaling / 100.0;
        let single_byte = font.code_length() == 1;

        for code in font.codes(bytes) {
            let width = font.get_glyph_width(code) / 1000.0 * size;
            let text = font.char_to_unicode(code).unwrap_or_default();

            let trm = text_matrix.multiply(&state.ctm);
            let origin = trm.transform_point(0.0, state.text_rise);
            let bottom = trm.transform_point(0.0, state.text_rise - DESCENT * size);
            let top = trm.transform_point(width, state.text_rise + ASCENT * size);
            let glyph_box = Rect::from_corners(bottom.x, bottom.y, top.x, top.y);
            let scaled_size = (trm.b * trm.b + trm.d * trm.d).sqrt().max(f32::EPSILON);

            self.place(&text, glyph_box, origin.x, origin.y, scaled_size);

            let mut advance = width + state.char_space;
            if single_byte && code == 32 {
                advance += state.word_space;
            }
            *text_matrix = Matrix::translation(advance * h_scale, 0.0).multiply(text_matrix);
        }
    }

    fn place(&mut self, text: &str, glyph_box: Rect, x: f32, baseline: f32, font_size: f32) {
        if text.chars().all(char::is_whitespace) {
            self.flush();
            return;
        }

        let continues = self.pending.as_ref().is_some_and(|word| {
            (word.baseline - baseline).abs() <= font_size * 0.5
                && x - word.bbox.x1 <= WORD_GAP * word.font_size.max(font_size)
                && x + font_size * 0.5 >= word.bbox.x0
        });
        if !continues {
            self.flush();
        }

        let glyph_text: String = text.chars().filter(|c| !c.is_whitespace()).collect();
        match self.pending.as_mut() {
            Some(word) => {
                word.text.push_str(&glyph_text);
                word.bbox = word.bbox.union(&glyph_box);
            },
            None => {
                self.pending = Some(PendingWord {
                    text: glyph_text,
                    bbox: glyph_box,
                    baseline,
                    font_size,
                });
            },
        }
        // Ligatures expanding to text with inner spaces end the word.
        if text.trim_end().len() != text.len() {
            self.flush();
        }
    }
}
