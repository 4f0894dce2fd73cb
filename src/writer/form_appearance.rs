//! Form field appearance stream generation.
//!
//! Builds the normal appearance (`/AP /N`) content of filled widgets so the
//! value is visible in viewers that ignore `NeedAppearances`. Text is always
//! painted black. Layout uses Helvetica metrics.

use crate::fonts::encode_win_ansi;
use crate::fonts::metrics::{char_width, text_width, HELVETICA_ASCENT, HELVETICA_DESCENT};
use crate::geometry::Rect;

/// Inner padding between the widget border and its text, in points.
const PADDING: f32 = 2.0;

/// Upper bound for automatically sized text.
const MAX_AUTO_FONT_SIZE: f32 = 12.0;

/// Lower bound for automatically sized text.
const MIN_AUTO_FONT_SIZE: f32 = 4.0;

/// Line spacing of multiline fields, as a multiple of the font size.
const LINE_SPACING: f32 = 1.15;

/// Quadding (`/Q`) of a text field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Alignment {
    /// Left-justified (0)
    #[default]
    Left,
    /// Centered (1)
    Center,
    /// Right-justified (2)
    Right,
}

impl Alignment {
    /// Alignment from a `/Q` value; unknown values are left-justified.
    pub fn from_quadding(q: i64) -> Self {
        match q {
            1 => Alignment::Center,
            2 => Alignment::Right,
            _ => Alignment::Left,
        }
    }
}

/// Font resource and size selected by a `/DA` string.
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultAppearance {
    /// Font resource name, without the leading slash
    pub font: String,
    /// Font size; 0 means auto
    pub size: f32,
}

impl DefaultAppearance {
    /// Parse the `Tf` operator of a default appearance string.
    ///
    /// # Examples
    ///
    /// ```
    /// use taxform_oxide::writer::DefaultAppearance;
    ///
    /// let da = DefaultAppearance::parse("/HeBo 9 Tf 0.2 0.2 0.8 rg").unwrap();
    /// assert_eq!(da.font, "HeBo");
    /// assert_eq!(da.size, 9.0);
    /// assert_eq!(da.to_black_string(), "/HeBo 9 Tf 0 g");
    /// ```
    pub fn parse(da: &str) -> Option<Self> {
        let tokens: Vec<&str> = da.split_whitespace().collect();
        let tf = tokens.iter().rposition(|t| *t == "Tf")?;
        if tf < 2 {
            return None;
        }
        let font = tokens[tf - 2].strip_prefix('/')?.to_string();
        let size = tokens[tf - 1].parse::<f32>().ok()?;
        Some(Self { font, size })
    }

    /// A `/DA` string with the same font and black text.
    pub fn to_black_string(&self) -> String {
        format!("/{} {} Tf 0 g", self.font, fmt_num(self.size))
    }
}

/// Generator for text widget appearance streams.
#[derive(Debug, Clone)]
pub struct FormAppearanceGenerator {
    font_resource: String,
    font_size: f32,
    alignment: Alignment,
    multiline: bool,
    comb_cells: Option<usize>,
}

impl FormAppearanceGenerator {
    /// Create a generator painting with the font resource `font_resource`
    /// at `font_size` (0 = auto).
    pub fn new(font_resource: impl Into<String>, font_size: f32) -> Self {
        Self {
            font_resource: font_resource.into(),
            font_size,
            alignment: Alignment::Left,
            multiline: false,
            comb_cells: None,
        }
    }

    /// Set the text alignment.
    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    /// Wrap text over several lines.
    pub fn with_multiline(mut self, multiline: bool) -> Self {
        self.multiline = multiline;
        self
    }

    /// Spread characters over `cells` equal cells (comb fields).
    pub fn with_comb(mut self, cells: Option<usize>) -> Self {
        self.comb_cells = cells.filter(|n| *n > 0);
        self
    }

    /// Font size used for `text` in a widget of `rect`'s size.
    pub fn resolved_font_size(&self, rect: &Rect, text: &str) -> f32 {
        if self.font_size > 0.0 {
            return self.font_size;
        }
        let em_height = (HELVETICA_ASCENT - HELVETICA_DESCENT) / 1000.0;
        let mut size = ((rect.height() - 2.0 * PADDING) / em_height).min(MAX_AUTO_FONT_SIZE);
        if !self.multiline && self.comb_cells.is_none() {
            let unit_width = text_width(text, 1.0);
            let available = rect.width() - 2.0 * PADDING;
            if unit_width > 0.0 && unit_width * size > available {
                size = available / unit_width;
            }
        }
        size.max(MIN_AUTO_FONT_SIZE)
    }

    /// Generate the appearance content of a text field showing `text`.
    pub fn text_field_appearance(&self, rect: &Rect, text: &str) -> String {
        let width = rect.width();
        let height = rect.height();
        let size = self.resolved_font_size(rect, text);

        let mut stream = String::new();
        stream.push_str("/Tx BMC\nq\n");
        stream.push_str(&format!(
            "1 1 {} {} re W n\n",
            fmt_num((width - 2.0).max(0.0)),
            fmt_num((height - 2.0).max(0.0))
        ));

        if !text.is_empty() {
            stream.push_str("BT\n");
            stream.push_str(&format!("/{} {} Tf\n", self.font_resource, fmt_num(size)));
            stream.push_str("0 g\n");

            if let Some(cells) = self.comb_cells {
                let baseline = centered_baseline(height, size);
                let cell_width = width / cells as f32;
                for (i, ch) in text.chars().take(cells).enumerate() {
                    let glyph = char_width(ch) * size / 1000.0;
                    let x = i as f32 * cell_width + (cell_width - glyph) / 2.0;
                    push_line(&mut stream, x, baseline, &ch.to_string());
                }
            } else if self.multiline {
                let ascent = HELVETICA_ASCENT * size / 1000.0;
                let mut baseline = height - PADDING - ascent;
                for line in wrap_lines(text, width - 2.0 * PADDING, size) {
                    let x = self.aligned_x(width, text_width(&line, size));
                    push_line(&mut stream, x, baseline, &line);
                    baseline -= size * LINE_SPACING;
                }
            } else {
                let line = text.replace(['\r', '\n'], " ");
                let x = self.aligned_x(width, text_width(&line, size));
                push_line(&mut stream, x, centered_baseline(height, size), &line);
            }

            stream.push_str("ET\n");
        }

        stream.push_str("Q\nEMC\n");
        stream
    }

    fn aligned_x(&self, width: f32, line_width: f32) -> f32 {
        match self.alignment {
            Alignment::Left => PADDING,
            Alignment::Center => ((width - line_width) / 2.0).max(PADDING),
            Alignment::Right => (width - PADDING - line_width).max(PADDING),
        }
    }
}

/// Appearance of a checked check box: a black check mark.
pub fn checkbox_on_appearance(rect: &Rect) -> String {
    let width = rect.width();
    let height = rect.height();
    let margin = width.min(height) * 0.2;
    format!(
        "q\n0 G\n{} w\n{} {} m {} {} l {} {} l S\nQ\n",
        fmt_num(width.min(height) * 0.1),
        fmt_num(margin),
        fmt_num(height * 0.5),
        fmt_num(width * 0.4),
        fmt_num(margin),
        fmt_num(width - margin),
        fmt_num(height - margin)
    )
}

/// Appearance of an unchecked check box (empty).
pub fn checkbox_off_appearance() -> String {
    String::new()
}

/// Baseline that vertically centers one line of text.
fn centered_baseline(height: f32, size: f32) -> f32 {
    let em_height = (HELVETICA_ASCENT - HELVETICA_DESCENT) * size / 1000.0;
    (height - em_height) / 2.0 - HELVETICA_DESCENT * size / 1000.0
}

fn push_line(stream: &mut String, x: f32, y: f32, text: &str) {
    stream.push_str(&format!(
        "1 0 0 1 {} {} Tm\n({}) Tj\n",
        fmt_num(x),
        fmt_num(y),
        escape_pdf_string(&encode_win_ansi(text))
    ));
}

/// Greedy word wrap to `max_width` points; explicit line breaks are kept.
/// A word wider than the line stays on a line of its own.
pub fn wrap_lines(text: &str, max_width: f32, size: f32) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{} {}", current, word)
            };
            if !current.is_empty() && text_width(&candidate, size) > max_width {
                lines.push(std::mem::take(&mut current));
                current = word.to_string();
            } else {
                current = candidate;
            }
        }
        lines.push(current);
    }
    lines
}

/// Escape encoded bytes for a PDF literal string; bytes outside printable
/// ASCII are written as octal escapes.
fn escape_pdf_string(bytes: &[u8]) -> String {
    let mut result = String::with_capacity(bytes.len());
    for &b in bytes {
        match b {
            b'\\' => result.push_str("\\\\"),
            b'(' => result.push_str("\\("),
            b')' => result.push_str("\\)"),
            0x20..=0x7E => result.push(b as char),
            _ => result.push_str(&format!("\\{:03o}", b)),
        }
    }
    result
}

/// Format a number with at most two decimals and no trailing zeros.
pub(crate) fn fmt_num(value: f32) -> String {
    let formatted = format!("{:.2}", value);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    match trimmed {
        "" | "-0" => "0".to_string(),
        other => other.to_string(),
    }
}
