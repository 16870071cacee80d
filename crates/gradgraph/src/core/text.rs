//! Shared text utilities for diagram rendering
//!
//! Line widths come from a [`TextMeasurer`]. [`FontTextMeasurer`] lays each
//! line out with `usvg` against the installed fonts, and
//! [`EstimatedTextMeasurer`] counts display width. The font measurer falls
//! back to the estimate when no face matches.

use std::fmt;
use std::sync::Arc;

use tracing::trace;
use unicode_width::UnicodeWidthStr;

use super::canvas::{TextStyle, FONT_FAMILY};
use super::raster::{parse_options, system_fonts};
use super::FontWeight;

/// Multi-line text spacing as a multiple of the font size
pub const LINE_SPACING: f32 = 1.2;

/// Average glyph advance as a fraction of the font size
const NORMAL_ADVANCE: f32 = 0.6;
const BOLD_ADVANCE: f32 = 0.66;

/// Distance from the top of a line box to its baseline, as a fraction of the
/// font size
pub const ASCENT: f32 = 0.8;

/// Width of a single line of text in points
pub trait TextMeasurer: fmt::Debug {
    fn line_width(&self, line: &str, style: &TextStyle) -> f32;
}

/// Shared handle used by the canvas and the layout
pub type SharedTextMeasurer = Arc<dyn TextMeasurer + Send + Sync>;

/// Display-width estimate, independent of installed fonts
#[derive(Debug, Clone, Copy, Default)]
pub struct EstimatedTextMeasurer;

impl TextMeasurer for EstimatedTextMeasurer {
    fn line_width(&self, line: &str, style: &TextStyle) -> f32 {
        line_width(line, style.font_size, style.weight)
    }
}

/// Measures text with the same font database used for rasterising
#[derive(Clone)]
pub struct FontTextMeasurer {
    fontdb: Arc<usvg::fontdb::Database>,
}

impl FontTextMeasurer {
    pub fn new(fontdb: Arc<usvg::fontdb::Database>) -> Self {
        Self { fontdb }
    }

    /// Measurer over the shared system fonts
    pub fn system() -> Self {
        Self::new(system_fonts())
    }

    fn measure(&self, line: &str, style: &TextStyle) -> Option<f32> {
        let svg = format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="100"><text x="0" y="50" font-family="{}" font-size="{}" font-weight="{}" font-style="{}" xml:space="preserve">{}</text></svg>"#,
            FONT_FAMILY,
            style.font_size,
            style.weight,
            style.style,
            escape_xml(line),
        );
        let tree = usvg::Tree::from_str(&svg, &parse_options(Arc::clone(&self.fontdb))).ok()?;
        // usvg drops text it cannot shape, so a missing node means no font
        tree.root()
            .children()
            .iter()
            .find_map(|node| match node {
                usvg::Node::Text(text) => Some(text.bounding_box().width()),
                _ => None,
            })
            .filter(|width| width.is_finite() && *width > 0.0)
    }
}

impl fmt::Debug for FontTextMeasurer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontTextMeasurer")
            .field("faces", &self.fontdb.len())
            .finish()
    }
}

impl TextMeasurer for FontTextMeasurer {
    fn line_width(&self, line: &str, style: &TextStyle) -> f32 {
        self.measure(line, style).unwrap_or_else(|| {
            trace!(line, "No font face matched, estimating width");
            EstimatedTextMeasurer.line_width(line, style)
        })
    }
}

/// Estimated width in points of a single line of text
pub fn line_width(line: &str, font_size: f32, weight: FontWeight) -> f32 {
    let advance = match weight {
        FontWeight::Normal => NORMAL_ADVANCE,
        FontWeight::Bold => BOLD_ADVANCE,
    };
    UnicodeWidthStr::width(line) as f32 * font_size * advance
}

/// Height in points of one line box
pub fn line_height(font_size: f32) -> f32 {
    font_size * LINE_SPACING
}

/// `(width, height)` of a block of lines, the width being the widest line
pub fn measure_block<S: AsRef<str>>(
    measurer: &dyn TextMeasurer,
    lines: &[S],
    style: &TextStyle,
) -> (f32, f32) {
    let width = lines
        .iter()
        .map(|line| measurer.line_width(line.as_ref(), style))
        .fold(0.0_f32, f32::max);
    let height = lines.len() as f32 * line_height(style.font_size);
    (width, height)
}

/// Escape text for use inside SVG element content or attribute values
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
