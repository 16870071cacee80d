//! Vector canvas for diagram rendering
//!
//! Records drawing primitives in figure points (y down), tracks the bounding
//! box of everything drawn, and serialises to SVG cropped to that box.

use std::fmt::Write as _;
use std::sync::Arc;

use tracing::trace;

use super::text::{
    escape_xml, line_height, measure_block, EstimatedTextMeasurer, SharedTextMeasurer,
    TextMeasurer, ASCENT,
};
use super::{Bounds, Color, FontStyle, FontWeight, HAlign, Point, VAlign};

/// Font stack written into the SVG
pub const FONT_FAMILY: &str = "DejaVu Sans, Arial, sans-serif";

/// Outline of a shape
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Color,
    pub width: f32,
}

impl Stroke {
    pub fn new(color: Color, width: f32) -> Self {
        Self { color, width }
    }
}

/// Fill and outline of a closed shape
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ShapeStyle {
    pub fill: Option<Color>,
    pub stroke: Option<Stroke>,
}

impl ShapeStyle {
    pub fn filled(fill: Color, stroke: Stroke) -> Self {
        Self {
            fill: Some(fill),
            stroke: Some(stroke),
        }
    }
}

/// Font and alignment for a text block
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub font_size: f32,
    pub weight: FontWeight,
    pub style: FontStyle,
    pub halign: HAlign,
    pub valign: VAlign,
    pub color: Color,
}

impl TextStyle {
    pub fn new(font_size: f32) -> Self {
        Self {
            font_size,
            weight: FontWeight::Normal,
            style: FontStyle::Normal,
            halign: HAlign::Center,
            valign: VAlign::Center,
            color: Color::BLACK,
        }
    }

    pub fn bold(mut self) -> Self {
        self.weight = FontWeight::Bold;
        self
    }

    pub fn italic(mut self) -> Self {
        self.style = FontStyle::Italic;
        self
    }

    pub fn aligned(mut self, halign: HAlign, valign: VAlign) -> Self {
        self.halign = halign;
        self.valign = valign;
        self
    }
}

/// Line arrow with an open `->` head
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArrowStyle {
    pub stroke: Stroke,
    pub head_length: f32,
    pub head_half_width: f32,
    /// Gap left at both ends of the arrow
    pub shrink: f32,
}

impl Default for ArrowStyle {
    fn default() -> Self {
        Self {
            stroke: Stroke::new(Color::BLACK, 2.0),
            head_length: 8.0,
            head_half_width: 4.0,
            shrink: 2.0,
        }
    }
}

/// A recorded drawing primitive
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    RoundedRect {
        bounds: Bounds,
        rx: f32,
        ry: f32,
        style: ShapeStyle,
    },
    Text {
        anchor: Point,
        lines: Vec<String>,
        style: TextStyle,
    },
    Polyline {
        points: Vec<Point>,
        stroke: Stroke,
    },
}

/// Vector canvas representing a figure in points
#[derive(Debug, Clone)]
pub struct SvgCanvas {
    primitives: Vec<Primitive>,
    bounds: Option<Bounds>,
    measurer: SharedTextMeasurer,
}

impl SvgCanvas {
    /// Create an empty canvas that estimates text widths
    pub fn new() -> Self {
        Self::with_measurer(Arc::new(EstimatedTextMeasurer))
    }

    /// Create an empty canvas that sizes text with `measurer`
    pub fn with_measurer(measurer: SharedTextMeasurer) -> Self {
        Self {
            primitives: Vec::new(),
            bounds: None,
            measurer,
        }
    }

    /// Primitives in drawing order
    pub fn primitives(&self) -> &[Primitive] {
        &self.primitives
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    /// Bounding box of everything drawn so far, including stroke widths
    pub fn content_bounds(&self) -> Option<Bounds> {
        self.bounds
    }

    fn extend_bounds(&mut self, b: Bounds) {
        self.bounds = Some(match self.bounds {
            Some(existing) => existing.union(&b),
            None => b,
        });
    }

    /// Draw a rectangle with elliptical corners of radii `rx`, `ry`
    pub fn draw_rounded_rect(&mut self, bounds: Bounds, rx: f32, ry: f32, style: ShapeStyle) {
        let half_stroke = style.stroke.map(|s| s.width / 2.0).unwrap_or(0.0);
        self.extend_bounds(bounds.inflate(half_stroke, half_stroke));
        self.primitives.push(Primitive::RoundedRect {
            bounds,
            rx: rx.min(bounds.width() / 2.0),
            ry: ry.min(bounds.height() / 2.0),
            style,
        });
    }

    /// Draw a plain rectangle
    pub fn draw_rect(&mut self, bounds: Bounds, style: ShapeStyle) {
        self.draw_rounded_rect(bounds, 0.0, 0.0, style);
    }

    /// Draw a block of lines anchored at `anchor` according to the style's
    /// alignment
    pub fn draw_text<S: AsRef<str>>(&mut self, anchor: Point, lines: &[S], style: TextStyle) {
        let lines: Vec<String> = lines
            .iter()
            .map(|l| l.as_ref().to_string())
            .filter(|l| !l.is_empty())
            .collect();
        if lines.is_empty() {
            return;
        }
        let bounds = text_bounds(self.measurer.as_ref(), anchor, &lines, &style);
        self.extend_bounds(bounds);
        self.primitives.push(Primitive::Text {
            anchor,
            lines,
            style,
        });
    }

    /// Draw a straight line segment
    pub fn draw_line(&mut self, from: Point, to: Point, stroke: Stroke) {
        self.draw_polyline(vec![from, to], stroke);
    }

    /// Draw an open polyline through `points`
    pub fn draw_polyline(&mut self, points: Vec<Point>, stroke: Stroke) {
        if points.len() < 2 {
            return;
        }
        let half = stroke.width / 2.0;
        for pair in points.windows(2) {
            self.extend_bounds(segment_bounds(pair[0], pair[1], half));
        }
        self.primitives.push(Primitive::Polyline { points, stroke });
    }

    /// Draw an arrow from `from` to `to` with an open head at `to`
    ///
    /// Both ends are pulled in by `style.shrink`. Zero-length arrows draw
    /// nothing.
    pub fn draw_arrow(&mut self, from: Point, to: Point, style: ArrowStyle) {
        let length = from.distance(to);
        if length <= f32::EPSILON {
            trace!(?from, "Skipping zero-length arrow");
            return;
        }
        let (dx, dy) = ((to.x - from.x) / length, (to.y - from.y) / length);
        let shrink = if length > 2.0 * style.shrink {
            style.shrink
        } else {
            0.0
        };
        let start = from.offset(dx * shrink, dy * shrink);
        let tip = to.offset(-dx * shrink, -dy * shrink);

        self.draw_line(start, tip, style.stroke);

        let base = tip.offset(-dx * style.head_length, -dy * style.head_length);
        let (nx, ny) = (-dy, dx);
        let left = base.offset(nx * style.head_half_width, ny * style.head_half_width);
        let right = base.offset(-nx * style.head_half_width, -ny * style.head_half_width);
        self.draw_polyline(vec![left, tip, right], style.stroke);
    }

    /// Serialise to an SVG document cropped to the content bounds plus
    /// `padding`
    ///
    /// An empty canvas produces a 1x1 document. When `background` is set a
    /// rectangle covering the whole view box is emitted first.
    pub fn to_svg(&self, padding: f32, background: Option<Color>) -> String {
        let view = self
            .bounds
            .map(|b| b.inflate(padding, padding))
            .unwrap_or_else(|| Bounds::new(0.0, 0.0, 1.0, 1.0));

        let mut svg = String::new();
        let _ = write!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w:.2}" height="{h:.2}" viewBox="{x:.2} {y:.2} {w:.2} {h:.2}">"#,
            x = view.min_x,
            y = view.min_y,
            w = view.width(),
            h = view.height(),
        );
        svg.push('\n');

        if let Some(bg) = background {
            let _ = writeln!(
                svg,
                r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" fill="{}"{}/>"#,
                view.min_x,
                view.min_y,
                view.width(),
                view.height(),
                bg,
                opacity_attr("fill-opacity", bg),
            );
        }

        for primitive in &self.primitives {
            write_primitive(&mut svg, primitive);
        }

        svg.push_str("</svg>\n");
        svg
    }
}

impl Default for SvgCanvas {
    fn default() -> Self {
        Self::new()
    }
}

/// Bounds of a butt-capped segment stroked `half` wide on each side
///
/// The stroke only grows along the segment normal, so a horizontal line
/// does not extend past its endpoints.
fn segment_bounds(a: Point, b: Point, half: f32) -> Bounds {
    let length = a.distance(b);
    let ends = Bounds::from_point(a).union(&Bounds::from_point(b));
    if length <= f32::EPSILON {
        return ends.inflate(half, half);
    }
    let nx = -(b.y - a.y) / length * half;
    let ny = (b.x - a.x) / length * half;
    ends.inflate(nx.abs(), ny.abs())
}

/// Baseline y of the first line for a block anchored at `anchor_y`
fn first_baseline(anchor_y: f32, line_count: usize, style: &TextStyle) -> f32 {
    let lh = line_height(style.font_size);
    let top = match style.valign {
        VAlign::Top => anchor_y,
        VAlign::Center => anchor_y - lh * line_count as f32 / 2.0,
        VAlign::Baseline => return anchor_y,
    };
    top + (lh - style.font_size) / 2.0 + ASCENT * style.font_size
}

fn text_bounds(
    measurer: &dyn TextMeasurer,
    anchor: Point,
    lines: &[String],
    style: &TextStyle,
) -> Bounds {
    let (width, height) = measure_block(measurer, lines, style);
    let min_x = match style.halign {
        HAlign::Left => anchor.x,
        HAlign::Center => anchor.x - width / 2.0,
        HAlign::Right => anchor.x - width,
    };
    let lh = line_height(style.font_size);
    let min_y = match style.valign {
        VAlign::Top => anchor.y,
        VAlign::Center => anchor.y - height / 2.0,
        VAlign::Baseline => anchor.y - (lh - style.font_size) / 2.0 - ASCENT * style.font_size,
    };
    Bounds::new(min_x, min_y, min_x + width, min_y + height)
}

fn opacity_attr(name: &str, color: Color) -> String {
    if color.is_opaque() {
        String::new()
    } else {
        format!(r#" {}="{:.3}""#, name, color.opacity())
    }
}

fn write_primitive(svg: &mut String, primitive: &Primitive) {
    match primitive {
        Primitive::RoundedRect {
            bounds,
            rx,
            ry,
            style,
        } => {
            let fill = match style.fill {
                Some(c) => format!(r#"fill="{}"{}"#, c, opacity_attr("fill-opacity", c)),
                None => r#"fill="none""#.to_string(),
            };
            let stroke = match style.stroke {
                Some(s) => format!(
                    r#" stroke="{}" stroke-width="{:.2}"{}"#,
                    s.color,
                    s.width,
                    opacity_attr("stroke-opacity", s.color)
                ),
                None => String::new(),
            };
            let _ = writeln!(
                svg,
                r#"<rect x="{:.2}" y="{:.2}" width="{:.2}" height="{:.2}" rx="{:.2}" ry="{:.2}" {}{}/>"#,
                bounds.min_x,
                bounds.min_y,
                bounds.width(),
                bounds.height(),
                rx,
                ry,
                fill,
                stroke,
            );
        }
        Primitive::Text {
            anchor,
            lines,
            style,
        } => {
            let lh = line_height(style.font_size);
            let baseline = first_baseline(anchor.y, lines.len(), style);
            for (i, line) in lines.iter().enumerate() {
                let _ = writeln!(
                    svg,
                    r#"<text x="{:.2}" y="{:.2}" font-family="{}" font-size="{:.2}" font-weight="{}" font-style="{}" text-anchor="{}" fill="{}" xml:space="preserve">{}</text>"#,
                    anchor.x,
                    baseline + lh * i as f32,
                    FONT_FAMILY,
                    style.font_size,
                    style.weight,
                    style.style,
                    style.halign.text_anchor(),
                    style.color,
                    escape_xml(line),
                );
            }
        }
        Primitive::Polyline { points, stroke } => {
            let coords: Vec<String> = points
                .iter()
                .map(|p| format!("{:.2},{:.2}", p.x, p.y))
                .collect();
            let _ = writeln!(
                svg,
                r#"<polyline points="{}" fill="none" stroke="{}" stroke-width="{:.2}" stroke-linecap="butt" stroke-linejoin="miter"/>"#,
                coords.join(" "),
                stroke.color,
                stroke.width,
            );
        }
    }
}
