//! Core type definitions for diagram rendering
//!
//! Geometry, colours, text styling, tensor flags and the render
//! configuration shared by every stage.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Points per inch in figure space
pub const POINTS_PER_INCH: f32 = 72.0;

/// A 2D point
///
/// Used both for data-space coordinates (y up) and for figure coordinates
/// in points (y down); the layout stage converts between the two.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Offset this point by `dx`, `dy`
    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Euclidean distance to another point
    pub fn distance(self, other: Point) -> f32 {
        ((other.x - self.x).powi(2) + (other.y - self.y).powi(2)).sqrt()
    }
}

/// Axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Bounds {
    pub fn new(min_x: f32, min_y: f32, max_x: f32, max_y: f32) -> Self {
        Self {
            min_x: min_x.min(max_x),
            min_y: min_y.min(max_y),
            max_x: min_x.max(max_x),
            max_y: min_y.max(max_y),
        }
    }

    /// Bounds covering a single point
    pub fn from_point(p: Point) -> Self {
        Self::new(p.x, p.y, p.x, p.y)
    }

    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> Point {
        Point::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    /// Grow left/right by `dx` and top/bottom by `dy`
    pub fn inflate(&self, dx: f32, dy: f32) -> Self {
        Self::new(
            self.min_x - dx,
            self.min_y - dy,
            self.max_x + dx,
            self.max_y + dy,
        )
    }

    /// Smallest bounds containing both
    pub fn union(&self, other: &Bounds) -> Self {
        Self::new(
            self.min_x.min(other.min_x),
            self.min_y.min(other.min_y),
            self.max_x.max(other.max_x),
            self.max_y.max(other.max_y),
        )
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }
}

/// RGBA colour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(0xFF, 0xFF, 0xFF);
    pub const BLACK: Color = Color::rgb(0x00, 0x00, 0x00);
    pub const TRANSPARENT: Color = Color::rgba(0, 0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xFF }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `white`, `black`, `transparent`, `#rgb`, `#rgba`, `#rrggbb` or
    /// `#rrggbbaa`
    pub fn parse(text: &str) -> Option<Self> {
        let s = text.trim().to_ascii_lowercase();
        match s.as_str() {
            "transparent" => return Some(Self::TRANSPARENT),
            "white" => return Some(Self::WHITE),
            "black" => return Some(Self::BLACK),
            _ => {}
        }

        let hex = s.strip_prefix('#')?;
        fn hex2(b: &[u8]) -> Option<u8> {
            let hi = (*b.first()? as char).to_digit(16)? as u8;
            let lo = (*b.get(1)? as char).to_digit(16)? as u8;
            Some((hi << 4) | lo)
        }
        fn hex1(c: u8) -> Option<u8> {
            let v = (c as char).to_digit(16)? as u8;
            Some((v << 4) | v)
        }

        let bytes = hex.as_bytes();
        match bytes.len() {
            3 => Some(Self::rgb(
                hex1(bytes[0])?,
                hex1(bytes[1])?,
                hex1(bytes[2])?,
            )),
            4 => Some(Self::rgba(
                hex1(bytes[0])?,
                hex1(bytes[1])?,
                hex1(bytes[2])?,
                hex1(bytes[3])?,
            )),
            6 => Some(Self::rgb(
                hex2(&bytes[0..2])?,
                hex2(&bytes[2..4])?,
                hex2(&bytes[4..6])?,
            )),
            8 => Some(Self::rgba(
                hex2(&bytes[0..2])?,
                hex2(&bytes[2..4])?,
                hex2(&bytes[4..6])?,
                hex2(&bytes[6..8])?,
            )),
            _ => None,
        }
    }

    pub fn is_opaque(&self) -> bool {
        self.a == 0xFF
    }

    /// Alpha as a fraction in `0.0..=1.0`
    pub fn opacity(&self) -> f32 {
        f32::from(self.a) / 255.0
    }
}

impl fmt::Display for Color {
    /// Formats as `#RRGGBB`; alpha is emitted separately as SVG opacity
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// Horizontal text alignment relative to the anchor point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum HAlign {
    Left,
    #[default]
    Center,
    Right,
}

impl HAlign {
    /// SVG `text-anchor` value
    pub fn text_anchor(&self) -> &'static str {
        match self {
            HAlign::Left => "start",
            HAlign::Center => "middle",
            HAlign::Right => "end",
        }
    }
}

/// Vertical text alignment relative to the anchor point
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum VAlign {
    /// Anchor is the top of the first line
    Top,
    /// Anchor is the middle of the text block
    #[default]
    Center,
    /// Anchor is the baseline of the first line
    Baseline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

impl fmt::Display for FontWeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FontWeight::Normal => write!(f, "normal"),
            FontWeight::Bold => write!(f, "bold"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
}

impl fmt::Display for FontStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FontStyle::Normal => write!(f, "normal"),
            FontStyle::Italic => write!(f, "italic"),
        }
    }
}

/// Autograd attributes shown on each tensor node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub struct TensorFlags {
    pub is_leaf: bool,
    pub requires_grad: bool,
    pub retains_grad: bool,
}

impl TensorFlags {
    /// User-created tensor
    pub const fn leaf(requires_grad: bool) -> Self {
        Self {
            is_leaf: true,
            requires_grad,
            retains_grad: false,
        }
    }

    /// Tensor produced by an operation
    pub const fn non_leaf(retains_grad: bool) -> Self {
        Self {
            is_leaf: false,
            requires_grad: true,
            retains_grad,
        }
    }

    /// The three annotation lines drawn under a node label
    ///
    /// Booleans are capitalised the way the tutorial's code listings print
    /// them.
    pub fn annotation_lines(&self) -> [String; 3] {
        [
            format!("is_leaf = {}", display_bool(self.is_leaf)),
            format!("requires_grad = {}", display_bool(self.requires_grad)),
            format!("retains_grad = {}", display_bool(self.retains_grad)),
        ]
    }
}

fn display_bool(value: bool) -> &'static str {
    if value {
        "True"
    } else {
        "False"
    }
}

/// Fixed rendering parameters
///
/// Figure dimensions are in inches; everything drawn on the canvas is
/// measured in points (1/72 inch).
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    pub figure_width_in: f32,
    pub figure_height_in: f32,
    pub dpi: f32,
    /// Data-space extent on both axes, from 0
    pub data_extent: f32,
    pub leaf_color: Color,
    pub non_leaf_color: Color,
    pub background: Color,
    /// Padding around the tight bounding box
    pub pad_inches: f32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            figure_width_in: 12.0,
            figure_height_in: 8.0,
            dpi: 150.0,
            data_extent: 10.0,
            leaf_color: Color::rgb(0xE8, 0xF4, 0xF8),
            non_leaf_color: Color::rgb(0xFF, 0xF4, 0xE6),
            background: Color::WHITE,
            pad_inches: 0.1,
        }
    }
}

impl RenderConfig {
    pub fn figure_width_pt(&self) -> f32 {
        self.figure_width_in * POINTS_PER_INCH
    }

    pub fn figure_height_pt(&self) -> f32 {
        self.figure_height_in * POINTS_PER_INCH
    }

    /// Raster scale from points to pixels
    pub fn raster_scale(&self) -> f32 {
        self.dpi / POINTS_PER_INCH
    }

    pub fn pad_pt(&self) -> f32 {
        self.pad_inches * POINTS_PER_INCH
    }

    /// Points per data unit along x
    pub fn x_scale(&self) -> f32 {
        self.figure_width_pt() / self.data_extent
    }

    /// Points per data unit along y
    pub fn y_scale(&self) -> f32 {
        self.figure_height_pt() / self.data_extent
    }

    /// Convert a data-space point (y up) to figure points (y down)
    pub fn to_figure(&self, p: Point) -> Point {
        Point::new(
            p.x * self.x_scale(),
            self.figure_height_pt() - p.y * self.y_scale(),
        )
    }

    /// Fill colour for a node
    pub fn node_color(&self, flags: &TensorFlags) -> Color {
        if flags.is_leaf {
            self.leaf_color
        } else {
            self.non_leaf_color
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_parse_forms() {
        assert_eq!(Color::parse("white"), Some(Color::WHITE));
        assert_eq!(Color::parse(" Black "), Some(Color::BLACK));
        assert_eq!(Color::parse("#E8F4F8"), Some(Color::rgb(0xE8, 0xF4, 0xF8)));
        assert_eq!(Color::parse("#fff"), Some(Color::WHITE));
        assert_eq!(Color::parse("#0008"), Some(Color::rgba(0, 0, 0, 0x88)));
        assert_eq!(
            Color::parse("#11223344"),
            Some(Color::rgba(0x11, 0x22, 0x33, 0x44))
        );
        assert_eq!(Color::parse("#12345"), None);
        assert_eq!(Color::parse("#gg0000"), None);
        assert_eq!(Color::parse("teal"), None);
    }

    #[test]
    fn test_color_display() {
        assert_eq!(Color::rgb(0xFF, 0xF4, 0xE6).to_string(), "#FFF4E6");
        assert_eq!(Color::TRANSPARENT.to_string(), "#000000");
        assert!(!Color::TRANSPARENT.is_opaque());
    }

    #[test]
    fn test_bounds_normalizes_and_unions() {
        let a = Bounds::new(4.0, 3.0, 1.0, 0.0);
        assert_eq!(a.min_x, 1.0);
        assert_eq!(a.max_y, 3.0);

        let b = Bounds::new(9.0, 8.0, 11.0, 12.0);
        let u = a.union(&b);
        assert_eq!(u, Bounds::new(1.0, 0.0, 11.0, 12.0));
        assert!(u.contains(Point::new(5.0, 5.0)));
        assert!(!u.contains(Point::new(0.0, 5.0)));
    }

    #[test]
    fn test_flags_annotation_lines() {
        let lines = TensorFlags::non_leaf(true).annotation_lines();
        assert_eq!(lines[0], "is_leaf = False");
        assert_eq!(lines[1], "requires_grad = True");
        assert_eq!(lines[2], "retains_grad = True");

        let leaf = TensorFlags::leaf(false);
        assert!(leaf.is_leaf);
        assert!(!leaf.requires_grad);
        assert!(!leaf.retains_grad);
    }

    #[test]
    fn test_config_defaults() {
        let config = RenderConfig::default();
        assert_eq!(config.figure_width_pt(), 864.0);
        assert_eq!(config.figure_height_pt(), 576.0);
        assert!((config.raster_scale() - 150.0 / 72.0).abs() < 1e-6);
        assert!((config.pad_pt() - 7.2).abs() < 1e-4);
    }

    #[test]
    fn test_to_figure_flips_y() {
        let config = RenderConfig::default();
        assert_eq!(config.to_figure(Point::new(0.0, 0.0)), Point::new(0.0, 576.0));
        assert_eq!(config.to_figure(Point::new(10.0, 10.0)), Point::new(864.0, 0.0));
        let mid = config.to_figure(Point::new(5.0, 5.0));
        assert!((mid.x - 432.0).abs() < 1e-3);
        assert!((mid.y - 288.0).abs() < 1e-3);
    }

    #[test]
    fn test_node_color_follows_leaf_flag() {
        let config = RenderConfig::default();
        assert_eq!(config.node_color(&TensorFlags::leaf(true)), config.leaf_color);
        assert_eq!(
            config.node_color(&TensorFlags::non_leaf(false)),
            config.non_leaf_color
        );
    }
}
