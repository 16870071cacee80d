//! SVG rasterisation
//!
//! Parses SVG with `usvg`, renders it with `resvg` into a `tiny-skia`
//! pixmap and encodes PNG with the `png` crate.

use std::sync::{Arc, OnceLock};

use tracing::{debug, span, trace, Level};

use super::{Color, DiagramError};

/// Default font family used when the SVG names one that is not installed
pub const DEFAULT_FONT_FAMILY: &str = "DejaVu Sans";

const METRES_PER_INCH: f32 = 0.0254;

#[derive(Debug, Clone)]
pub struct RasterOptions {
    /// Pixels per SVG user unit
    pub scale: f32,
    /// Colour painted before the SVG content; `None` leaves the pixmap
    /// transparent
    pub background: Option<Color>,
    /// Resolution recorded in the PNG `pHYs` chunk
    pub dpi: Option<f32>,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            scale: 1.0,
            background: None,
            dpi: None,
        }
    }
}

/// System font database, loaded on first use and shared afterwards
pub fn system_fonts() -> Arc<usvg::fontdb::Database> {
    static FONTS: OnceLock<Arc<usvg::fontdb::Database>> = OnceLock::new();
    FONTS
        .get_or_init(|| {
            let mut db = usvg::fontdb::Database::new();
            db.load_system_fonts();
            trace!(faces = db.len(), "Loaded system fonts");
            Arc::new(db)
        })
        .clone()
}

/// `usvg` options over `fontdb`
pub(crate) fn parse_options(fontdb: Arc<usvg::fontdb::Database>) -> usvg::Options<'static> {
    let mut opt = usvg::Options::default();
    opt.fontdb = fontdb;
    opt.font_family = DEFAULT_FONT_FAMILY.to_string();
    opt
}

/// Render an SVG document to PNG bytes
pub fn svg_to_png(svg: &str, options: &RasterOptions) -> Result<Vec<u8>, DiagramError> {
    let pixmap = svg_to_pixmap(svg, options)?;
    encode_png(&pixmap, options.dpi)
}

/// PNG resolution unit for `dpi`
pub fn pixels_per_metre(dpi: f32) -> u32 {
    (dpi / METRES_PER_INCH).round() as u32
}

fn encode_png(pixmap: &tiny_skia::Pixmap, dpi: Option<f32>) -> Result<Vec<u8>, DiagramError> {
    let png_error = |e: png::EncodingError| DiagramError::PngEncode {
        message: e.to_string(),
    };

    // tiny-skia stores premultiplied alpha; PNG wants straight alpha
    let data: Vec<u8> = pixmap
        .pixels()
        .iter()
        .flat_map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect();

    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut out, pixmap.width(), pixmap.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        if let Some(dpi) = dpi {
            let ppm = pixels_per_metre(dpi);
            encoder.set_pixel_dims(Some(png::PixelDimensions {
                xppu: ppm,
                yppu: ppm,
                unit: png::Unit::Meter,
            }));
        }
        let mut writer = encoder.write_header().map_err(png_error)?;
        writer.write_image_data(&data).map_err(png_error)?;
        writer.finish().map_err(png_error)?;
    }
    Ok(out)
}

/// Render an SVG document to a pixmap of `ceil(size * scale)` pixels
pub fn svg_to_pixmap(svg: &str, options: &RasterOptions) -> Result<tiny_skia::Pixmap, DiagramError> {
    let raster_span = span!(
        Level::DEBUG,
        "rasterize",
        svg_len = svg.len(),
        scale = options.scale
    );
    let _enter = raster_span.enter();

    let opt = parse_options(system_fonts());
    let tree = usvg::Tree::from_str(svg, &opt).map_err(|e| DiagramError::SvgParse {
        message: e.to_string(),
    })?;

    let size = tree.size();
    let width_px = (size.width() * options.scale).ceil().max(1.0) as u32;
    let height_px = (size.height() * options.scale).ceil().max(1.0) as u32;

    let mut pixmap =
        tiny_skia::Pixmap::new(width_px, height_px).ok_or(DiagramError::PixmapAlloc {
            width: width_px,
            height: height_px,
        })?;

    if let Some(bg) = options.background {
        pixmap.fill(tiny_skia::Color::from_rgba8(bg.r, bg.g, bg.b, bg.a));
    }

    let transform = tiny_skia::Transform::from_scale(options.scale, options.scale);
    resvg::render(&tree, transform, &mut pixmap.as_mut());

    debug!(width_px, height_px, "Rasterized SVG");
    Ok(pixmap)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10" viewBox="0 0 10 10"><rect width="10" height="10" fill="black"/></svg>"#;

    #[test]
    fn svg_to_png_produces_png_signature() {
        let bytes = svg_to_png(SQUARE, &RasterOptions::default()).unwrap();
        assert!(bytes.starts_with(b"\x89PNG\r\n\x1a\n"));
    }

    #[test]
    fn svg_to_png_records_dpi() {
        let options = RasterOptions {
            scale: 150.0 / 72.0,
            background: Some(Color::WHITE),
            dpi: Some(150.0),
        };
        let bytes = svg_to_png(SQUARE, &options).unwrap();
        let decoder = png::Decoder::new(std::io::Cursor::new(bytes));
        let reader = decoder.read_info().unwrap();
        let dims = reader.info().pixel_dims.unwrap();
        assert_eq!((dims.xppu, dims.yppu), (5906, 5906));
        assert!(matches!(dims.unit, png::Unit::Meter));
        assert_eq!(reader.info().width, 21);
    }

    #[test]
    fn png_without_dpi_has_no_phys_chunk() {
        let bytes = svg_to_png(SQUARE, &RasterOptions::default()).unwrap();
        let reader = png::Decoder::new(std::io::Cursor::new(bytes))
            .read_info()
            .unwrap();
        assert!(reader.info().pixel_dims.is_none());
    }

    #[test]
    fn pixmap_size_follows_scale() {
        let options = RasterOptions {
            scale: 150.0 / 72.0,
            background: Some(Color::WHITE),
            ..RasterOptions::default()
        };
        let pixmap = svg_to_pixmap(SQUARE, &options).unwrap();
        assert_eq!(pixmap.width(), 21);
        assert_eq!(pixmap.height(), 21);
    }

    #[test]
    fn background_is_painted_under_content() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="4" height="4" viewBox="0 0 4 4"></svg>"#;
        let options = RasterOptions {
            scale: 1.0,
            background: Some(Color::WHITE),
            ..RasterOptions::default()
        };
        let pixmap = svg_to_pixmap(svg, &options).unwrap();
        let px = pixmap.pixel(1, 1).unwrap();
        assert_eq!((px.red(), px.green(), px.blue(), px.alpha()), (255, 255, 255, 255));
    }

    #[test]
    fn invalid_svg_is_an_error() {
        let err = svg_to_png("not svg", &RasterOptions::default()).unwrap_err();
        assert!(matches!(err, DiagramError::SvgParse { .. }));
    }
}
