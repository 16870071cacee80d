//! SVG and PNG rendering for computational graphs
//!
//! Draws the positioned elements onto an [`SvgCanvas`] in stacking order:
//! node boxes, arrows, node text, title, legend.

use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info, span, trace, Level};

use super::layout::{
    CompGraphLayoutAlgorithm, CompGraphLayoutResult, LegendLayout, LABEL_FONT_SIZE,
    LEGEND_FONT_SIZE, PROPS_FONT_SIZE, TITLE_FONT_SIZE,
};
use super::CompGraphDatabase;
use crate::core::{
    svg_to_png, ArrowStyle, Color, Database, FontTextMeasurer, HAlign, LayoutAlgorithm,
    RasterOptions, RenderConfig, Renderer, ShapeStyle, SharedTextMeasurer, Stroke, SvgCanvas,
    TextStyle, VAlign,
};

const BOX_STROKE_WIDTH: f32 = 2.0;
const LEGEND_FRAME_COLOR: Color = Color::rgb(0xCC, 0xCC, 0xCC);
const LEGEND_FRAME_FILL: Color = Color::rgba(0xFF, 0xFF, 0xFF, 0xCC);
const LEGEND_CORNER_RADIUS: f32 = 2.0;

/// Computational graph renderer producing SVG text
pub struct CompGraphRenderer {
    config: RenderConfig,
    measurer: SharedTextMeasurer,
}

impl CompGraphRenderer {
    pub fn new() -> Self {
        Self::with_config(RenderConfig::default())
    }

    pub fn with_config(config: RenderConfig) -> Self {
        Self {
            config,
            measurer: Arc::new(FontTextMeasurer::system()),
        }
    }

    /// Size text with `measurer` instead of the system fonts
    pub fn with_measurer(mut self, measurer: SharedTextMeasurer) -> Self {
        self.measurer = measurer;
        self
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Lay out and draw `database` onto a fresh canvas
    pub fn draw(&self, database: &CompGraphDatabase) -> Result<SvgCanvas> {
        let layout_algo = CompGraphLayoutAlgorithm::with_config(self.config.clone())
            .with_measurer(Arc::clone(&self.measurer));
        let layout = layout_algo.layout(database)?;

        let mut canvas = SvgCanvas::with_measurer(Arc::clone(&self.measurer));
        self.draw_layout(&mut canvas, &layout);
        Ok(canvas)
    }

    /// Render to PNG bytes at the configured DPI
    pub fn render_png(&self, database: &CompGraphDatabase) -> Result<Vec<u8>> {
        let svg = self.render(database)?;
        let options = RasterOptions {
            scale: self.config.raster_scale(),
            background: Some(self.config.background),
            dpi: Some(self.config.dpi),
        };
        let png = svg_to_png(&svg, &options)?;
        debug!(png_len = png.len(), dpi = self.config.dpi, "Encoded PNG");
        Ok(png)
    }

    fn draw_layout(&self, canvas: &mut SvgCanvas, layout: &CompGraphLayoutResult) {
        let outline = Stroke::new(Color::BLACK, BOX_STROKE_WIDTH);
        for node in &layout.nodes {
            canvas.draw_rounded_rect(
                node.bounds,
                node.corner_rx,
                node.corner_ry,
                ShapeStyle::filled(node.fill, outline),
            );
        }

        for edge in &layout.edges {
            trace!(from = %edge.from_id, to = %edge.to_id, "Drawing arrow");
            canvas.draw_arrow(edge.start, edge.end, ArrowStyle::default());
        }

        let label_style = TextStyle::new(LABEL_FONT_SIZE)
            .bold()
            .aligned(HAlign::Center, VAlign::Center);
        let props_style = TextStyle::new(PROPS_FONT_SIZE)
            .italic()
            .aligned(HAlign::Center, VAlign::Top);
        for node in &layout.nodes {
            canvas.draw_text(node.label_anchor, node.label_lines.as_slice(), label_style);
            canvas.draw_text(node.props_anchor, node.props_lines.as_slice(), props_style);
        }

        if let Some(title) = &layout.title {
            canvas.draw_text(
                title.anchor,
                &[title.text.as_str()],
                TextStyle::new(TITLE_FONT_SIZE)
                    .bold()
                    .aligned(HAlign::Center, VAlign::Top),
            );
        }

        self.draw_legend(canvas, &layout.legend);
    }

    fn draw_legend(&self, canvas: &mut SvgCanvas, legend: &LegendLayout) {
        canvas.draw_rounded_rect(
            legend.frame,
            LEGEND_CORNER_RADIUS,
            LEGEND_CORNER_RADIUS,
            ShapeStyle::filled(LEGEND_FRAME_FILL, Stroke::new(LEGEND_FRAME_COLOR, 1.0)),
        );
        let text_style = TextStyle::new(LEGEND_FONT_SIZE).aligned(HAlign::Left, VAlign::Center);
        for entry in &legend.entries {
            canvas.draw_rect(
                entry.swatch,
                ShapeStyle::filled(entry.color, Stroke::new(Color::BLACK, 0.5)),
            );
            canvas.draw_text(entry.label_anchor, &[entry.label.as_str()], text_style);
        }
    }
}

impl Default for CompGraphRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer<CompGraphDatabase> for CompGraphRenderer {
    type Output = String;

    fn render(&self, database: &CompGraphDatabase) -> Result<Self::Output> {
        let render_span = span!(
            Level::INFO,
            "render_compgraph",
            title = database.title().unwrap_or_default(),
            node_count = database.node_count(),
            edge_count = database.edge_count()
        );
        let _enter = render_span.enter();

        trace!("Starting computational graph rendering");

        let canvas = self.draw(database)?;
        let svg = canvas.to_svg(self.config.pad_pt(), Some(self.config.background));

        info!(
            svg_len = svg.len(),
            primitive_count = canvas.primitives().len(),
            "Computational graph rendering completed"
        );
        Ok(svg)
    }

    fn name(&self) -> &'static str {
        "svg"
    }

    fn version(&self) -> &'static str {
        "0.1.0"
    }

    fn format(&self) -> &'static str {
        "svg"
    }
}
