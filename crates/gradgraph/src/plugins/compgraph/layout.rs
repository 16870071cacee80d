//! Computational graph layout implementation
//!
//! Node positions are fixed in data space. This stage maps them to figure
//! points and derives box, text, arrow, title and legend geometry.

use anyhow::Result;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, span, trace, Level};

use super::CompGraphDatabase;
use crate::core::{
    line_height, measure_block, Bounds, Color, Database, DiagramError, FontTextMeasurer,
    LayoutAlgorithm, Point, RenderConfig, SharedTextMeasurer, TextStyle,
};

/// Node box size in data units, before the rounding pad
pub const BOX_WIDTH: f32 = 1.2;
pub const BOX_HEIGHT: f32 = 0.8;
/// Rounding pad added on every side of the box; also the corner radius
pub const BOX_PAD: f32 = 0.1;
/// Label center sits this far above the node center
pub const LABEL_OFFSET: f32 = 0.15;
/// Top of the property text sits this far below the node center
pub const PROPS_OFFSET: f32 = 0.25;
/// Horizontal distance from a node center to an arrow endpoint
pub const ARROW_INSET: f32 = 0.6;
/// Title anchor (top center) in data units
pub const TITLE_ANCHOR: Point = Point::new(5.0, 9.5);

pub const LABEL_FONT_SIZE: f32 = 9.0;
pub const PROPS_FONT_SIZE: f32 = 7.0;
pub const TITLE_FONT_SIZE: f32 = 14.0;
pub const LEGEND_FONT_SIZE: f32 = 10.0;

/// Legend spacing in points
const LEGEND_INSET: f32 = 5.0;
const LEGEND_BORDER_PAD: f32 = 4.0;
const LEGEND_HANDLE_WIDTH: f32 = 20.0;
const LEGEND_HANDLE_HEIGHT: f32 = 7.0;
const LEGEND_TEXT_PAD: f32 = 8.0;
const LEGEND_ROW_GAP: f32 = 5.0;

pub const LEAF_LEGEND_LABEL: &str = "Leaf Tensor";
pub const NON_LEAF_LEGEND_LABEL: &str = "Non-leaf Tensor";

/// A node box with its text, in figure points
#[derive(Debug, Clone)]
pub struct PositionedNode {
    pub id: String,
    /// Outer box including the rounding pad
    pub bounds: Bounds,
    pub corner_rx: f32,
    pub corner_ry: f32,
    pub fill: Color,
    /// Center of the label block
    pub label_anchor: Point,
    pub label_lines: Vec<String>,
    /// Top center of the property block
    pub props_anchor: Point,
    pub props_lines: Vec<String>,
}

/// An arrow between two nodes, in figure points
#[derive(Debug, Clone)]
pub struct PositionedEdge {
    pub from_id: String,
    pub to_id: String,
    pub start: Point,
    pub end: Point,
}

#[derive(Debug, Clone)]
pub struct PositionedTitle {
    /// Top center of the title
    pub anchor: Point,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct LegendEntry {
    pub swatch: Bounds,
    pub color: Color,
    /// Left end of the label, vertically centered on the swatch
    pub label_anchor: Point,
    pub label: String,
}

#[derive(Debug, Clone)]
pub struct LegendLayout {
    pub frame: Bounds,
    pub entries: Vec<LegendEntry>,
}

/// Layout output containing positioned elements
#[derive(Debug)]
pub struct CompGraphLayoutResult {
    pub nodes: Vec<PositionedNode>,
    pub edges: Vec<PositionedEdge>,
    pub title: Option<PositionedTitle>,
    pub legend: LegendLayout,
}

/// Fixed-position layout for computational graphs
pub struct CompGraphLayoutAlgorithm {
    config: RenderConfig,
    measurer: SharedTextMeasurer,
}

impl CompGraphLayoutAlgorithm {
    pub fn new() -> Self {
        Self::with_config(RenderConfig::default())
    }

    pub fn with_config(config: RenderConfig) -> Self {
        Self {
            config,
            measurer: Arc::new(FontTextMeasurer::system()),
        }
    }

    /// Size legend text with `measurer` instead of the system fonts
    pub fn with_measurer(mut self, measurer: SharedTextMeasurer) -> Self {
        self.measurer = measurer;
        self
    }

    fn data_rect(&self, center: Point, width: f32, height: f32) -> Bounds {
        let top_left = self
            .config
            .to_figure(center.offset(-width / 2.0, height / 2.0));
        let bottom_right = self
            .config
            .to_figure(center.offset(width / 2.0, -height / 2.0));
        Bounds::new(top_left.x, top_left.y, bottom_right.x, bottom_right.y)
    }

    fn legend(&self) -> LegendLayout {
        let labels = [LEAF_LEGEND_LABEL, NON_LEAF_LEGEND_LABEL];
        let colors = [self.config.leaf_color, self.config.non_leaf_color];

        let (text_width, _) = measure_block(
            self.measurer.as_ref(),
            &labels,
            &TextStyle::new(LEGEND_FONT_SIZE),
        );
        let row_height = line_height(LEGEND_FONT_SIZE);
        let width = 2.0 * LEGEND_BORDER_PAD + LEGEND_HANDLE_WIDTH + LEGEND_TEXT_PAD + text_width;
        let rows = labels.len() as f32;
        let height = 2.0 * LEGEND_BORDER_PAD + rows * row_height + (rows - 1.0) * LEGEND_ROW_GAP;

        let max_x = self.config.figure_width_pt() - LEGEND_INSET;
        let min_y = LEGEND_INSET;
        let frame = Bounds::new(max_x - width, min_y, max_x, min_y + height);

        let entries = labels
            .iter()
            .zip(colors)
            .enumerate()
            .map(|(i, (label, color))| {
                let row_center = frame.min_y
                    + LEGEND_BORDER_PAD
                    + row_height / 2.0
                    + i as f32 * (row_height + LEGEND_ROW_GAP);
                let swatch_x = frame.min_x + LEGEND_BORDER_PAD;
                let swatch = Bounds::new(
                    swatch_x,
                    row_center - LEGEND_HANDLE_HEIGHT / 2.0,
                    swatch_x + LEGEND_HANDLE_WIDTH,
                    row_center + LEGEND_HANDLE_HEIGHT / 2.0,
                );
                LegendEntry {
                    swatch,
                    color,
                    label_anchor: Point::new(swatch.max_x + LEGEND_TEXT_PAD, row_center),
                    label: label.to_string(),
                }
            })
            .collect();

        LegendLayout { frame, entries }
    }
}

impl Default for CompGraphLayoutAlgorithm {
    fn default() -> Self {
        Self::new()
    }
}

impl LayoutAlgorithm<CompGraphDatabase> for CompGraphLayoutAlgorithm {
    type Output = CompGraphLayoutResult;

    fn layout(&self, database: &CompGraphDatabase) -> Result<Self::Output> {
        let layout_span = span!(
            Level::INFO,
            "layout_compgraph",
            node_count = database.node_count(),
            edge_count = database.edge_count()
        );
        let _enter = layout_span.enter();

        trace!("Starting computational graph layout");

        let config = &self.config;
        let mut centers: HashMap<&str, Point> = HashMap::new();
        let mut nodes = Vec::with_capacity(database.node_count());

        for node in database.nodes() {
            let c = node.position;
            centers.insert(node.id.as_str(), c);

            let bounds = self.data_rect(
                c,
                BOX_WIDTH + 2.0 * BOX_PAD,
                BOX_HEIGHT + 2.0 * BOX_PAD,
            );
            nodes.push(PositionedNode {
                id: node.id.clone(),
                bounds,
                corner_rx: BOX_PAD * config.x_scale(),
                corner_ry: BOX_PAD * config.y_scale(),
                fill: config.node_color(&node.flags),
                label_anchor: config.to_figure(c.offset(0.0, LABEL_OFFSET)),
                label_lines: node.label_lines().into_iter().map(String::from).collect(),
                props_anchor: config.to_figure(c.offset(0.0, -PROPS_OFFSET)),
                props_lines: node.flags.annotation_lines().to_vec(),
            });
            trace!(node_id = %node.id, ?bounds, "Positioned node");
        }

        let mut edges = Vec::with_capacity(database.edge_count());
        for edge in database.edges() {
            let from = centers
                .get(edge.from.as_str())
                .ok_or_else(|| DiagramError::unknown_node(edge.from.as_str()))?;
            let to = centers
                .get(edge.to.as_str())
                .ok_or_else(|| DiagramError::unknown_node(edge.to.as_str()))?;
            edges.push(PositionedEdge {
                from_id: edge.from.clone(),
                to_id: edge.to.clone(),
                start: config.to_figure(from.offset(ARROW_INSET, 0.0)),
                end: config.to_figure(to.offset(-ARROW_INSET, 0.0)),
            });
        }

        let title = database.title().map(|text| PositionedTitle {
            anchor: config.to_figure(TITLE_ANCHOR),
            text: text.to_string(),
        });

        let legend = self.legend();

        info!(
            node_count = nodes.len(),
            edge_count = edges.len(),
            has_title = title.is_some(),
            "Computational graph layout completed"
        );

        Ok(CompGraphLayoutResult {
            nodes,
            edges,
            title,
            legend,
        })
    }

    fn name(&self) -> &'static str {
        "compgraph"
    }

    fn version(&self) -> &'static str {
        "0.1.0"
    }
}
