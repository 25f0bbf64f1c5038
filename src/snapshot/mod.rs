//! Snapshot pipeline: rendered tree in, positioned units out.
//!
//! Stages run in a fixed order over one immutable [`RenderTree`]:
//! classification, per-unit geometry/style/attribute capture, centering,
//! stacking order, container extraction and residual filtering.

pub mod classify;
pub mod container;
pub mod filter;
pub mod geometry;
pub mod style;
pub mod zorder;

use log::info;
use serde::Serialize;

pub use container::ContainerStyle;
pub use style::{Padding, StyleRecord};

use crate::head::HeadAssets;
use crate::render_tree::{NodeId, Rect, RenderTree};
use crate::{Error, Result};
use classify::Classified;

/// One node emitted as an independently positioned element
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CaptureUnit {
    /// Source node in the rendered tree
    pub node: NodeId,
    pub tag_name: String,
    /// Box relative to the capture root's origin
    pub bounding_box: Rect,
    pub style_text: String,
    pub attributes: Vec<(String, String)>,
    pub content: String,
    pub source_index: usize,
    pub z_index: i64,
    pub is_background_layer: bool,
    pub is_image_with_container: bool,
    /// Structured computed style the unit was captured from
    #[serde(skip)]
    pub style: StyleRecord,
}

impl CaptureUnit {
    /// Resolve geometry, style and attributes for a classified node
    pub fn from_classified(tree: &RenderTree, c: Classified) -> Self {
        let (bounding_box, is_image_with_container) = geometry::resolve(tree, c.node);
        let (style_text, attributes, style) = match tree.element(c.node) {
            Some(el) => (
                style::style_text(el),
                style::capture_attributes(el),
                StyleRecord::from_element(el),
            ),
            None => (String::new(), Vec::new(), StyleRecord::default()),
        };
        Self {
            node: c.node,
            tag_name: c.tag,
            bounding_box,
            style_text,
            attributes,
            content: c.content,
            source_index: c.source_index,
            z_index: 0,
            is_background_layer: false,
            is_image_with_container,
            style,
        }
    }
}

/// Whole-page intermediate result of one conversion
#[derive(Debug, Clone, Default, Serialize)]
pub struct PageSnapshot {
    /// Capture root box in page coordinates
    pub root_box: Rect,
    /// Capture root box without its padding and borders
    pub content_box: Rect,
    /// Raw computed background of the page body
    pub body_background: String,
    pub container: Option<ContainerStyle>,
    pub units: Vec<CaptureUnit>,
    /// Zero-size SVG definition blocks, emitted verbatim
    pub svg_defs: Vec<String>,
    /// Stylesheets and title carried over from the input document
    pub head: HeadAssets,
}

impl PageSnapshot {
    /// Padding of the extracted container, zero when nothing was extracted
    pub fn container_padding(&self) -> Padding {
        self.container.as_ref().map(|c| c.padding).unwrap_or_default()
    }
}

/// Run the full pipeline over a captured tree.
///
/// Fails with [`Error::NoVisibleUnits`] when nothing survives filtering.
pub fn capture(tree: &RenderTree) -> Result<PageSnapshot> {
    let classification = classify::classify(tree);

    let mut units: Vec<CaptureUnit> = classification
        .units
        .into_iter()
        .map(|c| CaptureUnit::from_classified(tree, c))
        .collect();

    geometry::center_text_units(tree, &mut units);
    zorder::assign(tree, &mut units);

    let extraction = container::extract(tree, &units);
    filter::retain_visible(&mut units, extraction.as_ref().map(|e| e.node));

    if units.is_empty() {
        return Err(Error::NoVisibleUnits);
    }
    info!(
        "captured {} units ({} svg definition blocks, container {})",
        units.len(),
        classification.svg_defs.len(),
        if extraction.is_some() { "extracted" } else { "kept" }
    );

    Ok(PageSnapshot {
        root_box: tree.root_rect(),
        content_box: geometry::content_box(tree),
        body_background: tree.body_background.clone(),
        container: extraction.map(|e| e.style),
        units,
        svg_defs: classification.svg_defs,
        head: HeadAssets::default(),
    })
}
