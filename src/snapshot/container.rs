//! Full-bleed wrapper detection and background extraction.
//!
//! Pages often wrap everything in one container whose only job is to paint
//! the slide background. Such a unit is lifted out of the unit list and its
//! background, padding, radius and shadow are applied to the page wrapper
//! instead.

use log::{info, warn};
use serde::Serialize;

use super::style::Padding;
use super::CaptureUnit;
use crate::render_tree::{NodeId, Rect, RenderTree};

/// Absolute size that always counts as full-bleed
pub const FULL_BLEED_MIN_WIDTH: f64 = 1900.0;
pub const FULL_BLEED_MIN_HEIGHT: f64 = 1000.0;

/// Distance from the origin still considered "at the origin"
pub const ORIGIN_TOLERANCE: f64 = 10.0;

/// Fraction of the root width a wrapper at the origin must span
pub const ROOT_WIDTH_RATIO: f64 = 0.95;

/// Slack around a candidate when looking for background-bearing panels
pub const PANEL_TOLERANCE: f64 = 50.0;

/// Page-level styling lifted from the extracted wrapper
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ContainerStyle {
    pub background: String,
    pub padding: Padding,
    pub border_radius: String,
    pub box_shadow: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    /// Source node of the unit to drop
    pub node: NodeId,
    pub style: ContainerStyle,
}

pub fn is_full_bleed(b: &Rect, root: &Rect) -> bool {
    let large = b.width >= FULL_BLEED_MIN_WIDTH && b.height >= FULL_BLEED_MIN_HEIGHT;
    let at_origin = b.x.abs() <= ORIGIN_TOLERANCE
        && b.y.abs() <= ORIGIN_TOLERANCE
        && b.width >= root.width * ROOT_WIDTH_RATIO;
    large || at_origin
}

/// A unit with its own background lies inside the candidate
fn covers_panel(candidate: &CaptureUnit, units: &[CaptureUnit]) -> bool {
    let bounds = candidate.bounding_box.inflate(PANEL_TOLERANCE);
    units.iter().any(|u| {
        u.node != candidate.node && u.style.has_background() && bounds.contains(&u.bounding_box)
    })
}

/// Pick the wrapper to extract, if any.
///
/// Candidates covering another background-bearing unit, or painting a
/// pseudo-element background, are kept as regular units. Among the safe
/// ones the largest wins; ties go to the earliest in document order.
pub fn extract(tree: &RenderTree, units: &[CaptureUnit]) -> Option<Extraction> {
    let root = tree.root_rect();
    let mut best: Option<&CaptureUnit> = None;

    for candidate in units {
        if candidate.tag_name != "div" || !is_full_bleed(&candidate.bounding_box, &root) {
            continue;
        }
        if covers_panel(candidate, units) {
            warn!(
                "keeping full-bleed <div> #{}: it contains a panel with its own background",
                candidate.source_index
            );
            continue;
        }
        if tree.element(candidate.node).map(|e| e.pseudo_background).unwrap_or(false) {
            warn!(
                "keeping full-bleed <div> #{}: ::before/::after paints a background",
                candidate.source_index
            );
            continue;
        }
        let larger = best
            .map(|b| candidate.bounding_box.area() > b.bounding_box.area())
            .unwrap_or(true);
        if larger {
            best = Some(candidate);
        }
    }

    best.map(|unit| {
        info!("extracting full-bleed <div> #{} as page container", unit.source_index);
        Extraction {
            node: unit.node,
            style: ContainerStyle {
                background: unit.style.background(),
                padding: unit.style.padding(),
                border_radius: unit.style.border_radius().to_string(),
                box_shadow: unit.style.box_shadow().to_string(),
            },
        }
    })
}
