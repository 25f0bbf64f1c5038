//! Container-relative geometry for captured units

use log::debug;
use std::collections::HashMap;

use super::style::{parse_px, StyleRecord};
use super::CaptureUnit;
use crate::render_tree::{NodeId, Rect, RenderTree};

/// Largest drift from a parent's center that is still snapped back onto it
pub const CENTER_SNAP_TOLERANCE: f64 = 20.0;

const TEXT_TAGS: &[&str] = &[
    "h1", "h2", "h3", "h4", "h5", "h6", "p", "span", "label", "button", "a",
];

const BLOCK_TAGS: &[&str] = &["div", "section", "article", "main"];

/// Box of `id` relative to the capture root, plus whether an image frame
/// ancestor supplied it.
///
/// Images inside an `image-container` ancestor take that ancestor's box so the
/// frame defines the visible footprint.
pub fn resolve(tree: &RenderTree, id: NodeId) -> (Rect, bool) {
    let origin = tree.root_rect();
    let Some(el) = tree.element(id) else {
        return (Rect::default(), false);
    };

    if el.tag == "img" {
        let frame = tree.ancestors(id).find_map(|a| {
            tree.element(a)
                .filter(|e| e.class_tokens().any(|t| t.contains("image-container")))
        });
        if let Some(frame) = frame {
            return (frame.rect.relative_to(&origin), true);
        }
    }

    (el.rect.relative_to(&origin), false)
}

/// Content box of the capture root: its border box minus padding and border widths
pub fn content_box(tree: &RenderTree) -> Rect {
    let root = tree.root_rect();
    let Some(el) = tree.element(tree.root) else {
        return root;
    };
    let record = StyleRecord::from_element(el);
    let padding = record.padding();
    let border = |side: &str| parse_px(&record.border(side).width).unwrap_or(0.0);
    let left = padding.left + border("left");
    let top = padding.top + border("top");
    let right = padding.right + border("right");
    let bottom = padding.bottom + border("bottom");
    Rect {
        x: root.x + left,
        y: root.y + top,
        width: (root.width - left - right).max(0.0),
        height: (root.height - top - bottom).max(0.0),
    }
}

/// Snap text units that sit almost at the center of an enclosing block unit
/// exactly onto that center.
pub fn center_text_units(tree: &RenderTree, units: &mut [CaptureUnit]) {
    let by_node: HashMap<NodeId, usize> = units.iter().enumerate().map(|(i, u)| (u.node, i)).collect();

    let mut moves = Vec::new();
    for (i, unit) in units.iter().enumerate() {
        if !TEXT_TAGS.contains(&unit.tag_name.as_str()) {
            continue;
        }
        let parent = tree.ancestors(unit.node).find_map(|a| {
            let p = &units[*by_node.get(&a)?];
            (BLOCK_TAGS.contains(&p.tag_name.as_str()) && p.bounding_box.contains(&unit.bounding_box))
                .then_some(p.bounding_box)
        });
        let Some(parent) = parent else {
            continue;
        };

        let (cx, cy) = unit.bounding_box.center();
        let (px, py) = parent.center();
        if (cx - px).abs() <= CENTER_SNAP_TOLERANCE && (cy - py).abs() <= CENTER_SNAP_TOLERANCE {
            let b = unit.bounding_box;
            moves.push((i, px - b.width / 2.0, py - b.height / 2.0));
        }
    }

    for (i, x, y) in moves {
        let unit = &mut units[i];
        if unit.bounding_box.x != x || unit.bounding_box.y != y {
            debug!(
                "centering <{}> from ({}, {}) to ({}, {})",
                unit.tag_name, unit.bounding_box.x, unit.bounding_box.y, x, y
            );
            unit.bounding_box.x = x;
            unit.bounding_box.y = y;
        }
    }
}
