//! Stacking order for captured units

use super::CaptureUnit;
use crate::render_tree::RenderTree;

pub const BACKGROUND_Z_INDEX: i64 = 0;

/// Offset added to the source index of every non-background unit
pub const Z_INDEX_BASE: i64 = 100;

/// The capture root itself, or a `div` tagged `background` / `bg`
pub fn is_background_layer(tree: &RenderTree, unit: &CaptureUnit) -> bool {
    if unit.node == tree.root {
        return true;
    }
    if unit.tag_name != "div" {
        return false;
    }
    tree.element(unit.node)
        .map(|el| el.class_tokens().any(|t| t == "background" || t == "bg"))
        .unwrap_or(false)
}

/// Background layer gets `0`, everything else `100 + source_index`.
///
/// Only the first background layer in document order is pinned to `0`; later
/// ones are stacked like regular units so values stay unique.
pub fn assign(tree: &RenderTree, units: &mut [CaptureUnit]) {
    let mut background_taken = false;
    for unit in units.iter_mut() {
        let background = !background_taken && is_background_layer(tree, unit);
        if background {
            background_taken = true;
            unit.is_background_layer = true;
            unit.z_index = BACKGROUND_Z_INDEX;
        } else {
            unit.z_index = Z_INDEX_BASE + unit.source_index as i64;
        }
    }
}
