//! Residual wrapper removal

use log::debug;

use super::CaptureUnit;
use crate::render_tree::NodeId;

/// A `div` that paints nothing and holds no content of its own
fn is_empty_wrapper(unit: &CaptureUnit) -> bool {
    unit.content.trim().is_empty()
        && !unit.style.has_background()
        && !unit.style.has_visible_border()
        && !unit.style.has_box_shadow()
}

/// Drop the extracted container and empty, undecorated `div` units.
/// Units of any other tag are always kept.
pub fn retain_visible(units: &mut Vec<CaptureUnit>, extracted: Option<NodeId>) {
    units.retain(|unit| {
        if unit.tag_name != "div" {
            return true;
        }
        let drop = Some(unit.node) == extracted || is_empty_wrapper(unit);
        if drop {
            debug!("dropping wrapper <div> #{}", unit.source_index);
        }
        !drop
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render_tree::{Rect, RenderTree};
    use crate::snapshot::classify::classify;

    #[test]
    fn keeps_decorated_divs_and_non_divs() {
        let mut b = RenderTree::builder(Rect::new(0.0, 0.0, 1920.0, 1080.0));
        let root = b.root();
        let empty = b.element(root, "div", Rect::new(0.0, 0.0, 100.0, 100.0));
        let shadowed = b.element(root, "div", Rect::new(0.0, 0.0, 100.0, 100.0));
        b.style(shadowed, "box-shadow", "rgba(0, 0, 0, 0.2) 0px 4px 8px 0px");
        let bordered = b.element(root, "div", Rect::new(0.0, 0.0, 100.0, 100.0));
        b.style(bordered, "border-bottom-width", "1px")
            .style(bordered, "border-bottom-style", "solid")
            .style(bordered, "border-bottom-color", "rgb(0, 0, 0)");
        let texted = b.element(root, "div", Rect::new(0.0, 0.0, 100.0, 100.0));
        b.text(texted, "label");
        let filled = b.element(root, "div", Rect::new(0.0, 0.0, 100.0, 100.0));
        b.style(filled, "background-color", "rgb(1, 1, 1)");
        let rule = b.element(root, "hr", Rect::new(0.0, 0.0, 100.0, 1.0));
        let tree = b.build();

        let mut units: Vec<CaptureUnit> = classify(&tree)
            .units
            .into_iter()
            .map(|c| CaptureUnit::from_classified(&tree, c))
            .collect();
        retain_visible(&mut units, Some(filled));

        let kept: Vec<NodeId> = units.iter().map(|u| u.node).collect();
        assert!(!kept.contains(&empty));
        assert!(!kept.contains(&filled));
        assert_eq!(kept, vec![shadowed, bordered, texted, rule]);
    }
}
