//! Canonical document emission.
//!
//! The output is a fixed 1920x1080 frame holding a content wrapper sized to
//! the captured root's content box. The wrapper is centered and uniformly scaled at runtime;
//! every unit inside it is absolutely positioned.

use crate::markup;
use crate::snapshot::classify::is_void_unit;
use crate::snapshot::style::{is_transparent, parse_declarations};
use crate::snapshot::{CaptureUnit, ContainerStyle, Padding, PageSnapshot};

pub const CANVAS_WIDTH: f64 = 1920.0;
pub const CANVAS_HEIGHT: f64 = 1080.0;

/// Class of the element whose children are the positioned units
pub const CONTENT_WRAPPER_CLASS: &str = "content-wrapper";

/// Declarations recomputed for images
const IMAGE_OVERRIDES: &[&str] = &["width", "height", "object-fit"];

/// Captured boxes already include these, so they must not be applied again
const TRANSFORM_PROPERTIES: &[&str] = &["transform", "translate", "rotate", "scale"];

fn px(value: f64) -> String {
    format!("{}px", value)
}

/// Style attribute for one unit: captured declarations minus the ones the
/// emitter owns, then absolute placement and the computed z-index.
///
/// The placed box is the captured border box, so units are emitted with
/// `box-sizing: border-box` and without margins.
fn unit_style(unit: &CaptureUnit, padding: &Padding) -> String {
    let is_image = unit.tag_name == "img";
    let mut decls: Vec<String> = parse_declarations(&unit.style_text)
        .into_iter()
        .filter(|(name, _)| name != "z-index" && !TRANSFORM_PROPERTIES.contains(&name.as_str()))
        .filter(|(name, _)| !(is_image && IMAGE_OVERRIDES.contains(&name.as_str())))
        .map(|(name, value)| format!("{}: {}", name, value))
        .collect();

    let b = &unit.bounding_box;
    decls.push("position: absolute".to_string());
    decls.push("box-sizing: border-box".to_string());
    decls.push("margin: 0".to_string());
    decls.push(format!("left: {}", px(b.x - padding.left)));
    decls.push(format!("top: {}", px(b.y - padding.top)));
    decls.push(format!("width: {}", px(b.width)));
    decls.push(format!("height: {}", px(b.height)));
    decls.push(format!("z-index: {}", unit.z_index));
    if is_image {
        decls.push("object-fit: cover".to_string());
    }
    decls.join("; ")
}

fn unit_markup(unit: &CaptureUnit, padding: &Padding) -> String {
    let style = unit_style(unit, padding);
    let attrs = unit
        .attributes
        .iter()
        .filter(|(name, _)| name != "style")
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .chain(std::iter::once(("style", style.as_str())));

    let mut out = String::new();
    out.push('<');
    out.push_str(&unit.tag_name);
    markup::push_attrs(&mut out, attrs);

    if is_void_unit(&unit.tag_name) && markup::is_void(&unit.tag_name) {
        out.push_str(" />");
    } else if is_void_unit(&unit.tag_name) {
        out.push('>');
        markup::close_tag(&mut out, &unit.tag_name);
    } else {
        out.push('>');
        out.push_str(&unit.content);
        markup::close_tag(&mut out, &unit.tag_name);
    }
    out
}

fn container_declarations(container: &ContainerStyle) -> String {
    let mut decls = Vec::new();
    if !container.background.is_empty() {
        decls.push(format!("background: {};", container.background));
    }
    let p = &container.padding;
    decls.push(format!(
        "padding: {} {} {} {};",
        px(p.top),
        px(p.right),
        px(p.bottom),
        px(p.left)
    ));
    if !container.border_radius.is_empty() && container.border_radius != "0px" {
        decls.push(format!("border-radius: {};", container.border_radius));
    }
    if !container.box_shadow.is_empty() && container.box_shadow != "none" {
        decls.push(format!("box-shadow: {};", container.box_shadow));
    }
    decls.join(" ")
}

/// Serialize a snapshot into the canonical fixed-size document
pub fn emit_document(snapshot: &PageSnapshot) -> String {
    let width = snapshot.content_box.width;
    let height = snapshot.content_box.height;
    let padding = snapshot.container_padding();

    let mut units: Vec<&CaptureUnit> = snapshot.units.iter().collect();
    units.sort_by_key(|u| u.source_index);

    let mut doc = String::new();
    doc.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    doc.push_str("<meta charset=\"UTF-8\">\n");
    doc.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
    if let Some(title) = &snapshot.head.title {
        doc.push_str(&format!("<title>{}</title>\n", markup::escape_text(title)));
    }
    for sheet in &snapshot.head.stylesheets {
        doc.push_str(sheet);
        doc.push('\n');
    }

    doc.push_str("<style>\n");
    doc.push_str("html, body { margin: 0; }\n");
    if is_transparent(&snapshot.body_background) {
        doc.push_str("body { padding: 2rem; }\n");
    } else {
        doc.push_str(&format!(
            "body {{ padding: 2rem; background: {}; }}\n",
            snapshot.body_background
        ));
    }
    doc.push_str(&format!(
        ".outer-wrapper {{ position: relative; width: {}; height: {}; overflow: hidden; }}\n",
        px(CANVAS_WIDTH),
        px(CANVAS_HEIGHT)
    ));
    doc.push_str(&format!(
        ".{} {{ position: absolute; left: 50%; top: 50%; width: {}; height: {}; box-sizing: border-box; \
transform: translate(-50%, -50%) scale(var(--scale, 1)); transform-origin: center center; {}}}\n",
        CONTENT_WRAPPER_CLASS,
        px(width),
        px(height),
        snapshot
            .container
            .as_ref()
            .map(|c| format!("{} ", container_declarations(c)))
            .unwrap_or_default()
    ));
    doc.push_str("</style>\n</head>\n<body>\n");

    doc.push_str("<div class=\"outer-wrapper\">\n");
    doc.push_str(&format!("<div class=\"{}\">\n", CONTENT_WRAPPER_CLASS));
    for defs in &snapshot.svg_defs {
        doc.push_str(defs);
        doc.push('\n');
    }
    for unit in units {
        doc.push_str(&unit_markup(unit, &padding));
        doc.push('\n');
    }
    doc.push_str("</div>\n</div>\n");

    doc.push_str(&format!(
        "<script>\n(function () {{\n  var wrapper = document.querySelector('.{class}');\n  \
function updateScale() {{\n    var scale = Math.min(window.innerWidth / {w}, window.innerHeight / {h});\n    \
wrapper.style.setProperty('--scale', scale);\n  }}\n  \
window.addEventListener('resize', updateScale);\n  updateScale();\n}})();\n</script>\n",
        class = CONTENT_WRAPPER_CLASS,
        w = width,
        h = height
    ));
    doc.push_str("</body>\n</html>\n");
    doc
}
