//! Style and attribute capture for a single node.
//!
//! `style_text` keeps the author's inline declarations first, then appends
//! whitelisted computed properties the inline style did not already set and
//! whose values are not neutral, then the four border sides.

use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

use crate::render_tree::Element;

/// Computed properties copied into a unit's style text
pub const COMPUTED_PROPERTIES: &[&str] = &[
    "display",
    "flex-direction",
    "flex-wrap",
    "justify-content",
    "align-items",
    "align-content",
    "gap",
    "color",
    "background-color",
    "background-image",
    "background-size",
    "background-position",
    "background-repeat",
    "font-family",
    "font-size",
    "font-weight",
    "font-style",
    "line-height",
    "letter-spacing",
    "text-align",
    "text-decoration-line",
    "text-transform",
    "text-shadow",
    "white-space",
    "word-break",
    "vertical-align",
    "padding-top",
    "padding-right",
    "padding-bottom",
    "padding-left",
    "border-radius",
    "box-shadow",
    "opacity",
    "visibility",
    "filter",
    "overflow",
    "list-style-type",
    "object-fit",
    "object-position",
];

const SIDES: [&str; 4] = ["top", "right", "bottom", "left"];

/// Values that carry no styling information
const NEUTRAL_VALUES: &[&str] = &["none", "0px", "normal", "initial", "auto"];

const GLOBAL_ATTRIBUTES: &[&str] = &["id", "class", "title", "lang"];

/// Every computed property the capture script must read
pub fn captured_properties() -> Vec<String> {
    let mut props: Vec<String> = COMPUTED_PROPERTIES.iter().map(|p| p.to_string()).collect();
    for side in SIDES {
        for part in ["width", "style", "color"] {
            props.push(format!("border-{}-{}", side, part));
        }
    }
    props
}

fn tag_attributes(tag: &str) -> &'static [&'static str] {
    match tag {
        "img" => &["src", "alt", "srcset", "sizes", "loading", "decoding"],
        "a" => &["href", "target", "rel", "download"],
        "input" => &["type", "name", "value", "placeholder", "checked", "disabled", "readonly"],
        "button" => &["type", "name", "value", "disabled"],
        "iframe" => &["src", "srcdoc", "allow", "allowfullscreen", "frameborder", "loading", "referrerpolicy"],
        "video" => &["src", "poster", "controls", "autoplay", "loop", "muted", "playsinline", "preload"],
        "td" | "th" => &["colspan", "rowspan", "headers", "scope"],
        "ol" => &["start", "reversed", "type"],
        "li" => &["value"],
        "label" => &["for"],
        _ => &[],
    }
}

/// Parse a pixel length such as `12px` or `0`
pub fn parse_px(value: &str) -> Option<f64> {
    let v = value.trim();
    let number = v.strip_suffix("px").unwrap_or(v).trim();
    number.parse::<f64>().ok().filter(|n| n.is_finite())
}

pub fn is_transparent(color: &str) -> bool {
    let c = color.trim();
    if c.is_empty() || c == "transparent" {
        return true;
    }
    if let Some(inner) = c.strip_prefix("rgba(").and_then(|r| r.strip_suffix(')')) {
        if let Some(alpha) = inner.rsplit(',').next().and_then(|a| a.trim().parse::<f64>().ok()) {
            return alpha == 0.0;
        }
    }
    false
}

fn is_neutral(value: &str) -> bool {
    let v = value.trim();
    v.is_empty() || NEUTRAL_VALUES.contains(&v)
}

/// Box padding in pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Padding {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BorderSide {
    pub width: String,
    pub style: String,
    pub color: String,
}

impl BorderSide {
    pub fn is_visible(&self) -> bool {
        let width = parse_px(&self.width).unwrap_or(0.0);
        width > 0.0 && !matches!(self.style.as_str(), "" | "none" | "hidden") && !is_transparent(&self.color)
    }

    fn declaration(&self, side: &str) -> String {
        let or = |v: &str, d: &str| if v.is_empty() { d.to_string() } else { v.to_string() };
        format!(
            "border-{}: {} {} {}",
            side,
            or(&self.width, "0px"),
            or(&self.style, "none"),
            or(&self.color, "currentcolor")
        )
    }
}

/// Structured computed style of one captured node
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StyleRecord {
    computed: BTreeMap<String, String>,
}

impl StyleRecord {
    pub fn from_element(el: &Element) -> Self {
        Self {
            computed: el.style.clone(),
        }
    }

    pub fn get(&self, prop: &str) -> &str {
        self.computed.get(prop).map(String::as_str).unwrap_or("")
    }

    pub fn background_color(&self) -> &str {
        self.get("background-color")
    }

    pub fn background_image(&self) -> &str {
        self.get("background-image")
    }

    /// Non-transparent color or a real background image
    pub fn has_background(&self) -> bool {
        !is_transparent(self.background_color()) || !is_neutral(self.background_image())
    }

    /// Color when it paints, otherwise the image, otherwise empty
    pub fn background(&self) -> String {
        if !is_transparent(self.background_color()) {
            self.background_color().to_string()
        } else if !is_neutral(self.background_image()) {
            self.background_image().to_string()
        } else {
            String::new()
        }
    }

    pub fn border(&self, side: &str) -> BorderSide {
        BorderSide {
            width: self.get(&format!("border-{}-width", side)).to_string(),
            style: self.get(&format!("border-{}-style", side)).to_string(),
            color: self.get(&format!("border-{}-color", side)).to_string(),
        }
    }

    pub fn has_visible_border(&self) -> bool {
        SIDES.iter().any(|side| self.border(side).is_visible())
    }

    pub fn box_shadow(&self) -> &str {
        self.get("box-shadow")
    }

    pub fn has_box_shadow(&self) -> bool {
        !is_neutral(self.box_shadow())
    }

    pub fn padding(&self) -> Padding {
        let px = |side: &str| parse_px(self.get(&format!("padding-{}", side))).unwrap_or(0.0);
        Padding {
            top: px("top"),
            right: px("right"),
            bottom: px("bottom"),
            left: px("left"),
        }
    }

    pub fn border_radius(&self) -> &str {
        self.get("border-radius")
    }
}

/// Split on `;` outside of quotes and parentheses (data URIs contain `;`)
fn split_declarations(css: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, c) in css.char_indices() {
        match (quote, c) {
            (Some(q), _) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"') | (None, '\'') => quote = Some(c),
            (None, '(') => depth += 1,
            (None, ')') => depth = depth.saturating_sub(1),
            (None, ';') if depth == 0 => {
                parts.push(&css[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&css[start..]);
    parts
}

/// Split a declaration block into `(property, value)` pairs
pub fn parse_declarations(css: &str) -> Vec<(String, String)> {
    split_declarations(css)
        .into_iter()
        .filter_map(|decl| {
            let (name, value) = decl.split_once(':')?;
            let name = name.trim().to_ascii_lowercase();
            if name.is_empty() {
                return None;
            }
            Some((name, value.trim().to_string()))
        })
        .collect()
}

/// Build the ordered declaration string for one node
pub fn style_text(el: &Element) -> String {
    let inline = parse_declarations(el.attr("style").unwrap_or(""));
    let declared: HashSet<&str> = inline.iter().map(|(name, _)| name.as_str()).collect();

    let mut decls: Vec<String> = inline
        .iter()
        .map(|(name, value)| format!("{}: {}", name, value))
        .collect();

    for prop in COMPUTED_PROPERTIES {
        if declared.contains(prop) {
            continue;
        }
        let value = el.computed(prop);
        if is_neutral(value) {
            continue;
        }
        decls.push(format!("{}: {}", prop, value));
    }

    let record = StyleRecord::from_element(el);
    for side in SIDES {
        decls.push(record.border(side).declaration(side));
    }
    decls.join("; ")
}

/// Tag-specific allowlist, then global attributes, then every `data-*`
pub fn capture_attributes(el: &Element) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for name in tag_attributes(&el.tag).iter().chain(GLOBAL_ATTRIBUTES) {
        if let Some(value) = el.attr(name) {
            out.push((name.to_string(), value.to_string()));
        }
    }
    for (name, value) in &el.attrs {
        if name.starts_with("data-") {
            out.push((name.clone(), value.clone()));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(tag: &str, attrs: &[(&str, &str)], style: &[(&str, &str)]) -> Element {
        Element {
            tag: tag.to_string(),
            attrs: attrs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
            style: style.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn inline_first_then_non_neutral_computed_then_borders() {
        let el = element(
            "p",
            &[("style", "color: red; margin-top: 4px;")],
            &[
                ("color", "rgb(255, 0, 0)"),
                ("font-size", "32px"),
                ("line-height", "normal"),
                ("padding-top", "0px"),
                ("border-top-width", "2px"),
                ("border-top-style", "solid"),
                ("border-top-color", "rgb(0, 0, 0)"),
            ],
        );
        let text = style_text(&el);
        assert!(text.starts_with("color: red; margin-top: 4px; font-size: 32px; "));
        assert!(!text.contains("rgb(255, 0, 0)"));
        assert!(!text.contains("line-height"));
        assert!(!text.contains("padding-top"));
        assert!(text.contains("border-top: 2px solid rgb(0, 0, 0)"));
        assert!(text.ends_with("border-left: 0px none currentcolor"));
    }

    #[test]
    fn attributes_follow_allowlist_globals_then_data() {
        let el = element(
            "img",
            &[
                ("data-role", "hero"),
                ("class", "photo"),
                ("onclick", "x()"),
                ("alt", "Cat"),
                ("src", "cat.png"),
                ("style", "width: 10px"),
            ],
            &[],
        );
        let attrs = capture_attributes(&el);
        let names: Vec<&str> = attrs.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(names, vec!["src", "alt", "class", "data-role"]);
    }

    #[test]
    fn background_and_border_detection() {
        let clear = StyleRecord::from_element(&element(
            "div",
            &[],
            &[("background-color", "rgba(0, 0, 0, 0)"), ("background-image", "none")],
        ));
        assert!(!clear.has_background());
        assert_eq!(clear.background(), "");

        let image = StyleRecord::from_element(&element(
            "div",
            &[],
            &[("background-color", "transparent"), ("background-image", "url(\"a.png\")")],
        ));
        assert!(image.has_background());
        assert_eq!(image.background(), "url(\"a.png\")");

        let bordered = StyleRecord::from_element(&element(
            "div",
            &[],
            &[
                ("border-left-width", "1px"),
                ("border-left-style", "dashed"),
                ("border-left-color", "rgb(1, 2, 3)"),
            ],
        ));
        assert!(bordered.has_visible_border());
        assert!(!clear.has_visible_border());
    }

    #[test]
    fn padding_is_read_from_longhands() {
        let record = StyleRecord::from_element(&element(
            "div",
            &[],
            &[
                ("padding-top", "10px"),
                ("padding-right", "20px"),
                ("padding-bottom", "30px"),
                ("padding-left", "40.5px"),
            ],
        ));
        assert_eq!(
            record.padding(),
            Padding { top: 10.0, right: 20.0, bottom: 30.0, left: 40.5 }
        );
    }

    #[test]
    fn declarations_keep_data_uris_intact() {
        let decls = parse_declarations(
            "background-image: url(\"data:image/png;base64,AAA=\"); Color : red;;content: ';'",
        );
        assert_eq!(
            decls,
            vec![
                ("background-image".to_string(), "url(\"data:image/png;base64,AAA=\")".to_string()),
                ("color".to_string(), "red".to_string()),
                ("content".to_string(), "';'".to_string()),
            ]
        );
    }

    #[test]
    fn transparent_colors() {
        assert!(is_transparent("rgba(0, 0, 0, 0)"));
        assert!(is_transparent("rgba(12, 200, 3, 0)"));
        assert!(!is_transparent("rgba(0, 0, 0, 0.5)"));
        assert!(!is_transparent("rgb(0, 0, 0)"));
        assert_eq!(parse_px("12.5px"), Some(12.5));
        assert_eq!(parse_px("auto"), None);
    }
}
