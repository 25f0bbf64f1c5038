//! Post-hoc geometric verification of emitted documents.
//!
//! Both verifiers work on the top-level units of the content wrapper that
//! carry text. Each unit is reduced to an outer box: its placed box grown by
//! its margins. The overlap check additionally grows it vertically by half
//! of the line-height slack on each side.

pub mod overflow;
pub mod overlap;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::convert::measure_script;
use crate::render_tree::Rect;
use crate::session::{settle, PageSession};
use crate::snapshot::style::parse_px;
use crate::{Error, Result, SessionConfig};

pub use overflow::{OverflowIssue, OverflowReport, Severity};
pub use overlap::{OverlapIssue, OverlapReport};

/// Line height browsers use for `normal`, relative to the font size
const NORMAL_LINE_HEIGHT: f64 = 1.2;

const PREVIEW_CHARS: usize = 40;

/// Geometry and typography of one top-level unit, as measured in the page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeasuredUnit {
    /// Position among the content wrapper's children
    pub index: usize,
    pub tag: String,
    pub text: String,
    /// Measured border box
    pub rect: Rect,
    pub left: String,
    pub top: String,
    pub width: String,
    pub height: String,
    pub margin_top: String,
    pub margin_right: String,
    pub margin_bottom: String,
    pub margin_left: String,
    pub line_height: String,
    pub font_size: String,
}

impl MeasuredUnit {
    /// Computed `left`/`top`/`width`/`height` where they resolve to pixels,
    /// the measured box otherwise
    pub fn placed_box(&self) -> Rect {
        Rect {
            x: parse_px(&self.left).unwrap_or(self.rect.x),
            y: parse_px(&self.top).unwrap_or(self.rect.y),
            width: parse_px(&self.width).unwrap_or(self.rect.width),
            height: parse_px(&self.height).unwrap_or(self.rect.height),
        }
    }

    /// Placed box expanded by the margin on every side
    pub fn outer_box(&self) -> Rect {
        let m = |v: &str| parse_px(v).unwrap_or(0.0);
        let (top, right, bottom, left) = (
            m(&self.margin_top),
            m(&self.margin_right),
            m(&self.margin_bottom),
            m(&self.margin_left),
        );
        let b = self.placed_box();
        Rect {
            x: b.x - left,
            y: b.y - top,
            width: b.width + left + right,
            height: b.height + top + bottom,
        }
    }

    pub fn line_height_px(&self) -> Option<f64> {
        match parse_px(&self.line_height) {
            Some(px) => Some(px),
            None if self.line_height.trim() == "normal" => {
                parse_px(&self.font_size).map(|size| size * NORMAL_LINE_HEIGHT)
            }
            None => None,
        }
    }

    /// Line height beyond the rendered height, never negative
    pub fn extra_line_height(&self) -> f64 {
        self.line_height_px()
            .map(|lh| (lh - self.placed_box().height).max(0.0))
            .unwrap_or(0.0)
    }

    /// Outer box with the line-height slack split over top and bottom
    pub fn visual_box(&self) -> Rect {
        let half = self.extra_line_height() / 2.0;
        let b = self.outer_box();
        Rect {
            y: b.y - half,
            height: b.height + half * 2.0,
            ..b
        }
    }

    pub fn summary(&self, outer: Rect) -> UnitBox {
        UnitBox {
            index: self.index,
            tag: self.tag.clone(),
            text: preview(&self.text),
            outer,
            font_size: self.font_size.clone(),
            line_height: self.line_height.clone(),
        }
    }
}

/// A unit as it appears in a report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitBox {
    pub index: usize,
    pub tag: String,
    pub text: String,
    pub outer: Rect,
    pub font_size: String,
    pub line_height: String,
}

impl fmt::Display for UnitBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} <{}> \"{}\"", self.index, self.tag, self.text)
    }
}

fn preview(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() > PREVIEW_CHARS {
        let cut: String = collapsed.chars().take(PREVIEW_CHARS).collect();
        format!("{}...", cut)
    } else {
        collapsed
    }
}

/// Format a pixel quantity with one decimal
pub(crate) fn fmt_px(v: f64) -> String {
    format!("{:.1}", v)
}

#[derive(Deserialize)]
struct MeasureResult {
    #[serde(default)]
    units: Vec<MeasuredUnit>,
    #[serde(default)]
    error: Option<String>,
}

/// Decode the JSON returned by the measure script
pub fn parse_measurements(value: serde_json::Value) -> Result<Vec<MeasuredUnit>> {
    let parsed: MeasureResult = match value {
        serde_json::Value::String(s) => serde_json::from_str(&s),
        other => serde_json::from_value(other),
    }
    .map_err(|e| Error::Verify(format!("malformed measurement: {}", e)))?;
    match parsed.error {
        Some(e) => Err(Error::Verify(e)),
        None => Ok(parsed.units),
    }
}

/// Load an emitted document and measure its top-level text units
pub fn measure<S: PageSession>(
    session: &mut S,
    path: &Path,
    config: &SessionConfig,
) -> Result<Vec<MeasuredUnit>> {
    session.load_file(path)?;
    settle(session, config)?;
    let value = session.evaluate(&measure_script())?;
    parse_measurements(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn computed_values_win_over_measured_box() {
        let unit = MeasuredUnit {
            rect: Rect::new(1.0, 2.0, 3.0, 4.0),
            left: "100px".into(),
            top: "auto".into(),
            width: "300px".into(),
            height: "40px".into(),
            margin_top: "10px".into(),
            margin_left: "5px".into(),
            margin_bottom: "0px".into(),
            ..Default::default()
        };
        assert_eq!(unit.placed_box(), Rect::new(100.0, 2.0, 300.0, 40.0));
        assert_eq!(unit.outer_box(), Rect::new(95.0, -8.0, 305.0, 50.0));
    }

    #[test]
    fn line_height_slack_is_split_evenly() {
        let unit = MeasuredUnit {
            left: "0px".into(),
            top: "100px".into(),
            width: "200px".into(),
            height: "40px".into(),
            line_height: "60px".into(),
            ..Default::default()
        };
        assert_eq!(unit.extra_line_height(), 20.0);
        assert_eq!(unit.visual_box(), Rect::new(0.0, 90.0, 200.0, 60.0));

        let normal = MeasuredUnit {
            height: "10px".into(),
            line_height: "normal".into(),
            font_size: "20px".into(),
            ..Default::default()
        };
        assert!((normal.extra_line_height() - 14.0).abs() < 1e-9);

        let tight = MeasuredUnit {
            height: "80px".into(),
            line_height: "40px".into(),
            ..Default::default()
        };
        assert_eq!(tight.extra_line_height(), 0.0);
    }

    #[test]
    fn measurement_errors_surface_as_verify_errors() {
        let value = serde_json::Value::String(r#"{"error":"no content wrapper found"}"#.into());
        assert!(matches!(parse_measurements(value), Err(Error::Verify(_))));
        assert!(matches!(
            parse_measurements(serde_json::json!(42)),
            Err(Error::Verify(_))
        ));

        let ok = serde_json::json!({"units": [{"index": 2, "tag": "p", "text": "Hi",
            "rect": {"x": 0, "y": 0, "width": 10, "height": 10}}]});
        let units = parse_measurements(ok).unwrap();
        assert_eq!(units[0].index, 2);
    }

    #[test]
    fn previews_are_collapsed_and_truncated() {
        assert_eq!(preview("  a\n   b "), "a b");
        let long = "x".repeat(60);
        assert_eq!(preview(&long).len(), PREVIEW_CHARS + 3);
    }
}
