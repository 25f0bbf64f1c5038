//! Pairwise overlap detection between top-level text units

use serde::Serialize;
use std::fmt;

use super::{fmt_px, MeasuredUnit, UnitBox};
use crate::render_tree::Rect;

/// Smallest share of the smaller unit an intersection must cover to be reported
pub const MIN_OVERLAP_RATIO: f64 = 0.05;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlapIssue {
    pub first: UnitBox,
    pub second: UnitBox,
    pub intersection: Rect,
    /// Intersection area as a percentage of the smaller unit
    pub percentage: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OverlapReport {
    pub units: Vec<UnitBox>,
    pub overlaps: Vec<OverlapIssue>,
}

impl OverlapReport {
    pub fn passed(&self) -> bool {
        self.overlaps.is_empty()
    }
}

/// Check every unordered pair of units for a significant overlap
pub fn analyze(units: &[MeasuredUnit]) -> OverlapReport {
    let boxes: Vec<(Rect, UnitBox)> = units
        .iter()
        .map(|u| {
            let visual = u.visual_box();
            (visual, u.summary(visual))
        })
        .collect();

    let mut overlaps = Vec::new();
    for (i, (a, first)) in boxes.iter().enumerate() {
        for (b, second) in &boxes[i + 1..] {
            let Some(intersection) = a.intersection(b) else {
                continue;
            };
            let smaller = a.area().min(b.area());
            if smaller <= 0.0 {
                continue;
            }
            let ratio = intersection.area() / smaller;
            if ratio >= MIN_OVERLAP_RATIO {
                overlaps.push(OverlapIssue {
                    first: first.clone(),
                    second: second.clone(),
                    intersection,
                    percentage: ratio * 100.0,
                });
            }
        }
    }

    OverlapReport {
        units: boxes.into_iter().map(|(_, summary)| summary).collect(),
        overlaps,
    }
}

impl fmt::Display for OverlapReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Element positions ({} text elements):", self.units.len())?;
        for u in &self.units {
            writeln!(
                f,
                "  {}  box=({}, {}) {}x{} font-size={} line-height={}",
                u,
                fmt_px(u.outer.x),
                fmt_px(u.outer.y),
                fmt_px(u.outer.width),
                fmt_px(u.outer.height),
                u.font_size,
                u.line_height
            )?;
        }

        writeln!(f)?;
        writeln!(f, "Overlap report:")?;
        if self.overlaps.is_empty() {
            writeln!(f, "  No overlapping text elements.")?;
        }
        for o in &self.overlaps {
            writeln!(
                f,
                "  {} overlaps {}  intersection=({}, {}) {}x{} ({}% of smaller)",
                o.first,
                o.second,
                fmt_px(o.intersection.x),
                fmt_px(o.intersection.y),
                fmt_px(o.intersection.width),
                fmt_px(o.intersection.height),
                fmt_px(o.percentage)
            )?;
        }

        writeln!(f)?;
        write!(
            f,
            "Summary: {} overlapping pairs among {} text elements. {}",
            self.overlaps.len(),
            self.units.len(),
            if self.passed() { "PASS" } else { "FAIL" }
        )
    }
}
