//! Canvas overflow detection

use serde::Serialize;
use std::fmt;

use super::{fmt_px, MeasuredUnit, UnitBox};
use crate::emit::{CANVAS_HEIGHT, CANVAS_WIDTH};

/// Excess beyond which an overflow is critical
pub const CRITICAL_EXCESS: f64 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Warning,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "WARNING"),
            Severity::Critical => write!(f, "CRITICAL"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverflowIssue {
    pub unit: UnitBox,
    /// Pixels past the right edge, zero when inside
    pub excess_right: f64,
    /// Pixels past the bottom edge, zero when inside
    pub excess_bottom: f64,
    pub severity: Severity,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OverflowReport {
    /// Every text unit that was checked
    pub units: Vec<UnitBox>,
    pub issues: Vec<OverflowIssue>,
}

impl OverflowReport {
    pub fn passed(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }
}

/// Flag units whose outer box runs past the right or bottom canvas edge
pub fn analyze(units: &[MeasuredUnit]) -> OverflowReport {
    let mut report = OverflowReport::default();
    for unit in units {
        let outer = unit.outer_box();
        let summary = unit.summary(outer);
        report.units.push(summary.clone());

        if outer.right() <= CANVAS_WIDTH && outer.bottom() <= CANVAS_HEIGHT {
            continue;
        }
        let excess_right = (outer.right() - CANVAS_WIDTH).max(0.0);
        let excess_bottom = (outer.bottom() - CANVAS_HEIGHT).max(0.0);
        let severity = if excess_right > CRITICAL_EXCESS || excess_bottom > CRITICAL_EXCESS {
            Severity::Critical
        } else {
            Severity::Warning
        };
        report.issues.push(OverflowIssue {
            unit: summary,
            excess_right,
            excess_bottom,
            severity,
        });
    }
    report
}

impl fmt::Display for OverflowReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Element coordinates ({} text elements):", self.units.len())?;
        for u in &self.units {
            writeln!(
                f,
                "  {}  left={} top={} right={} bottom={}",
                u,
                fmt_px(u.outer.x),
                fmt_px(u.outer.y),
                fmt_px(u.outer.right()),
                fmt_px(u.outer.bottom())
            )?;
        }

        writeln!(f)?;
        writeln!(f, "Overflow report:")?;
        if self.issues.is_empty() {
            writeln!(f, "  No elements overflow the {}x{} canvas.", CANVAS_WIDTH, CANVAS_HEIGHT)?;
        }
        for issue in &self.issues {
            let o = &issue.unit.outer;
            writeln!(
                f,
                "  [{}] {}  position=({}, {}) size={}x{} right={} bottom={} excess: right {}px, bottom {}px",
                issue.severity,
                issue.unit,
                fmt_px(o.x),
                fmt_px(o.y),
                fmt_px(o.width),
                fmt_px(o.height),
                fmt_px(o.right()),
                fmt_px(o.bottom()),
                fmt_px(issue.excess_right),
                fmt_px(issue.excess_bottom)
            )?;
        }

        writeln!(f)?;
        write!(
            f,
            "Summary: {} of {} text elements overflow ({} critical, {} warning). {}",
            self.issues.len(),
            self.units.len(),
            self.count(Severity::Critical),
            self.count(Severity::Warning),
            if self.passed() { "PASS" } else { "FAIL" }
        )
    }
}
