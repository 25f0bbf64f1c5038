//! slidesnap
//!
//! Converts a rendered HTML page into a self-contained, absolutely-positioned
//! snapshot document of fixed 1920x1080 size, and verifies emitted documents
//! for text overflow and text overlap.
//!
//! # Features
//!
//! - **CDP Backend** (default): renders pages in headless Chrome via the
//!   Chrome DevTools Protocol
//! - **Pure pipeline**: classification, extraction and emission run over a
//!   captured [`render_tree::RenderTree`] and need no browser
//!
//! # Example
//!
//! ```no_run
//! # #[cfg(feature = "cdp")]
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::path::Path;
//!
//! let config = slidesnap::SessionConfig::default();
//! let snapshot = slidesnap::convert_file(Path::new("slide.html"), Path::new("out.html"), config.clone())?;
//! println!("emitted {} units", snapshot.units.len());
//!
//! let report = slidesnap::check_overflow_file(Path::new("out.html"), config)?;
//! println!("{}", report);
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "cdp"))]
//! # fn main() {}
//! ```

use std::path::PathBuf;

pub mod error;
pub use error::{Error, Result};

pub mod convert;
pub mod emit;
pub mod head;
pub mod markup;
pub mod render_tree;
pub mod session;
pub mod snapshot;
pub mod verify;

#[cfg(feature = "cdp")]
pub mod cdp;

pub use convert::{capture_script, convert, measure_script};
pub use session::{try_with_timeout, with_session, PageSession, TimedOut};
pub use snapshot::{CaptureUnit, ContainerStyle, PageSnapshot};
pub use verify::{OverflowReport, OverlapReport};

/// Configuration for a page automation session
///
/// The defaults render at the canonical 1920x1080 size and give fonts and
/// animations five seconds each before continuing without them.
///
/// # Examples
///
/// ```
/// let cfg = slidesnap::SessionConfig::default();
/// assert_eq!(cfg.viewport.width, 1920);
/// ```
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Window size used to render pages
    pub viewport: Viewport,
    /// Navigation timeout in milliseconds
    pub timeout_ms: u64,
    /// Extra delay after navigation for late network activity, in milliseconds
    pub settle_ms: u64,
    /// How long to wait for `document.fonts.ready`
    pub font_timeout_ms: u64,
    /// How long to wait for running animations to finish
    pub animation_timeout_ms: u64,
    /// Chrome/Chromium binary; autodetected when `None`
    pub chrome_path: Option<PathBuf>,
    /// Run the browser without a window
    pub headless: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            timeout_ms: 30000,
            settle_ms: 250,
            font_timeout_ms: 5000,
            animation_timeout_ms: 5000,
            chrome_path: None,
            headless: true,
        }
    }
}

/// Viewport dimensions
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: emit::CANVAS_WIDTH as u32,
            height: emit::CANVAS_HEIGHT as u32,
        }
    }
}

/// Convert `input` to a canonical snapshot document at `output` using
/// headless Chrome.
#[cfg(feature = "cdp")]
pub fn convert_file(
    input: &std::path::Path,
    output: &std::path::Path,
    config: SessionConfig,
) -> Result<PageSnapshot> {
    let settle = config.clone();
    with_session::<cdp::CdpSession, _, _>(config, |session| {
        convert(session, input, output, &settle)
    })
}

/// Analyze an emitted document for units running past the canvas
#[cfg(feature = "cdp")]
pub fn check_overflow_file(path: &std::path::Path, config: SessionConfig) -> Result<OverflowReport> {
    let settle = config.clone();
    with_session::<cdp::CdpSession, _, _>(config, |session| {
        let units = verify::measure(session, path, &settle)?;
        Ok(verify::overflow::analyze(&units))
    })
}

/// Analyze an emitted document for overlapping text units
#[cfg(feature = "cdp")]
pub fn check_overlap_file(path: &std::path::Path, config: SessionConfig) -> Result<OverlapReport> {
    let settle = config.clone();
    with_session::<cdp::CdpSession, _, _>(config, |session| {
        let units = verify::measure(session, path, &settle)?;
        Ok(verify::overlap::analyze(&units))
    })
}
