//! Conversion driver: input file to canonical snapshot document

use log::info;
use std::fs;
use std::path::Path;

use crate::render_tree::RenderTree;
use crate::session::{settle, PageSession};
use crate::snapshot::{self, style, PageSnapshot};
use crate::{emit, head, Error, Result, SessionConfig};

const CAPTURE_TEMPLATE: &str = include_str!("capture.js");
const MEASURE_TEMPLATE: &str = include_str!("measure.js");

/// In-page script that serializes the rendered body as a [`RenderTree`]
pub fn capture_script() -> String {
    let props = serde_json::to_string(&style::captured_properties()).unwrap_or_else(|_| "[]".to_string());
    CAPTURE_TEMPLATE.replace("__SLIDESNAP_PROPERTIES__", &props)
}

/// In-page script that measures the top-level units of an emitted document
pub fn measure_script() -> String {
    MEASURE_TEMPLATE.replace("__SLIDESNAP_WRAPPER__", emit::CONTENT_WRAPPER_CLASS)
}

/// Write `contents` next to `path` first and move it into place, so a failed
/// write never leaves a truncated document behind.
fn write_atomically(path: &Path, contents: &str) -> Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    fs::write(&tmp, contents).map_err(|e| Error::io(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        Error::io(path, e)
    })
}

/// Render `input` in `session`, snapshot it and write the canonical document
/// to `output`.
///
/// Nothing is written when any step fails.
pub fn convert<S: PageSession>(
    session: &mut S,
    input: &Path,
    output: &Path,
    config: &SessionConfig,
) -> Result<PageSnapshot> {
    let html = fs::read_to_string(input).map_err(|e| Error::io(input, e))?;
    let assets = head::scrape_head(&html);

    session.load_file(input)?;
    settle(session, config)?;

    let captured = session.evaluate(&capture_script())?;
    let tree = RenderTree::from_capture(captured)?;
    info!("captured {} nodes from {}", tree.nodes.len(), input.display());

    let mut page = snapshot::capture(&tree)?;
    page.head = assets;

    let document = emit::emit_document(&page);
    write_atomically(output, &document)?;
    info!("wrote {} units to {}", page.units.len(), output.display());
    Ok(page)
}
