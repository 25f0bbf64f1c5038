//! Head scraping: stylesheets and title carried from the input document

use scraper::{Html, Selector};
use serde::Serialize;

/// Markup lifted from the input `<head>`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HeadAssets {
    pub title: Option<String>,
    /// `<link rel="stylesheet">` and `<style>` elements in document order
    pub stylesheets: Vec<String>,
}

/// Collect stylesheet links, inline styles and the title from `html`
pub fn scrape_head(html: &str) -> HeadAssets {
    let document = Html::parse_document(html);
    let mut assets = HeadAssets::default();

    if let Ok(sel) = Selector::parse("head link[rel~=\"stylesheet\"], head style") {
        for node in document.select(&sel) {
            if node.value().name() == "style" && node.text().all(|t| t.trim().is_empty()) {
                continue;
            }
            assets.stylesheets.push(node.html());
        }
    }

    if let Ok(sel) = Selector::parse("head title") {
        assets.title = document
            .select(&sel)
            .next()
            .map(|n| n.text().collect::<String>().trim().to_string())
            .filter(|t| !t.is_empty());
    }

    assets
}
