//! Element classification.
//!
//! One pre-order pass over the root's descendants decides, per node, whether
//! it becomes a positioned unit, is skipped, or is absorbed into an ancestor's
//! captured markup. Absorbed subtrees go into a consumed set that is checked
//! before each visit, so no node is captured twice.

use log::debug;
use std::collections::HashSet;

use crate::render_tree::{NodeData, NodeId, RenderTree};

const COMPLEX_BLOCKS: &[&str] = &["ul", "ol", "table", "figure"];

const TEXT_BLOCKS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6", "p", "a", "button"];

const INLINE_FORMATTING: &[&str] = &[
    "span", "b", "strong", "i", "em", "u", "s", "mark", "small", "code", "sub", "sup",
];

const VOID_UNITS: &[&str] = &["img", "input", "br", "hr", "iframe", "video"];

/// Elements that never paint content of their own
const IGNORED: &[&str] = &["script", "style", "noscript", "template", "link", "meta"];

pub fn is_inline_formatting(tag: &str) -> bool {
    INLINE_FORMATTING.contains(&tag)
}

pub fn is_void_unit(tag: &str) -> bool {
    VOID_UNITS.contains(&tag)
}

/// A node selected to become a positioned unit
#[derive(Debug, Clone, PartialEq)]
pub struct Classified {
    pub node: NodeId,
    /// Output tag (`svg` becomes `div`)
    pub tag: String,
    pub content: String,
    /// Pre-order index among the root's element descendants
    pub source_index: usize,
}

#[derive(Debug, Clone, Default)]
pub struct Classification {
    pub units: Vec<Classified>,
    /// Zero-size SVG blocks kept verbatim (gradient and symbol definitions)
    pub svg_defs: Vec<String>,
}

enum Consume {
    Nothing,
    Subtree,
}

struct Walk<'a> {
    tree: &'a RenderTree,
    consumed: HashSet<NodeId>,
    complex_blocks: HashSet<NodeId>,
}

impl<'a> Walk<'a> {
    fn consume_subtree(&mut self, id: NodeId) {
        self.consumed.insert(id);
        self.consumed.extend(self.tree.descendant_elements(id));
    }

    fn inside_complex_block(&self, id: NodeId) -> bool {
        let Some(parent) = self.tree.parent(id) else {
            return false;
        };
        self.complex_blocks.contains(&parent)
            || self.tree.ancestors(parent).any(|a| self.complex_blocks.contains(&a))
    }

    fn has_direct_svg(&self, id: NodeId) -> bool {
        self.tree
            .child_elements(id)
            .any(|(_, child)| child.tag == "svg" && child.rect.area() > 0.0)
    }

    /// Only text, inline formatting and line breaks below this node's children
    fn has_only_inline_children(&self, id: NodeId) -> bool {
        self.tree.children(id).iter().all(|&c| match self.tree.node(c).map(|n| &n.data) {
            Some(NodeData::Text { .. }) => true,
            Some(NodeData::Element(el)) => is_inline_formatting(&el.tag) || el.tag == "br",
            None => false,
        })
    }

    fn decide(&mut self, id: NodeId, tag: &str) -> Option<(String, String, Consume)> {
        let tree = self.tree;

        if tag == "div" && self.has_direct_svg(id) {
            return Some((tag.to_string(), tree.inner_html(id), Consume::Subtree));
        }
        if tag == "svg" {
            return Some(("div".to_string(), tree.outer_html(id), Consume::Subtree));
        }
        if COMPLEX_BLOCKS.contains(&tag) {
            self.complex_blocks.insert(id);
            return Some((tag.to_string(), tree.inner_html(id), Consume::Subtree));
        }
        if self.inside_complex_block(id) {
            return None;
        }
        if TEXT_BLOCKS.contains(&tag) {
            return Some((tag.to_string(), tree.inner_html(id), Consume::Subtree));
        }
        if is_inline_formatting(tag) {
            return None;
        }
        if is_void_unit(tag) {
            return Some((tag.to_string(), String::new(), Consume::Nothing));
        }
        if tag == "div" {
            return if self.has_only_inline_children(id) {
                Some((tag.to_string(), tree.inner_html(id), Consume::Subtree))
            } else {
                Some((tag.to_string(), String::new(), Consume::Nothing))
            };
        }
        Some((tag.to_string(), tree.direct_text(id), Consume::Nothing))
    }
}

/// Classify every element below the capture root
pub fn classify(tree: &RenderTree) -> Classification {
    let mut walk = Walk {
        tree,
        consumed: HashSet::new(),
        complex_blocks: HashSet::new(),
    };
    let mut out = Classification::default();

    for (source_index, id) in tree.descendant_elements(tree.root).into_iter().enumerate() {
        if walk.consumed.contains(&id) {
            continue;
        }
        let Some(el) = tree.element(id) else {
            continue;
        };
        if IGNORED.contains(&el.tag.as_str()) || el.hides_subtree() {
            walk.consume_subtree(id);
            continue;
        }
        if !el.is_visible() {
            continue;
        }
        if el.rect.area() <= 0.0 {
            if el.tag == "svg" {
                out.svg_defs.push(tree.outer_html(id));
                walk.consume_subtree(id);
            }
            continue;
        }

        let Some((tag, content, consume)) = walk.decide(id, &el.tag) else {
            continue;
        };
        if let Consume::Subtree = consume {
            walk.consume_subtree(id);
        }
        debug!("classified <{}> #{} as <{}> unit", el.tag, source_index, tag);
        out.units.push(Classified {
            node: id,
            tag,
            content,
            source_index,
        });
    }

    out
}
