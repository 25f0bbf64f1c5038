//! Rendered tree returned by the in-page capture script.
//!
//! The page is queried once per conversion. The capture script walks the
//! body in document order and serializes every element and text node with
//! its measured box, attributes and a whitelist of computed properties.
//! Every later stage reads this tree and never touches the page again.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::markup;
use crate::{Error, Result};

/// Index of a node inside [`RenderTree::nodes`]
pub type NodeId = usize;

/// Axis-aligned box in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Whether `other` lies fully inside this box
    pub fn contains(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Grow the box by `by` on every side
    pub fn inflate(&self, by: f64) -> Rect {
        Rect {
            x: self.x - by,
            y: self.y - by,
            width: self.width + by * 2.0,
            height: self.height + by * 2.0,
        }
    }

    /// Shift the origin so the box is expressed relative to `origin`
    pub fn relative_to(&self, origin: &Rect) -> Rect {
        Rect {
            x: self.x - origin.x,
            y: self.y - origin.y,
            ..*self
        }
    }

    /// Overlapping region of two boxes, if they overlap with positive area
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if right > left && bottom > top {
            Some(Rect::new(left, top, right - left, bottom - top))
        } else {
            None
        }
    }
}

/// A rendered element
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Element {
    /// Local name as reported by the DOM (case preserved for SVG)
    pub tag: String,
    /// Attributes in DOM order
    #[serde(default)]
    pub attrs: Vec<(String, String)>,
    /// Border box in page coordinates
    #[serde(default)]
    pub rect: Rect,
    /// Whitelisted computed style values
    #[serde(default)]
    pub style: BTreeMap<String, String>,
    /// Whether `::before` or `::after` paints a background
    #[serde(default)]
    pub pseudo_background: bool,
}

impl Element {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn class_tokens(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or("").split_whitespace()
    }

    /// Computed value for `prop`, empty when it was not captured
    pub fn computed(&self, prop: &str) -> &str {
        self.style.get(prop).map(String::as_str).unwrap_or("")
    }

    /// Hidden via `display`, `visibility` or a fully transparent `opacity`
    pub fn is_visible(&self) -> bool {
        self.computed("visibility") != "hidden" && !self.hides_subtree()
    }

    /// `display: none` or `opacity: 0`, which no descendant can undo.
    /// `visibility: hidden` is not included: children may set it back.
    pub fn hides_subtree(&self) -> bool {
        if self.computed("display") == "none" {
            return true;
        }
        match self.computed("opacity").trim().parse::<f64>() {
            Ok(opacity) => opacity <= 0.0,
            Err(_) => false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NodeData {
    Element(Element),
    Text { text: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    #[serde(default)]
    pub parent: Option<NodeId>,
    #[serde(default)]
    pub children: Vec<NodeId>,
    #[serde(flatten)]
    pub data: NodeData,
}

/// The capture root (page body) and everything below it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderTree {
    pub root: NodeId,
    pub nodes: Vec<Node>,
    /// Raw computed background of the body
    #[serde(default)]
    pub body_background: String,
}

impl RenderTree {
    /// Decode and validate the JSON produced by the capture script.
    ///
    /// The script may hand back either the object itself or its JSON string.
    pub fn from_capture(value: serde_json::Value) -> Result<Self> {
        let tree: RenderTree = match value {
            serde_json::Value::String(s) => serde_json::from_str(&s)?,
            other => serde_json::from_value(other)?,
        };
        tree.validate()?;
        Ok(tree)
    }

    fn validate(&self) -> Result<()> {
        if self.element(self.root).is_none() {
            return Err(Error::Capture(format!(
                "root {} is not an element node",
                self.root
            )));
        }
        for (id, node) in self.nodes.iter().enumerate() {
            for &child in &node.children {
                match self.nodes.get(child) {
                    Some(c) if c.parent == Some(id) => {}
                    _ => {
                        return Err(Error::Capture(format!(
                            "node {} lists child {} that does not point back",
                            id, child
                        )))
                    }
                }
            }
        }
        Ok(())
    }

    pub fn root_rect(&self) -> Rect {
        self.element(self.root).map(|e| e.rect).unwrap_or_default()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        match self.nodes.get(id).map(|n| &n.data) {
            Some(NodeData::Element(e)) => Some(e),
            _ => None,
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// Element children only
    pub fn child_elements(&self, id: NodeId) -> impl Iterator<Item = (NodeId, &Element)> {
        self.children(id)
            .iter()
            .filter_map(move |&c| self.element(c).map(|e| (c, e)))
    }

    /// Ancestors of `id`, nearest first, up to and excluding the capture root
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        let root = self.root;
        std::iter::successors(self.parent(id), move |&p| self.parent(p))
            .take_while(move |&p| p != root)
    }

    /// Element descendants of `id` in pre-order, `id` excluded
    pub fn descendant_elements(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            if self.element(next).is_none() {
                continue;
            }
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    pub fn inner_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        for &child in self.children(id) {
            self.write_node(child, &mut out);
        }
        out
    }

    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_node(id, &mut out);
        out
    }

    /// Escaped concatenation of the direct text children of `id`
    pub fn direct_text(&self, id: NodeId) -> String {
        let mut text = String::new();
        for &child in self.children(id) {
            if let Some(NodeData::Text { text: t }) = self.nodes.get(child).map(|n| &n.data) {
                text.push_str(t);
            }
        }
        markup::escape_text(text.trim())
    }

    fn write_node(&self, id: NodeId, out: &mut String) {
        let Some(node) = self.nodes.get(id) else {
            return;
        };
        match &node.data {
            NodeData::Text { text } => out.push_str(&markup::escape_text(text)),
            NodeData::Element(el) => {
                markup::open_tag(out, &el.tag, el.attrs.iter().map(|(k, v)| (k.as_str(), v.as_str())));
                if markup::is_void(&el.tag) {
                    return;
                }
                for &child in &node.children {
                    self.write_node(child, out);
                }
                markup::close_tag(out, &el.tag);
            }
        }
    }

    /// Start building a tree by hand (tests and benchmarks)
    pub fn builder(root_rect: Rect) -> TreeBuilder {
        TreeBuilder::new(root_rect)
    }
}

/// Incremental constructor for [`RenderTree`]
#[derive(Debug, Clone)]
pub struct TreeBuilder {
    tree: RenderTree,
}

impl TreeBuilder {
    fn new(root_rect: Rect) -> Self {
        let root = Node {
            parent: None,
            children: Vec::new(),
            data: NodeData::Element(Element {
                tag: "body".to_string(),
                rect: root_rect,
                ..Default::default()
            }),
        };
        Self {
            tree: RenderTree {
                root: 0,
                nodes: vec![root],
                body_background: String::new(),
            },
        }
    }

    pub fn root(&self) -> NodeId {
        self.tree.root
    }

    fn push(&mut self, parent: NodeId, data: NodeData) -> NodeId {
        let id = self.tree.nodes.len();
        self.tree.nodes.push(Node {
            parent: Some(parent),
            children: Vec::new(),
            data,
        });
        self.tree.nodes[parent].children.push(id);
        id
    }

    pub fn element(&mut self, parent: NodeId, tag: &str, rect: Rect) -> NodeId {
        self.push(
            parent,
            NodeData::Element(Element {
                tag: tag.to_string(),
                rect,
                ..Default::default()
            }),
        )
    }

    pub fn text(&mut self, parent: NodeId, text: &str) -> NodeId {
        self.push(
            parent,
            NodeData::Text {
                text: text.to_string(),
            },
        )
    }

    pub fn attr(&mut self, id: NodeId, name: &str, value: &str) -> &mut Self {
        if let Some(NodeData::Element(el)) = self.tree.nodes.get_mut(id).map(|n| &mut n.data) {
            el.attrs.push((name.to_string(), value.to_string()));
        }
        self
    }

    pub fn style(&mut self, id: NodeId, prop: &str, value: &str) -> &mut Self {
        if let Some(NodeData::Element(el)) = self.tree.nodes.get_mut(id).map(|n| &mut n.data) {
            el.style.insert(prop.to_string(), value.to_string());
        }
        self
    }

    pub fn pseudo_background(&mut self, id: NodeId) -> &mut Self {
        if let Some(NodeData::Element(el)) = self.tree.nodes.get_mut(id).map(|n| &mut n.data) {
            el.pseudo_background = true;
        }
        self
    }

    pub fn body_background(&mut self, value: &str) -> &mut Self {
        self.tree.body_background = value.to_string();
        self
    }

    pub fn build(self) -> RenderTree {
        self.tree
    }
}
