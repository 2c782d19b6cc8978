use std::fmt::Write;

use maptext_common::{AdvanceMetrics, Font, TextMetrics};

const SVG_NS: &str = "http://www.w3.org/2000/svg";

/// Handle to a node in an [`SvgTree`]. Stale after the node is detached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
struct SvgNode {
    tag: String,
    attributes: Vec<(String, String)>,
    classes: Vec<String>,
    text: Option<String>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl SvgNode {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            attributes: Vec::new(),
            classes: Vec::new(),
            text: None,
            parent: None,
            children: Vec::new(),
        }
    }
}

/// In-memory retained SVG document.
///
/// Holds an `<svg>` root with a single `<g>` layer that overlay nodes are
/// appended to. Text inherits the tree font, set on the root element.
#[derive(Debug, Clone)]
pub struct SvgTree<M: TextMetrics = AdvanceMetrics> {
    nodes: Vec<Option<SvgNode>>,
    free: Vec<usize>,
    root: NodeId,
    layer: NodeId,
    font: Font,
    metrics: M,
}

impl Default for SvgTree {
    fn default() -> Self {
        Self::new(Font::default(), AdvanceMetrics::default())
    }
}

impl<M: TextMetrics> SvgTree<M> {
    pub fn new(font: Font, metrics: M) -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            free: Vec::new(),
            root: NodeId(0),
            layer: NodeId(0),
            font,
            metrics,
        };
        let family = tree.font.family.clone();
        let size = tree.font.size_px.to_string();
        let root = tree.create_element("svg");
        tree.set_attribute(root, "xmlns", SVG_NS);
        tree.set_attribute(root, "font-family", &family);
        tree.set_attribute(root, "font-size", &size);
        let layer = tree.create_element("g");
        tree.append(root, layer);
        tree.root = root;
        tree.layer = layer;
        tree
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Group that overlay nodes live in.
    pub fn layer(&self) -> NodeId {
        self.layer
    }

    pub fn font(&self) -> &Font {
        &self.font
    }

    /// Allocate a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        let node = Some(SvgNode::new(tag));
        match self.free.pop() {
            Some(slot) => {
                self.nodes[slot] = node;
                NodeId(slot)
            }
            None => {
                self.nodes.push(node);
                NodeId(self.nodes.len() - 1)
            }
        }
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Number of live nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append `child` as the last child of `parent`, moving it if attached.
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        if !self.contains(parent) || !self.contains(child) || parent == child {
            return;
        }
        self.unlink(child);
        if let Some(p) = self.node_mut(parent) {
            p.children.push(child);
        }
        if let Some(c) = self.node_mut(child) {
            c.parent = Some(parent);
        }
    }

    /// Remove a node and its subtree. Its ids become stale.
    pub fn detach(&mut self, id: NodeId) {
        if id == self.root || !self.contains(id) {
            return;
        }
        self.unlink(id);
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if let Some(node) = self.nodes[next.0].take() {
                stack.extend(node.children);
                self.free.push(next.0);
            }
        }
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.node(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        self.node(id).map(|n| n.tag.as_str())
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) {
        let Some(node) = self.node_mut(id) else {
            return;
        };
        match node.attributes.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = value.to_string(),
            None => node
                .attributes
                .push((name.to_string(), value.to_string())),
        }
    }

    pub fn remove_attribute(&mut self, id: NodeId, name: &str) {
        if let Some(node) = self.node_mut(id) {
            node.attributes.retain(|(k, _)| k != name);
        }
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.node(id)?
            .attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) {
        let Some(node) = self.node_mut(id) else {
            return;
        };
        for name in class.split_whitespace() {
            if !node.classes.iter().any(|c| c == name) {
                node.classes.push(name.to_string());
            }
        }
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.node(id)
            .is_some_and(|n| n.classes.iter().any(|c| c == class))
    }

    pub fn set_text_content(&mut self, id: NodeId, text: &str) {
        if let Some(node) = self.node_mut(id) {
            node.text = Some(text.to_string());
        }
    }

    pub fn text_content(&self, id: NodeId) -> Option<&str> {
        self.node(id)?.text.as_deref()
    }

    /// Advance width of the node's own text under the tree font.
    ///
    /// Nodes not attached to the document are not rendered and report 0.
    pub fn computed_text_length(&self, id: NodeId) -> f64 {
        if !self.is_rendered(id) {
            return 0.0;
        }
        self.text_content(id)
            .map_or(0.0, |text| self.metrics.text_width(text, &self.font))
    }

    /// Serialize the whole document.
    pub fn to_svg_string(&self) -> String {
        let mut out = String::new();
        self.write_node(&mut out, self.root, 0);
        out
    }

    fn is_rendered(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(c) = current {
            if c == self.root {
                return true;
            }
            current = self.node(c).and_then(|n| n.parent);
        }
        false
    }

    fn unlink(&mut self, id: NodeId) {
        let Some(parent) = self.node(id).and_then(|n| n.parent) else {
            return;
        };
        if let Some(p) = self.node_mut(parent) {
            p.children.retain(|c| *c != id);
        }
        if let Some(n) = self.node_mut(id) {
            n.parent = None;
        }
    }

    fn node(&self, id: NodeId) -> Option<&SvgNode> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut SvgNode> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut)
    }

    fn write_node(&self, out: &mut String, id: NodeId, depth: usize) {
        let Some(node) = self.node(id) else {
            return;
        };
        let indent = "  ".repeat(depth);
        let _ = write!(out, "{indent}<{}", node.tag);
        for (k, v) in &node.attributes {
            let _ = write!(out, " {k}=\"{}\"", escape_xml(v));
        }
        if !node.classes.is_empty() {
            let _ = write!(out, " class=\"{}\"", escape_xml(&node.classes.join(" ")));
        }
        match (&node.text, node.children.is_empty()) {
            (None, true) => out.push_str("/>\n"),
            (Some(text), true) => {
                let _ = writeln!(out, ">{}</{}>", escape_xml(text), node.tag);
            }
            (_, false) => {
                out.push_str(">\n");
                for child in &node.children {
                    self.write_node(out, *child, depth + 1);
                }
                let _ = writeln!(out, "{indent}</{}>", node.tag);
            }
        }
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
