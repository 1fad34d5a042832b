// ABOUTME: Document tree for the reveal-slides application
// ABOUTME: Arena-allocated nodes, pending annotations, and data-attribute merging

use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::options::OptionValue;

/// Default MathJax source used when no local copy exists and the document
/// does not name one.
pub const MATHJAX_CDN: &str = "https://cdnjs.cloudflare.com/ajax/libs/mathjax/2.7.0/MathJax.js";

/// Stable handle to a node in the document tree. Annotations attach by
/// node identity, so handles must survive tree mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Document,
    /// A slide or sub-slide; `level` is the heading depth that opened it
    /// (1 = presentation title, 2 = slide, 3 = vertical sub-slide).
    Section { level: usize },
    Title { html: String, text: String },
    Subtitle { html: String },
    /// Rendered Markdown body content.
    Content { html: String },
    /// Raw HTML emitted directly by a directive.
    RawHtml { html: String },
    /// Speaker-notes aside for the enclosing slide.
    Aside { classes: Vec<String> },
    /// Placeholder holding a deferred annotation until its resolver runs.
    Pending(Pending),
    /// Inline error marker, visible in the rendered output.
    SystemMessage { message: String, source: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pending {
    pub annotation: Annotation,
    pub line: usize,
    pub raw: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Annotation {
    Background(Background),
    Transition(Transition),
    SlideState(SlideState),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnnotationKind {
    Background,
    Transition,
    SlideState,
}

impl Annotation {
    pub fn kind(&self) -> AnnotationKind {
        match self {
            Annotation::Background(_) => AnnotationKind::Background,
            Annotation::Transition(_) => AnnotationKind::Transition,
            Annotation::SlideState(_) => AnnotationKind::SlideState,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Background {
    pub image: Option<String>,
    pub color: Option<String>,
    pub size: Option<String>,
    pub position: Option<String>,
    pub repeat: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub style: String,
    pub speed: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SlideState {
    pub classes: Vec<String>,
    pub timing: Option<i64>,
    pub notes: Option<String>,
}

/// MathJax source and configuration for the generated init script.
#[derive(Debug, Clone)]
pub struct MathJax {
    pub url: String,
    pub config: String,
}

impl Default for MathJax {
    fn default() -> Self {
        Self {
            url: MATHJAX_CDN.to_string(),
            config: "TeX-AMS_HTML-full".to_string(),
        }
    }
}

#[derive(Debug)]
pub struct Node {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Presentation data-attributes for the node's section tag.
    /// Absent means empty; created on first merge.
    pub attribs: Option<BTreeMap<String, String>>,
}

/// The parsed document: an arena of nodes plus document-level configuration
/// recorded by directives.
#[derive(Debug)]
pub struct DocTree {
    nodes: Vec<Node>,
    pending: Vec<NodeId>,
    /// reveal.js initialization options recorded by the `reveal::` directive.
    pub reveal: BTreeMap<String, OptionValue>,
    /// Title-page metadata recorded by the `titlepage::` directive.
    pub titledata: BTreeMap<String, String>,
    pub theme: Option<String>,
    pub hljs_style: Option<String>,
    pub reveal_dir: Option<PathBuf>,
    pub mathjax: MathJax,
    pub uses_math: bool,
    /// `configure::` overrides for the converter itself.
    pub title_override: Option<String>,
    pub stylesheets: Vec<String>,
    pub embed_stylesheets: Option<bool>,
}

impl Default for DocTree {
    fn default() -> Self {
        Self::new()
    }
}

impl DocTree {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                kind: NodeKind::Document,
                parent: None,
                children: Vec::new(),
                attribs: None,
            }],
            pending: Vec::new(),
            reveal: BTreeMap::new(),
            titledata: BTreeMap::new(),
            theme: None,
            hljs_style: None,
            reveal_dir: None,
            mathjax: MathJax::default(),
            uses_math: false,
            title_override: None,
            stylesheets: Vec::new(),
            embed_stylesheets: None,
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    pub fn is_section(&self, id: NodeId) -> bool {
        matches!(self.node(id).kind, NodeKind::Section { .. })
    }

    pub fn section_level(&self, id: NodeId) -> Option<usize> {
        match self.node(id).kind {
            NodeKind::Section { level } => Some(level),
            _ => None,
        }
    }

    /// Append a new node as the last child of `parent`. Placeholder nodes
    /// are registered with the document's pending list automatically.
    pub fn append_child(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        let is_pending = matches!(kind, NodeKind::Pending(_));
        self.nodes.push(Node {
            kind,
            parent: Some(parent),
            children: Vec::new(),
            attribs: None,
        });
        self.nodes[parent.0].children.push(id);
        if is_pending {
            self.pending.push(id);
        }
        id
    }

    /// Insert a new node at `index` among the children of `parent`.
    pub fn insert_child_at(&mut self, parent: NodeId, index: usize, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent: Some(parent),
            children: Vec::new(),
            attribs: None,
        });
        self.nodes[parent.0].children.insert(index, id);
        id
    }

    /// Remove a node from its parent's child list. The node itself stays in
    /// the arena so existing handles remain valid.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.nodes[id.0].parent.take() {
            self.nodes[parent.0].children.retain(|&child| child != id);
        }
    }

    /// Detach a node and re-append it as the last child of `new_parent`.
    pub fn reparent(&mut self, id: NodeId, new_parent: NodeId) {
        self.detach(id);
        self.nodes[id.0].parent = Some(new_parent);
        self.nodes[new_parent.0].children.push(id);
    }

    /// Detach a node and re-insert it at `index` among the children of
    /// `new_parent`.
    pub fn reparent_at(&mut self, id: NodeId, new_parent: NodeId, index: usize) {
        self.detach(id);
        self.nodes[id.0].parent = Some(new_parent);
        self.nodes[new_parent.0].children.insert(index, id);
    }

    /// Replace a node's kind in place, keeping its position in the tree.
    /// Used to turn a failed placeholder into a visible error marker.
    pub fn replace_kind(&mut self, id: NodeId, kind: NodeKind) {
        self.nodes[id.0].kind = kind;
    }

    pub fn position_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|&child| child == id)
    }

    /// Placeholders registered during parsing, in document order.
    pub fn pending_ids(&self) -> Vec<NodeId> {
        self.pending.clone()
    }

    /// Mark a placeholder as consumed by its resolver.
    pub fn consume_pending(&mut self, id: NodeId) {
        self.pending.retain(|&p| p != id);
    }

    /// Merge data-attributes onto a node. Scalar attributes are
    /// last-write-wins; the `data-state` class list is unioned, appending
    /// new tokens in order and skipping tokens already present.
    pub fn merge_attribs(&mut self, id: NodeId, atts: BTreeMap<String, String>) {
        let attribs = self.nodes[id.0].attribs.get_or_insert_with(BTreeMap::new);
        for (key, value) in atts {
            if key == "data-state" {
                if let Some(existing) = attribs.get_mut(&key) {
                    for token in value.split_whitespace() {
                        if !existing.split_whitespace().any(|t| t == token) {
                            existing.push(' ');
                            existing.push_str(token);
                        }
                    }
                    continue;
                }
            }
            attribs.insert(key, value);
        }
    }

    /// Find the section that follows `node` in document order: scan the
    /// remaining siblings for a section, then ascend and repeat from just
    /// after the containing child, until a section is found or the root is
    /// exhausted. Sections nested inside a non-section sibling are not
    /// candidates. The search only applies while the ancestor chain consists
    /// of sections or the document root.
    pub fn next_section_after(&self, node: NodeId) -> Option<NodeId> {
        let mut child = node;
        let mut parent = self.parent(child)?;
        loop {
            if !matches!(
                self.node(parent).kind,
                NodeKind::Document | NodeKind::Section { .. }
            ) {
                return None;
            }
            let index = self.position_in_parent(child)?;
            for &sibling in &self.children(parent)[index + 1..] {
                if self.is_section(sibling) {
                    return Some(sibling);
                }
            }
            child = parent;
            parent = self.parent(child)?;
        }
    }

    /// Walk the subtree below `id` in document order (excluding `id` itself).
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            result.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        result
    }

    /// True if any section is reachable from the root.
    pub fn has_sections(&self) -> bool {
        self.descendants(self.root())
            .iter()
            .any(|&id| self.is_section(id))
    }

    /// The document title text, if the title promotion has produced one.
    pub fn doc_title_text(&self) -> Option<&str> {
        let first = *self.children(self.root()).first()?;
        match &self.node(first).kind {
            NodeKind::Title { text, .. } => Some(text),
            _ => None,
        }
    }
}
