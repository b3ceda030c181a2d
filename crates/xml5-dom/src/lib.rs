//! Document tree for the xml5 parser.
//!
//! This crate provides an arena-based tree of the node kinds an XML document
//! produces: the document itself, namespace-aware elements, text, comments
//! and processing instructions.
//!
//! # Design
//!
//! The tree uses arena allocation with [`NodeId`] indices for all relationships,
//! providing O(1) access and traversal without borrow checker issues. Every
//! node is owned by the arena; a node's parent link is the only ownership edge
//! callers observe.

mod dump;

pub use dump::dump_tree;

/// A type-safe index into the document tree.
///
/// `NodeId` provides O(1) access to any node in the tree without borrowing issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The root document node is always at index 0.
    pub const ROOT: Self = Self(0);
}

/// A node in the arena.
///
/// Stores indices for parent/child/sibling relationships, enabling O(1)
/// traversal in any direction.
#[derive(Debug, Clone)]
pub struct Node {
    /// What kind of node this is, with its payload.
    pub node_type: NodeType,
    /// The parent node, `None` for the document and for detached nodes.
    pub parent: Option<NodeId>,
    /// Children in document order.
    pub children: Vec<NodeId>,
    /// The sibling immediately following this node.
    pub next_sibling: Option<NodeId>,
    /// The sibling immediately preceding this node.
    pub prev_sibling: Option<NodeId>,
}

/// The kinds of node an XML document tree contains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeType {
    /// The document node, always at [`NodeId::ROOT`].
    Document,
    /// An element with its resolved name and attributes.
    Element(ElementData),
    /// Character data. Adjacent text siblings are always merged.
    Text(String),
    /// A comment's data, without the `<!--` and `-->` delimiters.
    Comment(String),
    /// A processing instruction such as `<?xml-stylesheet href="a.css"?>`.
    ProcessingInstruction {
        /// The target name following `<?`.
        target: String,
        /// Everything after the target and its separating whitespace.
        data: String,
    },
}

/// A namespace-resolved attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attr {
    /// The qualified name as written, e.g. `xlink:href`.
    pub name: String,
    /// The part before the colon, if any.
    pub prefix: Option<String>,
    /// The part after the colon, or the whole name.
    pub local_name: String,
    /// The resolved namespace URI; empty when the attribute is in no namespace.
    pub namespace: String,
    /// The attribute value after entity expansion.
    pub value: String,
}

/// Element-specific data.
///
/// Elements carry the qualified name they were written with and the
/// `(prefix, local name, namespace)` triple resolved from the `xmlns`
/// declarations in scope when the element was created.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    /// The qualified tag name as written, e.g. `svg:rect`.
    pub tag_name: String,
    /// The part before the colon, if any.
    pub prefix: Option<String>,
    /// The part after the colon, or the whole name.
    pub local_name: String,
    /// The resolved namespace URI; empty when the element is in no namespace.
    pub namespace: String,
    /// Attributes in source order, one per `(local name, namespace)` pair.
    pub attrs: Vec<Attr>,
}

impl ElementData {
    /// Look up an attribute value by its qualified name as written.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| attr.value.as_str())
    }

    /// Look up an attribute value by namespace URI and local name.
    #[must_use]
    pub fn attribute_ns(&self, namespace: &str, local_name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|attr| attr.namespace == namespace && attr.local_name == local_name)
            .map(|attr| attr.value.as_str())
    }
}

/// Arena-based document tree with O(1) node access and traversal.
///
/// This structure stores all nodes in a contiguous vector, using indices
/// for all relationships. This provides:
/// - O(1) access to any node by `NodeId`
/// - O(1) parent/sibling traversal
/// - No borrowing issues (indices instead of references)
#[derive(Debug, Clone)]
pub struct DomTree {
    /// All nodes in the tree, indexed by `NodeId`.
    /// The Document node is always at index 0 (`NodeId::ROOT`).
    nodes: Vec<Node>,
}

impl DomTree {
    /// Create a new tree with just the Document node.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Node {
                node_type: NodeType::Document,
                parent: None,
                children: Vec::new(),
                next_sibling: None,
                prev_sibling: None,
            }],
        }
    }

    /// Get the root document node ID.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Get a node by its ID.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Get a mutable reference to a node by its ID.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    /// Get the number of nodes in the tree, detached ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the tree is empty (it always holds at least the Document).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate a new node and return its ID.
    /// The node is not yet attached to the tree.
    pub fn alloc(&mut self, node_type: NodeType) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            node_type,
            parent: None,
            children: Vec::new(),
            next_sibling: None,
            prev_sibling: None,
        });
        id
    }

    /// Appends `child` as the last child of `parent`, updating all relationships.
    ///
    /// Ids that do not belong to this tree are ignored.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        if parent.0 >= self.nodes.len() || child.0 >= self.nodes.len() {
            return;
        }
        let prev_last_child = self.nodes[parent.0].children.last().copied();

        self.nodes[parent.0].children.push(child);
        self.nodes[child.0].parent = Some(parent);

        if let Some(prev_id) = prev_last_child {
            self.nodes[prev_id.0].next_sibling = Some(child);
            self.nodes[child.0].prev_sibling = Some(prev_id);
        }
    }

    /// Append `data` to the text node `id`.
    ///
    /// Returns `false` and leaves the tree untouched if `id` is not a text node.
    pub fn append_to_text(&mut self, id: NodeId, data: &str) -> bool {
        match self.get_mut(id).map(|node| &mut node.node_type) {
            Some(NodeType::Text(text)) => {
                text.push_str(data);
                true
            }
            _ => false,
        }
    }

    /// Insert `data` as the last text of `parent`, merging with a trailing
    /// text child when there is one.
    pub fn insert_text(&mut self, parent: NodeId, data: &str) {
        if let Some(last) = self.last_child(parent)
            && self.append_to_text(last, data)
        {
            return;
        }
        let text = self.alloc(NodeType::Text(data.to_string()));
        self.append_child(parent, text);
    }

    /// Get the parent of a node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// Get all children of a node.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |n| n.children.as_slice())
    }

    /// Get the first child of a node.
    #[must_use]
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.children.first().copied())
    }

    /// Get the last child of a node.
    #[must_use]
    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.children.last().copied())
    }

    /// Get the next sibling of a node.
    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.next_sibling)
    }

    /// Get the previous sibling of a node.
    #[must_use]
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.prev_sibling)
    }

    /// Iterate over all ancestors of a node, from parent to root.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> AncestorIterator<'_> {
        AncestorIterator {
            tree: self,
            current: self.parent(id),
        }
    }

    /// Get element data if this node is an element.
    #[must_use]
    pub fn as_element(&self, id: NodeId) -> Option<&ElementData> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Element(data) => Some(data),
            _ => None,
        })
    }

    /// Get text content if this node is a text node.
    #[must_use]
    pub fn as_text(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(|n| match &n.node_type {
            NodeType::Text(s) => Some(s.as_str()),
            _ => None,
        })
    }

    /// The document element: the element child of the document, if any.
    #[must_use]
    pub fn document_element(&self) -> Option<NodeId> {
        self.children(NodeId::ROOT)
            .iter()
            .find(|&&id| self.as_element(id).is_some())
            .copied()
    }

    /// Concatenated data of all text descendants of `id`, in document order.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        let mut result = String::new();
        self.collect_text(id, &mut result);
        result
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        if let Some(text) = self.as_text(id) {
            out.push_str(text);
            return;
        }
        for &child in self.children(id) {
            self.collect_text(child, out);
        }
    }
}

impl Default for DomTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over ancestors of a node.
pub struct AncestorIterator<'a> {
    tree: &'a DomTree,
    current: Option<NodeId>,
}

impl Iterator for AncestorIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.tree.parent(id);
        Some(id)
    }
}
