use std::fmt;

use xml5_dom::{DomTree, ElementData, NodeId, NodeType};

/// Where the tree builder puts what it builds.
///
/// The builder only ever creates nodes and appends them, so a sink needs no
/// removal or reparenting. [`DomTree`] is the stock implementation; a sink
/// that streams nodes elsewhere only has to hand out handles it can resolve
/// later.
pub trait TreeSink {
    /// Identifies a node created by this sink.
    type Handle: Copy + PartialEq + fmt::Debug;

    /// The document node. Top-level content is appended here.
    fn document(&self) -> Self::Handle;

    /// Create a detached element.
    fn create_element(&mut self, element: ElementData) -> Self::Handle;

    /// Create a detached text node.
    fn create_text(&mut self, data: &str) -> Self::Handle;

    /// Create a detached comment.
    fn create_comment(&mut self, data: &str) -> Self::Handle;

    /// Create a detached processing instruction.
    fn create_processing_instruction(&mut self, target: &str, data: &str) -> Self::Handle;

    /// Append `child` as the last child of `parent`.
    fn append_child(&mut self, parent: Self::Handle, child: Self::Handle);

    /// The last child of `parent`, if any.
    fn last_child(&self, parent: Self::Handle) -> Option<Self::Handle>;

    /// Append `data` to the text node `node`. Returns `false` if `node` is
    /// not a text node.
    fn append_to_text(&mut self, node: Self::Handle, data: &str) -> bool;

    /// The value of the attribute `name`, looked up by qualified name, on
    /// the element `element`.
    fn attribute(&self, element: Self::Handle, name: &str) -> Option<&str>;

    /// Append character data to `parent`, merging it into a trailing text
    /// child so adjacent runs become one node.
    fn append_text(&mut self, parent: Self::Handle, data: &str) {
        if let Some(last) = self.last_child(parent)
            && self.append_to_text(last, data)
        {
            return;
        }
        let text = self.create_text(data);
        self.append_child(parent, text);
    }
}

impl TreeSink for DomTree {
    type Handle = NodeId;

    fn document(&self) -> NodeId {
        self.root()
    }

    fn create_element(&mut self, element: ElementData) -> NodeId {
        self.alloc(NodeType::Element(element))
    }

    fn create_text(&mut self, data: &str) -> NodeId {
        self.alloc(NodeType::Text(data.to_string()))
    }

    fn create_comment(&mut self, data: &str) -> NodeId {
        self.alloc(NodeType::Comment(data.to_string()))
    }

    fn create_processing_instruction(&mut self, target: &str, data: &str) -> NodeId {
        self.alloc(NodeType::ProcessingInstruction {
            target: target.to_string(),
            data: data.to_string(),
        })
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) {
        Self::append_child(self, parent, child);
    }

    fn last_child(&self, parent: NodeId) -> Option<NodeId> {
        Self::last_child(self, parent)
    }

    fn append_to_text(&mut self, node: NodeId, data: &str) -> bool {
        Self::append_to_text(self, node, data)
    }

    fn attribute(&self, element: NodeId, name: &str) -> Option<&str> {
        self.as_element(element)?.attribute(name)
    }

    fn append_text(&mut self, parent: NodeId, data: &str) {
        self.insert_text(parent, data);
    }
}
