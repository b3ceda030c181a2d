use std::fmt::{self, Write};

use super::{DomTree, NodeId, NodeType};

/// Render the tree in the line-oriented format used by XML5 conformance tests.
///
/// The first line is `#document`. Every other node gets its own line starting
/// with `|`, indented two spaces per level below the document:
///
/// ```text
/// #document
/// | <a:root> (a, root, urn:a)
/// |   xmlns:a="urn:a" (xmlns, a, http://www.w3.org/2000/xmlns/)
/// |   "text"
/// |   <!-- note -->
/// |   <?target data?>
/// ```
#[must_use]
pub fn dump_tree(tree: &DomTree) -> String {
    let mut out = String::from("#document");
    for &child in tree.children(NodeId::ROOT) {
        // Writing into a String cannot fail.
        let _ = dump_node(tree, child, 1, &mut out);
    }
    out
}

fn dump_node(tree: &DomTree, id: NodeId, indent: usize, out: &mut String) -> fmt::Result {
    let Some(node) = tree.get(id) else {
        return Ok(());
    };
    let pad = " ".repeat(indent);
    match &node.node_type {
        NodeType::Document => {}
        NodeType::Element(data) => {
            write!(
                out,
                "\n|{pad}<{}> ({}, {}, {})",
                data.tag_name,
                data.prefix.as_deref().unwrap_or_default(),
                data.local_name,
                data.namespace
            )?;
            let attr_pad = " ".repeat(indent + 2);
            for attr in &data.attrs {
                write!(
                    out,
                    "\n|{attr_pad}{}=\"{}\" ({}, {}, {})",
                    attr.name,
                    attr.value,
                    attr.prefix.as_deref().unwrap_or_default(),
                    attr.local_name,
                    attr.namespace
                )?;
            }
        }
        NodeType::Text(data) => write!(out, "\n|{pad}\"{data}\"")?,
        NodeType::Comment(data) => write!(out, "\n|{pad}<!-- {data} -->")?,
        NodeType::ProcessingInstruction { target, data } => {
            write!(out, "\n|{pad}<?{target} {data}?>")?;
        }
    }
    for &child in tree.children(id) {
        dump_node(tree, child, indent + 2, out)?;
    }
    Ok(())
}
