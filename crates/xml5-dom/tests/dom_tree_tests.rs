//! Tests for the arena document tree and the tree dump format.

use xml5_dom::{Attr, DomTree, ElementData, NodeId, NodeType, dump_tree};

/// Helper to create an element node in no namespace and return its `NodeId`.
fn alloc_element(tree: &mut DomTree, tag: &str) -> NodeId {
    tree.alloc(NodeType::Element(ElementData {
        tag_name: tag.to_string(),
        prefix: None,
        local_name: tag.to_string(),
        namespace: String::new(),
        attrs: Vec::new(),
    }))
}

// ========== structure ==========

#[test]
fn test_new_tree_has_only_document() {
    let tree = DomTree::new();
    assert_eq!(tree.len(), 1);
    assert!(!tree.is_empty());
    assert_eq!(tree.root(), NodeId::ROOT);
    assert!(matches!(
        tree.get(NodeId::ROOT).map(|n| &n.node_type),
        Some(NodeType::Document)
    ));
    assert_eq!(tree.document_element(), None);
}

#[test]
fn test_append_child_links_siblings() {
    let mut tree = DomTree::new();
    let root = alloc_element(&mut tree, "root");
    tree.append_child(NodeId::ROOT, root);

    let a = alloc_element(&mut tree, "a");
    let b = alloc_element(&mut tree, "b");
    let c = alloc_element(&mut tree, "c");
    tree.append_child(root, a);
    tree.append_child(root, b);
    tree.append_child(root, c);

    assert_eq!(tree.children(root), &[a, b, c]);
    assert_eq!(tree.first_child(root), Some(a));
    assert_eq!(tree.last_child(root), Some(c));
    assert_eq!(tree.next_sibling(a), Some(b));
    assert_eq!(tree.prev_sibling(c), Some(b));
    assert_eq!(tree.prev_sibling(a), None);
    assert_eq!(tree.next_sibling(c), None);
    assert_eq!(tree.parent(b), Some(root));
    assert_eq!(tree.document_element(), Some(root));
}

#[test]
fn test_append_child_ignores_foreign_ids() {
    let mut tree = DomTree::new();
    tree.append_child(NodeId::ROOT, NodeId(42));
    assert!(tree.children(NodeId::ROOT).is_empty());
}

#[test]
fn test_ancestors_walk_to_document() {
    let mut tree = DomTree::new();
    let outer = alloc_element(&mut tree, "outer");
    let inner = alloc_element(&mut tree, "inner");
    tree.append_child(NodeId::ROOT, outer);
    tree.append_child(outer, inner);

    let ancestors: Vec<NodeId> = tree.ancestors(inner).collect();
    assert_eq!(ancestors, vec![outer, NodeId::ROOT]);
}

// ========== text ==========

#[test]
fn test_insert_text_merges_adjacent_runs() {
    let mut tree = DomTree::new();
    let root = alloc_element(&mut tree, "root");
    tree.append_child(NodeId::ROOT, root);

    tree.insert_text(root, "hello");
    tree.insert_text(root, ", world");

    assert_eq!(tree.children(root).len(), 1);
    let text = tree.children(root)[0];
    assert_eq!(tree.as_text(text), Some("hello, world"));
}

#[test]
fn test_insert_text_after_element_starts_new_node() {
    let mut tree = DomTree::new();
    let root = alloc_element(&mut tree, "root");
    tree.append_child(NodeId::ROOT, root);

    tree.insert_text(root, "a");
    let child = alloc_element(&mut tree, "b");
    tree.append_child(root, child);
    tree.insert_text(root, "c");

    assert_eq!(tree.children(root).len(), 3);
    assert_eq!(tree.text_content(root), "ac");
}

#[test]
fn test_append_to_text_rejects_elements() {
    let mut tree = DomTree::new();
    let element = alloc_element(&mut tree, "e");
    assert!(!tree.append_to_text(element, "x"));
}

// ========== attributes ==========

#[test]
fn test_attribute_lookup_by_name_and_namespace() {
    let data = ElementData {
        tag_name: "root".to_string(),
        prefix: None,
        local_name: "root".to_string(),
        namespace: String::new(),
        attrs: vec![Attr {
            name: "x:id".to_string(),
            prefix: Some("x".to_string()),
            local_name: "id".to_string(),
            namespace: "urn:x".to_string(),
            value: "7".to_string(),
        }],
    };
    assert_eq!(data.attribute("x:id"), Some("7"));
    assert_eq!(data.attribute("id"), None);
    assert_eq!(data.attribute_ns("urn:x", "id"), Some("7"));
    assert_eq!(data.attribute_ns("", "id"), None);
}

// ========== dump ==========

#[test]
fn test_dump_tree_format() {
    let mut tree = DomTree::new();
    let comment = tree.alloc(NodeType::Comment("top".to_string()));
    tree.append_child(NodeId::ROOT, comment);

    let root = tree.alloc(NodeType::Element(ElementData {
        tag_name: "a:root".to_string(),
        prefix: Some("a".to_string()),
        local_name: "root".to_string(),
        namespace: "urn:a".to_string(),
        attrs: vec![Attr {
            name: "k".to_string(),
            prefix: None,
            local_name: "k".to_string(),
            namespace: String::new(),
            value: "v".to_string(),
        }],
    }));
    tree.append_child(NodeId::ROOT, root);
    tree.insert_text(root, "text");
    let pi = tree.alloc(NodeType::ProcessingInstruction {
        target: "t".to_string(),
        data: "d".to_string(),
    });
    tree.append_child(root, pi);

    let expected = "#document\n\
                    | <!-- top -->\n\
                    | <a:root> (a, root, urn:a)\n\
                    |   k=\"v\" (, k, )\n\
                    |   \"text\"\n\
                    |   <?t d?>";
    assert_eq!(dump_tree(&tree), expected);
}

#[test]
fn test_dump_empty_document() {
    assert_eq!(dump_tree(&DomTree::new()), "#document");
}
