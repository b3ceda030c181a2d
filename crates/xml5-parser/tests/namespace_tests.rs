//! Tests for namespace resolution of elements and attributes.

use xml5_dom::{Attr, DomTree, ElementData, NodeId};
use xml5_parser::parser::namespace::{declaration_name, split_qualified_name};
use xml5_parser::{XML_NAMESPACE, XMLNS_NAMESPACE, parse_str};

/// Helper to parse a document that is expected to succeed.
fn parse(input: &str) -> DomTree {
    parse_str(input).unwrap()
}

/// Helper to find the first element with the given qualified name, in
/// document order.
fn find_element<'a>(tree: &'a DomTree, tag_name: &str) -> Option<&'a ElementData> {
    fn walk<'a>(tree: &'a DomTree, id: NodeId, tag_name: &str) -> Option<&'a ElementData> {
        if let Some(element) = tree.as_element(id)
            && element.tag_name == tag_name
        {
            return Some(element);
        }
        tree.children(id)
            .iter()
            .find_map(|&child| walk(tree, child, tag_name))
    }
    walk(tree, NodeId::ROOT, tag_name)
}

fn namespace_of<'a>(tree: &'a DomTree, tag_name: &str) -> Option<&'a str> {
    find_element(tree, tag_name).map(|element| element.namespace.as_str())
}

fn attr<'a>(element: &'a ElementData, name: &str) -> Option<&'a Attr> {
    element.attrs.iter().find(|attr| attr.name == name)
}

// ========== name splitting ==========

#[test]
fn test_split_at_first_colon() {
    assert_eq!(split_qualified_name("a"), (None, "a"));
    assert_eq!(split_qualified_name("p:a"), (Some("p"), "a"));
    assert_eq!(split_qualified_name("a:b:c"), (Some("a"), "b:c"));
}

#[test]
fn test_declaration_name() {
    assert_eq!(declaration_name(None), "xmlns");
    assert_eq!(declaration_name(Some("svg")), "xmlns:svg");
}

// ========== elements ==========

#[test]
fn test_no_declarations_means_no_namespace() {
    let tree = parse("<a><b/></a>");
    assert_eq!(namespace_of(&tree, "a"), Some(""));
    assert_eq!(namespace_of(&tree, "b"), Some(""));
}

#[test]
fn test_default_namespace_is_inherited() {
    let tree = parse(r#"<a xmlns="urn:a"><b/></a>"#);
    assert_eq!(namespace_of(&tree, "a"), Some("urn:a"));
    assert_eq!(namespace_of(&tree, "b"), Some("urn:a"));
}

#[test]
fn test_default_namespace_can_be_undeclared() {
    let tree = parse(r#"<a xmlns="urn:a"><b xmlns=""><c/></b></a>"#);
    assert_eq!(namespace_of(&tree, "b"), Some(""));
    assert_eq!(namespace_of(&tree, "c"), Some(""));
}

#[test]
fn test_prefixed_element() {
    let tree = parse(r#"<p:a xmlns:p="urn:p"><p:b/></p:a>"#);
    let b = find_element(&tree, "p:b");
    assert_eq!(b.map(|e| e.namespace.as_str()), Some("urn:p"));
    assert_eq!(b.and_then(|e| e.prefix.as_deref()), Some("p"));
    assert_eq!(b.map(|e| e.local_name.as_str()), Some("b"));
}

#[test]
fn test_innermost_declaration_wins() {
    let tree = parse(r#"<a xmlns:p="urn:1"><b xmlns:p="urn:2"><p:c/></b><p:d/></a>"#);
    assert_eq!(namespace_of(&tree, "p:c"), Some("urn:2"));
    assert_eq!(namespace_of(&tree, "p:d"), Some("urn:1"));
}

#[test]
fn test_undeclared_prefix_has_no_namespace() {
    let tree = parse("<q:a/>");
    let a = find_element(&tree, "q:a");
    assert_eq!(a.map(|e| e.namespace.as_str()), Some(""));
    assert_eq!(a.and_then(|e| e.prefix.as_deref()), Some("q"));
}

// ========== attributes ==========

#[test]
fn test_unprefixed_attribute_ignores_default_namespace() {
    let tree = parse(r#"<a xmlns="urn:a" k="v"/>"#);
    let a = find_element(&tree, "a").unwrap();
    assert_eq!(attr(a, "k").map(|at| at.namespace.as_str()), Some(""));
}

#[test]
fn test_namespace_declarations_are_in_xmlns_namespace() {
    let tree = parse(r#"<a xmlns="urn:a" xmlns:p="urn:p"/>"#);
    let a = find_element(&tree, "a").unwrap();

    let default = attr(a, "xmlns").unwrap();
    assert_eq!(default.namespace, XMLNS_NAMESPACE);
    assert_eq!(default.prefix, None);
    assert_eq!(default.local_name, "xmlns");

    let prefixed = attr(a, "xmlns:p").unwrap();
    assert_eq!(prefixed.namespace, XMLNS_NAMESPACE);
    assert_eq!(prefixed.prefix.as_deref(), Some("xmlns"));
    assert_eq!(prefixed.local_name, "p");
}

#[test]
fn test_xml_prefix_needs_no_declaration() {
    let tree = parse(r#"<a xml:lang="en"/>"#);
    let a = find_element(&tree, "a").unwrap();
    assert_eq!(
        attr(a, "xml:lang").map(|at| at.namespace.as_str()),
        Some(XML_NAMESPACE)
    );
    assert_eq!(a.attribute_ns(XML_NAMESPACE, "lang"), Some("en"));
}

#[test]
fn test_prefixed_attribute_uses_ancestor_declaration() {
    let tree = parse(r#"<p:a xmlns:p="urn:p"><p:b q="1" p:r="2"/></p:a>"#);
    let b = find_element(&tree, "p:b").unwrap();
    assert_eq!(attr(b, "q").map(|at| at.namespace.as_str()), Some(""));
    assert_eq!(attr(b, "p:r").map(|at| at.namespace.as_str()), Some("urn:p"));
    assert_eq!(b.attribute_ns("urn:p", "r"), Some("2"));
}

#[test]
fn test_attributes_equal_after_resolution_keep_first() {
    let tree = parse(r#"<a xmlns:p="urn:x" xmlns:q="urn:x" p:k="1" q:k="2"/>"#);
    let a = find_element(&tree, "a").unwrap();
    let names: Vec<&str> = a.attrs.iter().map(|at| at.name.as_str()).collect();
    assert_eq!(names, vec!["xmlns:p", "xmlns:q", "p:k"]);
    assert_eq!(a.attribute_ns("urn:x", "k"), Some("1"));
}

#[test]
fn test_duplicate_attribute_keeps_first_value() {
    let tree = parse(r#"<a x="1" x="2"/>"#);
    let a = find_element(&tree, "a").unwrap();
    assert_eq!(a.attrs.len(), 1);
    assert_eq!(a.attribute("x"), Some("1"));
}
