//! Namespace resolution for elements and attributes.
//!
//! Names are split at the first colon. A prefix is resolved by looking for
//! the matching `xmlns` or `xmlns:prefix` declaration, first on the tag being
//! resolved and then on the open elements from the innermost outwards. The
//! `xml` and `xmlns` prefixes are bound to their fixed namespaces and need no
//! declaration.

use xml5_dom::{Attr, ElementData};

use crate::tokenizer::Attribute;

/// The namespace bound to the `xml` prefix.
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// The namespace of `xmlns` and `xmlns:*` declarations.
pub const XMLNS_NAMESPACE: &str = "http://www.w3.org/2000/xmlns/";

/// Split a qualified name into prefix and local name at the first colon.
#[must_use]
pub fn split_qualified_name(name: &str) -> (Option<&str>, &str) {
    match name.split_once(':') {
        Some((prefix, local_name)) => (Some(prefix), local_name),
        None => (None, name),
    }
}

/// The attribute that declares `prefix`: `xmlns:prefix`, or `xmlns` for the
/// default namespace.
#[must_use]
pub fn declaration_name(prefix: Option<&str>) -> String {
    prefix.map_or_else(|| "xmlns".to_string(), |prefix| format!("xmlns:{prefix}"))
}

/// Resolves a tag's name and attributes against the declarations in scope.
///
/// `in_scope` is asked for the value of a declaration attribute, e.g.
/// `xmlns:svg`, on the open elements; the tag's own attributes are checked
/// before it is called.
pub struct NamespaceResolver<'a, F> {
    attributes: &'a [Attribute],
    in_scope: F,
}

impl<'a, F> NamespaceResolver<'a, F>
where
    F: Fn(&str) -> Option<String>,
{
    /// A resolver for a tag carrying `attributes`.
    #[must_use]
    pub const fn new(attributes: &'a [Attribute], in_scope: F) -> Self {
        Self {
            attributes,
            in_scope,
        }
    }

    /// The namespace `prefix` is bound to. Undeclared prefixes, and the
    /// default namespace when nothing declares it, resolve to `""`.
    fn lookup(&self, prefix: Option<&str>) -> String {
        let declaration = declaration_name(prefix);
        self.attributes
            .iter()
            .find(|attr| attr.name == declaration)
            .map(|attr| attr.value.clone())
            .or_else(|| (self.in_scope)(&declaration))
            .unwrap_or_default()
    }

    fn element_namespace(&self, prefix: Option<&str>) -> String {
        match prefix {
            Some("xmlns") => XMLNS_NAMESPACE.to_string(),
            Some("xml") => XML_NAMESPACE.to_string(),
            prefix => self.lookup(prefix),
        }
    }

    /// Unprefixed attributes are in no namespace, whatever the default
    /// namespace is.
    fn attribute_namespace(&self, name: &str, prefix: Option<&str>) -> String {
        match prefix {
            _ if name == "xmlns" => XMLNS_NAMESPACE.to_string(),
            Some("xmlns") => XMLNS_NAMESPACE.to_string(),
            Some("xml") => XML_NAMESPACE.to_string(),
            Some(prefix) => self.lookup(Some(prefix)),
            None => String::new(),
        }
    }

    /// Build the element for the tag `name`.
    ///
    /// Attributes that resolve to the same local name and namespace as an
    /// earlier one are dropped.
    #[must_use]
    pub fn resolve(&self, name: &str) -> ElementData {
        let (prefix, local_name) = split_qualified_name(name);
        let namespace = self.element_namespace(prefix);

        let mut attrs: Vec<Attr> = Vec::with_capacity(self.attributes.len());
        for attribute in self.attributes {
            let (attr_prefix, attr_local) = split_qualified_name(&attribute.name);
            let attr_namespace = self.attribute_namespace(&attribute.name, attr_prefix);
            if attrs
                .iter()
                .any(|a| a.local_name == attr_local && a.namespace == attr_namespace)
            {
                continue;
            }
            attrs.push(Attr {
                name: attribute.name.clone(),
                prefix: attr_prefix.map(str::to_string),
                local_name: attr_local.to_string(),
                namespace: attr_namespace,
                value: attribute.value.clone(),
            });
        }

        ElementData {
            tag_name: name.to_string(),
            prefix: prefix.map(str::to_string),
            local_name: local_name.to_string(),
            namespace,
            attrs,
        }
    }
}
