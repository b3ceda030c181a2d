//! Tree construction.
//!
//! The parser consumes tokens in three phases: before the root element,
//! inside it, and after it closes. Elements are namespace-resolved as they
//! are created and handed to a [`TreeSink`].

/// Phase-driven tree builder.
pub mod core;
/// Namespace resolution for element and attribute names.
pub mod namespace;
/// The interface between the tree builder and the tree it builds.
pub mod sink;

pub use self::core::{Phase, XmlParser, parse_str, parse_str_with_errors};
pub use namespace::{XML_NAMESPACE, XMLNS_NAMESPACE};
pub use sink::TreeSink;
