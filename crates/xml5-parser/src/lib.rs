//! Streaming XML5 tokenizer and tree builder.
//!
//! XML5 parses any input into a tree, the way HTML parsers do: malformed
//! markup produces recorded parse errors, never a refusal.
//!
//! # Scope
//!
//! This crate implements:
//! - **Tokenizer** ([`tokenizer`])
//!   - Chunked input over a transactional buffer, so the token stream does
//!     not depend on where chunks are split
//!   - Tags, attributes, comments, CDATA sections, processing instructions
//!   - Named, numeric and parameter entity references, with a limit on
//!     recursive expansion
//!   - The DOCTYPE internal subset: `<!ENTITY>` and `<!ATTLIST>` defaults
//!
//! - **Tree builder** ([`parser`])
//!   - Start, main and end phases around the root element
//!   - `</>` short end tags and recovery from unmatched end tags
//!   - Namespace resolution for elements and attributes
//!   - Optional strict mode that stops at the first parse error
//!
//! # Not Implemented
//!
//! - External entities and external DTD subsets
//! - DTD validation
//! - Entity or parameter references inside ATTLIST default values, which
//!   stop the parse with [`XmlError::Unsupported`]

/// Parse errors and fatal errors.
pub mod error;
/// Tree construction from tokens.
pub mod parser;
/// XML5 tokenizer.
pub mod tokenizer;

pub use error::{ErrorCode, ParseError, XmlError};
pub use parser::{
    Phase, TreeSink, XML_NAMESPACE, XMLNS_NAMESPACE, XmlParser, parse_str, parse_str_with_errors,
};
pub use tokenizer::{Attribute, Token, XmlTokenizer};
