//! XML5 tokenizer module.
//!
//! Turns a stream of text chunks into [`Token`]s. Unlike a well-formedness
//! checking XML parser, the tokenizer never gives up on malformed input: every
//! problem becomes a [`Token::ParseError`] in the stream and tokenization
//! carries on.

/// Transactional input buffer with commit, undo and pushback.
pub mod buffer;
/// Entity and character reference resolution.
pub mod character_reference;
/// Tokenizer state machine implementation.
pub mod core;
/// ENTITY and ATTLIST declarations read from the internal subset.
pub mod declarations;
mod doctype;
/// General and parameter entity definitions, and the expansion guard.
pub mod entity_table;
mod helpers;

pub(crate) use helpers::is_space_char;
/// Token types produced by the tokenizer.
pub mod token;

pub use buffer::Buffer;
pub use self::core::{TokenizerState, XmlTokenizer};
pub use entity_table::EntityTable;
pub use token::{Attribute, Token};
