//! Error types shared by the tokenizer and the tree builder.
//!
//! Three kinds of outcome are kept apart:
//! - recoverable well-formedness problems are [`ParseError`] values, recorded
//!   in order and never fatal unless strict mode is on;
//! - running out of buffered input is [`NeedMoreInput`], a control-flow signal
//!   that only travels between the buffer and the tokenizer run loop;
//! - [`XmlError`] is what a caller can actually get back as a failure.

use std::fmt;

use serde::Serialize;
use strum_macros::Display;
use thiserror::Error;

/// Stable codes for recoverable parse errors.
///
/// `Display` renders the kebab-case code, e.g. `duplicate-attribute`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum ErrorCode {
    // Character and entity references
    /// `&#` not followed by a decimal digit or `x` plus a hex digit.
    ExpectedNumericEntity,
    /// `&#13;` or `&#xD;`, replaced by a line feed.
    IncorrectCrNewlineEntity,
    /// A reference into the C1 control range, remapped through Windows-1252.
    #[strum(serialize = "illegal-windows-1252-entity")]
    #[serde(rename = "illegal-windows-1252-entity")]
    IllegalWindows1252Entity,
    /// Zero, a surrogate, or a value beyond U+10FFFF; replaced by U+FFFD.
    CantConvertNumericEntity,
    /// A numeric reference without its closing `;`.
    NumericEntityWithoutSemicolon,
    /// `&name` that matches no declared entity.
    ExpectedNamedEntity,
    /// A named reference accepted without its closing `;`.
    NamedEntityWithoutSemicolon,
    /// `%name;` that matches no declared parameter entity.
    ExpectedParameterEntity,
    /// More than sixteen expansions inside one expansion window.
    EntityExpansionLimit,

    // Tags and attributes
    /// A character after `<` or `</` that cannot start a tag name.
    ExpectedTagName,
    /// A `/` in a tag that is not immediately followed by `>`.
    IncorrectlyPlacedSolidus,
    /// An attribute name repeated on the same tag; the first one wins.
    DuplicateAttribute,
    /// A `:` where an attribute name should start.
    UnexpectedColonInAttributeName,
    /// Junk between an end tag's name and its `>`.
    UnexpectedCharacterInEndTag,
    /// Input ended inside a start, empty or end tag.
    EofInTag,

    // Markup declarations and other constructs
    /// `<!` followed by something other than `--`, `[CDATA[` or `DOCTYPE`.
    ExpectedMarkupDeclaration,
    /// `<?` followed by whitespace or the end of input.
    ExpectedPiTarget,
    /// Input ended inside a comment.
    EofInComment,
    /// Input ended inside a CDATA section.
    EofInCdata,
    /// Input ended inside a processing instruction.
    EofInPi,
    /// Input ended inside the DOCTYPE or its internal subset.
    EofInDoctype,
    /// A malformed declaration inside the internal subset, skipped up to `>`.
    BogusDoctypeDeclaration,

    // Tree construction
    /// An end tag whose name matches no open element.
    UnmatchedClose,
    /// Content other than comments, processing instructions and whitespace
    /// before the root element.
    UnexpectedContentBeforeRoot,
    /// Content other than comments, processing instructions and whitespace
    /// after the root element closed.
    UnexpectedContentAfterRoot,
}

/// A recorded well-formedness error: a code plus optional context such as the
/// offending name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseError {
    /// What went wrong.
    pub code: ErrorCode,
    /// The name, character or reference text the error is about, if any.
    pub data: Option<String>,
}

impl ParseError {
    /// An error with no auxiliary data.
    #[must_use]
    pub const fn new(code: ErrorCode) -> Self {
        Self { code, data: None }
    }

    /// An error carrying the offending text.
    #[must_use]
    pub fn with_data(code: ErrorCode, data: impl Into<String>) -> Self {
        Self {
            code,
            data: Some(data.into()),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.data {
            Some(data) => write!(f, "{}: {data}", self.code),
            None => write!(f, "{}", self.code),
        }
    }
}

/// The buffer ran out of text before end of input was signaled.
///
/// Not an error: the run loop rolls back to the last commit and waits for the
/// next chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NeedMoreInput;

/// Result of a buffer read: the value, or a request for more input.
pub type Input<T> = Result<T, NeedMoreInput>;

/// Failures surfaced to the caller. Any partially built tree is discarded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum XmlError {
    /// Strict mode stopped at the first recorded parse error.
    #[error("parse error in strict mode: {0}")]
    Strict(ParseError),
    /// The document uses a construct this parser deliberately does not handle.
    #[error("unsupported construct: {0}")]
    Unsupported(String),
}
