use core::fmt;

use serde::Serialize;

use crate::error::ParseError;

/// An attribute on a start or empty tag token, before namespace resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attribute {
    /// The qualified name as written.
    pub name: String,
    /// The value after entity expansion and whitespace normalization.
    pub value: String,
}

impl Attribute {
    /// Create a new attribute with the given name and value.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// The tokens the tokenizer hands to the tree builder, in document order.
///
/// Parse errors travel in the same stream so that the error list keeps the
/// order in which problems were met.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type")]
pub enum Token {
    /// `<name attr="value">`. Attributes keep source order; a repeated name is
    /// kept here and dropped by the tree builder, so the first one wins.
    StartTag {
        /// The qualified tag name.
        name: String,
        /// Attributes in source order, ATTLIST defaults appended last.
        attributes: Vec<Attribute>,
    },

    /// `<name attr="value"/>`. Same shape as a start tag.
    EmptyTag {
        /// The qualified tag name.
        name: String,
        /// Attributes in source order, ATTLIST defaults appended last.
        attributes: Vec<Attribute>,
    },

    /// `</name>`.
    EndTag {
        /// The qualified tag name.
        name: String,
    },

    /// `</>`, which closes whatever element is innermost.
    EndTagShort,

    /// A run of character data. Consecutive runs are not merged here.
    Characters {
        /// The text.
        data: String,
    },

    /// `<!--data-->`, or the content of a bogus declaration.
    Comment {
        /// The text between the delimiters.
        data: String,
    },

    /// `<?target data?>`.
    Pi {
        /// The target name.
        target: String,
        /// The instruction body, leading whitespace removed.
        data: String,
    },

    /// A recoverable well-formedness error, reported in stream order.
    ParseError(ParseError),
}

impl Token {
    /// Create a start tag token whose name starts with `first`.
    #[must_use]
    pub fn new_start_tag(first: char) -> Self {
        Self::StartTag {
            name: String::from(first),
            attributes: Vec::new(),
        }
    }

    /// Create an end tag token whose name starts with `first`.
    #[must_use]
    pub fn new_end_tag(first: char) -> Self {
        Self::EndTag {
            name: String::from(first),
        }
    }

    /// Create a comment token with empty data.
    #[must_use]
    pub const fn new_comment() -> Self {
        Self::Comment {
            data: String::new(),
        }
    }

    /// Create a processing instruction token whose target starts with `first`.
    #[must_use]
    pub fn new_pi(first: char) -> Self {
        Self::Pi {
            target: String::from(first),
            data: String::new(),
        }
    }

    /// Create a character token.
    #[must_use]
    pub fn new_characters(data: impl Into<String>) -> Self {
        Self::Characters { data: data.into() }
    }

    /// The tag name of a start, empty or end tag.
    #[must_use]
    pub fn tag_name(&self) -> Option<&str> {
        match self {
            Self::StartTag { name, .. } | Self::EmptyTag { name, .. } | Self::EndTag { name } => {
                Some(name.as_str())
            }
            _ => None,
        }
    }

    /// The attributes of a start or empty tag.
    #[must_use]
    pub fn attributes(&self) -> &[Attribute] {
        match self {
            Self::StartTag { attributes, .. } | Self::EmptyTag { attributes, .. } => {
                attributes.as_slice()
            }
            _ => &[],
        }
    }

    // Mutation helpers for the tokenizer. Calling one on the wrong variant
    // leaves the token unchanged.

    /// Append to the tag name, or to the target of a processing instruction.
    pub fn append_to_name(&mut self, c: char) {
        match self {
            Self::StartTag { name, .. }
            | Self::EmptyTag { name, .. }
            | Self::EndTag { name }
            | Self::Pi { target: name, .. } => name.push(c),
            _ => {}
        }
    }

    /// Append to the data of a comment or processing instruction.
    pub fn append_to_data(&mut self, text: &str) {
        if let Self::Comment { data } | Self::Pi { data, .. } = self {
            data.push_str(text);
        }
    }

    /// Turn a start tag into an empty tag, keeping name and attributes.
    pub fn make_empty(&mut self) {
        if let Self::StartTag { name, attributes } = self {
            *self = Self::EmptyTag {
                name: std::mem::take(name),
                attributes: std::mem::take(attributes),
            };
        }
    }

    /// Start a new attribute whose name begins with `first`.
    pub fn start_new_attribute(&mut self, first: char) {
        if let Self::StartTag { attributes, .. } | Self::EmptyTag { attributes, .. } = self {
            attributes.push(Attribute::new(first, String::new()));
        }
    }

    /// Append to the most recently started attribute's name.
    pub fn append_to_current_attribute_name(&mut self, c: char) {
        if let Self::StartTag { attributes, .. } | Self::EmptyTag { attributes, .. } = self
            && let Some(attr) = attributes.last_mut()
        {
            attr.name.push(c);
        }
    }

    /// Append to the most recently started attribute's value.
    pub fn append_to_current_attribute_value(&mut self, text: &str) {
        if let Self::StartTag { attributes, .. } | Self::EmptyTag { attributes, .. } = self
            && let Some(attr) = attributes.last_mut()
        {
            attr.value.push_str(text);
        }
    }

    /// Whether the most recently started attribute repeats an earlier name.
    #[must_use]
    pub fn current_attribute_name_is_duplicate(&self) -> bool {
        match self.attributes().split_last() {
            Some((current, earlier)) => earlier.iter().any(|attr| attr.name == current.name),
            None => false,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::StartTag { name, attributes } | Self::EmptyTag { name, attributes } => {
                write!(f, "<{name}")?;
                for attr in attributes {
                    write!(f, " {}=\"{}\"", attr.name, attr.value)?;
                }
                if matches!(self, Self::EmptyTag { .. }) {
                    write!(f, "/")?;
                }
                write!(f, ">")
            }
            Self::EndTag { name } => write!(f, "</{name}>"),
            Self::EndTagShort => write!(f, "</>"),
            Self::Characters { data } => write!(f, "Characters({data:?})"),
            Self::Comment { data } => write!(f, "<!--{data}-->"),
            Self::Pi { target, data } => write!(f, "<?{target} {data}?>"),
            Self::ParseError(error) => write!(f, "ParseError({error})"),
        }
    }
}
