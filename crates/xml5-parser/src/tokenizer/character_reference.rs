//! Entity and character reference resolution.
//!
//! Called from the data and attribute value states after `&`, from the entity
//! value states for character references only, and from the internal subset
//! after `%`. Every method here finishes its reads before it touches tokenizer
//! state, so a step that runs out of input can be retried from scratch.

use super::core::XmlTokenizer;
use super::entity_table::EntityTable;
use super::helpers::is_space_char;
use crate::error::{ErrorCode, Input};

/// Windows-1252 code points for references in the range 0x80..=0x9F.
///
/// Positions the code page leaves undefined map to U+FFFD.
const WINDOWS_1252: [u32; 32] = [
    8364, 65533, 8218, 402, 8222, 8230, 8224, 8225, 710, 8240, 352, 8249, 338, 65533, 381, 65533,
    65533, 8216, 8217, 8220, 8221, 8226, 8211, 8212, 732, 8482, 353, 8250, 339, 65533, 382, 376,
];

/// What a reference resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    /// Text to use as-is: a decoded character, or `&` when the reference was
    /// not recognized.
    Text(String),
    /// Replacement text of a named entity. It is pushed back into the input
    /// and tokenized again, so it may contain markup.
    Expansion(String),
}

/// The two entity namespaces a name can be looked up in.
#[derive(Debug, Clone, Copy)]
enum Table {
    General,
    Parameter,
}

impl Table {
    fn names(self, entities: &EntityTable) -> Vec<&str> {
        match self {
            Self::General => entities.general_names().collect(),
            Self::Parameter => entities.parameter_names().collect(),
        }
    }

    fn lookup(self, entities: &EntityTable, name: &str) -> Option<String> {
        match self {
            Self::General => entities.general(name),
            Self::Parameter => entities.parameter(name),
        }
        .map(str::to_string)
    }
}

/// Outcome of the prefix search over declared names.
struct NameMatch {
    /// Every character read after the `&` or `%`.
    consumed: String,
    /// Byte length of the longest prefix of `consumed` that is a declared name.
    matched: Option<usize>,
    /// The match was directly followed by `;`, which was consumed but is not
    /// part of `consumed`.
    terminated: bool,
}

impl XmlTokenizer {
    /// Resolve a reference after `&` was consumed.
    ///
    /// `in_attribute` selects the attribute value rules: an unterminated name
    /// followed by an alphanumeric stays literal, and expansions are escaped
    /// so that quotes and whitespace in them survive re-tokenization.
    pub(super) fn consume_reference(&mut self, in_attribute: bool) -> Input<Reference> {
        let Some(c) = self.buffer.char()? else {
            return Ok(Reference::Text("&".to_string()));
        };
        match c {
            c if is_space_char(c) || c == '<' || c == '&' => {
                self.buffer.unget_char(c);
                Ok(Reference::Text("&".to_string()))
            }
            '#' => Ok(Reference::Text(self.consume_numeric_reference()?)),
            c => self.consume_named_reference(c, in_attribute),
        }
    }

    /// Resolve only character references, after `&` was consumed in an entity
    /// value. Anything else leaves a literal `&`.
    pub(super) fn consume_character_reference_only(&mut self) -> Input<String> {
        match self.buffer.char()? {
            Some('#') => self.consume_numeric_reference(),
            Some(c) => {
                self.buffer.unget_char(c);
                Ok("&".to_string())
            }
            None => Ok("&".to_string()),
        }
    }

    /// Resolve `%name;` in the internal subset after `%` was consumed.
    ///
    /// Returns the replacement text to push back into the input, or `None`
    /// when the name is not a declared parameter entity.
    pub(super) fn consume_parameter_reference(&mut self) -> Input<Option<String>> {
        let Some(first) = self.buffer.char()? else {
            self.parse_error(ErrorCode::ExpectedParameterEntity);
            return Ok(None);
        };
        let found = self.match_entity_name(first, Table::Parameter)?;
        let Some(len) = found.matched else {
            self.buffer.unget(&found.consumed);
            self.parse_error_with(ErrorCode::ExpectedParameterEntity, found.consumed);
            return Ok(None);
        };
        let name = &found.consumed[..len];
        if !found.terminated {
            self.buffer.unget(&found.consumed[len..]);
            self.parse_error_with(ErrorCode::ExpectedParameterEntity, name);
        }
        let Some(value) = Table::Parameter.lookup(&self.entities, name) else {
            return Ok(None);
        };
        Ok(self.admit_expansion(name, value))
    }

    /// `&#` has been consumed.
    fn consume_numeric_reference(&mut self) -> Input<String> {
        let mut consumed = String::from('#');
        let radix = match self.buffer.char()? {
            Some(x @ ('x' | 'X')) => {
                consumed.push(x);
                match self.buffer.char()? {
                    Some(d) if d.is_ascii_hexdigit() => {
                        self.buffer.unget_char(d);
                        16
                    }
                    other => {
                        consumed.extend(other);
                        return Ok(self.not_a_numeric_reference(&consumed));
                    }
                }
            }
            Some(d) if d.is_ascii_digit() => {
                self.buffer.unget_char(d);
                10
            }
            other => {
                consumed.extend(other);
                return Ok(self.not_a_numeric_reference(&consumed));
            }
        };

        let mut digits = String::new();
        let terminator = loop {
            match self.buffer.char()? {
                Some(c) if c.is_digit(radix) => digits.push(c),
                other => break other,
            }
        };

        // Too many digits for a u32 is as invalid as any other out-of-range value.
        let mut code = u32::from_str_radix(&digits, radix).ok();
        match code {
            Some(13) => {
                self.parse_error(ErrorCode::IncorrectCrNewlineEntity);
                code = Some(10);
            }
            Some(v @ 0x80..=0x9F) => {
                self.parse_error_with(
                    ErrorCode::IllegalWindows1252Entity,
                    format!("&{consumed}{digits};"),
                );
                code = usize::try_from(v - 0x80)
                    .ok()
                    .and_then(|i| WINDOWS_1252.get(i).copied());
            }
            _ => {}
        }
        let decoded = match code.filter(|&v| v != 0).and_then(char::from_u32) {
            Some(c) => c,
            None => {
                self.parse_error_with(
                    ErrorCode::CantConvertNumericEntity,
                    format!("&{consumed}{digits};"),
                );
                '\u{FFFD}'
            }
        };
        if terminator != Some(';') {
            self.parse_error(ErrorCode::NumericEntityWithoutSemicolon);
            if let Some(t) = terminator {
                self.buffer.unget_char(t);
            }
        }
        Ok(decoded.to_string())
    }

    fn not_a_numeric_reference(&mut self, consumed: &str) -> String {
        self.buffer.unget(consumed);
        self.parse_error(ErrorCode::ExpectedNumericEntity);
        "&".to_string()
    }

    /// `&` has been consumed and `first` read.
    fn consume_named_reference(&mut self, first: char, in_attribute: bool) -> Input<Reference> {
        let found = self.match_entity_name(first, Table::General)?;
        let Some(len) = found.matched else {
            self.buffer.unget(&found.consumed);
            self.parse_error_with(ErrorCode::ExpectedNamedEntity, found.consumed);
            return Ok(Reference::Text("&".to_string()));
        };
        let name = &found.consumed[..len];
        if !found.terminated {
            let rest = &found.consumed[len..];
            if in_attribute && rest.starts_with(|c: char| c.is_ascii_alphanumeric()) {
                self.buffer.unget(&found.consumed);
                return Ok(Reference::Text("&".to_string()));
            }
            self.buffer.unget(rest);
            self.parse_error_with(ErrorCode::NamedEntityWithoutSemicolon, name);
        }
        let Some(value) = Table::General.lookup(&self.entities, name) else {
            return Ok(Reference::Text("&".to_string()));
        };
        let value = if in_attribute { escape_for_attribute(&value) } else { value };
        Ok(match self.admit_expansion(name, value) {
            Some(text) => Reference::Expansion(text),
            None => Reference::Text(String::new()),
        })
    }

    /// Read a name by narrowing the declared names one character at a time.
    ///
    /// Stops as soon as no declared name starts with what has been read, or
    /// when a complete name is followed by `;`.
    fn match_entity_name(&mut self, first: char, table: Table) -> Input<NameMatch> {
        let mut consumed = String::from(first);
        let mut matched = None;
        let mut candidates = table.names(&self.entities);
        loop {
            candidates.retain(|name| name.starts_with(consumed.as_str()));
            if candidates.is_empty() {
                break;
            }
            let is_name = candidates.contains(&consumed.as_str());
            if is_name {
                matched = Some(consumed.len());
            }
            match self.buffer.char()? {
                Some(';') if is_name => {
                    return Ok(NameMatch {
                        consumed,
                        matched,
                        terminated: true,
                    });
                }
                Some(c) => consumed.push(c),
                None => break,
            }
        }
        Ok(NameMatch {
            consumed,
            matched,
            terminated: false,
        })
    }

    /// Count an expansion against the guard. Over the limit, the reference
    /// expands to nothing and the first refusal in the window is reported.
    fn admit_expansion(&mut self, name: &str, value: String) -> Option<String> {
        if self
            .guard
            .admit(self.buffer.position(), value.chars().count())
        {
            Some(value)
        } else {
            if self.guard.report_limit() {
                self.parse_error_with(ErrorCode::EntityExpansionLimit, name);
            }
            None
        }
    }
}

/// Escape replacement text that is re-read inside an attribute value, so that
/// quotes cannot end the value and whitespace is not normalized away.
#[must_use]
pub fn escape_for_attribute(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\n' | '\r' => escaped.push_str("&#10;"),
            '\t' => escaped.push_str("&#9;"),
            ' ' => escaped.push_str("&#32;"),
            '"' => escaped.push_str("&#34;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}
