//! Helper functions for the XML tokenizer.
//!
//! This module contains utility functions used throughout the tokenizer:
//! - State transitions ("Switch to", "Reconsume in")
//! - Character classes
//! - Token emission, including ATTLIST default injection
//! - Attribute helpers for duplicate detection and value normalization
//! - Error reporting

use xml5_common::warning::warn_once;

use super::core::{TokenizerState, XmlTokenizer};
use super::token::Token;
use crate::error::{ErrorCode, ParseError, XmlError};

// =============================================================================
// State Transition Helpers
// =============================================================================

impl XmlTokenizer {
    /// Transitions to a new state. The next character is read on the next
    /// iteration of the run loop.
    pub(super) const fn switch_to(&mut self, new_state: TokenizerState) {
        self.state = new_state;
    }

    /// Transitions to a new state and pushes the current character back so
    /// the new state sees it first.
    pub(super) fn reconsume_in(&mut self, new_state: TokenizerState) {
        if let Some(c) = self.current_input_character {
            self.buffer.unget_char(c);
        }
        self.state = new_state;
    }
}

// =============================================================================
// Character Classes
// =============================================================================

/// Whitespace as the tokenizer understands it: tab, LF, vertical tab, form
/// feed, space and CR.
pub(crate) const fn is_space_char(c: char) -> bool {
    matches!(c, '\t' | '\n' | '\x0B' | '\x0C' | ' ' | '\r')
}

/// Attribute-value normalization: literal tab, LF and CR become a space.
pub(super) fn normalize_attribute_char(c: char) -> char {
    if matches!(c, '\t' | '\n' | '\r') { ' ' } else { c }
}

/// [`normalize_attribute_char`] applied to a run of text.
pub(super) fn normalize_attribute_text(text: &str) -> String {
    text.chars().map(normalize_attribute_char).collect()
}

// =============================================================================
// Token Emission Helpers
// =============================================================================

impl XmlTokenizer {
    /// Adds a token to the output stream.
    pub(super) fn emit(&mut self, token: Token) {
        self.token_stream.push(token);
    }

    /// Emits a character token, skipping empty runs.
    pub(super) fn emit_characters(&mut self, data: impl Into<String>) {
        let data = data.into();
        if !data.is_empty() {
            self.emit(Token::Characters { data });
        }
    }

    /// Emits the token under construction and returns to the data state.
    ///
    /// Start and empty tags first receive the ATTLIST defaults declared for
    /// their name that they do not already carry.
    pub(super) fn emit_current_token(&mut self) {
        if let Some(mut token) = self.current_token.take() {
            if let Token::StartTag { name, attributes } | Token::EmptyTag { name, attributes } =
                &mut token
            {
                self.attribute_defaults.apply(name, attributes);
            }
            self.emit(token);
        }
        self.switch_to(TokenizerState::Data);
    }
}

// =============================================================================
// Attribute Helpers
// =============================================================================

impl XmlTokenizer {
    /// Called when leaving the attribute name state. Reports a repeated name;
    /// the attribute stays on the token and the tree builder keeps the first.
    pub(super) fn check_duplicate_attribute(&mut self) {
        let duplicate = self.current_token.as_ref().and_then(|token| {
            token
                .current_attribute_name_is_duplicate()
                .then(|| token.attributes().last().map(|attr| attr.name.clone()))
                .flatten()
        });
        if let Some(name) = duplicate {
            self.parse_error_with(ErrorCode::DuplicateAttribute, name);
        }
    }

    /// Appends to the value of the attribute being read.
    pub(super) fn append_to_attribute_value(&mut self, text: &str) {
        if let Some(token) = self.current_token.as_mut() {
            token.append_to_current_attribute_value(text);
        }
    }

    /// Appends to the tag name or processing instruction target being read.
    pub(super) fn append_to_token_name(&mut self, c: char) {
        if let Some(token) = self.current_token.as_mut() {
            token.append_to_name(c);
        }
    }

    /// Appends to the comment or processing instruction data being read.
    pub(super) fn append_to_token_data(&mut self, text: &str) {
        if let Some(token) = self.current_token.as_mut() {
            token.append_to_data(text);
        }
    }
}

// =============================================================================
// Error Handling
// =============================================================================

impl XmlTokenizer {
    /// Records a recoverable parse error in the token stream and logs it via
    /// the xml5-common warning system.
    pub(super) fn parse_error(&mut self, code: ErrorCode) {
        self.record_error(ParseError::new(code));
    }

    /// Like [`XmlTokenizer::parse_error`], with the offending text attached.
    pub(super) fn parse_error_with(&mut self, code: ErrorCode, data: impl Into<String>) {
        self.record_error(ParseError::with_data(code, data));
    }

    fn record_error(&mut self, error: ParseError) {
        warn_once("XML Tokenizer", &format!("{error} (in {} state)", self.state));
        self.emit(Token::ParseError(error));
    }

    /// Stops tokenization for good. Used for constructs that are deliberately
    /// not handled.
    pub(super) fn fail_unsupported(&mut self, construct: &str) {
        warn_once("XML Tokenizer", &format!("unsupported: {construct}"));
        self.failure = Some(XmlError::Unsupported(construct.to_string()));
    }
}
