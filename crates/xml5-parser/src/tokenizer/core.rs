use strum_macros::Display;

use super::buffer::Buffer;
use super::character_reference::Reference;
use super::declarations::{AttributeDefaults, EntityDeclaration};
use super::entity_table::{EntityTable, ExpansionGuard};
use super::helpers::{is_space_char, normalize_attribute_char, normalize_attribute_text};
use super::token::Token;
use crate::error::{ErrorCode, Input, NeedMoreInput, XmlError};

/// The tokenizer state machine.
///
/// States prefixed with `Doctype` belong to the DOCTYPE declaration and its
/// internal subset; their handlers live in the `doctype` module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum TokenizerState {
    /// Character data between tags.
    Data,
    /// After `<`.
    Tag,
    /// After `</`.
    EndTag,
    /// Inside an end tag name.
    EndTagName,
    /// After an end tag name, waiting for `>`.
    EndTagNameAfter,
    /// After `<?`.
    Pi,
    /// Inside a processing instruction target.
    PiTarget,
    /// Whitespace after a processing instruction target.
    PiTargetAfter,
    /// Processing instruction data.
    PiContent,
    /// After a `?` in processing instruction data.
    PiAfter,
    /// After `<!`.
    MarkupDeclaration,
    /// Comment data.
    Comment,
    /// After a `-` in comment data.
    CommentDash,
    /// After `--` in comment data.
    CommentEnd,
    /// CDATA section content.
    Cdata,
    /// After a `]` in a CDATA section.
    CdataBracket,
    /// After `]]` in a CDATA section.
    CdataEnd,
    /// After `<!DOCTYPE`.
    Doctype,
    /// Whitespace before the DOCTYPE root name.
    DoctypeRootNameBefore,
    /// Inside the DOCTYPE root name.
    DoctypeRootName,
    /// After the DOCTYPE root name.
    DoctypeRootNameAfter,
    /// A double-quoted public or system identifier.
    DoctypeIdentifierDoubleQuoted,
    /// A single-quoted public or system identifier.
    DoctypeIdentifierSingleQuoted,
    /// Inside `[...]`.
    DoctypeInternalSubset,
    /// After the closing `]` of the internal subset.
    DoctypeInternalSubsetAfter,
    /// After `<` in the internal subset.
    DoctypeTag,
    /// After `<!` in the internal subset.
    DoctypeMarkupDeclaration,
    /// Comment inside the internal subset.
    DoctypeComment,
    /// After a `-` in an internal subset comment.
    DoctypeCommentDash,
    /// After `--` in an internal subset comment.
    DoctypeCommentEnd,
    /// After `<!ENTITY`.
    DoctypeEntity,
    /// Whitespace before the entity name or `%`.
    DoctypeEntityTypeBefore,
    /// After the `%` of a parameter entity declaration.
    DoctypeEntityParameterBefore,
    /// Whitespace before a parameter entity name.
    DoctypeEntityParameter,
    /// Inside an entity name.
    DoctypeEntityName,
    /// After an entity name.
    DoctypeEntityNameAfter,
    /// A double-quoted entity value.
    DoctypeEntityValDoubleQuoted,
    /// A single-quoted entity value.
    DoctypeEntityValSingleQuoted,
    /// After an entity value, waiting for `>`.
    DoctypeEntityValAfter,
    /// An external identifier, `SYSTEM` or `PUBLIC` plus literals.
    DoctypeEntityIdentifier,
    /// A double-quoted literal in an external identifier.
    DoctypeEntityIdentifierDoubleQuoted,
    /// A single-quoted literal in an external identifier.
    DoctypeEntityIdentifierSingleQuoted,
    /// After `<!ATTLIST`.
    DoctypeAttlist,
    /// Whitespace before the element name of an ATTLIST.
    DoctypeAttlistNameBefore,
    /// Inside the element name of an ATTLIST.
    DoctypeAttlistName,
    /// After the element name, or after a complete attribute definition.
    DoctypeAttlistNameAfter,
    /// Inside an attribute name.
    DoctypeAttlistAttrname,
    /// After an attribute name.
    DoctypeAttlistAttrnameAfter,
    /// Inside an attribute type.
    DoctypeAttlistAttrtype,
    /// After an attribute type.
    DoctypeAttlistAttrtypeAfter,
    /// After the `#` of a default declaration.
    DoctypeAttlistAttrdeclBefore,
    /// Inside `#REQUIRED`, `#IMPLIED` or `#FIXED`.
    DoctypeAttlistAttrdecl,
    /// After a default declaration keyword.
    DoctypeAttlistAttrdeclAfter,
    /// A double-quoted default value.
    DoctypeAttlistAttrvalDoubleQuoted,
    /// A single-quoted default value.
    DoctypeAttlistAttrvalSingleQuoted,
    /// After `<!NOTATION`.
    DoctypeNotation,
    /// Inside a notation declaration.
    DoctypeNotationIdentifier,
    /// A double-quoted literal in a notation declaration.
    DoctypeNotationIdentifierDoubleQuoted,
    /// A single-quoted literal in a notation declaration.
    DoctypeNotationIdentifierSingleQuoted,
    /// A processing instruction inside the internal subset.
    DoctypePi,
    /// After a `?` in an internal subset processing instruction.
    DoctypePiAfter,
    /// A malformed internal subset declaration, skipped up to `>`.
    DoctypeBogusComment,
    /// Inside a start tag name.
    TagName,
    /// After a `/` in a start tag.
    EmptyTag,
    /// Whitespace before an attribute name.
    TagAttributeNameBefore,
    /// Inside an attribute name.
    TagAttributeName,
    /// After an attribute name.
    TagAttributeNameAfter,
    /// After `=`.
    TagAttributeValueBefore,
    /// A double-quoted attribute value.
    TagAttributeValueDoubleQuoted,
    /// A single-quoted attribute value.
    TagAttributeValueSingleQuoted,
    /// An unquoted attribute value.
    TagAttributeValueUnquoted,
    /// A malformed `<!` or `<?` construct, read up to `>` as a comment.
    BogusComment,
}

/// A streaming XML5 tokenizer.
///
/// Input arrives in chunks through [`XmlTokenizer::feed`]. Each step of the
/// state machine is atomic: either it completes and the buffer commits, or it
/// runs out of text and everything it did is rolled back until the next
/// chunk. The token stream is therefore the same however the input is split.
///
/// The tokenizer owns the entity table and the ATTLIST defaults, since the
/// internal subset is read here and both affect later tokens.
#[derive(Debug)]
pub struct XmlTokenizer {
    pub(super) state: TokenizerState,
    pub(super) buffer: Buffer,
    pub(super) current_input_character: Option<char>,
    pub(super) current_token: Option<Token>,
    pub(super) current_entity: Option<EntityDeclaration>,
    pub(super) entities: EntityTable,
    pub(super) attribute_defaults: AttributeDefaults,
    pub(super) guard: ExpansionGuard,
    pub(super) token_stream: Vec<Token>,
    pub(super) failure: Option<XmlError>,
    finished: bool,
}

/// What a rolled-back step has to restore besides the buffer.
struct Checkpoint {
    state: TokenizerState,
    tokens: usize,
    guard: ExpansionGuard,
}

impl Default for XmlTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl XmlTokenizer {
    /// Create a tokenizer in the data state with no input.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: TokenizerState::Data,
            buffer: Buffer::new(),
            current_input_character: None,
            current_token: None,
            current_entity: None,
            entities: EntityTable::new(),
            attribute_defaults: AttributeDefaults::default(),
            guard: ExpansionGuard::default(),
            token_stream: Vec::new(),
            failure: None,
            finished: false,
        }
    }

    /// Tokenize a complete document in one go.
    #[must_use]
    pub fn tokenize(input: &str) -> Vec<Token> {
        let mut tokenizer = Self::new();
        tokenizer.feed(input);
        tokenizer.end();
        tokenizer.into_tokens()
    }

    /// Append a chunk of input and tokenize as far as it allows.
    ///
    /// Ignored once input has ended or tokenization has failed.
    pub fn feed(&mut self, chunk: &str) {
        if self.buffer.is_eof() || self.finished {
            return;
        }
        self.buffer.append(chunk);
        self.run();
    }

    /// Signal end of input and tokenize whatever is left.
    pub fn end(&mut self) {
        self.buffer.set_eof();
        self.run();
    }

    /// Run the state machine until it needs more input, reaches the end, or
    /// hits an unsupported construct.
    pub fn run(&mut self) {
        while !self.finished {
            if self.failure.is_some() {
                self.finished = true;
                return;
            }
            let checkpoint = self.checkpoint();
            match self.step() {
                Ok(true) => self.buffer.commit(),
                Ok(false) => {
                    self.buffer.commit();
                    self.finished = true;
                }
                Err(NeedMoreInput) => {
                    self.rollback(checkpoint);
                    self.buffer.undo();
                    return;
                }
            }
        }
    }

    /// Remove and return the tokens produced so far.
    pub fn take_tokens(&mut self) -> Vec<Token> {
        std::mem::take(&mut self.token_stream)
    }

    /// Consume the tokenizer and return the tokens it has not handed out yet.
    #[must_use]
    pub fn into_tokens(self) -> Vec<Token> {
        self.token_stream
    }

    /// Whether tokenization is over: the end of input has been fully
    /// tokenized, or a fatal error stopped it.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// The current state.
    #[must_use]
    pub const fn state(&self) -> TokenizerState {
        self.state
    }

    /// The fatal error that stopped tokenization, if any.
    #[must_use]
    pub const fn failure(&self) -> Option<&XmlError> {
        self.failure.as_ref()
    }

    /// Take the fatal error that stopped tokenization, if any.
    pub const fn take_failure(&mut self) -> Option<XmlError> {
        self.failure.take()
    }

    /// Entities declared so far, built-ins included.
    #[must_use]
    pub const fn entities(&self) -> &EntityTable {
        &self.entities
    }

    /// ATTLIST declarations seen so far.
    #[must_use]
    pub const fn attribute_defaults(&self) -> &AttributeDefaults {
        &self.attribute_defaults
    }

    fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            state: self.state,
            tokens: self.token_stream.len(),
            guard: self.guard,
        }
    }

    fn rollback(&mut self, checkpoint: Checkpoint) {
        self.state = checkpoint.state;
        self.token_stream.truncate(checkpoint.tokens);
        self.guard = checkpoint.guard;
    }

    /// One atomic step: read a character and run the current state's handler.
    ///
    /// Returns `false` once the data state reads the end of input. Handlers
    /// do all of their reading before they change anything outside the
    /// buffer, which is what makes rolling back a failed step this simple.
    fn step(&mut self) -> Input<bool> {
        self.current_input_character = self.buffer.char()?;
        if self.state == TokenizerState::Data && self.current_input_character.is_none() {
            return Ok(false);
        }

        match self.state {
            TokenizerState::Data => self.handle_data_state()?,
            TokenizerState::Tag => self.handle_tag_state(),
            TokenizerState::EndTag => self.handle_end_tag_state(),
            TokenizerState::EndTagName => self.handle_end_tag_name_state(),
            TokenizerState::EndTagNameAfter => self.handle_end_tag_name_after_state(),
            TokenizerState::Pi => self.handle_pi_state(),
            TokenizerState::PiTarget => self.handle_pi_target_state(),
            TokenizerState::PiTargetAfter => self.handle_pi_target_after_state(),
            TokenizerState::PiContent => self.handle_pi_content_state()?,
            TokenizerState::PiAfter => self.handle_pi_after_state(),
            TokenizerState::MarkupDeclaration => self.handle_markup_declaration_state()?,
            TokenizerState::Comment => self.handle_comment_state()?,
            TokenizerState::CommentDash => self.handle_comment_dash_state(),
            TokenizerState::CommentEnd => self.handle_comment_end_state(),
            TokenizerState::Cdata => self.handle_cdata_state()?,
            TokenizerState::CdataBracket => self.handle_cdata_bracket_state(),
            TokenizerState::CdataEnd => self.handle_cdata_end_state(),
            TokenizerState::Doctype => self.handle_doctype_state(),
            TokenizerState::DoctypeRootNameBefore => self.handle_doctype_root_name_before_state(),
            TokenizerState::DoctypeRootName => self.handle_doctype_root_name_state(),
            TokenizerState::DoctypeRootNameAfter => self.handle_doctype_root_name_after_state(),
            TokenizerState::DoctypeIdentifierDoubleQuoted => {
                self.handle_doctype_identifier_quoted_state('"');
            }
            TokenizerState::DoctypeIdentifierSingleQuoted => {
                self.handle_doctype_identifier_quoted_state('\'');
            }
            TokenizerState::DoctypeInternalSubset => self.handle_doctype_internal_subset_state()?,
            TokenizerState::DoctypeInternalSubsetAfter => {
                self.handle_doctype_internal_subset_after_state();
            }
            TokenizerState::DoctypeTag => self.handle_doctype_tag_state(),
            TokenizerState::DoctypeMarkupDeclaration => {
                self.handle_doctype_markup_declaration_state()?;
            }
            TokenizerState::DoctypeComment => self.handle_doctype_comment_state(),
            TokenizerState::DoctypeCommentDash => self.handle_doctype_comment_dash_state(),
            TokenizerState::DoctypeCommentEnd => self.handle_doctype_comment_end_state(),
            TokenizerState::DoctypeEntity => self.handle_doctype_entity_state(),
            TokenizerState::DoctypeEntityTypeBefore => {
                self.handle_doctype_entity_type_before_state();
            }
            TokenizerState::DoctypeEntityParameterBefore => {
                self.handle_doctype_entity_parameter_before_state();
            }
            TokenizerState::DoctypeEntityParameter => self.handle_doctype_entity_parameter_state(),
            TokenizerState::DoctypeEntityName => self.handle_doctype_entity_name_state(),
            TokenizerState::DoctypeEntityNameAfter => self.handle_doctype_entity_name_after_state(),
            TokenizerState::DoctypeEntityValDoubleQuoted => {
                self.handle_doctype_entity_value_state('"')?;
            }
            TokenizerState::DoctypeEntityValSingleQuoted => {
                self.handle_doctype_entity_value_state('\'')?;
            }
            TokenizerState::DoctypeEntityValAfter => self.handle_doctype_entity_value_after_state(),
            TokenizerState::DoctypeEntityIdentifier => {
                self.handle_doctype_entity_identifier_state();
            }
            TokenizerState::DoctypeEntityIdentifierDoubleQuoted => {
                self.handle_doctype_entity_identifier_quoted_state('"');
            }
            TokenizerState::DoctypeEntityIdentifierSingleQuoted => {
                self.handle_doctype_entity_identifier_quoted_state('\'');
            }
            TokenizerState::DoctypeAttlist => self.handle_doctype_attlist_state(),
            TokenizerState::DoctypeAttlistNameBefore => {
                self.handle_doctype_attlist_name_before_state();
            }
            TokenizerState::DoctypeAttlistName => self.handle_doctype_attlist_name_state(),
            TokenizerState::DoctypeAttlistNameAfter => {
                self.handle_doctype_attlist_name_after_state();
            }
            TokenizerState::DoctypeAttlistAttrname => self.handle_doctype_attlist_attrname_state(),
            TokenizerState::DoctypeAttlistAttrnameAfter => {
                self.handle_doctype_attlist_attrname_after_state();
            }
            TokenizerState::DoctypeAttlistAttrtype => self.handle_doctype_attlist_attrtype_state(),
            TokenizerState::DoctypeAttlistAttrtypeAfter => {
                self.handle_doctype_attlist_attrtype_after_state();
            }
            TokenizerState::DoctypeAttlistAttrdeclBefore => {
                self.handle_doctype_attlist_attrdecl_before_state();
            }
            TokenizerState::DoctypeAttlistAttrdecl => self.handle_doctype_attlist_attrdecl_state(),
            TokenizerState::DoctypeAttlistAttrdeclAfter => {
                self.handle_doctype_attlist_attrdecl_after_state();
            }
            TokenizerState::DoctypeAttlistAttrvalDoubleQuoted => {
                self.handle_doctype_attlist_attrval_state('"');
            }
            TokenizerState::DoctypeAttlistAttrvalSingleQuoted => {
                self.handle_doctype_attlist_attrval_state('\'');
            }
            TokenizerState::DoctypeNotation => self.handle_doctype_notation_state(),
            TokenizerState::DoctypeNotationIdentifier => {
                self.handle_doctype_notation_identifier_state();
            }
            TokenizerState::DoctypeNotationIdentifierDoubleQuoted => {
                self.handle_doctype_notation_identifier_quoted_state('"');
            }
            TokenizerState::DoctypeNotationIdentifierSingleQuoted => {
                self.handle_doctype_notation_identifier_quoted_state('\'');
            }
            TokenizerState::DoctypePi => self.handle_doctype_pi_state(),
            TokenizerState::DoctypePiAfter => self.handle_doctype_pi_after_state(),
            TokenizerState::DoctypeBogusComment => self.handle_doctype_bogus_comment_state()?,
            TokenizerState::TagName => self.handle_tag_name_state(),
            TokenizerState::EmptyTag => self.handle_empty_tag_state(),
            TokenizerState::TagAttributeNameBefore => self.handle_tag_attribute_name_before_state(),
            TokenizerState::TagAttributeName => self.handle_tag_attribute_name_state(),
            TokenizerState::TagAttributeNameAfter => self.handle_tag_attribute_name_after_state(),
            TokenizerState::TagAttributeValueBefore => {
                self.handle_tag_attribute_value_before_state();
            }
            TokenizerState::TagAttributeValueDoubleQuoted => {
                self.handle_tag_attribute_value_quoted_state('"')?;
            }
            TokenizerState::TagAttributeValueSingleQuoted => {
                self.handle_tag_attribute_value_quoted_state('\'')?;
            }
            TokenizerState::TagAttributeValueUnquoted => {
                self.handle_tag_attribute_value_unquoted_state()?;
            }
            TokenizerState::BogusComment => self.handle_bogus_comment_state()?,
        }
        Ok(true)
    }

    // =========================================================================
    // Content
    // =========================================================================

    fn handle_data_state(&mut self) -> Input<()> {
        match self.current_input_character {
            Some('&') => match self.consume_reference(false)? {
                Reference::Text(text) => self.emit_characters(text),
                Reference::Expansion(text) => self.buffer.unget(&text),
            },
            Some('<') => self.switch_to(TokenizerState::Tag),
            Some(c) => {
                let rest = self.buffer.match_until(|c| c == '&' || c == '<')?;
                let mut data = String::from(c);
                data.push_str(&rest);
                self.emit_characters(data);
            }
            // End of input in the data state is handled by `step`.
            None => {}
        }
        Ok(())
    }

    /// After `<`.
    fn handle_tag_state(&mut self) {
        match self.current_input_character {
            Some('/') => self.switch_to(TokenizerState::EndTag),
            Some('?') => self.switch_to(TokenizerState::Pi),
            Some('!') => self.switch_to(TokenizerState::MarkupDeclaration),
            Some(c) if is_space_char(c) || matches!(c, '<' | '>' | ':') => {
                self.parse_error_with(ErrorCode::ExpectedTagName, c);
                self.emit_characters("<");
                self.reconsume_in(TokenizerState::Data);
            }
            None => {
                self.parse_error(ErrorCode::ExpectedTagName);
                self.emit_characters("<");
                self.switch_to(TokenizerState::Data);
            }
            Some(c) => {
                self.current_token = Some(Token::new_start_tag(c));
                self.switch_to(TokenizerState::TagName);
            }
        }
    }

    /// After `</`. `</>` closes the innermost element.
    fn handle_end_tag_state(&mut self) {
        match self.current_input_character {
            Some('>') => {
                self.emit(Token::EndTagShort);
                self.switch_to(TokenizerState::Data);
            }
            Some(c) if is_space_char(c) || matches!(c, '<' | ':') => {
                self.parse_error_with(ErrorCode::ExpectedTagName, c);
                self.emit_characters("</");
                self.reconsume_in(TokenizerState::Data);
            }
            None => {
                self.parse_error(ErrorCode::ExpectedTagName);
                self.emit_characters("</");
                self.switch_to(TokenizerState::Data);
            }
            Some(c) => {
                self.current_token = Some(Token::new_end_tag(c));
                self.switch_to(TokenizerState::EndTagName);
            }
        }
    }

    fn handle_end_tag_name_state(&mut self) {
        match self.current_input_character {
            Some(c) if is_space_char(c) => self.switch_to(TokenizerState::EndTagNameAfter),
            Some('>') => self.emit_current_token(),
            None => {
                self.parse_error(ErrorCode::EofInTag);
                self.emit_current_token();
            }
            Some(c) => self.append_to_token_name(c),
        }
    }

    fn handle_end_tag_name_after_state(&mut self) {
        match self.current_input_character {
            Some('>') => self.emit_current_token(),
            Some(c) if is_space_char(c) => {}
            None => {
                self.parse_error(ErrorCode::EofInTag);
                self.emit_current_token();
            }
            Some(c) => self.parse_error_with(ErrorCode::UnexpectedCharacterInEndTag, c),
        }
    }

    /// After `<?`.
    fn handle_pi_state(&mut self) {
        match self.current_input_character {
            Some(c) if is_space_char(c) => {
                self.parse_error(ErrorCode::ExpectedPiTarget);
                self.buffer.unget(&format!("?{c}"));
                self.switch_to(TokenizerState::BogusComment);
            }
            None => {
                self.parse_error(ErrorCode::ExpectedPiTarget);
                self.buffer.unget_char('?');
                self.switch_to(TokenizerState::BogusComment);
            }
            Some(c) => {
                self.current_token = Some(Token::new_pi(c));
                self.switch_to(TokenizerState::PiTarget);
            }
        }
    }

    fn handle_pi_target_state(&mut self) {
        match self.current_input_character {
            Some(c) if is_space_char(c) => self.switch_to(TokenizerState::PiTargetAfter),
            Some('?') => self.switch_to(TokenizerState::PiAfter),
            None => {
                self.parse_error(ErrorCode::EofInPi);
                self.emit_current_token();
            }
            Some(c) => self.append_to_token_name(c),
        }
    }

    fn handle_pi_target_after_state(&mut self) {
        match self.current_input_character {
            Some(c) if is_space_char(c) => {}
            _ => self.reconsume_in(TokenizerState::PiContent),
        }
    }

    fn handle_pi_content_state(&mut self) -> Input<()> {
        match self.current_input_character {
            Some('?') => self.switch_to(TokenizerState::PiAfter),
            None => {
                self.parse_error(ErrorCode::EofInPi);
                self.emit_current_token();
            }
            Some(c) => {
                let rest = self.buffer.match_until(|c| c == '?')?;
                self.append_to_token_data(&format!("{c}{rest}"));
            }
        }
        Ok(())
    }

    /// After a `?` in instruction data. A `?` not followed by `>` is data.
    fn handle_pi_after_state(&mut self) {
        match self.current_input_character {
            Some('>') => self.emit_current_token(),
            Some('?') => self.append_to_token_data("?"),
            None => {
                self.parse_error(ErrorCode::EofInPi);
                self.append_to_token_data("?");
                self.emit_current_token();
            }
            Some(_) => {
                self.append_to_token_data("?");
                self.reconsume_in(TokenizerState::PiContent);
            }
        }
    }

    /// After `<!`: `--` opens a comment, `[CDATA[` a CDATA section, `DOCTYPE`
    /// a document type declaration. Anything else is a bogus comment.
    fn handle_markup_declaration_state(&mut self) -> Input<()> {
        let mut lookahead: String = self.current_input_character.into_iter().collect();
        lookahead.extend(self.buffer.char()?);
        if lookahead == "--" {
            self.current_token = Some(Token::new_comment());
            self.switch_to(TokenizerState::Comment);
            return Ok(());
        }
        for _ in 0..5 {
            lookahead.extend(self.buffer.char()?);
        }
        match lookahead.as_str() {
            "[CDATA[" => self.switch_to(TokenizerState::Cdata),
            "DOCTYPE" => self.switch_to(TokenizerState::Doctype),
            _ => {
                self.parse_error(ErrorCode::ExpectedMarkupDeclaration);
                self.buffer.unget(&lookahead);
                self.switch_to(TokenizerState::BogusComment);
            }
        }
        Ok(())
    }

    fn handle_comment_state(&mut self) -> Input<()> {
        match self.current_input_character {
            Some('-') => self.switch_to(TokenizerState::CommentDash),
            None => {
                self.parse_error(ErrorCode::EofInComment);
                self.emit_current_token();
            }
            Some(c) => {
                let rest = self.buffer.match_until(|c| c == '-')?;
                self.append_to_token_data(&format!("{c}{rest}"));
            }
        }
        Ok(())
    }

    fn handle_comment_dash_state(&mut self) {
        match self.current_input_character {
            Some('-') => self.switch_to(TokenizerState::CommentEnd),
            None => {
                self.parse_error(ErrorCode::EofInComment);
                self.emit_current_token();
            }
            Some(_) => {
                self.append_to_token_data("-");
                self.reconsume_in(TokenizerState::Comment);
            }
        }
    }

    /// After `--`. An extra `-` is folded into the data.
    fn handle_comment_end_state(&mut self) {
        match self.current_input_character {
            Some('>') => self.emit_current_token(),
            Some('-') => self.append_to_token_data("-"),
            None => {
                self.parse_error(ErrorCode::EofInComment);
                self.emit_current_token();
            }
            Some(_) => {
                self.append_to_token_data("--");
                self.reconsume_in(TokenizerState::Comment);
            }
        }
    }

    fn handle_cdata_state(&mut self) -> Input<()> {
        match self.current_input_character {
            Some(']') => self.switch_to(TokenizerState::CdataBracket),
            None => {
                self.parse_error(ErrorCode::EofInCdata);
                self.switch_to(TokenizerState::Data);
            }
            Some(c) => {
                let rest = self.buffer.match_until(|c| c == ']')?;
                self.emit_characters(format!("{c}{rest}"));
            }
        }
        Ok(())
    }

    fn handle_cdata_bracket_state(&mut self) {
        match self.current_input_character {
            Some(']') => self.switch_to(TokenizerState::CdataEnd),
            None => {
                self.parse_error(ErrorCode::EofInCdata);
                self.emit_characters("]");
                self.switch_to(TokenizerState::Data);
            }
            Some(_) => {
                self.emit_characters("]");
                self.reconsume_in(TokenizerState::Cdata);
            }
        }
    }

    /// After `]]`. An extra `]` is section content.
    fn handle_cdata_end_state(&mut self) {
        match self.current_input_character {
            Some('>') => self.switch_to(TokenizerState::Data),
            Some(']') => self.emit_characters("]"),
            None => {
                self.parse_error(ErrorCode::EofInCdata);
                self.emit_characters("]]");
                self.switch_to(TokenizerState::Data);
            }
            Some(_) => {
                self.emit_characters("]]");
                self.reconsume_in(TokenizerState::Cdata);
            }
        }
    }

    fn handle_bogus_comment_state(&mut self) -> Input<()> {
        let data = match self.current_input_character {
            Some('>') | None => String::new(),
            Some(c) => {
                let rest = self.buffer.match_until(|c| c == '>')?;
                let _ = self.buffer.char()?;
                format!("{c}{rest}")
            }
        };
        self.emit(Token::Comment { data });
        self.switch_to(TokenizerState::Data);
        Ok(())
    }

    // =========================================================================
    // Tags and attributes
    // =========================================================================

    fn handle_tag_name_state(&mut self) {
        match self.current_input_character {
            Some(c) if is_space_char(c) => self.switch_to(TokenizerState::TagAttributeNameBefore),
            Some('>') => self.emit_current_token(),
            Some('/') => self.switch_to(TokenizerState::EmptyTag),
            None => {
                self.parse_error(ErrorCode::EofInTag);
                self.emit_current_token();
            }
            Some(c) => self.append_to_token_name(c),
        }
    }

    /// After `/` in a start tag.
    fn handle_empty_tag_state(&mut self) {
        if self.current_input_character == Some('>') {
            if let Some(token) = self.current_token.as_mut() {
                token.make_empty();
            }
            self.emit_current_token();
        } else {
            self.parse_error(ErrorCode::IncorrectlyPlacedSolidus);
            self.reconsume_in(TokenizerState::TagAttributeNameBefore);
        }
    }

    fn handle_tag_attribute_name_before_state(&mut self) {
        match self.current_input_character {
            Some(c) if is_space_char(c) => {}
            Some('>') => self.emit_current_token(),
            Some('/') => self.switch_to(TokenizerState::EmptyTag),
            Some(':') => self.parse_error(ErrorCode::UnexpectedColonInAttributeName),
            None => {
                self.parse_error(ErrorCode::EofInTag);
                self.emit_current_token();
            }
            Some(c) => {
                if let Some(token) = self.current_token.as_mut() {
                    token.start_new_attribute(c);
                }
                self.switch_to(TokenizerState::TagAttributeName);
            }
        }
    }

    fn handle_tag_attribute_name_state(&mut self) {
        match self.current_input_character {
            Some('=') => {
                self.check_duplicate_attribute();
                self.switch_to(TokenizerState::TagAttributeValueBefore);
            }
            Some('>') => {
                self.check_duplicate_attribute();
                self.emit_current_token();
            }
            Some(c) if is_space_char(c) => {
                self.check_duplicate_attribute();
                self.switch_to(TokenizerState::TagAttributeNameAfter);
            }
            Some('/') => {
                self.check_duplicate_attribute();
                self.switch_to(TokenizerState::EmptyTag);
            }
            None => {
                self.check_duplicate_attribute();
                self.parse_error(ErrorCode::EofInTag);
                self.emit_current_token();
            }
            Some(c) => {
                if let Some(token) = self.current_token.as_mut() {
                    token.append_to_current_attribute_name(c);
                }
            }
        }
    }

    fn handle_tag_attribute_name_after_state(&mut self) {
        match self.current_input_character {
            Some(c) if is_space_char(c) => {}
            Some('=') => self.switch_to(TokenizerState::TagAttributeValueBefore),
            Some('>') => self.emit_current_token(),
            Some('/') => self.switch_to(TokenizerState::EmptyTag),
            Some(':') => self.parse_error(ErrorCode::UnexpectedColonInAttributeName),
            None => {
                self.parse_error(ErrorCode::EofInTag);
                self.emit_current_token();
            }
            Some(c) => {
                if let Some(token) = self.current_token.as_mut() {
                    token.start_new_attribute(c);
                }
                self.switch_to(TokenizerState::TagAttributeName);
            }
        }
    }

    fn handle_tag_attribute_value_before_state(&mut self) {
        match self.current_input_character {
            Some(c) if is_space_char(c) => {}
            Some('"') => self.switch_to(TokenizerState::TagAttributeValueDoubleQuoted),
            Some('\'') => self.switch_to(TokenizerState::TagAttributeValueSingleQuoted),
            Some('&') => self.reconsume_in(TokenizerState::TagAttributeValueUnquoted),
            Some('>') => self.emit_current_token(),
            None => {
                self.parse_error(ErrorCode::EofInTag);
                self.emit_current_token();
            }
            Some(c) => {
                self.append_to_attribute_value(&normalize_attribute_char(c).to_string());
                self.switch_to(TokenizerState::TagAttributeValueUnquoted);
            }
        }
    }

    fn handle_tag_attribute_value_quoted_state(&mut self, quote: char) -> Input<()> {
        match self.current_input_character {
            Some(c) if c == quote => self.switch_to(TokenizerState::TagAttributeNameBefore),
            Some('&') => self.attribute_value_reference()?,
            None => {
                self.parse_error(ErrorCode::EofInTag);
                self.emit_current_token();
            }
            Some(c) => {
                let rest = self.buffer.match_until(|c| c == quote || c == '&')?;
                let value = normalize_attribute_text(&format!("{c}{rest}"));
                self.append_to_attribute_value(&value);
            }
        }
        Ok(())
    }

    fn handle_tag_attribute_value_unquoted_state(&mut self) -> Input<()> {
        match self.current_input_character {
            Some(c) if is_space_char(c) => self.switch_to(TokenizerState::TagAttributeNameBefore),
            Some('&') => self.attribute_value_reference()?,
            Some('>') => self.emit_current_token(),
            None => {
                self.parse_error(ErrorCode::EofInTag);
                self.emit_current_token();
            }
            Some(c) => {
                let rest = self
                    .buffer
                    .match_until(|c| is_space_char(c) || matches!(c, '&' | '>'))?;
                self.append_to_attribute_value(&format!("{c}{rest}"));
            }
        }
        Ok(())
    }

    fn attribute_value_reference(&mut self) -> Input<()> {
        match self.consume_reference(true)? {
            Reference::Text(text) => self.append_to_attribute_value(&text),
            Reference::Expansion(text) => self.buffer.unget(&text),
        }
        Ok(())
    }
}
