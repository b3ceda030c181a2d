//! DOCTYPE and internal subset states.
//!
//! The DOCTYPE itself produces no token. What matters is the internal subset:
//! `<!ENTITY>` declarations feed the entity table, `<!ATTLIST>` declarations
//! feed the attribute defaults, and everything else (`<!NOTATION>`, comments,
//! processing instructions, malformed declarations) is read and dropped.

use super::core::{TokenizerState, XmlTokenizer};
use super::declarations::{EntityDeclaration, EntityKind};
use super::helpers::{is_space_char, normalize_attribute_char};
use crate::error::{ErrorCode, Input};

impl XmlTokenizer {
    /// End of input anywhere in the DOCTYPE: report it and drop whatever
    /// declaration was in progress.
    fn eof_in_doctype(&mut self) {
        self.parse_error(ErrorCode::EofInDoctype);
        self.current_entity = None;
        self.switch_to(TokenizerState::Data);
    }

    fn bogus_declaration(&mut self) {
        self.parse_error(ErrorCode::BogusDoctypeDeclaration);
        self.current_entity = None;
        self.reconsume_in(TokenizerState::DoctypeBogusComment);
    }

    // =========================================================================
    // The declaration itself
    // =========================================================================

    pub(super) fn handle_doctype_state(&mut self) {
        match self.current_input_character {
            Some(c) if is_space_char(c) => self.switch_to(TokenizerState::DoctypeRootNameBefore),
            None => self.eof_in_doctype(),
            Some(_) => {
                self.parse_error(ErrorCode::BogusDoctypeDeclaration);
                self.reconsume_in(TokenizerState::BogusComment);
            }
        }
    }

    pub(super) fn handle_doctype_root_name_before_state(&mut self) {
        match self.current_input_character {
            Some(c) if is_space_char(c) => {}
            Some('>') => self.switch_to(TokenizerState::Data),
            None => self.eof_in_doctype(),
            Some(_) => self.switch_to(TokenizerState::DoctypeRootName),
        }
    }

    pub(super) fn handle_doctype_root_name_state(&mut self) {
        match self.current_input_character {
            Some(c) if is_space_char(c) => self.switch_to(TokenizerState::DoctypeRootNameAfter),
            Some('>') => self.switch_to(TokenizerState::Data),
            Some('[') => self.switch_to(TokenizerState::DoctypeInternalSubset),
            None => self.eof_in_doctype(),
            Some(_) => {}
        }
    }

    /// Between the root name and the internal subset. External identifiers
    /// are skipped.
    pub(super) fn handle_doctype_root_name_after_state(&mut self) {
        match self.current_input_character {
            Some('>') => self.switch_to(TokenizerState::Data),
            Some('"') => self.switch_to(TokenizerState::DoctypeIdentifierDoubleQuoted),
            Some('\'') => self.switch_to(TokenizerState::DoctypeIdentifierSingleQuoted),
            Some('[') => self.switch_to(TokenizerState::DoctypeInternalSubset),
            None => self.eof_in_doctype(),
            Some(_) => {}
        }
    }

    pub(super) fn handle_doctype_identifier_quoted_state(&mut self, quote: char) {
        match self.current_input_character {
            Some(c) if c == quote => self.switch_to(TokenizerState::DoctypeRootNameAfter),
            None => self.eof_in_doctype(),
            Some(_) => {}
        }
    }

    // =========================================================================
    // Internal subset
    // =========================================================================

    pub(super) fn handle_doctype_internal_subset_state(&mut self) -> Input<()> {
        match self.current_input_character {
            Some('<') => self.switch_to(TokenizerState::DoctypeTag),
            Some('%') => {
                if let Some(text) = self.consume_parameter_reference()? {
                    self.buffer.unget(&text);
                }
            }
            Some(']') => self.switch_to(TokenizerState::DoctypeInternalSubsetAfter),
            None => self.eof_in_doctype(),
            Some(_) => {}
        }
        Ok(())
    }

    pub(super) fn handle_doctype_internal_subset_after_state(&mut self) {
        match self.current_input_character {
            Some('>') => self.switch_to(TokenizerState::Data),
            None => self.eof_in_doctype(),
            Some(_) => {}
        }
    }

    pub(super) fn handle_doctype_tag_state(&mut self) {
        match self.current_input_character {
            Some('!') => self.switch_to(TokenizerState::DoctypeMarkupDeclaration),
            Some('?') => self.switch_to(TokenizerState::DoctypePi),
            None => self.eof_in_doctype(),
            Some(_) => self.bogus_declaration(),
        }
    }

    /// After `<!` in the subset: `--`, `ENTITY`, `ATTLIST` or `NOTATION`.
    pub(super) fn handle_doctype_markup_declaration_state(&mut self) -> Input<()> {
        let mut lookahead: String = self.current_input_character.into_iter().collect();
        lookahead.extend(self.buffer.char()?);
        if lookahead == "--" {
            self.switch_to(TokenizerState::DoctypeComment);
            return Ok(());
        }

        // Keywords differ in length, so read only as far as each needs.
        let mut next = None;
        for (extra, keyword, state) in [
            (4, "ENTITY", TokenizerState::DoctypeEntity),
            (1, "ATTLIST", TokenizerState::DoctypeAttlist),
            (1, "NOTATION", TokenizerState::DoctypeNotation),
        ] {
            for _ in 0..extra {
                lookahead.extend(self.buffer.char()?);
            }
            if lookahead == keyword {
                next = Some(state);
                break;
            }
        }

        match next {
            Some(state) => self.switch_to(state),
            None => {
                self.buffer.unget(&lookahead);
                self.parse_error(ErrorCode::BogusDoctypeDeclaration);
                self.switch_to(TokenizerState::DoctypeBogusComment);
            }
        }
        Ok(())
    }

    pub(super) fn handle_doctype_comment_state(&mut self) {
        match self.current_input_character {
            Some('-') => self.switch_to(TokenizerState::DoctypeCommentDash),
            None => self.eof_in_doctype(),
            Some(_) => {}
        }
    }

    pub(super) fn handle_doctype_comment_dash_state(&mut self) {
        match self.current_input_character {
            Some('-') => self.switch_to(TokenizerState::DoctypeCommentEnd),
            None => self.eof_in_doctype(),
            Some(_) => self.switch_to(TokenizerState::DoctypeComment),
        }
    }

    pub(super) fn handle_doctype_comment_end_state(&mut self) {
        match self.current_input_character {
            Some('>') => self.switch_to(TokenizerState::DoctypeInternalSubset),
            Some('-') => {}
            None => self.eof_in_doctype(),
            Some(_) => self.switch_to(TokenizerState::DoctypeComment),
        }
    }

    pub(super) fn handle_doctype_pi_state(&mut self) {
        match self.current_input_character {
            Some('?') => self.switch_to(TokenizerState::DoctypePiAfter),
            None => self.eof_in_doctype(),
            Some(_) => {}
        }
    }

    pub(super) fn handle_doctype_pi_after_state(&mut self) {
        match self.current_input_character {
            Some('>') => self.switch_to(TokenizerState::DoctypeInternalSubset),
            Some('?') => {}
            None => self.eof_in_doctype(),
            Some(_) => self.switch_to(TokenizerState::DoctypePi),
        }
    }

    /// Skip a malformed declaration through its `>`.
    pub(super) fn handle_doctype_bogus_comment_state(&mut self) -> Input<()> {
        match self.current_input_character {
            Some('>') => self.switch_to(TokenizerState::DoctypeInternalSubset),
            None => self.eof_in_doctype(),
            Some(_) => {
                let _ = self.buffer.match_until(|c| c == '>')?;
                let _ = self.buffer.char()?;
                self.switch_to(TokenizerState::DoctypeInternalSubset);
            }
        }
        Ok(())
    }

    // =========================================================================
    // <!ENTITY>
    // =========================================================================

    pub(super) fn handle_doctype_entity_state(&mut self) {
        match self.current_input_character {
            Some(c) if is_space_char(c) => self.switch_to(TokenizerState::DoctypeEntityTypeBefore),
            None => self.eof_in_doctype(),
            Some(_) => self.bogus_declaration(),
        }
    }

    pub(super) fn handle_doctype_entity_type_before_state(&mut self) {
        match self.current_input_character {
            Some(c) if is_space_char(c) => {}
            Some('%') => self.switch_to(TokenizerState::DoctypeEntityParameterBefore),
            None => self.eof_in_doctype(),
            Some(c) => {
                self.current_entity = Some(EntityDeclaration::new(EntityKind::General, c));
                self.switch_to(TokenizerState::DoctypeEntityName);
            }
        }
    }

    pub(super) fn handle_doctype_entity_parameter_before_state(&mut self) {
        match self.current_input_character {
            Some(c) if is_space_char(c) => self.switch_to(TokenizerState::DoctypeEntityParameter),
            None => self.eof_in_doctype(),
            Some(_) => self.bogus_declaration(),
        }
    }

    pub(super) fn handle_doctype_entity_parameter_state(&mut self) {
        match self.current_input_character {
            Some(c) if is_space_char(c) => {}
            None => self.eof_in_doctype(),
            Some(c) => {
                self.current_entity = Some(EntityDeclaration::new(EntityKind::Parameter, c));
                self.switch_to(TokenizerState::DoctypeEntityName);
            }
        }
    }

    pub(super) fn handle_doctype_entity_name_state(&mut self) {
        match self.current_input_character {
            Some(c) if is_space_char(c) => self.switch_to(TokenizerState::DoctypeEntityNameAfter),
            None => self.eof_in_doctype(),
            Some(c) => {
                if let Some(entity) = self.current_entity.as_mut() {
                    entity.name.push(c);
                }
            }
        }
    }

    pub(super) fn handle_doctype_entity_name_after_state(&mut self) {
        match self.current_input_character {
            Some(c) if is_space_char(c) => {}
            Some('"') => self.switch_to(TokenizerState::DoctypeEntityValDoubleQuoted),
            Some('\'') => self.switch_to(TokenizerState::DoctypeEntityValSingleQuoted),
            None => self.eof_in_doctype(),
            Some(_) => self.reconsume_in(TokenizerState::DoctypeEntityIdentifier),
        }
    }

    /// Inside a quoted entity value. Character references are resolved now;
    /// entity references are kept as written and resolved when the entity is
    /// expanded.
    pub(super) fn handle_doctype_entity_value_state(&mut self, quote: char) -> Input<()> {
        let text = match self.current_input_character {
            Some(c) if c == quote => {
                self.switch_to(TokenizerState::DoctypeEntityValAfter);
                return Ok(());
            }
            Some('&') => self.consume_character_reference_only()?,
            None => {
                self.eof_in_doctype();
                return Ok(());
            }
            Some(c) => String::from(c),
        };
        if let Some(entity) = self.current_entity.as_mut() {
            entity.value.push_str(&text);
        }
        Ok(())
    }

    pub(super) fn handle_doctype_entity_value_after_state(&mut self) {
        match self.current_input_character {
            Some(c) if is_space_char(c) => {}
            Some('>') => self.declare_current_entity(),
            None => self.eof_in_doctype(),
            Some(_) => {}
        }
    }

    /// An external entity. Its literals are skipped and it is declared with
    /// an empty value.
    pub(super) fn handle_doctype_entity_identifier_state(&mut self) {
        match self.current_input_character {
            Some('>') => self.declare_current_entity(),
            Some('"') => self.switch_to(TokenizerState::DoctypeEntityIdentifierDoubleQuoted),
            Some('\'') => self.switch_to(TokenizerState::DoctypeEntityIdentifierSingleQuoted),
            None => self.eof_in_doctype(),
            Some(_) => {}
        }
    }

    pub(super) fn handle_doctype_entity_identifier_quoted_state(&mut self, quote: char) {
        match self.current_input_character {
            Some(c) if c == quote => self.switch_to(TokenizerState::DoctypeEntityIdentifier),
            None => self.eof_in_doctype(),
            Some(_) => {}
        }
    }

    /// Add the finished declaration to the entity table. A name that is
    /// already declared keeps its first value.
    fn declare_current_entity(&mut self) {
        if let Some(entity) = self.current_entity.take() {
            let _ = match entity.kind {
                EntityKind::General => self.entities.declare_general(entity.name, entity.value),
                EntityKind::Parameter => self.entities.declare_parameter(entity.name, entity.value),
            };
        }
        self.switch_to(TokenizerState::DoctypeInternalSubset);
    }

    // =========================================================================
    // <!ATTLIST>
    // =========================================================================

    pub(super) fn handle_doctype_attlist_state(&mut self) {
        match self.current_input_character {
            Some(c) if is_space_char(c) => self.switch_to(TokenizerState::DoctypeAttlistNameBefore),
            None => self.eof_in_doctype(),
            Some(_) => self.bogus_declaration(),
        }
    }

    pub(super) fn handle_doctype_attlist_name_before_state(&mut self) {
        match self.current_input_character {
            Some(c) if is_space_char(c) => {}
            None => self.eof_in_doctype(),
            Some(c) => {
                self.attribute_defaults.start_declaration(c);
                self.switch_to(TokenizerState::DoctypeAttlistName);
            }
        }
    }

    pub(super) fn handle_doctype_attlist_name_state(&mut self) {
        match self.current_input_character {
            Some(c) if is_space_char(c) => self.switch_to(TokenizerState::DoctypeAttlistNameAfter),
            Some('>') => self.switch_to(TokenizerState::DoctypeInternalSubset),
            None => self.eof_in_doctype(),
            Some(c) => {
                if let Some(declaration) = self.attribute_defaults.current_mut() {
                    declaration.element.push(c);
                }
            }
        }
    }

    /// Between attribute definitions.
    pub(super) fn handle_doctype_attlist_name_after_state(&mut self) {
        match self.current_input_character {
            Some(c) if is_space_char(c) => {}
            Some('>') => self.switch_to(TokenizerState::DoctypeInternalSubset),
            None => self.eof_in_doctype(),
            Some(c) => {
                self.attribute_defaults.start_definition(c);
                self.switch_to(TokenizerState::DoctypeAttlistAttrname);
            }
        }
    }

    pub(super) fn handle_doctype_attlist_attrname_state(&mut self) {
        match self.current_input_character {
            Some(c) if is_space_char(c) => {
                self.switch_to(TokenizerState::DoctypeAttlistAttrnameAfter);
            }
            None => self.eof_in_doctype(),
            Some(c) => {
                if let Some(definition) = self.attribute_defaults.current_definition_mut() {
                    definition.name.push(c);
                }
            }
        }
    }

    /// After an attribute name. A quote here starts a default value with no
    /// declared type.
    pub(super) fn handle_doctype_attlist_attrname_after_state(&mut self) {
        match self.current_input_character {
            Some(c) if is_space_char(c) => {}
            Some('"') => self.switch_to(TokenizerState::DoctypeAttlistAttrvalDoubleQuoted),
            Some('\'') => self.switch_to(TokenizerState::DoctypeAttlistAttrvalSingleQuoted),
            Some('>') => self.switch_to(TokenizerState::DoctypeInternalSubset),
            None => self.eof_in_doctype(),
            Some(c) => {
                if let Some(definition) = self.attribute_defaults.current_definition_mut() {
                    definition.kind.push(c);
                }
                self.switch_to(TokenizerState::DoctypeAttlistAttrtype);
            }
        }
    }

    pub(super) fn handle_doctype_attlist_attrtype_state(&mut self) {
        match self.current_input_character {
            Some(c) if is_space_char(c) => {
                self.switch_to(TokenizerState::DoctypeAttlistAttrtypeAfter);
            }
            None => self.eof_in_doctype(),
            Some(c) => {
                if let Some(definition) = self.attribute_defaults.current_definition_mut() {
                    definition.kind.push(c);
                }
            }
        }
    }

    pub(super) fn handle_doctype_attlist_attrtype_after_state(&mut self) {
        match self.current_input_character {
            Some(c) if is_space_char(c) => {}
            Some('#') => self.switch_to(TokenizerState::DoctypeAttlistAttrdeclBefore),
            Some('"') => self.switch_to(TokenizerState::DoctypeAttlistAttrvalDoubleQuoted),
            Some('\'') => self.switch_to(TokenizerState::DoctypeAttlistAttrvalSingleQuoted),
            Some('>') => self.switch_to(TokenizerState::DoctypeInternalSubset),
            None => self.eof_in_doctype(),
            Some(_) => self.bogus_declaration(),
        }
    }

    pub(super) fn handle_doctype_attlist_attrdecl_before_state(&mut self) {
        match self.current_input_character {
            Some(c) if is_space_char(c) => self.bogus_declaration(),
            None => self.eof_in_doctype(),
            Some(_) => self.switch_to(TokenizerState::DoctypeAttlistAttrdecl),
        }
    }

    pub(super) fn handle_doctype_attlist_attrdecl_state(&mut self) {
        match self.current_input_character {
            Some(c) if is_space_char(c) => {
                self.switch_to(TokenizerState::DoctypeAttlistAttrdeclAfter);
            }
            Some('>') => self.switch_to(TokenizerState::DoctypeInternalSubset),
            None => self.eof_in_doctype(),
            Some(_) => {}
        }
    }

    /// After `#REQUIRED`, `#IMPLIED` or `#FIXED`: a quoted default value or
    /// the next attribute definition.
    pub(super) fn handle_doctype_attlist_attrdecl_after_state(&mut self) {
        match self.current_input_character {
            Some(c) if is_space_char(c) => {}
            Some('>') => self.switch_to(TokenizerState::DoctypeInternalSubset),
            Some('"') => self.switch_to(TokenizerState::DoctypeAttlistAttrvalDoubleQuoted),
            Some('\'') => self.switch_to(TokenizerState::DoctypeAttlistAttrvalSingleQuoted),
            None => self.eof_in_doctype(),
            Some(c) => {
                self.attribute_defaults.start_definition(c);
                self.switch_to(TokenizerState::DoctypeAttlistAttrname);
            }
        }
    }

    /// A quoted default value. References are not supported here.
    pub(super) fn handle_doctype_attlist_attrval_state(&mut self, quote: char) {
        match self.current_input_character {
            Some(c) if c == quote => self.switch_to(TokenizerState::DoctypeAttlistNameAfter),
            Some('&') => self.fail_unsupported("entity reference in an ATTLIST default value"),
            Some('%') => self.fail_unsupported("parameter reference in an ATTLIST default value"),
            None => self.eof_in_doctype(),
            Some(c) => {
                if let Some(definition) = self.attribute_defaults.current_definition_mut() {
                    definition.default_value.push(normalize_attribute_char(c));
                }
            }
        }
    }

    // =========================================================================
    // <!NOTATION>
    // =========================================================================

    pub(super) fn handle_doctype_notation_state(&mut self) {
        match self.current_input_character {
            Some(c) if is_space_char(c) => {
                self.switch_to(TokenizerState::DoctypeNotationIdentifier);
            }
            None => self.eof_in_doctype(),
            Some(_) => self.bogus_declaration(),
        }
    }

    pub(super) fn handle_doctype_notation_identifier_state(&mut self) {
        match self.current_input_character {
            Some('>') => self.switch_to(TokenizerState::DoctypeInternalSubset),
            Some('"') => self.switch_to(TokenizerState::DoctypeNotationIdentifierDoubleQuoted),
            Some('\'') => self.switch_to(TokenizerState::DoctypeNotationIdentifierSingleQuoted),
            None => self.eof_in_doctype(),
            Some(_) => {}
        }
    }

    pub(super) fn handle_doctype_notation_identifier_quoted_state(&mut self, quote: char) {
        match self.current_input_character {
            Some(c) if c == quote => self.switch_to(TokenizerState::DoctypeNotationIdentifier),
            None => self.eof_in_doctype(),
            Some(_) => {}
        }
    }
}
