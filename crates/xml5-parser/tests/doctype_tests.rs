//! Tests for DOCTYPE handling: entity declarations, parameter entities and
//! ATTLIST defaults.

use xml5_parser::error::{ErrorCode, XmlError};
use xml5_parser::{Attribute, Token, XmlTokenizer};

/// Helper to run the tokenizer over a complete document and keep it around
/// for inspecting the declarations it read.
fn tokenizer_for(input: &str) -> XmlTokenizer {
    let mut tokenizer = XmlTokenizer::new();
    tokenizer.feed(input);
    tokenizer.end();
    tokenizer
}

/// Helper to tokenize and drop parse errors.
fn tokens_without_errors(input: &str) -> Vec<Token> {
    XmlTokenizer::tokenize(input)
        .into_iter()
        .filter(|token| !matches!(token, Token::ParseError(_)))
        .collect()
}

fn error_codes(tokens: &[Token]) -> Vec<ErrorCode> {
    tokens
        .iter()
        .filter_map(|token| match token {
            Token::ParseError(error) => Some(error.code),
            _ => None,
        })
        .collect()
}

fn text_of(tokens: &[Token]) -> String {
    tokens
        .iter()
        .filter_map(|token| match token {
            Token::Characters { data } => Some(data.as_str()),
            _ => None,
        })
        .collect()
}

// ========== the declaration itself ==========

#[test]
fn test_doctype_produces_no_token() {
    assert_eq!(
        XmlTokenizer::tokenize(r#"<!DOCTYPE r SYSTEM "r.dtd"><r/>"#),
        vec![Token::EmptyTag {
            name: "r".to_string(),
            attributes: Vec::new(),
        }]
    );
}

#[test]
fn test_public_identifier_with_brackets_is_skipped() {
    let input = r#"<!DOCTYPE r PUBLIC "-//x//[y]//EN" 'r.dtd'><r/>"#;
    assert_eq!(error_codes(&XmlTokenizer::tokenize(input)), Vec::new());
}

#[test]
fn test_eof_in_doctype() {
    let tokens = XmlTokenizer::tokenize("<!DOCTYPE r [<!ENTITY e 'x");
    assert_eq!(error_codes(&tokens), vec![ErrorCode::EofInDoctype]);
}

// ========== entities ==========

#[test]
fn test_entity_declaration_and_expansion() {
    let input = r#"<!DOCTYPE r [<!ENTITY foo "bar">]><r>&foo;</r>"#;
    let tokenizer = tokenizer_for(input);
    assert_eq!(tokenizer.entities().general("foo"), Some("bar"));

    let tokens = tokenizer.into_tokens();
    assert_eq!(text_of(&tokens), "bar");
    assert!(error_codes(&tokens).is_empty());
}

#[test]
fn test_first_declaration_wins() {
    let input = r#"<!DOCTYPE r [<!ENTITY e "one"><!ENTITY e "two">]><r>&e;</r>"#;
    assert_eq!(text_of(&XmlTokenizer::tokenize(input)), "one");
}

#[test]
fn test_builtin_entities_cannot_be_redeclared() {
    let input = r#"<!DOCTYPE r [<!ENTITY lt "LT">]><r>&lt;</r>"#;
    assert_eq!(text_of(&XmlTokenizer::tokenize(input)), "<");
}

#[test]
fn test_entity_value_resolves_only_character_references() {
    let input = r#"<!DOCTYPE r [<!ENTITY e "&#65;&amp;">]>"#;
    let tokenizer = tokenizer_for(input);
    assert_eq!(tokenizer.entities().general("e"), Some("A&amp;"));
}

#[test]
fn test_entity_referring_to_another_entity() {
    let input = r#"<!DOCTYPE r [<!ENTITY a "x&b;z"><!ENTITY b "y">]><r>&a;</r>"#;
    assert_eq!(text_of(&XmlTokenizer::tokenize(input)), "xyz");
}

#[test]
fn test_entity_expansion_can_contain_markup() {
    let input = r#"<!DOCTYPE r [<!ENTITY e "<b>bold</b>">]><r>&e;</r>"#;
    assert_eq!(
        tokens_without_errors(input),
        vec![
            Token::StartTag {
                name: "r".to_string(),
                attributes: Vec::new(),
            },
            Token::StartTag {
                name: "b".to_string(),
                attributes: Vec::new(),
            },
            Token::new_characters("bold"),
            Token::EndTag {
                name: "b".to_string(),
            },
            Token::EndTag {
                name: "r".to_string(),
            },
        ]
    );
}

#[test]
fn test_external_entity_is_declared_empty() {
    let input = r#"<!DOCTYPE r [<!ENTITY ext SYSTEM "ext.xml">]><r>[&ext;]</r>"#;
    let tokenizer = tokenizer_for(input);
    assert_eq!(tokenizer.entities().general("ext"), Some(""));
    assert_eq!(text_of(&tokenizer.into_tokens()), "[]");
}

#[test]
fn test_parameter_entity_reference_in_subset() {
    let input = r#"<!DOCTYPE r [<!ENTITY % p "<!ENTITY g 'G'>"> %p;]><r>&g;</r>"#;
    let tokenizer = tokenizer_for(input);
    assert_eq!(tokenizer.entities().parameter("p"), Some("<!ENTITY g 'G'>"));
    assert_eq!(tokenizer.entities().general("g"), Some("G"));
    assert_eq!(text_of(&tokenizer.into_tokens()), "G");
}

#[test]
fn test_unknown_parameter_entity() {
    let input = "<!DOCTYPE r [%nope;]><r/>";
    let tokens = XmlTokenizer::tokenize(input);
    assert_eq!(error_codes(&tokens), vec![ErrorCode::ExpectedParameterEntity]);
}

// ========== other subset content ==========

#[test]
fn test_comments_pis_and_notations_in_subset_are_dropped() {
    let input = r#"<!DOCTYPE r [<!-- c - d --><?pi x?y?><!NOTATION n SYSTEM "u">]><r/>"#;
    assert_eq!(
        XmlTokenizer::tokenize(input),
        vec![Token::EmptyTag {
            name: "r".to_string(),
            attributes: Vec::new(),
        }]
    );
}

#[test]
fn test_bogus_declaration_is_skipped() {
    let input = r#"<!DOCTYPE r [<!FOO bar> <!ENTITY e "x">]><r>&e;</r>"#;
    let tokens = XmlTokenizer::tokenize(input);
    assert_eq!(error_codes(&tokens), vec![ErrorCode::BogusDoctypeDeclaration]);
    assert_eq!(text_of(&tokens), "x");
}

// ========== ATTLIST ==========

#[test]
fn test_attlist_default_without_type() {
    let input = r#"<!DOCTYPE x [<!ATTLIST x y "z">]><x/>"#;
    assert_eq!(
        tokens_without_errors(input),
        vec![Token::EmptyTag {
            name: "x".to_string(),
            attributes: vec![Attribute::new("y", "z")],
        }]
    );
}

#[test]
fn test_attlist_with_types_and_keywords() {
    let input = r#"<!DOCTYPE x [<!ATTLIST x a CDATA #FIXED "1" b CDATA #IMPLIED c CDATA "3">]><x>"#;
    let tokenizer = tokenizer_for(input);

    let declarations = tokenizer.attribute_defaults().declarations();
    assert_eq!(declarations.len(), 1);
    assert_eq!(declarations[0].element, "x");
    let kinds: Vec<&str> = declarations[0]
        .attributes
        .iter()
        .map(|definition| definition.kind.as_str())
        .collect();
    assert_eq!(kinds, vec!["CDATA", "CDATA", "CDATA"]);

    assert_eq!(
        tokenizer.into_tokens(),
        vec![Token::StartTag {
            name: "x".to_string(),
            attributes: vec![Attribute::new("a", "1"), Attribute::new("c", "3")],
        }]
    );
}

#[test]
fn test_explicit_attribute_overrides_default() {
    let input = r#"<!DOCTYPE x [<!ATTLIST x y "z" w "v">]><x y="mine"/><other/>"#;
    assert_eq!(
        tokens_without_errors(input),
        vec![
            Token::EmptyTag {
                name: "x".to_string(),
                attributes: vec![Attribute::new("y", "mine"), Attribute::new("w", "v")],
            },
            Token::EmptyTag {
                name: "other".to_string(),
                attributes: Vec::new(),
            },
        ]
    );
}

#[test]
fn test_reference_in_attlist_default_is_unsupported() {
    let mut tokenizer = tokenizer_for(r#"<!DOCTYPE x [<!ATTLIST x y "&z;">]><x/>"#);
    assert!(matches!(
        tokenizer.take_failure(),
        Some(XmlError::Unsupported(_))
    ));
    assert!(
        tokenizer
            .take_tokens()
            .iter()
            .all(|token| token.tag_name().is_none()),
        "tokenization stops at the unsupported construct"
    );
}
