//! Tests for character and entity reference resolution.

use xml5_parser::error::ErrorCode;
use xml5_parser::tokenizer::character_reference::escape_for_attribute;
use xml5_parser::{Token, XmlTokenizer};

/// Helper to join every character token in the stream.
fn text_of(tokens: &[Token]) -> String {
    tokens
        .iter()
        .filter_map(|token| match token {
            Token::Characters { data } => Some(data.as_str()),
            _ => None,
        })
        .collect()
}

/// Helper to list the error codes in the stream, in order.
fn errors_of(tokens: &[Token]) -> Vec<ErrorCode> {
    tokens
        .iter()
        .filter_map(|token| match token {
            Token::ParseError(error) => Some(error.code),
            _ => None,
        })
        .collect()
}

/// Helper to get the attributes of the first tag in the stream.
fn first_tag_attributes(tokens: &[Token]) -> Vec<(String, String)> {
    tokens
        .iter()
        .find(|token| token.tag_name().is_some())
        .map(|token| {
            token
                .attributes()
                .iter()
                .map(|attr| (attr.name.clone(), attr.value.clone()))
                .collect()
        })
        .unwrap_or_default()
}

// ========== numeric references ==========

#[test]
fn test_decimal_and_hex_references() {
    let tokens = XmlTokenizer::tokenize("&#65;&#x42;&#X43;");
    assert_eq!(text_of(&tokens), "ABC");
    assert!(errors_of(&tokens).is_empty());
}

#[test]
fn test_out_of_range_reference_is_replacement_character() {
    let tokens = XmlTokenizer::tokenize("&#999999999;");
    assert_eq!(text_of(&tokens), "\u{FFFD}");
    assert_eq!(errors_of(&tokens), vec![ErrorCode::CantConvertNumericEntity]);
}

#[test]
fn test_zero_and_surrogate_are_replaced() {
    let tokens = XmlTokenizer::tokenize("&#0;&#xD800;");
    assert_eq!(text_of(&tokens), "\u{FFFD}\u{FFFD}");
    assert_eq!(
        errors_of(&tokens),
        vec![
            ErrorCode::CantConvertNumericEntity,
            ErrorCode::CantConvertNumericEntity
        ]
    );
}

#[test]
fn test_c1_range_maps_through_windows_1252() {
    let tokens = XmlTokenizer::tokenize("&#128;&#x99;");
    assert_eq!(text_of(&tokens), "\u{20AC}\u{2122}");
    assert_eq!(
        errors_of(&tokens),
        vec![
            ErrorCode::IllegalWindows1252Entity,
            ErrorCode::IllegalWindows1252Entity
        ]
    );
}

#[test]
fn test_carriage_return_reference_becomes_newline() {
    let tokens = XmlTokenizer::tokenize("a&#13;b");
    assert_eq!(text_of(&tokens), "a\nb");
    assert_eq!(errors_of(&tokens), vec![ErrorCode::IncorrectCrNewlineEntity]);
}

#[test]
fn test_numeric_reference_without_semicolon() {
    let tokens = XmlTokenizer::tokenize("&#65 b");
    assert_eq!(text_of(&tokens), "A b");
    assert_eq!(
        errors_of(&tokens),
        vec![ErrorCode::NumericEntityWithoutSemicolon]
    );
}

#[test]
fn test_hash_without_digits_stays_literal() {
    for input in ["&#;", "&#xg;", "&#"] {
        let tokens = XmlTokenizer::tokenize(input);
        assert_eq!(text_of(&tokens), input, "input {input:?}");
        assert_eq!(
            errors_of(&tokens),
            vec![ErrorCode::ExpectedNumericEntity],
            "input {input:?}"
        );
    }
}

// ========== named references ==========

#[test]
fn test_builtin_entities() {
    let tokens = XmlTokenizer::tokenize("&lt;&gt;&amp;&apos;&quot;");
    assert_eq!(text_of(&tokens), "<>&'\"");
    assert!(errors_of(&tokens).is_empty());
    assert!(
        !tokens.iter().any(|t| t.tag_name().is_some()),
        "&lt; must not open a tag"
    );
}

#[test]
fn test_amp_expansion_is_not_resolved_twice() {
    let tokens = XmlTokenizer::tokenize("&amp;lt;");
    assert_eq!(text_of(&tokens), "&lt;");
}

#[test]
fn test_unknown_entity_stays_literal() {
    let tokens = XmlTokenizer::tokenize("&unknown;");
    assert_eq!(text_of(&tokens), "&unknown;");
    assert_eq!(errors_of(&tokens), vec![ErrorCode::ExpectedNamedEntity]);
}

#[test]
fn test_bare_ampersand_before_space() {
    let tokens = XmlTokenizer::tokenize("a & b");
    assert_eq!(text_of(&tokens), "a & b");
    assert!(errors_of(&tokens).is_empty());
}

#[test]
fn test_named_reference_without_semicolon_in_content() {
    let tokens = XmlTokenizer::tokenize("&ampx");
    assert_eq!(text_of(&tokens), "&x");
    assert_eq!(errors_of(&tokens), vec![ErrorCode::NamedEntityWithoutSemicolon]);
}

#[test]
fn test_named_reference_at_end_of_input() {
    let tokens = XmlTokenizer::tokenize("&amp");
    assert_eq!(text_of(&tokens), "&");
    assert_eq!(errors_of(&tokens), vec![ErrorCode::NamedEntityWithoutSemicolon]);
}

// ========== references in attribute values ==========

#[test]
fn test_reference_in_attribute_value() {
    let tokens = XmlTokenizer::tokenize(r#"<a b="x&lt;y&#65;"/>"#);
    assert_eq!(
        first_tag_attributes(&tokens),
        vec![("b".to_string(), "x<yA".to_string())]
    );
}

#[test]
fn test_unterminated_reference_before_alphanumeric_in_attribute_is_literal() {
    let tokens = XmlTokenizer::tokenize(r#"<a b="&ampx;"/>"#);
    assert_eq!(
        first_tag_attributes(&tokens),
        vec![("b".to_string(), "&ampx;".to_string())]
    );
    assert!(errors_of(&tokens).is_empty());
}

#[test]
fn test_attribute_expansion_keeps_quotes_and_whitespace() {
    let input = "<!DOCTYPE a [<!ENTITY q 'say \"hi\"\tnow'>]><a b=\"&q;\"/>";
    let tokens = XmlTokenizer::tokenize(input);
    assert_eq!(
        first_tag_attributes(&tokens),
        vec![("b".to_string(), "say \"hi\"\tnow".to_string())]
    );
}

#[test]
fn test_escape_for_attribute() {
    assert_eq!(
        escape_for_attribute("a \"b\"\n'c'\t"),
        "a&#32;&#34;b&#34;&#10;&#39;c&#39;&#9;"
    );
    assert_eq!(escape_for_attribute("plain"), "plain");
}

// ========== expansion limit ==========

#[test]
fn test_self_referencing_entity_hits_expansion_limit() {
    let input = r#"<!DOCTYPE r [<!ENTITY a "&a;">]><r>&a;</r>"#;
    let tokens = XmlTokenizer::tokenize(input);
    assert!(errors_of(&tokens).contains(&ErrorCode::EntityExpansionLimit));
    assert_eq!(tokens.last(), Some(&Token::EndTag { name: "r".to_string() }));
}

#[test]
fn test_expansion_limit_is_reported_once_per_window() {
    let input = r#"<!DOCTYPE r [<!ENTITY a "&a;&a;">]><r>&a;</r>"#;
    let tokens = XmlTokenizer::tokenize(input);
    let limits = errors_of(&tokens)
        .into_iter()
        .filter(|&code| code == ErrorCode::EntityExpansionLimit)
        .count();
    assert_eq!(limits, 1);
    assert_eq!(tokens.last(), Some(&Token::EndTag { name: "r".to_string() }));
}

#[test]
fn test_many_sibling_references_do_not_hit_limit() {
    let input = "&lt;".repeat(40);
    let tokens = XmlTokenizer::tokenize(&input);
    assert_eq!(text_of(&tokens), "<".repeat(40));
    assert!(errors_of(&tokens).is_empty());
}
