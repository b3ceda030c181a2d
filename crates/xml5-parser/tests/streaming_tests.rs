//! Tests that tokenizing and parsing do not depend on how the input is split
//! into chunks.

use xml5_dom::dump_tree;
use xml5_parser::{ParseError, Token, XmlParser, XmlTokenizer};

/// A document touching every construct the tokenizer knows, with CRLF line
/// endings and non-ASCII text.
const DOCUMENT: &str = "<?xml version=\"1.0\"?>\r\n\
    <!DOCTYPE doc [\r\n\
    \x20 <!ENTITY e \"<em>x</em>&#65;\">\r\n\
    \x20 <!ENTITY % p \"<!ENTITY g 'gee'>\">\r\n\
    \x20 %p;\r\n\
    \x20 <!ATTLIST item kind \"plain\" n CDATA #IMPLIED>\r\n\
    \x20 <!NOTATION n SYSTEM \"n.bin\">\r\n\
    \x20 <!-- subset - comment -->\r\n\
    ]>\r\n\
    <doc xmlns=\"urn:d\" xmlns:m=\"urn:m\">\r\n\
    \x20 <item id='1'>&e; &g; &lt;&amp;&#x20AC;&unknown;</item>\r\n\
    \x20 <m:item m:k=\"v&quot;w\" plain=unquoted />\r\n\
    \x20 <![CDATA[ a ]] b ]]>\r\n\
    \x20 <?pi some ? data??>\r\n\
    \x20 <!-- comment - with -- dashes --->\r\n\
    \x20 text &ampx &#128; caf\u{e9} < </bogus>\r\n\
    \x20 <x a=1 a=2></>\r\n\
    </doc>\r\n\
    <!-- trailing -->";

/// Helper to tokenize `input` fed as the given chunks.
fn tokenize_chunks<'a>(chunks: impl IntoIterator<Item = &'a str>) -> Vec<Token> {
    let mut tokenizer = XmlTokenizer::new();
    let mut tokens = Vec::new();
    for chunk in chunks {
        tokenizer.feed(chunk);
        tokens.extend(tokenizer.take_tokens());
    }
    tokenizer.end();
    tokens.extend(tokenizer.take_tokens());
    tokens
}

/// Helper to split on character boundaries into chunks of `size` characters.
fn chunks_of(input: &str, size: usize) -> Vec<String> {
    let chars: Vec<char> = input.chars().collect();
    chars.chunks(size).map(|chunk| chunk.iter().collect()).collect()
}

/// Helper to parse `input` fed as the given chunks and dump the result.
fn parse_chunks<'a>(chunks: impl IntoIterator<Item = &'a str>) -> (String, Vec<ParseError>) {
    let mut parser = XmlParser::new();
    for chunk in chunks {
        parser.feed(chunk).unwrap();
    }
    let (tree, errors) = parser.finish_with_errors().unwrap();
    (dump_tree(&tree), errors)
}

#[test]
fn test_document_tokenizes_as_expected() {
    let tokens = XmlTokenizer::tokenize(DOCUMENT);
    assert!(tokens.contains(&Token::StartTag {
        name: "em".to_string(),
        attributes: Vec::new(),
    }));
    assert!(tokens.contains(&Token::Pi {
        target: "pi".to_string(),
        data: "some ? data?".to_string(),
    }));
    assert!(tokens.iter().any(|token| matches!(
        token,
        Token::StartTag { name, attributes }
            if name == "item" && attributes.iter().any(|a| a.name == "kind" && a.value == "plain")
    )));
    assert!(tokens.iter().any(|token| matches!(
        token,
        Token::Characters { data } if data.starts_with("gee")
    )));
}

#[test]
fn test_one_character_at_a_time() {
    let whole = XmlTokenizer::tokenize(DOCUMENT);
    let chunks = chunks_of(DOCUMENT, 1);
    let streamed = tokenize_chunks(chunks.iter().map(String::as_str));
    assert_eq!(streamed, whole);
}

#[test]
fn test_fixed_chunk_sizes() {
    let whole = XmlTokenizer::tokenize(DOCUMENT);
    for size in [2, 3, 5, 7, 16, 64] {
        let chunks = chunks_of(DOCUMENT, size);
        let streamed = tokenize_chunks(chunks.iter().map(String::as_str));
        assert_eq!(streamed, whole, "chunk size {size}");
    }
}

#[test]
fn test_every_split_point() {
    let whole = XmlTokenizer::tokenize(DOCUMENT);
    for (index, _) in DOCUMENT.char_indices().skip(1) {
        let (head, tail) = DOCUMENT.split_at(index);
        assert_eq!(tokenize_chunks([head, tail]), whole, "split at byte {index}");
    }
}

#[test]
fn test_empty_chunks_are_harmless() {
    let whole = XmlTokenizer::tokenize(DOCUMENT);
    let middle = DOCUMENT
        .char_indices()
        .nth(DOCUMENT.chars().count() / 2)
        .map_or(0, |(index, _)| index);
    let (head, tail) = DOCUMENT.split_at(middle);
    assert_eq!(tokenize_chunks(["", head, "", "", tail, ""]), whole);
}

#[test]
fn test_crlf_split_across_chunks() {
    assert_eq!(
        tokenize_chunks(["a\r", "\nb"]),
        vec![Token::new_characters("a\nb")]
    );
}

#[test]
fn test_reference_split_across_chunks() {
    assert_eq!(
        tokenize_chunks(["x&am", "p;y"]),
        vec![
            Token::new_characters("x"),
            Token::new_characters("&"),
            Token::new_characters("y"),
        ]
    );
}

#[test]
fn test_tree_is_the_same_however_input_is_split() {
    let whole = parse_chunks([DOCUMENT]);
    let chunks = chunks_of(DOCUMENT, 1);
    assert_eq!(parse_chunks(chunks.iter().map(String::as_str)), whole);

    let chunks = chunks_of(DOCUMENT, 9);
    assert_eq!(parse_chunks(chunks.iter().map(String::as_str)), whole);
}
