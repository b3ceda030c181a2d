use strum_macros::Display;

use xml5_common::warning::warn_once;
use xml5_dom::DomTree;

use super::namespace::NamespaceResolver;
use super::sink::TreeSink;
use crate::error::{ErrorCode, ParseError, XmlError};
use crate::tokenizer::{Attribute, Token, XmlTokenizer, is_space_char};

/// Where the tree builder is in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum Phase {
    /// Before the root element. Only comments, processing instructions and
    /// whitespace belong here.
    Start,
    /// Inside the root element.
    Main,
    /// After the root element closed.
    End,
}

/// An element on the stack of open elements.
#[derive(Debug, Clone)]
struct OpenElement<H> {
    handle: H,
    /// The qualified name end tags are matched against.
    name: String,
}

/// Builds a tree from XML5 input fed in chunks.
///
/// Owns the tokenizer and drives it: every chunk passed to
/// [`XmlParser::feed`] is tokenized as far as possible and the resulting
/// tokens are applied to the sink right away. Parse errors, whether found by
/// the tokenizer or during tree construction, are collected in the order they
/// occur.
///
/// # Example
///
/// ```
/// use xml5_parser::XmlParser;
///
/// let mut parser = XmlParser::new();
/// parser.feed("<greeting>hel").unwrap();
/// parser.feed("lo</greeting>").unwrap();
/// let tree = parser.finish().unwrap();
/// let root = tree.document_element().unwrap();
/// assert_eq!(tree.text_content(root), "hello");
/// ```
#[derive(Debug)]
pub struct XmlParser<S: TreeSink = DomTree> {
    tokenizer: XmlTokenizer,
    sink: S,
    phase: Phase,
    open_elements: Vec<OpenElement<S::Handle>>,
    errors: Vec<ParseError>,
    strict: bool,
    failure: Option<XmlError>,
}

impl XmlParser<DomTree> {
    /// A parser that builds a [`DomTree`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_sink(DomTree::new())
    }
}

impl Default for XmlParser<DomTree> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: TreeSink> XmlParser<S> {
    /// A parser that builds into `sink`.
    #[must_use]
    pub fn with_sink(sink: S) -> Self {
        Self {
            tokenizer: XmlTokenizer::new(),
            sink,
            phase: Phase::Start,
            open_elements: Vec::new(),
            errors: Vec::new(),
            strict: false,
            failure: None,
        }
    }

    /// Fail on the first parse error instead of recovering.
    #[must_use]
    pub const fn with_strict_mode(mut self) -> Self {
        self.strict = true;
        self
    }

    /// Parse another chunk of input.
    ///
    /// # Errors
    ///
    /// [`XmlError::Strict`] for the first parse error in strict mode, and
    /// [`XmlError::Unsupported`] when the input uses a construct the
    /// tokenizer does not handle. Once an error has been returned, every
    /// later call returns it again.
    pub fn feed(&mut self, chunk: &str) -> Result<(), XmlError> {
        self.check_failure()?;
        self.tokenizer.feed(chunk);
        self.process_pending()
    }

    /// Signal end of input and return the finished sink.
    ///
    /// Elements still open at end of input are left as they are.
    ///
    /// # Errors
    ///
    /// Same as [`XmlParser::feed`].
    pub fn finish(self) -> Result<S, XmlError> {
        self.finish_with_errors().map(|(sink, _)| sink)
    }

    /// Like [`XmlParser::finish`], also returning every recorded parse error.
    ///
    /// # Errors
    ///
    /// Same as [`XmlParser::feed`].
    pub fn finish_with_errors(mut self) -> Result<(S, Vec<ParseError>), XmlError> {
        self.check_failure()?;
        self.tokenizer.end();
        self.process_pending()?;
        Ok((self.sink, self.errors))
    }

    /// Parse errors recorded so far.
    #[must_use]
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    /// The current phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// The sink being built into.
    #[must_use]
    pub const fn sink(&self) -> &S {
        &self.sink
    }

    /// The tokenizer, for inspecting declared entities and ATTLIST defaults.
    #[must_use]
    pub const fn tokenizer(&self) -> &XmlTokenizer {
        &self.tokenizer
    }

    fn check_failure(&self) -> Result<(), XmlError> {
        match &self.failure {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    fn fail(&mut self, error: XmlError) -> Result<(), XmlError> {
        self.failure = Some(error.clone());
        Err(error)
    }

    /// Apply every token the tokenizer has produced since the last call.
    fn process_pending(&mut self) -> Result<(), XmlError> {
        for token in self.tokenizer.take_tokens() {
            if let Err(error) = self.process_token(token) {
                return self.fail(error);
            }
        }
        match self.tokenizer.take_failure() {
            Some(error) => self.fail(error),
            None => Ok(()),
        }
    }

    fn process_token(&mut self, token: Token) -> Result<(), XmlError> {
        if let Token::ParseError(error) = token {
            return self.record_error(error);
        }
        match self.phase {
            Phase::Start => self.handle_start_phase(token),
            Phase::Main => self.handle_main_phase(token),
            Phase::End => self.handle_end_phase(token),
        }
    }

    // =========================================================================
    // Phases
    // =========================================================================

    fn handle_start_phase(&mut self, token: Token) -> Result<(), XmlError> {
        let document = self.sink.document();
        match token {
            Token::StartTag { name, attributes } => {
                let handle = self.insert_element(document, &name, &attributes);
                self.open_elements.push(OpenElement { handle, name });
                self.phase = Phase::Main;
            }
            Token::EmptyTag { name, attributes } => {
                let _ = self.insert_element(document, &name, &attributes);
                self.phase = Phase::End;
            }
            Token::Comment { data } => self.insert_comment(document, &data),
            Token::Pi { target, data } => {
                self.insert_processing_instruction(document, &target, &data);
            }
            Token::Characters { data } if is_whitespace(&data) => {}
            other => return self.parse_error(ErrorCode::UnexpectedContentBeforeRoot, &other),
        }
        Ok(())
    }

    fn handle_main_phase(&mut self, token: Token) -> Result<(), XmlError> {
        let current = self.current_node();
        match token {
            Token::StartTag { name, attributes } => {
                let handle = self.insert_element(current, &name, &attributes);
                self.open_elements.push(OpenElement { handle, name });
            }
            Token::EmptyTag { name, attributes } => {
                let _ = self.insert_element(current, &name, &attributes);
            }
            Token::EndTag { name } => {
                let Some(index) = self.open_elements.iter().rposition(|open| open.name == name)
                else {
                    return self.parse_error(ErrorCode::UnmatchedClose, &Token::EndTag { name });
                };
                self.open_elements.truncate(index);
                self.end_if_closed();
            }
            Token::EndTagShort => {
                let _ = self.open_elements.pop();
                self.end_if_closed();
            }
            Token::Characters { data } => self.sink.append_text(current, &data),
            Token::Comment { data } => self.insert_comment(current, &data),
            Token::Pi { target, data } => {
                self.insert_processing_instruction(current, &target, &data);
            }
            Token::ParseError(error) => return self.record_error(error),
        }
        Ok(())
    }

    fn handle_end_phase(&mut self, token: Token) -> Result<(), XmlError> {
        let document = self.sink.document();
        match token {
            Token::Comment { data } => self.insert_comment(document, &data),
            Token::Pi { target, data } => {
                self.insert_processing_instruction(document, &target, &data);
            }
            Token::Characters { data } if is_whitespace(&data) => {}
            other => return self.parse_error(ErrorCode::UnexpectedContentAfterRoot, &other),
        }
        Ok(())
    }

    // =========================================================================
    // Tree helpers
    // =========================================================================

    /// The innermost open element, or the document when none is open.
    fn current_node(&self) -> S::Handle {
        self.open_elements
            .last()
            .map_or_else(|| self.sink.document(), |open| open.handle)
    }

    fn end_if_closed(&mut self) {
        if self.open_elements.is_empty() {
            self.phase = Phase::End;
        }
    }

    /// Create the element for a tag, resolving namespaces against the open
    /// elements, and append it to `parent`.
    fn insert_element(
        &mut self,
        parent: S::Handle,
        name: &str,
        attributes: &[Attribute],
    ) -> S::Handle {
        let element = {
            let sink = &self.sink;
            let open_elements = &self.open_elements;
            let resolver = NamespaceResolver::new(attributes, |declaration: &str| {
                open_elements
                    .iter()
                    .rev()
                    .find_map(|open| sink.attribute(open.handle, declaration))
                    .map(str::to_string)
            });
            resolver.resolve(name)
        };
        let handle = self.sink.create_element(element);
        self.sink.append_child(parent, handle);
        handle
    }

    fn insert_comment(&mut self, parent: S::Handle, data: &str) {
        let comment = self.sink.create_comment(data);
        self.sink.append_child(parent, comment);
    }

    fn insert_processing_instruction(&mut self, parent: S::Handle, target: &str, data: &str) {
        let pi = self.sink.create_processing_instruction(target, data);
        self.sink.append_child(parent, pi);
    }

    // =========================================================================
    // Errors
    // =========================================================================

    /// Record an error found during tree construction. The token is skipped.
    fn parse_error(&mut self, code: ErrorCode, token: &Token) -> Result<(), XmlError> {
        let error = match token {
            Token::EndTag { name } => ParseError::with_data(code, name.clone()),
            _ => ParseError::new(code),
        };
        warn_once("XML Parser", &format!("{error} (in {} phase, at {token})", self.phase));
        self.record_error(error)
    }

    fn record_error(&mut self, error: ParseError) -> Result<(), XmlError> {
        self.errors.push(error.clone());
        if self.strict {
            return Err(XmlError::Strict(error));
        }
        Ok(())
    }
}

fn is_whitespace(data: &str) -> bool {
    data.chars().all(is_space_char)
}

/// Parse a complete document into a [`DomTree`].
///
/// # Errors
///
/// Only [`XmlError::Unsupported`]; malformed input is recovered from.
pub fn parse_str(input: &str) -> Result<DomTree, XmlError> {
    let mut parser = XmlParser::new();
    parser.feed(input)?;
    parser.finish()
}

/// Parse a complete document, also returning the recorded parse errors.
///
/// # Errors
///
/// Only [`XmlError::Unsupported`]; malformed input is recovered from.
pub fn parse_str_with_errors(input: &str) -> Result<(DomTree, Vec<ParseError>), XmlError> {
    let mut parser = XmlParser::new();
    parser.feed(input)?;
    parser.finish_with_errors()
}
