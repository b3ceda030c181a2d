//! xml5 CLI
//!
//! Parses an XML5 document and prints the resulting tree, the raw token
//! stream, or the parse errors.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use owo_colors::OwoColorize;
use xml5_common::warning::clear_warnings;
use xml5_dom::dump_tree;
use xml5_parser::{ParseError, Token, XmlParser, XmlTokenizer};

/// xml5: forgiving XML parser and tree dumper
#[derive(Parser, Debug)]
#[command(name = "xml5")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Print the tree for a file
    xml5 ./feed.xml

    # Parse inline XML
    xml5 --xml '<a xmlns="urn:x"><b/></a>'

    # Show the token stream instead of the tree
    xml5 --tokens ./feed.xml

    # Tokens as JSON, one per line
    xml5 --tokens --json ./feed.xml

    # Feed the input eight characters at a time
    xml5 --chunk-size 8 ./feed.xml
"#)]
struct Cli {
    /// Path to an XML file
    #[arg(value_name = "FILE")]
    path: Option<PathBuf>,

    /// Parse this string instead of a file
    #[arg(long, value_name = "XML")]
    xml: Option<String>,

    /// Print the token stream instead of the tree
    #[arg(short, long)]
    tokens: bool,

    /// Print tokens and errors as JSON
    #[arg(long)]
    json: bool,

    /// Stop at the first parse error
    #[arg(long)]
    strict: bool,

    /// Feed the input in chunks of this many characters
    #[arg(long, value_name = "N")]
    chunk_size: Option<usize>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    clear_warnings();

    let input = load_input(&cli)?;
    let chunks = split_chunks(&input, cli.chunk_size);

    if cli.tokens {
        print_tokens(&chunks, cli.json)?;
        return Ok(());
    }

    let mut parser = XmlParser::new();
    if cli.strict {
        parser = parser.with_strict_mode();
    }
    for chunk in &chunks {
        parser.feed(chunk)?;
    }
    let (tree, errors) = parser.finish_with_errors()?;

    println!("{}", "=== Document Tree ===".bold());
    println!("{}", dump_tree(&tree));
    print_errors(&errors, cli.json)?;
    Ok(())
}

/// Read the document from `--xml` or the file argument.
fn load_input(cli: &Cli) -> Result<String> {
    if let Some(ref xml) = cli.xml {
        Ok(xml.clone())
    } else if let Some(ref path) = cli.path {
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
    } else {
        bail!("expected a file path or --xml")
    }
}

/// Split on character boundaries. No chunk size means a single chunk.
fn split_chunks(input: &str, size: Option<usize>) -> Vec<String> {
    match size {
        Some(size) if size > 0 => {
            let chars: Vec<char> = input.chars().collect();
            chars.chunks(size).map(|chunk| chunk.iter().collect()).collect()
        }
        _ => vec![input.to_string()],
    }
}

fn print_tokens(chunks: &[String], json: bool) -> Result<()> {
    let mut tokenizer = XmlTokenizer::new();
    let mut tokens: Vec<Token> = Vec::new();
    for chunk in chunks {
        tokenizer.feed(chunk);
        tokens.extend(tokenizer.take_tokens());
    }
    tokenizer.end();
    tokens.extend(tokenizer.take_tokens());

    if !json {
        println!("{}", "=== Tokens ===".bold());
    }
    for token in &tokens {
        if json {
            println!("{}", serde_json::to_string(token)?);
        } else if let Token::ParseError(error) = token {
            println!("{}", format!("  {error}").red());
        } else {
            println!("  {token}");
        }
    }
    if let Some(failure) = tokenizer.failure() {
        bail!("{failure}");
    }
    Ok(())
}

fn print_errors(errors: &[ParseError], json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(errors)?);
        return Ok(());
    }
    if errors.is_empty() {
        println!("\n{}", "No parse errors".green());
        return Ok(());
    }
    println!("\n{}", format!("=== Parse Errors ({}) ===", errors.len()).yellow());
    for error in errors {
        println!("  - {error}");
    }
    Ok(())
}
