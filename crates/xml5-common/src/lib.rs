//! Common utilities for the xml5 crates.
//!
//! This crate provides shared infrastructure used by the tokenizer, the tree
//! builder and the command-line tool:
//! - **Warning System** - deduplicated, colored diagnostics on stderr

pub mod warning;
