//! human-readable s-expression form
//!
//! `print` then `parse` gives back an equal program for every tree.

pub mod printer;
pub mod reader;
pub mod tokenizer;

pub use printer::{write_program, PrintOptions};
pub use reader::read_program;
pub use tokenizer::{Token, TokenKind, Tokenizer};
