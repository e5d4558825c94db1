//! program -> text form

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::number::{int_from_bytes, is_canonical_int};
use crate::operators::keyword_for;
use crate::types::{ClvmValue, Program};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrintOptions {
    /// print list heads that name an operator as their mnemonic
    pub show_keywords: bool,
}

impl Default for PrintOptions {
    fn default() -> Self {
        Self {
            show_keywords: true,
        }
    }
}

enum PrintOp<'a> {
    Value(&'a Program),
    Text(&'static str),
}

fn is_printable(ch: char) -> bool {
    ch.is_ascii_graphic() || matches!(ch, ' ' | '\t' | '\n' | '\r' | '\x0b' | '\x0c')
}

fn write_hex(out: &mut String, bytes: &[u8]) {
    out.push_str("0x");
    out.push_str(&hex::encode(bytes));
}

fn write_atom(out: &mut String, bytes: &[u8]) {
    if bytes.is_empty() {
        out.push_str("()");
    } else if bytes.len() > 2 {
        match core::str::from_utf8(bytes) {
            Ok(text) if text.chars().all(is_printable) => {
                let quote = match (text.contains('"'), text.contains('\'')) {
                    (true, true) => return write_hex(out, bytes),
                    (true, false) => '\'',
                    _ => '"',
                };
                out.push(quote);
                out.push_str(text);
                out.push(quote);
            }
            _ => write_hex(out, bytes),
        }
    } else if is_canonical_int(bytes) {
        out.push_str(&int_from_bytes(bytes).to_string());
    } else {
        write_hex(out, bytes);
    }
}

fn keyword(head: &Program) -> Option<&'static str> {
    match head.value() {
        ClvmValue::Atom(bytes) => keyword_for(&int_from_bytes(bytes)),
        ClvmValue::Cons(_, _) => None,
    }
}

/// append the text form of `program` to `out`
pub fn write_program(out: &mut String, program: &Program, options: &PrintOptions) {
    let mut ops = vec![PrintOp::Value(program)];

    while let Some(op) = ops.pop() {
        let node = match op {
            PrintOp::Text(text) => {
                out.push_str(text);
                continue;
            }
            PrintOp::Value(node) => node,
        };
        let (first, rest) = match node.value() {
            ClvmValue::Atom(bytes) => {
                write_atom(out, bytes);
                continue;
            }
            ClvmValue::Cons(first, rest) => (first, rest),
        };

        out.push('(');
        let mut pending = Vec::new();
        match options.show_keywords.then(|| keyword(first)).flatten() {
            Some(name) => out.push_str(name),
            None => pending.push(PrintOp::Value(first)),
        }
        let mut current = rest;
        while let ClvmValue::Cons(item, next) = current.value() {
            pending.push(PrintOp::Text(" "));
            pending.push(PrintOp::Value(item));
            current = next;
        }
        if !current.is_nil() {
            pending.push(PrintOp::Text(" . "));
            pending.push(PrintOp::Value(current));
        }
        pending.push(PrintOp::Text(")"));
        ops.extend(pending.into_iter().rev());
    }
}

impl Program {
    pub fn to_text_with(&self, options: &PrintOptions) -> String {
        let mut out = String::new();
        write_program(&mut out, self, options);
        out
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text_with(&PrintOptions::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(program: &Program) -> String {
        program.to_text_with(&PrintOptions {
            show_keywords: false,
        })
    }

    #[test]
    fn test_atoms() {
        assert_eq!(Program::nil().to_string(), "()");
        assert_eq!(Program::from_int(5).to_string(), "5");
        assert_eq!(Program::from_int(-1).to_string(), "-1");
        assert_eq!(Program::from_int(1000).to_string(), "1000");
        assert_eq!(Program::atom(vec![0x00]).to_string(), "0x00");
        assert_eq!(Program::atom(vec![0x00, 0x05]).to_string(), "0x0005");
        assert_eq!(Program::from_text("hello").to_string(), "\"hello\"");
        assert_eq!(Program::from_text("say \"hi\"").to_string(), "'say \"hi\"'");
        assert_eq!(Program::from_text("it's \"x\"").to_string(), "0x6974277320227822");
    }

    #[test]
    fn test_non_utf8_prints_hex() {
        assert_eq!(Program::atom(vec![0xff, 0xfe, 0xfd]).to_string(), "0xfffefd");
        assert_eq!(Program::atom(vec![0x01, 0x02, 0x03]).to_string(), "0x010203");
    }

    #[test]
    fn test_lists() {
        let list = Program::list([Program::from_int(100), Program::from_int(200)]);
        assert_eq!(list.to_string(), "(100 200)");
        let dotted = Program::cons(Program::from_int(100), Program::from_int(200));
        assert_eq!(dotted.to_string(), "(100 . 200)");
        let nested = Program::list([Program::nil(), list]);
        assert_eq!(nested.to_string(), "(() (100 200))");
    }

    #[test]
    fn test_keywords_only_at_head() {
        let program = Program::list([
            Program::from_int(16),
            Program::from_int(2),
            Program::cons(Program::from_int(1), Program::from_int(5)),
        ]);
        assert_eq!(program.to_string(), "(+ 2 (q . 5))");
        assert_eq!(plain(&program), "(16 2 (1 . 5))");
    }

    #[test]
    fn test_unknown_head_prints_structurally() {
        let program = Program::list([Program::from_int(1000), Program::from_int(1)]);
        assert_eq!(program.to_string(), "(1000 1)");
    }
}
