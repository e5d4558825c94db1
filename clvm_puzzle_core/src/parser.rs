//! binary format parser

use crate::serialize::{CONS_BOX_MARKER, MAX_ATOM_SIZE, NIL_MARKER};
use crate::types::{ClvmError, Program, Result};

enum ParseOp {
    SExp,
    Cons,
}

/// forward-only cursor over serialized programs
///
/// parsing keeps its own stack so deeply nested input cannot exhaust the
/// native one.
pub struct ClvmParser<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ClvmParser<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    /// bytes not yet consumed
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// parse the next program from the cursor
    pub fn parse(&mut self) -> Result<Program> {
        let mut ops = vec![ParseOp::SExp];
        let mut values: Vec<Program> = Vec::new();

        while let Some(op) = ops.pop() {
            match op {
                ParseOp::SExp => {
                    let byte = self.next_byte()?;
                    if byte == CONS_BOX_MARKER {
                        ops.push(ParseOp::Cons);
                        ops.push(ParseOp::SExp);
                        ops.push(ParseOp::SExp);
                    } else {
                        values.push(self.parse_atom(byte)?);
                    }
                }
                ParseOp::Cons => {
                    let (Some(rest), Some(first)) = (values.pop(), values.pop()) else {
                        return Err(ClvmError::parse("pair is missing a child", None));
                    };
                    values.push(Program::cons(first, rest));
                }
            }
        }

        values
            .pop()
            .ok_or_else(|| ClvmError::parse("unexpected end of input", None))
    }

    fn next_byte(&mut self) -> Result<u8> {
        let byte = *self
            .bytes
            .get(self.pos)
            .ok_or_else(|| ClvmError::parse("unexpected end of input", None))?;
        self.pos += 1;
        Ok(byte)
    }

    fn take(&mut self, count: u64) -> Result<&'a [u8]> {
        if count > self.remaining() as u64 {
            return Err(ClvmError::parse(
                format!(
                    "atom size {count} exceeds remaining {} bytes",
                    self.remaining()
                ),
                None,
            ));
        }
        let start = self.pos;
        self.pos += count as usize;
        Ok(&self.bytes[start..self.pos])
    }

    fn parse_atom(&mut self, byte: u8) -> Result<Program> {
        if byte == NIL_MARKER {
            return Ok(Program::nil());
        }
        if byte <= 0x7f {
            return Ok(Program::atom(vec![byte]));
        }

        // 0x80..=0xfb: one to five header bytes
        let header_len = byte.leading_ones();
        if header_len > 5 {
            return Err(ClvmError::parse(
                format!("invalid atom size prefix {byte:#04x}"),
                None,
            ));
        }
        let mut size = u64::from(byte & (0xff >> (header_len + 1)));
        for &extra in self.take(u64::from(header_len - 1))? {
            size = (size << 8) | u64::from(extra);
        }
        if size >= MAX_ATOM_SIZE {
            return Err(ClvmError::parse(format!("atom size {size} too large"), None));
        }

        Ok(Program::atom(self.take(size)?))
    }
}
