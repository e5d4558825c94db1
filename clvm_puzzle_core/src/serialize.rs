//! canonical binary serialization

use crate::parser::ClvmParser;
use crate::types::{strip_hex_prefix, ClvmError, ClvmValue, Program, Result};

pub const CONS_BOX_MARKER: u8 = 0xff;
pub const NIL_MARKER: u8 = 0x80;

/// atoms of this many bytes or more have no size header
pub const MAX_ATOM_SIZE: u64 = 0x4_0000_0000;

/// size header for an atom payload of `size` bytes
///
/// the count of leading one bits in the first byte is the header length.
pub fn encode_size(size: u64) -> Result<Vec<u8>> {
    let header = if size < 0x40 {
        vec![0x80 | size as u8]
    } else if size < 0x2000 {
        vec![0xc0 | (size >> 8) as u8, size as u8]
    } else if size < 0x10_0000 {
        vec![0xe0 | (size >> 16) as u8, (size >> 8) as u8, size as u8]
    } else if size < 0x800_0000 {
        vec![
            0xf0 | (size >> 24) as u8,
            (size >> 16) as u8,
            (size >> 8) as u8,
            size as u8,
        ]
    } else if size < MAX_ATOM_SIZE {
        vec![
            0xf8 | (size >> 32) as u8,
            (size >> 24) as u8,
            (size >> 16) as u8,
            (size >> 8) as u8,
            size as u8,
        ]
    } else {
        return Err(ClvmError::Range { size });
    };
    Ok(header)
}

fn encode_atom(bytes: &[u8], out: &mut Vec<u8>) -> Result<()> {
    match bytes {
        [] => out.push(NIL_MARKER),
        [byte] if *byte <= 0x7f => out.push(*byte),
        _ => {
            out.extend_from_slice(&encode_size(bytes.len() as u64)?);
            out.extend_from_slice(bytes);
        }
    }
    Ok(())
}

/// encode a program into its unique minimal byte form
pub fn serialize(program: &Program) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    let mut pending = vec![program];
    while let Some(node) = pending.pop() {
        match node.value() {
            ClvmValue::Atom(bytes) => encode_atom(bytes, &mut out)?,
            ClvmValue::Cons(first, rest) => {
                out.push(CONS_BOX_MARKER);
                pending.push(rest);
                pending.push(first);
            }
        }
    }
    Ok(out)
}

pub fn serialize_hex(program: &Program) -> Result<String> {
    Ok(hex::encode(serialize(program)?))
}

/// decode exactly one program; trailing bytes are an error
pub fn deserialize(bytes: &[u8]) -> Result<Program> {
    let mut parser = ClvmParser::new(bytes);
    let program = parser.parse()?;
    if parser.remaining() != 0 {
        return Err(ClvmError::parse(
            format!("{} trailing bytes after program", parser.remaining()),
            None,
        ));
    }
    Ok(program)
}

pub fn deserialize_hex(text: &str) -> Result<Program> {
    let digits = strip_hex_prefix(text.trim());
    let bytes = hex::decode(digits)
        .map_err(|e| ClvmError::parse(format!("invalid hex: {e}"), None))?;
    deserialize(&bytes)
}

impl Program {
    pub fn serialize(&self) -> Result<Vec<u8>> {
        serialize(self)
    }

    pub fn serialize_hex(&self) -> Result<String> {
        serialize_hex(self)
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Program> {
        deserialize(bytes)
    }

    pub fn deserialize_hex(text: &str) -> Result<Program> {
        deserialize_hex(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn atom_of_len(len: usize) -> Program {
        Program::atom(vec![0x42; len])
    }

    #[test]
    fn test_small_atoms() {
        assert_eq!(serialize(&Program::nil()).unwrap(), vec![0x80]);
        assert_eq!(serialize(&Program::from_int(1)).unwrap(), vec![0x01]);
        assert_eq!(serialize(&Program::atom(vec![0x7f])).unwrap(), vec![0x7f]);
        assert_eq!(serialize(&Program::atom(vec![0x80])).unwrap(), vec![0x81, 0x80]);
        assert_eq!(serialize(&Program::atom(vec![0x00])).unwrap(), vec![0x00]);
        assert_eq!(deserialize(&[0x00]).unwrap().as_atom().unwrap(), &[0x00]);
    }

    #[test]
    fn test_header_boundaries() {
        let cases: [(usize, &[u8]); 4] = [
            (0x3f, &[0xbf]),
            (0x40, &[0xc0, 0x40]),
            (0x1fff, &[0xdf, 0xff]),
            (0x2000, &[0xe0, 0x20, 0x00]),
        ];
        for (len, header) in cases {
            let encoded = serialize(&atom_of_len(len)).unwrap();
            assert_eq!(&encoded[..header.len()], header, "length {len:#x}");
            assert_eq!(encoded.len(), header.len() + len);
        }
    }

    #[test]
    fn test_encode_size_ranges() {
        assert_eq!(encode_size(0xfffff).unwrap(), vec![0xef, 0xff, 0xff]);
        assert_eq!(encode_size(0x100000).unwrap(), vec![0xf0, 0x10, 0x00, 0x00]);
        assert_eq!(encode_size(0x7ffffff).unwrap(), vec![0xf7, 0xff, 0xff, 0xff]);
        assert_eq!(
            encode_size(0x8000000).unwrap(),
            vec![0xf8, 0x08, 0x00, 0x00, 0x00]
        );
        assert_eq!(
            encode_size(MAX_ATOM_SIZE - 1).unwrap(),
            vec![0xfb, 0xff, 0xff, 0xff, 0xff]
        );
        assert_eq!(
            encode_size(MAX_ATOM_SIZE),
            Err(ClvmError::Range { size: MAX_ATOM_SIZE })
        );
    }

    #[test]
    fn test_pair_layout() {
        let pair = Program::cons(Program::from_int(1), Program::nil());
        assert_eq!(serialize(&pair).unwrap(), vec![0xff, 0x01, 0x80]);
        assert_eq!(serialize_hex(&pair).unwrap(), "ff0180");
    }

    #[test]
    fn test_round_trip() {
        let program = Program::list([
            Program::from_int(-1),
            Program::from_text("hello world"),
            Program::cons(atom_of_len(0x40), Program::from_int(300)),
            Program::nil(),
        ]);
        let bytes = serialize(&program).unwrap();
        assert_eq!(deserialize(&bytes).unwrap(), program);
        assert_eq!(deserialize_hex(&hex::encode(&bytes)).unwrap(), program);
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        assert!(matches!(
            deserialize(&[0x01, 0x02]),
            Err(ClvmError::Parse { .. })
        ));
    }
}
