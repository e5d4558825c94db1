//! text form -> program

use num_bigint::BigInt;

use crate::number::int_to_bytes;
use crate::operators::opcode_for;
use crate::text::tokenizer::{Token, TokenKind, Tokenizer};
use crate::types::{ClvmError, Position, Program, Result};

enum Tail {
    None,
    Pending(Position),
    Done(Program),
}

/// a list whose closing paren has not been read yet
struct ListFrame {
    position: Position,
    items: Vec<Program>,
    tail: Tail,
}

impl ListFrame {
    fn new(position: Position) -> Self {
        Self {
            position,
            items: Vec::new(),
            tail: Tail::None,
        }
    }

    fn push(&mut self, value: Program, position: Position) -> Result<()> {
        match self.tail {
            Tail::None => self.items.push(value),
            Tail::Pending(_) => self.tail = Tail::Done(value),
            Tail::Done(_) => {
                return Err(ClvmError::parse(
                    "expected ')' after dotted tail",
                    Some(position),
                ))
            }
        }
        Ok(())
    }

    fn begin_tail(&mut self, position: Position) -> Result<()> {
        if self.items.is_empty() || !matches!(self.tail, Tail::None) {
            return Err(ClvmError::parse("unexpected '.'", Some(position)));
        }
        self.tail = Tail::Pending(position);
        Ok(())
    }

    fn finish(self) -> Result<Program> {
        let tail = match self.tail {
            Tail::None => Program::nil(),
            Tail::Pending(position) => {
                return Err(ClvmError::parse("expected expression after '.'", Some(position)))
            }
            Tail::Done(tail) => tail,
        };
        let mut list = tail;
        if self.items.is_empty() {
            list.set_position(self.position);
        }
        // the outermost pair points at the opening paren, inner pairs at their element
        for (index, item) in self.items.into_iter().enumerate().rev() {
            let position = if index == 0 {
                Some(self.position)
            } else {
                item.position()
            };
            list = Program::cons(item, list);
            if let Some(position) = position {
                list.set_position(position);
            }
        }
        Ok(list)
    }
}

/// interpret a bare word: decimal, `0x` hex, or keyword
fn read_word(word: &str, position: Position) -> Result<Program> {
    if let Some(digits) = word.strip_prefix("0x").or_else(|| word.strip_prefix("0X")) {
        let padded;
        let digits = if digits.len() % 2 == 1 {
            padded = format!("0{digits}");
            padded.as_str()
        } else {
            digits
        };
        let bytes = hex::decode(digits).map_err(|e| {
            ClvmError::parse(format!("invalid hex literal {word}: {e}"), Some(position))
        })?;
        return Ok(Program::atom(bytes));
    }

    if is_decimal(word) {
        let unsigned = word.strip_prefix('+').unwrap_or(word);
        let value: BigInt = unsigned.parse().map_err(|_| {
            ClvmError::parse(format!("invalid integer {word}"), Some(position))
        })?;
        return Ok(Program::atom(int_to_bytes(&value)));
    }

    match opcode_for(word) {
        Some(opcode) => Ok(Program::from_int(i64::from(opcode))),
        None => Err(ClvmError::parse(
            format!("unknown symbol {word:?}"),
            Some(position),
        )),
    }
}

fn is_decimal(word: &str) -> bool {
    let digits = word
        .strip_prefix('-')
        .or_else(|| word.strip_prefix('+'))
        .unwrap_or(word);
    !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())
}

fn next_token(tokens: &mut Tokenizer<'_>) -> Result<Option<Token>> {
    tokens.next().transpose()
}

/// parse exactly one program from text
pub fn read_program(source: &str) -> Result<Program> {
    let mut tokens = Tokenizer::new(source);
    let mut open: Vec<ListFrame> = Vec::new();

    loop {
        let Some(token) = next_token(&mut tokens)? else {
            return Err(match open.last() {
                Some(frame) => ClvmError::parse("unexpected end of input", Some(frame.position)),
                None => ClvmError::parse("empty input", None),
            });
        };

        let value = match token.kind {
            TokenKind::Open => {
                open.push(ListFrame::new(token.position));
                continue;
            }
            TokenKind::Close => match open.pop() {
                Some(frame) => frame.finish()?,
                None => return Err(ClvmError::parse("unexpected ')'", Some(token.position))),
            },
            TokenKind::Dot => match open.last_mut() {
                Some(frame) => {
                    frame.begin_tail(token.position)?;
                    continue;
                }
                None => return Err(ClvmError::parse("unexpected '.'", Some(token.position))),
            },
            TokenKind::Quoted(text) => Program::from_text(&text).with_position(token.position),
            TokenKind::Word(word) => {
                read_word(&word, token.position)?.with_position(token.position)
            }
        };

        match open.last_mut() {
            Some(frame) => frame.push(value, token.position)?,
            None => {
                if let Some(extra) = next_token(&mut tokens)? {
                    return Err(ClvmError::parse(
                        "unexpected input after expression",
                        Some(extra.position),
                    ));
                }
                return Ok(value);
            }
        }
    }
}

impl Program {
    /// parse the text form, e.g. `(a (q . 1) (c 2 ()))`
    pub fn parse(source: &str) -> Result<Program> {
        read_program(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_atoms() {
        assert_eq!(Program::parse("42").unwrap(), Program::from_int(42));
        assert_eq!(Program::parse("-1").unwrap().as_atom().unwrap(), &[0xff]);
        assert_eq!(Program::parse("0").unwrap().as_atom().unwrap(), &[] as &[u8]);
        assert_eq!(Program::parse("0x00ff").unwrap().as_atom().unwrap(), &[0x00, 0xff]);
        assert_eq!(Program::parse("0xfff").unwrap().as_atom().unwrap(), &[0x0f, 0xff]);
        assert_eq!(Program::parse("\"hello\"").unwrap().as_atom().unwrap(), b"hello");
        assert_eq!(Program::parse("()").unwrap(), Program::nil());
        assert_eq!(Program::parse("sha256").unwrap(), Program::from_int(11));
    }

    #[test]
    fn test_parse_lists() {
        let program = Program::parse("(q . (1 2 . 3))").unwrap();
        let (head, body) = program.as_pair().unwrap();
        assert_eq!(head, &Program::from_int(1));
        assert_eq!(body.first().unwrap(), &Program::from_int(1));
        assert_eq!(
            body.rest().unwrap(),
            &Program::cons(Program::from_int(2), Program::from_int(3))
        );
    }

    #[test]
    fn test_positions_are_recorded() {
        let program = Program::parse("(+ 1\n   2)").unwrap();
        assert_eq!(program.position(), Some(Position::new(1, 1)));
        let second = program.rest().unwrap().rest().unwrap().first().unwrap();
        assert_eq!(second.position(), Some(Position::new(2, 4)));
    }

    #[test]
    fn test_malformed_input() {
        for source in [
            "", "   ", "(", ")", "(1 2", "(. 1)", "(1 . )", "(1 . 2 3)", "1 2", "(1 . 2 . 3)",
            "nonsense", "0xzz", "(1))",
        ] {
            assert!(
                matches!(Program::parse(source), Err(ClvmError::Parse { .. })),
                "{source:?} should fail"
            );
        }
    }

    #[test]
    fn test_error_reports_position() {
        let err = Program::parse("(q\n  bogus)").unwrap_err();
        assert_eq!(err.position(), Some(Position::new(2, 3)));
    }
}
