//! core types for puzzle programs

use core::fmt;
use core::hash::{Hash, Hasher};
use core::mem;
use std::sync::Arc;

use num_bigint::BigInt;
use num_traits::ToPrimitive;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::number::{canonical_int_bytes, i64_to_bytes, int_from_bytes, int_to_bytes};

pub type Result<T> = core::result::Result<T, ClvmError>;

/// 1-based source location of a value read from text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub line: usize,
    pub column: usize,
}

impl Position {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// the two shapes a program can take
#[derive(Debug, Clone)]
pub enum ClvmValue {
    Atom(Vec<u8>),
    Cons(Program, Program),
}

struct Node {
    value: ClvmValue,
    position: OnceCell<Position>,
}

// unwind long chains without recursing once per level
impl Drop for Node {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        let value = mem::replace(&mut self.value, ClvmValue::Atom(Vec::new()));
        if let ClvmValue::Cons(first, rest) = value {
            pending.push(first);
            pending.push(rest);
        }
        while let Some(program) = pending.pop() {
            if let Ok(mut node) = Arc::try_unwrap(program.0) {
                if let ClvmValue::Cons(first, rest) =
                    mem::replace(&mut node.value, ClvmValue::Atom(Vec::new()))
                {
                    pending.push(first);
                    pending.push(rest);
                }
            }
        }
    }
}

/// an immutable tree of atoms and pairs, used for both code and data
///
/// cloning is cheap: children are shared, never copied. nothing can replace
/// the children of an existing node, so trees are always acyclic.
#[derive(Clone)]
pub struct Program(Arc<Node>);

impl Program {
    pub fn new(value: ClvmValue) -> Self {
        Program(Arc::new(Node {
            value,
            position: OnceCell::new(),
        }))
    }

    pub fn atom(bytes: impl Into<Vec<u8>>) -> Self {
        Self::new(ClvmValue::Atom(bytes.into()))
    }

    /// the empty atom: nil, false and the empty list
    pub fn nil() -> Self {
        Self::atom(Vec::new())
    }

    pub fn cons(first: Program, rest: Program) -> Self {
        Self::new(ClvmValue::Cons(first, rest))
    }

    pub fn from_int(value: i64) -> Self {
        Self::atom(i64_to_bytes(value))
    }

    pub fn from_bigint(value: &BigInt) -> Self {
        Self::atom(int_to_bytes(value))
    }

    pub fn from_bool(value: bool) -> Self {
        if value {
            Self::atom(vec![1])
        } else {
            Self::nil()
        }
    }

    pub fn from_text(text: &str) -> Self {
        Self::atom(text.as_bytes())
    }

    /// atom from hex text, with or without a `0x` prefix
    pub fn from_hex(text: &str) -> Result<Self> {
        let digits = strip_hex_prefix(text);
        let bytes = hex::decode(digits)
            .map_err(|e| ClvmError::parse(format!("invalid hex atom {text:?}: {e}"), None))?;
        Ok(Self::atom(bytes))
    }

    /// right-fold `items` into a nil-terminated cons chain
    pub fn list<I>(items: I) -> Self
    where
        I: IntoIterator<Item = Program>,
    {
        let items: Vec<Program> = items.into_iter().collect();
        items
            .into_iter()
            .rev()
            .fold(Self::nil(), |rest, item| Self::cons(item, rest))
    }

    pub fn value(&self) -> &ClvmValue {
        &self.0.value
    }

    pub fn is_atom(&self) -> bool {
        matches!(self.value(), ClvmValue::Atom(_))
    }

    pub fn is_cons(&self) -> bool {
        matches!(self.value(), ClvmValue::Cons(_, _))
    }

    pub fn is_nil(&self) -> bool {
        matches!(self.value(), ClvmValue::Atom(bytes) if bytes.is_empty())
    }

    pub fn as_atom(&self) -> Result<&[u8]> {
        match self.value() {
            ClvmValue::Atom(bytes) => Ok(bytes),
            ClvmValue::Cons(_, _) => Err(ClvmError::type_error("expected an atom", self)),
        }
    }

    pub fn as_pair(&self) -> Result<(&Program, &Program)> {
        match self.value() {
            ClvmValue::Cons(first, rest) => Ok((first, rest)),
            ClvmValue::Atom(_) => Err(ClvmError::type_error("expected a pair", self)),
        }
    }

    pub fn first(&self) -> Result<&Program> {
        match self.value() {
            ClvmValue::Cons(first, _) => Ok(first),
            ClvmValue::Atom(_) => Err(ClvmError::type_error("first of atom", self)),
        }
    }

    pub fn rest(&self) -> Result<&Program> {
        match self.value() {
            ClvmValue::Cons(_, rest) => Ok(rest),
            ClvmValue::Atom(_) => Err(ClvmError::type_error("rest of atom", self)),
        }
    }

    pub fn to_bigint(&self) -> Result<BigInt> {
        Ok(int_from_bytes(self.as_atom()?))
    }

    pub fn to_int(&self) -> Result<i64> {
        self.to_bigint()?
            .to_i64()
            .ok_or_else(|| ClvmError::type_error("atom does not fit in a 64-bit integer", self))
    }

    /// any non-empty atom is true
    pub fn to_bool(&self) -> Result<bool> {
        Ok(!self.as_atom()?.is_empty())
    }

    pub fn to_hex(&self) -> Result<String> {
        Ok(hex::encode(self.as_atom()?))
    }

    pub fn to_text(&self) -> Result<String> {
        String::from_utf8(self.as_atom()?.to_vec())
            .map_err(|_| ClvmError::type_error("atom is not valid utf-8", self))
    }

    pub fn position(&self) -> Option<Position> {
        self.0.position.get().copied()
    }

    /// attach a source position; the first position set wins
    pub fn set_position(&self, position: Position) {
        let _ = self.0.position.set(position);
    }

    pub fn with_position(self, position: Position) -> Self {
        self.set_position(position);
        self
    }

    /// true when both handles point at the same node
    pub fn ptr_eq(&self, other: &Program) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

pub(crate) fn strip_hex_prefix(text: &str) -> &str {
    text.strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text)
}

fn atoms_equal(a: &[u8], b: &[u8]) -> bool {
    a.is_empty() == b.is_empty() && canonical_int_bytes(a) == canonical_int_bytes(b)
}

impl PartialEq for Program {
    fn eq(&self, other: &Self) -> bool {
        let mut pending = vec![(self, other)];
        while let Some((a, b)) = pending.pop() {
            if a.ptr_eq(b) {
                continue;
            }
            match (a.value(), b.value()) {
                (ClvmValue::Atom(x), ClvmValue::Atom(y)) => {
                    if !atoms_equal(x, y) {
                        return false;
                    }
                }
                (ClvmValue::Cons(f1, r1), ClvmValue::Cons(f2, r2)) => {
                    pending.push((r1, r2));
                    pending.push((f1, f2));
                }
                _ => return false,
            }
        }
        true
    }
}

impl Eq for Program {}

impl Hash for Program {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let mut pending = vec![self];
        while let Some(program) = pending.pop() {
            match program.value() {
                ClvmValue::Atom(bytes) => {
                    0u8.hash(state);
                    bytes.is_empty().hash(state);
                    canonical_int_bytes(bytes).hash(state);
                }
                ClvmValue::Cons(first, rest) => {
                    1u8.hash(state);
                    pending.push(rest);
                    pending.push(first);
                }
            }
        }
    }
}

impl fmt::Debug for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Program({self})")
    }
}

impl From<i64> for Program {
    fn from(value: i64) -> Self {
        Program::from_int(value)
    }
}

impl From<bool> for Program {
    fn from(value: bool) -> Self {
        Program::from_bool(value)
    }
}

impl From<&str> for Program {
    fn from(value: &str) -> Self {
        Program::from_text(value)
    }
}

impl From<Vec<u8>> for Program {
    fn from(value: Vec<u8>) -> Self {
        Program::atom(value)
    }
}

impl From<&[u8]> for Program {
    fn from(value: &[u8]) -> Self {
        Program::atom(value)
    }
}

impl From<BigInt> for Program {
    fn from(value: BigInt) -> Self {
        Program::from_bigint(&value)
    }
}

fn located(position: &Option<Position>) -> String {
    match position {
        Some(position) => format!(" at {position}"),
        None => String::new(),
    }
}

/// every failure the core can report
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClvmError {
    #[error("{message}: {value}{}", located(.position))]
    Type {
        message: String,
        value: String,
        position: Option<Position>,
    },

    #[error("parse error: {message}{}", located(.position))]
    Parse {
        message: String,
        position: Option<Position>,
    },

    #[error("atom of {size} bytes is too large to serialize")]
    Range { size: u64 },

    #[error("{message}{}", located(.position))]
    Argument {
        message: String,
        position: Option<Position>,
    },

    #[error("cost exceeded: {cost} > {max_cost} evaluating {value}{}", located(.position))]
    CostExceeded {
        cost: u64,
        max_cost: u64,
        value: String,
        position: Option<Position>,
    },

    #[error("unknown operator {operator}{}", located(.position))]
    UnknownOperator {
        operator: String,
        position: Option<Position>,
    },

    #[error("clvm raise: {value}{}", located(.position))]
    Raise {
        value: String,
        position: Option<Position>,
    },

    #[error("{message}: {value}{}", located(.position))]
    Eval {
        message: String,
        value: String,
        position: Option<Position>,
    },
}

impl ClvmError {
    pub fn type_error(message: impl Into<String>, value: &Program) -> Self {
        ClvmError::Type {
            message: message.into(),
            value: value.to_string(),
            position: value.position(),
        }
    }

    pub fn parse(message: impl Into<String>, position: Option<Position>) -> Self {
        ClvmError::Parse {
            message: message.into(),
            position,
        }
    }

    pub fn eval(message: impl Into<String>, value: &Program) -> Self {
        ClvmError::Eval {
            message: message.into(),
            value: value.to_string(),
            position: value.position(),
        }
    }

    pub fn unknown_operator(operator: &Program) -> Self {
        ClvmError::UnknownOperator {
            operator: operator.to_string(),
            position: operator.position(),
        }
    }

    pub fn raise(value: &Program) -> Self {
        ClvmError::Raise {
            value: value.to_string(),
            position: value.position(),
        }
    }

    /// source position attached to the error, if any
    pub fn position(&self) -> Option<Position> {
        match self {
            ClvmError::Type { position, .. }
            | ClvmError::Parse { position, .. }
            | ClvmError::Argument { position, .. }
            | ClvmError::CostExceeded { position, .. }
            | ClvmError::UnknownOperator { position, .. }
            | ClvmError::Raise { position, .. }
            | ClvmError::Eval { position, .. } => *position,
            ClvmError::Range { .. } => None,
        }
    }
}
