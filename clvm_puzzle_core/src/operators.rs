//! operator mnemonics and their numeric codes
//!
//! printing and parsing share this table, so a keyword printed for a code
//! always reads back as the same code.

use core::str::FromStr;

use num_bigint::BigInt;
use num_traits::ToPrimitive;

/// operators with a mnemonic in the text form
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClvmOperator {
    Quote,
    Apply,
    If,
    Cons,
    First,
    Rest,
    ListCheck,
    Raise,
    Equal,
    GreaterBytes,
    Sha256,
    Substr,
    Strlen,
    Concat,
    Add,
    Subtract,
    Multiply,
    Divide,
    DivMod,
    GreaterThan,
    Ash,
    Lsh,
    LogAnd,
    LogIor,
    LogXor,
    LogNot,
    PointAdd,
    PubkeyForExp,
    Not,
    Any,
    All,
    Softfork,
}

impl ClvmOperator {
    pub const ALL: [ClvmOperator; 32] = [
        ClvmOperator::Quote,
        ClvmOperator::Apply,
        ClvmOperator::If,
        ClvmOperator::Cons,
        ClvmOperator::First,
        ClvmOperator::Rest,
        ClvmOperator::ListCheck,
        ClvmOperator::Raise,
        ClvmOperator::Equal,
        ClvmOperator::GreaterBytes,
        ClvmOperator::Sha256,
        ClvmOperator::Substr,
        ClvmOperator::Strlen,
        ClvmOperator::Concat,
        ClvmOperator::Add,
        ClvmOperator::Subtract,
        ClvmOperator::Multiply,
        ClvmOperator::Divide,
        ClvmOperator::DivMod,
        ClvmOperator::GreaterThan,
        ClvmOperator::Ash,
        ClvmOperator::Lsh,
        ClvmOperator::LogAnd,
        ClvmOperator::LogIor,
        ClvmOperator::LogXor,
        ClvmOperator::LogNot,
        ClvmOperator::PointAdd,
        ClvmOperator::PubkeyForExp,
        ClvmOperator::Not,
        ClvmOperator::Any,
        ClvmOperator::All,
        ClvmOperator::Softfork,
    ];

    pub fn opcode(&self) -> u32 {
        match self {
            ClvmOperator::Quote => 1,
            ClvmOperator::Apply => 2,
            ClvmOperator::If => 3,
            ClvmOperator::Cons => 4,
            ClvmOperator::First => 5,
            ClvmOperator::Rest => 6,
            ClvmOperator::ListCheck => 7,
            ClvmOperator::Raise => 8,
            ClvmOperator::Equal => 9,
            ClvmOperator::GreaterBytes => 10,
            ClvmOperator::Sha256 => 11,
            ClvmOperator::Substr => 12,
            ClvmOperator::Strlen => 13,
            ClvmOperator::Concat => 14,
            // 15 unassigned
            ClvmOperator::Add => 16,
            ClvmOperator::Subtract => 17,
            ClvmOperator::Multiply => 18,
            ClvmOperator::Divide => 19,
            ClvmOperator::DivMod => 20,
            ClvmOperator::GreaterThan => 21,
            ClvmOperator::Ash => 22,
            ClvmOperator::Lsh => 23,
            ClvmOperator::LogAnd => 24,
            ClvmOperator::LogIor => 25,
            ClvmOperator::LogXor => 26,
            ClvmOperator::LogNot => 27,
            // 28 unassigned
            ClvmOperator::PointAdd => 29,
            ClvmOperator::PubkeyForExp => 30,
            // 31 unassigned
            ClvmOperator::Not => 32,
            ClvmOperator::Any => 33,
            ClvmOperator::All => 34,
            // 35 unassigned
            ClvmOperator::Softfork => 36,
        }
    }

    pub fn from_opcode(opcode: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.opcode() == opcode)
    }

    pub fn parse_operator(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.as_str() == s)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ClvmOperator::Quote => "q",
            ClvmOperator::Apply => "a",
            ClvmOperator::If => "i",
            ClvmOperator::Cons => "c",
            ClvmOperator::First => "f",
            ClvmOperator::Rest => "r",
            ClvmOperator::ListCheck => "l",
            ClvmOperator::Raise => "x",
            ClvmOperator::Equal => "=",
            ClvmOperator::GreaterBytes => ">s",
            ClvmOperator::Sha256 => "sha256",
            ClvmOperator::Substr => "substr",
            ClvmOperator::Strlen => "strlen",
            ClvmOperator::Concat => "concat",
            ClvmOperator::Add => "+",
            ClvmOperator::Subtract => "-",
            ClvmOperator::Multiply => "*",
            ClvmOperator::Divide => "/",
            ClvmOperator::DivMod => "divmod",
            ClvmOperator::GreaterThan => ">",
            ClvmOperator::Ash => "ash",
            ClvmOperator::Lsh => "lsh",
            ClvmOperator::LogAnd => "logand",
            ClvmOperator::LogIor => "logior",
            ClvmOperator::LogXor => "logxor",
            ClvmOperator::LogNot => "lognot",
            ClvmOperator::PointAdd => "point_add",
            ClvmOperator::PubkeyForExp => "pubkey_for_exp",
            ClvmOperator::Not => "not",
            ClvmOperator::Any => "any",
            ClvmOperator::All => "all",
            ClvmOperator::Softfork => "softfork",
        }
    }
}

impl FromStr for ClvmOperator {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_operator(s).ok_or(())
    }
}

/// mnemonic for an integer value, if it names an operator
pub fn keyword_for(value: &BigInt) -> Option<&'static str> {
    let opcode = value.to_u32()?;
    ClvmOperator::from_opcode(opcode).map(|op| op.as_str())
}

/// numeric code for a mnemonic
pub fn opcode_for(keyword: &str) -> Option<u32> {
    ClvmOperator::parse_operator(keyword).map(|op| op.opcode())
}
