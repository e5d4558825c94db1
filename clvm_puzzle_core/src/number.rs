//! atom <-> integer conversions
//!
//! atoms read as integers are big-endian two's complement. the empty atom is
//! zero and the minimal encoding never carries a redundant sign byte.

use num_bigint::BigInt;
use num_traits::Zero;

/// decode an atom as a signed integer
pub fn int_from_bytes(bytes: &[u8]) -> BigInt {
    if bytes.is_empty() {
        return BigInt::zero();
    }
    BigInt::from_signed_bytes_be(bytes)
}

/// minimal encoding of an integer (zero encodes as the empty atom)
pub fn int_to_bytes(value: &BigInt) -> Vec<u8> {
    if value.is_zero() {
        return Vec::new();
    }
    canonical_int_bytes(&value.to_signed_bytes_be()).to_vec()
}

pub fn i64_to_bytes(value: i64) -> Vec<u8> {
    int_to_bytes(&BigInt::from(value))
}

/// strip redundant sign-extension bytes
///
/// `[0x00, 0x05]` -> `[0x05]`, `[0xff, 0xff]` -> `[0xff]`, `[0x00]` -> `[]`.
/// two atoms hold the same integer iff their canonical forms are equal.
pub fn canonical_int_bytes(bytes: &[u8]) -> &[u8] {
    let mut start = 0;
    while start < bytes.len() {
        let next_sign = bytes.get(start + 1).map(|b| b & 0x80);
        match (bytes[start], next_sign) {
            (0x00, None) | (0x00, Some(0x00)) | (0xff, Some(0x80)) => start += 1,
            _ => break,
        }
    }
    &bytes[start..]
}

/// true when `bytes` is exactly the minimal encoding of its own value
pub fn is_canonical_int(bytes: &[u8]) -> bool {
    canonical_int_bytes(bytes).len() == bytes.len()
}

/// operator code carried by an atom, if it is a non-negative value below 2^32
pub fn opcode_of(bytes: &[u8]) -> Option<u32> {
    let canonical = canonical_int_bytes(bytes);
    if matches!(canonical.first(), Some(b) if b & 0x80 != 0) {
        return None;
    }
    let magnitude = match canonical {
        [0x00, tail @ ..] => tail,
        _ => canonical,
    };
    if magnitude.len() > 4 {
        return None;
    }
    Some(
        magnitude
            .iter()
            .fold(0u32, |acc, byte| (acc << 8) | u32::from(*byte)),
    )
}
