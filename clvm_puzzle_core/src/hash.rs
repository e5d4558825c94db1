//! tree hash: the content address of a program

use sha2::{Digest, Sha256};

use crate::types::{ClvmValue, Program};

pub type TreeHash = [u8; 32];

const ATOM_PREFIX: u8 = 0x01;
const PAIR_PREFIX: u8 = 0x02;

pub fn hash_atom(bytes: &[u8]) -> TreeHash {
    let mut hasher = Sha256::new();
    hasher.update([ATOM_PREFIX]);
    hasher.update(bytes);
    hasher.finalize().into()
}

pub fn hash_pair(first: &TreeHash, rest: &TreeHash) -> TreeHash {
    let mut hasher = Sha256::new();
    hasher.update([PAIR_PREFIX]);
    hasher.update(first);
    hasher.update(rest);
    hasher.finalize().into()
}

/// a pair whose hasher has been fed its prefix and any finished children
struct OpenPair<'a> {
    hasher: Sha256,
    rest: Option<&'a Program>,
}

/// sha256 tree hash over the raw atom bytes
pub fn tree_hash(program: &Program) -> TreeHash {
    let mut open: Vec<OpenPair<'_>> = Vec::new();
    let mut node = program;

    loop {
        let mut digest = match node.value() {
            ClvmValue::Cons(first, rest) => {
                let mut hasher = Sha256::new();
                hasher.update([PAIR_PREFIX]);
                open.push(OpenPair {
                    hasher,
                    rest: Some(rest),
                });
                node = first;
                continue;
            }
            ClvmValue::Atom(bytes) => hash_atom(bytes),
        };

        // feed the finished digest upwards until a pair still needs its rest
        loop {
            let Some(mut pair) = open.pop() else {
                return digest;
            };
            pair.hasher.update(digest);
            if let Some(rest) = pair.rest.take() {
                open.push(pair);
                node = rest;
                break;
            }
            digest = pair.hasher.finalize().into();
        }
    }
}

impl Program {
    pub fn tree_hash(&self) -> TreeHash {
        tree_hash(self)
    }

    pub fn tree_hash_hex(&self) -> String {
        hex::encode(tree_hash(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nil_hash_is_fixed() {
        assert_eq!(
            hex::encode(tree_hash(&Program::nil())),
            "4bf5122f344554c53bde2ebb8cd2b7e3d1600ad631c385a5d7cce23c7785459a"
        );
    }

    #[test]
    fn test_atom_hash_uses_prefix() {
        let expected: TreeHash = Sha256::digest([0x01, 0x05]).into();
        assert_eq!(tree_hash(&Program::from_int(5)), expected);
    }

    #[test]
    fn test_pair_hash_sensitivity() {
        let a = Program::from_int(1);
        let b = Program::from_int(2);
        let pair = tree_hash(&Program::cons(a.clone(), b.clone()));

        assert_eq!(pair, hash_pair(&tree_hash(&a), &tree_hash(&b)));
        assert_ne!(pair, tree_hash(&Program::cons(b.clone(), a.clone())));
        assert_ne!(pair, tree_hash(&Program::cons(a.clone(), Program::from_int(3))));
        assert_ne!(pair, tree_hash(&Program::cons(Program::from_int(3), b)));
    }

    #[test]
    fn test_deterministic() {
        let program = Program::list([Program::from_text("abc"), Program::from_int(-7)]);
        assert_eq!(program.tree_hash(), program.clone().tree_hash());
        assert_eq!(program.tree_hash_hex().len(), 64);
    }

    #[test]
    fn test_nested_pairs() {
        let one = Program::from_int(1);
        let two = Program::from_int(2);
        let three = Program::from_int(3);
        let tree = Program::cons(Program::cons(one, two), three);
        let expected = hash_pair(
            &hash_pair(&hash_atom(&[1]), &hash_atom(&[2])),
            &hash_atom(&[3]),
        );
        assert_eq!(tree_hash(&tree), expected);
    }

    #[test]
    fn test_deep_left_spine() {
        let mut deep = Program::nil();
        for _ in 0..100_000 {
            deep = Program::cons(deep, Program::nil());
        }
        let mut expected = hash_atom(&[]);
        for _ in 0..100_000 {
            expected = hash_pair(&expected, &hash_atom(&[]));
        }
        assert_eq!(tree_hash(&deep), expected);
    }
}
