//! reading cons chains as native sequences

use num_bigint::BigInt;
use num_traits::ToPrimitive;

use crate::number::int_from_bytes;
use crate::types::{ClvmError, ClvmValue, Program, Result};

/// size constraints and message suffix for list decoding
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListOptions {
    pub size: Option<usize>,
    pub min_size: Option<usize>,
    pub max_size: Option<usize>,
    /// appended to error messages, e.g. " in solution"
    pub suffix: Option<String>,
}

impl ListOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn size(mut self, size: usize) -> Self {
        self.size = Some(size);
        self
    }

    pub fn min_size(mut self, min_size: usize) -> Self {
        self.min_size = Some(min_size);
        self
    }

    pub fn max_size(mut self, max_size: usize) -> Self {
        self.max_size = Some(max_size);
        self
    }

    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }

    fn suffix_text(&self) -> &str {
        self.suffix.as_deref().unwrap_or("")
    }

    fn check_size(&self, len: usize, list: &Program) -> Result<()> {
        let violation = if self.size.is_some_and(|size| len != size) {
            self.size.map(|size| format!("exactly {size}"))
        } else if self.min_size.is_some_and(|min| len < min) {
            self.min_size.map(|min| format!("at least {min}"))
        } else if self.max_size.is_some_and(|max| len > max) {
            self.max_size.map(|max| format!("at most {max}"))
        } else {
            None
        };
        match violation {
            Some(bound) => Err(ClvmError::Argument {
                message: format!(
                    "expected {bound} elements{} but found {len}",
                    self.suffix_text()
                ),
                position: list.position(),
            }),
            None => Ok(()),
        }
    }
}

impl Program {
    /// walk the chain, applying `extract` to every element
    ///
    /// a non-nil atom terminating the chain is ignored. `expected` names the
    /// element kind in error messages.
    pub fn to_list_with<T, F>(
        &self,
        options: &ListOptions,
        expected: &str,
        mut extract: F,
    ) -> Result<Vec<T>>
    where
        F: FnMut(&Program) -> Option<T>,
    {
        let mut items = Vec::new();
        let mut current = self;
        while let ClvmValue::Cons(item, next) = current.value() {
            match extract(item) {
                Some(value) => items.push(value),
                None => {
                    return Err(ClvmError::Argument {
                        message: format!(
                            "expected {expected} at element {} but found {item}{}",
                            items.len() + 1,
                            options.suffix_text()
                        ),
                        position: item.position().or_else(|| self.position()),
                    })
                }
            }
            current = next;
        }
        options.check_size(items.len(), self)?;
        Ok(items)
    }

    pub fn to_list(&self) -> Result<Vec<Program>> {
        self.to_list_checked(&ListOptions::default())
    }

    pub fn to_list_checked(&self, options: &ListOptions) -> Result<Vec<Program>> {
        self.to_list_with(options, "a value", |item| Some(item.clone()))
    }

    pub fn to_atom_list(&self, options: &ListOptions) -> Result<Vec<Vec<u8>>> {
        self.to_list_with(options, "an atom", |item| item.as_atom().ok().map(<[u8]>::to_vec))
    }

    pub fn to_bool_list(&self, options: &ListOptions) -> Result<Vec<bool>> {
        self.to_list_with(options, "a boolean atom", |item| item.to_bool().ok())
    }

    pub fn to_cons_list(&self, options: &ListOptions) -> Result<Vec<Program>> {
        self.to_list_with(options, "a pair", |item| item.is_cons().then(|| item.clone()))
    }

    pub fn to_int_list(&self, options: &ListOptions) -> Result<Vec<i64>> {
        self.to_list_with(options, "an integer", |item| {
            int_from_bytes(item.as_atom().ok()?).to_i64()
        })
    }

    pub fn to_bigint_list(&self, options: &ListOptions) -> Result<Vec<BigInt>> {
        self.to_list_with(options, "an integer", |item| {
            item.as_atom().ok().map(int_from_bytes)
        })
    }

    /// number of elements in the chain
    pub fn list_len(&self) -> usize {
        let mut len = 0;
        let mut current = self;
        while let ClvmValue::Cons(_, next) = current.value() {
            len += 1;
            current = next;
        }
        len
    }
}
