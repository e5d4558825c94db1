//! command line front end for puzzle programs
//!
//! the heavy lifting lives in `clvm_puzzle_core`; this crate adds file
//! loading, argument decoding and the `clvm-puzzle` binary.

use std::fs;
use std::path::Path;

use log::debug;

pub mod cli;

pub use clvm_puzzle_core::{ClvmError, Program, RunConfig};

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("CLVM error: {0}")]
    Clvm(#[from] ClvmError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid input: {0}")]
    Input(String),
}

/// read a program from a file holding exactly one non-empty line of hex
pub fn load_hex_file(path: impl AsRef<Path>) -> Result<Program, CliError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    let mut lines = contents.lines().map(str::trim).filter(|line| !line.is_empty());

    let line = match (lines.next(), lines.next()) {
        (Some(line), None) => line,
        (None, _) => {
            return Err(CliError::Input(format!(
                "{} contains no hex data",
                path.display()
            )))
        }
        (Some(_), Some(_)) => {
            return Err(CliError::Input(format!(
                "{} must contain exactly one line of hex",
                path.display()
            )))
        }
    };
    debug!("loaded {} hex digits from {}", line.len(), path.display());
    Ok(Program::deserialize_hex(line)?)
}

/// decode a program argument: `@path` names a hex file, otherwise the text
/// is hex with `hex` set and the s-expression form without it
pub fn read_program_arg(arg: &str, hex: bool) -> Result<Program, CliError> {
    if let Some(path) = arg.strip_prefix('@') {
        return load_hex_file(path);
    }
    if hex {
        Ok(Program::deserialize_hex(arg.trim())?)
    } else {
        Ok(Program::parse(arg)?)
    }
}
