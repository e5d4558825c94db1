//! puzzle program core: the tree type shared by code and data, its binary and
//! text forms, the tree hash, list and curry helpers, and the cost-metered
//! evaluator.

pub mod costs;
pub mod curry;
pub mod dialect;
pub mod hash;
pub mod list;
pub mod number;
pub mod operators;
pub mod parser;
pub mod run_program;
pub mod serialize;
pub mod text;
pub mod types;

pub use curry::{curry, uncurry};
pub use dialect::{Operator, OperatorTable, CORE_OPERATORS};
pub use hash::{tree_hash, TreeHash};
pub use list::ListOptions;
pub use operators::*;
pub use parser::*;
pub use run_program::{run_program, Cost, Instruction, OperatorDispatch, Output, RunConfig};
pub use serialize::{deserialize, deserialize_hex, serialize, serialize_hex};
pub use text::{read_program, PrintOptions};
pub use types::*;
