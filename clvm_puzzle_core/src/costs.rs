//! cost schedule for the evaluator and the reference operators
//!
//! every evaluation step returns a cost in these units and the run fails as
//! soon as the running total passes the caller's budget.

pub type Cost = u64;

// evaluator
pub const QUOTE_COST: Cost = 20;
pub const APPLY_COST: Cost = 90;
/// scheduling the operands of an operator call
pub const EVAL_STEP_COST: Cost = 1;
pub const PATH_LOOKUP_BASE_COST: Cost = 40;
pub const PATH_LOOKUP_COST_PER_LEG: Cost = 4;
pub const PATH_LOOKUP_COST_PER_ZERO_BYTE: Cost = 4;

// charged per byte of every atom an operator allocates
pub const MALLOC_COST_PER_BYTE: Cost = 10;

pub const IF_COST: Cost = 33;
pub const CONS_COST: Cost = 50;
pub const FIRST_COST: Cost = 30;
pub const REST_COST: Cost = 30;
pub const LISTP_COST: Cost = 19;

pub const EQ_BASE_COST: Cost = 117;
pub const EQ_COST_PER_BYTE: Cost = 1;
pub const GRS_BASE_COST: Cost = 117;
pub const GRS_COST_PER_BYTE: Cost = 1;
pub const GR_BASE_COST: Cost = 498;
pub const GR_COST_PER_BYTE: Cost = 2;

pub const SHA256_BASE_COST: Cost = 87;
pub const SHA256_COST_PER_ARG: Cost = 134;
pub const SHA256_COST_PER_BYTE: Cost = 2;

pub const STRLEN_BASE_COST: Cost = 173;
pub const STRLEN_COST_PER_BYTE: Cost = 1;

pub const CONCAT_BASE_COST: Cost = 142;
pub const CONCAT_COST_PER_ARG: Cost = 135;
pub const CONCAT_COST_PER_BYTE: Cost = 3;

// + and -
pub const ARITH_BASE_COST: Cost = 99;
pub const ARITH_COST_PER_BYTE: Cost = 3;
pub const ARITH_COST_PER_ARG: Cost = 320;

pub const MUL_BASE_COST: Cost = 92;
pub const MUL_COST_PER_OP: Cost = 885;
pub const MUL_LINEAR_COST_PER_BYTE: Cost = 6;
pub const MUL_SQUARE_COST_PER_BYTE_DIVIDER: Cost = 128;

pub const DIV_BASE_COST: Cost = 988;
pub const DIV_COST_PER_BYTE: Cost = 4;
pub const DIVMOD_BASE_COST: Cost = 1116;
pub const DIVMOD_COST_PER_BYTE: Cost = 6;

// not, any, all
pub const BOOL_BASE_COST: Cost = 200;
pub const BOOL_COST_PER_ARG: Cost = 300;
