//! reference operator table
//!
//! [`OperatorTable`] maps operator codes to handlers and plugs into the
//! evaluator through [`OperatorDispatch`]. hosts can start from
//! [`OperatorTable::core`] and register their own operators on top.

use std::collections::BTreeMap;
use std::sync::Arc;

use num_bigint::BigInt;
use num_traits::{One, Signed, Zero};
use once_cell::sync::Lazy;
use sha2::{Digest, Sha256};

use crate::costs::*;
use crate::number::{int_from_bytes, int_to_bytes, is_canonical_int, opcode_of};
use crate::operators::ClvmOperator;
use crate::run_program::{pop_value, Instruction, OperatorDispatch, RunConfig};
use crate::types::{ClvmError, ClvmValue, Program, Result};

/// shared table behind [`Program::run`]
pub static CORE_OPERATORS: Lazy<OperatorTable> = Lazy::new(OperatorTable::core);

/// a primitive operation: evaluated operands in, cost and result out
pub trait Operator {
    fn call(&self, args: &Program, config: &RunConfig) -> Result<(Cost, Program)>;
}

impl<F> Operator for F
where
    F: Fn(&Program, &RunConfig) -> Result<(Cost, Program)>,
{
    fn call(&self, args: &Program, config: &RunConfig) -> Result<(Cost, Program)> {
        self(args, config)
    }
}

#[derive(Clone, Default)]
pub struct OperatorTable {
    operators: BTreeMap<u32, Arc<dyn Operator + Send + Sync>>,
}

impl OperatorTable {
    /// an empty table; every operator is unknown
    pub fn new() -> Self {
        Self::default()
    }

    /// register `operator` under `opcode`, replacing any previous entry
    pub fn insert<O>(&mut self, opcode: u32, operator: O)
    where
        O: Operator + Send + Sync + 'static,
    {
        self.operators.insert(opcode, Arc::new(operator));
    }

    pub fn get(&self, opcode: u32) -> Option<&(dyn Operator + Send + Sync)> {
        self.operators.get(&opcode).map(|op| op.as_ref())
    }

    pub fn contains(&self, opcode: u32) -> bool {
        self.operators.contains_key(&opcode)
    }

    pub fn opcodes(&self) -> impl Iterator<Item = u32> + '_ {
        self.operators.keys().copied()
    }

    /// the standard operators with their classic costs
    pub fn core() -> Self {
        type Handler = fn(&Program, &RunConfig) -> Result<(Cost, Program)>;
        let handlers: [(ClvmOperator, Handler); 20] = [
            (ClvmOperator::If, handle_op_if),
            (ClvmOperator::Cons, handle_op_cons),
            (ClvmOperator::First, handle_op_first),
            (ClvmOperator::Rest, handle_op_rest),
            (ClvmOperator::ListCheck, handle_op_listp),
            (ClvmOperator::Raise, handle_op_raise),
            (ClvmOperator::Equal, handle_op_equal),
            (ClvmOperator::GreaterBytes, handle_op_greater_bytes),
            (ClvmOperator::Sha256, handle_op_sha256),
            (ClvmOperator::Strlen, handle_op_strlen),
            (ClvmOperator::Concat, handle_op_concat),
            (ClvmOperator::Add, handle_op_add),
            (ClvmOperator::Subtract, handle_op_subtract),
            (ClvmOperator::Multiply, handle_op_multiply),
            (ClvmOperator::Divide, handle_op_divide),
            (ClvmOperator::DivMod, handle_op_divmod),
            (ClvmOperator::GreaterThan, handle_op_greater),
            (ClvmOperator::Not, handle_op_not),
            (ClvmOperator::Any, handle_op_any),
            (ClvmOperator::All, handle_op_all),
        ];

        let mut table = Self::new();
        for (operator, handler) in handlers {
            table.insert(operator.opcode(), handler);
        }
        table
    }
}

impl core::fmt::Debug for OperatorTable {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.opcodes()).finish()
    }
}

impl OperatorDispatch for OperatorTable {
    fn dispatch(
        &self,
        _instructions: &mut Vec<Instruction>,
        values: &mut Vec<Program>,
        config: &RunConfig,
    ) -> Result<Cost> {
        let operands = pop_value(values)?;
        let operator = pop_value(values)?;
        let bytes = operator.as_atom()?;
        if config.strict && !is_canonical_int(bytes) {
            return Err(ClvmError::unknown_operator(&operator));
        }

        let handler = opcode_of(bytes)
            .and_then(|opcode| self.get(opcode))
            .ok_or_else(|| ClvmError::unknown_operator(&operator))?;
        let (cost, result) = handler.call(&operands, config)?;
        values.push(result);
        Ok(cost)
    }
}

// === argument helpers ===

fn args_exactly(name: &str, args: &Program, count: usize) -> Result<Vec<Program>> {
    let items = args.to_list()?;
    if items.len() != count {
        let plural = if count == 1 { "" } else { "s" };
        return Err(ClvmError::eval(
            format!("{name} takes exactly {count} argument{plural}"),
            args,
        ));
    }
    Ok(items)
}

fn atom_arg<'a>(name: &str, arg: &'a Program) -> Result<&'a [u8]> {
    match arg.value() {
        ClvmValue::Atom(bytes) => Ok(bytes),
        ClvmValue::Cons(_, _) => Err(ClvmError::eval(format!("{name} on list"), arg)),
    }
}

/// every operand as an integer, paired with its size in bytes
fn int_args(name: &str, args: &Program) -> Result<Vec<(BigInt, usize)>> {
    args.to_list()?
        .iter()
        .map(|arg| match arg.value() {
            ClvmValue::Atom(bytes) => Ok((int_from_bytes(bytes), bytes.len())),
            ClvmValue::Cons(_, _) => Err(ClvmError::eval(
                format!("{name} requires int args"),
                arg,
            )),
        })
        .collect()
}

fn int_args_exactly(name: &str, args: &Program, count: usize) -> Result<Vec<(BigInt, usize)>> {
    args_exactly(name, args, count)?;
    int_args(name, args)
}

fn bytes_cost(len: usize, per_byte: Cost) -> Cost {
    (len as Cost).saturating_mul(per_byte)
}

/// charge for the bytes of a freshly allocated atom
fn malloc_cost(cost: Cost, atom: Vec<u8>) -> (Cost, Program) {
    let cost = cost.saturating_add(bytes_cost(atom.len(), MALLOC_COST_PER_BYTE));
    (cost, Program::atom(atom))
}

fn int_result(cost: Cost, value: &BigInt) -> (Cost, Program) {
    malloc_cost(cost, int_to_bytes(value))
}

fn bool_result(cost: Cost, value: bool) -> (Cost, Program) {
    (cost, Program::from_bool(value))
}

/// quotient and remainder rounded toward negative infinity
fn floor_divmod(numerator: &BigInt, denominator: &BigInt) -> (BigInt, BigInt) {
    let mut quotient = numerator / denominator;
    let mut remainder = numerator % denominator;
    if !remainder.is_zero() && remainder.is_negative() != denominator.is_negative() {
        quotient -= BigInt::one();
        remainder += denominator;
    }
    (quotient, remainder)
}

// === core operators ===

fn handle_op_if(args: &Program, _: &RunConfig) -> Result<(Cost, Program)> {
    let items = args_exactly("i", args, 3)?;
    let chosen = if items[0].is_nil() { &items[2] } else { &items[1] };
    Ok((IF_COST, chosen.clone()))
}

fn handle_op_cons(args: &Program, _: &RunConfig) -> Result<(Cost, Program)> {
    let items = args_exactly("c", args, 2)?;
    Ok((CONS_COST, Program::cons(items[0].clone(), items[1].clone())))
}

fn handle_op_first(args: &Program, _: &RunConfig) -> Result<(Cost, Program)> {
    let items = args_exactly("f", args, 1)?;
    match items[0].value() {
        ClvmValue::Cons(first, _) => Ok((FIRST_COST, first.clone())),
        ClvmValue::Atom(_) => Err(ClvmError::eval("first of non-cons", &items[0])),
    }
}

fn handle_op_rest(args: &Program, _: &RunConfig) -> Result<(Cost, Program)> {
    let items = args_exactly("r", args, 1)?;
    match items[0].value() {
        ClvmValue::Cons(_, rest) => Ok((REST_COST, rest.clone())),
        ClvmValue::Atom(_) => Err(ClvmError::eval("rest of non-cons", &items[0])),
    }
}

fn handle_op_listp(args: &Program, _: &RunConfig) -> Result<(Cost, Program)> {
    let items = args_exactly("l", args, 1)?;
    Ok(bool_result(LISTP_COST, items[0].is_cons()))
}

fn handle_op_raise(args: &Program, _: &RunConfig) -> Result<(Cost, Program)> {
    // a single atom is raised on its own, anything else as the whole list
    match args.value() {
        ClvmValue::Cons(only, rest) if only.is_atom() && rest.is_nil() => {
            Err(ClvmError::raise(only))
        }
        _ => Err(ClvmError::raise(args)),
    }
}

fn handle_op_equal(args: &Program, _: &RunConfig) -> Result<(Cost, Program)> {
    let items = args_exactly("=", args, 2)?;
    let a = atom_arg("=", &items[0])?;
    let b = atom_arg("=", &items[1])?;
    let cost = EQ_BASE_COST + bytes_cost(a.len() + b.len(), EQ_COST_PER_BYTE);
    Ok(bool_result(cost, a == b))
}

fn handle_op_greater_bytes(args: &Program, _: &RunConfig) -> Result<(Cost, Program)> {
    let items = args_exactly(">s", args, 2)?;
    let a = atom_arg(">s", &items[0])?;
    let b = atom_arg(">s", &items[1])?;
    let cost = GRS_BASE_COST + bytes_cost(a.len() + b.len(), GRS_COST_PER_BYTE);
    Ok(bool_result(cost, a > b))
}

fn handle_op_sha256(args: &Program, _: &RunConfig) -> Result<(Cost, Program)> {
    let mut cost = SHA256_BASE_COST;
    let mut hasher = Sha256::new();
    let mut total = 0;
    for arg in args.to_list()? {
        let bytes = atom_arg("sha256", &arg)?;
        total += bytes.len();
        cost += SHA256_COST_PER_ARG;
        hasher.update(bytes);
    }
    cost = cost.saturating_add(bytes_cost(total, SHA256_COST_PER_BYTE));
    Ok(malloc_cost(cost, hasher.finalize().to_vec()))
}

fn handle_op_strlen(args: &Program, _: &RunConfig) -> Result<(Cost, Program)> {
    let items = args_exactly("strlen", args, 1)?;
    let size = atom_arg("strlen", &items[0])?.len();
    let cost = STRLEN_BASE_COST + bytes_cost(size, STRLEN_COST_PER_BYTE);
    Ok(int_result(cost, &BigInt::from(size)))
}

fn handle_op_concat(args: &Program, _: &RunConfig) -> Result<(Cost, Program)> {
    let mut cost = CONCAT_BASE_COST;
    let mut joined = Vec::new();
    for arg in args.to_list()? {
        joined.extend_from_slice(atom_arg("concat", &arg)?);
        cost += CONCAT_COST_PER_ARG;
    }
    cost = cost.saturating_add(bytes_cost(joined.len(), CONCAT_COST_PER_BYTE));
    Ok(malloc_cost(cost, joined))
}

fn handle_op_add(args: &Program, _: &RunConfig) -> Result<(Cost, Program)> {
    let mut total = BigInt::zero();
    let mut cost = ARITH_BASE_COST;
    let mut arg_size = 0;
    for (value, size) in int_args("+", args)? {
        total += value;
        arg_size += size;
        cost += ARITH_COST_PER_ARG;
    }
    cost = cost.saturating_add(bytes_cost(arg_size, ARITH_COST_PER_BYTE));
    Ok(int_result(cost, &total))
}

fn handle_op_subtract(args: &Program, _: &RunConfig) -> Result<(Cost, Program)> {
    let mut total = BigInt::zero();
    let mut cost = ARITH_BASE_COST;
    let mut arg_size = 0;
    for (index, (value, size)) in int_args("-", args)?.into_iter().enumerate() {
        if index == 0 {
            total += value;
        } else {
            total -= value;
        }
        arg_size += size;
        cost += ARITH_COST_PER_ARG;
    }
    cost = cost.saturating_add(bytes_cost(arg_size, ARITH_COST_PER_BYTE));
    Ok(int_result(cost, &total))
}

fn handle_op_multiply(args: &Program, _: &RunConfig) -> Result<(Cost, Program)> {
    let mut cost = MUL_BASE_COST;
    let mut operands = int_args("*", args)?.into_iter();
    let Some((mut product, mut product_size)) = operands.next() else {
        return Ok(int_result(cost, &BigInt::one()));
    };
    for (value, size) in operands {
        cost = cost
            .saturating_add(MUL_COST_PER_OP)
            .saturating_add(bytes_cost(size + product_size, MUL_LINEAR_COST_PER_BYTE))
            .saturating_add(
                (size as Cost).saturating_mul(product_size as Cost)
                    / MUL_SQUARE_COST_PER_BYTE_DIVIDER,
            );
        product *= value;
        product_size = int_to_bytes(&product).len();
    }
    Ok(int_result(cost, &product))
}

fn handle_op_divide(args: &Program, _: &RunConfig) -> Result<(Cost, Program)> {
    let items = int_args_exactly("/", args, 2)?;
    let ((numerator, numerator_size), (denominator, denominator_size)) = (&items[0], &items[1]);
    if denominator.is_zero() {
        return Err(ClvmError::eval("div with 0", args));
    }
    let cost = DIV_BASE_COST + bytes_cost(numerator_size + denominator_size, DIV_COST_PER_BYTE);
    let (quotient, _) = floor_divmod(numerator, denominator);
    Ok(int_result(cost, &quotient))
}

fn handle_op_divmod(args: &Program, _: &RunConfig) -> Result<(Cost, Program)> {
    let items = int_args_exactly("divmod", args, 2)?;
    let ((numerator, numerator_size), (denominator, denominator_size)) = (&items[0], &items[1]);
    if denominator.is_zero() {
        return Err(ClvmError::eval("divmod with 0", args));
    }
    let (quotient, remainder) = floor_divmod(numerator, denominator);
    let quotient = int_to_bytes(&quotient);
    let remainder = int_to_bytes(&remainder);
    let cost = DIVMOD_BASE_COST
        + bytes_cost(numerator_size + denominator_size, DIVMOD_COST_PER_BYTE)
        + bytes_cost(quotient.len() + remainder.len(), MALLOC_COST_PER_BYTE);
    Ok((
        cost,
        Program::cons(Program::atom(quotient), Program::atom(remainder)),
    ))
}

fn handle_op_greater(args: &Program, _: &RunConfig) -> Result<(Cost, Program)> {
    let items = int_args_exactly(">", args, 2)?;
    let ((a, a_size), (b, b_size)) = (&items[0], &items[1]);
    let cost = GR_BASE_COST + bytes_cost(a_size + b_size, GR_COST_PER_BYTE);
    Ok(bool_result(cost, a > b))
}

fn handle_op_not(args: &Program, _: &RunConfig) -> Result<(Cost, Program)> {
    let items = args_exactly("not", args, 1)?;
    Ok(bool_result(BOOL_BASE_COST, items[0].is_nil()))
}

fn bool_args(args: &Program) -> Result<(Cost, Vec<Program>)> {
    let items = args.to_list()?;
    let cost = BOOL_BASE_COST + (items.len() as Cost).saturating_mul(BOOL_COST_PER_ARG);
    Ok((cost, items))
}

fn handle_op_any(args: &Program, _: &RunConfig) -> Result<(Cost, Program)> {
    let (cost, items) = bool_args(args)?;
    Ok(bool_result(cost, items.iter().any(|item| !item.is_nil())))
}

fn handle_op_all(args: &Program, _: &RunConfig) -> Result<(Cost, Program)> {
    let (cost, items) = bool_args(args)?;
    Ok(bool_result(cost, items.iter().all(|item| !item.is_nil())))
}
