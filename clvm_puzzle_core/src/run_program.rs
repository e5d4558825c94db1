//! cost-metered evaluator
//!
//! programs run on an explicit instruction stack and value stack instead of
//! native recursion, so arbitrarily deep trees cannot overflow the call stack
//! and the cost budget is checked between every pair of steps.

use log::{debug, trace};
use serde::{Deserialize, Serialize};

pub use crate::costs::Cost;
use crate::costs::{
    APPLY_COST, EVAL_STEP_COST, PATH_LOOKUP_BASE_COST, PATH_LOOKUP_COST_PER_LEG,
    PATH_LOOKUP_COST_PER_ZERO_BYTE, QUOTE_COST,
};
use crate::dialect::CORE_OPERATORS;
use crate::number::{is_canonical_int, opcode_of};
use crate::operators::ClvmOperator;
use crate::types::{ClvmError, ClvmValue, Position, Program, Result};

/// one pending step of the evaluator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    /// pop `(program . args)`, push its value or schedule more work
    Eval,
    /// pop operands and operator, push the result of applying them
    Apply,
    /// pop `first` then `rest`, push `(first . rest)`
    Cons,
    /// exchange the two topmost values
    Swap,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// abort once the running cost passes this value
    pub max_cost: Option<Cost>,
    /// handed to the operator dispatch, see [`OperatorDispatch`]
    pub strict: bool,
}

impl RunConfig {
    pub fn with_max_cost(max_cost: Cost) -> Self {
        Self {
            max_cost: Some(max_cost),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    pub program: Program,
    pub cost: Cost,
}

/// resolves operator atoms other than `q` and `a`
///
/// on entry the top of `values` is the evaluated operand list and below it the
/// operator atom. an implementation pops both, pushes exactly one result (or
/// schedules instructions that will) and returns the cost of the step.
/// operators it does not know must fail with [`ClvmError::UnknownOperator`].
pub trait OperatorDispatch {
    fn dispatch(
        &self,
        instructions: &mut Vec<Instruction>,
        values: &mut Vec<Program>,
        config: &RunConfig,
    ) -> Result<Cost>;
}

pub(crate) fn pop_value(values: &mut Vec<Program>) -> Result<Program> {
    values
        .pop()
        .ok_or_else(|| ClvmError::eval("value stack underflow", &Program::nil()))
}

/// look up `path` in `env`
///
/// the path is read from its least significant bit: 0 takes `first`, 1 takes
/// `rest`, and the highest set bit only marks the end. nil selects nil.
pub fn traverse_path(path: &[u8], env: &Program) -> Result<(Cost, Program)> {
    let mut cost = PATH_LOOKUP_BASE_COST + PATH_LOOKUP_COST_PER_LEG;
    if path.is_empty() {
        return Ok((cost, Program::nil()));
    }

    let end = path.iter().take_while(|byte| **byte == 0).count();
    cost += end as Cost * PATH_LOOKUP_COST_PER_ZERO_BYTE;
    if end == path.len() {
        return Ok((cost, Program::nil()));
    }

    let end_bitmask: u32 = 1 << (7 - path[end].leading_zeros());
    let mut cursor = path.len() - 1;
    let mut bitmask: u32 = 0x01;
    let mut env = env;
    while cursor > end || bitmask < end_bitmask {
        let (first, rest) = match env.value() {
            ClvmValue::Cons(first, rest) => (first, rest),
            ClvmValue::Atom(_) => return Err(ClvmError::type_error("path into atom", env)),
        };
        env = if u32::from(path[cursor]) & bitmask != 0 {
            rest
        } else {
            first
        };
        cost += PATH_LOOKUP_COST_PER_LEG;
        bitmask <<= 1;
        if bitmask == 0x100 {
            cursor -= 1;
            bitmask = 0x01;
        }
    }
    Ok((cost, env.clone()))
}

struct Machine<'a, D: ?Sized> {
    dispatch: &'a D,
    config: &'a RunConfig,
    instructions: Vec<Instruction>,
    values: Vec<Program>,
    /// last expression evaluated and the most recent source position seen,
    /// both for budget errors
    current: Program,
    position: Option<Position>,
}

impl<'a, D: OperatorDispatch + ?Sized> Machine<'a, D> {
    fn new(program: &Program, args: &Program, dispatch: &'a D, config: &'a RunConfig) -> Self {
        Self {
            dispatch,
            config,
            instructions: vec![Instruction::Eval],
            values: vec![Program::cons(program.clone(), args.clone())],
            current: program.clone(),
            position: program.position(),
        }
    }

    /// code of `q` or `a` when the head atom names one of them
    fn builtin(&self, bytes: &[u8]) -> Option<ClvmOperator> {
        if self.config.strict && !is_canonical_int(bytes) {
            return None;
        }
        match opcode_of(bytes)? {
            1 => Some(ClvmOperator::Quote),
            2 => Some(ClvmOperator::Apply),
            _ => None,
        }
    }

    fn step(&mut self, instruction: Instruction) -> Result<Cost> {
        match instruction {
            Instruction::Eval => self.eval(),
            Instruction::Apply => self.apply(),
            Instruction::Cons => {
                let first = pop_value(&mut self.values)?;
                let rest = pop_value(&mut self.values)?;
                self.values.push(Program::cons(first, rest));
                Ok(0)
            }
            Instruction::Swap => {
                let top = pop_value(&mut self.values)?;
                let below = pop_value(&mut self.values)?;
                self.values.push(top);
                self.values.push(below);
                Ok(0)
            }
        }
    }

    fn eval(&mut self) -> Result<Cost> {
        let pair = pop_value(&mut self.values)?;
        let (program, args) = pair.as_pair()?;
        self.current = program.clone();
        if let Some(position) = program.position() {
            self.position = Some(position);
        }

        let (operator, operands) = match program.value() {
            ClvmValue::Atom(path) => {
                let (cost, value) = traverse_path(path, args)?;
                self.values.push(value);
                return Ok(cost);
            }
            ClvmValue::Cons(operator, operands) => (operator, operands),
        };

        // ((X) . operands): apply the lone atom X to the operands as written
        if let ClvmValue::Cons(inner, terminator) = operator.value() {
            if inner.is_cons() || !terminator.is_nil() {
                return Err(ClvmError::eval(
                    "in ((X)...) syntax X must be lone atom",
                    program,
                ));
            }
            self.values.push(inner.clone());
            self.values.push(operands.clone());
            self.instructions.push(Instruction::Apply);
            return Ok(APPLY_COST);
        }

        if let ClvmValue::Atom(bytes) = operator.value() {
            if self.builtin(bytes) == Some(ClvmOperator::Quote) {
                self.values.push(operands.clone());
                return Ok(QUOTE_COST);
            }
        }

        self.instructions.push(Instruction::Apply);
        self.values.push(operator.clone());
        let mut current = operands;
        while let ClvmValue::Cons(operand, next) = current.value() {
            self.values.push(Program::cons(operand.clone(), args.clone()));
            self.instructions.push(Instruction::Cons);
            self.instructions.push(Instruction::Eval);
            self.instructions.push(Instruction::Swap);
            current = next;
        }
        if !current.is_nil() {
            return Err(ClvmError::eval("operand list must end in nil", program));
        }
        self.values.push(Program::nil());
        Ok(EVAL_STEP_COST)
    }

    fn apply(&mut self) -> Result<Cost> {
        let operands = pop_value(&mut self.values)?;
        let operator = pop_value(&mut self.values)?;
        let bytes = match operator.value() {
            ClvmValue::Atom(bytes) => bytes,
            ClvmValue::Cons(_, _) => return Err(ClvmError::eval("operator is a pair", &operator)),
        };

        if self.builtin(bytes) == Some(ClvmOperator::Apply) {
            let (program, env) = match operands.as_pair() {
                Ok((program, rest)) if operands.list_len() == 2 => (program, rest.first()?),
                _ => {
                    return Err(ClvmError::eval(
                        "apply requires exactly 2 parameters",
                        &operands,
                    ))
                }
            };
            self.values.push(Program::cons(program.clone(), env.clone()));
            self.instructions.push(Instruction::Eval);
            return Ok(APPLY_COST);
        }

        self.values.push(operator);
        self.values.push(operands);
        self.dispatch
            .dispatch(&mut self.instructions, &mut self.values, self.config)
    }

    fn budget_error(&self, cost: Cost, max_cost: Cost) -> ClvmError {
        ClvmError::CostExceeded {
            cost,
            max_cost,
            value: self.current.to_string(),
            position: self.position,
        }
    }

    fn run(mut self) -> Result<Output> {
        let max_cost = self.config.max_cost;
        let mut cost: Cost = 0;

        while let Some(instruction) = self.instructions.pop() {
            trace!(
                "{instruction:?} cost={cost} values={} pending={}",
                self.values.len(),
                self.instructions.len()
            );
            let step = self.step(instruction)?;
            cost = cost
                .checked_add(step)
                .ok_or_else(|| self.budget_error(Cost::MAX, max_cost.unwrap_or(Cost::MAX)))?;
            if let Some(max_cost) = max_cost {
                if cost > max_cost {
                    debug!("cost {cost} passed budget {max_cost}");
                    return Err(self.budget_error(cost, max_cost));
                }
            }
        }

        let program = pop_value(&mut self.values)?;
        if !self.values.is_empty() {
            return Err(ClvmError::eval(
                "evaluation left extra values on the stack",
                &program,
            ));
        }
        Ok(Output { program, cost })
    }
}

/// evaluate `program` against `args`, resolving operators through `dispatch`
pub fn run_program<D>(
    program: &Program,
    args: &Program,
    dispatch: &D,
    config: &RunConfig,
) -> Result<Output>
where
    D: OperatorDispatch + ?Sized,
{
    debug!(
        "running program {} max_cost={:?} strict={}",
        program.tree_hash_hex(),
        config.max_cost,
        config.strict
    );
    let output = Machine::new(program, args, dispatch, config).run()?;
    debug!("program finished with cost {}", output.cost);
    Ok(output)
}

impl Program {
    /// run with the reference operator table
    pub fn run(&self, args: &Program, config: &RunConfig) -> Result<Output> {
        run_program(self, args, &*CORE_OPERATORS, config)
    }
}
