//! binding leading arguments into a program
//!
//! a curried program has the shape
//! `(a (q . CODE) (c (q . ARG1) (c (q . ARG2) ... 1)))`: running it with an
//! environment `E` runs `CODE` with `(ARG1 ARG2 ... . E)`.

use crate::operators::ClvmOperator;
use crate::types::{ClvmValue, Program};

fn op(operator: ClvmOperator) -> Program {
    Program::from_int(i64::from(operator.opcode()))
}

fn quoted(value: &Program) -> Program {
    Program::cons(op(ClvmOperator::Quote), value.clone())
}

/// wrap `code` so the given arguments are prepended to its environment
pub fn curry(code: &Program, args: &[Program]) -> Program {
    let env = args.iter().rev().fold(Program::from_int(1), |env, arg| {
        Program::list([op(ClvmOperator::Cons), quoted(arg), env])
    });
    Program::list([op(ClvmOperator::Apply), quoted(code), env])
}

fn is_opcode(program: &Program, operator: ClvmOperator) -> bool {
    *program == op(operator)
}

/// `(q . X)` -> X
fn unquote(program: &Program) -> Option<&Program> {
    match program.value() {
        ClvmValue::Cons(head, body) if is_opcode(head, ClvmOperator::Quote) => Some(body),
        _ => None,
    }
}

fn list3(program: &Program) -> Option<(&Program, &Program, &Program)> {
    let (a, rest) = program.as_pair().ok()?;
    let (b, rest) = rest.as_pair().ok()?;
    let (c, rest) = rest.as_pair().ok()?;
    rest.is_nil().then_some((a, b, c))
}

/// split a program built by [`curry`] back into code and arguments
pub fn uncurry(program: &Program) -> Option<(Program, Vec<Program>)> {
    let (apply, code, mut env) = list3(program)?;
    if !is_opcode(apply, ClvmOperator::Apply) {
        return None;
    }
    let code = unquote(code)?.clone();

    let mut args = Vec::new();
    while let Some((cons, arg, next)) = list3(env) {
        if !is_opcode(cons, ClvmOperator::Cons) {
            return None;
        }
        args.push(unquote(arg)?.clone());
        env = next;
    }
    (*env == Program::from_int(1)).then_some((code, args))
}

impl Program {
    pub fn curry(&self, args: &[Program]) -> Program {
        curry(self, args)
    }

    pub fn uncurry(&self) -> Option<(Program, Vec<Program>)> {
        uncurry(self)
    }
}
