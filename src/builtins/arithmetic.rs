//! Arithmetic operations and numeric predicates: `+ - * / % = > even? number?`
//!
//! `+`, `*`, `=`, and `>` are variadic; `-` and `/` take at least one
//! argument with a unary negate/reciprocal special case, matching standard
//! Lisp convention.

use super::def;
use crate::env::Environment;
use crate::error::{EvalError, Signal};
use crate::value::Value;
use std::rc::Rc;

fn as_number(procedure: &str, v: &Value) -> Result<i64, Signal> {
    match v {
        Value::Number(n) => Ok(*n),
        _ => Err(EvalError::type_error(procedure, "number", v).into()),
    }
}

/// `(+ ...)` — sum of all arguments; `(+) => 0`.
fn add(args: &[Value], _env: &Rc<Environment>) -> Result<Value, Signal> {
    let mut sum: i64 = 0;
    for arg in args {
        sum += as_number("+", arg)?;
    }
    Ok(Value::Number(sum))
}

/// `(- a ...)` — subtracts the rest from the first; `(- 5) => -5`.
fn sub(args: &[Value], _env: &Rc<Environment>) -> Result<Value, Signal> {
    let first = as_number("-", &args[0])?;
    if args.len() == 1 {
        return Ok(Value::Number(-first));
    }
    let mut result = first;
    for arg in &args[1..] {
        result -= as_number("-", arg)?;
    }
    Ok(Value::Number(result))
}

/// `(* ...)` — product of all arguments; `(*) => 1`.
fn mul(args: &[Value], _env: &Rc<Environment>) -> Result<Value, Signal> {
    let mut product: i64 = 1;
    for arg in args {
        product *= as_number("*", arg)?;
    }
    Ok(Value::Number(product))
}

/// `(/ a ...)` — divides the first by the rest; `(/ a) => 1 / a`.
fn div(args: &[Value], _env: &Rc<Environment>) -> Result<Value, Signal> {
    let first = as_number("/", &args[0])?;
    if args.len() == 1 {
        if first == 0 {
            return Err(EvalError::runtime("/", "division by zero").into());
        }
        return Ok(Value::Number(1 / first));
    }
    let mut result = first;
    for arg in &args[1..] {
        let n = as_number("/", arg)?;
        if n == 0 {
            return Err(EvalError::runtime("/", "division by zero").into());
        }
        result /= n;
    }
    Ok(Value::Number(result))
}

/// `(% a b)` — remainder of `a / b`.
fn rem(args: &[Value], _env: &Rc<Environment>) -> Result<Value, Signal> {
    let a = as_number("%", &args[0])?;
    let b = as_number("%", &args[1])?;
    if b == 0 {
        return Err(EvalError::runtime("%", "division by zero").into());
    }
    Ok(Value::Number(a % b))
}

/// `(= a ...)` — structural equality, checked pairwise across all arguments.
fn eq(args: &[Value], _env: &Rc<Environment>) -> Result<Value, Signal> {
    Ok(Value::Bool(args.windows(2).all(|w| w[0] == w[1])))
}

/// `(> a ...)` — true iff the arguments are strictly decreasing.
fn gt(args: &[Value], _env: &Rc<Environment>) -> Result<Value, Signal> {
    let nums: Vec<i64> = args.iter().map(|v| as_number(">", v)).collect::<Result<_, _>>()?;
    Ok(Value::Bool(nums.windows(2).all(|w| w[0] > w[1])))
}

/// `(even? n)`.
fn even(args: &[Value], _env: &Rc<Environment>) -> Result<Value, Signal> {
    Ok(Value::Bool(as_number("even?", &args[0])? % 2 == 0))
}

/// `(number? x)`.
fn number_p(args: &[Value], _env: &Rc<Environment>) -> Result<Value, Signal> {
    Ok(Value::Bool(matches!(args[0], Value::Number(_))))
}

pub fn install(env: &Rc<Environment>) {
    def(env, "+", 0, true, add);
    def(env, "-", 1, true, sub);
    def(env, "*", 0, true, mul);
    def(env, "/", 1, true, div);
    def(env, "%", 2, false, rem);
    def(env, "=", 0, true, eq);
    def(env, ">", 0, true, gt);
    def(env, "even?", 1, false, even);
    def(env, "number?", 1, false, number_p);
}
