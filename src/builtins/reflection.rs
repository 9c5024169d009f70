//! Interpreter reflection: `read-string slurp eval apply`

use super::def;
use crate::env::Environment;
use crate::error::{EvalError, Signal};
use crate::eval;
use crate::reader::read_str;
use crate::value::Value;
use std::rc::Rc;

fn as_str<'a>(procedure: &str, v: &'a Value) -> Result<&'a str, Signal> {
    match v {
        Value::Str(s) => Ok(s),
        _ => Err(EvalError::type_error(procedure, "string", v).into()),
    }
}

/// `(read-string s)` — parses one top-level form; `nil` for blank input.
fn read_string(args: &[Value], _env: &Rc<Environment>) -> Result<Value, Signal> {
    let s = as_str("read-string", &args[0])?;
    Ok(read_str(s)?.unwrap_or(Value::Nil))
}

/// `(slurp path)` — reads a whole file into a string.
fn slurp(args: &[Value], _env: &Rc<Environment>) -> Result<Value, Signal> {
    let path = as_str("slurp", &args[0])?;
    let contents =
        std::fs::read_to_string(path).map_err(|e| EvalError::runtime("slurp", format!("{path}: {e}")))?;
    Ok(Value::Str(contents.into()))
}

/// `(eval datum)` — evaluates `datum` in the root environment, not the
/// caller's, per the reflection contract.
fn eval_fn(args: &[Value], env: &Rc<Environment>) -> Result<Value, Signal> {
    eval::eval(args[0].clone(), env.root())
}

/// `(apply proc args... arg-list)` — the trailing argument must be a list
/// and is spread as the tail of the call.
fn apply(args: &[Value], env: &Rc<Environment>) -> Result<Value, Signal> {
    let proc = args[0]
        .as_procedure()
        .ok_or_else(|| EvalError::type_error("apply", "procedure", &args[0]))?;
    let (leading, tail) = args[1..].split_at(args.len() - 2);
    let tail_list = tail[0]
        .as_list()
        .ok_or_else(|| EvalError::type_error("apply", "list", &tail[0]))?;
    let mut call_args = leading.to_vec();
    call_args.extend(tail_list.to_vec());
    eval::apply(proc, call_args, env)
}

pub fn install(env: &Rc<Environment>) {
    def(env, "read-string", 1, false, read_string);
    def(env, "slurp", 1, false, slurp);
    def(env, "eval", 1, false, eval_fn);
    def(env, "apply", 2, true, apply);
}
