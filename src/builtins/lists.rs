//! List operations: `list list-ref list-rest nth rest cons concat empty?`
//!
//! `list-ref` takes `(list index)`, Scheme-style; `nth` takes `(index list)`,
//! Common-Lisp-style — both are provided since this is a Lisp-family core,
//! not a single dialect.

use super::def;
use crate::env::Environment;
use crate::error::{EvalError, Signal};
use crate::list::List;
use crate::value::Value;
use std::rc::Rc;

fn as_list<'a>(procedure: &str, v: &'a Value) -> Result<&'a List, Signal> {
    v.as_list().ok_or_else(|| EvalError::type_error(procedure, "list", v).into())
}

fn as_index(procedure: &str, v: &Value) -> Result<usize, Signal> {
    match v {
        Value::Number(n) if *n >= 0 => Ok(*n as usize),
        Value::Number(_) => Err(EvalError::runtime(procedure, "index must be non-negative").into()),
        _ => Err(EvalError::type_error(procedure, "number", v).into()),
    }
}

/// `(list ...)` — always builds a list, even from zero arguments.
fn list(args: &[Value], _env: &Rc<Environment>) -> Result<Value, Signal> {
    Ok(Value::List(List::from_vec(args.to_vec())))
}

/// `(list-ref list index)`.
fn list_ref(args: &[Value], _env: &Rc<Environment>) -> Result<Value, Signal> {
    let list = as_list("list-ref", &args[0])?;
    let index = as_index("list-ref", &args[1])?;
    list.get(index)
        .cloned()
        .ok_or_else(|| EvalError::index_out_of_range(index, list.len()).into())
}

/// `(nth index list)`.
fn nth(args: &[Value], _env: &Rc<Environment>) -> Result<Value, Signal> {
    let index = as_index("nth", &args[0])?;
    let list = as_list("nth", &args[1])?;
    list.get(index)
        .cloned()
        .ok_or_else(|| EvalError::index_out_of_range(index, list.len()).into())
}

/// `(list-rest a b ... tail)` — conses the leading arguments onto `tail`,
/// which must itself be a list.
fn list_rest(args: &[Value], _env: &Rc<Environment>) -> Result<Value, Signal> {
    let (leading, tail) = args.split_at(args.len() - 1);
    let tail_list = as_list("list-rest", &tail[0])?;
    let mut items = leading.to_vec();
    items.extend(tail_list.to_vec());
    Ok(Value::List(List::from_vec(items)))
}

/// `(rest list)` — everything after the first element.
fn rest(args: &[Value], _env: &Rc<Environment>) -> Result<Value, Signal> {
    let list = as_list("rest", &args[0])?;
    Ok(Value::List(list.tail().cloned().unwrap_or_else(List::empty)))
}

/// `(cons x list)`.
fn cons(args: &[Value], _env: &Rc<Environment>) -> Result<Value, Signal> {
    let list = as_list("cons", &args[1])?;
    Ok(Value::List(List::cons(args[0].clone(), list.clone())))
}

/// `(concat list ...)`.
fn concat(args: &[Value], _env: &Rc<Environment>) -> Result<Value, Signal> {
    let mut result = List::empty();
    for (i, arg) in args.iter().enumerate().rev() {
        let list = as_list("concat", arg)?;
        result = if i == args.len() - 1 { list.clone() } else { list.append(&result) };
    }
    Ok(Value::List(result))
}

/// `(empty? list)`.
fn empty_p(args: &[Value], _env: &Rc<Environment>) -> Result<Value, Signal> {
    Ok(Value::Bool(as_list("empty?", &args[0])?.is_empty()))
}

pub fn install(env: &Rc<Environment>) {
    def(env, "list", 0, true, list);
    def(env, "list-ref", 2, false, list_ref);
    def(env, "nth", 2, false, nth);
    def(env, "list-rest", 1, true, list_rest);
    def(env, "rest", 1, false, rest);
    def(env, "cons", 2, false, cons);
    def(env, "concat", 0, true, concat);
    def(env, "empty?", 1, false, empty_p);
}
