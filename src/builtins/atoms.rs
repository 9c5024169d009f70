//! Mutable cells: `atom deref atom-set! swap!`

use super::def;
use crate::env::Environment;
use crate::error::{EvalError, Signal};
use crate::eval;
use crate::value::Value;
use std::rc::Rc;

fn as_atom<'a>(procedure: &str, v: &'a Value) -> Result<&'a std::cell::RefCell<Value>, Signal> {
    match v {
        Value::Atom(cell) => Ok(cell),
        _ => Err(EvalError::type_error(procedure, "atom", v).into()),
    }
}

/// `(atom x)` — wraps `x` in a fresh mutable cell.
fn atom(args: &[Value], _env: &Rc<Environment>) -> Result<Value, Signal> {
    Ok(Value::atom(args[0].clone()))
}

/// `(deref a)` — the cell's current value.
fn deref(args: &[Value], _env: &Rc<Environment>) -> Result<Value, Signal> {
    Ok(as_atom("deref", &args[0])?.borrow().clone())
}

/// `(atom-set! a x)` — replaces the cell's contents with `x`, returning it.
fn atom_set(args: &[Value], _env: &Rc<Environment>) -> Result<Value, Signal> {
    let cell = as_atom("atom-set!", &args[0])?;
    *cell.borrow_mut() = args[1].clone();
    Ok(args[1].clone())
}

/// `(swap! a f args...)` — replaces the cell's contents with
/// `(f current-value args...)`, returning the new value.
fn swap(args: &[Value], env: &Rc<Environment>) -> Result<Value, Signal> {
    let cell = as_atom("swap!", &args[0])?;
    let proc = args[1]
        .as_procedure()
        .ok_or_else(|| EvalError::type_error("swap!", "procedure", &args[1]))?;
    let mut call_args = vec![cell.borrow().clone()];
    call_args.extend(args[2..].iter().cloned());
    let new_value = eval::apply(proc, call_args, env)?;
    *cell.borrow_mut() = new_value.clone();
    Ok(new_value)
}

pub fn install(env: &Rc<Environment>) {
    def(env, "atom", 1, false, atom);
    def(env, "deref", 1, false, deref);
    def(env, "atom-set!", 2, false, atom_set);
    def(env, "swap!", 2, true, swap);
}
