//! Built-in procedure library — the minimal collaborator the evaluator
//! depends on. Every function here is a thin host-side `BuiltinFn`; the
//! language-level behavior lives in [`crate::eval`] and the prelude.
//!
//! Categories: arithmetic, type predicates, list operations, printing,
//! introspection, atoms, interpreter reflection, exceptions.

use crate::env::Environment;
use crate::symbol::intern;
use crate::value::{BuiltinFn, ProcKind, Procedure, Value};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

mod arithmetic;
mod atoms;
mod exceptions;
mod introspection;
mod io;
mod lists;
mod reflection;
mod types;

/// Builds a built-in [`Procedure`] value pre-named (builtins are never
/// anonymous, so there is no need to rely on `Environment::put`'s
/// set-name-on-first-bind side effect). `required` placeholder params exist
/// only so `required_arity`/`rest_param` — written for the general
/// `Procedure` contract — work the same for builtins as for user lambdas.
fn make_builtin(name: &str, required: usize, variadic: bool, f: BuiltinFn) -> Value {
    let mut params = Vec::with_capacity(required + variadic as usize);
    for _ in 0..required {
        params.push(intern("_"));
    }
    if variadic {
        params.push(intern("_rest"));
    }
    Value::Procedure(Rc::new(Procedure {
        name: RefCell::new(Some(intern(name))),
        params,
        variadic,
        is_macro: Cell::new(false),
        kind: ProcKind::Builtin(f),
    }))
}

fn def(env: &Rc<Environment>, name: &str, required: usize, variadic: bool, f: BuiltinFn) {
    env.put(intern(name), make_builtin(name, required, variadic, f));
}

/// Installs every built-in procedure into `env`, which should be the root
/// environment (builtins are visible everywhere through the lexical chain).
pub fn install(env: &Rc<Environment>) {
    arithmetic::install(env);
    types::install(env);
    lists::install(env);
    io::install(env);
    introspection::install(env);
    atoms::install(env);
    reflection::install(env);
    exceptions::install(env);
}
