//! Introspection: `arity builtin? type`

use super::def;
use crate::env::Environment;
use crate::error::{EvalError, Signal};
use crate::symbol::intern;
use crate::value::Value;
use std::rc::Rc;

/// `(arity proc)` — the procedure's required-argument count.
fn arity(args: &[Value], _env: &Rc<Environment>) -> Result<Value, Signal> {
    let proc = args[0]
        .as_procedure()
        .ok_or_else(|| EvalError::type_error("arity", "procedure", &args[0]))?;
    Ok(Value::Number(proc.required_arity() as i64))
}

/// `(builtin? proc)`.
fn builtin_p(args: &[Value], _env: &Rc<Environment>) -> Result<Value, Signal> {
    use crate::value::ProcKind;
    let is_builtin = matches!(&args[0], Value::Procedure(p) if matches!(p.kind, ProcKind::Builtin(_)));
    Ok(Value::Bool(is_builtin))
}

/// `(type x)` — the datum's type name as a symbol.
fn type_of(args: &[Value], _env: &Rc<Environment>) -> Result<Value, Signal> {
    Ok(Value::Symbol(intern(args[0].type_name())))
}

pub fn install(env: &Rc<Environment>) {
    def(env, "arity", 1, false, arity);
    def(env, "builtin?", 1, false, builtin_p);
    def(env, "type", 1, false, type_of);
}
