// ABOUTME: The Datum value model — the sum type every reader/evaluator/printer operation moves around

use crate::env::Environment;
use crate::error::Signal;
use crate::list::List;
use crate::symbol::Symbol;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// A built-in procedure's host implementation. Receives the already-evaluated
/// argument vector and the environment the call is happening in — `eval` and
/// `apply` both need the latter, per the built-in contract in the spec.
pub type BuiltinFn = fn(&[Value], &Rc<Environment>) -> Result<Value, Signal>;

#[derive(Debug, Clone)]
pub enum Value {
    Number(i64),
    Symbol(Symbol),
    Str(Rc<str>),
    Nil,
    Bool(bool),
    List(List),
    Procedure(Rc<Procedure>),
    Atom(Rc<RefCell<Value>>),
    Exception(Rc<Value>),
}

#[derive(Debug)]
pub enum ProcKind {
    User { body: List, env: Rc<Environment> },
    Builtin(BuiltinFn),
}

/// A callable value: a user lambda or a host built-in, optionally flagged as
/// a macro. Procedures are immutable after construction except for `name`,
/// which is filled in the first time an unnamed procedure is bound (by
/// `def!`/`defmacro!`/`put`) — see the environment contract.
#[derive(Debug)]
pub struct Procedure {
    pub name: RefCell<Option<Symbol>>,
    pub params: Vec<Symbol>,
    pub variadic: bool,
    pub is_macro: Cell<bool>,
    pub kind: ProcKind,
}

impl Procedure {
    /// Number of required (non-rest) parameters.
    pub fn required_arity(&self) -> usize {
        if self.variadic {
            self.params.len() - 1
        } else {
            self.params.len()
        }
    }

    pub fn rest_param(&self) -> Option<Symbol> {
        if self.variadic {
            self.params.last().copied()
        } else {
            None
        }
    }
}

impl Value {
    pub fn atom(value: Value) -> Value {
        Value::Atom(Rc::new(RefCell::new(value)))
    }

    pub fn exception(payload: Value) -> Value {
        Value::Exception(Rc::new(payload))
    }

    /// Every value except `nil` and `#f` is truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Bool(false))
    }

    pub fn as_list(&self) -> Option<&List> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_procedure(&self) -> Option<&Rc<Procedure>> {
        match self {
            Value::Procedure(p) => Some(p),
            _ => None,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Symbol(_) => "symbol",
            Value::Str(_) => "string",
            Value::Nil => "nil",
            Value::Bool(_) => "bool",
            Value::List(_) => "list",
            Value::Procedure(p) => {
                if p.is_macro.get() {
                    "macro"
                } else {
                    "procedure"
                }
            }
            Value::Atom(_) => "atom",
            Value::Exception(_) => "exception",
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Nil, Value::Nil) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            // Procedures compare by identity: two distinct lambdas with
            // identical bodies are still different values.
            (Value::Procedure(a), Value::Procedure(b)) => Rc::ptr_eq(a, b),
            // Atoms compare by identity of the cell, not its contents.
            (Value::Atom(a), Value::Atom(b)) => Rc::ptr_eq(a, b),
            (Value::Exception(a), Value::Exception(b)) => a.as_ref() == b.as_ref(),
            _ => false,
        }
    }
}
