// ABOUTME: Lexically scoped identifier-to-value binding map with an enclosing link

use crate::symbol::Symbol;
use crate::value::{ProcKind, Value};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug)]
pub struct Environment {
    bindings: RefCell<HashMap<Symbol, Value>>,
    parent: Option<Rc<Environment>>,
}

impl Environment {
    /// Creates a new root environment with no parent.
    pub fn new() -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            parent: None,
        })
    }

    /// Creates a new child environment enclosed by `parent`.
    pub fn with_parent(parent: Rc<Environment>) -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            parent: Some(parent),
        })
    }

    /// Binds or rebinds `sym` in this frame only. If `value` is an unnamed
    /// procedure, `sym` becomes its name as a side effect (the procedure's
    /// `name` cell is set once and not overwritten by later bindings).
    /// Returns the previous binding of `sym` in this frame, if any.
    pub fn put(&self, sym: Symbol, value: Value) -> Option<Value> {
        if let Value::Procedure(proc) = &value {
            if proc.name.borrow().is_none() {
                *proc.name.borrow_mut() = Some(sym);
            }
        }
        self.bindings.borrow_mut().insert(sym, value)
    }

    /// Searches this frame, then each enclosing frame in turn.
    pub fn get(&self, sym: Symbol) -> Option<Value> {
        if let Some(value) = self.bindings.borrow().get(&sym) {
            return Some(value.clone());
        }
        self.parent.as_ref().and_then(|p| p.get(sym))
    }

    /// Walks to the outermost (root) frame.
    pub fn root(self: &Rc<Self>) -> Rc<Environment> {
        let mut cur = self.clone();
        loop {
            match &cur.parent {
                Some(parent) => cur = parent.clone(),
                None => return cur,
            }
        }
    }
}

/// Wraps a user lambda body/captured-env pair and a required-arity list into
/// a [`crate::value::Procedure`]. Lives here because both `eval`'s `lambda`
/// handling and `defmacro!` need to build one the same way.
pub fn make_lambda(
    params: Vec<Symbol>,
    variadic: bool,
    body: crate::list::List,
    env: Rc<Environment>,
) -> Value {
    Value::Procedure(Rc::new(crate::value::Procedure {
        name: RefCell::new(None),
        params,
        variadic,
        is_macro: std::cell::Cell::new(false),
        kind: ProcKind::User { body, env },
    }))
}
