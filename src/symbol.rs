// ABOUTME: Process-wide symbol interner mapping names to unique handles

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// A handle into the interner. Two symbols are equal iff they came from the
/// same `intern` call on the same name — comparison is a `u32` compare, not
/// a string compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(u32);

struct Interner {
    names: Vec<Rc<str>>,
    ids: HashMap<Rc<str>, Symbol>,
}

impl Interner {
    fn new() -> Self {
        Interner {
            names: Vec::new(),
            ids: HashMap::new(),
        }
    }

    fn intern(&mut self, name: &str) -> Symbol {
        if let Some(sym) = self.ids.get(name) {
            return *sym;
        }
        let rc: Rc<str> = Rc::from(name);
        let sym = Symbol(self.names.len() as u32);
        self.names.push(rc.clone());
        self.ids.insert(rc, sym);
        sym
    }

    fn name_of(&self, sym: Symbol) -> Rc<str> {
        self.names[sym.0 as usize].clone()
    }
}

thread_local! {
    static INTERNER: RefCell<Interner> = RefCell::new(Interner::new());
}

/// Returns the unique symbol for `name`, interning it on first use.
pub fn intern(name: &str) -> Symbol {
    INTERNER.with(|i| i.borrow_mut().intern(name))
}

/// Returns the source name a symbol was interned under.
pub fn name_of(sym: Symbol) -> Rc<str> {
    INTERNER.with(|i| i.borrow().name_of(sym))
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", name_of(*self))
    }
}
