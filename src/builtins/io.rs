//! Printing: `prn pr-str str println`
//!
//! `prn`/`pr-str` print in readable mode (strings quoted and escaped);
//! `str`/`println` print in raw mode (strings literal). The `prn`/`println`
//! pair write to stdout and return `nil`; `pr-str`/`str` build a `String`.

use super::def;
use crate::env::Environment;
use crate::error::Signal;
use crate::printer::{print_raw, print_readable};
use crate::value::Value;
use std::rc::Rc;

fn join(args: &[Value], sep: &str, readable: bool) -> String {
    args.iter()
        .map(|v| if readable { print_readable(v) } else { print_raw(v) })
        .collect::<Vec<_>>()
        .join(sep)
}

/// `(prn ...)` — prints arguments readably, space-separated, with a
/// trailing newline. Returns `nil`.
fn prn(args: &[Value], _env: &Rc<Environment>) -> Result<Value, Signal> {
    println!("{}", join(args, " ", true));
    Ok(Value::Nil)
}

/// `(pr-str ...)` — same rendering as `prn` but returned as a string.
fn pr_str(args: &[Value], _env: &Rc<Environment>) -> Result<Value, Signal> {
    Ok(Value::Str(join(args, " ", true).into()))
}

/// `(str ...)` — concatenates the raw (unquoted) rendering of each argument.
fn str_fn(args: &[Value], _env: &Rc<Environment>) -> Result<Value, Signal> {
    Ok(Value::Str(join(args, "", false).into()))
}

/// `(println ...)` — prints arguments raw, space-separated, with a
/// trailing newline. Returns `nil`.
fn println_fn(args: &[Value], _env: &Rc<Environment>) -> Result<Value, Signal> {
    println!("{}", join(args, " ", false));
    Ok(Value::Nil)
}

pub fn install(env: &Rc<Environment>) {
    def(env, "prn", 0, true, prn);
    def(env, "pr-str", 0, true, pr_str);
    def(env, "str", 0, true, str_fn);
    def(env, "println", 0, true, println_fn);
}
