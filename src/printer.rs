// ABOUTME: Datum tree -> text, in readable (REPL, pr-str) and raw (str, println) modes

use crate::symbol::name_of;
use crate::value::Value;
use std::fmt::Write;

/// Prints `value` the way the REPL and `pr-str`/`prn` do: strings quoted and
/// escaped, everything else in its surface syntax.
pub fn print_readable(value: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value, true);
    out
}

/// Prints `value` the way `str`/`println` do: strings as their literal
/// bytes, everything else the same as readable mode.
pub fn print_raw(value: &Value) -> String {
    let mut out = String::new();
    write_value(&mut out, value, false);
    out
}

fn write_value(out: &mut String, value: &Value, readable: bool) {
    match value {
        Value::Number(n) => {
            let _ = write!(out, "{n}");
        }
        Value::Symbol(sym) => {
            let _ = write!(out, "{}", name_of(*sym));
        }
        Value::Str(s) => {
            if readable {
                write_quoted_string(out, s);
            } else {
                out.push_str(s);
            }
        }
        Value::Nil => out.push_str("nil"),
        Value::Bool(true) => out.push_str("true"),
        Value::Bool(false) => out.push_str("false"),
        Value::List(list) => {
            out.push('(');
            for (i, item) in list.iter().enumerate() {
                if i > 0 {
                    out.push(' ');
                }
                write_value(out, item, readable);
            }
            out.push(')');
        }
        Value::Procedure(proc) => {
            let tag = if proc.is_macro.get() { "macro" } else { "procedure" };
            out.push_str("#<");
            out.push_str(tag);
            if let Some(name) = *proc.name.borrow() {
                let _ = write!(out, ":{}", name_of(name));
            }
            out.push('>');
        }
        Value::Atom(cell) => {
            out.push_str("(atom ");
            write_value(out, &cell.borrow(), readable);
            out.push(')');
        }
        Value::Exception(_) => out.push_str("#<exn>"),
    }
}

fn write_quoted_string(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out.push('"');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::list::List;
    use crate::symbol::intern;

    #[test]
    fn numbers_symbols_and_singletons_print_as_surface_syntax() {
        assert_eq!(print_readable(&Value::Number(-7)), "-7");
        assert_eq!(print_readable(&Value::Symbol(intern("foo"))), "foo");
        assert_eq!(print_readable(&Value::Nil), "nil");
        assert_eq!(print_readable(&Value::Bool(true)), "true");
        assert_eq!(print_readable(&Value::Bool(false)), "false");
    }

    #[test]
    fn readable_strings_are_quoted_and_escaped() {
        let s = Value::Str("line\n\"quoted\"".into());
        assert_eq!(print_readable(&s), "\"line\\n\\\"quoted\\\"\"");
    }

    #[test]
    fn raw_strings_are_literal() {
        let s = Value::Str("line\n\"quoted\"".into());
        assert_eq!(print_raw(&s), "line\n\"quoted\"");
    }

    #[test]
    fn lists_print_space_separated() {
        let list = Value::List(List::from_vec(vec![Value::Number(1), Value::Number(2)]));
        assert_eq!(print_readable(&list), "(1 2)");
    }

    #[test]
    fn atoms_print_wrapped() {
        let atom = Value::atom(Value::Number(9));
        assert_eq!(print_readable(&atom), "(atom 9)");
    }

    #[test]
    fn exceptions_print_as_opaque_tag() {
        let exn = Value::exception(Value::Str("boom".into()));
        assert_eq!(print_readable(&exn), "#<exn>");
    }

    /// `read(print(d, readable=true)) == d` for numbers, strings, symbols,
    /// lists, and the nil/true/false singletons.
    #[test]
    fn readable_print_and_read_round_trip() {
        use crate::reader::read_str;

        let cases = vec![
            Value::Number(42),
            Value::Number(-7),
            Value::Str("line\n\"quoted\"\t\\".into()),
            Value::Symbol(intern("a-symbol!")),
            Value::Nil,
            Value::Bool(true),
            Value::Bool(false),
            Value::List(List::from_vec(vec![
                Value::Number(1),
                Value::Str("two".into()),
                Value::List(List::from_vec(vec![Value::Symbol(intern("three"))])),
            ])),
            Value::List(List::empty()),
        ];

        for value in cases {
            let printed = print_readable(&value);
            let read_back = read_str(&printed).unwrap().unwrap();
            assert_eq!(read_back, value, "round trip of {printed:?} did not match original");
        }
    }

    /// `eval(read_string(pr_str(x))) == x` for self-evaluating `x`.
    #[test]
    fn eval_of_read_string_of_pr_str_is_identity_for_self_evaluating_values() {
        use crate::env::Environment;
        use crate::eval::eval;
        use crate::reader::read_str;

        let env = Environment::new();
        let cases = vec![
            Value::Number(13),
            Value::Str("round-trip".into()),
            Value::Nil,
            Value::Bool(true),
            Value::Bool(false),
        ];

        for value in cases {
            let printed = print_readable(&value);
            let reparsed = read_str(&printed).unwrap().unwrap();
            let evaluated = eval(reparsed, env.clone()).unwrap();
            assert_eq!(evaluated, value);
        }
    }
}
