// ABOUTME: Simulates a REPL session line-by-line against the public eval API

use lispkit::env::Environment;
use lispkit::error::Signal;
use lispkit::eval;
use lispkit::printer::print_readable;
use lispkit::reader;
use std::rc::Rc;

const PRELUDE: &str = include_str!("../src/prelude.lisp");

fn repl_session(env: &Rc<Environment>, lines: &[&str]) -> Vec<String> {
    lines
        .iter()
        .map(|line| match reader::read_str(line) {
            Ok(Some(expr)) => match eval::eval(expr, Rc::clone(env)) {
                Ok(value) => print_readable(&value),
                Err(Signal::Error(e)) => match e.source_name() {
                    Some(name) => format!("exception in {name}: {e}"),
                    None => format!("exception: {e}"),
                },
                Err(Signal::Thrown(payload)) => format!("exception: {}", print_readable(&payload)),
            },
            Ok(None) => String::new(),
            Err(e) => format!("exception: {e}"),
        })
        .collect()
}

fn fresh_repl_env() -> Rc<Environment> {
    let env = Environment::new();
    lispkit::builtins::install(&env);
    let mut remaining = PRELUDE;
    while let Some((expr, rest)) = reader::read_one(remaining).unwrap() {
        eval::eval(expr, Rc::clone(&env)).expect("prelude loads cleanly");
        remaining = rest;
    }
    env
}

#[test]
fn repl_echoes_results_in_readable_form() {
    let env = fresh_repl_env();
    let output = repl_session(&env, &["(def! x 10)", "(* x x)", r#"(str "n=" x)"#]);
    assert_eq!(output, vec!["10".to_string(), "100".to_string(), "\"n=10\"".to_string()]);
}

#[test]
fn repl_reports_unbound_symbol_without_a_source_name() {
    let env = fresh_repl_env();
    let output = repl_session(&env, &["nowhere-to-be-found"]);
    assert_eq!(output, vec!["exception: unbound symbol: nowhere-to-be-found".to_string()]);
}

#[test]
fn repl_reports_arity_faults_with_the_procedure_name() {
    let env = fresh_repl_env();
    let output = repl_session(&env, &["(cons 1)"]);
    assert_eq!(output, vec!["exception in cons: expected 2 argument(s), got 1".to_string()]);
}

#[test]
fn repl_reports_user_thrown_values_without_a_source_name() {
    let env = fresh_repl_env();
    let output = repl_session(&env, &[r#"(throw "boom")"#]);
    assert_eq!(output, vec!["exception: \"boom\"".to_string()]);
}

#[test]
fn repl_state_persists_across_lines() {
    let env = fresh_repl_env();
    let output = repl_session(
        &env,
        &["(def! counter (atom 0))", "(swap! counter (lambda (n) (+ n 1)))", "(deref counter)"],
    );
    assert_eq!(output[2], "1");
}
