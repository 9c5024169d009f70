mod config;

use clap::Parser;
use lispkit::env::Environment;
use lispkit::error::Signal;
use lispkit::eval;
use lispkit::printer::print_readable;
use lispkit::reader;
use rustyline::error::ReadlineError;
use rustyline::{Config, Editor};
use std::path::PathBuf;
use std::process::ExitCode;
use std::rc::Rc;

const PRELUDE: &str = include_str!("prelude.lisp");

/// A tree-walking Lisp with tail calls, macros, and quasiquote
#[derive(Parser, Debug)]
#[command(name = "lispkit")]
#[command(version = config::VERSION)]
#[command(about = "A tree-walking Lisp interpreter")]
struct CliArgs {
    /// Script file to execute (omit to start the REPL)
    #[arg(value_name = "FILE")]
    script: Option<PathBuf>,

    /// Skip loading the standard prelude
    #[arg(long = "no-stdlib")]
    no_stdlib: bool,
}

fn main() -> ExitCode {
    let args = CliArgs::parse();

    let env = Environment::new();
    lispkit::builtins::install(&env);
    if let Err(signal) = install_load_file(&env) {
        report(&signal);
        return ExitCode::FAILURE;
    }

    if !args.no_stdlib {
        if let Err(signal) = run_source(PRELUDE, &env) {
            report(&signal);
            return ExitCode::FAILURE;
        }
    }

    match args.script {
        Some(path) => run_script(&path, &env),
        None => {
            run_repl(&env);
            ExitCode::SUCCESS
        }
    }
}

/// `(def! load-file (lambda (path) (eval (read-string (str "(do " (slurp path) "\n)"))) nil))`
fn install_load_file(env: &Rc<Environment>) -> Result<(), Signal> {
    let form = r#"(def! load-file (lambda (path) (eval (read-string (str "(do " (slurp path) "\n)"))) nil))"#;
    run_source(form, env)
}

fn run_source(source: &str, env: &Rc<Environment>) -> Result<(), Signal> {
    let mut remaining = source;
    loop {
        match reader::read_one(remaining).map_err(Signal::Error)? {
            None => return Ok(()),
            Some((expr, rest)) => {
                eval::eval(expr, Rc::clone(env))?;
                remaining = rest;
            }
        }
    }
}

fn run_script(path: &PathBuf, env: &Rc<Environment>) -> ExitCode {
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            eprintln!("cannot read {}: {e}", path.display());
            return ExitCode::FAILURE;
        }
    };

    match run_source(&contents, env) {
        Ok(()) => ExitCode::SUCCESS,
        Err(signal) => {
            report(&signal);
            ExitCode::FAILURE
        }
    }
}

fn run_repl(env: &Rc<Environment>) {
    println!("{}", config::WELCOME_MESSAGE);
    println!("{}", config::WELCOME_SUBTITLE);

    let rl_config = Config::builder().auto_add_history(true).build();
    let mut rl: Editor<(), _> = match Editor::with_config(rl_config) {
        Ok(rl) => rl,
        Err(e) => {
            eprintln!("failed to initialize line editor: {e}");
            return;
        }
    };
    let _ = rl.load_history(config::HISTORY_FILE);

    loop {
        match rl.readline(config::PROMPT) {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                if matches!(line.trim(), "(exit)" | "(quit)") {
                    break;
                }
                match reader::read_str(&line) {
                    Ok(Some(expr)) => match eval::eval(expr, Rc::clone(env)) {
                        Ok(value) => println!("{}", print_readable(&value)),
                        Err(signal) => report(&signal),
                    },
                    Ok(None) => {}
                    Err(e) => eprintln!("exception: {e}"),
                }
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("readline error: {e}");
                break;
            }
        }
    }

    let _ = rl.save_history(config::HISTORY_FILE);
}

fn report(signal: &Signal) {
    match signal {
        Signal::Error(e) => match e.source_name() {
            Some(name) => eprintln!("exception in {name}: {e}"),
            None => eprintln!("exception: {e}"),
        },
        Signal::Thrown(payload) => eprintln!("exception: {}", print_readable(payload)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prelude_loads_without_error() {
        let env = Environment::new();
        lispkit::builtins::install(&env);
        install_load_file(&env).expect("load-file installs");
        run_source(PRELUDE, &env).expect("prelude evaluates cleanly");
    }

    #[test]
    fn prelude_defines_comparison_helpers() {
        let env = Environment::new();
        lispkit::builtins::install(&env);
        run_source(PRELUDE, &env).unwrap();

        let result = eval::eval(reader::read_str("(< 1 2)").unwrap().unwrap(), Rc::clone(&env)).unwrap();
        assert_eq!(result, lispkit::value::Value::Bool(true));

        let result = eval::eval(reader::read_str("(>= 2 2)").unwrap().unwrap(), Rc::clone(&env)).unwrap();
        assert_eq!(result, lispkit::value::Value::Bool(true));
    }

    #[test]
    fn prelude_cond_and_or_short_circuit() {
        let env = Environment::new();
        lispkit::builtins::install(&env);
        run_source(PRELUDE, &env).unwrap();

        let result = eval::eval(
            reader::read_str("(cond (false 1) (true 2) (true 3))").unwrap().unwrap(),
            Rc::clone(&env),
        )
        .unwrap();
        assert_eq!(result, lispkit::value::Value::Number(2));

        let result = eval::eval(reader::read_str("(or false false 7)").unwrap().unwrap(), Rc::clone(&env)).unwrap();
        assert_eq!(result, lispkit::value::Value::Number(7));
    }

    #[test]
    fn prelude_delay_force_defers_evaluation() {
        let env = Environment::new();
        lispkit::builtins::install(&env);
        run_source(PRELUDE, &env).unwrap();

        let result = eval::eval(
            reader::read_str("(force (delay (+ 1 2)))").unwrap().unwrap(),
            Rc::clone(&env),
        )
        .unwrap();
        assert_eq!(result, lispkit::value::Value::Number(3));
    }
}
