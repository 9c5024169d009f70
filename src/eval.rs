// ABOUTME: Iterative tree-walking evaluator — special forms, TCO, macro expansion, quasiquote

use crate::env::{make_lambda, Environment};
use crate::error::{EvalError, Signal};
use crate::list::List;
use crate::symbol::{name_of, Symbol};
use crate::value::{ProcKind, Procedure, Value};
use std::rc::Rc;

/// What one iteration of the control loop decided: a final value, or a new
/// (expression, environment) pair to continue with in place of host
/// recursion. Every special form and application site returns one of these.
enum Step {
    Done(Value),
    Tail(Value, Rc<Environment>),
}

/// Evaluates `expr` in `env`. Tail calls — the branch of `if`, the last form
/// of `do`/`let*`/a lambda body, the handler of `try*` — are driven from
/// this loop instead of recursing, so deep self-recursion in tail position
/// never grows the host stack.
pub fn eval(expr: Value, env: Rc<Environment>) -> Result<Value, Signal> {
    let mut expr = expr;
    let mut env = env;
    loop {
        match step(expr, env)? {
            Step::Done(value) => return Ok(value),
            Step::Tail(next_expr, next_env) => {
                expr = next_expr;
                env = next_env;
            }
        }
    }
}

fn step(expr: Value, env: Rc<Environment>) -> Result<Step, Signal> {
    match expr {
        Value::Symbol(sym) => env
            .get(sym)
            .map(Step::Done)
            .ok_or_else(|| EvalError::unbound(name_of(sym).to_string()).into()),
        Value::List(_) => {
            let expanded = macroexpand(expr, &env)?;
            let list = match expanded {
                Value::List(list) => list,
                other => return Ok(Step::Tail(other, env)),
            };
            if list.is_empty() {
                return Err(EvalError::bad_syntax("cannot evaluate an empty list").into());
            }

            let head_symbol = match list.head() {
                Some(Value::Symbol(s)) => Some(*s),
                _ => None,
            };
            if let Some(head_sym) = head_symbol {
                match &*name_of(head_sym) {
                    "def!" => return Ok(Step::Done(eval_def(&list, &env)?)),
                    "defmacro!" => return Ok(Step::Done(eval_defmacro(&list, &env)?)),
                    "let*" => {
                        let (next_expr, next_env) = eval_let_star(&list, &env)?;
                        return Ok(Step::Tail(next_expr, next_env));
                    }
                    "if" => return eval_if(&list, &env),
                    "do" => return eval_do(&list, &env),
                    "lambda" => return Ok(Step::Done(eval_lambda_form(&list, &env)?)),
                    "quote" => return Ok(Step::Done(eval_quote(&list)?)),
                    "quasiquote" => return Ok(Step::Done(eval_quasiquote_form(&list, &env)?)),
                    "macroexpand" => return Ok(Step::Done(eval_macroexpand_form(&list, &env)?)),
                    "try*" => return eval_try(&list, &env),
                    _ => {}
                }
            }
            eval_application(&list, &env)
        }
        other => Ok(Step::Done(other)),
    }
}

fn is_headed(list: &List, name: &str) -> bool {
    matches!(list.head(), Some(Value::Symbol(s)) if &*name_of(*s) == name)
}

fn eval_def(list: &List, env: &Rc<Environment>) -> Result<Value, Signal> {
    if list.len() != 3 {
        return Err(EvalError::arity("def!", "2", list.len() - 1).into());
    }
    let name = match list.get(1) {
        Some(Value::Symbol(s)) => *s,
        _ => return Err(EvalError::bad_syntax("def!: name must be a symbol").into()),
    };
    let value = eval(list.get(2).unwrap().clone(), env.clone())?;
    env.put(name, value.clone());
    Ok(value)
}

fn eval_defmacro(list: &List, env: &Rc<Environment>) -> Result<Value, Signal> {
    if list.len() != 3 {
        return Err(EvalError::arity("defmacro!", "2", list.len() - 1).into());
    }
    let name = match list.get(1) {
        Some(Value::Symbol(s)) => *s,
        _ => return Err(EvalError::bad_syntax("defmacro!: name must be a symbol").into()),
    };
    let lambda_form = list.get(2).unwrap();
    let is_lambda_form = matches!(lambda_form.as_list(), Some(l) if is_headed(l, "lambda"));
    if !is_lambda_form {
        return Err(EvalError::bad_syntax("defmacro!: second argument must be a lambda form").into());
    }
    let value = eval(lambda_form.clone(), env.clone())?;
    let proc = value
        .as_procedure()
        .ok_or_else(|| EvalError::bad_syntax("defmacro!: lambda did not evaluate to a procedure"))?;
    proc.is_macro.set(true);
    env.put(name, value.clone());
    Ok(value)
}

fn eval_let_star(list: &List, env: &Rc<Environment>) -> Result<(Value, Rc<Environment>), Signal> {
    if list.len() != 3 {
        return Err(EvalError::arity("let*", "2", list.len() - 1).into());
    }
    let bindings = list
        .get(1)
        .and_then(Value::as_list)
        .ok_or_else(|| EvalError::bad_syntax("let*: bindings must be a list"))?;

    let child = Environment::with_parent(env.clone());
    for binding in bindings.iter() {
        let pair = binding
            .as_list()
            .ok_or_else(|| EvalError::bad_syntax("let*: each binding must be a (symbol value) pair"))?;
        if pair.len() != 2 {
            return Err(EvalError::bad_syntax("let*: each binding must have exactly 2 elements").into());
        }
        let sym = match pair.head() {
            Some(Value::Symbol(s)) => *s,
            _ => return Err(EvalError::bad_syntax("let*: binding name must be a symbol").into()),
        };
        let value = eval(pair.get(1).unwrap().clone(), child.clone())?;
        child.put(sym, value);
    }
    Ok((list.get(2).unwrap().clone(), child))
}

fn eval_if(list: &List, env: &Rc<Environment>) -> Result<Step, Signal> {
    if list.len() < 3 || list.len() > 4 {
        return Err(EvalError::arity("if", "2 or 3", list.len() - 1).into());
    }
    let cond = eval(list.get(1).unwrap().clone(), env.clone())?;
    if cond.is_truthy() {
        Ok(Step::Tail(list.get(2).unwrap().clone(), env.clone()))
    } else if list.len() == 4 {
        Ok(Step::Tail(list.get(3).unwrap().clone(), env.clone()))
    } else {
        Ok(Step::Done(Value::Nil))
    }
}

fn eval_do(list: &List, env: &Rc<Environment>) -> Result<Step, Signal> {
    if list.len() == 1 {
        return Ok(Step::Done(Value::Nil));
    }
    for item in list.iter().skip(1).take(list.len() - 2) {
        eval(item.clone(), env.clone())?;
    }
    Ok(Step::Tail(list.get(list.len() - 1).unwrap().clone(), env.clone()))
}

fn eval_lambda_form(list: &List, env: &Rc<Environment>) -> Result<Value, Signal> {
    if list.len() < 3 {
        return Err(EvalError::bad_syntax("lambda: expected a parameter list and a non-empty body").into());
    }
    let params_list = list
        .get(1)
        .and_then(Value::as_list)
        .ok_or_else(|| EvalError::bad_syntax("lambda: parameters must be a list"))?;
    let (params, variadic) = parse_params(params_list)?;
    let body = List::from_vec(list.iter().skip(2).cloned().collect());
    Ok(make_lambda(params, variadic, body, env.clone()))
}

fn parse_params(list: &List) -> Result<(Vec<Symbol>, bool), Signal> {
    let mut params = Vec::new();
    let mut variadic = false;
    let mut iter = list.iter();
    while let Some(item) = iter.next() {
        let sym = match item {
            Value::Symbol(s) => *s,
            _ => return Err(EvalError::bad_syntax("lambda: parameter must be a symbol").into()),
        };
        if &*name_of(sym) == "&" {
            let rest_sym = match iter.next() {
                Some(Value::Symbol(s)) => *s,
                _ => {
                    return Err(
                        EvalError::bad_syntax("lambda: '&' must be followed by a rest parameter symbol").into(),
                    )
                }
            };
            if iter.next().is_some() {
                return Err(EvalError::bad_syntax("lambda: no parameters allowed after the rest parameter").into());
            }
            params.push(rest_sym);
            variadic = true;
            break;
        }
        params.push(sym);
    }
    Ok((params, variadic))
}

fn eval_quote(list: &List) -> Result<Value, Signal> {
    if list.len() != 2 {
        return Err(EvalError::arity("quote", "1", list.len() - 1).into());
    }
    Ok(list.get(1).unwrap().clone())
}

fn eval_quasiquote_form(list: &List, env: &Rc<Environment>) -> Result<Value, Signal> {
    if list.len() != 2 {
        return Err(EvalError::arity("quasiquote", "1", list.len() - 1).into());
    }
    quasiquote(list.get(1).unwrap(), env)
}

/// Implements the rewrite rules of quasiquote directly: non-lists are
/// returned as-is, `(unquote x)` evaluates `x`, a bare `splice-unquote` at
/// the top is an error, and every other list is rebuilt element by element
/// with `(splice-unquote y)` elements spliced in.
fn quasiquote(x: &Value, env: &Rc<Environment>) -> Result<Value, Signal> {
    let list = match x.as_list() {
        Some(l) if !l.is_empty() => l,
        _ => return Ok(x.clone()),
    };

    if is_headed(list, "unquote") {
        if list.len() != 2 {
            return Err(EvalError::bad_syntax("unquote: expected 1 argument").into());
        }
        return eval(list.get(1).unwrap().clone(), env.clone());
    }
    if is_headed(list, "splice-unquote") {
        return Err(EvalError::bad_syntax("splice-unquote: not valid outside of a list").into());
    }

    let mut result = Vec::new();
    for item in list.iter() {
        if let Some(inner) = item.as_list() {
            if is_headed(inner, "splice-unquote") {
                if inner.len() != 2 {
                    return Err(EvalError::bad_syntax("splice-unquote: expected 1 argument").into());
                }
                let spliced = eval(inner.get(1).unwrap().clone(), env.clone())?;
                let spliced_list = spliced
                    .as_list()
                    .ok_or_else(|| EvalError::type_error("splice-unquote", "list", &spliced))?;
                result.extend(spliced_list.iter().cloned());
                continue;
            }
        }
        result.push(quasiquote(item, env)?);
    }
    Ok(Value::List(List::from_vec(result)))
}

fn eval_macroexpand_form(list: &List, env: &Rc<Environment>) -> Result<Value, Signal> {
    if list.len() != 2 {
        return Err(EvalError::arity("macroexpand", "1", list.len() - 1).into());
    }
    macroexpand(list.get(1).unwrap().clone(), env)
}

fn eval_try(list: &List, env: &Rc<Environment>) -> Result<Step, Signal> {
    if list.len() != 3 {
        return Err(EvalError::bad_syntax("try*: expected an expression and a catch* clause").into());
    }
    let catch_clause = list
        .get(2)
        .and_then(Value::as_list)
        .ok_or_else(|| EvalError::bad_syntax("try*: second form must be a catch* clause"))?;
    if catch_clause.len() != 3 || !is_headed(catch_clause, "catch*") {
        return Err(EvalError::bad_syntax("try*: expected (catch* SYM HANDLER)").into());
    }
    let sym = match catch_clause.get(1) {
        Some(Value::Symbol(s)) => *s,
        _ => return Err(EvalError::bad_syntax("catch*: binding must be a symbol").into()),
    };
    let handler = catch_clause.get(2).unwrap().clone();

    match eval(list.get(1).unwrap().clone(), env.clone()) {
        Ok(value) => Ok(Step::Done(value)),
        Err(Signal::Thrown(payload)) => {
            let child = Environment::with_parent(env.clone());
            child.put(sym, Value::exception(payload));
            Ok(Step::Tail(handler, child))
        }
        Err(other) => Err(other),
    }
}

fn eval_application(list: &List, env: &Rc<Environment>) -> Result<Step, Signal> {
    let func = eval(list.head().unwrap().clone(), env.clone())?;
    let proc = func
        .as_procedure()
        .ok_or_else(|| EvalError::not_applicable(&func))?
        .clone();

    let mut args = Vec::with_capacity(list.len().saturating_sub(1));
    for item in list.iter().skip(1) {
        args.push(eval(item.clone(), env.clone())?);
    }
    check_arity(&proc, args.len())?;

    match &proc.kind {
        ProcKind::Builtin(f) => Ok(Step::Done(f(&args, env)?)),
        ProcKind::User { body, env: captured } => {
            let call_env = bind_params(&proc, args, captured.clone());
            if body.is_empty() {
                return Ok(Step::Done(Value::Nil));
            }
            for item in body.iter().take(body.len() - 1) {
                eval(item.clone(), call_env.clone())?;
            }
            Ok(Step::Tail(body.get(body.len() - 1).unwrap().clone(), call_env))
        }
    }
}

fn check_arity(proc: &Procedure, argc: usize) -> Result<(), Signal> {
    let required = proc.required_arity();
    let ok = if proc.variadic { argc >= required } else { argc == required };
    if ok {
        return Ok(());
    }
    let name = proc
        .name
        .borrow()
        .map(|s| name_of(s).to_string())
        .unwrap_or_else(|| "#<procedure>".to_string());
    let expected = if proc.variadic {
        format!("at least {required}")
    } else {
        required.to_string()
    };
    Err(EvalError::arity(name, expected, argc).into())
}

fn bind_params(proc: &Procedure, args: Vec<Value>, captured: Rc<Environment>) -> Rc<Environment> {
    let call_env = Environment::with_parent(captured);
    let required = proc.required_arity();
    for (param, arg) in proc.params.iter().take(required).zip(args.iter()) {
        call_env.put(*param, arg.clone());
    }
    if proc.variadic {
        let rest_sym = proc
            .rest_param()
            .expect("variadic procedures always carry a rest parameter");
        call_env.put(rest_sym, Value::List(List::from_vec(args[required..].to_vec())));
    }
    call_env
}

/// Applies `proc` to already-evaluated `args`, evaluating a user body to
/// completion via host recursion. Used where a single result is needed
/// immediately rather than as a tail step: macro expansion and the `apply`/
/// `eval` built-ins. Deep self-recursion through here is not covered by the
/// tail-call guarantee — only calls reached through the main `eval` loop are.
pub fn apply(proc: &Rc<Procedure>, args: Vec<Value>, calling_env: &Rc<Environment>) -> Result<Value, Signal> {
    check_arity(proc, args.len())?;
    match &proc.kind {
        ProcKind::Builtin(f) => f(&args, calling_env),
        ProcKind::User { body, env } => {
            let call_env = bind_params(proc, args, env.clone());
            let mut result = Value::Nil;
            for item in body.iter() {
                result = eval(item.clone(), call_env.clone())?;
            }
            Ok(result)
        }
    }
}

fn macroexpand_once(expr: &Value, env: &Rc<Environment>) -> Result<Option<Value>, Signal> {
    let list = match expr.as_list() {
        Some(l) if !l.is_empty() => l,
        _ => return Ok(None),
    };
    let head_sym = match list.head() {
        Some(Value::Symbol(s)) => *s,
        _ => return Ok(None),
    };
    let proc = match env.get(head_sym) {
        Some(Value::Procedure(p)) if p.is_macro.get() => p,
        _ => return Ok(None),
    };
    let args: Vec<Value> = list.iter().skip(1).cloned().collect();
    Ok(Some(apply(&proc, args, env)?))
}

/// Repeatedly applies `macroexpand_once` until `expr` stops changing.
pub fn macroexpand(mut expr: Value, env: &Rc<Environment>) -> Result<Value, Signal> {
    while let Some(next) = macroexpand_once(&expr, env)? {
        expr = next;
    }
    Ok(expr)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::read_str;
    use crate::symbol::intern;

    fn run(src: &str, env: &Rc<Environment>) -> Value {
        let parsed = read_str(src).unwrap().unwrap();
        eval(parsed, env.clone()).unwrap_or_else(|e| panic!("eval({src}) failed: {e:?}"))
    }

    fn fresh_env() -> Rc<Environment> {
        let env = Environment::new();
        crate::builtins::install(&env);
        env
    }

    #[test]
    fn self_evaluating_values_return_themselves() {
        let env = fresh_env();
        assert_eq!(run("42", &env), Value::Number(42));
        assert_eq!(run("\"hi\"", &env), Value::Str("hi".into()));
        assert_eq!(run("nil", &env), Value::Nil);
    }

    #[test]
    fn unbound_symbol_is_an_error() {
        let env = fresh_env();
        let result = eval(Value::Symbol(intern("totally-unbound-xyz")), env);
        assert!(matches!(result, Err(Signal::Error(EvalError::UnboundSymbol(_)))));
    }

    #[test]
    fn def_binds_in_current_frame_and_returns_the_value() {
        let env = fresh_env();
        assert_eq!(run("(def! x 10)", &env), Value::Number(10));
        assert_eq!(run("x", &env), Value::Number(10));
    }

    #[test]
    fn if_dispatches_on_truthiness_nil_and_false_are_falsy() {
        let env = fresh_env();
        assert_eq!(run("(if true 1 2)", &env), Value::Number(1));
        assert_eq!(run("(if false 1 2)", &env), Value::Number(2));
        assert_eq!(run("(if nil 1 2)", &env), Value::Number(2));
        assert_eq!(run("(if 0 1 2)", &env), Value::Number(1));
        assert_eq!(run("(if false 1)", &env), Value::Nil);
    }

    #[test]
    fn do_returns_the_last_expression() {
        let env = fresh_env();
        assert_eq!(run("(do 1 2 3)", &env), Value::Number(3));
    }

    #[test]
    fn let_star_shadows_without_mutating_outer_frame() {
        let env = fresh_env();
        run("(def! x 100)", &env);
        assert_eq!(run("(let* ((x 1) (y (+ x 1))) (+ x y))", &env), Value::Number(3));
        assert_eq!(run("x", &env), Value::Number(100));
    }

    #[test]
    fn def_inside_lambda_body_does_not_leak_to_enclosing_frame() {
        let env = fresh_env();
        run("((lambda () (def! q 1)))", &env);
        let result = eval(Value::Symbol(intern("q")), env);
        assert!(result.is_err());
    }

    #[test]
    fn closures_capture_their_defining_environment() {
        let env = fresh_env();
        assert_eq!(run("(((lambda (x) (lambda () x)) 42))", &env), Value::Number(42));
    }

    #[test]
    fn deep_self_recursion_in_tail_position_does_not_overflow_the_stack() {
        let env = fresh_env();
        run("(def! count (lambda (n) (if (= n 0) 0 (count (- n 1)))))", &env);
        assert_eq!(run("(count 100000)", &env), Value::Number(0));
    }

    #[test]
    fn factorial_via_recursion() {
        let env = fresh_env();
        run("(def! ! (lambda (n) (if (> 2 n) 1 (* n (! (- n 1))))))", &env);
        assert_eq!(run("(! 10)", &env), Value::Number(3628800));
    }

    #[test]
    fn make_adder_returns_a_closure_over_its_argument() {
        let env = fresh_env();
        run("(def! make-adder (lambda (x) (lambda (n) (+ x n))))", &env);
        run("(def! inc (make-adder 1))", &env);
        assert_eq!(run("(inc 41)", &env), Value::Number(42));
    }

    #[test]
    fn variadic_lambda_collects_rest_arguments_into_a_list() {
        let env = fresh_env();
        run("(def! f (lambda (a & rest) rest))", &env);
        assert_eq!(run("(f 1 2 3)", &env), run("(list 2 3)", &env));
        assert_eq!(run("(f 1)", &env), run("(list)", &env));
    }

    #[test]
    fn quasiquote_unquotes_and_splices() {
        let env = fresh_env();
        run("(def! lst (quote (b c)))", &env);
        assert_eq!(run("`(a ~lst d)", &env), run("(quote (a (b c) d))", &env));
        assert_eq!(run("`(a ~@lst d)", &env), run("(quote (a b c d))", &env));
    }

    #[test]
    fn defmacro_builds_syntax_before_evaluation() {
        let env = fresh_env();
        run("(defmacro! unless (lambda (c t e) (list (quote if) c e t)))", &env);
        assert_eq!(run("(unless false 1 2)", &env), Value::Number(1));
        assert_eq!(run("(unless true 1 2)", &env), Value::Number(2));
    }

    #[test]
    fn try_catch_binds_the_thrown_payload_as_an_exception() {
        let env = fresh_env();
        assert_eq!(
            run(r#"(try* (throw "boom") (catch* e (exn-datum e)))"#, &env),
            Value::Str("boom".into())
        );
    }

    #[test]
    fn try_catch_passes_through_successful_evaluation() {
        let env = fresh_env();
        assert_eq!(run("(try* 42 (catch* e e))", &env), Value::Number(42));
    }

    #[test]
    fn arity_mismatch_is_an_error() {
        let env = fresh_env();
        run("(def! f (lambda (x) x))", &env);
        let result = eval(read_str("(f 1 2)").unwrap().unwrap(), env);
        assert!(matches!(result, Err(Signal::Error(EvalError::ArityError { .. }))));
    }

    #[test]
    fn calling_a_non_procedure_is_not_applicable() {
        let env = fresh_env();
        let result = eval(read_str("(1 2 3)").unwrap().unwrap(), env);
        assert!(matches!(result, Err(Signal::Error(EvalError::NotApplicable(_)))));
    }
}
