// ABOUTME: Source text -> datum tree, no evaluation

use crate::error::EvalError;
use crate::list::List;
use crate::symbol::intern;
use crate::value::Value;
use nom::{
    branch::alt,
    bytes::complete::{escaped, take_while1},
    character::complete::{char, digit1, multispace1, none_of, one_of},
    combinator::{map, opt, recognize, value},
    multi::many0,
    IResult, Parser,
};

fn parse_comment(input: &str) -> IResult<&str, ()> {
    let (input, _) = char(';')(input)?;
    let (input, _) = nom::bytes::complete::take_while(|c| c != '\n')(input)?;
    Ok((input, ()))
}

fn ws_and_comments(input: &str) -> IResult<&str, ()> {
    many0(alt((value((), multispace1), value((), char(',')), parse_comment)))
        .map(|_| ())
        .parse(input)
}

fn parse_number(input: &str) -> IResult<&str, Value> {
    map(recognize((opt(char('-')), digit1)), |s: &str| {
        Value::Number(s.parse::<i64>().expect("digit1 guarantees a valid integer"))
    })
    .parse(input)
}

fn parse_string(input: &str) -> IResult<&str, Value> {
    let (input, _) = char('"')(input)?;
    if let Ok((input, _)) = char::<_, nom::error::Error<_>>('"')(input) {
        return Ok((input, Value::Str("".into())));
    }
    let (input, content) = escaped(none_of("\"\\"), '\\', one_of("\"\\nrt"))(input)?;
    let (input, _) = char('"')(input)?;

    let mut resolved = String::new();
    let mut chars = content.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => resolved.push('\n'),
                Some('t') => resolved.push('\t'),
                Some('r') => resolved.push('\r'),
                Some('\\') => resolved.push('\\'),
                Some('"') => resolved.push('"'),
                Some(other) => {
                    resolved.push('\\');
                    resolved.push(other);
                }
                None => resolved.push('\\'),
            }
        } else {
            resolved.push(c);
        }
    }
    Ok((input, Value::Str(resolved.into())))
}

fn is_symbol_start(c: char) -> bool {
    c.is_alphabetic() || "+-*/%<>=!?&_".contains(c)
}

fn is_symbol_continue(c: char) -> bool {
    c.is_alphanumeric() || "+-*/%<>=!?&_".contains(c)
}

fn parse_symbol(input: &str) -> IResult<&str, Value> {
    let (input, first) = one_of("abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ+-*/%<>=!?&_")
        .parse(input)?;
    debug_assert!(is_symbol_start(first));
    let (input, rest) = take_while1::<_, _, nom::error::Error<_>>(is_symbol_continue)(input).unwrap_or((input, ""));

    let mut name = String::new();
    name.push(first);
    name.push_str(rest);

    let value = match name.as_str() {
        "nil" => Value::Nil,
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => Value::Symbol(intern(&name)),
    };
    Ok((input, value))
}

fn wrap(head: &str, arg: Value) -> Value {
    Value::List(List::from_vec(vec![Value::Symbol(intern(head)), arg]))
}

fn parse_quote(input: &str) -> IResult<&str, Value> {
    let (input, _) = char('\'')(input)?;
    let (input, expr) = parse_expr(input)?;
    Ok((input, wrap("quote", expr)))
}

fn parse_quasiquote(input: &str) -> IResult<&str, Value> {
    let (input, _) = char('`')(input)?;
    let (input, expr) = parse_expr(input)?;
    Ok((input, wrap("quasiquote", expr)))
}

fn parse_unquote(input: &str) -> IResult<&str, Value> {
    let (input, _) = char('~')(input)?;
    if let Ok((input, _)) = char::<_, nom::error::Error<_>>('@')(input) {
        let (input, expr) = parse_expr(input)?;
        Ok((input, wrap("splice-unquote", expr)))
    } else {
        let (input, expr) = parse_expr(input)?;
        Ok((input, wrap("unquote", expr)))
    }
}

fn parse_list(input: &str) -> IResult<&str, Value> {
    let (input, _) = char('(')(input)?;
    let (mut input, _) = ws_and_comments(input)?;

    let mut items = Vec::new();
    loop {
        if let Ok((rest, _)) = char::<_, nom::error::Error<_>>(')')(input) {
            return Ok((rest, Value::List(List::from_vec(items))));
        }
        let (rest, expr) = parse_expr(input)?;
        items.push(expr);
        let (rest, _) = ws_and_comments(rest)?;
        input = rest;
    }
}

fn parse_expr(input: &str) -> IResult<&str, Value> {
    let (input, _) = ws_and_comments(input)?;
    alt((
        parse_quote,
        parse_quasiquote,
        parse_unquote,
        parse_list,
        parse_number,
        parse_string,
        parse_symbol,
    ))
    .parse(input)
}

/// Parses exactly one top-level form from `input`. Returns `Ok(None)` for
/// input that is only whitespace/comments — per the reader's contract, that
/// is not an error. Fails with `bad-syntax` on unbalanced parens, an
/// unterminated string, or more than one top-level form.
pub fn read_str(input: &str) -> Result<Option<Value>, EvalError> {
    let (after_ws, _) =
        ws_and_comments(input).map_err(|e| EvalError::bad_syntax(format!("{e}")))?;
    if after_ws.is_empty() {
        return Ok(None);
    }
    let (rest, value) = parse_expr(input).map_err(|e| EvalError::bad_syntax(format!("{e}")))?;
    let (rest, _) = ws_and_comments(rest).map_err(|e| EvalError::bad_syntax(format!("{e}")))?;
    if !rest.is_empty() {
        return Err(EvalError::bad_syntax(format!("unexpected trailing input: {rest:?}")));
    }
    Ok(Some(value))
}

/// Parses one top-level form and returns it along with the unconsumed
/// remainder — used to walk a whole file of top-level forms (script mode,
/// `load-file`/`slurp`-driven evaluation).
pub fn read_one(input: &str) -> Result<Option<(Value, &str)>, EvalError> {
    let (after_ws, _) =
        ws_and_comments(input).map_err(|e| EvalError::bad_syntax(format!("{e}")))?;
    if after_ws.is_empty() {
        return Ok(None);
    }
    let (rest, value) = parse_expr(input).map_err(|e| EvalError::bad_syntax(format!("{e}")))?;
    Ok(Some((value, rest)))
}
