// ABOUTME: Failure model — EvalError for host-detected faults, Signal for anything that can unwind

use crate::value::Value;
use thiserror::Error;

/// A fault the evaluator or a built-in detects on its own: malformed syntax,
/// wrong arity, a type the operation can't handle, an unbound name, calling
/// something that isn't callable, or indexing past the end of a list. These
/// unwind straight to the REPL — `try*`/`catch*` cannot intercept them, only
/// user `throw` can (see `Signal::Thrown`).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("bad syntax: {0}")]
    BadSyntax(String),

    #[error("expected {expected} argument(s), got {actual}")]
    ArityError {
        procedure: String,
        expected: String,
        actual: usize,
    },

    #[error("expected {expected}, got {actual}")]
    TypeError {
        procedure: String,
        expected: String,
        actual: String,
    },

    #[error("{message}")]
    RuntimeError { procedure: String, message: String },

    #[error("unbound symbol: {0}")]
    UnboundSymbol(String),

    #[error("not applicable: {0}")]
    NotApplicable(String),

    #[error("index {index} out of range for length {len}")]
    IndexOutOfRange { index: usize, len: usize },
}

impl EvalError {
    pub fn bad_syntax(message: impl Into<String>) -> EvalError {
        EvalError::BadSyntax(message.into())
    }

    pub fn arity(procedure: impl Into<String>, expected: impl Into<String>, actual: usize) -> EvalError {
        EvalError::ArityError {
            procedure: procedure.into(),
            expected: expected.into(),
            actual,
        }
    }

    pub fn type_error(procedure: impl Into<String>, expected: impl Into<String>, actual: &Value) -> EvalError {
        EvalError::TypeError {
            procedure: procedure.into(),
            expected: expected.into(),
            actual: actual.type_name().to_string(),
        }
    }

    pub fn runtime(procedure: impl Into<String>, message: impl Into<String>) -> EvalError {
        EvalError::RuntimeError {
            procedure: procedure.into(),
            message: message.into(),
        }
    }

    pub fn unbound(name: impl Into<String>) -> EvalError {
        EvalError::UnboundSymbol(name.into())
    }

    pub fn not_applicable(actual: &Value) -> EvalError {
        EvalError::NotApplicable(actual.type_name().to_string())
    }

    pub fn index_out_of_range(index: usize, len: usize) -> EvalError {
        EvalError::IndexOutOfRange { index, len }
    }

    /// The procedure name attached to this fault, if it carries one — used by
    /// the REPL to print `exception in NAME: ...` rather than plain `exception: ...`.
    pub fn source_name(&self) -> Option<&str> {
        match self {
            EvalError::ArityError { procedure, .. }
            | EvalError::TypeError { procedure, .. }
            | EvalError::RuntimeError { procedure, .. } => Some(procedure),
            _ => None,
        }
    }
}

/// Everything that can unwind the evaluator. `Error` faults are host-detected
/// and opaque to Lisp code; `Thrown` carries a user value raised by `throw`
/// and is the only variant `try*`/`catch*` can catch.
#[derive(Debug, Clone)]
pub enum Signal {
    Error(EvalError),
    Thrown(Value),
}

impl From<EvalError> for Signal {
    fn from(err: EvalError) -> Self {
        Signal::Error(err)
    }
}

impl Signal {
    pub fn thrown(value: Value) -> Signal {
        Signal::Thrown(value)
    }
}
