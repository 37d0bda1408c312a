use std::io;

use thiserror::Error;

use crate::value::Kind;

pub type SillyResult<T> = Result<T, SillyError>;

/// Raised while building statement trees from the token stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("Unexpected end of input")]
    UnexpectedEnd,
    #[error("Unknown statement type ({token})")]
    UnknownStatement { token: String },
    #[error("Unknown value ({token})")]
    UnknownValue { token: String },
    #[error("Malformed {construct} (expecting '{expected}', found '{found}')")]
    Malformed {
        construct: &'static str,
        expected: &'static str,
        found: String,
    },
    #[error("Illegal lhs of assignment statement ({token})")]
    IllegalAssignmentTarget { token: String },
    #[error("Identifier or function expected in expression ({found})")]
    ExpectedOperator { found: String },
    #[error("{what} must be an identifier ({found})")]
    ExpectedIdentifier { what: &'static str, found: String },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RuntimeError {
    #[error("variable {name} is undeclared")]
    UndeclaredVariable { name: String },
    #[error("variable {name} has no value")]
    UnassignedVariable { name: String },
    #[error("function {name} is not declared")]
    UndeclaredFunction { name: String },
    #[error("cannot assign to {name}, name exists as function")]
    NameIsFunction { name: String },
    #[error("cannot declare function {name}, name exists as variable")]
    NameIsVariable { name: String },
    #[error("function {name} already declared")]
    FunctionRedeclared { name: String },
    #[error("incorrect arity in {operator} expression (expected {expected}, got {found})")]
    IncorrectArity {
        operator: String,
        expected: String,
        found: usize,
    },
    #[error("{expected} value expected in {operator} expression, found {found}")]
    TypeMismatch {
        operator: String,
        expected: &'static str,
        found: Kind,
    },
    #[error("type mismatch in comparison ({left} vs {right})")]
    ComparisonMismatch { left: Kind, right: Kind },
    #[error("{construct} statement requires a boolean condition, found {found}")]
    ConditionNotBoolean {
        construct: &'static str,
        found: Kind,
    },
    #[error("repeat statement requires a non-negative integer, found {count}")]
    InvalidRepeatCount { count: f64 },
    #[error("index must be an integer, found {index}")]
    NonIntegerIndex { index: f64 },
    #[error("index {index} out of bounds for length {len}")]
    IndexOutOfBounds { index: f64, len: usize },
    #[error("unknown expression format ({token})")]
    UnknownExpression { token: String },
}

#[derive(Debug, Error)]
pub enum SillyError {
    #[error("SYNTAX ERROR: {0}")]
    Syntax(#[from] SyntaxError),
    #[error("RUNTIME ERROR: {0}")]
    Runtime(#[from] RuntimeError),
    #[error("ERROR: Return statement outside of function")]
    ReturnOutsideFunction,
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
