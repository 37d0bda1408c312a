mod builtin;
mod context;
mod error;
mod interpreter;
mod lexer;
mod parser;
mod value;

#[cfg(test)]
mod test_utils;

pub use error::{RuntimeError, SillyError, SillyResult, SyntaxError};
pub use context::{EvaluationContext, FunctionRegistry, MemorySpace};
pub use lexer::{Token, TokenKind, TokenStream};
pub use parser::{parse_compound, parse_expression, parse_statement, Compound, Expression, FunctionDecl, Statement};
pub use value::{Kind, Value};
