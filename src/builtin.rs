use std::{cmp::Ordering, io::Write};

use crate::{
    context::EvaluationContext,
    error::RuntimeError,
    interpreter::{evaluate, EvaluationResult},
    lexer::{Token, TokenKind},
    parser::Expression,
    value::Value,
};

#[derive(Debug, Clone, Copy)]
enum Arity {
    Exactly(usize),
    AtLeast(usize),
}

fn check_arity(operator: &str, arguments: &[Expression], arity: Arity) -> Result<(), RuntimeError> {
    let (accepted, expected) = match arity {
        Arity::Exactly(count) => (arguments.len() == count, count.to_string()),
        Arity::AtLeast(count) => (arguments.len() >= count, format!("at least {}", count)),
    };
    if accepted {
        return Ok(());
    }
    Err(RuntimeError::IncorrectArity { operator: operator.to_owned(), expected, found: arguments.len() })
}

fn type_mismatch(operator: &str, expected: &'static str, found: &Value) -> RuntimeError {
    RuntimeError::TypeMismatch { operator: operator.to_owned(), expected, found: found.kind() }
}

fn expect_number(operator: &str, value: Value) -> Result<f64, RuntimeError> {
    match value {
        Value::Number(number) => Ok(number),
        other => Err(type_mismatch(operator, "number", &other)),
    }
}

fn expect_boolean(operator: &str, value: Value) -> Result<bool, RuntimeError> {
    match value {
        Value::Boolean(boolean) => Ok(boolean),
        other => Err(type_mismatch(operator, "boolean", &other)),
    }
}

fn builtin_math<W: Write>(operator: &str, arguments: &[Expression], ctx: &mut EvaluationContext<W>) -> EvaluationResult {
    check_arity(operator, arguments, Arity::AtLeast(2))?;

    let apply: fn(f64, f64) -> f64 = match operator {
        "+" => |a, b| a + b,
        "*" => |a, b| a * b,
        _ => |a, b| a / b,
    };

    let mut result = expect_number(operator, evaluate(&arguments[0], ctx)?)?;
    for argument in &arguments[1..] {
        result = apply(result, expect_number(operator, evaluate(argument, ctx)?)?);
    }
    Ok(Value::Number(result))
}

fn builtin_not<W: Write>(arguments: &[Expression], ctx: &mut EvaluationContext<W>) -> EvaluationResult {
    check_arity("not", arguments, Arity::Exactly(1))?;
    Ok(Value::Boolean(!expect_boolean("not", evaluate(&arguments[0], ctx)?)?))
}

// `and` stops at the first false argument, `or` at the first true one
fn builtin_short_circuit<W: Write>(operator: &str, arguments: &[Expression], ctx: &mut EvaluationContext<W>) -> EvaluationResult {
    check_arity(operator, arguments, Arity::AtLeast(2))?;

    let decisive = operator == "or";
    for argument in arguments {
        if expect_boolean(operator, evaluate(argument, ctx)?)? == decisive {
            return Ok(Value::Boolean(decisive));
        }
    }
    Ok(Value::Boolean(!decisive))
}

fn relation_holds(operator: &str, ordering: Ordering) -> bool {
    match operator {
        "==" => ordering.is_eq(),
        "!=" => ordering.is_ne(),
        "<" => ordering.is_lt(),
        ">" => ordering.is_gt(),
        "<=" => ordering.is_le(),
        _ => ordering.is_ge(),
    }
}

fn builtin_compare<W: Write>(operator: &str, arguments: &[Expression], ctx: &mut EvaluationContext<W>) -> EvaluationResult {
    check_arity(operator, arguments, Arity::AtLeast(1))?;

    // Both sides of every adjacent pair are evaluated afresh, so inner
    // arguments run twice and a lone argument is never evaluated
    for pair in arguments.windows(2) {
        let left = evaluate(&pair[0], ctx)?;
        let right = evaluate(&pair[1], ctx)?;
        if !relation_holds(operator, left.compare(&right)?) {
            return Ok(Value::Boolean(false));
        }
    }
    Ok(Value::Boolean(true))
}

fn builtin_len<W: Write>(arguments: &[Expression], ctx: &mut EvaluationContext<W>) -> EvaluationResult {
    check_arity("len", arguments, Arity::Exactly(1))?;
    match evaluate(&arguments[0], ctx)? {
        Value::List(elements) => Ok(Value::Number(elements.len() as f64)),
        Value::String(characters) => Ok(Value::Number(characters.len() as f64)),
        other => Err(type_mismatch("len", "list or string", &other).into()),
    }
}

fn builtin_get<W: Write>(arguments: &[Expression], ctx: &mut EvaluationContext<W>) -> EvaluationResult {
    check_arity("get", arguments, Arity::Exactly(2))?;

    // Strings index as a list of characters
    let mut elements = match evaluate(&arguments[0], ctx)? {
        Value::List(elements) => elements,
        Value::String(characters) => characters.into_iter().map(Value::Character).collect(),
        other => return Err(type_mismatch("get", "list or string", &other).into()),
    };

    let index = expect_number("get", evaluate(&arguments[1], ctx)?)?;
    if index != index.round() {
        return Err(RuntimeError::NonIntegerIndex { index }.into());
    }
    if index < 0.0 || index >= elements.len() as f64 {
        return Err(RuntimeError::IndexOutOfBounds { index, len: elements.len() }.into());
    }

    Ok(elements.swap_remove(index as usize))
}

fn builtin_cat<W: Write>(arguments: &[Expression], ctx: &mut EvaluationContext<W>) -> EvaluationResult {
    check_arity("cat", arguments, Arity::AtLeast(2))?;

    // The first argument decides whether the whole call joins lists or strings
    match evaluate(&arguments[0], ctx)? {
        Value::List(mut elements) => {
            for argument in &arguments[1..] {
                match evaluate(argument, ctx)? {
                    Value::List(more) => elements.extend(more),
                    other => return Err(type_mismatch("cat", "list", &other).into()),
                }
            }
            Ok(Value::List(elements))
        }
        Value::String(mut characters) => {
            for argument in &arguments[1..] {
                match evaluate(argument, ctx)? {
                    Value::String(more) => characters.extend(more),
                    other => return Err(type_mismatch("cat", "string", &other).into()),
                }
            }
            Ok(Value::String(characters))
        }
        other => Err(type_mismatch("cat", "list or string", &other).into()),
    }
}

fn builtin_str<W: Write>(arguments: &[Expression], ctx: &mut EvaluationContext<W>) -> EvaluationResult {
    check_arity("str", arguments, Arity::Exactly(1))?;
    Ok(Value::string(&evaluate(&arguments[0], ctx)?.to_string()))
}

/// Applies a built-in math, boolean or sequence operator. Arguments are
/// evaluated left to right, each at most once.
pub(crate) fn evaluate_builtin<W: Write>(operator: &Token, arguments: &[Expression], ctx: &mut EvaluationContext<W>) -> EvaluationResult {
    let spelling = operator.spelling();
    match (operator.kind(), spelling) {
        (TokenKind::MathOperator, _) => builtin_math(spelling, arguments, ctx),
        (TokenKind::BoolOperator, "not") => builtin_not(arguments, ctx),
        (TokenKind::BoolOperator, "and" | "or") => builtin_short_circuit(spelling, arguments, ctx),
        (TokenKind::BoolOperator, _) => builtin_compare(spelling, arguments, ctx),
        (TokenKind::SequenceOperator, "len") => builtin_len(arguments, ctx),
        (TokenKind::SequenceOperator, "get") => builtin_get(arguments, ctx),
        (TokenKind::SequenceOperator, "cat") => builtin_cat(arguments, ctx),
        (TokenKind::SequenceOperator, _) => builtin_str(arguments, ctx),
        _ => Err(RuntimeError::UndeclaredFunction { name: spelling.to_owned() }.into()),
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        error::{SillyError, SillyResult},
        lexer::TokenStream,
        parser::parse_expression,
    };

    use super::*;

    fn eval(source: &str) -> SillyResult<Value> {
        let mut ctx = EvaluationContext::with_output(Vec::new());
        let expression = parse_expression(&mut TokenStream::from_source(source))?;
        evaluate(&expression, &mut ctx)
    }

    fn eval_text(source: &str) -> String {
        match eval(source) {
            Ok(value) => value.to_string(),
            Err(error) => panic!("{} failed: {}", source, error),
        }
    }

    fn runtime_error(source: &str) -> RuntimeError {
        match eval(source) {
            Err(SillyError::Runtime(error)) => error,
            other => panic!("expected a runtime error from {}, got {:?}", source, other),
        }
    }

    #[test]
    fn literals_round_trip() {
        assert_eq!(eval_text("42"), "42");
        assert_eq!(eval_text("3.5"), "3.5");
        assert_eq!(eval_text("-2"), "-2");
        assert_eq!(eval_text("true"), "true");
        assert_eq!(eval_text("'x'"), "x");
        assert_eq!(eval_text("\"two{words}\""), "two{words}");
        assert_eq!(eval(" 'q' ").ok(), Some(Value::Character('q')));
    }

    #[test]
    fn math_folds_left() {
        assert_eq!(eval_text("(+ 1 2 3)"), "6");
        assert_eq!(eval_text("(/ 12 2 3)"), "2");
        assert_eq!(eval_text("(* 2 0.5)"), "1");
        assert_eq!(eval_text("(/ 1 0)"), "inf");
        assert!(matches!(runtime_error("(+ 1)"), RuntimeError::IncorrectArity { .. }));
        assert!(matches!(runtime_error("(* 1 'a')"), RuntimeError::TypeMismatch { .. }));
    }

    #[test]
    fn and_or_short_circuit() {
        // evaluating the second argument would fail on the undeclared variable
        assert_eq!(eval_text("(and false boom)"), "false");
        assert_eq!(eval_text("(or true boom)"), "true");
        assert_eq!(eval_text("(and true true true)"), "true");
        assert_eq!(eval_text("(or false false)"), "false");
        assert!(matches!(runtime_error("(and true boom)"), RuntimeError::UndeclaredVariable { .. }));
        assert!(matches!(runtime_error("(or 1 true)"), RuntimeError::TypeMismatch { .. }));
        assert!(matches!(runtime_error("(and true)"), RuntimeError::IncorrectArity { .. }));
    }

    #[test]
    fn not_takes_one_boolean() {
        assert_eq!(eval_text("(not false)"), "true");
        assert!(matches!(runtime_error("(not true false)"), RuntimeError::IncorrectArity { .. }));
        assert!(matches!(runtime_error("(not 0)"), RuntimeError::TypeMismatch { .. }));
    }

    #[test]
    fn comparison_chains() {
        assert_eq!(eval_text("(< 1 2 3)"), "true");
        assert_eq!(eval_text("(< 1 3 2)"), "false");
        assert_eq!(eval_text("(== 'a' 'a')"), "true");
        assert_eq!(eval_text("(!= \"ab\" \"ab\")"), "false");
        assert_eq!(eval_text("(>= 3 3 1)"), "true");
        assert_eq!(eval_text("(> true false)"), "true");
        assert_eq!(eval_text("(<= 5)"), "true");
        assert_eq!(eval_text("(== undefined)"), "true");
        assert_eq!(eval_text("(== [1 2] [1 2])"), "true");
        // the chain stops before reaching the mismatched pair
        assert_eq!(eval_text("(< 2 1 'a')"), "false");
        assert!(matches!(runtime_error("(== 1 'a')"), RuntimeError::ComparisonMismatch { .. }));
        assert!(matches!(runtime_error("(==)"), RuntimeError::IncorrectArity { .. }));
    }

    #[test]
    fn len_counts_elements() {
        assert_eq!(eval_text("(len [1 [2 3] 'c'])"), "3");
        assert_eq!(eval_text("(len \"hello\")"), "5");
        assert_eq!(eval_text("(len [])"), "0");
        assert!(matches!(runtime_error("(len 4)"), RuntimeError::TypeMismatch { .. }));
    }

    #[test]
    fn get_checks_index() {
        assert_eq!(eval_text("(get [7 8 9] 0)"), "7");
        assert_eq!(eval_text("(get [7 8 9] 2)"), "9");
        assert_eq!(eval("(get \"abc\" 1)").ok(), Some(Value::Character('b')));
        assert!(matches!(runtime_error("(get [7 8 9] 3)"), RuntimeError::IndexOutOfBounds { .. }));
        assert!(matches!(runtime_error("(get [7 8 9] -1)"), RuntimeError::IndexOutOfBounds { .. }));
        assert!(matches!(runtime_error("(get [7 8 9] 1.5)"), RuntimeError::NonIntegerIndex { .. }));
        assert!(matches!(runtime_error("(get [7 8 9] '1')"), RuntimeError::TypeMismatch { .. }));
        assert!(matches!(runtime_error("(get 5 0)"), RuntimeError::TypeMismatch { .. }));
    }

    #[test]
    fn cat_keeps_kind_of_first_argument() {
        assert_eq!(eval_text("(cat [1 2] [3] [])"), "[1 2 3]");
        assert_eq!(eval_text("(cat \"ab\" \"cd\")"), "abcd");
        assert_eq!(eval("(cat \"a\" \"b\")").ok(), Some(Value::string("ab")));
        assert!(matches!(runtime_error("(cat [1] \"a\")"), RuntimeError::TypeMismatch { .. }));
        assert!(matches!(runtime_error("(cat \"a\" ['b'])"), RuntimeError::TypeMismatch { .. }));
        assert!(matches!(runtime_error("(cat [1])"), RuntimeError::IncorrectArity { .. }));
    }

    #[test]
    fn str_renders_any_value() {
        assert_eq!(eval("(str [1 'a'])").ok(), Some(Value::string("[1 'a']")));
        assert_eq!(eval("(str 2.5)").ok(), Some(Value::string("2.5")));
        assert_eq!(eval_text("(len (str 100))"), "3");
        assert!(matches!(runtime_error("(str)"), RuntimeError::IncorrectArity { .. }));
    }

    #[test]
    fn mixed_lists_render_with_quotes() {
        assert_eq!(eval_text("[1 \"ab\" 'c' [true]]"), "[1 \"ab\" 'c' [true]]");
    }
}
