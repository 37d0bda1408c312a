use std::{io::Write, rc::Rc};

use log::{debug, trace};

use crate::{
    builtin::evaluate_builtin,
    context::{EvaluationContext, ScopeKind},
    error::{RuntimeError, SillyResult},
    lexer::{Token, TokenKind},
    parser::{Compound, Expression, FunctionDecl, Statement},
    value::Value,
};

/// How a statement finished. A `return` travels outward as `Returning` until
/// the call that started the function body picks it up.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Flow {
    Completed,
    Returning(Value),
}

pub(crate) type ExecutionResult = SillyResult<Flow>;
pub(crate) type EvaluationResult = SillyResult<Value>;

fn expect_boolean(value: Value, construct: &'static str) -> SillyResult<bool> {
    match value {
        Value::Boolean(condition) => Ok(condition),
        other => Err(RuntimeError::ConditionNotBoolean { construct, found: other.kind() }.into()),
    }
}

fn execute_assignment<W: Write>(target: &Token, value: &Expression, ctx: &mut EvaluationContext<W>) -> ExecutionResult {
    let name = target.spelling();
    if ctx.functions.contains(name) {
        return Err(RuntimeError::NameIsFunction { name: name.to_owned() }.into());
    }
    if !ctx.memory.is_declared(name) {
        ctx.memory.declare(name);
    }
    let value = evaluate(value, ctx)?;
    ctx.memory.store(name, value)?;
    Ok(Flow::Completed)
}

pub(crate) fn execute_compound<W: Write>(compound: &Compound, ctx: &mut EvaluationContext<W>) -> ExecutionResult {
    ctx.in_scope(ScopeKind::Nested, |ctx| {
        for statement in &compound.statements {
            if let flow @ Flow::Returning(_) = execute(statement, ctx)? {
                return Ok(flow);
            }
        }
        Ok(Flow::Completed)
    })
}

fn execute_if<W: Write>(condition: &Expression, then_block: &Compound, else_block: &Compound, ctx: &mut EvaluationContext<W>) -> ExecutionResult {
    if expect_boolean(evaluate(condition, ctx)?, "if")? {
        execute_compound(then_block, ctx)
    } else {
        execute_compound(else_block, ctx)
    }
}

fn execute_while<W: Write>(condition: &Expression, body: &Compound, ctx: &mut EvaluationContext<W>) -> ExecutionResult {
    while expect_boolean(evaluate(condition, ctx)?, "while")? {
        if let flow @ Flow::Returning(_) = execute_compound(body, ctx)? {
            return Ok(flow);
        }
    }
    Ok(Flow::Completed)
}

fn execute_repeat<W: Write>(count: &Expression, body: &Compound, ctx: &mut EvaluationContext<W>) -> ExecutionResult {
    let count = match evaluate(count, ctx)? {
        Value::Number(count) => count,
        other => return Err(RuntimeError::TypeMismatch {
            operator: "repeat".to_owned(),
            expected: "number",
            found: other.kind(),
        }.into()),
    };
    if count.fract() != 0.0 || count < 0.0 {
        return Err(RuntimeError::InvalidRepeatCount { count }.into());
    }

    for _ in 0..(count as u64) {
        if let flow @ Flow::Returning(_) = execute_compound(body, ctx)? {
            return Ok(flow);
        }
    }
    Ok(Flow::Completed)
}

fn execute_function_decl<W: Write>(declaration: &Rc<FunctionDecl>, ctx: &mut EvaluationContext<W>) -> ExecutionResult {
    let name = declaration.name.spelling();
    if ctx.memory.is_declared(name) {
        return Err(RuntimeError::NameIsVariable { name: name.to_owned() }.into());
    }
    if ctx.functions.contains(name) {
        return Err(RuntimeError::FunctionRedeclared { name: name.to_owned() }.into());
    }

    ctx.functions.register(Rc::clone(declaration));
    ctx.memory.declare(name);
    ctx.memory.store(name, Value::FUNCTION_MARKER)?;
    Ok(Flow::Completed)
}

pub(crate) fn execute<W: Write>(statement: &Statement, ctx: &mut EvaluationContext<W>) -> ExecutionResult {
    trace!("executing {:?}", statement);
    match statement {
        Statement::Assignment { target, value } => execute_assignment(target, value, ctx),
        Statement::Compound(compound) => execute_compound(compound, ctx),
        Statement::If { condition, then_block, else_block } => execute_if(condition, then_block, else_block, ctx),
        Statement::While { condition, body } => execute_while(condition, body, ctx),
        Statement::Repeat { count, body } => execute_repeat(count, body, ctx),
        Statement::FunctionDecl(declaration) => execute_function_decl(declaration, ctx),
        Statement::Return(value) => Ok(Flow::Returning(evaluate(value, ctx)?)),
        Statement::Print(value) => {
            let value = evaluate(value, ctx)?;
            ctx.print_line(&value.to_string())?;
            Ok(Flow::Completed)
        }
    }
}

fn evaluate_simple<W: Write>(token: &Token, ctx: &mut EvaluationContext<W>) -> EvaluationResult {
    let spelling = token.spelling();
    let unknown = || RuntimeError::UnknownExpression { token: spelling.to_owned() };
    match token.kind() {
        TokenKind::Identifier => Ok(ctx.memory.lookup(spelling)?),
        TokenKind::BoolLiteral => Ok(Value::Boolean(spelling == "true")),
        TokenKind::NumberLiteral => Ok(Value::Number(spelling.parse().map_err(|_| unknown())?)),
        TokenKind::CharLiteral => Ok(Value::Character(spelling.chars().nth(1).ok_or_else(unknown)?)),
        TokenKind::StringLiteral => {
            let text = spelling.strip_prefix('"').and_then(|rest| rest.strip_suffix('"')).ok_or_else(unknown)?;
            Ok(Value::string(text))
        }
        _ => Err(unknown().into()),
    }
}

fn call_user_function<W: Write>(name: &Token, arguments: &[Expression], ctx: &mut EvaluationContext<W>) -> EvaluationResult {
    let function = ctx.functions.get(name.spelling())
        .ok_or_else(|| RuntimeError::UndeclaredFunction { name: name.spelling().to_owned() })?;

    if function.parameters.len() != arguments.len() {
        return Err(RuntimeError::IncorrectArity {
            operator: name.spelling().to_owned(),
            expected: function.parameters.len().to_string(),
            found: arguments.len(),
        }.into());
    }

    // Arguments belong to the caller's scope
    let values = arguments.iter()
        .map(|argument| evaluate(argument, ctx))
        .collect::<SillyResult<Vec<Value>>>()?;

    debug!("calling {} with {} arguments", name, values.len());
    ctx.in_scope(ScopeKind::Function, |ctx| {
        for (parameter, value) in function.parameters.iter().zip(values) {
            ctx.memory.declare(parameter.spelling());
            ctx.memory.store(parameter.spelling(), value)?;
        }

        match execute_compound(&function.body, ctx)? {
            Flow::Returning(value) => Ok(value),
            Flow::Completed => Ok(Value::Boolean(true)),
        }
    })
}

pub(crate) fn evaluate<W: Write>(expression: &Expression, ctx: &mut EvaluationContext<W>) -> EvaluationResult {
    match expression {
        Expression::Simple(token) => evaluate_simple(token, ctx),
        Expression::List(elements) => Ok(Value::List(
            elements.iter()
                .map(|element| evaluate(element, ctx))
                .collect::<SillyResult<Vec<Value>>>()?
        )),
        Expression::Call { operator, arguments } if operator.kind() == TokenKind::Identifier => {
            call_user_function(operator, arguments, ctx)
        }
        Expression::Call { operator, arguments } => evaluate_builtin(operator, arguments, ctx),
    }
}
