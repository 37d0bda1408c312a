use core::fmt;
use std::{io::BufRead, rc::Rc};

use itertools::Itertools;

use crate::{error::{SillyError, SyntaxError}, lexer::{Token, TokenKind, TokenStream}};

type ParseResult<O> = Result<O, SillyError>;

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    /// A literal or an identifier
    Simple(Token),
    List(Vec<Expression>),
    /// Operator or user function applied to its arguments
    Call { operator: Token, arguments: Vec<Expression> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Compound {
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: Token,
    pub parameters: Vec<Token>,
    pub body: Compound,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Assignment { target: Token, value: Expression },
    Compound(Compound),
    If { condition: Expression, then_block: Compound, else_block: Compound },
    While { condition: Expression, body: Compound },
    Repeat { count: Expression, body: Compound },
    // Shared with the function registry once the declaration runs
    FunctionDecl(Rc<FunctionDecl>),
    Return(Expression),
    Print(Expression),
}

fn expect<R: BufRead>(tokens: &mut TokenStream<R>, spelling: &'static str, construct: &'static str) -> ParseResult<()> {
    let token = tokens.next()?;
    if !token.is(spelling) {
        return Err(SyntaxError::Malformed {
            construct,
            expected: spelling,
            found: token.spelling().to_owned(),
        }.into());
    }
    Ok(())
}

fn expect_identifier<R: BufRead>(tokens: &mut TokenStream<R>, what: &'static str) -> ParseResult<Token> {
    let token = tokens.next()?;
    if token.kind() != TokenKind::Identifier {
        return Err(SyntaxError::ExpectedIdentifier { what, found: token.spelling().to_owned() }.into());
    }
    Ok(token)
}

// Parses items until the closing delimiter, which is consumed
fn parse_until<R: BufRead, O>(
    tokens: &mut TokenStream<R>,
    closing: &str,
    parser: impl Fn(&mut TokenStream<R>) -> ParseResult<O>,
) -> ParseResult<Vec<O>> {
    let mut result = vec![];
    while !tokens.lookahead()?.is(closing) {
        result.push(parser(tokens)?);
    }
    tokens.next()?;
    Ok(result)
}

pub fn parse_expression<R: BufRead>(tokens: &mut TokenStream<R>) -> ParseResult<Expression> {
    let token = tokens.next()?;
    if token.is("(") {
        let operator = tokens.next()?;
        if !operator.kind().is_callable() {
            return Err(SyntaxError::ExpectedOperator { found: operator.spelling().to_owned() }.into());
        }
        let arguments = parse_until(tokens, ")", parse_expression)?;
        Ok(Expression::Call { operator, arguments })
    } else if token.is("[") {
        Ok(Expression::List(parse_until(tokens, "]", parse_expression)?))
    } else if token.kind() == TokenKind::Identifier || token.kind().is_literal() {
        Ok(Expression::Simple(token))
    } else {
        Err(SyntaxError::UnknownValue { token: token.spelling().to_owned() }.into())
    }
}

pub fn parse_compound<R: BufRead>(tokens: &mut TokenStream<R>) -> ParseResult<Compound> {
    expect(tokens, "{", "compound statement")?;
    let statements = parse_until(tokens, "}", parse_statement)?;
    Ok(Compound { statements })
}

fn parse_function_decl<R: BufRead>(tokens: &mut TokenStream<R>) -> ParseResult<FunctionDecl> {
    expect(tokens, "func", "function declaration")?;
    let name = expect_identifier(tokens, "Function name")?;
    expect(tokens, "(", "function declaration")?;
    let parameters = parse_until(tokens, ")", |tokens| expect_identifier(tokens, "Function parameter"))?;
    let body = parse_compound(tokens)?;
    Ok(FunctionDecl { name, parameters, body })
}

fn parse_assignment<R: BufRead>(tokens: &mut TokenStream<R>) -> ParseResult<Statement> {
    let target = tokens.next()?;
    if target.kind() != TokenKind::Identifier {
        return Err(SyntaxError::IllegalAssignmentTarget { token: target.spelling().to_owned() }.into());
    }
    expect(tokens, "=", "assignment statement")?;
    let value = parse_expression(tokens)?;
    Ok(Statement::Assignment { target, value })
}

/// Parses exactly one statement, selected by the next token.
pub fn parse_statement<R: BufRead>(tokens: &mut TokenStream<R>) -> ParseResult<Statement> {
    let first = tokens.lookahead()?.clone();
    match first.spelling() {
        "print" => {
            tokens.next()?;
            Ok(Statement::Print(parse_expression(tokens)?))
        }
        "if" => {
            tokens.next()?;
            let condition = parse_expression(tokens)?;
            let then_block = parse_compound(tokens)?;
            expect(tokens, "else", "if statement")?;
            let else_block = parse_compound(tokens)?;
            Ok(Statement::If { condition, then_block, else_block })
        }
        "while" => {
            tokens.next()?;
            let condition = parse_expression(tokens)?;
            Ok(Statement::While { condition, body: parse_compound(tokens)? })
        }
        "repeat" => {
            tokens.next()?;
            let count = parse_expression(tokens)?;
            Ok(Statement::Repeat { count, body: parse_compound(tokens)? })
        }
        "{" => Ok(Statement::Compound(parse_compound(tokens)?)),
        "func" => Ok(Statement::FunctionDecl(Rc::new(parse_function_decl(tokens)?))),
        "return" => {
            tokens.next()?;
            Ok(Statement::Return(parse_expression(tokens)?))
        }
        _ if first.kind() == TokenKind::Identifier => parse_assignment(tokens),
        _ => Err(SyntaxError::UnknownStatement { token: first.spelling().to_owned() }.into()),
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Simple(token) => write!(f, "{}", token),
            Self::List(elements) => write!(f, "[{}]", elements.iter().join(" ")),
            Self::Call { operator, arguments } if arguments.is_empty() => write!(f, "({})", operator),
            Self::Call { operator, arguments } => write!(f, "({} {})", operator, arguments.iter().join(" ")),
        }
    }
}

impl fmt::Display for Compound {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{{")?;
        for statement in &self.statements {
            // indent every line of nested statements
            for line in statement.to_string().lines() {
                writeln!(f, "  {}", line)?;
            }
        }
        write!(f, "}}")
    }
}

impl fmt::Display for FunctionDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "func {}({}) {}", self.name, self.parameters.iter().join(" "), self.body)
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Assignment { target, value } => write!(f, "{} = {}", target, value),
            Self::Compound(compound) => write!(f, "{}", compound),
            Self::If { condition, then_block, else_block } => {
                write!(f, "if {} {}\nelse {}", condition, then_block, else_block)
            }
            Self::While { condition, body } => write!(f, "while {} {}", condition, body),
            Self::Repeat { count, body } => write!(f, "repeat {} {}", count, body),
            Self::FunctionDecl(declaration) => write!(f, "{}", declaration),
            Self::Return(value) => write!(f, "return {}", value),
            Self::Print(value) => write!(f, "print {}", value),
        }
    }
}
