#![no_main]

use core::fmt;

use itertools::Itertools;
use libfuzzer_sys::{arbitrary::Arbitrary, fuzz_target};

// Literals and variable loads
#[derive(Arbitrary, Debug)]
enum SillyAtom {
    True, False,
    Number(f64),
    Character(char),
    Text(String),
    Variable(u8),
}

fn variable_name(index: u8) -> String {
    format!("v{}", index % 8)
}

impl fmt::Display for SillyAtom {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SillyAtom::True => write!(f, "true"),
            SillyAtom::False => write!(f, "false"),
            SillyAtom::Number(value) if value.is_finite() => write!(f, "{}", value),
            SillyAtom::Number(_) => write!(f, "0"),
            SillyAtom::Character(c) if c.is_alphanumeric() => write!(f, "'{}'", c),
            SillyAtom::Character(_) => write!(f, "'_'"),
            SillyAtom::Text(text) => {
                let text: String = text.chars().filter(|c| *c != '"' && !c.is_whitespace()).collect();
                write!(f, "\"{}\"", text)
            }
            SillyAtom::Variable(index) => f.write_str(&variable_name(*index)),
        }
    }
}

#[derive(Arbitrary, Debug)]
enum SillyOperator {
    Add, Mul, Div,
    Eq, Ne, Less, LessEq, Greater, GreaterEq,
    And, Or, Not,
    Len, Get, Cat, Str,
}

impl fmt::Display for SillyOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            SillyOperator::Add => "+",
            SillyOperator::Mul => "*",
            SillyOperator::Div => "/",
            SillyOperator::Eq => "==",
            SillyOperator::Ne => "!=",
            SillyOperator::Less => "<",
            SillyOperator::LessEq => "<=",
            SillyOperator::Greater => ">",
            SillyOperator::GreaterEq => ">=",
            SillyOperator::And => "and",
            SillyOperator::Or => "or",
            SillyOperator::Not => "not",
            SillyOperator::Len => "len",
            SillyOperator::Get => "get",
            SillyOperator::Cat => "cat",
            SillyOperator::Str => "str",
        })
    }
}

#[derive(Arbitrary, Debug)]
enum SillyExpression {
    Atom(SillyAtom),
    List(Vec<SillyExpression>),
    Call(SillyOperator, Vec<SillyExpression>),
}

impl fmt::Display for SillyExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SillyExpression::Atom(atom) => write!(f, "{}", atom),
            SillyExpression::List(items) => write!(f, "[{}]", items.iter().join(" ")),
            SillyExpression::Call(operator, arguments) => write!(f, "({} {})", operator, arguments.iter().join(" ")),
        }
    }
}

// No loops over conditions or function declarations, so every program terminates
#[derive(Arbitrary, Debug)]
enum SillyStatement {
    Assign(u8, SillyExpression),
    Print(SillyExpression),
    If(SillyExpression, Vec<SillyStatement>, Vec<SillyStatement>),
    Repeat(u8, Vec<SillyStatement>),
    Block(Vec<SillyStatement>),
    Return(SillyExpression),
}

fn block(statements: &[SillyStatement]) -> String {
    format!("{{ {} }}", statements.iter().join(" "))
}

impl fmt::Display for SillyStatement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SillyStatement::Assign(index, value) => write!(f, "{} = {}", variable_name(*index), value),
            SillyStatement::Print(value) => write!(f, "print {}", value),
            SillyStatement::If(condition, then_block, else_block) => {
                write!(f, "if {} {} else {}", condition, block(then_block), block(else_block))
            }
            SillyStatement::Repeat(count, body) => write!(f, "repeat {} {}", count % 4, block(body)),
            SillyStatement::Block(body) => f.write_str(&block(body)),
            SillyStatement::Return(value) => write!(f, "return {}", value),
        }
    }
}

fuzz_target!(|statements: Vec<SillyStatement>| {
    let program = statements.iter().join("\n");
    let mut context = silly::EvaluationContext::with_output(std::io::sink());
    let _ = context.evaluate_str(&program);
    assert_eq!(context.memory().depth(), 1);
});
