use core::fmt;
use std::cmp::Ordering;

use itertools::Itertools;

use crate::error::RuntimeError;

/// Tag of a runtime value. Comparisons are only defined within one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Number,
    Boolean,
    Character,
    List,
    String,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Character => "character",
            Self::List => "list",
            Self::String => "string",
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(f64),
    Boolean(bool),
    Character(char),
    List(Vec<Value>),
    String(Vec<char>),
}

impl Value {
    /// Bound under a function's name when it is declared, so the name reads as taken.
    pub const FUNCTION_MARKER: Value = Value::Boolean(true);

    pub fn string(text: &str) -> Self {
        Self::String(text.chars().collect())
    }

    pub fn kind(&self) -> Kind {
        match self {
            Self::Number(_) => Kind::Number,
            Self::Boolean(_) => Kind::Boolean,
            Self::Character(_) => Kind::Character,
            Self::List(_) => Kind::List,
            Self::String(_) => Kind::String,
        }
    }

    /// Orders two values of the same kind.
    ///
    /// Lists are ordered by their rendered text rather than element by element.
    pub fn compare(&self, other: &Self) -> Result<Ordering, RuntimeError> {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => Ok(a.total_cmp(b)),
            (Self::Boolean(a), Self::Boolean(b)) => Ok(a.cmp(b)),
            (Self::Character(a), Self::Character(b)) => Ok(a.cmp(b)),
            (Self::String(a), Self::String(b)) => Ok(a.cmp(b)),
            (Self::List(_), Self::List(_)) => Ok(self.to_string().cmp(&other.to_string())),
            _ => Err(RuntimeError::ComparisonMismatch { left: self.kind(), right: other.kind() }),
        }
    }
}

fn render_number(f: &mut fmt::Formatter<'_>, number: f64) -> fmt::Result {
    if number == 0.0 {
        // no "-0"
        return f.write_str("0");
    }
    write!(f, "{}", number)
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(number) => render_number(f, *number),
            Self::Boolean(boolean) => write!(f, "{}", boolean),
            Self::Character(character) => write!(f, "{}", character),
            Self::String(characters) => characters.iter().try_for_each(|c| write!(f, "{}", c)),
            Self::List(elements) => {
                let elements = elements
                    .iter()
                    .map(|element| match element {
                        Self::String(_) => format!("\"{}\"", element),
                        Self::Character(_) => format!("'{}'", element),
                        _ => element.to_string(),
                    })
                    .join(" ");
                write!(f, "[{}]", elements)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_numbers() {
        assert_eq!(Value::Number(42.0).to_string(), "42");
        assert_eq!(Value::Number(3.5).to_string(), "3.5");
        assert_eq!(Value::Number(-7.0).to_string(), "-7");
        assert_eq!(Value::Number(-0.0).to_string(), "0");
        assert_eq!(Value::Number(0.1).to_string(), "0.1");
        assert_eq!(Value::Number(f64::INFINITY).to_string(), "inf");
    }

    #[test]
    fn renders_lists_with_quoted_text() {
        let list = Value::List(vec![
            Value::Number(1.0),
            Value::string("ab"),
            Value::Character('c'),
            Value::Boolean(false),
            Value::List(vec![]),
        ]);
        assert_eq!(list.to_string(), "[1 \"ab\" 'c' false []]");
        assert_eq!(Value::List(vec![]).to_string(), "[]");
    }

    #[test]
    fn renders_strings_bare() {
        assert_eq!(Value::string("hello world").to_string(), "hello world");
        assert_eq!(Value::string("").to_string(), "");
    }

    #[test]
    fn compares_within_kind() {
        assert_eq!(Value::Number(1.0).compare(&Value::Number(2.0)), Ok(Ordering::Less));
        assert_eq!(Value::Boolean(true).compare(&Value::Boolean(false)), Ok(Ordering::Greater));
        assert_eq!(Value::Character('a').compare(&Value::Character('a')), Ok(Ordering::Equal));
        assert_eq!(Value::string("abc").compare(&Value::string("abd")), Ok(Ordering::Less));
    }

    #[test]
    fn compares_lists_by_rendering() {
        // "[10]" sorts before "[9]" as text
        let ten = Value::List(vec![Value::Number(10.0)]);
        let nine = Value::List(vec![Value::Number(9.0)]);
        assert_eq!(ten.compare(&nine), Ok(Ordering::Less));
    }

    #[test]
    fn rejects_mixed_kinds() {
        assert_eq!(
            Value::Number(1.0).compare(&Value::string("1")),
            Err(RuntimeError::ComparisonMismatch { left: Kind::Number, right: Kind::String })
        );
    }
}
