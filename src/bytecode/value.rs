//! Runtime values of the stack machine.

use std::fmt;

use crate::bytecode::instruction::{unquote_string, Kind};
use crate::error::RuntimeError;

/// A tagged runtime value. Every value on the operand stack or in the
/// variable store is one of these four kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    String(String),
}

impl Value {
    pub fn kind(&self) -> Kind {
        match self {
            Value::Int(_) => Kind::Int,
            Value::Float(_) => Kind::Float,
            Value::Bool(_) => Kind::Bool,
            Value::String(_) => Kind::String,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.kind().type_name()
    }

    /// Truth value used by `fjmp`. Floats are truncated toward zero and then
    /// tested like integers; strings have no truth value.
    pub fn is_truthy(&self) -> Option<bool> {
        match self {
            Value::Int(n) => Some(*n != 0),
            Value::Float(n) => Some(n.trunc() != 0.0),
            Value::Bool(b) => Some(*b),
            Value::String(_) => None,
        }
    }

    /// Decode the literal operand of a `push` instruction.
    pub fn from_literal(kind: Kind, literal: &str) -> Result<Value, RuntimeError> {
        let invalid = || RuntimeError::invalid_literal(kind.type_name(), literal);
        match kind {
            Kind::Int => literal.parse().map(Value::Int).map_err(|_| invalid()),
            Kind::Float => literal.parse().map(Value::Float).map_err(|_| invalid()),
            Kind::Bool => match literal {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                _ => Err(invalid()),
            },
            Kind::String => unquote_string(literal).map(Value::String).ok_or_else(invalid),
        }
    }

    /// Parse one line of program input for a `read` instruction.
    pub fn from_input(kind: Kind, line: &str) -> Result<Value, RuntimeError> {
        let invalid = || RuntimeError::InvalidInput {
            kind: kind.type_name().to_string(),
            input: line.to_string(),
        };
        let trimmed = line.trim();
        match kind {
            Kind::Int => trimmed.parse().map(Value::Int).map_err(|_| invalid()),
            Kind::Float => trimmed.parse().map(Value::Float).map_err(|_| invalid()),
            Kind::Bool => {
                if trimmed.eq_ignore_ascii_case("true") {
                    Ok(Value::Bool(true))
                } else if trimmed.eq_ignore_ascii_case("false") {
                    Ok(Value::Bool(false))
                } else {
                    Err(invalid())
                }
            }
            Kind::String => Ok(Value::String(line.to_string())),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            // Whole floats keep a fractional digit so they never print as ints.
            Value::Float(n) if n.is_finite() && n.fract() == 0.0 => write!(f, "{:.1}", n),
            Value::Float(n) => write!(f, "{}", n),
            Value::Bool(b) => write!(f, "{}", b),
            Value::String(s) => write!(f, "{}", s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_display_keeps_fraction() {
        assert_eq!(Value::Float(3.0).to_string(), "3.0");
        assert_eq!(Value::Float(0.5).to_string(), "0.5");
        assert_eq!(Value::Float(-2.0).to_string(), "-2.0");
        assert_eq!(Value::Int(3).to_string(), "3");
    }

    #[test]
    fn test_truthiness() {
        assert_eq!(Value::Int(0).is_truthy(), Some(false));
        assert_eq!(Value::Int(-4).is_truthy(), Some(true));
        assert_eq!(Value::Float(0.7).is_truthy(), Some(false));
        assert_eq!(Value::Float(1.2).is_truthy(), Some(true));
        assert_eq!(Value::Bool(false).is_truthy(), Some(false));
        assert_eq!(Value::String("x".into()).is_truthy(), None);
    }

    #[test]
    fn test_literals() {
        assert_eq!(Value::from_literal(Kind::Int, "-12").unwrap(), Value::Int(-12));
        assert_eq!(Value::from_literal(Kind::Float, "1e-7").unwrap(), Value::Float(1e-7));
        assert_eq!(
            Value::from_literal(Kind::String, "\"a b\"").unwrap(),
            Value::String("a b".into())
        );
        assert!(matches!(
            Value::from_literal(Kind::Bool, "yes"),
            Err(RuntimeError::InvalidLiteral { .. })
        ));
    }

    #[test]
    fn test_input_parsing() {
        assert_eq!(Value::from_input(Kind::Int, " 42 ").unwrap(), Value::Int(42));
        assert_eq!(Value::from_input(Kind::Bool, "TRUE").unwrap(), Value::Bool(true));
        assert_eq!(
            Value::from_input(Kind::String, "  padded ").unwrap(),
            Value::String("  padded ".into())
        );
        assert!(matches!(
            Value::from_input(Kind::Float, "abc"),
            Err(RuntimeError::InvalidInput { .. })
        ));
    }
}
