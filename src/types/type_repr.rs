//! Static types and the operator typing rules shared by the checker and the oracle.

use std::fmt;

use crate::ast::{BinaryOp, UnaryOp};

/// Static type of a variable or expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    /// Primitive integer type
    Int,
    /// Primitive float type
    Float,
    /// Primitive boolean type
    Bool,
    /// Primitive string type
    String,
    /// File handle; can be declared but has no runtime value kind
    File,
}

impl Type {
    /// Resolve a declaration keyword.
    pub fn from_keyword(keyword: &str) -> Option<Type> {
        match keyword {
            "int" => Some(Type::Int),
            "float" => Some(Type::Float),
            "bool" => Some(Type::Bool),
            "string" => Some(Type::String),
            "file" => Some(Type::File),
            _ => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Type::Int | Type::Float)
    }

    pub fn is_primitive(&self) -> bool {
        matches!(self, Type::Int | Type::Float | Type::Bool | Type::String)
    }

    /// Int widens to Float; every other assignment needs identical types.
    pub fn is_assignable_to(&self, target: &Type) -> bool {
        self == target || matches!((self, target), (Type::Int, Type::Float))
    }

    /// Source text of the value a declaration initializes to.
    pub fn default_literal(&self) -> Option<&'static str> {
        match self {
            Type::Int => Some("0"),
            Type::Float => Some("0.0"),
            Type::Bool => Some("false"),
            Type::String => Some("\"\""),
            Type::File => None,
        }
    }

    /// Result type of a binary operator, `None` when the combination is illegal.
    pub fn binary_result(operator: BinaryOp, left: Type, right: Type) -> Option<Type> {
        match operator {
            BinaryOp::Add | BinaryOp::Subtract | BinaryOp::Multiply | BinaryOp::Divide => {
                Type::numeric_result(left, right)
            }
            BinaryOp::Modulo => (left == Type::Int && right == Type::Int).then_some(Type::Int),
            BinaryOp::Concat => {
                (left == Type::String && right == Type::String).then_some(Type::String)
            }
            BinaryOp::Equal | BinaryOp::NotEqual => {
                let comparable = (left.is_numeric() && right.is_numeric())
                    || (left == right && left.is_primitive());
                comparable.then_some(Type::Bool)
            }
            BinaryOp::Less | BinaryOp::LessEqual | BinaryOp::Greater | BinaryOp::GreaterEqual => {
                (left.is_numeric() && right.is_numeric()).then_some(Type::Bool)
            }
        }
    }

    /// Result type of a unary operator, `None` when the operand is illegal.
    pub fn unary_result(operator: UnaryOp, operand: Type) -> Option<Type> {
        match operator {
            UnaryOp::Negate => operand.is_numeric().then_some(operand),
            UnaryOp::Not => (operand == Type::Bool).then_some(Type::Bool),
        }
    }

    /// Result type of `&&` and `||`.
    pub fn logical_result(left: Type, right: Type) -> Option<Type> {
        (left == Type::Bool && right == Type::Bool).then_some(Type::Bool)
    }

    fn numeric_result(left: Type, right: Type) -> Option<Type> {
        if !(left.is_numeric() && right.is_numeric()) {
            return None;
        }
        if left == Type::Float || right == Type::Float {
            Some(Type::Float)
        } else {
            Some(Type::Int)
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => write!(f, "int"),
            Type::Float => write!(f, "float"),
            Type::Bool => write!(f, "bool"),
            Type::String => write!(f, "string"),
            Type::File => write!(f, "file"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_widening() {
        assert_eq!(
            Type::binary_result(BinaryOp::Add, Type::Int, Type::Float),
            Some(Type::Float)
        );
        assert_eq!(
            Type::binary_result(BinaryOp::Multiply, Type::Int, Type::Int),
            Some(Type::Int)
        );
        assert_eq!(
            Type::binary_result(BinaryOp::Subtract, Type::String, Type::Int),
            None
        );
    }

    #[test]
    fn test_modulo_and_concat_are_strict() {
        assert_eq!(
            Type::binary_result(BinaryOp::Modulo, Type::Float, Type::Int),
            None
        );
        assert_eq!(
            Type::binary_result(BinaryOp::Concat, Type::String, Type::String),
            Some(Type::String)
        );
        assert_eq!(
            Type::binary_result(BinaryOp::Concat, Type::String, Type::Int),
            None
        );
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(
            Type::binary_result(BinaryOp::Equal, Type::Int, Type::Float),
            Some(Type::Bool)
        );
        assert_eq!(
            Type::binary_result(BinaryOp::NotEqual, Type::Bool, Type::Bool),
            Some(Type::Bool)
        );
        assert_eq!(
            Type::binary_result(BinaryOp::Equal, Type::String, Type::Int),
            None
        );
        assert_eq!(
            Type::binary_result(BinaryOp::Less, Type::String, Type::String),
            None
        );
        assert_eq!(
            Type::binary_result(BinaryOp::Equal, Type::File, Type::File),
            None
        );
    }

    #[test]
    fn test_assignability() {
        assert!(Type::Int.is_assignable_to(&Type::Float));
        assert!(!Type::Float.is_assignable_to(&Type::Int));
        assert!(Type::Bool.is_assignable_to(&Type::Bool));
        assert!(!Type::String.is_assignable_to(&Type::Bool));
    }

    #[test]
    fn test_keywords() {
        assert_eq!(Type::from_keyword("float"), Some(Type::Float));
        assert_eq!(Type::from_keyword("file"), Some(Type::File));
        assert_eq!(Type::from_keyword("double"), None);
        assert_eq!(Type::File.default_literal(), None);
    }
}
