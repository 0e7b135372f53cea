//! Symbol table: the declared type of every variable in a program.

use std::collections::HashMap;
use std::fmt;

use crate::error::TypeError;
use crate::span::Span;
use crate::types::oracle::TypeOracle;
use crate::types::type_repr::Type;
use crate::types::TypeResult;

/// What the checker knows about one declared variable.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableInfo {
    pub ty: Type,
    pub declared_at: Span,
}

/// Flat, program-wide variable table. The language has no nested scopes.
#[derive(Debug, Clone, Default)]
pub struct TypeEnvironment {
    variables: HashMap<String, VariableInfo>,
    order: Vec<String>,
}

impl TypeEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a variable; a second declaration of the same name fails.
    pub fn declare(&mut self, name: &str, ty: Type, span: Span) -> TypeResult<()> {
        if let Some(existing) = self.variables.get(name) {
            return Err(TypeError::already_declared(name, span, existing.declared_at));
        }
        self.variables.insert(
            name.to_string(),
            VariableInfo {
                ty,
                declared_at: span,
            },
        );
        self.order.push(name.to_string());
        Ok(())
    }

    /// Declared type of `name`, failing with "not declared".
    pub fn get(&self, name: &str, span: Span) -> TypeResult<Type> {
        self.variables
            .get(name)
            .map(|info| info.ty)
            .ok_or_else(|| TypeError::undeclared(name, span))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Variables in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &VariableInfo)> {
        self.order
            .iter()
            .filter_map(|name| self.variables.get(name).map(|info| (name.as_str(), info)))
    }
}

impl TypeOracle for TypeEnvironment {
    fn declared_type(&self, name: &str, span: Span) -> TypeResult<Type> {
        self.get(name, span)
    }
}

/// One line per variable: `name : type = default`.
impl fmt::Display for TypeEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, info) in self.iter() {
            writeln!(
                f,
                "{} : {} = {}",
                name,
                info.ty,
                info.ty.default_literal().unwrap_or("-")
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_declare_and_lookup() {
        let mut env = TypeEnvironment::new();
        env.declare("n", Type::Int, Span::line(1)).unwrap();
        env.declare("t", Type::String, Span::line(1)).unwrap();

        assert_eq!(env.get("n", Span::line(2)), Ok(Type::Int));
        assert_eq!(env.get("t", Span::line(2)), Ok(Type::String));
        assert_eq!(env.len(), 2);
    }

    #[test]
    fn test_redeclaration_fails() {
        let mut env = TypeEnvironment::new();
        env.declare("x", Type::Float, Span::line(1)).unwrap();
        let err = env.declare("x", Type::Int, Span::line(3)).unwrap_err();
        assert_eq!(err, TypeError::already_declared("x", Span::line(3), Span::line(1)));
        assert_eq!(env.get("x", Span::line(4)), Ok(Type::Float));
        assert_eq!(
            err.to_string(),
            "variable 'x' at 3:1 already declared at 1:1"
        );
    }

    #[test]
    fn test_undeclared_lookup_fails() {
        let env = TypeEnvironment::new();
        assert_eq!(
            env.get("missing", Span::line(7)),
            Err(TypeError::undeclared("missing", Span::line(7)))
        );
    }

    #[test]
    fn test_display_lists_defaults_in_order() {
        let mut env = TypeEnvironment::new();
        env.declare("b", Type::Bool, Span::line(1)).unwrap();
        env.declare("f", Type::Float, Span::line(1)).unwrap();
        env.declare("h", Type::File, Span::line(1)).unwrap();
        assert_eq!(
            env.to_string(),
            "b : bool = false\nf : float = 0.0\nh : file = -\n"
        );
    }
}
