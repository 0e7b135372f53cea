//! Type checker: builds the symbol table and rejects ill-typed programs
//! before they reach the code generator.

mod expressions;
mod statements;

use crate::ast::*;
use crate::error::TypeError;
use crate::types::environment::TypeEnvironment;
use crate::types::type_repr::Type;
use crate::types::TypeResult;

/// The type checker verifies type correctness of programs.
pub struct TypeChecker {
    pub(crate) env: TypeEnvironment,
    pub(crate) errors: Vec<TypeError>,
}

impl TypeChecker {
    pub fn new() -> Self {
        Self {
            env: TypeEnvironment::new(),
            errors: Vec::new(),
        }
    }

    /// Type check a complete program, collecting every error found.
    pub fn check(&mut self, program: &Program) -> Result<(), Vec<TypeError>> {
        for stmt in &program.statements {
            if let Err(e) = self.check_stmt(stmt) {
                self.errors.push(e);
            }
        }

        tracing::debug!(
            variables = self.env.len(),
            errors = self.errors.len(),
            "type check finished"
        );

        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(std::mem::take(&mut self.errors))
        }
    }

    /// The symbol table built so far.
    pub fn environment(&self) -> &TypeEnvironment {
        &self.env
    }

    pub fn into_environment(self) -> TypeEnvironment {
        self.env
    }

    pub(crate) fn resolve_type(&self, annotation: &TypeAnnotation) -> TypeResult<Type> {
        Type::from_keyword(&annotation.name)
            .ok_or_else(|| TypeError::UnknownType(annotation.name.clone(), annotation.span))
    }
}

impl Default for TypeChecker {
    fn default() -> Self {
        Self::new()
    }
}
