//! The interface the code generator uses to ask for static types.

use crate::ast::{Expr, ExprKind};
use crate::error::TypeError;
use crate::span::Span;
use crate::types::type_repr::Type;
use crate::types::TypeResult;

/// Source of static type information for the code generator.
///
/// Only `declared_type` must be provided. `type_of` infers the type of an
/// expression subtree from declared types alone, without emitting anything,
/// so the generator can decide on promotions before visiting an operand.
pub trait TypeOracle {
    /// Declared type of a variable, or "not declared".
    fn declared_type(&self, name: &str, span: Span) -> TypeResult<Type>;

    /// Static type of an expression, or the first typing error found in it.
    fn type_of(&self, expr: &Expr) -> TypeResult<Type> {
        infer(self, expr)
    }
}

fn infer<O: TypeOracle + ?Sized>(oracle: &O, expr: &Expr) -> TypeResult<Type> {
    match &expr.kind {
        ExprKind::IntLiteral(_) => Ok(Type::Int),
        ExprKind::FloatLiteral(_) => Ok(Type::Float),
        ExprKind::StringLiteral(_) => Ok(Type::String),
        ExprKind::BoolLiteral(_) => Ok(Type::Bool),
        ExprKind::Variable(name) => oracle.declared_type(name, expr.span),
        ExprKind::Grouping(inner) => infer(oracle, inner),
        ExprKind::Assign { target, .. } => oracle.declared_type(target, expr.span),
        ExprKind::Binary {
            left,
            operator,
            right,
        } => {
            let left_type = infer(oracle, left)?;
            let right_type = infer(oracle, right)?;
            Type::binary_result(*operator, left_type, right_type).ok_or_else(|| {
                TypeError::invalid_operands(operator, left_type, right_type, expr.span)
            })
        }
        ExprKind::Unary { operator, operand } => {
            let operand_type = infer(oracle, operand)?;
            Type::unary_result(*operator, operand_type)
                .ok_or_else(|| TypeError::invalid_operand(operator, operand_type, expr.span))
        }
        ExprKind::LogicalAnd { left, right } | ExprKind::LogicalOr { left, right } => {
            let left_type = infer(oracle, left)?;
            let right_type = infer(oracle, right)?;
            let operator = if matches!(expr.kind, ExprKind::LogicalAnd { .. }) {
                "&&"
            } else {
                "||"
            };
            Type::logical_result(left_type, right_type).ok_or_else(|| {
                TypeError::invalid_operands(operator, left_type, right_type, expr.span)
            })
        }
    }
}
