//! Expression type checking.

use crate::ast::*;
use crate::error::TypeError;
use crate::types::type_repr::Type;
use crate::types::TypeResult;

use super::TypeChecker;

impl TypeChecker {
    pub(crate) fn check_expr(&mut self, expr: &Expr) -> TypeResult<Type> {
        match &expr.kind {
            ExprKind::IntLiteral(_) => Ok(Type::Int),
            ExprKind::FloatLiteral(_) => Ok(Type::Float),
            ExprKind::StringLiteral(_) => Ok(Type::String),
            ExprKind::BoolLiteral(_) => Ok(Type::Bool),

            ExprKind::Variable(name) => self.env.get(name, expr.span),

            ExprKind::Grouping(inner) => self.check_expr(inner),

            ExprKind::Assign { target, value } => {
                let target_type = self.env.get(target, expr.span)?;
                let value_type = self.check_expr(value)?;
                if !value_type.is_assignable_to(&target_type) {
                    return Err(TypeError::Mismatch {
                        name: target.clone(),
                        expected: target_type,
                        found: value_type,
                        span: expr.span,
                    });
                }
                Ok(target_type)
            }

            ExprKind::Binary {
                left,
                operator,
                right,
            } => {
                let left_type = self.check_expr(left)?;
                let right_type = self.check_expr(right)?;
                Type::binary_result(*operator, left_type, right_type).ok_or_else(|| {
                    TypeError::invalid_operands(operator, left_type, right_type, expr.span)
                })
            }

            ExprKind::Unary { operator, operand } => {
                let operand_type = self.check_expr(operand)?;
                Type::unary_result(*operator, operand_type)
                    .ok_or_else(|| TypeError::invalid_operand(operator, operand_type, expr.span))
            }

            ExprKind::LogicalAnd { left, right } => self.check_logical("&&", expr, left, right),
            ExprKind::LogicalOr { left, right } => self.check_logical("||", expr, left, right),
        }
    }

    fn check_logical(
        &mut self,
        operator: &str,
        expr: &Expr,
        left: &Expr,
        right: &Expr,
    ) -> TypeResult<Type> {
        let left_type = self.check_expr(left)?;
        let right_type = self.check_expr(right)?;
        Type::logical_result(left_type, right_type)
            .ok_or_else(|| TypeError::invalid_operands(operator, left_type, right_type, expr.span))
    }
}
