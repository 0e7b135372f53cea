//! Statement type checking.

use crate::ast::*;
use crate::error::TypeError;
use crate::types::type_repr::Type;
use crate::types::TypeResult;

use super::TypeChecker;

impl TypeChecker {
    pub(crate) fn check_stmt(&mut self, stmt: &Stmt) -> TypeResult<()> {
        match &stmt.kind {
            StmtKind::Declaration {
                type_annotation,
                names,
            } => {
                let declared_type = self.resolve_type(type_annotation)?;
                for name in names {
                    if let Err(e) = self.env.declare(name, declared_type, stmt.span) {
                        self.errors.push(e);
                    }
                }
                Ok(())
            }

            StmtKind::Expression(expr) => {
                self.check_expr(expr)?;
                Ok(())
            }

            StmtKind::Block(statements) => {
                for s in statements {
                    if let Err(e) = self.check_stmt(s) {
                        self.errors.push(e);
                    }
                }
                Ok(())
            }

            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.check_condition(condition, "if statement");
                self.check_nested(then_branch);
                if let Some(else_br) = else_branch {
                    self.check_nested(else_br);
                }
                Ok(())
            }

            StmtKind::While { condition, body } => {
                self.check_condition(condition, "while loop");
                self.check_nested(body);
                Ok(())
            }

            StmtKind::For {
                init,
                condition,
                update,
                body,
            } => {
                if let Some(init) = init {
                    self.check_for_clause(init, "initializer");
                }
                if let Some(condition) = condition {
                    self.check_condition(condition, "for loop");
                }
                if let Some(update) = update {
                    self.check_for_clause(update, "update");
                }
                self.check_nested(body);
                Ok(())
            }

            StmtKind::Read(names) => {
                for name in names {
                    match self.env.get(name, stmt.span) {
                        Ok(ty) if !ty.is_primitive() => self.errors.push(TypeError::general(
                            format!("variable '{}' has unsupported type for read: {}", name, ty),
                            stmt.span,
                        )),
                        Ok(_) => {}
                        Err(e) => self.errors.push(e),
                    }
                }
                Ok(())
            }

            StmtKind::Write(exprs) => {
                for expr in exprs {
                    match self.check_expr(expr) {
                        Ok(ty) if !ty.is_primitive() => self.errors.push(TypeError::general(
                            format!("cannot write a value of type {}", ty),
                            expr.span,
                        )),
                        Ok(_) => {}
                        Err(e) => self.errors.push(e),
                    }
                }
                Ok(())
            }

            StmtKind::Empty => Ok(()),
        }
    }

    fn check_nested(&mut self, stmt: &Stmt) {
        if let Err(e) = self.check_stmt(stmt) {
            self.errors.push(e);
        }
    }

    fn check_condition(&mut self, condition: &Expr, context: &str) {
        match self.check_expr(condition) {
            Ok(Type::Bool) => {}
            Ok(other) => self.errors.push(TypeError::general(
                format!("condition in {} must be bool, got {}", context, other),
                condition.span,
            )),
            Err(e) => self.errors.push(e),
        }
    }

    fn check_for_clause(&mut self, clause: &Expr, name: &str) {
        if !matches!(clause.kind, ExprKind::Assign { .. }) {
            self.errors.push(TypeError::general(
                format!("{} of a for loop must be an assignment", name),
                clause.span,
            ));
            return;
        }
        if let Err(e) = self.check_expr(clause) {
            self.errors.push(e);
        }
    }
}
