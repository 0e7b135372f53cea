//! Abstract Syntax Tree consumed by the type checker and the code generator.

pub mod expr;
pub mod stmt;
pub mod types;

pub use expr::{BinaryOp, Expr, ExprKind, UnaryOp};
pub use stmt::{Program, Stmt, StmtKind};
pub use types::TypeAnnotation;
