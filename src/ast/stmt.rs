//! Statement AST nodes.

use crate::ast::expr::Expr;
use crate::ast::types::TypeAnnotation;
use crate::span::Span;

/// A complete program: a flat list of top-level statements.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

impl Program {
    pub fn new(statements: Vec<Stmt>) -> Self {
        Self { statements }
    }
}

/// A statement in the AST.
#[derive(Debug, Clone, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Replace the span of an already built statement.
    pub fn at(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn declare<I, S>(type_name: &str, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            StmtKind::Declaration {
                type_annotation: TypeAnnotation::named(type_name),
                names: names.into_iter().map(Into::into).collect(),
            },
            Span::default(),
        )
    }

    pub fn expression(expr: Expr) -> Self {
        Self::new(StmtKind::Expression(expr), Span::default())
    }

    pub fn block(statements: Vec<Stmt>) -> Self {
        Self::new(StmtKind::Block(statements), Span::default())
    }

    pub fn if_else(condition: Expr, then_branch: Stmt, else_branch: Option<Stmt>) -> Self {
        Self::new(
            StmtKind::If {
                condition,
                then_branch: Box::new(then_branch),
                else_branch: else_branch.map(Box::new),
            },
            Span::default(),
        )
    }

    pub fn while_loop(condition: Expr, body: Stmt) -> Self {
        Self::new(
            StmtKind::While {
                condition,
                body: Box::new(body),
            },
            Span::default(),
        )
    }

    pub fn for_loop(
        init: Option<Expr>,
        condition: Option<Expr>,
        update: Option<Expr>,
        body: Stmt,
    ) -> Self {
        Self::new(
            StmtKind::For {
                init,
                condition,
                update,
                body: Box::new(body),
            },
            Span::default(),
        )
    }

    pub fn read<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            StmtKind::Read(names.into_iter().map(Into::into).collect()),
            Span::default(),
        )
    }

    pub fn write(exprs: Vec<Expr>) -> Self {
        Self::new(StmtKind::Write(exprs), Span::default())
    }
}

/// Statement variants.
#[derive(Debug, Clone, PartialEq)]
pub enum StmtKind {
    /// Variable declaration: int a, b, c;
    Declaration {
        type_annotation: TypeAnnotation,
        names: Vec<String>,
    },

    /// Expression statement: expr;
    Expression(Expr),

    /// Block: { statements }
    Block(Vec<Stmt>),

    /// If statement: if (cond) stmt else stmt
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },

    /// While loop: while (cond) stmt
    While { condition: Expr, body: Box<Stmt> },

    /// For loop: for (i = 0; i < n; i = i + 1) stmt
    ///
    /// `init` and `update` must be assignments to a named variable.
    For {
        init: Option<Expr>,
        condition: Option<Expr>,
        update: Option<Expr>,
        body: Box<Stmt>,
    },

    /// Input statement: read a, b;
    Read(Vec<String>),

    /// Output statement: write e1, e2;
    Write(Vec<Expr>),

    /// Empty statement: ;
    Empty,
}
