//! Expression AST nodes.

use crate::span::Span;

/// An expression in the AST.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Replace the span of an already built expression.
    pub fn at(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn int(value: i64) -> Self {
        Self::new(ExprKind::IntLiteral(value), Span::default())
    }

    pub fn float(value: f64) -> Self {
        Self::new(ExprKind::FloatLiteral(value), Span::default())
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::new(ExprKind::StringLiteral(value.into()), Span::default())
    }

    pub fn bool(value: bool) -> Self {
        Self::new(ExprKind::BoolLiteral(value), Span::default())
    }

    pub fn variable(name: impl Into<String>) -> Self {
        Self::new(ExprKind::Variable(name.into()), Span::default())
    }

    pub fn binary(left: Expr, operator: BinaryOp, right: Expr) -> Self {
        Self::new(
            ExprKind::Binary {
                left: Box::new(left),
                operator,
                right: Box::new(right),
            },
            Span::default(),
        )
    }

    pub fn unary(operator: UnaryOp, operand: Expr) -> Self {
        Self::new(
            ExprKind::Unary {
                operator,
                operand: Box::new(operand),
            },
            Span::default(),
        )
    }

    pub fn and(left: Expr, right: Expr) -> Self {
        Self::new(
            ExprKind::LogicalAnd {
                left: Box::new(left),
                right: Box::new(right),
            },
            Span::default(),
        )
    }

    pub fn or(left: Expr, right: Expr) -> Self {
        Self::new(
            ExprKind::LogicalOr {
                left: Box::new(left),
                right: Box::new(right),
            },
            Span::default(),
        )
    }

    pub fn grouping(inner: Expr) -> Self {
        Self::new(ExprKind::Grouping(Box::new(inner)), Span::default())
    }

    pub fn assign(target: impl Into<String>, value: Expr) -> Self {
        Self::new(
            ExprKind::Assign {
                target: target.into(),
                value: Box::new(value),
            },
            Span::default(),
        )
    }
}

/// All expression variants.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    /// Integer literal: 42
    IntLiteral(i64),
    /// Float literal: 3.14
    FloatLiteral(f64),
    /// String literal: "hello"
    StringLiteral(String),
    /// Boolean literal: true, false
    BoolLiteral(bool),

    /// Variable reference: foo
    Variable(String),

    /// Binary operation: a + b
    Binary {
        left: Box<Expr>,
        operator: BinaryOp,
        right: Box<Expr>,
    },

    /// Unary operation: -x, !x
    Unary {
        operator: UnaryOp,
        operand: Box<Expr>,
    },

    /// Grouping expression: (expr)
    Grouping(Box<Expr>),

    /// Assignment expression: x = 5, right associative
    Assign { target: String, value: Box<Expr> },

    /// Logical and: a && b (both sides always evaluated)
    LogicalAnd { left: Box<Expr>, right: Box<Expr> },

    /// Logical or: a || b (both sides always evaluated)
    LogicalOr { left: Box<Expr>, right: Box<Expr> },
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    /// String concatenation: a . b
    Concat,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

impl std::fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BinaryOp::Add => write!(f, "+"),
            BinaryOp::Subtract => write!(f, "-"),
            BinaryOp::Multiply => write!(f, "*"),
            BinaryOp::Divide => write!(f, "/"),
            BinaryOp::Modulo => write!(f, "%"),
            BinaryOp::Concat => write!(f, "."),
            BinaryOp::Equal => write!(f, "=="),
            BinaryOp::NotEqual => write!(f, "!="),
            BinaryOp::Less => write!(f, "<"),
            BinaryOp::LessEqual => write!(f, "<="),
            BinaryOp::Greater => write!(f, ">"),
            BinaryOp::GreaterEqual => write!(f, ">="),
        }
    }
}

/// Unary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    Negate,
    Not,
}

impl std::fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnaryOp::Negate => write!(f, "-"),
            UnaryOp::Not => write!(f, "!"),
        }
    }
}
