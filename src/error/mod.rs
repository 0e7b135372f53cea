//! Error types for all phases: type checking, code generation,
//! instruction text parsing and execution.

use crate::span::Span;
use crate::types::Type;
use thiserror::Error;

/// Type checking errors, also raised by the type oracle.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TypeError {
    #[error("variable '{name}' at {span} already declared at {previous}")]
    AlreadyDeclared {
        name: String,
        span: Span,
        previous: Span,
    },

    #[error("variable '{0}' not declared at {1}")]
    UndeclaredVariable(String, Span),

    #[error("unknown type '{0}' at {1}")]
    UnknownType(String, Span),

    #[error("variable '{name}' type is {expected}, but the assigned value is {found} at {span}")]
    Mismatch {
        name: String,
        expected: Type,
        found: Type,
        span: Span,
    },

    #[error("invalid operands for '{operator}': {left}, {right} at {span}")]
    InvalidOperands {
        operator: String,
        left: Type,
        right: Type,
        span: Span,
    },

    #[error("invalid operand for '{operator}': {operand} at {span}")]
    InvalidOperand {
        operator: String,
        operand: Type,
        span: Span,
    },

    #[error("{message} at {span}")]
    General { message: String, span: Span },
}

impl TypeError {
    pub fn already_declared(name: impl Into<String>, span: Span, previous: Span) -> Self {
        Self::AlreadyDeclared {
            name: name.into(),
            span,
            previous,
        }
    }

    pub fn undeclared(name: impl Into<String>, span: Span) -> Self {
        Self::UndeclaredVariable(name.into(), span)
    }

    pub fn invalid_operands(
        operator: impl std::fmt::Display,
        left: Type,
        right: Type,
        span: Span,
    ) -> Self {
        Self::InvalidOperands {
            operator: operator.to_string(),
            left,
            right,
            span,
        }
    }

    pub fn invalid_operand(operator: impl std::fmt::Display, operand: Type, span: Span) -> Self {
        Self::InvalidOperand {
            operator: operator.to_string(),
            operand,
            span,
        }
    }

    pub fn general(message: impl Into<String>, span: Span) -> Self {
        Self::General {
            message: message.into(),
            span,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Self::AlreadyDeclared { span, .. } => *span,
            Self::UndeclaredVariable(_, span) => *span,
            Self::UnknownType(_, span) => *span,
            Self::Mismatch { span, .. } => *span,
            Self::InvalidOperands { span, .. } => *span,
            Self::InvalidOperand { span, .. } => *span,
            Self::General { span, .. } => *span,
        }
    }
}

/// Code generation errors.
///
/// A well-typed program never produces one of these; they mean the tree
/// reached the generator without passing the checker.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    #[error("variable '{0}' not declared at {1}")]
    UndeclaredVariable(String, Span),

    #[error("cannot assign {found} to '{name}' of type {expected} at {span}")]
    TypeMismatch {
        name: String,
        expected: Type,
        found: Type,
        span: Span,
    },

    #[error("operator '{operator}' is not defined for {operands} at {span}")]
    UnsupportedOperator {
        operator: String,
        operands: String,
        span: Span,
    },

    #[error("unknown type '{0}' at {1}")]
    UnknownType(String, Span),

    #[error("type {0} has no runtime representation at {1}")]
    UnsupportedType(Type, Span),

    #[error("{clause} of a for loop must be an assignment at {span}")]
    InvalidForClause { clause: &'static str, span: Span },

    #[error("type oracle rejected expression: {0}")]
    Oracle(TypeError),
}

impl CompileError {
    pub fn unsupported_operator(
        operator: impl std::fmt::Display,
        operands: &[Type],
        span: Span,
    ) -> Self {
        let operands = operands
            .iter()
            .map(|t| t.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        Self::UnsupportedOperator {
            operator: operator.to_string(),
            operands,
            span,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            Self::UndeclaredVariable(_, span) => *span,
            Self::TypeMismatch { span, .. } => *span,
            Self::UnsupportedOperator { span, .. } => *span,
            Self::UnknownType(_, span) => *span,
            Self::UnsupportedType(_, span) => *span,
            Self::InvalidForClause { span, .. } => *span,
            Self::Oracle(err) => err.span(),
        }
    }
}

impl From<TypeError> for CompileError {
    fn from(err: TypeError) -> Self {
        match err {
            TypeError::UndeclaredVariable(name, span) => Self::UndeclaredVariable(name, span),
            TypeError::UnknownType(name, span) => Self::UnknownType(name, span),
            TypeError::Mismatch {
                name,
                expected,
                found,
                span,
            } => Self::TypeMismatch {
                name,
                expected,
                found,
                span,
            },
            other => Self::Oracle(other),
        }
    }
}

/// Errors raised while parsing the instruction text format.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AssembleError {
    #[error("line {line}: unknown instruction '{opcode}'")]
    UnknownOpcode { line: usize, opcode: String },

    #[error("line {line}: '{opcode}' is missing its {expected}")]
    MissingOperand {
        line: usize,
        opcode: String,
        expected: &'static str,
    },

    #[error("line {line}: '{opcode}' takes no operand, found '{found}'")]
    UnexpectedOperand {
        line: usize,
        opcode: String,
        found: String,
    },

    #[error("line {line}: invalid type suffix '{found}' for '{opcode}'")]
    InvalidKind {
        line: usize,
        opcode: String,
        found: String,
    },

    #[error("line {line}: invalid value count '{found}' for print")]
    InvalidCount { line: usize, found: String },
}

impl AssembleError {
    /// The same error reported against another line number.
    pub fn with_line(self, line: usize) -> Self {
        match self {
            Self::UnknownOpcode { opcode, .. } => Self::UnknownOpcode { line, opcode },
            Self::MissingOperand {
                opcode, expected, ..
            } => Self::MissingOperand {
                line,
                opcode,
                expected,
            },
            Self::UnexpectedOperand { opcode, found, .. } => Self::UnexpectedOperand {
                line,
                opcode,
                found,
            },
            Self::InvalidKind { opcode, found, .. } => Self::InvalidKind {
                line,
                opcode,
                found,
            },
            Self::InvalidCount { found, .. } => Self::InvalidCount { line, found },
        }
    }
}

/// Runtime faults. Every fault halts the current run.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("stack underflow on {0}")]
    StackUnderflow(String),

    #[error("stack overflow: more than {0} values")]
    StackOverflow(usize),

    #[error("label '{0}' not found")]
    UndefinedLabel(String),

    #[error("label '{label}' defined twice (instructions {first} and {second})")]
    DuplicateLabel {
        label: String,
        first: usize,
        second: usize,
    },

    #[error("variable '{0}' not defined")]
    UndefinedVariable(String),

    #[error("division by zero")]
    DivisionByZero,

    #[error("invalid input for read {kind}: '{input}'")]
    InvalidInput { kind: String, input: String },

    #[error("end of input during read")]
    EndOfInput,

    #[error("{opcode} expects {expected}, found {found}")]
    TypeMismatch {
        opcode: String,
        expected: String,
        found: String,
    },

    #[error("{opcode} does not support {operand}")]
    UnsupportedOperand { opcode: String, operand: String },

    #[error("invalid {kind} literal '{literal}'")]
    InvalidLiteral { kind: String, literal: String },

    #[error("{0} is missing its operand")]
    MissingOperand(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RuntimeError {
    pub fn stack_underflow(opcode: impl std::fmt::Display) -> Self {
        Self::StackUnderflow(opcode.to_string())
    }

    pub fn type_mismatch(
        opcode: impl std::fmt::Display,
        expected: impl std::fmt::Display,
        found: impl std::fmt::Display,
    ) -> Self {
        Self::TypeMismatch {
            opcode: opcode.to_string(),
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }

    pub fn unsupported_operand(
        opcode: impl std::fmt::Display,
        operand: impl std::fmt::Display,
    ) -> Self {
        Self::UnsupportedOperand {
            opcode: opcode.to_string(),
            operand: operand.to_string(),
        }
    }

    pub fn invalid_literal(kind: impl std::fmt::Display, literal: impl Into<String>) -> Self {
        Self::InvalidLiteral {
            kind: kind.to_string(),
            literal: literal.into(),
        }
    }
}

/// All errors collected by one type checking pass.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeErrors(pub Vec<TypeError>);

impl std::fmt::Display for TypeErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, error) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for TypeErrors {}

/// A unified error type for all phases.
#[derive(Debug, Error)]
pub enum StackLangError {
    #[error("Type errors:\n{0}")]
    Type(#[from] TypeErrors),

    #[error("Compile error: {0}")]
    Compile(#[from] CompileError),

    #[error("Assemble error: {0}")]
    Assemble(#[from] AssembleError),

    #[error("Runtime error: {0}")]
    Runtime(#[from] RuntimeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
