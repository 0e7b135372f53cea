//! Code generator: lowers a checked syntax tree into stack machine instructions.

use crate::ast::*;
use crate::bytecode::chunk::Chunk;
use crate::bytecode::instruction::{quote_string, Instruction, Kind, OpCode};
use crate::error::CompileError;
use crate::span::Span;
use crate::types::{Type, TypeOracle};

/// Result type for compilation.
pub type CompileResult<T> = Result<T, CompileError>;

/// Walks a program and emits a [`Chunk`].
///
/// Static types come from the oracle; the generator never re-derives them
/// from emitted code. Labels are numbered `L0, L1, ...` per compilation.
pub struct Compiler<'a, O: TypeOracle + ?Sized> {
    oracle: &'a O,
    chunk: Chunk,
    next_label: usize,
}

impl<'a, O: TypeOracle + ?Sized> Compiler<'a, O> {
    /// Create a new compiler.
    pub fn new(oracle: &'a O) -> Self {
        Self {
            oracle,
            chunk: Chunk::new(),
            next_label: 0,
        }
    }

    /// Compile a program into a chunk. Any error aborts the whole compilation.
    pub fn compile(&mut self, program: &Program) -> CompileResult<Chunk> {
        self.chunk = Chunk::new();
        self.next_label = 0;

        let result = program
            .statements
            .iter()
            .try_for_each(|stmt| self.compile_statement(stmt));
        let chunk = std::mem::take(&mut self.chunk);
        result?;

        tracing::debug!(
            instructions = chunk.len(),
            labels = self.next_label,
            "compiled program"
        );
        Ok(chunk)
    }

    fn compile_statement(&mut self, stmt: &Stmt) -> CompileResult<()> {
        let line = stmt.span.line;

        match &stmt.kind {
            StmtKind::Declaration {
                type_annotation,
                names,
            } => {
                let ty = Type::from_keyword(&type_annotation.name).ok_or_else(|| {
                    CompileError::UnknownType(type_annotation.name.clone(), type_annotation.span)
                })?;
                let kind = self.kind_of(ty, stmt.span)?;
                let default = ty
                    .default_literal()
                    .ok_or(CompileError::UnsupportedType(ty, stmt.span))?;
                for name in names {
                    self.emit(Instruction::push(kind, default), line);
                    self.emit(Instruction::save(kind, name.as_str()), line);
                }
            }

            StmtKind::Expression(expr) => self.compile_discarded(expr)?,

            StmtKind::Block(statements) => {
                for s in statements {
                    self.compile_statement(s)?;
                }
            }

            StmtKind::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let else_label = self.new_label();
                let end_label = self.new_label();

                self.compile_expression(condition)?;
                self.emit(Instruction::fjmp(else_label.as_str()), line);
                self.compile_statement(then_branch)?;
                self.emit(Instruction::jmp(end_label.as_str()), line);
                self.emit(Instruction::label(else_label), line);
                if let Some(else_br) = else_branch {
                    self.compile_statement(else_br)?;
                }
                self.emit(Instruction::label(end_label), line);
            }

            StmtKind::While { condition, body } => {
                let start_label = self.new_label();
                let end_label = self.new_label();

                self.emit(Instruction::label(start_label.as_str()), line);
                self.compile_expression(condition)?;
                self.emit(Instruction::fjmp(end_label.as_str()), line);
                self.compile_statement(body)?;
                self.emit(Instruction::jmp(start_label), line);
                self.emit(Instruction::label(end_label), line);
            }

            StmtKind::For {
                init,
                condition,
                update,
                body,
            } => {
                if let Some(init) = init {
                    self.compile_for_clause(init, "initializer")?;
                }

                let start_label = self.new_label();
                let end_label = self.new_label();

                self.emit(Instruction::label(start_label.as_str()), line);
                if let Some(condition) = condition {
                    self.compile_expression(condition)?;
                    self.emit(Instruction::fjmp(end_label.as_str()), line);
                }
                self.compile_statement(body)?;
                if let Some(update) = update {
                    self.compile_for_clause(update, "update")?;
                }
                self.emit(Instruction::jmp(start_label), line);
                self.emit(Instruction::label(end_label), line);
            }

            StmtKind::Read(names) => {
                for name in names {
                    let ty = self.oracle.declared_type(name, stmt.span)?;
                    let kind = self.kind_of(ty, stmt.span)?;
                    self.emit(Instruction::read(kind), line);
                    self.emit(Instruction::save(kind, name.as_str()), line);
                }
            }

            StmtKind::Write(exprs) => {
                for expr in exprs {
                    self.compile_expression(expr)?;
                }
                self.emit(Instruction::print(exprs.len()), line);
            }

            StmtKind::Empty => {}
        }

        Ok(())
    }

    /// Compile an expression whose value nobody consumes, leaving the stack
    /// depth unchanged. An assignment ends with a load of its outermost
    /// target, which the trailing `pop` discards.
    fn compile_discarded(&mut self, expr: &Expr) -> CompileResult<()> {
        self.compile_expression(expr)?;
        self.emit_op(OpCode::Pop, expr.span.line);
        Ok(())
    }

    fn compile_for_clause(&mut self, clause: &Expr, name: &'static str) -> CompileResult<()> {
        if !matches!(clause.kind, ExprKind::Assign { .. }) {
            return Err(CompileError::InvalidForClause {
                clause: name,
                span: clause.span,
            });
        }
        self.compile_discarded(clause)
    }

    /// Emit code leaving the expression's value on the stack and return its
    /// static type.
    fn compile_expression(&mut self, expr: &Expr) -> CompileResult<Type> {
        let line = expr.span.line;

        match &expr.kind {
            ExprKind::IntLiteral(n) => {
                self.emit(Instruction::push(Kind::Int, n.to_string()), line);
                Ok(Type::Int)
            }
            ExprKind::FloatLiteral(n) => {
                self.emit(Instruction::push(Kind::Float, format!("{:?}", n)), line);
                Ok(Type::Float)
            }
            ExprKind::StringLiteral(s) => {
                self.emit(Instruction::push(Kind::String, quote_string(s)), line);
                Ok(Type::String)
            }
            ExprKind::BoolLiteral(b) => {
                self.emit(Instruction::push(Kind::Bool, b.to_string()), line);
                Ok(Type::Bool)
            }

            ExprKind::Variable(name) => {
                let ty = self.oracle.declared_type(name, expr.span)?;
                let kind = self.kind_of(ty, expr.span)?;
                self.emit(Instruction::load(kind, name.as_str()), line);
                Ok(ty)
            }

            ExprKind::Grouping(inner) => self.compile_expression(inner),

            ExprKind::Assign { .. } => self.compile_assignment(expr),

            ExprKind::Binary {
                left,
                operator,
                right,
            } => self.compile_binary(expr, left, *operator, right),

            ExprKind::Unary { operator, operand } => {
                let operand_type = self.compile_expression(operand)?;
                match (operator, operand_type) {
                    (UnaryOp::Negate, Type::Int) => {
                        self.emit(Instruction::typed(OpCode::UMinus, Kind::Int), line)
                    }
                    (UnaryOp::Negate, Type::Float) => {
                        self.emit(Instruction::typed(OpCode::UMinus, Kind::Float), line)
                    }
                    (UnaryOp::Not, Type::Bool) => self.emit_op(OpCode::Not, line),
                    _ => {
                        return Err(CompileError::unsupported_operator(
                            operator,
                            &[operand_type],
                            expr.span,
                        ))
                    }
                }
                Ok(operand_type)
            }

            ExprKind::LogicalAnd { left, right } => {
                self.compile_logical(expr, "&&", OpCode::And, left, right)
            }
            ExprKind::LogicalOr { left, right } => {
                self.compile_logical(expr, "||", OpCode::Or, left, right)
            }
        }
    }

    /// Assignment chain `a = b = c = expr`: the value is evaluated once and
    /// saved into the innermost target; every outer target reloads the
    /// previous one before its own save. The chain ends with a load of the
    /// outermost target, so the assignment yields that target's value.
    fn compile_assignment(&mut self, expr: &Expr) -> CompileResult<Type> {
        let mut targets = Vec::new();
        let mut value = expr;
        while let ExprKind::Assign { target, value: inner } = &value.kind {
            targets.push(target.as_str());
            value = &**inner;
        }

        let line = expr.span.line;
        let mut source_type = self.compile_expression(value)?;
        let mut previous: Option<(&str, Kind)> = None;

        for target in targets.into_iter().rev() {
            let target_type = self.oracle.declared_type(target, expr.span)?;
            let kind = self.kind_of(target_type, expr.span)?;
            if let Some((previous_target, previous_kind)) = previous {
                self.emit(Instruction::load(previous_kind, previous_target), line);
            }
            self.coerce(source_type, target_type, target, expr.span)?;
            self.emit(Instruction::save(kind, target), line);
            previous = Some((target, kind));
            source_type = target_type;
        }

        if let Some((outermost, kind)) = previous {
            self.emit(Instruction::load(kind, outermost), line);
        }
        Ok(source_type)
    }

    /// Make a value of type `from` storable in a variable of type `to`.
    fn coerce(&mut self, from: Type, to: Type, name: &str, span: Span) -> CompileResult<()> {
        if from == to {
            return Ok(());
        }
        if from == Type::Int && to == Type::Float {
            self.emit_op(OpCode::Itof, span.line);
            return Ok(());
        }
        Err(CompileError::TypeMismatch {
            name: name.to_string(),
            expected: to,
            found: from,
            span,
        })
    }

    fn compile_binary(
        &mut self,
        expr: &Expr,
        left: &Expr,
        operator: BinaryOp,
        right: &Expr,
    ) -> CompileResult<Type> {
        let line = expr.span.line;
        let left_type = self.oracle.type_of(left)?;
        let right_type = self.oracle.type_of(right)?;
        let unsupported =
            || CompileError::unsupported_operator(operator, &[left_type, right_type], expr.span);

        match operator {
            BinaryOp::Add
            | BinaryOp::Subtract
            | BinaryOp::Multiply
            | BinaryOp::Divide
            | BinaryOp::Less
            | BinaryOp::LessEqual
            | BinaryOp::Greater
            | BinaryOp::GreaterEqual => {
                let kind = self
                    .compile_numeric_operands(left, left_type, right, right_type)?
                    .ok_or_else(unsupported)?;
                let opcode = match operator {
                    BinaryOp::Add => OpCode::Add,
                    BinaryOp::Subtract => OpCode::Sub,
                    BinaryOp::Multiply => OpCode::Mul,
                    BinaryOp::Divide => OpCode::Div,
                    BinaryOp::Less => OpCode::Lt,
                    BinaryOp::LessEqual => OpCode::Le,
                    BinaryOp::Greater => OpCode::Gt,
                    _ => OpCode::Ge,
                };
                self.emit(Instruction::typed(opcode, kind), line);
                if matches!(
                    operator,
                    BinaryOp::Add | BinaryOp::Subtract | BinaryOp::Multiply | BinaryOp::Divide
                ) {
                    Ok(if kind == Kind::Float {
                        Type::Float
                    } else {
                        Type::Int
                    })
                } else {
                    Ok(Type::Bool)
                }
            }

            BinaryOp::Modulo => {
                if left_type != Type::Int || right_type != Type::Int {
                    return Err(unsupported());
                }
                self.compile_expression(left)?;
                self.compile_expression(right)?;
                self.emit_op(OpCode::Mod, line);
                Ok(Type::Int)
            }

            BinaryOp::Concat => {
                if left_type != Type::String || right_type != Type::String {
                    return Err(unsupported());
                }
                self.compile_expression(left)?;
                self.compile_expression(right)?;
                self.emit_op(OpCode::Concat, line);
                Ok(Type::String)
            }

            BinaryOp::Equal | BinaryOp::NotEqual => {
                let kind = if left_type.is_numeric() && right_type.is_numeric() {
                    self.compile_numeric_operands(left, left_type, right, right_type)?
                        .ok_or_else(unsupported)?
                } else if left_type == right_type {
                    let kind = Kind::of_type(left_type).ok_or_else(unsupported)?;
                    self.compile_expression(left)?;
                    self.compile_expression(right)?;
                    kind
                } else {
                    return Err(unsupported());
                };
                self.emit(Instruction::typed(OpCode::Eq, kind), line);
                if operator == BinaryOp::NotEqual {
                    self.emit_op(OpCode::Not, line);
                }
                Ok(Type::Bool)
            }
        }
    }

    /// Emit both numeric operands, promoting an Int side with `itof` right
    /// after its own code when the other side is Float. Returns the operator
    /// kind, or `None` when either side is not numeric.
    fn compile_numeric_operands(
        &mut self,
        left: &Expr,
        left_type: Type,
        right: &Expr,
        right_type: Type,
    ) -> CompileResult<Option<Kind>> {
        if !(left_type.is_numeric() && right_type.is_numeric()) {
            return Ok(None);
        }
        let promote = left_type == Type::Float || right_type == Type::Float;

        self.compile_expression(left)?;
        if promote && left_type == Type::Int {
            self.emit_op(OpCode::Itof, left.span.line);
        }
        self.compile_expression(right)?;
        if promote && right_type == Type::Int {
            self.emit_op(OpCode::Itof, right.span.line);
        }

        Ok(Some(if promote { Kind::Float } else { Kind::Int }))
    }

    /// Both operands are always evaluated; there is no short circuit.
    fn compile_logical(
        &mut self,
        expr: &Expr,
        operator: &str,
        opcode: OpCode,
        left: &Expr,
        right: &Expr,
    ) -> CompileResult<Type> {
        let left_type = self.compile_expression(left)?;
        let right_type = self.compile_expression(right)?;
        if left_type != Type::Bool || right_type != Type::Bool {
            return Err(CompileError::unsupported_operator(
                operator,
                &[left_type, right_type],
                expr.span,
            ));
        }
        self.emit_op(opcode, expr.span.line);
        Ok(Type::Bool)
    }

    fn kind_of(&self, ty: Type, span: Span) -> CompileResult<Kind> {
        Kind::of_type(ty).ok_or(CompileError::UnsupportedType(ty, span))
    }

    fn new_label(&mut self) -> String {
        let label = format!("L{}", self.next_label);
        self.next_label += 1;
        label
    }

    // ===== Bytecode emission =====

    fn emit(&mut self, instruction: Instruction, line: usize) {
        self.chunk.write(instruction, line);
    }

    fn emit_op(&mut self, op: OpCode, line: usize) {
        self.emit(Instruction::simple(op), line);
    }
}
