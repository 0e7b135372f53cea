//! Stack-based virtual machine for executing instruction lists.

use std::collections::HashMap;
use std::io::{BufRead, Write};

use crate::bytecode::chunk::Chunk;
use crate::bytecode::instruction::{Instruction, Kind, OpCode};
use crate::bytecode::value::Value;
use crate::error::RuntimeError;

/// Default maximum operand stack depth.
pub const STACK_MAX: usize = 65536;

/// Result type for VM operations.
pub type VMResult<T> = Result<T, RuntimeError>;

/// Tunables of one virtual machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VmConfig {
    /// Pushing beyond this many values is a fault.
    pub max_stack_depth: usize,
}

impl Default for VmConfig {
    fn default() -> Self {
        Self {
            max_stack_depth: STACK_MAX,
        }
    }
}

/// Resolved target index of every `jmp` and `fjmp`, by instruction index.
type JumpTable = Vec<Option<usize>>;

/// The virtual machine.
///
/// Reads program input from `R` one line per `read` and writes one line per
/// `print` to `W`. The operand stack and variable store are cleared at the
/// start of every run, so one machine can run the same code repeatedly.
pub struct VM<R, W> {
    stack: Vec<Value>,
    variables: HashMap<String, Value>,
    input: R,
    output: W,
    config: VmConfig,
}

impl<R: BufRead, W: Write> VM<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self::with_config(input, output, VmConfig::default())
    }

    pub fn with_config(input: R, output: W, config: VmConfig) -> Self {
        Self {
            stack: Vec::with_capacity(256),
            variables: HashMap::new(),
            input,
            output,
            config,
        }
    }

    /// Run a compiled chunk.
    pub fn run_chunk(&mut self, chunk: &Chunk) -> VMResult<()> {
        self.run(chunk.instructions())
    }

    /// Run an instruction list to completion or to the first fault.
    ///
    /// Labels are resolved before the first instruction executes, so an
    /// undefined or duplicated label faults without producing any output.
    pub fn run(&mut self, code: &[Instruction]) -> VMResult<()> {
        self.stack.clear();
        self.variables.clear();

        let jumps = resolve_labels(code).inspect_err(|e| {
            tracing::debug!(error = %e, "label resolution failed");
        })?;

        let mut ip = 0;
        let mut executed = 0usize;
        while let Some(instruction) = code.get(ip) {
            tracing::trace!(ip, %instruction, depth = self.stack.len(), "execute");
            executed += 1;
            match self.execute(instruction, jumps[ip]) {
                Ok(Some(target)) => ip = target,
                Ok(None) => ip += 1,
                Err(e) => {
                    tracing::debug!(ip, %instruction, error = %e, "runtime fault");
                    // Output printed before the fault must reach the sink.
                    if let Err(flush) = self.output.flush() {
                        tracing::debug!(error = %flush, "flush after fault failed");
                    }
                    return Err(e);
                }
            }
        }

        self.output.flush()?;
        tracing::debug!(executed, variables = self.variables.len(), "run finished");
        Ok(())
    }

    /// Current value of a variable.
    pub fn variable(&self, name: &str) -> Option<&Value> {
        self.variables.get(name)
    }

    /// The operand stack, bottom first.
    pub fn stack(&self) -> &[Value] {
        &self.stack
    }

    pub fn output(&self) -> &W {
        &self.output
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Execute one instruction. Returns the next instruction pointer when
    /// control transfers to a label.
    fn execute(
        &mut self,
        instruction: &Instruction,
        target: Option<usize>,
    ) -> VMResult<Option<usize>> {
        let op = instruction.opcode;

        match op {
            OpCode::Add | OpCode::Sub | OpCode::Mul | OpCode::Div => {
                match expect_kind(instruction)? {
                    Kind::Int => {
                        let b = self.pop_int(op)?;
                        let a = self.pop_int(op)?;
                        let result = match op {
                            OpCode::Add => a.wrapping_add(b),
                            OpCode::Sub => a.wrapping_sub(b),
                            OpCode::Mul => a.wrapping_mul(b),
                            _ => {
                                if b == 0 {
                                    return Err(RuntimeError::DivisionByZero);
                                }
                                a.wrapping_div(b)
                            }
                        };
                        self.push(Value::Int(result))?;
                    }
                    Kind::Float => {
                        let b = self.pop_float(op)?;
                        let a = self.pop_float(op)?;
                        let result = match op {
                            OpCode::Add => a + b,
                            OpCode::Sub => a - b,
                            OpCode::Mul => a * b,
                            _ => {
                                if b == 0.0 {
                                    return Err(RuntimeError::DivisionByZero);
                                }
                                a / b
                            }
                        };
                        self.push(Value::Float(result))?;
                    }
                    kind => return Err(RuntimeError::unsupported_operand(op, kind.type_name())),
                }
            }

            OpCode::Mod => {
                let b = self.pop_int(op)?;
                let a = self.pop_int(op)?;
                if b == 0 {
                    return Err(RuntimeError::DivisionByZero);
                }
                self.push(Value::Int(a.wrapping_rem(b)))?;
            }

            OpCode::UMinus => match expect_kind(instruction)? {
                Kind::Int => {
                    let a = self.pop_int(op)?;
                    self.push(Value::Int(a.wrapping_neg()))?;
                }
                Kind::Float => {
                    let a = self.pop_float(op)?;
                    self.push(Value::Float(-a))?;
                }
                kind => return Err(RuntimeError::unsupported_operand(op, kind.type_name())),
            },

            OpCode::Concat => {
                let b = self.pop_string(op)?;
                let mut a = self.pop_string(op)?;
                a.push_str(&b);
                self.push(Value::String(a))?;
            }

            OpCode::And | OpCode::Or => {
                let b = self.pop_bool(op)?;
                let a = self.pop_bool(op)?;
                let result = if op == OpCode::And { a && b } else { a || b };
                self.push(Value::Bool(result))?;
            }

            OpCode::Not => {
                let a = self.pop_bool(op)?;
                self.push(Value::Bool(!a))?;
            }

            OpCode::Gt | OpCode::Lt | OpCode::Ge | OpCode::Le => {
                let ordering = match expect_kind(instruction)? {
                    Kind::Int => {
                        let b = self.pop_int(op)?;
                        let a = self.pop_int(op)?;
                        a.partial_cmp(&b)
                    }
                    Kind::Float => {
                        let b = self.pop_float(op)?;
                        let a = self.pop_float(op)?;
                        a.partial_cmp(&b)
                    }
                    kind => return Err(RuntimeError::unsupported_operand(op, kind.type_name())),
                };
                // NaN compares false under every relation.
                let result = ordering.is_some_and(|ord| match op {
                    OpCode::Gt => ord.is_gt(),
                    OpCode::Lt => ord.is_lt(),
                    OpCode::Ge => ord.is_ge(),
                    _ => ord.is_le(),
                });
                self.push(Value::Bool(result))?;
            }

            OpCode::Eq => {
                let kind = expect_kind(instruction)?;
                let b = self.pop_kind(op, kind)?;
                let a = self.pop_kind(op, kind)?;
                self.push(Value::Bool(a == b))?;
            }

            OpCode::Itof => {
                let a = self.pop_int(op)?;
                self.push(Value::Float(a as f64))?;
            }

            OpCode::Push => {
                let kind = expect_kind(instruction)?;
                let value = Value::from_literal(kind, expect_operand(instruction)?)?;
                self.push(value)?;
            }

            OpCode::Pop => {
                self.pop(op)?;
            }

            OpCode::Load => {
                let kind = expect_kind(instruction)?;
                let name = expect_operand(instruction)?;
                let value = self
                    .variables
                    .get(name)
                    .ok_or_else(|| RuntimeError::UndefinedVariable(name.to_string()))?;
                if value.kind() != kind {
                    return Err(RuntimeError::type_mismatch(
                        op,
                        kind.type_name(),
                        value.type_name(),
                    ));
                }
                let value = value.clone();
                self.push(value)?;
            }

            OpCode::Save => {
                let kind = expect_kind(instruction)?;
                let name = expect_operand(instruction)?;
                let value = self.pop_kind(op, kind)?;
                self.variables.insert(name.to_string(), value);
            }

            OpCode::Label => {}

            OpCode::Jmp => return Ok(target),

            OpCode::Fjmp => {
                let value = self.pop(op)?;
                let truthy = value
                    .is_truthy()
                    .ok_or_else(|| RuntimeError::unsupported_operand(op, value.type_name()))?;
                if !truthy {
                    return Ok(target);
                }
            }

            OpCode::Print => {
                let operand = expect_operand(instruction)?;
                let count: usize = operand
                    .parse()
                    .map_err(|_| RuntimeError::invalid_literal("count", operand))?;
                if count > self.stack.len() {
                    return Err(RuntimeError::stack_underflow(op));
                }
                let values = self.stack.split_off(self.stack.len() - count);
                let mut line = String::new();
                for value in &values {
                    line.push_str(&value.to_string());
                }
                writeln!(self.output, "{}", line)?;
            }

            OpCode::Read => {
                let kind = expect_kind(instruction)?;
                let mut line = String::new();
                if self.input.read_line(&mut line)? == 0 {
                    return Err(RuntimeError::EndOfInput);
                }
                let line = line
                    .strip_suffix('\n')
                    .map(|l| l.strip_suffix('\r').unwrap_or(l))
                    .unwrap_or(line.as_str());
                let value = Value::from_input(kind, line)?;
                self.push(value)?;
            }
        }

        Ok(None)
    }

    fn push(&mut self, value: Value) -> VMResult<()> {
        if self.stack.len() >= self.config.max_stack_depth {
            return Err(RuntimeError::StackOverflow(self.config.max_stack_depth));
        }
        self.stack.push(value);
        Ok(())
    }

    fn pop(&mut self, op: OpCode) -> VMResult<Value> {
        self.stack
            .pop()
            .ok_or_else(|| RuntimeError::stack_underflow(op))
    }

    /// Pop a value and verify its tag against the instruction's kind.
    fn pop_kind(&mut self, op: OpCode, kind: Kind) -> VMResult<Value> {
        let value = self.pop(op)?;
        if value.kind() != kind {
            return Err(RuntimeError::type_mismatch(
                op,
                kind.type_name(),
                value.type_name(),
            ));
        }
        Ok(value)
    }

    fn pop_int(&mut self, op: OpCode) -> VMResult<i64> {
        match self.pop(op)? {
            Value::Int(n) => Ok(n),
            other => Err(RuntimeError::type_mismatch(op, "int", other.type_name())),
        }
    }

    fn pop_float(&mut self, op: OpCode) -> VMResult<f64> {
        match self.pop(op)? {
            Value::Float(n) => Ok(n),
            other => Err(RuntimeError::type_mismatch(op, "float", other.type_name())),
        }
    }

    fn pop_bool(&mut self, op: OpCode) -> VMResult<bool> {
        match self.pop(op)? {
            Value::Bool(b) => Ok(b),
            other => Err(RuntimeError::type_mismatch(op, "bool", other.type_name())),
        }
    }

    fn pop_string(&mut self, op: OpCode) -> VMResult<String> {
        match self.pop(op)? {
            Value::String(s) => Ok(s),
            other => Err(RuntimeError::type_mismatch(op, "string", other.type_name())),
        }
    }
}

fn expect_kind(instruction: &Instruction) -> VMResult<Kind> {
    instruction
        .kind
        .ok_or_else(|| RuntimeError::MissingOperand(instruction.opcode.to_string()))
}

fn expect_operand(instruction: &Instruction) -> VMResult<&str> {
    instruction
        .operand
        .as_deref()
        .ok_or_else(|| RuntimeError::MissingOperand(instruction.opcode.to_string()))
}

/// Resolve every label and jump without executing anything.
pub fn check_labels(code: &[Instruction]) -> VMResult<()> {
    resolve_labels(code).map(|_| ())
}

/// Record every label's index, then resolve every jump against it.
fn resolve_labels(code: &[Instruction]) -> VMResult<JumpTable> {
    let mut labels: HashMap<&str, usize> = HashMap::new();
    for (index, instruction) in code.iter().enumerate() {
        if instruction.opcode == OpCode::Label {
            let name = expect_operand(instruction)?;
            if let Some(first) = labels.insert(name, index) {
                return Err(RuntimeError::DuplicateLabel {
                    label: name.to_string(),
                    first,
                    second: index,
                });
            }
        }
    }

    code.iter()
        .map(|instruction| match instruction.opcode {
            OpCode::Jmp | OpCode::Fjmp => {
                let name = expect_operand(instruction)?;
                labels
                    .get(name)
                    .copied()
                    .map(Some)
                    .ok_or_else(|| RuntimeError::UndefinedLabel(name.to_string()))
            }
            _ => Ok(None),
        })
        .collect()
}
