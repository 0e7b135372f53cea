//! Instruction set of the stack machine and its textual wire format.
//!
//! Every instruction is one line of text, `<op> [kind] [operand]`, for
//! example `push i 0`, `save f result`, `add i`, `label L0` or `print 3`.

use std::fmt;

use crate::error::AssembleError;
use crate::types::Type;

/// Opcodes of the stack machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpCode {
    // ============ Arithmetic ============
    /// a + b, typed i or f
    Add,
    /// a - b, typed i or f
    Sub,
    /// a * b, typed i or f
    Mul,
    /// a / b, typed i or f
    Div,
    /// Integer remainder a % b
    Mod,
    /// Negate the top value, typed i or f
    UMinus,
    /// String concatenation
    Concat,

    // ============ Logic ============
    And,
    Or,
    Not,

    // ============ Comparison ============
    Gt,
    Lt,
    Ge,
    Le,
    /// Equality, typed i, f, s or b
    Eq,

    // ============ Conversion ============
    /// Convert the Int on top of the stack to Float
    Itof,

    // ============ Stack & Variables ============
    /// Push a literal: PUSH <kind> <literal>
    Push,
    /// Discard the top value
    Pop,
    /// Push a variable's value: LOAD <kind> <name>
    Load,
    /// Pop into a variable: SAVE <kind> <name>
    Save,

    // ============ Control Flow ============
    /// Jump target, no-op when executed: LABEL <name>
    Label,
    /// Unconditional jump: JMP <label>
    Jmp,
    /// Pop and jump if falsy: FJMP <label>
    Fjmp,

    // ============ I/O ============
    /// Pop N values and print them in push order: PRINT <count>
    Print,
    /// Read one input line as the given kind: READ <kind>
    Read,
}

/// What follows the kind (if any) on an instruction line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandShape {
    None,
    Literal,
    Variable,
    Label,
    Count,
}

impl OperandShape {
    fn describe(self) -> &'static str {
        match self {
            OperandShape::None => "nothing",
            OperandShape::Literal => "literal",
            OperandShape::Variable => "variable name",
            OperandShape::Label => "label",
            OperandShape::Count => "value count",
        }
    }
}

const NUMERIC: &[Kind] = &[Kind::Int, Kind::Float];
const ANY_KIND: &[Kind] = &[Kind::Int, Kind::Float, Kind::String, Kind::Bool];

impl OpCode {
    pub const ALL: [OpCode; 25] = [
        OpCode::Add,
        OpCode::Sub,
        OpCode::Mul,
        OpCode::Div,
        OpCode::Mod,
        OpCode::UMinus,
        OpCode::Concat,
        OpCode::And,
        OpCode::Or,
        OpCode::Not,
        OpCode::Gt,
        OpCode::Lt,
        OpCode::Ge,
        OpCode::Le,
        OpCode::Eq,
        OpCode::Itof,
        OpCode::Push,
        OpCode::Pop,
        OpCode::Load,
        OpCode::Save,
        OpCode::Label,
        OpCode::Jmp,
        OpCode::Fjmp,
        OpCode::Print,
        OpCode::Read,
    ];

    /// Get the name of the opcode as it appears in instruction text.
    pub fn name(&self) -> &'static str {
        match self {
            OpCode::Add => "add",
            OpCode::Sub => "sub",
            OpCode::Mul => "mul",
            OpCode::Div => "div",
            OpCode::Mod => "mod",
            OpCode::UMinus => "uminus",
            OpCode::Concat => "concat",
            OpCode::And => "and",
            OpCode::Or => "or",
            OpCode::Not => "not",
            OpCode::Gt => "gt",
            OpCode::Lt => "lt",
            OpCode::Ge => "ge",
            OpCode::Le => "le",
            OpCode::Eq => "eq",
            OpCode::Itof => "itof",
            OpCode::Push => "push",
            OpCode::Pop => "pop",
            OpCode::Load => "load",
            OpCode::Save => "save",
            OpCode::Label => "label",
            OpCode::Jmp => "jmp",
            OpCode::Fjmp => "fjmp",
            OpCode::Print => "print",
            OpCode::Read => "read",
        }
    }

    pub fn from_name(name: &str) -> Option<OpCode> {
        OpCode::ALL.iter().copied().find(|op| op.name() == name)
    }

    /// Kinds this opcode accepts as its type suffix; empty when it takes none.
    pub fn kinds(&self) -> &'static [Kind] {
        match self {
            OpCode::Add
            | OpCode::Sub
            | OpCode::Mul
            | OpCode::Div
            | OpCode::UMinus
            | OpCode::Gt
            | OpCode::Lt
            | OpCode::Ge
            | OpCode::Le => NUMERIC,
            OpCode::Eq | OpCode::Push | OpCode::Load | OpCode::Save | OpCode::Read => ANY_KIND,
            _ => &[],
        }
    }

    pub fn operand_shape(&self) -> OperandShape {
        match self {
            OpCode::Push => OperandShape::Literal,
            OpCode::Load | OpCode::Save => OperandShape::Variable,
            OpCode::Label | OpCode::Jmp | OpCode::Fjmp => OperandShape::Label,
            OpCode::Print => OperandShape::Count,
            _ => OperandShape::None,
        }
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The one-letter type suffix of an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Int,
    Float,
    String,
    Bool,
}

impl Kind {
    pub fn suffix(&self) -> &'static str {
        match self {
            Kind::Int => "i",
            Kind::Float => "f",
            Kind::String => "s",
            Kind::Bool => "b",
        }
    }

    pub fn from_suffix(suffix: &str) -> Option<Kind> {
        match suffix {
            "i" => Some(Kind::Int),
            "f" => Some(Kind::Float),
            "s" => Some(Kind::String),
            "b" => Some(Kind::Bool),
            _ => None,
        }
    }

    /// Value kind of a static type. `file` has none.
    pub fn of_type(ty: Type) -> Option<Kind> {
        match ty {
            Type::Int => Some(Kind::Int),
            Type::Float => Some(Kind::Float),
            Type::String => Some(Kind::String),
            Type::Bool => Some(Kind::Bool),
            Type::File => None,
        }
    }

    /// Human-readable name, used in runtime fault messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Kind::Int => "int",
            Kind::Float => "float",
            Kind::String => "string",
            Kind::Bool => "bool",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.suffix())
    }
}

/// One stack machine instruction.
#[derive(Debug, Clone, PartialEq)]
pub struct Instruction {
    pub opcode: OpCode,
    pub kind: Option<Kind>,
    pub operand: Option<String>,
}

impl Instruction {
    pub fn new(opcode: OpCode, kind: Option<Kind>, operand: Option<String>) -> Self {
        Self {
            opcode,
            kind,
            operand,
        }
    }

    /// An instruction with neither suffix nor operand.
    pub fn simple(opcode: OpCode) -> Self {
        Self::new(opcode, None, None)
    }

    pub fn typed(opcode: OpCode, kind: Kind) -> Self {
        Self::new(opcode, Some(kind), None)
    }

    pub fn push(kind: Kind, literal: impl Into<String>) -> Self {
        Self::new(OpCode::Push, Some(kind), Some(literal.into()))
    }

    pub fn load(kind: Kind, name: impl Into<String>) -> Self {
        Self::new(OpCode::Load, Some(kind), Some(name.into()))
    }

    pub fn save(kind: Kind, name: impl Into<String>) -> Self {
        Self::new(OpCode::Save, Some(kind), Some(name.into()))
    }

    pub fn label(name: impl Into<String>) -> Self {
        Self::new(OpCode::Label, None, Some(name.into()))
    }

    pub fn jmp(label: impl Into<String>) -> Self {
        Self::new(OpCode::Jmp, None, Some(label.into()))
    }

    pub fn fjmp(label: impl Into<String>) -> Self {
        Self::new(OpCode::Fjmp, None, Some(label.into()))
    }

    pub fn print(count: usize) -> Self {
        Self::new(OpCode::Print, None, Some(count.to_string()))
    }

    pub fn read(kind: Kind) -> Self {
        Self::typed(OpCode::Read, kind)
    }

    /// Parse one line of instruction text.
    ///
    /// The line is split on whitespace into at most three tokens: the opcode,
    /// the kind (for typed opcodes) and the operand. The operand of `push`
    /// is the rest of the line, so string literals may contain spaces.
    /// Errors report line 0; callers attach the real line with
    /// [`AssembleError::with_line`].
    pub fn parse(text: &str) -> Result<Instruction, AssembleError> {
        let (name, rest) = next_token(text);
        let opcode = OpCode::from_name(name).ok_or_else(|| AssembleError::UnknownOpcode {
            line: 0,
            opcode: name.to_string(),
        })?;

        let (kind, rest) = if opcode.kinds().is_empty() {
            (None, rest)
        } else {
            let (suffix, rest) = next_token(rest);
            if suffix.is_empty() {
                return Err(AssembleError::MissingOperand {
                    line: 0,
                    opcode: name.to_string(),
                    expected: "type suffix",
                });
            }
            let kind = Kind::from_suffix(suffix)
                .filter(|k| opcode.kinds().contains(k))
                .ok_or_else(|| AssembleError::InvalidKind {
                    line: 0,
                    opcode: name.to_string(),
                    found: suffix.to_string(),
                })?;
            (Some(kind), rest)
        };

        let rest = rest.trim();
        let shape = opcode.operand_shape();
        let operand = match shape {
            OperandShape::None => {
                if !rest.is_empty() {
                    return Err(AssembleError::UnexpectedOperand {
                        line: 0,
                        opcode: name.to_string(),
                        found: rest.to_string(),
                    });
                }
                None
            }
            _ if rest.is_empty() => {
                return Err(AssembleError::MissingOperand {
                    line: 0,
                    opcode: name.to_string(),
                    expected: shape.describe(),
                });
            }
            OperandShape::Literal => Some(rest.to_string()),
            OperandShape::Variable | OperandShape::Label | OperandShape::Count => {
                let (token, extra) = next_token(rest);
                if !extra.trim().is_empty() {
                    return Err(AssembleError::UnexpectedOperand {
                        line: 0,
                        opcode: name.to_string(),
                        found: extra.trim().to_string(),
                    });
                }
                if shape == OperandShape::Count && token.parse::<usize>().is_err() {
                    return Err(AssembleError::InvalidCount {
                        line: 0,
                        found: token.to_string(),
                    });
                }
                Some(token.to_string())
            }
        };

        Ok(Instruction::new(opcode, kind, operand))
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.opcode)?;
        if let Some(kind) = self.kind {
            write!(f, " {}", kind)?;
        }
        if let Some(operand) = &self.operand {
            write!(f, " {}", operand)?;
        }
        Ok(())
    }
}

fn next_token(text: &str) -> (&str, &str) {
    let text = text.trim_start();
    match text.find(char::is_whitespace) {
        Some(end) => (&text[..end], &text[end..]),
        None => (text, ""),
    }
}

/// Render a string as a double-quoted literal operand.
pub fn quote_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Decode a literal produced by [`quote_string`]. `None` if malformed.
pub fn unquote_string(literal: &str) -> Option<String> {
    let inner = literal.strip_prefix('"')?.strip_suffix('"')?;
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next()? {
                '\\' => out.push('\\'),
                '"' => out.push('"'),
                'n' => out.push('\n'),
                'r' => out.push('\r'),
                't' => out.push('\t'),
                _ => return None,
            },
            '"' => return None,
            c => out.push(c),
        }
    }
    Some(out)
}
